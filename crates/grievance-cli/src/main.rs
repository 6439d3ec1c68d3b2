//! `grievance`: terminal client for the Grievance complaint tracker.
//!
//! # Usage
//!
//! ```
//! grievance list --status Resolved
//! grievance status <id> "In Progress"
//! grievance status <id> Resolved --note "Refund issued"
//! grievance close <id> --note "Customer unreachable"
//! grievance close <id> --yes
//! ```

mod client;
mod render;

use std::{
  io::{self, BufRead, Write},
  time::Duration,
};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use grievance_core::{
  complaint::{ComplaintInput, DetailsInput, Status},
  lifecycle,
};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "grievance", about = "Terminal client for the Grievance complaint tracker")]
struct Args {
  /// Path to a TOML config file (url, attempts, backoff_ms).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the grievance server (default: http://localhost:5000).
  #[arg(long, env = "GRIEVANCE_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List complaints, newest first.
  List {
    #[arg(long)]
    status:   Option<String>,
    #[arg(long)]
    category: Option<String>,
  },
  /// Show one complaint with its resolution notes.
  Show { id: String },
  /// Submit a new complaint.
  Create {
    #[arg(long)]
    name:        String,
    #[arg(long)]
    email:       String,
    #[arg(long)]
    phone:       String,
    #[arg(long)]
    title:       String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    category:    Option<String>,
    #[arg(long)]
    assign:      Option<String>,
  },
  /// Update complaint details; status and notes are not touched.
  Update {
    id:          String,
    #[arg(long)]
    name:        Option<String>,
    #[arg(long)]
    email:       Option<String>,
    #[arg(long)]
    phone:       Option<String>,
    #[arg(long)]
    title:       Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    category:    Option<String>,
    #[arg(long)]
    assign:      Option<String>,
  },
  /// Change status. Completing a complaint asks for a resolution note.
  Status {
    id:     String,
    status: String,
    #[arg(long)]
    note:   Option<String>,
    #[arg(long)]
    author: Option<String>,
  },
  /// Close without resolution, optionally with a note in the same write.
  Close {
    id:     String,
    #[arg(long)]
    note:   Option<String>,
    #[arg(long)]
    author: Option<String>,
    /// Skip the confirmation prompt.
    #[arg(short, long)]
    yes:    bool,
  },
  /// Append a resolution note to a completed complaint.
  Note {
    id:     String,
    text:   String,
    #[arg(long)]
    author: Option<String>,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize)]
#[serde(default)]
struct ConfigFile {
  url:        String,
  attempts:   u32,
  backoff_ms: u64,
}

impl Default for ConfigFile {
  fn default() -> Self {
    Self { url: String::new(), attempts: 3, backoff_ms: 400 }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let client = ApiClient::new(ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:5000".to_string()),
    attempts: file_cfg.attempts.max(1),
    backoff:  Duration::from_millis(file_cfg.backoff_ms),
  })?;

  run(&client, args.command).await
}

async fn run(client: &ApiClient, command: Command) -> Result<()> {
  let now = lifecycle::now();
  match command {
    Command::List { status, category } => {
      let complaints = client.list(status.as_deref(), category.as_deref()).await?;
      print!("{}", render::table(&complaints, now));
    }
    Command::Show { id } => {
      print!("{}", render::detail(&client.get(&id).await?, now));
    }
    Command::Create { name, email, phone, title, description, category, assign } => {
      let input = ComplaintInput {
        complainant_name: Some(name),
        email:            Some(email),
        phone_number:     Some(phone),
        title:            Some(title),
        description:      Some(description),
        category,
        assigned_to:      assign,
      };
      let created = client.create(&input).await?;
      println!("created {}", created.id);
    }
    Command::Update { id, name, email, phone, title, description, category, assign } => {
      let input = DetailsInput {
        complainant_name: name,
        email,
        phone_number: phone,
        title,
        description,
        category,
        assigned_to: assign,
      };
      print!("{}", render::detail(&client.update(&id, &input).await?, now));
    }
    Command::Status { id, status, note, author } => {
      let status: Status = status.parse()?;
      let note = required_note(status, note, || prompt("Resolution note: "))?;

      // Two independent writes: the status change is kept even if the note fails.
      let mut complaint = client.set_status(&id, status).await?;
      if let Some(text) = note {
        complaint = client
          .add_note(&id, &text, author.as_deref())
          .await
          .context("status changed, but the resolution note was not saved")?;
      }
      print!("{}", render::detail(&complaint, now));
    }
    Command::Close { id, note, author, yes } => {
      let complaint = match note {
        Some(text) => client.close_with_note(&id, &text, author.as_deref()).await?,
        None => {
          let question = format!("Close {id} without resolution? [y/N] ");
          if !yes && !confirmed(&prompt(&question)?) {
            println!("aborted");
            return Ok(());
          }
          client.close_no_resolution(&id).await?
        }
      };
      print!("{}", render::detail(&complaint, now));
    }
    Command::Note { id, text, author } => {
      let complaint = client.add_note(&id, &text, author.as_deref()).await?;
      print!("{}", render::detail(&complaint, now));
    }
  }
  Ok(())
}

/// Completing a complaint needs a note; ask for one if none was supplied.
/// Non-terminal transitions never carry a note.
fn required_note(
  status: Status,
  supplied: Option<String>,
  ask: impl FnOnce() -> io::Result<String>,
) -> Result<Option<String>> {
  if !status.is_terminal() {
    return Ok(None);
  }
  let text = match supplied {
    Some(text) => text,
    None => ask().context("reading resolution note")?,
  };
  let text = text.trim();
  if text.is_empty() {
    bail!("a resolution note is required to mark a complaint {status}");
  }
  Ok(Some(text.to_owned()))
}

/// `y` or `yes`, in any case; anything else declines.
fn confirmed(answer: &str) -> bool {
  matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn prompt(label: &str) -> io::Result<String> {
  print!("{label}");
  io::stdout().flush()?;
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line)
}
