//! HTTP server assembly for Grievance.
//!
//! Loads [`ServerConfig`] and wraps the API router in request tracing. The
//! binary in `main.rs` is a thin shell around [`load_config`] and [`app`].

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use grievance_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `GRIEVANCE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

/// Layer defaults, the optional TOML file at `path`, and the environment.
pub fn load_config(path: &Path) -> Result<ServerConfig, config::ConfigError> {
  config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 5000)?
    .set_default("store_path", "grievance.db")?
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("GRIEVANCE"))
    .build()?
    .try_deserialize()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full application: API routes plus per-request tracing.
pub fn app(store: Arc<SqliteStore>) -> Router {
  grievance_api::api_router(store).layer(TraceLayer::new_for_http())
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
