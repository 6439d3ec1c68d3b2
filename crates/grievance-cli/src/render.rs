//! Plain-text rendering of complaints for the terminal.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use grievance_core::complaint::Complaint;

/// One row per complaint: short id, status, category, age in days, notes,
/// and title.
pub fn table(complaints: &[Complaint], now: DateTime<Utc>) -> String {
  let mut out = format!(
    "{:<8}  {:<22}  {:<6}  {:>4}  {:>5}  {}\n",
    "ID", "STATUS", "CAT", "AGE", "NOTES", "TITLE"
  );
  for c in complaints {
    let id = c.id.to_string();
    let _ = writeln!(
      out,
      "{:<8}  {:<22}  {:<6}  {:>4}  {:>5}  {}",
      &id[..8],
      c.status.as_str(),
      c.category.as_str(),
      format!("{}d", c.age_days(now)),
      c.resolution_notes.len(),
      c.title,
    );
  }
  out
}

/// Full record, notes included.
pub fn detail(c: &Complaint, now: DateTime<Utc>) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "{}  [{}]", c.title, c.id);
  let _ = writeln!(out, "  status:      {}", c.status);
  let _ = writeln!(out, "  category:    {}", c.category);
  let _ = writeln!(
    out,
    "  assigned to: {}",
    if c.assigned_to.is_empty() { "-" } else { &c.assigned_to }
  );
  let _ = writeln!(out, "  complainant: {} <{}> {}", c.complainant_name, c.email, c.phone_number);
  let _ = writeln!(out, "  created:     {}", c.created_at.format("%Y-%m-%d %H:%M"));
  if let Some(done) = c.completion_date {
    let _ = writeln!(out, "  completed:   {}", done.format("%Y-%m-%d %H:%M"));
  }
  let _ = writeln!(out, "  age:         {} days", c.age_days(now));
  let _ = writeln!(out, "\n  {}", c.description);
  if !c.resolution_notes.is_empty() {
    let _ = writeln!(out, "\n  Resolution notes:");
    for n in &c.resolution_notes {
      let _ = writeln!(
        out,
        "    {} {}: {}",
        n.created_at.format("%Y-%m-%d %H:%M"),
        n.author,
        n.text
      );
    }
  }
  out
}
