//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that lexical order matches chronological order. Enum columns
//! hold the wire labels. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use grievance_core::complaint::{
  Category, Complaint, ResolutionNote, Status,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn encode_status(s: Status) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<Status> { s.parse().map_err(Error::Decode) }

pub fn encode_category(c: Category) -> &'static str { c.as_str() }

pub fn decode_category(s: &str) -> Result<Category> {
  s.parse().map_err(Error::Decode)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching the field order of [`RawComplaint::from_row`].
pub const COMPLAINT_COLUMNS: &str = "complaint_id, complainant_name, email, \
   phone_number, title, description, category, assigned_to, status, \
   completion_date, created_at, updated_at";

/// Raw strings read directly from a `complaints` row plus its notes.
pub struct RawComplaint {
  pub complaint_id:     String,
  pub complainant_name: String,
  pub email:            String,
  pub phone_number:     String,
  pub title:            String,
  pub description:      String,
  pub category:         String,
  pub assigned_to:      String,
  pub status:           String,
  pub completion_date:  Option<String>,
  pub created_at:       String,
  pub updated_at:       String,
  pub notes:            Vec<RawNote>,
}

impl RawComplaint {
  /// Read a row selected with [`COMPLAINT_COLUMNS`]. Notes are loaded
  /// separately.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      complaint_id:     row.get(0)?,
      complainant_name: row.get(1)?,
      email:            row.get(2)?,
      phone_number:     row.get(3)?,
      title:            row.get(4)?,
      description:      row.get(5)?,
      category:         row.get(6)?,
      assigned_to:      row.get(7)?,
      status:           row.get(8)?,
      completion_date:  row.get(9)?,
      created_at:       row.get(10)?,
      updated_at:       row.get(11)?,
      notes:            Vec::new(),
    })
  }

  pub fn into_complaint(self) -> Result<Complaint> {
    Ok(Complaint {
      id:               decode_uuid(&self.complaint_id)?,
      complainant_name: self.complainant_name,
      email:            self.email,
      phone_number:     self.phone_number,
      title:            self.title,
      description:      self.description,
      category:         decode_category(&self.category)?,
      assigned_to:      self.assigned_to,
      status:           decode_status(&self.status)?,
      completion_date:  self.completion_date.as_deref().map(decode_dt).transpose()?,
      resolution_notes: self
        .notes
        .into_iter()
        .map(RawNote::into_note)
        .collect::<Result<_>>()?,
      created_at:       decode_dt(&self.created_at)?,
      updated_at:       decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `resolution_notes` row.
pub struct RawNote {
  pub text:       String,
  pub author:     String,
  pub created_at: String,
}

impl RawNote {
  pub fn from_note(note: &ResolutionNote) -> Self {
    Self {
      text:       note.text.clone(),
      author:     note.author.clone(),
      created_at: encode_dt(note.created_at),
    }
  }

  pub fn into_note(self) -> Result<ResolutionNote> {
    Ok(ResolutionNote {
      text:       self.text,
      author:     self.author,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
