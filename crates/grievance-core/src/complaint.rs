//! Complaint types: the single entity tracked by Grievance.
//!
//! A complaint carries free-text details about the complainant and the issue,
//! plus the lifecycle fields (`status`, `completion_date`,
//! `resolution_notes`). Lifecycle fields are only ever changed through
//! [`crate::lifecycle`]; the details path never touches them.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Where a complaint sits in its lifecycle.
///
/// Wire labels are the human-readable ones (`"In Progress"`,
/// `"Closed - No Resolution"`); the identifier spellings are accepted as
/// aliases on input.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum Status {
  #[default]
  Open,
  #[serde(rename = "In Progress", alias = "InProgress")]
  InProgress,
  Resolved,
  #[serde(rename = "Closed - No Resolution", alias = "ClosedNoResolution")]
  ClosedNoResolution,
}

impl Status {
  pub const ALL: [Status; 4] = [
    Status::Open,
    Status::InProgress,
    Status::Resolved,
    Status::ClosedNoResolution,
  ];

  /// Resolved and Closed - No Resolution are terminal: they carry a
  /// completion date and accept resolution notes.
  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Resolved | Self::ClosedNoResolution)
  }

  /// The wire label, also used as the stored column value.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Open => "Open",
      Self::InProgress => "In Progress",
      Self::Resolved => "Resolved",
      Self::ClosedNoResolution => "Closed - No Resolution",
    }
  }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Status {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "Open" => Ok(Self::Open),
      "In Progress" | "InProgress" => Ok(Self::InProgress),
      "Resolved" => Ok(Self::Resolved),
      "Closed - No Resolution" | "ClosedNoResolution" => {
        Ok(Self::ClosedNoResolution)
      }
      other => Err(Error::InvalidInput(format!("Invalid status: {other:?}"))),
    }
  }
}

// ─── Category ────────────────────────────────────────────────────────────────

/// Severity bucket assigned at intake.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum Category {
  #[default]
  Low,
  Medium,
  High,
}

impl Category {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Low => "Low",
      Self::Medium => "Medium",
      Self::High => "High",
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Category {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "Low" => Ok(Self::Low),
      "Medium" => Ok(Self::Medium),
      "High" => Ok(Self::High),
      other => Err(Error::InvalidInput(format!("Invalid category: {other:?}"))),
    }
  }
}

// ─── Resolution notes ────────────────────────────────────────────────────────

/// Author recorded when a note is appended without one.
pub const DEFAULT_NOTE_AUTHOR: &str = "Staff";

/// An immutable annotation appended to a completed complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionNote {
  pub text:       String,
  pub author:     String,
  pub created_at: DateTime<Utc>,
}

// ─── Complaint ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
  pub id:               Uuid,
  pub complainant_name: String,
  /// Always stored lowercased.
  pub email:            String,
  pub phone_number:     String,
  pub title:            String,
  pub description:      String,
  pub category:         Category,
  pub assigned_to:      String,
  pub status:           Status,
  /// Non-null exactly when `status` is terminal.
  pub completion_date:  Option<DateTime<Utc>>,
  /// Append-only, in insertion order.
  pub resolution_notes: Vec<ResolutionNote>,
  pub created_at:       DateTime<Utc>,
  pub updated_at:       DateTime<Utc>,
}

// ─── NewComplaint ────────────────────────────────────────────────────────────

/// Validated input to [`crate::store::ComplaintStore::create`].
/// Identity, lifecycle fields and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComplaint {
  pub complainant_name: String,
  pub email:            String,
  pub phone_number:     String,
  pub title:            String,
  pub description:      String,
  pub category:         Category,
  pub assigned_to:      String,
}

/// Create payload as received from a client; see [`ComplaintInput::validate`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintInput {
  pub complainant_name: Option<String>,
  pub email:            Option<String>,
  pub phone_number:     Option<String>,
  pub title:            Option<String>,
  pub description:      Option<String>,
  pub category:         Option<String>,
  pub assigned_to:      Option<String>,
}

impl ComplaintInput {
  /// Check required fields and apply defaults.
  pub fn validate(self) -> Result<NewComplaint> {
    Ok(NewComplaint {
      complainant_name: required("complainantName", self.complainant_name)?,
      email:            required("email", self.email)?.to_lowercase(),
      phone_number:     required("phoneNumber", self.phone_number)?,
      title:            required("title", self.title)?,
      description:      required("description", self.description)?,
      category:         self
        .category
        .as_deref()
        .map(str::parse)
        .transpose()?
        .unwrap_or_default(),
      assigned_to:      self.assigned_to.unwrap_or_default(),
    })
  }
}

// ─── Details patch ───────────────────────────────────────────────────────────

/// A validated partial update of the non-lifecycle fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintPatch {
  pub complainant_name: Option<String>,
  pub email:            Option<String>,
  pub phone_number:     Option<String>,
  pub title:            Option<String>,
  pub description:      Option<String>,
  pub category:         Option<Category>,
  pub assigned_to:      Option<String>,
}

impl ComplaintPatch {
  /// Overwrite every supplied field on `complaint`. Lifecycle fields are
  /// not reachable from here.
  pub fn apply_to(self, complaint: &mut Complaint) {
    if let Some(v) = self.complainant_name {
      complaint.complainant_name = v;
    }
    if let Some(v) = self.email {
      complaint.email = v;
    }
    if let Some(v) = self.phone_number {
      complaint.phone_number = v;
    }
    if let Some(v) = self.title {
      complaint.title = v;
    }
    if let Some(v) = self.description {
      complaint.description = v;
    }
    if let Some(v) = self.category {
      complaint.category = v;
    }
    if let Some(v) = self.assigned_to {
      complaint.assigned_to = v;
    }
  }
}

/// Details-update payload as received from a client. Fields it does not
/// name (`status`, `completionDate`, notes, ...) are ignored on deserialise.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsInput {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub complainant_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email:            Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub phone_number:     Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title:            Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description:      Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub category:         Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub assigned_to:      Option<String>,
}

impl DetailsInput {
  pub fn validate(self) -> Result<ComplaintPatch> {
    Ok(ComplaintPatch {
      complainant_name: optional("complainantName", self.complainant_name)?,
      email:            optional("email", self.email)?
        .map(|e| e.to_lowercase()),
      phone_number:     optional("phoneNumber", self.phone_number)?,
      title:            optional("title", self.title)?,
      description:      optional("description", self.description)?,
      category:         self.category.as_deref().map(str::parse).transpose()?,
      assigned_to:      self.assigned_to,
    })
  }
}

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Equality filter for [`crate::store::ComplaintStore::find_many`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComplaintFilter {
  pub status:   Option<Status>,
  pub category: Option<Category>,
}

impl ComplaintFilter {
  /// Parse raw query values; empty strings mean "no filter".
  pub fn parse(status: Option<&str>, category: Option<&str>) -> Result<Self> {
    fn non_empty(v: Option<&str>) -> Option<&str> { v.filter(|s| !s.is_empty()) }
    Ok(Self {
      status:   non_empty(status).map(str::parse).transpose()?,
      category: non_empty(category).map(str::parse).transpose()?,
    })
  }

  pub fn matches(&self, complaint: &Complaint) -> bool {
    self.status.is_none_or(|s| s == complaint.status)
      && self.category.is_none_or(|c| c == complaint.category)
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn required(field: &str, value: Option<String>) -> Result<String> {
  match value.map(|v| v.trim().to_owned()) {
    Some(v) if !v.is_empty() => Ok(v),
    _ => Err(Error::InvalidInput(format!("{field} is required"))),
  }
}

fn optional(field: &str, value: Option<String>) -> Result<Option<String>> {
  value.map(|v| required(field, Some(v))).transpose()
}
