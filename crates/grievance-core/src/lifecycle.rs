//! Status transitions and resolution notes.
//!
//! Every status is reachable from every other status, terminal ones included.
//! The only derived rule is the completion date: it is stamped whenever a
//! complaint enters a terminal status and cleared whenever it leaves one.
//! Notes can only be appended while the complaint is terminal.

use chrono::{DateTime, SubsecRound as _, TimeDelta, Utc};

use crate::{
  Error, Result,
  complaint::{Complaint, DEFAULT_NOTE_AUTHOR, ResolutionNote, Status},
};

/// The current time at the precision timestamps are persisted with.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

// ─── Status ──────────────────────────────────────────────────────────────────

impl Complaint {
  /// Move to `status` and recompute the completion date.
  pub fn set_status(&mut self, status: Status, at: DateTime<Utc>) {
    self.status = status;
    self.completion_date = status.is_terminal().then_some(at);
  }

  /// Force `ClosedNoResolution` unless already terminal.
  ///
  /// Returns `false` (and leaves the record untouched) when the complaint is
  /// already Resolved or Closed - No Resolution.
  pub fn close_without_resolution(&mut self, at: DateTime<Utc>) -> bool {
    if self.status.is_terminal() {
      return false;
    }
    self.set_status(Status::ClosedNoResolution, at);
    true
  }

  // ─── Notes ─────────────────────────────────────────────────────────────────

  /// Notes are accepted only while the complaint is Resolved or Closed - No
  /// Resolution.
  pub fn ensure_accepts_notes(&self) -> Result<()> {
    if !self.status.is_terminal() {
      return Err(Error::PreconditionFailed(
        "Allowed only when complaint is completed".to_owned(),
      ));
    }
    Ok(())
  }

  /// Append `note` after the existing notes.
  pub fn append_note(&mut self, note: ResolutionNote) -> Result<()> {
    self.ensure_accepts_notes()?;
    self.resolution_notes.push(note);
    Ok(())
  }

  /// Whole days the complaint has been (or was) open.
  pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
    age_days(self.created_at, self.completion_date, now)
  }
}

/// A validated, trimmed note waiting to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
  text:   String,
  author: String,
}

impl NoteDraft {
  /// Trim `text` and `author`; blank text is rejected, blank or missing
  /// author falls back to [`DEFAULT_NOTE_AUTHOR`].
  pub fn new(text: Option<&str>, author: Option<&str>) -> Result<Self> {
    let text = text.map(str::trim).unwrap_or_default();
    if text.is_empty() {
      return Err(Error::InvalidInput("Note text is required".to_owned()));
    }
    let author = author
      .map(str::trim)
      .filter(|a| !a.is_empty())
      .unwrap_or(DEFAULT_NOTE_AUTHOR);
    Ok(Self { text: text.to_owned(), author: author.to_owned() })
  }

  pub fn text(&self) -> &str { &self.text }

  pub fn author(&self) -> &str { &self.author }

  /// The note as written at `at`.
  pub fn at(self, at: DateTime<Utc>) -> ResolutionNote {
    ResolutionNote { text: self.text, author: self.author, created_at: at }
  }
}

// ─── Age ─────────────────────────────────────────────────────────────────────

/// `floor((completion_date ?? now) - created_at)` in whole days.
pub fn age_days(
  created_at: DateTime<Utc>,
  completion_date: Option<DateTime<Utc>>,
  now: DateTime<Utc>,
) -> i64 {
  let end = completion_date.unwrap_or(now);
  (end - created_at).num_milliseconds().div_euclid(TimeDelta::days(1).num_milliseconds())
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;
  use uuid::Uuid;

  use super::*;
  use crate::complaint::Category;

  fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
  }

  fn complaint(status: Status) -> Complaint {
    let created = Utc.with_ymd_and_hms(2025, 8, 10, 0, 0, 0).unwrap();
    let mut c = Complaint {
      id:               Uuid::new_v4(),
      complainant_name: "Samuel".into(),
      email:            "samuel@example.com".into(),
      phone_number:     "0432123456".into(),
      title:            "Late delivery".into(),
      description:      "Parcel arrived a week late.".into(),
      category:         Category::Low,
      assigned_to:      String::new(),
      status:           Status::Open,
      completion_date:  None,
      resolution_notes: Vec::new(),
      created_at:       created,
      updated_at:       created,
    };
    c.set_status(status, created);
    c
  }

  #[test]
  fn completion_date_set_iff_terminal() {
    let at = ts("2025-08-11T09:00:00Z");
    for from in Status::ALL {
      for to in Status::ALL {
        let mut c = complaint(from);
        c.set_status(to, at);
        assert_eq!(c.status, to);
        assert_eq!(c.completion_date.is_some(), to.is_terminal(), "{from} -> {to}");
      }
    }
  }

  #[test]
  fn reopening_clears_completion_date() {
    let mut c = complaint(Status::Resolved);
    assert!(c.completion_date.is_some());
    c.set_status(Status::Open, ts("2025-08-12T00:00:00Z"));
    assert_eq!(c.completion_date, None);
  }

  #[test]
  fn terminal_to_terminal_restamps() {
    let mut c = complaint(Status::Resolved);
    let later = ts("2025-08-20T00:00:00Z");
    c.set_status(Status::ClosedNoResolution, later);
    assert_eq!(c.completion_date, Some(later));
  }

  #[test]
  fn close_without_resolution_is_idempotent() {
    let mut c = complaint(Status::InProgress);
    let first = ts("2025-08-12T00:00:00Z");
    assert!(c.close_without_resolution(first));
    assert_eq!(c.status, Status::ClosedNoResolution);
    assert_eq!(c.completion_date, Some(first));

    assert!(!c.close_without_resolution(ts("2025-08-13T00:00:00Z")));
    assert_eq!(c.completion_date, Some(first));
  }

  #[test]
  fn close_leaves_resolved_alone() {
    let mut c = complaint(Status::Resolved);
    let before = c.clone();
    assert!(!c.close_without_resolution(ts("2025-08-13T00:00:00Z")));
    assert_eq!(c, before);
  }

  #[test]
  fn note_draft_trims_and_defaults_author() {
    let d = NoteDraft::new(Some("  All good  "), None).unwrap();
    assert_eq!(d.text(), "All good");
    assert_eq!(d.author(), "Staff");

    let d = NoteDraft::new(Some("ok"), Some("  Hannah ")).unwrap();
    assert_eq!(d.author(), "Hannah");
  }

  #[test]
  fn note_draft_rejects_blank_text() {
    for text in [None, Some(""), Some("   ")] {
      assert!(matches!(NoteDraft::new(text, None), Err(Error::InvalidInput(_))));
    }
  }

  #[test]
  fn append_note_requires_terminal_status() {
    let mut c = complaint(Status::Open);
    let note = NoteDraft::new(Some("ok"), None).unwrap().at(ts("2025-08-11T00:00:00Z"));
    let err = c.append_note(note).unwrap_err();
    assert!(matches!(err, Error::PreconditionFailed(_)));
    assert!(c.resolution_notes.is_empty());
  }

  #[test]
  fn append_note_preserves_prior_notes() {
    let mut c = complaint(Status::Resolved);
    let first = ts("2025-08-11T00:00:00Z");
    c.append_note(NoteDraft::new(Some("Refund issued"), Some("Hannah")).unwrap().at(first))
      .unwrap();
    let prior = c.resolution_notes.clone();

    let later = ts("2025-08-12T00:00:00Z");
    c.append_note(NoteDraft::new(Some(" All good "), Some("Staff")).unwrap().at(later))
      .unwrap();

    assert_eq!(c.resolution_notes.len(), 2);
    assert_eq!(c.resolution_notes[..1], prior[..]);
    assert_eq!(c.resolution_notes[1].text, "All good");
    assert_eq!(c.resolution_notes[1].author, "Staff");
    assert_eq!(c.resolution_notes[1].created_at, later);
  }

  #[test]
  fn age_of_open_complaint_uses_now() {
    let created = ts("2025-08-10T00:00:00Z");
    let now = ts("2025-08-16T00:00:00Z");
    assert_eq!(age_days(created, None, now), 6);
  }

  #[test]
  fn age_of_completed_complaint_ignores_now() {
    let created = ts("2025-08-10T00:00:00Z");
    let done = ts("2025-08-12T00:00:00Z");
    assert_eq!(age_days(created, Some(done), ts("2030-01-01T00:00:00Z")), 2);
  }

  #[test]
  fn age_rounds_down_partial_days() {
    let created = ts("2025-08-10T12:00:00Z");
    assert_eq!(age_days(created, None, ts("2025-08-12T11:59:59Z")), 1);
  }
}
