//! [`ComplaintService`]: request-level operations over a [`ComplaintStore`].
//!
//! Each operation validates its input before touching storage. Lifecycle
//! rules run against a fetched copy of the record; the resulting write
//! names only the columns the operation owns. Nothing is retried and
//! nothing is locked.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  Error, Result,
  complaint::{Complaint, ComplaintFilter, ComplaintInput, DetailsInput, Status},
  lifecycle::{self, NoteDraft},
  store::ComplaintStore,
};

pub struct ComplaintService<S> {
  store: Arc<S>,
  clock: fn() -> DateTime<Utc>,
}

impl<S: ComplaintStore> ComplaintService<S> {
  pub fn new(store: Arc<S>) -> Self { Self::with_clock(store, lifecycle::now) }

  /// Use `clock` instead of the system time for lifecycle timestamps.
  pub fn with_clock(store: Arc<S>, clock: fn() -> DateTime<Utc>) -> Self {
    Self { store, clock }
  }

  pub fn store(&self) -> &S { &self.store }

  // ── Records ─────────────────────────────────────────────────────────────

  pub async fn create(&self, input: ComplaintInput) -> Result<Complaint> {
    let new = input.validate()?;
    let complaint = self.store.create(new).await.map_err(Error::persistence)?;
    tracing::info!(id = %complaint.id, category = %complaint.category, "complaint created");
    Ok(complaint)
  }

  /// List complaints, optionally filtered by exact `status` / `category`.
  pub async fn list(
    &self,
    status: Option<&str>,
    category: Option<&str>,
  ) -> Result<Vec<Complaint>> {
    let filter = ComplaintFilter::parse(status, category)?;
    self.store.find_many(&filter).await.map_err(Error::persistence)
  }

  pub async fn get(&self, id: &str) -> Result<Complaint> {
    let id = parse_id(id)?;
    self.fetch(id).await
  }

  /// Patch the non-lifecycle fields.
  pub async fn update_details(&self, id: &str, input: DetailsInput) -> Result<Complaint> {
    let id = parse_id(id)?;
    let patch = input.validate()?;
    self
      .store
      .update_fields(id, patch)
      .await
      .map_err(Error::persistence)?
      .ok_or(Error::NotFound(id))
  }

  // ── Lifecycle ───────────────────────────────────────────────────────────

  /// Move a complaint to `status`. Any state may move to any other.
  pub async fn transition(&self, id: &str, status: &str) -> Result<Complaint> {
    let status: Status = status.parse()?;
    let id = parse_id(id)?;
    let mut complaint = self.fetch(id).await?;

    let from = complaint.status;
    complaint.set_status(status, (self.clock)());
    let saved = self.write_lifecycle(&complaint).await?;
    tracing::info!(%id, %from, to = %status, "status changed");
    Ok(saved)
  }

  /// Close as `ClosedNoResolution`; a no-op returning the stored record if
  /// it is already terminal.
  pub async fn close_without_resolution(&self, id: &str) -> Result<Complaint> {
    let id = parse_id(id)?;
    let mut complaint = self.fetch(id).await?;

    if !complaint.close_without_resolution((self.clock)()) {
      tracing::debug!(%id, status = %complaint.status, "already completed");
      return Ok(complaint);
    }
    let saved = self.write_lifecycle(&complaint).await?;
    tracing::info!(%id, "closed without resolution");
    Ok(saved)
  }

  /// Append a resolution note to a completed complaint.
  pub async fn append_note(
    &self,
    id: &str,
    text: Option<&str>,
    author: Option<&str>,
  ) -> Result<Complaint> {
    let note = NoteDraft::new(text, author)?;
    let id = parse_id(id)?;
    self.fetch(id).await?.ensure_accepts_notes()?;

    // The store re-checks completion in the same write; a complaint reopened
    // since the fetch refuses the note.
    let saved = self
      .store
      .append_note(id, note.at((self.clock)()), None)
      .await
      .map_err(Error::persistence)?
      .ok_or_else(|| {
        Error::PreconditionFailed("Allowed only when complaint is completed".to_owned())
      })?;
    tracing::info!(%id, notes = saved.resolution_notes.len(), "resolution note added");
    Ok(saved)
  }

  /// Close without resolution (unless already terminal) and append a note,
  /// persisted as a single write.
  pub async fn close_with_note(
    &self,
    id: &str,
    text: Option<&str>,
    author: Option<&str>,
  ) -> Result<Complaint> {
    let note = NoteDraft::new(text, author)?;
    let id = parse_id(id)?;

    let now = (self.clock)();
    let saved = self
      .store
      .append_note(id, note.at(now), Some(now))
      .await
      .map_err(Error::persistence)?
      .ok_or(Error::NotFound(id))?;
    tracing::info!(%id, status = %saved.status, "closed with note");
    Ok(saved)
  }

  // ── Helpers ─────────────────────────────────────────────────────────────

  async fn fetch(&self, id: Uuid) -> Result<Complaint> {
    self
      .store
      .find_by_id(id)
      .await
      .map_err(Error::persistence)?
      .ok_or(Error::NotFound(id))
  }

  async fn write_lifecycle(&self, complaint: &Complaint) -> Result<Complaint> {
    self
      .store
      .set_lifecycle(complaint.id, complaint.status, complaint.completion_date)
      .await
      .map_err(Error::persistence)?
      .ok_or(Error::NotFound(complaint.id))
  }
}

/// Malformed identifiers are a persistence concern, not invalid input.
fn parse_id(id: &str) -> Result<Uuid> { Uuid::parse_str(id).map_err(Error::persistence) }
