//! The `ComplaintStore` trait.
//!
//! Implemented by storage backends (e.g. `grievance-store-sqlite`). The
//! service and transport layers depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::complaint::{
  Complaint, ComplaintFilter, ComplaintPatch, NewComplaint, ResolutionNote, Status,
};

/// Abstraction over a complaint persistence backend.
///
/// Every write is a single-record operation that names only the columns it
/// owns: details, lifecycle, or the note list. Writes to different groups of
/// the same record never undo each other; two writes to the same group
/// resolve last-write-wins. Notes are append-only.
pub trait ComplaintStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new complaint in status `Open`. The store assigns `id`,
  /// `created_at` and `updated_at`.
  fn create(
    &self,
    input: NewComplaint,
  ) -> impl Future<Output = Result<Complaint, Self::Error>> + Send + '_;

  /// Retrieve a complaint by id. Returns `None` if not found.
  fn find_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Complaint>, Self::Error>> + Send + '_;

  /// All complaints matching `filter`, newest-created first.
  fn find_many<'a>(
    &'a self,
    filter: &'a ComplaintFilter,
  ) -> impl Future<Output = Result<Vec<Complaint>, Self::Error>> + Send + 'a;

  /// Write `status` and `completion_date`, refreshing `updated_at`. Details
  /// and notes are left as stored. Returns `None` if the complaint does not
  /// exist.
  fn set_lifecycle(
    &self,
    id: Uuid,
    status: Status,
    completion_date: Option<DateTime<Utc>>,
  ) -> impl Future<Output = Result<Option<Complaint>, Self::Error>> + Send + '_;

  /// Append `note` after every note already stored, refreshing `updated_at`.
  ///
  /// With `close_at` set, a complaint that is not yet completed is first
  /// closed without resolution at that time, in the same write. Returns
  /// `None` (and writes nothing) if the complaint does not exist or is not
  /// completed.
  fn append_note(
    &self,
    id: Uuid,
    note: ResolutionNote,
    close_at: Option<DateTime<Utc>>,
  ) -> impl Future<Output = Result<Option<Complaint>, Self::Error>> + Send + '_;

  /// Overwrite the supplied detail fields, refreshing `updated_at`. Status,
  /// completion date and notes are never written. Returns `None` if the
  /// complaint does not exist.
  fn update_fields(
    &self,
    id: Uuid,
    patch: ComplaintPatch,
  ) -> impl Future<Output = Result<Option<Complaint>, Self::Error>> + Send + '_;
}
