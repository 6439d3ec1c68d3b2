//! Error types for `grievance-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// Bad enum value, empty required text, or other schema violation.
  #[error("{0}")]
  InvalidInput(String),

  #[error("Complaint not found: {0}")]
  NotFound(Uuid),

  /// The record exists but is not in a state that permits the operation.
  #[error("{0}")]
  PreconditionFailed(String),

  /// Malformed identifiers and unexpected storage errors.
  #[error("persistence failure: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn persistence<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Persistence(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
