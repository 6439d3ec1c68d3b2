//! Error type for `grievance-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored enum column held a value no variant maps to.
  #[error("decode error: {0}")]
  Decode(#[source] grievance_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
