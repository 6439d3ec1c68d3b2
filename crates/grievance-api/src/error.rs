//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use grievance_core::Error;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler. Rendered as `{"message": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map a core error raised on a read path; persistence failures are 500s.
  pub fn read(err: Error) -> Self {
    match err {
      Error::Persistence(e) => Self::Store(e),
      other => Self::common(other),
    }
  }

  /// Map a core error raised on a write path; persistence failures are
  /// reported as bad requests.
  pub fn write(err: Error) -> Self {
    match err {
      Error::Persistence(e) => Self::BadRequest(e.to_string()),
      other => Self::common(other),
    }
  }

  fn common(err: Error) -> Self {
    match err {
      Error::NotFound(_) => Self::NotFound(err.to_string()),
      Error::InvalidInput(m) | Error::PreconditionFailed(m) => Self::BadRequest(m),
      Error::Persistence(e) => Self::Store(e),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "message": message }))).into_response()
  }
}
