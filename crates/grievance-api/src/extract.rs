//! Request extractors that report rejections as [`ApiError`]s.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// Like [`axum::Json`], but a body that fails to parse or deserialise is a
/// plain 400 with the usual `{"message": ...}` payload.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
