//! JSON REST API for Grievance.
//!
//! Exposes an axum [`Router`] backed by any
//! [`grievance_core::store::ComplaintStore`]. TLS and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(grievance_api::api_router(store.clone()))
//! ```

pub mod complaints;
pub mod error;
pub mod extract;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post},
};
use grievance_core::{service::ComplaintService, store::ComplaintStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be merged or nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ComplaintStore + 'static,
{
  let service = Arc::new(ComplaintService::new(store));
  Router::new()
    .route(
      "/complaints",
      get(complaints::list::<S>).post(complaints::create::<S>),
    )
    .route(
      "/complaints/{id}",
      get(complaints::get_one::<S>).put(complaints::update_details::<S>),
    )
    .route("/complaints/{id}/status", patch(complaints::transition::<S>))
    .route(
      "/complaints/{id}/close-no-resolution",
      patch(complaints::close_no_resolution::<S>),
    )
    .route("/complaints/{id}/notes", post(complaints::add_note::<S>))
    .route(
      "/complaints/{id}/close-with-note",
      post(complaints::close_with_note::<S>),
    )
    .with_state(service)
}

#[cfg(test)]
mod tests;
