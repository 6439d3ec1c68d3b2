//! Core types and lifecycle rules for the Grievance complaint tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::ComplaintStore`]; transports drive
//! [`service::ComplaintService`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod complaint;
pub mod error;
pub mod lifecycle;
pub mod service;
pub mod store;

pub use error::{Error, Result};
