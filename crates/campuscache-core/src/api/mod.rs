//! HTTP client module for the staff directory endpoint.
//!
//! A single GET endpoint serves personnel records, filtered by `role`
//! (required) and `school` (optional) query parameters. The client treats
//! the call as an opaque async operation returning a JSON array.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
