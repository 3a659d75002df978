//! # Core Ingest
//!
//! Submits user-supplied document URLs to the backend ingest endpoint.
//! A submission is a single authorized POST: no retry, no idempotency key,
//! at-most-once delivery. The caller gets a success acknowledgement or a
//! typed error and decides what to surface.

pub mod channel;
pub mod error;

pub use channel::{Ack, SubmissionChannel};
pub use error::{Result, SubmissionError};
