//! Submission error types.

use thiserror::Error;

/// Errors from submitting a URL to the ingest endpoint.
///
/// "Not authenticated" is distinguished from request failures: the former
/// means no network call was made at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// No identity token in the session; the request was never issued.
    #[error("not authenticated, sign in before submitting")]
    NotAuthenticated,

    /// The request body could not be encoded.
    #[error("failed to encode submission body: {reason}")]
    Encode {
        /// Serialization failure
        reason: String,
    },

    /// The request never completed (connection, TLS, timeout).
    #[error("submission transport failed: {reason}")]
    Transport {
        /// Underlying transport failure
        reason: String,
    },

    /// The endpoint answered with a non-success status.
    #[error("submission rejected with status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },
}

pub type Result<T> = std::result::Result<T, SubmissionError>;
