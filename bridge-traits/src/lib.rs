//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host.
//!
//! ## Overview
//!
//! This crate defines the contract between the reader core and the external
//! SDKs it delegates to. Every hard capability (interactive authentication,
//! credential federation, object storage, HTTP transport) lives behind a
//! trait here so the core can be exercised against mocks and each host can
//! inject its own SDK adapters.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations
//! - [`IdentityProvider`](identity::IdentityProvider) - Interactive sign-in/sign-out popup flow
//! - [`CredentialBroker`](storage::CredentialBroker) - Identity token → scoped storage credentials
//! - [`ObjectStore`](storage::ObjectStore) - Key → blob fetch for page assets
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Adapters should
//! convert SDK-specific errors and classify failures as `Rejected` (the
//! request reached the service and was denied) or `Unreachable` (it never
//! arrived) so that callers can act on the distinction.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds to support safe concurrent
//! usage across async tasks.

pub mod error;
pub mod http;
pub mod identity;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use identity::{IdentityProvider, UserProfile};
pub use storage::{CredentialBroker, GetOptions, ObjectStore, StorageCredentials, StorageScope};
