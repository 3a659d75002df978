//! # Reader Configuration Module
//!
//! Builder-based configuration for the reader core.
//!
//! ## Overview
//!
//! `ReaderConfig` holds the bridge implementations and settings required to
//! initialize the core. The builder enforces fail-fast validation: every
//! required bridge and setting must be provided before initialization, with
//! actionable error messages when one is missing.
//!
//! ## Required Dependencies
//!
//! - `IdentityProvider` - interactive sign-in/sign-out flow
//! - `CredentialBroker` - identity token → storage credential exchange
//! - `ObjectStore` - page asset fetches
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - URL submission transport (desktop default: reqwest,
//!   injected by `core-service` under the `desktop-shims` feature)
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::ReaderConfig;
//! use bridge_traits::StorageScope;
//! use std::sync::Arc;
//!
//! let config = ReaderConfig::builder()
//!     .identity_provider(Arc::new(MyIdentityProvider))
//!     .credential_broker(Arc::new(MyCredentialBroker))
//!     .object_store(Arc::new(MyObjectStore))
//!     .submission_endpoint("https://api.example.com/submit")
//!     .storage_scope(StorageScope::new("us-west-2", "documents", "pool-id"))
//!     .page_prefix("acme_docs/report_42/")
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{CredentialBroker, HttpClient, IdentityProvider, ObjectStore, StorageScope};
use std::sync::Arc;

use crate::events::DEFAULT_EVENT_BUFFER_SIZE;

/// Configuration for the reader core.
///
/// Use [`ReaderConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct ReaderConfig {
    /// Interactive identity provider (required)
    pub identity_provider: Arc<dyn IdentityProvider>,

    /// Credential federation service (required)
    pub credential_broker: Arc<dyn CredentialBroker>,

    /// Object store for page assets (required)
    pub object_store: Arc<dyn ObjectStore>,

    /// HTTP client for URL submission (optional with desktop default)
    pub http_client: Option<Arc<dyn HttpClient>>,

    /// Endpoint URLs are submitted to
    pub submission_endpoint: String,

    /// Region/bucket/identity-pool credential scope
    pub storage_scope: StorageScope,

    /// Fixed storage-key namespace for the current document's pages
    pub page_prefix: String,

    /// Event bus buffer size
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for ReaderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderConfig")
            .field("identity_provider", &"IdentityProvider { ... }")
            .field("credential_broker", &"CredentialBroker { ... }")
            .field("object_store", &"ObjectStore { ... }")
            .field(
                "http_client",
                &self.http_client.as_ref().map(|_| "HttpClient { ... }"),
            )
            .field("submission_endpoint", &self.submission_endpoint)
            .field("storage_scope", &self.storage_scope)
            .field("page_prefix", &self.page_prefix)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl ReaderConfig {
    /// Creates a new builder.
    pub fn builder() -> ReaderConfigBuilder {
        ReaderConfigBuilder::default()
    }
}

/// Builder for [`ReaderConfig`] with fail-fast validation.
#[derive(Default)]
pub struct ReaderConfigBuilder {
    identity_provider: Option<Arc<dyn IdentityProvider>>,
    credential_broker: Option<Arc<dyn CredentialBroker>>,
    object_store: Option<Arc<dyn ObjectStore>>,
    http_client: Option<Arc<dyn HttpClient>>,
    submission_endpoint: Option<String>,
    storage_scope: Option<StorageScope>,
    page_prefix: Option<String>,
    event_buffer_size: Option<usize>,
}

impl ReaderConfigBuilder {
    pub fn identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity_provider = Some(provider);
        self
    }

    pub fn credential_broker(mut self, broker: Arc<dyn CredentialBroker>) -> Self {
        self.credential_broker = Some(broker);
        self
    }

    pub fn object_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.object_store = Some(store);
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn submission_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.submission_endpoint = Some(endpoint.into());
        self
    }

    pub fn storage_scope(mut self, scope: StorageScope) -> Self {
        self.storage_scope = Some(scope);
        self
    }

    pub fn page_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.page_prefix = Some(prefix.into());
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Validates the configuration and builds a [`ReaderConfig`].
    ///
    /// # Errors
    ///
    /// Returns `Error::CapabilityMissing` when a required bridge is absent
    /// and `Error::Config` when a required setting is absent or empty.
    pub fn build(self) -> Result<ReaderConfig> {
        let identity_provider = self.identity_provider.ok_or_else(|| {
            Error::CapabilityMissing {
                capability: "IdentityProvider".to_string(),
                message: "No identity provider implementation supplied. \
                          Inject the host SDK adapter via .identity_provider()."
                    .to_string(),
            }
        })?;

        let credential_broker = self.credential_broker.ok_or_else(|| {
            Error::CapabilityMissing {
                capability: "CredentialBroker".to_string(),
                message: "No credential broker implementation supplied. \
                          Inject the federation SDK adapter via .credential_broker()."
                    .to_string(),
            }
        })?;

        let object_store = self.object_store.ok_or_else(|| Error::CapabilityMissing {
            capability: "ObjectStore".to_string(),
            message: "No object store implementation supplied. \
                      Inject the storage SDK adapter via .object_store()."
                .to_string(),
        })?;

        let submission_endpoint = self
            .submission_endpoint
            .filter(|e| !e.is_empty())
            .ok_or_else(|| Error::Config("submission_endpoint is required".to_string()))?;

        let storage_scope = self
            .storage_scope
            .ok_or_else(|| Error::Config("storage_scope is required".to_string()))?;

        let page_prefix = self
            .page_prefix
            .ok_or_else(|| Error::Config("page_prefix is required".to_string()))?;

        Ok(ReaderConfig {
            identity_provider,
            credential_broker,
            object_store,
            http_client: self.http_client,
            submission_endpoint,
            storage_scope,
            page_prefix,
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        })
    }
}
