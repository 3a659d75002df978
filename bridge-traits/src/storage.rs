//! Cloud Storage Abstractions
//!
//! Two collaborators sit behind these traits: the credential federation
//! service that exchanges an identity token for temporary storage access,
//! and the object store the page assets are fetched from.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::fmt;

use crate::error::Result;

/// Temporary, scoped storage access grant.
///
/// Time-bounded and scoped to a single bucket/region. Must be discarded on
/// sign-out; a stale grant must never be reused for a different session.
///
/// # Security
///
/// The `Debug` implementation redacts key material.
#[derive(Clone, PartialEq, Eq)]
pub struct StorageCredentials {
    /// Access key identifier
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Session token bound to the federated identity
    pub session_token: String,
    /// When this grant expires (UTC)
    pub expires_at: DateTime<Utc>,
}

impl StorageCredentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: impl Into<String>,
        expires_in_secs: i64,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: session_token.into(),
            expires_at: Utc::now() + chrono::Duration::seconds(expires_in_secs),
        }
    }

    /// Check whether the grant has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_with_buffer(0)
    }

    /// Check expiry with a buffer, for callers that refresh ahead of time.
    pub fn is_expired_with_buffer(&self, buffer_seconds: i64) -> bool {
        Utc::now() >= self.expires_at - chrono::Duration::seconds(buffer_seconds)
    }
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("access_key_id", &"[REDACTED]")
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// The region/bucket/identity-pool a credential grant is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageScope {
    pub region: String,
    pub bucket: String,
    pub identity_pool: String,
}

impl StorageScope {
    pub fn new(
        region: impl Into<String>,
        bucket: impl Into<String>,
        identity_pool: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            bucket: bucket.into(),
            identity_pool: identity_pool.into(),
        }
    }
}

/// Credential federation service trait
///
/// Exchanges an identity token for temporary storage credentials scoped to
/// the given region/bucket/identity-pool.
///
/// # Errors
///
/// - `BridgeError::Rejected`: the provider rejected the token
///   (expired/invalid)
/// - `BridgeError::Unreachable`: the federation endpoint could not be
///   reached
#[async_trait]
pub trait CredentialBroker: Send + Sync {
    async fn exchange(
        &self,
        identity_token: &str,
        scope: &StorageScope,
    ) -> Result<StorageCredentials>;
}

/// Fetch options for a single object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetOptions {
    /// When true the object is fetched as downloadable content (decoded as
    /// data); when false as displayable content (consumed as a URL/blob).
    pub as_download: bool,
}

impl GetOptions {
    /// Options for a displayable asset (image).
    pub fn display() -> Self {
        Self { as_download: false }
    }

    /// Options for downloadable content (text).
    pub fn download() -> Self {
        Self { as_download: true }
    }
}

/// Object store trait: key → blob fetch authorized by federated credentials.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch a single object by key.
    ///
    /// # Errors
    ///
    /// Returns an error when the key does not exist, the credentials are
    /// not accepted, or the store is unreachable.
    async fn get(
        &self,
        credentials: &StorageCredentials,
        key: &str,
        options: GetOptions,
    ) -> Result<Bytes>;
}
