//! Credential Federation
//!
//! Exchanges an identity token for temporary, scoped storage credentials
//! via the host-provided [`CredentialBroker`]. The federator caches the
//! most recent grant and invalidates it unconditionally on sign-out so a
//! stale grant can never leak into a later session.

use crate::error::FederationError;
use crate::types::IdentityToken;
use bridge_traits::{BridgeError, CredentialBroker, StorageCredentials, StorageScope};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Federates identity tokens into storage credentials for one scope.
///
/// `federate` is idempotent under retry: calling it twice with the same
/// valid token simply replaces the cached grant. Failures are never retried
/// here; the caller decides whether to prompt re-authentication.
pub struct CredentialFederator {
    broker: Arc<dyn CredentialBroker>,
    scope: StorageScope,
    cached: RwLock<Option<StorageCredentials>>,
}

impl CredentialFederator {
    pub fn new(broker: Arc<dyn CredentialBroker>, scope: StorageScope) -> Self {
        Self {
            broker,
            scope,
            cached: RwLock::new(None),
        }
    }

    /// The scope this federator grants access to.
    pub fn scope(&self) -> &StorageScope {
        &self.scope
    }

    /// Exchanges `token` for storage credentials, replacing any cached grant.
    ///
    /// # Errors
    ///
    /// - `FederationError::Rejected`: the provider rejected the token
    ///   (expired or invalid)
    /// - `FederationError::Unreachable`: the federation endpoint could not
    ///   be reached
    #[instrument(skip(self, token), fields(bucket = %self.scope.bucket, region = %self.scope.region))]
    pub async fn federate(
        &self,
        token: &IdentityToken,
    ) -> Result<StorageCredentials, FederationError> {
        info!("Exchanging identity token for storage credentials");

        let credentials = self
            .broker
            .exchange(token.as_str(), &self.scope)
            .await
            .map_err(|e| {
                warn!(error = %e, "Credential federation failed");
                match e {
                    BridgeError::Rejected(reason) => FederationError::Rejected { reason },
                    BridgeError::Unreachable(reason) => FederationError::Unreachable { reason },
                    other => FederationError::Unreachable {
                        reason: other.to_string(),
                    },
                }
            })?;

        let mut cached = self.cached.write().await;
        *cached = Some(credentials.clone());

        info!(expires_at = %credentials.expires_at, "Storage credentials obtained");
        Ok(credentials)
    }

    /// Clears any cached credentials unconditionally.
    ///
    /// Must be called on sign-out; a no-op if nothing is cached, and safe
    /// to call repeatedly.
    pub async fn invalidate(&self) {
        let mut cached = self.cached.write().await;
        if cached.take().is_some() {
            info!("Cached storage credentials invalidated");
        } else {
            debug!("No cached credentials to invalidate");
        }
    }

    /// The most recently federated grant, if any.
    pub async fn cached(&self) -> Option<StorageCredentials> {
        self.cached.read().await.clone()
    }
}
