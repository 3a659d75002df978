//! # Authentication Manager
//!
//! Orchestrates the sign-in/sign-out lifecycle against the identity
//! provider and the credential federator.
//!
//! ## Overview
//!
//! `AuthManager` runs sign-in as a linear async pipeline: interactive
//! provider sign-in, identity-token retrieval, credential federation. Each
//! stage short-circuits on failure and leaves the session empty, so a
//! failed sign-in never leaves a partial session behind. Failures are
//! logged and surfaced once; nothing is retried automatically, the user
//! re-triggers manually.
//!
//! ## Usage
//!
//! ```no_run
//! # use core_auth::{AuthManager, SessionHandle, CredentialFederator};
//! # use core_runtime::events::EventBus;
//! # use bridge_traits::{IdentityProvider, CredentialBroker, StorageScope};
//! # use std::sync::Arc;
//! # async fn example(
//! #     provider: Arc<dyn IdentityProvider>,
//! #     broker: Arc<dyn CredentialBroker>,
//! # ) -> core_auth::Result<()> {
//! let session = SessionHandle::new();
//! let federator = CredentialFederator::new(
//!     broker,
//!     StorageScope::new("us-west-2", "documents", "pool-id"),
//! );
//! let manager = AuthManager::new(provider, federator, session, EventBus::new(100));
//!
//! let session_id = manager.sign_in().await?;
//! // ... use the session ...
//! manager.sign_out().await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::federation::CredentialFederator;
use crate::session::SessionHandle;
use crate::types::{AuthState, IdentityToken, SessionId};
use bridge_traits::IdentityProvider;
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Orchestrates sign-in, credential federation, and sign-out.
pub struct AuthManager {
    /// Interactive identity provider
    provider: Arc<dyn IdentityProvider>,
    /// Token → storage credential exchange
    federator: CredentialFederator,
    /// Shared session slot
    session: SessionHandle,
    /// Event bus for auth state changes
    event_bus: EventBus,
}

impl AuthManager {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        federator: CredentialFederator,
        session: SessionHandle,
        event_bus: EventBus,
    ) -> Self {
        Self {
            provider,
            federator,
            session,
            event_bus,
        }
    }

    /// Handle to the shared session slot.
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Runs the interactive sign-in pipeline.
    ///
    /// Stages: provider sign-in → identity-token retrieval → credential
    /// federation. A failure at any stage clears the session (state returns
    /// to `SignedOut`) and is returned to the caller; nothing is retried.
    ///
    /// # Errors
    ///
    /// - [`AuthError::SignInInProgress`] - a sign-in flow is already running
    /// - [`AuthError::ProviderFailed`] - the popup was cancelled or denied
    /// - [`AuthError::TokenRetrievalFailed`] - the token round trip failed
    /// - [`AuthError::Federation`] - the credential exchange failed
    #[instrument(skip(self))]
    pub async fn sign_in(&self) -> Result<SessionId> {
        // The transition into Authenticating is atomic; of any concurrent
        // callers exactly one proceeds to the provider popup.
        if !self.session.begin_authenticating().await {
            warn!("Sign-in already in progress");
            return Err(AuthError::SignInInProgress);
        }

        info!("Starting interactive sign-in");
        let _ = self.event_bus.emit(CoreEvent::Auth(AuthEvent::SigningIn));

        let profile = match self.provider.sign_in().await {
            Ok(profile) => profile,
            Err(e) => {
                error!(error = %e, "Identity provider sign-in failed");
                return self
                    .fail_sign_in(AuthError::ProviderFailed {
                        reason: e.to_string(),
                    })
                    .await;
            }
        };

        // A second round trip to the provider; can fail independently.
        let token = match self.provider.identity_token().await {
            Ok(token) => IdentityToken::new(token),
            Err(e) => {
                error!(error = %e, "Identity token retrieval failed");
                return self
                    .fail_sign_in(AuthError::TokenRetrievalFailed {
                        reason: e.to_string(),
                    })
                    .await;
            }
        };

        let session_id = SessionId::new();
        let display_name = profile.label().to_string();
        self.session
            .complete_sign_in(session_id, display_name.clone(), token.clone())
            .await;

        let _ = self.event_bus.emit(CoreEvent::Auth(AuthEvent::SignedIn {
            session_id: session_id.to_string(),
            display_name,
        }));
        info!(session_id = %session_id, "Signed in, federating credentials");

        let credentials = match self.federator.federate(&token).await {
            Ok(credentials) => credentials,
            Err(e) => {
                error!(error = %e, "Credential federation failed during sign-in");
                self.federator.invalidate().await;
                let _ = self
                    .event_bus
                    .emit(CoreEvent::Auth(AuthEvent::FederationFailed {
                        message: e.to_string(),
                    }));
                self.session.clear().await;
                return Err(e.into());
            }
        };

        let expires_at = credentials.expires_at.timestamp();
        self.session.attach_credentials(credentials).await;

        let _ = self
            .event_bus
            .emit(CoreEvent::Auth(AuthEvent::CredentialsFederated {
                session_id: session_id.to_string(),
                expires_at,
            }));

        info!(session_id = %session_id, "Sign-in completed");
        Ok(session_id)
    }

    /// Signs out with the provider, then clears the local session.
    ///
    /// Idempotent when already signed out. If the provider-side sign-out
    /// fails, the local session is deliberately left untouched so the local
    /// "signed in" state never diverges silently from the provider's; the
    /// user retries manually. On success the session and any cached
    /// federated credentials are cleared unconditionally.
    ///
    /// # Errors
    ///
    /// - [`AuthError::SignOutFailed`] - the provider sign-out call failed
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<()> {
        if self.session.state().await == AuthState::SignedOut {
            info!("Already signed out");
            return Ok(());
        }

        if let Err(e) = self.provider.sign_out().await {
            error!(error = %e, "Provider sign-out failed, session left untouched");
            let _ = self
                .event_bus
                .emit(CoreEvent::Auth(AuthEvent::SignOutFailed {
                    message: e.to_string(),
                }));
            return Err(AuthError::SignOutFailed {
                reason: e.to_string(),
            });
        }

        let cleared = self.session.clear().await;
        self.federator.invalidate().await;

        let session_id = cleared.map(|id| id.to_string()).unwrap_or_default();
        let _ = self.event_bus.emit(CoreEvent::Auth(AuthEvent::SignedOut {
            session_id: session_id.clone(),
        }));

        info!(session_id = %session_id, "Sign-out completed");
        Ok(())
    }

    /// Re-federates storage credentials with the current identity token.
    ///
    /// For refreshing a grant that is about to expire. Unlike the sign-in
    /// pipeline, a failure here leaves the session untouched; the caller
    /// decides whether to prompt re-authentication.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NotAuthenticated`] - no identity token in the session
    /// - [`AuthError::Federation`] - the credential exchange failed
    #[instrument(skip(self))]
    pub async fn refresh_credentials(&self) -> Result<()> {
        let token = self
            .session
            .identity_token()
            .await
            .ok_or(AuthError::NotAuthenticated)?;

        match self.federator.federate(&token).await {
            Ok(credentials) => {
                let expires_at = credentials.expires_at.timestamp();
                self.session.attach_credentials(credentials).await;

                let session_id = self
                    .session
                    .snapshot()
                    .await
                    .session_id
                    .map(|id| id.to_string())
                    .unwrap_or_default();
                let _ = self
                    .event_bus
                    .emit(CoreEvent::Auth(AuthEvent::CredentialsFederated {
                        session_id,
                        expires_at,
                    }));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Credential refresh failed, session unchanged");
                let _ = self
                    .event_bus
                    .emit(CoreEvent::Auth(AuthEvent::FederationFailed {
                        message: e.to_string(),
                    }));
                Err(e.into())
            }
        }
    }

    /// Clears the session and any cached grant, and reports the failure.
    async fn fail_sign_in(&self, error: AuthError) -> Result<SessionId> {
        self.session.clear().await;
        self.federator.invalidate().await;
        let _ = self
            .event_bus
            .emit(CoreEvent::Auth(AuthEvent::SignInFailed {
                message: error.to_string(),
            }));
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{
        BridgeError, CredentialBroker, StorageCredentials, StorageScope, UserProfile,
    };
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    /// Scriptable identity provider: each stage can be made to fail.
    struct ScriptedProvider {
        fail_sign_in: AtomicBool,
        fail_token: AtomicBool,
        fail_sign_out: AtomicBool,
        sign_out_calls: AtomicU32,
    }

    impl ScriptedProvider {
        fn happy() -> Self {
            Self {
                fail_sign_in: AtomicBool::new(false),
                fail_token: AtomicBool::new(false),
                fail_sign_out: AtomicBool::new(false),
                sign_out_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for ScriptedProvider {
        async fn sign_in(&self) -> BridgeResult<UserProfile> {
            if self.fail_sign_in.load(Ordering::SeqCst) {
                return Err(BridgeError::OperationFailed("popup closed".to_string()));
            }
            Ok(UserProfile {
                display_name: Some("Ada".to_string()),
                email: "ada@example.com".to_string(),
            })
        }

        async fn identity_token(&self) -> BridgeResult<String> {
            if self.fail_token.load(Ordering::SeqCst) {
                return Err(BridgeError::OperationFailed("token fetch failed".to_string()));
            }
            Ok("T1".to_string())
        }

        async fn sign_out(&self) -> BridgeResult<()> {
            self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_sign_out.load(Ordering::SeqCst) {
                return Err(BridgeError::Unreachable("provider offline".to_string()));
            }
            Ok(())
        }
    }

    struct StubBroker {
        reject: bool,
    }

    #[async_trait]
    impl CredentialBroker for StubBroker {
        async fn exchange(
            &self,
            _identity_token: &str,
            _scope: &StorageScope,
        ) -> BridgeResult<StorageCredentials> {
            if self.reject {
                return Err(BridgeError::Rejected("token invalid".to_string()));
            }
            Ok(StorageCredentials::new("C1", "secret", "session", 3600))
        }
    }

    fn manager_with(provider: ScriptedProvider, broker: StubBroker) -> AuthManager {
        let federator = CredentialFederator::new(
            Arc::new(broker),
            StorageScope::new("us-west-2", "documents", "pool-id"),
        );
        AuthManager::new(
            Arc::new(provider),
            federator,
            SessionHandle::new(),
            EventBus::new(100),
        )
    }

    #[tokio::test]
    async fn test_sign_in_populates_token_and_credentials() {
        let manager = manager_with(ScriptedProvider::happy(), StubBroker { reject: false });

        manager.sign_in().await.unwrap();

        let session = manager.session().snapshot().await;
        assert_eq!(session.state, AuthState::SignedIn);
        assert!(session.identity_token.is_some());
        assert!(session.credentials.is_some());
        assert_eq!(session.display_name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn test_provider_failure_leaves_session_empty() {
        let provider = ScriptedProvider::happy();
        provider.fail_sign_in.store(true, Ordering::SeqCst);
        let manager = manager_with(provider, StubBroker { reject: false });

        let err = manager.sign_in().await.unwrap_err();
        assert!(matches!(err, AuthError::ProviderFailed { .. }));

        let session = manager.session().snapshot().await;
        assert_eq!(session.state, AuthState::SignedOut);
        assert!(session.identity_token.is_none());
        assert!(session.credentials.is_none());
    }

    #[tokio::test]
    async fn test_token_failure_leaves_session_empty() {
        let provider = ScriptedProvider::happy();
        provider.fail_token.store(true, Ordering::SeqCst);
        let manager = manager_with(provider, StubBroker { reject: false });

        let err = manager.sign_in().await.unwrap_err();
        assert!(matches!(err, AuthError::TokenRetrievalFailed { .. }));
        assert!(manager.session().identity_token().await.is_none());
    }

    #[tokio::test]
    async fn test_federation_failure_leaves_session_empty() {
        let manager = manager_with(ScriptedProvider::happy(), StubBroker { reject: true });

        let err = manager.sign_in().await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::Federation(crate::error::FederationError::Rejected { .. })
        ));

        let session = manager.session().snapshot().await;
        assert_eq!(session.state, AuthState::SignedOut);
        assert!(session.identity_token.is_none());
        assert!(session.credentials.is_none());
    }

    #[tokio::test]
    async fn test_sign_out_clears_everything() {
        let manager = manager_with(ScriptedProvider::happy(), StubBroker { reject: false });
        manager.sign_in().await.unwrap();

        manager.sign_out().await.unwrap();

        let session = manager.session().snapshot().await;
        assert_eq!(session.state, AuthState::SignedOut);
        assert!(session.identity_token.is_none());
        assert!(session.credentials.is_none());
    }

    #[tokio::test]
    async fn test_sign_out_when_signed_out_is_noop() {
        let provider = Arc::new(ScriptedProvider::happy());
        let federator = CredentialFederator::new(
            Arc::new(StubBroker { reject: false }),
            StorageScope::new("us-west-2", "documents", "pool-id"),
        );
        let manager = AuthManager::new(
            provider.clone(),
            federator,
            SessionHandle::new(),
            EventBus::new(100),
        );

        manager.sign_out().await.unwrap();

        // The provider must not be called when there is nothing to clear.
        assert_eq!(provider.sign_out_calls.load(Ordering::SeqCst), 0);
        assert_eq!(manager.session().state().await, AuthState::SignedOut);
    }

    #[tokio::test]
    async fn test_sign_out_failure_keeps_session() {
        let provider = ScriptedProvider::happy();
        let manager = manager_with(provider, StubBroker { reject: false });
        manager.sign_in().await.unwrap();

        // Flip the provider into failure mode after sign-in.
        // (ScriptedProvider is behind an Arc; reach it through the manager.)
        let session_before = manager.session().snapshot().await;
        assert_eq!(session_before.state, AuthState::SignedIn);

        // Rebuild a manager sharing the session but with a failing provider.
        let failing = ScriptedProvider::happy();
        failing.fail_sign_out.store(true, Ordering::SeqCst);
        let federator = CredentialFederator::new(
            Arc::new(StubBroker { reject: false }),
            StorageScope::new("us-west-2", "documents", "pool-id"),
        );
        let manager2 = AuthManager::new(
            Arc::new(failing),
            federator,
            manager.session().clone(),
            EventBus::new(100),
        );

        let err = manager2.sign_out().await.unwrap_err();
        assert!(matches!(err, AuthError::SignOutFailed { .. }));

        // Local session deliberately untouched on provider failure.
        let session = manager2.session().snapshot().await;
        assert_eq!(session.state, AuthState::SignedIn);
        assert!(session.identity_token.is_some());
        assert!(session.credentials.is_some());
    }

    #[tokio::test]
    async fn test_refresh_credentials_requires_token() {
        let manager = manager_with(ScriptedProvider::happy(), StubBroker { reject: false });

        let err = manager.refresh_credentials().await.unwrap_err();
        assert!(matches!(err, AuthError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_session() {
        let manager = manager_with(ScriptedProvider::happy(), StubBroker { reject: false });
        manager.sign_in().await.unwrap();

        // Swap in a rejecting broker but keep the session.
        let federator = CredentialFederator::new(
            Arc::new(StubBroker { reject: true }),
            StorageScope::new("us-west-2", "documents", "pool-id"),
        );
        let manager2 = AuthManager::new(
            manager.provider.clone(),
            federator,
            manager.session().clone(),
            EventBus::new(100),
        );

        let err = manager2.refresh_credentials().await.unwrap_err();
        assert!(matches!(err, AuthError::Federation(_)));

        let session = manager2.session().snapshot().await;
        assert_eq!(session.state, AuthState::SignedIn);
        assert!(session.credentials.is_some());
    }

    /// Provider whose interactive flow stays suspended until released.
    struct GatedProvider {
        gate: tokio::sync::Notify,
        sign_in_calls: AtomicU32,
    }

    impl GatedProvider {
        fn new() -> Self {
            Self {
                gate: tokio::sync::Notify::new(),
                sign_in_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for GatedProvider {
        async fn sign_in(&self) -> BridgeResult<UserProfile> {
            self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            Ok(UserProfile {
                display_name: Some("Ada".to_string()),
                email: "ada@example.com".to_string(),
            })
        }

        async fn identity_token(&self) -> BridgeResult<String> {
            Ok("T1".to_string())
        }

        async fn sign_out(&self) -> BridgeResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_concurrent_sign_in_rejected() {
        let provider = Arc::new(GatedProvider::new());
        let federator = CredentialFederator::new(
            Arc::new(StubBroker { reject: false }),
            StorageScope::new("us-west-2", "documents", "pool-id"),
        );
        let manager = Arc::new(AuthManager::new(
            provider.clone(),
            federator,
            SessionHandle::new(),
            EventBus::new(100),
        ));

        // First sign-in enters the provider flow and parks on the gate.
        let first = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.sign_in().await })
        };
        tokio::task::yield_now().await;
        assert_eq!(provider.sign_in_calls.load(Ordering::SeqCst), 1);

        // A second attempt while the first is suspended is rejected without
        // reaching the provider.
        let err = manager.sign_in().await.unwrap_err();
        assert!(matches!(err, AuthError::SignInInProgress));
        assert_eq!(provider.sign_in_calls.load(Ordering::SeqCst), 1);

        // Releasing the gate lets the first attempt complete normally.
        provider.gate.notify_one();
        first.await.unwrap().unwrap();
        assert_eq!(manager.session().state().await, AuthState::SignedIn);
    }

    #[tokio::test]
    async fn test_failed_re_sign_in_clears_cached_credentials() {
        let provider = Arc::new(ScriptedProvider::happy());
        let federator = CredentialFederator::new(
            Arc::new(StubBroker { reject: false }),
            StorageScope::new("us-west-2", "documents", "pool-id"),
        );
        let manager = AuthManager::new(
            provider.clone(),
            federator,
            SessionHandle::new(),
            EventBus::new(100),
        );

        manager.sign_in().await.unwrap();
        assert!(manager.federator.cached().await.is_some());

        provider.fail_sign_in.store(true, Ordering::SeqCst);
        let err = manager.sign_in().await.unwrap_err();
        assert!(matches!(err, AuthError::ProviderFailed { .. }));

        // The cached grant must not outlive the session it belonged to.
        assert!(manager.federator.cached().await.is_none());
        assert_eq!(manager.session().state().await, AuthState::SignedOut);
    }

    #[tokio::test]
    async fn test_sign_in_events_emitted_in_order() {
        let event_bus = EventBus::new(100);
        let mut receiver = event_bus.subscribe();

        let federator = CredentialFederator::new(
            Arc::new(StubBroker { reject: false }),
            StorageScope::new("us-west-2", "documents", "pool-id"),
        );
        let manager = AuthManager::new(
            Arc::new(ScriptedProvider::happy()),
            federator,
            SessionHandle::new(),
            event_bus,
        );

        manager.sign_in().await.unwrap();

        assert!(matches!(
            receiver.try_recv().unwrap(),
            CoreEvent::Auth(AuthEvent::SigningIn)
        ));
        assert!(matches!(
            receiver.try_recv().unwrap(),
            CoreEvent::Auth(AuthEvent::SignedIn { .. })
        ));
        assert!(matches!(
            receiver.try_recv().unwrap(),
            CoreEvent::Auth(AuthEvent::CredentialsFederated { .. })
        ));
    }
}
