//! Shared Session Handle
//!
//! The session is an explicit value owned by one controller and passed by
//! handle to every component that needs it (auth manager, page viewer,
//! submission channel) rather than living in ambient global state. The
//! handle is the only mutator and upholds the invariant that credentials
//! are present only alongside an identity token. In practice only the
//! auth manager drives the mutators; readers use the snapshot accessors.

use crate::types::{AuthState, IdentityToken, Session, SessionId};
use bridge_traits::StorageCredentials;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Cloneable handle to the single mutable session slot.
///
/// All mutations happen through this handle; readers get consistent
/// snapshots. The slot is only ever mutated from the event-handling task,
/// so contention on the lock is incidental rather than structural.
#[derive(Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
}

impl SessionHandle {
    /// Creates a handle holding an empty, signed-out session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consistent snapshot of the whole session.
    pub async fn snapshot(&self) -> Session {
        self.inner.read().await.clone()
    }

    /// Current authentication state.
    pub async fn state(&self) -> AuthState {
        self.inner.read().await.state
    }

    /// Current identity token, if signed in.
    pub async fn identity_token(&self) -> Option<IdentityToken> {
        self.inner.read().await.identity_token.clone()
    }

    /// Current federated credentials, if any.
    pub async fn credentials(&self) -> Option<StorageCredentials> {
        self.inner.read().await.credentials.clone()
    }

    /// Name to show in the UI, if signed in.
    pub async fn display_name(&self) -> Option<String> {
        self.inner.read().await.display_name.clone()
    }

    /// Marks the start of an interactive sign-in flow.
    ///
    /// Returns `false` when a sign-in flow is already running; the state is
    /// left untouched in that case. Check and transition happen under one
    /// write lock, so exactly one of any concurrent callers wins.
    pub async fn begin_authenticating(&self) -> bool {
        let mut session = self.inner.write().await;
        if session.state.is_in_progress() {
            return false;
        }
        session.state = AuthState::Authenticating;
        true
    }

    /// Populates the session after a successful provider sign-in.
    pub async fn complete_sign_in(
        &self,
        session_id: SessionId,
        display_name: String,
        token: IdentityToken,
    ) {
        let mut session = self.inner.write().await;
        session.state = AuthState::SignedIn;
        session.session_id = Some(session_id);
        session.display_name = Some(display_name);
        session.identity_token = Some(token);
        debug!(session_id = %session_id, "Session populated");
    }

    /// Attaches federated credentials to the signed-in session.
    ///
    /// Dropped silently if no identity token is present; credentials must
    /// never outlive or precede the token they were derived from.
    pub async fn attach_credentials(&self, credentials: StorageCredentials) {
        let mut session = self.inner.write().await;
        if session.identity_token.is_some() {
            session.credentials = Some(credentials);
        } else {
            debug!("Discarding credentials attached to an empty session");
        }
    }

    /// Clears the whole session atomically: token, credentials, identity.
    ///
    /// Idempotent; clearing an empty session is a no-op.
    pub async fn clear(&self) -> Option<SessionId> {
        let mut session = self.inner.write().await;
        let previous = session.session_id;
        *session = Session::default();
        previous
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle").finish()
    }
}
