use bridge_traits::StorageCredentials;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for one authenticated session.
///
/// A new ID is minted on each successful sign-in; it ties log lines and
/// events to a specific sign-in/sign-out span.
///
/// # Examples
///
/// ```
/// use core_auth::SessionId;
///
/// let id = SessionId::new();
/// let parsed = SessionId::from_string(&id.to_string()).unwrap();
/// assert_eq!(id, parsed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a session ID from a string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identity token issued by the identity provider.
///
/// # Security
///
/// The token asserts the user's identity and must never be logged; the
/// `Debug` implementation redacts it.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityToken(String);

impl IdentityToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token value, for `Authorization: Bearer` headers and federation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for IdentityToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl fmt::Debug for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IdentityToken").field(&"[REDACTED]").finish()
    }
}

/// Authentication state of the session.
///
/// # State Transitions
///
/// ```text
/// SignedOut --sign_in--> Authenticating --success--> SignedIn
///     ^                        |                        |
///     |<-------failure---------+                        |
///     +<----------------sign_out (success)--------------+
/// ```
///
/// A failed sign-out leaves the state at `SignedIn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AuthState {
    /// No user is authenticated
    #[default]
    SignedOut,
    /// Interactive sign-in flow is in progress
    Authenticating,
    /// A user is authenticated
    SignedIn,
}

impl AuthState {
    /// Check if a user is authenticated
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::SignedIn)
    }

    /// Check if a sign-in flow is in progress
    pub fn is_in_progress(&self) -> bool {
        matches!(self, AuthState::Authenticating)
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthState::SignedOut => write!(f, "Signed Out"),
            AuthState::Authenticating => write!(f, "Signing In..."),
            AuthState::SignedIn => write!(f, "Signed In"),
        }
    }
}

/// The single in-memory session slot.
///
/// # Invariant
///
/// `credentials` is present only if `identity_token` is present. Both are
/// cleared atomically on sign-out. [`crate::SessionHandle`] is the only
/// mutator and upholds the invariant.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Current authentication state
    pub state: AuthState,
    /// Identifier of the active session, set on successful sign-in
    pub session_id: Option<SessionId>,
    /// Name to show in the UI (display name or email)
    pub display_name: Option<String>,
    /// Identity token from the provider
    pub identity_token: Option<IdentityToken>,
    /// Federated storage credentials derived from the token
    pub credentials: Option<StorageCredentials>,
}

impl Session {
    /// Check the credentials-require-token invariant.
    pub fn is_consistent(&self) -> bool {
        self.credentials.is_none() || self.identity_token.is_some()
    }
}
