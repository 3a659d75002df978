use thiserror::Error;

/// Credential federation failure.
///
/// Neither variant is retried automatically; the caller decides whether to
/// prompt re-authentication.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FederationError {
    #[error("Federation provider rejected the identity token: {reason}")]
    Rejected { reason: String },

    #[error("Federation provider unreachable: {reason}")]
    Unreachable { reason: String },
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Identity provider sign-in failed: {reason}")]
    ProviderFailed { reason: String },

    #[error("Identity token retrieval failed: {reason}")]
    TokenRetrievalFailed { reason: String },

    #[error(transparent)]
    Federation(#[from] FederationError),

    #[error("Identity provider sign-out failed: {reason}")]
    SignOutFailed { reason: String },

    #[error("Sign-in already in progress")]
    SignInInProgress,

    #[error("Not authenticated")]
    NotAuthenticated,
}

pub type Result<T> = std::result::Result<T, AuthError>;
