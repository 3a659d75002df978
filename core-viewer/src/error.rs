//! Viewer error types.

use thiserror::Error;

/// Which half of a page a fetch was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// Rendered page image (`page-{n}.png`)
    Image,
    /// Extracted page text (`page-{n}.txt`)
    Text,
}

impl AssetKind {
    /// Stable lowercase name used in events and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Image => "image",
            AssetKind::Text => "text",
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from loading a page.
///
/// Credential problems are hard errors that abort the load before any
/// request is made. Per-asset fetch failures are soft: the viewer degrades
/// to a placeholder image or fallback text instead of surfacing them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No federated credentials in the session; the user must sign in.
    #[error("no storage credentials available, sign in first")]
    CredentialsMissing,

    /// Credentials are present but past their expiry.
    #[error("storage credentials have expired")]
    CredentialsExpired,

    /// An individual asset fetch failed.
    #[error("failed to fetch page {asset}: {reason}")]
    Fetch {
        /// Which asset failed
        asset: AssetKind,
        /// Underlying failure
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, FetchError>;
