//! Identity Provider Abstraction
//!
//! Wraps the third-party interactive sign-in flow. The popup/redirect
//! mechanics belong to the host SDK; the core only sees the outcome: a user
//! profile and an identity token, or a provider error with a human-readable
//! message.

use async_trait::async_trait;

use crate::error::Result;

/// Profile of an authenticated user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Display name chosen by the user, if the provider supplies one
    pub display_name: Option<String>,
    /// Primary email address
    pub email: String,
}

impl UserProfile {
    /// Name to show in the UI: the display name, falling back to the email.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

/// Interactive identity provider trait
///
/// `sign_in` runs the provider's interactive flow and resolves once the user
/// completes or abandons it. `identity_token` may be a second round trip to
/// the provider and can fail independently of a successful sign-in.
///
/// Implementations must not cache sign-in results across `sign_out` calls.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Run the interactive sign-in flow.
    ///
    /// # Errors
    ///
    /// Returns an error when the user cancels the flow or the provider
    /// denies the request.
    async fn sign_in(&self) -> Result<UserProfile>;

    /// Retrieve the current identity token for the signed-in user.
    async fn identity_token(&self) -> Result<String>;

    /// Terminate the provider-side session.
    async fn sign_out(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;

    mock! {
        Provider {}

        #[async_trait]
        impl IdentityProvider for Provider {
            async fn sign_in(&self) -> Result<UserProfile>;
            async fn identity_token(&self) -> Result<String>;
            async fn sign_out(&self) -> Result<()>;
        }
    }

    // Guards object safety: the core always holds providers as trait objects.
    #[tokio::test]
    async fn test_provider_usable_as_trait_object() {
        let mut provider = MockProvider::new();
        provider.expect_identity_token().times(1).returning(|| Ok("T1".to_string()));

        let provider: std::sync::Arc<dyn IdentityProvider> = std::sync::Arc::new(provider);
        assert_eq!(provider.identity_token().await.unwrap(), "T1");
    }

    #[test]
    fn test_label_prefers_display_name() {
        let profile = UserProfile {
            display_name: Some("Ada".to_string()),
            email: "ada@example.com".to_string(),
        };
        assert_eq!(profile.label(), "Ada");
    }

    #[test]
    fn test_label_falls_back_to_email() {
        let profile = UserProfile {
            display_name: None,
            email: "ada@example.com".to_string(),
        };
        assert_eq!(profile.label(), "ada@example.com");
    }
}
