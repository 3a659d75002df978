//! Reader service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (identity provider,
//! credential broker, object store, HTTP transport) into the reader core:
//! one session handle shared by the auth manager, the page viewer, and the
//! submission channel, plus a single event bus the host UI subscribes to.
//! Desktop apps typically enable the `desktop-shims` feature (which depends
//! on `bridge-desktop`) to get a default HTTP transport.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::http::HttpClient;
use core_auth::{AuthManager, CredentialFederator, SessionHandle, SessionId};
use core_ingest::{Ack, SubmissionChannel};
use core_runtime::config::ReaderConfig;
use core_runtime::events::{CoreEvent, EventBus};
use core_viewer::{PageContent, PageViewer};
use tracing::info;

/// Primary façade exposed to host applications.
///
/// Owns the session and wires every component to it. All operations are
/// exposed here so hosts hold a single handle; the underlying components
/// are reachable through accessors for finer-grained control.
#[derive(Clone)]
pub struct ReaderService {
    session: SessionHandle,
    event_bus: EventBus,
    auth: Arc<AuthManager>,
    viewer: Arc<PageViewer>,
    submissions: Arc<SubmissionChannel>,
}

impl ReaderService {
    /// Builds the service from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CapabilityMissing`] when no HTTP client was
    /// configured and no platform default is available.
    pub fn new(config: ReaderConfig) -> Result<Self> {
        let http_client = resolve_http_client(config.http_client)?;

        let event_bus = EventBus::new(config.event_buffer_size);
        let session = SessionHandle::new();

        let federator =
            CredentialFederator::new(config.credential_broker, config.storage_scope);
        let auth = Arc::new(AuthManager::new(
            config.identity_provider,
            federator,
            session.clone(),
            event_bus.clone(),
        ));
        let viewer = Arc::new(PageViewer::new(
            config.object_store,
            session.clone(),
            config.page_prefix,
            event_bus.clone(),
        ));
        let submissions = Arc::new(SubmissionChannel::new(
            http_client,
            session.clone(),
            config.submission_endpoint,
            event_bus.clone(),
        ));

        info!("Reader service initialized");
        Ok(Self {
            session,
            event_bus,
            auth,
            viewer,
            submissions,
        })
    }

    /// Runs the interactive sign-in pipeline.
    pub async fn sign_in(&self) -> Result<SessionId> {
        Ok(self.auth.sign_in().await?)
    }

    /// Signs out and clears the session.
    pub async fn sign_out(&self) -> Result<()> {
        Ok(self.auth.sign_out().await?)
    }

    /// Loads an explicit page.
    pub async fn load_page(&self, index: u32) -> Result<PageContent> {
        Ok(self.viewer.load_page(index).await?)
    }

    /// Advances one page and loads it.
    pub async fn next_page(&self) -> Result<PageContent> {
        Ok(self.viewer.next().await?)
    }

    /// Moves back one page and loads it.
    pub async fn previous_page(&self) -> Result<PageContent> {
        Ok(self.viewer.previous().await?)
    }

    /// Submits a document URL to the ingest endpoint.
    pub async fn submit_url(&self, url: &str) -> Result<Ack> {
        Ok(self.submissions.submit(url).await?)
    }

    /// Subscribes to core events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<CoreEvent> {
        self.event_bus.subscribe()
    }

    /// The shared session handle.
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// The auth manager, for credential refresh and session inspection.
    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    /// The page viewer.
    pub fn viewer(&self) -> &PageViewer {
        &self.viewer
    }

    /// The submission channel.
    pub fn submissions(&self) -> &SubmissionChannel {
        &self.submissions
    }
}

/// Picks the configured HTTP client or falls back to the platform default.
fn resolve_http_client(
    configured: Option<Arc<dyn HttpClient>>,
) -> Result<Arc<dyn HttpClient>> {
    if let Some(client) = configured {
        return Ok(client);
    }

    #[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
    {
        let client = bridge_desktop::ReqwestHttpClient::new()
            .map_err(|e| CoreError::InitializationFailed(e.to_string()))?;
        Ok(Arc::new(client))
    }

    #[cfg(not(all(feature = "desktop-shims", not(target_arch = "wasm32"))))]
    {
        Err(CoreError::CapabilityMissing {
            capability: "HttpClient".to_string(),
            message: "No HTTP client supplied and no platform default available. \
                      Inject one via ReaderConfig::builder().http_client(...)."
                .to_string(),
        })
    }
}
