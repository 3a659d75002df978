//! # Page Viewer
//!
//! Fetches page assets from the object store and tracks the currently
//! displayed page. Navigation is a thin layer over [`load_page`]: `next`
//! and `previous` move the cursor and reload.
//!
//! Each load fetches the page image and page text concurrently and
//! independently. A missing or failed image degrades to a placeholder
//! (`image: None`); missing or failed text degrades to
//! [`TEXT_UNAVAILABLE`]. Only credential problems abort a load outright.
//!
//! Rapid navigation can leave several loads in flight at once. Every load
//! stamps a generation counter; when it completes, the result is applied to
//! the shared content slot only if no newer load has started since. Stale
//! results are discarded without an error.
//!
//! [`load_page`]: PageViewer::load_page

use crate::cursor::PageCursor;
use crate::error::{AssetKind, FetchError, Result};
use bridge_traits::{GetOptions, ObjectStore, StorageCredentials};
use bytes::Bytes;
use core_auth::SessionHandle;
use core_runtime::events::{CoreEvent, EventBus, ViewerEvent};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument, warn};

/// Fallback shown when a page's text asset cannot be fetched.
pub const TEXT_UNAVAILABLE: &str = "Text not available";

/// A fully resolved page, possibly degraded per asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    /// Page index (1-based)
    pub index: u32,
    /// Rendered page image; `None` means show a placeholder
    pub image: Option<Bytes>,
    /// Extracted page text, or [`TEXT_UNAVAILABLE`]
    pub text: String,
}

impl PageContent {
    /// Whether the image asset was fetched successfully.
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Whether real text was fetched, as opposed to the fallback.
    pub fn has_text(&self) -> bool {
        self.text != TEXT_UNAVAILABLE
    }
}

/// Paginated viewer over page assets in an object store.
pub struct PageViewer {
    store: Arc<dyn ObjectStore>,
    session: SessionHandle,
    event_bus: EventBus,
    cursor: Mutex<PageCursor>,
    content: RwLock<Option<PageContent>>,
    /// Monotonic load stamp; only the newest load may publish its result.
    generation: AtomicU64,
}

impl PageViewer {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        session: SessionHandle,
        page_prefix: impl Into<String>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            store,
            session,
            event_bus,
            cursor: Mutex::new(PageCursor::new(page_prefix)),
            content: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// The most recently published page, if any load has completed.
    pub async fn current(&self) -> Option<PageContent> {
        self.content.read().await.clone()
    }

    /// Current cursor position (1-based).
    pub async fn current_index(&self) -> u32 {
        self.cursor.lock().await.index()
    }

    /// Loads an explicit page: moves the cursor, fetches both assets, and
    /// publishes the result unless a newer load superseded this one.
    ///
    /// The returned content reflects this load even when it was superseded;
    /// only the shared slot read by [`current`](Self::current) is protected
    /// from stale writes.
    ///
    /// # Errors
    ///
    /// - [`FetchError::CredentialsMissing`] - no federated credentials
    /// - [`FetchError::CredentialsExpired`] - credentials past expiry
    #[instrument(skip(self))]
    pub async fn load_page(&self, index: u32) -> Result<PageContent> {
        let credentials = self.require_credentials().await?;

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let (index, image_key, text_key) = {
            let mut cursor = self.cursor.lock().await;
            let index = cursor.seek(index);
            (index, cursor.image_key(), cursor.text_key())
        };
        let _ = self
            .event_bus
            .emit(CoreEvent::Viewer(ViewerEvent::PageChanged { index }));

        let (image, text) = tokio::join!(
            self.fetch_asset(&credentials, &image_key, AssetKind::Image),
            self.fetch_asset(&credentials, &text_key, AssetKind::Text),
        );

        let image = match image {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                self.report_asset_failure(index, AssetKind::Image, &e);
                None
            }
        };
        let text = match text {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                self.report_asset_failure(index, AssetKind::Text, &e);
                TEXT_UNAVAILABLE.to_string()
            }
        };

        let content = PageContent { index, image, text };

        if self.generation.load(Ordering::SeqCst) == generation {
            *self.content.write().await = Some(content.clone());
            let _ = self
                .event_bus
                .emit(CoreEvent::Viewer(ViewerEvent::PageLoaded {
                    index,
                    has_image: content.has_image(),
                    has_text: content.has_text(),
                }));
        } else {
            debug!(index, generation, "Discarding superseded page load");
        }

        Ok(content)
    }

    /// Advances one page and loads it.
    pub async fn next(&self) -> Result<PageContent> {
        let target = self.cursor.lock().await.advance();
        self.load_page(target).await
    }

    /// Moves back one page and loads it.
    ///
    /// On the first page this is a no-op: the current content is returned
    /// without refetching.
    pub async fn previous(&self) -> Result<PageContent> {
        let target = self.cursor.lock().await.retreat();
        match target {
            Some(index) => self.load_page(index).await,
            None => match self.current().await {
                Some(content) => Ok(content),
                // Nothing loaded yet; load the first page rather than
                // returning an empty view.
                None => self.load_page(PageCursor::FIRST_PAGE).await,
            },
        }
    }

    /// Resolves usable credentials from the session or fails the load.
    async fn require_credentials(&self) -> Result<StorageCredentials> {
        let credentials = self
            .session
            .credentials()
            .await
            .ok_or(FetchError::CredentialsMissing)?;
        if credentials.is_expired() {
            return Err(FetchError::CredentialsExpired);
        }
        Ok(credentials)
    }

    async fn fetch_asset(
        &self,
        credentials: &StorageCredentials,
        key: &str,
        asset: AssetKind,
    ) -> Result<Bytes> {
        let options = match asset {
            AssetKind::Image => GetOptions::display(),
            AssetKind::Text => GetOptions::download(),
        };
        self.store
            .get(credentials, key, options)
            .await
            .map_err(|e| FetchError::Fetch {
                asset,
                reason: e.to_string(),
            })
    }

    fn report_asset_failure(&self, index: u32, asset: AssetKind, error: &FetchError) {
        warn!(index, asset = asset.as_str(), error = %error, "Page asset fetch failed");
        let _ = self
            .event_bus
            .emit(CoreEvent::Viewer(ViewerEvent::PageFetchFailed {
                index,
                asset: asset.as_str().to_string(),
                cause: error.to_string(),
            }));
    }
}

impl std::fmt::Debug for PageViewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageViewer")
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish()
    }
}
