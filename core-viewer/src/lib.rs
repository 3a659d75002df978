//! # Core Viewer
//!
//! Paginated document viewer over an object store. Each page is a pair of
//! assets (a rendered image and an extracted text body) stored under a
//! shared key prefix and fetched with the session's federated credentials.
//!
//! The viewer is resilient per asset: a failed image fetch leaves a
//! placeholder, a failed text fetch leaves fallback text, and the page still
//! renders. During rapid navigation only the most recent request is allowed
//! to land; responses from superseded requests are discarded.

pub mod cursor;
pub mod error;
pub mod viewer;

pub use cursor::PageCursor;
pub use error::{AssetKind, FetchError, Result};
pub use viewer::{PageContent, PageViewer, TEXT_UNAVAILABLE};
