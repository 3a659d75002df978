//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! Only the HTTP transport has a desktop default:
//! - `HttpClient` using `reqwest`
//!
//! Identity provider, credential broker, and object store adapters wrap
//! vendor SDKs and are injected by the embedding application.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::ReqwestHttpClient;
//!
//! let http_client = ReqwestHttpClient::new();
//! // Hand to the reader configuration.
//! ```

mod http;

pub use http::ReqwestHttpClient;
