//! # Authentication Module
//!
//! Session and credential lifecycle for the reader core.
//!
//! ## Overview
//!
//! This module owns the single in-memory session: who is signed in, their
//! identity token, and the federated storage credentials derived from it.
//! Sign-in runs as a linear async pipeline (interactive provider sign-in,
//! identity-token retrieval, credential federation) that short-circuits on
//! failure at each stage, leaving the session empty. Nothing is persisted
//! across process restarts; every start begins `SignedOut`.
//!
//! ## Features
//!
//! - Explicit `Session` value behind a shared [`SessionHandle`]
//! - Linear sign-in pipeline with short-circuit failure handling
//! - Credential federation with caching and unconditional invalidation
//! - Auth state event emission

pub mod error;
pub mod federation;
pub mod manager;
pub mod session;
pub mod types;

pub use error::{AuthError, FederationError, Result};
pub use federation::CredentialFederator;
pub use manager::AuthManager;
pub use session::SessionHandle;
pub use types::{AuthState, IdentityToken, Session, SessionId};
