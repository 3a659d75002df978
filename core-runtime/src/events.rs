//! # Event Bus System
//!
//! Event-driven notification layer built on `tokio::sync::broadcast`. The
//! reader core emits typed events for every state transition so a UI layer
//! can subscribe instead of being called back directly.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, CoreEvent, AuthEvent};
//!
//! let event_bus = EventBus::new(100);
//! let mut subscriber = event_bus.subscribe();
//!
//! let event = CoreEvent::Auth(AuthEvent::SignedIn {
//!     session_id: "session-123".to_string(),
//!     display_name: "Ada".to_string(),
//! });
//! event_bus.emit(event).ok();
//! ```
//!
//! ## Error Handling
//!
//! `tokio::sync::broadcast` produces two receive errors:
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events. Non-fatal;
//!   the subscriber keeps receiving new events.
//! - **`RecvError::Closed`**: all senders dropped; treat as shutdown.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Authentication and credential lifecycle events
    Auth(AuthEvent),
    /// Page viewer events
    Viewer(ViewerEvent),
    /// URL submission events
    Submission(SubmissionEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Auth(e) => e.description(),
            CoreEvent::Viewer(e) => e.description(),
            CoreEvent::Submission(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Auth(AuthEvent::SignInFailed { .. }) => EventSeverity::Error,
            CoreEvent::Auth(AuthEvent::FederationFailed { .. }) => EventSeverity::Error,
            CoreEvent::Auth(AuthEvent::SignOutFailed { .. }) => EventSeverity::Error,
            CoreEvent::Submission(SubmissionEvent::SubmissionFailed { .. }) => EventSeverity::Error,
            CoreEvent::Viewer(ViewerEvent::PageFetchFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Auth(AuthEvent::SignedIn { .. }) => EventSeverity::Info,
            CoreEvent::Auth(AuthEvent::SignedOut { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Authentication Events
// ============================================================================

/// Events covering interactive sign-in, credential federation, and sign-out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AuthEvent {
    /// Interactive sign-in flow started.
    SigningIn,
    /// User successfully authenticated with the identity provider.
    SignedIn {
        /// Identifier of the newly created session.
        session_id: String,
        /// Name to show in the UI (display name or email).
        display_name: String,
    },
    /// Sign-in flow failed; the session remains empty.
    SignInFailed {
        /// Human-readable error message.
        message: String,
    },
    /// Identity token exchanged for scoped storage credentials.
    CredentialsFederated {
        /// The session that now holds credentials.
        session_id: String,
        /// When the credentials expire (Unix epoch seconds).
        expires_at: i64,
    },
    /// Credential federation failed. The caller decides whether to prompt
    /// re-authentication; no automatic retry occurs.
    FederationFailed {
        /// Human-readable error message.
        message: String,
    },
    /// User signed out; session and credentials cleared.
    SignedOut {
        /// Identifier of the session that was cleared.
        session_id: String,
    },
    /// Provider-side sign-out failed; local session left untouched.
    SignOutFailed {
        /// Human-readable error message.
        message: String,
    },
}

impl AuthEvent {
    fn description(&self) -> &str {
        match self {
            AuthEvent::SigningIn => "Sign-in in progress",
            AuthEvent::SignedIn { .. } => "User signed in successfully",
            AuthEvent::SignInFailed { .. } => "Sign-in failed",
            AuthEvent::CredentialsFederated { .. } => "Storage credentials obtained",
            AuthEvent::FederationFailed { .. } => "Credential federation failed",
            AuthEvent::SignedOut { .. } => "User signed out",
            AuthEvent::SignOutFailed { .. } => "Sign-out failed",
        }
    }
}

// ============================================================================
// Viewer Events
// ============================================================================

/// Events emitted by the page viewer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum ViewerEvent {
    /// The current page index changed.
    PageChanged {
        /// New page index (1-based).
        index: u32,
    },
    /// A page finished loading and was applied to the viewer.
    PageLoaded {
        /// Page index (1-based).
        index: u32,
        /// Whether the page image was fetched successfully.
        has_image: bool,
        /// Whether the page text was fetched successfully.
        has_text: bool,
    },
    /// A single asset fetch failed; the page still renders with a
    /// placeholder image or fallback text.
    PageFetchFailed {
        /// Page index (1-based).
        index: u32,
        /// Which asset failed ("image" or "text").
        asset: String,
        /// Failure cause.
        cause: String,
    },
}

impl ViewerEvent {
    fn description(&self) -> &str {
        match self {
            ViewerEvent::PageChanged { .. } => "Page index changed",
            ViewerEvent::PageLoaded { .. } => "Page loaded",
            ViewerEvent::PageFetchFailed { .. } => "Page asset fetch failed",
        }
    }
}

// ============================================================================
// Submission Events
// ============================================================================

/// Events emitted by the URL submission channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SubmissionEvent {
    /// A URL was accepted by the submission endpoint.
    Submitted {
        /// The submitted URL.
        url: String,
    },
    /// A submission attempt failed.
    SubmissionFailed {
        /// The URL that failed to submit.
        url: String,
        /// Human-readable error message.
        message: String,
    },
}

impl SubmissionEvent {
    fn description(&self) -> &str {
        match self {
            SubmissionEvent::Submitted { .. } => "URL submitted",
            SubmissionEvent::SubmissionFailed { .. } => "URL submission failed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (events are cloned for each subscriber)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// Subscribers that fall behind by more than `capacity` events receive
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Creates a new event bus with the default buffer size.
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Each call creates an independent receiver that will receive all
    /// future events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{EventBus, EventStream, CoreEvent};
///
/// let event_bus = EventBus::new(100);
/// let auth_stream = EventStream::new(event_bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Auth(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Adds a filter function; only matching events are returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n`
    /// events, or `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;

            let Some(filter) = &self.filter else {
                return Ok(event);
            };

            if filter(&event) {
                return Ok(event);
            }
        }
    }
}
