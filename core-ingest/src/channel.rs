//! # Submission Channel
//!
//! One authorized POST per submission. The endpoint expects the body as a
//! JSON string that itself contains the JSON encoding of
//! `{"message": "<url>"}`: the payload is encoded twice, and the ingest
//! side decodes twice. The double encoding is part of the wire contract and
//! must be preserved exactly.

use crate::error::{Result, SubmissionError};
use bridge_traits::{HttpClient, HttpMethod, HttpRequest};
use core_auth::SessionHandle;
use core_runtime::events::{CoreEvent, EventBus, SubmissionEvent};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Serialize)]
struct SubmissionBody<'a> {
    message: &'a str,
}

/// Opaque success acknowledgement from the ingest endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    /// HTTP status the endpoint answered with
    pub status: u16,
}

/// Submits user URLs to the ingest endpoint, authorized by the session's
/// identity token.
pub struct SubmissionChannel {
    http: Arc<dyn HttpClient>,
    session: SessionHandle,
    endpoint: String,
    event_bus: EventBus,
}

impl SubmissionChannel {
    pub fn new(
        http: Arc<dyn HttpClient>,
        session: SessionHandle,
        endpoint: impl Into<String>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            http,
            session,
            endpoint: endpoint.into(),
            event_bus,
        }
    }

    /// The configured ingest endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submits a URL with a single authorized POST.
    ///
    /// At-most-once: no retry and no idempotency key, so a retry after a
    /// transport failure can duplicate the submission on the server side.
    ///
    /// # Errors
    ///
    /// - [`SubmissionError::NotAuthenticated`] - no identity token; no
    ///   request was issued
    /// - [`SubmissionError::Transport`] - the request never completed
    /// - [`SubmissionError::Status`] - the endpoint answered non-2xx
    #[instrument(skip(self))]
    pub async fn submit(&self, url: &str) -> Result<Ack> {
        let token = self
            .session
            .identity_token()
            .await
            .ok_or(SubmissionError::NotAuthenticated)?;

        let inner =
            serde_json::to_string(&SubmissionBody { message: url }).map_err(|e| {
                SubmissionError::Encode {
                    reason: e.to_string(),
                }
            })?;

        // `json` serializes the inner string again, producing the
        // double-encoded body the ingest side expects.
        let request = HttpRequest::new(HttpMethod::Post, &self.endpoint)
            .bearer_token(token.as_str())
            .json(&inner)
            .map_err(|e| SubmissionError::Encode {
                reason: e.to_string(),
            })?;

        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(url, error = %e, "Submission transport failed");
                return self.fail(
                    url,
                    SubmissionError::Transport {
                        reason: e.to_string(),
                    },
                );
            }
        };

        if !response.is_success() {
            warn!(url, status = response.status, "Submission rejected");
            return self.fail(
                url,
                SubmissionError::Status {
                    status: response.status,
                },
            );
        }

        info!(url, status = response.status, "URL submitted");
        let _ = self
            .event_bus
            .emit(CoreEvent::Submission(SubmissionEvent::Submitted {
                url: url.to_string(),
            }));
        Ok(Ack {
            status: response.status,
        })
    }

    fn fail(&self, url: &str, error: SubmissionError) -> Result<Ack> {
        let _ = self
            .event_bus
            .emit(CoreEvent::Submission(SubmissionEvent::SubmissionFailed {
                url: url.to_string(),
                message: error.to_string(),
            }));
        Err(error)
    }
}

impl std::fmt::Debug for SubmissionChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionChannel")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::{HttpResponse, StorageCredentials};
    use bytes::Bytes;
    use core_auth::{IdentityToken, SessionId};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::Mutex;

    /// Records requests and answers with a scripted response.
    struct FakeHttp {
        status: u16,
        unreachable: bool,
        calls: AtomicU32,
        last_request: Mutex<Option<HttpRequest>>,
    }

    impl FakeHttp {
        fn ok() -> Self {
            Self {
                status: 200,
                unreachable: false,
                calls: AtomicU32::new(0),
                last_request: Mutex::new(None),
            }
        }

        fn with_status(status: u16) -> Self {
            Self {
                status,
                ..Self::ok()
            }
        }

        fn down() -> Self {
            Self {
                unreachable: true,
                ..Self::ok()
            }
        }
    }

    #[async_trait]
    impl HttpClient for FakeHttp {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().await = Some(request);
            if self.unreachable {
                return Err(BridgeError::Unreachable("connection refused".to_string()));
            }
            Ok(HttpResponse {
                status: self.status,
                headers: HashMap::new(),
                body: Bytes::from("ok"),
            })
        }
    }

    async fn signed_in_session() -> SessionHandle {
        let session = SessionHandle::new();
        session.begin_authenticating().await;
        session
            .complete_sign_in(
                SessionId::new(),
                "Ada".to_string(),
                IdentityToken::new("T1"),
            )
            .await;
        session
            .attach_credentials(StorageCredentials::new("AKIA", "secret", "session", 3600))
            .await;
        session
    }

    fn channel(http: Arc<FakeHttp>, session: SessionHandle) -> SubmissionChannel {
        SubmissionChannel::new(
            http,
            session,
            "https://ingest.example.com/submit",
            EventBus::new(100),
        )
    }

    #[tokio::test]
    async fn test_submit_sends_bearer_and_double_encoded_body() {
        let http = Arc::new(FakeHttp::ok());
        let ch = channel(http.clone(), signed_in_session().await);

        let ack = ch.submit("https://example.com/doc.pdf").await.unwrap();
        assert_eq!(ack.status, 200);

        let request = http.last_request.lock().await.clone().unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "https://ingest.example.com/submit");
        assert_eq!(
            request.headers.get("Authorization"),
            Some(&"Bearer T1".to_string())
        );
        assert_eq!(
            request.headers.get("Content-Type"),
            Some(&"application/json".to_string())
        );

        // The body decodes to a JSON string, which decodes to the payload.
        let body = request.body.unwrap();
        let outer: String = serde_json::from_slice(&body).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&outer).unwrap();
        assert_eq!(payload["message"], "https://example.com/doc.pdf");
    }

    #[tokio::test]
    async fn test_submit_without_token_issues_no_request() {
        let http = Arc::new(FakeHttp::ok());
        let ch = channel(http.clone(), SessionHandle::new());

        let err = ch.submit("https://example.com/doc.pdf").await.unwrap_err();
        assert_eq!(err, SubmissionError::NotAuthenticated);
        assert_eq!(http.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_is_distinguished() {
        let ch = channel(Arc::new(FakeHttp::down()), signed_in_session().await);

        let err = ch.submit("https://example.com/doc.pdf").await.unwrap_err();
        assert!(matches!(err, SubmissionError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let ch = channel(Arc::new(FakeHttp::with_status(403)), signed_in_session().await);

        let err = ch.submit("https://example.com/doc.pdf").await.unwrap_err();
        assert_eq!(err, SubmissionError::Status { status: 403 });
    }

    #[tokio::test]
    async fn test_submit_emits_events() {
        let event_bus = EventBus::new(100);
        let mut receiver = event_bus.subscribe();
        let ch = SubmissionChannel::new(
            Arc::new(FakeHttp::ok()),
            signed_in_session().await,
            "https://ingest.example.com/submit",
            event_bus,
        );

        ch.submit("https://example.com/doc.pdf").await.unwrap();

        assert!(matches!(
            receiver.try_recv().unwrap(),
            CoreEvent::Submission(SubmissionEvent::Submitted { .. })
        ));
    }
}
