//! The request/response primitive the wire client delegates to.
//!
//! [`Transport`] can be mocked in tests, avoiding actual network calls.

use std::time::Duration;

use chrono::{DateTime, Utc};
use http::header::{HeaderMap, CONTENT_TYPE, LAST_MODIFIED};
use http::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use url::Url;

use crate::error::TransportError;
use crate::types::{Document, Timestamp};

/// Performs requests against fully resolved storage addresses.
pub trait Transport: Send + Sync {
    /// Fetch the document at `url`. `Ok(None)` means there is none.
    fn get(&self, url: &str, token: Option<&str>) -> Result<Option<Document>, TransportError>;

    /// Store `body` at `url`, returning the server's modification time.
    fn set(
        &self,
        url: &str,
        body: &str,
        content_type: &str,
        token: Option<&str>,
    ) -> Result<Timestamp, TransportError>;

    /// Delete the document at `url`. Deleting a missing document succeeds.
    fn delete(&self, url: &str, token: Option<&str>) -> Result<Timestamp, TransportError>;
}

/// Production transport using a blocking reqwest client.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new transport with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Create with default timeout of 30 seconds.
    pub fn with_default_timeout() -> Result<Self, TransportError> {
        Self::new(Duration::from_secs(30))
    }

    fn request(
        &self,
        method: http::Method,
        url: &str,
        token: Option<&str>,
    ) -> Result<RequestBuilder, TransportError> {
        let url = Url::parse(url)?;
        let mut builder = self.client.request(method, url);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    fn unexpected(response: Response) -> TransportError {
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
        let message = match response.text() {
            Ok(body) if !body.is_empty() => format!("{} ({})", reason, body),
            _ => reason,
        };
        TransportError::with_status(status.as_u16(), message)
    }

    /// Modification time from `Last-Modified`, or now if the server sent none.
    fn timestamp(headers: &HeaderMap) -> Timestamp {
        headers
            .get(LAST_MODIFIED)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| DateTime::parse_from_rfc2822(value).ok())
            .map(|time| time.timestamp_millis())
            .unwrap_or_else(|| Utc::now().timestamp_millis())
    }
}

impl Transport for ReqwestTransport {
    fn get(&self, url: &str, token: Option<&str>) -> Result<Option<Document>, TransportError> {
        let response = self.request(http::Method::GET, url, token)?.send()?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let content_type = response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string);
                let body = response.text()?;
                Ok(Some(Document { body, content_type }))
            }
            _ => Err(Self::unexpected(response)),
        }
    }

    fn set(
        &self,
        url: &str,
        body: &str,
        content_type: &str,
        token: Option<&str>,
    ) -> Result<Timestamp, TransportError> {
        let response = self
            .request(http::Method::PUT, url, token)?
            .header(CONTENT_TYPE, content_type)
            .body(body.to_string())
            .send()?;

        if response.status().is_success() {
            Ok(Self::timestamp(response.headers()))
        } else {
            Err(Self::unexpected(response))
        }
    }

    fn delete(&self, url: &str, token: Option<&str>) -> Result<Timestamp, TransportError> {
        let response = self.request(http::Method::DELETE, url, token)?.send()?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(Self::timestamp(response.headers()))
        } else {
            Err(Self::unexpected(response))
        }
    }
}

/// Mock transport for testing.
///
/// Serves documents from an in-memory map keyed by URL and records every
/// request for verification.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// A request seen by [`MockTransport`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordedRequest {
        pub method: http::Method,
        pub url: String,
        pub token: Option<String>,
        pub body: Option<String>,
        pub content_type: Option<String>,
    }

    #[derive(Clone, Default)]
    pub struct MockTransport {
        /// Documents keyed by URL.
        documents: Arc<Mutex<HashMap<String, Document>>>,
        /// Recorded requests for verification.
        recorded_requests: Arc<Mutex<Vec<RecordedRequest>>>,
        /// Errors for specific URLs.
        failures: Arc<Mutex<HashMap<String, TransportError>>>,
        /// Error returned for every request, if set.
        fail_all: Arc<Mutex<Option<TransportError>>>,
        /// Last timestamp handed out; each write advances it by one.
        clock: Arc<Mutex<Timestamp>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Serve `document` for GET requests to `url`.
        pub fn with_document(self, url: impl Into<String>, document: Document) -> Self {
            self.documents.lock().unwrap().insert(url.into(), document);
            self
        }

        /// Fail requests to `url` with `error`.
        pub fn with_failure(self, url: impl Into<String>, error: TransportError) -> Self {
            self.failures.lock().unwrap().insert(url.into(), error);
            self
        }

        /// Configure to fail all requests with an error.
        pub fn fail_with(self, message: impl Into<String>) -> Self {
            *self.fail_all.lock().unwrap() = Some(TransportError::new(message));
            self
        }

        /// Start the write clock at `timestamp`.
        pub fn with_clock(self, timestamp: Timestamp) -> Self {
            *self.clock.lock().unwrap() = timestamp;
            self
        }

        pub fn document(&self, url: &str) -> Option<Document> {
            self.documents.lock().unwrap().get(url).cloned()
        }

        /// Get all recorded requests.
        pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
            self.recorded_requests.lock().unwrap().clone()
        }

        /// Clear recorded requests.
        pub fn clear_recorded(&self) {
            self.recorded_requests.lock().unwrap().clear();
        }

        fn record(
            &self,
            method: http::Method,
            url: &str,
            token: Option<&str>,
            body: Option<&str>,
            content_type: Option<&str>,
        ) -> Result<(), TransportError> {
            self.recorded_requests.lock().unwrap().push(RecordedRequest {
                method,
                url: url.to_string(),
                token: token.map(str::to_string),
                body: body.map(str::to_string),
                content_type: content_type.map(str::to_string),
            });

            if let Some(error) = self.fail_all.lock().unwrap().clone() {
                return Err(error);
            }
            match self.failures.lock().unwrap().get(url) {
                Some(error) => Err(error.clone()),
                None => Ok(()),
            }
        }

        fn advance_clock(&self) -> Timestamp {
            let mut clock = self.clock.lock().unwrap();
            *clock += 1;
            *clock
        }
    }

    impl Transport for MockTransport {
        fn get(&self, url: &str, token: Option<&str>) -> Result<Option<Document>, TransportError> {
            self.record(http::Method::GET, url, token, None, None)?;
            Ok(self.document(url))
        }

        fn set(
            &self,
            url: &str,
            body: &str,
            content_type: &str,
            token: Option<&str>,
        ) -> Result<Timestamp, TransportError> {
            self.record(
                http::Method::PUT,
                url,
                token,
                Some(body),
                Some(content_type),
            )?;
            self.documents
                .lock()
                .unwrap()
                .insert(url.to_string(), Document::new(body, Some(content_type)));
            Ok(self.advance_clock())
        }

        fn delete(&self, url: &str, token: Option<&str>) -> Result<Timestamp, TransportError> {
            self.record(http::Method::DELETE, url, token, None, None)?;
            self.documents.lock().unwrap().remove(url);
            Ok(self.advance_clock())
        }
    }
}
