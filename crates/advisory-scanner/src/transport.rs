//! Registry transport abstraction for testability.
//!
//! The [`RegistryTransport`] trait abstracts the bulk advisory HTTP endpoint,
//! allowing production code to use [`HttpRegistryTransport`] while tests use
//! `MockRegistryTransport`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │ AdvisoryQueryClient │
//! └─────────┬───────────┘
//!           │
//!           ▼
//!  ┌──────────────────┐
//!  │ RegistryTransport │ (trait)
//!  └──────────────────┘
//!       │        │
//!       ▼        ▼
//!   ┌──────┐ ┌──────┐
//!   │ Http │ │ Mock │
//!   └──┬───┘ └──────┘
//!      │
//!      ▼
//!  POST {registry}/-/npm/v1/security/advisories/bulk
//! ```
//!
//! # Wire Protocol
//!
//! The request body is a gzip-compressed JSON object mapping package name to
//! an array of requested version strings. Headers sent on every request:
//! `Content-Type: application/json`, `Content-Encoding: gzip`,
//! `Accept: application/json`, plus a descriptive `User-Agent`.
//! Non-2xx responses are reported as [`AdvisoryScannerError::Status`] and are
//! eligible for retry; response body decoding happens in the caller.

use std::future::Future;

use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_ENCODING, CONTENT_TYPE};

use crate::config::AdvisoryScannerConfig;
use crate::error::AdvisoryScannerError;

/// Path of the bulk advisory endpoint, relative to the registry base URL.
pub const BULK_ADVISORY_PATH: &str = "/-/npm/v1/security/advisories/bulk";

/// Trait abstracting delivery of one bulk advisory request.
///
/// All registry round trips go through this trait, enabling testability via
/// mocking. The trait is `Send + Sync + 'static`, allowing safe sharing
/// across async contexts.
///
/// # Implementations
///
/// - [`HttpRegistryTransport`]: Production implementation using `reqwest`
/// - `MockRegistryTransport`: Test implementation with scripted responses
///   (available in unit tests only; integration tests define their own)
pub trait RegistryTransport: Send + Sync + 'static {
    /// Sends one gzip-compressed bulk query and returns the raw response body.
    ///
    /// # Errors
    ///
    /// - `AdvisoryScannerError::Transport`: connection failure or timeout
    /// - `AdvisoryScannerError::Status`: non-2xx response status
    fn post_bulk(
        &self,
        gzip_body: Vec<u8>,
    ) -> impl Future<Output = Result<Bytes, AdvisoryScannerError>> + Send;
}

/// Production transport implementation using `reqwest`.
///
/// The client is built once with the per-attempt timeout and a descriptive
/// user agent; individual attempts share the same connection pool.
pub struct HttpRegistryTransport {
    http: reqwest::Client,
    bulk_url: String,
}

impl HttpRegistryTransport {
    /// Builds the HTTP transport from scanner configuration.
    ///
    /// # Errors
    ///
    /// Returns `AdvisoryScannerError::Transport` if the underlying HTTP
    /// client cannot be constructed.
    pub fn new(config: &AdvisoryScannerConfig) -> Result<Self, AdvisoryScannerError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(format!("lockgate/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AdvisoryScannerError::Transport(e.to_string()))?;

        let bulk_url = format!(
            "{}{}",
            config.registry_url.trim_end_matches('/'),
            BULK_ADVISORY_PATH,
        );

        Ok(Self { http, bulk_url })
    }

    /// Returns the full bulk endpoint URL this transport posts to.
    pub fn bulk_url(&self) -> &str {
        &self.bulk_url
    }
}

impl RegistryTransport for HttpRegistryTransport {
    fn post_bulk(
        &self,
        gzip_body: Vec<u8>,
    ) -> impl Future<Output = Result<Bytes, AdvisoryScannerError>> + Send {
        async move {
            let response = self
                .http
                .post(&self.bulk_url)
                .header(CONTENT_TYPE, "application/json")
                .header(CONTENT_ENCODING, "gzip")
                .header(ACCEPT, "application/json")
                .body(gzip_body)
                .send()
                .await
                .map_err(|e| AdvisoryScannerError::Transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(AdvisoryScannerError::Status {
                    status: status.as_u16(),
                });
            }

            response
                .bytes()
                .await
                .map_err(|e| AdvisoryScannerError::Transport(e.to_string()))
        }
    }
}

/// Scripted transport for unit tests.
///
/// Responses are consumed front-to-back; once the script is exhausted the
/// default body (`{}`) is returned. Request bodies are recorded for
/// inspection.
#[cfg(test)]
pub struct MockRegistryTransport {
    outcomes: std::sync::Mutex<std::collections::VecDeque<Result<String, AdvisoryScannerError>>>,
    received: std::sync::Mutex<Vec<Vec<u8>>>,
}

#[cfg(test)]
impl MockRegistryTransport {
    pub fn new() -> Self {
        Self {
            outcomes: std::sync::Mutex::new(std::collections::VecDeque::new()),
            received: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Queues a successful response body.
    pub fn with_body(self, body: impl Into<String>) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Ok(body.into()));
        self
    }

    /// Queues a failure outcome.
    pub fn with_error(self, err: AdvisoryScannerError) -> Self {
        self.outcomes.lock().unwrap().push_back(Err(err));
        self
    }

    /// Number of requests the mock has served.
    pub fn request_count(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    /// Raw (still gzip-compressed) request bodies received so far.
    pub fn received_bodies(&self) -> Vec<Vec<u8>> {
        self.received.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl RegistryTransport for MockRegistryTransport {
    fn post_bulk(
        &self,
        gzip_body: Vec<u8>,
    ) -> impl Future<Output = Result<Bytes, AdvisoryScannerError>> + Send {
        self.received.lock().unwrap().push(gzip_body);
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("{}".to_owned()));
        async move { outcome.map(|body| Bytes::from(body.into_bytes())) }
    }
}
