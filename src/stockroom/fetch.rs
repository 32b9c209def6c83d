//! # Retryable Fetch
//!
//! A generic request executor with exponential backoff. It knows nothing about
//! inventories: it takes a [`FetchRequest`], hands it to a [`Transport`], and
//! retries on transport failures and non-2xx statuses.
//!
//! Both suspension points are behind traits, the network call ([`Transport`])
//! and the inter-attempt delay ([`Sleeper`]), so tests can script responses
//! and record delays without touching the network or the clock.
//!
//! The caller observes exactly one outcome: the first successful response, or a
//! [`NetworkError`] carrying the attempt count and the last failure.

use reqwest::Method;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl FetchRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

/// All attempts failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("request failed after {attempts} attempts: {last_error}")]
pub struct NetworkError {
    pub attempts: u32,
    pub last_error: String,
}

/// Sends one request, once.
pub trait Transport {
    fn send(
        &self,
        request: &FetchRequest,
    ) -> impl Future<Output = Result<FetchResponse, TransportError>>;
}

/// Waits between attempts.
pub trait Sleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: &FetchRequest) -> Result<FetchResponse, TransportError> {
        let mut builder = self.http.request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(FetchResponse { status, body })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        tokio::time::sleep(duration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(100), Duration::from_millis(2000))
    }
}

impl RetryPolicy {
    /// `max_attempts` below one is raised to one.
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Backoff before attempt `attempt` (0-indexed): `min(2^(attempt-1) * base, max)`.
    /// The first attempt is never delayed.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

pub struct RetryingFetch<T: Transport, S: Sleeper> {
    transport: T,
    sleeper: S,
    policy: RetryPolicy,
}

impl<T: Transport> RetryingFetch<T, TokioSleeper> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self::with_sleeper(transport, TokioSleeper, policy)
    }
}

impl<T: Transport, S: Sleeper> RetryingFetch<T, S> {
    pub fn with_sleeper(transport: T, sleeper: S, policy: RetryPolicy) -> Self {
        Self {
            transport,
            sleeper,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn request(&self, request: &FetchRequest) -> Result<FetchResponse, NetworkError> {
        let attempts = self.policy.max_attempts();
        let mut last_error = String::new();

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = self.policy.delay_before(attempt);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "backing off");
                self.sleeper.sleep(delay).await;
            }

            match self.transport.send(request).await {
                Ok(response) if response.is_success() => {
                    debug!(attempt, status = response.status, "request succeeded");
                    return Ok(response);
                }
                Ok(response) => {
                    last_error = format!("server responded with status {}", response.status);
                }
                Err(e) => {
                    last_error = e.to_string();
                }
            }
            warn!(attempt = attempt + 1, of = attempts, error = %last_error, "request attempt failed");
        }

        Err(NetworkError {
            attempts,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{RecordingSleeper, ScriptedTransport};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn fetch(script: Vec<Result<FetchResponse, String>>) -> RetryingFetch<ScriptedTransport, RecordingSleeper> {
        RetryingFetch::with_sleeper(
            ScriptedTransport::new(script),
            RecordingSleeper::default(),
            RetryPolicy::default(),
        )
    }

    #[test]
    fn delay_schedule_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_before(0), Duration::ZERO);
        assert_eq!(policy.delay_before(1), ms(100));
        assert_eq!(policy.delay_before(2), ms(200));
        assert_eq!(policy.delay_before(3), ms(400));
        assert_eq!(policy.delay_before(5), ms(1600));
        assert_eq!(policy.delay_before(6), ms(2000));
        assert_eq!(policy.delay_before(40), ms(2000));
    }

    #[test]
    fn zero_attempts_means_one() {
        let policy = RetryPolicy::new(0, ms(100), ms(2000));
        assert_eq!(policy.max_attempts(), 1);
    }

    #[tokio::test]
    async fn first_success_needs_no_backoff() {
        let fetch = fetch(vec![Ok(FetchResponse::new(200, "ok"))]);
        let response = fetch.request(&FetchRequest::post("http://sync")).await.unwrap();
        assert_eq!(response.body, "ok");
        assert!(fetch.sleeper().delays().is_empty());
        assert_eq!(fetch.transport().calls(), 1);
    }

    #[tokio::test]
    async fn fails_twice_then_succeeds() {
        let fetch = fetch(vec![
            Err("connection refused".into()),
            Ok(FetchResponse::new(503, "busy")),
            Ok(FetchResponse::new(200, r#"{"success":true}"#)),
        ]);
        let response = fetch.request(&FetchRequest::post("http://sync")).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(fetch.sleeper().delays(), vec![ms(100), ms(200)]);
        assert_eq!(fetch.transport().calls(), 3);
    }

    #[tokio::test]
    async fn always_failing_exhausts_after_three_attempts() {
        let fetch = fetch(vec![
            Ok(FetchResponse::new(500, "")),
            Ok(FetchResponse::new(500, "")),
            Ok(FetchResponse::new(502, "")),
        ]);
        let err = fetch
            .request(&FetchRequest::post("http://sync"))
            .await
            .unwrap_err();
        assert_eq!(err.attempts, 3);
        assert_eq!(err.last_error, "server responded with status 502");
        assert!(err.to_string().contains("3 attempts"));
        assert_eq!(fetch.sleeper().delays(), vec![ms(100), ms(200)]);
    }

    #[tokio::test]
    async fn transport_errors_are_embedded() {
        let fetch = RetryingFetch::with_sleeper(
            ScriptedTransport::new(vec![Err("dns failure".into())]),
            RecordingSleeper::default(),
            RetryPolicy::new(1, ms(100), ms(2000)),
        );
        let err = fetch
            .request(&FetchRequest::post("http://sync"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "request failed after 1 attempts: dns failure"
        );
    }

    #[test]
    fn success_range() {
        assert!(FetchResponse::new(204, "").is_success());
        assert!(!FetchResponse::new(301, "").is_success());
        assert!(!FetchResponse::new(199, "").is_success());
    }
}
