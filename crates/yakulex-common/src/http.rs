//! Retrying HTTP transport.
//!
//! Every outbound fetch goes through [`RetryingClient`], which wraps a
//! [`Transport`] with a bounded retry loop. Only timeout-class failures are
//! retried; HTTP error statuses and connection failures propagate
//! immediately. Retry state lives in the call frame, so concurrent fetches
//! of the same URL never interfere with each other's attempt counts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::TransportError;

const DEFAULT_USER_AGENT: &str = "yakulex/0.1 (regulatory-excerpt-service)";

/// Settings for the underlying `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Per-request timeout; a slow document host past this is the
    /// timeout-class failure the retry loop acts on.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Issues a single request. Seam between the retry loop and the network,
/// and the injection point for stub transports in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn issue(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

/// Real transport over `reqwest`.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn issue(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status,
            });
        }

        let bytes = resp.bytes().await.map_err(|e| classify(url, e))?;
        Ok(bytes.to_vec())
    }
}

fn classify(url: &str, err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else {
        TransportError::Http(err)
    }
}

/// How often and how patiently to retry timed-out requests.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(1),
        }
    }
}

/// Bounded-retry wrapper around a [`Transport`].
#[derive(Clone)]
pub struct RetryingClient {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl RetryingClient {
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Convenience constructor over the real HTTP transport.
    pub fn over_http(http: &HttpConfig, policy: RetryPolicy) -> Result<Self, TransportError> {
        Ok(Self::new(Arc::new(HttpTransport::new(http)?), policy))
    }

    /// Fetch `url`, re-issuing the identical request after a fixed delay on
    /// each timeout, up to the policy bound.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let mut timeouts: u32 = 0;
        loop {
            match self.transport.issue(url).await {
                Ok(bytes) => return Ok(bytes),
                Err(TransportError::Timeout { .. }) => {
                    timeouts += 1;
                    if timeouts > self.policy.max_retries {
                        warn!(url, timeouts, "retries exhausted");
                        return Err(TransportError::Exhausted {
                            url: url.to_string(),
                            attempts: timeouts,
                        });
                    }
                    debug!(url, attempt = timeouts, "request timed out, retrying");
                    tokio::time::sleep(self.policy.delay).await;
                }
                Err(other) => return Err(other),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Times out `timeouts` times, then succeeds.
    struct FlakyTransport {
        timeouts: u32,
        calls: AtomicU32,
    }

    impl FlakyTransport {
        fn new(timeouts: u32) -> Self {
            Self {
                timeouts,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Transport for FlakyTransport {
        async fn issue(&self, url: &str) -> Result<Vec<u8>, TransportError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.timeouts {
                Err(TransportError::Timeout {
                    url: url.to_string(),
                })
            } else {
                Ok(b"payload".to_vec())
            }
        }
    }

    struct RefusingTransport {
        calls: AtomicU32,
    }

    #[async_trait]
    impl Transport for RefusingTransport {
        async fn issue(&self, url: &str) -> Result<Vec<u8>, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(TransportError::Status {
                url: url.to_string(),
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            })
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn recovers_after_two_timeouts() {
        let transport = Arc::new(FlakyTransport::new(2));
        let client = RetryingClient::new(transport.clone(), policy());

        let bytes = client.fetch("http://example.invalid/doc.pdf").await.unwrap();
        assert_eq!(bytes, b"payload");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_after_bounded_retries() {
        let transport = Arc::new(FlakyTransport::new(u32::MAX));
        let client = RetryingClient::new(transport.clone(), policy());

        let err = client
            .fetch("http://example.invalid/doc.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Exhausted { attempts: 4, .. }));
        // Initial attempt plus exactly three retries.
        assert_eq!(transport.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn non_timeout_failures_are_not_retried() {
        let transport = Arc::new(RefusingTransport {
            calls: AtomicU32::new(0),
        });
        let client = RetryingClient::new(transport.clone(), policy());

        let err = client
            .fetch("http://example.invalid/doc.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Status { .. }));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }
}
