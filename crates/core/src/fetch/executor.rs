//! Single-request executor with bounded retry.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::transport::{RawResponse, Transport};
use super::types::{FetchResult, RequestDescriptor};
use super::TransportError;
use crate::config::RetryConfig;

const SUCCESS_STATUS: u16 = 200;

/// Attempt budget, per-attempt deadline and flat backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            attempt_timeout: Duration::from_secs(config.attempt_timeout_secs),
            backoff: Duration::from_secs(config.backoff_secs),
        }
    }
}

/// Runs one descriptor to a terminal [`FetchResult`].
///
/// Only transport failures are retried. Any HTTP response, success or not,
/// ends the fetch on the attempt that received it.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    policy: RetryPolicy,
    payload_key: String,
}

impl RequestExecutor {
    pub fn new(policy: RetryPolicy, payload_key: impl Into<String>) -> Self {
        Self {
            policy,
            payload_key: payload_key.into(),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch `descriptor` through `transport`. Never fails; every outcome is
    /// a [`FetchResult`].
    pub async fn execute(
        &self,
        descriptor: &RequestDescriptor,
        transport: &dyn Transport,
    ) -> FetchResult {
        let rover = descriptor.identity();
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            debug!(rover = %rover, attempt, max_attempts, "Fetching manifest");

            match self.attempt(descriptor, transport).await {
                Ok(result) => {
                    if result.is_success() {
                        info!(rover = %rover, attempt, "Manifest pulled");
                    } else {
                        warn!(
                            rover = %rover,
                            kind = result.kind(),
                            status = ?result.status_code(),
                            "Manifest request returned an error response"
                        );
                    }
                    return result;
                }
                Err(e) if attempt < max_attempts => {
                    warn!(
                        rover = %rover,
                        attempt,
                        max_attempts,
                        error = %e,
                        "Request failed, retrying in {:?}",
                        self.policy.backoff
                    );
                    tokio::time::sleep(self.policy.backoff).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(rover = %rover, attempts = attempt, error = %e, "Giving up");
                    return FetchResult::TransportFailure {
                        message: format!("Request failed after {} attempts: {}", attempt, e),
                    };
                }
            }
        }
    }

    /// One attempt. `Err` means the attempt may be retried.
    async fn attempt(
        &self,
        descriptor: &RequestDescriptor,
        transport: &dyn Transport,
    ) -> Result<FetchResult, TransportError> {
        let response = tokio::time::timeout(self.policy.attempt_timeout, transport.get(descriptor))
            .await
            .map_err(|_| TransportError::Timeout(self.policy.attempt_timeout))??;

        self.interpret(response)
    }

    fn interpret(&self, response: RawResponse) -> Result<FetchResult, TransportError> {
        if response.status != SUCCESS_STATUS {
            return Ok(FetchResult::HttpError {
                error_body: decode_error_body(&response.body),
                resolved_url: response.url,
                status_code: response.status,
            });
        }

        // Decoded regardless of Content-Type.
        let body: Value = serde_json::from_slice(&response.body)
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        let payload = match body {
            Value::Object(mut map) => map.remove(&self.payload_key),
            _ => None,
        };

        Ok(match payload {
            Some(payload) => FetchResult::Success {
                payload,
                resolved_url: response.url,
                status_code: response.status,
            },
            None => FetchResult::MalformedSuccess {
                resolved_url: response.url,
                status_code: response.status,
                message: format!("Response body has no '{}' key", self.payload_key),
            },
        })
    }
}

/// Error bodies never fail: empty becomes `null`, non-JSON is kept as text.
fn decode_error_body(body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rover::Rover;
    use crate::testing::{MockReply, MockTransport};
    use serde_json::json;
    use tokio::time::Instant;

    fn executor() -> RequestExecutor {
        RequestExecutor::new(RetryPolicy::default(), "photo_manifest")
    }

    fn descriptor(rover: Rover) -> RequestDescriptor {
        RequestDescriptor::manifest("http://mock/api", rover, "TEST_KEY")
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.attempt_timeout, Duration::from_secs(15));
        assert_eq!(policy.backoff, Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempt_policy_still_makes_one_attempt() {
        let config = RetryConfig {
            max_attempts: 0,
            attempt_timeout_secs: 1,
            backoff_secs: 0,
        };
        let transport = MockTransport::new();
        transport
            .set_fallback(Rover::Spirit, MockReply::fail("refused"))
            .await;

        let result = RequestExecutor::new(RetryPolicy::from(&config), "photo_manifest")
            .execute(&descriptor(Rover::Spirit), &transport)
            .await;

        assert!(matches!(result, FetchResult::TransportFailure { .. }));
        assert_eq!(transport.attempts(Rover::Spirit).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_extracts_payload() {
        let transport = MockTransport::new();
        transport
            .push(
                Rover::Curiosity,
                MockReply::json(200, json!({"photo_manifest": {"name": "Curiosity"}})),
            )
            .await;

        let result = executor()
            .execute(&descriptor(Rover::Curiosity), &transport)
            .await;

        match result {
            FetchResult::Success {
                payload,
                resolved_url,
                status_code,
            } => {
                assert_eq!(payload, json!({"name": "Curiosity"}));
                assert_eq!(status_code, 200);
                assert_eq!(
                    resolved_url,
                    "http://mock/api/manifests/curiosity?api_key=TEST_KEY"
                );
            }
            other => panic!("expected success, got {:?}", other),
        }
        assert_eq!(transport.attempts(Rover::Curiosity).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_transport_failures_then_success() {
        let transport = MockTransport::new();
        transport
            .push(Rover::Spirit, MockReply::fail("connection reset"))
            .await;
        transport
            .push(Rover::Spirit, MockReply::fail("connection reset"))
            .await;
        transport
            .push(
                Rover::Spirit,
                MockReply::json(200, json!({"photo_manifest": {"max_sol": 2208}})),
            )
            .await;

        let start = Instant::now();
        let result = executor().execute(&descriptor(Rover::Spirit), &transport).await;

        assert!(result.is_success());
        assert_eq!(transport.attempts(Rover::Spirit).await, 3);
        // Two flat 2s backoffs, no other clock movement.
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_http_error_is_not_retried() {
        let transport = MockTransport::new();
        transport
            .push(
                Rover::Opportunity,
                MockReply::json(500, json!({"error": "internal"})),
            )
            .await;
        transport
            .push(
                Rover::Opportunity,
                MockReply::json(200, json!({"photo_manifest": {}})),
            )
            .await;

        let start = Instant::now();
        let result = executor()
            .execute(&descriptor(Rover::Opportunity), &transport)
            .await;

        match result {
            FetchResult::HttpError {
                status_code,
                error_body,
                ..
            } => {
                assert_eq!(status_code, 500);
                assert_eq!(error_body, json!({"error": "internal"}));
            }
            other => panic!("expected http error, got {:?}", other),
        }
        assert_eq!(transport.attempts(Rover::Opportunity).await, 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_attempts_time_out() {
        let transport = MockTransport::new();
        transport
            .set_fallback(Rover::Curiosity, MockReply::hang())
            .await;

        let start = Instant::now();
        let result = executor()
            .execute(&descriptor(Rover::Curiosity), &transport)
            .await;

        match &result {
            FetchResult::TransportFailure { message } => {
                assert!(message.contains("3 attempts"), "message: {}", message);
                assert!(message.contains("timed out"), "message: {}", message);
            }
            other => panic!("expected transport failure, got {:?}", other),
        }
        assert_eq!(transport.attempts(Rover::Curiosity).await, 3);
        // 3 x 15s deadlines + 2 x 2s backoffs.
        assert_eq!(start.elapsed(), Duration::from_secs(49));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_error_body_is_http_error() {
        let transport = MockTransport::new();
        transport
            .set_fallback(Rover::Curiosity, MockReply::raw(500, ""))
            .await;

        let result = executor()
            .execute(&descriptor(Rover::Curiosity), &transport)
            .await;

        match result {
            FetchResult::HttpError {
                status_code,
                error_body,
                ..
            } => {
                assert_eq!(status_code, 500);
                assert_eq!(error_body, Value::Null);
            }
            other => panic!("expected http error, got {:?}", other),
        }
        assert_eq!(transport.attempts(Rover::Curiosity).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_html_error_body_is_kept_as_text() {
        let transport = MockTransport::new();
        transport
            .set_fallback(Rover::Spirit, MockReply::raw(502, "<html>Bad Gateway</html>"))
            .await;

        let result = executor().execute(&descriptor(Rover::Spirit), &transport).await;

        match result {
            FetchResult::HttpError {
                status_code,
                error_body,
                ..
            } => {
                assert_eq!(status_code, 502);
                assert_eq!(error_body, json!("<html>Bad Gateway</html>"));
            }
            other => panic!("expected http error, got {:?}", other),
        }
        assert_eq!(transport.attempts(Rover::Spirit).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_200_success_status_is_http_error() {
        let transport = MockTransport::new();
        transport
            .set_fallback(
                Rover::Opportunity,
                MockReply::json(201, json!({"photo_manifest": {"name": "Opportunity"}})),
            )
            .await;

        let result = executor()
            .execute(&descriptor(Rover::Opportunity), &transport)
            .await;

        assert!(
            matches!(result, FetchResult::HttpError { status_code: 201, .. }),
            "got {:?}",
            result
        );
        assert_eq!(transport.attempts(Rover::Opportunity).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_payload_key_is_malformed_success() {
        let transport = MockTransport::new();
        transport
            .push(Rover::Spirit, MockReply::json(200, json!({"photos": []})))
            .await;

        let result = executor().execute(&descriptor(Rover::Spirit), &transport).await;

        match result {
            FetchResult::MalformedSuccess {
                status_code,
                message,
                ..
            } => {
                assert_eq!(status_code, 200);
                assert!(message.contains("photo_manifest"));
            }
            other => panic!("expected malformed success, got {:?}", other),
        }
        assert_eq!(transport.attempts(Rover::Spirit).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_object_success_body_is_malformed() {
        let transport = MockTransport::new();
        transport
            .push(Rover::Spirit, MockReply::json(200, json!([1, 2, 3])))
            .await;

        let result = executor().execute(&descriptor(Rover::Spirit), &transport).await;
        assert!(matches!(result, FetchResult::MalformedSuccess { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_undecodable_body_is_retried() {
        let transport = MockTransport::new();
        transport
            .push(Rover::Curiosity, MockReply::raw(200, "<html>busy</html>"))
            .await;
        transport
            .push(
                Rover::Curiosity,
                MockReply::json(200, json!({"photo_manifest": {"name": "Curiosity"}})),
            )
            .await;

        let result = executor()
            .execute(&descriptor(Rover::Curiosity), &transport)
            .await;

        assert!(result.is_success());
        assert_eq!(transport.attempts(Rover::Curiosity).await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_policy_does_not_sleep() {
        let policy = RetryPolicy {
            max_attempts: 1,
            attempt_timeout: Duration::from_secs(5),
            backoff: Duration::from_secs(2),
        };
        let transport = MockTransport::new();
        transport.push(Rover::Spirit, MockReply::fail("refused")).await;

        let start = Instant::now();
        let result = RequestExecutor::new(policy, "photo_manifest")
            .execute(&descriptor(Rover::Spirit), &transport)
            .await;

        match result {
            FetchResult::TransportFailure { message } => {
                assert!(message.contains("1 attempts"));
                assert!(message.contains("refused"));
            }
            other => panic!("expected transport failure, got {:?}", other),
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
