//! Mock transport for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::fetch::{RawResponse, RequestDescriptor, Transport, TransportError};
use crate::rover::Rover;

/// What a scripted attempt does once its delay has elapsed.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Return a response with this status and raw body.
    Respond { status: u16, body: Vec<u8> },
    /// Fail below the HTTP layer.
    Fail(String),
    /// Never complete; only a deadline ends the attempt.
    Hang,
}

/// One scripted attempt.
#[derive(Debug, Clone)]
pub struct MockReply {
    pub delay: Duration,
    pub outcome: MockOutcome,
}

impl MockReply {
    /// Respond with a JSON body.
    pub fn json(status: u16, body: Value) -> Self {
        Self::raw(status, body.to_string())
    }

    /// Respond with an arbitrary body.
    pub fn raw(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: MockOutcome::Respond {
                status,
                body: body.into(),
            },
        }
    }

    pub fn fail(message: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: MockOutcome::Fail(message.to_string()),
        }
    }

    pub fn hang() -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: MockOutcome::Hang,
        }
    }

    /// Delay the outcome, simulating network latency.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Mock implementation of the Transport trait.
///
/// Replies are scripted per rover and consumed in order, one per attempt.
/// When a rover's script runs out, its fallback reply is used, or the
/// attempt fails with a connection error.
///
/// # Example
///
/// ```rust,ignore
/// use rover_manifest_core::testing::{MockReply, MockTransport};
///
/// let transport = MockTransport::new();
/// transport.push(Rover::Spirit, MockReply::fail("reset")).await;
/// transport.push(Rover::Spirit, MockReply::json(200, json!({"photo_manifest": {}}))).await;
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    scripts: Arc<RwLock<HashMap<Rover, VecDeque<MockReply>>>>,
    fallbacks: Arc<RwLock<HashMap<Rover, MockReply>>>,
    attempts: Arc<RwLock<HashMap<Rover, usize>>>,
    requests: Arc<RwLock<Vec<RequestDescriptor>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next unscripted attempt of `rover`.
    pub async fn push(&self, rover: Rover, reply: MockReply) {
        self.scripts
            .write()
            .await
            .entry(rover)
            .or_default()
            .push_back(reply);
    }

    /// Reply used for `rover` once its script is exhausted.
    pub async fn set_fallback(&self, rover: Rover, reply: MockReply) {
        self.fallbacks.write().await.insert(rover, reply);
    }

    /// Number of attempts made for `rover`.
    pub async fn attempts(&self, rover: Rover) -> usize {
        self.attempts.read().await.get(&rover).copied().unwrap_or(0)
    }

    /// Total attempts across all rovers.
    pub async fn total_attempts(&self) -> usize {
        self.attempts.read().await.values().sum()
    }

    /// Every request received, in arrival order.
    pub async fn recorded_requests(&self) -> Vec<RequestDescriptor> {
        self.requests.read().await.clone()
    }

    async fn next_reply(&self, rover: Rover) -> Option<MockReply> {
        let scripted = self
            .scripts
            .write()
            .await
            .get_mut(&rover)
            .and_then(|queue| queue.pop_front());
        match scripted {
            Some(reply) => Some(reply),
            None => self.fallbacks.read().await.get(&rover).cloned(),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, request: &RequestDescriptor) -> Result<RawResponse, TransportError> {
        let rover = request.identity();
        *self.attempts.write().await.entry(rover).or_insert(0) += 1;
        self.requests.write().await.push(request.clone());

        let Some(reply) = self.next_reply(rover).await else {
            return Err(TransportError::Connection(format!(
                "no scripted reply for {}",
                rover
            )));
        };

        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }

        match reply.outcome {
            MockOutcome::Respond { status, body } => Ok(RawResponse {
                url: request.query_url(),
                status,
                body,
            }),
            MockOutcome::Fail(message) => Err(TransportError::Connection(message)),
            MockOutcome::Hang => std::future::pending().await,
        }
    }
}
