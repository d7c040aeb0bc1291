//! Testing utilities and mock implementations.
//!
//! [`MockTransport`] stands in for the HTTP session so retry, timeout and
//! fan-out behavior can be driven without a network, usually together with
//! a paused tokio clock.
//!
//! # Example
//!
//! ```rust,ignore
//! use rover_manifest_core::testing::{fixtures, MockReply, MockTransport};
//!
//! let transport = MockTransport::new();
//! transport.push(Rover::Curiosity, fixtures::manifest_reply(Rover::Curiosity)).await;
//! ```

mod mock_transport;

pub use mock_transport::{MockOutcome, MockReply, MockTransport};

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};

    use super::MockReply;
    use crate::rover::Rover;

    /// A manifest payload shaped like the upstream's `photo_manifest`.
    pub fn manifest_payload(rover: Rover) -> Value {
        json!({
            "name": capitalize(rover.name()),
            "landing_date": "2004-01-04",
            "status": "complete",
            "max_sol": 2208,
            "total_photos": 124550,
            "photos": [
                {"sol": 1, "total_photos": 77, "cameras": rover.cameras()}
            ]
        })
    }

    /// Full successful response body for `rover`.
    pub fn manifest_body(rover: Rover) -> Value {
        json!({ "photo_manifest": manifest_payload(rover) })
    }

    /// A 200 reply carrying [`manifest_body`].
    pub fn manifest_reply(rover: Rover) -> MockReply {
        MockReply::json(200, manifest_body(rover))
    }

    /// The upstream's rate-limit error body.
    pub fn rate_limit_body() -> Value {
        json!({
            "error": {
                "code": "OVER_RATE_LIMIT",
                "message": "You have exceeded your rate limit. Try again later."
            }
        })
    }

    fn capitalize(name: &str) -> String {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}
