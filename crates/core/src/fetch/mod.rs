//! Resilient single-request fetching.
//!
//! [`RequestExecutor`] runs one [`RequestDescriptor`] against a shared
//! [`Transport`], retrying transport failures with a flat backoff and
//! normalizing every outcome into a [`FetchResult`].

mod executor;
mod transport;
mod types;

pub use executor::{RequestExecutor, RetryPolicy};
pub use transport::{HttpSession, RawResponse, Transport};
pub use types::{FetchResult, ManifestAggregate, RequestDescriptor};

use std::time::Duration;

use thiserror::Error;

/// Failure of a single attempt below the HTTP layer. Always retryable.
#[derive(Debug, Error)]
pub enum TransportError {
    /// reqwest failed to connect, send, or read the body.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The attempt did not complete within its deadline.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The body was not valid JSON.
    #[error("Failed to decode response body: {0}")]
    Decode(String),

    /// Connection-level failure reported by a non-reqwest transport.
    #[error("Connection failed: {0}")]
    Connection(String),
}

/// Fatal errors that abort a run before an aggregate is produced.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to open HTTP session: {0}")]
    Session(#[source] reqwest::Error),
}
