//! Fan-out/fan-in over the configured rovers.
//!
//! Every rover gets its own future; all of them are polled on the calling
//! task and joined before the aggregate is built. One rover's failure never
//! cancels or short-circuits the others.

use std::time::Duration;

use futures::future::join_all;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::config::{Config, HttpConfig, RetryConfig};
use crate::fetch::{
    FetchError, FetchResult, HttpSession, ManifestAggregate, RequestDescriptor, RequestExecutor,
    RetryPolicy, Transport,
};
use crate::rover::Rover;

/// Aggregate of one run plus the duration of its fan-out/fan-in phase.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub aggregate: ManifestAggregate,
    pub elapsed: Duration,
}

/// Builds one request per rover, runs them concurrently and collects the
/// results keyed by rover.
#[derive(Debug, Clone)]
pub struct ManifestOrchestrator {
    base_url: String,
    api_key: String,
    executor: RequestExecutor,
}

impl ManifestOrchestrator {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        executor: RequestExecutor,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            executor,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.api.base_url.clone(),
            config.api.api_key.clone(),
            RequestExecutor::new(
                RetryPolicy::from(&config.retry),
                config.api.payload_key.clone(),
            ),
        )
    }

    /// Convenience constructor with default retry settings.
    pub fn with_defaults(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::new(
            base_url,
            api_key,
            RequestExecutor::new(RetryPolicy::from(&RetryConfig::default()), "photo_manifest"),
        )
    }

    /// One manifest request per rover, in the given order.
    pub fn descriptors(&self, rovers: &[Rover]) -> Vec<RequestDescriptor> {
        rovers
            .iter()
            .map(|rover| RequestDescriptor::manifest(&self.base_url, *rover, &self.api_key))
            .collect()
    }

    /// Fetch every rover through `transport` and wait for all of them.
    pub async fn run(&self, transport: &dyn Transport, rovers: &[Rover]) -> RunReport {
        let descriptors = self.descriptors(rovers);
        info!(rovers = descriptors.len(), "Fetching manifests");

        let start = Instant::now();
        let results: Vec<FetchResult> = join_all(
            descriptors
                .iter()
                .map(|descriptor| self.executor.execute(descriptor, transport)),
        )
        .await;
        let elapsed = start.elapsed();

        let mut aggregate = ManifestAggregate::new();
        for (rover, result) in rovers.iter().zip(results) {
            aggregate.insert(*rover, result);
        }

        info!(
            elapsed_secs = elapsed.as_secs_f64(),
            succeeded = aggregate.success_count(),
            failed = aggregate.failure_count(),
            "Finished pulling manifests in {:.2}s",
            elapsed.as_secs_f64()
        );

        RunReport { aggregate, elapsed }
    }

    /// Open a session for the duration of one run, then release it.
    ///
    /// Failing to open the session is the only error; request failures are
    /// recorded in the aggregate.
    pub async fn run_with_session(
        &self,
        http: &HttpConfig,
        rovers: &[Rover],
    ) -> Result<RunReport, FetchError> {
        let session = HttpSession::open(http)?;
        let report = self.run(&session, rovers).await;
        drop(session);

        for (key, result) in report.aggregate.iter() {
            if !result.is_success() {
                warn!(entry = key, kind = result.kind(), "Manifest not retrieved");
            }
        }

        Ok(report)
    }
}
