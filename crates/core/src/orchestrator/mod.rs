//! Manifest orchestrator.
//!
//! Runs one fetch per rover concurrently over a shared connection context
//! and assembles the per-rover results into a [`ManifestAggregate`].
//!
//! [`ManifestAggregate`]: crate::fetch::ManifestAggregate

mod runner;

pub use runner::{ManifestOrchestrator, RunReport};
