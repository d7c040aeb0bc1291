//! Request and result shapes shared by the executor and orchestrator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rover::Rover;

/// A fully formed GET request for one rover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    identity: Rover,
    url: String,
    params: BTreeMap<String, String>,
}

impl RequestDescriptor {
    /// Build the manifest request `<base_url>/manifests/<rover>?api_key=<key>`.
    pub fn manifest(base_url: &str, rover: Rover, api_key: &str) -> Self {
        let url = format!("{}/manifests/{}", base_url.trim_end_matches('/'), rover);
        let params = BTreeMap::from([("api_key".to_string(), api_key.to_string())]);
        Self {
            identity: rover,
            url,
            params,
        }
    }

    pub fn identity(&self) -> Rover {
        self.identity
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// URL with the encoded query string appended.
    pub fn query_url(&self) -> String {
        if self.params.is_empty() {
            return self.url.clone();
        }
        let query: Vec<String> = self
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        format!("{}?{}", self.url, query.join("&"))
    }
}

/// Outcome of one logical fetch.
///
/// Serialized untagged into the flat shape that ends up in the output file:
/// `data`/`error`/`error_msg` plus `url` and `status_code` where they apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FetchResult {
    /// Status 200 with the expected payload key present.
    Success {
        #[serde(rename = "data")]
        payload: Value,
        #[serde(rename = "url")]
        resolved_url: String,
        status_code: u16,
    },
    /// Non-success status; the decoded error body is kept as-is.
    HttpError {
        #[serde(rename = "url")]
        resolved_url: String,
        status_code: u16,
        #[serde(rename = "error")]
        error_body: Value,
    },
    /// Status 200 but the body did not carry the expected payload key.
    MalformedSuccess {
        #[serde(rename = "url")]
        resolved_url: String,
        status_code: u16,
        #[serde(rename = "error_msg")]
        message: String,
    },
    /// Every attempt failed below the HTTP layer.
    TransportFailure {
        #[serde(rename = "error_msg")]
        message: String,
    },
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success { .. })
    }

    /// Upstream status code, if a response was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchResult::Success { status_code, .. }
            | FetchResult::HttpError { status_code, .. }
            | FetchResult::MalformedSuccess { status_code, .. } => Some(*status_code),
            FetchResult::TransportFailure { .. } => None,
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchResult::Success { .. } => "success",
            FetchResult::HttpError { .. } => "http_error",
            FetchResult::MalformedSuccess { .. } => "malformed_success",
            FetchResult::TransportFailure { .. } => "transport_failure",
        }
    }
}

/// Results of one run keyed by `<rover>_manifest_data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManifestAggregate {
    entries: BTreeMap<String, FetchResult>,
}

impl ManifestAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a rover's result, replacing any previous one.
    pub fn insert(&mut self, rover: Rover, result: FetchResult) {
        self.entries.insert(rover.manifest_key(), result);
    }

    pub fn get(&self, rover: Rover) -> Option<&FetchResult> {
        self.entries.get(&rover.manifest_key())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FetchResult)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn success_count(&self) -> usize {
        self.entries.values().filter(|r| r.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.len() - self.success_count()
    }
}
