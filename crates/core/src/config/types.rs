use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::rover::Rover;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Rovers to fetch, in output order.
    #[serde(default = "default_rovers")]
    pub rovers: Vec<Rover>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            retry: RetryConfig::default(),
            http: HttpConfig::default(),
            output: OutputConfig::default(),
            rovers: default_rovers(),
        }
    }
}

fn default_rovers() -> Vec<Rover> {
    Rover::ALL.to_vec()
}

/// Upstream API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API credential. Overridden by the `API_KEY` environment variable.
    #[serde(default = "default_api_key")]
    pub api_key: String,
    /// Top-level key holding the manifest in a successful response.
    #[serde(default = "default_payload_key")]
    pub payload_key: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: default_api_key(),
            payload_key: default_payload_key(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.nasa.gov/mars-photos/api/v1".to_string()
}

/// Public, heavily rate-limited key accepted by api.nasa.gov.
pub const DEMO_API_KEY: &str = "DEMO_KEY";

fn default_api_key() -> String {
    DEMO_API_KEY.to_string()
}

fn default_payload_key() -> String {
    "photo_manifest".to_string()
}

/// Per-request retry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Deadline for one attempt (connect + read).
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_secs: u64,
    /// Flat delay between attempts.
    #[serde(default = "default_backoff")]
    pub backoff_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            attempt_timeout_secs: default_attempt_timeout(),
            backoff_secs: default_backoff(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_attempt_timeout() -> u64 {
    15
}

fn default_backoff() -> u64 {
    2
}

/// HTTP session configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_pool_idle_timeout")]
    pub pool_idle_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            pool_idle_timeout_secs: default_pool_idle_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_pool_idle_timeout() -> u64 {
    90
}

fn default_user_agent() -> String {
    format!("rover-manifest-fetcher/{}", env!("CARGO_PKG_VERSION"))
}

/// Output file configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("output_files/manifest_data.json")
}
