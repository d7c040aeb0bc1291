pub mod config;
pub mod fetch;
pub mod orchestrator;
pub mod output;
pub mod rover;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, ApiConfig, Config, ConfigError,
    HttpConfig, OutputConfig, RetryConfig, API_KEY_ENV, DEMO_API_KEY,
};
pub use fetch::{
    FetchError, FetchResult, HttpSession, ManifestAggregate, RawResponse, RequestDescriptor,
    RequestExecutor, RetryPolicy, Transport, TransportError,
};
pub use orchestrator::{ManifestOrchestrator, RunReport};
pub use output::{read_aggregate, write_aggregate, OutputError};
pub use rover::{Rover, UnknownRover};
