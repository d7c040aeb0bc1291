use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Environment variable holding the upstream API credential.
pub const API_KEY_ENV: &str = "API_KEY";

/// Prefix for environment overrides, e.g. `MANIFEST_RETRY__MAX_ATTEMPTS=5`.
pub const ENV_PREFIX: &str = "MANIFEST_";

/// Load configuration from defaults, an optional TOML file and the environment.
///
/// Later sources win: defaults, then the file, then `MANIFEST_*` variables,
/// then `API_KEY`.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        figment = figment.merge(Toml::file(path));
    }

    let config: Config = figment
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["CONFIG"]).split("__"))
        .merge(
            Env::raw()
                .only(&[API_KEY_ENV])
                .map(|_| "api.api_key".into()),
        )
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
