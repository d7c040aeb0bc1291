//! Persists the aggregate as pretty-printed JSON.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::fetch::ManifestAggregate;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize manifest data: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl OutputError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Write `aggregate` to `path`, creating parent directories and replacing
/// any existing file.
pub async fn write_aggregate(path: &Path, aggregate: &ManifestAggregate) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| OutputError::io(parent, e))?;
    }

    let json = serde_json::to_vec_pretty(aggregate)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| OutputError::io(path, e))?;

    info!(path = %path.display(), entries = aggregate.len(), "Manifest data saved");
    Ok(())
}

/// Read back a file produced by [`write_aggregate`].
pub async fn read_aggregate(path: &Path) -> Result<ManifestAggregate, OutputError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| OutputError::io(path, e))?;
    Ok(serde_json::from_slice(&bytes)?)
}
