//! Error types for the store and the settings layer.

use std::path::PathBuf;

/// Failures reported by [`ConfigStore`](crate::ConfigStore).
///
/// Absent keys are not errors (`get`/`remove` return `None`) and malformed
/// lines are recorded in [`LoadReport`](crate::LoadReport) instead.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The file could not be opened, read, created or written.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but is not valid UTF-8.
    #[error("{} is not valid UTF-8", path.display())]
    Encoding { path: PathBuf },

    /// Keys must be non-empty.
    #[error("key must not be empty")]
    EmptyKey,

    /// The bucket array could not be grown to the requested size.
    #[error("failed to grow bucket array to {requested} buckets")]
    CapacityGrowth { requested: usize },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failures while resolving typed launcher settings out of a store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("region name must not be empty")]
    EmptyRegion,

    /// A required key is absent or blank.
    #[error("required key '{key}' is missing or blank")]
    Missing { key: String },

    #[error("key '{key}' holds '{value}', which is not a valid port")]
    InvalidPort { key: String, value: String },
}
