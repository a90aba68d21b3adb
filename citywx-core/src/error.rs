use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can abort a snapshot run.
///
/// No variant is recovered from: the first error stops the run and nothing
/// is written to the output directory for cities fetched before it.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Missing credential, unreadable `.env` or malformed `citywx.toml`.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("request for '{city}' failed: {source}")]
    Network {
        city: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("OpenWeather returned status {status} for '{city}': {body}")]
    HttpStatus {
        city: String,
        status: StatusCode,
        body: String,
    },

    #[error("unexpected OpenWeather response for '{city}': {reason}")]
    DataFormat { city: String, reason: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("cannot render chart: {0}")]
    Render(String),

    #[error("failed to draw chart {}: {reason}", path.display())]
    Chart { path: PathBuf, reason: String },
}

impl SnapshotError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for transport failures and non-success statuses.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::HttpStatus { .. })
    }
}

pub type Result<T, E = SnapshotError> = std::result::Result<T, E>;
