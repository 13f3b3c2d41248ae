use cega_relay::RelayError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unable to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    #[error("release_threshold must be at least 1")]
    ZeroThreshold,

    #[error("no fixtures file configured, pass --fixtures or set `fixtures` in the config")]
    NoFixtures,

    #[error("fixtures line {line}: {reason}")]
    Fixture { line: usize, reason: String },

    #[error(transparent)]
    Relay(#[from] RelayError),
}
