//! `json5` configuration for the replay binary.

use crate::error::AppError;
use cega_relay::{Origin, RelayConfig, ReleaseThreshold};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

fn default_origins() -> Vec<Origin> {
    Origin::all()
}

fn default_release_threshold() -> usize {
    1
}

fn default_publish_timeout_ms() -> u64 {
    5000
}

fn default_queue_capacity() -> usize {
    64
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Queues to consume; anything else in the fixtures is skipped.
    #[serde(default = "default_origins")]
    pub origins: Vec<Origin>,
    #[serde(default = "default_release_threshold")]
    pub release_threshold: usize,
    #[serde(default = "default_publish_timeout_ms")]
    pub publish_timeout_ms: u64,
    /// Capacity of each in-memory origin queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default)]
    pub fixtures: Option<PathBuf>,
    /// Envelope output file, stdout when unset.
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            origins: default_origins(),
            release_threshold: default_release_threshold(),
            publish_timeout_ms: default_publish_timeout_ms(),
            queue_capacity: default_queue_capacity(),
            fixtures: None,
            output: None,
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub fixtures: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub release_threshold: Option<usize>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = json5::from_str(&text).map_err(|err| AppError::Config {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        debug!(config = ?config, "loaded config from {}", path.display());
        Ok(config)
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(fixtures) = overrides.fixtures {
            self.fixtures = Some(fixtures);
        }
        if let Some(output) = overrides.output {
            self.output = Some(output);
        }
        if let Some(release_threshold) = overrides.release_threshold {
            self.release_threshold = release_threshold;
        }
    }

    pub fn relay_config(&self) -> Result<RelayConfig, AppError> {
        let release_threshold =
            ReleaseThreshold::new(self.release_threshold).ok_or(AppError::ZeroThreshold)?;
        Ok(RelayConfig {
            release_threshold,
            publish_timeout: Duration::from_millis(self.publish_timeout_ms),
            ..RelayConfig::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, Overrides};
    use crate::error::AppError;
    use cega_relay::Origin;
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::Duration;

    fn write_config(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_config_uses_defaults() {
        let file = write_config("{}");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.origins, Origin::all());
    }

    #[test]
    fn json5_config_with_comments_is_accepted() {
        let file = write_config(
            r#"
            // only the aggregation path
            {
              origins: ["completed"],
              release_threshold: 4,
              publish_timeout_ms: 250,
              fixtures: "traffic.jsonl",
            }
            "#,
        );

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.origins, vec![Origin::Completed]);
        assert_eq!(config.fixtures, Some(PathBuf::from("traffic.jsonl")));

        let relay = config.relay_config().unwrap();
        assert_eq!(relay.release_threshold.get(), 4);
        assert_eq!(relay.publish_timeout, Duration::from_millis(250));
        assert_eq!(relay.routing_key, "files");
    }

    #[test]
    fn unknown_origin_label_is_rejected() {
        let file = write_config(r#"{ origins: ["files.inbox"] }"#);
        assert!(matches!(
            Config::load(file.path()),
            Err(AppError::Config { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("absent.json5")).unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
    }

    #[test]
    fn overrides_win_over_file_values() {
        let mut config = Config {
            release_threshold: 3,
            fixtures: Some(PathBuf::from("from-file.jsonl")),
            ..Config::default()
        };
        config.apply(Overrides {
            fixtures: Some(PathBuf::from("from-cli.jsonl")),
            output: None,
            release_threshold: Some(7),
        });

        assert_eq!(config.fixtures, Some(PathBuf::from("from-cli.jsonl")));
        assert_eq!(config.output, None);
        assert_eq!(config.release_threshold, 7);
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let config = Config {
            release_threshold: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.relay_config(),
            Err(AppError::ZeroThreshold)
        ));
    }
}
