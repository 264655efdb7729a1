//! Configuration for boxit.
//!
//! Settings live in `~/.boxit/config.toml`, or in the file named by
//! `BOXIT_CONFIG`. Every section and key is optional.
//!
//! ```toml
//! [executor]
//! trace = "failures"   # off | failures | all
//!
//! [record]
//! excluded_keys = ["constructor", "new"]
//! ```

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_ENV_VAR: &str = "BOXIT_CONFIG";

const DEFAULT_EXCLUDED_KEYS: &[&str] = &["constructor"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoxitConfig {
    pub executor: ExecutorConfig,
    pub record: RecordConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutorConfig {
    pub trace: OutcomeTrace,
}

/// Which captured outcomes emit `tracing` events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeTrace {
    Off,
    #[default]
    Failures,
    All,
}

impl OutcomeTrace {
    #[must_use]
    pub fn failures(self) -> bool {
        matches!(self, OutcomeTrace::Failures | OutcomeTrace::All)
    }

    #[must_use]
    pub fn successes(self) -> bool {
        matches!(self, OutcomeTrace::All)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecordConfig {
    /// Property names never wrapped or copied when boxing a record.
    pub excluded_keys: Vec<String>,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            excluded_keys: DEFAULT_EXCLUDED_KEYS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl RecordConfig {
    #[must_use]
    pub fn is_excluded(&self, key: &str) -> bool {
        self.excluded_keys.iter().any(|excluded| excluded == key)
    }
}

impl BoxitConfig {
    /// Load from the default location, falling back to defaults.
    ///
    /// A missing file is not an error. Unreadable or malformed files are
    /// logged and ignored.
    #[must_use]
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(%err, "Ignoring boxit config");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }
}

fn config_path() -> Option<PathBuf> {
    if let Some(explicit) = env::var_os(CONFIG_ENV_VAR).filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(explicit));
    }
    dirs::home_dir().map(|home| home.join(".boxit").join("config.toml"))
}
