//! Configuration for tally.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags (applied by the CLI)
//! 2. Environment variables (TALLY_PROFILE, TALLY_FEED_URL, GOOGLE_API_KEY)
//! 3. Config file (.tally/config.yaml)
//! 4. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .tally/config.yaml

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::adapters::gemini::{GeminiConfig, DEFAULT_BASE_URL};
use crate::domain::{DomainProfile, ProfileKind};

/// Environment variable names
pub const ENV_PROFILE: &str = "TALLY_PROFILE";
pub const ENV_FEED_URL: &str = "TALLY_FEED_URL";
pub const ENV_API_KEY: &str = "GOOGLE_API_KEY";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub feed: FeedSection,
    #[serde(default)]
    pub pipeline: PipelineSection,
    #[serde(default)]
    pub oracle: OracleSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedSection {
    /// Address the feed endpoint binds to
    pub bind: Option<String>,
    /// Full URL the pipeline polls
    pub url: Option<String>,
    pub generate_interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineSection {
    pub cycle_interval_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OracleSection {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub timeout_secs: Option<u64>,
    pub base_url: Option<String>,
}

/// Feed service settings
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSettings {
    pub bind: String,
    pub url: String,
    pub generate_interval: Duration,
}

/// Pipeline loop settings
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub cycle_interval: Duration,
    pub request_timeout: Duration,
}

/// Oracle settings; no API key means the offline oracle is used
#[derive(Debug, Clone, PartialEq)]
pub struct OracleSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
    pub base_url: String,
}

impl OracleSettings {
    /// Gemini settings when an API key is available
    pub fn gemini(&self) -> Option<GeminiConfig> {
        let api_key = self.api_key.clone().filter(|k| !k.trim().is_empty())?;
        Some(GeminiConfig {
            api_key,
            model: self.model.clone(),
            temperature: self.temperature,
            base_url: self.base_url.clone(),
            timeout: self.timeout,
        })
    }
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub profile: ProfileKind,
    pub feed: FeedSettings,
    pub pipeline: PipelineSettings,
    pub oracle: OracleSettings,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

const DEFAULT_BIND: &str = "127.0.0.1:5000";
const DEFAULT_GENERATE_INTERVAL_SECS: u64 = 10;
const DEFAULT_CYCLE_INTERVAL_SECS: u64 = 5;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MODEL: &str = "gemini-1.5-pro-latest";
const DEFAULT_TEMPERATURE: f32 = 0.5;
const DEFAULT_ORACLE_TIMEOUT_SECS: u64 = 60;

impl ResolvedConfig {
    /// Merge a config file (if any) with environment lookups over defaults
    pub fn resolve<E>(
        file: Option<ConfigFile>,
        config_file: Option<PathBuf>,
        env: E,
    ) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let file = file.unwrap_or_default();

        let profile = match env(ENV_PROFILE).or(file.profile) {
            Some(raw) => raw.parse::<ProfileKind>().map_err(ConfigError::Invalid)?,
            None => ProfileKind::default(),
        };

        let bind = file.feed.bind.unwrap_or_else(|| DEFAULT_BIND.to_string());
        let url = env(ENV_FEED_URL)
            .or(file.feed.url)
            .unwrap_or_else(|| default_feed_url(&bind, profile));

        let feed = FeedSettings {
            bind,
            url,
            generate_interval: positive_secs(
                "feed.generate_interval_secs",
                file.feed.generate_interval_secs,
                DEFAULT_GENERATE_INTERVAL_SECS,
            )?,
        };

        let pipeline = PipelineSettings {
            cycle_interval: positive_secs(
                "pipeline.cycle_interval_secs",
                file.pipeline.cycle_interval_secs,
                DEFAULT_CYCLE_INTERVAL_SECS,
            )?,
            request_timeout: positive_secs(
                "pipeline.request_timeout_secs",
                file.pipeline.request_timeout_secs,
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
        };

        let oracle = OracleSettings {
            api_key: env(ENV_API_KEY),
            model: file.oracle.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: file.oracle.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            timeout: positive_secs(
                "oracle.timeout_secs",
                file.oracle.timeout_secs,
                DEFAULT_ORACLE_TIMEOUT_SECS,
            )?,
            base_url: file
                .oracle
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        };

        Ok(Self {
            profile,
            feed,
            pipeline,
            oracle,
            config_file,
        })
    }

    /// The domain profile selected by this configuration
    pub fn domain_profile(&self) -> DomainProfile {
        DomainProfile::for_kind(self.profile)
    }

    /// Switch profile; a feed URL that was derived from the old profile follows along
    pub fn with_profile(mut self, profile: ProfileKind) -> Self {
        if self.feed.url == default_feed_url(&self.feed.bind, self.profile) {
            self.feed.url = default_feed_url(&self.feed.bind, profile);
        }
        self.profile = profile;
        self
    }
}

/// URL of the local feed endpoint for `bind`
pub fn default_feed_url(bind: &str, profile: ProfileKind) -> String {
    let host = match bind.strip_prefix("0.0.0.0") {
        Some(port) => format!("127.0.0.1{}", port),
        None => bind.to_string(),
    };
    format!("http://{}{}", host, DomainProfile::for_kind(profile).route)
}

fn positive_secs(field: &str, value: Option<u64>, default: u64) -> Result<Duration, ConfigError> {
    match value.unwrap_or(default) {
        0 => Err(ConfigError::Invalid(format!("{} must be greater than zero", field))),
        secs => Ok(Duration::from_secs(secs)),
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".tally").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
pub fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load configuration from all sources.
///
/// `explicit` overrides config file discovery.
pub fn load_config(explicit: Option<&Path>) -> Result<ResolvedConfig, ConfigError> {
    let config_file = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(),
    };

    let file = match config_file.as_deref() {
        Some(path) => Some(load_config_file(path)?),
        None => None,
    };

    ResolvedConfig::resolve(file, config_file, |key| std::env::var(key).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let config = ResolvedConfig::resolve(None, None, no_env).unwrap();

        assert_eq!(config.profile, ProfileKind::Governance);
        assert_eq!(config.feed.bind, "127.0.0.1:5000");
        assert_eq!(config.feed.url, "http://127.0.0.1:5000/proposal");
        assert_eq!(config.feed.generate_interval, Duration::from_secs(10));
        assert_eq!(config.pipeline.cycle_interval, Duration::from_secs(5));
        assert!(config.oracle.gemini().is_none());
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let tally_dir = temp.path().join(".tally");
        std::fs::create_dir_all(&tally_dir).unwrap();

        let config_path = tally_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
profile: network
feed:
  bind: 0.0.0.0:8080
  generate_interval_secs: 3
pipeline:
  cycle_interval_secs: 2
oracle:
  model: gemini-1.5-flash-latest
  temperature: 0.3
"#
        )
        .unwrap();

        let parsed = load_config_file(&config_path).unwrap();
        let config =
            ResolvedConfig::resolve(Some(parsed), Some(config_path.clone()), no_env).unwrap();

        assert_eq!(config.profile, ProfileKind::Network);
        assert_eq!(config.feed.url, "http://127.0.0.1:8080/advisory");
        assert_eq!(config.feed.generate_interval, Duration::from_secs(3));
        assert_eq!(config.pipeline.cycle_interval, Duration::from_secs(2));
        assert_eq!(config.oracle.model, "gemini-1.5-flash-latest");
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = ConfigFile {
            profile: Some("governance".to_string()),
            feed: FeedSection {
                url: Some("http://file.example/proposal".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let env: HashMap<&str, &str> = [
            (ENV_PROFILE, "network"),
            (ENV_FEED_URL, "http://env.example/advisory"),
            (ENV_API_KEY, "secret"),
        ]
        .into_iter()
        .collect();

        let config =
            ResolvedConfig::resolve(Some(file), None, |k| env.get(k).map(|v| v.to_string()))
                .unwrap();

        assert_eq!(config.profile, ProfileKind::Network);
        assert_eq!(config.feed.url, "http://env.example/advisory");
        assert_eq!(config.oracle.gemini().unwrap().api_key, "secret");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad_profile = ConfigFile {
            profile: Some("finance".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            ResolvedConfig::resolve(Some(bad_profile), None, no_env),
            Err(ConfigError::Invalid(_))
        ));

        let zero_interval = ConfigFile {
            pipeline: PipelineSection {
                cycle_interval_secs: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            ResolvedConfig::resolve(Some(zero_interval), None, no_env),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_with_profile_moves_derived_url() {
        let config = ResolvedConfig::resolve(None, None, no_env)
            .unwrap()
            .with_profile(ProfileKind::Network);
        assert_eq!(config.feed.url, "http://127.0.0.1:5000/advisory");
    }

    #[test]
    fn test_with_profile_keeps_explicit_url() {
        let file = ConfigFile {
            feed: FeedSection {
                url: Some("http://remote:9000/feed".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let config = ResolvedConfig::resolve(Some(file), None, no_env)
            .unwrap()
            .with_profile(ProfileKind::Network);
        assert_eq!(config.feed.url, "http://remote:9000/feed");
    }

    #[test]
    fn test_blank_api_key_means_offline() {
        let config =
            ResolvedConfig::resolve(None, None, |k| (k == ENV_API_KEY).then(|| "  ".to_string()))
                .unwrap();
        assert!(config.oracle.gemini().is_none());
    }
}
