//! Configuration
//!
//! Publishing targets, API settings and runtime tuning, loaded from
//! `md-publish.yml` through [`ConfigLoader`]. Values are merged from built-in
//! defaults, the YAML file and `MD_PUBLISH__*` environment variables, in that
//! order of precedence.

pub mod facade;
pub mod merge;
pub mod sources;

pub use facade::{ConfigLoader, LoadedConfig};

use crate::concurrency::{RemoteGate, RetryPolicy};
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::remote::notion::{DEFAULT_API_BASE_URL, DEFAULT_API_VERSION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Only supported configuration format version
pub const CONFIG_VERSION: u32 = 1;

/// Cache directory used when none is configured, relative to the config file
pub const DEFAULT_CACHE_DIR: &str = ".md-publish-cache";

/// Root configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishConfig {
    #[serde(default)]
    pub version: u32,

    #[serde(default)]
    pub notion: NotionConfig,

    #[serde(default)]
    pub targets: Vec<Target>,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotionConfig {
    /// Name of the environment variable holding the integration token
    #[serde(default)]
    pub token_env: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            token_env: String::new(),
            api_base_url: default_api_base_url(),
            api_version: default_api_version(),
        }
    }
}

/// A source directory published below a parent page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    #[serde(default)]
    pub name: String,

    /// Source directory, relative to the config file
    #[serde(default)]
    pub src: String,

    #[serde(default)]
    pub parent_page_id: String,
}

impl Target {
    /// Absolute source directory.
    pub fn resolve_src(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(&self.src)
    }
}

/// Remote call tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Remote calls allowed in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Attempts per remote call when rate limited
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_concurrency() -> usize {
    crate::concurrency::DEFAULT_CONCURRENCY
}

fn default_max_retries() -> usize {
    crate::concurrency::DEFAULT_MAX_ATTEMPTS
}

fn default_base_delay_ms() -> u64 {
    crate::concurrency::DEFAULT_BASE_DELAY_MS
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl SyncConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.base_delay_ms))
    }

    pub fn gate(&self) -> RemoteGate {
        RemoteGate::new(self.concurrency, self.retry_policy())
    }
}

/// Cache location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory, relative to the config file
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl CacheConfig {
    pub fn resolve_dir(&self, config_dir: &Path) -> PathBuf {
        match &self.dir {
            Some(dir) => config_dir.join(dir),
            None => config_dir.join(DEFAULT_CACHE_DIR),
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            notion: NotionConfig::default(),
            targets: Vec::new(),
            sync: SyncConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl PublishConfig {
    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.version != CONFIG_VERSION {
            return Err(ApiError::ConfigError(format!(
                "Unsupported config version: {}",
                self.version
            )));
        }
        if self.notion.token_env.trim().is_empty() {
            return Err(ApiError::ConfigError(
                "Missing notion.token_env".to_string(),
            ));
        }
        if self.targets.is_empty() {
            return Err(ApiError::ConfigError(
                "At least one target is required".to_string(),
            ));
        }
        for target in &self.targets {
            if target.name.is_empty() {
                return Err(ApiError::ConfigError("Target is missing name".to_string()));
            }
            if target.src.is_empty() {
                return Err(ApiError::ConfigError(format!(
                    "Target {:?} is missing src",
                    target.name
                )));
            }
            if target.parent_page_id.is_empty() {
                return Err(ApiError::ConfigError(format!(
                    "Target {:?} is missing parent_page_id",
                    target.name
                )));
            }
        }
        if self.sync.concurrency == 0 {
            return Err(ApiError::ConfigError(
                "sync.concurrency must be at least 1".to_string(),
            ));
        }
        if self.sync.max_retries == 0 {
            return Err(ApiError::ConfigError(
                "sync.max_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Targets to run: the named one, or all of them.
    pub fn select_targets(&self, name: Option<&str>) -> Result<Vec<&Target>, ApiError> {
        match name {
            None => Ok(self.targets.iter().collect()),
            Some(name) => self
                .targets
                .iter()
                .find(|t| t.name == name)
                .map(|t| vec![t])
                .ok_or_else(|| ApiError::NotFound(format!("Target {:?}", name))),
        }
    }

    /// Read the integration token from the configured environment variable.
    pub fn resolve_token(&self) -> Result<String, ApiError> {
        std::env::var(&self.notion.token_env)
            .ok()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                ApiError::ConfigError(format!(
                    "Environment variable {} is not set",
                    self.notion.token_env
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> PublishConfig {
        PublishConfig {
            notion: NotionConfig {
                token_env: "NOTION_TOKEN".to_string(),
                ..NotionConfig::default()
            },
            targets: vec![Target {
                name: "docs".to_string(),
                src: "./docs".to_string(),
                parent_page_id: "abc123".to_string(),
            }],
            ..PublishConfig::default()
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_validation_failures() {
        let mut config = valid();
        config.version = 2;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.notion.token_env = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = valid();
        config.targets.clear();
        assert!(config.validate().is_err());

        let mut config = valid();
        config.targets[0].parent_page_id.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("parent_page_id"));

        let mut config = valid();
        config.sync.concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_select_targets() {
        let mut config = valid();
        config.targets.push(Target {
            name: "blog".to_string(),
            src: "blog".to_string(),
            parent_page_id: "def".to_string(),
        });
        assert_eq!(config.select_targets(None).unwrap().len(), 2);
        assert_eq!(config.select_targets(Some("blog")).unwrap()[0].src, "blog");
        assert!(matches!(
            config.select_targets(Some("missing")),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_resolve_token() {
        let mut config = valid();
        config.notion.token_env = "MD_PUBLISH_TEST_TOKEN_RESOLVE".to_string();
        std::env::set_var("MD_PUBLISH_TEST_TOKEN_RESOLVE", "secret_abc");
        let token = config.resolve_token();
        std::env::remove_var("MD_PUBLISH_TEST_TOKEN_RESOLVE");
        assert_eq!(token.unwrap(), "secret_abc");

        config.notion.token_env = "MD_PUBLISH_TEST_TOKEN_UNSET".to_string();
        assert!(config.resolve_token().is_err());
    }

    #[test]
    fn test_paths_resolve_against_config_dir() {
        let config = valid();
        let dir = Path::new("/work/site");
        assert_eq!(config.targets[0].resolve_src(dir), dir.join("./docs"));
        assert_eq!(config.cache.resolve_dir(dir), dir.join(".md-publish-cache"));
    }

    #[test]
    fn test_sync_gate_uses_settings() {
        let sync = SyncConfig {
            concurrency: 3,
            max_retries: 4,
            base_delay_ms: 10,
        };
        let gate = sync.gate();
        assert_eq!(gate.available_permits(), 3);
        assert_eq!(gate.retry_policy().max_attempts, 4);
        assert_eq!(gate.retry_policy().backoff(1), Duration::from_millis(20));
    }
}
