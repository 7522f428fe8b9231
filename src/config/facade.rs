//! ConfigLoader facade delegating to merge service.

use super::merge::MergeService;
use super::sources::workspace_file::{find_config_file, DEFAULT_CONFIG_FILES};
use super::PublishConfig;
use crate::error::ApiError;
use std::path::{Path, PathBuf};

/// A validated configuration and the file it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: PublishConfig,
    pub path: PathBuf,
}

impl LoadedConfig {
    /// Directory relative paths in the config resolve against.
    pub fn config_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load `explicit` if given, else the first default config file in `cwd`.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<LoadedConfig, ApiError> {
        let path = match explicit {
            Some(path) => cwd.join(path),
            None => find_config_file(cwd).ok_or_else(|| {
                ApiError::ConfigError(format!(
                    "Config file not found: {}",
                    DEFAULT_CONFIG_FILES.join(" or ")
                ))
            })?,
        };
        Self::load_from_file(&path)
    }

    /// Load and validate a specific file.
    pub fn load_from_file(path: &Path) -> Result<LoadedConfig, ApiError> {
        if !path.is_file() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config = MergeService::load_from_file(path)?;
        config.validate()?;
        Ok(LoadedConfig {
            config,
            path: dunce::canonicalize(path)?,
        })
    }
}
