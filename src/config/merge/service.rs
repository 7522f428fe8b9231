//! MergeService: orchestrates sources, applies merge policy, deserializes to PublishConfig.

use super::merge_policy;
use crate::config::sources::{environment, workspace_file};
use crate::config::PublishConfig;
use config::ConfigError;
use std::collections::HashMap;
use std::path::Path;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load `path` with the process environment overlaid.
    /// Precedence: defaults (lowest) -> file -> environment (highest).
    pub fn load_from_file(path: &Path) -> Result<PublishConfig, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Load `path` with an explicit environment instead of the process one.
    pub fn load_with_env(
        path: &Path,
        env: Option<HashMap<String, String>>,
    ) -> Result<PublishConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = workspace_file::add_to_builder(builder, path)?;
        let builder = environment::add_to_builder(builder, env)?;

        let config = builder.build()?;
        config.try_deserialize()
    }
}
