//! YAML config file source and discovery.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::{Path, PathBuf};

/// File names searched for in the working directory, in order
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["md-publish.yml", "md-publish.yaml"];

/// First default config file present in `dir`.
pub fn find_config_file(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Add the YAML file at `path` to builder; the file must exist.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(File::from(path).format(FileFormat::Yaml).required(true)))
}
