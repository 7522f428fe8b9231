//! Environment variable source: MD_PUBLISH__* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;
use std::collections::HashMap;

/// Prefix of configuration overrides; `MD_PUBLISH__SYNC__CONCURRENCY`
/// sets `sync.concurrency`.
pub const ENV_PREFIX: &str = "MD_PUBLISH";

/// Add environment variable overlay to builder.
///
/// `vars` replaces the process environment when given.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    vars: Option<HashMap<String, String>>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .source(vars),
    );
    Ok(builder)
}
