//! Built-in defaults every merge starts from.

use crate::config::CONFIG_VERSION;
use crate::remote::notion::{DEFAULT_API_BASE_URL, DEFAULT_API_VERSION};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Builder seeded with the defaults of every scalar setting.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("version", i64::from(CONFIG_VERSION))?
        .set_default("notion.api_base_url", DEFAULT_API_BASE_URL)?
        .set_default("notion.api_version", DEFAULT_API_VERSION)?
        .set_default(
            "sync.concurrency",
            crate::concurrency::DEFAULT_CONCURRENCY as i64,
        )?
        .set_default(
            "sync.max_retries",
            crate::concurrency::DEFAULT_MAX_ATTEMPTS as i64,
        )?
        .set_default(
            "sync.base_delay_ms",
            crate::concurrency::DEFAULT_BASE_DELAY_MS as i64,
        )
}
