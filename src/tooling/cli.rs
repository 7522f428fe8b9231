//! CLI Tooling
//!
//! Command-line interface for publishing targets, previewing changes and
//! checking configuration.

use crate::config::{ConfigLoader, LoadedConfig, PublishConfig, Target};
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::remote::{GatedRemote, NotionClient, RemoteStore};
use crate::store::JsonCacheStore;
use crate::sync::{ResolvedTarget, SyncEngine, SyncOptions, SyncReport};
use crate::tooling::format::{format_diff, format_sync_reports, format_validation};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// md-publish CLI - Incremental markdown publishing
#[derive(Parser)]
#[command(name = "md-publish")]
#[command(about = "Publish a markdown directory tree to Notion, updating only what changed")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (default: md-publish.yml in the current directory)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Configured logging with command-line overrides applied.
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut logging = base.clone();
        if let Some(level) = &self.log_level {
            logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            logging.file = Some(file.clone());
        }
        logging
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Publish targets to Notion
    Sync {
        /// Only publish this target
        #[arg(long, short = 't')]
        target: Option<String>,

        /// Show what would be created without calling Notion
        #[arg(long)]
        dry_run: bool,

        /// Ignore the cache and rewrite every page
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Show local changes since the last sync
    Diff {
        /// Only diff this target
        #[arg(long, short = 't')]
        target: Option<String>,
    },
    /// Validate the configuration file
    Validate,
}

/// Rendered result of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    /// False when any page failed to publish
    pub success: bool,
}

impl CommandOutput {
    fn ok(text: String) -> Self {
        Self {
            text,
            success: true,
        }
    }
}

/// CLI context: the loaded configuration and the paths it resolves against.
pub struct CliContext {
    loaded: LoadedConfig,
}

impl CliContext {
    /// Load configuration from `config_path`, or from the default file in `cwd`.
    pub fn new(cwd: &Path, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let loaded = ConfigLoader::load(config_path.as_deref(), cwd)?;
        Ok(Self { loaded })
    }

    pub fn from_loaded(loaded: LoadedConfig) -> Self {
        Self { loaded }
    }

    pub fn config(&self) -> &PublishConfig {
        &self.loaded.config
    }

    /// Execute a command
    pub async fn execute(&self, command: &Commands) -> Result<CommandOutput, ApiError> {
        match command {
            Commands::Sync {
                target,
                dry_run,
                force,
            } => {
                let options = SyncOptions {
                    dry_run: *dry_run,
                    force: *force,
                };
                let store: Option<Arc<dyn RemoteStore>> = if options.dry_run {
                    None
                } else {
                    let token = self.config().resolve_token()?;
                    let notion = &self.config().notion;
                    let client =
                        NotionClient::new(&token, &notion.api_base_url, &notion.api_version)?;
                    Some(Arc::new(client) as Arc<dyn RemoteStore>)
                };
                self.sync(store, target.as_deref(), options).await
            }
            Commands::Diff { target } => self.diff(target.as_deref()),
            Commands::Validate => {
                let token_present = self.config().resolve_token().is_ok();
                Ok(CommandOutput::ok(format_validation(
                    self.config(),
                    token_present,
                )))
            }
        }
    }

    /// Publish the selected targets through `store` (`None` only for dry runs).
    pub async fn sync(
        &self,
        store: Option<Arc<dyn RemoteStore>>,
        target: Option<&str>,
        options: SyncOptions,
    ) -> Result<CommandOutput, ApiError> {
        let engine = self.engine(store);
        let mut reports: Vec<SyncReport> = Vec::new();
        for target in self.config().select_targets(target)? {
            let resolved = self.resolve(target);
            info!(target = %resolved.name, "Syncing target");
            reports.push(engine.sync_target(&resolved, options).await?);
        }
        Ok(CommandOutput {
            success: reports.iter().all(SyncReport::is_success),
            text: format_sync_reports(&reports),
        })
    }

    fn diff(&self, target: Option<&str>) -> Result<CommandOutput, ApiError> {
        let engine = self.engine(None);
        let mut sections = Vec::new();
        for target in self.config().select_targets(target)? {
            let snapshot = engine.snapshot(&self.resolve(target), false)?;
            sections.push(format_diff(&target.name, &snapshot));
        }
        Ok(CommandOutput::ok(sections.join("\n")))
    }

    fn engine(&self, store: Option<Arc<dyn RemoteStore>>) -> SyncEngine {
        let remote = store.map(|store| GatedRemote::new(store, self.config().sync.gate()));
        let cache_dir = self.config().cache.resolve_dir(self.loaded.config_dir());
        SyncEngine::new(remote, Arc::new(JsonCacheStore::new(cache_dir)))
    }

    fn resolve(&self, target: &Target) -> ResolvedTarget {
        ResolvedTarget {
            name: target.name.clone(),
            src_root: target.resolve_src(self.loaded.config_dir()),
            parent_page_id: target.parent_page_id.clone(),
        }
    }
}
