use crate::core::CliError;
use anyhow::Context as _;
use catalog_sync::{CopySourceTranslator, JsonDirStore, Translator};
use catalog_sync_http::{LibreTranslateClient, LibreTranslateConfig};
use catalog_sync_toml::{CatalogSyncToml, Overrides, ProviderKind, SyncConfig, split_languages};
use clap::Args;
use std::path::{Path, PathBuf};

/// Options shared by every command.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Path to the configuration file (defaults to ./catalog-sync.toml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the catalogs.
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Source language tag.
    #[arg(long, global = true)]
    pub source: Option<String>,

    /// Target language tags, comma separated.
    #[arg(long, global = true)]
    pub target: Option<String>,

    /// Deterministic output for end-to-end tests (no colors, no progress bars).
    #[arg(long, global = true, hide = true)]
    pub e2e: bool,

    /// Log diagnostics to stderr (repeat for more detail).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl GlobalArgs {
    fn flag_overrides(&self) -> Overrides {
        Overrides {
            source_language: self.source.clone(),
            target_languages: self.target.as_deref().map(split_languages),
            catalog_dir: self.dir.clone(),
            ..Overrides::default()
        }
    }
}

/// Resolves the configuration: file, then environment, then flags.
///
/// `command` carries overrides only a specific command accepts.
pub fn load_config(global: &GlobalArgs, command: Overrides) -> Result<SyncConfig, CliError> {
    let (file, base_dir) = match &global.config {
        Some(path) => {
            let file = CatalogSyncToml::read_from_path(path)?;
            let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            (Some(file), base_dir)
        },
        None => {
            let base_dir = PathBuf::new();
            (CatalogSyncToml::read_from_dir(Path::new("."))?, base_dir)
        },
    };

    let overrides = command
        .or(global.flag_overrides())
        .or(Overrides::from_env());
    let config = SyncConfig::resolve(file, &base_dir, overrides)?;
    tracing::debug!(
        "catalogs in {}, source {}, {} target(s)",
        config.catalog_dir.display(),
        config.source_language,
        config.target_languages.len()
    );
    Ok(config)
}

/// The store for the configured catalog directory.
pub fn open_store(config: &SyncConfig) -> JsonDirStore {
    JsonDirStore::new(&config.catalog_dir)
}

/// Builds the configured translation provider.
pub fn build_translator(config: &SyncConfig) -> anyhow::Result<Box<dyn Translator>> {
    match config.provider.kind {
        ProviderKind::Copy => Ok(Box::new(CopySourceTranslator)),
        ProviderKind::LibreTranslate => {
            let client = LibreTranslateClient::new(LibreTranslateConfig {
                endpoint: config.provider.endpoint.clone(),
                source_language: config.source_language.clone(),
                api_key: config.provider.api_key.clone(),
                timeout: config.provider.timeout,
            })
            .context("failed to set up the LibreTranslate client")?;
            Ok(Box::new(client))
        },
    }
}
