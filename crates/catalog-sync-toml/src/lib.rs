#![doc = include_str!("../README.md")]

use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use unic_langid::{LanguageIdentifier, LanguageIdentifierError};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "catalog-sync.toml";
/// Source language used when none is configured.
pub const DEFAULT_SOURCE_LANGUAGE: &str = "en";
/// Catalog directory used when none is configured.
pub const DEFAULT_CATALOG_DIR: &str = "locales";
/// Default cap on simultaneous translation calls.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;
/// Default per-call timeout for the translation provider.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Default LibreTranslate endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://libretranslate.com/translate";

/// Environment variable overriding the source language.
pub const ENV_SOURCE_LANGUAGE: &str = "CATALOG_SYNC_SOURCE_LANGUAGE";
/// Environment variable overriding the target languages (comma separated).
pub const ENV_TARGET_LANGUAGES: &str = "CATALOG_SYNC_TARGET_LANGUAGES";
/// Environment variable overriding the catalog directory.
pub const ENV_CATALOG_DIR: &str = "CATALOG_SYNC_CATALOG_DIR";
/// Environment variable holding the provider API key.
pub const ENV_API_KEY: &str = "CATALOG_SYNC_API_KEY";
/// Environment variable overriding the provider endpoint.
pub const ENV_ENDPOINT: &str = "CATALOG_SYNC_ENDPOINT";

/// Errors raised while reading or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist.
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),
    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse configuration file.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),
    /// No target language was configured.
    #[error("no target languages specified")]
    NoTargetLanguages,
    /// A configured language tag does not parse.
    #[error("Invalid language identifier '{name}'")]
    InvalidLanguage {
        /// The invalid identifier.
        name: String,
        /// The parsing error produced by `unic-langid`.
        #[source]
        source: LanguageIdentifierError,
    },
    /// A target language equals the source language.
    #[error("target language '{0}' is the source language")]
    TargetIsSource(String),
    /// `max_concurrency` was zero.
    #[error("max_concurrency must be at least 1")]
    InvalidConcurrency,
    /// `provider.timeout_ms` was zero.
    #[error("timeout_ms must be at least 1")]
    InvalidTimeout,
}

/// Which translation backend to use.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// A LibreTranslate-compatible HTTP API.
    #[default]
    LibreTranslate,
    /// Copy the source text verbatim.
    Copy,
}

/// The `[provider]` table.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderToml {
    /// Backend selection.
    pub kind: ProviderKind,
    /// Endpoint URL for HTTP backends.
    pub endpoint: Option<String>,
    /// API key sent with each request.
    pub api_key: Option<String>,
    /// Per-call timeout in milliseconds.
    pub timeout_ms: Option<u64>,
}

/// The contents of `catalog-sync.toml`, before defaults are applied.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogSyncToml {
    /// The source language tag (e.g. "en").
    pub source_language: Option<String>,
    /// Target language tags, in processing order.
    pub target_languages: Vec<String>,
    /// Directory holding `<tag>.json` catalogs, relative to the config file.
    pub catalog_dir: Option<PathBuf>,
    /// Refuse to rebuild target catalogs that fail to parse.
    pub strict_targets: Option<bool>,
    /// Cap on simultaneous translation calls.
    pub max_concurrency: Option<usize>,
    /// Provider settings.
    pub provider: ProviderToml,
}

impl CatalogSyncToml {
    /// Reads the configuration from a path.
    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: CatalogSyncToml = toml::from_str(&content)?;

        Ok(config)
    }

    /// Reads `catalog-sync.toml` from `dir` if present.
    pub fn read_from_dir(dir: &Path) -> Result<Option<Self>, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(None);
        }
        Self::read_from_path(path).map(Some)
    }
}

/// Settings that take precedence over the configuration file.
///
/// Built from the environment and from command-line flags; see [`Overrides::or`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overrides {
    /// Source language tag.
    pub source_language: Option<String>,
    /// Target language tags.
    pub target_languages: Option<Vec<String>>,
    /// Catalog directory.
    pub catalog_dir: Option<PathBuf>,
    /// Provider backend.
    pub provider: Option<ProviderKind>,
    /// Provider endpoint.
    pub endpoint: Option<String>,
    /// Provider API key.
    pub api_key: Option<String>,
    /// Cap on simultaneous translation calls.
    pub max_concurrency: Option<usize>,
}

impl Overrides {
    /// Reads the `CATALOG_SYNC_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds overrides from an arbitrary variable lookup. Blank values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            source_language: get(ENV_SOURCE_LANGUAGE).map(|v| v.trim().to_string()),
            target_languages: get(ENV_TARGET_LANGUAGES).map(|v| split_languages(&v)),
            catalog_dir: get(ENV_CATALOG_DIR).map(PathBuf::from),
            provider: None,
            endpoint: get(ENV_ENDPOINT),
            api_key: get(ENV_API_KEY),
            max_concurrency: None,
        }
    }

    /// Fills every unset field from `lower`.
    pub fn or(self, lower: Overrides) -> Overrides {
        Overrides {
            source_language: self.source_language.or(lower.source_language),
            target_languages: self.target_languages.or(lower.target_languages),
            catalog_dir: self.catalog_dir.or(lower.catalog_dir),
            provider: self.provider.or(lower.provider),
            endpoint: self.endpoint.or(lower.endpoint),
            api_key: self.api_key.or(lower.api_key),
            max_concurrency: self.max_concurrency.or(lower.max_concurrency),
        }
    }
}

/// Splits a comma separated language list, dropping blanks.
pub fn split_languages(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolved translation provider settings.
#[derive(Clone, Debug, PartialEq)]
pub struct ProviderConfig {
    /// Backend selection.
    pub kind: ProviderKind,
    /// Endpoint URL.
    pub endpoint: String,
    /// API key, if any.
    pub api_key: Option<String>,
    /// Per-call timeout.
    pub timeout: Duration,
}

/// Fully resolved and validated configuration for one run.
#[derive(Clone, Debug, PartialEq)]
pub struct SyncConfig {
    /// The source language tag.
    pub source_language: String,
    /// Target language tags, deduplicated, in configured order.
    pub target_languages: Vec<String>,
    /// Directory holding the catalogs.
    pub catalog_dir: PathBuf,
    /// Refuse to rebuild unreadable target catalogs.
    pub strict_targets: bool,
    /// Cap on simultaneous translation calls.
    pub max_concurrency: usize,
    /// Provider settings.
    pub provider: ProviderConfig,
}

impl SyncConfig {
    /// Combines an optional configuration file with overrides and validates the result.
    ///
    /// A `catalog_dir` taken from the file is resolved against `base_dir`
    /// (normally the directory containing the file); one taken from the
    /// overrides is used as given.
    pub fn resolve(
        file: Option<CatalogSyncToml>,
        base_dir: &Path,
        overrides: Overrides,
    ) -> Result<Self, ConfigError> {
        let file = file.unwrap_or_default();

        let source_language = overrides
            .source_language
            .or(file.source_language)
            .unwrap_or_else(|| DEFAULT_SOURCE_LANGUAGE.to_string());
        let source_id = validate_language(&source_language)?;

        // Tags are compared in canonical form; the first spelling given is kept.
        let requested = overrides.target_languages.unwrap_or(file.target_languages);
        let mut target_languages: Vec<String> = Vec::with_capacity(requested.len());
        let mut seen: Vec<LanguageIdentifier> = Vec::with_capacity(requested.len());
        for language in requested {
            let id = validate_language(&language)?;
            if id == source_id {
                return Err(ConfigError::TargetIsSource(language));
            }
            if !seen.contains(&id) {
                seen.push(id);
                target_languages.push(language);
            }
        }
        if target_languages.is_empty() {
            return Err(ConfigError::NoTargetLanguages);
        }

        let catalog_dir = match overrides.catalog_dir {
            Some(dir) => dir,
            None => base_dir.join(
                file.catalog_dir
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_DIR)),
            ),
        };

        let max_concurrency = overrides
            .max_concurrency
            .or(file.max_concurrency)
            .unwrap_or(DEFAULT_MAX_CONCURRENCY);
        if max_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }

        let timeout_ms = file.provider.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        let provider = ProviderConfig {
            kind: overrides.provider.unwrap_or(file.provider.kind),
            endpoint: overrides
                .endpoint
                .or(file.provider.endpoint)
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            api_key: overrides.api_key.or(file.provider.api_key),
            timeout: Duration::from_millis(timeout_ms),
        };

        Ok(Self {
            source_language,
            target_languages,
            catalog_dir,
            strict_targets: file.strict_targets.unwrap_or(false),
            max_concurrency,
            provider,
        })
    }
}

/// Checks that `name` is a well-formed language tag.
pub fn validate_language(name: &str) -> Result<LanguageIdentifier, ConfigError> {
    name.parse::<LanguageIdentifier>()
        .map_err(|source| ConfigError::InvalidLanguage {
            name: name.to_string(),
            source,
        })
}
