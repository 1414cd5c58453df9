//! CLI error types using miette for readable diagnostics.

// Fields in these structs are read by miette's Diagnostic derive macro
#![allow(unused)]

use catalog_sync::{LanguageError, SyncError};
use catalog_sync_toml::ConfigError;
use miette::Diagnostic;
use thiserror::Error;

/// Error when the configuration cannot be loaded or does not validate.
#[derive(Debug, Diagnostic, Error)]
#[error("invalid configuration")]
#[diagnostic(code(catalog_sync::config::invalid))]
pub struct InvalidConfigError {
    /// The underlying configuration error.
    #[source]
    pub source: ConfigError,

    /// Suggestion for fixing the problem.
    #[help]
    pub help: Option<String>,
}

impl From<ConfigError> for InvalidConfigError {
    fn from(source: ConfigError) -> Self {
        let help = match &source {
            ConfigError::NotFound(_) => Some("Check the path passed to --config".to_string()),
            ConfigError::ParseError(_) => Some(
                "Known keys are source_language, target_languages, catalog_dir, \
                 strict_targets, max_concurrency and the [provider] table"
                    .to_string(),
            ),
            ConfigError::NoTargetLanguages => Some(
                "Set target_languages in catalog-sync.toml, CATALOG_SYNC_TARGET_LANGUAGES, \
                 or pass --target fr,de"
                    .to_string(),
            ),
            ConfigError::InvalidLanguage { .. } => {
                Some("Use a valid BCP 47 language tag (e.g., 'en', 'pt-BR', 'zh-Hant')".to_string())
            },
            ConfigError::TargetIsSource(_) => {
                Some("Remove the source language from the target list".to_string())
            },
            ConfigError::InvalidConcurrency => {
                Some("Use a max_concurrency (or --concurrency) of 1 or more".to_string())
            },
            ConfigError::InvalidTimeout => {
                Some("Set provider.timeout_ms to 1 or more, or remove it".to_string())
            },
            ConfigError::ReadError(_) => None,
        };
        Self { source, help }
    }
}

/// Error when the source catalog is absent or unreadable.
#[derive(Debug, Diagnostic, Error)]
#[error("source catalog '{language}' could not be loaded from {path}")]
#[diagnostic(
    code(catalog_sync::source::missing),
    help("Create {path} as a JSON object, or change source_language")
)]
pub struct SourceMissingError {
    /// The source language tag.
    pub language: String,

    /// Where the catalog was expected.
    pub path: String,

    /// The store error, when the file exists but could not be read.
    #[source]
    pub cause: Option<catalog_sync::StoreError>,
}

impl SourceMissingError {
    pub fn new(err: SyncError, path: String) -> Self {
        let SyncError::SourceMissing { language, source } = err;
        Self {
            language,
            path,
            cause: source,
        }
    }
}

/// A target language whose pipeline failed.
#[derive(Debug, Diagnostic, Error)]
#[error("failed to sync '{language}'")]
#[diagnostic(code(catalog_sync::sync::language_failed), severity(Error))]
pub struct LanguageFailure {
    /// The target language tag.
    pub language: String,

    /// The failure and its causes.
    #[help]
    pub reason: String,
}

impl From<&LanguageError> for LanguageFailure {
    fn from(err: &LanguageError) -> Self {
        Self {
            language: err.language().to_string(),
            reason: error_chain(err),
        }
    }
}

/// Report for a sync run in which some languages failed.
#[derive(Debug, Diagnostic, Error)]
#[error("sync failed for {failed_count} of {total_count} language(s)")]
#[diagnostic(code(catalog_sync::sync::report))]
pub struct SyncFailureReport {
    /// Number of languages that failed.
    pub failed_count: usize,

    /// Number of languages attempted.
    pub total_count: usize,

    /// One diagnostic per failed language.
    #[related]
    pub failures: Vec<LanguageFailure>,
}

/// A target catalog that differs from the source.
#[derive(Debug, Diagnostic, Error)]
#[error("catalog '{language}' is out of sync: {missing} missing, {obsolete} obsolete")]
#[diagnostic(
    code(catalog_sync::check::out_of_sync),
    severity(Error),
    help("Run `catalog-sync sync` to update it")
)]
pub struct OutOfSyncLanguage {
    /// The target language tag.
    pub language: String,

    /// Number of keys the target lacks.
    pub missing: usize,

    /// Number of keys the source no longer has.
    pub obsolete: usize,
}

/// A check diagnostic: either a stale catalog or one that could not be inspected.
#[derive(Debug, Diagnostic, Error)]
pub enum CheckIssue {
    #[error(transparent)]
    #[diagnostic(transparent)]
    OutOfSync(#[from] OutOfSyncLanguage),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Failed(#[from] LanguageFailure),
}

/// Report for a check run that found problems.
#[derive(Debug, Diagnostic, Error)]
#[error("check found {issue_count} catalog(s) out of sync")]
#[diagnostic(code(catalog_sync::check::report))]
pub struct CheckReport {
    /// Number of problem catalogs.
    pub issue_count: usize,

    /// One diagnostic per problem catalog.
    #[related]
    pub issues: Vec<CheckIssue>,
}

#[derive(Debug, Diagnostic, Error)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] InvalidConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    SourceMissing(#[from] SourceMissingError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    SyncFailed(#[from] SyncFailureReport),

    #[error(transparent)]
    #[diagnostic(transparent)]
    OutOfSync(#[from] CheckReport),

    #[error("IO error: {0}")]
    #[diagnostic(code(catalog_sync::io))]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    #[diagnostic(code(catalog_sync::other))]
    Other(String),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Config(err.into())
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::Other(format!("{:#}", err))
    }
}

/// Renders an error followed by its causes, separated by `: `.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
