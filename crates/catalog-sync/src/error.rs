//! Error types for catalog reconciliation.

use crate::tree::KeyPath;
use std::path::PathBuf;
use thiserror::Error;

/// A path write collided with a node of the wrong kind along its ancestor chain.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("cannot write '{path}': '{at}' already holds a {found}")]
pub struct ShapeConflict {
    /// The path that was being written.
    pub path: KeyPath,
    /// The location of the offending node.
    pub at: KeyPath,
    /// What was found at `at` (`"leaf"`, `"branch"` or `"root"`).
    pub found: &'static str,
}

/// Failure reported by a translation provider for a single text.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The request could not be sent or timed out.
    #[error("translation request failed: {0}")]
    Transport(String),
    /// The provider answered with a non-success status.
    #[error("translation provider returned status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error text reported by the provider, if any.
        message: String,
    },
    /// The provider answered with a body that could not be understood.
    #[error("malformed translation response: {0}")]
    MalformedResponse(String),
}

/// Translating a language's missing entries failed at `path`.
#[derive(Debug, Error)]
#[error("failed to translate '{path}' to {language}")]
pub struct TranslationFailure {
    /// The target language.
    pub language: String,
    /// The leaf whose translation failed.
    pub path: KeyPath,
    /// The provider error.
    #[source]
    pub source: TranslateError,
}

/// Errors raised by a [`CatalogStore`](crate::store::CatalogStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the underlying file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The stored content is not a JSON object tree.
    #[error("{path} is not a valid catalog: {reason}")]
    Parse {
        /// The file involved.
        path: PathBuf,
        /// What the parser reported.
        reason: String,
    },
    /// The catalog could not be serialized.
    #[error("failed to serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Fatal errors that stop a whole run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The source catalog is absent or unreadable.
    #[error("source catalog '{language}' could not be loaded")]
    SourceMissing {
        /// The source language tag.
        language: String,
        /// The underlying store error, `None` when the file is absent.
        #[source]
        source: Option<StoreError>,
    },
}

/// Errors that abort the pipeline of a single target language.
#[derive(Debug, Error)]
pub enum LanguageError {
    /// The target catalog exists but could not be parsed.
    #[error("target catalog '{language}' is unreadable")]
    TargetUnreadable {
        /// The target language tag.
        language: String,
        /// The store error.
        #[source]
        source: StoreError,
    },
    /// Merging translated entries hit a leaf/branch collision.
    #[error("shape conflict in catalog '{language}'")]
    ShapeConflict {
        /// The target language tag.
        language: String,
        /// The collision.
        #[source]
        source: ShapeConflict,
    },
    /// A translation call failed.
    #[error(transparent)]
    Translation(#[from] TranslationFailure),
    /// Writing the target catalog failed.
    #[error("failed to persist catalog '{language}'")]
    Persist {
        /// The target language tag.
        language: String,
        /// The store error.
        #[source]
        source: StoreError,
    },
}

impl LanguageError {
    /// The language whose pipeline failed.
    pub fn language(&self) -> &str {
        match self {
            LanguageError::TargetUnreadable { language, .. }
            | LanguageError::ShapeConflict { language, .. }
            | LanguageError::Persist { language, .. } => language,
            LanguageError::Translation(failure) => &failure.language,
        }
    }
}
