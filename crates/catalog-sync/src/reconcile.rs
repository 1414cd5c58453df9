//! Per-language reconciliation pipeline.
//!
//! Each target language goes through `Load -> Diff -> (Skip | Translate ->
//! Merge -> Prune -> Persist)`. Languages are independent: a failure in one
//! pipeline is collected and the others still run.

use crate::diff::{CatalogDiff, diff};
use crate::error::{LanguageError, SyncError};
use crate::prune::prune;
use crate::store::CatalogStore;
use crate::translate::{Translator, translate_tree};
use crate::tree::{Catalog, KeyPath, merge_missing};
use rayon::ThreadPool;
use rayon::prelude::*;

/// Switches that change how a pass behaves.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReconcileOptions {
    /// Compute the result but never persist it.
    pub dry_run: bool,
    /// Fail a language whose existing catalog cannot be parsed, instead of
    /// rebuilding it from scratch.
    pub strict_targets: bool,
}

/// What happened to a target catalog.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// Already in sync; nothing was written.
    Skipped,
    /// The updated catalog was persisted.
    Written,
    /// Dry run: the catalog that would have been written.
    DryRun {
        /// The would-be catalog.
        catalog: Catalog,
    },
}

/// Result of one reconciliation pass.
#[derive(Clone, Debug)]
pub struct LanguageReport {
    /// The target language tag.
    pub language: String,
    /// Paths that were added, sorted.
    pub missing: Vec<KeyPath>,
    /// Paths that were removed, sorted.
    pub obsolete: Vec<KeyPath>,
    /// Number of translation calls made.
    pub translated: usize,
    /// The existing catalog could not be parsed and was rebuilt.
    pub rebuilt_unreadable: bool,
    /// What happened to the catalog.
    pub outcome: Outcome,
}

impl LanguageReport {
    /// Whether the catalog needed any change.
    pub fn changed(&self) -> bool {
        self.outcome != Outcome::Skipped
    }
}

/// Results of a whole run, in the order the languages were given.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Languages that completed.
    pub reports: Vec<LanguageReport>,
    /// Languages whose pipeline failed.
    pub failures: Vec<LanguageError>,
}

impl RunSummary {
    /// Whether every language completed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total number of keys added across languages.
    pub fn keys_added(&self) -> usize {
        self.reports.iter().map(|r| r.missing.len()).sum()
    }

    /// Total number of keys removed across languages.
    pub fn keys_removed(&self) -> usize {
        self.reports.iter().map(|r| r.obsolete.len()).sum()
    }

    /// Number of languages whose catalog changed.
    pub fn languages_changed(&self) -> usize {
        self.reports.iter().filter(|r| r.changed()).count()
    }
}

/// Loads catalogs and diffs targets against the source, without translating
/// or writing anything.
#[derive(Clone, Copy)]
pub struct Planner<'a> {
    store: &'a dyn CatalogStore,
    strict_targets: bool,
}

impl<'a> Planner<'a> {
    /// Creates a planner over `store`. See [`ReconcileOptions::strict_targets`].
    pub fn new(store: &'a dyn CatalogStore, strict_targets: bool) -> Self {
        Self {
            store,
            strict_targets,
        }
    }

    /// Loads the source catalog. Absent or unreadable is fatal.
    pub fn load_source(&self, language: &str) -> Result<Catalog, SyncError> {
        match self.store.load(language) {
            Ok(Some(catalog)) => Ok(catalog),
            Ok(None) => Err(SyncError::SourceMissing {
                language: language.to_string(),
                source: None,
            }),
            Err(err) => Err(SyncError::SourceMissing {
                language: language.to_string(),
                source: Some(err),
            }),
        }
    }

    /// Loads the target catalog for `language` and diffs it against `source`.
    pub fn plan(&self, source: &Catalog, language: &str) -> Result<CatalogDiff, LanguageError> {
        let (target, _) = self.load_target(language)?;
        Ok(diff(source, &target))
    }

    /// Loads a target catalog. Absent is empty; unreadable is empty unless
    /// `strict_targets` is set. The flag reports whether a rebuild happened.
    fn load_target(&self, language: &str) -> Result<(Catalog, bool), LanguageError> {
        match self.store.load(language) {
            Ok(Some(catalog)) => Ok((catalog, false)),
            Ok(None) => {
                tracing::debug!("{}: no catalog yet, starting empty", language);
                Ok((Catalog::new(), false))
            },
            Err(source) if self.strict_targets => Err(LanguageError::TargetUnreadable {
                language: language.to_string(),
                source,
            }),
            Err(err) => {
                tracing::warn!("{}: {}; rebuilding from source", language, err);
                Ok((Catalog::new(), true))
            },
        }
    }
}

/// Drives reconciliation of target catalogs against a source catalog.
pub struct Reconciler<'a> {
    store: &'a dyn CatalogStore,
    translator: &'a dyn Translator,
    pool: &'a ThreadPool,
    options: ReconcileOptions,
}

impl<'a> Reconciler<'a> {
    /// Creates a reconciler with default options.
    pub fn new(
        store: &'a dyn CatalogStore,
        translator: &'a dyn Translator,
        pool: &'a ThreadPool,
    ) -> Self {
        Self {
            store,
            translator,
            pool,
            options: ReconcileOptions::default(),
        }
    }

    /// Replaces the options.
    pub fn with_options(mut self, options: ReconcileOptions) -> Self {
        self.options = options;
        self
    }

    /// The load and diff half of this reconciler.
    pub fn planner(&self) -> Planner<'a> {
        Planner::new(self.store, self.options.strict_targets)
    }

    /// Loads the source catalog. Absent or unreadable is fatal.
    pub fn load_source(&self, language: &str) -> Result<Catalog, SyncError> {
        self.planner().load_source(language)
    }

    /// Loads the target catalog for `language` and diffs it against `source`.
    pub fn plan(&self, source: &Catalog, language: &str) -> Result<CatalogDiff, LanguageError> {
        self.planner().plan(source, language)
    }

    /// Runs the full pipeline for one target language.
    pub fn reconcile_language(
        &self,
        source: &Catalog,
        language: &str,
    ) -> Result<LanguageReport, LanguageError> {
        let (mut target, rebuilt_unreadable) = self.planner().load_target(language)?;

        let delta = diff(source, &target);
        let missing = delta.missing_paths();
        let obsolete = delta.obsolete_paths();
        tracing::debug!(
            "{}: {} missing, {} obsolete",
            language,
            missing.len(),
            obsolete.len()
        );

        if delta.is_empty() && !rebuilt_unreadable {
            tracing::debug!("{}: in sync, skipping", language);
            return Ok(LanguageReport {
                language: language.to_string(),
                missing,
                obsolete,
                translated: 0,
                rebuilt_unreadable,
                outcome: Outcome::Skipped,
            });
        }

        let mut translated = 0;
        if !delta.missing.is_empty() {
            let result = translate_tree(&delta.missing, language, self.translator, self.pool)?;
            translated = result.calls;
            merge_missing(&mut target, &result.catalog).map_err(|source| {
                LanguageError::ShapeConflict {
                    language: language.to_string(),
                    source,
                }
            })?;
        }

        if !delta.obsolete.is_empty() {
            let removed = prune(&mut target, &delta.obsolete);
            tracing::debug!("{}: pruned {} key(s)", language, removed);
        }

        let outcome = if self.options.dry_run {
            Outcome::DryRun { catalog: target }
        } else {
            self.store
                .save(language, &target)
                .map_err(|source| LanguageError::Persist {
                    language: language.to_string(),
                    source,
                })?;
            Outcome::Written
        };

        Ok(LanguageReport {
            language: language.to_string(),
            missing,
            obsolete,
            translated,
            rebuilt_unreadable,
            outcome,
        })
    }

    /// Reconciles every language in `targets`.
    pub fn run(&self, source: &Catalog, targets: &[String]) -> RunSummary {
        self.run_observed(source, targets, &|_: &str| {})
    }

    /// Like [`Reconciler::run`], calling `on_done` with each language as it finishes.
    pub fn run_observed(
        &self,
        source: &Catalog,
        targets: &[String],
        on_done: &(dyn Fn(&str) + Sync),
    ) -> RunSummary {
        let results: Vec<Result<LanguageReport, LanguageError>> = self.pool.install(|| {
            targets
                .par_iter()
                .map(|language| {
                    let result = self.reconcile_language(source, language);
                    if let Err(err) = &result {
                        tracing::error!("{}: {}", language, err);
                    }
                    on_done(language);
                    result
                })
                .collect()
        });

        let mut summary = RunSummary::default();
        for result in results {
            match result {
                Ok(report) => summary.reports.push(report),
                Err(err) => summary.failures.push(err),
            }
        }
        summary
    }
}
