//! Sync command: translate missing keys into every target catalog and drop obsolete ones.

use crate::commands::common::{self, GlobalArgs};
use crate::commands::dry_run::DryRunDiff;
use crate::core::{CliError, LanguageFailure, SourceMissingError, SyncFailureReport};
use crate::utils::ui;
use anyhow::Context as _;
use catalog_sync::{
    CopySourceTranslator, Outcome, ReconcileOptions, Reconciler, Translator, translation_pool,
};
use catalog_sync_toml::{Overrides, ProviderKind};
use clap::Parser;

/// Arguments for the sync command.
#[derive(Debug, Parser)]
pub struct SyncArgs {
    /// Dry run - show what would change without writing. Missing keys are filled with the source text.
    #[arg(long)]
    pub dry_run: bool,

    /// Translation provider to use.
    #[arg(long, value_parser = parse_provider)]
    pub provider: Option<ProviderKind>,

    /// Maximum number of translation calls in flight.
    #[arg(long)]
    pub concurrency: Option<usize>,
}

fn parse_provider(value: &str) -> Result<ProviderKind, String> {
    match value {
        "libretranslate" => Ok(ProviderKind::LibreTranslate),
        "copy" => Ok(ProviderKind::Copy),
        other => Err(format!(
            "unknown provider '{}' (expected 'libretranslate' or 'copy')",
            other
        )),
    }
}

/// Run the sync command.
pub fn run_sync(args: SyncArgs, global: &GlobalArgs) -> Result<(), CliError> {
    let config = common::load_config(
        global,
        Overrides {
            provider: args.provider,
            max_concurrency: args.concurrency,
            ..Overrides::default()
        },
    )?;

    ui::print_sync_header(&config.source_language, &config.target_languages);

    let store = common::open_store(&config);
    let translator: Box<dyn Translator> = if args.dry_run {
        Box::new(CopySourceTranslator)
    } else {
        common::build_translator(&config)?
    };
    let pool = translation_pool(config.max_concurrency)
        .context("failed to start translation workers")?;
    let reconciler = Reconciler::new(&store, translator.as_ref(), &pool).with_options(
        ReconcileOptions {
            dry_run: args.dry_run,
            strict_targets: config.strict_targets,
        },
    );

    let source = reconciler
        .load_source(&config.source_language)
        .map_err(|err| {
            let path = store.catalog_path(&config.source_language);
            SourceMissingError::new(err, path.display().to_string())
        })?;

    let pb = ui::create_progress_bar(
        config.target_languages.len() as u64,
        "Syncing catalogs...",
    );
    let summary = reconciler.run_observed(&source, &config.target_languages, &|language: &str| {
        pb.set_message(format!("Synced {}", language));
        pb.inc(1);
    });
    pb.finish_and_clear();

    for report in &summary.reports {
        ui::print_language_report(report, args.dry_run);
        if let Outcome::DryRun { catalog } = &report.outcome {
            DryRunDiff::against_store(&store, &report.language, catalog)?.print();
        }
    }

    let failures: Vec<LanguageFailure> = summary.failures.iter().map(LanguageFailure::from).collect();
    for failure in &failures {
        ui::print_language_failed(&failure.language, &failure.reason);
    }

    let changed = summary.languages_changed();
    if changed == 0 && failures.is_empty() {
        ui::print_all_in_sync();
    } else if args.dry_run {
        ui::print_sync_dry_run_summary(summary.keys_added(), summary.keys_removed(), changed);
    } else {
        ui::print_sync_summary(summary.keys_added(), summary.keys_removed(), changed);
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(CliError::SyncFailed(SyncFailureReport {
            failed_count: failures.len(),
            total_count: config.target_languages.len(),
            failures,
        }))
    }
}
