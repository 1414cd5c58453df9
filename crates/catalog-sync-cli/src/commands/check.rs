//! Check command: report target catalogs that differ from the source, without writing.

use crate::commands::common::{self, GlobalArgs};
use crate::core::{
    CheckIssue, CheckReport, CliError, LanguageFailure, OutOfSyncLanguage, SourceMissingError,
};
use crate::utils::ui;
use catalog_sync::Planner;
use catalog_sync_toml::Overrides;
use clap::Parser;

/// Arguments for the check command.
#[derive(Debug, Parser)]
pub struct CheckArgs {}

/// Run the check command.
pub fn run_check(_args: CheckArgs, global: &GlobalArgs) -> Result<(), CliError> {
    let config = common::load_config(global, Overrides::default())?;

    ui::print_check_header(&config.source_language, &config.target_languages);

    let store = common::open_store(&config);
    let planner = Planner::new(&store, config.strict_targets);

    let source = planner
        .load_source(&config.source_language)
        .map_err(|err| {
            let path = store.catalog_path(&config.source_language);
            SourceMissingError::new(err, path.display().to_string())
        })?;

    let mut issues: Vec<CheckIssue> = Vec::new();
    for language in &config.target_languages {
        match planner.plan(&source, language) {
            Ok(plan) if plan.is_empty() => ui::print_up_to_date(language),
            Ok(plan) => {
                let missing = plan.missing_paths();
                let obsolete = plan.obsolete_paths();
                ui::print_out_of_sync(language, &missing, &obsolete);
                issues.push(
                    OutOfSyncLanguage {
                        language: language.clone(),
                        missing: missing.len(),
                        obsolete: obsolete.len(),
                    }
                    .into(),
                );
            },
            Err(err) => {
                let failure = LanguageFailure::from(&err);
                ui::print_language_failed(&failure.language, &failure.reason);
                issues.push(failure.into());
            },
        }
    }

    if issues.is_empty() {
        ui::print_check_success();
        Ok(())
    } else {
        Err(CliError::OutOfSync(CheckReport {
            issue_count: issues.len(),
            issues,
        }))
    }
}
