// CLI output formatting with consistent styling using indicatif and colored.
// Textual output goes through println!/eprintln!; tracing is reserved for diagnostics on stderr.

use catalog_sync::{KeyPath, LanguageReport};
use colored::Colorize as _;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const PD_TICK: Duration = Duration::from_millis(100);

static E2E_MODE: AtomicBool = AtomicBool::new(false);

/// Enable E2E mode for deterministic output (no colors, hidden progress bars).
pub fn set_e2e_mode(enabled: bool) {
    E2E_MODE.store(enabled, Ordering::SeqCst);
    if enabled {
        colored::control::set_override(false);
    }
}

pub fn is_e2e() -> bool {
    E2E_MODE.load(Ordering::SeqCst)
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(!is_e2e())
        .try_init()
        .ok();
}

pub fn create_progress_bar(len: u64, msg: &str) -> ProgressBar {
    if is_e2e() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(PD_TICK);
    pb
}

fn language_list(languages: &[String]) -> String {
    languages.join(", ")
}

pub fn print_sync_header(source: &str, targets: &[String]) {
    println!(
        "{} {} {} {}",
        "Catalog Sync".dimmed(),
        source.cyan(),
        "->".dimmed(),
        language_list(targets).cyan()
    );
}

pub fn print_check_header(source: &str, targets: &[String]) {
    println!(
        "{} {} {} {}",
        "Catalog Check".dimmed(),
        source.cyan(),
        "->".dimmed(),
        language_list(targets).cyan()
    );
}

fn print_paths(sign: &str, paths: &[KeyPath]) {
    for path in paths {
        println!("  {} {}", sign.dimmed(), path);
    }
}

pub fn print_rebuilt_unreadable(language: &str) {
    println!(
        "{} {}",
        "Rebuilding unreadable catalog".yellow(),
        language.cyan()
    );
}

pub fn print_up_to_date(language: &str) {
    println!("{} {}", language.cyan(), "is up to date".dimmed());
}

/// Prints what changed (or would change) in one language.
pub fn print_language_report(report: &LanguageReport, dry_run: bool) {
    if report.rebuilt_unreadable {
        print_rebuilt_unreadable(&report.language);
    }
    if !report.changed() {
        print_up_to_date(&report.language);
        return;
    }

    let (add_verb, remove_verb) = if dry_run {
        ("Would add".yellow(), "Would remove".yellow())
    } else {
        ("Added".green(), "Removed".green())
    };

    if !report.missing.is_empty() {
        println!(
            "{} {} key(s) to {}",
            add_verb,
            report.missing.len(),
            report.language.cyan()
        );
        print_paths("+", &report.missing);
    }
    if !report.obsolete.is_empty() {
        println!(
            "{} {} key(s) from {}",
            remove_verb,
            report.obsolete.len(),
            report.language.cyan()
        );
        print_paths("-", &report.obsolete);
    }
}

pub fn print_language_failed(language: &str, reason: &str) {
    eprintln!(
        "{} {}: {}",
        "Sync failed for".red(),
        language.white().bold(),
        reason
    );
}

pub fn print_all_in_sync() {
    println!("{}", "All catalogs are in sync!".green());
}

pub fn print_sync_summary(added: usize, removed: usize, languages: usize) {
    println!(
        "{} {} key(s) added, {} removed across {} catalog(s)",
        "Done:".green(),
        added,
        removed,
        languages
    );
}

pub fn print_sync_dry_run_summary(added: usize, removed: usize, languages: usize) {
    println!(
        "{} {} key(s) added, {} removed across {} catalog(s)",
        "Dry run:".yellow(),
        added,
        removed,
        languages
    );
}

pub fn print_out_of_sync(language: &str, missing: &[KeyPath], obsolete: &[KeyPath]) {
    println!(
        "{} {} ({} missing, {} obsolete)",
        "Out of sync:".red(),
        language.cyan(),
        missing.len(),
        obsolete.len()
    );
    print_paths("+", missing);
    print_paths("-", obsolete);
}

pub fn print_check_success() {
    println!("{}", "No issues found!".green());
}

pub fn print_diff(old: &str, new: &str) {
    use similar::{ChangeTag, TextDiff};

    let diff = TextDiff::from_lines(old, new);

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            println!("{}", "  ...".dimmed());
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => "-",
                    ChangeTag::Insert => "+",
                    ChangeTag::Equal => " ",
                };
                let line = format!("{} {}", sign, change);
                match change.tag() {
                    ChangeTag::Delete => print!("{}", line.red()),
                    ChangeTag::Insert => print!("{}", line.green()),
                    ChangeTag::Equal => print!("{}", line.dimmed()),
                }
            }
        }
    }
}
