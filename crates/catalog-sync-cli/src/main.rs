use catalog_sync_cli::commands::{CheckArgs, GlobalArgs, SyncArgs, run_check, run_sync};
use catalog_sync_cli::utils::ui;
use clap::{Parser, Subcommand};
use miette::Result as MietteResult;

#[derive(Parser)]
#[command(name = "catalog-sync")]
#[command(about = "Keep JSON translation catalogs in sync with the source language")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate missing keys into every target catalog and remove obsolete ones
    Sync(SyncArgs),

    /// Report target catalogs that are out of sync (exits non-zero when any is)
    Check(CheckArgs),
}

fn main() -> MietteResult<()> {
    let cli = Cli::parse();

    ui::set_e2e_mode(cli.global.e2e);
    let color = !ui::is_e2e();
    miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(color)
                .unicode(color)
                .context_lines(2)
                .tab_width(4)
                .color(color)
                .build(),
        )
    }))
    .ok();

    ui::init_logging(cli.global.verbose);

    let result = match cli.command {
        Commands::Sync(args) => run_sync(args, &cli.global),
        Commands::Check(args) => run_check(args, &cli.global),
    };

    result.map_err(miette::Report::new)
}
