//! CLI command implementations.

mod check;
mod common;
mod dry_run;
mod sync;

pub use check::{CheckArgs, run_check};
pub use common::{GlobalArgs, build_translator, load_config, open_store};
pub use dry_run::DryRunDiff;
pub use sync::{SyncArgs, run_sync};
