use crate::core::CliError;
use crate::utils::ui;
use catalog_sync::{Catalog, JsonDirStore};

/// Before/after text of a catalog the dry run would rewrite.
#[derive(Debug, Clone)]
pub struct DryRunDiff {
    before: String,
    after: String,
}

impl DryRunDiff {
    /// Pairs the current file text with the text a sync would write.
    pub fn new(before: String, after: String) -> Self {
        Self { before, after }
    }

    /// Compares the file currently on disk with the catalog that would replace it.
    pub fn against_store(
        store: &JsonDirStore,
        language: &str,
        proposed: &Catalog,
    ) -> Result<Self, CliError> {
        // Unparseable catalogs still have text to diff against.
        let before = store
            .read_raw(language)
            .map_err(|err| CliError::Other(err.to_string()))?
            .unwrap_or_default();
        let after = proposed
            .to_pretty_json()
            .map_err(|err| CliError::Other(err.to_string()))?;
        Ok(Self::new(before, after))
    }

    /// Prints a colored line diff with three lines of context.
    pub fn print(&self) {
        ui::print_diff(&self.before, &self.after);
    }
}
