#![doc = include_str!("../README.md")]

pub mod diff;
pub mod error;
pub mod prune;
pub mod reconcile;
pub mod store;
pub mod translate;
pub mod tree;

pub use diff::{CatalogDiff, diff};
pub use error::{
    LanguageError, ShapeConflict, StoreError, SyncError, TranslateError, TranslationFailure,
};
pub use prune::prune;
pub use reconcile::{
    LanguageReport, Outcome, Planner, ReconcileOptions, Reconciler, RunSummary,
};
pub use store::{CatalogStore, JsonDirStore, MemoryStore};
pub use translate::{CopySourceTranslator, Translator, translate_tree, translation_pool};
pub use tree::{Catalog, KeyPath, Node, flatten, merge_missing};
