//! Translation boundary.
//!
//! [`Translator`] is the seam to the external provider. [`translate_tree`]
//! maps every non-empty string leaf of a catalog through it, on a bounded
//! thread pool, and stops at the first failure.

use crate::error::{TranslateError, TranslationFailure};
use crate::tree::{Catalog, KeyPath, Node, flatten};
use rayon::ThreadPool;
use rayon::prelude::*;
use serde_json::Value;

/// Translates a single text into a target language.
///
/// Implementations must return the text with placeholders and markup intact.
pub trait Translator: Send + Sync {
    /// Translates `text` into `target_language`.
    fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslateError>;
}

impl<F> Translator for F
where
    F: Fn(&str, &str) -> Result<String, TranslateError> + Send + Sync,
{
    fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslateError> {
        self(text, target_language)
    }
}

/// Returns every text unchanged.
///
/// Seeds new keys with the source wording. Also used for dry runs, where no
/// provider should be contacted.
#[derive(Clone, Copy, Debug, Default)]
pub struct CopySourceTranslator;

impl Translator for CopySourceTranslator {
    fn translate(&self, text: &str, _target_language: &str) -> Result<String, TranslateError> {
        Ok(text.to_string())
    }
}

/// Builds the pool that bounds the number of in-flight translation calls.
pub fn translation_pool(max_concurrency: usize) -> Result<ThreadPool, rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(max_concurrency.max(1))
        .thread_name(|i| format!("catalog-sync-{}", i))
        .build()
}

/// Result of translating a catalog subtree.
#[derive(Debug)]
pub struct TranslatedTree {
    /// The subtree with string leaves translated.
    pub catalog: Catalog,
    /// How many provider calls were made.
    pub calls: usize,
}

/// Translates every non-empty string leaf of `subtree` into `language`.
///
/// The output has the same shape as the input. Empty strings and non-string
/// leaves are copied without calling the provider.
pub fn translate_tree(
    subtree: &Catalog,
    language: &str,
    translator: &dyn Translator,
    pool: &ThreadPool,
) -> Result<TranslatedTree, TranslationFailure> {
    let jobs: Vec<(KeyPath, &str)> = flatten(subtree)
        .into_iter()
        .filter_map(|(path, value)| match value {
            Value::String(text) if !text.is_empty() => Some((path, text.as_str())),
            _ => None,
        })
        .collect();
    let calls = jobs.len();

    let translated: Vec<(KeyPath, String)> = pool.install(|| {
        jobs.into_par_iter()
            .map(|(path, text)| match translator.translate(text, language) {
                Ok(output) => Ok((path, output)),
                Err(source) => Err(TranslationFailure {
                    language: language.to_string(),
                    path,
                    source,
                }),
            })
            .collect::<Result<Vec<_>, _>>()
    })?;

    let mut catalog = subtree.clone();
    for (path, text) in translated {
        if let Some(node) = catalog.get_path_mut(&path) {
            *node = Node::Leaf(Value::String(text));
        }
    }

    Ok(TranslatedTree { catalog, calls })
}
