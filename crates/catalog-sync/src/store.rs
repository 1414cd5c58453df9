//! Catalog persistence.

use crate::error::StoreError;
use crate::tree::Catalog;
use fs_err as fs;
use std::collections::HashMap;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// File extension of catalogs handled by [`JsonDirStore`].
pub const CATALOG_EXTENSION: &str = "json";

/// Reads and writes whole catalogs by language tag.
pub trait CatalogStore: Sync {
    /// Loads the catalog for `language`.
    ///
    /// Returns `Ok(None)` when no catalog exists yet.
    fn load(&self, language: &str) -> Result<Option<Catalog>, StoreError>;

    /// Replaces the catalog for `language` with `catalog`.
    fn save(&self, language: &str, catalog: &Catalog) -> Result<(), StoreError>;
}

/// Stores one `<language>.json` file per language in a directory.
#[derive(Clone, Debug)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    /// Creates a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The catalog directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the catalog file for `language`.
    pub fn catalog_path(&self, language: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", language, CATALOG_EXTENSION))
    }

    /// Reads the raw file content for `language`, or `None` if absent.
    pub fn read_raw(&self, language: &str) -> Result<Option<String>, StoreError> {
        let path = self.catalog_path(language);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

impl CatalogStore for JsonDirStore {
    fn load(&self, language: &str) -> Result<Option<Catalog>, StoreError> {
        let Some(content) = self.read_raw(language)? else {
            return Ok(None);
        };
        if content.trim().is_empty() {
            return Ok(Some(Catalog::new()));
        }
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|err| StoreError::Parse {
                path: self.catalog_path(language),
                reason: err.to_string(),
            })
    }

    fn save(&self, language: &str, catalog: &Catalog) -> Result<(), StoreError> {
        let path = self.catalog_path(language);
        let content = catalog.to_pretty_json()?;
        let io_err = |source: io::Error| StoreError::Io {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(io_err)?;

        // Write next to the target and rename over it so readers never see a
        // half-written catalog.
        let prefix = format!(".{}.", language);
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix).suffix(".tmp");
        // New catalogs get the usual umask-filtered mode, not tempfile's 0600.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt as _;
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }
        let mut tmp = builder.tempfile_in(&self.dir).map_err(io_err)?;
        match fs::metadata(&path) {
            Ok(existing) => tmp
                .as_file()
                .set_permissions(existing.permissions())
                .map_err(io_err)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {},
            Err(err) => return Err(io_err(err)),
        }
        tmp.write_all(content.as_bytes()).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&path).map_err(|err| io_err(err.error))?;

        tracing::info!("wrote {}", path.display());
        Ok(())
    }
}

/// Keeps catalogs in memory. Counts writes so callers can assert on them.
#[derive(Debug, Default)]
pub struct MemoryStore {
    catalogs: Mutex<HashMap<String, Result<Catalog, String>>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `catalog` for `language` without counting it as a write.
    pub fn with(self, language: &str, catalog: Catalog) -> Self {
        self.lock().insert(language.to_string(), Ok(catalog));
        self
    }

    /// Marks `language` as present but unreadable.
    pub fn with_unreadable(self, language: &str, reason: &str) -> Self {
        self.lock()
            .insert(language.to_string(), Err(reason.to_string()));
        self
    }

    /// Returns a copy of the catalog stored for `language`.
    pub fn get(&self, language: &str) -> Option<Catalog> {
        self.lock().get(language).and_then(|c| c.as_ref().ok().cloned())
    }

    /// Number of successful [`CatalogStore::save`] calls.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Result<Catalog, String>>> {
        // A poisoned map is still structurally valid.
        self.catalogs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl CatalogStore for MemoryStore {
    fn load(&self, language: &str) -> Result<Option<Catalog>, StoreError> {
        match self.lock().get(language) {
            None => Ok(None),
            Some(Ok(catalog)) => Ok(Some(catalog.clone())),
            Some(Err(reason)) => Err(StoreError::Parse {
                path: PathBuf::from(language),
                reason: reason.clone(),
            }),
        }
    }

    fn save(&self, language: &str, catalog: &Catalog) -> Result<(), StoreError> {
        self.lock().insert(language.to_string(), Ok(catalog.clone()));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn absent_file_loads_as_none() {
        let temp = TempDir::new().unwrap();
        let store = JsonDirStore::new(temp.path());
        assert!(store.load("fr").unwrap().is_none());
    }

    #[test]
    fn blank_file_loads_as_empty_catalog() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("fr.json"), "  \n").unwrap();
        let store = JsonDirStore::new(temp.path());
        assert_eq!(store.load("fr").unwrap(), Some(Catalog::new()));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("fr.json"), "{ not json").unwrap();
        let store = JsonDirStore::new(temp.path());
        assert!(matches!(store.load("fr"), Err(StoreError::Parse { .. })));
    }

    #[test]
    fn array_root_is_a_parse_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("fr.json"), "[1, 2]").unwrap();
        let store = JsonDirStore::new(temp.path());
        assert!(matches!(store.load("fr"), Err(StoreError::Parse { .. })));
    }

    #[test]
    fn save_writes_pretty_json_in_insertion_order() {
        let temp = TempDir::new().unwrap();
        let store = JsonDirStore::new(temp.path().join("locales"));
        let catalog = Catalog::from_value(json!({
            "zeta": "last",
            "alpha": { "count": 2, "label": "Label" }
        }))
        .unwrap();

        store.save("de", &catalog).unwrap();

        let written = std::fs::read_to_string(store.catalog_path("de")).unwrap();
        assert_snapshot!(written, @r#"
        {
          "zeta": "last",
          "alpha": {
            "count": 2,
            "label": "Label"
          }
        }
        "#);
        assert!(written.ends_with("}\n"));
        assert_eq!(store.load("de").unwrap(), Some(catalog));
    }

    #[test]
    fn save_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let store = JsonDirStore::new(temp.path());
        store.save("fr", &Catalog::new()).unwrap();
        let names: Vec<String> = std::fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["fr.json"]);
    }

    #[cfg(unix)]
    #[rstest::rstest]
    #[case(0o644)]
    #[case(0o640)]
    #[case(0o600)]
    fn save_keeps_existing_file_mode(#[case] mode: u32) {
        use std::os::unix::fs::PermissionsExt as _;

        let temp = TempDir::new().unwrap();
        let store = JsonDirStore::new(temp.path());
        let path = store.catalog_path("fr");
        std::fs::write(&path, r#"{"old": "x"}"#).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();

        store
            .save("fr", &Catalog::from_value(json!({ "new": "y" })).unwrap())
            .unwrap();

        let after = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(after, mode);
        assert_eq!(
            store.load("fr").unwrap(),
            Some(Catalog::from_value(json!({ "new": "y" })).unwrap())
        );
    }

    #[cfg(unix)]
    #[test]
    fn save_creates_new_file_with_umask_default_mode() {
        use std::os::unix::fs::PermissionsExt as _;

        let temp = TempDir::new().unwrap();
        let store = JsonDirStore::new(temp.path());
        // The umask of the test process is unknown; measure it with a plain create.
        let reference = temp.path().join("reference");
        std::fs::write(&reference, "").unwrap();
        let expected = std::fs::metadata(&reference).unwrap().permissions().mode() & 0o777;

        store.save("de", &Catalog::new()).unwrap();

        let mode = std::fs::metadata(store.catalog_path("de"))
            .unwrap()
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(mode, expected);
    }

    #[test]
    fn memory_store_counts_writes() {
        let store = MemoryStore::new().with("en", Catalog::new());
        assert_eq!(store.writes(), 0);
        store.save("fr", &Catalog::new()).unwrap();
        assert_eq!(store.writes(), 1);
        assert!(store.get("fr").is_some());
    }
}
