use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serde_json::{Value, json};

const ENV_VARS: &[&str] = &[
    "CATALOG_SYNC_SOURCE_LANGUAGE",
    "CATALOG_SYNC_TARGET_LANGUAGES",
    "CATALOG_SYNC_CATALOG_DIR",
    "CATALOG_SYNC_API_KEY",
    "CATALOG_SYNC_ENDPOINT",
    "RUST_LOG",
];

const SOURCE: &str = r#"{
  "nav": { "home": "Home", "about": "About us" },
  "footer": { "year": 2024 }
}"#;

fn setup_test_env() -> TempDir {
    let temp = TempDir::new().unwrap();
    temp.child("locales/en.json").write_str(SOURCE).unwrap();
    temp.child("locales/fr.json")
        .write_str(r#"{"nav": {"home": "Accueil", "legacy": "Ancien"}}"#)
        .unwrap();
    temp
}

fn cli(temp: &TempDir) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("catalog-sync");
    cmd.current_dir(temp.path()).arg("--e2e");
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn read_json(temp: &TempDir, relative: &str) -> Value {
    let content = std::fs::read_to_string(temp.path().join(relative)).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[test]
fn test_sync_with_copy_provider() {
    let temp = setup_test_env();

    cli(&temp)
        .args(["sync", "--provider", "copy", "--target", "fr,de"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 2 key(s) to fr"))
        .stdout(predicate::str::contains("Removed 1 key(s) from fr"))
        .stdout(predicate::str::contains("  - nav.legacy"))
        .stdout(predicate::str::contains("Added 3 key(s) to de"));

    assert_eq!(
        read_json(&temp, "locales/fr.json"),
        json!({ "nav": { "home": "Accueil", "about": "About us" }, "footer": { "year": 2024 } })
    );
    assert_eq!(read_json(&temp, "locales/de.json"), read_json(&temp, "locales/en.json"));
}

#[test]
fn test_second_sync_is_a_no_op() {
    let temp = setup_test_env();
    let args = ["sync", "--provider", "copy", "--target", "fr"];

    cli(&temp).args(args).assert().success();
    let first = std::fs::read(temp.path().join("locales/fr.json")).unwrap();

    cli(&temp)
        .args(args)
        .assert()
        .success()
        .stdout(predicate::str::contains("fr is up to date"))
        .stdout(predicate::str::contains("All catalogs are in sync!"));

    assert_eq!(std::fs::read(temp.path().join("locales/fr.json")).unwrap(), first);
}

#[test]
fn test_sync_dry_run_writes_nothing() {
    let temp = setup_test_env();
    let before = std::fs::read_to_string(temp.path().join("locales/fr.json")).unwrap();

    cli(&temp)
        .args(["sync", "--dry-run", "--target", "fr,es"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Would add 2 key(s) to fr"))
        .stdout(predicate::str::contains("Would remove 1 key(s) from fr"))
        .stdout(predicate::str::contains("+     \"about\": \"About us\""))
        .stdout(predicate::str::contains("Dry run:"));

    assert_eq!(
        std::fs::read_to_string(temp.path().join("locales/fr.json")).unwrap(),
        before
    );
    temp.child("locales/es.json").assert(predicate::path::missing());
}

#[test]
fn test_check_fails_until_synced() {
    let temp = setup_test_env();

    cli(&temp)
        .args(["check", "--target", "fr"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Out of sync: fr (2 missing, 1 obsolete)"))
        .stderr(predicate::str::contains("check found 1 catalog(s) out of sync"));

    cli(&temp)
        .args(["sync", "--provider", "copy", "--target", "fr"])
        .assert()
        .success();

    cli(&temp)
        .args(["check", "--target", "fr"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found!"));
}

#[test]
fn test_missing_source_fails() {
    let temp = TempDir::new().unwrap();
    temp.child("locales").create_dir_all().unwrap();

    cli(&temp)
        .args(["sync", "--provider", "copy", "--target", "fr"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("source catalog 'en'"));
    temp.child("locales/fr.json").assert(predicate::path::missing());
}

#[test]
fn test_no_target_languages_fails() {
    let temp = setup_test_env();

    cli(&temp)
        .args(["sync", "--provider", "copy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}

#[test]
fn test_config_file_is_used() {
    let temp = TempDir::new().unwrap();
    temp.child("i18n/de.json")
        .write_str(r#"{"greeting": "Hallo", "farewell": "Tschüss"}"#)
        .unwrap();
    temp.child("catalog-sync.toml")
        .write_str(
            r#"
source_language = "de"
target_languages = ["it"]
catalog_dir = "i18n"

[provider]
kind = "copy"
"#,
        )
        .unwrap();

    cli(&temp).arg("sync").assert().success();

    assert_eq!(
        read_json(&temp, "i18n/it.json"),
        json!({ "greeting": "Hallo", "farewell": "Tschüss" })
    );
}

#[test]
fn test_targets_from_environment() {
    let temp = setup_test_env();

    cli(&temp)
        .env("CATALOG_SYNC_TARGET_LANGUAGES", "pt-BR")
        .args(["sync", "--provider", "copy"])
        .assert()
        .success();

    temp.child("locales/pt-BR.json").assert(predicate::path::exists());
    temp.child("locales/fr.json")
        .assert(predicate::str::contains("legacy"));
}

#[test]
fn test_unreachable_provider_fails_language() {
    let temp = setup_test_env();
    temp.child("catalog-sync.toml")
        .write_str(
            r#"
target_languages = ["fr"]

[provider]
kind = "libretranslate"
endpoint = "http://127.0.0.1:1/translate"
timeout_ms = 2000
"#,
        )
        .unwrap();
    let before = std::fs::read_to_string(temp.path().join("locales/fr.json")).unwrap();

    cli(&temp)
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Sync failed for fr"))
        .stderr(predicate::str::contains("sync failed for 1 of 1 language(s)"));

    assert_eq!(
        std::fs::read_to_string(temp.path().join("locales/fr.json")).unwrap(),
        before
    );
}

#[test]
fn test_unknown_provider_is_rejected() {
    let temp = setup_test_env();

    cli(&temp)
        .args(["sync", "--provider", "deepl", "--target", "fr"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown provider 'deepl'"));
}
