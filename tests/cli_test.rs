use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn tscat() -> Command {
    let mut cmd = Command::cargo_bin("tscat").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("TSCAT_LANGUAGE");
    cmd
}

const UNFINISHED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="de">
<context>
    <name>PreferencesDialog</name>
    <message>
        <location filename="../forms/preferencesdialog.ui" line="20"/>
        <source>Preferences</source>
        <translation>Einstellungen</translation>
    </message>
    <message>
        <location filename="../forms/preferencesdialog.ui" line="26"/>
        <source>General</source>
        <translation type="unfinished"></translation>
    </message>
</context>
</TS>
"#;

#[test]
fn test_help_flag() {
    tscat()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("USAGE:"))
        .stdout(predicate::str::contains("lookup"));
}

#[test]
fn test_version_flag() {
    tscat()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_requires_subcommand() {
    tscat().assert().failure();
}

#[test]
fn test_check_complete_catalog() {
    tscat()
        .arg("check")
        .arg(fixture_path("dd_zh_CN.ts"))
        .assert()
        .code(0)
        .stdout(predicate::str::contains("OK"))
        .stdout(predicate::str::contains("28 active messages translated"));
}

#[test]
fn test_check_incomplete_catalog() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dd_de.ts");
    fs::write(&path, UNFINISHED).unwrap();

    tscat()
        .arg("check")
        .arg(&path)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("INCOMPLETE"))
        .stdout(predicate::str::contains("1 of 2 active messages untranslated"))
        .stdout(predicate::str::contains(
            "../forms/preferencesdialog.ui:26:PreferencesDialog: 'General'",
        ));
}

#[test]
fn test_check_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dd_de.ts");
    fs::write(&path, UNFINISHED).unwrap();

    let output = tscat().args(["check", "--json"]).arg(&path).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["language"], "de");
    assert_eq!(report["stats"]["unfinished"], 1);
    assert_eq!(report["incomplete"][0]["source_text"], "General");
}

#[test]
fn test_check_malformed_catalog() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.ts");
    fs::write(&path, UNFINISHED.replace("<source>General</source>", "")).unwrap();

    tscat()
        .arg("check")
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("context 'PreferencesDialog', message #2"))
        .stderr(predicate::str::contains("message has no <source>"));
}

#[test]
fn test_check_missing_file() {
    tscat()
        .args(["check", "/nonexistent/dd_zh_CN.ts"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_lookup_known_and_unknown() {
    tscat()
        .arg("lookup")
        .arg(fixture_path("dd_zh_CN.ts"))
        .args(["--context", "PreferencesDialog", "Preferences"])
        .assert()
        .success()
        .stdout("首选项\n");

    tscat()
        .arg("lookup")
        .arg(fixture_path("dd_zh_CN.ts"))
        .args(["--context", "QObject", "Unknown String"])
        .assert()
        .success()
        .stdout("Unknown String\n");
}

#[test]
fn test_lookup_with_args_and_plural() {
    tscat()
        .arg("lookup")
        .arg(fixture_path("dd_zh_CN.ts"))
        .args(["-c", "PreferencesDialog", "--arg", "3", "--arg", "Sea", "ID: %0 | Title: %1"])
        .assert()
        .success()
        .stdout("ID: 3 | Title: Sea\n");

    tscat()
        .arg("lookup")
        .arg(fixture_path("dd_zh_CN.ts"))
        .args(["-c", "QObject", "--plural", "4", "%n wallpapers"])
        .assert()
        .success()
        .stdout("4 wallpapers\n");
}

#[test]
fn test_stats_json() {
    let output = tscat()
        .args(["stats", "--json"])
        .arg(fixture_path("dd_zh_CN.ts"))
        .output()
        .unwrap();
    assert!(output.status.success());
    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["contexts"], 2);
    assert_eq!(stats["finished"], 28);
    assert_eq!(stats["vanished"], 1);
}

#[test]
fn test_normalize_to_output_is_identical() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("normalized.ts");

    tscat()
        .arg("normalize")
        .arg(fixture_path("dd_zh_CN.ts"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        fs::read_to_string(fixture_path("dd_zh_CN.ts")).unwrap()
    );
}

#[test]
fn test_purge_in_place() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dd_zh_CN.ts");
    fs::copy(fixture_path("dd_zh_CN.ts"), &path).unwrap();

    tscat()
        .arg("purge")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("removed 1 vanished entries"));

    let written = fs::read_to_string(&path).unwrap();
    assert!(!written.contains("There is another instance running.</source>"));
}

#[test]
fn test_merge_extracted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dd_de.ts");
    let extracted = dir.path().join("extracted.json");
    fs::write(&path, UNFINISHED).unwrap();
    fs::write(
        &extracted,
        r#"[
            {"context": "PreferencesDialog", "source": "Preferences",
             "locations": [{"filename": "../forms/preferencesdialog.ui", "line": 21}]},
            {"context": "PreferencesDialog", "source": "Player"}
        ]"#,
    )
    .unwrap();

    tscat()
        .arg("merge")
        .arg(&path)
        .arg("--extracted")
        .arg(&extracted)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 new, 1 updated, 0 revived, 0 vanished, 1 removed"));

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("line=\"21\""));
    assert!(written.contains("<source>Player</source>"));
    assert!(!written.contains("<source>General</source>"));
}

#[test]
fn test_merge_rejects_bad_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dd_de.ts");
    let extracted = dir.path().join("extracted.json");
    fs::write(&path, UNFINISHED).unwrap();
    fs::write(&extracted, "{not json").unwrap();

    tscat()
        .arg("merge")
        .arg(&path)
        .arg("--extracted")
        .arg(&extracted)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid extracted messages"));
}

#[test]
fn test_languages() {
    let dir = tempdir().unwrap();
    for name in ["dd_zh_CN.ts", "dd_de.ts", "launcher_fr.ts"] {
        fs::write(dir.path().join(name), "").unwrap();
    }

    tscat()
        .arg("languages")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout("de\nzh_CN\n");

    tscat()
        .arg("languages")
        .arg("--dir")
        .arg(dir.path())
        .args(["--prefix", "launcher"])
        .assert()
        .success()
        .stdout("fr\n");
}

#[test]
fn test_languages_rejects_path_prefix() {
    tscat()
        .args(["languages", "--dir", ".", "--prefix", "../dd"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not contain path separators"));
}

#[test]
fn test_resolve_explicit_language() {
    let dir = tempdir().unwrap();
    fs::copy(fixture_path("dd_zh_CN.ts"), dir.path().join("dd_zh.ts")).unwrap();

    tscat()
        .arg("resolve")
        .args(["--language", "zh-CN"])
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("locale:     zh_CN"))
        .stdout(predicate::str::contains("dd_zh_CN.ts"))
        .stdout(predicate::str::contains("(28 messages)"));
}

#[test]
fn test_resolve_from_settings_and_env() {
    let dir = tempdir().unwrap();
    fs::copy(fixture_path("dd_zh_CN.ts"), dir.path().join("dd_zh_CN.ts")).unwrap();
    let settings = dir.path().join("settings.toml");
    fs::write(&settings, "language = \"fr\"\ncatalog_dir = \".\"\n").unwrap();

    tscat()
        .arg("resolve")
        .arg("--settings")
        .arg(&settings)
        .assert()
        .success()
        .stdout(predicate::str::contains("language:   fr"))
        .stdout(predicate::str::contains("loaded:     nothing"));

    tscat()
        .env("TSCAT_LANGUAGE", "zh_CN")
        .arg("resolve")
        .arg("--settings")
        .arg(&settings)
        .assert()
        .success()
        .stdout(predicate::str::contains("language:   zh_CN"))
        .stdout(predicate::str::contains("(28 messages)"));
}

#[test]
fn test_normalize_in_place_and_rejects_malformed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dd_de.ts");
    fs::write(&path, UNFINISHED.replace("\n    ", "\n\t")).unwrap();

    tscat().arg("normalize").arg(&path).assert().success();
    assert_eq!(fs::read_to_string(&path).unwrap(), UNFINISHED);

    fs::write(&path, UNFINISHED.replace("line=\"26\"", "line=\"+26\"")).unwrap();
    tscat()
        .arg("normalize")
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid line number '+26'"));
}
