use addon_release::core::config::ReleaseConfig;
use addon_release::{ReleaseError, ReleaseOptions, ReleasePipeline, SecureTokenManager};
use std::fs;
use std::fs::File;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;
use walkdir::WalkDir;
use zip::ZipArchive;

const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<addon id="myaddon" name="My [Beta] Addon" version="2.0.0" provider-name="someone">
  <extension point="xbmc.python.pluginsource" library="default.py"/>
  <extension point="xbmc.addon.metadata">
    <news>v2.0.0: new menu</news>
  </extension>
</addon>
"#;

/// A small addon layout with hidden files, excluded files and a nested tree
fn create_addon(root: &Path) {
    fs::write(root.join("addon.xml"), MANIFEST).unwrap();
    fs::write(root.join("default.py"), "print('hi')").unwrap();
    fs::write(root.join("Makefile"), "all:").unwrap();
    fs::write(root.join("notes.txt"), "scratch").unwrap();
    fs::write(root.join(".env"), "GH_TOKEN=x").unwrap();
    fs::create_dir_all(root.join("resources/lib")).unwrap();
    fs::write(root.join("resources/lib/plugin.py"), "pass").unwrap();
    fs::write(root.join("resources/icon.png"), "png").unwrap();
    fs::create_dir_all(root.join("tests")).unwrap();
    fs::write(root.join("tests/test_plugin.py"), "pass").unwrap();

    fs::write(
        root.join(".gitattributes"),
        "Makefile export-ignore\ntests/ export-ignore\n*.py text eol=lf\n",
    )
    .unwrap();
    fs::write(root.join(".gitignore"), "notes.txt\n").unwrap();
}

fn files_under(dir: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(dir)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}

#[test]
fn full_release_stages_zips_and_mirrors() {
    let dir = TempDir::new().unwrap();
    create_addon(dir.path());
    let tokens = SecureTokenManager::default();

    let options = ReleaseOptions {
        project_dir: dir.path().to_path_buf(),
        zip: true,
        publish_docs: true,
        emit_metadata: true,
        ..Default::default()
    };
    let report = ReleasePipeline::new(ReleaseConfig::default(), &tokens)
        .run(&options)
        .unwrap();

    assert_eq!(
        report.files.entries(),
        ["addon.xml", "default.py", "resources"]
    );
    assert_eq!(
        files_under(&dir.path().join("dist/myaddon")),
        [
            "addon.xml",
            "default.py",
            "resources/icon.png",
            "resources/lib/plugin.py"
        ]
    );

    let archive = dir.path().join("dist/myaddon-2.0.0.zip");
    assert!(archive.is_file());
    let mut zip = ZipArchive::new(File::open(&archive).unwrap()).unwrap();
    let mut names: Vec<String> = (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    assert!(names.contains(&"myaddon/addon.xml".to_string()));
    assert!(names.contains(&"myaddon/resources/lib/plugin.py".to_string()));
    assert!(names.iter().all(|n| n.starts_with("myaddon/")));

    // The mirror holds the staging tree but never an archive
    let docs = files_under(&dir.path().join("docs"));
    assert!(docs.contains(&"myaddon/resources/icon.png".to_string()));
    assert!(docs.iter().all(|f| !f.ends_with(".zip")));

    let metadata = report.metadata.unwrap();
    assert_eq!(
        metadata.to_json_line().unwrap(),
        r#"{"version":"2.0.0","name":"My  Addon","id":"myaddon","dest":"dist/myaddon"}"#
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("version")).unwrap(),
        "2.0.0"
    );
}

#[test]
fn rerun_merges_into_existing_output() {
    let dir = TempDir::new().unwrap();
    create_addon(dir.path());
    let tokens = SecureTokenManager::default();
    let pipeline = ReleasePipeline::new(ReleaseConfig::default(), &tokens);
    let options = ReleaseOptions {
        project_dir: dir.path().to_path_buf(),
        zip: true,
        ..Default::default()
    };

    pipeline.run(&options).unwrap();
    fs::write(dir.path().join("dist/myaddon/stale.txt"), "old").unwrap();
    fs::write(dir.path().join("default.py"), "print('changed')").unwrap();
    pipeline.run(&options).unwrap();

    assert!(dir.path().join("dist/myaddon/stale.txt").is_file());
    assert_eq!(
        fs::read_to_string(dir.path().join("dist/myaddon/default.py")).unwrap(),
        "print('changed')"
    );
}

#[test]
fn rerun_never_packages_previous_outputs() {
    let dir = TempDir::new().unwrap();
    create_addon(dir.path());
    fs::write(dir.path().join(".gitignore"), "").unwrap();
    fs::remove_file(dir.path().join("notes.txt")).unwrap();
    let tokens = SecureTokenManager::default();
    let pipeline = ReleasePipeline::new(ReleaseConfig::default(), &tokens);
    let options = ReleaseOptions {
        project_dir: dir.path().to_path_buf(),
        zip: true,
        publish_docs: true,
        ..Default::default()
    };

    let first = pipeline.run(&options).unwrap();
    let staged_first = files_under(&dir.path().join("dist/myaddon"));
    let second = pipeline.run(&options).unwrap();

    assert_eq!(first.files, second.files);
    assert_eq!(
        second.files.entries(),
        ["addon.xml", "default.py", "resources"]
    );
    assert_eq!(files_under(&dir.path().join("dist/myaddon")), staged_first);
    assert!(!dir.path().join("dist/myaddon/version").exists());
    assert!(!dir.path().join("dist/myaddon/docs").exists());
    assert!(!dir.path().join("dist/myaddon/dist").exists());
}

#[test]
fn missing_rule_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    create_addon(dir.path());
    fs::remove_file(dir.path().join(".gitignore")).unwrap();
    let tokens = SecureTokenManager::default();

    let err = ReleasePipeline::new(ReleaseConfig::default(), &tokens)
        .run(&ReleaseOptions {
            project_dir: dir.path().to_path_buf(),
            ..Default::default()
        })
        .unwrap_err();

    assert!(matches!(err, ReleaseError::RuleFileMissing { .. }));
    assert!(!dir.path().join("dist/myaddon").exists());
}

#[test]
fn cli_prints_only_metadata_on_stdout() {
    let dir = TempDir::new().unwrap();
    create_addon(dir.path());

    let output = Command::new(env!("CARGO_BIN_EXE_addon-release"))
        .arg("--zip")
        .arg("--metadata")
        .arg("-C")
        .arg(dir.path())
        .env_remove("ADDON_ID")
        .env_remove("ADDON_REPO")
        .env_remove("ADDON_RELEASE_DIST_DIR")
        .env_remove("ADDON_RELEASE_DOCS_DIR")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "{\"version\":\"2.0.0\",\"name\":\"My  Addon\",\"id\":\"myaddon\",\"dest\":\"dist/myaddon\"}\n"
    );
    assert!(dir.path().join("dist/myaddon-2.0.0.zip").is_file());
}

#[test]
fn cli_push_without_repository_fails() {
    let dir = TempDir::new().unwrap();
    create_addon(dir.path());

    let output = Command::new(env!("CARGO_BIN_EXE_addon-release"))
        .arg("--zip")
        .arg("--push")
        .arg("-C")
        .arg(dir.path())
        .env_remove("ADDON_REPO")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(!dir.path().join("dist").exists());
}
