use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn flowspell(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("flowspell").unwrap();
    cmd.current_dir(dir)
        .env("FLOWSPELL_DATA_DIR", dir.join("data"))
        .env_remove("RUST_LOG");
    cmd
}

/// Temp dir with an installed `en_US` dictionary.
fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("words.txt"),
        "hello\nworld\nword\nsome\nhere\nwith\ntitle\n",
    )
    .unwrap();
    flowspell(dir.path())
        .args(["dict", "build", "en_US", "words.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dictionary installed"));
    dir
}

#[test]
fn test_check_reports_misspelling_and_fails() {
    let dir = workspace();
    fs::write(dir.path().join("note.txt"), "hello wrod\n").unwrap();

    flowspell(dir.path())
        .args(["check", "--no-color", "note.txt"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("1:7 wrod"))
        .stdout(predicate::str::contains("1 error found in 1 file"));
}

#[test]
fn test_no_fail_exits_cleanly() {
    let dir = workspace();
    fs::write(dir.path().join("note.txt"), "hello wrod\n").unwrap();

    flowspell(dir.path())
        .args(["check", "--no-color", "--no-fail", "note.txt"])
        .assert()
        .success();
}

#[test]
fn test_clean_file_passes() {
    let dir = workspace();
    fs::write(dir.path().join("note.txt"), "Hello world\n").unwrap();

    flowspell(dir.path())
        .args(["check", "--no-color", "note.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No spelling errors found"));
}

#[test]
fn test_markdown_code_is_skipped() {
    let dir = workspace();
    fs::write(
        dir.path().join("doc.md"),
        "# Title\n\nSome `codez` here with wrod.\n",
    )
    .unwrap();

    flowspell(dir.path())
        .args(["check", "--no-color", "doc.md"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("3:24 wrod"))
        .stdout(predicate::str::contains("1 error found"));
}

#[test]
fn test_json_output() {
    let dir = workspace();
    fs::write(dir.path().join("note.txt"), "hello wrod\n").unwrap();

    let output = flowspell(dir.path())
        .args(["check", "-o", "json", "--no-fail", "note.txt"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_errors"], 1);
    assert_eq!(json["errors"][0]["word"], "wrod");
    assert_eq!(json["errors"][0]["line"], 1);
    assert_eq!(json["errors"][0]["column"], 7);
}

#[test]
fn test_ignore_pattern() {
    let dir = workspace();
    fs::write(dir.path().join("note.txt"), "hello wrod\n").unwrap();

    flowspell(dir.path())
        .args(["check", "--no-color", "--ignore-pattern", "^wr", "note.txt"])
        .assert()
        .success();
}

#[test]
fn test_dict_list_and_info() {
    let dir = workspace();

    flowspell(dir.path())
        .args(["dict", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("en_US"));

    flowspell(dir.path())
        .args(["dict", "info", "en_US"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Words: 7"));

    flowspell(dir.path())
        .args(["dict", "info", "fr_FR"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not installed"));
}

#[test]
fn test_flow_of_a_page_description() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("page.json"),
        r#"{
            "children": [
                {"type": "glyphs", "text": "Hello", "origin": {"x": 0, "y": 20}, "font_size": 10},
                {"type": "image", "bounds": {"x": 0, "y": 24, "width": 12, "height": 12}},
                {"type": "glyphs", "text": "world.", "origin": {"x": 0, "y": 48}, "font_size": 10},
                {"type": "glyphs", "text": "Second para.", "origin": {"x": 0, "y": 80}, "font_size": 10}
            ]
        }"#,
    )
    .unwrap();

    flowspell(dir.path())
        .args(["flow", "--no-color", "page.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Start(Section)"))
        .stdout(predicate::str::contains("Run(\"Hello \")"))
        .stdout(predicate::str::contains("Run(\"Second para.\")"));

    let output = flowspell(dir.path())
        .args(["flow", "-o", "json", "--page", "1", "page.json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["page"], 0);
    assert_eq!(json["nodes"].as_array().unwrap().len(), 10);
    assert_eq!(json["nodes"][3]["kind"], "object");
}

#[test]
fn test_flow_rejects_bad_input() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("page.json"), "{\"children\": 3}").unwrap();
    flowspell(dir.path())
        .args(["flow", "page.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed page description"));

    fs::write(dir.path().join("page.json"), "{}").unwrap();
    flowspell(dir.path())
        .args(["flow", "--page", "2", "page.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_completion_script() {
    let dir = tempfile::tempdir().unwrap();
    flowspell(dir.path())
        .args(["--completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("flowspell"));
}
