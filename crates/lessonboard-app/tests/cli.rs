use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn lessonboard_cmd() -> Command {
    Command::cargo_bin("lessonboard").expect("binary exists")
}

#[test]
fn help_prints_usage() {
    lessonboard_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("replay lesson scripts"));
}

#[test]
fn replay_prints_summary() {
    let temp = TempDir::new().unwrap();
    let script = temp.path().join("lesson.json");
    std::fs::write(
        &script,
        r#"{"actions": [
            {"action": "set_tool", "tool": "line"},
            {"action": "drag", "path": [{"x": 0, "y": 0}, {"x": 100, "y": 100}]},
            {"action": "add_page"},
            {"action": "duplicate_page", "index": 0}
        ]}"#,
    )
    .unwrap();

    lessonboard_cmd()
        .arg("replay")
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"current_page\": 1"))
        .stdout(predicate::str::contains("Page 1 (copy)"));
}

#[test]
fn replay_exports_and_saves() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    let store = temp.path().join("store");
    let script = temp.path().join("lesson.json");
    std::fs::write(
        &script,
        r#"{"actions": [
            {"action": "add_math", "at": {"x": 20, "y": 20}, "latex": "a^2+b^2=c^2"},
            {"action": "export_page"},
            {"action": "save_board", "title": "Pythagoras"}
        ]}"#,
    )
    .unwrap();

    lessonboard_cmd()
        .arg("replay")
        .arg(&script)
        .arg("--out")
        .arg(&out)
        .arg("--store")
        .arg(&store)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"saved_boards\": 1"));

    let exported: Vec<_> = std::fs::read_dir(&out).unwrap().flatten().collect();
    assert_eq!(exported.len(), 1);

    lessonboard_cmd()
        .arg("saved")
        .arg("--store")
        .arg(&store)
        .assert()
        .success()
        .stdout(predicate::str::contains("Pythagoras"));
}

#[test]
fn replay_rejects_missing_script() {
    lessonboard_cmd()
        .args(["replay", "/nonexistent/lesson.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read script"));
}

#[test]
fn check_config_fills_defaults() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.json");
    std::fs::write(&config, r#"{"width": 800, "show_grid": false}"#).unwrap();

    lessonboard_cmd()
        .arg("check-config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"width\": 800.0"))
        .stdout(predicate::str::contains("\"page_name_prefix\": \"Page\""));
}

#[test]
fn check_config_rejects_invalid_values() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.json");
    std::fs::write(&config, r#"{"image_fit_ratio": 3.0}"#).unwrap();

    lessonboard_cmd()
        .arg("check-config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("image_fit_ratio"));
}

#[test]
fn saved_on_empty_store() {
    let temp = TempDir::new().unwrap();
    lessonboard_cmd()
        .args(["saved", "--store"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved boards"));
}
