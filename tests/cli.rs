//! CLI behavior tests: exit codes, sessions, exports, validation, init.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FULL_RUN: &str = "1\n8\n1\nI want to design a tool because data helps people\n2\n35\n1\n2\n\n";
const CORE_ANSWERS: &str = "tests/fixtures/answers/core.json";
const PARTIAL_ANSWERS: &str = "tests/fixtures/answers/partial.json";

fn fixture(path: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(path)
}

fn mcif_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mcif"));
    cmd.env_remove("MCIF_LOG");
    cmd
}

/// Command running inside `dir`, so session and history files land there
fn mcif_in(dir: &TempDir) -> Command {
    let mut cmd = mcif_cmd();
    cmd.current_dir(dir.path()).arg("--no-color");
    cmd
}

#[test]
fn no_subcommand_is_usage_error() {
    mcif_cmd().assert().failure().code(2);
}

#[test]
fn schema_prints_embedded_json() {
    let output = mcif_cmd().arg("schema").output().unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(parsed["id"], "mcif-core");
}

// --- run ---

#[test]
fn full_run_prints_results_and_records_history() {
    let dir = TempDir::new().unwrap();
    mcif_in(&dir)
        .arg("run")
        .write_stdin(FULL_RUN)
        .assert()
        .success()
        .stdout(predicate::str::contains("Results: MCIF Cognitive Profile"))
        .stdout(predicate::str::contains("Archetype: The "))
        .stdout(predicate::str::contains("Composite: "));

    assert!(!dir.path().join(".mcif-session.json").exists(), "session cleared");
    let history = fs::read_to_string(dir.path().join(".mcif-history.json")).unwrap();
    let history: serde_json::Value = serde_json::from_str(&history).unwrap();
    assert_eq!(history["runs"].as_array().unwrap().len(), 1);
    assert_eq!(history["runs"][0]["schemaId"], "mcif-core");
}

#[test]
fn repeat_run_shows_delta() {
    let dir = TempDir::new().unwrap();
    mcif_in(&dir).arg("run").write_stdin(FULL_RUN).assert().success();
    mcif_in(&dir)
        .arg("run")
        .write_stdin(FULL_RUN)
        .assert()
        .success()
        .stdout(predicate::str::contains("[unchanged at"));
}

#[test]
fn end_of_input_suspends_with_exit_1() {
    let dir = TempDir::new().unwrap();
    mcif_in(&dir)
        .arg("run")
        .write_stdin("1\n8\n")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Progress saved"));

    let session = fs::read_to_string(dir.path().join(".mcif-session.json")).unwrap();
    let session: serde_json::Value = serde_json::from_str(&session).unwrap();
    assert_eq!(session["cursor"], 2);
    assert_eq!(session["answers"].as_array().unwrap().len(), 2);
}

#[test]
fn second_run_resumes_session() {
    let dir = TempDir::new().unwrap();
    mcif_in(&dir).arg("run").write_stdin("1\n8\n").assert().code(1);
    mcif_in(&dir)
        .arg("run")
        .write_stdin("1\nI want to design a tool\n2\n35\n1\n2\n\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Resuming session"))
        .stdout(predicate::str::contains("Resuming at question 3 of 9"));
}

#[test]
fn unreadable_session_starts_a_new_quiz() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".mcif-session.json"), [0xff, 0xfe, 0x00, 0x01]).unwrap();
    mcif_in(&dir)
        .arg("run")
        .write_stdin("1\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Resuming").not())
        .stdout(predicate::str::contains("[2/9]"));

    let session = fs::read_to_string(dir.path().join(".mcif-session.json")).unwrap();
    let session: serde_json::Value = serde_json::from_str(&session).unwrap();
    assert_eq!(session["answers"].as_array().unwrap().len(), 1);
}

#[test]
fn fresh_discards_session() {
    let dir = TempDir::new().unwrap();
    mcif_in(&dir).arg("run").write_stdin("1\n8\n").assert().code(1);
    mcif_in(&dir)
        .args(["run", "--fresh"])
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Resuming").not());
}

#[test]
fn run_json_and_text_export() {
    let dir = TempDir::new().unwrap();
    mcif_in(&dir)
        .args(["run", "--json", "--export", "out/result.txt"])
        .write_stdin(FULL_RUN)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"schemaId\": \"mcif-core\""));

    let text = fs::read_to_string(dir.path().join("out/result.txt")).unwrap();
    assert!(text.starts_with("MCIF Cognitive Profile\n"));
    assert!(text.contains("Archetype: "));
}

#[test]
fn run_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    mcif_in(&dir)
        .args(["run", "--export", "r.out", "--format", "pdf"])
        .write_stdin("")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Unknown export format 'pdf'"));
}

#[test]
fn missing_schema_falls_back_to_builtin() {
    let dir = TempDir::new().unwrap();
    mcif_in(&dir)
        .args(["run", "--schema", "missing.json"])
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("using the built-in schema"))
        .stdout(predicate::str::contains("MCIF Cognitive Profile"));
}

#[test]
fn config_selects_schema_and_session_file() {
    let dir = TempDir::new().unwrap();
    let schema = fixture("tests/fixtures/schemas/threshold.json");
    fs::write(
        dir.path().join(".mcifrc.json"),
        format!(
            r#"{{ "schema": {}, "sessionFile": "progress.json" }}"#,
            serde_json::to_string(&schema.to_string_lossy()).unwrap()
        ),
    )
    .unwrap();

    mcif_in(&dir)
        .arg("run")
        .write_stdin("1\n")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Focus Check"));
    assert!(dir.path().join("progress.json").exists());

    mcif_in(&dir)
        .arg("run")
        .write_stdin("5\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Archetype: Locked In"));
}

// --- score / export ---

#[test]
fn score_answers_file_as_json() {
    let output = mcif_cmd()
        .args(["score", "--json", "--answers"])
        .arg(fixture(CORE_ANSWERS))
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(parsed["archetype"]["strategy"], "nearest");
    assert_eq!(parsed["answers"].as_array().unwrap().len(), 8);
}

#[test]
fn score_quiet_prints_one_line() {
    let output = mcif_cmd()
        .args(["--no-color", "score", "--quiet", "--answers"])
        .arg(fixture(CORE_ANSWERS))
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.starts_with("mcif-core: The Sentinel ("));
}

#[test]
fn score_json_and_quiet_conflict() {
    mcif_cmd()
        .args(["score", "--json", "--quiet", "--answers"])
        .arg(fixture(CORE_ANSWERS))
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn unwritable_session_path_does_not_stop_the_quiz() {
    let dir = TempDir::new().unwrap();
    mcif_in(&dir)
        .args(["run", "--session", "missing-dir/session.json"])
        .write_stdin(FULL_RUN)
        .assert()
        .success()
        .stdout(predicate::str::contains("! could not save progress"))
        .stdout(predicate::str::contains("Archetype: The "));
}

#[test]
fn score_incomplete_answers_exit_1() {
    mcif_cmd()
        .args(["--no-color", "score", "--answers"])
        .arg(fixture(PARTIAL_ANSWERS))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Skipping answer for 'ghost'"))
        .stderr(predicate::str::contains("Quiz is incomplete; unanswered: planning"));
}

#[test]
fn score_missing_file_exit_2() {
    mcif_cmd()
        .args(["score", "--answers", "nowhere.json"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Failed to read answers"));
}

#[test]
fn export_completed_session() {
    let dir = TempDir::new().unwrap();
    // All required questions answered; input ends at the optional one
    mcif_in(&dir)
        .arg("run")
        .write_stdin("1\n8\n1\nAn idea\n2\n35\n1\n2\n")
        .assert()
        .code(1);

    mcif_in(&dir)
        .args(["export", "--session", ".mcif-session.json", "--output", "result.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported Json result"));
    let result = fs::read_to_string(dir.path().join("result.json")).unwrap();
    let result: serde_json::Value = serde_json::from_str(&result).unwrap();
    assert_eq!(result["answers"].as_array().unwrap().len(), 8);
}

#[test]
fn export_incomplete_session_exit_1() {
    let dir = TempDir::new().unwrap();
    mcif_in(&dir).arg("run").write_stdin("1\n").assert().code(1);
    mcif_in(&dir)
        .args(["export", "--session", ".mcif-session.json", "--output", "r.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Quiz is incomplete"));
    assert!(!dir.path().join("r.json").exists());
}

#[test]
fn export_without_session_exit_2() {
    let dir = TempDir::new().unwrap();
    mcif_in(&dir)
        .args(["export", "--session", "none.json", "--output", "r.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No usable session"));
}

// --- validate ---

#[test]
fn validate_fixture_directory() {
    mcif_cmd()
        .args(["--no-color", "validate"])
        .arg(fixture("tests/fixtures/schemas"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Focus Check (focus-check) 1 phases, 3 questions, 2 axes"))
        .stdout(predicate::str::contains("2 of 2 schema files valid"));
}

#[test]
fn validate_reports_invalid_schema() {
    mcif_cmd()
        .args(["--no-color", "validate"])
        .arg(fixture("tests/fixtures/invalid/unknown_axis.json"))
        .assert()
        .failure()
        .code(2)
        .stdout(predicate::str::contains("references unknown axis 'nope'"));
}

#[test]
fn validate_respects_config_ignore() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("good.json"), mcif_schema_json()).unwrap();
    fs::create_dir(dir.path().join("drafts")).unwrap();
    fs::write(dir.path().join("drafts/bad.json"), "{ nope").unwrap();
    fs::write(
        dir.path().join(".mcifrc.json"),
        r#"{ "ignore": ["**/drafts/**"] }"#,
    )
    .unwrap();

    mcif_in(&dir)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("good.json"))
        .stdout(predicate::str::contains("bad.json").not());
}

#[test]
fn validate_missing_path_exit_2() {
    mcif_cmd()
        .args(["validate", "does/not/exist"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Path not found"));
}

// --- init ---

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join(".mcifrc.json");
    mcif_cmd().arg("init").arg("--dir").arg(dir.path()).assert().success();
    assert!(config_path.exists(), ".mcifrc.json should be created");
    let content = fs::read_to_string(&config_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed["autosave"], true);

    mcif_cmd()
        .arg("init")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn broken_config_exit_2() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".mcifrc.json"), "{ broken").unwrap();
    mcif_in(&dir)
        .arg("schema")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Invalid JSON in config"));
}

fn mcif_schema_json() -> Vec<u8> {
    mcif_cmd().arg("schema").output().unwrap().stdout
}
