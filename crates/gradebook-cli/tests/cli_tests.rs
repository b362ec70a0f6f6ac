//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SAMPLE_PROJECT: &str = "../../projects/sample-class.toml";

fn gradebook() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("gradebook").unwrap();
    cmd.env_remove("GRADEBOOK_THRESHOLD")
        .env_remove("GRADEBOOK_CORRECTION_ERROR")
        .env_remove("GRADEBOOK_SCORING_MODE");
    cmd
}

/// The single file with the given extension in `dir`.
fn only_file(dir: &Path, extension: &str) -> PathBuf {
    let files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|ext| ext == extension))
        .collect();
    assert_eq!(files.len(), 1, "expected one .{extension} file in {dir:?}");
    files.into_iter().next().unwrap()
}

fn grade_into(output: &Path, extra: &[&str]) {
    gradebook()
        .arg("grade")
        .arg("--project")
        .arg(SAMPLE_PROJECT)
        .arg("--output")
        .arg(output)
        .args(extra)
        .assert()
        .success();
}

#[test]
fn validate_sample_project() {
    gradebook()
        .arg("validate")
        .arg("--project")
        .arg(SAMPLE_PROJECT)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "(2 objectives, 4 indicators, 4 students)",
        ))
        .stdout(predicate::str::contains("All projects valid"));
}

#[test]
fn validate_directory() {
    gradebook()
        .arg("validate")
        .arg("--project")
        .arg("../../projects")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sample class"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(
        &path,
        r#"
[project]
id = "broken"
name = "Broken"

[[objectives]]
id = "o1"

[[objectives.indicators]]
id = "i1"

[[students]]
id = "s1"
name = "Ada"
evaluations = [{ objective = "o1", indicator = "i1", score = 5 }]

[[students]]
id = "s1"
name = "Ada again"
"#,
    )
    .unwrap();

    gradebook()
        .arg("validate")
        .arg("--project")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[student s1] WARNING"))
        .stdout(predicate::str::contains("above the maximum"))
        .stdout(predicate::str::contains("duplicate student ID"))
        .stdout(predicate::str::contains("warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    gradebook()
        .arg("validate")
        .arg("--project")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn grade_prints_summary_and_writes_reports() {
    let dir = TempDir::new().unwrap();

    gradebook()
        .arg("grade")
        .arg("--project")
        .arg(SAMPLE_PROJECT)
        .arg("--output")
        .arg(dir.path())
        .arg("--format")
        .arg("all")
        .assert()
        .success()
        .stderr(predicate::str::contains("Ada"))
        .stderr(predicate::str::contains("29/30"))
        .stderr(predicate::str::contains("5.8"))
        .stderr(predicate::str::contains("3/4 passed"));

    let json = std::fs::read_to_string(only_file(dir.path(), "json")).unwrap();
    let report: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(report["project"]["id"], "sample-class");
    assert_eq!(report["results"][0]["outcome"]["grade"], 5.8);
    assert_eq!(report["results"][1]["outcome"]["grade"], 4.2);
    assert_eq!(report["results"][2]["outcome"]["grade"], 2.7);
    assert_eq!(report["results"][3]["outcome"]["grade"], 5.0);

    let csv = std::fs::read_to_string(only_file(dir.path(), "csv")).unwrap();
    assert!(csv.contains("s1,Ada,18,11,29,30,5.8"));
    assert!(only_file(dir.path(), "html").exists());
}

#[test]
fn grade_with_question_cap_selects_best_questions() {
    let dir = TempDir::new().unwrap();

    gradebook()
        .arg("grade")
        .arg("--project")
        .arg(SAMPLE_PROJECT)
        .arg("--output")
        .arg(dir.path())
        .arg("--max-questions")
        .arg("2")
        .assert()
        .success()
        .stderr(predicate::str::contains("21/21"))
        .stderr(predicate::str::contains("auto"));
}

#[test]
fn grade_rejects_unknown_scoring_mode() {
    let dir = TempDir::new().unwrap();

    gradebook()
        .arg("grade")
        .arg("--project")
        .arg(SAMPLE_PROJECT)
        .arg("--output")
        .arg(dir.path())
        .arg("--scoring-mode")
        .arg("percent")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid --scoring-mode"));
}

#[test]
fn grade_missing_config_fails() {
    gradebook()
        .arg("grade")
        .arg("--project")
        .arg(SAMPLE_PROJECT)
        .arg("--config")
        .arg("no-such-config.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    gradebook()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created gradebook.toml"))
        .stdout(predicate::str::contains("Created projects/example.toml"));

    assert!(dir.path().join("gradebook.toml").exists());
    assert!(dir.path().join("projects/example.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    gradebook()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    gradebook()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn init_output_grades_with_its_config() {
    let dir = TempDir::new().unwrap();

    gradebook()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    gradebook()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--project")
        .arg("projects/example.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("All projects valid"));

    // gradebook.toml asks for json and html in ./gradebook-reports
    gradebook()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--project")
        .arg("projects/example.toml")
        .assert()
        .success()
        .stderr(predicate::str::contains("12/15"))
        .stderr(predicate::str::contains("5.0"));

    let reports = dir.path().join("gradebook-reports");
    only_file(&reports, "json");
    only_file(&reports, "html");
}

#[test]
fn compare_reports() {
    let baseline_dir = TempDir::new().unwrap();
    let current_dir = TempDir::new().unwrap();
    grade_into(baseline_dir.path(), &[]);
    grade_into(current_dir.path(), &["--correction=-0.5"]);

    gradebook()
        .arg("compare")
        .arg("--baseline")
        .arg(only_file(baseline_dir.path(), "json"))
        .arg("--current")
        .arg(only_file(current_dir.path(), "json"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Comparison: 4 lowered, 0 raised, 0 unchanged",
        ))
        .stdout(predicate::str::contains("s1 (Ada) 5.8 -> 5.3 (-0.5)"));
}

#[test]
fn compare_fail_on_lowered() {
    let baseline_dir = TempDir::new().unwrap();
    let current_dir = TempDir::new().unwrap();
    grade_into(baseline_dir.path(), &[]);
    grade_into(current_dir.path(), &["--threshold", "0.7"]);

    gradebook()
        .arg("compare")
        .arg("--baseline")
        .arg(only_file(baseline_dir.path(), "json"))
        .arg("--current")
        .arg(only_file(current_dir.path(), "json"))
        .arg("--format")
        .arg("markdown")
        .arg("--fail-on-lowered")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("### Lowered"))
        .stdout(predicate::str::contains("| s2 | Grace | 4.2 | 3.7 | -0.5 |"));
}

#[test]
fn compare_same_report_is_unchanged() {
    let dir = TempDir::new().unwrap();
    grade_into(dir.path(), &[]);
    let report = only_file(dir.path(), "json");

    gradebook()
        .arg("compare")
        .arg("--baseline")
        .arg(&report)
        .arg("--current")
        .arg(&report)
        .arg("--format")
        .arg("json")
        .arg("--fail-on-lowered")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"unchanged\": 4"));
}

#[test]
fn compare_nonexistent_report() {
    gradebook()
        .arg("compare")
        .arg("--baseline")
        .arg("no_such_file.json")
        .arg("--current")
        .arg("also_no_file.json")
        .assert()
        .failure();
}

#[test]
fn help_output() {
    gradebook()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rubric-based student grading"));
}

#[test]
fn version_output() {
    gradebook()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gradebook"));
}
