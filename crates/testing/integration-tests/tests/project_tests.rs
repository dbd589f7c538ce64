//! Runs every project in the test-projects directory

use integration_tests::project::{self, TestProject, TestResult};
use std::path::PathBuf;

#[test]
fn test_all_projects() {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test-projects");
    let dirs = project::project_dirs(&root).expect("failed to read test-projects");
    assert!(!dirs.is_empty(), "no test projects found in {}", root.display());

    let mut failures = Vec::new();
    for dir in &dirs {
        let project = match TestProject::load(dir) {
            Ok(project) => project,
            Err(error) => {
                failures.push(format!("{}: {error:#}", dir.display()));
                continue;
            }
        };
        if let TestResult::Fail { reason } = project.run() {
            failures.push(format!("{}: {reason}", project.name));
        }
    }

    assert!(
        failures.is_empty(),
        "{} of {} projects failed:\n\n{}",
        failures.len(),
        dirs.len(),
        failures.join("\n\n")
    );
}

#[test]
fn test_in_memory_project() {
    let mut project = TestProject::new("in-memory");
    project.add_file("lib.tn", "package util/text\npub fn shout(s: string): string { s + \"!\" }");
    project.add_file("main.tn", "import util/text as t\nval loud = t.shout(\"hey\")");
    project.expect_diagnostics(Vec::new());
    assert!(matches!(project.run(), TestResult::Pass));
}

#[test]
fn test_project_reports_lir_mismatch() {
    let mut project = TestProject::new("mismatch");
    project.add_file("main.tn", "val x = 1");
    project.expect_lir("program user/default\n  define val user/default.x\n    int 2\n");
    let TestResult::Fail { reason } = project.run() else {
        panic!("mismatching LIR passed");
    };
    assert!(reason.contains("int 1"), "{reason}");
}

#[test]
fn test_project_reports_unexpected_diagnostics() {
    let mut project = TestProject::new("unexpected");
    project.add_file("main.tn", "val x = missing");
    project.expect_diagnostics(Vec::new());
    let TestResult::Fail { reason } = project.run() else {
        panic!("unexpected diagnostics passed");
    };
    assert!(reason.contains("main.tn:1:9: unrecognized name `missing`"), "{reason}");
}
