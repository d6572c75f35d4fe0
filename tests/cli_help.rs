use std::process::Command;

#[test]
fn test_help_lists_every_command() {
    let bin = env!("CARGO_BIN_EXE_wadf");

    let output = Command::new(bin).arg("--help").output().unwrap();

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["deploy", "undeploy", "resolve", "list-tags", "list-deployed", "macros"] {
        assert!(
            stdout.contains(command),
            "help output should mention '{}'; got:\n{}",
            command,
            stdout
        );
    }
}

#[test]
fn test_deploy_help_documents_revision_forms() {
    let bin = env!("CARGO_BIN_EXE_wadf");

    let output = Command::new(bin).args(["deploy", "--help"]).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tag/LATEST"), "got:\n{}", stdout);
    assert!(stdout.contains("--db"), "got:\n{}", stdout);
}

#[test]
fn test_version_flag() {
    let bin = env!("CARGO_BIN_EXE_wadf");

    let output = Command::new(bin).arg("--version").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("wadf "), "got:\n{}", stdout);
}

#[test]
fn test_malformed_define_is_a_usage_error() {
    let bin = env!("CARGO_BIN_EXE_wadf");

    let output = Command::new(bin)
        .args(["macros", "shop", "-D", "novalue"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("expected NAME=VALUE"), "got:\n{}", stderr);
}
