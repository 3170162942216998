//! Integration tests for the nimbus CLI
//!
//! These tests drive the compiled binary against real git repositories,
//! covering the full cycle of: init → task run → flow run → hook run,
//! plus service credential management and release note plumbing.


use assert_cmd::cargo;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Helper function to create a nimbus command
fn nimbus() -> assert_cmd::Command {
    assert_cmd::Command::new(cargo::cargo_bin!("nimbus"))
}

/// Helper to initialize a git repo with basic config
fn init_git_repo(path: &Path) {
    Command::new("git")
        .args(["init"])
        .current_dir(path)
        .output()
        .expect("Failed to init git repo");

    // Configure git user for commits
    Command::new("git")
        .args(["config", "user.email", "test@example.com"])
        .current_dir(path)
        .output()
        .expect("Failed to configure git email");

    Command::new("git")
        .args(["config", "user.name", "Test User"])
        .current_dir(path)
        .output()
        .expect("Failed to configure git name");

    Command::new("git")
        .args(["config", "commit.gpgsign", "false"])
        .current_dir(path)
        .output()
        .expect("Failed to disable commit signing");
}

/// A project with two tasks and two flows. The task commands shell out to
/// git so they behave the same on every platform the tests run on.
const PROJECT: &str = r#"
[project]
name = "demo"

[tasks.greet]
class = "command"
description = "Print the git version"
options = { command = "git --version" }

[tasks.explode]
class = "command"
description = "Run a git subcommand that does not exist"
options = { command = "git frobnicate" }

[flows.ci]
description = "Greet twice"

[[flows.ci.steps]]
task = "greet"

[[flows.ci.steps]]
id = "verify"
task = "greet"
needs = ["greet"]

[flows.doomed]

[[flows.doomed.steps]]
id = "gate"
task = "explode"

[[flows.doomed.steps]]
id = "after"
task = "greet"
needs = ["gate"]
"#;

/// Helper to set up a git repo with a nimbus.toml already in place
fn setup_project(toml: &str) -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp dir");
    init_git_repo(temp.path());
    fs::write(temp.path().join("nimbus.toml"), toml).expect("Failed to write nimbus.toml");
    temp
}

// =============================================================================
// VERSION AND BARE INVOCATION
// =============================================================================

#[test]
fn test_version_command() {
    nimbus()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("nimbus v"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_version_json_output() {
    let output = nimbus().args(["--json", "version"]).output().expect("Failed to run nimbus");
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("version output should be JSON");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_no_arguments_prints_usage_hint() {
    nimbus()
        .assert()
        .success()
        .stdout(predicate::str::contains("nimbus v"))
        .stdout(predicate::str::contains("Run 'nimbus init' to get started"));
}

// =============================================================================
// INIT
// =============================================================================

#[test]
fn test_init_creates_config_and_hook() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    init_git_repo(temp.path());

    nimbus()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created nimbus.toml"))
        .stdout(predicate::str::contains("Installed pre-commit hook"));

    assert!(temp.path().join("nimbus.toml").exists());

    let hook = fs::read_to_string(temp.path().join(".git/hooks/pre-commit"))
        .expect("pre-commit hook should exist");
    assert!(hook.contains("nimbus hook run pre-commit"));
}

#[test]
fn test_init_twice_requires_force() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    init_git_repo(temp.path());

    nimbus().arg("init").current_dir(temp.path()).assert().success();

    nimbus()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Already initialized"))
        .stdout(predicate::str::contains("--force"));

    nimbus()
        .args(["init", "--force"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created nimbus.toml"));
}

#[test]
fn test_init_appends_to_existing_hook() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    init_git_repo(temp.path());

    let hook_path = temp.path().join(".git/hooks/pre-commit");
    fs::write(&hook_path, "#!/bin/sh\necho custom-linting\n").expect("Failed to write hook");

    nimbus().arg("init").current_dir(temp.path()).assert().success();

    let hook = fs::read_to_string(&hook_path).expect("Failed to read hook");
    assert!(hook.contains("echo custom-linting"), "existing hook content should survive");
    assert!(hook.contains("nimbus hook run pre-commit"));
}

#[test]
fn test_init_outside_a_git_repo_fails() {
    let temp = TempDir::new().expect("Failed to create temp dir");

    nimbus()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a git repository"));
}

// =============================================================================
// TASKS
// =============================================================================

#[test]
fn test_task_list_shows_configured_and_builtin_tasks() {
    let temp = setup_project(PROJECT);

    nimbus()
        .args(["task", "list"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("greet"))
        .stdout(predicate::str::contains("Print the git version"))
        .stdout(predicate::str::contains("github_release_notes"))
        .stdout(predicate::str::contains("parent_pr_notes"));
}

#[test]
fn test_task_list_json_output() {
    let temp = setup_project(PROJECT);

    let output = nimbus()
        .args(["--json", "task", "list"])
        .current_dir(temp.path())
        .output()
        .expect("Failed to run nimbus");
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("task list output should be JSON");
    let names: Vec<&str> = value["tasks"]
        .as_array()
        .expect("tasks should be an array")
        .iter()
        .map(|task| task["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"greet"));
    assert!(names.contains(&"command"));
}

#[test]
fn test_task_info_describes_a_builtin() {
    let temp = setup_project(PROJECT);

    nimbus()
        .args(["task", "info", "github_release_notes"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("github_release_notes"))
        .stdout(predicate::str::contains("required options: tag"));
}

#[test]
fn test_task_info_shows_configured_options() {
    let temp = setup_project(PROJECT);

    nimbus()
        .args(["task", "info", "greet"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("class: command"))
        .stdout(predicate::str::contains("command = git --version"));
}

#[test]
fn test_task_info_unknown_task_fails() {
    let temp = setup_project(PROJECT);

    nimbus()
        .args(["task", "info", "warp-drive"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("task not found: warp-drive"));
}

#[test]
fn test_task_run_reports_success() {
    let temp = setup_project(PROJECT);

    nimbus()
        .args(["task", "run", "greet"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Task greet succeeded"))
        .stdout(predicate::str::contains("exit_code: 0"));
}

#[test]
fn test_task_run_reports_failure() {
    let temp = setup_project(PROJECT);

    nimbus()
        .args(["task", "run", "explode"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Task explode FAILED"))
        .stderr(predicate::str::contains("command 'git frobnicate' exited with code 1"));
}

#[test]
fn test_task_run_option_overrides_config() {
    let temp = setup_project(PROJECT);

    // The configured command would fail; the override makes it pass.
    nimbus()
        .args(["task", "run", "explode", "-o", "command=git --version"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Task explode succeeded"));
}

#[test]
fn test_task_run_missing_required_options() {
    let temp = setup_project(PROJECT);

    nimbus()
        .args(["task", "run", "command"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "command requires the options (command) and no values were provided",
        ));
}

#[test]
fn test_task_run_rejects_malformed_option() {
    let temp = setup_project(PROJECT);

    nimbus()
        .args(["task", "run", "greet", "-o", "no-equals-sign"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected KEY=VALUE, got 'no-equals-sign'"));
}

// =============================================================================
// FLOWS
// =============================================================================

#[test]
fn test_flow_list_shows_step_counts() {
    let temp = setup_project(PROJECT);

    nimbus()
        .args(["flow", "list"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ci"))
        .stdout(predicate::str::contains("2 step(s)"))
        .stdout(predicate::str::contains("doomed"));
}

#[test]
fn test_flow_info_shows_steps_and_needs() {
    let temp = setup_project(PROJECT);

    nimbus()
        .args(["flow", "info", "ci"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("greet -> greet"))
        .stdout(predicate::str::contains("verify -> greet"))
        .stdout(predicate::str::contains("(needs: greet)"));
}

#[test]
fn test_flow_run_executes_every_step() {
    let temp = setup_project(PROJECT);

    nimbus()
        .args(["flow", "run", "ci"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Flow ci:"))
        .stdout(predicate::str::contains("[greet]"))
        .stdout(predicate::str::contains("[verify]"))
        .stdout(predicate::str::contains("Flow ci succeeded"));
}

#[test]
fn test_flow_run_skips_dependents_of_failed_steps() {
    let temp = setup_project(PROJECT);

    nimbus()
        .args(["flow", "run", "doomed"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAILED [gate]"))
        .stdout(predicate::str::contains("skipped [after]"))
        .stdout(predicate::str::contains("Flow doomed FAILED"))
        .stderr(predicate::str::contains("flow 'doomed' failed"));
}

#[test]
fn test_flow_run_json_output() {
    let temp = setup_project(PROJECT);

    let output = nimbus()
        .args(["--json", "flow", "run", "ci"])
        .current_dir(temp.path())
        .output()
        .expect("Failed to run nimbus");
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("flow run output should be JSON");
    assert_eq!(value["flow"], "ci");
    assert_eq!(value["passed"], true);
    assert_eq!(value["steps"][0]["status"], "success");
    assert_eq!(value["steps"][1]["status"], "success");
}

#[test]
fn test_flow_freeze_emits_frozen_steps() {
    let temp = setup_project(PROJECT);

    let output = nimbus()
        .args(["flow", "freeze", "ci"])
        .current_dir(temp.path())
        .output()
        .expect("Failed to run nimbus");
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("freeze output should be JSON");
    let steps = value.as_array().expect("freeze should emit an array");
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0]["path"], "ci.greet");
    assert_eq!(steps[0]["step_num"], "1");
    assert_eq!(steps[1]["path"], "ci.verify");
}

#[test]
fn test_flow_run_unknown_flow_fails() {
    let temp = setup_project(PROJECT);

    nimbus()
        .args(["flow", "run", "ghost"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("flow not found: ghost"));
}

// =============================================================================
// RELEASE NOTES
// =============================================================================

#[test]
fn test_release_notes_requires_a_repository() {
    // No [project.repository] and no origin remote to infer one from.
    let temp = setup_project(PROJECT);

    nimbus()
        .args(["release-notes", "release/1.0"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no 'origin' remote configured"));
}

#[test]
fn test_release_notes_requires_github_credentials() {
    let toml =
        format!("{PROJECT}\n[project.repository]\nowner = \"TestOwner\"\nname = \"TestRepo\"\n");
    let temp = setup_project(&toml);
    let home = TempDir::new().expect("Failed to create temp home");

    nimbus()
        .args(["release-notes", "release/1.0"])
        .current_dir(temp.path())
        .env("HOME", home.path())
        .env_remove("GITHUB_TOKEN")
        .assert()
        .failure()
        .stderr(predicate::str::contains("service 'github' is not configured"));
}

// =============================================================================
// SERVICES
// =============================================================================

#[test]
fn test_service_list_reports_unconfigured_github() {
    let home = TempDir::new().expect("Failed to create temp home");

    nimbus()
        .args(["service", "list"])
        .env("HOME", home.path())
        .env_remove("GITHUB_TOKEN")
        .assert()
        .success()
        .stdout(predicate::str::contains("github"))
        .stdout(predicate::str::contains("not configured"));
}

#[test]
fn test_service_list_counts_environment_token() {
    let home = TempDir::new().expect("Failed to create temp home");

    nimbus()
        .args(["service", "list"])
        .env("HOME", home.path())
        .env("GITHUB_TOKEN", "ghp_from_env")
        .assert()
        .success()
        .stdout(predicate::str::contains("(token)"))
        .stdout(predicate::str::contains("not configured").not());
}

#[test]
fn test_service_set_then_info_masks_the_token() {
    let home = TempDir::new().expect("Failed to create temp home");

    nimbus()
        .args(["service", "set", "github", "--token", "ghp_secret9876", "--username", "octocat"])
        .env("HOME", home.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Service 'github' updated."));

    assert!(home.path().join(".nimbus/config.toml").exists());

    nimbus()
        .args(["service", "info", "github"])
        .env("HOME", home.path())
        .env_remove("GITHUB_TOKEN")
        .assert()
        .success()
        .stdout(predicate::str::contains("username: octocat"))
        .stdout(predicate::str::contains("token: ****9876 (from global config)"))
        .stdout(predicate::str::contains("ghp_secret9876").not());
}

#[test]
fn test_service_info_prefers_environment_token() {
    let home = TempDir::new().expect("Failed to create temp home");

    nimbus()
        .args(["service", "info", "github"])
        .env("HOME", home.path())
        .env("GITHUB_TOKEN", "ghp_ambient5678")
        .assert()
        .success()
        .stdout(predicate::str::contains("token: ****5678 (from environment)"));
}

#[test]
fn test_service_set_with_no_attributes_fails() {
    let home = TempDir::new().expect("Failed to create temp home");

    nimbus()
        .args(["service", "set", "github"])
        .env("HOME", home.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to set"));
}

// =============================================================================
// HOOKS
// =============================================================================

#[test]
fn test_hook_run_is_silent_without_a_project() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    init_git_repo(temp.path());

    nimbus()
        .args(["hook", "run", "pre-commit"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_hook_run_is_silent_when_no_hook_configured() {
    let temp = setup_project(PROJECT);

    nimbus()
        .args(["hook", "run", "pre-commit"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_hook_run_rejects_unknown_kinds() {
    nimbus()
        .args(["hook", "run", "post-merge"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown hook kind 'post-merge'"));
}

#[test]
fn test_hook_run_executes_the_configured_flow() {
    let toml = format!("{PROJECT}\n[hooks]\npre_commit = \"ci\"\n");
    let temp = setup_project(&toml);

    nimbus()
        .args(["hook", "run", "pre-commit"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Flow ci succeeded"));
}

#[test]
fn test_hook_run_fails_when_the_flow_fails() {
    let toml = format!("{PROJECT}\n[hooks]\npre_commit = \"doomed\"\n");
    let temp = setup_project(&toml);

    nimbus()
        .args(["hook", "run", "pre-commit"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("pre-commit flow 'doomed' failed"));
}
