//! Tests for git inspection against real repositories

use nimbus::git;

use crate::common::{CI_PROJECT, TestProject};

// =============================================================================
// REMOTE PARSING TESTS
// =============================================================================

#[test]
fn test_parse_remote_all_url_forms() {
    let expected = Some(("TestOwner".to_string(), "TestRepo".to_string()));

    assert_eq!(git::parse_remote("https://github.com/TestOwner/TestRepo.git"), expected);
    assert_eq!(git::parse_remote("https://github.com/TestOwner/TestRepo"), expected);
    assert_eq!(git::parse_remote("ssh://git@github.com/TestOwner/TestRepo.git"), expected);
    assert_eq!(git::parse_remote("git@github.com:TestOwner/TestRepo.git"), expected);
}

#[test]
fn test_parse_remote_trailing_slash() {
    assert_eq!(
        git::parse_remote("https://github.com/TestOwner/TestRepo/"),
        Some(("TestOwner".to_string(), "TestRepo".to_string()))
    );
}

#[test]
fn test_parse_remote_rejects_non_repo_urls() {
    assert_eq!(git::parse_remote("https://github.com/TestOwner"), None);
    assert_eq!(git::parse_remote("https://github.com/a/b/c"), None);
    assert_eq!(git::parse_remote("/local/path/repo"), None);
}

// =============================================================================
// REPOSITORY INSPECTION TESTS
// =============================================================================

#[test]
fn test_head_inspection_on_fresh_repo() {
    let project = TestProject::new(CI_PROJECT);
    let sha = project.commit_all("Initial commit");

    assert_eq!(git::head_sha(project.path()), Some(sha));
    assert_eq!(git::head_message(project.path()), Some("Initial commit".to_string()));
    // The root commit has no parents
    assert_eq!(git::head_parent_count(project.path()), Some(0));

    project.write_file("notes.txt", "hello\n");
    let second = project.commit_all("Add notes");
    assert_eq!(git::head_sha(project.path()), Some(second));
    assert_eq!(git::head_parent_count(project.path()), Some(1));

    let branch = git::current_branch(project.path()).unwrap();
    // Depends on init.defaultBranch, but it is never detached
    assert!(!branch.is_empty());
}

#[test]
fn test_merge_commit_has_two_parents() {
    let project = TestProject::new(CI_PROJECT);
    project.commit_all("Initial commit");
    let trunk = git::current_branch(project.path()).unwrap();

    assert!(git::checkout(project.path(), "feature/widgets", true));
    project.write_file("widget.txt", "spinning\n");
    project.commit_all("Add widget");

    assert!(git::checkout(project.path(), &trunk, false));
    assert!(git::merge_no_ff(
        project.path(),
        "feature/widgets",
        "Merge pull request #7 from TestOwner/feature/widgets",
    ));

    assert_eq!(git::head_parent_count(project.path()), Some(2));
    let message = git::head_message(project.path()).unwrap();
    assert!(message.contains("Merge pull request #7"));
}

#[test]
fn test_repo_name_falls_back_to_directory() {
    let project = TestProject::new(CI_PROJECT);
    // No origin remote configured, so the directory name is used
    let name = git::repo_name(project.path());
    let dir_name =
        project.path().file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
    assert_eq!(name, dir_name);
}

#[test]
fn test_repo_name_prefers_origin_remote() {
    let project = TestProject::new(CI_PROJECT);
    let added = std::process::Command::new("git")
        .args(["remote", "add", "origin", "https://github.com/TestOwner/TestRepo.git"])
        .current_dir(project.path())
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    assert!(added, "could not add origin remote");

    assert_eq!(git::remote_url(project.path()).as_deref(), Some("https://github.com/TestOwner/TestRepo.git"));
    assert_eq!(git::repo_name(project.path()), "TestRepo");
}
