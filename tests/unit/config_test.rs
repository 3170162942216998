//! Tests for project and global configuration loading

use std::fs;

use nimbus::config::{ConfigError, GlobalConfig, Keychain, ProjectConfig, ServiceConfig};
use tempfile::TempDir;

use crate::common::{CI_PROJECT, TestProject};

// =============================================================================
// PROJECT CONFIG TESTS
// =============================================================================

#[test]
fn test_load_from_reads_nimbus_toml() {
    let project = TestProject::new(CI_PROJECT);
    let config = ProjectConfig::load_from(project.path()).unwrap();

    assert_eq!(config.project.name, "demo");
    assert_eq!(config.tasks["greet"].class, "command");
    assert_eq!(config.flows["ci"].steps.len(), 2);
}

#[test]
fn test_load_from_missing_file_is_not_found() {
    let temp = TempDir::new().unwrap();
    let err = ProjectConfig::load_from(temp.path()).unwrap_err();

    assert!(matches!(err, ConfigError::NotFound(_)));
    assert!(err.to_string().contains("no nimbus.toml found"));
}

#[test]
fn test_load_from_rejects_invalid_toml() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("nimbus.toml"), "[project\nname =").unwrap();

    let err = ProjectConfig::load_from(temp.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_load_from_rejects_missing_name() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("nimbus.toml"), "[project]\nname = \"\"\n").unwrap();

    let err = ProjectConfig::load_from(temp.path()).unwrap_err();
    assert!(err.to_string().contains("project.name"));
}

#[test]
fn test_load_from_validates_hook_flow_reference() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("nimbus.toml"),
        "[project]\nname = \"demo\"\n\n[hooks]\npre_commit = \"nope\"\n",
    )
    .unwrap();

    let err = ProjectConfig::load_from(temp.path()).unwrap_err();
    assert!(err.to_string().contains("unknown flow 'nope'"));
}

#[test]
fn test_full_config_round_trips_through_toml() {
    let project = TestProject::new(
        r#"
[project]
name = "demo"
package = "Demo Product"

[project.git]
default_branch = "trunk"
prefix_feature = "feat/"

[project.repository]
owner = "TestOwner"
name = "TestRepo"

[tasks.lint]
class = "command"
options = { command = "cargo clippy" }

[hooks]
pre_commit = "ci"

[flows.ci]
[[flows.ci.steps]]
task = "lint"
"#,
    );
    let config = project.config();

    assert_eq!(config.project.package.as_deref(), Some("Demo Product"));
    assert_eq!(config.project.git.default_branch, "trunk");
    assert_eq!(config.project.git.prefix_feature, "feat/");
    // Unset naming conventions keep their defaults
    assert_eq!(config.project.git.prefix_release, "release/");
    let repository = config.project.repository.as_ref().unwrap();
    assert_eq!(repository.owner, "TestOwner");
    assert_eq!(repository.name, "TestRepo");
    assert_eq!(config.hooks.pre_commit.as_deref(), Some("ci"));

    let text = toml::to_string_pretty(&config).unwrap();
    let reparsed: ProjectConfig = toml::from_str(&text).unwrap();
    assert_eq!(reparsed.project.git.default_branch, "trunk");
    assert_eq!(reparsed.tasks["lint"].options["command"], "cargo clippy");
}

#[test]
fn test_interpolation_through_loaded_config() {
    let project = TestProject::new(CI_PROJECT);
    let config = project.config();

    let expanded = config.interpolate("releasing $project.name from $project.git__default_branch");
    assert_eq!(expanded.unwrap(), "releasing demo from main");
}

// =============================================================================
// GLOBAL CONFIG TESTS
// =============================================================================

#[test]
fn test_global_config_round_trips_through_toml() {
    let mut config = GlobalConfig::default();
    config.set_service(
        "github",
        ServiceConfig {
            username: Some("octocat".to_string()),
            token: Some("ghp_abc123".to_string()),
            email: None,
        },
    );

    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

    let loaded: GlobalConfig = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let github = loaded.service("github").unwrap();
    assert_eq!(github.username.as_deref(), Some("octocat"));
    assert_eq!(github.token.as_deref(), Some("ghp_abc123"));
    assert_eq!(github.email, None);
}

#[test]
fn test_set_service_merges_rather_than_replaces() {
    let mut config = GlobalConfig::default();
    config.set_service(
        "github",
        ServiceConfig { token: Some("ghp_old".to_string()), ..Default::default() },
    );
    config.set_service(
        "github",
        ServiceConfig { email: Some("o@example.com".to_string()), ..Default::default() },
    );

    let github = config.service("github").unwrap();
    assert_eq!(github.token.as_deref(), Some("ghp_old"));
    assert_eq!(github.email.as_deref(), Some("o@example.com"));
}

#[test]
fn test_keychain_resolves_stored_github_token() {
    // The environment override is exercised in the CLI integration
    // tests, where it can be injected on a child process.
    let mut global = GlobalConfig::default();
    global.set_service(
        "github",
        ServiceConfig { token: Some("ghp_stored".to_string()), ..Default::default() },
    );
    let keychain = Keychain::from_global(global);

    if std::env::var("GITHUB_TOKEN").is_ok() {
        return; // ambient token would shadow the stored one
    }
    let (token, source) = keychain.github_token().unwrap();
    assert_eq!(token, "ghp_stored");
    assert_eq!(source.as_str(), "global config");
}

#[test]
fn test_keychain_missing_service_names_the_fix() {
    let keychain = Keychain::from_global(GlobalConfig::default());
    let err = keychain.service("github").unwrap_err();
    assert_eq!(err.to_string(), "service 'github' is not configured (run 'nimbus service set github')");
}
