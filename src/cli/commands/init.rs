//! Initialize nimbus in a repository

use std::fs;

use anyhow::Context;

use crate::output::OutputMode;
use crate::{git, paths};

/// Initialize nimbus in the current repository
pub fn init(force: bool, _mode: OutputMode) -> anyhow::Result<()> {
    let root = paths::project_root();
    let toml_path = root.join(paths::PROJECT_TOML);

    if toml_path.exists() && !force {
        println!("Already initialized (nimbus.toml exists).");
        println!("Use --force to reinitialize.");
        return Ok(());
    }

    println!("Initializing nimbus...\n");

    let name = git::repo_name(&root);
    println!("  Project name: {name}");

    let nimbus_toml = format!(
        r#"# nimbus project configuration

[project]
name = "{name}"

# Branch and tag conventions (defaults shown):
# [project.git]
# default_branch = "main"
# prefix_feature = "feature/"
# prefix_release = "release/"

# Tasks wrap commands with options:
# [tasks.lint]
# class = "command"
# description = "Run the linter"
# options = {{ command = "cargo clippy" }}

# Flows compose tasks into a dependency graph:
# [flows.ci]
# description = "Lint, then test"
#
# [[flows.ci.steps]]
# task = "lint"
#
# [[flows.ci.steps]]
# task = "test"
# needs = ["lint"]

# Run a flow before every commit:
# [hooks]
# pre_commit = "ci"
"#
    );
    fs::write(&toml_path, nimbus_toml)
        .with_context(|| format!("could not write {}", toml_path.display()))?;
    println!("  Created nimbus.toml");

    git::hooks::install_pre_commit(&root)?;
    println!("  Installed pre-commit hook");

    println!("\nnimbus initialized!");
    println!("\nNext steps:");
    println!("  edit nimbus.toml to define tasks and flows");
    println!("  nimbus task list");

    Ok(())
}
