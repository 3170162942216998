//! Git hooks installation
//!
//! Installs a pre-commit hook that runs the flow configured under
//! `[hooks].pre_commit` in `nimbus.toml`. When nothing is configured
//! the hook is a no-op, so installing it is always safe.

use std::fs;
use std::path::Path;

/// Install the pre-commit hook
pub fn install_pre_commit(repo_root: &Path) -> anyhow::Result<()> {
    let hooks_dir = repo_root.join(".git/hooks");
    if !hooks_dir.exists() {
        anyhow::bail!("Not a git repository (.git/hooks not found)");
    }

    let hook_path = hooks_dir.join("pre-commit");
    let hook_content = r"#!/bin/sh
# nimbus pre-commit hook
# Runs the flow configured under [hooks].pre_commit in nimbus.toml

nimbus hook run pre-commit || exit 1
";

    if hook_path.exists() {
        let existing = fs::read_to_string(&hook_path)?;
        if existing.contains("nimbus") {
            return Ok(()); // Already installed
        }
        // Append to existing hook
        let new_content = format!("{}\n\n# nimbus\n{}", existing.trim(), hook_content);
        fs::write(&hook_path, new_content)?;
    } else {
        fs::write(&hook_path, hook_content)?;
    }

    // Make executable
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&hook_path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&hook_path, perms)?;
    }

    Ok(())
}
