//! Centralized path definitions for nimbus
//!
//! This module provides a single source of truth for the filesystem paths
//! nimbus reads and writes.
//!
//! ## Layout
//!
//! ### Per-Project (Repository Root)
//!
//! ```text
//! repo/
//! └── nimbus.toml        # Committed project config: tasks, flows, hooks
//! ```
//!
//! ### Global (User-Level)
//!
//! ```text
//! ~/.nimbus/
//! └── config.toml        # Service credentials (github token, ...)
//! ```

use std::path::PathBuf;

use crate::git;

/// Project configuration filename
pub const PROJECT_TOML: &str = "nimbus.toml";

/// Global config directory name
const GLOBAL_DIR: &str = ".nimbus";

/// Global config filename
const GLOBAL_CONFIG_FILE: &str = "config.toml";

/// Get the project root directory.
///
/// Returns the enclosing git repository's working directory so that
/// nimbus behaves the same from any subdirectory of a project.
#[must_use]
pub fn project_root() -> PathBuf {
    git::repo_root().unwrap_or_else(|| PathBuf::from("."))
}

/// Get path to the `nimbus.toml` config file at the project root.
#[must_use]
pub fn project_toml() -> PathBuf {
    project_root().join(PROJECT_TOML)
}

/// Get the global nimbus directory.
///
/// Returns `~/.nimbus/`.
#[must_use]
pub fn global_config_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("~")).join(GLOBAL_DIR)
}

/// Get the global config file path.
///
/// Returns `~/.nimbus/config.toml`. Contains service credentials.
#[must_use]
pub fn global_config() -> PathBuf {
    global_config_dir().join(GLOBAL_CONFIG_FILE)
}
