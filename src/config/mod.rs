//! Project and user configuration
//!
//! Two layers:
//! - `nimbus.toml` at the project root: project identity, git naming
//!   conventions, task and flow definitions, hooks (committed, shared).
//! - `~/.nimbus/config.toml`: per-user service credentials (never committed).

mod global;
mod project;

pub use global::{GITHUB_TOKEN_ENV, GlobalConfig, Keychain, ServiceConfig, TokenSource};
pub use project::{
    FlowDef, GitSettings, HookSettings, ProjectConfig, ProjectSection, RepositorySection, StepDef,
    TaskDef,
};

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading or querying configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No project config file was found
    #[error("no nimbus.toml found (searched from {0})")]
    NotFound(PathBuf),

    /// Filesystem error while reading or writing config
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML or has the wrong shape
    #[error("invalid nimbus.toml: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config file is structurally valid but inconsistent
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// A `$project.<attr>` reference names an attribute that does not exist
    #[error("unknown project attribute: {0}")]
    UnknownAttribute(String),

    /// A service has no stored credentials
    #[error("service '{0}' is not configured (run 'nimbus service set {0}')")]
    ServiceNotConfigured(String),

    /// A task name is neither configured nor builtin
    #[error("task not found: {0}")]
    UnknownTask(String),

    /// A flow name is not configured
    #[error("flow not found: {0}")]
    UnknownFlow(String),

    /// A task definition names a class that does not exist
    #[error("task '{task}' references unknown class '{class}'")]
    UnknownClass {
        /// Task name as configured
        task: String,
        /// The unrecognized class
        class: String,
    },
}
