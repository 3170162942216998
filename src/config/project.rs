//! `nimbus.toml` loading and interpolation
//!
//! The project file declares the project identity, branch naming
//! conventions, reusable tasks, flows composed of task steps, and git
//! hook wiring. Option values may reference project attributes with
//! `$project.<attr>`; nested attributes use `__` as the separator
//! (for example `$project.git__default_branch`).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::paths;

const INTERP_PREFIX: &str = "$project.";

/// Project configuration loaded from `nimbus.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project identity and git conventions
    #[serde(default)]
    pub project: ProjectSection,
    /// Reusable task definitions, keyed by task name
    #[serde(default)]
    pub tasks: BTreeMap<String, TaskDef>,
    /// Flow definitions, keyed by flow name
    #[serde(default)]
    pub flows: BTreeMap<String, FlowDef>,
    /// Git hook wiring
    #[serde(default)]
    pub hooks: HookSettings,
}

/// The `[project]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectSection {
    /// Project name
    #[serde(default)]
    pub name: String,
    /// Package or product name, when it differs from the project name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Branch naming conventions
    #[serde(default)]
    pub git: GitSettings,
    /// GitHub repository override (otherwise derived from the origin remote)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<RepositorySection>,
}

/// The `[project.git]` section: branch and tag naming conventions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitSettings {
    /// Branch that merged work lands on
    #[serde(default = "default_branch")]
    pub default_branch: String,
    /// Prefix for feature branches
    #[serde(default = "default_prefix_feature")]
    pub prefix_feature: String,
    /// Prefix for beta release tags
    #[serde(default = "default_prefix_beta")]
    pub prefix_beta: String,
    /// Prefix for production release tags
    #[serde(default = "default_prefix_release")]
    pub prefix_release: String,
    /// Separator between a parent feature branch and its children
    #[serde(default = "default_parent_separator")]
    pub parent_separator: String,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_prefix_feature() -> String {
    "feature/".to_string()
}

fn default_prefix_beta() -> String {
    "beta/".to_string()
}

fn default_prefix_release() -> String {
    "release/".to_string()
}

fn default_parent_separator() -> String {
    "__".to_string()
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            default_branch: default_branch(),
            prefix_feature: default_prefix_feature(),
            prefix_beta: default_prefix_beta(),
            prefix_release: default_prefix_release(),
            parent_separator: default_parent_separator(),
        }
    }
}

/// The `[project.repository]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySection {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
}

/// A `[tasks.<name>]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDef {
    /// Class implementing the task (`command`, `github_release_notes`, ...)
    pub class: String,
    /// Short description shown in listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default option values for the task
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

/// A `[flows.<name>]` entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowDef {
    /// Short description shown in listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Steps in declaration order
    #[serde(default)]
    pub steps: Vec<StepDef>,
}

/// A `[[flows.<name>.steps]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDef {
    /// Step id, unique within the flow (defaults to the task name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Name of the task to run
    pub task: String,
    /// Ids of steps that must succeed before this one runs
    #[serde(default)]
    pub needs: Vec<String>,
    /// Option overrides applied on top of the task's defaults
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

/// The `[hooks]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookSettings {
    /// Flow to run from the git pre-commit hook
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_commit: Option<String>,
}

impl ProjectConfig {
    /// Load the config from `<root>/nimbus.toml`.
    pub fn load_from(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(paths::PROJECT_TOML);
        if !path.exists() {
            return Err(ConfigError::NotFound(root.to_path_buf()));
        }
        let content = fs::read_to_string(&path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Locate and load the project config for the current directory.
    ///
    /// Returns the config together with the project root it was found in.
    pub fn discover() -> Result<(Self, PathBuf), ConfigError> {
        let root = paths::project_root();
        if root.join(paths::PROJECT_TOML).exists() {
            return Ok((Self::load_from(&root)?, root));
        }
        let cwd = std::env::current_dir()?;
        if cwd.join(paths::PROJECT_TOML).exists() {
            return Ok((Self::load_from(&cwd)?, cwd));
        }
        Err(ConfigError::NotFound(root))
    }

    /// Check cross-references that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project.name.trim().is_empty() {
            return Err(ConfigError::Invalid("project.name must be set".to_string()));
        }
        if let Some(flow) = &self.hooks.pre_commit
            && !self.flows.contains_key(flow)
        {
            return Err(ConfigError::Invalid(format!(
                "hooks.pre_commit references unknown flow '{flow}'"
            )));
        }
        Ok(())
    }

    /// Look up a project attribute by its interpolation path.
    ///
    /// Known-but-unset attributes resolve to an empty string; names
    /// outside the schema are an error.
    pub fn lookup(&self, attr: &str) -> Result<String, ConfigError> {
        let value = match attr {
            "name" => self.project.name.clone(),
            "package" => self.project.package.clone().unwrap_or_default(),
            "git__default_branch" => self.project.git.default_branch.clone(),
            "git__prefix_feature" => self.project.git.prefix_feature.clone(),
            "git__prefix_beta" => self.project.git.prefix_beta.clone(),
            "git__prefix_release" => self.project.git.prefix_release.clone(),
            "git__parent_separator" => self.project.git.parent_separator.clone(),
            "repository__owner" => {
                self.project.repository.as_ref().map(|r| r.owner.clone()).unwrap_or_default()
            }
            "repository__name" => {
                self.project.repository.as_ref().map(|r| r.name.clone()).unwrap_or_default()
            }
            _ => return Err(ConfigError::UnknownAttribute(attr.to_string())),
        };
        Ok(value)
    }

    /// Expand every `$project.<attr>` reference in a value.
    pub fn interpolate(&self, value: &str) -> Result<String, ConfigError> {
        let re = project_attr_re();
        let mut out = String::with_capacity(value.len());
        let mut last = 0;
        for found in re.find_iter(value) {
            out.push_str(&value[last..found.start()]);
            let attr = &found.as_str()[INTERP_PREFIX.len()..];
            out.push_str(&self.lookup(attr)?);
            last = found.end();
        }
        out.push_str(&value[last..]);
        Ok(out)
    }
}

fn project_attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$project\.(\w+)").expect("static pattern"))
}
