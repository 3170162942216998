//! Task framework
//!
//! A task is a named unit of automation: a shell command, a release
//! notes build, anything with options and return values. Projects bind
//! names to task classes in `nimbus.toml`; a small set of classes ships
//! built in. `resolve` turns a name into a runnable [`Task`] and
//! `run_task` executes it from the project root with merged,
//! interpolated options.

pub mod command;
pub mod options;
pub mod parent_pr;
pub mod release_notes;
pub mod retry;

pub use command::CommandTask;
pub use options::TaskOptions;
pub use parent_pr::ParentPrNotesTask;
pub use release_notes::GithubReleaseNotesTask;
pub use retry::{PollState, RetryOptions};

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

use crate::config::{ConfigError, Keychain, ProjectConfig, TaskDef};
use crate::git;
use crate::github::{GithubClient, GithubError, RepoHandle};

/// Failures surfaced while resolving or running tasks
#[derive(Debug, Error)]
pub enum TaskError {
    /// An option is missing, malformed, or inconsistent
    #[error("{0}")]
    Options(String),
    /// Project or service configuration problem
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// GitHub API failure
    #[error(transparent)]
    Github(#[from] GithubError),
    /// Filesystem failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A subprocess exited with a non-zero status
    #[error("command '{command}' exited with code {code}")]
    CommandFailed {
        /// The command line that failed
        command: String,
        /// Exit code, or -1 if terminated by a signal
        code: i32,
    },
    /// Polling gave up before the condition was met
    #[error("gave up waiting after {attempts} attempts")]
    PollTimeout {
        /// Polls performed before giving up
        attempts: u64,
    },
    /// Local git state could not be read
    #[error("{0}")]
    Git(String),
}

/// A runnable unit of automation.
///
/// Implementations read their inputs from [`TaskOptions`] and report
/// results through [`TaskOutcome::return_values`].
pub trait Task: fmt::Debug {
    /// Options that must carry a value before the task runs
    fn required_options(&self) -> &'static [&'static str] {
        &[]
    }

    /// Execute the task.
    fn run(&mut self, ctx: &TaskContext, options: &TaskOptions) -> Result<TaskOutcome, TaskError>;
}

/// Values a task hands back to its caller
#[derive(Debug, Clone, Default)]
pub struct TaskOutcome {
    /// Named results, e.g. the URL of a created release
    pub return_values: BTreeMap<String, String>,
}

impl TaskOutcome {
    /// Outcome with a single return value
    #[must_use]
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut outcome = Self::default();
        outcome.return_values.insert(key.to_string(), value.to_string());
        outcome
    }
}

/// Everything a task needs from its environment
#[derive(Debug)]
pub struct TaskContext {
    /// Project configuration in effect
    pub project: ProjectConfig,
    /// Stored service credentials
    pub keychain: Keychain,
    /// Project root directory
    pub root: PathBuf,
}

impl TaskContext {
    /// Build a context from explicit parts.
    #[must_use]
    pub const fn new(project: ProjectConfig, keychain: Keychain, root: PathBuf) -> Self {
        Self { project, keychain, root }
    }

    /// Locate the project from the working directory.
    pub fn discover() -> Result<Self, ConfigError> {
        let (project, root) = ProjectConfig::discover()?;
        Ok(Self { project, keychain: Keychain::load(), root })
    }

    /// The GitHub `owner`/`name` pair for this project.
    ///
    /// Prefers the `[project.repository]` section; falls back to
    /// parsing the `origin` remote.
    pub fn repo_slug(&self) -> Result<(String, String), TaskError> {
        if let Some(repo) = &self.project.project.repository {
            return Ok((repo.owner.clone(), repo.name.clone()));
        }
        let url = git::remote_url(&self.root)
            .ok_or_else(|| TaskError::Git("no 'origin' remote configured".to_string()))?;
        git::parse_remote(&url)
            .ok_or_else(|| TaskError::Git(format!("could not parse remote URL '{url}'")))
    }

    /// An authenticated GitHub client.
    pub fn github(&self) -> Result<GithubClient, TaskError> {
        let (token, _) = self.keychain.github_token()?;
        Ok(GithubClient::new(&token)?)
    }

    /// An authenticated handle on the project repository.
    pub fn github_repo(&self) -> Result<RepoHandle, TaskError> {
        let (owner, name) = self.repo_slug()?;
        Ok(self.github()?.repo(&owner, &name))
    }
}

/// Task classes implemented by nimbus itself
pub const BUILTIN_CLASSES: &[&str] = &["command", "github_release_notes", "parent_pr_notes"];

fn instantiate(class: &str) -> Option<Box<dyn Task>> {
    match class {
        "command" => Some(Box::new(CommandTask)),
        "github_release_notes" => Some(Box::new(GithubReleaseNotesTask)),
        "parent_pr_notes" => Some(Box::new(ParentPrNotesTask)),
        _ => None,
    }
}

/// Definition for a task that ships with nimbus, if `name` names one.
#[must_use]
pub fn builtin_def(name: &str) -> Option<TaskDef> {
    let description = match name {
        "command" => "Run an arbitrary command in the project root",
        "github_release_notes" => "Generate release notes from merged pull requests",
        "parent_pr_notes" => "Aggregate change notes from child branches onto the parent pull request",
        _ => return None,
    };
    Some(TaskDef {
        class: name.to_string(),
        description: Some(description.to_string()),
        options: BTreeMap::new(),
    })
}

/// A task name resolved to its definition and implementation
#[derive(Debug)]
pub struct ResolvedTask {
    /// Name the task was looked up under
    pub name: String,
    /// Definition from the project file or the builtin registry
    pub def: TaskDef,
    /// Implementation behind `def.class`
    pub task: Box<dyn Task>,
}

/// Look up a task by name, preferring `[tasks]` entries over builtins.
pub fn resolve(project: &ProjectConfig, name: &str) -> Result<ResolvedTask, ConfigError> {
    let def = project
        .tasks
        .get(name)
        .cloned()
        .or_else(|| builtin_def(name))
        .ok_or_else(|| ConfigError::UnknownTask(name.to_string()))?;
    let task = instantiate(&def.class).ok_or_else(|| ConfigError::UnknownClass {
        task: name.to_string(),
        class: def.class.clone(),
    })?;
    Ok(ResolvedTask { name: name.to_string(), def, task })
}

/// Run a resolved task.
///
/// Options from the task definition are overridden by `cli_options`,
/// then `$project.` references are interpolated. Runs with the project
/// root as the working directory and restores the previous directory
/// afterwards.
pub fn run_task(
    mut resolved: ResolvedTask,
    ctx: &TaskContext,
    cli_options: &TaskOptions,
) -> Result<TaskOutcome, TaskError> {
    let defaults = TaskOptions::from(resolved.def.options.clone());
    let options = defaults.merged(cli_options).interpolated(&ctx.project)?;

    let missing: Vec<&str> = resolved
        .task
        .required_options()
        .iter()
        .copied()
        .filter(|name| options.get(name).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(TaskError::Options(format!(
            "{} requires the options ({}) and no values were provided",
            resolved.name,
            missing.join(", ")
        )));
    }

    info!("Beginning task: {}", resolved.name);
    let _workdir = Workdir::enter(&ctx.root)?;
    resolved.task.run(ctx, &options)
}

/// Restores the previous working directory when dropped
struct Workdir {
    previous: PathBuf,
}

impl Workdir {
    fn enter(root: &Path) -> Result<Self, TaskError> {
        let previous = env::current_dir()?;
        env::set_current_dir(root)?;
        Ok(Self { previous })
    }
}

impl Drop for Workdir {
    fn drop(&mut self) {
        let _ = env::set_current_dir(&self.previous);
    }
}
