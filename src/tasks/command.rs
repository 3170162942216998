//! Shell command task
//!
//! Runs an external tool from the project root with optional extra
//! arguments, environment entries, and a set of repository files
//! selected by include/exclude globs. Matched files are appended to
//! the argv, so `command = "rustfmt --check"` with
//! `include = "src/**/*.rs"` checks every tracked source file.

use std::path::{Path, PathBuf};
use std::process::Command;

use glob::Pattern;
use log::info;
use walkdir::WalkDir;

use super::options::TaskOptions;
use super::retry::{self, RetryOptions};
use super::{Task, TaskContext, TaskError, TaskOutcome};

/// Runs an external command from the project root
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandTask;

impl Task for CommandTask {
    fn required_options(&self) -> &'static [&'static str] {
        &["command"]
    }

    fn run(&mut self, ctx: &TaskContext, options: &TaskOptions) -> Result<TaskOutcome, TaskError> {
        let command_line = options.require("command")?.to_string();
        let mut argv: Vec<String> =
            command_line.split_whitespace().map(str::to_string).collect();
        if argv.is_empty() {
            return Err(TaskError::Options("command is empty".to_string()));
        }
        argv.extend(options.get_list("args"));

        let include = compile_patterns(&options.get_list("include"))?;
        let exclude = compile_patterns(&options.get_list("exclude"))?;
        if !include.is_empty() {
            let files = select_files(&ctx.root, &include, &exclude);
            if files.is_empty() {
                info!("No files matched the include patterns; running the bare command");
            }
            argv.extend(files.iter().map(|path| path.display().to_string()));
        }

        let workdir = options.get("dir").map_or_else(|| ctx.root.clone(), |dir| ctx.root.join(dir));
        let env = parse_env(options.get("env"))?;

        let retry_options = RetryOptions::from_options(options)?;
        retry::retry(
            retry_options,
            |err| matches!(err, TaskError::CommandFailed { .. }),
            || run_once(&argv, &workdir, &env, &command_line),
        )
    }
}

fn run_once(
    argv: &[String],
    workdir: &Path,
    env: &[(String, String)],
    command_line: &str,
) -> Result<TaskOutcome, TaskError> {
    info!("Running command: {}", argv.join(" "));
    let status = Command::new(&argv[0])
        .args(&argv[1..])
        .current_dir(workdir)
        .envs(env.iter().map(|(key, value)| (key, value)))
        .status()?;

    if status.success() {
        Ok(TaskOutcome::with_value("exit_code", "0"))
    } else {
        Err(TaskError::CommandFailed {
            command: command_line.to_string(),
            code: status.code().unwrap_or(-1),
        })
    }
}

fn compile_patterns(raw: &[String]) -> Result<Vec<Pattern>, TaskError> {
    raw.iter()
        .map(|pattern| {
            Pattern::new(pattern)
                .map_err(|e| TaskError::Options(format!("invalid glob pattern '{pattern}': {e}")))
        })
        .collect()
}

fn parse_env(raw: Option<&str>) -> Result<Vec<(String, String)>, TaskError> {
    let Some(raw) = raw else { return Ok(Vec::new()) };
    let mut pairs = Vec::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| TaskError::Options(format!("env entry '{entry}' is not KEY=VALUE")))?;
        if key.trim().is_empty() {
            return Err(TaskError::Options(format!("env entry '{entry}' has an empty key")));
        }
        pairs.push((key.trim().to_string(), value.to_string()));
    }
    Ok(pairs)
}

/// Walk the project for files matching `include` but not `exclude`.
///
/// Dot-directories are skipped and results are sorted so the argv
/// appended to the command is deterministic.
fn select_files(root: &Path, include: &[Pattern], exclude: &[Pattern]) -> Vec<PathBuf> {
    let mut matches = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).into_iter().filter_entry(|e| {
        // Don't filter the root directory itself
        if e.path() == root {
            return true;
        }
        !is_hidden(e)
    }) {
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if include.iter().any(|p| p.matches_path(relative))
            && !exclude.iter().any(|p| p.matches_path(relative))
        {
            matches.push(relative.to_path_buf());
        }
    }
    matches.sort();
    matches
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|s| s.starts_with('.'))
}
