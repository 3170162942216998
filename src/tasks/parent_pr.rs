//! Parent pull request notes task
//!
//! Long-lived feature branches collect child branches named
//! `feature/parent__child`. When a child merges into its parent, this
//! task updates the parent's pull request: if the parent PR carries the
//! build-notes label its body is rebuilt from every merged child;
//! otherwise the child is recorded under an "Unaggregated Pull
//! Requests" heading for a later rebuild.

use std::sync::OnceLock;

use log::{info, warn};
use regex::Regex;

use crate::git;
use crate::github::{PullRequest, PullState, RepoHandle};
use crate::release_notes::ParentPrAggregator;

use super::options::TaskOptions;
use super::{Task, TaskContext, TaskError, TaskOutcome};

const GENERATED_PR_TITLE: &str = "Auto-Generated Pull Request";

/// Maintains aggregated release notes on a parent branch pull request
#[derive(Debug, Clone, Copy, Default)]
pub struct ParentPrNotesTask;

impl Task for ParentPrNotesTask {
    fn required_options(&self) -> &'static [&'static str] {
        &["branch_name", "build_notes_label"]
    }

    fn run(&mut self, ctx: &TaskContext, options: &TaskOptions) -> Result<TaskOutcome, TaskError> {
        let branch_name = options.require("branch_name")?.to_string();
        let label = options.require("build_notes_label")?.to_string();
        let force = options.get_bool("force")?;

        let repo = ctx.github_repo()?;
        let git_settings = &ctx.project.project.git;

        let child_branch = if force {
            None
        } else {
            if git::head_parent_count(&ctx.root) != Some(2) {
                info!("HEAD is not a merge commit; nothing to aggregate");
                return Ok(TaskOutcome::default());
            }
            if !is_parent_branch(
                &branch_name,
                &git_settings.prefix_feature,
                &git_settings.parent_separator,
            ) {
                info!("Branch {branch_name} is not a parent feature branch; nothing to do");
                return Ok(TaskOutcome::default());
            }
            match find_child_branch(&repo, &ctx.root, &branch_name)? {
                Some(child) => Some(child),
                None => {
                    warn!("Could not determine the merged child branch; skipping");
                    return Ok(TaskOutcome::default());
                }
            }
        };

        let parent = find_or_create_parent_pr(
            &repo,
            &branch_name,
            &git_settings.default_branch,
        )?;
        let aggregator = ParentPrAggregator::new(repo.clone());

        let aggregated = if force || repo.is_label_on_pull(parent.number, &label)? {
            info!("Rebuilding notes on parent PR #{}", parent.number);
            aggregator.aggregate_child_notes(&parent)?.is_some()
        } else {
            let child = child_branch.as_deref().unwrap_or(&branch_name);
            info!(
                "Parent PR #{} does not carry the '{label}' label; recording {child} as unaggregated",
                parent.number
            );
            aggregator.record_unaggregated(&parent, child)?;
            false
        };

        let mut outcome = TaskOutcome::with_value("parent_pr", &parent.number.to_string());
        outcome
            .return_values
            .insert("aggregated".to_string(), aggregated.to_string());
        Ok(outcome)
    }
}

/// Locate the open PR from `branch` into `base`, creating one if none
/// exists yet.
fn find_or_create_parent_pr(
    repo: &RepoHandle,
    branch: &str,
    base: &str,
) -> Result<PullRequest, TaskError> {
    let existing = repo.pulls_with_base(base, Some(branch), PullState::Open)?;
    if let Some(pull) = existing.into_iter().next() {
        return Ok(pull);
    }
    info!("Opening a pull request for {branch}");
    Ok(repo.create_pull(branch, base, GENERATED_PR_TITLE, "")?)
}

/// Work out which child branch the HEAD merge commit brought in.
///
/// Prefers the merged pull request recorded against the commit; falls
/// back to parsing the default merge commit message.
fn find_child_branch(
    repo: &RepoHandle,
    root: &std::path::Path,
    parent_branch: &str,
) -> Result<Option<String>, TaskError> {
    if let Some(sha) = git::head_sha(root) {
        let merged = repo
            .pulls_by_commit(&sha)?
            .into_iter()
            .find(|pull| pull.is_merged() && pull.base.branch == parent_branch);
        if let Some(pull) = merged {
            return Ok(Some(pull.head.branch));
        }
    }
    Ok(git::head_message(root).as_deref().and_then(child_branch_from_message))
}

/// A parent branch carries the feature prefix but no child separator.
fn is_parent_branch(branch: &str, prefix: &str, separator: &str) -> bool {
    branch.strip_prefix(prefix).is_some_and(|rest| !rest.contains(separator))
}

fn merge_message_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Merge pull request #\d+ from [^/\s]+/(\S+)").expect("static pattern")
    })
}

/// Pull the merged head branch out of a default merge commit message.
fn child_branch_from_message(message: &str) -> Option<String> {
    merge_message_re()
        .captures(message)
        .map(|captures| captures[1].to_string())
}
