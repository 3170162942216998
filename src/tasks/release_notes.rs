//! Release notes task
//!
//! Builds release notes for a tag from the pull requests merged since
//! the previous release, and optionally publishes them onto the GitHub
//! release body.

use log::info;

use crate::github::GithubError;
use crate::release_notes::{NotesOptions, ReleaseNotesGenerator};

use super::options::TaskOptions;
use super::retry;
use super::{Task, TaskContext, TaskError, TaskOutcome};

const DEFAULT_WAIT_ATTEMPTS: u64 = 12;

/// Generates release notes from merged pull requests
#[derive(Debug, Clone, Copy, Default)]
pub struct GithubReleaseNotesTask;

impl Task for GithubReleaseNotesTask {
    fn required_options(&self) -> &'static [&'static str] {
        &["tag"]
    }

    fn run(&mut self, ctx: &TaskContext, options: &TaskOptions) -> Result<TaskOutcome, TaskError> {
        let tag = options.require("tag")?.to_string();
        let repo = ctx.github_repo()?;

        if options.get_bool("wait_for_release")? {
            let attempts =
                options.get_u64("wait_attempts")?.unwrap_or(DEFAULT_WAIT_ATTEMPTS);
            info!("Waiting for the release of tag {tag} to appear");
            retry::poll(attempts, || match repo.release_for_tag(&tag) {
                Ok(release) => Ok(Some(release)),
                Err(GithubError::NotFound(_)) => Ok(None),
                Err(err) => Err(err.into()),
            })?;
        }

        let git = &ctx.project.project.git;
        let generator = ReleaseNotesGenerator::new(
            repo,
            NotesOptions {
                current_tag: tag,
                last_tag: options.get("last_tag").map(str::to_string),
                link_pr: options.get_bool("link_pr")?,
                include_empty: options.get_bool("include_empty")?,
                base_branch: git.default_branch.clone(),
                prefix_release: git.prefix_release.clone(),
            },
        );

        let notes = generator.generate()?;
        info!("\n{notes}");

        let mut outcome = TaskOutcome::with_value("release_notes", &notes);
        if options.get_bool("publish")? {
            let release = generator.publish(&notes)?;
            info!("Published release notes to {}", release.html_url);
            outcome.return_values.insert("release_url".to_string(), release.html_url);
        }
        Ok(outcome)
    }
}
