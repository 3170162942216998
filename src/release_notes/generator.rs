//! Release notes generation
//!
//! Aggregates the change notes of every pull request merged to the
//! default branch between two tags, renders them as markdown, and can
//! publish the result onto the tag's GitHub release.

use chrono::{DateTime, Utc};
use log::{debug, info};

use super::parser::default_parsers;
use crate::github::{GithubError, PullRequest, PullState, Release, RepoHandle};

/// What to generate notes for
#[derive(Debug, Clone)]
pub struct NotesOptions {
    /// Tag the notes describe
    pub current_tag: String,
    /// Lower bound tag; when unset the latest published release is used
    pub last_tag: Option<String>,
    /// Annotate change note lines with links to their pull requests
    pub link_pr: bool,
    /// Render headings for sections that collected nothing
    pub include_empty: bool,
    /// Branch merged work lands on
    pub base_branch: String,
    /// Tag prefix identifying production releases
    pub prefix_release: String,
}

/// Generates release notes for one tag
#[derive(Debug)]
pub struct ReleaseNotesGenerator {
    repo: RepoHandle,
    options: NotesOptions,
}

impl ReleaseNotesGenerator {
    /// Build a generator for one repository and tag window
    #[must_use]
    pub const fn new(repo: RepoHandle, options: NotesOptions) -> Self {
        Self { repo, options }
    }

    /// Generate the notes markdown.
    pub fn generate(&self) -> Result<String, GithubError> {
        let end = self.repo.tag_date(&self.options.current_tag)?;
        let last_tag = match &self.options.last_tag {
            Some(tag) => Some(tag.clone()),
            None => self.repo.latest_release_tag(&self.options.prefix_release)?,
        };
        let start = match &last_tag {
            Some(tag) => Some(self.repo.tag_date(tag)?),
            None => None,
        };
        if let Some(tag) = &last_tag {
            debug!("Generating notes for merges after {tag}");
        }

        let pulls = self.repo.pulls_with_base(&self.options.base_branch, None, PullState::Closed)?;
        let mut selected: Vec<&PullRequest> =
            pulls.iter().filter(|pr| in_window(pr.merged_at, start, end)).collect();
        selected.sort_by_key(|pr| pr.number);
        info!("Found {} merged pull request(s) in the release window", selected.len());

        let issues_url = format!(
            "https://github.com/{}/{}/issues",
            self.repo.owner(),
            self.repo.name()
        );
        let mut parsers = default_parsers(self.options.link_pr, &issues_url);
        for pull_request in &selected {
            for parser in &mut parsers {
                parser.parse(pull_request);
            }
        }

        let mut sections = Vec::new();
        for parser in &parsers {
            match parser.render() {
                Some(section) => sections.push(section),
                None if self.options.include_empty => {
                    sections.push(format!("# {}", parser.title()));
                }
                None => {}
            }
        }
        Ok(sections.join("\n\n"))
    }

    /// Publish notes onto the release for the current tag.
    pub fn publish(&self, notes: &str) -> Result<Release, GithubError> {
        let release = self.repo.release_for_tag(&self.options.current_tag)?;
        self.repo.update_release_body(release.id, notes)
    }
}

/// Whether a merge time falls inside the release window.
///
/// The window is exclusive of the previous tag's time and inclusive of
/// the current tag's, so a PR merged exactly when the previous release
/// was cut belongs to that release, not this one.
#[must_use]
pub fn in_window(
    merged_at: Option<DateTime<Utc>>,
    start: Option<DateTime<Utc>>,
    end: DateTime<Utc>,
) -> bool {
    match merged_at {
        None => false,
        Some(merged) => merged <= end && start.is_none_or(|s| merged > s),
    }
}
