//! Parent pull request note aggregation
//!
//! Parent feature branches collect work from child branches
//! (`feature/big-thing` and `feature/big-thing__part-one`). When a
//! child merges into its parent, the parent PR's body is either
//! rebuilt from all merged children's change notes, or the child is
//! recorded under an "Unaggregated Pull Requests" section for later.

use log::{info, warn};

use super::parser::default_parsers;
use crate::github::{GithubError, PullRequest, PullState, RepoHandle};

/// Section heading that accumulates children not yet aggregated
pub const UNAGGREGATED_HEADER: &str = "# Unaggregated Pull Requests";

/// Maintains a parent PR's body from its children's change notes
#[derive(Debug)]
pub struct ParentPrAggregator {
    repo: RepoHandle,
}

impl ParentPrAggregator {
    /// Build an aggregator for one repository
    #[must_use]
    pub const fn new(repo: RepoHandle) -> Self {
        Self { repo }
    }

    /// Rebuild the parent PR body from every merged child's change note.
    ///
    /// Returns the new body, or `None` when no children have merged yet.
    pub fn aggregate_child_notes(
        &self,
        parent: &PullRequest,
    ) -> Result<Option<String>, GithubError> {
        let children = self.repo.pulls_with_base(&parent.head.branch, None, PullState::Closed)?;
        let merged: Vec<&PullRequest> = children.iter().filter(|pr| pr.is_merged()).collect();
        if merged.is_empty() {
            info!("No merged child pull requests for {} yet", parent.head.branch);
            return Ok(None);
        }

        let issues_url =
            format!("https://github.com/{}/{}/issues", self.repo.owner(), self.repo.name());
        let mut parsers = default_parsers(true, &issues_url);
        for child in &merged {
            for parser in &mut parsers {
                parser.parse(child);
            }
        }
        let body: Vec<String> = parsers.iter().filter_map(|p| p.render()).collect();
        let body = body.join("\n\n");

        self.repo.update_pull_body(parent.number, &body)?;
        info!("Aggregated {} child change note(s) into PR #{}", merged.len(), parent.number);
        Ok(Some(body))
    }

    /// Record a just-merged child under the unaggregated section of the
    /// parent PR body. Returns false when the child was already listed
    /// or could not be found.
    pub fn record_unaggregated(
        &self,
        parent: &PullRequest,
        child_branch: &str,
    ) -> Result<bool, GithubError> {
        let Some(child) = self.repo.pulls_by_head(child_branch)?.into_iter().find(PullRequest::is_merged)
        else {
            warn!("No merged pull request found for branch {child_branch}");
            return Ok(false);
        };

        let body = parent.body.clone().unwrap_or_default();
        match append_unaggregated_link(&body, &child.markdown_link()) {
            Some(updated) => {
                self.repo.update_pull_body(parent.number, &updated)?;
                info!("Recorded PR #{} on parent PR #{}", child.number, parent.number);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Add a child PR link under the unaggregated section of a body.
///
/// Returns `None` when the link is already present.
#[must_use]
pub fn append_unaggregated_link(body: &str, link: &str) -> Option<String> {
    if body.contains(link) {
        return None;
    }
    let entry = format!("* {link}");
    if body.contains(UNAGGREGATED_HEADER) {
        Some(format!("{}\n{entry}", body.trim_end()))
    } else if body.trim().is_empty() {
        Some(format!("{UNAGGREGATED_HEADER}\n\n{entry}"))
    } else {
        Some(format!("{}\n\n{UNAGGREGATED_HEADER}\n\n{entry}", body.trim_end()))
    }
}
