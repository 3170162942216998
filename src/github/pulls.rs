//! Pull request operations
//!
//! Lookups by head branch, base branch, and commit, plus creation,
//! body updates, and label management. Labels ride on the issues
//! endpoint because every pull request is also an issue.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::GithubError;
use super::client::RepoHandle;

/// A pull request
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Title
    pub title: String,
    /// Body text (the change note)
    #[serde(default)]
    pub body: Option<String>,
    /// `open` or `closed`
    pub state: String,
    /// When the PR was merged; unset means closed without merging
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    /// Web URL
    pub html_url: String,
    /// Source branch
    pub head: BranchTip,
    /// Target branch
    pub base: BranchTip,
}

/// One side of a pull request
#[derive(Debug, Clone, Deserialize)]
pub struct BranchTip {
    /// Branch name
    #[serde(rename = "ref")]
    pub branch: String,
    /// Commit sha at the tip
    #[serde(default)]
    pub sha: Option<String>,
}

/// An issue or pull request label
#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    /// Label name
    pub name: String,
}

/// State filter for pull request listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullState {
    /// Only open PRs
    Open,
    /// Only closed PRs (merged or not)
    Closed,
    /// Everything
    All,
}

impl PullState {
    /// Query-string value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all",
        }
    }
}

impl PullRequest {
    /// Whether this PR was merged (closed PRs may simply be rejected).
    #[must_use]
    pub const fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }

    /// Markdown link in the form `Title [[PR123](url)]`.
    #[must_use]
    pub fn markdown_link(&self) -> String {
        format!("{} [[PR{}]({})]", self.title, self.number, self.html_url)
    }
}

impl RepoHandle {
    /// All PRs whose head is the given branch of this repository.
    pub fn pulls_by_head(&self, branch: &str) -> Result<Vec<PullRequest>, GithubError> {
        let head = format!("{}:{branch}", self.owner());
        self.client.get_paginated(
            &self.path("/pulls"),
            &[("state", PullState::All.as_str().to_string()), ("head", head)],
        )
    }

    /// PRs targeting a base branch, optionally narrowed to one head.
    pub fn pulls_with_base(
        &self,
        base: &str,
        head: Option<&str>,
        state: PullState,
    ) -> Result<Vec<PullRequest>, GithubError> {
        let mut query = vec![("state", state.as_str().to_string()), ("base", base.to_string())];
        if let Some(branch) = head {
            query.push(("head", format!("{}:{branch}", self.owner())));
        }
        self.client.get_paginated(&self.path("/pulls"), &query)
    }

    /// PRs associated with a commit.
    pub fn pulls_by_commit(&self, sha: &str) -> Result<Vec<PullRequest>, GithubError> {
        self.client.get_paginated(&self.path(&format!("/commits/{sha}/pulls")), &[])
    }

    /// Open a pull request.
    pub fn create_pull(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest, GithubError> {
        self.client.post_json(
            &self.path("/pulls"),
            &json!({ "title": title, "head": head, "base": base, "body": body }),
        )
    }

    /// Replace a pull request's body.
    pub fn update_pull_body(&self, number: u64, body: &str) -> Result<PullRequest, GithubError> {
        self.client.patch_json(&self.path(&format!("/pulls/{number}")), &json!({ "body": body }))
    }

    /// Labels currently on a pull request.
    pub fn pull_labels(&self, number: u64) -> Result<Vec<Label>, GithubError> {
        self.client.get_paginated(&self.path(&format!("/issues/{number}/labels")), &[])
    }

    /// Whether a label is present on a pull request.
    pub fn is_label_on_pull(&self, number: u64, label: &str) -> Result<bool, GithubError> {
        Ok(self.pull_labels(number)?.iter().any(|l| l.name == label))
    }

    /// Add labels to a pull request.
    pub fn add_labels_to_pull(&self, number: u64, labels: &[&str]) -> Result<(), GithubError> {
        let _: Vec<Label> = self.client.post_json(
            &self.path(&format!("/issues/{number}/labels")),
            &json!({ "labels": labels }),
        )?;
        Ok(())
    }
}
