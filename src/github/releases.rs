//! Release operations

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::GithubError;
use super::client::RepoHandle;

/// A GitHub release
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Release id, needed for updates
    pub id: u64,
    /// Tag the release was created from
    pub tag_name: String,
    /// Release title
    #[serde(default)]
    pub name: Option<String>,
    /// Release body (the published notes)
    #[serde(default)]
    pub body: Option<String>,
    /// Web URL
    pub html_url: String,
    /// Whether the release is an unpublished draft
    #[serde(default)]
    pub draft: bool,
    /// Whether the release is marked as a prerelease
    #[serde(default)]
    pub prerelease: bool,
    /// When the release was created
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl RepoHandle {
    /// Fetch the release attached to a tag.
    pub fn release_for_tag(&self, tag: &str) -> Result<Release, GithubError> {
        self.client.get_json(&self.path(&format!("/releases/tags/{tag}")), &[]).map_err(|err| {
            match err {
                GithubError::NotFound(_) => {
                    GithubError::NotFound(format!("no release for tag '{tag}'"))
                }
                other => other,
            }
        })
    }

    /// All releases, newest first.
    pub fn releases(&self) -> Result<Vec<Release>, GithubError> {
        self.client.get_paginated(&self.path("/releases"), &[])
    }

    /// Tag of the most recent published release matching a tag prefix.
    ///
    /// Drafts and prereleases are skipped, so this finds the previous
    /// production release even while a beta sits on top.
    pub fn latest_release_tag(&self, prefix: &str) -> Result<Option<String>, GithubError> {
        Ok(find_latest_tag(&self.releases()?, prefix))
    }

    /// Replace a release's body.
    pub fn update_release_body(&self, id: u64, body: &str) -> Result<Release, GithubError> {
        self.client.patch_json(&self.path(&format!("/releases/{id}")), &json!({ "body": body }))
    }
}

/// First published release tag matching a prefix, in listing order.
#[must_use]
pub fn find_latest_tag(releases: &[Release], prefix: &str) -> Option<String> {
    releases
        .iter()
        .find(|r| !r.draft && !r.prerelease && r.tag_name.starts_with(prefix))
        .map(|r| r.tag_name.clone())
}
