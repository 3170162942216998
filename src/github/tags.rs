//! Tag lookups
//!
//! Annotated tags take two requests: the ref gives the tag object's
//! sha, then the tag object carries the message and tagger. Lightweight
//! tags have no tag object, so release tooling rejects them here.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::GithubError;
use super::client::RepoHandle;

/// A git reference, from `GET /git/ref/...`
#[derive(Debug, Clone, Deserialize)]
pub struct GitRef {
    /// Fully qualified name, like `refs/tags/release/1.2`
    #[serde(rename = "ref")]
    pub name: String,
    /// The object the ref points at
    pub object: GitObject,
}

/// Target of a git reference
#[derive(Debug, Clone, Deserialize)]
pub struct GitObject {
    /// Object sha
    pub sha: String,
    /// `tag` for annotated tags, `commit` for lightweight ones
    #[serde(rename = "type")]
    pub kind: String,
}

/// An annotated tag object
#[derive(Debug, Clone, Deserialize)]
pub struct AnnotatedTag {
    /// Tag name
    pub tag: String,
    /// Sha of the tag object itself
    pub sha: String,
    /// Tag message
    pub message: String,
    /// Who created the tag, and when
    #[serde(default)]
    pub tagger: Option<Tagger>,
}

/// Tag author metadata
#[derive(Debug, Clone, Deserialize)]
pub struct Tagger {
    /// Author name
    #[serde(default)]
    pub name: Option<String>,
    /// Author email
    #[serde(default)]
    pub email: Option<String>,
    /// When the tag was created
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl RepoHandle {
    /// Resolve a tag name to its git reference.
    pub fn tag_ref(&self, tag_name: &str) -> Result<GitRef, GithubError> {
        self.client.get_json(&self.path(&format!("/git/ref/tags/{tag_name}")), &[]).map_err(|err| {
            match err {
                GithubError::NotFound(_) => {
                    GithubError::Lookup(format!("could not find reference for tag '{tag_name}'"))
                }
                other => other,
            }
        })
    }

    /// Fetch the annotated tag object behind a tag name.
    pub fn annotated_tag(&self, tag_name: &str) -> Result<AnnotatedTag, GithubError> {
        let git_ref = self.tag_ref(tag_name)?;
        if git_ref.object.kind != "tag" {
            return Err(GithubError::Lookup(format!(
                "'{tag_name}' is a lightweight tag; an annotated tag is required"
            )));
        }
        self.client
            .get_json(&self.path(&format!("/git/tags/{}", git_ref.object.sha)), &[])
            .map_err(|err| match err {
                GithubError::NotFound(_) => {
                    GithubError::Lookup(format!("could not find annotated tag '{tag_name}'"))
                }
                other => other,
            })
    }

    /// Read the `version_id` recorded in a tag message.
    pub fn version_id_from_tag(&self, tag_name: &str) -> Result<String, GithubError> {
        let tag = self.annotated_tag(tag_name)?;
        parse_version_id(&tag.message).ok_or_else(|| {
            GithubError::Lookup(format!("tag '{tag_name}' does not carry a valid version_id"))
        })
    }

    /// When an annotated tag was created.
    pub fn tag_date(&self, tag_name: &str) -> Result<DateTime<Utc>, GithubError> {
        let tag = self.annotated_tag(tag_name)?;
        tag.tagger
            .and_then(|t| t.date)
            .ok_or_else(|| GithubError::Lookup(format!("tag '{tag_name}' has no tagger date")))
    }
}

/// Extract a `version_id: <version>` line from a tag message.
///
/// The version must be dotted digits (`1.2` or `1.2.3`); anything else
/// is treated as absent.
#[must_use]
pub fn parse_version_id(message: &str) -> Option<String> {
    message
        .lines()
        .find_map(|line| line.trim().strip_prefix("version_id:"))
        .map(str::trim)
        .filter(|v| is_dotted_version(v))
        .map(str::to_string)
}

fn is_dotted_version(value: &str) -> bool {
    let parts: Vec<&str> = value.split('.').collect();
    parts.len() >= 2
        && parts.iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}
