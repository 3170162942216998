//! Gist creation
//!
//! Used to share run logs. Gists are always created secret; the URL is
//! still shareable with anyone who has it.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Value, json};

use super::GithubError;
use super::client::GithubClient;

/// A created gist
#[derive(Debug, Clone, Deserialize)]
pub struct Gist {
    /// Gist id
    pub id: String,
    /// Web URL
    pub html_url: String,
}

impl GithubClient {
    /// Create a secret gist from a set of named files.
    pub fn create_gist(
        &self,
        description: &str,
        files: &BTreeMap<String, String>,
    ) -> Result<Gist, GithubError> {
        self.post_json("/gists", &gist_payload(description, files))
    }
}

fn gist_payload(description: &str, files: &BTreeMap<String, String>) -> Value {
    let files: serde_json::Map<String, Value> =
        files.iter().map(|(name, content)| (name.clone(), json!({ "content": content }))).collect();
    json!({ "description": description, "public": false, "files": files })
}
