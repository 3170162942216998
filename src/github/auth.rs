//! Token scope and SSO header inspection
//!
//! GitHub reports token capabilities in response headers:
//! - `X-OAuth-Scopes`: scopes granted to a classic token
//! - `X-GitHub-SSO`: either `required; url=...` when the token must be
//!   authorized for SSO, or `partial-results; organizations=a,b` when
//!   some organizations were silently excluded from the response.

use std::collections::HashSet;

use reqwest::header::HeaderMap;

/// Warning for credentials GitHub rejects outright
pub const UNAUTHORIZED_WARNING: &str =
    "GitHub rejected the configured credentials. The token may be expired or revoked; \
     update it with 'nimbus service set github --token <token>'.";

/// Warning prefix for responses missing SSO-protected organizations
pub const SSO_WARNING: &str = "Results may be incomplete. You have not granted your Personal \
     Access token access to the following organizations:";

const SSO_HEADER: &str = "x-github-sso";
const SCOPES_HEADER: &str = "x-oauth-scopes";

/// Scopes granted to the token that made the request.
#[must_use]
pub fn oauth_scopes(headers: &HeaderMap) -> HashSet<String> {
    headers
        .get(SCOPES_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            v.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
        })
        .unwrap_or_default()
}

/// URL the user must visit when the token requires SSO authorization.
#[must_use]
pub fn sso_required_url(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(SSO_HEADER)?.to_str().ok()?;
    let rest = value.strip_prefix("required")?;
    rest.split_once("url=").map(|(_, url)| url.trim().to_string())
}

/// Organizations excluded from a partial response.
#[must_use]
pub fn sso_partial_orgs(headers: &HeaderMap) -> Vec<String> {
    headers
        .get(SSO_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| v.starts_with("partial-results"))
        .and_then(|v| v.split_once("organizations="))
        .map(|(_, orgs)| {
            orgs.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
        })
        .unwrap_or_default()
}

/// Build the message for a 403 response, folding in SSO details.
#[must_use]
pub fn describe_forbidden(headers: &HeaderMap, message: &str) -> String {
    if let Some(url) = sso_required_url(headers) {
        return format!(
            "this token must be authorized for SSO before it can be used; visit {url} to continue"
        );
    }
    let orgs = sso_partial_orgs(headers);
    if orgs.is_empty() {
        message.to_string()
    } else {
        format!("{message}\n{SSO_WARNING} {orgs:?}")
    }
}
