//! Blocking GitHub API client with retry and rate-limit handling
//!
//! Transient server errors (502, 503, 504) and connection failures are
//! retried with exponential backoff before a request is reported as
//! failed. Only GET requests are retried; mutations go out once.

use std::thread;
use std::time::Duration;

use log::warn;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::GithubError;
use super::auth;

/// Production API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Maximum attempts for a GET request
pub const MAX_RETRIES: u32 = 5;

/// Base delay for exponential backoff, in seconds
pub const BACKOFF_FACTOR: f64 = 0.3;

/// Status codes worth retrying
pub const RETRY_STATUSES: [u16; 3] = [502, 503, 504];

/// Wait this long when a 429 carries no Retry-After header
pub const DEFAULT_RETRY_AFTER: u64 = 60;

const PER_PAGE: usize = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated user, from `GET /user`
#[derive(Debug, Clone, serde::Deserialize)]
pub struct GithubUser {
    /// Account login
    pub login: String,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
}

/// Blocking GitHub API client
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: Client,
    base_url: String,
}

/// A client scoped to one repository
#[derive(Debug, Clone)]
pub struct RepoHandle {
    pub(crate) client: GithubClient,
    owner: String,
    name: String,
}

impl RepoHandle {
    /// Repository owner
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn path(&self, tail: &str) -> String {
        format!("/repos/{}/{}{tail}", self.owner, self.name)
    }
}

impl GithubClient {
    /// Build a client for the production API
    pub fn new(token: &str) -> Result<Self, GithubError> {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Build a client against a different endpoint (GitHub Enterprise)
    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self, GithubError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        let mut auth_value = HeaderValue::from_str(&format!("token {token}"))
            .map_err(|_| GithubError::Auth("token contains invalid characters".to_string()))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        let http = Client::builder()
            .user_agent(concat!("nimbus/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()?;

        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string() })
    }

    /// Scope the client to one repository
    #[must_use]
    pub fn repo(&self, owner: &str, name: &str) -> RepoHandle {
        RepoHandle { client: self.clone(), owner: owner.to_string(), name: name.to_string() }
    }

    /// Check the configured credentials against `GET /user`.
    ///
    /// Warns when a classic token is missing the `repo` scope, which
    /// breaks private repository access in surprising ways later.
    pub fn validate(&self) -> Result<GithubUser, GithubError> {
        let response = self.get("/user", &[])?;
        let scopes = auth::oauth_scopes(response.headers());
        if !scopes.is_empty() && !scopes.contains("repo") {
            warn!("token is missing the 'repo' scope; private repository access will fail");
        }
        Ok(response.json()?)
    }

    pub(crate) fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Response, GithubError> {
        let url = format!("{}{path}", self.base_url);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.http.get(&url).query(query).send() {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if RETRY_STATUSES.contains(&status) && attempt < MAX_RETRIES {
                        warn!("got {status} from {url}, retrying");
                    } else {
                        return check_response(response);
                    }
                }
                Err(err) => {
                    let transient = err.is_timeout() || err.is_connect();
                    if transient && attempt < MAX_RETRIES {
                        warn!("request to {url} failed ({err}), retrying");
                    } else {
                        return Err(err.into());
                    }
                }
            }
            thread::sleep(backoff_delay(attempt));
        }
    }

    pub(crate) fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GithubError> {
        Ok(self.get(path, query)?.json()?)
    }

    pub(crate) fn get_paginated<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, GithubError> {
        let mut out = Vec::new();
        let mut page = 1usize;
        loop {
            let mut q: Vec<(&str, String)> = query.to_vec();
            q.push(("per_page", PER_PAGE.to_string()));
            q.push(("page", page.to_string()));
            let batch: Vec<T> = self.get_json(path, &q)?;
            let last_page = batch.len() < PER_PAGE;
            out.extend(batch);
            if last_page {
                return Ok(out);
            }
            page += 1;
        }
    }

    pub(crate) fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GithubError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.http.post(url).json(body).send()?;
        Ok(check_response(response)?.json()?)
    }

    pub(crate) fn patch_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GithubError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.http.patch(url).json(body).send()?;
        Ok(check_response(response)?.json()?)
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs_f64(BACKOFF_FACTOR * f64::from(2u32.pow(attempt.saturating_sub(1))))
}

fn check_response(response: Response) -> Result<Response, GithubError> {
    let status = response.status();
    if status.is_success() {
        let orgs = auth::sso_partial_orgs(response.headers());
        if !orgs.is_empty() {
            warn!("{} {orgs:?}", auth::SSO_WARNING);
        }
        return Ok(response);
    }
    let code = status.as_u16();
    let headers = response.headers().clone();
    let body = response.text().unwrap_or_default();
    Err(classify_failure(code, &headers, &body))
}

fn classify_failure(status: u16, headers: &HeaderMap, body: &str) -> GithubError {
    match status {
        401 => GithubError::Auth(auth::UNAUTHORIZED_WARNING.to_string()),
        403 if headers.contains_key(RETRY_AFTER) => {
            GithubError::RateLimited { retry_after: parse_retry_after(headers) }
        }
        403 => GithubError::Auth(auth::describe_forbidden(headers, &extract_message(status, body))),
        404 => GithubError::NotFound(extract_message(status, body)),
        429 => GithubError::RateLimited { retry_after: parse_retry_after(headers) },
        _ => GithubError::Api { status, message: extract_message(status, body) },
    }
}

fn parse_retry_after(headers: &HeaderMap) -> u64 {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

fn extract_message(status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {status}"))
}
