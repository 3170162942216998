//! GitHub API integration
//!
//! A small blocking client plus repository-scoped operations:
//! - Pull request lookups, creation, body updates, labels
//! - Annotated tag and release resolution
//! - Gist creation for sharing run logs
//!
//! Transient failures are retried with backoff; rate limits and SSO
//! restrictions surface as typed errors with actionable messages.

pub mod auth;
pub mod client;
mod error;
pub mod gists;
pub mod pulls;
pub mod releases;
pub mod tags;

pub use client::{GithubClient, GithubUser, RepoHandle};
pub use error::GithubError;
pub use gists::Gist;
pub use pulls::{BranchTip, Label, PullRequest, PullState};
pub use releases::Release;
pub use tags::{AnnotatedTag, GitRef, GitObject, Tagger};
