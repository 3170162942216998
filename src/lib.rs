//! nimbus - Portable release automation: tasks, flows, and GitHub
//! release notes
//!
//! This library provides the building blocks behind the `nimbus` CLI:
//! project and credential configuration, a task framework with a small
//! builtin registry, a dependency-ordered flow engine, a retrying
//! GitHub client, and release notes generation from merged pull
//! requests.

// Deny all clippy warnings in this crate
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cargo_common_metadata
)]

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod flows;
pub mod git;
pub mod github;
pub mod output;
pub mod paths;
pub mod release_notes;
pub mod tasks;
