//! Release notes from pull request change notes
//!
//! Pull request bodies carry structured change notes (sections like
//! `# Critical Changes`, `# Changes`, `# Issues Closed`). This module
//! parses those sections, aggregates them across the pull requests in
//! a release window, and maintains parent feature branch PRs whose
//! bodies summarize their children.

pub mod generator;
pub mod parent_pr;
pub mod parser;

pub use generator::{NotesOptions, ReleaseNotesGenerator};
pub use parent_pr::{ParentPrAggregator, UNAGGREGATED_HEADER};
pub use parser::{ChangeNoteParser, IssuesParser, SectionParser};
