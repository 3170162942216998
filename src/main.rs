//! nimbus - Portable release automation: tasks, flows, and GitHub
//! release notes
//!
//! Everything lives in the library crate; this binary parses the
//! command line and reports errors.

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

/// Main entry point for the nimbus CLI
fn main() {
    if let Err(err) = nimbus::cli::run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
