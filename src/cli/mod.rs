//! Command-line interface
//!
//! `app` holds the clap definitions and the entry point; `commands`
//! holds one implementation file per subcommand.

mod app;
mod commands;

// Re-export main entry point
pub use app::run;
