//! CLI definitions and entry point

use clap::{Parser, Subcommand};

use super::commands;
use crate::output::OutputMode;

/// nimbus - Portable release automation
#[derive(Parser, Debug)]
#[command(
    name = "nimbus",
    version,
    about = "Portable release automation: tasks, flows, and GitHub release notes",
    long_about = "Define tasks and flows in nimbus.toml and run them anywhere.\n\n\
                  Tasks wrap commands and GitHub operations with typed options.\n\
                  Flows compose tasks into a dependency graph, runnable locally\n\
                  or from the installed pre-commit hook."
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format (machine-readable)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize nimbus in the current repository
    Init {
        /// Force re-initialization
        #[arg(short, long)]
        force: bool,
    },

    /// List, inspect, and run tasks
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// List, inspect, run, and freeze flows
    Flow {
        #[command(subcommand)]
        action: FlowAction,
    },

    /// Generate release notes for a tag
    ReleaseNotes {
        /// Tag to generate notes for (e.g. release/1.2.0)
        tag: String,

        /// Lower bound tag; defaults to the latest published release
        #[arg(long)]
        last_tag: Option<String>,

        /// Append a pull request link to each change note line
        #[arg(long)]
        link_pr: bool,

        /// Publish the notes onto the GitHub release body
        #[arg(long)]
        publish: bool,

        /// Render headings for sections that collected nothing
        #[arg(long)]
        include_empty: bool,
    },

    /// Manage service credentials
    Service {
        #[command(subcommand)]
        action: ServiceAction,
    },

    /// Run a configured git hook (used by .git/hooks scripts)
    #[command(hide = true)]
    Hook {
        #[command(subcommand)]
        action: HookAction,
    },

    /// Show version
    Version,
}

/// Actions under `nimbus task`
#[derive(Subcommand, Debug)]
pub enum TaskAction {
    /// List available tasks (configured plus builtin)
    List,

    /// Show a task's class, description, and options
    Info {
        /// Task name
        name: String,
    },

    /// Run a task
    Run {
        /// Task name
        name: String,

        /// Option override as key=value (repeatable)
        #[arg(short = 'o', long = "option")]
        options: Vec<String>,
    },
}

/// Actions under `nimbus flow`
#[derive(Subcommand, Debug)]
pub enum FlowAction {
    /// List defined flows
    List,

    /// Show a flow's steps in execution order
    Info {
        /// Flow name
        name: String,
    },

    /// Run a flow
    Run {
        /// Flow name
        name: String,

        /// Upload the run log as a private gist
        #[arg(long)]
        gist: bool,
    },

    /// Print the flow as frozen JSON steps
    Freeze {
        /// Flow name
        name: String,
    },
}

/// Actions under `nimbus service`
#[derive(Subcommand, Debug)]
pub enum ServiceAction {
    /// List known services
    List,

    /// Show a service's configuration (tokens masked)
    Info {
        /// Service name
        name: String,
    },

    /// Store credentials for a service
    Set {
        /// Service name
        name: String,

        /// Account username
        #[arg(long)]
        username: Option<String>,

        /// Access token
        #[arg(long)]
        token: Option<String>,

        /// Account email
        #[arg(long)]
        email: Option<String>,

        /// Verify the credentials against the service before saving
        #[arg(long)]
        validate: bool,
    },
}

/// Actions under the hidden `nimbus hook`
#[derive(Subcommand, Debug)]
pub enum HookAction {
    /// Run the flow configured for a hook kind
    Run {
        /// Hook kind (currently only pre-commit)
        kind: String,
    },
}

/// Run the CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    match cli.command {
        Some(Command::Init { force }) => commands::init(force, output_mode),
        Some(Command::Task { action }) => commands::task_cmd(action, output_mode),
        Some(Command::Flow { action }) => commands::flow_cmd(action, output_mode),
        Some(Command::ReleaseNotes { tag, last_tag, link_pr, publish, include_empty }) => {
            commands::release_notes(
                &tag,
                last_tag.as_deref(),
                link_pr,
                publish,
                include_empty,
                output_mode,
            )
        },
        Some(Command::Service { action }) => commands::service_cmd(action, output_mode),
        Some(Command::Hook { action }) => match action {
            HookAction::Run { kind } => commands::hook_run(&kind, output_mode),
        },
        Some(Command::Version) => {
            if output_mode == OutputMode::Json {
                println!(
                    "{}",
                    serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION")
                    })
                );
            } else {
                println!("nimbus v{}", env!("CARGO_PKG_VERSION"));
            }
            Ok(())
        },
        None => {
            if output_mode == OutputMode::Json {
                println!(
                    "{}",
                    serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION"),
                        "hint": "Use --help for usage"
                    })
                );
            } else {
                println!("nimbus v{}", env!("CARGO_PKG_VERSION"));
                println!("\nRun 'nimbus --help' for usage");
                println!("Run 'nimbus init' to get started");
            }
            Ok(())
        },
    }
}
