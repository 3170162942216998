//! Output formatting for human and JSON modes
//!
//! This module provides structured output that can be rendered either as
//! human-readable text or machine-parseable JSON.

use std::collections::BTreeMap;

use colored::Colorize;
use serde::Serialize;

/// Output mode for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output (machine-readable)
    Json,
}

/// Result of a task list operation
#[derive(Debug, Serialize)]
pub struct TaskListResult {
    /// Tasks available in this project (configured plus builtin)
    pub tasks: Vec<TaskRow>,
}

/// One entry in a task listing
#[derive(Debug, Serialize)]
pub struct TaskRow {
    /// Task name (the key used with `task run`)
    pub name: String,
    /// Class implementing the task
    pub class: String,
    /// Short description, if one was configured
    pub description: Option<String>,
}

/// Result of a task info operation
#[derive(Debug, Serialize)]
pub struct TaskInfoResult {
    /// Task name
    pub name: String,
    /// Class implementing the task
    pub class: String,
    /// Short description, if one was configured
    pub description: Option<String>,
    /// Options that must be provided before the task can run
    pub required_options: Vec<String>,
    /// Options configured in `nimbus.toml`
    pub options: BTreeMap<String, String>,
}

/// Result of a task run operation
#[derive(Debug, Serialize)]
pub struct TaskRunResult {
    /// Task name
    pub task: String,
    /// Whether the task completed successfully
    pub passed: bool,
    /// Values the task returned
    pub return_values: BTreeMap<String, String>,
}

/// Result of a flow list operation
#[derive(Debug, Serialize)]
pub struct FlowListResult {
    /// Flows defined in this project
    pub flows: Vec<FlowRow>,
}

/// One entry in a flow listing
#[derive(Debug, Serialize)]
pub struct FlowRow {
    /// Flow name
    pub name: String,
    /// Short description, if one was configured
    pub description: Option<String>,
    /// Number of steps in the flow
    pub steps: usize,
}

/// Result of a flow info operation
#[derive(Debug, Serialize)]
pub struct FlowInfoResult {
    /// Flow name
    pub name: String,
    /// Short description, if one was configured
    pub description: Option<String>,
    /// Steps in execution order
    pub steps: Vec<FlowStepRow>,
}

/// One step in a flow info listing
#[derive(Debug, Serialize)]
pub struct FlowStepRow {
    /// Step id
    pub id: String,
    /// Task the step runs
    pub task: String,
    /// Steps that must succeed first
    pub needs: Vec<String>,
}

/// Result of a flow run operation
#[derive(Debug, Serialize)]
pub struct FlowRunResult {
    /// Flow name
    pub flow: String,
    /// Whether every step succeeded
    pub passed: bool,
    /// Per-step outcomes in execution order
    pub steps: Vec<FlowStepOutcome>,
    /// URL of the uploaded run log, when `--gist` was used
    pub gist_url: Option<String>,
}

/// Outcome of a single flow step
#[derive(Debug, Serialize)]
pub struct FlowStepOutcome {
    /// Step id
    pub id: String,
    /// Task the step ran
    pub task: String,
    /// One of `success`, `failed`, `skipped`
    pub status: String,
    /// Error message for failed steps
    pub error: Option<String>,
}

/// Result of a release notes generation
#[derive(Debug, Serialize)]
pub struct ReleaseNotesResult {
    /// Tag the notes were generated for
    pub tag: String,
    /// The generated markdown
    pub notes: String,
    /// Whether the notes were published to the GitHub release
    pub published: bool,
    /// URL of the updated release, when published
    pub release_url: Option<String>,
}

/// Result of a service list operation
#[derive(Debug, Serialize)]
pub struct ServiceListResult {
    /// Known services and their configuration state
    pub services: Vec<ServiceRow>,
}

/// One entry in a service listing
#[derive(Debug, Serialize)]
pub struct ServiceRow {
    /// Service name
    pub name: String,
    /// Whether credentials are configured
    pub configured: bool,
    /// Names of the attributes that are set
    pub attributes: Vec<String>,
}

/// Result of a service info operation
#[derive(Debug, Serialize)]
pub struct ServiceInfoResult {
    /// Service name
    pub name: String,
    /// Whether credentials are configured
    pub configured: bool,
    /// Configured username
    pub username: Option<String>,
    /// Configured email
    pub email: Option<String>,
    /// Masked token (never the full value)
    pub token: Option<String>,
    /// Where the token comes from: `environment` or `global config`
    pub token_source: Option<String>,
}

/// Generic operation result for simple commands
#[derive(Debug, Serialize)]
pub struct OperationResult {
    /// Whether the operation succeeded
    pub success: bool,
    /// Human-readable message
    pub message: String,
}

/// Mask a token for display, keeping only the last four characters.
#[must_use]
pub fn mask_token(token: &str) -> String {
    if token.len() <= 4 {
        "****".to_string()
    } else {
        format!("****{}", &token[token.len() - 4..])
    }
}

impl TaskListResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => self.render_json(),
        }
    }

    fn render_human(&self) {
        if self.tasks.is_empty() {
            println!("No tasks defined. Add a [tasks.<name>] section to nimbus.toml.");
            return;
        }
        for task in &self.tasks {
            match &task.description {
                Some(d) => println!("{}  ({})\n    {}", task.name.bold(), task.class, d),
                None => println!("{}  ({})", task.name.bold(), task.class),
            }
        }
    }

    fn render_json(&self) {
        println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
    }
}

impl TaskInfoResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => self.render_json(),
        }
    }

    fn render_human(&self) {
        println!("{}", self.name.bold());
        println!("  class: {}", self.class);
        if let Some(d) = &self.description {
            println!("  description: {d}");
        }
        if !self.required_options.is_empty() {
            println!("  required options: {}", self.required_options.join(", "));
        }
        if !self.options.is_empty() {
            println!("  options:");
            for (key, value) in &self.options {
                println!("    {key} = {value}");
            }
        }
    }

    fn render_json(&self) {
        println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
    }
}

impl TaskRunResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => self.render_json(),
        }
    }

    fn render_human(&self) {
        if self.passed {
            println!("Task {} {}", self.task.bold(), "succeeded".green());
        } else {
            println!("Task {} {}", self.task.bold(), "FAILED".red());
        }
        for (key, value) in &self.return_values {
            println!("  {key}: {value}");
        }
    }

    fn render_json(&self) {
        println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
    }
}

impl FlowListResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => self.render_json(),
        }
    }

    fn render_human(&self) {
        if self.flows.is_empty() {
            println!("No flows defined. Add a [flows.<name>] section to nimbus.toml.");
            return;
        }
        for flow in &self.flows {
            let steps = format!("{} step(s)", flow.steps);
            match &flow.description {
                Some(d) => println!("{}  ({})\n    {}", flow.name.bold(), steps, d),
                None => println!("{}  ({})", flow.name.bold(), steps),
            }
        }
    }

    fn render_json(&self) {
        println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
    }
}

impl FlowInfoResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => self.render_json(),
        }
    }

    fn render_human(&self) {
        println!("{}", self.name.bold());
        if let Some(d) = &self.description {
            println!("  description: {d}");
        }
        println!("  steps:");
        for step in &self.steps {
            if step.needs.is_empty() {
                println!("    {} -> {}", step.id, step.task);
            } else {
                println!("    {} -> {} (needs: {})", step.id, step.task, step.needs.join(", "));
            }
        }
    }

    fn render_json(&self) {
        println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
    }
}

impl FlowRunResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => self.render_json(),
        }
    }

    fn render_human(&self) {
        println!("Flow {}:", self.flow.bold());
        for step in &self.steps {
            let status = match step.status.as_str() {
                "success" => "success".green(),
                "skipped" => "skipped".yellow(),
                _ => "FAILED".red(),
            };
            match &step.error {
                Some(err) => println!("  {} [{}] {}", status, step.id, err),
                None => println!("  {} [{}]", status, step.id),
            }
        }
        if self.passed {
            println!("\nFlow {} {}", self.flow.bold(), "succeeded".green());
        } else {
            println!("\nFlow {} {}", self.flow.bold(), "FAILED".red());
        }
        if let Some(url) = &self.gist_url {
            println!("Run log uploaded: {url}");
        }
    }

    fn render_json(&self) {
        println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
    }
}

impl ReleaseNotesResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => self.render_json(),
        }
    }

    fn render_human(&self) {
        println!("Release notes for {}:\n", self.tag.bold());
        println!("{}", self.notes);
        if self.published {
            match &self.release_url {
                Some(url) => println!("\nPublished to {url}"),
                None => println!("\nPublished."),
            }
        }
    }

    fn render_json(&self) {
        println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
    }
}

impl ServiceListResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => self.render_json(),
        }
    }

    fn render_human(&self) {
        for service in &self.services {
            let state = if service.configured {
                "configured".green()
            } else {
                "not configured".yellow()
            };
            if service.attributes.is_empty() {
                println!("{}  {}", service.name.bold(), state);
            } else {
                println!("{}  {}  ({})", service.name.bold(), state, service.attributes.join(", "));
            }
        }
    }

    fn render_json(&self) {
        println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
    }
}

impl ServiceInfoResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => self.render_json(),
        }
    }

    fn render_human(&self) {
        println!("{}", self.name.bold());
        if !self.configured {
            println!("  not configured");
            println!("  Run 'nimbus service set {} --token <token>' to configure.", self.name);
            return;
        }
        if let Some(username) = &self.username {
            println!("  username: {username}");
        }
        if let Some(email) = &self.email {
            println!("  email: {email}");
        }
        if let Some(token) = &self.token {
            match &self.token_source {
                Some(source) => println!("  token: {token} (from {source})"),
                None => println!("  token: {token}"),
            }
        }
    }

    fn render_json(&self) {
        println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
    }
}

impl OperationResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => self.render_json(),
        }
    }

    fn render_human(&self) {
        println!("{}", self.message);
    }

    fn render_json(&self) {
        println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
    }
}
