//! Flow execution

use std::collections::BTreeMap;

use log::{error, info, warn};
use serde::Serialize;

use crate::tasks::{self, TaskContext, TaskOptions};

use super::{Flow, FlowError};

/// Outcome of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Ran and passed
    Success,
    /// Ran and failed
    Failed,
    /// Not run because a dependency did not succeed
    Skipped,
}

impl StepStatus {
    /// Lowercase status label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// Report for one executed or skipped step
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// Step id
    pub id: String,
    /// Task the step ran
    pub task: String,
    /// Outcome
    pub status: StepStatus,
    /// Error message when the step failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of running a flow
#[derive(Debug, Clone, Serialize)]
pub struct FlowRun {
    /// Flow name
    pub flow: String,
    /// True when every step succeeded
    pub passed: bool,
    /// Per-step reports in execution order
    pub steps: Vec<StepReport>,
}

/// Run every step of a flow in dependency order.
///
/// A failed step marks its transitive dependents Skipped; steps that
/// do not depend on the failure still run. Step failures land in the
/// report rather than aborting the flow, so `Err` here means the flow
/// itself could not be set up.
pub fn run_flow(ctx: &TaskContext, flow: &Flow) -> Result<FlowRun, FlowError> {
    let order = flow.execution_order()?;

    // Surface configuration mistakes before any step runs
    for step in &flow.steps {
        tasks::resolve(&ctx.project, &step.task)?;
    }

    info!("Running flow: {}", flow.name);
    let mut statuses: BTreeMap<&str, StepStatus> = BTreeMap::new();
    let mut reports = Vec::with_capacity(order.len());
    for index in order {
        let step = &flow.steps[index];
        let blocked = step
            .needs
            .iter()
            .any(|need| statuses.get(need.as_str()).is_some_and(|s| *s != StepStatus::Success));

        let report = if blocked {
            warn!("Skipping step {} (a dependency did not succeed)", step.id);
            StepReport {
                id: step.id.clone(),
                task: step.task.clone(),
                status: StepStatus::Skipped,
                error: None,
            }
        } else {
            let resolved = tasks::resolve(&ctx.project, &step.task)?;
            let overrides = TaskOptions::from(step.options.clone());
            match tasks::run_task(resolved, ctx, &overrides) {
                Ok(_) => StepReport {
                    id: step.id.clone(),
                    task: step.task.clone(),
                    status: StepStatus::Success,
                    error: None,
                },
                Err(err) => {
                    error!("Step {} failed: {err}", step.id);
                    StepReport {
                        id: step.id.clone(),
                        task: step.task.clone(),
                        status: StepStatus::Failed,
                        error: Some(err.to_string()),
                    }
                }
            }
        };
        statuses.insert(step.id.as_str(), report.status);
        reports.push(report);
    }

    Ok(FlowRun {
        flow: flow.name.clone(),
        passed: reports.iter().all(|report| report.status == StepStatus::Success),
        steps: reports,
    })
}
