//! Hook dispatch, called from the scripts under `.git/hooks`
//!
//! Stays silent when the project has no hook flow configured (or no
//! nimbus.toml at all) so the installed hook never blocks commits in
//! projects that have not opted in.

use crate::config::ConfigError;
use crate::flows::{self, Flow};
use crate::output::{FlowRunResult, FlowStepOutcome, OutputMode};
use crate::tasks::TaskContext;

/// Run the flow configured for a hook kind
pub fn hook_run(kind: &str, mode: OutputMode) -> anyhow::Result<()> {
    if kind != "pre-commit" {
        anyhow::bail!("unknown hook kind '{kind}'");
    }

    let ctx = match TaskContext::discover() {
        Ok(ctx) => ctx,
        Err(ConfigError::NotFound(_)) => return Ok(()),
        Err(err) => return Err(err.into()),
    };
    let Some(flow_name) = ctx.project.hooks.pre_commit.clone() else {
        return Ok(());
    };

    let flow = Flow::resolve(&ctx.project, &flow_name)?;
    let flow_run = flows::run_flow(&ctx, &flow)?;

    let result = FlowRunResult {
        flow: flow_run.flow.clone(),
        passed: flow_run.passed,
        steps: flow_run
            .steps
            .iter()
            .map(|step| FlowStepOutcome {
                id: step.id.clone(),
                task: step.task.clone(),
                status: step.status.as_str().to_string(),
                error: step.error.clone(),
            })
            .collect(),
        gist_url: None,
    };
    result.render(mode);

    if !flow_run.passed {
        anyhow::bail!("pre-commit flow '{flow_name}' failed");
    }
    Ok(())
}
