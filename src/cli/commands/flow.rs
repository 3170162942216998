//! Flow listing, inspection, execution, and freezing

use std::collections::BTreeMap;

use crate::cli::app::FlowAction;
use crate::flows::{self, Flow, FlowRun};
use crate::output::{
    FlowInfoResult, FlowListResult, FlowRow, FlowRunResult, FlowStepOutcome, FlowStepRow,
    OutputMode,
};
use crate::tasks::TaskContext;

/// Dispatch a `nimbus flow` action
pub fn flow_cmd(action: FlowAction, mode: OutputMode) -> anyhow::Result<()> {
    match action {
        FlowAction::List => list(mode),
        FlowAction::Info { name } => info(&name, mode),
        FlowAction::Run { name, gist } => run(&name, gist, mode),
        FlowAction::Freeze { name } => freeze(&name),
    }
}

fn list(mode: OutputMode) -> anyhow::Result<()> {
    let ctx = TaskContext::discover()?;
    let rows: Vec<FlowRow> = ctx
        .project
        .flows
        .iter()
        .map(|(name, def)| FlowRow {
            name: name.clone(),
            description: def.description.clone(),
            steps: def.steps.len(),
        })
        .collect();
    FlowListResult { flows: rows }.render(mode);
    Ok(())
}

fn info(name: &str, mode: OutputMode) -> anyhow::Result<()> {
    let ctx = TaskContext::discover()?;
    let flow = Flow::resolve(&ctx.project, name)?;
    let order = flow.execution_order()?;

    let steps = order
        .iter()
        .map(|&index| {
            let step = &flow.steps[index];
            FlowStepRow { id: step.id.clone(), task: step.task.clone(), needs: step.needs.clone() }
        })
        .collect();

    FlowInfoResult { name: flow.name, description: flow.description, steps }.render(mode);
    Ok(())
}

fn run(name: &str, gist: bool, mode: OutputMode) -> anyhow::Result<()> {
    let ctx = TaskContext::discover()?;
    let flow = Flow::resolve(&ctx.project, name)?;
    let flow_run = flows::run_flow(&ctx, &flow)?;

    let gist_url = if gist { Some(upload_run_log(&ctx, &flow_run)?) } else { None };

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
        gist_url,
    };
    result.render(mode);

    if !flow_run.passed {
        anyhow::bail!("flow '{name}' failed");
    }
    Ok(())
}

fn freeze(name: &str) -> anyhow::Result<()> {
    let ctx = TaskContext::discover()?;
    let flow = Flow::resolve(&ctx.project, name)?;
    let frozen = flows::freeze(&ctx.project, &flow)?;
    println!("{}", serde_json::to_string_pretty(&frozen)?);
    Ok(())
}

fn upload_run_log(ctx: &TaskContext, flow_run: &FlowRun) -> anyhow::Result<String> {
    let client = ctx.github()?;
    let mut files = BTreeMap::new();
    files.insert(format!("{}-run.md", flow_run.flow), run_log_markdown(flow_run));
    let gist =
        client.create_gist(&format!("nimbus flow run: {}", flow_run.flow), &files)?;
    Ok(gist.html_url)
}

fn run_log_markdown(flow_run: &FlowRun) -> String {
    let verdict = if flow_run.passed { "passed" } else { "failed" };
    let mut log = format!("# Flow `{}` {verdict}\n\n", flow_run.flow);
    for step in &flow_run.steps {
        match &step.error {
            Some(error) => {
                log.push_str(&format!("- `{}`: {} ({error})\n", step.id, step.status.as_str()));
            }
            None => log.push_str(&format!("- `{}`: {}\n", step.id, step.status.as_str())),
        }
    }
    log
}
