//! Task listing, inspection, and execution

use std::collections::BTreeMap;

use crate::cli::app::TaskAction;
use crate::output::{OutputMode, TaskInfoResult, TaskListResult, TaskRow, TaskRunResult};
use crate::tasks::{self, TaskContext, TaskOptions};

/// Dispatch a `nimbus task` action
pub fn task_cmd(action: TaskAction, mode: OutputMode) -> anyhow::Result<()> {
    match action {
        TaskAction::List => list(mode),
        TaskAction::Info { name } => info(&name, mode),
        TaskAction::Run { name, options } => run(&name, &options, mode),
    }
}

fn list(mode: OutputMode) -> anyhow::Result<()> {
    let ctx = TaskContext::discover()?;

    let mut rows: Vec<TaskRow> = ctx
        .project
        .tasks
        .iter()
        .map(|(name, def)| TaskRow {
            name: name.clone(),
            class: def.class.clone(),
            description: def.description.clone(),
        })
        .collect();

    // Builtins are runnable without a [tasks] entry; show them unless shadowed
    for builtin in tasks::BUILTIN_CLASSES {
        if ctx.project.tasks.contains_key(*builtin) {
            continue;
        }
        if let Some(def) = tasks::builtin_def(builtin) {
            rows.push(TaskRow {
                name: (*builtin).to_string(),
                class: def.class,
                description: def.description,
            });
        }
    }
    rows.sort_by(|a, b| a.name.cmp(&b.name));

    TaskListResult { tasks: rows }.render(mode);
    Ok(())
}

fn info(name: &str, mode: OutputMode) -> anyhow::Result<()> {
    let ctx = TaskContext::discover()?;
    let resolved = tasks::resolve(&ctx.project, name)?;

    let result = TaskInfoResult {
        name: resolved.name,
        class: resolved.def.class,
        description: resolved.def.description,
        required_options: resolved
            .task
            .required_options()
            .iter()
            .map(|option| (*option).to_string())
            .collect(),
        options: resolved.def.options,
    };
    result.render(mode);
    Ok(())
}

fn run(name: &str, raw_options: &[String], mode: OutputMode) -> anyhow::Result<()> {
    let ctx = TaskContext::discover()?;
    let resolved = tasks::resolve(&ctx.project, name)?;

    let mut cli_options = TaskOptions::new();
    for raw in raw_options {
        cli_options.set_kv(raw)?;
    }

    match tasks::run_task(resolved, &ctx, &cli_options) {
        Ok(outcome) => {
            TaskRunResult {
                task: name.to_string(),
                passed: true,
                return_values: outcome.return_values,
            }
            .render(mode);
            Ok(())
        }
        Err(err) => {
            TaskRunResult {
                task: name.to_string(),
                passed: false,
                return_values: BTreeMap::new(),
            }
            .render(mode);
            Err(err.into())
        }
    }
}
