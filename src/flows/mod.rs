//! Flow engine
//!
//! A flow is a named graph of task steps. Each step may declare the
//! steps it `needs`; execution follows a topological order that keeps
//! declaration order among ready steps, and a failed step skips its
//! transitive dependents while unrelated steps keep running.
//!
//! Flows can also be frozen: flattened into plain JSON step records
//! that an external scheduler can replay without nimbus present.

pub mod engine;

pub use engine::{FlowRun, StepReport, StepStatus, run_flow};

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use thiserror::Error;

use crate::config::{ConfigError, FlowDef, ProjectConfig};
use crate::tasks::{self, TaskOptions};

/// Failures in flow definition or resolution
#[derive(Debug, Error)]
pub enum FlowError {
    /// Two steps share an id
    #[error("flow '{flow}' defines step '{step}' more than once")]
    DuplicateStep {
        /// Flow being validated
        flow: String,
        /// The repeated step id
        step: String,
    },
    /// A `needs` entry names no step in the flow
    #[error("flow '{flow}' step '{step}' needs unknown step '{need}'")]
    UnknownNeed {
        /// Flow being validated
        flow: String,
        /// Step carrying the bad reference
        step: String,
        /// The id that resolved to nothing
        need: String,
    },
    /// The dependency graph has a cycle
    #[error("flow '{flow}' has a dependency cycle involving '{step}'")]
    Cycle {
        /// Flow being validated
        flow: String,
        /// A step on the cycle
        step: String,
    },
    /// Configuration problem while resolving a step's task
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A validated flow
#[derive(Debug, Clone)]
pub struct Flow {
    /// Flow name
    pub name: String,
    /// Short description shown in listings
    pub description: Option<String>,
    /// Steps in declaration order
    pub steps: Vec<Step>,
}

/// One step of a flow
#[derive(Debug, Clone)]
pub struct Step {
    /// Step id, unique within the flow
    pub id: String,
    /// Task the step runs
    pub task: String,
    /// Ids of steps that must succeed first
    pub needs: Vec<String>,
    /// Option overrides applied on top of the task's defaults
    pub options: BTreeMap<String, String>,
}

impl Flow {
    /// Validate a definition into a runnable flow.
    ///
    /// Step ids default to the task name. Duplicate ids, unknown
    /// `needs` references, and dependency cycles are rejected here so
    /// `run` and `freeze` start from a well-formed graph.
    pub fn from_def(name: &str, def: &FlowDef) -> Result<Self, FlowError> {
        let mut steps = Vec::with_capacity(def.steps.len());
        let mut seen = BTreeSet::new();
        for step_def in &def.steps {
            let id = step_def.id.clone().unwrap_or_else(|| step_def.task.clone());
            if !seen.insert(id.clone()) {
                return Err(FlowError::DuplicateStep { flow: name.to_string(), step: id });
            }
            steps.push(Step {
                id,
                task: step_def.task.clone(),
                needs: step_def.needs.clone(),
                options: step_def.options.clone(),
            });
        }
        for step in &steps {
            for need in &step.needs {
                if !seen.contains(need) {
                    return Err(FlowError::UnknownNeed {
                        flow: name.to_string(),
                        step: step.id.clone(),
                        need: need.clone(),
                    });
                }
            }
        }

        let flow =
            Self { name: name.to_string(), description: def.description.clone(), steps };
        flow.execution_order()?;
        Ok(flow)
    }

    /// Look up a flow by name in the project.
    pub fn resolve(project: &ProjectConfig, name: &str) -> Result<Self, FlowError> {
        let def = project
            .flows
            .get(name)
            .ok_or_else(|| ConfigError::UnknownFlow(name.to_string()))?;
        Self::from_def(name, def)
    }

    /// Indexes of `steps` in execution order.
    ///
    /// Ready steps run in declaration order, so flows without `needs`
    /// behave like a plain sequential list.
    pub fn execution_order(&self) -> Result<Vec<usize>, FlowError> {
        let mut order = Vec::with_capacity(self.steps.len());
        let mut placed = vec![false; self.steps.len()];
        while order.len() < self.steps.len() {
            let mut advanced = false;
            for (index, step) in self.steps.iter().enumerate() {
                if placed[index] {
                    continue;
                }
                let ready = step.needs.iter().all(|need| {
                    self.steps.iter().position(|s| s.id == *need).is_some_and(|i| placed[i])
                });
                if ready {
                    placed[index] = true;
                    order.push(index);
                    advanced = true;
                }
            }
            if !advanced {
                let stuck = self
                    .steps
                    .iter()
                    .enumerate()
                    .find(|(index, _)| !placed[*index])
                    .map(|(_, step)| step.id.clone())
                    .unwrap_or_default();
                return Err(FlowError::Cycle { flow: self.name.clone(), step: stuck });
            }
        }
        Ok(order)
    }
}

/// A flow step flattened for external schedulers
#[derive(Debug, Clone, Serialize)]
pub struct FrozenStep {
    /// Display name
    pub name: String,
    /// Step kind marker
    pub kind: String,
    /// Whether the step may be skipped by the consumer
    pub is_required: bool,
    /// Dotted `flow.step` path
    pub path: String,
    /// Position in execution order, 1-based
    pub step_num: String,
    /// Class implementing the step's task
    pub task_class: String,
    /// Fully merged task configuration
    pub task_config: FrozenTaskConfig,
}

/// Options payload of a frozen step
#[derive(Debug, Clone, Serialize)]
pub struct FrozenTaskConfig {
    /// Merged, interpolated task options
    pub options: BTreeMap<String, String>,
}

/// Flatten a flow into frozen step records.
///
/// Options are merged and `$project.` references interpolated, so the
/// output stands alone without the project file.
pub fn freeze(project: &ProjectConfig, flow: &Flow) -> Result<Vec<FrozenStep>, FlowError> {
    let order = flow.execution_order()?;
    let mut frozen = Vec::with_capacity(order.len());
    for (position, index) in order.iter().enumerate() {
        let step = &flow.steps[*index];
        let resolved = tasks::resolve(project, &step.task)?;
        let defaults = TaskOptions::from(resolved.def.options.clone());
        let overrides = TaskOptions::from(step.options.clone());
        let options = defaults.merged(&overrides).interpolated(project)?;
        frozen.push(FrozenStep {
            name: resolved.def.description.clone().unwrap_or_else(|| step.id.clone()),
            kind: "other".to_string(),
            is_required: true,
            path: format!("{}.{}", flow.name, step.id),
            step_num: (position + 1).to_string(),
            task_class: resolved.def.class.clone(),
            task_config: FrozenTaskConfig { options: options.as_map().clone() },
        });
    }
    Ok(frozen)
}
