//! Task option maps
//!
//! Options are string-valued. Typed accessors parse on demand and
//! report which option was malformed rather than panicking deep inside
//! a task.

use std::collections::BTreeMap;

use super::TaskError;
use crate::config::{ConfigError, ProjectConfig};

/// String-keyed options for one task invocation
#[derive(Debug, Clone, Default)]
pub struct TaskOptions {
    values: BTreeMap<String, String>,
}

impl From<BTreeMap<String, String>> for TaskOptions {
    fn from(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }
}

impl TaskOptions {
    /// Empty option map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one option
    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    /// Parse and set a `KEY=VALUE` pair, as passed on the command line.
    pub fn set_kv(&mut self, raw: &str) -> Result<(), TaskError> {
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| TaskError::Options(format!("expected KEY=VALUE, got '{raw}'")))?;
        if key.trim().is_empty() {
            return Err(TaskError::Options(format!("expected KEY=VALUE, got '{raw}'")));
        }
        self.set(key.trim(), value);
        Ok(())
    }

    /// Get an option value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Get an option that must be present
    pub fn require(&self, key: &str) -> Result<&str, TaskError> {
        self.get(key).ok_or_else(|| TaskError::Options(format!("missing required option: {key}")))
    }

    /// Get a boolean option; absent means false.
    pub fn get_bool(&self, key: &str) -> Result<bool, TaskError> {
        match self.get(key) {
            None => Ok(false),
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" | "" => Ok(false),
                other => Err(TaskError::Options(format!(
                    "option {key} expects a boolean, got '{other}'"
                ))),
            },
        }
    }

    /// Get an integer option.
    pub fn get_u64(&self, key: &str) -> Result<Option<u64>, TaskError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value.trim().parse().map(Some).map_err(|_| {
                TaskError::Options(format!("option {key} expects an integer, got '{value}'"))
            }),
        }
    }

    /// Get a comma-separated list option; absent means empty.
    #[must_use]
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Overlay another option map on top of this one.
    #[must_use]
    pub fn merged(&self, overrides: &Self) -> Self {
        let mut values = self.values.clone();
        for (key, value) in &overrides.values {
            values.insert(key.clone(), value.clone());
        }
        Self { values }
    }

    /// Expand `$project.<attr>` references in every value.
    pub fn interpolated(&self, project: &ProjectConfig) -> Result<Self, ConfigError> {
        let mut values = BTreeMap::new();
        for (key, value) in &self.values {
            values.insert(key.clone(), project.interpolate(value)?);
        }
        Ok(Self { values })
    }

    /// Iterate over the underlying map
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.values.iter()
    }

    /// The underlying map, for display
    #[must_use]
    pub const fn as_map(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}
