// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};
use std::fmt;

use super::SandboxConfig;

/// Kind of work a task performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// Build or setup step.
    Initiation,
    /// Run of the submitted program.
    Execution,
    /// Comparison of produced and expected results.
    Evaluation,
}

impl TaskType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Initiation => "initiation",
            Self::Execution => "execution",
            Self::Evaluation => "evaluation",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Program and arguments of a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub bin: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

/// One directly executable unit of a job.
///
/// Box lowering fills the command, type and sandbox; identifiers, priority,
/// dependencies and the test id are assigned when tasks are ordered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Task {
    pub task_id: String,

    pub priority: u32,

    #[serde(default)]
    pub fatal_failure: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    pub cmd: Command,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<SandboxConfig>,

    /// Fields this compiler does not interpret, kept verbatim.
    #[serde(flatten)]
    pub additional: serde_json::Map<String, serde_json::Value>,
}

impl Task {
    /// Task running `bin` with `args`.
    pub fn command<I, S>(bin: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cmd: Command {
                bin: bin.into(),
                args: args.into_iter().map(Into::into).collect(),
            },
            ..Default::default()
        }
    }

    pub fn with_type(mut self, task_type: TaskType) -> Self {
        self.task_type = Some(task_type);
        self
    }

    pub fn with_fatal_failure(mut self, fatal: bool) -> Self {
        self.fatal_failure = fatal;
        self
    }

    pub fn with_sandbox(mut self, sandbox: SandboxConfig) -> Self {
        self.sandbox = Some(sandbox);
        self
    }

    pub fn is_sandboxed(&self) -> bool {
        self.sandbox.is_some()
    }
}
