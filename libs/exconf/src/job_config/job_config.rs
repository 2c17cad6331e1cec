// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{JobId, Task};
use crate::error::{CompileError, Result};

/// Who the job is evaluated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    /// Evaluation of a student submission.
    #[default]
    Student,
    /// Evaluation of a reference solution.
    Reference,
}

impl JobType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Reference => "reference",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "student" => Some(Self::Student),
            "reference" => Some(Self::Reference),
            _ => None,
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Header of a job document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SubmissionHeader {
    pub job_id: JobId,
    pub job_type: JobType,
    pub task_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hw_groups: Vec<String>,
}

/// Compiled job: submission header and ordered tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    pub submission: SubmissionHeader,
    pub tasks: Vec<Task>,
}

impl JobConfig {
    /// Assemble a job from ordered tasks under a fresh id.
    pub fn new(job_type: JobType, hw_groups: Vec<String>, tasks: Vec<Task>) -> Self {
        Self {
            submission: SubmissionHeader {
                job_id: JobId::generate(job_type),
                job_type,
                task_count: tasks.len(),
                hw_groups,
            },
            tasks,
        }
    }

    pub fn id(&self) -> &JobId {
        &self.submission.job_id
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }

    /// Position of a task in execution order.
    pub fn position(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.task_id == task_id)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| CompileError::JobConfigLoading(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CompileError::JobConfigLoading(e.to_string()))
    }

    /// Read a job document back. The declared task count must match.
    pub fn parse_yaml(yaml: &str) -> Result<Self> {
        let job: Self =
            serde_yaml::from_str(yaml).map_err(|e| CompileError::JobConfigLoading(e.to_string()))?;

        if job.submission.task_count != job.tasks.len() {
            return Err(CompileError::JobConfigLoading(format!(
                "header declares {} tasks but the document contains {}",
                job.submission.task_count,
                job.tasks.len()
            )));
        }

        Ok(job)
    }
}
