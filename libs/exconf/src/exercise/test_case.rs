// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};

use super::ordered;
use crate::pipeline::null_as_default;
use crate::variables::VariablesTable;

/// Pipeline instantiation inside a test, with its per-test variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineVariables {
    /// Pipeline id.
    pub name: String,
    #[serde(default)]
    pub variables: VariablesTable,
}

impl PipelineVariables {
    pub fn new(name: impl Into<String>, variables: VariablesTable) -> Self {
        Self {
            name: name.into(),
            variables,
        }
    }
}

/// Pipelines a test runs in one environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestEnvironment {
    #[serde(default, deserialize_with = "null_as_default")]
    pub pipelines: Vec<PipelineVariables>,
}

/// Body of a test as written under its id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct TestRecord {
    #[serde(default, with = "ordered")]
    pub environments: Vec<(String, TestEnvironment)>,
}

/// One test case of an exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Test {
    id: String,
    environments: Vec<(String, TestEnvironment)>,
}

impl Test {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            environments: Vec::new(),
        }
    }

    /// Add the pipelines run in `environment`.
    pub fn with_environment(
        mut self,
        environment: impl Into<String>,
        pipelines: Vec<PipelineVariables>,
    ) -> Self {
        self.environments
            .push((environment.into(), TestEnvironment { pipelines }));
        self
    }

    pub(super) fn from_record(id: String, record: TestRecord) -> Self {
        Self {
            id,
            environments: record.environments,
        }
    }

    pub(super) fn to_record(&self) -> TestRecord {
        TestRecord {
            environments: self.environments.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Environment ids the test is configured for, in document order.
    pub fn environment_ids(&self) -> impl Iterator<Item = &str> {
        self.environments.iter().map(|(id, _)| id.as_str())
    }

    /// Pipelines run in `environment`; empty when the test does not
    /// configure it.
    pub fn pipelines(&self, environment: &str) -> &[PipelineVariables] {
        self.environments
            .iter()
            .find(|(id, _)| id == environment)
            .map(|(_, env)| env.pipelines.as_slice())
            .unwrap_or_default()
    }
}
