// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::test_case::TestRecord;
use super::{Test, ordered};
use crate::error::{CompileError, Result};
use crate::pipeline::null_as_default;
use crate::variables::VariablesTable;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ExerciseConfigRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    environments: Vec<String>,
    #[serde(default, skip_serializing_if = "VariablesTable::is_empty")]
    variables: VariablesTable,
    #[serde(default, with = "ordered")]
    tests: Vec<(String, TestRecord)>,
}

/// High-level test configuration of an exercise.
///
/// Tests keep document order, which fixes the order of the compiled tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ExerciseConfigRecord", into = "ExerciseConfigRecord")]
pub struct ExerciseConfig {
    environments: Vec<String>,
    variables: VariablesTable,
    tests: Vec<Test>,
}

impl ExerciseConfig {
    pub fn new(environments: Vec<String>, variables: VariablesTable, tests: Vec<Test>) -> Result<Self> {
        let mut seen = HashSet::new();
        if let Some(duplicate) = tests.iter().find(|t| !seen.insert(t.id())) {
            return Err(CompileError::parsing(
                "exercise config",
                format!("test '{}' is declared more than once", duplicate.id()),
            ));
        }

        Ok(Self {
            environments,
            variables,
            tests,
        })
    }

    /// Environment ids the exercise is configured for.
    pub fn environments(&self) -> &[String] {
        &self.environments
    }

    /// Exercise-scope variables.
    pub fn variables(&self) -> &VariablesTable {
        &self.variables
    }

    pub fn tests(&self) -> &[Test] {
        &self.tests
    }

    pub fn test(&self, id: &str) -> Option<&Test> {
        self.tests.iter().find(|t| t.id() == id)
    }

    /// Every pipeline id referenced by any test in any environment.
    pub fn pipeline_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.tests
            .iter()
            .flat_map(|t| t.environment_ids().flat_map(move |env| t.pipelines(env)))
            .map(|p| p.name.as_str())
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

impl TryFrom<ExerciseConfigRecord> for ExerciseConfig {
    type Error = CompileError;

    fn try_from(record: ExerciseConfigRecord) -> Result<Self> {
        let tests = record
            .tests
            .into_iter()
            .map(|(id, body)| Test::from_record(id, body))
            .collect();
        Self::new(record.environments, record.variables, tests)
    }
}

impl From<ExerciseConfig> for ExerciseConfigRecord {
    fn from(config: ExerciseConfig) -> Self {
        Self {
            tests: config
                .tests
                .iter()
                .map(|t| (t.id().to_string(), t.to_record()))
                .collect(),
            environments: config.environments,
            variables: config.variables,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
environments: [c-gcc-linux, java]
variables:
  - { name: source-files, type: 'file[]', value: [main.c] }
tests:
  t2:
    environments:
      c-gcc-linux:
        pipelines:
          - name: compilation
          - name: run
            variables:
              - { name: input, type: file, value: 02.in }
  t1:
    environments:
      c-gcc-linux:
        pipelines:
          - name: compilation
      java:
        pipelines: ~
"#;

    #[test]
    fn test_tests_keep_document_order() {
        let config: ExerciseConfig = serde_yaml::from_str(CONFIG).unwrap();
        let ids: Vec<_> = config.tests().iter().map(Test::id).collect();
        assert_eq!(ids, vec!["t2", "t1"]);
        assert_eq!(config.environments(), ["c-gcc-linux", "java"]);
        assert_eq!(config.variables().len(), 1);
    }

    #[test]
    fn test_pipelines_per_environment() {
        let config: ExerciseConfig = serde_yaml::from_str(CONFIG).unwrap();
        let t2 = config.test("t2").unwrap();
        let pipelines = t2.pipelines("c-gcc-linux");
        assert_eq!(pipelines.len(), 2);
        assert!(pipelines[1].variables.contains("input"));
        assert!(t2.pipelines("java").is_empty());
        assert!(config.test("t1").unwrap().pipelines("java").is_empty());
        assert_eq!(config.pipeline_ids(), vec!["compilation", "run"]);
    }

    #[test]
    fn test_duplicate_test_ids_rejected() {
        let yaml = "tests:\n  t1: {}\n  t1: {}\n";
        assert!(serde_yaml::from_str::<ExerciseConfig>(yaml).is_err());
    }

    #[test]
    fn test_round_trip() {
        let config: ExerciseConfig = serde_yaml::from_str(CONFIG).unwrap();
        let text = serde_yaml::to_string(&config).unwrap();
        let back: ExerciseConfig = serde_yaml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
