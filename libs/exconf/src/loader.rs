// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! YAML documents to typed configuration.
//!
//! Every structural problem surfaces as [`CompileError::ConfigParsing`]
//! naming the document, before any graph work starts.

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::{CompileError, Result};
use crate::exercise::{ExerciseConfig, ExerciseLimits};
use crate::pipeline::Pipeline;
use crate::variables::VariablesTable;

pub struct Loader;

impl Loader {
    fn parse<T: DeserializeOwned>(what: &str, yaml: &str) -> Result<T> {
        serde_yaml::from_str(yaml).map_err(|e| CompileError::parsing(what, e))
    }

    /// Like `parse`, but an empty document yields the default value.
    fn parse_or_default<T: DeserializeOwned + Default>(what: &str, yaml: &str) -> Result<T> {
        if yaml.trim().is_empty() {
            return Ok(T::default());
        }
        Self::parse(what, yaml)
    }

    pub fn load_pipeline(yaml: &str) -> Result<Pipeline> {
        let pipeline: Pipeline = Self::parse("pipeline", yaml)?;
        tracing::debug!(
            "Loaded pipeline '{}' with {} boxes",
            pipeline.id(),
            pipeline.boxes().len()
        );
        Ok(pipeline)
    }

    pub fn load_pipeline_file(path: &Path) -> Result<Pipeline> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&path.display().to_string(), &content)
    }

    pub fn load_exercise_config(yaml: &str) -> Result<ExerciseConfig> {
        Self::parse("exercise config", yaml)
    }

    /// Variables table of an environment.
    pub fn load_variables_table(yaml: &str) -> Result<VariablesTable> {
        Self::parse_or_default("environment variables", yaml)
    }

    pub fn load_exercise_limits(yaml: &str) -> Result<ExerciseLimits> {
        Self::parse_or_default("exercise limits", yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_yaml_is_parsing_error() {
        let err = Loader::load_exercise_config("tests: [unclosed").unwrap_err();
        assert!(matches!(err, CompileError::ConfigParsing { ref what, .. } if what == "exercise config"));
    }

    #[test]
    fn test_structure_error_is_parsing_error() {
        let err = Loader::load_pipeline("boxes: []\n").unwrap_err();
        assert!(err.to_string().contains("id"));
    }

    #[test]
    fn test_empty_documents_default() {
        assert!(Loader::load_variables_table("").unwrap().is_empty());
        assert!(Loader::load_exercise_limits("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_variable_type() {
        let err = Loader::load_variables_table("- { name: x, type: integer, value: 1 }\n").unwrap_err();
        assert!(matches!(err, CompileError::ConfigParsing { .. }));
    }

    #[test]
    fn test_load_pipeline_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.yaml");
        std::fs::write(&path, "id: p\n").unwrap();
        assert_eq!(Loader::load_pipeline_file(&path).unwrap().id(), "p");
    }
}
