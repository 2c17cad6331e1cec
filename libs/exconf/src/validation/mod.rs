// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Referential and structural checks run before any graph is built.

mod exercise_config_validator;
mod exercise_limits_validator;
mod pipeline_validator;

pub use exercise_config_validator::ExerciseConfigValidator;
pub use exercise_limits_validator::ExerciseLimitsValidator;
pub use pipeline_validator::PipelineValidator;

use crate::compiler::PipelineStore;
use crate::error::Result;
use crate::exercise::{ExerciseConfig, ExerciseLimits};
use crate::pipeline::Pipeline;

/// Entry point for all validations against one pipeline store.
#[derive(Clone, Copy)]
pub struct Validator<'a> {
    store: &'a dyn PipelineStore,
}

impl<'a> Validator<'a> {
    pub fn new(store: &'a dyn PipelineStore) -> Self {
        Self { store }
    }

    pub fn validate_pipeline(&self, pipeline: &Pipeline) -> Result<()> {
        PipelineValidator::validate(pipeline)
    }

    pub fn validate_exercise_config(
        &self,
        config: &ExerciseConfig,
        environments: &[String],
    ) -> Result<()> {
        ExerciseConfigValidator::validate(config, environments, self.store)
    }

    pub fn validate_exercise_limits(
        &self,
        limits: &ExerciseLimits,
        config: &ExerciseConfig,
        environment: &str,
        hw_group: &str,
    ) -> Result<()> {
        ExerciseLimitsValidator::validate(limits, config, environment, hw_group, self.store)
    }

    /// Validate every pipeline the exercise uses in `environment`.
    pub fn validate_used_pipelines(&self, config: &ExerciseConfig, environment: &str) -> Result<()> {
        for test in config.tests() {
            for instance in test.pipelines(environment) {
                if let Some(pipeline) = self.store.pipeline(&instance.name) {
                    self.validate_pipeline(&pipeline)?;
                }
            }
        }
        Ok(())
    }
}
