// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::{ExerciseSource, PipelineStore};
use crate::compilation::{CompilationParams, CompileResult, ExerciseConfigCompiler, RootedTree};
use crate::error::{CompileError, Result};
use crate::exercise::{ExerciseConfig, ExerciseLimits};
use crate::job_config::{JobConfig, JobType};
use crate::loader::Loader;
use crate::settings::CompilerSettings;
use crate::validation::Validator;
use crate::variables::VariablesTable;

/// Runtime environment a job is compiled for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuntimeEnvironment {
    pub id: String,
}

impl RuntimeEnvironment {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl fmt::Display for RuntimeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub job_type: JobType,
    pub settings: CompilerSettings,
}

/// Everything loaded and validated for one compilation.
struct Prepared {
    config: ExerciseConfig,
    environment_variables: Arc<VariablesTable>,
    limits: BTreeMap<String, ExerciseLimits>,
    hw_groups: Vec<String>,
}

/// Compiles exercise configurations into job configurations.
///
/// Holds no mutable state; one instance can serve concurrent compilations.
pub struct Compiler {
    store: Arc<dyn PipelineStore>,
    options: CompileOptions,
}

impl Compiler {
    pub fn new(store: Arc<dyn PipelineStore>) -> Self {
        Self::with_options(store, CompileOptions::default())
    }

    pub fn with_options(store: Arc<dyn PipelineStore>, options: CompileOptions) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn store(&self) -> &dyn PipelineStore {
        self.store.as_ref()
    }

    pub fn compile(
        &self,
        exercise: &dyn ExerciseSource,
        environment: &RuntimeEnvironment,
    ) -> Result<JobConfig> {
        self.compile_with_options(exercise, environment, &self.options)
    }

    /// Compile with per-call options. Either a complete job comes back or
    /// an error; nothing partial.
    pub fn compile_with_options(
        &self,
        exercise: &dyn ExerciseSource,
        environment: &RuntimeEnvironment,
        options: &CompileOptions,
    ) -> Result<JobConfig> {
        let compiled = self.prepare(exercise, environment).and_then(|prepared| {
            let result = ExerciseConfigCompiler::compile(&self.params(&prepared, environment, options))?;
            Ok((prepared.hw_groups, result))
        });

        match compiled {
            Ok((hw_groups, CompileResult { tasks, stats })) => {
                let job = JobConfig::new(options.job_type, hw_groups, tasks);
                tracing::info!(
                    "Compiled job '{}' for environment '{}': {}",
                    job.id(),
                    environment,
                    stats
                );
                Ok(job)
            }
            Err(e) => {
                tracing::error!("Compilation for environment '{}' failed: {}", environment, e);
                Err(e)
            }
        }
    }

    /// Deduplicated graph of an exercise, for inspection.
    pub fn compile_tree(
        &self,
        exercise: &dyn ExerciseSource,
        environment: &RuntimeEnvironment,
    ) -> Result<RootedTree> {
        let prepared = self.prepare(exercise, environment)?;
        let (tree, _) =
            ExerciseConfigCompiler::build_tree(&self.params(&prepared, environment, &self.options))?;
        Ok(tree)
    }

    /// Load and validate without building anything.
    pub fn validate(&self, exercise: &dyn ExerciseSource, environment: &RuntimeEnvironment) -> Result<()> {
        self.prepare(exercise, environment).map(|_| ())
    }

    fn params<'a>(
        &'a self,
        prepared: &'a Prepared,
        environment: &'a RuntimeEnvironment,
        options: &'a CompileOptions,
    ) -> CompilationParams<'a> {
        CompilationParams {
            config: &prepared.config,
            environment: &environment.id,
            environment_variables: &prepared.environment_variables,
            store: self.store.as_ref(),
            limits: &prepared.limits,
            settings: &options.settings,
        }
    }

    fn prepare(&self, exercise: &dyn ExerciseSource, environment: &RuntimeEnvironment) -> Result<Prepared> {
        let config = Loader::load_exercise_config(exercise.exercise_config())?;
        let environments = exercise.environment_ids();
        if !environments.contains(&environment.id) {
            return Err(CompileError::UnknownEnvironmentReference {
                environment: environment.id.clone(),
                context: "runtime environment".to_string(),
            });
        }

        let validator = Validator::new(self.store.as_ref());
        validator.validate_exercise_config(&config, &environments)?;
        validator.validate_used_pipelines(&config, &environment.id)?;

        let environment_variables = Arc::new(Loader::load_variables_table(
            exercise.environment_variables(&environment.id).unwrap_or_default(),
        )?);

        let hw_groups = exercise.hardware_groups();
        let mut limits = BTreeMap::new();
        for hw_group in &hw_groups {
            let Some(document) = exercise.limits(&environment.id, hw_group) else {
                continue;
            };
            let parsed = Loader::load_exercise_limits(document)?;
            validator.validate_exercise_limits(&parsed, &config, &environment.id, hw_group)?;
            limits.insert(hw_group.clone(), parsed);
        }

        tracing::debug!(
            "Prepared exercise: {} tests, {} hardware groups with limits",
            config.tests().len(),
            limits.len()
        );

        Ok(Prepared {
            config,
            environment_variables,
            limits,
            hw_groups,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{InMemoryExercise, InMemoryPipelineStore};

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_compiler_is_send_sync() {
        assert_send_sync::<Compiler>();
    }

    #[test]
    fn test_unknown_runtime_environment() {
        let compiler = Compiler::new(Arc::new(InMemoryPipelineStore::new()));
        let exercise = InMemoryExercise::new("tests: {}\n").with_environment("linux", "");

        let err = compiler
            .compile(&exercise, &RuntimeEnvironment::new("windows"))
            .unwrap_err();
        assert!(matches!(err, CompileError::UnknownEnvironmentReference { ref environment, .. } if environment == "windows"));
    }

    #[test]
    fn test_empty_exercise_compiles_to_empty_job() {
        let compiler = Compiler::new(Arc::new(InMemoryPipelineStore::new()));
        let exercise = InMemoryExercise::new("environments: [linux]\n").with_environment("linux", "");

        let job = compiler.compile(&exercise, &RuntimeEnvironment::new("linux")).unwrap();
        assert!(job.tasks.is_empty());
        assert_eq!(job.submission.task_count, 0);
        assert!(job.id().starts_with("student_"));
    }

    #[test]
    fn test_reference_job_type() {
        let options = CompileOptions {
            job_type: JobType::Reference,
            ..CompileOptions::default()
        };
        let compiler = Compiler::with_options(Arc::new(InMemoryPipelineStore::new()), options);
        let exercise = InMemoryExercise::new("tests: {}\n").with_environment("linux", "");

        let job = compiler.compile(&exercise, &RuntimeEnvironment::new("linux")).unwrap();
        assert_eq!(job.submission.job_type, JobType::Reference);
    }
}
