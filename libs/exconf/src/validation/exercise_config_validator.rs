// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use crate::compiler::PipelineStore;
use crate::error::{CompileError, Result};
use crate::exercise::ExerciseConfig;

/// Checks that an exercise configuration only names known environments and
/// pipelines.
pub struct ExerciseConfigValidator;

impl ExerciseConfigValidator {
    /// `environments` are the ids the exercise has environment configs for.
    pub fn validate(
        config: &ExerciseConfig,
        environments: &[String],
        store: &dyn PipelineStore,
    ) -> Result<()> {
        let known = |id: &str| environments.iter().any(|e| e == id);

        if let Some(unknown) = config.environments().iter().find(|e| !known(e.as_str())) {
            return Err(CompileError::UnknownEnvironmentReference {
                environment: unknown.clone(),
                context: "exercise config".to_string(),
            });
        }

        for test in config.tests() {
            if let Some(unknown) = test.environment_ids().find(|e| !known(*e)) {
                return Err(CompileError::UnknownEnvironmentReference {
                    environment: unknown.to_string(),
                    context: format!("test '{}'", test.id()),
                });
            }

            for environment in test.environment_ids() {
                if let Some(missing) = test
                    .pipelines(environment)
                    .iter()
                    .find(|p| !store.contains(&p.name))
                {
                    return Err(CompileError::UnknownPipelineReference {
                        pipeline: missing.name.clone(),
                        test: test.id().to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::InMemoryPipelineStore;
    use crate::loader::Loader;

    fn store() -> InMemoryPipelineStore {
        let mut store = InMemoryPipelineStore::new();
        store.insert(Loader::load_pipeline("id: compilation\n").unwrap());
        store
    }

    fn envs() -> Vec<String> {
        vec!["c-gcc-linux".to_string()]
    }

    #[test]
    fn test_valid_config() {
        let config = Loader::load_exercise_config(
            "environments: [c-gcc-linux]\ntests:\n  t1:\n    environments:\n      c-gcc-linux:\n        pipelines: [{ name: compilation }]\n",
        )
        .unwrap();
        ExerciseConfigValidator::validate(&config, &envs(), &store()).unwrap();
    }

    #[test]
    fn test_unknown_top_level_environment() {
        let config = Loader::load_exercise_config("environments: [haskell]\n").unwrap();
        let err = ExerciseConfigValidator::validate(&config, &envs(), &store()).unwrap_err();
        assert!(matches!(err, CompileError::UnknownEnvironmentReference { ref environment, .. } if environment == "haskell"));
    }

    #[test]
    fn test_unknown_test_environment() {
        let config = Loader::load_exercise_config(
            "tests:\n  t1:\n    environments:\n      haskell: { pipelines: [] }\n",
        )
        .unwrap();
        let err = ExerciseConfigValidator::validate(&config, &envs(), &store()).unwrap_err();
        assert!(err.to_string().contains("test 't1'"));
    }

    #[test]
    fn test_unknown_pipeline() {
        let config = Loader::load_exercise_config(
            "tests:\n  t1:\n    environments:\n      c-gcc-linux:\n        pipelines: [{ name: nonexistent }]\n",
        )
        .unwrap();
        let err = ExerciseConfigValidator::validate(&config, &envs(), &store()).unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnknownPipelineReference { ref pipeline, ref test } if pipeline == "nonexistent" && test == "t1"
        ));
    }
}
