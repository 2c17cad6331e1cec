// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use crate::compiler::PipelineStore;
use crate::error::{CompileError, Result};
use crate::exercise::{ExerciseConfig, ExerciseLimits};

/// Checks that limits of one (environment, hardware group) pair refer to
/// existing tests and boxes and hold sane values.
pub struct ExerciseLimitsValidator;

impl ExerciseLimitsValidator {
    pub fn validate(
        limits: &ExerciseLimits,
        config: &ExerciseConfig,
        environment: &str,
        hw_group: &str,
        store: &dyn PipelineStore,
    ) -> Result<()> {
        let invalid = |reason: String| {
            CompileError::InvalidLimits(format!(
                "environment '{}', hardware group '{}': {}",
                environment, hw_group, reason
            ))
        };

        for (test_id, box_name, entry) in limits.iter() {
            let test = config
                .test(test_id)
                .ok_or_else(|| invalid(format!("unknown test '{}'", test_id)))?;

            let has_box = test.pipelines(environment).iter().any(|p| {
                store
                    .pipeline(&p.name)
                    .is_some_and(|pipeline| pipeline.find_box(box_name).is_some())
            });
            if !has_box {
                return Err(invalid(format!(
                    "test '{}' has no box '{}'",
                    test_id, box_name
                )));
            }

            let times = [
                ("time", entry.time),
                ("wall-time", entry.wall_time),
                ("extra-time", entry.extra_time),
            ];
            for (field, value) in times {
                if value.is_some_and(|v| !v.is_finite() || v < 0.0) {
                    return Err(invalid(format!(
                        "'{}' of box '{}' in test '{}' must be a non-negative number",
                        field, box_name, test_id
                    )));
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

    fn fixture() -> (ExerciseConfig, InMemoryPipelineStore) {
        let config = Loader::load_exercise_config(
            "tests:\n  t1:\n    environments:\n      linux:\n        pipelines: [{ name: run }]\n",
        )
        .unwrap();
        let mut store = InMemoryPipelineStore::new();
        store.insert(
            Loader::load_pipeline(
                "id: run\nboxes:\n  - { name: exec, type: elf-exec, ports-in: { binary-file: { value: bin } } }\n",
            )
            .unwrap(),
        );
        (config, store)
    }

    #[test]
    fn test_valid_limits() {
        let (config, store) = fixture();
        let limits = Loader::load_exercise_limits("t1:\n  exec: { time: 1.0 }\n").unwrap();
        ExerciseLimitsValidator::validate(&limits, &config, "linux", "group1", &store).unwrap();
    }

    #[test]
    fn test_unknown_test() {
        let (config, store) = fixture();
        let limits = Loader::load_exercise_limits("t9:\n  exec: { time: 1.0 }\n").unwrap();
        let err = ExerciseLimitsValidator::validate(&limits, &config, "linux", "group1", &store)
            .unwrap_err();
        assert!(err.to_string().contains("unknown test 't9'"));
    }

    #[test]
    fn test_unknown_box() {
        let (config, store) = fixture();
        let limits = Loader::load_exercise_limits("t1:\n  gcc: { memory: 1 }\n").unwrap();
        assert!(matches!(
            ExerciseLimitsValidator::validate(&limits, &config, "linux", "group1", &store),
            Err(CompileError::InvalidLimits(_))
        ));
    }

    #[test]
    fn test_negative_time() {
        let (config, store) = fixture();
        let limits = Loader::load_exercise_limits("t1:\n  exec: { wall-time: -2 }\n").unwrap();
        let err = ExerciseLimitsValidator::validate(&limits, &config, "linux", "group1", &store)
            .unwrap_err();
        assert!(err.to_string().contains("wall-time"));
    }
}
