// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Exercise configuration: tests, the pipelines they run per environment,
//! and per-box resource limits.

mod exercise_config;
mod exercise_limits;
mod ordered;
mod test_case;

pub use exercise_config::ExerciseConfig;
pub use exercise_limits::ExerciseLimits;
pub use test_case::{PipelineVariables, Test, TestEnvironment};
