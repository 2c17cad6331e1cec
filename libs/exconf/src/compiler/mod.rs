// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Compiler facade and its collaborators.

#[allow(clippy::module_inception)]
mod compiler;
mod exercise_source;
mod pipeline_store;

pub use compiler::{CompileOptions, Compiler, RuntimeEnvironment};
pub use exercise_source::{ExerciseSource, InMemoryExercise};
pub use pipeline_store::{InMemoryPipelineStore, PipelineStore};
