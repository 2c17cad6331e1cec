// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Compiles exercise test configurations (pipelines of boxes wired through
//! variables) into linear job configurations for sandboxed workers.
//!
//! ```text
//! exercise config + environment + limits
//!     -> validation
//!     -> graph build -> cycle check -> cross-test folding -> lowering
//!     -> JobConfig
//! ```

#![allow(clippy::type_complexity)] // Signature tuples are clear in context

pub mod compilation;
pub mod compiler;
pub mod error;
pub mod exercise;
pub mod job_config;
pub mod loader;
pub mod pipeline;
pub mod settings;
pub mod validation;
pub mod variables;

pub use compiler::{
    CompileOptions, Compiler, ExerciseSource, InMemoryExercise, InMemoryPipelineStore,
    PipelineStore, RuntimeEnvironment,
};
pub use error::{CompileError, Result};
pub use exercise::{ExerciseConfig, ExerciseLimits, Test};
pub use job_config::{JobConfig, JobId, JobType, Limits, SandboxConfig, Task, TaskType};
pub use loader::Loader;
pub use pipeline::{BoxKind, Pipeline, PipelineBox};
pub use settings::CompilerSettings;
pub use validation::Validator;
pub use variables::{Variable, VariableType, VariablesTable};
