// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Graph stages of a compilation: build, linearize, deduplicate, lower.

mod boxes_compiler;
mod builder;
mod exercise_config_compiler;
mod linearizer;
mod node;
mod optimizer;

pub use boxes_compiler::{BoxesCompiler, SHARED_TASK_PREFIX};
pub use builder::GraphBuilder;
pub use exercise_config_compiler::{
    CompilationParams, CompilePhase, CompileResult, CompileStats, ExerciseConfigCompiler,
};
pub use linearizer::Linearizer;
pub use node::{Consumer, NodeId, ParentLink, PortGraph, PortNode};
pub use optimizer::{RootedTree, TestBoxesOptimizer};
