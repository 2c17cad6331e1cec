// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::compiler::PipelineStore;
use crate::error::Result;
use crate::exercise::{ExerciseConfig, ExerciseLimits};
use crate::job_config::Task;
use crate::settings::CompilerSettings;
use crate::variables::VariablesTable;

use super::{BoxesCompiler, GraphBuilder, Linearizer, RootedTree, TestBoxesOptimizer};

/// Inputs of one compilation, already loaded and validated.
#[derive(Clone, Copy)]
pub struct CompilationParams<'a> {
    pub config: &'a ExerciseConfig,
    pub environment: &'a str,
    pub environment_variables: &'a Arc<VariablesTable>,
    pub store: &'a dyn PipelineStore,
    /// Hardware group -> exercise limits.
    pub limits: &'a BTreeMap<String, ExerciseLimits>,
    pub settings: &'a CompilerSettings,
}

/// Phase of the graph pipeline, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompilePhase {
    Build,
    Linearize,
    Optimize,
    Lower,
}

impl CompilePhase {
    pub const ALL: [CompilePhase; 4] = [
        CompilePhase::Build,
        CompilePhase::Linearize,
        CompilePhase::Optimize,
        CompilePhase::Lower,
    ];

    pub fn number(self) -> u8 {
        match self {
            Self::Build => 1,
            Self::Linearize => 2,
            Self::Optimize => 3,
            Self::Lower => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Build => "BUILD",
            Self::Linearize => "LINEARIZE",
            Self::Optimize => "OPTIMIZE",
            Self::Lower => "LOWER",
        }
    }
}

impl fmt::Display for CompilePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Phase {}: {}", self.number(), self.name())
    }
}

/// Counters of a successful compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileStats {
    /// Box instances before deduplication.
    pub nodes: usize,
    /// Instances merged into an equivalent one.
    pub folded: usize,
    pub tasks: usize,
}

impl fmt::Display for CompileStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CompileStats {{ {} nodes, {} folded, {} tasks }}",
            self.nodes, self.folded, self.tasks
        )
    }
}

/// Ordered tasks of a compilation.
#[derive(Debug, Clone)]
pub struct CompileResult {
    pub tasks: Vec<Task>,
    pub stats: CompileStats,
}

/// Runs build, cycle check, deduplication and lowering in that order.
pub struct ExerciseConfigCompiler;

impl ExerciseConfigCompiler {
    /// Deduplicated graph of the exercise, before lowering.
    pub fn build_tree(params: &CompilationParams<'_>) -> Result<(RootedTree, usize)> {
        tracing::debug!("[{}]", CompilePhase::Build);
        let graph = GraphBuilder::new(
            params.config,
            params.environment,
            params.environment_variables.clone(),
            params.store,
            params.limits,
        )
        .build()?;

        tracing::debug!("[{}]", CompilePhase::Linearize);
        let order = Linearizer::linearize(&graph)?;

        tracing::debug!("[{}]", CompilePhase::Optimize);
        let tree = TestBoxesOptimizer::optimize(&graph, &order)?;
        Ok((tree, graph.len()))
    }

    pub fn compile(params: &CompilationParams<'_>) -> Result<CompileResult> {
        let (tree, nodes) = Self::build_tree(params)?;

        tracing::debug!("[{}]", CompilePhase::Lower);
        let tasks = BoxesCompiler::new(params.settings).compile(&tree)?;

        let stats = CompileStats {
            nodes,
            folded: tree.folded(),
            tasks: tasks.len(),
        };
        Ok(CompileResult { tasks, stats })
    }
}
