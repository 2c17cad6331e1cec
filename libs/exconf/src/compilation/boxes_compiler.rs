// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Lowers the deduplicated tree to an ordered task list.

use ahash::AHashSet;

use crate::error::Result;
use crate::job_config::Task;
use crate::pipeline::BoxCompileContext;
use crate::settings::CompilerSettings;

use super::{PortNode, RootedTree};

/// Test id segment of tasks used by more than one test.
pub const SHARED_TASK_PREFIX: &str = "shared";

pub struct BoxesCompiler<'a> {
    settings: &'a CompilerSettings,
}

impl<'a> BoxesCompiler<'a> {
    pub fn new(settings: &'a CompilerSettings) -> Self {
        Self { settings }
    }

    /// Lower every node in tree order.
    ///
    /// A task depends on the tasks of its node's parents. A node that emits
    /// nothing passes its own dependencies on to its children.
    pub fn compile(&self, tree: &RootedTree) -> Result<Vec<Task>> {
        let graph = tree.graph();
        let mut exits: Vec<Vec<String>> = vec![Vec::new(); graph.len()];
        let mut used: AHashSet<String> = AHashSet::new();
        let mut tasks = Vec::new();

        for &id in tree.order() {
            let node = graph.node(id);
            let dependencies = Self::dependencies(node, &exits);

            let emitted = self.lower(node)?;
            if emitted.is_empty() {
                exits[id.index()] = dependencies;
                continue;
            }

            let base = Self::base_id(node);
            let numbered = emitted.len() > 1;
            let mut exit = Vec::with_capacity(emitted.len());
            for (n, mut task) in emitted.into_iter().enumerate() {
                let candidate = if numbered {
                    format!("{}.{}", base, n + 1)
                } else {
                    base.clone()
                };
                task.task_id = Self::unique(candidate, &mut used);
                task.test_id = node.single_test().map(str::to_string);
                task.dependencies = dependencies.clone();
                exit.push(task.task_id.clone());
                tasks.push(task);
            }

            tracing::debug!("Lowered {} '{}' to {} task(s)", id, node.box_name(), exit.len());
            exits[id.index()] = exit;
        }

        let count = tasks.len();
        for (position, task) in tasks.iter_mut().enumerate() {
            task.priority = u32::try_from(count - position).unwrap_or(u32::MAX);
        }

        Ok(tasks)
    }

    fn lower(&self, node: &PortNode) -> Result<Vec<Task>> {
        let ctx = BoxCompileContext {
            box_name: node.box_name(),
            kind: node.pipeline_box.kind(),
            inputs: &node.inputs,
            outputs: &node.outputs,
            remote_origin: node.remote_origin.as_ref(),
            limits: &node.limits,
            settings: self.settings,
        };
        node.pipeline_box.kind().compile(&ctx)
    }

    fn dependencies(node: &PortNode, exits: &[Vec<String>]) -> Vec<String> {
        let mut dependencies: Vec<String> = Vec::new();
        for parent in node.parent_ids() {
            for task_id in &exits[parent.index()] {
                if !dependencies.contains(task_id) {
                    dependencies.push(task_id.clone());
                }
            }
        }
        dependencies
    }

    fn base_id(node: &PortNode) -> String {
        format!(
            "{}.{}.{}",
            node.single_test().unwrap_or(SHARED_TASK_PREFIX),
            node.pipeline_id,
            node.box_name()
        )
    }

    /// First free id among `candidate`, `candidate.2`, `candidate.3`, ...
    fn unique(candidate: String, used: &mut AHashSet<String>) -> String {
        let mut id = candidate.clone();
        let mut n = 1;
        while used.contains(&id) {
            n += 1;
            id = format!("{}.{}", candidate, n);
        }
        used.insert(id.clone());
        id
    }
}
