// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Cross-test deduplication of identical upstream computations.

use ahash::AHashMap;

use crate::error::Result;
use crate::pipeline::{BoundPort, BoxKind, PathRole};
use crate::variables::{VariableType, VariableValue};

use super::{Linearizer, NodeId, PortGraph, PortNode};

/// Port binding reduced to what reaches the emitted command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PortValue {
    name: &'static str,
    role: PathRole,
    value: Option<(VariableType, VariableValue)>,
}

impl From<&BoundPort> for PortValue {
    fn from(port: &BoundPort) -> Self {
        Self {
            name: port.name,
            role: port.role,
            value: port
                .variable
                .as_ref()
                .map(|v| (v.var_type(), v.raw_value().clone())),
        }
    }
}

/// Canonical key of a node. Box names, pipeline ids and test ids are not
/// part of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct NodeSignature {
    kind: BoxKind,
    inputs: Vec<PortValue>,
    outputs: Vec<PortValue>,
    remote_origin: Option<VariableValue>,
    limits: Vec<(String, String)>,
    /// Canonical parent per input port, with the parent's output port.
    parents: Vec<(&'static str, NodeId, &'static str)>,
}

impl NodeSignature {
    fn of(node: &PortNode, parents: Vec<(&'static str, NodeId, &'static str)>) -> Self {
        let kind = node.pipeline_box.kind();
        let limits = if kind.uses_limits() {
            node.limits
                .iter()
                .map(|(group, limits)| (group.clone(), limits.canonical()))
                .collect()
        } else {
            Vec::new()
        };

        Self {
            kind,
            inputs: node.inputs.iter().map(PortValue::from).collect(),
            outputs: node.outputs.iter().map(PortValue::from).collect(),
            remote_origin: node.remote_origin.as_ref().map(|v| v.raw_value().clone()),
            limits,
            parents,
        }
    }
}

/// Deduplicated graph in topological order. Shared nodes list every
/// consumer that folded into them.
#[derive(Debug, Clone)]
pub struct RootedTree {
    graph: PortGraph,
    order: Vec<NodeId>,
    folded: usize,
}

impl RootedTree {
    pub fn graph(&self) -> &PortGraph {
        &self.graph
    }

    /// Node ids, parents before children.
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    /// Nodes without parents.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order
            .iter()
            .copied()
            .filter(|id| self.graph.node(*id).parents.is_empty())
    }

    /// Number of source nodes merged into an earlier equivalent.
    pub fn folded(&self) -> usize {
        self.folded
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }
}

pub struct TestBoxesOptimizer;

impl TestBoxesOptimizer {
    /// Fold nodes with equal signatures, upstream first. `order` must be a
    /// topological order of `graph`.
    pub fn optimize(graph: &PortGraph, order: &[NodeId]) -> Result<RootedTree> {
        let mut tree = PortGraph::new();
        let mut canonical: AHashMap<NodeId, NodeId> = AHashMap::with_capacity(graph.len());
        let mut signatures: AHashMap<NodeSignature, NodeId> = AHashMap::new();
        let mut folded = 0;

        for &id in order {
            let node = graph.node(id);
            let parents: Vec<_> = node
                .parents
                .iter()
                .map(|(input_port, link)| {
                    let parent = canonical.get(&link.node).copied().unwrap_or(link.node);
                    (*input_port, parent, link.output_port)
                })
                .collect();

            let signature = NodeSignature::of(node, parents.clone());
            if let Some(&existing) = signatures.get(&signature) {
                tracing::debug!(
                    "Folding {}/{}/{} into {}",
                    node.test_id,
                    node.pipeline_id,
                    node.box_name(),
                    existing
                );
                let shared = tree.node_mut(existing);
                for consumer in &node.consumers {
                    shared.add_consumer(consumer.clone());
                }
                canonical.insert(id, existing);
                folded += 1;
                continue;
            }

            let mut copy = node.clone();
            copy.parents.clear();
            copy.children.clear();
            copy.children_by_port.clear();
            let new_id = tree.add_node(copy);
            for (input_port, parent, output_port) in parents {
                tree.add_edge(parent, output_port, new_id, input_port);
            }
            signatures.insert(signature, new_id);
            canonical.insert(id, new_id);
        }

        let order = Linearizer::linearize(&tree)?;
        Ok(RootedTree {
            graph: tree,
            order,
            folded,
        })
    }
}
