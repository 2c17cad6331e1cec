// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Arena of box instances with id-keyed adjacency.

use std::collections::BTreeMap;
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};

use crate::job_config::Limits;
use crate::pipeline::{BoundPort, PipelineBox};
use crate::variables::{ScopeChain, Variable};

/// Stable handle of a node inside one [`PortGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Producer side of a wired input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParentLink {
    pub node: NodeId,
    pub output_port: &'static str,
}

/// Test and pipeline instance that uses a node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Consumer {
    pub test_id: String,
    pub pipeline_id: String,
}

/// One box instantiated for one pipeline of one test.
#[derive(Debug, Clone)]
pub struct PortNode {
    pub pipeline_box: PipelineBox,
    pub test_id: String,
    pub pipeline_id: String,
    pub scopes: ScopeChain,
    /// Ports in catalog order with their variables resolved and dereferenced.
    pub inputs: Vec<BoundPort>,
    pub outputs: Vec<BoundPort>,
    pub remote_origin: Option<Variable>,
    /// Hardware group -> limits of this box instance.
    pub limits: BTreeMap<String, Limits>,
    /// Producer of each wired input port, keyed by the input port name.
    pub parents: BTreeMap<&'static str, ParentLink>,
    /// Consumers of each wired output port, keyed by the output port name.
    pub children_by_port: BTreeMap<&'static str, Vec<NodeId>>,
    pub children: Vec<NodeId>,
    pub consumers: Vec<Consumer>,
}

impl PortNode {
    pub fn new(
        pipeline_box: PipelineBox,
        test_id: impl Into<String>,
        pipeline_id: impl Into<String>,
        scopes: ScopeChain,
    ) -> Self {
        let test_id = test_id.into();
        let pipeline_id = pipeline_id.into();
        Self {
            inputs: pipeline_box
                .kind()
                .input_ports()
                .iter()
                .map(BoundPort::unbound)
                .collect(),
            outputs: pipeline_box
                .kind()
                .output_ports()
                .iter()
                .map(BoundPort::unbound)
                .collect(),
            consumers: vec![Consumer {
                test_id: test_id.clone(),
                pipeline_id: pipeline_id.clone(),
            }],
            pipeline_box,
            test_id,
            pipeline_id,
            scopes,
            remote_origin: None,
            limits: BTreeMap::new(),
            parents: BTreeMap::new(),
            children_by_port: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn box_name(&self) -> &str {
        self.pipeline_box.name()
    }

    /// Distinct parents in creation order.
    pub fn parent_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.parents.values().map(|link| link.node).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Add a consumer unless it is already recorded.
    pub fn add_consumer(&mut self, consumer: Consumer) {
        if !self.consumers.contains(&consumer) {
            self.consumers.push(consumer);
        }
    }

    /// The single test using this node, if only one does.
    pub fn single_test(&self) -> Option<&str> {
        let first = self.consumers.first()?;
        self.consumers
            .iter()
            .all(|c| c.test_id == first.test_id)
            .then_some(first.test_id.as_str())
    }
}

/// Arena of [`PortNode`]s addressed by [`NodeId`].
#[derive(Debug, Clone, Default)]
pub struct PortGraph {
    nodes: Vec<PortNode>,
}

impl PortGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: PortNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Wire `parent.output_port` to `child.input_port`.
    pub fn add_edge(
        &mut self,
        parent: NodeId,
        output_port: &'static str,
        child: NodeId,
        input_port: &'static str,
    ) {
        self.nodes[child.0].parents.insert(
            input_port,
            ParentLink {
                node: parent,
                output_port,
            },
        );

        let node = &mut self.nodes[parent.0];
        node.children_by_port
            .entry(output_port)
            .or_default()
            .push(child);
        if !node.children.contains(&child) {
            node.children.push(child);
        }
    }

    pub fn node(&self, id: NodeId) -> &PortNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut PortNode {
        &mut self.nodes[id.0]
    }

    /// Ids in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + use<> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &PortNode)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.parents.len()).sum()
    }

    /// Graphviz rendering, one vertex per node labelled
    /// `test/pipeline/box`, edges labelled `output -> input`.
    pub fn to_dot(&self) -> String {
        use petgraph::dot::Dot;

        let mut graph: DiGraph<String, String> = DiGraph::new();
        let indices: Vec<NodeIndex> = self
            .nodes
            .iter()
            .map(|n| {
                let test = n.single_test().unwrap_or("shared");
                graph.add_node(format!("{}/{}/{}", test, n.pipeline_id, n.box_name()))
            })
            .collect();

        for (child, node) in self.iter() {
            for (input_port, link) in &node.parents {
                graph.add_edge(
                    indices[link.node.0],
                    indices[child.0],
                    format!("{} -> {}", link.output_port, input_port),
                );
            }
        }

        format!("{}", Dot::new(&graph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::BoxKind;

    fn node(name: &str, kind: BoxKind, test: &str) -> PortNode {
        PortNode::new(PipelineBox::new(name, kind), test, "p", ScopeChain::default())
    }

    #[test]
    fn test_edges_are_keyed_by_port() {
        let mut graph = PortGraph::new();
        let compile = graph.add_node(node("compile", BoxKind::Gcc, "t1"));
        let run = graph.add_node(node("run", BoxKind::ElfExec, "t1"));
        let other = graph.add_node(node("run2", BoxKind::ElfExec, "t1"));
        graph.add_edge(compile, "binary-file", run, "binary-file");
        graph.add_edge(compile, "binary-file", other, "binary-file");

        assert_eq!(graph.node(run).parents["binary-file"].node, compile);
        assert_eq!(graph.node(compile).children, vec![run, other]);
        assert_eq!(graph.node(compile).children_by_port["binary-file"].len(), 2);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.node(run).parent_ids(), vec![compile]);
    }

    #[test]
    fn test_single_test_consumer() {
        let mut n = node("compile", BoxKind::Gcc, "t1");
        assert_eq!(n.single_test(), Some("t1"));
        n.add_consumer(Consumer {
            test_id: "t1".into(),
            pipeline_id: "other".into(),
        });
        assert_eq!(n.single_test(), Some("t1"));
        n.add_consumer(Consumer {
            test_id: "t2".into(),
            pipeline_id: "p".into(),
        });
        assert_eq!(n.single_test(), None);
        assert_eq!(n.consumers.len(), 3);
    }

    #[test]
    fn test_dot_export() {
        let mut graph = PortGraph::new();
        let compile = graph.add_node(node("compile", BoxKind::Gcc, "t1"));
        let run = graph.add_node(node("run", BoxKind::ElfExec, "t1"));
        graph.add_edge(compile, "binary-file", run, "binary-file");

        let dot = graph.to_dot();
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("t1/p/compile"));
        assert!(dot.contains("binary-file -> binary-file"));
    }
}
