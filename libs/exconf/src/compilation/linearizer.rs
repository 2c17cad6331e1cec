// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Cycle detection and topological ordering.

use crate::error::{CompileError, Result};

use super::{NodeId, PortGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    /// On the current DFS path.
    Visited,
    Finished,
}

/// Per-run node marks. Owned by one traversal, never stored on nodes.
#[derive(Debug)]
struct TraversalState {
    marks: Vec<Mark>,
}

impl TraversalState {
    fn new(len: usize) -> Self {
        Self {
            marks: vec![Mark::Unvisited; len],
        }
    }

    fn mark(&self, id: NodeId) -> Mark {
        self.marks[id.index()]
    }

    fn set(&mut self, id: NodeId, mark: Mark) {
        self.marks[id.index()] = mark;
    }
}

struct Frame {
    node: NodeId,
    parents: Vec<NodeId>,
    next: usize,
}

impl Frame {
    fn new(graph: &PortGraph, node: NodeId) -> Self {
        Self {
            node,
            parents: graph.node(node).parent_ids(),
            next: 0,
        }
    }
}

pub struct Linearizer;

impl Linearizer {
    /// Post-order DFS along parent edges, starting from every node in
    /// creation order. Parents always precede their children and the
    /// result depends only on creation order.
    pub fn linearize(graph: &PortGraph) -> Result<Vec<NodeId>> {
        let mut state = TraversalState::new(graph.len());
        let mut order = Vec::with_capacity(graph.len());

        for root in graph.ids() {
            if state.mark(root) != Mark::Unvisited {
                continue;
            }

            state.set(root, Mark::Visited);
            let mut stack = vec![Frame::new(graph, root)];

            while let Some(frame) = stack.last_mut() {
                let node = frame.node;
                let parent = frame.parents.get(frame.next).copied();
                frame.next += 1;

                match parent {
                    Some(parent) => match state.mark(parent) {
                        Mark::Unvisited => {
                            state.set(parent, Mark::Visited);
                            stack.push(Frame::new(graph, parent));
                        }
                        Mark::Visited => return Err(Self::cycle(graph, parent)),
                        Mark::Finished => {}
                    },
                    None => {
                        state.set(node, Mark::Finished);
                        order.push(node);
                        stack.pop();
                    }
                }
            }
        }

        Ok(order)
    }

    fn cycle(graph: &PortGraph, id: NodeId) -> CompileError {
        let node = graph.node(id);
        tracing::debug!("Back edge reached {} ({})", id, node.box_name());
        CompileError::CyclicPipeline {
            box_name: node.box_name().to_string(),
            pipeline: node.pipeline_id.clone(),
            test: node.single_test().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compilation::PortNode;
    use crate::pipeline::{BoxKind, PipelineBox};
    use crate::variables::ScopeChain;

    fn graph_of(names: &[&str]) -> (PortGraph, Vec<NodeId>) {
        let mut graph = PortGraph::new();
        let ids = names
            .iter()
            .map(|name| {
                graph.add_node(PortNode::new(
                    PipelineBox::new(*name, BoxKind::ElfExec),
                    "t1",
                    "p",
                    ScopeChain::default(),
                ))
            })
            .collect();
        (graph, ids)
    }

    #[test]
    fn test_parents_come_first() {
        let (mut graph, ids) = graph_of(&["run", "judge", "compile"]);
        graph.add_edge(ids[2], "binary-file", ids[0], "binary-file");
        graph.add_edge(ids[0], "stdout", ids[1], "stdin");

        let order = Linearizer::linearize(&graph).unwrap();
        assert_eq!(order, vec![ids[2], ids[0], ids[1]]);
    }

    #[test]
    fn test_independent_nodes_keep_creation_order() {
        let (graph, ids) = graph_of(&["a", "b", "c"]);
        assert_eq!(Linearizer::linearize(&graph).unwrap(), ids);
    }

    #[test]
    fn test_diamond_visits_shared_parent_once() {
        let (mut graph, ids) = graph_of(&["src", "left", "right", "sink"]);
        graph.add_edge(ids[0], "stdout", ids[1], "stdin");
        graph.add_edge(ids[0], "stdout", ids[2], "stdin");
        graph.add_edge(ids[1], "stdout", ids[3], "stdin");
        graph.add_edge(ids[2], "output-file", ids[3], "input-files");

        let order = Linearizer::linearize(&graph).unwrap();
        assert_eq!(order.len(), 4);
        assert_eq!(order[0], ids[0]);
        assert_eq!(order[3], ids[3]);
    }

    #[test]
    fn test_cycle_is_reported() {
        let (mut graph, ids) = graph_of(&["a", "b"]);
        graph.add_edge(ids[0], "stdout", ids[1], "stdin");
        graph.add_edge(ids[1], "stdout", ids[0], "stdin");

        let err = Linearizer::linearize(&graph).unwrap_err();
        assert!(matches!(
            err,
            CompileError::CyclicPipeline { ref pipeline, ref test, .. }
                if pipeline == "p" && test.as_deref() == Some("t1")
        ));
    }

    #[test]
    fn test_self_loop_is_cycle() {
        let (mut graph, ids) = graph_of(&["a"]);
        graph.add_edge(ids[0], "stdout", ids[0], "stdin");
        assert!(Linearizer::linearize(&graph).is_err());
    }
}
