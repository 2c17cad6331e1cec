// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Instantiates every pipeline of every test as nodes and wires them.

use ahash::AHashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::compiler::PipelineStore;
use crate::error::{CompileError, Result};
use crate::exercise::{ExerciseConfig, ExerciseLimits, PipelineVariables};
use crate::job_config::Limits;
use crate::pipeline::{BoundPort, Pipeline, PipelineBox, Port};
use crate::variables::{ScopeChain, Variable, VariableType, VariablesTable};

use super::{NodeId, PortGraph, PortNode};

/// Builds the [`PortGraph`] of one exercise in one runtime environment.
pub struct GraphBuilder<'a> {
    config: &'a ExerciseConfig,
    environment: &'a str,
    environment_variables: Arc<VariablesTable>,
    exercise_variables: Arc<VariablesTable>,
    store: &'a dyn PipelineStore,
    /// Hardware group -> exercise limits.
    limits: &'a BTreeMap<String, ExerciseLimits>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(
        config: &'a ExerciseConfig,
        environment: &'a str,
        environment_variables: Arc<VariablesTable>,
        store: &'a dyn PipelineStore,
        limits: &'a BTreeMap<String, ExerciseLimits>,
    ) -> Self {
        Self {
            config,
            environment,
            environment_variables,
            exercise_variables: Arc::new(config.variables().clone()),
            store,
            limits,
        }
    }

    /// One node per box, in test order, then pipeline order, then box order.
    pub fn build(&self) -> Result<PortGraph> {
        let mut graph = PortGraph::new();

        for test in self.config.tests() {
            for instance in test.pipelines(self.environment) {
                let pipeline = self.store.pipeline(&instance.name).ok_or_else(|| {
                    CompileError::UnknownPipelineReference {
                        pipeline: instance.name.clone(),
                        test: test.id().to_string(),
                    }
                })?;
                self.add_instance(&mut graph, test.id(), &pipeline, instance)?;
            }
        }

        tracing::debug!(
            "Built graph for environment '{}': {} nodes, {} edges",
            self.environment,
            graph.len(),
            graph.edge_count()
        );
        Ok(graph)
    }

    fn scopes(&self, pipeline: &Pipeline, instance: &PipelineVariables) -> ScopeChain {
        ScopeChain::new(
            Arc::new(instance.variables.clone()),
            self.environment_variables.clone(),
            self.exercise_variables.clone(),
        )
        .with_pipeline_defaults(pipeline.variables().clone())
    }

    fn add_instance(
        &self,
        graph: &mut PortGraph,
        test_id: &str,
        pipeline: &Pipeline,
        instance: &PipelineVariables,
    ) -> Result<()> {
        let scopes = self.scopes(pipeline, instance);
        let ambiguous = |variable: &str, reason: &str| CompileError::AmbiguousBinding {
            pipeline: pipeline.id().to_string(),
            variable: variable.to_string(),
            reason: reason.to_string(),
        };

        // Outputs first so every input can find its producer.
        let mut producers: AHashMap<&str, (NodeId, &'static str)> = AHashMap::new();
        let mut nodes = Vec::with_capacity(pipeline.boxes().len());
        for pipeline_box in pipeline.boxes() {
            let mut node = PortNode::new(pipeline_box.clone(), test_id, pipeline.id(), scopes.clone());
            node.limits = self.box_limits(test_id, pipeline_box);
            node.outputs = self.resolve_outputs(pipeline, pipeline_box, &scopes, &mut node.remote_origin)?;

            let id = graph.add_node(node);
            for port in pipeline_box.outputs() {
                let Some(variable) = port.variable() else {
                    continue;
                };
                if producers.insert(variable, (id, port.name())).is_some() {
                    return Err(ambiguous(variable, "produced by more than one output port"));
                }
            }
            nodes.push(id);
        }

        let mut consumed: AHashMap<&str, usize> = AHashMap::new();
        for (pipeline_box, &id) in pipeline.boxes().iter().zip(&nodes) {
            let mut inputs = Vec::with_capacity(pipeline_box.inputs().len());
            for port in pipeline_box.inputs() {
                let Some(variable) = port.variable() else {
                    if port.is_required() {
                        return Err(CompileError::UnboundPort {
                            pipeline: pipeline.id().to_string(),
                            box_name: pipeline_box.name().to_string(),
                            port: port.name().to_string(),
                        });
                    }
                    inputs.push(BoundPort::unbound(port.meta()));
                    continue;
                };

                let bound = match producers.get(variable) {
                    Some(&(parent, output_port)) => {
                        graph.add_edge(parent, output_port, id, port.name());
                        graph
                            .node(parent)
                            .outputs
                            .iter()
                            .find(|p| p.name == output_port)
                            .and_then(|p| p.variable.clone())
                    }
                    None => {
                        let count = consumed.entry(variable).or_default();
                        *count += 1;
                        if *count > 1 {
                            return Err(ambiguous(
                                variable,
                                "consumed by more than one input port without a producer",
                            ));
                        }
                        let context = port_context(pipeline, pipeline_box, port);
                        Some(scopes.resolve_value(variable, &context)?)
                    }
                };

                inputs.push(BoundPort {
                    name: port.name(),
                    role: port.role(),
                    variable: bound,
                });
            }
            graph.node_mut(id).inputs = inputs;
        }

        Ok(())
    }

    fn resolve_outputs(
        &self,
        pipeline: &Pipeline,
        pipeline_box: &PipelineBox,
        scopes: &ScopeChain,
        remote_origin: &mut Option<Variable>,
    ) -> Result<Vec<BoundPort>> {
        pipeline_box
            .outputs()
            .iter()
            .map(|port| {
                let Some(variable) = port.variable() else {
                    if port.is_required() {
                        return Err(CompileError::UnboundPort {
                            pipeline: pipeline.id().to_string(),
                            box_name: pipeline_box.name().to_string(),
                            port: port.name().to_string(),
                        });
                    }
                    return Ok(BoundPort::unbound(port.meta()));
                };

                let context = port_context(pipeline, pipeline_box, port);
                let resolved = if pipeline_box.kind().is_data_source() {
                    let (local, remote) = Self::resolve_data_source(scopes, variable, &context)?;
                    *remote_origin = remote;
                    local
                } else {
                    scopes.resolve_value(variable, &context)?
                };

                Ok(BoundPort {
                    name: port.name(),
                    role: port.role(),
                    variable: Some(resolved),
                })
            })
            .collect()
    }

    /// Local value of a data source and its remote origin, if any.
    ///
    /// The origin is the remote-file declaration the variable resolves to,
    /// the remote file its reference points at, or a remote-file variable
    /// of the same name in the environment or exercise scope. In the first
    /// two cases the fetched files keep the remote base names.
    fn resolve_data_source(
        scopes: &ScopeChain,
        variable: &str,
        context: &str,
    ) -> Result<(Variable, Option<Variable>)> {
        let local = scopes.resolve(variable, context)?;

        if local.variable.is_remote_file() {
            let remote = scopes.dereference(local, context)?;
            return Ok((Self::fetched_files(variable, &remote)?, Some(remote)));
        }

        if let Some(remote) = scopes.remote_target(local, context)? {
            return Ok((Self::fetched_files(variable, &remote)?, Some(remote)));
        }

        let remote = match scopes.lookup_outer(variable) {
            Some(found) if found.variable.is_remote_file() => Some(scopes.dereference(found, context)?),
            _ => None,
        };
        Ok((scopes.dereference(local, context)?, remote))
    }

    /// Local file variable named after the base names of `remote`.
    fn fetched_files(name: &str, remote: &Variable) -> Result<Variable> {
        let names: Vec<String> = remote
            .value()
            .to_vec()
            .iter()
            .map(|value| base_name(value).to_string())
            .collect();
        if remote.is_array() {
            Variable::array(name, VariableType::FileArray, names)
        } else {
            let file = names.into_iter().next().unwrap_or_default();
            Variable::scalar(name, VariableType::File, file)
        }
    }

    /// Limits of an execution box per hardware group; groups without an
    /// entry stay undefined.
    fn box_limits(&self, test_id: &str, pipeline_box: &PipelineBox) -> BTreeMap<String, Limits> {
        if !pipeline_box.kind().uses_limits() {
            return BTreeMap::new();
        }
        self.limits
            .iter()
            .filter_map(|(hw_group, limits)| {
                limits
                    .get(test_id, pipeline_box.name())
                    .map(|l| (hw_group.clone(), l.for_hw_group(hw_group)))
            })
            .collect()
    }
}

fn port_context(pipeline: &Pipeline, pipeline_box: &PipelineBox, port: &Port) -> String {
    format!(
        "port '{}' of box '{}' in pipeline '{}'",
        port.name(),
        pipeline_box.name(),
        pipeline.id()
    )
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
