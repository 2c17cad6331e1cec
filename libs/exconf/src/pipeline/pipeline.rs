// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use super::pipeline_box::null_as_default;
use super::{BoxMeta, PipelineBox, PortDirection};
use crate::error::{CompileError, Result};
use crate::variables::VariablesTable;

/// Pipeline as written in its document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PipelineRecord {
    id: String,
    #[serde(default)]
    variables: VariablesTable,
    #[serde(default, deserialize_with = "null_as_default")]
    boxes: Vec<BoxMeta>,
}

/// Reusable wiring of boxes through named variables.
///
/// Read-only once loaded; shared between every test that instantiates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PipelineRecord", into = "PipelineRecord")]
pub struct Pipeline {
    id: String,
    variables: Arc<VariablesTable>,
    boxes: Vec<PipelineBox>,
}

impl Pipeline {
    /// Create a pipeline. Box names must be unique.
    pub fn new(
        id: impl Into<String>,
        variables: VariablesTable,
        boxes: Vec<PipelineBox>,
    ) -> Result<Self> {
        let id = id.into();
        let mut seen = HashSet::new();
        for b in &boxes {
            if !seen.insert(b.name()) {
                return Err(CompileError::parsing(
                    format!("pipeline '{}'", id),
                    format!("box name '{}' is used more than once", b.name()),
                ));
            }
        }

        Ok(Self {
            id,
            variables: Arc::new(variables),
            boxes,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Variables declared by the pipeline itself.
    pub fn variables(&self) -> &Arc<VariablesTable> {
        &self.variables
    }

    /// Boxes in declaration order.
    pub fn boxes(&self) -> &[PipelineBox] {
        &self.boxes
    }

    pub fn find_box(&self, name: &str) -> Option<&PipelineBox> {
        self.boxes.iter().find(|b| b.name() == name)
    }

    /// Boxes with a port of the given direction bound to `variable`,
    /// with the port name.
    pub fn ports_bound_to<'a>(
        &'a self,
        variable: &'a str,
        direction: PortDirection,
    ) -> impl Iterator<Item = (&'a PipelineBox, &'static str)> + 'a {
        self.boxes.iter().flat_map(move |b| {
            b.ports(direction)
                .iter()
                .filter(move |p| p.variable() == Some(variable))
                .map(move |p| (b, p.name()))
        })
    }

    /// Every variable name bound to some port, in first-use order.
    pub fn bound_variables(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.boxes
            .iter()
            .flat_map(|b| b.inputs().iter().chain(b.outputs()))
            .filter_map(|p| p.variable())
            .filter(|name| seen.insert(*name))
            .collect()
    }
}

impl TryFrom<PipelineRecord> for Pipeline {
    type Error = CompileError;

    fn try_from(record: PipelineRecord) -> Result<Self> {
        let boxes = record
            .boxes
            .iter()
            .map(PipelineBox::from_meta)
            .collect::<Result<Vec<_>>>()
            .map_err(|e| match e {
                CompileError::ConfigParsing { what, reason } => CompileError::ConfigParsing {
                    what: format!("{} in pipeline '{}'", what, record.id),
                    reason,
                },
                other => other,
            })?;
        Self::new(record.id, record.variables, boxes)
    }
}

impl From<Pipeline> for PipelineRecord {
    fn from(pipeline: Pipeline) -> Self {
        Self {
            boxes: pipeline.boxes.iter().map(PipelineBox::to_meta).collect(),
            variables: Arc::unwrap_or_clone(pipeline.variables),
            id: pipeline.id,
        }
    }
}
