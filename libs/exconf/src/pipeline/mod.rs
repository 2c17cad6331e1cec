// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Pipelines: boxes from the catalog wired together through variable names.

pub mod boxes;
#[allow(clippy::module_inception)]
mod pipeline;
mod pipeline_box;
mod port;

pub use boxes::{BoxCompileContext, BoxKind};
pub use pipeline::Pipeline;
pub use pipeline_box::{BoxMeta, PipelineBox};
pub(crate) use pipeline_box::null_as_default;
pub use port::{BoundPort, PathRole, Port, PortDirection, PortMeta, PortRecord};
