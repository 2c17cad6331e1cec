// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::LazyLock;

use super::{BoxCompileContext, BoxPorts};
use crate::error::Result;
use crate::job_config::Task;
use crate::pipeline::{PathRole, PortMeta};
use crate::variables::VariableType;

pub const IN_PORT: &str = "in";
pub const DEFAULT_NAME: &str = "Result Directory";

pub(super) static PORTS: LazyLock<BoxPorts> = LazyLock::new(|| BoxPorts {
    inputs: vec![PortMeta::required(IN_PORT, VariableType::File, PathRole::Result)],
    outputs: Vec::new(),
});

pub(super) fn compile(ctx: &BoxCompileContext<'_>) -> Result<Vec<Task>> {
    let directory = ctx.input_scalar(IN_PORT)?;
    Ok(vec![Task::command(ctx.settings.binaries.mkdir.clone(), [directory])])
}
