// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::LazyLock;

use super::{BoxCompileContext, BoxPorts, execution};
use crate::error::Result;
use crate::job_config::{Task, TaskType};
use crate::pipeline::{PathRole, PortMeta};
use crate::variables::VariableType;

pub const ASSEMBLY_PORT: &str = "assembly";
pub const DEFAULT_NAME: &str = "Mono Execution";

pub(super) static PORTS: LazyLock<BoxPorts> = LazyLock::new(|| BoxPorts {
    inputs: vec![
        execution::ARGS,
        execution::STDIN,
        execution::INPUT_FILES,
        PortMeta::required(ASSEMBLY_PORT, VariableType::File, PathRole::Evaluation),
    ],
    outputs: execution::OUTPUTS.to_vec(),
});

pub(super) fn compile(ctx: &BoxCompileContext<'_>) -> Result<Vec<Task>> {
    let mut args = vec![ctx.input_scalar(ASSEMBLY_PORT)?];
    args.extend(ctx.input_values(execution::ARGS_PORT));

    let task = Task::command(ctx.settings.binaries.mono.clone(), args)
        .with_type(TaskType::Execution)
        .with_sandbox(execution::sandbox(ctx));

    Ok(vec![task])
}
