// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::LazyLock;

use super::{BoxCompileContext, BoxPorts, execution};
use crate::error::Result;
use crate::job_config::{Task, TaskType};
use crate::pipeline::{PathRole, PortMeta};
use crate::variables::VariableType;

pub const BINARY_FILE_PORT: &str = "binary-file";
pub const DEFAULT_NAME: &str = "ELF Execution";

pub(super) static PORTS: LazyLock<BoxPorts> = LazyLock::new(|| BoxPorts {
    inputs: vec![
        PortMeta::required(BINARY_FILE_PORT, VariableType::File, PathRole::Evaluation),
        execution::ARGS,
        execution::STDIN,
        execution::INPUT_FILES,
    ],
    outputs: execution::OUTPUTS.to_vec(),
});

pub(super) fn compile(ctx: &BoxCompileContext<'_>) -> Result<Vec<Task>> {
    let binary = ctx.input_scalar(BINARY_FILE_PORT)?;
    let args = ctx.input_values(execution::ARGS_PORT);

    let task = Task::command(binary, args)
        .with_type(TaskType::Execution)
        .with_sandbox(execution::sandbox(ctx));

    Ok(vec![task])
}
