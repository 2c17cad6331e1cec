// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::LazyLock;

use super::{BoxCompileContext, BoxPorts};
use crate::error::Result;
use crate::job_config::{Task, TaskType};
use crate::pipeline::{PathRole, PortMeta};
use crate::variables::VariableType;

pub const SOURCE_FILE_PORT: &str = "source-file";
pub const BINARY_FILE_PORT: &str = "binary-file";
pub const DEFAULT_NAME: &str = "FreePascal Compilation";

pub(super) static PORTS: LazyLock<BoxPorts> = LazyLock::new(|| BoxPorts {
    inputs: vec![PortMeta::required(
        SOURCE_FILE_PORT,
        VariableType::File,
        PathRole::Evaluation,
    )],
    outputs: vec![PortMeta::required(
        BINARY_FILE_PORT,
        VariableType::File,
        PathRole::Evaluation,
    )],
});

pub(super) fn compile(ctx: &BoxCompileContext<'_>) -> Result<Vec<Task>> {
    let source = ctx.input_scalar(SOURCE_FILE_PORT)?;
    // fpc takes the output name glued to the flag
    let output = format!("-o{}", ctx.output_scalar(BINARY_FILE_PORT)?);

    let task = Task::command(ctx.settings.binaries.fpc.clone(), [source, output])
        .with_type(TaskType::Initiation)
        .with_fatal_failure(true)
        .with_sandbox(ctx.sandbox().with_output(true));

    Ok(vec![task])
}
