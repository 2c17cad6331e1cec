// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::LazyLock;

use super::{BoxCompileContext, BoxPorts};
use crate::error::Result;
use crate::job_config::{Task, TaskType};
use crate::pipeline::{PathRole, PortMeta};
use crate::variables::VariableType;

pub const SOURCE_FILES_PORT: &str = "source-files";
pub const EXTRA_FILES_PORT: &str = "extra-files";
pub const ARGS_PORT: &str = "args";
pub const BINARY_FILE_PORT: &str = "binary-file";
pub const DEFAULT_NAME: &str = "GCC Compilation";

pub(super) static PORTS: LazyLock<BoxPorts> = LazyLock::new(|| BoxPorts {
    inputs: vec![
        PortMeta::required(SOURCE_FILES_PORT, VariableType::FileArray, PathRole::Evaluation),
        PortMeta::optional(EXTRA_FILES_PORT, VariableType::FileArray, PathRole::Evaluation),
        PortMeta::optional(ARGS_PORT, VariableType::StringArray, PathRole::Verbatim),
    ],
    outputs: vec![PortMeta::required(
        BINARY_FILE_PORT,
        VariableType::File,
        PathRole::Evaluation,
    )],
});

pub(super) fn compile(ctx: &BoxCompileContext<'_>) -> Result<Vec<Task>> {
    let mut args = ctx.input_values(SOURCE_FILES_PORT);
    if args.is_empty() {
        return Err(ctx.error("no source files to compile"));
    }
    args.extend(ctx.input_values(ARGS_PORT));
    args.push("-o".to_string());
    args.push(ctx.output_scalar(BINARY_FILE_PORT)?);

    // Extra files (headers) only need to be present in the sandbox.
    let task = Task::command(ctx.settings.binaries.gcc.clone(), args)
        .with_type(TaskType::Initiation)
        .with_fatal_failure(true)
        .with_sandbox(ctx.sandbox().with_output(true));

    Ok(vec![task])
}
