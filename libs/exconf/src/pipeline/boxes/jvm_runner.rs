// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Runs compiled Java classes through a custom runner class.

use std::sync::LazyLock;

use super::{BoxCompileContext, BoxPorts, execution};
use crate::error::Result;
use crate::job_config::{Task, TaskType};
use crate::pipeline::{PathRole, PortMeta};
use crate::variables::VariableType;

pub const RUNNER_PORT: &str = "runner";
pub const CLASS_FILES_PORT: &str = "class-files";
pub const JAR_FILES_PORT: &str = "jar-files";
pub const RUNNER_EXEC_PORT: &str = "runner-exec";
pub const CLASSPATH_PORT: &str = "classpath";
pub const DEFAULT_NAME: &str = "JVM Custom Runner";

const CLASSPATH_SEPARATOR: &str = ":";

pub(super) static PORTS: LazyLock<BoxPorts> = LazyLock::new(|| BoxPorts {
    inputs: vec![
        PortMeta::required(RUNNER_PORT, VariableType::File, PathRole::Verbatim),
        execution::ARGS,
        execution::STDIN,
        execution::INPUT_FILES,
        PortMeta::required(CLASS_FILES_PORT, VariableType::FileArray, PathRole::Verbatim),
        PortMeta::optional(JAR_FILES_PORT, VariableType::FileArray, PathRole::Verbatim),
        PortMeta::required(RUNNER_EXEC_PORT, VariableType::String, PathRole::Verbatim),
        PortMeta::optional(CLASSPATH_PORT, VariableType::StringArray, PathRole::Verbatim),
    ],
    outputs: execution::OUTPUTS.to_vec(),
});

pub(super) fn compile(ctx: &BoxCompileContext<'_>) -> Result<Vec<Task>> {
    let runner_exec = ctx.input_scalar(RUNNER_EXEC_PORT)?;

    // java wants a class name, not a file name
    let runner = ctx.input_scalar(RUNNER_PORT)?;
    let runner_class = runner.strip_suffix(".class").unwrap_or(&runner).to_string();

    // Class files come from the compilation directory, which is what the
    // runner needs on its classpath.
    let compiled_dir = ctx
        .input_values(CLASS_FILES_PORT)
        .into_iter()
        .next()
        .ok_or_else(|| ctx.error(format!("port '{}' is empty", CLASS_FILES_PORT)))?;

    let mut classpath = ctx.input_values(JAR_FILES_PORT);
    classpath.push(compiled_dir.clone());
    classpath.extend(ctx.input_values(CLASSPATH_PORT));

    let mut args = vec!["-cp".to_string(), classpath.join(CLASSPATH_SEPARATOR)];
    args.extend([runner_class, "run".to_string(), compiled_dir]);
    args.extend(ctx.input_values(execution::ARGS_PORT));

    let task = Task::command(runner_exec, args)
        .with_type(TaskType::Execution)
        .with_sandbox(execution::sandbox(ctx));

    Ok(vec![task])
}
