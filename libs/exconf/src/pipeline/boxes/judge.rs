// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Compares produced output with the expected one.

use std::sync::LazyLock;

use super::{BoxCompileContext, BoxPorts};
use crate::error::Result;
use crate::job_config::{Task, TaskType};
use crate::pipeline::{PathRole, PortMeta};
use crate::variables::VariableType;

pub const JUDGE_TYPE_PORT: &str = "judge-type";
pub const EXPECTED_OUTPUT_PORT: &str = "expected-output";
pub const ACTUAL_OUTPUT_PORT: &str = "actual-output";
pub const ARGS_PORT: &str = "args";
pub const DEFAULT_NAME: &str = "Output Judge";

pub(super) static PORTS: LazyLock<BoxPorts> = LazyLock::new(|| BoxPorts {
    inputs: vec![
        PortMeta::optional(JUDGE_TYPE_PORT, VariableType::String, PathRole::Verbatim),
        PortMeta::optional(ARGS_PORT, VariableType::StringArray, PathRole::Verbatim),
        PortMeta::required(EXPECTED_OUTPUT_PORT, VariableType::File, PathRole::Evaluation),
        PortMeta::required(ACTUAL_OUTPUT_PORT, VariableType::File, PathRole::Evaluation),
    ],
    outputs: Vec::new(),
});

pub(super) fn compile(ctx: &BoxCompileContext<'_>) -> Result<Vec<Task>> {
    let judge_type = ctx
        .input_values(JUDGE_TYPE_PORT)
        .into_iter()
        .next()
        .unwrap_or_else(|| ctx.settings.default_judge.clone());

    let binary = ctx
        .settings
        .judge_binary(&judge_type)
        .ok_or_else(|| ctx.error(format!("unknown judge type '{}'", judge_type)))?;

    let mut args = ctx.input_values(ARGS_PORT);
    args.push(ctx.input_scalar(EXPECTED_OUTPUT_PORT)?);
    args.push(ctx.input_scalar(ACTUAL_OUTPUT_PORT)?);

    let task = Task::command(binary, args)
        .with_type(TaskType::Evaluation)
        .with_sandbox(ctx.sandbox().with_output(true));

    Ok(vec![task])
}
