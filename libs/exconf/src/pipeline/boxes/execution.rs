// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Ports and sandbox shared by the program execution boxes.

use super::BoxCompileContext;
use crate::job_config::SandboxConfig;
use crate::pipeline::{PathRole, PortMeta};
use crate::variables::VariableType;

pub const ARGS_PORT: &str = "args";
pub const STDIN_PORT: &str = "stdin";
pub const INPUT_FILES_PORT: &str = "input-files";
pub const STDOUT_PORT: &str = "stdout";
pub const OUTPUT_FILE_PORT: &str = "output-file";

pub const ARGS: PortMeta = PortMeta::optional(ARGS_PORT, VariableType::StringArray, PathRole::Verbatim);
pub const STDIN: PortMeta = PortMeta::optional(STDIN_PORT, VariableType::File, PathRole::Evaluation);
pub const INPUT_FILES: PortMeta =
    PortMeta::optional(INPUT_FILES_PORT, VariableType::FileArray, PathRole::Evaluation);

pub const OUTPUTS: [PortMeta; 2] = [
    PortMeta::optional(STDOUT_PORT, VariableType::File, PathRole::Evaluation),
    PortMeta::optional(OUTPUT_FILE_PORT, VariableType::File, PathRole::Evaluation),
];

pub fn sandbox(ctx: &BoxCompileContext<'_>) -> SandboxConfig {
    ctx.execution_sandbox(STDIN_PORT, STDOUT_PORT)
}
