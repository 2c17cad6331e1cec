// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Data source. Brings a file into the evaluation directory, fetching it
//! when the variable names a remote file.

use std::sync::LazyLock;

use super::{BoxCompileContext, BoxPorts};
use crate::error::Result;
use crate::job_config::Task;
use crate::pipeline::{PathRole, PortMeta};

pub const DATA_IN_PORT: &str = "in-data";
pub const DEFAULT_NAME: &str = "Input Data";

pub(super) static PORTS: LazyLock<BoxPorts> = LazyLock::new(|| BoxPorts {
    inputs: Vec::new(),
    outputs: vec![PortMeta::untyped(DATA_IN_PORT, PathRole::Evaluation)],
});

pub(super) fn compile(ctx: &BoxCompileContext<'_>) -> Result<Vec<Task>> {
    // Local data comes with the submission archive or from another task.
    let Some(remote) = ctx.remote_origin else {
        return Ok(Vec::new());
    };

    let remote_files = remote.value().to_vec();
    let local_files = ctx.output_values(DATA_IN_PORT);
    if remote_files.len() != local_files.len() {
        return Err(ctx.error(format!(
            "remote variable '{}' has {} files but port '{}' names {}",
            remote.name(),
            remote_files.len(),
            DATA_IN_PORT,
            local_files.len()
        )));
    }

    Ok(remote_files
        .into_iter()
        .zip(local_files)
        .map(|(remote, local)| Task::command(ctx.settings.binaries.fetch.clone(), [remote, local]))
        .collect())
}
