// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Directory mounted into the sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundDirectory {
    pub src: String,
    pub dst: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

/// Resource limits of one sandboxed task on one hardware group.
///
/// Every field is optional; unset fields are not serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Limits {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hw_group_id: String,

    /// CPU time in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wall_time: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_time: Option<f64>,

    /// Stack size in KiB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_size: Option<u64>,

    /// Memory in KiB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<u64>,

    /// Number of processes and threads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_files: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chdir: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environ_variable: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bound_directories: Vec<BoundDirectory>,
}

impl Limits {
    /// Whether no constraint is set. The hardware group id is not a constraint.
    pub fn is_unconstrained(&self) -> bool {
        let Self {
            hw_group_id: _,
            time,
            wall_time,
            extra_time,
            stack_size,
            memory,
            parallel,
            disk_size,
            disk_files,
            chdir,
            environ_variable,
            bound_directories,
        } = self;

        time.is_none()
            && wall_time.is_none()
            && extra_time.is_none()
            && stack_size.is_none()
            && memory.is_none()
            && parallel.is_none()
            && disk_size.is_none()
            && disk_files.is_none()
            && chdir.is_none()
            && environ_variable.is_empty()
            && bound_directories.is_empty()
    }

    /// Same limits tagged with a hardware group.
    pub fn for_hw_group(&self, hw_group: &str) -> Self {
        Self {
            hw_group_id: hw_group.to_string(),
            ..self.clone()
        }
    }

    /// Canonical text used when limits take part in equality checks.
    pub(crate) fn canonical(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
