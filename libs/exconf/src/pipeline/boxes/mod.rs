// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Box catalog.
//!
//! One variant per box type. Each type owns its default port table, built
//! once on first use, and lowers itself to zero or more tasks from resolved
//! port bindings.

mod context;
pub mod data_in;
pub mod elf_exec;
mod execution;
pub mod fpc;
pub mod gcc;
pub mod judge;
pub mod jvm_runner;
pub mod mono_exec;
pub mod result_mkdir;

pub use context::BoxCompileContext;
pub use execution::{ARGS_PORT, INPUT_FILES_PORT, OUTPUT_FILE_PORT, STDIN_PORT, STDOUT_PORT};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{CompileError, Result};
use crate::job_config::Task;
use crate::pipeline::PortMeta;

/// Default ports of a box type.
#[derive(Debug)]
pub struct BoxPorts {
    pub inputs: Vec<PortMeta>,
    pub outputs: Vec<PortMeta>,
}

/// Box type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BoxKind {
    DataIn,
    Gcc,
    Fpc,
    ElfExec,
    MonoExec,
    JvmRunner,
    Judge,
    ResultMkdir,
}

impl BoxKind {
    pub const ALL: [BoxKind; 8] = [
        BoxKind::DataIn,
        BoxKind::Gcc,
        BoxKind::Fpc,
        BoxKind::ElfExec,
        BoxKind::MonoExec,
        BoxKind::JvmRunner,
        BoxKind::Judge,
        BoxKind::ResultMkdir,
    ];

    /// Type name used in pipeline documents.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::DataIn => "data-in",
            Self::Gcc => "gcc",
            Self::Fpc => "fpc",
            Self::ElfExec => "elf-exec",
            Self::MonoExec => "mono-exec",
            Self::JvmRunner => "jvm-runner",
            Self::Judge => "judge",
            Self::ResultMkdir => "result-mkdir",
        }
    }

    pub fn parse(type_name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.type_name() == type_name)
            .ok_or_else(|| CompileError::parsing("box", format!("unknown box type '{}'", type_name)))
    }

    pub fn default_name(self) -> &'static str {
        match self {
            Self::DataIn => data_in::DEFAULT_NAME,
            Self::Gcc => gcc::DEFAULT_NAME,
            Self::Fpc => fpc::DEFAULT_NAME,
            Self::ElfExec => elf_exec::DEFAULT_NAME,
            Self::MonoExec => mono_exec::DEFAULT_NAME,
            Self::JvmRunner => jvm_runner::DEFAULT_NAME,
            Self::Judge => judge::DEFAULT_NAME,
            Self::ResultMkdir => result_mkdir::DEFAULT_NAME,
        }
    }

    fn ports(self) -> &'static BoxPorts {
        match self {
            Self::DataIn => &data_in::PORTS,
            Self::Gcc => &gcc::PORTS,
            Self::Fpc => &fpc::PORTS,
            Self::ElfExec => &elf_exec::PORTS,
            Self::MonoExec => &mono_exec::PORTS,
            Self::JvmRunner => &jvm_runner::PORTS,
            Self::Judge => &judge::PORTS,
            Self::ResultMkdir => &result_mkdir::PORTS,
        }
    }

    pub fn input_ports(self) -> &'static [PortMeta] {
        &self.ports().inputs
    }

    pub fn output_ports(self) -> &'static [PortMeta] {
        &self.ports().outputs
    }

    /// Data source boxes may fetch remote files.
    pub fn is_data_source(self) -> bool {
        matches!(self, Self::DataIn)
    }

    /// Boxes whose sandbox carries resource limits.
    pub fn uses_limits(self) -> bool {
        matches!(self, Self::ElfExec | Self::MonoExec | Self::JvmRunner)
    }

    /// Lower one box instance to tasks.
    pub fn compile(self, ctx: &BoxCompileContext<'_>) -> Result<Vec<Task>> {
        match self {
            Self::DataIn => data_in::compile(ctx),
            Self::Gcc => gcc::compile(ctx),
            Self::Fpc => fpc::compile(ctx),
            Self::ElfExec => elf_exec::compile(ctx),
            Self::MonoExec => mono_exec::compile(ctx),
            Self::JvmRunner => jvm_runner::compile(ctx),
            Self::Judge => judge::compile(ctx),
            Self::ResultMkdir => result_mkdir::compile(ctx),
        }
    }
}

impl fmt::Display for BoxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl Serialize for BoxKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.type_name())
    }
}

impl<'de> Deserialize<'de> for BoxKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::parse(&name).map_err(serde::de::Error::custom)
    }
}
