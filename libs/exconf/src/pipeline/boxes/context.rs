// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::collections::BTreeMap;

use super::BoxKind;
use crate::error::{CompileError, Result};
use crate::job_config::{Limits, SandboxConfig};
use crate::pipeline::{BoundPort, PathRole};
use crate::settings::CompilerSettings;
use crate::variables::{Variable, VariableValue};

/// Everything a box sees while lowering itself to tasks.
///
/// Port bindings are already resolved through the scope chain and
/// dereferenced; lowering never looks at raw configuration.
#[derive(Debug, Clone, Copy)]
pub struct BoxCompileContext<'a> {
    pub box_name: &'a str,
    pub kind: BoxKind,
    pub inputs: &'a [BoundPort],
    pub outputs: &'a [BoundPort],
    /// Remote origin of a data source box.
    pub remote_origin: Option<&'a Variable>,
    /// Hardware group -> limits for this box instance.
    pub limits: &'a BTreeMap<String, Limits>,
    pub settings: &'a CompilerSettings,
}

impl<'a> BoxCompileContext<'a> {
    pub fn error(&self, reason: impl Into<String>) -> CompileError {
        CompileError::BoxLowering {
            box_name: self.box_name.to_string(),
            box_type: self.kind.type_name().to_string(),
            reason: reason.into(),
        }
    }

    fn find(ports: &'a [BoundPort], name: &str) -> Option<&'a BoundPort> {
        ports.iter().find(|p| p.name == name)
    }

    pub fn input(&self, name: &str) -> Option<&'a Variable> {
        Self::find(self.inputs, name).and_then(|p| p.variable.as_ref())
    }

    pub fn output(&self, name: &str) -> Option<&'a Variable> {
        Self::find(self.outputs, name).and_then(|p| p.variable.as_ref())
    }

    /// Value placed according to the port's path role.
    pub fn placed(&self, port: &BoundPort) -> Option<VariableValue> {
        let variable = port.variable.as_ref()?;
        Some(match port.role {
            PathRole::Evaluation => variable.prefixed_value(&self.settings.eval_dir),
            PathRole::Result => variable.prefixed_value(&self.settings.result_dir),
            PathRole::Verbatim => variable.value(),
        })
    }

    /// Placed values of an optional input port; empty when unbound.
    pub fn input_values(&self, name: &str) -> Vec<String> {
        Self::find(self.inputs, name)
            .and_then(|p| self.placed(p))
            .map(|v| v.to_vec())
            .unwrap_or_default()
    }

    pub fn output_values(&self, name: &str) -> Vec<String> {
        Self::find(self.outputs, name)
            .and_then(|p| self.placed(p))
            .map(|v| v.to_vec())
            .unwrap_or_default()
    }

    /// Placed scalar value of a required input port.
    pub fn input_scalar(&self, name: &str) -> Result<String> {
        let port = Self::find(self.inputs, name);
        self.scalar(port, name)
    }

    pub fn output_scalar(&self, name: &str) -> Result<String> {
        let port = Self::find(self.outputs, name);
        self.scalar(port, name)
    }

    fn scalar(&self, port: Option<&BoundPort>, name: &str) -> Result<String> {
        let value = port
            .and_then(|p| self.placed(p))
            .ok_or_else(|| self.error(format!("port '{}' is not bound", name)))?;

        match value {
            VariableValue::Scalar(value) => Ok(value),
            VariableValue::Array(_) => Err(self.error(format!("port '{}' expects a single value", name))),
        }
    }

    /// Sandbox with the configured name and nothing else.
    pub fn sandbox(&self) -> SandboxConfig {
        SandboxConfig::new(self.settings.sandbox.clone())
    }

    /// Sandbox of a program run: stdin and stdout only when bound, limits
    /// for every hardware group that defines them.
    pub fn execution_sandbox(&self, stdin_port: &str, stdout_port: &str) -> SandboxConfig {
        let mut sandbox = self.sandbox();
        sandbox.stdin = Self::find(self.inputs, stdin_port)
            .and_then(|p| self.placed(p))
            .and_then(|v| v.as_scalar().map(str::to_string));
        sandbox.stdout = Self::find(self.outputs, stdout_port)
            .and_then(|p| self.placed(p))
            .and_then(|v| v.as_scalar().map(str::to_string));
        for limits in self.limits.values() {
            sandbox.set_limits(limits.clone());
        }
        sandbox
    }
}
