// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::variables::{REFERENCE_KEY, Variable, VariableType};

/// Where a port's path values live at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PathRole {
    /// Inside the evaluation working directory.
    Evaluation,
    /// Inside the results directory.
    Result,
    /// Passed through untouched.
    #[default]
    Verbatim,
}

/// Direction of a port on its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDirection {
    Input,
    Output,
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// Catalog description of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortMeta {
    pub name: &'static str,
    /// `None` for ports that take the type of the bound variable.
    pub var_type: Option<VariableType>,
    pub required: bool,
    pub role: PathRole,
}

impl PortMeta {
    pub const fn required(name: &'static str, var_type: VariableType, role: PathRole) -> Self {
        Self {
            name,
            var_type: Some(var_type),
            required: true,
            role,
        }
    }

    pub const fn optional(name: &'static str, var_type: VariableType, role: PathRole) -> Self {
        Self {
            name,
            var_type: Some(var_type),
            required: false,
            role,
        }
    }

    /// Required port without a fixed type.
    pub const fn untyped(name: &'static str, role: PathRole) -> Self {
        Self {
            name,
            var_type: None,
            required: true,
            role,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.var_type.map_or("undefined", VariableType::name)
    }
}

/// Port of a configured box, possibly bound to a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    meta: PortMeta,
    variable: Option<String>,
}

impl Port {
    pub fn new(meta: PortMeta) -> Self {
        Self {
            meta,
            variable: None,
        }
    }

    /// Bind to a variable. A leading `$` is accepted; empty names unbind.
    pub fn bind(mut self, variable: &str) -> Self {
        let name = variable.trim();
        let name = name.strip_prefix(REFERENCE_KEY).unwrap_or(name);
        self.variable = (!name.is_empty()).then(|| name.to_string());
        self
    }

    pub fn name(&self) -> &'static str {
        self.meta.name
    }

    pub fn meta(&self) -> &PortMeta {
        &self.meta
    }

    pub fn var_type(&self) -> Option<VariableType> {
        self.meta.var_type
    }

    pub fn role(&self) -> PathRole {
        self.meta.role
    }

    pub fn is_required(&self) -> bool {
        self.meta.required
    }

    /// Bound variable name, `None` when the port is undefined.
    pub fn variable(&self) -> Option<&str> {
        self.variable.as_deref()
    }

    pub fn is_bound(&self) -> bool {
        self.variable.is_some()
    }
}

/// Port with its variable resolved and dereferenced for one box instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundPort {
    pub name: &'static str,
    pub role: PathRole,
    pub variable: Option<Variable>,
}

impl BoundPort {
    pub fn unbound(meta: &PortMeta) -> Self {
        Self {
            name: meta.name,
            role: meta.role,
            variable: None,
        }
    }
}

/// Port as written in a pipeline document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRecord {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub var_type: Option<String>,
    #[serde(default)]
    pub value: String,
}

impl From<&Port> for PortRecord {
    fn from(port: &Port) -> Self {
        Self {
            var_type: Some(port.meta.type_name().to_string()),
            value: port.variable().unwrap_or_default().to_string(),
        }
    }
}
