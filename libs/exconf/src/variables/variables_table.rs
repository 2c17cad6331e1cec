// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

use super::Variable;
use crate::error::{CompileError, Result};

/// Named variables of one configuration scope.
///
/// Keeps declaration order; names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariablesTable {
    variables: Vec<Variable>,
    index: HashMap<String, usize>,
}

impl VariablesTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table, rejecting duplicate names.
    pub fn from_variables(variables: impl IntoIterator<Item = Variable>) -> Result<Self> {
        let mut table = Self::new();
        for variable in variables {
            table.insert(variable)?;
        }
        Ok(table)
    }

    /// Add a variable. Names must be unique within one table.
    pub fn insert(&mut self, variable: Variable) -> Result<()> {
        if self.index.contains_key(variable.name()) {
            return Err(CompileError::parsing(
                "variables table",
                format!("variable '{}' is declared more than once", variable.name()),
            ));
        }

        self.index
            .insert(variable.name().to_string(), self.variables.len());
        self.variables.push(variable);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.index.get(name).map(|&i| &self.variables[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl Serialize for VariablesTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.variables.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for VariablesTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let variables = Option::<Vec<Variable>>::deserialize(deserializer)?.unwrap_or_default();
        Self::from_variables(variables).map_err(serde::de::Error::custom)
    }
}
