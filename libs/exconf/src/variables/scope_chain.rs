// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Variable lookup across the pipeline, environment and exercise scopes.

use std::fmt;
use std::sync::Arc;

use super::{Variable, VariablesTable};
use crate::error::{CompileError, Result};

/// Configuration scope a variable was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    Pipeline,
    Environment,
    Exercise,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pipeline => "pipeline",
            Self::Environment => "environment",
            Self::Exercise => "exercise",
        };
        f.write_str(name)
    }
}

/// Variable found by a lookup, with the scope that declared it.
#[derive(Debug, Clone, Copy)]
pub struct ScopedVariable<'a> {
    pub scope: Scope,
    pub variable: &'a Variable,
}

/// Composition of the scope tables in priority order. Tables are shared,
/// never merged.
#[derive(Debug, Clone, Default)]
pub struct ScopeChain {
    layers: Vec<(Scope, Arc<VariablesTable>)>,
}

impl ScopeChain {
    pub fn new(
        pipeline: Arc<VariablesTable>,
        environment: Arc<VariablesTable>,
        exercise: Arc<VariablesTable>,
    ) -> Self {
        Self {
            layers: vec![
                (Scope::Pipeline, pipeline),
                (Scope::Environment, environment),
                (Scope::Exercise, exercise),
            ],
        }
    }

    /// Add the pipeline definition's own table below the per-test pipeline
    /// variables. Both belong to the pipeline scope.
    pub fn with_pipeline_defaults(mut self, defaults: Arc<VariablesTable>) -> Self {
        let position = self
            .layers
            .iter()
            .rposition(|(scope, _)| *scope == Scope::Pipeline)
            .map_or(0, |i| i + 1);
        self.layers.insert(position, (Scope::Pipeline, defaults));
        self
    }

    /// Tables of one scope, in priority order.
    pub fn tables(&self, scope: Scope) -> impl Iterator<Item = &VariablesTable> {
        self.layers
            .iter()
            .filter(move |(s, _)| *s == scope)
            .map(|(_, table)| table.as_ref())
    }

    fn declarations<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = ScopedVariable<'a>> + use<'a, 'n> {
        self.layers.iter().filter_map(move |(scope, table)| {
            table.get(name).map(|variable| ScopedVariable {
                scope: *scope,
                variable,
            })
        })
    }

    /// First declaration of `name` in priority order.
    pub fn lookup(&self, name: &str) -> Option<ScopedVariable<'_>> {
        self.declarations(name).next()
    }

    /// Lookup restricted to the environment and exercise scopes.
    pub fn lookup_outer(&self, name: &str) -> Option<ScopedVariable<'_>> {
        self.declarations(name)
            .find(|found| found.scope != Scope::Pipeline)
    }

    /// Resolve `name` to its first declaration.
    pub fn resolve(&self, name: &str, context: &str) -> Result<ScopedVariable<'_>> {
        self.lookup(name)
            .ok_or_else(|| CompileError::UnknownVariable {
                name: name.to_string(),
                context: context.to_string(),
            })
    }

    /// Declaration a reference points to, skipping the referencing one.
    fn reference_target<'a>(&'a self, variable: &Variable, context: &str) -> Result<Option<&'a Variable>> {
        let Some(reference) = variable.reference() else {
            return Ok(None);
        };

        let target = self
            .declarations(reference)
            .map(|found| found.variable)
            .find(|candidate| !std::ptr::eq(*candidate, variable))
            .ok_or_else(|| CompileError::DanglingReference {
                name: variable.name().to_string(),
                reference: reference.to_string(),
                context: context.to_string(),
            })?;

        if target.is_reference() {
            return Err(CompileError::InvalidReference {
                name: variable.name().to_string(),
                reason: format!(
                    "'{}' is itself a reference, chained references are not allowed",
                    target.name()
                ),
            });
        }

        Ok(Some(target))
    }

    fn incompatible(variable: &Variable, target: &Variable) -> CompileError {
        CompileError::InvalidReference {
            name: variable.name().to_string(),
            reason: format!(
                "type {} cannot reference '{}' of type {}",
                variable.var_type(),
                target.name(),
                target.var_type()
            ),
        }
    }

    /// Follow a reference one hop.
    ///
    /// Non-references are returned unchanged. The referenced name is looked
    /// up in priority order, skipping the referencing declaration itself. The
    /// result keeps the consumer's name and type and takes the referenced
    /// value; a reference to a reference is rejected, as is a link between
    /// a local and a remote file or between a scalar and an array.
    pub fn dereference(&self, scoped: ScopedVariable<'_>, context: &str) -> Result<Variable> {
        let variable = scoped.variable;
        let Some(target) = self.reference_target(variable, context)? else {
            return Ok(variable.clone());
        };

        if target.is_array() != variable.is_array() || target.is_remote_file() != variable.is_remote_file() {
            return Err(Self::incompatible(variable, target));
        }

        variable.with_value(target.raw_value().clone())
    }

    /// Remote file that a local variable reaches through its reference.
    ///
    /// `None` when the variable is remote itself, is not a reference, or
    /// points at a local declaration.
    pub fn remote_target(&self, scoped: ScopedVariable<'_>, context: &str) -> Result<Option<Variable>> {
        let variable = scoped.variable;
        if variable.is_remote_file() {
            return Ok(None);
        }
        let Some(target) = self.reference_target(variable, context)? else {
            return Ok(None);
        };
        if !target.is_remote_file() {
            return Ok(None);
        }
        if target.is_array() != variable.is_array() {
            return Err(Self::incompatible(variable, target));
        }
        Ok(Some(target.clone()))
    }

    /// Resolve and dereference in one step.
    pub fn resolve_value(&self, name: &str, context: &str) -> Result<Variable> {
        let scoped = self.resolve(name, context)?;
        self.dereference(scoped, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::{VariableType, VariableValue};

    fn table(vars: Vec<Variable>) -> Arc<VariablesTable> {
        Arc::new(VariablesTable::from_variables(vars).unwrap())
    }

    fn file(name: &str, value: &str) -> Variable {
        Variable::scalar(name, VariableType::File, value).unwrap()
    }

    fn chain() -> ScopeChain {
        ScopeChain::new(
            table(vec![file("input", "$test-input"), file("shadowed", "pipeline.txt")]),
            table(vec![file("shadowed", "env.txt"), file("chained", "$input")]),
            table(vec![
                file("test-input", "01.in"),
                file("shadowed", "exercise.txt"),
            ]),
        )
    }

    #[test]
    fn test_first_scope_wins() {
        let chain = chain();
        let found = chain.resolve("shadowed", "test").unwrap();
        assert_eq!(found.scope, Scope::Pipeline);
        assert_eq!(found.variable.value(), VariableValue::Scalar("pipeline.txt".into()));
    }

    #[test]
    fn test_unknown_variable() {
        let err = chain().resolve("missing", "box 'gcc'").unwrap_err();
        assert!(matches!(err, CompileError::UnknownVariable { ref name, .. } if name == "missing"));
    }

    #[test]
    fn test_dereference_one_hop() {
        let resolved = chain().resolve_value("input", "test").unwrap();
        assert_eq!(resolved.name(), "input");
        assert_eq!(resolved.value(), VariableValue::Scalar("01.in".into()));
    }

    #[test]
    fn test_chained_reference_is_invalid() {
        let chain = chain();
        let scoped = chain.lookup_outer("chained").unwrap();
        let err = chain.dereference(scoped, "test").unwrap_err();
        assert!(matches!(err, CompileError::InvalidReference { .. }));
    }

    #[test]
    fn test_dangling_reference() {
        let chain = ScopeChain::new(
            table(vec![file("input", "$nowhere")]),
            table(vec![]),
            table(vec![]),
        );
        let err = chain.resolve_value("input", "test").unwrap_err();
        assert!(matches!(err, CompileError::DanglingReference { ref reference, .. } if reference == "nowhere"));
    }

    #[test]
    fn test_self_named_reference_reaches_outer_scope() {
        let chain = ScopeChain::new(
            table(vec![file("source", "$source")]),
            table(vec![]),
            table(vec![file("source", "solution.c")]),
        );
        let resolved = chain.resolve_value("source", "test").unwrap();
        assert_eq!(resolved.value(), VariableValue::Scalar("solution.c".into()));
    }

    #[test]
    fn test_pipeline_defaults_sit_below_overrides() {
        let chain = ScopeChain::new(
            table(vec![file("source", "$source")]),
            table(vec![file("source", "env.c")]),
            table(vec![]),
        )
        .with_pipeline_defaults(table(vec![file("source", "default.c"), file("extra", "x.h")]));

        assert_eq!(chain.tables(Scope::Pipeline).count(), 2);
        let resolved = chain.resolve_value("source", "test").unwrap();
        assert_eq!(resolved.value(), VariableValue::Scalar("default.c".into()));
        assert_eq!(chain.resolve("extra", "test").unwrap().scope, Scope::Pipeline);
    }

    #[test]
    fn test_escaped_value_not_followed() {
        let chain = ScopeChain::new(
            table(vec![
                Variable::scalar("literal", VariableType::String, "\\$input").unwrap(),
            ]),
            table(vec![]),
            table(vec![file("input", "never")]),
        );
        let resolved = chain.resolve_value("literal", "test").unwrap();
        assert_eq!(resolved.value(), VariableValue::Scalar("$input".into()));
    }

    fn remote(name: &str, value: &str) -> Variable {
        Variable::scalar(name, VariableType::RemoteFile, value).unwrap()
    }

    #[test]
    fn test_local_file_cannot_take_remote_value() {
        let chain = ScopeChain::new(
            table(vec![file("input", "$test-input")]),
            table(vec![remote("test-input", "data/t1.in")]),
            table(vec![]),
        );
        let err = chain.resolve_value("input", "test").unwrap_err();
        assert!(matches!(err, CompileError::InvalidReference { ref name, .. } if name == "input"));
    }

    #[test]
    fn test_remote_target_through_reference() {
        let chain = ScopeChain::new(
            table(vec![file("input", "$test-input"), file("plain", "$local")]),
            table(vec![remote("test-input", "data/t1.in"), file("local", "t1.in")]),
            table(vec![]),
        );

        let input = chain.resolve("input", "test").unwrap();
        let target = chain.remote_target(input, "test").unwrap().unwrap();
        assert_eq!(target.name(), "test-input");
        assert_eq!(target.value(), VariableValue::Scalar("data/t1.in".into()));

        let plain = chain.resolve("plain", "test").unwrap();
        assert!(chain.remote_target(plain, "test").unwrap().is_none());
    }

    #[test]
    fn test_remote_may_reference_remote() {
        let chain = ScopeChain::new(
            table(vec![remote("input", "$test-input")]),
            table(vec![remote("test-input", "data/t1.in")]),
            table(vec![]),
        );
        let resolved = chain.resolve_value("input", "test").unwrap();
        assert!(resolved.is_remote_file());
        assert_eq!(resolved.value(), VariableValue::Scalar("data/t1.in".into()));
    }

    #[test]
    fn test_array_mismatch_rejected() {
        let chain = ScopeChain::new(
            table(vec![Variable::scalar("files", VariableType::FileArray, "$single").unwrap()]),
            table(vec![]),
            table(vec![file("single", "a.c")]),
        );
        let err = chain.resolve_value("files", "test").unwrap_err();
        assert!(matches!(err, CompileError::InvalidReference { .. }));
    }
}
