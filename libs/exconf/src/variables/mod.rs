// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Typed variables and their three-level scope resolution.
//!
//! Variables are declared in pipeline, environment and exercise tables.
//! A value starting with `$` references another variable by name and is
//! followed exactly one hop; `\$` keeps the dollar sign literal.

mod scope_chain;
mod variable;
mod variable_type;
mod variables_table;

pub use scope_chain::{Scope, ScopeChain, ScopedVariable};
pub use variable::{ESCAPE_CHAR, REFERENCE_KEY, Variable, VariableValue};
pub use variable_type::VariableType;
pub use variables_table::VariablesTable;
