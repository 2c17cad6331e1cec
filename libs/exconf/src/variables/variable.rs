// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};
use std::fmt;

use super::VariableType;
use crate::error::{CompileError, Result};

/// Marker that turns a scalar value into a reference to another variable.
pub const REFERENCE_KEY: char = '$';

/// Marker that keeps a `$`-prefixed value literal.
pub const ESCAPE_CHAR: char = '\\';

/// Literal value of a variable: a scalar or a sequence of scalars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Scalar(String),
    Array(Vec<String>),
}

impl VariableValue {
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(value) => Some(value),
            Self::Array(_) => None,
        }
    }

    /// View the value as a list; a scalar becomes a one-element list unless
    /// it is empty.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::Scalar(value) if value.is_empty() => Vec::new(),
            Self::Scalar(value) => vec![value.clone()],
            Self::Array(values) => values.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Scalar(value) => value.is_empty(),
            Self::Array(values) => values.is_empty(),
        }
    }

    /// Prefix every element with `prefix/`.
    pub fn prefixed(&self, prefix: &str) -> VariableValue {
        let join = |value: &str| format!("{}/{}", prefix.trim_end_matches('/'), value);
        match self {
            Self::Scalar(value) => Self::Scalar(join(value)),
            Self::Array(values) => Self::Array(values.iter().map(|v| join(v)).collect()),
        }
    }

    fn from_yaml(name: &str, value: Option<serde_yaml::Value>, default_array: bool) -> Result<Self> {
        use serde_yaml::Value;

        match value {
            None | Some(Value::Null) => Ok(if default_array {
                Self::Array(Vec::new())
            } else {
                Self::Scalar(String::new())
            }),
            Some(Value::Sequence(items)) => items
                .into_iter()
                .map(|item| {
                    scalar_to_string(&item).ok_or_else(|| {
                        CompileError::parsing(
                            format!("variable '{}'", name),
                            "array items must be scalar",
                        )
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(Self::Array),
            Some(other) => scalar_to_string(&other).map(Self::Scalar).ok_or_else(|| {
                CompileError::parsing(
                    format!("variable '{}'", name),
                    "value should be scalar or sequence",
                )
            }),
        }
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value;

    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(value) => f.write_str(value),
            Self::Array(values) => write!(f, "[{}]", values.join(", ")),
        }
    }
}

/// Wire form of a variable as written in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VariableRecord {
    name: String,
    #[serde(rename = "type")]
    var_type: String,
    #[serde(default)]
    value: Option<serde_yaml::Value>,
}

/// Named, typed value with reference semantics.
///
/// Constructed once while a pipeline, environment or exercise configuration
/// is loaded and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "VariableRecord", into = "VariableRecord")]
pub struct Variable {
    name: String,
    var_type: VariableType,
    value: VariableValue,
}

impl Variable {
    /// Create a variable, validating the value against the type.
    pub fn new(
        name: impl Into<String>,
        var_type: VariableType,
        value: VariableValue,
    ) -> Result<Self> {
        let variable = Self {
            name: name.into(),
            var_type,
            value,
        };
        variable.validate()?;
        Ok(variable)
    }

    /// Create a variable from a type name and a raw YAML value.
    pub fn from_yaml(
        name: impl Into<String>,
        type_name: &str,
        value: Option<serde_yaml::Value>,
    ) -> Result<Self> {
        let name = name.into();
        let var_type = VariableType::parse(type_name).map_err(|_| {
            CompileError::parsing(
                format!("variable '{}'", name),
                format!("unknown type '{}'", type_name),
            )
        })?;
        let value = VariableValue::from_yaml(&name, value, var_type.is_array())?;
        Self::new(name, var_type, value)
    }

    /// Shorthand for a scalar variable.
    pub fn scalar(
        name: impl Into<String>,
        var_type: VariableType,
        value: impl Into<String>,
    ) -> Result<Self> {
        Self::new(name, var_type, VariableValue::Scalar(value.into()))
    }

    /// Shorthand for an array variable.
    pub fn array<I, S>(name: impl Into<String>, var_type: VariableType, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            var_type,
            VariableValue::Array(values.into_iter().map(Into::into).collect()),
        )
    }

    fn validate(&self) -> Result<()> {
        if self.is_reference() {
            return Ok(());
        }

        match (&self.value, self.var_type.is_array()) {
            (VariableValue::Array(_), false) => Err(CompileError::parsing(
                format!("variable '{}'", self.name),
                format!("type {} requires a scalar value", self.var_type),
            )),
            (VariableValue::Scalar(_), true) => Err(CompileError::parsing(
                format!("variable '{}'", self.name),
                format!("type {} requires a sequence value", self.var_type),
            )),
            _ => Ok(()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn var_type(&self) -> VariableType {
        self.var_type
    }

    pub fn is_array(&self) -> bool {
        self.var_type.is_array()
    }

    pub fn is_value_array(&self) -> bool {
        self.value.is_array()
    }

    pub fn is_file(&self) -> bool {
        self.var_type.is_file()
    }

    pub fn is_remote_file(&self) -> bool {
        self.var_type.is_remote_file()
    }

    /// Whether the value references another variable.
    pub fn is_reference(&self) -> bool {
        matches!(&self.value, VariableValue::Scalar(v) if v.starts_with(REFERENCE_KEY))
    }

    /// Name of the referenced variable, if this variable is a reference.
    pub fn reference(&self) -> Option<&str> {
        match &self.value {
            VariableValue::Scalar(v) => v.strip_prefix(REFERENCE_KEY),
            VariableValue::Array(_) => None,
        }
    }

    /// Value with the escape marker stripped from escaped literals.
    pub fn value(&self) -> VariableValue {
        match &self.value {
            VariableValue::Scalar(v) if is_escaped(v) => VariableValue::Scalar(v[1..].to_string()),
            other => other.clone(),
        }
    }

    /// Value as written in configuration.
    pub fn raw_value(&self) -> &VariableValue {
        &self.value
    }

    /// Value with every element placed under `prefix`.
    pub fn prefixed_value(&self, prefix: &str) -> VariableValue {
        self.value().prefixed(prefix)
    }

    /// Same variable under another name and with another value. Used when a
    /// reference is followed: the consumer keeps its own name and type.
    pub(crate) fn with_value(&self, value: VariableValue) -> Result<Self> {
        Self::new(self.name.clone(), self.var_type, value)
    }
}

fn is_escaped(value: &str) -> bool {
    let mut chars = value.chars();
    chars.next() == Some(ESCAPE_CHAR) && chars.next() == Some(REFERENCE_KEY)
}

impl TryFrom<VariableRecord> for Variable {
    type Error = CompileError;

    fn try_from(record: VariableRecord) -> Result<Self> {
        Self::from_yaml(record.name, &record.var_type, record.value)
    }
}

impl From<Variable> for VariableRecord {
    fn from(variable: Variable) -> Self {
        let value = match variable.value {
            VariableValue::Scalar(s) => serde_yaml::Value::String(s),
            VariableValue::Array(items) => serde_yaml::Value::Sequence(
                items.into_iter().map(serde_yaml::Value::String).collect(),
            ),
        };
        Self {
            name: variable.name,
            var_type: variable.var_type.name().to_string(),
            value: Some(value),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) = {}", self.name, self.var_type, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(value: &str) -> Option<serde_yaml::Value> {
        Some(serde_yaml::from_str(value).unwrap())
    }

    #[test]
    fn test_type_is_normalized() {
        let var = Variable::from_yaml("sources", "FILE[]", yaml("[a.c, b.c]")).unwrap();
        assert_eq!(var.var_type(), VariableType::FileArray);
        assert!(var.is_array());
        assert!(var.is_value_array());
    }

    #[test]
    fn test_null_value_defaults() {
        let scalar = Variable::from_yaml("a", "string", None).unwrap();
        assert_eq!(scalar.value(), VariableValue::Scalar(String::new()));

        let array = Variable::from_yaml("b", "string[]", yaml("~")).unwrap();
        assert_eq!(array.value(), VariableValue::Array(vec![]));
    }

    #[test]
    fn test_reference_detection() {
        let var = Variable::from_yaml("input", "file", yaml("\"$test-input\"")).unwrap();
        assert!(var.is_reference());
        assert_eq!(var.reference(), Some("test-input"));
    }

    #[test]
    fn test_reference_allowed_for_array_type() {
        let var = Variable::from_yaml("files", "file[]", yaml("\"$submitted\"")).unwrap();
        assert!(var.is_reference());
        assert!(!var.is_value_array());
    }

    #[test]
    fn test_escaped_value_is_literal() {
        let var = Variable::scalar("price", VariableType::String, "\\$100").unwrap();
        assert!(!var.is_reference());
        assert_eq!(var.value(), VariableValue::Scalar("$100".into()));
        assert_eq!(var.raw_value(), &VariableValue::Scalar("\\$100".into()));
    }

    #[test]
    fn test_array_type_rejects_scalar() {
        let err = Variable::scalar("files", VariableType::FileArray, "a.c").unwrap_err();
        assert!(matches!(err, CompileError::ConfigParsing { .. }));
    }

    #[test]
    fn test_scalar_type_rejects_sequence() {
        let err = Variable::from_yaml("file", "file", yaml("[a, b]")).unwrap_err();
        assert!(err.to_string().contains("scalar"));
    }

    #[test]
    fn test_mapping_value_rejected() {
        assert!(Variable::from_yaml("m", "string", yaml("{a: 1}")).is_err());
    }

    #[test]
    fn test_numbers_become_strings() {
        let var = Variable::from_yaml("n", "string", yaml("42")).unwrap();
        assert_eq!(var.value(), VariableValue::Scalar("42".into()));
    }

    #[test]
    fn test_prefixed_value() {
        let var = Variable::array("srcs", VariableType::FileArray, ["a.c", "b.c"]).unwrap();
        assert_eq!(
            var.prefixed_value("${EVAL_DIR}"),
            VariableValue::Array(vec!["${EVAL_DIR}/a.c".into(), "${EVAL_DIR}/b.c".into()])
        );
    }

    #[test]
    fn test_serde_round_trip() {
        let var = Variable::array("args", VariableType::StringArray, ["-O2", "-Wall"]).unwrap();
        let text = serde_yaml::to_string(&var).unwrap();
        let back: Variable = serde_yaml::from_str(&text).unwrap();
        assert_eq!(var, back);
    }
}
