// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Error taxonomy for exercise configuration compilation.
//!
//! Every error is fatal for the compilation that raised it. Variants carry
//! enough context (pipeline, box, port, test) to point at the authoring
//! mistake.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    /// Malformed source configuration (YAML syntax or structure).
    #[error("Failed to parse {what}: {reason}")]
    ConfigParsing { what: String, reason: String },

    #[error("Unknown variable '{name}' requested by {context}")]
    UnknownVariable { name: String, context: String },

    #[error("Invalid reference in variable '{name}': {reason}")]
    InvalidReference { name: String, reason: String },

    #[error("Dangling reference '${reference}' in variable '{name}' ({context})")]
    DanglingReference {
        name: String,
        reference: String,
        context: String,
    },

    #[error("Ambiguous binding of variable '{variable}' in pipeline '{pipeline}': {reason}")]
    AmbiguousBinding {
        pipeline: String,
        variable: String,
        reason: String,
    },

    #[error("Port '{port}' of box '{box_name}' in pipeline '{pipeline}' is not bound to any variable")]
    UnboundPort {
        pipeline: String,
        box_name: String,
        port: String,
    },

    #[error(
        "Port '{port}' of box '{box_name}' in pipeline '{pipeline}' expects {expected}, variable '{variable}' is {found}"
    )]
    PortTypeMismatch {
        pipeline: String,
        box_name: String,
        port: String,
        variable: String,
        expected: String,
        found: String,
    },

    #[error("Dependency cycle through box '{box_name}' in pipeline '{pipeline}'{}", test_suffix(.test))]
    CyclicPipeline {
        box_name: String,
        pipeline: String,
        test: Option<String>,
    },

    #[error("Unknown pipeline '{pipeline}' referenced by test '{test}'")]
    UnknownPipelineReference { pipeline: String, test: String },

    #[error("Unknown environment '{environment}' referenced by {context}")]
    UnknownEnvironmentReference {
        environment: String,
        context: String,
    },

    #[error("Invalid exercise limits: {0}")]
    InvalidLimits(String),

    #[error("Box '{box_name}' ({box_type}) cannot be compiled: {reason}")]
    BoxLowering {
        box_name: String,
        box_type: String,
        reason: String,
    },

    #[error("Failed to load job configuration: {0}")]
    JobConfigLoading(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn test_suffix(test: &Option<String>) -> String {
    match test {
        Some(test) => format!(" of test '{}'", test),
        None => String::new(),
    }
}

impl CompileError {
    pub(crate) fn parsing(what: impl Into<String>, reason: impl ToString) -> Self {
        Self::ConfigParsing {
            what: what.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error belongs to the variable-resolution family.
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownVariable { .. }
                | Self::InvalidReference { .. }
                | Self::DanglingReference { .. }
                | Self::AmbiguousBinding { .. }
                | Self::UnboundPort { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_names_test() {
        let err = CompileError::CyclicPipeline {
            box_name: "gcc".into(),
            pipeline: "compilation".into(),
            test: Some("T1".into()),
        };
        assert_eq!(
            err.to_string(),
            "Dependency cycle through box 'gcc' in pipeline 'compilation' of test 'T1'"
        );

        let shared = CompileError::CyclicPipeline {
            box_name: "gcc".into(),
            pipeline: "compilation".into(),
            test: None,
        };
        assert!(!shared.to_string().contains("test"));
    }

    #[test]
    fn test_resolution_family() {
        let unbound = CompileError::UnboundPort {
            pipeline: "p".into(),
            box_name: "b".into(),
            port: "binary-file".into(),
        };
        assert!(unbound.is_resolution_error());
        assert!(unbound.to_string().contains("binary-file"));
        assert!(!CompileError::InvalidLimits("x".into()).is_resolution_error());
    }
}
