// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use crate::error::{CompileError, Result};
use crate::pipeline::{Pipeline, PortDirection};

/// Checks port bindings of a single pipeline.
pub struct PipelineValidator;

impl PipelineValidator {
    pub fn validate(pipeline: &Pipeline) -> Result<()> {
        Self::check_required_ports(pipeline)?;
        Self::check_multiplicity(pipeline)?;
        Self::check_types(pipeline)
    }

    fn check_required_ports(pipeline: &Pipeline) -> Result<()> {
        for b in pipeline.boxes() {
            let missing = b
                .inputs()
                .iter()
                .chain(b.outputs())
                .find(|p| p.is_required() && !p.is_bound());

            if let Some(port) = missing {
                return Err(CompileError::UnboundPort {
                    pipeline: pipeline.id().to_string(),
                    box_name: b.name().to_string(),
                    port: port.name().to_string(),
                });
            }
        }
        Ok(())
    }

    /// One producer with any number of consumers, a producer alone, or a
    /// single consumer reading from scope.
    fn check_multiplicity(pipeline: &Pipeline) -> Result<()> {
        for variable in pipeline.bound_variables() {
            let producers = pipeline
                .ports_bound_to(variable, PortDirection::Output)
                .count();
            let consumers = pipeline
                .ports_bound_to(variable, PortDirection::Input)
                .count();

            let reason = if producers > 1 {
                format!("produced by {} output ports", producers)
            } else if producers == 0 && consumers > 1 {
                format!(
                    "consumed by {} input ports without a producing box",
                    consumers
                )
            } else {
                continue;
            };

            return Err(CompileError::AmbiguousBinding {
                pipeline: pipeline.id().to_string(),
                variable: variable.to_string(),
                reason,
            });
        }
        Ok(())
    }

    fn check_types(pipeline: &Pipeline) -> Result<()> {
        for b in pipeline.boxes() {
            for port in b.inputs().iter().chain(b.outputs()) {
                let (Some(name), Some(expected)) = (port.variable(), port.var_type()) else {
                    continue;
                };

                let mismatch = |found: String| CompileError::PortTypeMismatch {
                    pipeline: pipeline.id().to_string(),
                    box_name: b.name().to_string(),
                    port: port.name().to_string(),
                    variable: name.to_string(),
                    expected: expected.to_string(),
                    found,
                };

                if let Some(declared) = pipeline.variables().get(name) {
                    if declared.var_type() != expected {
                        return Err(mismatch(declared.var_type().to_string()));
                    }
                }

                // The producing port fixes the type a consumer receives.
                let produced = pipeline
                    .ports_bound_to(name, PortDirection::Output)
                    .filter_map(|(producer, port_name)| {
                        producer
                            .outputs()
                            .iter()
                            .find(|p| p.name() == port_name)
                            .and_then(|p| p.var_type())
                    })
                    .find(|t| *t != expected);
                if let Some(found) = produced {
                    return Err(mismatch(found.to_string()));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::Loader;

    fn pipeline(boxes: &str) -> Pipeline {
        Loader::load_pipeline(&format!("id: p\nboxes:\n{}", boxes)).unwrap()
    }

    #[test]
    fn test_valid_chain() {
        let p = pipeline(
            "  - { name: gcc, type: gcc, ports-in: { source-files: { value: src } }, ports-out: { binary-file: { value: bin } } }\n  - { name: run, type: elf-exec, ports-in: { binary-file: { value: bin } } }\n  - { name: run2, type: elf-exec, ports-in: { binary-file: { value: bin } } }\n",
        );
        PipelineValidator::validate(&p).unwrap();
    }

    #[test]
    fn test_unbound_required_port() {
        let p = pipeline("  - { name: run, type: elf-exec }\n");
        let err = PipelineValidator::validate(&p).unwrap_err();
        assert!(matches!(err, CompileError::UnboundPort { ref port, .. } if port == "binary-file"));
        assert!(err.is_resolution_error());
    }

    #[test]
    fn test_two_producers_are_ambiguous() {
        let p = pipeline(
            "  - { name: a, type: fpc, ports-in: { source-file: { value: s1 } }, ports-out: { binary-file: { value: bin } } }\n  - { name: b, type: fpc, ports-in: { source-file: { value: s2 } }, ports-out: { binary-file: { value: bin } } }\n",
        );
        let err = PipelineValidator::validate(&p).unwrap_err();
        assert!(matches!(err, CompileError::AmbiguousBinding { ref variable, .. } if variable == "bin"));
    }

    #[test]
    fn test_shared_input_without_producer_is_ambiguous() {
        let p = pipeline(
            "  - { name: a, type: elf-exec, ports-in: { binary-file: { value: bin } } }\n  - { name: b, type: elf-exec, ports-in: { binary-file: { value: bin } } }\n",
        );
        assert!(matches!(
            PipelineValidator::validate(&p),
            Err(CompileError::AmbiguousBinding { .. })
        ));
    }

    #[test]
    fn test_declared_type_must_match_port() {
        let p = Loader::load_pipeline(
            "id: p\nvariables:\n  - { name: bin, type: string, value: a.out }\nboxes:\n  - { name: run, type: elf-exec, ports-in: { binary-file: { value: bin } } }\n",
        )
        .unwrap();
        let err = PipelineValidator::validate(&p).unwrap_err();
        assert!(matches!(
            err,
            CompileError::PortTypeMismatch { ref expected, ref found, .. } if expected == "file" && found == "string"
        ));
    }

    #[test]
    fn test_producer_type_must_match_consumer() {
        let p = pipeline(
            "  - { name: gcc, type: gcc, ports-in: { source-files: { value: src } }, ports-out: { binary-file: { value: bin } } }\n  - { name: c, type: gcc, ports-in: { source-files: { value: bin } }, ports-out: { binary-file: { value: out } } }\n",
        );
        assert!(matches!(
            PipelineValidator::validate(&p),
            Err(CompileError::PortTypeMismatch { .. })
        ));
    }
}
