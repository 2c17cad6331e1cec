// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use super::boxes::BoxKind;
use super::{Port, PortDirection, PortMeta, PortRecord};
use crate::error::{CompileError, Result};
use crate::variables::VariableType;

/// Box as written in a pipeline document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BoxMeta {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: BoxKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ports_in: BTreeMap<String, PortRecord>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ports_out: BTreeMap<String, PortRecord>,
}

/// Treat an explicit YAML `null` like a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Configured box: a catalog type with its ports bound to variable names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineBox {
    name: String,
    kind: BoxKind,
    inputs: Vec<Port>,
    outputs: Vec<Port>,
}

impl PipelineBox {
    /// Box of the given type with every port unbound.
    pub fn new(name: impl Into<String>, kind: BoxKind) -> Self {
        Self {
            name: name.into(),
            kind,
            inputs: kind.input_ports().iter().copied().map(Port::new).collect(),
            outputs: kind.output_ports().iter().copied().map(Port::new).collect(),
        }
    }

    /// Build from a document record. Ports appear in catalog order.
    pub fn from_meta(meta: &BoxMeta) -> Result<Self> {
        let name = if meta.name.trim().is_empty() {
            meta.kind.default_name().to_string()
        } else {
            meta.name.clone()
        };

        let inputs = Self::bind_ports(
            &name,
            meta.kind.input_ports(),
            &meta.ports_in,
            PortDirection::Input,
        )?;
        let outputs = Self::bind_ports(
            &name,
            meta.kind.output_ports(),
            &meta.ports_out,
            PortDirection::Output,
        )?;

        Ok(Self {
            name,
            kind: meta.kind,
            inputs,
            outputs,
        })
    }

    fn bind_ports(
        box_name: &str,
        catalog: &'static [PortMeta],
        records: &BTreeMap<String, PortRecord>,
        direction: PortDirection,
    ) -> Result<Vec<Port>> {
        let what = || format!("box '{}'", box_name);

        if let Some(unknown) = records
            .keys()
            .find(|name| !catalog.iter().any(|meta| meta.name == name.as_str()))
        {
            return Err(CompileError::parsing(
                what(),
                format!("no {} port named '{}'", direction, unknown),
            ));
        }

        catalog
            .iter()
            .map(|meta| {
                let Some(record) = records.get(meta.name) else {
                    return Ok(Port::new(*meta));
                };

                if let (Some(declared), Some(expected)) = (&record.var_type, meta.var_type) {
                    let declared = VariableType::parse(declared)
                        .map_err(|e| CompileError::parsing(what(), e))?;
                    if declared != expected {
                        return Err(CompileError::parsing(
                            what(),
                            format!(
                                "port '{}' is {} in the catalog, not {}",
                                meta.name, expected, declared
                            ),
                        ));
                    }
                }

                Ok(Port::new(*meta).bind(&record.value))
            })
            .collect()
    }

    /// Bind a port, returning `None` if the box has no such port.
    pub fn with_binding(mut self, direction: PortDirection, port: &str, variable: &str) -> Option<Self> {
        let ports = match direction {
            PortDirection::Input => &mut self.inputs,
            PortDirection::Output => &mut self.outputs,
        };
        let slot = ports.iter_mut().find(|p| p.name() == port)?;
        *slot = slot.clone().bind(variable);
        Some(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> BoxKind {
        self.kind
    }

    pub fn inputs(&self) -> &[Port] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Port] {
        &self.outputs
    }

    pub fn ports(&self, direction: PortDirection) -> &[Port] {
        match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        }
    }

    pub fn to_meta(&self) -> BoxMeta {
        let records = |ports: &[Port]| -> BTreeMap<String, PortRecord> {
            ports
                .iter()
                .filter(|p| p.is_bound())
                .map(|p| (p.name().to_string(), PortRecord::from(p)))
                .collect()
        };
        BoxMeta {
            name: self.name.clone(),
            kind: self.kind,
            ports_in: records(&self.inputs),
            ports_out: records(&self.outputs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(yaml: &str) -> BoxMeta {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_ports_follow_catalog_order() {
        let b = PipelineBox::from_meta(&meta(
            "name: compile\ntype: gcc\nports-in:\n  args: { type: 'string[]', value: flags }\n  source-files: { type: 'file[]', value: $sources }\nports-out:\n  binary-file: { type: file, value: binary }\n",
        ))
        .unwrap();

        let names: Vec<_> = b.inputs().iter().map(Port::name).collect();
        assert_eq!(names, vec!["source-files", "extra-files", "args"]);
        assert_eq!(b.inputs()[0].variable(), Some("sources"));
        assert!(!b.inputs()[1].is_bound());
        assert_eq!(b.outputs()[0].variable(), Some("binary"));
    }

    #[test]
    fn test_unknown_port_rejected() {
        let err = PipelineBox::from_meta(&meta(
            "name: run\ntype: elf-exec\nports-in:\n  turbo: { type: string, value: x }\n",
        ))
        .unwrap_err();
        assert!(err.to_string().contains("no input port named 'turbo'"));
    }

    #[test]
    fn test_catalog_type_conflict_rejected() {
        let err = PipelineBox::from_meta(&meta(
            "name: run\ntype: elf-exec\nports-in:\n  binary-file: { type: string, value: x }\n",
        ))
        .unwrap_err();
        assert!(matches!(err, CompileError::ConfigParsing { .. }));
    }

    #[test]
    fn test_null_ports_and_default_name() {
        let b = PipelineBox::from_meta(&meta("name: ''\ntype: judge\nports-in: ~\n")).unwrap();
        assert_eq!(b.name(), "Output Judge");
        assert!(b.inputs().iter().all(|p| !p.is_bound()));
        assert!(b.outputs().is_empty());
    }

    #[test]
    fn test_meta_round_trip() {
        let b = PipelineBox::new("run", BoxKind::ElfExec)
            .with_binding(PortDirection::Input, "binary-file", "binary")
            .unwrap();
        assert_eq!(PipelineBox::from_meta(&b.to_meta()).unwrap(), b);
        assert!(
            PipelineBox::new("run", BoxKind::ElfExec)
                .with_binding(PortDirection::Input, "nope", "x")
                .is_none()
        );
    }
}
