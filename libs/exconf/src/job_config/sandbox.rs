// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Limits;

/// Sandbox a task runs in.
///
/// Limits are keyed by hardware group. A group without an entry has
/// undefined limits, which is not the same as zero limits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SandboxConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,

    /// Capture the program output for the result report.
    #[serde(default, skip_serializing_if = "is_false")]
    pub output: bool,

    #[serde(with = "limits_list")]
    pub limits: BTreeMap<String, Limits>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl SandboxConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_output(mut self, output: bool) -> Self {
        self.output = output;
        self
    }

    /// Limits of a hardware group, `None` when undefined.
    pub fn limits_for(&self, hw_group: &str) -> Option<&Limits> {
        self.limits.get(hw_group)
    }

    /// Set limits for the group named by `limits.hw_group_id`.
    pub fn set_limits(&mut self, limits: Limits) {
        self.limits.insert(limits.hw_group_id.clone(), limits);
    }
}

/// Limits are written as a list of entries each naming its hardware group.
mod limits_list {
    use super::Limits;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        limits: &BTreeMap<String, Limits>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(limits.values())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, Limits>, D::Error> {
        let entries = Vec::<Limits>::deserialize(deserializer)?;
        let mut limits = BTreeMap::new();
        for entry in entries {
            if entry.hw_group_id.is_empty() {
                return Err(D::Error::custom("limits entry is missing 'hw-group-id'"));
            }
            if limits.contains_key(&entry.hw_group_id) {
                return Err(D::Error::custom(format!(
                    "duplicate limits for hardware group '{}'",
                    entry.hw_group_id
                )));
            }
            limits.insert(entry.hw_group_id.clone(), entry);
        }
        Ok(limits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_serialized_as_list() {
        let mut sandbox = SandboxConfig::new("isolate");
        sandbox.stdin = Some("${EVAL_DIR}/01.in".into());
        sandbox.set_limits(Limits {
            time: Some(2.0),
            ..Limits::default().for_hw_group("group1")
        });

        let yaml = serde_yaml::to_string(&sandbox).unwrap();
        assert!(yaml.contains("limits:\n- hw-group-id: group1\n  time: 2.0"));
        assert!(!yaml.contains("stdout"));
        assert!(!yaml.contains("output"));

        let back: SandboxConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, sandbox);
    }

    #[test]
    fn test_undefined_hw_group() {
        let sandbox = SandboxConfig::new("isolate");
        assert!(sandbox.limits_for("group1").is_none());
        let yaml = serde_yaml::to_string(&sandbox).unwrap();
        assert!(yaml.contains("limits: []"));
    }

    #[test]
    fn test_limits_entry_requires_group() {
        let err = serde_yaml::from_str::<SandboxConfig>("name: isolate\nlimits:\n  - time: 1\n")
            .unwrap_err();
        assert!(err.to_string().contains("hw-group-id"));
    }

    #[test]
    fn test_missing_limits_rejected() {
        assert!(serde_yaml::from_str::<SandboxConfig>("name: isolate\n").is_err());
    }
}
