// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Compiler settings via `exconf.yaml`.
//!
//! Settings describe the worker environment the compiled job runs in: the
//! sandbox name, the directory tokens the worker substitutes, and the
//! absolute paths of the tools that compilation and execution boxes invoke.

use crate::error::{CompileError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Tool binaries invoked by box lowering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ToolBinaries {
    pub gcc: String,
    pub fpc: String,
    pub mono: String,
    pub fetch: String,
    pub mkdir: String,
}

impl Default for ToolBinaries {
    fn default() -> Self {
        Self {
            gcc: "/usr/bin/gcc".to_string(),
            fpc: "/usr/bin/fpc".to_string(),
            mono: "/usr/bin/mono".to_string(),
            fetch: "fetch".to_string(),
            mkdir: "mkdir".to_string(),
        }
    }
}

/// Compiler settings from `exconf.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CompilerSettings {
    /// Sandbox used for every sandboxed task.
    pub sandbox: String,

    /// Token the worker replaces with the evaluation working directory.
    pub eval_dir: String,

    /// Token the worker replaces with the results directory.
    pub result_dir: String,

    pub binaries: ToolBinaries,

    /// Judge type name -> judge binary.
    pub judges: BTreeMap<String, String>,

    /// Judge used when a judge box leaves its type unbound.
    pub default_judge: String,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        let mut judges = BTreeMap::new();
        judges.insert(
            "recodex-judge-normal".to_string(),
            "${JUDGES_DIR}/recodex-judge-normal".to_string(),
        );
        judges.insert(
            "recodex-judge-shuffle".to_string(),
            "${JUDGES_DIR}/recodex-judge-shuffle".to_string(),
        );
        judges.insert(
            "diff".to_string(),
            "/usr/bin/diff".to_string(),
        );

        Self {
            sandbox: "isolate".to_string(),
            eval_dir: "${EVAL_DIR}".to_string(),
            result_dir: "${RESULT_DIR}".to_string(),
            binaries: ToolBinaries::default(),
            judges,
            default_judge: "recodex-judge-normal".to_string(),
        }
    }
}

impl CompilerSettings {
    /// Configuration file name.
    pub const FILE_NAME: &'static str = "exconf.yaml";

    /// Parse settings from YAML text. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| CompileError::parsing(Self::FILE_NAME, e))
    }

    /// Load settings from a directory. Returns error if the file is missing
    /// or cannot be parsed.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(Self::FILE_NAME);
        let content = std::fs::read_to_string(&path)?;
        let settings = Self::from_yaml_str(&content)?;
        tracing::info!("Loaded compiler settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from a directory, returning defaults if the file is
    /// missing or unparseable.
    pub fn load_or_default(dir: &Path) -> Self {
        let path = dir.join(Self::FILE_NAME);

        if !path.exists() {
            tracing::debug!(
                "No {} found in {}, using defaults",
                Self::FILE_NAME,
                dir.display()
            );
            return Self::default();
        }

        match Self::load(dir) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("{}, using default compiler settings", e);
                Self::default()
            }
        }
    }

    /// Resolve a judge type to its binary.
    pub fn judge_binary(&self, judge_type: &str) -> Option<&str> {
        self.judges.get(judge_type).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings = CompilerSettings::from_yaml_str(
            "sandbox: nsjail\nbinaries:\n  gcc: /opt/gcc/bin/gcc\n",
        )
        .unwrap();

        assert_eq!(settings.sandbox, "nsjail");
        assert_eq!(settings.binaries.gcc, "/opt/gcc/bin/gcc");
        assert_eq!(settings.binaries.fpc, "/usr/bin/fpc");
        assert_eq!(settings.eval_dir, "${EVAL_DIR}");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            CompilerSettings::load_or_default(dir.path()),
            CompilerSettings::default()
        );
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CompilerSettings::FILE_NAME),
            "result-dir: /results\n",
        )
        .unwrap();

        let settings = CompilerSettings::load(dir.path()).unwrap();
        assert_eq!(settings.result_dir, "/results");
    }

    #[test]
    fn test_invalid_yaml_is_parsing_error() {
        let err = CompilerSettings::from_yaml_str("sandbox: [unclosed").unwrap_err();
        assert!(matches!(err, CompileError::ConfigParsing { .. }));
    }

    #[test]
    fn test_judge_lookup() {
        let settings = CompilerSettings::default();
        assert_eq!(settings.judge_binary("diff"), Some("/usr/bin/diff"));
        assert_eq!(settings.judge_binary("unknown"), None);
    }
}
