// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;

/// Raw configuration documents of one exercise.
pub trait ExerciseSource {
    /// Exercise configuration document.
    fn exercise_config(&self) -> &str;

    /// Ids of the runtime environments the exercise has configurations for.
    fn environment_ids(&self) -> Vec<String>;

    /// Variables table document of an environment.
    fn environment_variables(&self, environment: &str) -> Option<&str>;

    /// Hardware groups the exercise may run on.
    fn hardware_groups(&self) -> Vec<String>;

    /// Limits document of an (environment, hardware group) pair.
    fn limits(&self, environment: &str, hw_group: &str) -> Option<&str>;
}

/// Exercise documents held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryExercise {
    config: String,
    environments: BTreeMap<String, String>,
    hw_groups: Vec<String>,
    limits: BTreeMap<(String, String), String>,
}

impl InMemoryExercise {
    pub const CONFIG_FILE: &'static str = "config.yaml";
    pub const ENVIRONMENTS_DIR: &'static str = "environments";
    pub const LIMITS_DIR: &'static str = "limits";

    pub fn new(config: impl Into<String>) -> Self {
        Self {
            config: config.into(),
            ..Self::default()
        }
    }

    pub fn with_environment(
        mut self,
        environment: impl Into<String>,
        variables: impl Into<String>,
    ) -> Self {
        self.environments.insert(environment.into(), variables.into());
        self
    }

    pub fn with_hw_group(mut self, hw_group: impl Into<String>) -> Self {
        let hw_group = hw_group.into();
        if !self.hw_groups.contains(&hw_group) {
            self.hw_groups.push(hw_group);
        }
        self
    }

    /// Add limits, registering the hardware group as well.
    pub fn with_limits(
        mut self,
        environment: impl Into<String>,
        hw_group: impl Into<String>,
        limits: impl Into<String>,
    ) -> Self {
        let hw_group = hw_group.into();
        self = self.with_hw_group(hw_group.clone());
        self.limits
            .insert((environment.into(), hw_group), limits.into());
        self
    }

    /// Read an exercise directory:
    ///
    /// ```text
    /// config.yaml
    /// environments/<environment>.yaml
    /// limits/<hw-group>/<environment>.yaml
    /// ```
    ///
    /// Every directory under `limits/` is a hardware group.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut exercise = Self::new(std::fs::read_to_string(dir.join(Self::CONFIG_FILE))?);

        for (environment, path) in yaml_files(&dir.join(Self::ENVIRONMENTS_DIR))? {
            exercise = exercise.with_environment(environment, std::fs::read_to_string(path)?);
        }

        let limits_dir = dir.join(Self::LIMITS_DIR);
        if limits_dir.is_dir() {
            let mut groups: Vec<_> = std::fs::read_dir(&limits_dir)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_dir())
                .collect();
            groups.sort();

            for group_dir in groups {
                let Some(hw_group) = group_dir.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                exercise = exercise.with_hw_group(hw_group);
                for (environment, path) in yaml_files(&group_dir)? {
                    exercise =
                        exercise.with_limits(environment, hw_group, std::fs::read_to_string(path)?);
                }
            }
        }

        Ok(exercise)
    }
}

/// `(file stem, path)` of the YAML files of `dir`, sorted; empty when the
/// directory does not exist.
fn yaml_files(dir: &Path) -> Result<Vec<(String, std::path::PathBuf)>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext == "yaml" || ext == "yml")
        })
        .filter_map(|path| {
            let stem = path.file_stem()?.to_str()?.to_string();
            Some((stem, path))
        })
        .collect();
    files.sort();
    Ok(files)
}

impl ExerciseSource for InMemoryExercise {
    fn exercise_config(&self) -> &str {
        &self.config
    }

    fn environment_ids(&self) -> Vec<String> {
        self.environments.keys().cloned().collect()
    }

    fn environment_variables(&self, environment: &str) -> Option<&str> {
        self.environments.get(environment).map(String::as_str)
    }

    fn hardware_groups(&self) -> Vec<String> {
        self.hw_groups.clone()
    }

    fn limits(&self, environment: &str, hw_group: &str) -> Option<&str> {
        self.limits
            .get(&(environment.to_string(), hw_group.to_string()))
            .map(String::as_str)
    }
}
