// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::job_config::Limits;

/// Limits of one environment on one hardware group: test id -> box name ->
/// limits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseLimits {
    tests: BTreeMap<String, BTreeMap<String, Limits>>,
}

impl ExerciseLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, test: impl Into<String>, box_name: impl Into<String>, limits: Limits) {
        self.tests
            .entry(test.into())
            .or_default()
            .insert(box_name.into(), limits);
    }

    pub fn get(&self, test: &str, box_name: &str) -> Option<&Limits> {
        self.tests.get(test)?.get(box_name)
    }

    /// `(test id, box name, limits)` entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &Limits)> {
        self.tests.iter().flat_map(|(test, boxes)| {
            boxes
                .iter()
                .map(move |(box_name, limits)| (test.as_str(), box_name.as_str(), limits))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.tests.values().all(BTreeMap::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_limits() {
        let limits: ExerciseLimits =
            serde_yaml::from_str("t1:\n  run:\n    time: 1.5\n    memory: 65536\n").unwrap();
        let run = limits.get("t1", "run").unwrap();
        assert_eq!(run.time, Some(1.5));
        assert_eq!(run.memory, Some(65536));
        assert!(limits.get("t1", "gcc").is_none());
        assert!(limits.get("t2", "run").is_none());
        assert_eq!(limits.iter().count(), 1);
    }

    #[test]
    fn test_insert() {
        let mut limits = ExerciseLimits::new();
        assert!(limits.is_empty());
        limits.insert("t1", "run", Limits::default());
        assert!(!limits.is_empty());
    }
}
