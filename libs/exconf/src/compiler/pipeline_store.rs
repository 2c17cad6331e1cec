// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{CompileError, Result};
use crate::loader::Loader;
use crate::pipeline::Pipeline;

/// Source of pipeline definitions by id.
pub trait PipelineStore: Send + Sync {
    fn pipeline(&self, id: &str) -> Option<Arc<Pipeline>>;

    fn contains(&self, id: &str) -> bool {
        self.pipeline(id).is_some()
    }

    /// Known ids in a stable order.
    fn ids(&self) -> Vec<String>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryPipelineStore {
    pipelines: BTreeMap<String, Arc<Pipeline>>,
}

impl InMemoryPipelineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a pipeline under its own id.
    pub fn insert(&mut self, pipeline: Pipeline) {
        self.pipelines
            .insert(pipeline.id().to_string(), Arc::new(pipeline));
    }

    pub fn with(mut self, pipeline: Pipeline) -> Self {
        self.insert(pipeline);
        self
    }

    /// Load every `*.yaml`/`*.yml` file of `dir`. Two files declaring the
    /// same id are rejected.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext == "yaml" || ext == "yml")
            })
            .collect();
        paths.sort();

        let mut store = Self::new();
        for path in paths {
            let pipeline = Loader::load_pipeline_file(&path)?;
            if store.pipelines.contains_key(pipeline.id()) {
                return Err(CompileError::parsing(
                    path.display().to_string(),
                    format!("pipeline id '{}' is declared more than once", pipeline.id()),
                ));
            }
            store.insert(pipeline);
        }

        tracing::debug!("Loaded {} pipelines from {}", store.len(), dir.display());
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}

impl PipelineStore for InMemoryPipelineStore {
    fn pipeline(&self, id: &str) -> Option<Arc<Pipeline>> {
        self.pipelines.get(id).cloned()
    }

    fn contains(&self, id: &str) -> bool {
        self.pipelines.contains_key(id)
    }

    fn ids(&self) -> Vec<String> {
        self.pipelines.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let store = InMemoryPipelineStore::new().with(Loader::load_pipeline("id: a\n").unwrap());
        assert!(store.contains("a"));
        assert!(store.pipeline("b").is_none());
        assert_eq!(store.ids(), vec!["a".to_string()]);
    }

    #[test]
    fn test_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("compile.yaml"), "id: compile\n").unwrap();
        std::fs::write(dir.path().join("run.yml"), "id: run\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a pipeline").unwrap();

        let store = InMemoryPipelineStore::from_dir(dir.path()).unwrap();
        assert_eq!(store.ids(), vec!["compile".to_string(), "run".to_string()]);
    }

    #[test]
    fn test_from_dir_rejects_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.yaml"), "id: same\n").unwrap();
        std::fs::write(dir.path().join("b.yaml"), "id: same\n").unwrap();

        let err = InMemoryPipelineStore::from_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }
}
