// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

pub mod boxes;
pub mod compile;
pub mod graph;
pub mod validate;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use exconf::{
    CompileOptions, Compiler, CompilerSettings, InMemoryExercise, InMemoryPipelineStore, JobType,
    RuntimeEnvironment,
};

/// Where an exercise and its pipelines live.
#[derive(Args, Debug, Clone)]
pub struct ExerciseArgs {
    /// Exercise directory (config.yaml, environments/, limits/)
    #[arg(value_name = "EXERCISE_DIR")]
    pub dir: PathBuf,

    /// Directory of pipeline definitions
    #[arg(long, value_name = "DIR")]
    pub pipelines: PathBuf,

    /// Runtime environment to compile for
    #[arg(short, long)]
    pub environment: String,

    /// Directory holding exconf.yaml (default: exercise directory)
    #[arg(long, value_name = "DIR")]
    pub settings: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

/// Who the compiled job is evaluated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JobKind {
    Student,
    Reference,
}

impl From<JobKind> for JobType {
    fn from(kind: JobKind) -> Self {
        match kind {
            JobKind::Student => JobType::Student,
            JobKind::Reference => JobType::Reference,
        }
    }
}

/// Everything a command needs to run the compiler.
pub struct Loaded {
    pub compiler: Compiler,
    pub exercise: InMemoryExercise,
    pub environment: RuntimeEnvironment,
}

impl ExerciseArgs {
    pub fn load(&self, options: CompileOptions) -> Result<Loaded> {
        let store = InMemoryPipelineStore::from_dir(&self.pipelines).with_context(|| {
            format!("Failed to load pipelines from {}", self.pipelines.display())
        })?;
        let exercise = InMemoryExercise::from_dir(&self.dir)
            .with_context(|| format!("Failed to read exercise {}", self.dir.display()))?;

        Ok(Loaded {
            compiler: Compiler::with_options(Arc::new(store), options),
            exercise,
            environment: RuntimeEnvironment::new(self.environment.clone()),
        })
    }

    pub fn settings(&self) -> CompilerSettings {
        let dir = self.settings.as_deref().unwrap_or(self.dir.as_path());
        CompilerSettings::load_or_default(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exconf::ExerciseSource;

    fn write(path: &std::path::Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_load_and_compile_directory() {
        let root = tempfile::tempdir().unwrap();
        let exercise_dir = root.path().join("hello");
        let pipelines_dir = root.path().join("pipelines");

        write(
            &pipelines_dir.join("run.yaml"),
            "id: run\nboxes:\n  - { name: exec, type: elf-exec, ports-in: { binary-file: { value: binary } } }\n",
        );
        write(
            &exercise_dir.join("config.yaml"),
            "tests:\n  t1:\n    environments:\n      linux: { pipelines: [{ name: run }] }\n",
        );
        write(
            &exercise_dir.join("environments/linux.yaml"),
            "- { name: binary, type: file, value: a.out }\n",
        );
        write(&exercise_dir.join("exconf.yaml"), "sandbox: nsjail\n");

        let args = ExerciseArgs {
            dir: exercise_dir,
            pipelines: pipelines_dir,
            environment: "linux".to_string(),
            settings: None,
        };
        assert_eq!(args.settings().sandbox, "nsjail");

        let loaded = args
            .load(CompileOptions {
                settings: args.settings(),
                ..CompileOptions::default()
            })
            .unwrap();
        assert_eq!(loaded.exercise.environment_ids(), vec!["linux".to_string()]);

        let job = loaded
            .compiler
            .compile(&loaded.exercise, &loaded.environment)
            .unwrap();
        assert_eq!(job.tasks.len(), 1);
        assert_eq!(job.tasks[0].sandbox.as_ref().unwrap().name, "nsjail");
    }

    #[test]
    fn test_missing_pipeline_dir_has_context() {
        let root = tempfile::tempdir().unwrap();
        let args = ExerciseArgs {
            dir: root.path().to_path_buf(),
            pipelines: root.path().join("missing"),
            environment: "linux".to_string(),
            settings: None,
        };
        let err = args.load(CompileOptions::default()).err().unwrap();
        assert!(err.to_string().contains("Failed to load pipelines"));
    }
}
