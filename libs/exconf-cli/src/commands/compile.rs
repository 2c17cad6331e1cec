// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::path::Path;

use anyhow::{Context, Result};
use exconf::CompileOptions;

use super::{ExerciseArgs, JobKind, OutputFormat};

/// Compile and print (or write) the job configuration.
pub fn run(
    args: &ExerciseArgs,
    job_type: JobKind,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let options = CompileOptions {
        job_type: job_type.into(),
        settings: args.settings(),
    };
    let loaded = args.load(options)?;
    let job = loaded
        .compiler
        .compile(&loaded.exercise, &loaded.environment)
        .with_context(|| {
            format!(
                "Failed to compile {} for environment '{}'",
                args.dir.display(),
                loaded.environment
            )
        })?;

    let document = match format {
        OutputFormat::Yaml => job.to_yaml()?,
        OutputFormat::Json => job.to_json()?,
    };

    match output {
        Some(path) => {
            std::fs::write(path, &document)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {} tasks to {}", job.tasks.len(), path.display());
        }
        None => print!("{}", document),
    }

    Ok(())
}
