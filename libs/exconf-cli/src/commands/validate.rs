// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use anyhow::{Context, Result};
use exconf::CompileOptions;

use super::ExerciseArgs;

pub fn run(args: &ExerciseArgs) -> Result<()> {
    let loaded = args.load(CompileOptions {
        settings: args.settings(),
        ..CompileOptions::default()
    })?;

    loaded
        .compiler
        .validate(&loaded.exercise, &loaded.environment)
        .with_context(|| format!("{} is invalid", args.dir.display()))?;

    println!(
        "{} is valid for environment '{}'",
        args.dir.display(),
        loaded.environment
    );
    Ok(())
}
