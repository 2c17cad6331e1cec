// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use anyhow::{Context, Result};
use exconf::CompileOptions;

use super::ExerciseArgs;

/// Print the box graph after cross-test folding.
pub fn run(args: &ExerciseArgs) -> Result<()> {
    let loaded = args.load(CompileOptions {
        settings: args.settings(),
        ..CompileOptions::default()
    })?;

    let tree = loaded
        .compiler
        .compile_tree(&loaded.exercise, &loaded.environment)
        .context("Failed to build the box graph")?;

    tracing::info!(
        "{} nodes after folding {} duplicates",
        tree.len(),
        tree.folded()
    );
    print!("{}", tree.graph().to_dot());
    Ok(())
}
