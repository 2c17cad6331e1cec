// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! exconf CLI
//!
//! Compiles exercise directories into job configurations.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{ExerciseArgs, JobKind, OutputFormat};

#[derive(Parser)]
#[command(name = "exconf")]
#[command(author, version, about = "Exercise configuration compiler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile an exercise into a job configuration
    Compile {
        #[command(flatten)]
        exercise: ExerciseArgs,

        /// Job type
        #[arg(long, value_enum, default_value = "student")]
        job_type: JobKind,

        /// Output format (yaml or json)
        #[arg(long, value_enum, default_value = "yaml")]
        format: OutputFormat,

        /// Write the job to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<std::path::PathBuf>,
    },

    /// Check an exercise without compiling it
    Validate {
        #[command(flatten)]
        exercise: ExerciseArgs,
    },

    /// Print the deduplicated box graph in Graphviz format
    Graph {
        #[command(flatten)]
        exercise: ExerciseArgs,
    },

    /// List the box catalog with its ports
    Boxes,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Compile {
            exercise,
            job_type,
            format,
            output,
        } => commands::compile::run(&exercise, job_type, format, output.as_deref()),
        Commands::Validate { exercise } => commands::validate::run(&exercise),
        Commands::Graph { exercise } => commands::graph::run(&exercise),
        Commands::Boxes => commands::boxes::run(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_args(extra: &[&str]) -> Vec<String> {
        ["exconf", "compile", "hello", "--pipelines", "pipelines", "-e", "linux"]
            .iter()
            .chain(extra)
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_job_type_defaults_to_student() {
        let cli = Cli::try_parse_from(compile_args(&[])).unwrap();
        let Commands::Compile { job_type, .. } = cli.command else {
            panic!("expected compile command");
        };
        assert_eq!(job_type, JobKind::Student);
        assert_eq!(exconf::JobType::from(job_type), exconf::JobType::Student);
    }

    #[test]
    fn test_job_type_parsed_by_clap() {
        let cli = Cli::try_parse_from(compile_args(&["--job-type", "reference"])).unwrap();
        let Commands::Compile { job_type, .. } = cli.command else {
            panic!("expected compile command");
        };
        assert_eq!(exconf::JobType::from(job_type), exconf::JobType::Reference);
    }

    #[test]
    fn test_unknown_job_type_rejected_by_clap() {
        let err = Cli::try_parse_from(compile_args(&["--job-type", "teacher"]))
            .err()
            .unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }
}
