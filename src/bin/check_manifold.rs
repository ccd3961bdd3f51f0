// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Report whether a mesh file is a closed 2-manifold

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use polycsg::check_file;
use polycsg::cli::{init_tracing, Reporter};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "check-manifold")]
#[command(about = "Check whether a mesh is a closed 2-manifold polyhedron", long_about = None)]
struct Cli {
    /// Mesh file (.obj or .off)
    #[arg(value_name = "PATH")]
    input: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Log verbosity, repeat for more
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn run(cli: &Cli) -> Result<()> {
    let report = check_file(&cli.input).with_context(|| format!("cannot check {}", cli.input.display()))?;
    match cli.format {
        OutputFormat::Text => Reporter::report_verdict(&cli.input, &report),
        OutputFormat::Json => {
            let manifold = report.is_manifold();
            let value = json!({
                "path": cli.input.display().to_string(),
                "manifold": manifold,
                "report": report,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            Reporter::report_error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
