// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exact boolean combination of two mesh files

use anyhow::{Context, Result};
use clap::{ArgAction, ArgGroup, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use polycsg::cli::{init_tracing, Reporter};
use polycsg::{combine_files, BooleanOp, CancelToken, CsgConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "csg")]
#[command(about = "Exact union, difference and intersection of closed meshes", long_about = None)]
#[command(group(
    ArgGroup::new("op")
        .required(true)
        .multiple(false)
        .args(["union", "difference", "intersection"])
))]
struct Cli {
    /// Union of A and B
    #[arg(short = 'U', long, visible_short_alias = 'u')]
    union: bool,

    /// A minus B
    #[arg(short = 'D', long, visible_short_alias = 'd')]
    difference: bool,

    /// Intersection of A and B
    #[arg(short = 'I', long, visible_short_alias = 'i')]
    intersection: bool,

    /// First operand (.obj or .off)
    #[arg(value_name = "PATH_A")]
    left: PathBuf,

    /// Second operand (.obj or .off)
    #[arg(value_name = "PATH_B")]
    right: PathBuf,

    /// Result file (.obj or .off)
    #[arg(value_name = "PATH_OUT")]
    output: PathBuf,

    /// Configuration file (defaults to ./polycsg.toml when present)
    #[arg(long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Log verbosity, repeat for more
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Run every stage on the calling thread
    #[arg(long)]
    sequential: bool,
}

impl Cli {
    fn op(&self) -> BooleanOp {
        if self.union {
            BooleanOp::Union
        } else if self.difference {
            BooleanOp::Difference
        } else {
            BooleanOp::Intersection
        }
    }
}

fn spinner(op: BooleanOp) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("computing {op}"));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = CsgConfig::load(cli.config.as_deref())?;
    if cli.sequential {
        config = config.sequential();
    }

    let op = cli.op();
    Reporter::report_banner(op, &cli.left, &cli.right);

    let start = Instant::now();
    let progress = spinner(op);
    let result = combine_files(op, &cli.left, &cli.right, &cli.output, &config, CancelToken::new());
    progress.finish_and_clear();

    let report = result.with_context(|| format!("{op} of {} and {} failed", cli.left.display(), cli.right.display()))?;
    Reporter::report_outcome(&report.outcome, report.written.as_deref(), start.elapsed());
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

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_lowercase_flags() {
        let cli = Cli::try_parse_from(["csg", "-d", "a.obj", "b.obj", "c.obj"]).unwrap();
        assert_eq!(cli.op(), BooleanOp::Difference);
        let cli = Cli::try_parse_from(["csg", "-I", "a.off", "b.off", "c.off"]).unwrap();
        assert_eq!(cli.op(), BooleanOp::Intersection);
    }

    #[test]
    fn test_operation_required_and_exclusive() {
        assert!(Cli::try_parse_from(["csg", "a.obj", "b.obj", "c.obj"]).is_err());
        assert!(Cli::try_parse_from(["csg", "-U", "-D", "a.obj", "b.obj", "c.obj"]).is_err());
    }

    #[test]
    fn test_three_paths_required() {
        assert!(Cli::try_parse_from(["csg", "-U", "a.obj", "b.obj"]).is_err());
        assert!(Cli::try_parse_from(["csg", "-U", "a.obj", "b.obj", "c.obj", "d.obj"]).is_err());
    }
}
