// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::geometry::{BooleanOp, ManifoldReport};
use crate::pipeline::CombineOutcome;
use colored::*;
use std::path::Path;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Tool name, version and the request being run
    pub fn report_banner(op: BooleanOp, left: &Path, right: &Path) {
        println!("{}", "━".repeat(60).bright_black());
        println!(
            "{} {}",
            "polycsg".bold(),
            format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
        );
        println!(
            "  {} {} {} {}",
            format!("{op}:").bright_black(),
            left.display().to_string().cyan(),
            "with".bright_black(),
            right.display().to_string().cyan()
        );
        println!("{}", "━".repeat(60).bright_black());
    }

    /// Manifold verdict line for a file
    pub fn verdict(path: &Path, report: &ManifoldReport) -> String {
        if report.is_manifold() {
            format!("{} is a 2-manifold polyhedron!", path.display())
        } else {
            format!("{} is not a 2-manifold polyhedron!", path.display())
        }
    }

    pub fn report_verdict(path: &Path, report: &ManifoldReport) {
        let line = Self::verdict(path, report);
        if report.is_manifold() {
            println!("{}", line.green().bold());
        } else {
            println!("{}", line.red().bold());
            println!("  {}", report.to_string().bright_black());
        }
    }

    /// Summary of a finished combination
    pub fn report_outcome(outcome: &CombineOutcome, written: Option<&Path>, total: Duration) {
        match written {
            Some(path) => println!("write result to obj file: {}", path.display().to_string().cyan()),
            None => Self::report_warning(&format!("{} result is empty, no file written", outcome.op)),
        }
        println!(
            "  {} {}",
            "Vertices:".bright_black(),
            outcome.mesh.vertex_count().to_string().cyan()
        );
        println!(
            "  {} {}",
            "Triangles:".bright_black(),
            outcome.mesh.face_count().to_string().cyan()
        );
        for timing in &outcome.timings {
            println!(
                "  {} {}",
                format!("{}:", timing.stage).bright_black(),
                Self::format_duration(timing.elapsed)
            );
        }
        println!(
            "  {} {}",
            "Total time:".bright_black(),
            Self::format_duration(total).yellow()
        );
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("{} {}", "error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("{} {}", "warning:".yellow().bold(), message);
    }

    /// Format duration for display
    pub fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{validate, Primitive};

    #[test]
    fn test_format_duration() {
        assert_eq!(
            Reporter::format_duration(Duration::from_micros(500)),
            "500µs"
        );
        assert_eq!(
            Reporter::format_duration(Duration::from_millis(5)),
            "5.00ms"
        );
        assert_eq!(Reporter::format_duration(Duration::from_secs(2)), "2.00s");
    }

    #[test]
    fn test_verdict_lines() {
        let closed = validate(&Primitive::unit_cube().to_mesh());
        let open = validate(&Primitive::open_box().to_mesh());
        assert_eq!(
            Reporter::verdict(Path::new("cube.obj"), &closed),
            "cube.obj is a 2-manifold polyhedron!"
        );
        assert_eq!(
            Reporter::verdict(Path::new("lid.off"), &open),
            "lid.off is not a 2-manifold polyhedron!"
        );
    }
}
