// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polycsg
//!
//! Exact constructive solid geometry for closed polyhedral meshes.
//! Union, difference and intersection of two watertight 2-manifold meshes
//! are computed with rational arithmetic, so coplanar faces, touching
//! solids and shared edges are resolved without tolerances.

pub mod budget;
pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod pipeline;
pub mod tracing_ext;

pub use budget::{CancelToken, WorkBudget};
pub use config::{CsgConfig, SplitterStrategy};
pub use error::{CsgError, CsgResult};
pub use geometry::{is_manifold, validate, BooleanOp, ManifoldReport, Mesh, Primitive};
pub use io::{read_mesh, write_mesh, MeshFormat};
pub use pipeline::{combine_meshes, combine_meshes_with, CombineOutcome, Operand, Pipeline};

use std::path::{Path, PathBuf};
use tracing::info;

/// Outcome of a file-to-file combination
#[derive(Debug, Clone)]
pub struct FileReport {
    pub outcome: CombineOutcome,
    /// Destination written, or `None` when the result was empty
    pub written: Option<PathBuf>,
}

/// Combine two mesh files and write the result
///
/// All three extensions are checked before any file is read. An empty
/// result is not written.
pub fn combine_files(
    op: BooleanOp,
    left: &Path,
    right: &Path,
    output: &Path,
    config: &CsgConfig,
    cancel: CancelToken,
) -> CsgResult<FileReport> {
    io::check_formats(&[left, right, output])?;

    let left_mesh = read_mesh(left)?;
    let right_mesh = read_mesh(right)?;

    let outcome = Pipeline::new(
        op,
        Operand::new(left.display().to_string(), left_mesh),
        Operand::new(right.display().to_string(), right_mesh),
    )
    .with_config(config.clone())
    .with_cancel_token(cancel)
    .run()?;

    if outcome.is_empty() {
        info!(%op, "Result is empty, nothing written");
        return Ok(FileReport {
            outcome,
            written: None,
        });
    }

    write_mesh(&outcome.mesh, output)?;
    Ok(FileReport {
        outcome,
        written: Some(output.to_path_buf()),
    })
}

/// Validate a single mesh file
pub fn check_file(path: &Path) -> CsgResult<ManifoldReport> {
    let mesh = read_mesh(path)?;
    Ok(validate(&mesh))
}
