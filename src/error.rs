// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for mesh combination

use crate::geometry::ManifoldReport;
use crate::io::MeshFormat;
use std::path::PathBuf;
use thiserror::Error;

pub type CsgResult<T> = Result<T, CsgError>;

#[derive(Debug, Error)]
pub enum CsgError {
    #[error("cannot read {}: {source}", path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{operand} is not a 2-manifold polyhedron! ({})", report.violation().unwrap_or("unknown violation"))]
    NotManifold {
        operand: String,
        report: Box<ManifoldReport>,
    },

    #[error("only support file type .obj and .off, got {extension:?} for {}", path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("malformed {format} file {} at line {line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        format: MeshFormat,
        line: usize,
        message: String,
    },

    #[error("combination produced an invalid boundary: {reason}")]
    DegenerateCombination { reason: String },

    #[error("cannot triangulate face {face}: {reason}")]
    Triangulation { face: usize, reason: String },

    #[error("operation cancelled")]
    Cancelled,

    #[error("fragment limit of {limit} exceeded")]
    ResourceLimit { limit: usize },

    #[error("cannot write {}: {source}", path.display())]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CsgError {
    pub fn not_manifold(operand: impl Into<String>, report: ManifoldReport) -> Self {
        Self::NotManifold {
            operand: operand.into(),
            report: Box::new(report),
        }
    }
}
