// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh file importer

use super::format::{MeshFormat, SyntaxError};
use super::{obj, off};
use crate::error::{CsgError, CsgResult};
use crate::geometry::Mesh;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Parse mesh text in the given format
pub fn parse_mesh(source: &str, format: MeshFormat) -> Result<Mesh, SyntaxError> {
    match format {
        MeshFormat::Obj => obj::parse_obj(source),
        MeshFormat::Off => off::parse_off(source),
    }
}

/// Read a mesh file, picking the parser by extension
pub fn read_mesh(path: &Path) -> CsgResult<Mesh> {
    let format = MeshFormat::from_path(path)?;
    let source = fs::read_to_string(path).map_err(|source| CsgError::InputUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let mesh = parse_mesh(&source, format).map_err(|err| err.into_csg_error(path, format))?;
    debug!(
        path = %path.display(),
        %format,
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "Read mesh"
    );
    Ok(mesh)
}
