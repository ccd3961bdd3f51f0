// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh file exporter

use super::format::MeshFormat;
use super::{obj, off};
use crate::error::{CsgError, CsgResult};
use crate::geometry::Mesh;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Serialize a mesh into a writer
pub fn encode_mesh<W: Write>(mesh: &Mesh, format: MeshFormat, out: &mut W) -> std::io::Result<()> {
    match format {
        MeshFormat::Obj => obj::write_obj(mesh, out),
        MeshFormat::Off => off::write_off(mesh, out),
    }
}

/// Write a mesh file, picking the format by extension
///
/// The file is written next to its destination and renamed into place,
/// so a failed write never leaves a partial file at `path`.
pub fn write_mesh(mesh: &Mesh, path: &Path) -> CsgResult<()> {
    let format = MeshFormat::from_path(path)?;
    let unwritable = |source| CsgError::OutputUnwritable {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir).map_err(unwritable)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        encode_mesh(mesh, format, &mut writer).map_err(unwritable)?;
        writer.flush().map_err(unwritable)?;
    }
    temp.persist(path).map_err(|err| unwritable(err.error))?;

    debug!(
        path = %path.display(),
        %format,
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "Wrote mesh"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use crate::io::read_mesh;

    #[test]
    fn test_write_and_read_back() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let cube = Primitive::unit_cube().to_mesh();
        for name in ["cube.obj", "cube.off"] {
            let path = dir.path().join(name);
            write_mesh(&cube, &path)?;
            assert_eq!(read_mesh(&path)?, cube);
        }
        Ok(())
    }

    #[test]
    fn test_missing_directory() {
        let cube = Primitive::unit_cube().to_mesh();
        let result = write_mesh(&cube, Path::new("/nonexistent/polycsg/out.obj"));
        assert!(matches!(result, Err(CsgError::OutputUnwritable { .. })));
    }

    #[test]
    fn test_overwrites_existing_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.off");
        std::fs::write(&path, "stale")?;
        write_mesh(&Primitive::regular_tetrahedron().to_mesh(), &path)?;
        assert!(std::fs::read_to_string(&path)?.starts_with("OFF\n4 4 0\n"));
        Ok(())
    }
}
