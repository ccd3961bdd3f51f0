// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh file formats

use crate::error::{CsgError, CsgResult};
use pest::error::{Error as PestError, LineColLocation};
use pest::RuleType;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Supported mesh file formats, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshFormat {
    Obj,
    Off,
}

impl MeshFormat {
    /// Format of `path`, matched case-insensitively on the extension
    pub fn from_path(path: &Path) -> CsgResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        match extension.to_ascii_lowercase().as_str() {
            "obj" => Ok(Self::Obj),
            "off" => Ok(Self::Off),
            _ => Err(CsgError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: extension.to_string(),
            }),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Obj => "obj",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for MeshFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Obj => f.write_str("OBJ"),
            Self::Off => f.write_str("OFF"),
        }
    }
}

/// Malformed mesh text, located by 1-based line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn from_pest<R: RuleType>(err: PestError<R>) -> Self {
        let line = match err.line_col {
            LineColLocation::Pos((line, _)) | LineColLocation::Span((line, _), _) => line,
        };
        Self::new(line, err.variant.message().into_owned())
    }

    pub fn into_csg_error(self, path: &Path, format: MeshFormat) -> CsgError {
        CsgError::Parse {
            path: path.to_path_buf(),
            format,
            line: self.line,
            message: self.message,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Check every path before any file is touched
pub fn check_formats(paths: &[&Path]) -> CsgResult<Vec<MeshFormat>> {
    paths.iter().map(|path| MeshFormat::from_path(path)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(MeshFormat::from_path(Path::new("a/cube.obj")).unwrap(), MeshFormat::Obj);
        assert_eq!(MeshFormat::from_path(Path::new("CUBE.OFF")).unwrap(), MeshFormat::Off);
        assert_eq!(MeshFormat::from_path(Path::new("mesh.Obj")).unwrap(), MeshFormat::Obj);
    }

    #[test]
    fn test_unsupported_extension() {
        match MeshFormat::from_path(Path::new("model.stl")) {
            Err(CsgError::UnsupportedFormat { extension, .. }) => assert_eq!(extension, "stl"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(MeshFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_check_formats_stops_on_first_bad_path() {
        let result = check_formats(&[Path::new("a.obj"), Path::new("b.ply"), Path::new("c.off")]);
        assert!(matches!(result, Err(CsgError::UnsupportedFormat { .. })));

        let formats = check_formats(&[Path::new("a.obj"), Path::new("b.off")]).unwrap();
        assert_eq!(formats, vec![MeshFormat::Obj, MeshFormat::Off]);
    }
}
