// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Wavefront OBJ reader and writer
//!
//! Only `v` and `f` statements are read. Texture and normal references in
//! faces are accepted and dropped; every other statement is skipped.

use super::format::SyntaxError;
use crate::geometry::{Face, Mesh, Point};
use nalgebra::Point3;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use std::io::Write;

#[derive(Parser)]
#[grammar = "io/obj.pest"]
struct ObjParser;

fn line_of(pair: &Pair<Rule>) -> usize {
    pair.as_span().start_pos().line_col().0
}

/// Parse OBJ text into a mesh
pub fn parse_obj(source: &str) -> Result<Mesh, SyntaxError> {
    let mut pairs = ObjParser::parse(Rule::obj, source).map_err(SyntaxError::from_pest)?;

    let mut mesh = Mesh::new();
    let mut faces: Vec<(usize, Vec<i64>)> = Vec::new();

    if let Some(obj) = pairs.next() {
        for pair in obj.into_inner() {
            match pair.as_rule() {
                Rule::vertex => {
                    let point = parse_vertex(pair)?;
                    mesh.add_vertex(point);
                }
                Rule::face => {
                    let line = line_of(&pair);
                    let indices = parse_face(pair, mesh.vertex_count())?;
                    faces.push((line, indices));
                }
                Rule::EOI => {}
                _ => {}
            }
        }
    }

    let vertex_count = mesh.vertex_count();
    for (line, indices) in faces {
        let resolved = indices
            .into_iter()
            .map(|index| {
                usize::try_from(index)
                    .ok()
                    .filter(|&i| i < vertex_count)
                    .ok_or_else(|| {
                        SyntaxError::new(
                            line,
                            format!("vertex index {} out of range (1..={vertex_count})", index + 1),
                        )
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        mesh.add_face(Face::new(resolved));
    }
    Ok(mesh)
}

fn parse_vertex(pair: Pair<Rule>) -> Result<Point, SyntaxError> {
    let line = line_of(&pair);
    let mut coords = [0.0f64; 3];
    for (slot, number) in coords.iter_mut().zip(pair.into_inner()) {
        *slot = number
            .as_str()
            .parse::<f64>()
            .map_err(|err| SyntaxError::new(line, format!("bad coordinate {:?}: {err}", number.as_str())))?;
    }
    Point::from_f64(&Point3::new(coords[0], coords[1], coords[2]))
        .ok_or_else(|| SyntaxError::new(line, "coordinate is not finite"))
}

/// Zero-based indices; negative references count back from `defined`
fn parse_face(pair: Pair<Rule>, defined: usize) -> Result<Vec<i64>, SyntaxError> {
    let line = line_of(&pair);
    let mut indices = Vec::new();
    for vertex_ref in pair.into_inner() {
        let text = vertex_ref
            .into_inner()
            .next()
            .map(|index| index.as_str())
            .unwrap_or_default();
        let index: i64 = text
            .parse()
            .map_err(|err| SyntaxError::new(line, format!("bad vertex index {text:?}: {err}")))?;
        let resolved = match index {
            0 => return Err(SyntaxError::new(line, "vertex index 0 is not valid")),
            i if i > 0 => i - 1,
            i => {
                let absolute = defined as i64 + i;
                if absolute < 0 {
                    return Err(SyntaxError::new(
                        line,
                        format!("relative index {i} reaches before the first vertex"),
                    ));
                }
                absolute
            }
        };
        indices.push(resolved);
    }
    Ok(indices)
}

/// Write a mesh as OBJ, coordinates rounded to the nearest double
pub fn write_obj<W: Write>(mesh: &Mesh, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "# polycsg: {} vertices, {} faces", mesh.vertex_count(), mesh.face_count())?;
    for position in mesh.positions_f64() {
        writeln!(out, "v {} {} {}", position.x, position.y, position.z)?;
    }
    for face in &mesh.faces {
        write!(out, "f")?;
        for index in &face.indices {
            write!(out, " {}", index + 1)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::exact::scalar;
    use crate::geometry::{is_manifold, Primitive};

    const TETRA: &str = "\
# tetrahedron
o tetra
v 0 0 0
v 1 0 0
v 0 1 0
v 0 0 1
vn 0 0 1
f 1 3 2
f 1 2 4
f 1 4 3
f 2 3 4
";

    #[test]
    fn test_parse_tetrahedron() {
        let mesh = parse_obj(TETRA).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 4);
        assert_eq!(mesh.faces[0].indices, vec![0, 2, 1]);
        assert!(is_manifold(&mesh));
    }

    #[test]
    fn test_face_references_with_texture_and_normal() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1/1/1 2//2 3/3\n").unwrap();
        assert_eq!(mesh.faces[0].indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_relative_indices() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n").unwrap();
        assert_eq!(mesh.faces[0].indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_decimal_coordinates_are_exact_doubles() {
        let mesh = parse_obj("v 0.5 -2 1e1\r\nv 1 0 0\r\nv 0 1 0 1.0\r\nf 1 2 3 # tri\r\n").unwrap();
        assert_eq!(mesh.vertices[0], Point::new(scalar(1) / scalar(2), scalar(-2), scalar(10)));
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn test_index_zero_rejected() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n").unwrap_err();
        assert_eq!(err.line, 4);
    }

    #[test]
    fn test_index_out_of_range() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\n\nf 1 2 9\n").unwrap_err();
        assert_eq!(err.line, 5);
        assert!(err.message.contains("out of range"));
    }

    #[test]
    fn test_malformed_vertex() {
        let err = parse_obj("v 0 0 0\nv 1 zero 0\n").unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_face_needs_three_vertices() {
        assert!(parse_obj("v 0 0 0\nv 1 0 0\nf 1 2\n").is_err());
    }

    #[test]
    fn test_infinite_coordinate_rejected() {
        let err = parse_obj("v 1e400 0 0\n").unwrap_err();
        assert!(err.message.contains("finite"));
    }

    #[test]
    fn test_write_then_read_cube() {
        let cube = Primitive::cuboid([0, 0, 0], [2, 3, 4]).to_mesh();
        let mut buffer = Vec::new();
        write_obj(&cube, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("v 2 3 4"));

        let parsed = parse_obj(&text).unwrap();
        assert_eq!(parsed, cube);
    }
}
