// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Object File Format reader and writer

use super::format::SyntaxError;
use crate::geometry::{Face, Mesh, Point};
use nalgebra::Point3;
use pest::Parser;
use pest_derive::Parser;
use std::io::Write;

#[derive(Parser)]
#[grammar = "io/off.pest"]
struct OffParser;

/// One non-empty line of numbers
struct Record<'a> {
    line: usize,
    keyword: bool,
    numbers: Vec<&'a str>,
}

fn records(source: &str) -> Result<Vec<Record<'_>>, SyntaxError> {
    let mut pairs = OffParser::parse(Rule::off, source).map_err(SyntaxError::from_pest)?;
    let mut records = Vec::new();
    if let Some(off) = pairs.next() {
        for pair in off.into_inner() {
            match pair.as_rule() {
                Rule::record => {
                    let line = pair.as_span().start_pos().line_col().0;
                    let mut record = Record {
                        line,
                        keyword: false,
                        numbers: Vec::new(),
                    };
                    for token in pair.into_inner() {
                        match token.as_rule() {
                            Rule::keyword => record.keyword = true,
                            _ => record.numbers.push(token.as_str()),
                        }
                    }
                    records.push(record);
                }
                Rule::EOI => {}
                _ => {}
            }
        }
    }
    Ok(records)
}

fn count(line: usize, text: &str, what: &str) -> Result<usize, SyntaxError> {
    text.parse()
        .map_err(|_| SyntaxError::new(line, format!("{what} must be a non-negative integer, got {text:?}")))
}

/// Parse OFF text into a mesh
///
/// The `OFF` keyword is optional and the counts may share its line. Face
/// records may carry trailing color values, which are ignored.
pub fn parse_off(source: &str) -> Result<Mesh, SyntaxError> {
    let records = records(source)?;
    let mut iter = records.iter().peekable();

    let header_line = iter.peek().map(|r| r.line).unwrap_or(1);
    let counts = match iter.next() {
        Some(first) if first.keyword && first.numbers.is_empty() => iter.next(),
        Some(first) => Some(first),
        None => None,
    }
    .ok_or_else(|| SyntaxError::new(header_line, "missing vertex and face counts"))?;

    if counts.numbers.len() < 2 {
        return Err(SyntaxError::new(counts.line, "expected vertex and face counts"));
    }
    let vertex_count = count(counts.line, counts.numbers[0], "vertex count")?;
    let face_count = count(counts.line, counts.numbers[1], "face count")?;

    // Counts are untrusted; reserve no more than the remaining records can fill
    let remaining = iter.len();
    let mut mesh = Mesh::with_capacity(vertex_count.min(remaining), face_count.min(remaining));
    for _ in 0..vertex_count {
        let record = iter
            .next()
            .ok_or_else(|| SyntaxError::new(counts.line, format!("expected {vertex_count} vertices")))?;
        if record.keyword || record.numbers.len() < 3 {
            return Err(SyntaxError::new(record.line, "vertex needs three coordinates"));
        }
        let mut coords = [0.0f64; 3];
        for (slot, text) in coords.iter_mut().zip(&record.numbers) {
            *slot = text
                .parse()
                .map_err(|err| SyntaxError::new(record.line, format!("bad coordinate {text:?}: {err}")))?;
        }
        let point = Point::from_f64(&Point3::new(coords[0], coords[1], coords[2]))
            .ok_or_else(|| SyntaxError::new(record.line, "coordinate is not finite"))?;
        mesh.add_vertex(point);
    }

    for _ in 0..face_count {
        let record = iter
            .next()
            .ok_or_else(|| SyntaxError::new(counts.line, format!("expected {face_count} faces")))?;
        let Some((&first, rest)) = record.numbers.split_first() else {
            return Err(SyntaxError::new(record.line, "empty face record"));
        };
        let corners = count(record.line, first, "corner count")?;
        if corners < 3 || rest.len() < corners {
            return Err(SyntaxError::new(
                record.line,
                format!("face needs at least 3 corners and {corners} indices"),
            ));
        }
        let indices = rest[..corners]
            .iter()
            .map(|text| {
                count(record.line, text, "vertex index").and_then(|index| {
                    if index < vertex_count {
                        Ok(index)
                    } else {
                        Err(SyntaxError::new(
                            record.line,
                            format!("vertex index {index} out of range (0..{vertex_count})"),
                        ))
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        mesh.add_face(Face::new(indices));
    }

    Ok(mesh)
}

/// Write a mesh as OFF, coordinates rounded to the nearest double
pub fn write_off<W: Write>(mesh: &Mesh, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "OFF")?;
    writeln!(out, "{} {} 0", mesh.vertex_count(), mesh.face_count())?;
    for position in mesh.positions_f64() {
        writeln!(out, "{} {} {}", position.x, position.y, position.z)?;
    }
    for face in &mesh.faces {
        write!(out, "{}", face.len())?;
        for index in &face.indices {
            write!(out, " {index}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{is_manifold, Primitive};

    const TETRA: &str = "\
OFF
# counts
4 4 6
0 0 0
1 0 0
0 1 0
0 0 1
3 0 2 1
3 0 1 3
3 0 3 2
3 1 2 3 255 0 0
";

    #[test]
    fn test_parse_tetrahedron() {
        let mesh = parse_off(TETRA).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 4);
        assert_eq!(mesh.faces[3].indices, vec![1, 2, 3]);
        assert!(is_manifold(&mesh));
    }

    #[test]
    fn test_counts_on_header_line_and_missing_keyword() {
        let inline = parse_off("OFF 3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n").unwrap();
        let bare = parse_off("3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n").unwrap();
        assert_eq!(inline, bare);
        assert_eq!(inline.face_count(), 1);
    }

    #[test]
    fn test_truncated_file() {
        let err = parse_off("OFF\n4 4 6\n0 0 0\n1 0 0\n").unwrap_err();
        assert!(err.message.contains("vertices"));
    }

    #[test]
    fn test_index_out_of_range() {
        let err = parse_off("OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 3\n").unwrap_err();
        assert_eq!(err.line, 6);
    }

    #[test]
    fn test_oversized_counts_are_a_syntax_error() {
        let err = parse_off("OFF\n4000000000000000000 1 0\n0 0 0\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("vertices"));

        let err = parse_off("OFF\n3 18446744073709551615 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n").unwrap_err();
        assert!(err.message.contains("faces"));
    }

    #[test]
    fn test_short_face_record() {
        let err = parse_off("OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n4 0 1 2\n").unwrap_err();
        assert_eq!(err.line, 6);
    }

    #[test]
    fn test_garbage_rejected() {
        let err = parse_off("OFF\n3 1 0\n0 0 zero\n").unwrap_err();
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_write_then_read_box() {
        let cube = Primitive::cuboid([-1, 0, 0], [1, 1, 5]).to_mesh();
        let mut buffer = Vec::new();
        write_off(&cube, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("OFF\n8 6 0\n"));
        assert_eq!(parse_off(&text).unwrap(), cube);
    }
}
