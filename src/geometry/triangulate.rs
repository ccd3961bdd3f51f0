// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exact ear-clipping triangulation of planar polygon faces

use super::exact::{newell_normal, orient2d, Point, Scalar};
use super::{Face, Mesh};
use crate::error::{CsgError, CsgResult};
use num_traits::Zero;
use std::cmp::Ordering;

/// Replace every face by triangles with the same winding
///
/// Vertex positions and indices are left untouched; triangles pass through.
pub fn triangulate(mesh: &Mesh) -> CsgResult<Mesh> {
    let mut result = Mesh::with_capacity(mesh.vertex_count(), mesh.face_count());
    result.vertices = mesh.vertices.clone();

    for (face_idx, face) in mesh.faces.iter().enumerate() {
        if face.is_triangle() {
            result.add_face(face.clone());
            continue;
        }
        for [a, b, c] in triangulate_face(&mesh.vertices, face).map_err(|reason| {
            CsgError::Triangulation {
                face: face_idx,
                reason,
            }
        })? {
            result.add_face(Face::triangle(a, b, c));
        }
    }

    tracing::debug!(
        faces_in = mesh.face_count(),
        triangles_out = result.face_count(),
        "Triangulated mesh"
    );
    Ok(result)
}

/// Ear-clip one planar face into triangles of vertex indices
///
/// The face is projected onto the coordinate plane that drops the dominant
/// axis of its normal. An ear is a strictly convex corner whose triangle
/// contains no other remaining corner, not even on its border, so
/// collinear corners are never clipped.
pub fn triangulate_face(vertices: &[Point], face: &Face) -> Result<Vec<[usize; 3]>, String> {
    let n = face.len();
    if n < 3 {
        return Err(format!("face has only {n} corners"));
    }
    if n == 3 {
        return Ok(vec![[face.indices[0], face.indices[1], face.indices[2]]]);
    }

    let points = face.indices.iter().map(|&i| &vertices[i]);
    let normal = newell_normal(points.clone());
    let axis = normal.dominant_axis();
    let winding = normal.component(axis).cmp(&Scalar::zero());
    if winding == Ordering::Equal {
        return Err("face has zero area".to_string());
    }

    // Cyclic projection keeps counter-clockwise faces counter-clockwise
    // when the dominant component is positive
    let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
    let projected: Vec<(&Scalar, &Scalar)> = points.map(|p| (p.coord(u), p.coord(v))).collect();

    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);
    let mut cursor = 0;

    while remaining.len() > 3 {
        let m = remaining.len();
        let ear = (0..m)
            .map(|offset| (cursor + offset) % m)
            .find(|&i| is_ear(&projected, &remaining, i, winding));
        let Some(i) = ear else {
            return Err(format!("no ear found with {m} corners left"));
        };

        let prev = remaining[(i + m - 1) % m];
        let next = remaining[(i + 1) % m];
        triangles.push([face.indices[prev], face.indices[remaining[i]], face.indices[next]]);
        remaining.remove(i);
        cursor = if i == 0 { 0 } else { i - 1 };
    }

    if orient2d(projected[remaining[0]], projected[remaining[1]], projected[remaining[2]]) != winding {
        return Err("last triangle is degenerate".to_string());
    }
    triangles.push([
        face.indices[remaining[0]],
        face.indices[remaining[1]],
        face.indices[remaining[2]],
    ]);
    Ok(triangles)
}

fn is_ear(projected: &[(&Scalar, &Scalar)], remaining: &[usize], i: usize, winding: Ordering) -> bool {
    let m = remaining.len();
    let a = projected[remaining[(i + m - 1) % m]];
    let b = projected[remaining[i]];
    let c = projected[remaining[(i + 1) % m]];

    if orient2d(a, b, c) != winding {
        return false;
    }

    let opposite = winding.reverse();
    remaining.iter().enumerate().all(|(k, &corner)| {
        if k == i || k == (i + 1) % m || k == (i + m - 1) % m {
            return true;
        }
        let p = projected[corner];
        // Inside or on the border unless strictly outside some edge
        orient2d(a, b, p) == opposite || orient2d(b, c, p) == opposite || orient2d(c, a, p) == opposite
    })
}
