// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Closed 2-manifold validation
//!
//! A mesh bounds a solid when every edge is shared by exactly two faces
//! traversing it in opposite directions and every vertex is surrounded by a
//! single cycle of faces. The checks are purely combinatorial and never
//! mutate the mesh.

use super::{HalfEdgeMesh, Mesh};
use ahash::{AHashMap, AHashSet};
use serde::Serialize;
use std::fmt;

/// Everything the validator found, with the counts it was based on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ManifoldReport {
    pub vertex_count: usize,
    pub face_count: usize,
    pub edge_count: usize,
    /// Faces with fewer than three corners, out-of-range or repeated indices
    pub invalid_faces: usize,
    /// Edges used by a single face
    pub boundary_edges: usize,
    /// Edges used by more than two faces
    pub non_manifold_edges: usize,
    /// Edges traversed twice in the same direction
    pub inconsistent_edges: usize,
    /// Vertices whose faces form more than one fan
    pub pinched_vertices: usize,
    /// Vertices no face references (allowed)
    pub isolated_vertices: usize,
}

impl ManifoldReport {
    /// True when the mesh is a closed, consistently oriented 2-manifold
    pub fn is_manifold(&self) -> bool {
        self.invalid_faces == 0
            && self.boundary_edges == 0
            && self.non_manifold_edges == 0
            && self.inconsistent_edges == 0
            && self.pinched_vertices == 0
    }

    /// Short description of the first violated property
    pub fn violation(&self) -> Option<&'static str> {
        if self.invalid_faces > 0 {
            Some("faces with invalid vertex indices")
        } else if self.boundary_edges > 0 {
            Some("boundary edges (the surface is not closed)")
        } else if self.non_manifold_edges > 0 {
            Some("edges shared by more than two faces")
        } else if self.inconsistent_edges > 0 {
            Some("inconsistently oriented faces")
        } else if self.pinched_vertices > 0 {
            Some("pinched vertices")
        } else {
            None
        }
    }
}

impl fmt::Display for ManifoldReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "vertices: {}, faces: {}, edges: {}",
            self.vertex_count, self.face_count, self.edge_count
        )?;
        writeln!(f, "invalid faces: {}", self.invalid_faces)?;
        writeln!(f, "boundary edges: {}", self.boundary_edges)?;
        writeln!(f, "non-manifold edges: {}", self.non_manifold_edges)?;
        writeln!(f, "inconsistently oriented edges: {}", self.inconsistent_edges)?;
        writeln!(f, "pinched vertices: {}", self.pinched_vertices)?;
        write!(f, "isolated vertices: {}", self.isolated_vertices)
    }
}

/// True when the mesh bounds a solid
pub fn is_manifold(mesh: &Mesh) -> bool {
    validate(mesh).is_manifold()
}

/// Run every check and collect the counts
pub fn validate(mesh: &Mesh) -> ManifoldReport {
    let vertex_count = mesh.vertex_count();
    let mut report = ManifoldReport {
        vertex_count,
        face_count: mesh.face_count(),
        ..Default::default()
    };

    let mut referenced = vec![false; vertex_count];
    for face in &mesh.faces {
        let mut corners = AHashSet::with_capacity(face.len());
        let valid = face.len() >= 3
            && face
                .indices
                .iter()
                .all(|&v| v < vertex_count && corners.insert(v));
        if !valid {
            report.invalid_faces += 1;
        }
        for &v in face.indices.iter().filter(|&&v| v < vertex_count) {
            referenced[v] = true;
        }
    }
    report.isolated_vertices = referenced.iter().filter(|r| !**r).count();

    if report.invalid_faces > 0 {
        // Connectivity is meaningless with broken faces
        return report;
    }

    // Directed use counts per undirected edge: (low -> high, high -> low)
    let mut uses: AHashMap<(usize, usize), (usize, usize)> = AHashMap::new();
    for face in &mesh.faces {
        for (a, b) in face.edges() {
            let entry = uses.entry((a.min(b), a.max(b))).or_insert((0, 0));
            if a < b {
                entry.0 += 1;
            } else {
                entry.1 += 1;
            }
        }
    }
    report.edge_count = uses.len();
    for &(forward, backward) in uses.values() {
        match forward + backward {
            1 => report.boundary_edges += 1,
            2 if forward == 1 => {}
            2 => report.inconsistent_edges += 1,
            _ => report.non_manifold_edges += 1,
        }
    }

    // Fans are only well defined on a clean edge structure
    if report.boundary_edges == 0 && report.non_manifold_edges == 0 && report.inconsistent_edges == 0 {
        if let Some(he_mesh) = HalfEdgeMesh::from_mesh(mesh) {
            report.pinched_vertices = (0..vertex_count)
                .filter(|&v| referenced[v] && he_mesh.fan_count(v) != 1)
                .count();
        }
    }

    report
}
