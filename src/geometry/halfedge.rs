// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Half-edge mesh representation
//! Index-based connectivity derived from a polygon mesh, used by the manifold checks

use super::Mesh;
use ahash::AHashMap;

/// Half-edge in a half-edge mesh
/// Each edge has two half-edges, one for each direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge {
    /// Next half-edge in the same face (counter-clockwise)
    pub next: usize,
    /// Previous half-edge in the same face
    pub prev: usize,
    /// Twin half-edge (opposite direction, belongs to adjacent face)
    pub twin: Option<usize>,
    /// Vertex this half-edge points to
    pub vertex: usize,
    /// Face this half-edge belongs to
    pub face: usize,
}

/// Edge connecting two vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// First half-edge seen for this edge
    pub half_edge_a: usize,
    /// Opposite half-edge, absent on a boundary
    pub half_edge_b: Option<usize>,
}

/// Half-edge mesh with full topological connectivity
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    pub vertex_count: usize,
    pub half_edges: Vec<HalfEdge>,
    pub edges: Vec<Edge>,
    /// First half-edge of each face
    pub face_starts: Vec<usize>,
    outgoing: Vec<Vec<usize>>,
}

impl HalfEdgeMesh {
    /// Derive connectivity from a mesh
    ///
    /// Returns `None` if a face has fewer than three corners or references a
    /// vertex out of range. When a directed edge occurs more than once only
    /// the first occurrence receives a twin.
    pub fn from_mesh(mesh: &Mesh) -> Option<Self> {
        let vertex_count = mesh.vertex_count();
        let total: usize = mesh.faces.iter().map(|f| f.len()).sum();
        let mut he_mesh = Self {
            vertex_count,
            half_edges: Vec::with_capacity(total),
            edges: Vec::new(),
            face_starts: Vec::with_capacity(mesh.face_count()),
            outgoing: vec![Vec::new(); vertex_count],
        };

        for (face_idx, face) in mesh.faces.iter().enumerate() {
            let n = face.len();
            if n < 3 || face.indices.iter().any(|&v| v >= vertex_count) {
                return None;
            }
            let start = he_mesh.half_edges.len();
            he_mesh.face_starts.push(start);
            for (i, (from, to)) in face.edges().enumerate() {
                he_mesh.half_edges.push(HalfEdge {
                    next: start + (i + 1) % n,
                    prev: start + (i + n - 1) % n,
                    twin: None,
                    vertex: to,
                    face: face_idx,
                });
                he_mesh.outgoing[from].push(start + i);
            }
        }

        he_mesh.build_edge_map();
        Some(he_mesh)
    }

    /// Connect twin half-edges and build the edge list
    fn build_edge_map(&mut self) {
        let mut directed: AHashMap<(usize, usize), usize> = AHashMap::new();
        for he_idx in 0..self.half_edges.len() {
            directed.entry(self.endpoints(he_idx)).or_insert(he_idx);
        }

        let mut seen: AHashMap<(usize, usize), ()> = AHashMap::new();
        for he_idx in 0..self.half_edges.len() {
            let (from, to) = self.endpoints(he_idx);
            if directed.get(&(from, to)) != Some(&he_idx) {
                continue;
            }
            let twin = directed.get(&(to, from)).copied();
            self.half_edges[he_idx].twin = twin;

            let key = (from.min(to), from.max(to));
            if seen.insert(key, ()).is_none() {
                self.edges.push(Edge {
                    half_edge_a: he_idx,
                    half_edge_b: twin,
                });
            }
        }
    }

    /// Origin of a half-edge
    pub fn origin(&self, he_idx: usize) -> usize {
        self.half_edges[self.half_edges[he_idx].prev].vertex
    }

    /// Directed endpoints `(origin, target)`
    pub fn endpoints(&self, he_idx: usize) -> (usize, usize) {
        (self.origin(he_idx), self.half_edges[he_idx].vertex)
    }

    /// Half-edges leaving a vertex
    pub fn outgoing(&self, vertex: usize) -> &[usize] {
        &self.outgoing[vertex]
    }

    /// Half-edge indices around a face, in order
    pub fn face_loop(&self, face: usize) -> Vec<usize> {
        let start = self.face_starts[face];
        let mut result = vec![start];
        let mut current = self.half_edges[start].next;
        while current != start {
            result.push(current);
            current = self.half_edges[current].next;
        }
        result
    }

    /// Number of disjoint face fans around a vertex
    ///
    /// Rotates around the vertex with `h -> twin(prev(h))`; each orbit is a
    /// fan. A closed manifold vertex has exactly one; an unreferenced
    /// vertex has none.
    pub fn fan_count(&self, vertex: usize) -> usize {
        let outgoing = &self.outgoing[vertex];
        let mut visited: AHashMap<usize, ()> = AHashMap::with_capacity(outgoing.len());
        let mut fans = 0;

        for &start in outgoing {
            if visited.contains_key(&start) {
                continue;
            }
            fans += 1;

            // Walk one way, then the other if the fan is open
            let mut current = Some(start);
            while let Some(h) = current {
                if visited.insert(h, ()).is_some() {
                    break;
                }
                current = self.half_edges[self.half_edges[h].prev].twin;
            }
            let mut current = self.half_edges[start].twin.map(|t| self.half_edges[t].next);
            while let Some(h) = current {
                if visited.insert(h, ()).is_some() {
                    break;
                }
                current = self.half_edges[h].twin.map(|t| self.half_edges[t].next);
            }
        }
        fans
    }

    /// Half-edges without a twin
    pub fn boundary_half_edges(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.half_edges.len()).filter(|&h| self.half_edges[h].twin.is_none())
    }

    pub fn face_count(&self) -> usize {
        self.face_starts.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
