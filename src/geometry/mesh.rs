// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh representation and utilities

use super::exact::{newell_normal, sixth, Point, Scalar};
use super::BoundingBox;
use nalgebra::Point3;
use num_traits::Zero;

/// Polygonal face: an ordered cycle of vertex indices,
/// counter-clockwise when seen from outside the solid
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Face {
    pub indices: Vec<usize>,
}

impl Face {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    pub fn triangle(a: usize, b: usize, c: usize) -> Self {
        Self::new(vec![a, b, c])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn is_triangle(&self) -> bool {
        self.indices.len() == 3
    }

    /// Directed edges `(from, to)` around the face
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.indices.len();
        (0..n).map(move |i| (self.indices[i], self.indices[(i + 1) % n]))
    }

    pub fn reverse(&mut self) {
        self.indices.reverse();
    }
}

/// Polygon mesh with exact vertex positions
///
/// Vertices live in an arena; faces reference them by index. A mesh owns
/// its storage, so two meshes never alias.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Point>,
    pub faces: Vec<Face>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// The empty solid
    pub fn empty() -> Self {
        Self::new()
    }

    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Build from floating point positions; `None` if a coordinate is not finite
    pub fn from_f64(positions: &[Point3<f64>], faces: Vec<Vec<usize>>) -> Option<Self> {
        let vertices = positions
            .iter()
            .map(Point::from_f64)
            .collect::<Option<Vec<_>>>()?;
        Some(Self {
            vertices,
            faces: faces.into_iter().map(Face::new).collect(),
        })
    }

    /// Rounded vertex positions
    pub fn positions_f64(&self) -> Vec<Point3<f64>> {
        self.vertices.iter().map(Point::to_f64).collect()
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, point: Point) -> usize {
        let index = self.vertices.len();
        self.vertices.push(point);
        index
    }

    pub fn add_face(&mut self, face: Face) {
        self.faces.push(face);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// A mesh without faces bounds no volume
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn is_triangulated(&self) -> bool {
        self.faces.iter().all(Face::is_triangle)
    }

    /// Positions of a face's corners in order
    pub fn face_points<'a>(&'a self, face: &'a Face) -> impl Iterator<Item = &'a Point> + Clone + 'a {
        face.indices.iter().map(move |&i| &self.vertices[i])
    }

    /// Exact enclosed volume; negative for inside-out orientation
    ///
    /// Faces must be planar with in-range indices.
    pub fn signed_volume(&self) -> Scalar {
        let mut total = Scalar::zero();
        for face in &self.faces {
            let Some(&first) = face.indices.first() else {
                continue;
            };
            // Fan decomposition is exact for any planar polygon
            let origin = self.vertices[first].coords();
            total += origin.dot(&newell_normal(self.face_points(face)));
        }
        total * sixth()
    }

    /// Exact bounding box of the referenced vertices
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(
            self.faces
                .iter()
                .flat_map(|f| f.indices.iter())
                .map(|&i| &self.vertices[i]),
        )
    }

    /// Reverse every face, turning the solid inside out
    pub fn flip_orientation(&mut self) {
        for face in &mut self.faces {
            face.reverse();
        }
    }

    /// Append another mesh (disjoint concatenation, no CSG)
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len();
        self.vertices.extend(other.vertices.iter().cloned());
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|f| Face::new(f.indices.iter().map(|i| i + offset).collect())),
        );
    }

    /// Drop vertices no face references and renumber the rest
    /// Returns the number of vertices removed
    pub fn compact(&mut self) -> usize {
        let mut remap: Vec<Option<usize>> = vec![None; self.vertices.len()];
        let mut kept = Vec::new();

        for face in &mut self.faces {
            for index in &mut face.indices {
                let slot = &mut remap[*index];
                let new_index = match *slot {
                    Some(n) => n,
                    None => {
                        let n = kept.len();
                        kept.push(*index);
                        *slot = Some(n);
                        n
                    }
                };
                *index = new_index;
            }
        }

        let removed = self.vertices.len() - kept.len();
        let mut old = std::mem::take(&mut self.vertices);
        self.vertices = kept
            .into_iter()
            .map(|i| std::mem::replace(&mut old[i], Point::from_integers(0, 0, 0)))
            .collect();
        removed
    }
}
