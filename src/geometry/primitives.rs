// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives generator
//! Closed, outward-oriented solids used by tests, benchmarks and demos

use super::exact::{scalar, Point, Scalar};
use super::{Face, Mesh};
use nalgebra::Point3;
use std::f64::consts::PI;

/// Geometric primitives
pub enum Primitive {
    /// Axis-aligned box with quad faces
    Cuboid { min: Point, max: Point },
    /// Unit cube without its top face (not closed)
    OpenBox,
    /// Regular tetrahedron inscribed in the unit cube
    Tetrahedron,
    Octahedron { center: Point, radius: Scalar },
    /// Counter-clockwise polygon in the xy plane extruded between two heights
    Prism {
        profile: Vec<(Scalar, Scalar)>,
        bottom: Scalar,
        top: Scalar,
    },
    Cylinder { h: f64, r: f64, fn_: u32 },
    Cone { h: f64, r1: f64, r2: f64, fn_: u32 },
}

impl Primitive {
    pub fn cuboid(min: [i64; 3], max: [i64; 3]) -> Self {
        Self::Cuboid {
            min: Point::from_integers(min[0], min[1], min[2]),
            max: Point::from_integers(max[0], max[1], max[2]),
        }
    }

    pub fn unit_cube() -> Self {
        Self::cuboid([0, 0, 0], [1, 1, 1])
    }

    pub fn open_box() -> Self {
        Self::OpenBox
    }

    pub fn regular_tetrahedron() -> Self {
        Self::Tetrahedron
    }

    pub fn octahedron(center: [i64; 3], radius: i64) -> Self {
        Self::Octahedron {
            center: Point::from_integers(center[0], center[1], center[2]),
            radius: scalar(radius),
        }
    }

    pub fn prism(profile: &[[i64; 2]], bottom: i64, top: i64) -> Self {
        Self::Prism {
            profile: profile.iter().map(|p| (scalar(p[0]), scalar(p[1]))).collect(),
            bottom: scalar(bottom),
            top: scalar(top),
        }
    }

    pub fn cylinder(h: f64, r: f64, fn_: u32) -> Self {
        let segments = if fn_ >= 3 { fn_ } else { 32 };
        Self::Cylinder { h, r, fn_: segments }
    }

    pub fn cone(h: f64, r1: f64, r2: f64, fn_: u32) -> Self {
        let segments = if fn_ >= 3 { fn_ } else { 32 };
        Self::Cone {
            h,
            r1,
            r2,
            fn_: segments,
        }
    }

    pub fn to_mesh(&self) -> Mesh {
        match self {
            Self::Cuboid { min, max } => generate_cuboid_mesh(min, max),
            Self::OpenBox => {
                let mut mesh = generate_cuboid_mesh(
                    &Point::from_integers(0, 0, 0),
                    &Point::from_integers(1, 1, 1),
                );
                mesh.faces.remove(1);
                mesh
            }
            Self::Tetrahedron => generate_tetrahedron_mesh(),
            Self::Octahedron { center, radius } => generate_octahedron_mesh(center, radius),
            Self::Prism {
                profile,
                bottom,
                top,
            } => generate_prism_mesh(profile, bottom, top),
            Self::Cylinder { h, r, fn_ } => generate_cone_mesh(*h, *r, *r, *fn_),
            Self::Cone { h, r1, r2, fn_ } => generate_cone_mesh(*h, *r1, *r2, *fn_),
        }
    }
}

fn generate_cuboid_mesh(min: &Point, max: &Point) -> Mesh {
    let mut mesh = Mesh::with_capacity(8, 6);

    // Corner i takes max on axis k when bit k of i is set
    for i in 0..8 {
        let pick = |bit: usize, axis: usize| {
            if i & bit != 0 {
                max.coord(axis).clone()
            } else {
                min.coord(axis).clone()
            }
        };
        mesh.add_vertex(Point::new(pick(1, 0), pick(2, 1), pick(4, 2)));
    }

    let faces = [
        [0, 2, 3, 1], // bottom (z-)
        [4, 5, 7, 6], // top (z+)
        [0, 1, 5, 4], // front (y-)
        [2, 6, 7, 3], // back (y+)
        [0, 4, 6, 2], // left (x-)
        [1, 3, 7, 5], // right (x+)
    ];
    for face in faces {
        mesh.add_face(Face::new(face.to_vec()));
    }
    mesh
}

fn generate_tetrahedron_mesh() -> Mesh {
    let mut mesh = Mesh::with_capacity(4, 4);
    mesh.add_vertex(Point::from_integers(0, 0, 0));
    mesh.add_vertex(Point::from_integers(1, 1, 0));
    mesh.add_vertex(Point::from_integers(1, 0, 1));
    mesh.add_vertex(Point::from_integers(0, 1, 1));
    for [a, b, c] in [[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]] {
        mesh.add_face(Face::triangle(a, b, c));
    }
    mesh
}

fn generate_octahedron_mesh(center: &Point, radius: &Scalar) -> Mesh {
    let mut mesh = Mesh::with_capacity(6, 8);
    for axis in 0..3 {
        for sign in [1, -1] {
            let mut offset = [scalar(0), scalar(0), scalar(0)];
            offset[axis] = radius * scalar(sign);
            let [dx, dy, dz] = offset;
            mesh.add_vertex(Point::new(&center.x + dx, &center.y + dy, &center.z + dz));
        }
    }

    // Vertex 2 * axis is the positive tip, 2 * axis + 1 the negative one
    for octant in 0..8usize {
        let tips: Vec<usize> = (0..3).map(|axis| 2 * axis + ((octant >> axis) & 1)).collect();
        let mut face = Face::new(tips);
        if octant.count_ones() % 2 == 1 {
            face.reverse();
        }
        mesh.add_face(face);
    }
    mesh
}

fn generate_prism_mesh(profile: &[(Scalar, Scalar)], bottom: &Scalar, top: &Scalar) -> Mesh {
    let n = profile.len();
    let mut mesh = Mesh::with_capacity(2 * n, n + 2);
    for z in [bottom, top] {
        for (x, y) in profile {
            mesh.add_vertex(Point::new(x.clone(), y.clone(), z.clone()));
        }
    }

    mesh.add_face(Face::new((0..n).rev().collect()));
    mesh.add_face(Face::new((n..2 * n).collect()));
    for i in 0..n {
        let next = (i + 1) % n;
        mesh.add_face(Face::new(vec![i, next, n + next, n + i]));
    }
    mesh
}

fn generate_cone_mesh(height: f64, r1: f64, r2: f64, segments: u32) -> Mesh {
    let segments = segments as usize;
    let mut positions = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, height)];
    for i in 0..segments {
        let angle = 2.0 * PI * i as f64 / segments as f64;
        let (sin, cos) = angle.sin_cos();
        positions.push(Point3::new(r1 * cos, r1 * sin, 0.0));
        positions.push(Point3::new(r2 * cos, r2 * sin, height));
    }

    let bottom = |i: usize| 2 + 2 * (i % segments);
    let top = |i: usize| 3 + 2 * (i % segments);
    let mut faces = Vec::with_capacity(4 * segments);
    for i in 0..segments {
        // Caps
        faces.push(vec![0, bottom(i + 1), bottom(i)]);
        faces.push(vec![1, top(i), top(i + 1)]);
        // Sides, triangulated so faces stay planar after exact conversion
        faces.push(vec![bottom(i), bottom(i + 1), top(i)]);
        faces.push(vec![top(i), bottom(i + 1), top(i + 1)]);
    }

    // Finite inputs always convert
    Mesh::from_f64(&positions, faces).unwrap_or_default()
}
