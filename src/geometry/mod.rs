// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - exact mesh representation and solid operations

pub mod exact;
mod mesh;
mod halfedge;
mod manifold;
mod bbox;
mod primitives;
pub mod bsp;
pub mod partition;
pub mod boolean;
pub mod extract;
pub mod triangulate;

pub use exact::{Plane, Point, Scalar, Vector};
pub use mesh::{Face, Mesh};
pub use halfedge::{Edge, HalfEdge, HalfEdgeMesh};
pub use manifold::{is_manifold, validate, ManifoldReport};
pub use bbox::BoundingBox;
pub use primitives::Primitive;
pub use bsp::{Location, Polygon};
pub use partition::{build_partition, build_partition_with, build_partitions, SpatialPartition};
pub use boolean::{combine, combine_with, BooleanOp};
pub use extract::{extract_boundary, extract_boundary_with};
pub use triangulate::triangulate;
