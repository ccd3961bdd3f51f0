// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Spatial partitions of closed meshes

use super::bsp::{BspNode, Location, Polygon};
use super::exact::{newell_normal, Point};
use super::triangulate::triangulate_face;
use super::{BoundingBox, Mesh};
use crate::budget::WorkBudget;
use crate::config::{CsgConfig, SplitterStrategy};
use crate::error::{CsgError, CsgResult};
use num_traits::Signed;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Solid described by its boundary fragments and a BSP of their planes
///
/// Partitions built from meshes carry their tree; combination results
/// only carry fragments and build the tree on the first location query.
#[derive(Debug, Default)]
pub struct SpatialPartition {
    fragments: Vec<Polygon>,
    tree: OnceLock<BspNode>,
    splitter: SplitterStrategy,
    bounds: Option<BoundingBox>,
}

impl SpatialPartition {
    /// The empty solid
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_tree(tree: BspNode, splitter: SplitterStrategy) -> Self {
        let fragments = tree.all_polygons();
        let bounds = fragment_bounds(&fragments);
        Self {
            fragments,
            tree: OnceLock::from(tree),
            splitter,
            bounds,
        }
    }

    pub(crate) fn from_fragments(fragments: Vec<Polygon>, splitter: SplitterStrategy) -> Self {
        let bounds = fragment_bounds(&fragments);
        Self {
            fragments,
            tree: OnceLock::new(),
            splitter,
            bounds,
        }
    }

    /// Boundary fragments, oriented outward
    pub fn fragments(&self) -> &[Polygon] {
        &self.fragments
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// No interior cells
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn bounds(&self) -> Option<&BoundingBox> {
        self.bounds.as_ref()
    }

    pub fn splitter(&self) -> SplitterStrategy {
        self.splitter
    }

    /// Exact location of a point relative to the solid
    pub fn classify(&self, point: &Point) -> Location {
        if let Some(bounds) = &self.bounds {
            if !bounds.contains(point) {
                return Location::Outside;
            }
        }
        self.tree().locate(point)
    }

    fn tree(&self) -> &BspNode {
        self.tree.get_or_init(|| {
            let mut tree = BspNode::default();
            if let Err(err) = tree.build(self.fragments.clone(), self.splitter, &WorkBudget::unlimited()) {
                warn!(error = %err, "Lazy partition build failed");
            }
            tree
        })
    }

    /// Tree for clipping, built now if it was deferred
    pub(crate) fn into_tree(self, budget: &WorkBudget) -> CsgResult<BspNode> {
        match self.tree.into_inner() {
            Some(tree) => Ok(tree),
            None => BspNode::new(self.fragments, self.splitter, budget),
        }
    }

    pub(crate) fn into_fragments(self) -> Vec<Polygon> {
        self.fragments
    }
}

fn fragment_bounds(fragments: &[Polygon]) -> Option<BoundingBox> {
    BoundingBox::from_points(fragments.iter().flat_map(|f| f.vertices.iter()))
}

/// Partition of a closed mesh with default settings
pub fn build_partition(mesh: &Mesh) -> CsgResult<SpatialPartition> {
    build_partition_with(mesh, &CsgConfig::default(), &WorkBudget::unlimited())
}

/// Partition of a closed mesh
///
/// The mesh must be a closed 2-manifold; callers validate first.
pub fn build_partition_with(mesh: &Mesh, config: &CsgConfig, budget: &WorkBudget) -> CsgResult<SpatialPartition> {
    budget.check()?;
    let polygons = boundary_polygons(mesh)?;
    budget.charge(polygons.len())?;

    let tree = BspNode::new(polygons, config.splitter, budget)?;
    debug!(
        fragments = tree.polygon_count(),
        depth = tree.depth(),
        "Built partition"
    );
    Ok(SpatialPartition::from_tree(tree, config.splitter))
}

/// Partitions of both operands, concurrently when enabled
pub fn build_partitions(
    a: &Mesh,
    b: &Mesh,
    config: &CsgConfig,
    budget: &WorkBudget,
) -> CsgResult<(SpatialPartition, SpatialPartition)> {
    if config.parallel {
        let (left, right) = rayon::join(
            || build_partition_with(a, config, budget),
            || build_partition_with(b, config, budget),
        );
        Ok((left?, right?))
    } else {
        Ok((build_partition_with(a, config, budget)?, build_partition_with(b, config, budget)?))
    }
}

/// Outward triangles of a closed mesh
fn boundary_polygons(mesh: &Mesh) -> CsgResult<Vec<Polygon>> {
    let inside_out = mesh.signed_volume().is_negative();
    if inside_out {
        warn!("Mesh is inside out, reversing face orientation");
    }

    let mut polygons = Vec::with_capacity(mesh.face_count() * 2);
    let mut skipped = 0usize;
    for (face_idx, face) in mesh.faces.iter().enumerate() {
        if newell_normal(mesh.face_points(face)).is_zero() {
            skipped += 1;
            continue;
        }
        let triangles = triangulate_face(&mesh.vertices, face)
            .map_err(|reason| CsgError::Triangulation { face: face_idx, reason })?;
        for triangle in triangles {
            let mut corners: Vec<Point> = triangle.iter().map(|&i| mesh.vertices[i].clone()).collect();
            if inside_out {
                corners.reverse();
            }
            match Polygon::new(corners) {
                Some(polygon) => polygons.push(polygon),
                None => skipped += 1,
            }
        }
    }

    if skipped > 0 {
        debug!(skipped, "Skipped zero-area faces");
    }
    Ok(polygons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::CancelToken;
    use crate::geometry::Primitive;

    fn p(x: i64, y: i64, z: i64) -> Point {
        Point::from_integers(x, y, z)
    }

    #[test]
    fn test_partition_of_cube() {
        let partition = build_partition(&Primitive::unit_cube().to_mesh()).unwrap();
        assert_eq!(partition.fragment_count(), 12);
        assert_eq!(partition.classify(&p(0, 0, 0)), Location::Boundary);
        assert_eq!(partition.classify(&p(2, 0, 0)), Location::Outside);
    }

    #[test]
    fn test_inside_out_mesh_is_reoriented() {
        let mut mesh = Primitive::cuboid([0, 0, 0], [2, 2, 2]).to_mesh();
        mesh.flip_orientation();
        let partition = build_partition(&mesh).unwrap();
        assert_eq!(partition.classify(&p(1, 1, 1)), Location::Inside);
        assert_eq!(partition.classify(&p(1, 1, 3)), Location::Outside);
    }

    #[test]
    fn test_concave_classification() {
        let l_shape = [[0, 0], [4, 0], [4, 2], [2, 2], [2, 4], [0, 4]];
        let partition = build_partition(&Primitive::prism(&l_shape, 0, 2).to_mesh()).unwrap();
        assert_eq!(partition.classify(&p(1, 3, 1)), Location::Inside);
        assert_eq!(partition.classify(&p(3, 1, 1)), Location::Inside);
        assert_eq!(partition.classify(&p(3, 3, 1)), Location::Outside);
        assert_eq!(partition.classify(&p(3, 2, 1)), Location::Boundary);
    }

    #[test]
    fn test_lazy_tree_matches_built_tree() {
        let mesh = Primitive::octahedron([0, 0, 0], 2).to_mesh();
        let built = build_partition(&mesh).unwrap();
        let lazy = SpatialPartition::from_fragments(built.fragments().to_vec(), SplitterStrategy::First);
        for point in [p(0, 0, 0), p(1, 1, 0), p(1, 1, 1), p(2, 0, 0), p(0, 0, -3)] {
            assert_eq!(lazy.classify(&point), built.classify(&point));
        }
    }

    #[test]
    fn test_empty_mesh_gives_empty_partition() {
        let partition = build_partition(&Mesh::empty()).unwrap();
        assert!(partition.is_empty());
        assert_eq!(partition.classify(&p(0, 0, 0)), Location::Outside);
    }

    #[test]
    fn test_cancelled_build() {
        let token = CancelToken::new();
        token.cancel();
        let budget = WorkBudget::new(token, None);
        let result = build_partition_with(&Primitive::unit_cube().to_mesh(), &CsgConfig::default(), &budget);
        assert!(matches!(result, Err(CsgError::Cancelled)));
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let a = Primitive::unit_cube().to_mesh();
        let b = Primitive::regular_tetrahedron().to_mesh();
        let budget = WorkBudget::unlimited();
        let (pa, pb) = build_partitions(&a, &b, &CsgConfig::default(), &budget).unwrap();
        let (sa, sb) = build_partitions(&a, &b, &CsgConfig::default().sequential(), &budget).unwrap();
        assert_eq!(pa.fragments(), sa.fragments());
        assert_eq!(pb.fragments(), sb.fragments());
    }
}
