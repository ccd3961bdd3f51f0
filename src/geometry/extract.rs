// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boundary extraction: partition fragments to a clean polygon mesh
//!
//! Fragments arrive as a soup of convex polygons. They are welded on exact
//! vertex equality, T-junctions are closed by inserting the vertices that
//! lie inside other fragments' edges, coplanar neighbours are merged back
//! into single faces and straight-edge vertices are dropped.

use super::bsp::Polygon;
use super::exact::{newell_normal, strictly_between, Plane, Point, Scalar};
use super::manifold::validate;
use super::partition::SpatialPartition;
use super::{Face, Mesh};
use crate::config::CsgConfig;
use crate::error::{CsgError, CsgResult};
use ahash::{AHashMap, AHashSet};
use num_traits::Signed;
use rayon::prelude::*;
use tracing::debug;

/// Extract the boundary with default settings
pub fn extract_boundary(partition: &SpatialPartition) -> CsgResult<Mesh> {
    extract_boundary_with(partition, &CsgConfig::default())
}

/// Extract and validate the boundary of a partition
///
/// An empty partition yields the empty mesh. A boundary that is not a
/// closed 2-manifold is reported as `DegenerateCombination`.
pub fn extract_boundary_with(partition: &SpatialPartition, config: &CsgConfig) -> CsgResult<Mesh> {
    if partition.is_empty() {
        return Ok(Mesh::empty());
    }

    let (points, loops) = weld(partition.fragments());
    let loops = resolve_t_junctions(&points, loops, config.parallel);

    let faces: Vec<Vec<usize>> = if config.merge_coplanar {
        merge_coplanar(&points, loops)
    } else {
        loops.into_iter().map(|(indices, _)| indices).collect()
    };

    let mut mesh = Mesh {
        vertices: points,
        faces: faces.into_iter().map(Face::new).collect(),
    };
    if config.simplify_collinear {
        let removed = remove_collinear_vertices(&mut mesh);
        debug!(removed, "Removed collinear vertices");
    }
    mesh.compact();

    let report = validate(&mesh);
    if !report.is_manifold() {
        let violation = report.violation().unwrap_or("invalid boundary");
        return Err(CsgError::DegenerateCombination {
            reason: format!(
                "{violation}: {} boundary, {} non-manifold and {} inconsistent edges, {} pinched vertices",
                report.boundary_edges, report.non_manifold_edges, report.inconsistent_edges, report.pinched_vertices
            ),
        });
    }

    debug!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "Extracted boundary"
    );
    Ok(mesh)
}

/// Fragment corner loops over a shared vertex table
type Loop<'a> = (Vec<usize>, &'a Plane);

/// Weld fragment corners by exact position
fn weld(fragments: &[Polygon]) -> (Vec<Point>, Vec<Loop<'_>>) {
    let mut index: AHashMap<&Point, usize> = AHashMap::new();
    let mut points: Vec<Point> = Vec::new();

    let loops = fragments
        .iter()
        .map(|fragment| {
            let mut corners: Vec<usize> = Vec::with_capacity(fragment.vertices.len());
            for vertex in &fragment.vertices {
                let id = *index.entry(vertex).or_insert_with(|| {
                    points.push(vertex.clone());
                    points.len() - 1
                });
                if corners.last() != Some(&id) {
                    corners.push(id);
                }
            }
            if corners.len() > 1 && corners.first() == corners.last() {
                corners.pop();
            }
            (corners, &fragment.plane)
        })
        .filter(|(corners, _)| corners.len() >= 3)
        .collect();

    (points, loops)
}

/// Insert every vertex lying strictly inside a loop edge into that edge
fn resolve_t_junctions<'a>(points: &[Point], loops: Vec<Loop<'a>>, parallel: bool) -> Vec<Loop<'a>> {
    let mut by_x: Vec<usize> = (0..points.len()).collect();
    by_x.sort_by(|&a, &b| points[a].x.cmp(&points[b].x));

    let repair = |(corners, plane): Loop<'a>| (split_edges_at_vertices(points, &by_x, &corners), plane);
    if parallel {
        loops.into_par_iter().map(repair).collect()
    } else {
        loops.into_iter().map(repair).collect()
    }
}

fn split_edges_at_vertices(points: &[Point], by_x: &[usize], corners: &[usize]) -> Vec<usize> {
    let n = corners.len();
    let mut result = Vec::with_capacity(n);

    for i in 0..n {
        let (a, b) = (corners[i], corners[(i + 1) % n]);
        let (pa, pb) = (&points[a], &points[b]);
        result.push(a);

        let (lo, hi) = if pa.x <= pb.x { (&pa.x, &pb.x) } else { (&pb.x, &pa.x) };
        let start = by_x.partition_point(|&v| points[v].x < *lo);
        let direction = pb.sub(pa);

        let mut inside: Vec<(Scalar, usize)> = by_x[start..]
            .iter()
            .take_while(|&&v| points[v].x <= *hi)
            .filter(|&&v| v != a && v != b && strictly_between(&points[v], pa, pb))
            .map(|&v| (points[v].sub(pa).dot(&direction), v))
            .collect();
        inside.sort_by(|x, y| x.0.cmp(&y.0));
        result.extend(inside.into_iter().map(|(_, v)| v));
    }
    result
}

/// Merge fragments that share an oriented plane into as few faces as possible
fn merge_coplanar(points: &[Point], loops: Vec<Loop<'_>>) -> Vec<Vec<usize>> {
    let mut group_of: AHashMap<&Plane, usize> = AHashMap::new();
    let mut groups: Vec<(&Plane, Vec<Vec<usize>>)> = Vec::new();
    for (corners, plane) in loops {
        let slot = *group_of.entry(plane).or_insert_with(|| {
            groups.push((plane, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(corners);
    }

    let mut faces = Vec::new();
    let mut fallbacks = 0usize;
    for (plane, group) in groups {
        if group.len() == 1 {
            faces.extend(group);
            continue;
        }
        match merge_group(points, plane, &group) {
            Some(merged) => faces.extend(merged),
            None => {
                fallbacks += 1;
                faces.extend(group);
            }
        }
    }
    if fallbacks > 0 {
        debug!(fallbacks, "Kept unmerged fragments for planes with holes or pinches");
    }
    faces
}

/// Outer loops of a coplanar fragment group, or `None` when the merged
/// region would need a hole or touches itself at a vertex
fn merge_group(points: &[Point], plane: &Plane, group: &[Vec<usize>]) -> Option<Vec<Vec<usize>>> {
    let mut edges: AHashMap<(usize, usize), isize> = AHashMap::new();
    for corners in group {
        let n = corners.len();
        for i in 0..n {
            *edges.entry((corners[i], corners[(i + 1) % n])).or_insert(0) += 1;
        }
    }

    // Interior edges are traversed once in each direction
    let pairs: Vec<(usize, usize)> = edges.keys().copied().filter(|&(a, b)| a < b).collect();
    for (a, b) in pairs {
        let Some(&back) = edges.get(&(b, a)) else { continue };
        let shared = edges[&(a, b)].min(back);
        *edges.entry((a, b)).or_insert(0) -= shared;
        *edges.entry((b, a)).or_insert(0) -= shared;
    }

    let mut next: AHashMap<usize, usize> = AHashMap::new();
    for (&(a, b), &count) in &edges {
        match count {
            0 => {}
            1 => {
                if next.insert(a, b).is_some() {
                    return None;
                }
            }
            _ => return None,
        }
    }

    let mut starts: Vec<usize> = next.keys().copied().collect();
    starts.sort_unstable();
    let mut visited: AHashSet<usize> = AHashSet::with_capacity(starts.len());
    let mut loops = Vec::new();

    for start in starts {
        if visited.contains(&start) {
            continue;
        }
        let mut corners = Vec::new();
        let mut current = start;
        loop {
            if !visited.insert(current) {
                return None;
            }
            corners.push(current);
            current = *next.get(&current)?;
            if current == start {
                break;
            }
        }

        let area = newell_normal(corners.iter().map(|&i| &points[i])).dot(&plane.normal);
        if corners.len() < 3 || !area.is_positive() {
            return None;
        }
        loops.push(corners);
    }

    Some(loops)
}

/// Drop vertices in the middle of a straight edge shared by exactly two faces
/// Returns the number of vertices removed
fn remove_collinear_vertices(mesh: &mut Mesh) -> usize {
    let mut removed = 0;
    loop {
        let mut uses: Vec<Vec<(usize, usize)>> = vec![Vec::new(); mesh.vertex_count()];
        for (f, face) in mesh.faces.iter().enumerate() {
            for (k, &v) in face.indices.iter().enumerate() {
                uses[v].push((f, k));
            }
        }

        let neighbours = |f: usize, k: usize| {
            let face = &mesh.faces[f].indices;
            let n = face.len();
            (face[(k + n - 1) % n], face[(k + 1) % n])
        };

        // Greedy independent selection so no two removed vertices are adjacent
        let mut selected = vec![false; mesh.vertex_count()];
        let mut any = false;
        for v in 0..mesh.vertex_count() {
            let [(f1, k1), (f2, k2)] = uses[v][..] else { continue };
            if f1 == f2 || mesh.faces[f1].len() <= 3 || mesh.faces[f2].len() <= 3 {
                continue;
            }
            let (prev, next) = neighbours(f1, k1);
            if neighbours(f2, k2) != (next, prev) || selected[prev] || selected[next] {
                continue;
            }
            if strictly_between(&mesh.vertices[v], &mesh.vertices[prev], &mesh.vertices[next]) {
                selected[v] = true;
                any = true;
                removed += 1;
            }
        }

        if !any {
            return removed;
        }
        for face in &mut mesh.faces {
            face.indices.retain(|&v| !selected[v]);
        }
    }
}
