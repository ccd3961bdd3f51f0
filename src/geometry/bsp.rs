// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exact solid-leaf BSP tree
//!
//! Every internal node stores a splitting plane and the boundary fragments
//! lying in it. A missing front child is exterior space, a missing back
//! child is interior space. All splits are computed with exact rationals,
//! so coplanar and touching configurations are resolved without tolerance.

use super::exact::{Plane, PlaneSide, Point};
use crate::budget::WorkBudget;
use crate::config::SplitterStrategy;
use crate::error::CsgResult;
use serde::Serialize;

/// Bytes of stack that must remain before recursing further
const STACK_RED_ZONE: usize = 128 * 1024;
/// Size of each new stack segment
const STACK_SEGMENT: usize = 4 * 1024 * 1024;

/// Convex planar boundary fragment
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<Point>,
    /// Supporting plane, oriented outward
    pub plane: Plane,
}

impl Polygon {
    /// Polygon with its supporting plane; `None` for zero area
    pub fn new(vertices: Vec<Point>) -> Option<Self> {
        let plane = Plane::from_polygon(&vertices)?;
        Some(Self { vertices, plane })
    }

    pub fn with_plane(vertices: Vec<Point>, plane: Plane) -> Self {
        Self { vertices, plane }
    }

    pub fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }
}

/// Where a point lies relative to a solid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Location {
    Inside,
    Outside,
    Boundary,
}

/// Output buckets of a polygon split
#[derive(Default)]
struct Split {
    coplanar_front: Vec<Polygon>,
    coplanar_back: Vec<Polygon>,
    front: Vec<Polygon>,
    back: Vec<Polygon>,
}

impl Split {
    /// Route a polygon by the plane; returns how many new fragments were made
    fn push(&mut self, plane: &Plane, polygon: Polygon) -> usize {
        let sides: Vec<PlaneSide> = polygon.vertices.iter().map(|v| plane.side(v)).collect();
        let has_front = sides.contains(&PlaneSide::Front);
        let has_back = sides.contains(&PlaneSide::Back);

        match (has_front, has_back) {
            (false, false) => {
                if plane.same_orientation(&polygon.plane) {
                    self.coplanar_front.push(polygon);
                } else {
                    self.coplanar_back.push(polygon);
                }
                0
            }
            (true, false) => {
                self.front.push(polygon);
                0
            }
            (false, true) => {
                self.back.push(polygon);
                0
            }
            (true, true) => {
                let (front, back) = split_spanning(plane, &polygon, &sides);
                self.front.push(Polygon::with_plane(front, polygon.plane.clone()));
                self.back.push(Polygon::with_plane(back, polygon.plane));
                2
            }
        }
    }
}

/// Cut a convex polygon that has corners strictly on both sides of the plane
fn split_spanning(plane: &Plane, polygon: &Polygon, sides: &[PlaneSide]) -> (Vec<Point>, Vec<Point>) {
    let n = polygon.vertices.len();
    let mut front = Vec::with_capacity(n + 1);
    let mut back = Vec::with_capacity(n + 1);

    for i in 0..n {
        let j = (i + 1) % n;
        let (si, sj) = (sides[i], sides[j]);
        let vi = &polygon.vertices[i];

        if si != PlaneSide::Back {
            front.push(vi.clone());
        }
        if si != PlaneSide::Front {
            back.push(vi.clone());
        }
        let crosses = matches!(
            (si, sj),
            (PlaneSide::Front, PlaneSide::Back) | (PlaneSide::Back, PlaneSide::Front)
        );
        if crosses {
            let hit = plane.intersect_segment(vi, &polygon.vertices[j]);
            front.push(hit.clone());
            back.push(hit);
        }
    }
    (front, back)
}

impl SplitterStrategy {
    /// Index of the polygon whose plane splits the node
    fn select(&self, polygons: &[Polygon]) -> usize {
        match *self {
            SplitterStrategy::First => 0,
            SplitterStrategy::LeastSplits { sample } => {
                let sample = sample.max(1).min(polygons.len());
                if sample <= 1 {
                    return 0;
                }
                let step = polygons.len() / sample;
                (0..sample)
                    .map(|k| k * step)
                    .min_by_key(|&candidate| spanning_count(&polygons[candidate].plane, polygons))
                    .unwrap_or(0)
            }
        }
    }
}

/// Number of polygons a plane would cut in two
fn spanning_count(plane: &Plane, polygons: &[Polygon]) -> usize {
    polygons
        .iter()
        .filter(|polygon| {
            let mut front = false;
            let mut back = false;
            for v in &polygon.vertices {
                match plane.side(v) {
                    PlaneSide::Front => front = true,
                    PlaneSide::Back => back = true,
                    PlaneSide::OnPlane => {}
                }
            }
            front && back
        })
        .count()
}

/// BSP tree node for CSG operations
#[derive(Debug, Clone, Default)]
pub struct BspNode {
    plane: Option<Plane>,
    front: Option<Box<BspNode>>,
    back: Option<Box<BspNode>>,
    polygons: Vec<Polygon>,
}

impl BspNode {
    pub fn new(polygons: Vec<Polygon>, splitter: SplitterStrategy, budget: &WorkBudget) -> CsgResult<Self> {
        let mut node = Self::default();
        node.build(polygons, splitter, budget)?;
        Ok(node)
    }

    /// Insert polygons, extending the tree where they reach a leaf
    pub fn build(&mut self, polygons: Vec<Polygon>, splitter: SplitterStrategy, budget: &WorkBudget) -> CsgResult<()> {
        if polygons.is_empty() {
            return Ok(());
        }
        budget.check()?;
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
            let plane = match &self.plane {
                Some(plane) => plane.clone(),
                None => {
                    let plane = polygons[splitter.select(&polygons)].plane.clone();
                    self.plane = Some(plane.clone());
                    plane
                }
            };

            let mut split = Split::default();
            for polygon in polygons {
                let created = split.push(&plane, polygon);
                if created > 0 {
                    budget.charge(created)?;
                }
            }
            self.polygons.append(&mut split.coplanar_front);
            self.polygons.append(&mut split.coplanar_back);

            if !split.front.is_empty() {
                self.front
                    .get_or_insert_with(Box::default)
                    .build(split.front, splitter, budget)?;
            }
            if !split.back.is_empty() {
                self.back
                    .get_or_insert_with(Box::default)
                    .build(split.back, splitter, budget)?;
            }
            Ok(())
        })
    }

    /// Remove the parts of `polygons` inside this solid
    pub fn clip_polygons(&self, polygons: Vec<Polygon>, budget: &WorkBudget) -> CsgResult<Vec<Polygon>> {
        let Some(plane) = &self.plane else {
            return Ok(polygons);
        };
        budget.check()?;
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
            let mut split = Split::default();
            for polygon in polygons {
                let created = split.push(plane, polygon);
                if created > 0 {
                    budget.charge(created)?;
                }
            }
            let mut front = split.front;
            front.append(&mut split.coplanar_front);
            let mut back = split.back;
            back.append(&mut split.coplanar_back);

            let mut result = match &self.front {
                Some(node) => node.clip_polygons(front, budget)?,
                None => front,
            };
            if let Some(node) = &self.back {
                result.extend(node.clip_polygons(back, budget)?);
            }
            Ok(result)
        })
    }

    /// Remove every fragment of this tree lying inside `other`
    pub fn clip_to(&mut self, other: &BspNode, budget: &WorkBudget) -> CsgResult<()> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
            let polygons = std::mem::take(&mut self.polygons);
            self.polygons = other.clip_polygons(polygons, budget)?;
            if let Some(front) = &mut self.front {
                front.clip_to(other, budget)?;
            }
            if let Some(back) = &mut self.back {
                back.clip_to(other, budget)?;
            }
            Ok(())
        })
    }

    /// Complement the solid: flip every plane and fragment, swap children
    pub fn invert(&mut self) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
            for polygon in &mut self.polygons {
                polygon.flip();
            }
            if let Some(plane) = &mut self.plane {
                plane.flip();
            }
            std::mem::swap(&mut self.front, &mut self.back);
            if let Some(front) = &mut self.front {
                front.invert();
            }
            if let Some(back) = &mut self.back {
                back.invert();
            }
        })
    }

    pub fn all_polygons(&self) -> Vec<Polygon> {
        let mut result = Vec::new();
        self.collect_polygons(&mut result);
        result
    }

    fn collect_polygons(&self, out: &mut Vec<Polygon>) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
            out.extend(self.polygons.iter().cloned());
            if let Some(front) = &self.front {
                front.collect_polygons(out);
            }
            if let Some(back) = &self.back {
                back.collect_polygons(out);
            }
        })
    }

    /// Consume the tree, returning its fragments
    pub fn into_polygons(mut self) -> Vec<Polygon> {
        let mut result = Vec::new();
        let mut stack = vec![std::mem::take(&mut self)];
        while let Some(mut node) = stack.pop() {
            result.append(&mut node.polygons);
            stack.extend(node.front.take().map(|b| *b));
            stack.extend(node.back.take().map(|b| *b));
        }
        result
    }

    /// Exact point location
    ///
    /// A point on a node's plane is located on both sides; if the answers
    /// disagree the point is on the boundary.
    pub fn locate(&self, point: &Point) -> Location {
        let Some(plane) = &self.plane else {
            return Location::Outside;
        };
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
            let front = || self.front.as_ref().map_or(Location::Outside, |n| n.locate(point));
            let back = || self.back.as_ref().map_or(Location::Inside, |n| n.locate(point));
            match plane.side(point) {
                PlaneSide::Front => front(),
                PlaneSide::Back => back(),
                PlaneSide::OnPlane => {
                    let (f, b) = (front(), back());
                    if f == b {
                        f
                    } else {
                        Location::Boundary
                    }
                }
            }
        })
    }

    pub fn polygon_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += node.polygons.len();
            stack.extend(node.front.as_deref());
            stack.extend(node.back.as_deref());
        }
        count
    }

    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, depth)) = stack.pop() {
            max = max.max(depth);
            stack.extend(node.front.as_deref().map(|n| (n, depth + 1)));
            stack.extend(node.back.as_deref().map(|n| (n, depth + 1)));
        }
        max
    }
}

impl Drop for BspNode {
    // Deep trees would overflow the stack with the recursive default drop
    fn drop(&mut self) {
        let mut stack: Vec<Box<BspNode>> = Vec::new();
        stack.extend(self.front.take());
        stack.extend(self.back.take());
        while let Some(mut node) = stack.pop() {
            stack.extend(node.front.take());
            stack.extend(node.back.take());
        }
    }
}
