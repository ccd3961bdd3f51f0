// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding box utilities

use super::exact::{scalar_to_f64, Point};
use nalgebra::Vector3;

/// Exact axis-aligned bounding box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Box around a set of points; `None` when the set is empty
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bbox = Self::new(first.clone(), first.clone());
        for point in points {
            bbox.expand_to_include(point);
        }
        Some(bbox)
    }

    pub fn expand_to_include(&mut self, point: &Point) {
        if point.x < self.min.x {
            self.min.x = point.x.clone();
        }
        if point.y < self.min.y {
            self.min.y = point.y.clone();
        }
        if point.z < self.min.z {
            self.min.z = point.z.clone();
        }
        if point.x > self.max.x {
            self.max.x = point.x.clone();
        }
        if point.y > self.max.y {
            self.max.y = point.y.clone();
        }
        if point.z > self.max.z {
            self.max.z = point.z.clone();
        }
    }

    /// True when some axis separates the boxes with a gap
    ///
    /// Boxes that touch (share a face, edge or corner) are not separated.
    pub fn is_separated_from(&self, other: &BoundingBox) -> bool {
        (0..3).any(|axis| {
            self.max.coord(axis) < other.min.coord(axis)
                || other.max.coord(axis) < self.min.coord(axis)
        })
    }

    /// Closed containment test
    pub fn contains(&self, point: &Point) -> bool {
        (0..3).all(|axis| {
            self.min.coord(axis) <= point.coord(axis) && point.coord(axis) <= self.max.coord(axis)
        })
    }

    pub fn size(&self) -> Vector3<f64> {
        let extent = self.max.sub(&self.min);
        Vector3::new(
            scalar_to_f64(&extent.x),
            scalar_to_f64(&extent.y),
            scalar_to_f64(&extent.z),
        )
    }
}
