// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exact geometric predicates for CSG operations
//! Every coordinate is an arbitrary-precision rational, so every sign test is exact

use nalgebra::Point3;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;

/// Exact scalar used by the whole geometry core
pub type Scalar = BigRational;

/// Build an integral scalar
pub fn scalar(value: i64) -> Scalar {
    BigRational::from_integer(BigInt::from(value))
}

/// Round an exact scalar to the nearest representable `f64`
pub fn scalar_to_f64(value: &Scalar) -> f64 {
    value.to_f64().unwrap_or_else(|| {
        // Ratio of huge integers: fall back to dividing the parts
        let numer = value.numer().to_f64().unwrap_or(f64::NAN);
        let denom = value.denom().to_f64().unwrap_or(f64::NAN);
        numer / denom
    })
}

/// Exact point in 3D space
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: Scalar,
    pub y: Scalar,
    pub z: Scalar,
}

/// Exact vector in 3D space
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Vector {
    pub x: Scalar,
    pub y: Scalar,
    pub z: Scalar,
}

impl Point {
    pub fn new(x: Scalar, y: Scalar, z: Scalar) -> Self {
        Self { x, y, z }
    }

    /// Point with integral coordinates
    pub fn from_integers(x: i64, y: i64, z: i64) -> Self {
        Self::new(scalar(x), scalar(y), scalar(z))
    }

    /// Exact conversion from floating point; `None` for NaN or infinity
    pub fn from_f64(point: &Point3<f64>) -> Option<Self> {
        Some(Self::new(
            BigRational::from_float(point.x)?,
            BigRational::from_float(point.y)?,
            BigRational::from_float(point.z)?,
        ))
    }

    /// Nearest floating point position
    pub fn to_f64(&self) -> Point3<f64> {
        Point3::new(
            scalar_to_f64(&self.x),
            scalar_to_f64(&self.y),
            scalar_to_f64(&self.z),
        )
    }

    pub fn coord(&self, axis: usize) -> &Scalar {
        match axis {
            0 => &self.x,
            1 => &self.y,
            _ => &self.z,
        }
    }

    /// Vector from `other` to `self`
    pub fn sub(&self, other: &Point) -> Vector {
        Vector::new(&self.x - &other.x, &self.y - &other.y, &self.z - &other.z)
    }

    pub fn offset(&self, v: &Vector) -> Point {
        Point::new(&self.x + &v.x, &self.y + &v.y, &self.z + &v.z)
    }

    /// Position vector of this point
    pub fn coords(&self) -> Vector {
        Vector::new(self.x.clone(), self.y.clone(), self.z.clone())
    }

    /// Point on the segment `self -> other` at parameter `t`
    pub fn lerp(&self, other: &Point, t: &Scalar) -> Point {
        self.offset(&other.sub(self).scale(t))
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl Vector {
    pub fn new(x: Scalar, y: Scalar, z: Scalar) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(Scalar::zero(), Scalar::zero(), Scalar::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.x.is_zero() && self.y.is_zero() && self.z.is_zero()
    }

    pub fn component(&self, axis: usize) -> &Scalar {
        match axis {
            0 => &self.x,
            1 => &self.y,
            _ => &self.z,
        }
    }

    pub fn dot(&self, other: &Vector) -> Scalar {
        &self.x * &other.x + &self.y * &other.y + &self.z * &other.z
    }

    pub fn cross(&self, other: &Vector) -> Vector {
        Vector::new(
            &self.y * &other.z - &self.z * &other.y,
            &self.z * &other.x - &self.x * &other.z,
            &self.x * &other.y - &self.y * &other.x,
        )
    }

    pub fn add(&self, other: &Vector) -> Vector {
        Vector::new(&self.x + &other.x, &self.y + &other.y, &self.z + &other.z)
    }

    pub fn scale(&self, factor: &Scalar) -> Vector {
        Vector::new(&self.x * factor, &self.y * factor, &self.z * factor)
    }

    pub fn neg(&self) -> Vector {
        Vector::new(-&self.x, -&self.y, -&self.z)
    }

    /// Axis with the largest absolute component (projection axis for 2D tests)
    pub fn dominant_axis(&self) -> usize {
        let ax = self.x.abs();
        let ay = self.y.abs();
        let az = self.z.abs();
        if ax >= ay && ax >= az {
            0
        } else if ay >= az {
            1
        } else {
            2
        }
    }
}

impl fmt::Debug for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}, {}>", self.x, self.y, self.z)
    }
}

/// Position of a point relative to an oriented plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    Front,
    Back,
    OnPlane,
}

/// Oriented plane `normal · p = w`
///
/// Planes are stored in a canonical form: the first nonzero normal
/// component has absolute value one. Two planes through the same points
/// with the same orientation therefore compare equal and hash equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Plane {
    pub normal: Vector,
    pub w: Scalar,
}

impl Plane {
    /// Canonical plane with the given (nonzero) normal and offset
    pub fn new(normal: Vector, w: Scalar) -> Option<Self> {
        let lead = [&normal.x, &normal.y, &normal.z]
            .into_iter()
            .find(|c| !c.is_zero())?
            .abs();
        let inv = lead.recip();
        Some(Self {
            normal: normal.scale(&inv),
            w: w * inv,
        })
    }

    /// Plane through three points, oriented counter-clockwise; `None` when collinear
    pub fn from_points(a: &Point, b: &Point, c: &Point) -> Option<Self> {
        let normal = b.sub(a).cross(&c.sub(a));
        let w = normal.dot(&a.coords());
        Self::new(normal, w)
    }

    /// Supporting plane of a planar polygon (Newell normal); `None` for zero area
    pub fn from_polygon(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let normal = newell_normal(points.iter());
        let w = normal.dot(&first.coords());
        Self::new(normal, w)
    }

    pub fn flip(&mut self) {
        self.normal = self.normal.neg();
        self.w = -&self.w;
    }

    pub fn flipped(&self) -> Self {
        let mut plane = self.clone();
        plane.flip();
        plane
    }

    /// Signed evaluation `normal · p - w` (proportional to the distance)
    pub fn evaluate(&self, point: &Point) -> Scalar {
        self.normal.dot(&point.coords()) - &self.w
    }

    pub fn side(&self, point: &Point) -> PlaneSide {
        let value = self.evaluate(point);
        if value.is_positive() {
            PlaneSide::Front
        } else if value.is_negative() {
            PlaneSide::Back
        } else {
            PlaneSide::OnPlane
        }
    }

    pub fn contains(&self, point: &Point) -> bool {
        self.evaluate(point).is_zero()
    }

    /// True when both normals point into the same half-space
    pub fn same_orientation(&self, other: &Plane) -> bool {
        self.normal.dot(&other.normal).is_positive()
    }

    /// Intersection of the segment `a -> b` with this plane
    ///
    /// The caller guarantees `a` and `b` lie on strictly opposite sides.
    pub fn intersect_segment(&self, a: &Point, b: &Point) -> Point {
        let denom = self.normal.dot(&b.sub(a));
        let t = (&self.w - self.normal.dot(&a.coords())) / denom;
        a.lerp(b, &t)
    }
}

/// Twice the area vector of a polygon (Newell's method), exact for planar input
pub fn newell_normal<'a>(points: impl Iterator<Item = &'a Point> + Clone) -> Vector {
    let mut normal = Vector::zero();
    let mut next = points.clone().cycle().skip(1);
    for current in points {
        let Some(following) = next.next() else { break };
        normal = normal.add(&current.coords().cross(&following.coords()));
    }
    normal
}

/// Six times the signed volume of tetrahedron (a, b, c, d)
/// Positive if d is on the positive side of plane (a, b, c)
pub fn oriented_volume(a: &Point, b: &Point, c: &Point, d: &Point) -> Scalar {
    let ab = b.sub(a);
    let ac = c.sub(a);
    let ad = d.sub(a);
    ab.dot(&ac.cross(&ad))
}

/// Orientation of d with respect to plane (a, b, c)
pub fn orient3d(a: &Point, b: &Point, c: &Point, d: &Point) -> Ordering {
    oriented_volume(a, b, c, d).cmp(&Scalar::zero())
}

pub fn is_collinear(a: &Point, b: &Point, c: &Point) -> bool {
    b.sub(a).cross(&c.sub(a)).is_zero()
}

/// True when `p` lies on the open segment `(a, b)`
pub fn strictly_between(p: &Point, a: &Point, b: &Point) -> bool {
    if !is_collinear(a, b, p) {
        return false;
    }
    let ab = b.sub(a);
    p.sub(a).dot(&ab).is_positive() && b.sub(p).dot(&ab).is_positive()
}

/// Orientation of the 2D triangle (a, b, c): positive when counter-clockwise
pub fn orient2d(a: (&Scalar, &Scalar), b: (&Scalar, &Scalar), c: (&Scalar, &Scalar)) -> Ordering {
    let det = (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0);
    det.cmp(&Scalar::zero())
}

/// One sixth, used by volume computations
pub fn sixth() -> Scalar {
    Scalar::one() / scalar(6)
}
