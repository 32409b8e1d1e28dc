// Copyright (c) 2026 Kliment Olechnovic and Mikael Lund
// Part of the voronota-vertices project, licensed under the MIT License.
// SPDX-License-Identifier: MIT

//! Epsilon-aware sphere and plane predicates.

use std::f64::consts::TAU;

use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};

use crate::types::Sphere;

/// Comparison tolerance used by every equality/ordering predicate on
/// coordinates and radii.
///
/// The triangulation algorithm requires one consistent epsilon across all
/// predicates that feed the same search; pruning and acceptance decisions can
/// otherwise disagree on degenerate configurations. The correct scale depends
/// on input coordinate magnitude, so the value is an explicit parameter
/// rather than a compiled-in constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    eps: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self { eps: 1e-10 }
    }
}

impl Tolerance {
    #[must_use]
    pub const fn new(eps: f64) -> Self {
        Self { eps }
    }

    #[must_use]
    pub const fn epsilon(&self) -> f64 {
        self.eps
    }

    #[inline]
    #[must_use]
    pub fn eq(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.eps
    }

    #[inline]
    #[must_use]
    pub fn lt(&self, a: f64, b: f64) -> bool {
        a + self.eps < b
    }

    #[inline]
    #[must_use]
    pub fn gt(&self, a: f64, b: f64) -> bool {
        a - self.eps > b
    }

    #[inline]
    #[must_use]
    pub fn le(&self, a: f64, b: f64) -> bool {
        a < b + self.eps
    }

    #[inline]
    #[must_use]
    pub fn ge(&self, a: f64, b: f64) -> bool {
        a + self.eps > b
    }
}

#[inline]
#[must_use]
pub fn point_equals_point(a: &Point3<f64>, b: &Point3<f64>, tol: Tolerance) -> bool {
    tol.eq(a.x, b.x) && tol.eq(a.y, b.y) && tol.eq(a.z, b.z)
}

/// Check if two spheres intersect (overlap, not merely touch)
#[inline]
#[must_use]
pub fn sphere_intersects_sphere(a: &Sphere, b: &Sphere, tol: Tolerance) -> bool {
    let sum_r = a.r + b.r;
    tol.lt((b.center - a.center).norm_squared(), sum_r * sum_r)
}

/// Check if two spheres are externally tangent within the tolerance
#[inline]
#[must_use]
pub fn sphere_touches_sphere(a: &Sphere, b: &Sphere, tol: Tolerance) -> bool {
    tol.eq((b.center - a.center).norm(), a.r + b.r)
}

/// Check if spheres are equal
#[inline]
#[must_use]
pub fn sphere_equals_sphere(a: &Sphere, b: &Sphere, tol: Tolerance) -> bool {
    tol.eq(a.r, b.r) && point_equals_point(&a.center, &b.center, tol)
}

/// Check if sphere `a` contains sphere `b`
#[inline]
#[must_use]
pub fn sphere_contains_sphere(a: &Sphere, b: &Sphere, tol: Tolerance) -> bool {
    let diff_r = a.r - b.r;
    tol.ge(a.r, b.r) && tol.le((b.center - a.center).norm_squared(), diff_r * diff_r)
}

/// An oriented plane given by a point on it and a unit normal.
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    pub point: Point3<f64>,
    pub normal: Vector3<f64>,
}

impl Plane {
    #[must_use]
    pub const fn new(point: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self { point, normal }
    }

    /// Signed distance from `x` to the plane (assumes the normal is unit length)
    #[inline]
    #[must_use]
    pub fn signed_distance(&self, x: &Point3<f64>) -> f64 {
        self.normal.dot(&(x - self.point))
    }

    /// Which halfspace `x` lies in: 1 positive, -1 negative, 0 on the plane
    #[inline]
    #[must_use]
    pub fn halfspace_of_point(&self, x: &Point3<f64>, tol: Tolerance) -> i32 {
        let sd = self.signed_distance(x);
        if tol.gt(sd, 0.0) {
            1
        } else if tol.lt(sd, 0.0) {
            -1
        } else {
            0
        }
    }
}

/// Minimum angle at vertex o between rays to a and b
#[must_use]
pub fn min_angle(o: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    let v1 = (a - o).normalize();
    let v2 = (b - o).normalize();
    v1.dot(&v2).clamp(-1.0, 1.0).acos()
}

/// Directed angle from ray oa to ray ob, using c to determine direction
#[allow(clippy::many_single_char_names)]
#[must_use]
pub fn directed_angle(o: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let angle = min_angle(o, a, b);
    let v1 = (a - o).normalize();
    let v2 = (b - o).normalize();
    let n = v1.cross(&v2);
    if (c - o).dot(&n) >= 0.0 {
        angle
    } else {
        TAU - angle
    }
}

/// Find any unit vector perpendicular to the given vector
#[must_use]
pub fn any_normal_of_vector(a: &Vector3<f64>, tol: Tolerance) -> Vector3<f64> {
    let mut b = *a;

    // Find a non-parallel vector to cross with
    if !tol.eq(b.x, 0.0) && (!tol.eq(b.y, 0.0) || !tol.eq(b.z, 0.0)) {
        b.x = -b.x;
        return a.cross(&b).normalize();
    } else if !tol.eq(b.y, 0.0) && (!tol.eq(b.x, 0.0) || !tol.eq(b.z, 0.0)) {
        b.y = -b.y;
        return a.cross(&b).normalize();
    } else if !tol.eq(b.x, 0.0) {
        return Vector3::new(0.0, 1.0, 0.0);
    }
    Vector3::new(1.0, 0.0, 0.0)
}

/// Rotate a vector around an axis by angle (radians) using quaternion
#[must_use]
pub fn rotate_vector_around_axis(
    axis: &Vector3<f64>,
    angle: f64,
    p: &Vector3<f64>,
) -> Vector3<f64> {
    if axis.norm_squared() <= 0.0 {
        return *p;
    }
    let unit_axis = Unit::new_normalize(*axis);
    let rotation = UnitQuaternion::from_axis_angle(&unit_axis, angle);
    rotation * p
}
