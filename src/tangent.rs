// Copyright (c) 2026 Kliment Olechnovic and Mikael Lund
// Part of the voronota-vertices project, licensed under the MIT License.
// SPDX-License-Identifier: MIT

//! Closed-form solvers for planes and spheres tangent to generator spheres.
//!
//! Every solver returns the real solutions that survive post-hoc validation
//! and an empty vector when none exist; an empty result is a normal outcome,
//! not an error.

use std::f64::consts::FRAC_PI_6;

use nalgebra::{Unit, UnitQuaternion, Vector3};

use crate::geometry::{sphere_equals_sphere, Plane, Tolerance};
use crate::numeric::{safer_sum, solve_quadratic};
use crate::types::Sphere;

/// Worst-case recomputed tangency error accepted after reconstruction.
const TANGENCY_CHECK_EPSILON: f64 = 1e-6;

/// Retries around axis (1,1,1) for singular center configurations;
/// empirically chosen step count, kept as a tunable.
const ROTATION_RETRIES: usize = 2;
const ROTATION_STEP: f64 = FRAC_PI_6;

/// Worst recomputed tangency error of `candidate` against the generators.
fn tangency_error(candidate: &Sphere, generators: &[&Sphere]) -> f64 {
    generators
        .iter()
        .map(|g| ((g.center - candidate.center).norm() - (g.r + candidate.r)).abs())
        .fold(0.0, f64::max)
}

/// Reorder so that the lowest-radius sphere comes first; it is the
/// numerically safest translation pivot.
fn pivot_first(spheres: &mut [Sphere]) {
    let mut pivot = 0;
    for (i, s) in spheres.iter().enumerate() {
        if s.r < spheres[pivot].r {
            pivot = i;
        }
    }
    spheres.swap(0, pivot);
}

/// Spheres tangent to four generator spheres.
///
/// Pairwise tangency reduces to a linear system in the tangent center
/// parameterized by its radius; substituting into the implicit sphere
/// equation leaves one quadratic. Singular center configurations are retried
/// in fixed rotations about axis (1,1,1) and the accepted result is rotated
/// back. Returns 0, 1 or 2 spheres.
#[must_use]
pub fn tangent_spheres_of_four_spheres(
    s1: &Sphere,
    s2: &Sphere,
    s3: &Sphere,
    s4: &Sphere,
    tol: Tolerance,
) -> Vec<Sphere> {
    let mut ordered = [*s1, *s2, *s3, *s4];
    pivot_first(&mut ordered);
    let [p, a, b, c] = ordered;

    let axis = Unit::new_normalize(Vector3::new(1.0, 1.0, 1.0));
    for attempt in 0..=ROTATION_RETRIES {
        let rotation = UnitQuaternion::from_axis_angle(&axis, ROTATION_STEP * attempt as f64);
        let shifted = |s: &Sphere| (rotation * (s.center - p.center), s.r - p.r);
        let (ca, ra) = shifted(&a);
        let (cb, rb) = shifted(&b);
        let (cc, rc) = shifted(&c);

        let cbc = cb.cross(&cc);
        let cca = cc.cross(&ca);
        let cab = ca.cross(&cb);
        let det = ca.dot(&cbc);
        if tol.eq(det, 0.0) {
            continue;
        }

        // Tangency to generator i: 2*ci.t = wi - 2*ri*rho, rho = r + r_pivot.
        let w = |ci: Vector3<f64>, ri: f64| {
            safer_sum(&[ci.x * ci.x, ci.y * ci.y, ci.z * ci.z, -(ri * ri)])
        };
        let (wa, wb, wc) = (w(ca, ra), w(cb, rb), w(cc, rc));

        // Center as affine function of rho: t = u + rho*v (Cramer with the
        // reciprocal basis of the row vectors).
        let u = (cbc * (0.5 * wa) + cca * (0.5 * wb) + cab * (0.5 * wc)) / det;
        let v = (cbc * (-ra) + cca * (-rb) + cab * (-rc)) / det;

        // Tangency to the pivot point: |t|^2 = rho^2.
        let qa = v.norm_squared() - 1.0;
        let qb = 2.0 * u.dot(&v);
        let qc = u.norm_squared();

        let mut results: Vec<Sphere> = Vec::new();
        for rho in solve_quadratic(qa, qb, qc, tol) {
            if rho < 0.0 {
                continue;
            }
            let center = p.center + (rotation.inverse() * (u + v * rho));
            let mut candidate = Sphere::new(center, rho - p.r);
            if candidate.r < 0.0 {
                // Genuine internal tangency misclassified by rounding
                if candidate.r > -TANGENCY_CHECK_EPSILON {
                    candidate.r = 0.0;
                } else {
                    continue;
                }
            }
            if tangency_error(&candidate, &[s1, s2, s3, s4]) <= TANGENCY_CHECK_EPSILON
                && !results
                    .iter()
                    .any(|prev| sphere_equals_sphere(prev, &candidate, tol))
            {
                results.push(candidate);
            }
        }
        return results;
    }
    Vec::new()
}

/// The extremal spheres tangent to three generator spheres, with centers in
/// the plane through the generator centers. Returns 0, 1 or 2 spheres;
/// collinear centers yield none.
#[must_use]
pub fn tangent_spheres_of_three_spheres(
    s1: &Sphere,
    s2: &Sphere,
    s3: &Sphere,
    tol: Tolerance,
) -> Vec<Sphere> {
    let mut ordered = [*s1, *s2, *s3];
    pivot_first(&mut ordered);
    let [p, a, b] = ordered;

    let ca = a.center - p.center;
    let cb = b.center - p.center;
    let ra = a.r - p.r;
    let rb = b.r - p.r;

    let g11 = ca.norm_squared();
    let g12 = ca.dot(&cb);
    let g22 = cb.norm_squared();
    let det = g11.mul_add(g22, -(g12 * g12));
    if tol.eq(det, 0.0) {
        return Vec::new();
    }

    let wa = safer_sum(&[ca.x * ca.x, ca.y * ca.y, ca.z * ca.z, -(ra * ra)]);
    let wb = safer_sum(&[cb.x * cb.x, cb.y * cb.y, cb.z * cb.z, -(rb * rb)]);

    // t = alpha*ca + beta*cb with the Gram system
    //   ca.t = wa/2 - ra*rho,  cb.t = wb/2 - rb*rho
    let alpha0 = g22.mul_add(0.5 * wa, -(g12 * 0.5 * wb)) / det;
    let alpha1 = g22.mul_add(-ra, g12 * rb) / det;
    let beta0 = g11.mul_add(0.5 * wb, -(g12 * 0.5 * wa)) / det;
    let beta1 = g11.mul_add(-rb, g12 * ra) / det;
    let u = ca * alpha0 + cb * beta0;
    let v = ca * alpha1 + cb * beta1;

    let qa = v.norm_squared() - 1.0;
    let qb = 2.0 * u.dot(&v);
    let qc = u.norm_squared();

    let mut results: Vec<Sphere> = Vec::new();
    for rho in solve_quadratic(qa, qb, qc, tol) {
        if rho < 0.0 {
            continue;
        }
        let mut candidate = Sphere::new(p.center + u + v * rho, rho - p.r);
        if candidate.r < 0.0 {
            if candidate.r > -TANGENCY_CHECK_EPSILON {
                candidate.r = 0.0;
            } else {
                continue;
            }
        }
        if tangency_error(&candidate, &[s1, s2, s3]) <= TANGENCY_CHECK_EPSILON
            && !results
                .iter()
                .any(|prev| sphere_equals_sphere(prev, &candidate, tol))
        {
            results.push(candidate);
        }
    }
    results
}

/// Planes tangent to three generator spheres with all generators on the
/// positive side. Returns 0 or 2 planes; each generator center sits at
/// signed distance equal to its radius from a returned plane.
#[must_use]
pub fn tangent_planes_of_three_spheres(
    s1: &Sphere,
    s2: &Sphere,
    s3: &Sphere,
    tol: Tolerance,
) -> Vec<Plane> {
    let mut ordered = [*s1, *s2, *s3];
    pivot_first(&mut ordered);
    let [p, a, b] = ordered;

    let ca = a.center - p.center;
    let cb = b.center - p.center;
    let ra = a.r - p.r;
    let rb = b.r - p.r;

    let cross = ca.cross(&cb);
    if tol.eq(cross.norm_squared(), 0.0) {
        return Vec::new();
    }

    let g11 = ca.norm_squared();
    let g12 = ca.dot(&cb);
    let g22 = cb.norm_squared();
    let det = g11.mul_add(g22, -(g12 * g12));
    if tol.eq(det, 0.0) {
        return Vec::new();
    }

    // Unit normal n = alpha*ca + beta*cb + gamma*(ca x cb) with
    // n.ca = ra and n.cb = rb; gamma closes |n| = 1.
    let alpha = g22.mul_add(ra, -(g12 * rb)) / det;
    let beta = g11.mul_add(rb, -(g12 * ra)) / det;
    let in_plane = ca * alpha + cb * beta;
    let gamma_squared = (1.0 - in_plane.norm_squared()) / cross.norm_squared();
    if gamma_squared < 0.0 {
        return Vec::new();
    }
    let gamma = gamma_squared.sqrt();

    let mut results = Vec::new();
    for sign in [1.0, -1.0] {
        let normal = (in_plane + cross * (sign * gamma)).normalize();
        let plane = Plane::new(p.center - normal * p.r, normal);
        let worst = [s1, s2, s3]
            .iter()
            .map(|s| (plane.signed_distance(&s.center) - s.r).abs())
            .fold(0.0, f64::max);
        if worst <= TANGENCY_CHECK_EPSILON {
            results.push(plane);
        }
    }
    if results.len() == 2 {
        results
    } else {
        Vec::new()
    }
}
