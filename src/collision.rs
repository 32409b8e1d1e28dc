// Copyright (c) 2026 Kliment Olechnovic and Mikael Lund
// Part of the voronota-vertices project, licensed under the MIT License.
// SPDX-License-Identifier: MIT

//! Spherical collision queries built on the bounding spheres hierarchy.

use std::collections::HashSet;

use crate::geometry::{sphere_contains_sphere, sphere_equals_sphere, sphere_intersects_sphere};
use crate::hierarchy::BoundingSpheresHierarchy;
use crate::types::{Pair, Sphere};

/// Ids of all balls whose sphere intersects `target`.
#[must_use]
pub fn find_all_collisions(bsh: &BoundingSpheresHierarchy, target: &Sphere) -> Vec<usize> {
    let tol = bsh.tolerance();
    bsh.search(
        |node| sphere_intersects_sphere(node, target, tol),
        |_, leaf| (sphere_intersects_sphere(leaf, target, tol), false),
    )
}

/// At most one ball intersecting `target`, stopping at the first hit.
#[must_use]
pub fn find_any_collision(bsh: &BoundingSpheresHierarchy, target: &Sphere) -> Option<usize> {
    let tol = bsh.tolerance();
    bsh.search(
        |node| sphere_intersects_sphere(node, target, tol),
        |_, leaf| {
            let hit = sphere_intersects_sphere(leaf, target, tol);
            (hit, hit)
        },
    )
    .first()
    .copied()
}

/// Like [`find_any_collision`], with the given ids never reported; used to
/// certify a tangent sphere empty against everything but its generators.
#[must_use]
pub fn find_any_collision_excluding(
    bsh: &BoundingSpheresHierarchy,
    target: &Sphere,
    excluded: &[usize],
) -> Option<usize> {
    let tol = bsh.tolerance();
    bsh.search(
        |node| sphere_intersects_sphere(node, target, tol),
        |id, leaf| {
            if excluded.contains(&id) {
                return (false, false);
            }
            let hit = sphere_intersects_sphere(leaf, target, tol);
            (hit, hit)
        },
    )
    .first()
    .copied()
}

/// Ids of balls fully contained in some other ball.
///
/// On exact mutual containment (equal spheres) the lower index is kept and
/// the higher one hidden, an arbitrary but deterministic tie-break.
#[must_use]
pub fn find_all_hidden_spheres(bsh: &BoundingSpheresHierarchy) -> Vec<usize> {
    let tol = bsh.tolerance();
    let spheres = bsh.spheres();
    let mut hidden = vec![false; spheres.len()];
    let mut examined: HashSet<Pair> = HashSet::new();

    for id in 0..spheres.len() {
        for other in find_all_collisions(bsh, &spheres[id]) {
            if other == id {
                continue;
            }
            let pair = Pair::new(id, other);
            if !examined.insert(pair) {
                continue;
            }
            let (low, high) = (pair.get(0), pair.get(1));
            if sphere_equals_sphere(&spheres[low], &spheres[high], tol) {
                hidden[high] = true;
            } else if sphere_contains_sphere(&spheres[low], &spheres[high], tol) {
                hidden[high] = true;
            } else if sphere_contains_sphere(&spheres[high], &spheres[low], tol) {
                hidden[low] = true;
            }
        }
    }

    hidden
        .iter()
        .enumerate()
        .filter_map(|(id, &is_hidden)| is_hidden.then_some(id))
        .collect()
}
