// Copyright (c) 2026 Kliment Olechnovic and Mikael Lund
// Part of the voronota-vertices project, licensed under the MIT License.
// SPDX-License-Identifier: MIT

//! Core value types shared by the triangulation engine.

use std::collections::HashMap;

use nalgebra::Point3;

/// Input ball (center + radius), user-facing type
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ball {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub r: f64,
}

impl Ball {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, r: f64) -> Self {
        Self { x, y, z, r }
    }
}

/// Internal sphere representation with nalgebra Point3
#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    pub center: Point3<f64>,
    pub r: f64,
}

impl Sphere {
    #[must_use]
    pub const fn new(center: Point3<f64>, r: f64) -> Self {
        Self { center, r }
    }

    #[must_use]
    pub const fn from_coords(x: f64, y: f64, z: f64, r: f64) -> Self {
        Self {
            center: Point3::new(x, y, z),
            r,
        }
    }

    #[must_use]
    pub fn from_ball(ball: &Ball) -> Self {
        Self {
            center: Point3::new(ball.x, ball.y, ball.z),
            r: ball.r,
        }
    }
}

/// Sorted pair of ball indices.
///
/// Canonical on construction: two pairs built from the same two indices in
/// any order compare and hash identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pair([usize; 2]);

impl Pair {
    #[must_use]
    pub const fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self([a, b])
        } else {
            Self([b, a])
        }
    }

    #[must_use]
    pub const fn get(&self, i: usize) -> usize {
        self.0[i]
    }

    #[must_use]
    pub fn contains(&self, id: usize) -> bool {
        self.0.contains(&id)
    }

    /// True when the same index appears twice (checked, not structurally prevented).
    #[must_use]
    pub const fn has_repetitions(&self) -> bool {
        self.0[0] == self.0[1]
    }
}

/// Sorted triple of ball indices, the key of a face in the triangulation search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple([usize; 3]);

impl Triple {
    #[must_use]
    pub fn new(a: usize, b: usize, c: usize) -> Self {
        let mut ids = [a, b, c];
        ids.sort_unstable();
        Self(ids)
    }

    #[must_use]
    pub const fn get(&self, i: usize) -> usize {
        self.0[i]
    }

    #[must_use]
    pub const fn ids(&self) -> [usize; 3] {
        self.0
    }

    #[must_use]
    pub fn contains(&self, id: usize) -> bool {
        self.0.contains(&id)
    }

    #[must_use]
    pub fn has_repetitions(&self) -> bool {
        self.0[0] == self.0[1] || self.0[1] == self.0[2]
    }

    /// Extend to a quadruple with a fourth, non-member index.
    #[must_use]
    pub fn with_id(&self, id: usize) -> Quadruple {
        Quadruple::new(self.0[0], self.0[1], self.0[2], id)
    }
}

/// Sorted quadruple of ball indices, the key of a diagram vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quadruple([usize; 4]);

impl Quadruple {
    #[must_use]
    pub fn new(a: usize, b: usize, c: usize, d: usize) -> Self {
        let mut ids = [a, b, c, d];
        ids.sort_unstable();
        Self(ids)
    }

    #[must_use]
    pub const fn get(&self, i: usize) -> usize {
        self.0[i]
    }

    #[must_use]
    pub const fn ids(&self) -> [usize; 4] {
        self.0
    }

    #[must_use]
    pub fn contains(&self, id: usize) -> bool {
        self.0.contains(&id)
    }

    #[must_use]
    pub fn has_repetitions(&self) -> bool {
        self.0[0] == self.0[1] || self.0[1] == self.0[2] || self.0[2] == self.0[3]
    }

    /// The triple obtained by dropping the member at position `i`.
    #[must_use]
    pub fn exclude(&self, i: usize) -> Triple {
        let mut ids = [0usize; 3];
        let mut k = 0;
        for (j, &id) in self.0.iter().enumerate() {
            if j != i {
                ids[k] = id;
                k += 1;
            }
        }
        Triple::new(ids[0], ids[1], ids[2])
    }
}

/// The diagram's vertex set: each quadruple of generators maps to its
/// one or two empty tangent spheres.
pub type QuadruplesMap = HashMap<Quadruple, Vec<Sphere>>;

/// Stable, order-deterministic flattening of a [`QuadruplesMap`],
/// one entry per tangent sphere.
pub type VerticesVector = Vec<(Quadruple, Sphere)>;

/// Per-vertex neighbor indices; slot `j` holds the vertex reached by
/// replacing generator `j`, when one exists.
pub type VerticesGraph = Vec<[Option<usize>; 4]>;

/// Counters accumulated by the face-expansion search, for diagnosing
/// performance and pathological inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchLog {
    pub added_quadruples: usize,
    pub added_tangent_spheres: usize,
    pub processed_faces: usize,
    pub produced_faces: usize,
    pub updated_faces: usize,
    /// Faces whose triple admits no tangent plane.
    pub difficult_faces: usize,
    pub triples_repetitions: usize,
    pub first_faces_iterations: usize,
}

impl SearchLog {
    pub fn absorb(&mut self, other: &Self) {
        self.added_quadruples += other.added_quadruples;
        self.added_tangent_spheres += other.added_tangent_spheres;
        self.processed_faces += other.processed_faces;
        self.produced_faces += other.produced_faces;
        self.updated_faces += other.updated_faces;
        self.difficult_faces += other.difficult_faces;
        self.triples_repetitions += other.triples_repetitions;
        self.first_faces_iterations += other.first_faces_iterations;
    }
}

/// Counters accumulated by the surplus co-tangency pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurplusLog {
    pub surplus_quadruples: usize,
    pub surplus_tangent_spheres: usize,
}

impl SurplusLog {
    pub fn absorb(&mut self, other: &Self) {
        self.surplus_quadruples += other.surplus_quadruples;
        self.surplus_tangent_spheres += other.surplus_tangent_spheres;
    }
}

/// Full output of one triangulation construction.
#[derive(Debug, Clone, Default)]
pub struct ConstructionResult {
    pub quadruples_map: QuadruplesMap,
    pub search_log: SearchLog,
    pub surplus_log: SurplusLog,
    /// Balls fully contained in another ball, excluded before the search.
    pub excluded_hidden_spheres_ids: Vec<usize>,
    /// Admitted balls that never appeared in any resolved slot.
    pub ignored_spheres_ids: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn tuples_are_canonical_under_permutation() {
        let q1 = Quadruple::new(3, 1, 4, 0);
        let q2 = Quadruple::new(0, 4, 1, 3);
        assert_eq!(q1, q2);
        assert_eq!(hash_of(&q1), hash_of(&q2));
        assert_eq!(q1.ids(), [0, 1, 3, 4]);

        let t1 = Triple::new(7, 2, 5);
        let t2 = Triple::new(5, 7, 2);
        assert_eq!(t1, t2);
        assert_eq!(hash_of(&t1), hash_of(&t2));

        assert_eq!(Pair::new(9, 1), Pair::new(1, 9));
    }

    #[test]
    fn quadruple_exclusion_drops_one_member() {
        let q = Quadruple::new(0, 1, 2, 3);
        assert_eq!(q.exclude(0), Triple::new(1, 2, 3));
        assert_eq!(q.exclude(3), Triple::new(0, 1, 2));
    }

    #[test]
    fn repetition_detection() {
        assert!(Triple::new(1, 1, 2).has_repetitions());
        assert!(!Triple::new(0, 1, 2).has_repetitions());
        assert!(Quadruple::new(4, 2, 4, 1).has_repetitions());
        assert!(!Quadruple::new(4, 2, 3, 1).has_repetitions());
    }

    #[test]
    fn triple_with_id_restores_quadruple() {
        let q = Quadruple::new(5, 2, 8, 11);
        for i in 0..4 {
            assert_eq!(q.exclude(i).with_id(q.get(i)), q);
        }
    }
}
