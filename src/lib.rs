// Copyright (c) 2026 Kliment Olechnovic and Mikael Lund
// Part of the voronota-vertices project, licensed under the MIT License.
// SPDX-License-Identifier: MIT

//! Rust port of the voronota triangulation engine for computing the
//! Apollonius diagram (additively weighted Voronoi diagram) of balls.
//!
//! The diagram's vertices are spheres simultaneously tangent to exactly four
//! generator balls and intersecting no other ball. This library computes the
//! vertex set as a map from generator quadruples to empty tangent spheres,
//! together with a flattened vertex array and a vertex adjacency graph; these
//! are the combinatorial skeleton used by downstream molecular-surface and
//! contact computations.
//!
//! # Example
//!
//! ```
//! use voronota_vertices::{construct_result, Ball};
//!
//! let balls = vec![
//!     Ball::new(0.0, 0.0, 0.0, 1.0),
//!     Ball::new(3.0, 0.0, 0.0, 1.0),
//!     Ball::new(0.0, 3.0, 0.0, 1.0),
//!     Ball::new(0.0, 0.0, 3.0, 1.0),
//!     Ball::new(3.0, 3.0, 3.0, 1.0),
//! ];
//!
//! let result = construct_result(&balls, 3.5, true, false);
//!
//! for (quadruple, tangent_spheres) in &result.quadruples_map {
//!     for sphere in tangent_spheres {
//!         println!(
//!             "vertex {:?}: r = {:.3}",
//!             quadruple.ids(),
//!             sphere.r
//!         );
//!     }
//! }
//! ```

mod collision;
mod geometry;
mod hierarchy;
mod numeric;
mod parallel;
mod tangent;
mod triangulation;
mod types;
mod vertices;

pub use collision::{
    find_all_collisions, find_all_hidden_spheres, find_any_collision, find_any_collision_excluding,
};
pub use geometry::{
    any_normal_of_vector, directed_angle, rotate_vector_around_axis, sphere_contains_sphere,
    sphere_equals_sphere, sphere_intersects_sphere, sphere_touches_sphere, Plane, Tolerance,
};
pub use hierarchy::{BoundingSpheresHierarchy, Cluster};
pub use numeric::{safer_sum, solve_quadratic};
pub use parallel::construct_result_in_parallel;
pub use tangent::{
    tangent_planes_of_three_spheres, tangent_spheres_of_four_spheres,
    tangent_spheres_of_three_spheres,
};
pub use triangulation::{
    construct_result, construct_result_for_admittance_set, merge_quadruples_maps,
};
pub use types::{
    Ball, ConstructionResult, Pair, Quadruple, QuadruplesMap, SearchLog, Sphere, SurplusLog,
    Triple, VerticesGraph, VerticesVector,
};
pub use vertices::{
    collect_vertices_vector_from_quadruples_map, construct_vertices_graph, write_vertices_vector,
};
