//! End-to-end scenarios for the Apollonius diagram construction.
//!
//! A note on tolerances: the epsilon-based predicates used throughout the
//! engine are not provably transitive (two spheres compared "equal" pairwise
//! are not guaranteed interchangeable in a three-way comparison), so these
//! tests assert invariants with explicit margins rather than exact equality.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use voronota_vertices::{
    collect_vertices_vector_from_quadruples_map, construct_result, construct_result_in_parallel,
    construct_vertices_graph, find_all_collisions, find_any_collision, merge_quadruples_maps,
    sphere_intersects_sphere, write_vertices_vector, Ball, BoundingSpheresHierarchy,
    ConstructionResult, Quadruple, Sphere, Tolerance,
};

const TANGENCY_GAP: f64 = 2e-6;

fn tetrahedron_balls(edge: f64, r: f64) -> Vec<Ball> {
    let s = edge / (2.0 * f64::sqrt(2.0));
    vec![
        Ball::new(s, s, s, r),
        Ball::new(s, -s, -s, r),
        Ball::new(-s, s, -s, r),
        Ball::new(-s, -s, s, r),
    ]
}

fn random_balls(count: usize, seed: u64) -> Vec<Ball> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            Ball::new(
                rng.gen_range(0.0..14.0),
                rng.gen_range(0.0..14.0),
                rng.gen_range(0.0..14.0),
                rng.gen_range(0.8..1.6),
            )
        })
        .collect()
}

/// The empty-sphere invariant: every emitted tangent sphere touches its four
/// generators and intersects no other ball.
fn assert_vertex_invariants(balls: &[Ball], result: &ConstructionResult) {
    let tol = Tolerance::default();
    let spheres: Vec<Sphere> = balls.iter().map(Sphere::from_ball).collect();
    for (quadruple, tangent_spheres) in &result.quadruples_map {
        assert!(!tangent_spheres.is_empty());
        assert!(
            tangent_spheres.len() <= 2,
            "more than two tangent spheres for one quadruple"
        );
        for tangent in tangent_spheres {
            for (id, ball) in spheres.iter().enumerate() {
                if quadruple.contains(id) {
                    let gap = (ball.center - tangent.center).norm() - (ball.r + tangent.r);
                    assert!(
                        gap.abs() <= TANGENCY_GAP,
                        "generator {id} of {:?} not tangent (gap {gap:e})",
                        quadruple.ids()
                    );
                } else {
                    assert!(
                        !sphere_intersects_sphere(tangent, ball, tol),
                        "tangent sphere of {:?} intersects ball {id}",
                        quadruple.ids()
                    );
                }
            }
        }
    }
}

#[test]
fn minimal_tetrahedron() {
    let balls = tetrahedron_balls(2.5, 1.0);
    let result = construct_result(&balls, 3.5, true, false);

    assert_eq!(result.quadruples_map.len(), 1);
    let tangent_spheres = &result.quadruples_map[&Quadruple::new(0, 1, 2, 3)];
    assert_eq!(tangent_spheres.len(), 1);

    // the nested sphere sits at the centroid with radius circumradius - r
    let inner = &tangent_spheres[0];
    let circumradius = 2.5 * f64::sqrt(3.0 / 8.0);
    assert!(inner.center.coords.norm() < 1e-6);
    assert!((inner.r - (circumradius - 1.0)).abs() < 1e-6);

    assert!(result.excluded_hidden_spheres_ids.is_empty());
    assert!(result.ignored_spheres_ids.is_empty());
    assert_vertex_invariants(&balls, &result);
}

#[test]
fn one_hidden_ball_is_excluded_everywhere() {
    let balls = vec![
        Ball::new(0.0, 0.0, 0.0, 2.0),
        Ball::new(0.3, 0.0, 0.0, 0.5), // fully inside ball 0
        Ball::new(20.0, 0.0, 0.0, 1.0),
        Ball::new(0.0, 20.0, 0.0, 1.0),
        Ball::new(0.0, 0.0, 20.0, 1.0),
    ];
    let result = construct_result(&balls, 3.5, true, false);

    assert_eq!(result.excluded_hidden_spheres_ids, vec![1]);
    for quadruple in result.quadruples_map.keys() {
        assert!(!quadruple.contains(1), "hidden ball appeared in a vertex");
    }
    assert!(!result.quadruples_map.is_empty());
}

#[test]
fn unreachable_ball_is_ignored_and_construction_terminates() {
    // Ball 2 pokes out of each big ball individually but stays strictly
    // inside their union, so it is not hidden, yet every sphere tangent to
    // it from outside starts inside ball 0 or ball 1 and can never be empty.
    let balls = vec![
        Ball::new(-1.0, 0.0, 0.0, 2.0),
        Ball::new(1.0, 0.0, 0.0, 2.0),
        Ball::new(0.0, 0.0, 0.0, 1.3),
        Ball::new(8.0, 0.0, 0.0, 1.0),
        Ball::new(0.0, 8.0, 0.0, 1.0),
        Ball::new(0.0, 0.0, 8.0, 1.0),
        Ball::new(-8.0, -8.0, 2.0, 1.0),
    ];
    let result = construct_result(&balls, 3.5, true, false);

    assert!(result.excluded_hidden_spheres_ids.is_empty());
    assert!(result.ignored_spheres_ids.contains(&2));
    for quadruple in result.quadruples_map.keys() {
        assert!(!quadruple.contains(2));
    }
    assert!(!result.quadruples_map.is_empty());
    assert_vertex_invariants(&balls, &result);
}

/// Triangular bipyramid of five equal balls, all exactly tangent to one
/// common sphere centered at the origin.
fn bipyramid_balls() -> Vec<Ball> {
    let h = 3.0 * f64::sqrt(3.0) / 2.0;
    vec![
        Ball::new(3.0, 0.0, 0.0, 1.0),
        Ball::new(-1.5, h, 0.0, 1.0),
        Ball::new(-1.5, -h, 0.0, 1.0),
        Ball::new(0.0, 0.0, 3.0, 1.0),
        Ball::new(0.0, 0.0, -3.0, 1.0),
    ]
}

#[test]
fn surplus_pass_completes_cotangent_quadruples() {
    let balls = bipyramid_balls();

    let with_surplus = construct_result(&balls, 3.5, true, true);
    let without_surplus = construct_result(&balls, 3.5, true, false);

    // all C(5,4) = 5 quadruples must share the common tangent sphere
    let mut sharing = 0;
    for ids in [
        [0, 1, 2, 3],
        [0, 1, 2, 4],
        [0, 1, 3, 4],
        [0, 2, 3, 4],
        [1, 2, 3, 4],
    ] {
        let quadruple = Quadruple::new(ids[0], ids[1], ids[2], ids[3]);
        let entry = with_surplus
            .quadruples_map
            .get(&quadruple)
            .unwrap_or_else(|| panic!("missing surplus quadruple {ids:?}"));
        if entry
            .iter()
            .any(|s| s.center.coords.norm() < 1e-5 && (s.r - 2.0).abs() < 1e-5)
        {
            sharing += 1;
        }
    }
    assert_eq!(sharing, 5);

    // without the pass, only a subset of those quadruples appears
    for quadruple in without_surplus.quadruples_map.keys() {
        assert!(with_surplus.quadruples_map.contains_key(quadruple));
    }
    assert_vertex_invariants(&balls, &with_surplus);
}

#[test]
fn random_set_satisfies_empty_sphere_invariant() {
    let balls = random_balls(40, 17);
    let result = construct_result(&balls, 3.5, true, false);
    assert!(!result.quadruples_map.is_empty());
    assert_vertex_invariants(&balls, &result);
}

#[test]
fn collision_searches_are_consistent() {
    let balls = random_balls(60, 5);
    let spheres: Vec<Sphere> = balls.iter().map(Sphere::from_ball).collect();
    let bsh = BoundingSpheresHierarchy::new(&spheres, 3.5, 4, Tolerance::default());

    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..50 {
        let probe = Sphere::from_coords(
            rng.gen_range(-2.0..16.0),
            rng.gen_range(-2.0..16.0),
            rng.gen_range(-2.0..16.0),
            rng.gen_range(0.2..2.5),
        );
        let all = find_all_collisions(&bsh, &probe);
        let any = find_any_collision(&bsh, &probe);
        assert_eq!(all.is_empty(), any.is_none());
        if let Some(id) = any {
            assert!(all.contains(&id));
        }
    }
}

#[test]
fn merging_a_map_into_itself_changes_nothing() {
    let balls = random_balls(25, 3);
    let result = construct_result(&balls, 3.5, true, false);

    let mut merged = result.quadruples_map.clone();
    let added = merge_quadruples_maps(&result.quadruples_map, &mut merged, Tolerance::default());
    assert_eq!(added, 0);
    assert_eq!(merged.len(), result.quadruples_map.len());
    for (quadruple, spheres) in &merged {
        assert_eq!(spheres.len(), result.quadruples_map[quadruple].len());
    }
}

#[test]
fn parallel_construction_covers_the_sequential_vertex_set() {
    let balls = random_balls(30, 11);
    let sequential = construct_result(&balls, 3.5, true, false);
    let parallel = construct_result_in_parallel(&balls, 3.5, true, false, 4);

    for quadruple in sequential.quadruples_map.keys() {
        assert!(
            parallel.quadruples_map.contains_key(quadruple),
            "parallel run lost quadruple {:?}",
            quadruple.ids()
        );
    }
    assert_vertex_invariants(&balls, &parallel);
}

#[test]
fn paired_vertices_are_mutual_neighbors_in_the_graph() {
    // three unit balls and a small off-plane ball admit two tangent spheres
    // for the same quadruple, one on each side
    let h = 4.0 / f64::sqrt(3.0);
    let balls = vec![
        Ball::new(h, 0.0, 0.0, 1.0),
        Ball::new(-h / 2.0, 2.0, 0.0, 1.0),
        Ball::new(-h / 2.0, -2.0, 0.0, 1.0),
        Ball::new(0.0, 0.0, 0.2, 0.1),
    ];
    let result = construct_result(&balls, 3.5, true, false);
    let vertices = collect_vertices_vector_from_quadruples_map(&result.quadruples_map);
    assert_eq!(vertices.len(), 2);

    let graph = construct_vertices_graph(&balls, &result.quadruples_map);
    assert_eq!(graph[0], [Some(1); 4]);
    assert_eq!(graph[1], [Some(0); 4]);
}

#[test]
fn dump_lists_one_line_per_vertex() {
    let balls = random_balls(20, 42);
    let result = construct_result(&balls, 3.5, true, false);
    let vertices = collect_vertices_vector_from_quadruples_map(&result.quadruples_map);
    let graph = construct_vertices_graph(&balls, &result.quadruples_map);

    let mut output = Vec::new();
    write_vertices_vector(&vertices, Some(&graph), &mut output).expect("write to memory");
    let text = String::from_utf8(output).expect("utf8 output");
    assert_eq!(text.lines().count(), vertices.len());
    for line in text.lines() {
        assert_eq!(line.split_whitespace().count(), 12);
    }
}
