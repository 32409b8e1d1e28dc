// Copyright (c) 2026 Kliment Olechnovic and Mikael Lund
// Part of the voronota-vertices project, licensed under the MIT License.
// SPDX-License-Identifier: MIT

//! Deterministic flattening of the vertex map, the vertex adjacency graph,
//! and the textual dump format consumed by command-line tools.

use std::collections::HashMap;
use std::io::{self, Write};

use crate::geometry::{any_normal_of_vector, directed_angle, Tolerance};
use crate::types::{Ball, QuadruplesMap, Sphere, Triple, VerticesGraph, VerticesVector};

/// Flatten the map to one entry per tangent sphere, in a stable order:
/// quadruples ascending, and the spheres of one quadruple ordered
/// lexicographically by `(r, x, y, z)`.
#[must_use]
pub fn collect_vertices_vector_from_quadruples_map(map: &QuadruplesMap) -> VerticesVector {
    let mut keys: Vec<_> = map.keys().copied().collect();
    keys.sort_unstable();

    let mut vertices = Vec::new();
    for key in keys {
        let mut spheres = map[&key].clone();
        spheres.sort_by(|a, b| {
            a.r.total_cmp(&b.r)
                .then_with(|| a.center.x.total_cmp(&b.center.x))
                .then_with(|| a.center.y.total_cmp(&b.center.y))
                .then_with(|| a.center.z.total_cmp(&b.center.z))
        });
        for sphere in spheres {
            vertices.push((key, sphere));
        }
    }
    vertices
}

/// Build the vertex adjacency graph: `graph[i][j]` is the vertex reached
/// from vertex `i` by replacing generator `j`, when one exists.
///
/// Vertices are grouped by every excluded-triple key. A triple shared by
/// exactly two vertices links them directly; a triple shared by more
/// (degenerate cotangency) is resolved by ordering the sharers by angle
/// around the minimal-radius generator of the triple and linking each to its
/// angular successor.
#[must_use]
pub fn construct_vertices_graph(balls: &[Ball], map: &QuadruplesMap) -> VerticesGraph {
    let tol = Tolerance::default();
    let spheres: Vec<Sphere> = balls.iter().map(Sphere::from_ball).collect();
    let vertices = collect_vertices_vector_from_quadruples_map(map);
    let mut graph: VerticesGraph = vec![[None; 4]; vertices.len()];

    let mut buckets: HashMap<Triple, Vec<(usize, usize)>> = HashMap::new();
    for (vertex, (quadruple, _)) in vertices.iter().enumerate() {
        for slot in 0..4 {
            buckets
                .entry(quadruple.exclude(slot))
                .or_default()
                .push((vertex, slot));
        }
    }

    for (triple, members) in buckets {
        if members.len() < 2 {
            continue;
        }
        if members.len() == 2 {
            graph[members[0].0][members[0].1] = Some(members[1].0);
            graph[members[1].0][members[1].1] = Some(members[0].0);
            continue;
        }

        let [ia, ib, ic] = triple.ids();
        if ic >= spheres.len() {
            continue;
        }
        let mut pivot_id = ia;
        for id in [ib, ic] {
            if spheres[id].r < spheres[pivot_id].r {
                pivot_id = id;
            }
        }
        let pivot = spheres[pivot_id].center;

        let axis_vector = (spheres[ib].center - spheres[ia].center)
            .cross(&(spheres[ic].center - spheres[ia].center));
        let axis = if tol.eq(axis_vector.norm_squared(), 0.0) {
            any_normal_of_vector(&(spheres[ib].center - spheres[ia].center), tol)
        } else {
            axis_vector.normalize()
        };

        let reference = vertices[members[0].0].1.center;
        let mut ordered: Vec<(f64, usize, usize)> = members
            .iter()
            .map(|&(vertex, slot)| {
                let center = vertices[vertex].1.center;
                let angle = if tol.eq((center - pivot).norm_squared(), 0.0)
                    || tol.eq((reference - pivot).norm_squared(), 0.0)
                {
                    0.0
                } else {
                    directed_angle(&pivot, &reference, &center, &(pivot + axis))
                };
                (angle, vertex, slot)
            })
            .collect();
        ordered.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        for (position, &(_, vertex, slot)) in ordered.iter().enumerate() {
            let successor = ordered[(position + 1) % ordered.len()].1;
            graph[vertex][slot] = Some(successor);
        }
    }
    graph
}

/// Write one line per vertex: the 4 generator indices, the tangent sphere
/// x/y/z/r and, when a graph is given, the 4 neighbor indices with `-1`
/// standing for none. The field order is fixed.
pub fn write_vertices_vector<W: Write>(
    vertices: &VerticesVector,
    graph: Option<&VerticesGraph>,
    writer: &mut W,
) -> io::Result<()> {
    for (index, (quadruple, sphere)) in vertices.iter().enumerate() {
        write!(
            writer,
            "{} {} {} {} {} {} {} {}",
            quadruple.get(0),
            quadruple.get(1),
            quadruple.get(2),
            quadruple.get(3),
            sphere.center.x,
            sphere.center.y,
            sphere.center.z,
            sphere.r
        )?;
        if let Some(graph) = graph {
            for slot in 0..4 {
                match graph[index][slot] {
                    Some(neighbor) => write!(writer, " {neighbor}")?,
                    None => write!(writer, " -1")?,
                }
            }
        }
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Quadruple;

    fn map_with(entries: &[(Quadruple, Sphere)]) -> QuadruplesMap {
        let mut map = QuadruplesMap::default();
        for (quadruple, sphere) in entries {
            map.entry(*quadruple).or_default().push(*sphere);
        }
        map
    }

    #[test]
    fn flattening_is_order_deterministic() {
        let big = Sphere::from_coords(0.0, 0.0, 0.0, 5.0);
        let small = Sphere::from_coords(1.0, 1.0, 1.0, 0.5);
        let map = map_with(&[
            (Quadruple::new(4, 5, 6, 7), big),
            (Quadruple::new(0, 1, 2, 3), big),
            (Quadruple::new(0, 1, 2, 3), small),
        ]);
        let vertices = collect_vertices_vector_from_quadruples_map(&map);
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[0].0, Quadruple::new(0, 1, 2, 3));
        // within one quadruple the smaller radius comes first
        assert_eq!(vertices[0].1.r, 0.5);
        assert_eq!(vertices[1].1.r, 5.0);
        assert_eq!(vertices[2].0, Quadruple::new(4, 5, 6, 7));
    }

    #[test]
    fn paired_vertices_link_at_every_slot() {
        let balls = vec![
            Ball::new(0.0, 0.0, 0.0, 1.0),
            Ball::new(4.0, 0.0, 0.0, 1.0),
            Ball::new(0.0, 4.0, 0.0, 1.0),
            Ball::new(0.0, 0.0, 4.0, 1.0),
        ];
        let map = map_with(&[
            (Quadruple::new(0, 1, 2, 3), Sphere::from_coords(1.0, 1.0, 1.0, 0.8)),
            (Quadruple::new(0, 1, 2, 3), Sphere::from_coords(2.0, 2.0, 2.0, 6.0)),
        ]);
        let graph = construct_vertices_graph(&balls, &map);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph[0], [Some(1); 4]);
        assert_eq!(graph[1], [Some(0); 4]);
    }

    #[test]
    fn degenerate_sharers_link_in_angular_order() {
        let balls = vec![
            Ball::new(0.0, 0.0, 0.0, 0.5),
            Ball::new(4.0, 0.0, 0.0, 1.0),
            Ball::new(0.0, 4.0, 0.0, 1.0),
            Ball::new(0.0, 0.0, 0.0, 1.0),
            Ball::new(0.0, 0.0, 0.0, 1.0),
            Ball::new(0.0, 0.0, 0.0, 1.0),
        ];
        // three vertices sharing triple {0,1,2}, spheres placed at
        // 0, 90 and 180 degrees around the pivot (ball 0)
        let map = map_with(&[
            (Quadruple::new(0, 1, 2, 3), Sphere::from_coords(1.0, 0.0, 0.0, 0.1)),
            (Quadruple::new(0, 1, 2, 4), Sphere::from_coords(0.0, 1.0, 0.0, 0.1)),
            (Quadruple::new(0, 1, 2, 5), Sphere::from_coords(-1.0, 0.0, 0.0, 0.1)),
        ]);
        let graph = construct_vertices_graph(&balls, &map);
        assert_eq!(graph.len(), 3);
        // the shared triple occupies slot 3 of each quadruple
        assert_eq!(graph[0][3], Some(1));
        assert_eq!(graph[1][3], Some(2));
        assert_eq!(graph[2][3], Some(0));
    }

    #[test]
    fn dump_format_field_order() {
        let map = map_with(&[(
            Quadruple::new(3, 0, 2, 1),
            Sphere::from_coords(1.5, -2.0, 0.25, 0.75),
        )]);
        let vertices = collect_vertices_vector_from_quadruples_map(&map);
        let graph: VerticesGraph = vec![[Some(7), None, Some(9), None]];

        let mut plain = Vec::new();
        write_vertices_vector(&vertices, None, &mut plain).expect("write to memory");
        assert_eq!(String::from_utf8(plain).unwrap(), "0 1 2 3 1.5 -2 0.25 0.75\n");

        let mut linked = Vec::new();
        write_vertices_vector(&vertices, Some(&graph), &mut linked).expect("write to memory");
        assert_eq!(
            String::from_utf8(linked).unwrap(),
            "0 1 2 3 1.5 -2 0.25 0.75 7 -1 9 -1\n"
        );
    }
}
