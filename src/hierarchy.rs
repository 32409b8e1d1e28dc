// Copyright (c) 2026 Kliment Olechnovic and Mikael Lund
// Part of the voronota-vertices project, licensed under the MIT License.
// SPDX-License-Identifier: MIT

//! Bounding spheres hierarchy: a read-only, multi-level, bottom-up
//! clustering of the input balls supporting pruned tree search.

use log::debug;
use nalgebra::Point3;

use crate::geometry::Tolerance;
use crate::types::Sphere;

/// Inputs larger than this are pre-split by alternating-axis median
/// bisection before clustering, to bound the per-layer cost.
const PRESPLIT_THRESHOLD: usize = 10_000;

/// Layering stops once re-clustering shrinks a layer by less than this
/// factor; empirically chosen, kept as a tunable.
const LAYER_SHRINK_FACTOR: f64 = 0.9;

/// One node of the hierarchy: a bounding sphere, the clusters of the layer
/// below that it groups, and the input balls it ultimately covers.
#[derive(Debug, Clone)]
pub struct Cluster {
    pub sphere: Sphere,
    /// Indices into the layer below; empty at layer 0.
    pub children: Vec<usize>,
    /// Input sphere ids covered by this cluster.
    pub leaves: Vec<usize>,
}

/// Read-only spatial index over a fixed set of spheres.
///
/// Built once from the input; every cluster sphere bounds all leaf spheres
/// reachable under it, so a search may prune a whole subtree by testing the
/// cluster sphere alone.
pub struct BoundingSpheresHierarchy {
    spheres: Vec<Sphere>,
    /// layers[0] is the bottom clustering; the last layer is the search root set.
    layers: Vec<Vec<Cluster>>,
    tol: Tolerance,
}

impl BoundingSpheresHierarchy {
    /// Build the hierarchy with the given initial clustering expansion
    /// radius and minimum top-layer cluster count.
    #[must_use]
    pub fn new(
        spheres: &[Sphere],
        init_radius: f64,
        min_top_clusters: usize,
        tol: Tolerance,
    ) -> Self {
        let all_ids: Vec<usize> = (0..spheres.len()).collect();
        let base = if spheres.len() > PRESPLIT_THRESHOLD {
            let mut parts = Vec::new();
            split_ids_by_median(spheres, all_ids, 0, PRESPLIT_THRESHOLD, &mut parts);
            let mut clusters = Vec::new();
            for part in parts {
                clusters.extend(cluster_leaves(spheres, &part, init_radius));
            }
            clusters
        } else {
            cluster_leaves(spheres, &all_ids, init_radius)
        };

        let mut layers = vec![base];
        while layers[layers.len() - 1].len() > min_top_clusters.max(1) {
            let previous = layers[layers.len() - 1].len();
            let next = cluster_clusters(spheres, &layers[layers.len() - 1]);
            if next.len() as f64 > previous as f64 * LAYER_SHRINK_FACTOR {
                break;
            }
            layers.push(next);
        }

        debug!(
            "bounding spheres hierarchy: {} spheres, {} layers, top layer size {}",
            spheres.len(),
            layers.len(),
            layers.last().map_or(0, Vec::len)
        );

        Self {
            spheres: spheres.to_vec(),
            layers,
            tol,
        }
    }

    #[must_use]
    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    #[must_use]
    pub fn leaves_count(&self) -> usize {
        self.spheres.len()
    }

    #[must_use]
    pub const fn layers_count(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub const fn tolerance(&self) -> Tolerance {
        self.tol
    }

    /// Depth-first pruned search.
    ///
    /// A cluster is descended into only when `node_predicate` accepts its
    /// bounding sphere; leaves under accepting paths are offered to
    /// `leaf_predicate`, whose result is `(accept, stop_now)`. When a leaf
    /// sets `stop_now`, the search returns immediately with that leaf as the
    /// last accepted id. The traversal uses an explicit stack; recursion
    /// would not survive inputs with hundreds of thousands of balls.
    pub fn search<N, L>(&self, node_predicate: N, mut leaf_predicate: L) -> Vec<usize>
    where
        N: Fn(&Sphere) -> bool,
        L: FnMut(usize, &Sphere) -> (bool, bool),
    {
        let mut results = Vec::new();
        let Some(top) = self.layers.len().checked_sub(1) else {
            return results;
        };

        let mut stack: Vec<(usize, usize)> = (0..self.layers[top].len())
            .rev()
            .map(|i| (top, i))
            .collect();

        while let Some((layer, index)) = stack.pop() {
            let cluster = &self.layers[layer][index];
            if !node_predicate(&cluster.sphere) {
                continue;
            }
            if layer == 0 {
                for &id in &cluster.leaves {
                    let (accept, stop_now) = leaf_predicate(id, &self.spheres[id]);
                    if accept {
                        results.push(id);
                    }
                    if stop_now {
                        return results;
                    }
                }
            } else {
                for &child in cluster.children.iter().rev() {
                    stack.push((layer - 1, child));
                }
            }
        }
        results
    }
}

/// Recursive binary spatial split by coordinate median, alternating axes,
/// until every part fits under `threshold`.
fn split_ids_by_median(
    spheres: &[Sphere],
    mut ids: Vec<usize>,
    axis: usize,
    threshold: usize,
    output: &mut Vec<Vec<usize>>,
) {
    if ids.len() <= threshold {
        output.push(ids);
        return;
    }
    ids.sort_unstable_by(|&a, &b| {
        coordinate(&spheres[a].center, axis).total_cmp(&coordinate(&spheres[b].center, axis))
    });
    let upper = ids.split_off(ids.len() / 2);
    split_ids_by_median(spheres, ids, (axis + 1) % 3, threshold, output);
    split_ids_by_median(spheres, upper, (axis + 1) % 3, threshold, output);
}

fn coordinate(p: &Point3<f64>, axis: usize) -> f64 {
    match axis {
        0 => p.x,
        1 => p.y,
        _ => p.z,
    }
}

/// Greedy radius-expansion clustering of input spheres.
///
/// Centers are picked farthest-first along a traversal ordered by distance
/// from the first sphere; each picked center consumes the still-unassigned
/// spheres it can cover within its expansion reach. Every sphere is then
/// assigned to its nearest chosen center and the cluster sphere is grown to
/// bound its members exactly.
fn cluster_leaves(spheres: &[Sphere], ids: &[usize], expansion: f64) -> Vec<Cluster> {
    if ids.is_empty() {
        return Vec::new();
    }

    let origin = spheres[ids[0]].center;
    let mut order: Vec<usize> = ids.to_vec();
    order.sort_unstable_by(|&a, &b| {
        let da = (spheres[a].center - origin).norm_squared();
        let db = (spheres[b].center - origin).norm_squared();
        db.total_cmp(&da)
    });

    let mut consumed = vec![false; order.len()];
    let mut centers: Vec<usize> = Vec::new();
    for i in 0..order.len() {
        if consumed[i] {
            continue;
        }
        let center_id = order[i];
        centers.push(center_id);
        let reach = spheres[center_id].r + expansion;
        for (j, &other_id) in order.iter().enumerate() {
            if consumed[j] {
                continue;
            }
            let distance = (spheres[other_id].center - spheres[center_id].center).norm();
            if distance + spheres[other_id].r <= reach {
                consumed[j] = true;
            }
        }
    }

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); centers.len()];
    for &id in ids {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (k, &center_id) in centers.iter().enumerate() {
            let distance = (spheres[id].center - spheres[center_id].center).norm_squared();
            if distance < best_distance {
                best_distance = distance;
                best = k;
            }
        }
        members[best].push(id);
    }

    centers
        .iter()
        .zip(members)
        .filter(|(_, leaves)| !leaves.is_empty())
        .map(|(&center_id, leaves)| {
            let center = spheres[center_id].center;
            let radius = leaves
                .iter()
                .map(|&id| (spheres[id].center - center).norm() + spheres[id].r)
                .fold(0.0, f64::max);
            Cluster {
                sphere: Sphere::new(center, radius),
                children: Vec::new(),
                leaves,
            }
        })
        .collect()
}

/// Re-cluster a layer of clusters with zero extra expansion. The new
/// cluster radii bound the covered leaves, not just the child spheres.
fn cluster_clusters(spheres: &[Sphere], layer: &[Cluster]) -> Vec<Cluster> {
    let mut order: Vec<usize> = (0..layer.len()).collect();
    let origin = layer[0].sphere.center;
    order.sort_unstable_by(|&a, &b| {
        let da = (layer[a].sphere.center - origin).norm_squared();
        let db = (layer[b].sphere.center - origin).norm_squared();
        db.total_cmp(&da)
    });

    let mut consumed = vec![false; layer.len()];
    let mut centers: Vec<usize> = Vec::new();
    for &i in &order {
        if consumed[i] {
            continue;
        }
        centers.push(i);
        let reach = layer[i].sphere.r;
        for &j in &order {
            if consumed[j] {
                continue;
            }
            let distance = (layer[j].sphere.center - layer[i].sphere.center).norm();
            if distance + layer[j].sphere.r <= reach {
                consumed[j] = true;
            }
        }
    }

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); centers.len()];
    for i in 0..layer.len() {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (k, &center) in centers.iter().enumerate() {
            let distance = (layer[i].sphere.center - layer[center].sphere.center).norm_squared();
            if distance < best_distance {
                best_distance = distance;
                best = k;
            }
        }
        members[best].push(i);
    }

    centers
        .iter()
        .zip(members)
        .filter(|(_, children)| !children.is_empty())
        .map(|(&center, children)| {
            let center_point = layer[center].sphere.center;
            let leaves: Vec<usize> = children
                .iter()
                .flat_map(|&child| layer[child].leaves.iter().copied())
                .collect();
            let radius = leaves
                .iter()
                .map(|&id| (spheres[id].center - center_point).norm() + spheres[id].r)
                .fold(0.0, f64::max);
            Cluster {
                sphere: Sphere::new(center_point, radius),
                children,
                leaves,
            }
        })
        .collect()
}
