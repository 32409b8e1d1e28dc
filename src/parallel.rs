// Copyright (c) 2026 Kliment Olechnovic and Mikael Lund
// Part of the voronota-vertices project, licensed under the MIT License.
// SPDX-License-Identifier: MIT

//! Sharded parallel construction: the admitted ball set is partitioned by
//! recursive alternating-axis median bisection, every shard runs an
//! independent admittance-restricted engine over one shared read-only
//! hierarchy, and the shard maps are merged deterministically.

use log::debug;
use rayon::prelude::*;

use crate::collision::find_all_hidden_spheres;
use crate::geometry::Tolerance;
use crate::hierarchy::BoundingSpheresHierarchy;
use crate::triangulation::{
    construct_result_for_admittance_set, merge_quadruples_maps, DEFAULT_MIN_TOP_CLUSTERS,
};
use crate::types::{Ball, ConstructionResult, Sphere};

/// Like [`construct_result`](crate::construct_result), with the work split
/// into `parts` independent shards executed on the rayon thread pool.
///
/// Each shard only ever reads the shared hierarchy and writes its own map,
/// so no cross-shard coordination exists; the union of shard maps follows
/// the same at-most-two-distinct-spheres rule as the surplus pass.
#[must_use]
pub fn construct_result_in_parallel(
    balls: &[Ball],
    init_radius: f64,
    exclude_hidden: bool,
    include_surplus: bool,
    parts: usize,
) -> ConstructionResult {
    let tol = Tolerance::default();
    let spheres: Vec<Sphere> = balls.iter().map(Sphere::from_ball).collect();
    let bsh = BoundingSpheresHierarchy::new(&spheres, init_radius, DEFAULT_MIN_TOP_CLUSTERS, tol);

    let excluded_hidden_spheres_ids = if exclude_hidden {
        find_all_hidden_spheres(&bsh)
    } else {
        Vec::new()
    };
    let mut is_hidden = vec![false; spheres.len()];
    for &id in &excluded_hidden_spheres_ids {
        is_hidden[id] = true;
    }
    let admitted: Vec<usize> = (0..spheres.len()).filter(|&id| !is_hidden[id]).collect();

    let mut subsets: Vec<Vec<usize>> = Vec::new();
    split_into_parts(&spheres, admitted, 0, parts.max(1), &mut subsets);
    debug!(
        "parallel construction: {} balls over {} shards",
        spheres.len(),
        subsets.len()
    );

    let shard_results: Vec<ConstructionResult> = subsets
        .par_iter()
        .map(|ids| construct_result_for_admittance_set(&bsh, ids, include_surplus))
        .collect();

    let mut merged = ConstructionResult {
        excluded_hidden_spheres_ids,
        ..Default::default()
    };
    for shard in shard_results {
        merge_quadruples_maps(&shard.quadruples_map, &mut merged.quadruples_map, tol);
        merged.search_log.absorb(&shard.search_log);
        merged.surplus_log.absorb(&shard.surplus_log);
        merged.ignored_spheres_ids.extend(shard.ignored_spheres_ids);
    }

    // shards run without hidden-ball knowledge; keep the generator set clean
    if !merged.excluded_hidden_spheres_ids.is_empty() {
        merged
            .quadruples_map
            .retain(|quadruple, _| quadruple.ids().iter().all(|&id| !is_hidden[id]));
    }

    // a ball ignored by its own shard may still appear in another shard's map
    let mut used = vec![false; spheres.len()];
    for quadruple in merged.quadruples_map.keys() {
        for id in quadruple.ids() {
            used[id] = true;
        }
    }
    merged.ignored_spheres_ids.retain(|&id| !used[id]);
    merged.ignored_spheres_ids.sort_unstable();
    merged.ignored_spheres_ids.dedup();

    merged
}

/// Recursive binary spatial split by coordinate median, alternating axes,
/// until the requested number of parts is reached.
fn split_into_parts(
    spheres: &[Sphere],
    mut ids: Vec<usize>,
    axis: usize,
    parts: usize,
    output: &mut Vec<Vec<usize>>,
) {
    if parts <= 1 || ids.len() <= 1 {
        output.push(ids);
        return;
    }
    ids.sort_unstable_by(|&a, &b| {
        let ca = match axis {
            0 => spheres[a].center.x,
            1 => spheres[a].center.y,
            _ => spheres[a].center.z,
        };
        let cb = match axis {
            0 => spheres[b].center.x,
            1 => spheres[b].center.y,
            _ => spheres[b].center.z,
        };
        ca.total_cmp(&cb)
    });
    let upper = ids.split_off(ids.len() / 2);
    let upper_parts = parts / 2;
    let lower_parts = parts - upper_parts;
    split_into_parts(spheres, ids, (axis + 1) % 3, lower_parts, output);
    split_into_parts(spheres, upper, (axis + 1) % 3, upper_parts, output);
}
