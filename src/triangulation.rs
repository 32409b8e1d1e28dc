// Copyright (c) 2026 Kliment Olechnovic and Mikael Lund
// Part of the voronota-vertices project, licensed under the MIT License.
// SPDX-License-Identifier: MIT

//! Incremental face-expansion search producing the Apollonius diagram's
//! vertex set: the map from generator quadruples to empty tangent spheres.
//!
//! The caller is responsible for providing at least 4 spheres; with fewer,
//! construction terminates with an empty map and every admitted ball
//! recorded as ignored.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};
use nalgebra::{Point3, Vector3};

use crate::collision::{find_all_collisions, find_all_hidden_spheres, find_any_collision_excluding};
use crate::geometry::{
    sphere_equals_sphere, sphere_intersects_sphere, sphere_touches_sphere, Plane, Tolerance,
};
use crate::hierarchy::BoundingSpheresHierarchy;
use crate::tangent::{
    tangent_planes_of_three_spheres, tangent_spheres_of_four_spheres,
    tangent_spheres_of_three_spheres,
};
use crate::types::{
    Ball, ConstructionResult, Quadruple, QuadruplesMap, SearchLog, Sphere, SurplusLog, Triple,
};

/// Minimum top-layer cluster count used for hierarchies built internally.
pub(crate) const DEFAULT_MIN_TOP_CLUSTERS: usize = 4;

/// Candidate window for re-seeding around an unused ball; empirically
/// chosen bound, kept as a tunable.
const RESEED_WINDOW: usize = 25;

/// Worst-case tangency gap accepted when classifying exact touches in the
/// e-search and the surplus pass; matches the tangent solvers' validation.
const TANGENCY_MARGIN: f64 = 1e-6;

/// Lifecycle of one half-space slot of a face.
#[derive(Debug, Clone, Copy)]
enum DSlot {
    Empty,
    Candidate(usize, Sphere),
    Validated(usize, Sphere),
    /// Provably or practically unfillable.
    Absent,
}

impl DSlot {
    fn sphere(&self) -> Option<&Sphere> {
        match self {
            Self::Candidate(_, s) | Self::Validated(_, s) => Some(s),
            _ => None,
        }
    }

    const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Per-triple working state of the search.
struct Face {
    triple: Triple,
    /// Plane through the three generator centers; slot 0 lives on its
    /// positive side, slot 1 on the negative. None for collinear centers.
    division_plane: Option<Plane>,
    /// 0 or 2 planes tangent to the generators, index-aligned with slots.
    tangent_planes: Vec<Plane>,
    d: [DSlot; 2],
    /// Extra generators admitting degenerate co-tangent spheres.
    e: Vec<(usize, Sphere)>,
    /// Ids ever tried per slot; bounds the find-valid fixed point.
    safety: [HashSet<usize>; 2],
}

impl Face {
    fn new(triple: Triple, spheres: &[Sphere], tol: Tolerance) -> Self {
        let [ia, ib, ic] = triple.ids();
        let (sa, sb, sc) = (&spheres[ia], &spheres[ib], &spheres[ic]);

        let normal = (sb.center - sa.center).cross(&(sc.center - sa.center));
        let division_plane = if tol.eq(normal.norm_squared(), 0.0) {
            None
        } else {
            Some(Plane::new(sa.center, normal.normalize()))
        };

        let mut tangent_planes = tangent_planes_of_three_spheres(sa, sb, sc, tol);
        if let (Some(division), 2) = (&division_plane, tangent_planes.len()) {
            // the plane whose normal opens toward a slot's halfspace prunes
            // candidates for that slot
            if tangent_planes[0].normal.dot(&division.normal)
                < tangent_planes[1].normal.dot(&division.normal)
            {
                tangent_planes.swap(0, 1);
            }
        }

        let d = if division_plane.is_some() {
            [DSlot::Empty, DSlot::Empty]
        } else {
            [DSlot::Absent, DSlot::Absent]
        };

        Self {
            triple,
            division_plane,
            tangent_planes,
            d,
            e: Vec::new(),
            safety: [HashSet::new(), HashSet::new()],
        }
    }

    const fn slot_sign(slot: usize) -> f64 {
        if slot == 0 {
            1.0
        } else {
            -1.0
        }
    }

    fn sphere_fits_slot(&self, slot: usize, tangent: &Sphere, tol: Tolerance) -> bool {
        self.division_plane.as_ref().is_some_and(|plane| {
            plane.signed_distance(&tangent.center) * Self::slot_sign(slot) >= -tol.epsilon()
        })
    }

    /// Spheres already recorded by the other slots and e-entries.
    fn recorded_spheres(&self, skip_slot: Option<usize>) -> Vec<Sphere> {
        let mut recorded = Vec::new();
        for (k, slot) in self.d.iter().enumerate() {
            if Some(k) != skip_slot {
                if let Some(s) = slot.sphere() {
                    recorded.push(*s);
                }
            }
        }
        recorded.extend(self.e.iter().map(|(_, s)| *s));
        recorded
    }

    fn conflicts_with_recorded(&self, tangent: &Sphere, skip_slot: usize, tol: Tolerance) -> bool {
        self.recorded_spheres(Some(skip_slot)).iter().any(|s| {
            sphere_intersects_sphere(tangent, s, tol) && !sphere_equals_sphere(tangent, s, tol)
        })
    }

    /// Merge a known `(id, tangent sphere)` from an adjacent face into an
    /// empty slot on the matching side. Returns whether anything changed.
    fn suggest_d(&mut self, id: usize, sphere: Sphere, tol: Tolerance) -> bool {
        if self.triple.contains(id) {
            return false;
        }
        for slot in 0..2 {
            if !self.d[slot].is_empty() || !self.sphere_fits_slot(slot, &sphere, tol) {
                continue;
            }
            let duplicate = match self.d[1 - slot] {
                DSlot::Candidate(other, s) | DSlot::Validated(other, s) => {
                    other == id && sphere_equals_sphere(&s, &sphere, tol)
                }
                _ => false,
            };
            if duplicate {
                return false;
            }
            self.safety[slot].insert(id);
            self.d[slot] = DSlot::Candidate(id, sphere);
            return true;
        }
        false
    }
}

enum InsertOutcome {
    NewQuadruple,
    NewTangentSphere,
    AlreadyKnown,
}

/// One construction run over a read-only hierarchy.
struct SearchEngine<'a> {
    bsh: &'a BoundingSpheresHierarchy,
    tol: Tolerance,
    /// Eligible as tangent-sphere generators (hidden balls removed).
    allowed: Vec<bool>,
    /// Seeding and fairness domain; a subset of `allowed`.
    admitted: Vec<bool>,
    map: QuadruplesMap,
    log: SearchLog,
    used: Vec<bool>,
    ignorable: Vec<bool>,
    arena: Vec<Option<Face>>,
    pending: HashMap<Triple, usize>,
    stack: Vec<usize>,
    processed: HashSet<Triple>,
}

impl<'a> SearchEngine<'a> {
    fn new(bsh: &'a BoundingSpheresHierarchy, allowed: Vec<bool>, admitted: Vec<bool>) -> Self {
        let n = bsh.leaves_count();
        Self {
            bsh,
            tol: bsh.tolerance(),
            allowed,
            admitted,
            map: QuadruplesMap::default(),
            log: SearchLog::default(),
            used: vec![false; n],
            ignorable: vec![false; n],
            arena: Vec::new(),
            pending: HashMap::new(),
            stack: Vec::new(),
            processed: HashSet::new(),
        }
    }

    fn sphere(&self, id: usize) -> Sphere {
        self.bsh.spheres()[id]
    }

    fn triple_spheres(&self, triple: Triple) -> (Sphere, Sphere, Sphere) {
        let [ia, ib, ic] = triple.ids();
        (self.sphere(ia), self.sphere(ib), self.sphere(ic))
    }

    /// Certify `target` against every ball except the listed generators.
    fn blocking_collision(&self, target: &Sphere, generators: &[usize]) -> Option<usize> {
        find_any_collision_excluding(self.bsh, target, generators)
    }

    fn insert_quadruple(&mut self, quadruple: Quadruple, sphere: Sphere) -> InsertOutcome {
        debug_assert!(!quadruple.has_repetitions());
        let tol = self.tol;
        let entry = self.map.entry(quadruple).or_default();
        if entry
            .iter()
            .any(|prev| sphere_equals_sphere(prev, &sphere, tol))
        {
            return InsertOutcome::AlreadyKnown;
        }
        if entry.len() >= 2 {
            // at most two distinct tangent spheres exist per quadruple
            return InsertOutcome::AlreadyKnown;
        }
        entry.push(sphere);
        let outcome = if entry.len() == 1 {
            InsertOutcome::NewQuadruple
        } else {
            InsertOutcome::NewTangentSphere
        };
        for id in quadruple.ids() {
            self.used[id] = true;
        }
        outcome
    }

    /// Insert with search-log attribution; returns whether anything new
    /// entered the map.
    fn record_emission(&mut self, quadruple: Quadruple, sphere: Sphere) -> bool {
        match self.insert_quadruple(quadruple, sphere) {
            InsertOutcome::NewQuadruple => {
                self.log.added_quadruples += 1;
                self.log.added_tangent_spheres += 1;
                true
            }
            InsertOutcome::NewTangentSphere => {
                self.log.added_tangent_spheres += 1;
                true
            }
            InsertOutcome::AlreadyKnown => false,
        }
    }

    fn push_preface(&mut self, triple: Triple, id: usize, sphere: Sphere) {
        if self.processed.contains(&triple) {
            self.log.triples_repetitions += 1;
            return;
        }
        if let Some(&index) = self.pending.get(&triple) {
            if let Some(face) = self.arena[index].as_mut() {
                if face.suggest_d(id, sphere, self.tol) {
                    self.log.updated_faces += 1;
                }
            }
            return;
        }
        let mut face = Face::new(triple, self.bsh.spheres(), self.tol);
        face.suggest_d(id, sphere, self.tol);
        let index = self.arena.len();
        self.arena.push(Some(face));
        self.pending.insert(triple, index);
        self.stack.push(index);
        self.log.produced_faces += 1;
    }

    /// Find some ball whose tangent sphere can occupy the slot, searching the
    /// hierarchy pruned to the slot's halfspace; when the tight pruning comes
    /// up empty the search is retried unpruned.
    fn find_any_d(&self, face: &mut Face, slot: usize) {
        let Some(division) = face.division_plane else {
            face.d[slot] = DSlot::Absent;
            return;
        };
        let sign = Face::slot_sign(slot);
        let triple = face.triple;
        let (sa, sb, sc) = self.triple_spheres(triple);
        let tol = self.tol;
        let eps = tol.epsilon();
        let tangent_plane = face.tangent_planes.get(slot).copied();
        let sibling = face.d[1 - slot].sphere().copied();
        let recorded = face.recorded_spheres(Some(slot));
        let allowed = &self.allowed;

        let mut found: Option<(usize, Sphere)> = None;
        for tight in [true, false] {
            let prune = |s: &Sphere| -> bool {
                if !tight {
                    return true;
                }
                if division.signed_distance(&s.center) * sign + s.r < -eps {
                    return false;
                }
                if let Some(plane) = &tangent_plane {
                    if plane.signed_distance(&s.center) + s.r < -eps {
                        return false;
                    }
                }
                if let Some(sibling) = &sibling {
                    if !sphere_intersects_sphere(s, sibling, tol)
                        && !sphere_touches_sphere(s, sibling, tol)
                    {
                        return false;
                    }
                }
                true
            };
            let leaf = |id: usize, ball: &Sphere| -> (bool, bool) {
                if !allowed[id] || triple.contains(id) || !prune(ball) {
                    return (false, false);
                }
                for tangent in tangent_spheres_of_four_spheres(&sa, &sb, &sc, ball, tol) {
                    if division.signed_distance(&tangent.center) * sign < -eps {
                        continue;
                    }
                    let clashes = recorded.iter().any(|s| {
                        sphere_intersects_sphere(&tangent, s, tol)
                            && !sphere_equals_sphere(&tangent, s, tol)
                    });
                    if clashes {
                        continue;
                    }
                    found = Some((id, tangent));
                    return (true, true);
                }
                (false, false)
            };
            self.bsh.search(&prune, leaf);
            if found.is_some() {
                break;
            }
        }

        match found {
            Some((id, tangent)) => {
                face.safety[slot].insert(id);
                face.d[slot] = DSlot::Candidate(id, tangent);
            }
            None => face.d[slot] = DSlot::Absent,
        }
    }

    /// Drive the slot's candidate to a fixed point: each ball intersecting
    /// the candidate tangent sphere is re-validated as a replacement, until a
    /// query finds no intersecting ball (the sphere is certified empty) or
    /// the slot flip-flops among already-seen ids.
    fn find_valid_d(&self, face: &mut Face, slot: usize) {
        let triple = face.triple;
        let [ia, ib, ic] = triple.ids();
        let (sa, sb, sc) = self.triple_spheres(triple);
        let tol = self.tol;

        loop {
            let DSlot::Candidate(d_id, tangent) = face.d[slot] else {
                break;
            };
            match self.blocking_collision(&tangent, &[ia, ib, ic, d_id]) {
                None => {
                    face.d[slot] = DSlot::Validated(d_id, tangent);
                    break;
                }
                Some(hit) => {
                    if face.safety[slot].contains(&hit) {
                        face.d[slot] = DSlot::Absent;
                        break;
                    }
                    let mut replaced = false;
                    if self.allowed[hit] && !triple.contains(hit) {
                        let ball = self.sphere(hit);
                        for candidate in tangent_spheres_of_four_spheres(&sa, &sb, &sc, &ball, tol)
                        {
                            if face.sphere_fits_slot(slot, &candidate, tol)
                                && !face.conflicts_with_recorded(&candidate, slot, tol)
                            {
                                face.safety[slot].insert(hit);
                                face.d[slot] = DSlot::Candidate(hit, candidate);
                                replaced = true;
                                break;
                            }
                        }
                    }
                    if !replaced {
                        face.d[slot] = DSlot::Absent;
                        break;
                    }
                }
            }
        }
    }

    /// Collect every extra generator that admits additional degenerate
    /// co-tangent spheres for this triple (the >4-cotangent case).
    fn find_all_e(&self, face: &mut Face) {
        let triple = face.triple;
        let [ia, ib, ic] = triple.ids();
        let (sa, sb, sc) = self.triple_spheres(triple);
        let tol = self.tol;
        if tangent_spheres_of_three_spheres(&sa, &sb, &sc, tol).is_empty() {
            return;
        }

        let touch_tol = Tolerance::new(TANGENCY_MARGIN);
        let anchors: Vec<(usize, Sphere)> = face
            .d
            .iter()
            .filter_map(|slot| match slot {
                DSlot::Validated(id, s) => Some((*id, *s)),
                _ => None,
            })
            .collect();
        let mut seen: HashSet<usize> = anchors.iter().map(|(id, _)| *id).collect();

        for (_, anchor) in &anchors {
            let probe = Sphere::new(anchor.center, anchor.r + 2.0 * TANGENCY_MARGIN);
            for id in find_all_collisions(self.bsh, &probe) {
                if !self.allowed[id] || triple.contains(id) || !seen.insert(id) {
                    continue;
                }
                let ball = self.sphere(id);
                if !sphere_touches_sphere(&ball, anchor, touch_tol) {
                    continue;
                }
                for tangent in tangent_spheres_of_four_spheres(&sa, &sb, &sc, &ball, tol) {
                    let clashes = face.recorded_spheres(None).iter().any(|s| {
                        sphere_intersects_sphere(&tangent, s, tol)
                            && !sphere_equals_sphere(&tangent, s, tol)
                    });
                    if clashes {
                        continue;
                    }
                    if self
                        .blocking_collision(&tangent, &[ia, ib, ic, id])
                        .is_some()
                    {
                        continue;
                    }
                    face.e.push((id, tangent));
                    break;
                }
            }
        }
    }

    fn process_face(&mut self, index: usize) {
        let Some(mut face) = self.arena[index].take() else {
            return;
        };
        self.pending.remove(&face.triple);
        self.processed.insert(face.triple);
        self.log.processed_faces += 1;
        if face.tangent_planes.is_empty() {
            self.log.difficult_faces += 1;
        }

        for slot in 0..2 {
            if face.d[slot].is_empty() {
                self.find_any_d(&mut face, slot);
            }
            self.find_valid_d(&mut face, slot);
        }
        self.find_all_e(&mut face);

        let mut emissions: Vec<(usize, Sphere)> = Vec::new();
        for slot in &face.d {
            if let DSlot::Validated(id, sphere) = slot {
                emissions.push((*id, *sphere));
            }
        }
        emissions.extend(face.e.iter().copied());

        let members = face.triple.ids();
        for (id, sphere) in emissions {
            self.record_emission(face.triple.with_id(id), sphere);
            for excluded in 0..3 {
                let (o1, o2) = match excluded {
                    0 => (members[1], members[2]),
                    1 => (members[0], members[2]),
                    _ => (members[0], members[1]),
                };
                self.push_preface(Triple::new(o1, o2, id), members[excluded], sphere);
            }
        }
    }

    /// Scan growing neighbor windows around a start ball for the first
    /// quadruple whose tangent sphere is collision-free; seeds the stack with
    /// its four faces. With `around` set, the window is bounded for
    /// re-seeding and only configurations adding something new count.
    fn find_first_faces(&mut self, around: Option<usize>) -> bool {
        let mut traversal: Vec<usize> = (0..self.bsh.leaves_count())
            .filter(|&id| self.admitted[id])
            .collect();
        if traversal.len() < 4 {
            return false;
        }

        let start = match around {
            Some(id) => id,
            None => {
                let inv = 1.0 / traversal.len() as f64;
                let mut centroid = Vector3::zeros();
                for &id in &traversal {
                    centroid += self.sphere(id).center.coords * inv;
                }
                let centroid = Point3::from(centroid);
                let mut nearest = traversal[0];
                for &id in &traversal[1..] {
                    let da = (self.sphere(id).center - centroid).norm_squared();
                    let db = (self.sphere(nearest).center - centroid).norm_squared();
                    if da < db {
                        nearest = id;
                    }
                }
                nearest
            }
        };

        let origin = self.sphere(start).center;
        traversal.sort_unstable_by(|&a, &b| {
            let da = (self.sphere(a).center - origin).norm_squared();
            let db = (self.sphere(b).center - origin).norm_squared();
            da.total_cmp(&db)
        });
        if around.is_some() {
            traversal.truncate(RESEED_WINDOW);
        }
        if traversal.len() < 4 {
            return false;
        }

        for d_pos in 3..traversal.len() {
            let d_id = traversal[d_pos];
            let sd = self.sphere(d_id);
            for i in 0..d_pos {
                for j in (i + 1)..d_pos {
                    for k in (j + 1)..d_pos {
                        self.log.first_faces_iterations += 1;
                        let (a_id, b_id, c_id) = (traversal[i], traversal[j], traversal[k]);
                        let (sa, sb, sc) = (self.sphere(a_id), self.sphere(b_id), self.sphere(c_id));
                        for tangent in
                            tangent_spheres_of_four_spheres(&sa, &sb, &sc, &sd, self.tol)
                        {
                            if self
                                .blocking_collision(&tangent, &[a_id, b_id, c_id, d_id])
                                .is_some()
                            {
                                continue;
                            }
                            let quadruple = Quadruple::new(a_id, b_id, c_id, d_id);
                            if !self.record_emission(quadruple, tangent) {
                                continue;
                            }
                            for m in 0..4 {
                                self.push_preface(
                                    quadruple.exclude(m),
                                    quadruple.get(m),
                                    tangent,
                                );
                            }
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    fn run(&mut self) {
        if !self.find_first_faces(None) {
            debug!("no initial quadruple found");
        }
        loop {
            while let Some(index) = self.stack.pop() {
                self.process_face(index);
            }
            let unused = (0..self.used.len())
                .find(|&id| self.admitted[id] && !self.used[id] && !self.ignorable[id]);
            let Some(ball) = unused else {
                break;
            };
            if !self.find_first_faces(Some(ball)) {
                trace!("ball {ball} recorded as ignorable");
                self.ignorable[ball] = true;
            }
        }
        debug!(
            "face expansion done: {} quadruples, {} tangent spheres, {} faces processed",
            self.log.added_quadruples, self.log.added_tangent_spheres, self.log.processed_faces
        );
    }

    /// Re-query every recorded tangent sphere under a slight radial
    /// expansion and emit all 4-combinations of the balls exactly touching
    /// it; required for symmetric inputs where more than four balls are
    /// exactly co-tangent.
    fn surplus_pass(&mut self, surplus_log: &mut SurplusLog) {
        let touch_tol = Tolerance::new(TANGENCY_MARGIN);
        let entries: Vec<Sphere> = self.map.values().flatten().copied().collect();
        for sphere in entries {
            let probe = Sphere::new(sphere.center, sphere.r + 2.0 * TANGENCY_MARGIN);
            let mut touching: Vec<usize> = find_all_collisions(self.bsh, &probe)
                .into_iter()
                .filter(|&id| {
                    self.allowed[id] && sphere_touches_sphere(&self.sphere(id), &sphere, touch_tol)
                })
                .collect();
            touching.sort_unstable();
            if touching.len() <= 4 {
                continue;
            }
            for a in 0..touching.len() {
                for b in (a + 1)..touching.len() {
                    for c in (b + 1)..touching.len() {
                        for d in (c + 1)..touching.len() {
                            let quadruple = Quadruple::new(
                                touching[a],
                                touching[b],
                                touching[c],
                                touching[d],
                            );
                            match self.insert_quadruple(quadruple, sphere) {
                                InsertOutcome::NewQuadruple => {
                                    surplus_log.surplus_quadruples += 1;
                                    surplus_log.surplus_tangent_spheres += 1;
                                }
                                InsertOutcome::NewTangentSphere => {
                                    surplus_log.surplus_tangent_spheres += 1;
                                }
                                InsertOutcome::AlreadyKnown => {}
                            }
                        }
                    }
                }
            }
        }
    }

    fn ignored_ids(&self) -> Vec<usize> {
        self.ignorable
            .iter()
            .enumerate()
            .filter_map(|(id, &flag)| flag.then_some(id))
            .collect()
    }
}

/// Construct the Apollonius diagram vertex set of the given balls.
///
/// `init_radius` is the hierarchy's initial clustering expansion (must be
/// above 1.0 to be useful); with `exclude_hidden` balls fully contained in
/// another ball are removed from the generator set before the search; with
/// `include_surplus` the degenerate co-tangency pass runs after it.
#[must_use]
pub fn construct_result(
    balls: &[Ball],
    init_radius: f64,
    exclude_hidden: bool,
    include_surplus: bool,
) -> ConstructionResult {
    let tol = Tolerance::default();
    let spheres: Vec<Sphere> = balls.iter().map(Sphere::from_ball).collect();
    let bsh = BoundingSpheresHierarchy::new(&spheres, init_radius, DEFAULT_MIN_TOP_CLUSTERS, tol);

    let excluded_hidden_spheres_ids = if exclude_hidden {
        find_all_hidden_spheres(&bsh)
    } else {
        Vec::new()
    };
    let mut allowed = vec![true; spheres.len()];
    for &id in &excluded_hidden_spheres_ids {
        allowed[id] = false;
    }
    let admitted = allowed.clone();

    let mut engine = SearchEngine::new(&bsh, allowed, admitted);
    engine.run();
    let mut surplus_log = SurplusLog::default();
    if include_surplus {
        engine.surplus_pass(&mut surplus_log);
    }

    let ignored_spheres_ids = engine.ignored_ids();
    ConstructionResult {
        quadruples_map: engine.map,
        search_log: engine.log,
        surplus_log,
        excluded_hidden_spheres_ids,
        ignored_spheres_ids,
    }
}

/// Run the engine restricted to an admitted subset of ball ids over a
/// pre-built hierarchy. Only admitted balls seed the search and count for
/// fairness, while tangent spheres are still certified empty against the
/// full ball set; this is the building block of the sharded parallel mode.
#[must_use]
pub fn construct_result_for_admittance_set(
    bsh: &BoundingSpheresHierarchy,
    admitted_ids: &[usize],
    include_surplus: bool,
) -> ConstructionResult {
    let n = bsh.leaves_count();
    let allowed = vec![true; n];
    let mut admitted = vec![false; n];
    for &id in admitted_ids {
        if id < n {
            admitted[id] = true;
        }
    }

    let mut engine = SearchEngine::new(bsh, allowed, admitted);
    engine.run();
    let mut surplus_log = SurplusLog::default();
    if include_surplus {
        engine.surplus_pass(&mut surplus_log);
    }

    let ignored_spheres_ids = engine.ignored_ids();
    ConstructionResult {
        quadruples_map: engine.map,
        search_log: engine.log,
        surplus_log,
        excluded_hidden_spheres_ids: Vec::new(),
        ignored_spheres_ids,
    }
}

/// Union `source` into `destination` under the at-most-two-distinct-spheres
/// rule. Idempotent; returns the number of tangent spheres added.
pub fn merge_quadruples_maps(
    source: &QuadruplesMap,
    destination: &mut QuadruplesMap,
    tol: Tolerance,
) -> usize {
    let mut added = 0;
    for (quadruple, spheres) in source {
        let entry = destination.entry(*quadruple).or_default();
        for sphere in spheres {
            if entry
                .iter()
                .any(|prev| sphere_equals_sphere(prev, sphere, tol))
            {
                continue;
            }
            if entry.len() >= 2 {
                continue;
            }
            entry.push(*sphere);
            added += 1;
        }
    }
    added
}
