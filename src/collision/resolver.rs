//! Iterative push-apart of overlapping solid boxes.
//!
//! Each pass looks at the candidate pairs whose members moved in the previous
//! pass, works out how much of this tick's displacement each member has to
//! give back so the pair separates on at least one axis, and rolls the
//! objects back by that fraction. Passes repeat until nothing moves or the
//! iteration cap is reached.

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{
    collision::contact::ContactTracker,
    config::CollisionConfig,
    core::{object::PhysicsObject, pair::IdPair, types::ObjectId},
};

/// How much of its displacement each member of a pair gave back this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReboundData {
    pub id_a: ObjectId,
    pub id_b: ObjectId,
    /// Portion of `id_a`'s displacement undone, in `[0, 1]`.
    pub fraction_a: f32,
    pub fraction_b: f32,
    /// Push `id_a` needed on the axis that decided its rebound.
    pub overlap_a: Vec3,
    pub overlap_b: Vec3,
}

impl ReboundData {
    pub fn new(id_a: ObjectId, id_b: ObjectId) -> Self {
        Self {
            id_a,
            id_b,
            fraction_a: 0.0,
            fraction_b: 0.0,
            overlap_a: Vec3::ZERO,
            overlap_b: Vec3::ZERO,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.fraction_a == 0.0
            && self.fraction_b == 0.0
            && self.overlap_a == Vec3::ZERO
            && self.overlap_b == Vec3::ZERO
    }

    fn absorb(fraction: &mut f32, overlap: &mut Vec3, side: SideRebound) {
        // Later passes undo a share of what is left, so fractions compound.
        *fraction = 1.0 - (1.0 - *fraction) * (1.0 - side.fraction);
        if *overlap == Vec3::ZERO {
            *overlap = side.overlap;
        }
    }
}

/// Symmetric "who collided with whom" table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollidesWith {
    map: HashMap<ObjectId, Vec<ObjectId>>,
}

impl CollidesWith {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `a` and `b` as colliding, in both directions.
    pub fn insert(&mut self, a: ObjectId, b: ObjectId) {
        Self::link(&mut self.map, a, b);
        Self::link(&mut self.map, b, a);
    }

    fn link(map: &mut HashMap<ObjectId, Vec<ObjectId>>, from: ObjectId, to: ObjectId) {
        let list = map.entry(from).or_default();
        if !list.contains(&to) {
            list.push(to);
        }
    }

    pub fn get(&self, id: ObjectId) -> &[ObjectId] {
        self.map.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, a: ObjectId, b: ObjectId) -> bool {
        self.get(a).contains(&b)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ObjectId, &Vec<ObjectId>)> {
        self.map.iter()
    }

    /// Number of objects with at least one collision.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn remove_object(&mut self, id: ObjectId) {
        if let Some(partners) = self.map.remove(&id) {
            for partner in partners {
                if let Some(list) = self.map.get_mut(&partner) {
                    list.retain(|&other| other != id);
                    if list.is_empty() {
                        self.map.remove(&partner);
                    }
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    fn sort_lists(&mut self) {
        for list in self.map.values_mut() {
            list.sort_unstable();
        }
    }
}

/// Everything the resolver produced during one step.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub collides_with: CollidesWith,
    pub rebounds: HashMap<IdPair, ReboundData>,
    pub iterations: usize,
    pub converged: bool,
}

impl Resolution {
    fn clear(&mut self) {
        self.collides_with.clear();
        self.rebounds.clear();
        self.iterations = 0;
        self.converged = false;
    }

    pub fn rebound(&self, a: ObjectId, b: ObjectId) -> Option<&ReboundData> {
        self.rebounds.get(&IdPair::new(a, b))
    }

    pub fn remove_object(&mut self, id: ObjectId) {
        self.collides_with.remove_object(id);
        self.rebounds.retain(|pair, _| !pair.contains(id));
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SideRebound {
    fraction: f32,
    overlap: Vec3,
}

/// Rebound each member of a solid pair needs, judged axis by axis.
///
/// `pad` is added to every resolved overlap and, scaled by the pass index,
/// loosens the test for whether motion alone can close an axis.
fn pair_rebound(
    a: &PhysicsObject,
    b: &PhysicsObject,
    pad: f32,
    iteration: usize,
) -> (Option<SideRebound>, Option<SideRebound>) {
    let (box_a, box_b) = (a.world_aabb(), b.world_aabb());
    let (move_a, move_b) = (a.displacement(), b.displacement());
    let mut side_a: Option<SideRebound> = None;
    let mut side_b: Option<SideRebound> = None;

    for axis in 0..3 {
        let a_is_left = a.previous_position()[axis] <= b.previous_position()[axis];
        let (left_box, right_box, left_move, right_move) = if a_is_left {
            (box_a, box_b, move_a, move_b)
        } else {
            (box_b, box_a, move_b, move_a)
        };

        let overlap = left_box.max[axis] - right_box.min[axis];
        if overlap <= 0.0 {
            continue;
        }

        // Only motion toward the other side can be given back.
        let left_budget = left_move[axis].max(0.0);
        let right_budget = (-right_move[axis]).max(0.0);
        let budget = left_budget + right_budget;
        if budget <= 0.0 || budget < overlap - pad * iteration as f32 {
            continue;
        }

        let fraction = ((overlap + pad) / budget).min(1.0);
        let mut push = Vec3::ZERO;
        push[axis] = overlap;

        let (left_side, right_side) = if a_is_left {
            (&mut side_a, &mut side_b)
        } else {
            (&mut side_b, &mut side_a)
        };
        if left_budget > 0.0 {
            keep_smaller(left_side, SideRebound { fraction, overlap: -push });
        }
        if right_budget > 0.0 {
            keep_smaller(right_side, SideRebound { fraction, overlap: push });
        }
    }

    (side_a, side_b)
}

/// Undoing the cheapest axis is enough to separate a pair.
fn keep_smaller(slot: &mut Option<SideRebound>, candidate: SideRebound) {
    match slot {
        Some(current) if current.fraction <= candidate.fraction => {}
        _ => *slot = Some(candidate),
    }
}

/// Positional correction for overlapping solid boxes.
///
/// Scratch buffers are indexed like the object slice of the current step and
/// reused between steps.
#[derive(Debug, Clone)]
pub struct PenetrationResolver {
    pad: f32,
    max_iterations: usize,
    report_sensor_pairs: bool,
    moved: Vec<bool>,
    fractions: Vec<f32>,
    output: Resolution,
}

impl PenetrationResolver {
    pub fn new(config: &CollisionConfig) -> Self {
        Self {
            pad: config.pad,
            max_iterations: config.max_resolve_iterations,
            report_sensor_pairs: config.report_sensor_pairs,
            moved: Vec::new(),
            fractions: Vec::new(),
            output: Resolution::default(),
        }
    }

    pub fn output(&self) -> &Resolution {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut Resolution {
        &mut self.output
    }

    /// Un-overlaps the candidate pairs in place.
    ///
    /// `pairs` must be canonical (`a < b`) and `lookup` must map every id in
    /// `objects` to its index. Pairs that overlap are registered with
    /// `contacts`.
    pub fn resolve(
        &mut self,
        pairs: &[(ObjectId, ObjectId)],
        objects: &mut [PhysicsObject],
        lookup: &HashMap<ObjectId, usize>,
        contacts: &mut ContactTracker,
    ) -> &Resolution {
        let count = objects.len();
        self.moved.clear();
        self.moved.resize(count, true);
        self.fractions.clear();
        self.fractions.resize(count, 0.0);
        self.output.clear();

        for iteration in 0..self.max_iterations {
            self.output.iterations = iteration + 1;
            self.fractions.fill(0.0);

            for &(id_a, id_b) in pairs {
                let pair = IdPair::from_canonical(id_a, id_b);
                let (Some(&ia), Some(&ib)) = (lookup.get(&id_a), lookup.get(&id_b)) else {
                    continue;
                };
                if !self.moved[ia] && !self.moved[ib] {
                    continue;
                }

                let (a, b) = (&objects[ia], &objects[ib]);
                if !a.world_aabb().overlaps(&b.world_aabb()) {
                    continue;
                }

                let both_solid = a.solid && b.solid;
                if both_solid || self.report_sensor_pairs {
                    self.output.collides_with.insert(id_a, id_b);
                }
                contacts.track(a, b);

                let entry = self
                    .output
                    .rebounds
                    .entry(pair)
                    .or_insert_with(|| ReboundData::new(id_a, id_b));
                if !both_solid {
                    continue;
                }

                let (side_a, side_b) = pair_rebound(a, b, self.pad, iteration);
                if side_a.is_none() && side_b.is_none() {
                    log::debug!(
                        "resolver: pair {pair} overlaps but no axis can be closed by this tick's motion"
                    );
                    continue;
                }
                if let Some(side) = side_a {
                    ReboundData::absorb(&mut entry.fraction_a, &mut entry.overlap_a, side);
                    self.fractions[ia] = self.fractions[ia].max(side.fraction);
                }
                if let Some(side) = side_b {
                    ReboundData::absorb(&mut entry.fraction_b, &mut entry.overlap_b, side);
                    self.fractions[ib] = self.fractions[ib].max(side.fraction);
                }
            }

            let mut any_moved = false;
            for (i, object) in objects.iter_mut().enumerate() {
                let fraction = self.fractions[i];
                self.moved[i] = fraction > 0.0;
                if fraction > 0.0 {
                    any_moved = true;
                    let rolled_back = object.position() - object.displacement() * fraction;
                    object.set_position(rolled_back);
                }
            }

            if !any_moved {
                self.output.converged = true;
                break;
            }
        }

        if !self.output.converged {
            log::warn!(
                "resolver: stopped after {} iterations with objects still moving",
                self.output.iterations
            );
        }

        self.output.collides_with.sort_lists();
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PAD;
    use approx::assert_abs_diff_eq;

    fn cube(id: u32, from: Vec3, to: Vec3) -> PhysicsObject {
        PhysicsObject::builder(ObjectId(id))
            .cuboid(Vec3::splat(1.0))
            .position(to)
            .previous_position(from)
            .build()
    }

    fn run(objects: &mut [PhysicsObject]) -> (Resolution, ContactTracker) {
        let config = CollisionConfig::default();
        let mut resolver = PenetrationResolver::new(&config);
        let mut contacts = ContactTracker::new(config.contact_gap());
        let lookup: HashMap<ObjectId, usize> = objects
            .iter()
            .enumerate()
            .map(|(i, o)| (o.id(), i))
            .collect();
        let mut pairs = Vec::new();
        for i in 0..objects.len() {
            for j in i + 1..objects.len() {
                let (a, b) = (objects[i].id(), objects[j].id());
                pairs.push(if a < b { (a, b) } else { (b, a) });
            }
        }
        let resolution = resolver
            .resolve(&pairs, objects, &lookup, &mut contacts)
            .clone();
        (resolution, contacts)
    }

    #[test]
    fn mover_rolls_back_to_pad_gap() {
        let mut objects = vec![
            cube(0, Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
            cube(1, Vec3::new(4.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)),
        ];
        let (resolution, _) = run(&mut objects);

        let rebound = resolution.rebound(ObjectId(0), ObjectId(1)).unwrap();
        assert_eq!(rebound.fraction_a, 0.0);
        assert_abs_diff_eq!(rebound.fraction_b, (1.0 + DEFAULT_PAD) / 2.0, epsilon = 1e-5);
        assert_eq!(rebound.overlap_b, Vec3::new(1.0, 0.0, 0.0));

        assert_eq!(objects[0].position(), Vec3::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(objects[1].world_aabb().min.x, 2.0 + DEFAULT_PAD, epsilon = 1e-5);
        assert!(!objects[0].world_aabb().overlaps(&objects[1].world_aabb()));
        assert!(resolution.converged);
        assert_eq!(resolution.iterations, 2);
    }

    #[test]
    fn head_on_movers_share_the_rollback() {
        let mut objects = vec![
            cube(0, Vec3::new(-2.0, 0.0, 0.0), Vec3::new(-0.5, 0.0, 0.0)),
            cube(1, Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.0)),
        ];
        let (resolution, _) = run(&mut objects);

        let rebound = resolution.rebound(ObjectId(0), ObjectId(1)).unwrap();
        assert_abs_diff_eq!(rebound.fraction_a, rebound.fraction_b, epsilon = 1e-6);
        assert!(rebound.overlap_a.x < 0.0 && rebound.overlap_b.x > 0.0);
        assert!(!objects[0].world_aabb().overlaps(&objects[1].world_aabb()));
        assert_abs_diff_eq!(
            objects[0].world_aabb().separation(&objects[1].world_aabb()),
            DEFAULT_PAD,
            epsilon = 1e-5
        );
    }

    #[test]
    fn diagonal_mover_undoes_only_its_cheapest_axis() {
        // Enters mostly along x but only grazes the top in y.
        let mut objects = vec![
            cube(0, Vec3::ZERO, Vec3::ZERO),
            cube(1, Vec3::new(3.0, 2.5, 0.0), Vec3::new(1.5, 1.9, 0.0)),
        ];
        let (resolution, _) = run(&mut objects);

        let rebound = resolution.rebound(ObjectId(0), ObjectId(1)).unwrap();
        // y: overlap 0.1 over a budget of 0.6, x: overlap 0.5 over 1.5.
        assert_abs_diff_eq!(rebound.fraction_b, (0.1 + DEFAULT_PAD) / 0.6, epsilon = 1e-4);
        assert!(rebound.overlap_b.y > 0.0 && rebound.overlap_b.x == 0.0);
        assert!(!objects[0].world_aabb().overlaps(&objects[1].world_aabb()));
    }

    #[test]
    fn spawned_overlap_is_left_alone() {
        let mut objects = vec![
            cube(0, Vec3::ZERO, Vec3::ZERO),
            cube(1, Vec3::new(0.5, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.0)),
        ];
        let (resolution, contacts) = run(&mut objects);

        assert!(resolution.collides_with.contains(ObjectId(0), ObjectId(1)));
        assert!(resolution.rebound(ObjectId(0), ObjectId(1)).unwrap().is_zero());
        assert_eq!(objects[1].position(), Vec3::new(0.5, 0.0, 0.0));
        assert!(contacts.is_touching(ObjectId(0), ObjectId(1)));
        assert!(resolution.converged);
    }

    #[test]
    fn sensor_pairs_are_reported_but_never_pushed() {
        let mut objects = vec![
            cube(0, Vec3::ZERO, Vec3::ZERO),
            cube(1, Vec3::new(4.0, 0.0, 0.0), Vec3::new(1.5, 0.0, 0.0)),
        ];
        objects[0].solid = false;
        let (resolution, contacts) = run(&mut objects);

        assert!(resolution.collides_with.contains(ObjectId(1), ObjectId(0)));
        assert!(resolution.rebound(ObjectId(0), ObjectId(1)).unwrap().is_zero());
        assert_eq!(objects[1].position(), Vec3::new(1.5, 0.0, 0.0));
        assert!(contacts.is_touching(ObjectId(0), ObjectId(1)));
    }

    #[test]
    fn collides_with_stays_symmetric_after_removal() {
        let mut table = CollidesWith::new();
        table.insert(ObjectId(1), ObjectId(2));
        table.insert(ObjectId(2), ObjectId(1));
        table.insert(ObjectId(1), ObjectId(3));
        assert_eq!(table.get(ObjectId(1)).len(), 2);
        assert_eq!(table.get(ObjectId(2)), &[ObjectId(1)]);

        table.remove_object(ObjectId(1));
        assert!(table.get(ObjectId(2)).is_empty());
        assert!(table.get(ObjectId(3)).is_empty());
        assert!(table.is_empty());
    }
}
