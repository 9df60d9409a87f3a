use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{
    core::{object::PhysicsObject, pair::IdPair, types::ObjectId},
    utils::math::axis_direction,
};

/// Contact geometry between two boxes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactData {
    pub id_a: ObjectId,
    pub id_b: ObjectId,
    /// Unit axis pointing from `id_a` toward `id_b`.
    pub normal: Vec3,
    /// Gap along `normal`; negative while the boxes overlap.
    pub distance: f32,
}

impl ContactData {
    /// Most-separating-axis contact between `a` and `b`.
    ///
    /// On each axis the object that sat lower at the previous tick is the
    /// left one, and the gap is `right.min - left.max`. The axis with the
    /// largest gap wins.
    pub fn between(a: &PhysicsObject, b: &PhysicsObject) -> Self {
        let (box_a, box_b) = (a.world_aabb(), b.world_aabb());
        let (prev_a, prev_b) = (a.previous_position(), b.previous_position());

        let mut best_axis = 0;
        let mut best_gap = f32::NEG_INFINITY;
        let mut a_is_left = true;

        for axis in 0..3 {
            let left_is_a = prev_a[axis] <= prev_b[axis];
            let gap = if left_is_a {
                box_b.min[axis] - box_a.max[axis]
            } else {
                box_a.min[axis] - box_b.max[axis]
            };
            if gap > best_gap {
                best_gap = gap;
                best_axis = axis;
                a_is_left = left_is_a;
            }
        }

        Self {
            id_a: a.id(),
            id_b: b.id(),
            normal: axis_direction(best_axis, if a_is_left { 1.0 } else { -1.0 }),
            distance: best_gap,
        }
    }

    pub fn is_overlapping(&self) -> bool {
        self.distance < 0.0
    }
}

/// Persistent pair contacts, carried from one tick to the next while the two
/// boxes stay overlapping or within the contact gap.
#[derive(Debug, Clone)]
pub struct ContactTracker {
    contacts: HashMap<IdPair, ContactData>,
    contact_gap: f32,
}

impl ContactTracker {
    pub fn new(contact_gap: f32) -> Self {
        Self {
            contacts: HashMap::new(),
            contact_gap,
        }
    }

    pub fn contact_gap(&self) -> f32 {
        self.contact_gap
    }

    /// Starts tracking a pair found overlapping this tick. The contact data is
    /// filled in by the next [`ContactTracker::update`].
    pub fn track(&mut self, a: &PhysicsObject, b: &PhysicsObject) {
        let (first, second) = if a.id() <= b.id() { (a, b) } else { (b, a) };
        self.contacts
            .insert(IdPair::new(a.id(), b.id()), ContactData::between(first, second));
    }

    /// Refreshes every tracked pair against final positions and drops pairs
    /// that drifted apart or whose objects are gone.
    pub fn update(&mut self, objects: &[PhysicsObject], lookup: &HashMap<ObjectId, usize>) {
        let gap = self.contact_gap;
        self.contacts.retain(|pair, data| {
            let (low, high) = pair.ids();
            let (Some(&ia), Some(&ib)) = (lookup.get(&low), lookup.get(&high)) else {
                log::trace!("contacts: dropping stale pair {pair}");
                return false;
            };
            let (a, b) = (&objects[ia], &objects[ib]);
            if a.world_aabb().separation(&b.world_aabb()) >= gap {
                return false;
            }
            *data = ContactData::between(a, b);
            true
        });
    }

    pub fn get(&self, a: ObjectId, b: ObjectId) -> Option<&ContactData> {
        self.contacts.get(&IdPair::new(a, b))
    }

    pub fn get_pair(&self, pair: IdPair) -> Option<&ContactData> {
        self.contacts.get(&pair)
    }

    pub fn is_touching(&self, a: ObjectId, b: ObjectId) -> bool {
        self.contacts.contains_key(&IdPair::new(a, b))
    }

    /// Every tracked contact involving `id`.
    pub fn contacts_of(&self, id: ObjectId) -> impl Iterator<Item = &ContactData> + '_ {
        self.contacts
            .iter()
            .filter(move |(pair, _)| pair.contains(id))
            .map(|(_, data)| data)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IdPair, &ContactData)> {
        self.contacts.iter()
    }

    pub fn as_map(&self) -> &HashMap<IdPair, ContactData> {
        &self.contacts
    }

    pub fn remove_object(&mut self, id: ObjectId) {
        self.contacts.retain(|pair, _| !pair.contains(id));
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn clear(&mut self) {
        self.contacts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box(id: u32, at: Vec3) -> PhysicsObject {
        PhysicsObject::builder(ObjectId(id))
            .cuboid(Vec3::splat(0.5))
            .position(at)
            .build()
    }

    fn lookup(objects: &[PhysicsObject]) -> HashMap<ObjectId, usize> {
        objects
            .iter()
            .enumerate()
            .map(|(i, o)| (o.id(), i))
            .collect()
    }

    #[test]
    fn most_separating_axis_picks_largest_gap() {
        let a = unit_box(0, Vec3::ZERO);
        let b = unit_box(1, Vec3::new(0.9, 1.5, 0.0));
        let contact = ContactData::between(&a, &b);
        assert_eq!(contact.normal, Vec3::Y);
        assert!((contact.distance - 0.5).abs() < 1e-6);
    }

    #[test]
    fn normal_points_from_a_to_b() {
        let a = unit_box(0, Vec3::new(3.0, 0.0, 0.0));
        let b = unit_box(1, Vec3::ZERO);
        let contact = ContactData::between(&a, &b);
        assert_eq!(contact.normal, Vec3::NEG_X);
        assert!((contact.distance - 2.0).abs() < 1e-6);
    }

    #[test]
    fn overlap_reports_negative_distance() {
        let a = unit_box(0, Vec3::ZERO);
        let b = unit_box(1, Vec3::new(0.75, 0.0, 0.0));
        let contact = ContactData::between(&a, &b);
        assert!(contact.is_overlapping());
        assert!((contact.distance + 0.25).abs() < 1e-6);
    }

    #[test]
    fn near_touching_pair_persists_and_far_pair_is_dropped() {
        let mut objects = vec![unit_box(0, Vec3::ZERO), unit_box(1, Vec3::new(1.001, 0.0, 0.0))];
        let mut tracker = ContactTracker::new(0.002);
        tracker.track(&objects[0], &objects[1]);

        tracker.update(&objects, &lookup(&objects));
        assert!(tracker.is_touching(ObjectId(1), ObjectId(0)));
        let data = tracker.get(ObjectId(0), ObjectId(1)).unwrap();
        assert!((data.distance - 0.001).abs() < 1e-5);

        objects[1].set_position(Vec3::new(1.5, 0.0, 0.0));
        tracker.update(&objects, &lookup(&objects));
        assert!(tracker.is_empty());
    }

    #[test]
    fn stale_pairs_are_dropped() {
        let objects = vec![unit_box(0, Vec3::ZERO), unit_box(1, Vec3::new(0.5, 0.0, 0.0))];
        let mut tracker = ContactTracker::new(0.002);
        tracker.track(&objects[0], &objects[1]);

        let survivors = vec![objects[0].clone()];
        tracker.update(&survivors, &lookup(&survivors));
        assert!(tracker.is_empty());
    }

    #[test]
    fn remove_object_prunes_its_pairs() {
        let objects = vec![
            unit_box(0, Vec3::ZERO),
            unit_box(1, Vec3::new(0.5, 0.0, 0.0)),
            unit_box(2, Vec3::new(-0.5, 0.0, 0.0)),
        ];
        let mut tracker = ContactTracker::new(0.002);
        tracker.track(&objects[0], &objects[1]);
        tracker.track(&objects[2], &objects[0]);
        assert_eq!(tracker.contacts_of(ObjectId(0)).count(), 2);

        tracker.remove_object(ObjectId(1));
        assert_eq!(tracker.len(), 1);
        assert!(tracker.is_touching(ObjectId(0), ObjectId(2)));
    }
}
