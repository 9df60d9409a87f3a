use glam::Vec3;

use crate::core::{object::PhysicsObject, types::ObjectId};

/// Result of a ray cast against object bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub id: ObjectId,
    pub point: Vec3,
    /// Distance along the normalized ray direction; zero when the origin
    /// starts inside the box.
    pub distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastQuery {
    pub origin: Vec3,
    pub direction: Vec3,
    pub max_distance: f32,
}

impl RaycastQuery {
    pub fn new(origin: Vec3, direction: Vec3, max_distance: f32) -> Self {
        Self {
            origin,
            direction,
            max_distance,
        }
    }
}

pub struct Raycast;

impl Raycast {
    /// Every object whose world box the ray enters within `max_distance`.
    /// Hits come back in object order, not sorted by distance.
    pub fn cast(query: &RaycastQuery, objects: &[PhysicsObject]) -> Vec<RaycastHit> {
        let Some(direction) = query.direction.try_normalize() else {
            log::debug!("raycast: zero direction, no hits");
            return Vec::new();
        };

        objects
            .iter()
            .filter_map(|object| {
                object
                    .world_aabb()
                    .ray_intersection(query.origin, direction, query.max_distance)
                    .map(|distance| RaycastHit {
                        id: object.id(),
                        point: query.origin + direction * distance,
                        distance,
                    })
            })
            .collect()
    }

    /// Nearest hit; ties go to the earlier entry.
    pub fn closest(hits: &[RaycastHit]) -> Option<RaycastHit> {
        hits.iter()
            .copied()
            .reduce(|best, hit| if hit.distance < best.distance { hit } else { best })
    }
}
