use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::{
    collider::ColliderShape,
    types::{Aabb, ObjectId},
};

/// A collider placed in the world, as seen by the collision core for one tick.
///
/// The world box is kept in step with the position by every setter, so it is
/// always exactly the local box translated by the current position. The
/// motion box is refreshed by [`PhysicsObject::refresh_motion_bounds`] and only
/// consumed by the broad-phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsObject {
    id: ObjectId,
    pub solid: bool,
    shape: ColliderShape,
    local_aabb: Aabb,
    world_aabb: Aabb,
    motion_aabb: Aabb,
    position: Vec3,
    previous_position: Vec3,
}

impl PhysicsObject {
    /// Creates a solid object at rest at `position`.
    pub fn new(id: ObjectId, shape: ColliderShape, position: Vec3) -> Self {
        let local_aabb = shape.local_aabb();
        let world_aabb = local_aabb.translated(position);
        Self {
            id,
            solid: true,
            shape,
            local_aabb,
            world_aabb,
            motion_aabb: world_aabb,
            position,
            previous_position: position,
        }
    }

    pub fn builder(id: ObjectId) -> PhysicsObjectBuilder {
        PhysicsObjectBuilder::new(id)
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn shape(&self) -> &ColliderShape {
        &self.shape
    }

    pub fn local_aabb(&self) -> Aabb {
        self.local_aabb
    }

    pub fn world_aabb(&self) -> Aabb {
        self.world_aabb
    }

    pub fn motion_aabb(&self) -> Aabb {
        self.motion_aabb
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn previous_position(&self) -> Vec3 {
        self.previous_position
    }

    /// Displacement accumulated since the last committed tick.
    pub fn displacement(&self) -> Vec3 {
        self.position - self.previous_position
    }

    /// Moves the object within the current tick; the move is swept.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.world_aabb = self.local_aabb.translated(position);
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.set_position(self.position + delta);
    }

    /// Places the object without producing any sweep this tick.
    pub fn teleport(&mut self, position: Vec3) {
        self.previous_position = position;
        self.set_position(position);
        self.motion_aabb = self.world_aabb;
    }

    /// World box at the previous-tick position.
    pub fn previous_world_aabb(&self) -> Aabb {
        self.local_aabb.translated(self.previous_position)
    }

    pub fn refresh_motion_bounds(&mut self) {
        self.motion_aabb = self.world_aabb.union(&self.previous_world_aabb());
    }

    /// Copies the current position forward as next tick's starting point.
    pub fn commit_tick(&mut self) {
        self.previous_position = self.position;
    }
}

pub struct PhysicsObjectBuilder {
    id: ObjectId,
    shape: ColliderShape,
    solid: bool,
    position: Vec3,
    previous_position: Option<Vec3>,
}

impl PhysicsObjectBuilder {
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            shape: ColliderShape::cuboid(Vec3::splat(0.5)),
            solid: true,
            position: Vec3::ZERO,
            previous_position: None,
        }
    }

    pub fn shape(mut self, shape: ColliderShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn cuboid(mut self, half_extents: Vec3) -> Self {
        self.shape = ColliderShape::cuboid(half_extents);
        self
    }

    pub fn sensor(mut self) -> Self {
        self.solid = false;
        self
    }

    pub fn solid(mut self, solid: bool) -> Self {
        self.solid = solid;
        self
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Where the object was at the end of the previous tick; defaults to
    /// `position` (no motion).
    pub fn previous_position(mut self, position: Vec3) -> Self {
        self.previous_position = Some(position);
        self
    }

    pub fn build(self) -> PhysicsObject {
        let mut object = PhysicsObject::new(self.id, self.shape, self.position);
        object.solid = self.solid;
        if let Some(previous) = self.previous_position {
            object.previous_position = previous;
            object.refresh_motion_bounds();
        }
        object
    }
}
