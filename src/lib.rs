//! Rebound Core – collision detection and resolution for game-style physics.
//!
//! The crate finds candidate pairs with a sort-and-sweep broad-phase, rolls
//! overlapping solid boxes back along their motion until they separate,
//! tracks contact geometry from one tick to the next, and offers a GJK-based
//! narrow-phase for convex shapes that are not plain boxes.

pub mod collision;
pub mod config;
pub mod core;
pub mod error;
pub mod utils;
pub mod world;

pub use glam::Vec3;

pub use collision::{
    broadphase::BroadPhase,
    contact::{ContactData, ContactTracker},
    narrowphase::{Gjk, GjkResult, NarrowPhase, Penetration, PenetrationRefiner, Simplex},
    queries::{Raycast, RaycastHit, RaycastQuery},
    resolver::{CollidesWith, PenetrationResolver, ReboundData, Resolution},
    shapes::{ConvexShape, SupportMap, SupportShape},
};
pub use config::CollisionConfig;
pub use crate::core::{
    collider::ColliderShape,
    object::{PhysicsObject, PhysicsObjectBuilder},
    pair::IdPair,
    types::{Aabb, ObjectId},
};
pub use error::{CollisionError, Result};
pub use utils::profiling::StepProfile;
pub use world::CollisionWorld;

/// High-level convenience wrapper that owns the objects and a [`CollisionWorld`].
#[derive(Debug, Clone, Default)]
pub struct CollisionEngine {
    objects: Vec<PhysicsObject>,
    world: CollisionWorld,
}

impl CollisionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with custom tunables, rejecting invalid ones.
    pub fn with_config(config: CollisionConfig) -> Result<Self> {
        Ok(Self {
            objects: Vec::new(),
            world: CollisionWorld::with_config(config)?,
        })
    }

    /// Registers an object. Ids must be unique.
    pub fn add_object(&mut self, object: PhysicsObject) -> Result<ObjectId> {
        let id = object.id();
        if self.index_of(id).is_some() {
            return Err(CollisionError::DuplicateObject(id));
        }
        self.objects.push(object);
        Ok(id)
    }

    /// Removes an object and every pair that references it.
    pub fn remove_object(&mut self, id: ObjectId) -> Result<PhysicsObject> {
        let index = self.index_of(id).ok_or(CollisionError::UnknownObject(id))?;
        self.world.remove_object(id);
        Ok(self.objects.remove(index))
    }

    pub fn object(&self, id: ObjectId) -> Option<&PhysicsObject> {
        self.objects.iter().find(|object| object.id() == id)
    }

    /// Mutable access, typically to move the object before the next step.
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut PhysicsObject> {
        self.objects.iter_mut().find(|object| object.id() == id)
    }

    pub fn objects(&self) -> &[PhysicsObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Runs one collision tick over the owned objects.
    pub fn step(&mut self) -> Result<&Resolution> {
        self.world.step(&mut self.objects)
    }

    pub fn raycast(&self, query: &RaycastQuery) -> Vec<RaycastHit> {
        self.world.raycast(query, &self.objects)
    }

    /// Exact shape test between two registered objects.
    pub fn collide(&self, a: ObjectId, b: ObjectId) -> Result<Option<Penetration>> {
        let first = self.object(a).ok_or(CollisionError::UnknownObject(a))?;
        let second = self.object(b).ok_or(CollisionError::UnknownObject(b))?;
        Ok(self.world.collide(first, second))
    }

    pub fn world(&self) -> &CollisionWorld {
        &self.world
    }

    fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|object| object.id() == id)
    }
}
