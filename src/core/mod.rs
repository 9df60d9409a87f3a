//! Core value types: ids, boxes, collider shapes and the per-tick object view.

pub mod types;
pub mod pair;
pub mod collider;
pub mod object;

pub use types::{Aabb, ObjectId};
pub use pair::IdPair;
pub use collider::ColliderShape;
pub use object::{PhysicsObject, PhysicsObjectBuilder};
