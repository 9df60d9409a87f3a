//! Collision detection modules: broad-phase, penetration resolver, contact tracking, convex narrow-phase, queries.

pub mod shapes;
pub mod broadphase;
pub mod narrowphase;
pub mod contact;
pub mod resolver;
pub mod queries;

pub use broadphase::BroadPhase;
pub use contact::{ContactData, ContactTracker};
pub use narrowphase::{Gjk, GjkResult, NarrowPhase, Penetration, PenetrationRefiner, Simplex};
pub use queries::{Raycast, RaycastHit, RaycastQuery};
pub use resolver::{CollidesWith, PenetrationResolver, ReboundData, Resolution};
pub use shapes::{ConvexShape, SupportMap, SupportShape};
