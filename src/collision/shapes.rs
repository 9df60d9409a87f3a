use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::{object::PhysicsObject, types::Aabb};

/// Anything GJK can query: a convex volume known only through its support
/// function.
pub trait SupportMap {
    /// Farthest point of the volume along `direction`.
    fn support(&self, direction: Vec3) -> Vec3;

    fn center(&self) -> Vec3;

    /// Displacement of the volume during the current tick.
    fn travel(&self) -> Vec3 {
        Vec3::ZERO
    }
}

/// Convex geometry centered on the local origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SupportShape {
    Sphere { radius: f32 },
    Cuboid { half_extents: Vec3 },
    /// Y-aligned capsule; `height` is the length of the inner segment.
    Capsule { radius: f32, height: f32 },
    Hull { vertices: Vec<Vec3> },
}

impl SupportShape {
    pub fn support(&self, direction: Vec3) -> Vec3 {
        match self {
            SupportShape::Sphere { radius } => direction.normalize_or_zero() * *radius,
            SupportShape::Cuboid { half_extents } => Vec3::new(
                if direction.x >= 0.0 { half_extents.x } else { -half_extents.x },
                if direction.y >= 0.0 { half_extents.y } else { -half_extents.y },
                if direction.z >= 0.0 { half_extents.z } else { -half_extents.z },
            ),
            SupportShape::Capsule { radius, height } => {
                let half_height = height * 0.5;
                let tip = if direction.y >= 0.0 { half_height } else { -half_height };
                Vec3::new(0.0, tip, 0.0) + direction.normalize_or_zero() * *radius
            }
            SupportShape::Hull { vertices } => {
                let mut best = Vec3::ZERO;
                let mut best_dot = f32::NEG_INFINITY;
                for &v in vertices {
                    let dot = v.dot(direction);
                    if dot > best_dot {
                        best_dot = dot;
                        best = v;
                    }
                }
                best
            }
        }
    }

    pub fn local_aabb(&self) -> Aabb {
        match self {
            SupportShape::Sphere { radius } => {
                Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(*radius))
            }
            SupportShape::Cuboid { half_extents } => {
                Aabb::from_center_half_extents(Vec3::ZERO, *half_extents)
            }
            SupportShape::Capsule { radius, height } => Aabb::from_center_half_extents(
                Vec3::ZERO,
                Vec3::new(*radius, height * 0.5 + radius, *radius),
            ),
            SupportShape::Hull { vertices } => {
                Aabb::from_points(vertices).unwrap_or(Aabb::new(Vec3::ZERO, Vec3::ZERO))
            }
        }
    }
}

/// A support shape placed in the world for one narrow-phase query.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexShape {
    pub center: Vec3,
    pub travel: Vec3,
    pub shape: SupportShape,
}

impl ConvexShape {
    pub fn new(shape: SupportShape, center: Vec3) -> Self {
        Self {
            center,
            travel: Vec3::ZERO,
            shape,
        }
    }

    pub fn with_travel(mut self, travel: Vec3) -> Self {
        self.travel = travel;
        self
    }

    /// The object's collider at its current position, moving by its
    /// displacement for this tick.
    pub fn from_object(object: &PhysicsObject) -> Self {
        Self::new(object.shape().support_shape(), object.position())
            .with_travel(object.displacement())
    }
}

impl SupportMap for ConvexShape {
    fn support(&self, direction: Vec3) -> Vec3 {
        self.center + self.shape.support(direction)
    }

    fn center(&self) -> Vec3 {
        self.center
    }

    fn travel(&self) -> Vec3 {
        self.travel
    }
}
