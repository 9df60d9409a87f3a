use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::types::Aabb;
use crate::collision::shapes::SupportShape;

/// Collider geometry, expressed in object space around the object position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    /// Single axis-aligned box centered on the object.
    Box { half_extents: Vec3 },
    /// Several axis-aligned boxes, each in object space.
    MultiBox { boxes: Vec<Aabb> },
    /// Any convex volume described by its support function.
    Convex(SupportShape),
}

impl ColliderShape {
    pub fn cuboid(half_extents: Vec3) -> Self {
        ColliderShape::Box {
            half_extents: half_extents.abs(),
        }
    }

    /// # Panics
    /// Panics if `boxes` is empty.
    pub fn multi_box(boxes: Vec<Aabb>) -> Self {
        assert!(!boxes.is_empty(), "multi-box collider needs at least one box");
        ColliderShape::MultiBox { boxes }
    }

    pub fn sphere(radius: f32) -> Self {
        ColliderShape::Convex(SupportShape::Sphere {
            radius: radius.abs(),
        })
    }

    pub fn convex_hull(vertices: Vec<Vec3>) -> Self {
        ColliderShape::Convex(SupportShape::Hull { vertices })
    }

    /// Object-space bounds.
    pub fn local_aabb(&self) -> Aabb {
        match self {
            ColliderShape::Box { half_extents } => {
                Aabb::from_center_half_extents(Vec3::ZERO, *half_extents)
            }
            ColliderShape::MultiBox { boxes } => boxes
                .iter()
                .skip(1)
                .fold(boxes[0], |acc, b| acc.union(b)),
            ColliderShape::Convex(shape) => shape.local_aabb(),
        }
    }

    /// True when the shape is made only of axis-aligned boxes.
    pub fn is_box_like(&self) -> bool {
        matches!(
            self,
            ColliderShape::Box { .. } | ColliderShape::MultiBox { .. }
        )
    }

    /// Object-space boxes for box-like shapes; empty for convex shapes.
    pub fn local_boxes(&self) -> Vec<Aabb> {
        match self {
            ColliderShape::Box { .. } => vec![self.local_aabb()],
            ColliderShape::MultiBox { boxes } => boxes.clone(),
            ColliderShape::Convex(_) => Vec::new(),
        }
    }

    /// The convex support shape that stands in for this collider in GJK.
    /// Multi-box colliders use the hull of all their corners.
    pub fn support_shape(&self) -> SupportShape {
        match self {
            ColliderShape::Box { half_extents } => SupportShape::Cuboid {
                half_extents: *half_extents,
            },
            ColliderShape::MultiBox { boxes } => SupportShape::Hull {
                vertices: boxes.iter().flat_map(|b| b.corners()).collect(),
            },
            ColliderShape::Convex(shape) => shape.clone(),
        }
    }
}
