//! Global configuration constants and the tunable [`CollisionConfig`].

use serde::{Deserialize, Serialize};

use crate::error::CollisionError;

/// Separation left between resolved boxes (world units).
pub const DEFAULT_PAD: f32 = 0.001;

/// Upper bound on positional correction passes per step.
pub const DEFAULT_MAX_RESOLVE_ITERATIONS: usize = 100;

/// Upper bound on GJK simplex refinements.
pub const DEFAULT_GJK_MAX_ITERATIONS: usize = 100;

/// Upper bound on penetration refinement steps.
pub const DEFAULT_REFINE_MAX_DEPTH: usize = 32;

/// Tunables shared by the resolver, contact tracker and narrow-phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    pub pad: f32,
    pub max_resolve_iterations: usize,
    pub gjk_max_iterations: usize,
    pub refine_max_depth: usize,
    /// When set, pairs involving a sensor still show up in `CollidesWith`.
    pub report_sensor_pairs: bool,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            pad: DEFAULT_PAD,
            max_resolve_iterations: DEFAULT_MAX_RESOLVE_ITERATIONS,
            gjk_max_iterations: DEFAULT_GJK_MAX_ITERATIONS,
            refine_max_depth: DEFAULT_REFINE_MAX_DEPTH,
            report_sensor_pairs: true,
        }
    }
}

impl CollisionConfig {
    /// Gap below which two boxes still count as touching.
    pub fn contact_gap(&self) -> f32 {
        2.0 * self.pad
    }

    pub fn with_pad(mut self, pad: f32) -> Self {
        self.pad = pad;
        self
    }

    pub fn with_max_resolve_iterations(mut self, iterations: usize) -> Self {
        self.max_resolve_iterations = iterations;
        self
    }

    pub fn with_sensor_reporting(mut self, enabled: bool) -> Self {
        self.report_sensor_pairs = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), CollisionError> {
        if !self.pad.is_finite() || self.pad <= 0.0 {
            return Err(CollisionError::InvalidConfig {
                field: "pad",
                reason: format!("must be a positive finite number, got {}", self.pad),
            });
        }
        for (field, value) in [
            ("max_resolve_iterations", self.max_resolve_iterations),
            ("gjk_max_iterations", self.gjk_max_iterations),
            ("refine_max_depth", self.refine_max_depth),
        ] {
            if value == 0 {
                return Err(CollisionError::InvalidConfig {
                    field,
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        Ok(())
    }
}
