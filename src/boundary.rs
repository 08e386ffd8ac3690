//! Simulation domain and edge behavior.
//!
//! The domain is the axis-aligned rectangle `[-W, W] × [-H, H]` centred on the
//! origin. What happens when a particle reaches an edge is selected with
//! [`BoundaryMode`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Half-extents of the simulation domain.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// `W`: the domain spans `-half_width..=half_width` on x.
    pub half_width: f32,
    /// `H`: the domain spans `-half_height..=half_height` on y.
    pub half_height: f32,
}

impl Bounds {
    pub fn new(half_width: f32, half_height: f32) -> Self {
        Self {
            half_width,
            half_height,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(-self.half_width, -self.half_height)
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.half_width, self.half_height)
    }

    /// Whether `p` lies inside the domain, edges included.
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.cmpge(self.min()).all() && p.cmple(self.max()).all()
    }

    /// Clamp `p` into the domain.
    #[inline]
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }

    /// Shrink the domain by `margin` on every side.
    ///
    /// Never shrinks past zero extent.
    pub fn inset(&self, margin: f32) -> Bounds {
        Bounds {
            half_width: (self.half_width - margin).max(0.0),
            half_height: (self.half_height - margin).max(0.0),
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(75.0, 35.0)
    }
}

/// Edge rule applied after each integration step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryMode {
    /// Clamp onto the edge and point the crossing velocity component back
    /// into the domain.
    #[default]
    Reflect,
    /// Clamp onto the edge, leave velocity alone.
    Clamp,
}

impl BoundaryMode {
    /// Encoding used by the GPU kernel.
    pub fn as_u32(self) -> u32 {
        match self {
            BoundaryMode::Reflect => 0,
            BoundaryMode::Clamp => 1,
        }
    }
}

/// Domain plus edge rule, as consumed by the kernel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPolicy {
    pub bounds: Bounds,
    pub mode: BoundaryMode,
}

impl BoundaryPolicy {
    pub fn new(bounds: Bounds, mode: BoundaryMode) -> Self {
        Self { bounds, mode }
    }

    /// Apply the edge rule to a freshly integrated particle.
    #[inline]
    pub fn apply(&self, position: &mut Vec2, velocity: &mut Vec2) {
        let (lo, hi) = (self.bounds.min(), self.bounds.max());

        if self.mode == BoundaryMode::Reflect {
            if position.x < lo.x {
                velocity.x = velocity.x.abs();
            } else if position.x > hi.x {
                velocity.x = -velocity.x.abs();
            }
            if position.y < lo.y {
                velocity.y = velocity.y.abs();
            } else if position.y > hi.y {
                velocity.y = -velocity.y.abs();
            }
        }

        *position = position.clamp(lo, hi);
    }
}
