//! Placement of newly spawned particles.
//!
//! New particles appear at a uniformly random point inside the domain, kept
//! `margin` away from every edge, with zero velocity and a uniformly random
//! type.

use crate::boundary::Bounds;
use glam::Vec2;
use rand::Rng;

/// Region new particles are dropped into.
#[derive(Clone, Copy, Debug)]
pub struct SpawnArea {
    inner: Bounds,
}

impl SpawnArea {
    /// Spawn area for `bounds` inset by `margin` on each side.
    pub fn new(bounds: &Bounds, margin: f32) -> Self {
        Self {
            inner: bounds.inset(margin),
        }
    }

    /// The inset rectangle positions are drawn from.
    pub fn bounds(&self) -> Bounds {
        self.inner
    }

    /// Random point strictly inside the inset rectangle.
    ///
    /// A degenerate (zero-extent) axis yields `0.0` on that axis.
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            open_interval(rng, self.inner.half_width),
            open_interval(rng, self.inner.half_height),
        )
    }

    /// Random type in `[0, type_count)`.
    #[inline]
    pub fn random_type<R: Rng + ?Sized>(rng: &mut R, type_count: u32) -> u32 {
        rng.gen_range(0..type_count.max(1))
    }
}

/// Uniform sample from the open interval `(-half, half)`.
fn open_interval<R: Rng + ?Sized>(rng: &mut R, half: f32) -> f32 {
    if half <= 0.0 {
        return 0.0;
    }
    loop {
        let v = rng.gen_range(-half..half);
        // gen_range is half-open; reject the closed end
        if v > -half {
            return v;
        }
    }
}
