//! Columnar particle storage.
//!
//! Particles live in three parallel vectors (positions, velocities, types);
//! index `i` across all three is one particle. Particles are only ever
//! appended in batches or replaced in bulk, never reordered or removed one at
//! a time.

use crate::boundary::Bounds;
use crate::error::{Error, Result};
use crate::spawn::SpawnArea;
use glam::Vec2;
use rand::Rng;

/// Owned particle arrays.
#[derive(Clone, Debug, Default)]
pub struct SimulationState {
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    types: Vec<u32>,
}

impl SimulationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty state with room for `capacity` particles.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            velocities: Vec::with_capacity(capacity),
            types: Vec::with_capacity(capacity),
        }
    }

    /// Append `n` particles at rest, placed inside `bounds` inset by
    /// `margin`, with types uniform in `[0, type_count)`.
    pub fn append_batch<R: Rng + ?Sized>(
        &mut self,
        n: usize,
        bounds: &Bounds,
        margin: f32,
        type_count: u32,
        rng: &mut R,
    ) {
        let area = SpawnArea::new(bounds, margin);

        self.positions.reserve(n);
        self.velocities.reserve(n);
        self.types.reserve(n);

        for _ in 0..n {
            self.positions.push(area.random_position(rng));
            self.velocities.push(Vec2::ZERO);
            self.types.push(SpawnArea::random_type(rng, type_count));
        }
    }

    /// Append one particle. Used for hand-built scenarios.
    pub fn push(&mut self, position: Vec2, velocity: Vec2, particle_type: u32) {
        self.positions.push(position);
        self.velocities.push(velocity);
        self.types.push(particle_type);
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    #[inline]
    pub fn velocities(&self) -> &[Vec2] {
        &self.velocities
    }

    #[inline]
    pub fn types(&self) -> &[u32] {
        &self.types
    }

    /// Replace every position.
    ///
    /// Fails without touching the state if `positions.len() != count()`.
    pub fn set_positions(&mut self, positions: Vec<Vec2>) -> Result<()> {
        self.check_len("positions", positions.len())?;
        self.positions = positions;
        Ok(())
    }

    /// Replace every velocity.
    ///
    /// Fails without touching the state if `velocities.len() != count()`.
    pub fn set_velocities(&mut self, velocities: Vec<Vec2>) -> Result<()> {
        self.check_len("velocities", velocities.len())?;
        self.velocities = velocities;
        Ok(())
    }

    /// Replace positions and velocities together.
    ///
    /// Both lengths are checked before either column is touched.
    pub fn replace_motion(&mut self, positions: Vec<Vec2>, velocities: Vec<Vec2>) -> Result<()> {
        self.check_len("positions", positions.len())?;
        self.check_len("velocities", velocities.len())?;
        self.positions = positions;
        self.velocities = velocities;
        Ok(())
    }

    /// Drop every particle.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.velocities.clear();
        self.types.clear();
    }

    /// Number of particles of each type, indexed by type.
    ///
    /// Types at or above `type_count` are not counted.
    pub fn type_histogram(&self, type_count: usize) -> Vec<usize> {
        let mut counts = vec![0; type_count];
        for &t in &self.types {
            if let Some(c) = counts.get_mut(t as usize) {
                *c += 1;
            }
        }
        counts
    }

    fn check_len(&self, what: &str, len: usize) -> Result<()> {
        if len != self.count() {
            return Err(Error::invalid_argument(format!(
                "expected {} {what}, got {len}",
                self.count()
            )));
        }
        Ok(())
    }
}
