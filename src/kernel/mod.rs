//! The per-tick physics step.
//!
//! Every tick each particle sums a pairwise force from every other particle,
//! folds it into its velocity, damps, integrates and applies the boundary
//! policy. The step is a pure function of a frozen [`KernelInput`] snapshot:
//! results go to fresh output buffers, so no particle ever sees another
//! particle's half-updated state.
//!
//! # Force profile
//!
//! For a pair at distance `d` with profile `(range, multiplier)`:
//!
//! | Distance | Force |
//! |----------|-------|
//! | `d == 0` | none |
//! | `d < close_range` | soft-core repulsion, `close_force * (1/(d+3) - 1/(close_range+3))` away from the neighbour |
//! | `close_range <= d <= range` | `multiplier * hat(d)` toward the neighbour |
//! | `d > range` | none |
//!
//! `hat` is a triangle that is zero at `close_range`, peaks at the middle of
//! `[close_range, range]` and returns to zero at `range`, so the whole profile
//! is continuous in `d`.
//!
//! # Cost
//!
//! The sum is all-pairs, O(N²) per tick. [`CpuKernel`] splits particles into
//! chunks and spreads chunks across the rayon pool; `GpuKernel` (feature
//! `gpu`) runs one invocation per particle in workgroups of
//! [`WORKGROUP_SIZE`].

mod cpu;
#[cfg(feature = "gpu")]
mod gpu;
mod shader;

pub use cpu::CpuKernel;
#[cfg(feature = "gpu")]
pub use gpu::GpuKernel;
pub use shader::{KERNEL_WGSL, WORKGROUP_SIZE};

use crate::boundary::BoundaryPolicy;
use crate::error::{Error, Result};
use crate::profile::ForceProfile;
use glam::Vec2;

/// Constant offset in the soft-core term; keeps the repulsion finite at `d → 0`.
const SOFT_CORE_OFFSET: f32 = 3.0;

/// Tick-invariant physics constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KernelParams {
    pub close_range: f32,
    pub close_force: f32,
    pub damping: f32,
    pub boundary: BoundaryPolicy,
}

impl Default for KernelParams {
    fn default() -> Self {
        Self {
            close_range: 1.0,
            close_force: 1.0,
            damping: 0.9,
            boundary: BoundaryPolicy::default(),
        }
    }
}

/// Frozen snapshot handed to a kernel.
#[derive(Clone, Copy, Debug)]
pub struct KernelInput<'a> {
    pub positions: &'a [Vec2],
    pub velocities: &'a [Vec2],
    pub types: &'a [u32],
    /// Row-major `type_count × type_count` table.
    pub profiles: &'a [ForceProfile],
    pub type_count: u32,
    /// Upper bound on every `range` in `profiles`, usually
    /// [`ForceProfileTable::max_range`](crate::profile::ForceProfileTable::max_range).
    /// Pairs farther apart than this (and than `close_range`) are skipped.
    pub max_range: f32,
    pub params: KernelParams,
}

impl KernelInput<'_> {
    #[inline]
    pub fn count(&self) -> usize {
        self.positions.len()
    }

    /// Distance beyond which a pair contributes no force.
    #[inline]
    pub fn cutoff(&self) -> f32 {
        self.max_range.max(self.params.close_range)
    }

    /// Check the snapshot is self-consistent.
    ///
    /// An empty particle set is always accepted.
    pub fn validate(&self) -> Result<()> {
        let n = self.count();
        if self.velocities.len() != n || self.types.len() != n {
            return Err(Error::invalid_argument(format!(
                "kernel buffers disagree: {} positions, {} velocities, {} types",
                n,
                self.velocities.len(),
                self.types.len()
            )));
        }
        if n == 0 {
            return Ok(());
        }
        if self.type_count == 0 {
            return Err(Error::invalid_argument("type_count must be at least 1"));
        }
        let tc = self.type_count as usize;
        if self.profiles.len() != tc * tc {
            return Err(Error::invalid_argument(format!(
                "profile table has {} cells, expected {} for {} types",
                self.profiles.len(),
                tc * tc,
                tc
            )));
        }
        let widest = self.profiles.iter().map(|c| c.range).fold(0.0, f32::max);
        if !(self.max_range >= widest) {
            return Err(Error::invalid_argument(format!(
                "max_range {} is below the widest profile range {widest}",
                self.max_range
            )));
        }
        if let Some(bad) = self.types.iter().position(|&t| t >= self.type_count) {
            return Err(Error::invalid_argument(format!(
                "particle {bad} has type {} but type_count is {}",
                self.types[bad], self.type_count
            )));
        }
        Ok(())
    }

    /// New position and velocity of particle `i`.
    ///
    /// Reads only the snapshot.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds or the snapshot would fail
    /// [`validate`](Self::validate).
    #[inline]
    pub fn integrate(&self, i: usize) -> (Vec2, Vec2) {
        let tc = self.type_count as usize;
        let p_i = self.positions[i];
        let row = &self.profiles[self.types[i] as usize * tc..][..tc];
        let cutoff = self.cutoff();
        let cutoff_sq = cutoff * cutoff;

        let mut v = self.velocities[i];
        for (j, (&p_j, &t_j)) in self.positions.iter().zip(self.types).enumerate() {
            let delta = p_j - p_i;
            if j == i || delta.length_squared() > cutoff_sq {
                continue;
            }
            v += pair_force(delta, row[t_j as usize], &self.params);
        }

        v *= self.params.damping;
        let mut p = p_i + v;
        self.params.boundary.apply(&mut p, &mut v);
        (p, v)
    }
}

/// Result of one step: complete replacements, same length and order as the input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KernelOutput {
    pub positions: Vec<Vec2>,
    pub velocities: Vec<Vec2>,
}

/// A backend able to run one physics step.
pub trait PhysicsKernel {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Run one tick against `input`.
    ///
    /// Must accept an empty snapshot and return empty outputs for it.
    fn step(&mut self, input: &KernelInput<'_>) -> Result<KernelOutput>;
}

impl<K: PhysicsKernel + ?Sized> PhysicsKernel for Box<K> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn step(&mut self, input: &KernelInput<'_>) -> Result<KernelOutput> {
        (**self).step(input)
    }
}

/// Signed force magnitude along the unit vector toward the neighbour.
///
/// Negative values push the particles apart.
#[inline]
pub fn force_magnitude(d: f32, profile: ForceProfile, params: &KernelParams) -> f32 {
    let close = params.close_range;
    if d <= 0.0 {
        0.0
    } else if d < close {
        -params.close_force * (1.0 / (d + SOFT_CORE_OFFSET) - 1.0 / (close + SOFT_CORE_OFFSET))
    } else if d <= profile.range && profile.range > close {
        let mid = 0.5 * (close + profile.range);
        let half = 0.5 * (profile.range - close);
        profile.multiplier * (1.0 - (d - mid).abs() / half)
    } else {
        0.0
    }
}

/// Force on a particle from a neighbour at offset `delta`.
#[inline]
pub fn pair_force(delta: Vec2, profile: ForceProfile, params: &KernelParams) -> Vec2 {
    let d = delta.length();
    if d == 0.0 {
        return Vec2::ZERO;
    }
    (delta / d) * force_magnitude(d, profile, params)
}
