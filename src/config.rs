//! Simulation configuration.
//!
//! All tunables of the engine live in [`SimConfig`]. It can be built in code
//! with the `with_*` chain or loaded from a JSON file; missing JSON fields
//! take their defaults.
//!
//! ```
//! use plife::{BoundaryMode, SimConfig};
//!
//! let config = SimConfig::default()
//!     .with_domain(100.0, 50.0)
//!     .with_type_count_range(3, 6)
//!     .with_boundary_mode(BoundaryMode::Clamp);
//! assert!(config.validate().is_ok());
//! ```

use crate::boundary::{BoundaryMode, BoundaryPolicy, Bounds};
use crate::error::{Error, Result};
use crate::kernel::KernelParams;
use crate::profile::ProfileRanges;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Every tunable of a simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Domain half-width `W`.
    pub domain_width: f32,
    /// Domain half-height `H`.
    pub domain_height: f32,
    /// Edge rule.
    pub boundary_mode: BoundaryMode,
    /// Distance kept from the edges when spawning.
    pub spawn_margin: f32,
    /// Particles added per spawn.
    pub spawn_batch_size: usize,
    /// Below this count a batch is spawned every tick.
    pub population_floor: usize,
    /// Hard ceiling on the particle count.
    pub population_cap: usize,
    /// Seconds between automatic resets.
    pub reset_interval_seconds: f32,
    /// Smallest type count drawn on reset.
    pub type_count_min: u32,
    /// Largest type count drawn on reset (inclusive).
    pub type_count_max: u32,
    /// Below this distance the soft-core repulsion takes over.
    pub close_range_threshold: f32,
    /// Strength of the soft-core repulsion.
    pub close_force: f32,
    /// Scale applied to sampled force multipliers.
    pub force_scale: f32,
    /// Interaction range sampling interval.
    pub range_min: f32,
    pub range_max: f32,
    /// Unscaled force multiplier sampling interval.
    pub multiplier_min: f32,
    pub multiplier_max: f32,
    /// Per-tick velocity damping factor.
    pub damping: f32,
    /// Particles per parallel work unit in the CPU kernel.
    pub chunk_size: usize,
    /// Ticks per second the runner aims for. Cosmetic.
    pub target_rate: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        let ranges = ProfileRanges::default();
        Self {
            domain_width: 75.0,
            domain_height: 35.0,
            boundary_mode: BoundaryMode::Reflect,
            spawn_margin: 5.0,
            spawn_batch_size: 256,
            population_floor: 512,
            population_cap: 16_384,
            reset_interval_seconds: 240.0,
            type_count_min: 7,
            type_count_max: 14,
            close_range_threshold: 1.0,
            close_force: 1.0,
            force_scale: ranges.force_scale,
            range_min: ranges.range_min,
            range_max: ranges.range_max,
            multiplier_min: ranges.multiplier_min,
            multiplier_max: ranges.multiplier_max,
            damping: 0.9,
            chunk_size: 256,
            target_rate: 60,
        }
    }
}

impl SimConfig {
    /// Set the domain half-extents.
    pub fn with_domain(mut self, half_width: f32, half_height: f32) -> Self {
        self.domain_width = half_width;
        self.domain_height = half_height;
        self
    }

    pub fn with_boundary_mode(mut self, mode: BoundaryMode) -> Self {
        self.boundary_mode = mode;
        self
    }

    /// Set batch size and the floor that triggers automatic spawning.
    pub fn with_population(mut self, batch_size: usize, floor: usize) -> Self {
        self.spawn_batch_size = batch_size;
        self.population_floor = floor;
        self
    }

    pub fn with_population_cap(mut self, cap: usize) -> Self {
        self.population_cap = cap;
        self
    }

    pub fn with_reset_interval(mut self, seconds: f32) -> Self {
        self.reset_interval_seconds = seconds;
        self
    }

    /// Set the inclusive type count range drawn on reset.
    pub fn with_type_count_range(mut self, min: u32, max: u32) -> Self {
        self.type_count_min = min;
        self.type_count_max = max;
        self
    }

    pub fn with_force_scale(mut self, scale: f32) -> Self {
        self.force_scale = scale;
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_target_rate(mut self, rate: u32) -> Self {
        self.target_rate = rate;
        self
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.domain_width, self.domain_height)
    }

    pub fn boundary(&self) -> BoundaryPolicy {
        BoundaryPolicy::new(self.bounds(), self.boundary_mode)
    }

    pub fn profile_ranges(&self) -> ProfileRanges {
        ProfileRanges {
            range_min: self.range_min,
            range_max: self.range_max,
            multiplier_min: self.multiplier_min,
            multiplier_max: self.multiplier_max,
            force_scale: self.force_scale,
        }
    }

    pub fn kernel_params(&self) -> KernelParams {
        KernelParams {
            close_range: self.close_range_threshold,
            close_force: self.close_force,
            damping: self.damping,
            boundary: self.boundary(),
        }
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        let floats = [
            ("domain_width", self.domain_width),
            ("domain_height", self.domain_height),
            ("spawn_margin", self.spawn_margin),
            ("reset_interval_seconds", self.reset_interval_seconds),
            ("close_range_threshold", self.close_range_threshold),
            ("close_force", self.close_force),
            ("force_scale", self.force_scale),
            ("range_min", self.range_min),
            ("range_max", self.range_max),
            ("multiplier_min", self.multiplier_min),
            ("multiplier_max", self.multiplier_max),
            ("damping", self.damping),
        ];
        if let Some((name, value)) = floats.iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::invalid_config(format!("{name} must be finite, got {value}")));
        }
        if !(self.domain_width > 0.0 && self.domain_height > 0.0) {
            return Err(Error::invalid_config("domain extents must be positive"));
        }
        if !(self.spawn_margin >= 0.0)
            || self.spawn_margin >= self.domain_width
            || self.spawn_margin >= self.domain_height
        {
            return Err(Error::invalid_config(
                "spawn_margin must be non-negative and smaller than both domain extents",
            ));
        }
        if self.spawn_batch_size == 0 {
            return Err(Error::invalid_config("spawn_batch_size must be at least 1"));
        }
        if self.population_cap < self.population_floor {
            return Err(Error::invalid_config("population_cap must be >= population_floor"));
        }
        if !(self.reset_interval_seconds > 0.0) {
            return Err(Error::invalid_config("reset_interval_seconds must be positive"));
        }
        if self.type_count_min == 0 || self.type_count_min > self.type_count_max {
            return Err(Error::invalid_config(format!(
                "type count range {}..={} must be non-empty and start at 1 or more",
                self.type_count_min, self.type_count_max
            )));
        }
        if !(self.close_range_threshold > 0.0) || !(self.close_force >= 0.0) {
            return Err(Error::invalid_config(
                "close_range_threshold must be positive and close_force non-negative",
            ));
        }
        if !(self.range_min < self.range_max) || self.range_min <= self.close_range_threshold {
            return Err(Error::invalid_config(format!(
                "range {}..{} must be non-empty and start beyond close_range_threshold {}",
                self.range_min, self.range_max, self.close_range_threshold
            )));
        }
        if !(self.multiplier_min < self.multiplier_max) || !(self.force_scale > 0.0) {
            return Err(Error::invalid_config(
                "multiplier range must be non-empty and force_scale positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(Error::invalid_config("damping must lie in 0.0..=1.0"));
        }
        if self.chunk_size == 0 {
            return Err(Error::invalid_config("chunk_size must be at least 1"));
        }
        Ok(())
    }

    /// Save as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load from JSON and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let config: SimConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}
