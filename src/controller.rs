//! Reset/growth lifecycle and the per-tick driver.
//!
//! [`SimulationController`] owns the particle state, the force profile table
//! and the kernel. Renderers and input handlers hold a reference to it: they
//! read positions and types through the accessors and steer the run through
//! the `request_*` commands, which take effect on the next [`tick`].
//!
//! [`tick`]: SimulationController::tick

use crate::config::SimConfig;
use crate::error::{Error, Result};
use crate::kernel::{KernelInput, PhysicsKernel};
use crate::profile::ForceProfileTable;
use crate::state::SimulationState;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Parameters that only change on reset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationEpoch {
    /// Number of particle types; always at least 1.
    pub type_count: u32,
    /// Time (seconds) passed to the last reset.
    pub last_reset_time: f32,
}

/// What a single [`SimulationController::tick`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The world was reset before stepping.
    pub reset: bool,
    /// Particles appended before stepping.
    pub spawned: usize,
    /// Particle count after the tick.
    pub count: usize,
}

/// Owner of the simulation.
pub struct SimulationController {
    config: SimConfig,
    state: SimulationState,
    profiles: ForceProfileTable,
    epoch: SimulationEpoch,
    kernel: Box<dyn PhysicsKernel>,
    rng: StdRng,
    spawn_requested: bool,
    reset_requested: bool,
    target_rate: u32,
    ticks: u64,
}

impl SimulationController {
    /// Validate `config` and start a fresh world at time `0.0`.
    ///
    /// The world starts empty; the first tick that finds the population
    /// below the floor spawns a batch.
    pub fn new(config: SimConfig, kernel: impl PhysicsKernel + 'static) -> Result<Self> {
        Self::build(config, Box::new(kernel), StdRng::from_entropy())
    }

    /// Like [`new`](Self::new) but with a fixed RNG seed.
    pub fn with_seed(
        config: SimConfig,
        kernel: impl PhysicsKernel + 'static,
        seed: u64,
    ) -> Result<Self> {
        Self::build(config, Box::new(kernel), StdRng::seed_from_u64(seed))
    }

    fn build(config: SimConfig, kernel: Box<dyn PhysicsKernel>, rng: StdRng) -> Result<Self> {
        config.validate()?;
        let target_rate = config.target_rate;
        let mut controller = Self {
            state: SimulationState::with_capacity(config.population_floor),
            profiles: ForceProfileTable::new(1),
            epoch: SimulationEpoch {
                type_count: 1,
                last_reset_time: 0.0,
            },
            config,
            kernel,
            rng,
            spawn_requested: false,
            reset_requested: false,
            target_rate,
            ticks: 0,
        };
        controller.reset(0.0);
        Ok(controller)
    }

    /// Advance the simulation by one tick at time `now` (seconds).
    ///
    /// Resets if the reset interval has elapsed or a reset was requested;
    /// otherwise spawns a batch if the population is below the floor or a
    /// spawn was requested. Then runs the kernel once and commits its output.
    pub fn tick(&mut self, now: f32) -> Result<TickReport> {
        let mut report = TickReport::default();

        let expired = now > self.epoch.last_reset_time + self.config.reset_interval_seconds;
        if self.reset_requested || expired {
            self.reset(now);
            report.reset = true;
        } else if self.spawn_requested || self.state.count() < self.config.population_floor {
            report.spawned = self.spawn_batch();
        }

        self.step()?;
        self.ticks += 1;

        report.count = self.state.count();
        Ok(report)
    }

    /// Draw a new type count, regenerate the profile table and drop every
    /// particle.
    pub fn reset(&mut self, now: f32) {
        let type_count = self
            .rng
            .gen_range(self.config.type_count_min..=self.config.type_count_max);

        self.profiles = ForceProfileTable::generate(
            type_count as usize,
            &self.config.profile_ranges(),
            &mut self.rng,
        );
        self.state.clear();
        self.epoch = SimulationEpoch {
            type_count,
            last_reset_time: now,
        };
        self.reset_requested = false;

        tracing::info!(type_count, time = now, "simulation reset");
    }

    /// Replace the world with a hand-built one.
    ///
    /// Every particle type must be below `profiles.type_count()`. The reset
    /// timer is left alone.
    pub fn install(&mut self, profiles: ForceProfileTable, state: SimulationState) -> Result<()> {
        let type_count = profiles.type_count();
        if type_count == 0 {
            return Err(Error::invalid_argument("profile table must cover at least one type"));
        }
        if let Some(&bad) = state.types().iter().find(|&&t| t as usize >= type_count) {
            return Err(Error::invalid_argument(format!(
                "particle type {bad} out of range for {type_count} types"
            )));
        }
        self.profiles = profiles;
        self.state = state;
        self.epoch.type_count = type_count as u32;
        Ok(())
    }

    /// Spawn one batch on the next tick.
    pub fn request_spawn_batch(&mut self) {
        self.spawn_requested = true;
    }

    /// Reset on the next tick.
    pub fn request_reset(&mut self) {
        self.reset_requested = true;
    }

    /// Set the tick rate a driver should aim for. Does not affect the physics.
    pub fn configure_target_rate(&mut self, rate: u32) {
        self.target_rate = rate;
    }

    pub fn target_rate(&self) -> u32 {
        self.target_rate
    }

    pub fn positions(&self) -> &[Vec2] {
        self.state.positions()
    }

    pub fn velocities(&self) -> &[Vec2] {
        self.state.velocities()
    }

    pub fn types(&self) -> &[u32] {
        self.state.types()
    }

    pub fn count(&self) -> usize {
        self.state.count()
    }

    pub fn type_count(&self) -> u32 {
        self.epoch.type_count
    }

    pub fn epoch(&self) -> SimulationEpoch {
        self.epoch
    }

    pub fn profiles(&self) -> &ForceProfileTable {
        &self.profiles
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Ticks run since construction.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn kernel_name(&self) -> &'static str {
        self.kernel.name()
    }

    fn spawn_batch(&mut self) -> usize {
        self.spawn_requested = false;

        let room = self.config.population_cap.saturating_sub(self.state.count());
        let n = self.config.spawn_batch_size.min(room);
        if n == 0 {
            tracing::debug!(
                cap = self.config.population_cap,
                "spawn skipped, population cap reached"
            );
            return 0;
        }

        self.state.append_batch(
            n,
            &self.config.bounds(),
            self.config.spawn_margin,
            self.epoch.type_count,
            &mut self.rng,
        );
        tracing::debug!(spawned = n, count = self.state.count(), "spawned batch");
        n
    }

    fn step(&mut self) -> Result<()> {
        let input = KernelInput {
            positions: self.state.positions(),
            velocities: self.state.velocities(),
            types: self.state.types(),
            profiles: self.profiles.flatten(),
            type_count: self.epoch.type_count,
            max_range: self.profiles.max_range(),
            params: self.config.kernel_params(),
        };
        let output = self.kernel.step(&input)?;
        self.state.replace_motion(output.positions, output.velocities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{CpuKernel, KernelOutput};

    fn controller(config: SimConfig) -> SimulationController {
        SimulationController::with_seed(config, CpuKernel::default(), 99).unwrap()
    }

    #[test]
    fn test_new_starts_empty_after_reset() {
        let c = controller(SimConfig::default());
        assert_eq!(c.count(), 0);
        assert!((7..=14).contains(&c.type_count()));
        assert_eq!(c.profiles().type_count(), c.type_count() as usize);
        assert_eq!(c.epoch().last_reset_time, 0.0);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = SimConfig::default().with_type_count_range(0, 0);
        assert!(SimulationController::new(config, CpuKernel::default()).is_err());
    }

    #[test]
    fn test_grows_to_floor_in_batches() {
        let mut c = controller(SimConfig::default().with_population(128, 300));
        let r = c.tick(0.1).unwrap();
        assert_eq!(r.spawned, 128);
        assert_eq!(c.tick(0.2).unwrap().count, 256);
        assert_eq!(c.tick(0.3).unwrap().count, 384);
        // At or above the floor nothing more is added
        assert_eq!(c.tick(0.4).unwrap().spawned, 0);
        assert_eq!(c.count(), 384);
    }

    #[test]
    fn test_spawn_request_consumed_once() {
        let mut c = controller(SimConfig::default().with_population(64, 0));
        c.request_spawn_batch();
        assert_eq!(c.tick(0.1).unwrap().spawned, 64);
        assert_eq!(c.tick(0.2).unwrap().spawned, 0);
        assert_eq!(c.count(), 64);
    }

    #[test]
    fn test_population_cap_truncates_batch() {
        let config = SimConfig::default().with_population(100, 250).with_population_cap(250);
        let mut c = controller(config);
        c.tick(0.1).unwrap();
        c.tick(0.2).unwrap();
        assert_eq!(c.tick(0.3).unwrap().spawned, 50);
        assert_eq!(c.count(), 250);

        c.request_spawn_batch();
        assert_eq!(c.tick(0.4).unwrap().spawned, 0);
        assert_eq!(c.count(), 250);
    }

    #[test]
    fn test_interval_reset() {
        let mut c = controller(SimConfig::default().with_reset_interval(10.0));
        c.tick(1.0).unwrap();
        assert!(c.count() > 0);

        // Exactly at the boundary is not yet expired
        assert!(!c.tick(10.0).unwrap().reset);

        let r = c.tick(10.5).unwrap();
        assert!(r.reset);
        assert_eq!(r.spawned, 0);
        assert_eq!(r.count, 0);
        assert_eq!(c.epoch().last_reset_time, 10.5);
    }

    #[test]
    fn test_requested_reset_wins_over_spawn() {
        let mut c = controller(SimConfig::default());
        c.tick(0.1).unwrap();
        c.request_reset();
        c.request_spawn_batch();

        let r = c.tick(0.2).unwrap();
        assert!(r.reset);
        assert_eq!(c.count(), 0);

        // Spawn request survives to the next tick
        assert_eq!(c.tick(0.3).unwrap().spawned, 256);
    }

    #[test]
    fn test_target_rate_is_cosmetic() {
        let mut c = controller(SimConfig::default().with_target_rate(30));
        assert_eq!(c.target_rate(), 30);
        c.configure_target_rate(144);
        assert_eq!(c.target_rate(), 144);
    }

    #[test]
    fn test_install_checks_types() {
        let mut c = controller(SimConfig::default());
        let mut state = SimulationState::new();
        state.push(Vec2::ZERO, Vec2::ZERO, 3);
        assert!(c.install(ForceProfileTable::new(3), state.clone()).is_err());

        c.install(ForceProfileTable::new(4), state).unwrap();
        assert_eq!(c.type_count(), 4);
        assert_eq!(c.count(), 1);
    }

    struct TruncatingKernel;

    impl PhysicsKernel for TruncatingKernel {
        fn name(&self) -> &'static str {
            "truncating"
        }

        fn step(&mut self, input: &KernelInput<'_>) -> Result<KernelOutput> {
            let keep = input.count().saturating_sub(1);
            Ok(KernelOutput {
                positions: input.positions[..keep].to_vec(),
                velocities: input.velocities[..keep].to_vec(),
            })
        }
    }

    #[test]
    fn test_short_kernel_output_is_rejected() {
        let mut c =
            SimulationController::with_seed(SimConfig::default(), TruncatingKernel, 1).unwrap();
        let err = c.tick(0.1).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
