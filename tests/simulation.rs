//! End-to-end properties of the simulation lifecycle and physics step.

use plife::prelude::*;
use plife::{BoundaryPolicy, Error, ForceProfile, KernelInput, KernelParams};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ============================================================================
// Helpers
// ============================================================================

fn seeded(config: SimConfig) -> SimulationController {
    SimulationController::with_seed(config, CpuKernel::default(), 2024).unwrap()
}

fn assert_consistent(sim: &SimulationController) {
    let n = sim.count();
    assert_eq!(sim.positions().len(), n);
    assert_eq!(sim.velocities().len(), n);
    assert_eq!(sim.types().len(), n);

    let tc = sim.type_count();
    assert!(tc >= 1);
    assert!(sim.types().iter().all(|&t| t < tc));

    let cells = sim.profiles().flatten().len();
    assert_eq!((cells as f64).sqrt() as u32, tc);
    assert_eq!(cells, (tc * tc) as usize);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_columns_stay_consistent_across_ticks_and_resets() {
    let config = SimConfig::default()
        .with_population(64, 200)
        .with_reset_interval(1.0)
        .with_type_count_range(2, 5);
    let mut sim = seeded(config);

    let mut resets = 0;
    for frame in 0..40 {
        let report = sim.tick(frame as f32 * 0.1).unwrap();
        if report.reset {
            resets += 1;
        }
        assert_eq!(report.count, sim.count());
        assert_consistent(&sim);
    }
    assert!(resets >= 3, "expected periodic resets, saw {resets}");
}

#[test]
fn test_non_finite_config_is_rejected_at_construction() {
    let config = SimConfig {
        range_max: f32::INFINITY,
        ..SimConfig::default()
    };
    let result = SimulationController::with_seed(config, CpuKernel::default(), 1);
    assert!(matches!(result, Err(Error::InvalidConfig(_))));

    let config = SimConfig {
        spawn_margin: f32::NAN,
        ..SimConfig::default()
    };
    assert!(SimulationController::new(config, CpuKernel::default()).is_err());
}

#[test]
fn test_reset_shape() {
    let config = SimConfig::default().with_type_count_range(5, 12);
    let mut sim = seeded(config);
    for frame in 0..5 {
        sim.tick(frame as f32).unwrap();
    }
    assert!(sim.count() > 0);

    for round in 0..20 {
        sim.reset(100.0 + round as f32);
        assert_eq!(sim.count(), 0);
        assert!((5..=12).contains(&sim.type_count()));

        // The next tick repopulates with valid types
        let report = sim.tick(100.5 + round as f32).unwrap();
        assert_eq!(report.spawned, 256);
        assert_consistent(&sim);
    }
}

#[test]
fn test_reset_command_clears_population() {
    let mut sim = seeded(SimConfig::default());
    sim.tick(0.0).unwrap();
    sim.tick(0.1).unwrap();
    assert_eq!(sim.count(), 512);

    sim.request_reset();
    let report = sim.tick(0.2).unwrap();
    assert!(report.reset);
    assert_eq!(sim.count(), 0);
    assert_eq!(sim.epoch().last_reset_time, 0.2);
}

#[test]
fn test_append_batch_positions_strictly_inside_margin() {
    let mut rng = StdRng::seed_from_u64(77);
    let bounds = Bounds::new(75.0, 35.0);
    let margin = 5.0;
    let mut state = SimulationState::new();
    state.append_batch(40, &bounds, margin, 4, &mut rng);

    state.append_batch(128, &bounds, margin, 4, &mut rng);
    assert_eq!(state.count(), 168);

    for p in &state.positions()[40..] {
        assert!(p.x > -70.0 && p.x < 70.0);
        assert!(p.y > -30.0 && p.y < 30.0);
    }
}

// ============================================================================
// Physics
// ============================================================================

#[test]
fn test_kernel_on_empty_state() {
    let mut kernel = CpuKernel::default();
    let table = ForceProfileTable::new(3);
    let input = KernelInput {
        positions: &[],
        velocities: &[],
        types: &[],
        profiles: table.flatten(),
        type_count: 3,
        max_range: table.max_range(),
        params: KernelParams::default(),
    };
    let out = kernel.step(&input).unwrap();
    assert!(out.positions.is_empty());
    assert!(out.velocities.is_empty());

    // Same through the controller right after a reset
    let mut sim = seeded(SimConfig::default().with_population(16, 0));
    let report = sim.tick(0.0).unwrap();
    assert_eq!(report.count, 0);
}

#[test]
fn test_attraction_reduces_separation() {
    let mut table = ForceProfileTable::new(3);
    table.set(0, 1, 5.0, 0.01);

    let mut state = SimulationState::new();
    state.push(Vec2::new(0.0, 0.0), Vec2::ZERO, 0);
    state.push(Vec2::new(2.0, 0.0), Vec2::ZERO, 1);

    // Floor of zero keeps the controller from spawning into the scenario
    let mut sim = seeded(SimConfig::default().with_population(256, 0));
    sim.install(table, state).unwrap();
    assert_eq!(sim.type_count(), 3);

    let before = sim.positions()[0].distance(sim.positions()[1]);
    sim.tick(0.1).unwrap();
    let after = sim.positions()[0].distance(sim.positions()[1]);

    assert_eq!(sim.count(), 2);
    assert!(after < before, "separation should shrink: {before} -> {after}");
    assert!(sim.velocities()[0].x > 0.0);
}

#[test]
fn test_mutual_repulsion_increases_separation() {
    let mut table = ForceProfileTable::new(2);
    table.repel(0, 1, 5.0, 0.01);
    table.repel(1, 0, 5.0, 0.01);

    let mut state = SimulationState::new();
    state.push(Vec2::new(-1.0, 0.0), Vec2::ZERO, 0);
    state.push(Vec2::new(1.0, 0.0), Vec2::ZERO, 1);

    let mut sim = seeded(SimConfig::default().with_population(256, 0));
    sim.install(table, state).unwrap();
    sim.tick(0.1).unwrap();

    assert!(sim.positions()[0].distance(sim.positions()[1]) > 2.0);
}

#[test]
fn test_soft_core_separates_overlapping_particles() {
    // Strongly attractive, yet particles closer than the core still part
    let mut table = ForceProfileTable::new(1);
    table.attract(0, 0, 5.0, 1.0);

    let mut state = SimulationState::new();
    state.push(Vec2::new(0.0, 0.0), Vec2::ZERO, 0);
    state.push(Vec2::new(0.2, 0.0), Vec2::ZERO, 0);

    let mut sim = seeded(SimConfig::default().with_population(256, 0));
    sim.install(table, state).unwrap();
    sim.tick(0.1).unwrap();

    assert!(sim.positions()[0].distance(sim.positions()[1]) > 0.2);
}

#[test]
fn test_escaping_particle_is_clamped_and_reflected() {
    let table = ForceProfileTable::new(1);
    let mut state = SimulationState::new();
    state.push(Vec2::new(74.5, -34.8), Vec2::new(3.0, -2.0), 0);

    let mut sim = seeded(SimConfig::default().with_population(256, 0));
    sim.install(table, state).unwrap();
    sim.tick(0.1).unwrap();

    let p = sim.positions()[0];
    let v = sim.velocities()[0];
    assert_eq!(p, Vec2::new(75.0, -35.0));
    assert!(v.x < 0.0, "x velocity should head back in");
    assert!(v.y > 0.0, "y velocity should head back in");
}

#[test]
fn test_clamp_mode_keeps_velocity() {
    let table = ForceProfileTable::new(1);
    let mut state = SimulationState::new();
    state.push(Vec2::new(74.5, 0.0), Vec2::new(3.0, 0.0), 0);

    let config = SimConfig::default()
        .with_population(256, 0)
        .with_boundary_mode(BoundaryMode::Clamp);
    let mut sim = seeded(config);
    sim.install(table, state).unwrap();
    sim.tick(0.1).unwrap();

    assert_eq!(sim.positions()[0].x, 75.0);
    assert!(sim.velocities()[0].x > 0.0);
}

#[test]
fn test_kernel_is_pure() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut state = SimulationState::new();
    state.append_batch(200, &Bounds::new(10.0, 10.0), 0.5, 3, &mut rng);
    let table = ForceProfileTable::generate(3, &Default::default(), &mut rng);
    let cells: Vec<ForceProfile> = table.flatten().to_vec();

    let input = KernelInput {
        positions: state.positions(),
        velocities: state.velocities(),
        types: state.types(),
        profiles: &cells,
        type_count: 3,
        max_range: table.max_range(),
        params: KernelParams {
            boundary: BoundaryPolicy::new(Bounds::new(10.0, 10.0), BoundaryMode::Reflect),
            ..KernelParams::default()
        },
    };

    let mut kernel = CpuKernel::new(32);
    let a = kernel.step(&input).unwrap();
    let b = kernel.step(&input).unwrap();
    assert_eq!(a, b);
}
