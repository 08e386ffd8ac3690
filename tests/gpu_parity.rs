//! CPU and GPU kernels must agree. Skipped when no adapter is available.
#![cfg(feature = "gpu")]

use plife::prelude::*;
use plife::{BoundaryPolicy, KernelInput, KernelParams};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn gpu() -> Option<GpuKernel> {
    match GpuKernel::new() {
        Ok(kernel) => Some(kernel),
        Err(e) => {
            eprintln!("skipping GPU test: {e}");
            None
        }
    }
}

#[test]
fn test_gpu_matches_cpu() {
    let Some(mut gpu) = gpu() else { return };

    let mut rng = StdRng::seed_from_u64(31);
    let bounds = Bounds::new(30.0, 20.0);
    let mut state = SimulationState::new();
    // Not a multiple of the workgroup size
    state.append_batch(1000, &bounds, 2.0, 6, &mut rng);
    let table = ForceProfileTable::generate(6, &Default::default(), &mut rng);

    let input = KernelInput {
        positions: state.positions(),
        velocities: state.velocities(),
        types: state.types(),
        profiles: table.flatten(),
        type_count: 6,
        max_range: table.max_range(),
        params: KernelParams {
            boundary: BoundaryPolicy::new(bounds, BoundaryMode::Reflect),
            ..KernelParams::default()
        },
    };

    let cpu_out = CpuKernel::default().step(&input).unwrap();
    let gpu_out = gpu.step(&input).unwrap();

    assert_eq!(gpu_out.positions.len(), 1000);
    for (i, (c, g)) in cpu_out.positions.iter().zip(&gpu_out.positions).enumerate() {
        assert!((*c - *g).length() < 1e-3, "position {i}: cpu {c} gpu {g}");
    }
    for (i, (c, g)) in cpu_out.velocities.iter().zip(&gpu_out.velocities).enumerate() {
        assert!((*c - *g).length() < 1e-3, "velocity {i}: cpu {c} gpu {g}");
    }
}

#[test]
fn test_gpu_empty_and_controller() {
    let Some(gpu) = gpu() else { return };

    let config = SimConfig::default().with_population(300, 300);
    let mut sim = SimulationController::with_seed(config, gpu, 4).unwrap();
    assert_eq!(sim.tick(0.0).unwrap().count, 300);
    sim.tick(0.1).unwrap();

    let bounds = sim.config().bounds();
    assert!(sim.positions().iter().all(|&p| bounds.contains(p)));
    assert_eq!(sim.kernel_name(), "gpu");
}
