//! Rayon-backed CPU kernel.

use super::{KernelInput, KernelOutput, PhysicsKernel};
use crate::error::Result;
use glam::Vec2;
use rayon::prelude::*;

/// All-pairs kernel on the CPU.
///
/// Output buffers are split into chunks of `chunk_size` particles and each
/// chunk becomes one rayon task. Tasks only read the shared snapshot and
/// only write their own chunk.
#[derive(Clone, Debug)]
pub struct CpuKernel {
    chunk_size: usize,
    parallel: bool,
}

impl CpuKernel {
    /// Parallel kernel dispatching `chunk_size` particles per task.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            parallel: true,
        }
    }

    /// Single-threaded reference kernel.
    pub fn sequential() -> Self {
        Self {
            chunk_size: usize::MAX,
            parallel: false,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }
}

impl Default for CpuKernel {
    fn default() -> Self {
        Self::new(256)
    }
}

impl PhysicsKernel for CpuKernel {
    fn name(&self) -> &'static str {
        if self.parallel {
            "cpu"
        } else {
            "cpu-sequential"
        }
    }

    fn step(&mut self, input: &KernelInput<'_>) -> Result<KernelOutput> {
        input.validate()?;
        let n = input.count();
        if n == 0 {
            return Ok(KernelOutput::default());
        }

        let mut positions = vec![Vec2::ZERO; n];
        let mut velocities = vec![Vec2::ZERO; n];

        if self.parallel {
            let chunk = self.chunk_size;
            positions
                .par_chunks_mut(chunk)
                .zip(velocities.par_chunks_mut(chunk))
                .enumerate()
                .for_each(|(c, (pos_chunk, vel_chunk))| {
                    write_chunk(input, c * chunk, pos_chunk, vel_chunk);
                });
        } else {
            write_chunk(input, 0, &mut positions, &mut velocities);
        }

        tracing::trace!(particles = n, kernel = self.name(), "kernel step");
        Ok(KernelOutput {
            positions,
            velocities,
        })
    }
}

fn write_chunk(
    input: &KernelInput<'_>,
    base: usize,
    positions: &mut [Vec2],
    velocities: &mut [Vec2],
) {
    for (k, (p, v)) in positions.iter_mut().zip(velocities.iter_mut()).enumerate() {
        (*p, *v) = input.integrate(base + k);
    }
}
