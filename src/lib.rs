//! # plife - particle life
//!
//! A population of 2D point particles, each of one of a handful of randomly
//! generated types, pushes and pulls on its neighbours according to a random
//! per-type-pair force profile. Simple rules, lifelike clustering.
//!
//! The crate is the engine only: particle storage, random force profiles, the
//! parallel physics step and the reset/growth lifecycle. Drawing, windows and
//! input belong to whoever holds the [`SimulationController`].
//!
//! ## Quick Start
//!
//! ```
//! use plife::prelude::*;
//!
//! let config = SimConfig::default().with_population(128, 256);
//! let mut sim = SimulationController::new(config, CpuKernel::default()).unwrap();
//!
//! for frame in 0..3 {
//!     let report = sim.tick(frame as f32 / 60.0).unwrap();
//!     assert_eq!(report.count, sim.positions().len());
//! }
//! assert!(sim.types().iter().all(|&t| t < sim.type_count()));
//! ```
//!
//! ## Core Concepts
//!
//! ### Types and profiles
//!
//! On every reset the controller draws a type count and fills a
//! [`ForceProfileTable`]: for each ordered pair `(a, b)` a range and a signed
//! multiplier. Positive multipliers attract, negative ones repel, and the
//! table is deliberately asymmetric, so `a` may chase `b` while `b` flees.
//!
//! ### Lifecycle
//!
//! Each [`tick`](SimulationController::tick):
//!
//! 1. resets if the reset interval elapsed or a reset was requested,
//! 2. otherwise spawns a batch while below the population floor or when
//!    asked to,
//! 3. runs the kernel once.
//!
//! ### Kernels
//!
//! | Kernel | Notes |
//! |--------|-------|
//! | [`CpuKernel`] | rayon, chunked across cores |
//! | `GpuKernel` | wgpu compute, cargo feature `gpu` |
//!
//! Both implement [`PhysicsKernel`] and compute the same all-pairs sum.

pub mod boundary;
mod config;
pub mod controller;
mod error;
pub mod kernel;
pub mod profile;
mod spawn;
pub mod state;
pub mod time;
pub mod visuals;

pub use boundary::{BoundaryMode, BoundaryPolicy, Bounds};
pub use config::SimConfig;
pub use controller::{SimulationController, SimulationEpoch, TickReport};
#[cfg(feature = "gpu")]
pub use error::GpuError;
pub use error::{Error, Result};
pub use glam::{Vec2, Vec3};
#[cfg(feature = "gpu")]
pub use kernel::GpuKernel;
pub use kernel::{CpuKernel, KernelInput, KernelOutput, KernelParams, PhysicsKernel};
pub use profile::{ForceProfile, ForceProfileTable, ProfileRanges};
pub use spawn::SpawnArea;
pub use state::SimulationState;
pub use visuals::TypePalette;

/// Convenient re-exports for common usage.
///
/// ```
/// use plife::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BoundaryMode, Bounds, CpuKernel, ForceProfileTable, PhysicsKernel, SimConfig,
        SimulationController, SimulationState, TickReport, TypePalette, Vec2,
    };
    #[cfg(feature = "gpu")]
    pub use crate::GpuKernel;
}
