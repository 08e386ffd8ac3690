//! Force profile table for type-pair particle forces.
//!
//! The table defines how each particle type reacts to every other type. This
//! is the heart of "particle life": a random, asymmetric matrix of
//! attraction/repulsion rules is enough to produce self-organizing clusters,
//! chasers and orbiters.
//!
//! # Example
//!
//! ```
//! use plife::{ForceProfileTable, ProfileRanges};
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let table = ForceProfileTable::generate(5, &ProfileRanges::default(), &mut rng);
//!
//! assert_eq!(table.type_count(), 5);
//! assert_eq!(table.flatten().len(), 25);
//! ```

use crate::error::{Error, Result};
use bytemuck::{Pod, Zeroable};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Interaction parameters for one ordered `(self_type, other_type)` pair.
///
/// Laid out for direct upload to the GPU kernel.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ForceProfile {
    /// Distance beyond which the pair does not interact.
    pub range: f32,
    /// Signed strength: positive attracts, negative repels.
    pub multiplier: f32,
}

impl ForceProfile {
    pub fn new(range: f32, multiplier: f32) -> Self {
        Self { range, multiplier }
    }
}

/// Sampling intervals used by [`ForceProfileTable::generate`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfileRanges {
    /// Lower bound of the interaction range.
    pub range_min: f32,
    /// Upper bound (exclusive) of the interaction range.
    pub range_max: f32,
    /// Lower bound of the unscaled multiplier.
    pub multiplier_min: f32,
    /// Upper bound (exclusive) of the unscaled multiplier.
    pub multiplier_max: f32,
    /// Scale applied to the sampled multiplier.
    pub force_scale: f32,
}

impl Default for ProfileRanges {
    fn default() -> Self {
        Self {
            range_min: 1.1,
            range_max: 7.0,
            multiplier_min: -1.5,
            multiplier_max: 1.0,
            force_scale: 0.012,
        }
    }
}

/// Square matrix of [`ForceProfile`]s indexed by ordered type pair.
///
/// Cell `(a, b)` is how a particle of type `a` reacts to a neighbour of type
/// `b`. Nothing forces `(a, b) == (b, a)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ForceProfileTable {
    /// Flattened matrix: `[a * type_count + b]`.
    cells: Vec<ForceProfile>,
    type_count: usize,
}

impl ForceProfileTable {
    /// Create a table for `type_count` types where no pair interacts.
    pub fn new(type_count: usize) -> Self {
        Self {
            cells: vec![ForceProfile::default(); type_count * type_count],
            type_count,
        }
    }

    /// Sample every ordered pair independently.
    ///
    /// Self pairs `(a, a)` are sampled like any other cell.
    ///
    /// # Panics
    ///
    /// If either sampling interval in `ranges` is empty.
    pub fn generate<R: Rng + ?Sized>(
        type_count: usize,
        ranges: &ProfileRanges,
        rng: &mut R,
    ) -> Self {
        let cells = (0..type_count * type_count)
            .map(|_| ForceProfile {
                range: rng.gen_range(ranges.range_min..ranges.range_max),
                multiplier: ranges.force_scale
                    * rng.gen_range(ranges.multiplier_min..ranges.multiplier_max),
            })
            .collect();

        Self { cells, type_count }
    }

    /// Build a table from row-major cells.
    ///
    /// Fails when `cells.len() != type_count²`.
    pub fn from_cells(type_count: usize, cells: Vec<ForceProfile>) -> Result<Self> {
        if cells.len() != type_count * type_count {
            return Err(Error::invalid_argument(format!(
                "profile table for {type_count} types needs {} cells, got {}",
                type_count * type_count,
                cells.len()
            )));
        }
        Ok(Self { cells, type_count })
    }

    /// Set the profile used when `self_type` encounters `other_type`.
    ///
    /// Out-of-range indices are ignored.
    pub fn set(&mut self, self_type: usize, other_type: usize, range: f32, multiplier: f32) {
        if self_type < self.type_count && other_type < self.type_count {
            self.cells[self_type * self.type_count + other_type] =
                ForceProfile { range, multiplier };
        }
    }

    /// Convenience: attraction, equivalent to `set(.., strength.abs())`.
    pub fn attract(&mut self, self_type: usize, other_type: usize, range: f32, strength: f32) {
        self.set(self_type, other_type, range, strength.abs());
    }

    /// Convenience: repulsion, equivalent to `set(.., -strength.abs())`.
    pub fn repel(&mut self, self_type: usize, other_type: usize, range: f32, strength: f32) {
        self.set(self_type, other_type, range, -strength.abs());
    }

    /// Profile for an ordered pair, if both indices are in range.
    pub fn get(&self, self_type: usize, other_type: usize) -> Option<ForceProfile> {
        if self_type < self.type_count && other_type < self.type_count {
            Some(self.cells[self_type * self.type_count + other_type])
        } else {
            None
        }
    }

    /// Number of particle types this table covers.
    pub fn type_count(&self) -> usize {
        self.type_count
    }

    /// Largest interaction range in the table.
    pub fn max_range(&self) -> f32 {
        self.cells.iter().map(|c| c.range).fold(0.0, f32::max)
    }

    /// Row-major cells, length `type_count²`, ready for kernel upload.
    pub fn flatten(&self) -> &[ForceProfile] {
        &self.cells
    }
}
