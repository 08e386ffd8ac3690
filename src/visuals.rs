//! Per-type colors for renderers.
//!
//! The engine itself only knows type indices. A renderer that wants a stable
//! color per type builds a [`TypePalette`] whenever it sees the type count
//! change (i.e. after a reset) and looks colors up by type.

use glam::Vec3;
use rand::Rng;

/// One RGB color per particle type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TypePalette {
    colors: Vec<Vec3>,
}

impl TypePalette {
    /// Random vivid colors: any hue, saturation in `[0.7, 1]`, value in
    /// `[0.5, 1]`.
    pub fn random<R: Rng + ?Sized>(type_count: usize, rng: &mut R) -> Self {
        let colors = (0..type_count)
            .map(|_| {
                hsv_to_rgb(
                    rng.gen::<f32>(),
                    rng.gen_range(0.7..=1.0),
                    rng.gen_range(0.5..=1.0),
                )
            })
            .collect();
        Self { colors }
    }

    /// Evenly spaced hues, for deterministic output.
    pub fn rainbow(type_count: usize) -> Self {
        let colors = (0..type_count)
            .map(|i| hsv_to_rgb(i as f32 / type_count.max(1) as f32, 0.85, 1.0))
            .collect();
        Self { colors }
    }

    /// Color for `particle_type`; white for unknown types.
    pub fn color(&self, particle_type: u32) -> Vec3 {
        self.colors
            .get(particle_type as usize)
            .copied()
            .unwrap_or(Vec3::ONE)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }
}

/// Convert HSV (all in `0..=1`) to RGB.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let c = v * s;
    let x = c * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match (h * 6.0) as u32 % 6 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Vec3::new(r + m, g + m, b + m)
}
