//! Color generation for new and recolored shapes.
//!
//! # Responsibility
//! - Hide the random source behind `ColorSource` so tests can be deterministic.

use crate::model::shape::Color;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SATURATION_PCT: u8 = 70;
const LIGHTNESS_PCT: u8 = 60;

/// Produces a fresh color for every call.
pub trait ColorSource {
    fn next_color(&mut self) -> Color;
}

/// Random hue with fixed saturation/lightness, formatted as CSS `hsl(...)`.
pub struct RandomHsl {
    rng: StdRng,
}

impl RandomHsl {
    /// Seeds from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic sequence, used by tests and reproducible demos.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomHsl {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorSource for RandomHsl {
    fn next_color(&mut self) -> Color {
        let hue: u16 = self.rng.gen_range(0..360);
        Color::new(format!("hsl({hue}, {SATURATION_PCT}%, {LIGHTNESS_PCT}%)"))
    }
}

impl<F> ColorSource for F
where
    F: FnMut() -> Color,
{
    fn next_color(&mut self) -> Color {
        self()
    }
}
