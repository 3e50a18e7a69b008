//! Bitmap sampling and the particle collection built from it.
//!
//! [`sample_grid`] is the deterministic half: walk a bitmap on a fixed-stride
//! grid and keep every opaque hit, in row-major order. [`ParticleField`] is
//! the stateful half: it turns those samples into live particles with
//! randomized scatter positions and per-particle spring constants, then
//! advances and draws them each frame.

use glam::Vec2;
use rand::rngs::SmallRng;

use crate::color::Rgba;
use crate::particle::{Particle, Pointer};
use crate::surface::{Bitmap, Surface};

/// One grid hit on a rendered glyph: where it was and what color it had.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Pixel x of the sampled cell.
    pub x: u32,
    /// Pixel y of the sampled cell.
    pub y: u32,
    /// Sampled color, forced opaque.
    pub color: Rgba,
}

/// Sample `bitmap` on a square grid with stride `gap` pixels.
///
/// Visits pixels at every `(x, y)` where both coordinates are multiples of
/// `gap`, in row-major order (y outer, x inner), and keeps those with a
/// nonzero alpha channel. The output is fully determined by the input: same
/// bitmap and gap, same samples in the same order. A `gap` of `0` is treated
/// as `1`.
pub fn sample_grid(bitmap: &Bitmap, gap: u32) -> Vec<Sample> {
    let gap = gap.max(1) as usize;
    let mut samples = Vec::new();
    for y in (0..bitmap.height()).step_by(gap) {
        for x in (0..bitmap.width()).step_by(gap) {
            let pixel = bitmap.pixel(x, y);
            if pixel.a > 0 {
                samples.push(Sample {
                    x,
                    y,
                    color: Rgba::rgb(pixel.r, pixel.g, pixel.b),
                });
            }
        }
    }
    samples
}

/// All live particles of the effect, plus the sampling stride they came from.
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    gap: u32,
}

impl ParticleField {
    /// A field with no particles, used before any text has been submitted.
    pub fn empty(gap: u32) -> Self {
        Self {
            particles: Vec::new(),
            gap,
        }
    }

    /// Build a field from a rendered glyph bitmap.
    ///
    /// Each grid sample becomes one particle homed at the sample position,
    /// colored like the sampled pixel, sized to cover one grid cell, and
    /// scattered to a random starting position so the text assembles out of
    /// flying dust. Sampling itself is deterministic; only scatter positions
    /// and spring constants consume randomness.
    pub fn from_bitmap(bitmap: &Bitmap, gap: u32, rng: &mut SmallRng) -> Self {
        let viewport = Vec2::new(bitmap.width() as f32, bitmap.height() as f32);
        let size = gap.max(1) as f32;
        let particles = sample_grid(bitmap, gap)
            .into_iter()
            .map(|sample| {
                let origin = Vec2::new(sample.x as f32, sample.y as f32);
                Particle::new(origin, sample.color, size, viewport, rng)
            })
            .collect();
        Self { particles, gap }
    }

    /// Advance every particle by one step against the given pointer.
    pub fn advance(&mut self, pointer: &Pointer) {
        for particle in &mut self.particles {
            particle.update(pointer);
        }
    }

    /// Draw every particle as a flat square onto `surface`.
    pub fn draw<S: Surface>(&self, surface: &mut S) {
        for particle in &self.particles {
            surface.fill_rect(
                particle.position.x,
                particle.position.y,
                particle.size,
                particle.size,
                particle.color,
            );
        }
    }

    /// Sampling stride this field was built with.
    pub fn gap(&self) -> u32 {
        self.gap
    }

    /// Number of live particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the field holds no particles.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Read access to the particles, mostly for inspection and tests.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }
}
