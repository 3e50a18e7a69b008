//! The effect engine: text in, animated particle field out.
//!
//! [`TextEffect`] owns everything that outlives a frame: the live
//! [`ParticleField`], the [`Pointer`], the last submitted text and the RNG
//! used for scatter. It owns no surface; every operation that draws or
//! measures borrows one, so the same engine drives a real raster backend in
//! the demo and throwaway fakes in tests.
//!
//! # Quick Start
//!
//! ```ignore
//! use glyphdust::prelude::*;
//!
//! let mut surface = RasterSurface::new(1280, 720);
//! let mut effect = TextEffect::new(EffectConfig::new(), 1280, 720);
//! effect.submit_text(&mut surface, "HELLO");
//!
//! loop {
//!     effect.on_pointer_move(mouse_x, mouse_y);
//!     effect.tick(&mut surface);
//!     present(surface.pixels());
//! }
//! ```

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::color::{FillStyle, LinearGradient, Rgba};
use crate::field::ParticleField;
use crate::layout;
use crate::particle::Pointer;
use crate::surface::{Surface, TextAlign, TextBaseline};

/// Gradient stops painted across the viewport diagonal.
const GRADIENT_STOPS: [(f32, Rgba); 3] = [
    (0.3, Rgba::rgb(255, 192, 203)),
    (0.5, Rgba::rgb(255, 0, 0)),
    (0.7, Rgba::rgb(255, 255, 255)),
];

/// Tunables for a [`TextEffect`], builder style.
///
/// The defaults reproduce the classic look: big 130px glyphs, a 2px sampling
/// stride and a pointer reach of about 55px (the cutoff compares squared
/// distance against `pointer_radius`).
#[derive(Debug, Clone)]
pub struct EffectConfig {
    /// Glyph size in pixels.
    pub font_size: f32,
    /// Sampling stride in pixels; also the drawn particle size.
    pub gap: u32,
    /// Pointer force strength and squared-distance cutoff.
    pub pointer_radius: f32,
    /// Wrap width as a fraction of the viewport width.
    pub max_width_frac: f32,
    /// Line spacing as a fraction of the font size.
    pub line_height_frac: f32,
    /// Fixed RNG seed for reproducible scatter, or `None` for entropy.
    pub seed: Option<u64>,
}

impl EffectConfig {
    /// Create a configuration with the default tuning.
    pub fn new() -> Self {
        Self {
            font_size: 130.0,
            gap: 2,
            pointer_radius: 3000.0,
            max_width_frac: 0.8,
            line_height_frac: 0.9,
            seed: None,
        }
    }

    /// Set the glyph size in pixels.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    /// Set the sampling stride in pixels.
    ///
    /// Larger gaps mean fewer, chunkier particles. A gap of `0` is treated
    /// as `1` during sampling.
    pub fn with_gap(mut self, gap: u32) -> Self {
        self.gap = gap;
        self
    }

    /// Set the pointer force strength.
    ///
    /// The interaction reach in pixels is `sqrt(radius)`.
    pub fn with_pointer_radius(mut self, radius: f32) -> Self {
        self.pointer_radius = radius;
        self
    }

    /// Set the wrap width as a fraction of the viewport width.
    pub fn with_max_width_frac(mut self, frac: f32) -> Self {
        self.max_width_frac = frac;
        self
    }

    /// Set the line spacing as a fraction of the font size.
    pub fn with_line_height_frac(mut self, frac: f32) -> Self {
        self.line_height_frac = frac;
        self
    }

    /// Pin the RNG seed so scatter positions and per-particle constants are
    /// reproducible run to run.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The interactive text effect.
///
/// Drive it with four calls: [`submit_text`](TextEffect::submit_text) when
/// the text changes, [`on_pointer_move`](TextEffect::on_pointer_move) on
/// pointer events, [`on_resize`](TextEffect::on_resize) when the viewport
/// changes and [`tick`](TextEffect::tick) once per frame. The engine never
/// schedules its own frames; the caller owns the clock.
pub struct TextEffect {
    config: EffectConfig,
    viewport_w: u32,
    viewport_h: u32,
    /// Horizontal anchor for centered text, kept at half the viewport width.
    text_x: f32,
    max_text_width: f32,
    line_height: f32,
    pointer: Pointer,
    field: ParticleField,
    last_text: String,
    rng: SmallRng,
}

impl TextEffect {
    /// Create an idle effect for a `width` x `height` viewport.
    ///
    /// The field starts empty; nothing happens until text is submitted.
    pub fn new(config: EffectConfig, width: u32, height: u32) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            pointer: Pointer::new(config.pointer_radius),
            field: ParticleField::empty(config.gap),
            text_x: width as f32 / 2.0,
            max_text_width: width as f32 * config.max_width_frac,
            line_height: config.font_size * config.line_height_frac,
            viewport_w: width,
            viewport_h: height,
            last_text: String::new(),
            rng,
            config,
        }
    }

    /// Replace the displayed text.
    ///
    /// Renders the wrapped, centered text onto `surface`, samples the result
    /// into a fresh particle field and clears the surface again; the glyph
    /// render itself is never presented. Empty or whitespace-only text
    /// empties the field. The pointer and its position survive resubmission,
    /// so particles spawning under a parked pointer scatter immediately.
    pub fn submit_text<S: Surface>(&mut self, surface: &mut S, text: &str) {
        self.last_text.clear();
        self.last_text.push_str(text);

        surface.clear();
        self.apply_text_style(surface);

        let lines = layout::wrap_text(text, self.max_text_width, |line| surface.measure_text(line));
        if lines.is_empty() {
            self.field = ParticleField::empty(self.config.gap);
            return;
        }

        let top = layout::block_top(lines.len(), self.line_height, self.viewport_h as f32);
        for (i, line) in lines.iter().enumerate() {
            let y = top + i as f32 * self.line_height;
            surface.fill_text(line, self.text_x, y);
            surface.stroke_text(line, self.text_x, y);
        }

        let bitmap = surface.image_data();
        surface.clear();
        self.field = ParticleField::from_bitmap(&bitmap, self.config.gap, &mut self.rng);
    }

    /// Advance one frame: clear, step every particle, redraw.
    pub fn tick<S: Surface>(&mut self, surface: &mut S) {
        surface.clear();
        self.field.advance(&self.pointer);
        self.field.draw(surface);
    }

    /// Record a new pointer position in pixels.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        self.pointer.move_to(x, y);
    }

    /// Adopt a new viewport size and rebuild the field from the last text.
    ///
    /// The caller must resize `surface` to the new dimensions first. Text is
    /// re-wrapped and re-centered against the new width, and every particle
    /// is resampled (old positions are not carried over). The pointer keeps
    /// its position.
    pub fn on_resize<S: Surface>(&mut self, surface: &mut S, width: u32, height: u32) {
        debug_assert_eq!(surface.size(), (width, height));
        self.viewport_w = width;
        self.viewport_h = height;
        self.text_x = width as f32 / 2.0;
        self.max_text_width = width as f32 * self.config.max_width_frac;
        let text = std::mem::take(&mut self.last_text);
        self.submit_text(surface, &text);
    }

    /// The live particle field.
    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    /// The engine-owned pointer.
    pub fn pointer(&self) -> &Pointer {
        &self.pointer
    }

    /// The most recently submitted text.
    pub fn last_text(&self) -> &str {
        &self.last_text
    }

    /// Current viewport size as `(width, height)`.
    pub fn viewport(&self) -> (u32, u32) {
        (self.viewport_w, self.viewport_h)
    }

    /// Configure `surface` for glyph rendering: the diagonal pink/red/white
    /// gradient fill, centered middle-baseline text and a 1px white outline.
    fn apply_text_style<S: Surface>(&self, surface: &mut S) {
        let corner = Vec2::new(self.viewport_w as f32, self.viewport_h as f32);
        let mut gradient = LinearGradient::new(Vec2::ZERO, corner);
        for (offset, color) in GRADIENT_STOPS {
            gradient = gradient.with_stop(offset, color);
        }
        surface.set_fill_style(FillStyle::Gradient(gradient));
        surface.set_text_align(TextAlign::Center);
        surface.set_text_baseline(TextBaseline::Middle);
        surface.set_line_width(1.0);
        surface.set_stroke_style(Rgba::WHITE);
        surface.set_font(self.config.font_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = EffectConfig::new();
        assert_eq!(config.font_size, 130.0);
        assert_eq!(config.gap, 2);
        assert_eq!(config.pointer_radius, 3000.0);
        assert_eq!(config.max_width_frac, 0.8);
        assert_eq!(config.line_height_frac, 0.9);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_config_builder() {
        let config = EffectConfig::new()
            .with_font_size(64.0)
            .with_gap(3)
            .with_pointer_radius(5000.0)
            .with_max_width_frac(0.5)
            .with_line_height_frac(1.1)
            .with_seed(123);
        assert_eq!(config.font_size, 64.0);
        assert_eq!(config.gap, 3);
        assert_eq!(config.pointer_radius, 5000.0);
        assert_eq!(config.max_width_frac, 0.5);
        assert_eq!(config.line_height_frac, 1.1);
        assert_eq!(config.seed, Some(123));
    }

    #[test]
    fn test_new_effect_is_idle() {
        let effect = TextEffect::new(EffectConfig::new(), 800, 600);
        assert!(effect.field().is_empty());
        assert_eq!(effect.last_text(), "");
        assert_eq!(effect.viewport(), (800, 600));
        assert_eq!(effect.pointer().radius, 3000.0);
    }

    #[test]
    fn test_pointer_move_updates_pointer() {
        let mut effect = TextEffect::new(EffectConfig::new(), 800, 600);
        effect.on_pointer_move(123.0, 45.0);
        assert_eq!(effect.pointer().position, glam::Vec2::new(123.0, 45.0));
    }
}
