//! # glyphdust - interactive particle text
//!
//! Text rendered as a dust cloud of particles that scatter away from the
//! pointer and spring back into glyph shapes.
//!
//! glyphdust rasterizes a line-wrapped block of text, samples the result on a
//! fixed pixel grid and turns every opaque sample into an independent physics
//! body. Each frame the pointer repels nearby particles, friction bleeds off
//! their velocity and an eased spring pulls them home, so the text constantly
//! shatters and reassembles under the cursor.
//!
//! ## Quick Start
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
//!
//! ## Core Concepts
//!
//! ### Surfaces
//!
//! The engine draws through the [`Surface`] trait: measure and paint text,
//! fill rectangles, read pixels back. [`RasterSurface`] is the shipped
//! implementation, a CPU framebuffer with cosmic-text glyph rasterization;
//! tests substitute fontless fakes and drive the exact same pipeline.
//!
//! ### Sampling
//!
//! [`sample_grid`] walks a rendered bitmap with a fixed stride ([`gap`]) and
//! keeps every pixel with nonzero alpha, in row-major order. The sampling is
//! deterministic; randomness enters only when samples become particles, each
//! drawing a scatter position and its own friction and ease constants.
//!
//! [`gap`]: EffectConfig::gap
//!
//! ### The frame loop
//!
//! The engine never schedules anything. The caller owns the clock and calls
//! [`tick`](TextEffect::tick) once per frame; pointer and resize events are
//! plain method calls in between. Stopping the effect is just not calling
//! `tick` anymore.

pub mod color;
pub mod engine;
pub mod error;
pub mod field;
pub mod layout;
pub mod particle;
pub mod raster;
pub mod surface;

pub use color::{FillStyle, LinearGradient, Rgba};
pub use engine::{EffectConfig, TextEffect};
pub use field::{sample_grid, ParticleField, Sample};
pub use glam::Vec2;
pub use particle::{Particle, Pointer};
pub use raster::RasterSurface;
pub use surface::{Bitmap, Surface, TextAlign, TextBaseline};

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use glyphdust::prelude::*;
/// ```
///
/// This imports:
/// - [`TextEffect`], [`EffectConfig`] - the effect engine and its builder
/// - [`ParticleField`], [`Particle`], [`Pointer`] - the physics pieces
/// - [`Surface`], [`Bitmap`], [`RasterSurface`] - drawing and readback
/// - [`Rgba`], [`FillStyle`], [`LinearGradient`] - colors
/// - [`Vec2`] - glam vector type used throughout
pub mod prelude {
    pub use crate::color::{FillStyle, LinearGradient, Rgba};
    pub use crate::engine::{EffectConfig, TextEffect};
    pub use crate::field::{sample_grid, ParticleField, Sample};
    pub use crate::particle::{Particle, Pointer};
    pub use crate::raster::RasterSurface;
    pub use crate::surface::{Bitmap, Surface, TextAlign, TextBaseline};
    pub use crate::Vec2;
}
