//! Colors and fill styles for painting text and particles.
//!
//! The effect paints glyphs with a [`LinearGradient`] stretched across the
//! viewport diagonal, then carries the sampled color into each particle as a
//! plain [`Rgba`]. Both are CPU-side values; nothing here touches the GPU.
//!
//! # Quick Start
//!
//! ```ignore
//! use glyphdust::prelude::*;
//!
//! let gradient = LinearGradient::new(Vec2::ZERO, Vec2::new(800.0, 600.0))
//!     .with_stop(0.3, Rgba::rgb(255, 192, 203))
//!     .with_stop(0.5, Rgba::rgb(255, 0, 0))
//!     .with_stop(0.7, Rgba::WHITE);
//! let style = FillStyle::Gradient(gradient);
//! let color = style.color_at(400.0, 300.0);
//! ```

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// An 8-bit RGBA color, straight (non-premultiplied) alpha.
///
/// The in-memory layout matches the framebuffer, so pixel rows can be viewed
/// as `&[Rgba]` with [`bytemuck::cast_slice`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black. Cleared framebuffers are filled with this.
    pub const TRANSPARENT: Rgba = Rgba::rgba(0, 0, 0, 0);
    /// Opaque white.
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

    /// Create an opaque color from red, green and blue channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with an explicit alpha channel.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with the alpha channel replaced.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Linear interpolation between two colors, `t` in `[0, 1]`.
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        Rgba {
            r: lerp_u8(self.r, other.r, t),
            g: lerp_u8(self.g, other.g, t),
            b: lerp_u8(self.b, other.b, t),
            a: lerp_u8(self.a, other.a, t),
        }
    }
}

/// Helper function for linear interpolation of u8 values.
fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t).round() as u8
}

/// How a surface fills glyph interiors.
#[derive(Debug, Clone)]
pub enum FillStyle {
    /// A single flat color.
    Solid(Rgba),
    /// A position-dependent gradient.
    Gradient(LinearGradient),
}

impl FillStyle {
    /// The fill color at framebuffer position `(x, y)`, in pixels.
    pub fn color_at(&self, x: f32, y: f32) -> Rgba {
        match self {
            FillStyle::Solid(color) => *color,
            FillStyle::Gradient(gradient) => gradient.color_at(Vec2::new(x, y)),
        }
    }
}

impl Default for FillStyle {
    fn default() -> Self {
        FillStyle::Solid(Rgba::BLACK)
    }
}

/// A linear gradient between two points with sorted color stops.
///
/// A point is projected onto the `start`-`end` axis and the projection
/// (clamped to `[0, 1]`) selects between the stops. Offsets before the first
/// stop return the first color, offsets past the last stop return the last
/// color, and everything between is interpolated pairwise.
#[derive(Debug, Clone)]
pub struct LinearGradient {
    start: Vec2,
    end: Vec2,
    stops: Vec<(f32, Rgba)>,
}

impl LinearGradient {
    /// Create a gradient along the axis from `start` to `end`, in pixels.
    ///
    /// A gradient without stops paints [`Rgba::TRANSPARENT`].
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self {
            start,
            end,
            stops: Vec::new(),
        }
    }

    /// Add a color stop at `offset` along the axis (builder style).
    ///
    /// Stops must be added in ascending offset order.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let g = LinearGradient::new(Vec2::ZERO, Vec2::new(100.0, 0.0))
    ///     .with_stop(0.0, Rgba::BLACK)
    ///     .with_stop(1.0, Rgba::WHITE);
    /// ```
    pub fn with_stop(mut self, offset: f32, color: Rgba) -> Self {
        self.stops.push((offset, color));
        self
    }

    /// The gradient color at `point`.
    pub fn color_at(&self, point: Vec2) -> Rgba {
        let Some(&(first_offset, first_color)) = self.stops.first() else {
            return Rgba::TRANSPARENT;
        };
        let &(last_offset, last_color) = self.stops.last().unwrap();

        let t = self.project(point);
        if t <= first_offset {
            return first_color;
        }
        if t >= last_offset {
            return last_color;
        }

        for pair in self.stops.windows(2) {
            let (o0, c0) = pair[0];
            let (o1, c1) = pair[1];
            if t <= o1 {
                let span = o1 - o0;
                if span <= f32::EPSILON {
                    return c1;
                }
                return c0.lerp(c1, (t - o0) / span);
            }
        }
        last_color
    }

    /// Project `point` onto the gradient axis, clamped to `[0, 1]`.
    ///
    /// A degenerate axis (start == end) projects everything to 0.
    fn project(&self, point: Vec2) -> f32 {
        let axis = self.end - self.start;
        let len_sq = axis.length_squared();
        if len_sq <= f32::EPSILON {
            return 0.0;
        }
        ((point - self.start).dot(axis) / len_sq).clamp(0.0, 1.0)
    }
}
