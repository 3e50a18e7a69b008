//! The drawing surface abstraction and CPU-side pixel snapshots.
//!
//! [`TextEffect`](crate::engine::TextEffect) never talks to a renderer
//! directly. It draws through the [`Surface`] trait: a small 2D canvas with
//! text styling, text drawing, rectangle fills and pixel readback. The
//! shipped implementation is [`RasterSurface`](crate::raster::RasterSurface);
//! tests substitute their own surfaces to run the whole pipeline without
//! fonts or a window.
//!
//! [`Bitmap`] is the readback type: a plain RGBA snapshot that particle
//! sampling walks on the CPU.

use crate::color::{FillStyle, Rgba};

/// Horizontal anchoring of drawn text relative to the given x coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// The x coordinate is the left edge of the text (default).
    #[default]
    Left,
    /// The x coordinate is the horizontal center of the text.
    Center,
    /// The x coordinate is the right edge of the text.
    Right,
}

/// Vertical anchoring of drawn text relative to the given y coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    /// The y coordinate is the alphabetic baseline (default).
    #[default]
    Alphabetic,
    /// The y coordinate is the top of the line box.
    Top,
    /// The y coordinate is the vertical middle of the line box.
    Middle,
}

/// A 2D drawing target with stateful text styling.
///
/// Styling setters (`set_font`, `set_text_align`, ...) persist until changed,
/// mirroring how the effect configures a surface once per submission and then
/// draws every wrapped line. Coordinates are in pixels with the origin at the
/// top-left corner.
pub trait Surface {
    /// Surface dimensions in pixels as `(width, height)`.
    fn size(&self) -> (u32, u32);

    /// Reset every pixel to [`Rgba::TRANSPARENT`].
    fn clear(&mut self);

    /// Set the font size in pixels for subsequent text calls.
    fn set_font(&mut self, size_px: f32);

    /// Set the horizontal text anchor.
    fn set_text_align(&mut self, align: TextAlign);

    /// Set the vertical text anchor.
    fn set_text_baseline(&mut self, baseline: TextBaseline);

    /// Set the fill style used by [`fill_text`](Surface::fill_text).
    fn set_fill_style(&mut self, style: FillStyle);

    /// Set the outline color used by [`stroke_text`](Surface::stroke_text).
    fn set_stroke_style(&mut self, color: Rgba);

    /// Set the outline width in pixels.
    fn set_line_width(&mut self, width: f32);

    /// Measure the advance width of `text` at the current font size.
    fn measure_text(&mut self, text: &str) -> f32;

    /// Paint `text` filled with the current fill style, anchored at `(x, y)`.
    fn fill_text(&mut self, text: &str, x: f32, y: f32);

    /// Paint the outline of `text` with the current stroke style.
    fn stroke_text(&mut self, text: &str, x: f32, y: f32);

    /// Fill an axis-aligned rectangle with a flat color.
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba);

    /// Snapshot the surface pixels as a [`Bitmap`].
    fn image_data(&self) -> Bitmap;
}

/// An owned RGBA pixel snapshot, row-major from the top-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Bitmap {
    /// Create a bitmap from raw RGBA data (4 bytes per pixel).
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != width * height * 4`.
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> Self {
        assert_eq!(
            data.len(),
            (width * height * 4) as usize,
            "RGBA data size mismatch"
        );
        Self {
            data,
            width,
            height,
        }
    }

    /// Create a fully transparent bitmap.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            data: vec![0; (width * height * 4) as usize],
            width,
            height,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        let i = ((y * self.width + x) * 4) as usize;
        Rgba::rgba(self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3])
    }

    /// The alpha channel at `(x, y)`.
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.pixel(x, y).a
    }
}
