//! CPU glyph rasterization on top of cosmic-text.
//!
//! [`RasterSurface`] is the production [`Surface`]: an RGBA framebuffer plus
//! a font stack. Text is shaped and rasterized one line at a time into a
//! coverage mask, the mask is tinted by the current fill style and composited
//! src-over into the framebuffer.
//!
//! Glyph outlines have no path data at this level, so
//! [`stroke_text`](Surface::stroke_text) is morphological: the coverage mask
//! is grown by `line_width` pixels and the body subtracted, leaving a rim
//! that hugs the glyph edge.
//!
//! Fonts come from the system database by default. Environments without any
//! installed fonts shape to nothing; load one explicitly with
//! [`load_font_file`](RasterSurface::load_font_file) or
//! [`load_font_data`](RasterSurface::load_font_data).

use std::path::Path;

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, SwashCache, Wrap};

use crate::color::{FillStyle, Rgba};
use crate::surface::{Bitmap, Surface, TextAlign, TextBaseline};

/// Inclusive pixel bounds of a mask's written region, `(x0, y0, x1, y1)`.
type MaskBounds = (u32, u32, u32, u32);

/// A framebuffer-backed surface with cosmic-text shaping and rasterization.
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    font_system: FontSystem,
    swash_cache: SwashCache,
    font_size: f32,
    family: Option<String>,
    align: TextAlign,
    baseline: TextBaseline,
    fill_style: FillStyle,
    stroke_style: Rgba,
    line_width: f32,
}

impl RasterSurface {
    /// Create a transparent surface backed by the system font database.
    ///
    /// Building the [`FontSystem`] scans installed fonts, so construction is
    /// noticeably slower than everything else here. Make one and keep it.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
            font_size: 16.0,
            family: None,
            align: TextAlign::default(),
            baseline: TextBaseline::default(),
            fill_style: FillStyle::default(),
            stroke_style: Rgba::BLACK,
            line_width: 1.0,
        }
    }

    /// Load an additional font file into the font database.
    pub fn load_font_file(&mut self, path: impl AsRef<Path>) -> std::io::Result<()> {
        self.font_system.db_mut().load_font_file(path)
    }

    /// Load in-memory font data into the font database.
    pub fn load_font_data(&mut self, data: Vec<u8>) {
        self.font_system.db_mut().load_font_data(data);
    }

    /// Prefer the named font family; falls back to sans-serif matching when
    /// the family is missing.
    pub fn set_font_family(&mut self, name: impl Into<String>) {
        self.family = Some(name.into());
    }

    /// Resize the framebuffer, discarding all pixels.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0; (width * height * 4) as usize];
    }

    /// The raw RGBA framebuffer, row-major from the top-left corner.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Shape `text` as a single unwrapped line at the current font size.
    fn shape_line(&mut self, text: &str) -> Buffer {
        let metrics = Metrics::new(self.font_size, self.font_size);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);
        buffer.set_size(&mut self.font_system, None, None);
        buffer.set_wrap(&mut self.font_system, Wrap::None);
        let family = self.family.clone();
        let attrs = match family.as_deref() {
            Some(name) => Attrs::new().family(Family::Name(name)),
            None => Attrs::new().family(Family::SansSerif),
        };
        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(&mut self.font_system, false);
        buffer
    }

    /// Top-left corner of the shaped line box for the current anchors.
    fn anchor(&self, buffer: &Buffer, x: f32, y: f32) -> (f32, f32) {
        let width = measured_width(buffer);
        let left = match self.align {
            TextAlign::Left => x,
            TextAlign::Center => x - width / 2.0,
            TextAlign::Right => x - width,
        };
        let top = match self.baseline {
            TextBaseline::Top => y,
            // The line box is exactly one font size tall.
            TextBaseline::Middle => y - self.font_size / 2.0,
            TextBaseline::Alphabetic => {
                let ascent = buffer
                    .layout_runs()
                    .next()
                    .map(|run| run.line_y)
                    .unwrap_or(self.font_size);
                y - ascent
            }
        };
        (left, top)
    }

    /// Rasterize one line into a full-frame coverage mask.
    ///
    /// Returns the mask and the inclusive bounds of its written region, or
    /// `None` bounds when no glyph pixel landed on the surface.
    fn line_mask(&mut self, text: &str, x: f32, y: f32) -> (Vec<u8>, Option<MaskBounds>) {
        let buffer = self.shape_line(text);
        let (left, top) = self.anchor(&buffer, x, y);
        let dx = left.round() as i32;
        let dy = top.round() as i32;
        let width = self.width as i32;
        let height = self.height as i32;

        let mut mask = vec![0u8; (self.width * self.height) as usize];
        let mut bounds: Option<MaskBounds> = None;
        buffer.draw(
            &mut self.font_system,
            &mut self.swash_cache,
            cosmic_text::Color::rgb(255, 255, 255),
            |gx, gy, gw, gh, color| {
                let coverage = color.a();
                if coverage == 0 {
                    return;
                }
                for py in 0..gh as i32 {
                    let fy = gy + py + dy;
                    if fy < 0 || fy >= height {
                        continue;
                    }
                    for px in 0..gw as i32 {
                        let fx = gx + px + dx;
                        if fx < 0 || fx >= width {
                            continue;
                        }
                        let i = (fy * width + fx) as usize;
                        mask[i] = mask[i].max(coverage);
                        let (fx, fy) = (fx as u32, fy as u32);
                        bounds = Some(match bounds {
                            None => (fx, fy, fx, fy),
                            Some((x0, y0, x1, y1)) => {
                                (x0.min(fx), y0.min(fy), x1.max(fx), y1.max(fy))
                            }
                        });
                    }
                }
            },
        );
        (mask, bounds)
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }

    fn set_font(&mut self, size_px: f32) {
        self.font_size = size_px;
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.align = align;
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.baseline = baseline;
    }

    fn set_fill_style(&mut self, style: FillStyle) {
        self.fill_style = style;
    }

    fn set_stroke_style(&mut self, color: Rgba) {
        self.stroke_style = color;
    }

    fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    fn measure_text(&mut self, text: &str) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        let buffer = self.shape_line(text);
        measured_width(&buffer)
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        if text.is_empty() {
            return;
        }
        let (mask, bounds) = self.line_mask(text, x, y);
        let Some(bounds) = bounds else {
            return;
        };
        let style = self.fill_style.clone();
        paint_mask(&mut self.pixels, self.width, &mask, bounds, &style);
    }

    fn stroke_text(&mut self, text: &str, x: f32, y: f32) {
        if text.is_empty() {
            return;
        }
        let (mask, bounds) = self.line_mask(text, x, y);
        let Some(mut bounds) = bounds else {
            return;
        };
        let rounds = self.line_width.round().max(1.0) as u32;
        let mut dilated = mask.clone();
        for _ in 0..rounds {
            bounds = grow_bounds(bounds, 1, self.width, self.height);
            dilated = dilate(&dilated, self.width, self.height, bounds);
        }
        // Rim = grown silhouette minus the glyph body.
        for (d, m) in dilated.iter_mut().zip(&mask) {
            *d = d.saturating_sub(*m);
        }
        let style = FillStyle::Solid(self.stroke_style);
        paint_mask(&mut self.pixels, self.width, &dilated, bounds, &style);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba) {
        let x0 = (x.round() as i64).clamp(0, self.width as i64) as u32;
        let y0 = (y.round() as i64).clamp(0, self.height as i64) as u32;
        let x1 = ((x + width).round() as i64).clamp(0, self.width as i64) as u32;
        let y1 = ((y + height).round() as i64).clamp(0, self.height as i64) as u32;
        let row = self.width as usize;
        let pixels: &mut [Rgba] = bytemuck::cast_slice_mut(&mut self.pixels);
        for py in y0..y1 {
            for px in x0..x1 {
                let i = py as usize * row + px as usize;
                pixels[i] = blend_over(pixels[i], color);
            }
        }
    }

    fn image_data(&self) -> Bitmap {
        Bitmap::from_rgba(self.pixels.clone(), self.width, self.height)
    }
}

/// Widest laid-out run of a shaped buffer.
fn measured_width(buffer: &Buffer) -> f32 {
    buffer.layout_runs().map(|run| run.line_w).fold(0.0, f32::max)
}

/// Composite `mask` into `pixels`, tinting each covered pixel with the style
/// color at that position. Only the bounded region is visited.
fn paint_mask(pixels: &mut [u8], width: u32, mask: &[u8], bounds: MaskBounds, style: &FillStyle) {
    let (x0, y0, x1, y1) = bounds;
    let row = width as usize;
    let pixels: &mut [Rgba] = bytemuck::cast_slice_mut(pixels);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let i = y as usize * row + x as usize;
            let coverage = mask[i];
            if coverage == 0 {
                continue;
            }
            let mut src = style.color_at(x as f32, y as f32);
            src.a = scale_alpha(src.a, coverage);
            pixels[i] = blend_over(pixels[i], src);
        }
    }
}

/// Grow a mask by one pixel: each cell takes the max of its 8-neighborhood.
fn dilate(mask: &[u8], width: u32, height: u32, bounds: MaskBounds) -> Vec<u8> {
    let (x0, y0, x1, y1) = bounds;
    let w = width as i32;
    let h = height as i32;
    let mut out = vec![0u8; mask.len()];
    for y in y0 as i32..=y1 as i32 {
        for x in x0 as i32..=x1 as i32 {
            let mut best = 0u8;
            for ny in (y - 1)..=(y + 1) {
                if ny < 0 || ny >= h {
                    continue;
                }
                for nx in (x - 1)..=(x + 1) {
                    if nx < 0 || nx >= w {
                        continue;
                    }
                    best = best.max(mask[(ny * w + nx) as usize]);
                }
            }
            out[(y * w + x) as usize] = best;
        }
    }
    out
}

/// Expand inclusive bounds by `margin` pixels, clamped to the surface.
fn grow_bounds(bounds: MaskBounds, margin: u32, width: u32, height: u32) -> MaskBounds {
    let (x0, y0, x1, y1) = bounds;
    (
        x0.saturating_sub(margin),
        y0.saturating_sub(margin),
        (x1 + margin).min(width - 1),
        (y1 + margin).min(height - 1),
    )
}

/// Scale an alpha value by a coverage value, both in `0..=255`.
fn scale_alpha(alpha: u8, coverage: u8) -> u8 {
    (alpha as u32 * coverage as u32 / 255) as u8
}

/// Source-over compositing with straight alpha.
///
/// The straight-alpha form divides by the output alpha so partially covered
/// pixels over a transparent background keep the source hue instead of
/// darkening toward black.
fn blend_over(dst: Rgba, src: Rgba) -> Rgba {
    if src.a == 255 {
        return src;
    }
    if src.a == 0 {
        return dst;
    }
    let sa = src.a as u32;
    let da = dst.a as u32;
    let inv = 255 - sa;
    let a_out = sa + da * inv / 255;
    if a_out == 0 {
        return Rgba::TRANSPARENT;
    }
    let channel = |s: u8, d: u8| -> u8 {
        ((s as u32 * sa * 255 + d as u32 * da * inv) / (255 * a_out)) as u8
    };
    Rgba {
        r: channel(src.r, dst.r),
        g: channel(src.g, dst.g),
        b: channel(src.b, dst.b),
        a: a_out as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Compositing Tests ==========

    #[test]
    fn test_blend_opaque_src_replaces_dst() {
        let dst = Rgba::rgb(1, 2, 3);
        let src = Rgba::rgb(200, 100, 50);
        assert_eq!(blend_over(dst, src), src);
    }

    #[test]
    fn test_blend_transparent_src_keeps_dst() {
        let dst = Rgba::rgb(1, 2, 3);
        assert_eq!(blend_over(dst, Rgba::TRANSPARENT), dst);
    }

    #[test]
    fn test_blend_partial_over_transparent_keeps_hue() {
        // An antialiased red edge over nothing must stay red, only fainter.
        let src = Rgba::rgba(200, 0, 0, 128);
        let out = blend_over(Rgba::TRANSPARENT, src);
        assert_eq!(out.r, 200);
        assert_eq!(out.g, 0);
        assert_eq!(out.b, 0);
        assert_eq!(out.a, 128);
    }

    #[test]
    fn test_blend_partial_over_opaque_mixes() {
        let dst = Rgba::rgb(0, 0, 0);
        let src = Rgba::rgba(255, 255, 255, 128);
        let out = blend_over(dst, src);
        assert_eq!(out.a, 255);
        assert!(out.r > 100 && out.r < 155);
    }

    #[test]
    fn test_scale_alpha() {
        assert_eq!(scale_alpha(255, 255), 255);
        assert_eq!(scale_alpha(255, 0), 0);
        assert_eq!(scale_alpha(255, 128), 128);
        assert_eq!(scale_alpha(128, 128), 64);
    }

    // ========== Mask Tests ==========

    #[test]
    fn test_dilate_grows_single_pixel() {
        let mut mask = vec![0u8; 5 * 5];
        mask[2 * 5 + 2] = 255;
        let out = dilate(&mask, 5, 5, (1, 1, 3, 3));
        for y in 1..=3 {
            for x in 1..=3 {
                assert_eq!(out[y * 5 + x], 255, "expected dilation at ({x}, {y})");
            }
        }
        assert_eq!(out[0], 0);
        assert_eq!(out[4], 0);
    }

    #[test]
    fn test_grow_bounds_clamps_to_surface() {
        assert_eq!(grow_bounds((0, 0, 9, 9), 1, 10, 10), (0, 0, 9, 9));
        assert_eq!(grow_bounds((2, 3, 4, 5), 2, 10, 10), (0, 1, 6, 7));
    }

    // ========== Surface Behavior Tests ==========

    #[test]
    fn test_fill_rect_writes_and_clips() {
        let mut surface = RasterSurface::new(4, 4);
        surface.fill_rect(2.0, 2.0, 10.0, 10.0, Rgba::rgb(9, 8, 7));
        let bitmap = surface.image_data();
        assert_eq!(bitmap.pixel(2, 2), Rgba::rgb(9, 8, 7));
        assert_eq!(bitmap.pixel(3, 3), Rgba::rgb(9, 8, 7));
        assert_eq!(bitmap.pixel(1, 1), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_fill_rect_off_surface_is_noop() {
        let mut surface = RasterSurface::new(4, 4);
        surface.fill_rect(-20.0, -20.0, 5.0, 5.0, Rgba::WHITE);
        surface.fill_rect(100.0, 100.0, 5.0, 5.0, Rgba::WHITE);
        assert!(surface.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_fill_rect_rounds_fractional_coords() {
        let mut surface = RasterSurface::new(8, 8);
        surface.fill_rect(1.4, 0.0, 2.0, 1.0, Rgba::WHITE);
        let bitmap = surface.image_data();
        assert_eq!(bitmap.alpha_at(0, 0), 0);
        assert_eq!(bitmap.alpha_at(1, 0), 255);
        assert_eq!(bitmap.alpha_at(2, 0), 255);
        assert_eq!(bitmap.alpha_at(3, 0), 0);
    }

    #[test]
    fn test_clear_resets_pixels() {
        let mut surface = RasterSurface::new(4, 4);
        surface.fill_rect(0.0, 0.0, 4.0, 4.0, Rgba::WHITE);
        surface.clear();
        assert!(surface.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_resize_discards_content() {
        let mut surface = RasterSurface::new(4, 4);
        surface.fill_rect(0.0, 0.0, 4.0, 4.0, Rgba::WHITE);
        surface.resize(6, 3);
        assert_eq!(surface.size(), (6, 3));
        assert_eq!(surface.pixels().len(), 6 * 3 * 4);
        assert!(surface.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_measure_empty_text_is_zero() {
        let mut surface = RasterSurface::new(4, 4);
        assert_eq!(surface.measure_text(""), 0.0);
    }

    #[test]
    fn test_image_data_matches_framebuffer() {
        let mut surface = RasterSurface::new(3, 2);
        surface.fill_rect(0.0, 1.0, 1.0, 1.0, Rgba::rgb(5, 6, 7));
        let bitmap = surface.image_data();
        assert_eq!(bitmap.width(), 3);
        assert_eq!(bitmap.height(), 2);
        assert_eq!(bitmap.pixel(0, 1), Rgba::rgb(5, 6, 7));
        assert_eq!(bitmap.data(), surface.pixels());
    }
}
