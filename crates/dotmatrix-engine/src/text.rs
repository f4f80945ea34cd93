//! Text overlay drawn into the working buffer before dithering.
//!
//! Output-space size and position are scaled by `1 / cell_size` so the text
//! ends up dithered in the same dot aesthetic as the image.

use ab_glyph::{Font, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use tracing::{debug, warn};

use crate::fonts::FontBook;
use crate::settings::TextOverlay;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Line spacing as a multiple of the font size.
pub const LINE_SPACING: f32 = 1.2;

/// Measure the pixel width of a string at the given font and scale.
pub fn measure_text_width(font: &impl Font, scale: PxScale, text: &str) -> f32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for ch in text.chars() {
        let glyph_id = scaled.glyph_id(ch);
        if let Some(prev) = prev_glyph {
            width += scaled.kern(prev, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    width
}

/// Placement of the overlay in working-buffer space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLayout {
    pub font_px: f32,
    pub x: f32,
    pub y: f32,
    pub line_height: f32,
}

impl TextLayout {
    pub fn new(overlay: &TextOverlay, cell_size: u32) -> Self {
        let scale = 1.0 / cell_size.max(1) as f32;
        let font_px = (overlay.font_size * scale).round().max(1.0);
        Self {
            font_px,
            x: overlay.x * scale,
            y: overlay.y * scale,
            line_height: font_px * LINE_SPACING,
        }
    }

    /// Top-left origin of the given line.
    pub fn line_origin(&self, index: usize) -> (f32, f32) {
        (self.x, self.y + index as f32 * self.line_height)
    }
}

/// Draw the overlay into `buffer`. Returns false when nothing was drawn.
pub fn draw_overlay(
    buffer: &mut RgbaImage,
    overlay: &TextOverlay,
    cell_size: u32,
    fonts: &FontBook,
) -> bool {
    if !overlay.is_active() {
        return false;
    }
    let Some(font) = fonts.resolve(&overlay.font_family) else {
        warn!(family = %overlay.font_family, "No font available, skipping text overlay");
        return false;
    };

    let layout = TextLayout::new(overlay, cell_size);
    let color = if overlay.dark { BLACK } else { WHITE };
    let scale = PxScale::from(layout.font_px);
    debug!(
        font_px = layout.font_px,
        x = layout.x,
        y = layout.y,
        lines = overlay.content.lines().count(),
        "Drawing text overlay"
    );

    for (index, line) in overlay.content.split('\n').enumerate() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        let (x, y) = layout.line_origin(index);
        draw_text_mut(
            buffer,
            color,
            x.round() as i32,
            y.round() as i32,
            scale,
            font,
            line,
        );
    }
    true
}
