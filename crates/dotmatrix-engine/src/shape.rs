//! Per-cell dot rendering into a full-resolution shape mask.
//!
//! The mask is transparent except where dots are drawn in opaque black.
//! Each dot is built as a path of lines and cubic curves and filled with
//! `ab_glyph_rasterizer`, so edge pixels carry partial coverage which the
//! post-processor then either feathers (ink bleed) or binarizes (hard edges).
//! Overlapping dots accumulate with source-over.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use ab_glyph_rasterizer::{Point, Rasterizer, point};
use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::dither::{CellMap, CellMode};
use crate::fonts::FontBook;
use crate::settings::{DotShape, Settings};
use crate::text::measure_text_width;

/// Halftone cells below this intensity draw nothing.
pub const HALFTONE_MIN_VALUE: u8 = 10;

/// Dots smaller than this (in pixels) are skipped.
pub const MIN_DOT_SIZE: f32 = 0.5;

/// Control point distance for a quarter circle drawn as one cubic.
const CIRCLE_KAPPA: f32 = 0.552_284_8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line(Point, Point),
    Cubic(Point, Point, Point, Point),
}

/// Closed path of a single dot in output pixel coordinates.
///
/// Every contour winds the same way, so overlapping contours fill as a union.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    segments: Vec<Segment>,
}

impl Outline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Add a closed polygon.
    pub fn polygon(&mut self, points: &[Point]) {
        for (i, &a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            self.segments.push(Segment::Line(a, b));
        }
    }

    pub fn cubic(&mut self, p0: Point, p1: Point, p2: Point, p3: Point) {
        self.segments.push(Segment::Cubic(p0, p1, p2, p3));
    }

    /// `(min_x, min_y, max_x, max_y)` over all end and control points.
    pub fn bounds(&self) -> Option<(f32, f32, f32, f32)> {
        self.segments
            .iter()
            .flat_map(|segment| match *segment {
                Segment::Line(a, b) => vec![a, b],
                Segment::Cubic(a, b, c, d) => vec![a, b, c, d],
            })
            .fold(None::<(f32, f32, f32, f32)>, |acc, p| {
                let (x0, y0, x1, y1) = acc.unwrap_or((p.x, p.y, p.x, p.y));
                Some((x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)))
            })
    }
}

fn rect(x: f32, y: f32, w: f32, h: f32) -> [Point; 4] {
    [point(x, y), point(x + w, y), point(x + w, y + h), point(x, y + h)]
}

fn rotate_about(points: [Point; 4], cx: f32, cy: f32, angle: f32) -> [Point; 4] {
    let (sin, cos) = angle.sin_cos();
    points.map(|p| {
        let (dx, dy) = (p.x - cx, p.y - cy);
        point(cx + dx * cos - dy * sin, cy + dx * sin + dy * cos)
    })
}

fn circle(outline: &mut Outline, cx: f32, cy: f32, r: f32) {
    let k = r * CIRCLE_KAPPA;
    let p = |x: f32, y: f32| point(cx + x, cy + y);
    outline.cubic(p(r, 0.0), p(r, k), p(k, r), p(0.0, r));
    outline.cubic(p(0.0, r), p(-k, r), p(-r, k), p(-r, 0.0));
    outline.cubic(p(-r, 0.0), p(-r, -k), p(-k, -r), p(0.0, -r));
    outline.cubic(p(0.0, -r), p(k, -r), p(r, -k), p(r, 0.0));
}

fn heart(outline: &mut Outline, cx: f32, cy: f32, s: f32) {
    let top = s * 0.3;
    let (ox, oy) = (cx, cy - s * 0.1);
    let p = |x: f32, y: f32| point(ox + x, oy + y);
    let lobe = (s + top) / 2.0;
    let tip = lobe + s / 3.0;

    outline.cubic(p(0.0, top), p(0.0, 0.0), p(-s / 2.0, 0.0), p(-s / 2.0, top));
    outline.cubic(p(-s / 2.0, top), p(-s / 2.0, lobe), p(0.0, tip), p(0.0, s));
    outline.cubic(p(0.0, s), p(0.0, tip), p(s / 2.0, lobe), p(s / 2.0, top));
    outline.cubic(p(s / 2.0, top), p(s / 2.0, 0.0), p(0.0, 0.0), p(0.0, top));
}

fn star(cx: f32, cy: f32, spikes: usize, outer: f32, inner: f32) -> Vec<Point> {
    let step = std::f32::consts::PI / spikes as f32;
    let mut rot = std::f32::consts::PI / 2.0 * 3.0;
    let mut pts = Vec::with_capacity(spikes * 2);
    for _ in 0..spikes {
        pts.push(point(cx + rot.cos() * outer, cy + rot.sin() * outer));
        rot += step;
        pts.push(point(cx + rot.cos() * inner, cy + rot.sin() * inner));
        rot += step;
    }
    pts
}

/// 5x7 bitmaps for the ASCII glyph ramp, used when no monospace font is set.
fn builtin_glyph(ch: char) -> [&'static str; 7] {
    match ch {
        '.' => [".....", ".....", ".....", ".....", ".....", "..#..", "..#.."],
        ':' => [".....", "..#..", "..#..", ".....", "..#..", "..#..", "....."],
        '+' => [".....", "..#..", "..#..", "#####", "..#..", "..#..", "....."],
        '#' => [".#.#.", ".#.#.", "#####", ".#.#.", "#####", ".#.#.", ".#.#."],
        _ => [".###.", "#...#", "#.###", "#.#.#", "#.###", "#....", ".###."],
    }
}

fn bitmap_glyph(outline: &mut Outline, ch: char, cx: f32, cy: f32, size: f32) {
    let h = size.floor().max(1.0);
    let w = h * 5.0 / 7.0;
    let (cell_w, cell_h) = (w / 5.0, h / 7.0);
    let (x0, y0) = (cx - w / 2.0, cy - h / 2.0);

    for (row, bits) in builtin_glyph(ch).iter().enumerate() {
        for (col, _) in bits.chars().enumerate().filter(|(_, c)| *c == '#') {
            outline.polygon(&rect(x0 + col as f32 * cell_w, y0 + row as f32 * cell_h, cell_w, cell_h));
        }
    }
}

/// Glyph for an ASCII dot, by intensity bucket.
pub fn ascii_glyph(value: u8) -> char {
    match value {
        0..50 => '.',
        50..100 => ':',
        100..150 => '+',
        150..200 => '#',
        _ => '@',
    }
}

/// Dot edge length for a cell value, or `None` when the cell draws nothing.
pub fn dot_size(mode: CellMode, value: u8, max_dot_size: f32) -> Option<f32> {
    let size = match mode {
        CellMode::Binary if value == 0 => return None,
        CellMode::Binary => max_dot_size,
        CellMode::Intensity if value < HALFTONE_MIN_VALUE => return None,
        CellMode::Intensity => f32::from(value) / 255.0 * max_dot_size,
    };
    (size >= MIN_DOT_SIZE).then_some(size)
}

/// Path of `shape` centered at `(cx, cy)` with edge length `size`.
///
/// `value` only matters for [`DotShape::Ascii`], where it picks the glyph of
/// the built-in bitmap ramp.
pub fn outline(shape: DotShape, cx: f32, cy: f32, size: f32, value: u8) -> Outline {
    let half = size / 2.0;
    let eighth_turn = std::f32::consts::FRAC_PI_4;
    let square = rect(cx - half, cy - half, size, size);
    let mut path = Outline::new();

    match shape {
        DotShape::Square => path.polygon(&square),
        DotShape::Circle => circle(&mut path, cx, cy, half),
        DotShape::Diamond => path.polygon(&rotate_about(square, cx, cy, eighth_turn)),
        DotShape::Triangle => {
            let h = size * (3.0f32.sqrt() / 2.0);
            path.polygon(&[
                point(cx, cy - h / 2.0),
                point(cx + half, cy + h / 2.0),
                point(cx - half, cy + h / 2.0),
            ]);
        }
        DotShape::Cross | DotShape::Plus => {
            let t = size / 3.0;
            let angle = if shape == DotShape::Cross { eighth_turn } else { 0.0 };
            for arm in [
                rect(cx - half, cy - t / 2.0, size, t),
                rect(cx - t / 2.0, cy - half, t, size),
            ] {
                path.polygon(&rotate_about(arm, cx, cy, angle));
            }
        }
        DotShape::Heart => heart(&mut path, cx, cy, size),
        DotShape::Star => path.polygon(&star(cx, cy, 5, half, size / 4.0)),
        DotShape::Ascii => bitmap_glyph(&mut path, ascii_glyph(value), cx, cy, size),
    }
    path
}

/// Source-over a black sample with the given coverage onto the mask.
fn accumulate(mask: &mut RgbaImage, x: i64, y: i64, coverage: f32) {
    if coverage <= 0.0 || x < 0 || y < 0 || x >= i64::from(mask.width()) || y >= i64::from(mask.height()) {
        return;
    }
    let px = mask.get_pixel_mut(x as u32, y as u32);
    let below = f32::from(px[3]) / 255.0;
    let cov = coverage.min(1.0);
    let alpha = cov + below * (1.0 - cov);
    *px = Rgba([0, 0, 0, (alpha * 255.0).round() as u8]);
}

/// Fill an outline onto the mask.
///
/// `raster` is reset to the outline's pixel bounds, so one rasterizer can be
/// reused across dots.
pub fn fill_outline(mask: &mut RgbaImage, raster: &mut Rasterizer, outline: &Outline) {
    let Some((min_x, min_y, max_x, max_y)) = outline.bounds() else {
        return;
    };
    let (ox, oy) = (min_x.floor(), min_y.floor());
    let width = (max_x.ceil() - ox) as usize;
    let height = (max_y.ceil() - oy) as usize;
    if width == 0 || height == 0 {
        return;
    }

    raster.reset(width, height);
    let local = |p: Point| point(p.x - ox, p.y - oy);
    for segment in outline.segments() {
        match *segment {
            Segment::Line(a, b) => raster.draw_line(local(a), local(b)),
            Segment::Cubic(a, b, c, d) => raster.draw_cubic(local(a), local(b), local(c), local(d)),
        }
    }

    let (ox, oy) = (ox as i64, oy as i64);
    raster.for_each_pixel_2d(|x, y, coverage| {
        accumulate(mask, ox + i64::from(x), oy + i64::from(y), coverage);
    });
}

/// Draw `ch` from a real font, center-anchored, at `floor(size)` pixels.
fn fill_font_glyph(mask: &mut RgbaImage, font: &FontArc, ch: char, cx: f32, cy: f32, size: f32) {
    let px = size.floor();
    if px < 1.0 {
        return;
    }
    let scale = PxScale::from(px);
    let scaled = font.as_scaled(scale);
    let advance = measure_text_width(font, scale, ch.encode_utf8(&mut [0; 4]));
    let baseline = cy + (scaled.ascent() + scaled.descent()) / 2.0;
    let glyph = scaled
        .glyph_id(ch)
        .with_scale_and_position(scale, ab_glyph::point(cx - advance / 2.0, baseline));

    if let Some(outlined) = font.outline_glyph(glyph) {
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            accumulate(
                mask,
                bounds.min.x as i64 + i64::from(gx),
                bounds.min.y as i64 + i64::from(gy),
                coverage,
            );
        });
    }
}

/// Render every inked cell of `map` into a fresh transparent mask at output size.
pub fn render_cells(map: &CellMap, settings: &Settings, fonts: &FontBook) -> RgbaImage {
    let (width, height) = (settings.output_width, settings.output_height);
    let mut mask = RgbaImage::new(width, height);
    let max_dot = settings.max_dot_size();
    if max_dot <= 0.0 {
        debug!(
            cell_size = settings.cell_size,
            gap = settings.gap,
            "Gap leaves no room for dots, shape mask left empty"
        );
        return mask;
    }

    let cell = settings.cell_size as f32;
    let mono = fonts.monospace();
    let mut raster = Rasterizer::new(0, 0);
    let mut drawn = 0usize;

    for (x, y, value) in map.iter() {
        let Some(size) = dot_size(map.mode(), value, max_dot) else {
            continue;
        };
        let cx = (x as f32 + 0.5) * cell;
        let cy = (y as f32 + 0.5) * cell;

        match (settings.shape, mono) {
            (DotShape::Ascii, Some(font)) => {
                fill_font_glyph(&mut mask, font, ascii_glyph(value), cx, cy, size)
            }
            (shape, _) => fill_outline(&mut mask, &mut raster, &outline(shape, cx, cy, size, value)),
        }
        drawn += 1;
    }

    debug!(drawn, shape = ?settings.shape, width, height, "Rendered shape mask");
    mask
}
