//! Cover-fit downsampling of the source bitmap into the working buffer.
//!
//! The source is scaled until it covers the whole target rectangle and
//! centered on the overflowing axis; anything outside is cropped away.
//! Resampling uses Lanczos3 for high-quality downscaling. Sources smaller
//! than the target are scaled whole before cropping so the window stays
//! centered to within half a target pixel.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tracing::debug;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Working-buffer dimensions for the given output size and cell size.
///
/// `max(1, floor(output / cell))` on each axis. A zero cell size is treated
/// as one so the result is always at least 1x1.
pub fn working_size(output_width: u32, output_height: u32, cell_size: u32) -> (u32, u32) {
    let cell = cell_size.max(1);
    ((output_width / cell).max(1), (output_height / cell).max(1))
}

/// Placement of the scaled source inside the target rectangle.
///
/// Offsets are zero or negative: the drawn rectangle always covers the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverFit {
    pub draw_width: f64,
    pub draw_height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl CoverFit {
    /// Compute the cover placement of a `src_w x src_h` source in a `dst_w x dst_h` target.
    pub fn compute(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> Self {
        let (sw, sh) = (f64::from(src_w), f64::from(src_h));
        let (dw, dh) = (f64::from(dst_w), f64::from(dst_h));

        if sw / sh > dw / dh {
            let draw_width = sw * (dh / sh);
            Self {
                draw_width,
                draw_height: dh,
                offset_x: (dw - draw_width) / 2.0,
                offset_y: 0.0,
            }
        } else {
            let draw_height = sh * (dw / sw);
            Self {
                draw_width: dw,
                draw_height,
                offset_x: 0.0,
                offset_y: (dh - draw_height) / 2.0,
            }
        }
    }

    /// Whether the source is enlarged to cover the target.
    pub fn upscales(&self, src_w: u32) -> bool {
        self.draw_width > f64::from(src_w)
    }

    /// Whole-pixel size of the drawn rectangle, never smaller than the target.
    pub fn scaled_size(&self, dst_w: u32, dst_h: u32) -> (u32, u32) {
        (
            (self.draw_width.ceil() as u32).max(dst_w),
            (self.draw_height.ceil() as u32).max(dst_h),
        )
    }

    /// The region of the source that lands inside the target, as `(x, y, w, h)`
    /// in whole source pixels.
    pub fn source_crop(&self, src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> (u32, u32, u32, u32) {
        let (sw, sh) = (f64::from(src_w), f64::from(src_h));
        let scale_x = sw / self.draw_width;
        let scale_y = sh / self.draw_height;

        let crop_w = (f64::from(dst_w) * scale_x).round().clamp(1.0, sw) as u32;
        let crop_h = (f64::from(dst_h) * scale_y).round().clamp(1.0, sh) as u32;
        let crop_x = (src_w - crop_w) / 2;
        let crop_y = (src_h - crop_h) / 2;

        (crop_x, crop_y, crop_w, crop_h)
    }
}

/// Produce the `width x height` working buffer from `source` using cover fit.
///
/// The buffer starts white and the resampled source is composited over it,
/// so transparent source pixels read as background tone.
pub fn fit_cover(source: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (src_w, src_h) = source.dimensions();
    let mut buffer = RgbaImage::from_pixel(width, height, WHITE);

    if src_w == 0 || src_h == 0 {
        debug!(width, height, "Empty source, working buffer left white");
        return buffer;
    }

    let fit = CoverFit::compute(src_w, src_h, width, height);
    let scaled = if fit.upscales(src_w) {
        // A whole-pixel crop of a tiny source is off by up to half a source
        // pixel, so scale first and crop in target pixels.
        let (sw, sh) = fit.scaled_size(width, height);
        debug!(src_w, src_h, width, height, scaled_w = sw, scaled_h = sh, "Cover-fitting small source");
        let enlarged = imageops::resize(source, sw, sh, FilterType::Lanczos3);
        imageops::crop_imm(&enlarged, (sw - width) / 2, (sh - height) / 2, width, height).to_image()
    } else {
        let (cx, cy, cw, ch) = fit.source_crop(src_w, src_h, width, height);
        debug!(
            src_w,
            src_h,
            width,
            height,
            crop_x = cx,
            crop_y = cy,
            crop_w = cw,
            crop_h = ch,
            "Cover-fitting source into working buffer"
        );
        let cropped = imageops::crop_imm(source, cx, cy, cw, ch).to_image();
        if (cw, ch) == (width, height) {
            cropped
        } else {
            imageops::resize(&cropped, width, height, FilterType::Lanczos3)
        }
    };

    for (dst, src) in buffer.pixels_mut().zip(scaled.pixels()) {
        *dst = over_white(*src);
    }

    buffer
}

fn over_white(px: Rgba<u8>) -> Rgba<u8> {
    let alpha = px[3];
    if alpha == 255 {
        return px;
    }
    let a = f32::from(alpha) / 255.0;
    let mix = |c: u8| (f32::from(c) * a + 255.0 * (1.0 - a)).round() as u8;
    Rgba([mix(px[0]), mix(px[1]), mix(px[2]), 255])
}
