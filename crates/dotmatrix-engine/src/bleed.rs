//! Edge treatment of the shape mask: ink bleed or hard 1-bit edges.
//!
//! With bleed, the mask alpha is Gaussian-blurred so nearby dots merge, then
//! squeezed through a narrow soft threshold band. Without bleed, alpha is
//! binarized at 50% so thermal output gets pure 1-bit edges.

use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::filter::gaussian_blur_f32;
use tracing::debug;

use crate::settings::Settings;

/// Center of the soft threshold band. Empirically tuned.
pub const BLEED_THRESHOLD_CENTER: u8 = 160;

/// Half-width of the soft threshold band. Empirically tuned.
pub const BLEED_FEATHER: u8 = 10;

/// Alpha at or above this survives the hard-edge pass.
pub const HARD_EDGE_THRESHOLD: u8 = 128;

/// Map blurred alpha through the soft threshold band.
pub fn soft_threshold(alpha: u8) -> u8 {
    let lower = BLEED_THRESHOLD_CENTER - BLEED_FEATHER;
    let upper = BLEED_THRESHOLD_CENTER + BLEED_FEATHER;

    if alpha <= lower {
        0
    } else if alpha >= upper {
        255
    } else {
        let range = f32::from(upper - lower);
        (f32::from(alpha - lower) / range * 255.0).round() as u8
    }
}

/// Binarize alpha at the 50% point.
pub fn hard_threshold(alpha: u8) -> u8 {
    if alpha < HARD_EDGE_THRESHOLD { 0 } else { 255 }
}

/// Blur the mask by `radius` pixels and apply the soft threshold.
///
/// Everything outside the mask counts as transparent, so ink thins out
/// towards the borders. Every pixel ends up black with the thresholded alpha.
pub fn apply_ink_bleed(mask: &mut RgbaImage, radius: f32) {
    let (width, height) = mask.dimensions();
    debug!(width, height, radius, "Applying ink bleed");

    // The blur kernel reaches 3 sigma; a transparent border that wide keeps
    // edge pixels from being replicated outward.
    let pad = (radius * 3.0).ceil() as u32;
    let mut alpha = GrayImage::new(width + 2 * pad, height + 2 * pad);
    for (x, y, px) in mask.enumerate_pixels() {
        alpha.put_pixel(x + pad, y + pad, Luma([px[3]]));
    }
    let blurred = gaussian_blur_f32(&alpha, radius);

    for (x, y, dst) in mask.enumerate_pixels_mut() {
        *dst = Rgba([0, 0, 0, soft_threshold(blurred.get_pixel(x + pad, y + pad)[0])]);
    }
}

/// Remove anti-aliasing: alpha becomes 0 or 255, color black.
pub fn enforce_hard_edges(mask: &mut RgbaImage) {
    let (width, height) = mask.dimensions();
    debug!(width, height, "Enforcing hard edges");

    for px in mask.pixels_mut() {
        *px = Rgba([0, 0, 0, hard_threshold(px[3])]);
    }
}

/// Run whichever edge path the settings select.
pub fn post_process(mask: &mut RgbaImage, settings: &Settings) {
    if settings.bleeds() {
        apply_ink_bleed(mask, settings.ink_bleed);
    } else {
        enforce_hard_edges(mask);
    }
}
