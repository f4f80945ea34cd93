//! Grayscale conversion with brightness and contrast.

use image::RgbaImage;
use tracing::debug;

use crate::MID_GRAY;

/// Map one RGB sample to its toned gray level.
///
/// Rec.601 luma, then `+ brightness * 255`, then contrast around mid-gray,
/// clamped to `[0, 255]`.
pub fn tone_value(r: u8, g: u8, b: u8, contrast: f32, brightness: f32) -> u8 {
    let mut gray = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
    gray += brightness * 255.0;
    gray = (gray - MID_GRAY) * contrast + MID_GRAY;
    gray.clamp(0.0, 255.0).round() as u8
}

/// Apply the tone map in place. Alpha is left untouched.
pub fn apply_tone(buffer: &mut RgbaImage, contrast: f32, brightness: f32) {
    let (width, height) = buffer.dimensions();
    debug!(width, height, contrast, brightness, "Applying tone map");

    for px in buffer.pixels_mut() {
        let gray = tone_value(px[0], px[1], px[2], contrast, brightness);
        px[0] = gray;
        px[1] = gray;
        px[2] = gray;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_neutral_tone_keeps_gray() {
        for v in [0u8, 1, 64, 127, 128, 200, 255] {
            assert_eq!(tone_value(v, v, v, 1.0, 0.0), v);
        }
    }

    #[test]
    fn test_luma_weights() {
        assert_eq!(tone_value(255, 0, 0, 1.0, 0.0), 76);
        assert_eq!(tone_value(0, 255, 0, 1.0, 0.0), 150);
        assert_eq!(tone_value(0, 0, 255, 1.0, 0.0), 29);
    }

    #[test]
    fn test_brightness_shifts_and_clamps() {
        assert_eq!(tone_value(100, 100, 100, 1.0, 0.2), 151);
        assert_eq!(tone_value(250, 250, 250, 1.0, 0.5), 255);
        assert_eq!(tone_value(10, 10, 10, 1.0, -1.0), 0);
    }

    #[test]
    fn test_contrast_pivots_on_mid_gray() {
        assert_eq!(tone_value(128, 128, 128, 3.0, 0.0), 128);
        assert_eq!(tone_value(138, 138, 138, 2.0, 0.0), 148);
        assert_eq!(tone_value(118, 118, 118, 2.0, 0.0), 108);
        assert_eq!(tone_value(200, 200, 200, 0.0, 0.0), 128);
    }

    #[test]
    fn test_apply_tone_preserves_alpha() {
        let mut img = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 77]));
        apply_tone(&mut img, 1.0, 0.0);
        for px in img.pixels() {
            assert_eq!(px.0, [76, 76, 76, 77]);
        }
    }
}
