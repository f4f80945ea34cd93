//! Final compositing of the processed mask over paper (or transparency).

use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::Rgb;
use crate::settings::Settings;

/// Paint the background: transparent, paper, or ink when inverted.
pub fn background(settings: &Settings) -> RgbaImage {
    let (width, height) = (settings.output_width, settings.output_height);
    if settings.transparent_background {
        return RgbaImage::new(width, height);
    }
    let (_, bg) = settings.effective_colors();
    RgbaImage::from_pixel(width, height, bg.opaque())
}

/// Use the mask's alpha as a stencil for a solid fill of `color`.
pub fn colorize(mask: &RgbaImage, color: Rgb) -> RgbaImage {
    let (width, height) = mask.dimensions();
    RgbaImage::from_fn(width, height, |x, y| color.with_alpha(mask.get_pixel(x, y)[3]))
}

/// Source-over `top` onto `base`, pixel for pixel. Both must share dimensions.
pub fn draw_over(base: &mut RgbaImage, top: &RgbaImage) {
    for (dst, src) in base.pixels_mut().zip(top.pixels()) {
        *dst = blend_pixel(*dst, *src);
    }
}

fn blend_pixel(bg: Rgba<u8>, fg: Rgba<u8>) -> Rgba<u8> {
    match fg[3] {
        0 => bg,
        255 => fg,
        a => {
            let fa = f32::from(a) / 255.0;
            let ba = f32::from(bg[3]) / 255.0;
            let out_a = fa + ba * (1.0 - fa);
            let mix = |f: u8, b: u8| {
                ((f32::from(f) * fa + f32::from(b) * ba * (1.0 - fa)) / out_a).round() as u8
            };
            Rgba([
                mix(fg[0], bg[0]),
                mix(fg[1], bg[1]),
                mix(fg[2], bg[2]),
                (out_a * 255.0).round() as u8,
            ])
        }
    }
}

/// Build the destination raster from the processed mask.
///
/// The draw is 1:1, so no resampling happens on either edge path; partial
/// alpha only exists when ink bleed produced it.
pub fn composite(mask: &RgbaImage, settings: &Settings) -> RgbaImage {
    let (fg, _) = settings.effective_colors();
    debug!(
        inverted = settings.inverted,
        transparent = settings.transparent_background,
        foreground = %fg,
        "Compositing output"
    );

    let mut out = background(settings);
    let layer = colorize(mask, fg);
    draw_over(&mut out, &layer);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_with_dot() -> RgbaImage {
        let mut mask = RgbaImage::new(4, 4);
        mask.put_pixel(1, 1, Rgba([0, 0, 0, 255]));
        mask.put_pixel(2, 2, Rgba([0, 0, 0, 128]));
        mask
    }

    fn settings() -> Settings {
        Settings::new()
            .with_output_size(4, 4)
            .with_colors(Rgb::new(10, 20, 30), Rgb::new(240, 230, 220))
    }

    #[test]
    fn test_paper_background_and_ink_dots() {
        let out = composite(&mask_with_dot(), &settings());
        assert_eq!(out.get_pixel(0, 0).0, [240, 230, 220, 255]);
        assert_eq!(out.get_pixel(1, 1).0, [10, 20, 30, 255]);
        // Half-covered pixel mixes ink into paper.
        let mixed = out.get_pixel(2, 2).0;
        assert_eq!(mixed[3], 255);
        assert!(mixed[0] > 10 && mixed[0] < 240);
    }

    #[test]
    fn test_invert_swaps_ink_and_paper() {
        let normal = composite(&mask_with_dot(), &settings());
        let inverted = composite(&mask_with_dot(), &settings().with_inverted(true));
        assert_eq!(inverted.get_pixel(0, 0).0, [10, 20, 30, 255]);
        assert_eq!(inverted.get_pixel(1, 1).0, [240, 230, 220, 255]);

        let swapped = Settings {
            ink: settings().paper,
            paper: settings().ink,
            ..settings()
        };
        assert_eq!(inverted, composite(&mask_with_dot(), &swapped));
        assert_ne!(normal, inverted);
    }

    #[test]
    fn test_transparent_background() {
        let out = composite(&mask_with_dot(), &settings().with_transparent_background(true));
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(out.get_pixel(1, 1).0, [10, 20, 30, 255]);
        // Partial alpha is kept as-is over transparency.
        assert_eq!(out.get_pixel(2, 2).0, [10, 20, 30, 128]);
    }

    #[test]
    fn test_colorize_keeps_alpha_only() {
        let layer = colorize(&mask_with_dot(), Rgb::new(1, 2, 3));
        assert_eq!(layer.get_pixel(0, 0).0, [1, 2, 3, 0]);
        assert_eq!(layer.get_pixel(2, 2).0, [1, 2, 3, 128]);
    }
}
