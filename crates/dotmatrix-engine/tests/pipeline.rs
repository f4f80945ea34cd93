use dotmatrix_engine::{
    DitherMethod, DotShape, FontBook, Rgb, Settings, process, process_with_rng,
};
use image::{Rgba, RgbaImage};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn gray(size: u32, level: u8) -> RgbaImage {
    RgbaImage::from_pixel(size, size, Rgba([level, level, level, 255]))
}

fn gradient() -> RgbaImage {
    RgbaImage::from_fn(96, 64, |x, y| {
        let v = ((x * 255) / 95) as u8;
        Rgba([v, v.saturating_sub(y as u8), 255 - v, 255])
    })
}

fn plain_settings() -> Settings {
    Settings::new()
        .with_output_size(100, 100)
        .with_cell(10, 0)
        .with_tone(1.0, 0.0)
        .with_dither(DitherMethod::Threshold)
        .with_shape(DotShape::Square)
        .with_colors(Rgb::BLACK, Rgb::WHITE)
}

fn render(source: &RgbaImage, settings: &Settings, seed: u64) -> RgbaImage {
    let mut dest = RgbaImage::new(1, 1);
    process_with_rng(source, &mut dest, settings, &FontBook::new(), &mut StdRng::seed_from_u64(seed));
    dest
}

#[test]
fn test_mid_gray_threshold_prints_nothing() {
    let out = render(&gray(100, 128), &plain_settings(), 0);
    assert_eq!(out.dimensions(), (100, 100));
    assert!(out.pixels().all(|p| p.0 == [255, 255, 255, 255]));
}

#[test]
fn test_black_source_fills_every_cell() {
    let out = render(&gray(100, 0), &plain_settings(), 0);
    assert!(out.pixels().all(|p| p.0 == [0, 0, 0, 255]));
}

#[test]
fn test_white_source_prints_nothing_for_any_method() {
    for method in DitherMethod::ALL {
        let settings = plain_settings().with_dither(method);
        let out = render(&gray(40, 255), &settings, 3);
        assert!(
            out.pixels().all(|p| p.0 == [255, 255, 255, 255]),
            "{method:?} inked a white source"
        );
    }
}

#[test]
fn test_deterministic_methods_repeat_exactly() {
    let source = gradient();
    for method in DitherMethod::ALL.into_iter().filter(|m| m.is_deterministic()) {
        let settings = Settings::new()
            .with_output_size(120, 80)
            .with_cell(4, 1)
            .with_dither(method)
            .with_shape(DotShape::Circle);
        let fonts = FontBook::new();
        let mut first = RgbaImage::new(1, 1);
        let mut second = RgbaImage::new(1, 1);
        process(&source, &mut first, &settings, &fonts);
        process(&source, &mut second, &settings, &fonts);
        assert_eq!(first, second, "{method:?} was not deterministic");
    }
}

#[test]
fn test_random_method_repeats_with_same_seed() {
    let settings = plain_settings().with_dither(DitherMethod::Random);
    let source = gray(100, 128);
    assert_eq!(render(&source, &settings, 42), render(&source, &settings, 42));
}

#[test]
fn test_hard_edges_without_bleed() {
    for shape in DotShape::ALL {
        let settings = Settings::new()
            .with_output_size(90, 60)
            .with_cell(6, 1)
            .with_dither(DitherMethod::Halftone)
            .with_shape(shape)
            .with_transparent_background(true);
        let out = render(&gradient(), &settings, 0);
        assert!(
            out.pixels().all(|p| p[3] == 0 || p[3] == 255),
            "{shape:?} left partial alpha"
        );
    }
}

#[test]
fn test_bleed_softens_edges() {
    let settings = Settings::new()
        .with_output_size(120, 80)
        .with_cell(8, 2)
        .with_dither(DitherMethod::FloydSteinberg)
        .with_transparent_background(true)
        .with_ink_bleed(2.0);
    let out = render(&gradient(), &settings, 0);
    assert!(out.pixels().any(|p| p[3] > 0 && p[3] < 255));
}

#[test]
fn test_invert_matches_swapped_colors() {
    let ink = Rgb::new(0x1f, 0x29, 0x37);
    let paper = Rgb::new(0xf3, 0xf4, 0xf6);
    let base = Settings::new()
        .with_output_size(96, 64)
        .with_cell(4, 1)
        .with_dither(DitherMethod::Atkinson);

    let inverted = render(&gradient(), &base.clone().with_colors(ink, paper).with_inverted(true), 0);
    let swapped = render(&gradient(), &base.with_colors(paper, ink), 0);
    assert_eq!(inverted, swapped);
}

#[test]
fn test_degenerate_settings_leave_destination_alone() {
    let marker = RgbaImage::from_pixel(5, 5, Rgba([1, 2, 3, 4]));
    for settings in [
        plain_settings().with_output_size(0, 100),
        plain_settings().with_output_size(100, 0),
        plain_settings().with_cell(0, 0),
    ] {
        let mut dest = marker.clone();
        process(&gray(10, 0), &mut dest, &settings, &FontBook::new());
        assert_eq!(dest, marker);
    }
}

#[test]
fn test_tiny_output_still_renders_one_cell() {
    let settings = plain_settings().with_output_size(3, 3);
    let out = render(&gray(10, 0), &settings, 0);
    assert_eq!(out.dimensions(), (3, 3));
}

#[test]
fn test_settings_from_json_drive_the_pipeline() {
    let json = r##"{
        "outputWidth": 100,
        "outputHeight": 100,
        "pixelSize": 10,
        "gap": 0,
        "contrast": 1.0,
        "brightness": 0,
        "ditherMethod": "Threshold",
        "dotShape": "Square",
        "foregroundColor": "#000",
        "backgroundColor": "#ffffff",
        "showText": false
    }"##;
    let settings: Settings = serde_json::from_str(json).unwrap();
    assert_eq!(settings, plain_settings().with_text(settings.text.clone()));
    let out = render(&gray(100, 0), &settings, 0);
    assert!(out.pixels().all(|p| p.0 == [0, 0, 0, 255]));
}
