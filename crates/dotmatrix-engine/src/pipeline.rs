//! End-to-end rendering: source bitmap in, styled output raster out.
//!
//! Stages run in a fixed order: cover-fit into the working buffer, tone,
//! text overlay, dithering, shape rendering, edge treatment, compositing.

use image::RgbaImage;
use rand::Rng;
use tracing::{debug, warn};

use crate::bleed::post_process;
use crate::compose::composite;
use crate::dither::dither;
use crate::fit::{fit_cover, working_size};
use crate::fonts::FontBook;
use crate::settings::Settings;
use crate::shape::render_cells;
use crate::text::draw_overlay;
use crate::tone::apply_tone;

/// Render `source` into `destination` using the thread-local RNG.
///
/// `destination` is replaced by an `output_width x output_height` image.
/// Degenerate settings (zero output size or cell size) leave it untouched.
pub fn process(source: &RgbaImage, destination: &mut RgbaImage, settings: &Settings, fonts: &FontBook) {
    process_with_rng(source, destination, settings, fonts, &mut rand::thread_rng());
}

/// Same as [`process`] with an explicit RNG, which only the random dither draws from.
pub fn process_with_rng<R: Rng>(
    source: &RgbaImage,
    destination: &mut RgbaImage,
    settings: &Settings,
    fonts: &FontBook,
    rng: &mut R,
) {
    if !settings.is_renderable() {
        warn!(
            width = settings.output_width,
            height = settings.output_height,
            cell_size = settings.cell_size,
            "Settings not renderable, leaving destination unchanged"
        );
        return;
    }

    let (work_w, work_h) = working_size(settings.output_width, settings.output_height, settings.cell_size);
    debug!(
        src_w = source.width(),
        src_h = source.height(),
        work_w,
        work_h,
        out_w = settings.output_width,
        out_h = settings.output_height,
        method = ?settings.dither,
        shape = ?settings.shape,
        "Processing image"
    );

    let mut buffer = fit_cover(source, work_w, work_h);
    apply_tone(&mut buffer, settings.contrast, settings.brightness);
    draw_overlay(&mut buffer, &settings.text, settings.cell_size, fonts);

    let cells = dither(&buffer, settings.dither, rng);
    debug!(inked = cells.inked_count(), total = work_w * work_h, "Dithered working buffer");

    let mut mask = render_cells(&cells, settings, fonts);
    post_process(&mut mask, settings);

    *destination = composite(&mask, settings);
}
