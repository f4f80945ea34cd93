//! Dot-matrix / halftone rendering engine for thermal-label output.
//!
//! Turns an arbitrary RGBA bitmap into a stylized render: cover-fit
//! downsampling, tone adjustment, optional text overlay, dithering,
//! per-cell dot shapes, ink-bleed or hard-edge post-processing, and
//! ink/paper compositing.

pub mod bleed;
pub mod color;
pub mod compose;
pub mod dither;
pub mod fit;
pub mod fonts;
pub mod pipeline;
pub mod settings;
pub mod shape;
pub mod text;
pub mod tone;

// Re-exports for convenience
pub use color::Rgb;
pub use dither::{CellMap, CellMode, dither};
pub use fit::{CoverFit, working_size};
pub use fonts::FontBook;
pub use pipeline::{process, process_with_rng};
pub use settings::{DitherMethod, DotShape, Settings, TextOverlay};

/// Luminance boundary used by threshold and error-diffusion dithering.
pub const MID_GRAY: f32 = 128.0;

/// Errors raised by the engine's validation and font-loading helpers.
///
/// The rendering entry points never return these; they degrade instead.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Invalid color '{0}': expected #rgb or #rrggbb")]
    InvalidColor(String),

    #[error("Font error: {0}")]
    Font(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
