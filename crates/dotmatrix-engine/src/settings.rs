//! Render settings consumed by the pipeline.
//!
//! Field names serialize in camelCase so stored settings stay readable by
//! other front ends; `pixelSize` is the historical name of the cell size.

use serde::{Deserialize, Serialize};

use crate::{EngineError, Result, Rgb};

/// Dithering strategy applied to the toned working buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DitherMethod {
    #[serde(rename = "Threshold")]
    Threshold,
    #[serde(rename = "Random (Noise)", alias = "Random")]
    Random,
    #[serde(rename = "Floyd-Steinberg")]
    FloydSteinberg,
    #[serde(rename = "Atkinson")]
    Atkinson,
    #[serde(rename = "Stucki")]
    Stucki,
    #[serde(rename = "Sierra Lite")]
    SierraLite,
    #[serde(rename = "Bayer 4x4")]
    Bayer4x4,
    #[serde(rename = "Bayer 8x8")]
    Bayer8x8,
    #[serde(rename = "Halftone")]
    Halftone,
}

impl DitherMethod {
    pub const ALL: [DitherMethod; 9] = [
        DitherMethod::Threshold,
        DitherMethod::Random,
        DitherMethod::FloydSteinberg,
        DitherMethod::Atkinson,
        DitherMethod::Stucki,
        DitherMethod::SierraLite,
        DitherMethod::Bayer4x4,
        DitherMethod::Bayer8x8,
        DitherMethod::Halftone,
    ];

    /// Whether two runs over identical input always agree.
    pub fn is_deterministic(self) -> bool {
        self != DitherMethod::Random
    }
}

/// Primitive drawn for each inked cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DotShape {
    Square,
    Circle,
    Diamond,
    Triangle,
    Cross,
    Plus,
    Heart,
    Star,
    #[serde(rename = "ASCII")]
    Ascii,
}

impl DotShape {
    pub const ALL: [DotShape; 9] = [
        DotShape::Square,
        DotShape::Circle,
        DotShape::Diamond,
        DotShape::Triangle,
        DotShape::Cross,
        DotShape::Plus,
        DotShape::Heart,
        DotShape::Star,
        DotShape::Ascii,
    ];
}

/// Optional multi-line text drawn into the working buffer before dithering.
///
/// Size and position are in output pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOverlay {
    #[serde(rename = "showText")]
    pub enabled: bool,
    #[serde(rename = "text")]
    pub content: String,
    #[serde(rename = "fontFamily")]
    pub font_family: String,
    #[serde(rename = "textSize")]
    pub font_size: f32,
    #[serde(rename = "textX")]
    pub x: f32,
    #[serde(rename = "textY")]
    pub y: f32,
    /// Dark (black) text when true, light (white) text otherwise.
    #[serde(rename = "textDark")]
    pub dark: bool,
}

impl Default for TextOverlay {
    fn default() -> Self {
        Self {
            enabled: false,
            content: "示例文本\nSAMPLE".into(),
            font_family: "Space Mono".into(),
            font_size: 40.0,
            x: 20.0,
            y: 60.0,
            dark: true,
        }
    }
}

impl TextOverlay {
    /// True when the overlay should actually draw something.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.content.is_empty()
    }
}

/// Immutable-per-run configuration of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub output_width: u32,
    pub output_height: u32,
    /// Edge length of one cell in output pixels.
    #[serde(rename = "pixelSize", alias = "cellSize")]
    pub cell_size: u32,
    pub gap: u32,
    pub contrast: f32,
    pub brightness: f32,
    #[serde(rename = "ditherMethod")]
    pub dither: DitherMethod,
    #[serde(rename = "dotShape")]
    pub shape: DotShape,
    pub inverted: bool,
    #[serde(rename = "foregroundColor")]
    pub ink: Rgb,
    #[serde(rename = "backgroundColor")]
    pub paper: Rgb,
    pub transparent_background: bool,
    /// Blur radius in pixels; 0 selects the hard-edge path.
    pub ink_bleed: f32,
    #[serde(flatten)]
    pub text: TextOverlay,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_width: 384,
            output_height: 500,
            cell_size: 6,
            gap: 1,
            contrast: 1.1,
            brightness: 0.0,
            dither: DitherMethod::FloydSteinberg,
            shape: DotShape::Circle,
            inverted: false,
            ink: Rgb::new(0x1f, 0x29, 0x37),
            paper: Rgb::new(0xf3, 0xf4, 0xf6),
            transparent_background: false,
            ink_bleed: 0.0,
            text: TextOverlay::default(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Largest dot edge in output pixels. Non-positive means no dots at all.
    pub fn max_dot_size(&self) -> f32 {
        self.cell_size as f32 - self.gap as f32
    }

    /// Whether the ink-bleed (blur + soft threshold) path is active.
    pub fn bleeds(&self) -> bool {
        self.ink_bleed > 0.0
    }

    /// Whether the pipeline has enough to work with.
    ///
    /// The pipeline checks this itself and no-ops when it fails.
    pub fn is_renderable(&self) -> bool {
        self.output_width >= 1 && self.output_height >= 1 && self.cell_size >= 1
    }

    /// Ink and paper after applying the invert flag, as `(foreground, background)`.
    pub fn effective_colors(&self) -> (Rgb, Rgb) {
        if self.inverted {
            (self.paper, self.ink)
        } else {
            (self.ink, self.paper)
        }
    }

    /// Strict validation for callers that want errors instead of no-ops.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(EngineError::InvalidSettings(msg));

        if self.output_width == 0 || self.output_height == 0 {
            return fail(format!(
                "output dimensions must be at least 1x1, got {}x{}",
                self.output_width, self.output_height
            ));
        }
        if self.cell_size == 0 {
            return fail("cell size must be at least 1".into());
        }
        if !self.contrast.is_finite() || !self.brightness.is_finite() {
            return fail("contrast and brightness must be finite".into());
        }
        if !self.ink_bleed.is_finite() || self.ink_bleed < 0.0 {
            return fail(format!("ink bleed must be >= 0, got {}", self.ink_bleed));
        }
        if !self.text.font_size.is_finite() || self.text.font_size <= 0.0 {
            return fail(format!("text size must be > 0, got {}", self.text.font_size));
        }
        if !self.text.x.is_finite() || !self.text.y.is_finite() {
            return fail("text position must be finite".into());
        }
        Ok(())
    }

    /// Builder: set output dimensions.
    pub fn with_output_size(mut self, width: u32, height: u32) -> Self {
        self.output_width = width;
        self.output_height = height;
        self
    }

    /// Builder: set cell size and gap.
    pub fn with_cell(mut self, cell_size: u32, gap: u32) -> Self {
        self.cell_size = cell_size;
        self.gap = gap;
        self
    }

    /// Builder: set contrast and brightness.
    pub fn with_tone(mut self, contrast: f32, brightness: f32) -> Self {
        self.contrast = contrast;
        self.brightness = brightness;
        self
    }

    /// Builder: set dither method.
    pub fn with_dither(mut self, method: DitherMethod) -> Self {
        self.dither = method;
        self
    }

    /// Builder: set dot shape.
    pub fn with_shape(mut self, shape: DotShape) -> Self {
        self.shape = shape;
        self
    }

    /// Builder: set ink and paper colors.
    pub fn with_colors(mut self, ink: Rgb, paper: Rgb) -> Self {
        self.ink = ink;
        self.paper = paper;
        self
    }

    /// Builder: set invert flag.
    pub fn with_inverted(mut self, val: bool) -> Self {
        self.inverted = val;
        self
    }

    /// Builder: set transparent-background flag.
    pub fn with_transparent_background(mut self, val: bool) -> Self {
        self.transparent_background = val;
        self
    }

    /// Builder: set ink-bleed radius.
    pub fn with_ink_bleed(mut self, radius: f32) -> Self {
        self.ink_bleed = radius;
        self
    }

    /// Builder: replace the text overlay.
    pub fn with_text(mut self, text: TextOverlay) -> Self {
        self.text = text;
        self
    }
}
