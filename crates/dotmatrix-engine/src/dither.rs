//! Dithering of the toned working buffer into a per-cell map.
//!
//! All methods read the red channel as luminance (the tone stage makes the
//! channels equal). Binary methods emit 1 for ink and 0 for paper; halftone
//! emits the inverted luminance, later used as the dot size.
//!
//! Error diffusion walks the buffer in raster order and pushes each cell's
//! quantization error into not-yet-visited neighbors, so the order is part
//! of the result. Error landing outside the buffer is dropped.

use image::RgbaImage;
use rand::Rng;
use tracing::debug;

use crate::MID_GRAY;
use crate::settings::DitherMethod;

/// Ordered-dither matrix, 4x4.
pub const BAYER_4X4: [[u8; 4]; 4] = [
    [0, 8, 2, 10],
    [12, 4, 14, 6],
    [3, 11, 1, 9],
    [15, 7, 13, 5],
];

/// Ordered-dither matrix, 8x8.
pub const BAYER_8X8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Error-diffusion kernel: `(dx, dy, weight)` taps relative to the current cell.
#[derive(Debug, Clone, Copy)]
pub struct ErrorKernel {
    pub taps: &'static [(i32, i32, f32)],
}

impl ErrorKernel {
    /// Fraction of the quantization error the kernel propagates.
    pub fn total_weight(&self) -> f32 {
        self.taps.iter().map(|&(_, _, w)| w).sum()
    }
}

/// Floyd-Steinberg: 7/16 right, 3/16 down-left, 5/16 down, 1/16 down-right.
pub const FLOYD_STEINBERG: ErrorKernel = ErrorKernel {
    taps: &[
        (1, 0, 7.0 / 16.0),
        (-1, 1, 3.0 / 16.0),
        (0, 1, 5.0 / 16.0),
        (1, 1, 1.0 / 16.0),
    ],
};

/// Atkinson: 1/8 to six neighbors. Only 6/8 of the error is propagated;
/// the lost quarter brightens the result and must be kept.
pub const ATKINSON: ErrorKernel = ErrorKernel {
    taps: &[
        (1, 0, 1.0 / 8.0),
        (2, 0, 1.0 / 8.0),
        (-1, 1, 1.0 / 8.0),
        (0, 1, 1.0 / 8.0),
        (1, 1, 1.0 / 8.0),
        (0, 2, 1.0 / 8.0),
    ],
};

/// Stucki: twelve taps over 42.
pub const STUCKI: ErrorKernel = ErrorKernel {
    taps: &[
        (1, 0, 8.0 / 42.0),
        (2, 0, 4.0 / 42.0),
        (-2, 1, 2.0 / 42.0),
        (-1, 1, 4.0 / 42.0),
        (0, 1, 8.0 / 42.0),
        (1, 1, 4.0 / 42.0),
        (2, 1, 2.0 / 42.0),
        (-2, 2, 1.0 / 42.0),
        (-1, 2, 2.0 / 42.0),
        (0, 2, 4.0 / 42.0),
        (1, 2, 2.0 / 42.0),
        (2, 2, 1.0 / 42.0),
    ],
};

/// Sierra Lite: 2/4 right, 1/4 down-left, 1/4 down.
pub const SIERRA_LITE: ErrorKernel = ErrorKernel {
    taps: &[(1, 0, 2.0 / 4.0), (-1, 1, 1.0 / 4.0), (0, 1, 1.0 / 4.0)],
};

/// How cell values should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellMode {
    /// 1 = ink, 0 = no ink.
    Binary,
    /// 0..=255 ink intensity, drawn as dot size.
    Intensity,
}

/// One value per working-buffer pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellMap {
    width: u32,
    height: u32,
    mode: CellMode,
    values: Vec<u8>,
}

impl CellMap {
    pub fn new(width: u32, height: u32, mode: CellMode) -> Self {
        Self {
            width,
            height,
            mode,
            values: vec![0; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mode(&self) -> CellMode {
        self.mode
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.values[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        let i = self.index(x, y);
        self.values[i] = value;
    }

    /// Number of cells carrying any ink.
    pub fn inked_count(&self) -> usize {
        self.values.iter().filter(|&&v| v != 0).count()
    }

    /// Iterate `(x, y, value)` in raster order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, u8)> + '_ {
        let width = self.width;
        self.values
            .iter()
            .enumerate()
            .map(move |(i, &v)| ((i as u32) % width, (i as u32) / width, v))
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }
}

/// Mutable luminance plane for error diffusion.
///
/// Values are kept as unclamped `f32` so diffused error is neither rounded
/// nor saturated between cells.
#[derive(Debug, Clone)]
pub(crate) struct LumaGrid {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl LumaGrid {
    pub(crate) fn from_red_channel(buffer: &RgbaImage) -> Self {
        let (width, height) = buffer.dimensions();
        let data = buffer.pixels().map(|p| f32::from(p[0])).collect();
        Self {
            width,
            height,
            data,
        }
    }

    pub(crate) fn get(&self, x: u32, y: u32) -> f32 {
        self.data[(y as usize) * (self.width as usize) + (x as usize)]
    }

    /// Add `amount` at `(x, y)`; out-of-bounds targets are ignored.
    pub(crate) fn add(&mut self, x: i64, y: i64, amount: f32) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let i = (y as usize) * (self.width as usize) + (x as usize);
        self.data[i] += amount;
    }

    /// Spread `error` from `(x, y)` over the kernel taps.
    pub(crate) fn diffuse(&mut self, x: u32, y: u32, error: f32, kernel: &ErrorKernel) {
        for &(dx, dy, weight) in kernel.taps {
            self.add(i64::from(x) + i64::from(dx), i64::from(y) + i64::from(dy), error * weight);
        }
    }
}

/// Reduce the toned buffer to a cell map with the chosen method.
///
/// `rng` is only consumed by [`DitherMethod::Random`].
pub fn dither<R: Rng>(buffer: &RgbaImage, method: DitherMethod, rng: &mut R) -> CellMap {
    let (width, height) = buffer.dimensions();
    debug!(width, height, ?method, "Dithering working buffer");

    let map = match method {
        DitherMethod::Threshold => per_cell(buffer, |_, _, lum| lum < MID_GRAY),
        DitherMethod::Random => per_cell(buffer, |_, _, lum| lum < rng.gen_range(0.0..255.0)),
        DitherMethod::Bayer4x4 => per_cell(buffer, |x, y, lum| {
            let m = BAYER_4X4[(y % 4) as usize][(x % 4) as usize];
            lum < (f32::from(m) / 16.0) * 255.0
        }),
        DitherMethod::Bayer8x8 => per_cell(buffer, |x, y, lum| {
            let m = BAYER_8X8[(y % 8) as usize][(x % 8) as usize];
            lum < (f32::from(m) / 64.0) * 255.0
        }),
        DitherMethod::FloydSteinberg => error_diffusion(buffer, &FLOYD_STEINBERG),
        DitherMethod::Atkinson => error_diffusion(buffer, &ATKINSON),
        DitherMethod::Stucki => error_diffusion(buffer, &STUCKI),
        DitherMethod::SierraLite => error_diffusion(buffer, &SIERRA_LITE),
        DitherMethod::Halftone => halftone(buffer),
    };

    debug!(inked = map.inked_count(), "Dithering complete");
    map
}

/// Binary map from an independent per-cell decision.
fn per_cell(buffer: &RgbaImage, mut ink: impl FnMut(u32, u32, f32) -> bool) -> CellMap {
    let (width, height) = buffer.dimensions();
    let mut map = CellMap::new(width, height, CellMode::Binary);
    for (x, y, px) in buffer.enumerate_pixels() {
        map.set(x, y, u8::from(ink(x, y, f32::from(px[0]))));
    }
    map
}

/// Binary map by raster-order error diffusion.
pub fn error_diffusion(buffer: &RgbaImage, kernel: &ErrorKernel) -> CellMap {
    let (width, height) = buffer.dimensions();
    let mut grid = LumaGrid::from_red_channel(buffer);
    let mut map = CellMap::new(width, height, CellMode::Binary);

    for y in 0..height {
        for x in 0..width {
            let old = grid.get(x, y);
            let new = if old < MID_GRAY { 0.0 } else { 255.0 };
            map.set(x, y, u8::from(new == 0.0));
            grid.diffuse(x, y, old - new, kernel);
        }
    }

    map
}

/// Intensity map: `255 - luminance`.
fn halftone(buffer: &RgbaImage) -> CellMap {
    let (width, height) = buffer.dimensions();
    let mut map = CellMap::new(width, height, CellMode::Intensity);
    for (x, y, px) in buffer.enumerate_pixels() {
        map.set(x, y, 255 - px[0]);
    }
    map
}
