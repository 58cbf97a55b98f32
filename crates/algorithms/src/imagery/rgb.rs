//! Color indices from ordinary RGB photographs
//!
//! Derives four visible-band vegetation indices plus the HSV transform of
//! the same pixels. Index math runs in single precision; the RGB rule
//! thresholds are tuned against single-precision values.

use crate::imagery::hsv::rgb_to_hsv;
use crate::imagery::IndexProducer;
use crate::maybe_rayon::fill_rows;
use landclass_core::{Error, IndexKind, IndexSet, Outcome, PixelImage, Raster};

/// Guard added to every denominator
pub const EPSILON: f32 = 1e-8;

/// Green-red vegetation index, `(G - R) / (G + R + ε)`, 0 where `G + R ≤ ε`
pub fn grvi(r: f32, g: f32) -> f32 {
    let sum = g + r;
    if sum > EPSILON {
        (g - r) / (sum + EPSILON)
    } else {
        0.0
    }
}

/// Visible atmospherically resistant index, `(G - R) / (G + R - B + ε)`,
/// 0 where `G + R - B ≤ ε`
pub fn vari(r: f32, g: f32, b: f32) -> f32 {
    let denom = g + r - b;
    if denom > EPSILON {
        (g - r) / (denom + EPSILON)
    } else {
        0.0
    }
}

/// Excess green, `2G - R - B`
pub fn exg(r: f32, g: f32, b: f32) -> f32 {
    2.0 * g - r - b
}

/// Triangular greenness, `G - 0.39R - 0.61B`
pub fn tgi(r: f32, g: f32, b: f32) -> f32 {
    g - 0.39 * r - 0.61 * b
}

/// Index producer for 8-bit gray, RGB and RGBA images.
///
/// Gray images feed their single band to all three channels; RGBA images
/// ignore alpha. Any other band count, or an empty image, degrades to an
/// empty [`IndexSet`] carrying the image's shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct RgbIndexCalculator;

impl IndexProducer for RgbIndexCalculator {
    type Source = PixelImage;

    fn indices(&self, image: &PixelImage) -> Outcome<IndexSet> {
        rgb_indices(image)
    }
}

/// Compute GRVI, VARI, ExG, TGI and hue/saturation/brightness.
pub fn rgb_indices(image: &PixelImage) -> Outcome<IndexSet> {
    let (rows, cols) = image.shape();
    let empty = IndexSet::with_shape(rows, cols);

    if image.is_empty() {
        return Outcome::degraded(empty, Error::EmptyInput("image has no pixels"));
    }
    let bands = image.band_count();
    if !matches!(bands, 1 | 3 | 4) {
        return Outcome::degraded(empty, Error::UnsupportedBandCount(bands));
    }

    let cells = fill_rows(rows, cols, [0.0f64; 7], |row, out| {
        for (col, cell) in out.iter_mut().enumerate() {
            // Band count was checked above, so every pixel converts.
            let [r8, g8, b8] = image.rgb(row, col).unwrap_or([0; 3]);
            let (r, g, b) = (f32::from(r8), f32::from(g8), f32::from(b8));
            let hsv = rgb_to_hsv(r8, g8, b8);
            *cell = [
                f64::from(grvi(r, g)),
                f64::from(vari(r, g, b)),
                f64::from(exg(r, g, b)),
                f64::from(tgi(r, g, b)),
                hsv.h,
                hsv.s,
                hsv.v,
            ];
        }
    });

    let kinds = [
        IndexKind::Grvi,
        IndexKind::Vari,
        IndexKind::Exg,
        IndexKind::Tgi,
        IndexKind::Hue,
        IndexKind::Saturation,
        IndexKind::Brightness,
    ];

    let mut set = IndexSet::with_shape(rows, cols);
    for (slot, kind) in kinds.iter().enumerate() {
        let data: Vec<f64> = cells.iter().map(|c| c[slot]).collect();
        let built = Raster::from_vec(data, rows, cols).and_then(|r| set.insert(*kind, r));
        if let Err(e) = built {
            return Outcome::degraded(IndexSet::with_shape(rows, cols), e);
        }
    }

    tracing::debug!("computed {} RGB indices over {}x{}", set.len(), cols, rows);
    Outcome::Complete(set)
}
