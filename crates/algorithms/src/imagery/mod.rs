//! Index calculation for imagery
//!
//! Turns raw pixel bands into named index rasters:
//! - **rgb**: GRVI, VARI, ExG, TGI and HSV from ordinary photographs
//! - **spectral**: NDVI, NDBI, MNDWI and EVI from multispectral composites
//! - **resample**: area-averaging downscale for oversized images

mod hsv;
mod resample;
mod rgb;
mod spectral;

use landclass_core::{IndexSet, Outcome};

pub use hsv::{rgb_to_hsv, Hsv};
pub use resample::{downscale_to_fit, fit_dimensions};
pub use rgb::{exg, grvi, rgb_indices, tgi, vari, RgbIndexCalculator, EPSILON};
pub use spectral::{
    append_spectral_indices, evi, mndwi, ndbi, ndvi, normalized_difference, EviParams,
    SpectralIndexCalculator,
};

/// Something that derives an [`IndexSet`] from one kind of raster.
///
/// Producers never fail outright: malformed input degrades to an empty set
/// that still carries the source shape, so the classifier can fall back to
/// an all-background raster of the right size.
pub trait IndexProducer {
    type Source;

    fn indices(&self, source: &Self::Source) -> Outcome<IndexSet>;
}
