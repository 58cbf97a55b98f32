//! Spectral indices from multispectral composites
//!
//! Vegetation, built-up and water indices computed from named reflectance
//! bands. All inputs are single-band `f64` rasters of the same shape.

use crate::imagery::IndexProducer;
use crate::maybe_rayon::fill_rows;
use landclass_core::{
    Band, Error, IndexKind, IndexSet, MultiBandRaster, Outcome, Raster, Result,
};

// ---------------------------------------------------------------------------
// Generic normalized difference
// ---------------------------------------------------------------------------

/// Compute the normalized difference between two bands:
///
/// `(band_a - band_b) / (band_a + band_b)`
///
/// Result is in the range [-1, 1]. Pixels where both bands sum to zero
/// or either is nodata are set to NaN.
pub fn normalized_difference(band_a: &Raster<f64>, band_b: &Raster<f64>) -> Result<Raster<f64>> {
    band_a.check_same_shape(band_b)?;

    let (rows, cols) = band_a.shape();
    let (a_data, b_data) = (band_a.data(), band_b.data());

    let data = fill_rows(rows, cols, f64::NAN, |row, out| {
        for (col, cell) in out.iter_mut().enumerate() {
            let a = a_data[[row, col]];
            let b = b_data[[row, col]];

            if band_a.is_nodata(a) || band_b.is_nodata(b) {
                continue;
            }

            let sum = a + b;
            if sum.abs() < 1e-10 {
                continue;
            }

            *cell = (a - b) / sum;
        }
    });

    build_output(rows, cols, data)
}

// ---------------------------------------------------------------------------
// Named indices
// ---------------------------------------------------------------------------

/// Normalized Difference Vegetation Index
///
/// `NDVI = (NIR - Red) / (NIR + Red)`
///
/// Dense vegetation sits around 0.6 to 0.9, bare soil near 0.1 to 0.2,
/// water and clouds below zero.
pub fn ndvi(nir: &Raster<f64>, red: &Raster<f64>) -> Result<Raster<f64>> {
    normalized_difference(nir, red)
}

/// Normalized Difference Built-up Index
///
/// `NDBI = (SWIR1 - NIR) / (SWIR1 + NIR)`
///
/// Positive over impervious surfaces.
pub fn ndbi(swir1: &Raster<f64>, nir: &Raster<f64>) -> Result<Raster<f64>> {
    normalized_difference(swir1, nir)
}

/// Modified Normalized Difference Water Index (Xu, 2006)
///
/// `MNDWI = (Green - SWIR1) / (Green + SWIR1)`
pub fn mndwi(green: &Raster<f64>, swir1: &Raster<f64>) -> Result<Raster<f64>> {
    normalized_difference(green, swir1)
}

/// Parameters for EVI
#[derive(Debug, Clone, Copy)]
pub struct EviParams {
    /// Gain factor (default: 2.5)
    pub g: f64,
    /// Aerosol coefficient for red band (default: 6.0)
    pub c1: f64,
    /// Aerosol coefficient for blue band (default: 7.5)
    pub c2: f64,
    /// Canopy background adjustment (default: 1.0)
    pub l: f64,
}

impl Default for EviParams {
    fn default() -> Self {
        Self {
            g: 2.5,
            c1: 6.0,
            c2: 7.5,
            l: 1.0,
        }
    }
}

/// Enhanced Vegetation Index (Huete et al., 2002)
///
/// `EVI = G * (NIR - Red) / (NIR + C1 * Red - C2 * Blue + L)`
pub fn evi(
    nir: &Raster<f64>,
    red: &Raster<f64>,
    blue: &Raster<f64>,
    params: EviParams,
) -> Result<Raster<f64>> {
    nir.check_same_shape(red)?;
    nir.check_same_shape(blue)?;

    let (rows, cols) = nir.shape();
    let (n_data, r_data, b_data) = (nir.data(), red.data(), blue.data());

    let data = fill_rows(rows, cols, f64::NAN, |row, out| {
        for (col, cell) in out.iter_mut().enumerate() {
            let n = n_data[[row, col]];
            let r = r_data[[row, col]];
            let b = b_data[[row, col]];

            if nir.is_nodata(n) || red.is_nodata(r) || blue.is_nodata(b) {
                continue;
            }

            let denom = n + params.c1 * r - params.c2 * b + params.l;
            if denom.abs() < 1e-10 {
                continue;
            }

            *cell = params.g * (n - r) / denom;
        }
    });

    build_output(rows, cols, data)
}

// ---------------------------------------------------------------------------
// Producer
// ---------------------------------------------------------------------------

/// Index producer for multispectral composites.
///
/// Needs the RED, GREEN, BLUE, NIR and SWIR1 bands; SWIR2 is accepted but
/// unused. A missing band or an empty raster degrades to an empty
/// [`IndexSet`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SpectralIndexCalculator {
    pub evi: EviParams,
}

impl SpectralIndexCalculator {
    fn compute(&self, raster: &MultiBandRaster) -> Result<IndexSet> {
        let (rows, cols) = raster
            .shape()
            .ok_or(Error::EmptyInput("raster has no bands"))?;
        if rows == 0 || cols == 0 {
            return Err(Error::EmptyInput("raster has no pixels"));
        }

        let red = raster.require(Band::Red)?;
        let green = raster.require(Band::Green)?;
        let blue = raster.require(Band::Blue)?;
        let nir = raster.require(Band::Nir)?;
        let swir1 = raster.require(Band::Swir1)?;

        IndexSet::with_shape(rows, cols)
            .with(IndexKind::Ndvi, ndvi(nir, red)?)?
            .with(IndexKind::Ndbi, ndbi(swir1, nir)?)?
            .with(IndexKind::Mndwi, mndwi(green, swir1)?)?
            .with(IndexKind::Evi, evi(nir, red, blue, self.evi)?)
    }
}

impl IndexProducer for SpectralIndexCalculator {
    type Source = MultiBandRaster;

    fn indices(&self, raster: &MultiBandRaster) -> Outcome<IndexSet> {
        match self.compute(raster) {
            Ok(set) => {
                tracing::debug!("computed {} spectral indices", set.len());
                Outcome::Complete(set)
            }
            Err(e) => {
                let empty = match raster.shape() {
                    Some((rows, cols)) => IndexSet::with_shape(rows, cols),
                    None => IndexSet::new(),
                };
                Outcome::degraded(empty, e)
            }
        }
    }
}

/// Append NDVI, NDBI, MNDWI and EVI as index bands of `raster`.
///
/// The source bands stay in place. When the indices cannot be computed
/// the source is returned unchanged, marked degraded.
pub fn append_spectral_indices(raster: &MultiBandRaster) -> Outcome<MultiBandRaster> {
    let calculator = SpectralIndexCalculator::default();
    let set = match calculator.compute(raster) {
        Ok(set) => set,
        Err(e) => return Outcome::degraded(raster.clone(), e),
    };

    let mut out = raster.clone();
    match out.append_indices(&set) {
        Ok(()) => Outcome::Complete(out),
        Err(e) => Outcome::degraded(raster.clone(), e),
    }
}

fn build_output(rows: usize, cols: usize, data: Vec<f64>) -> Result<Raster<f64>> {
    let mut output = Raster::from_vec(data, rows, cols)?;
    output.set_nodata(Some(f64::NAN));
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_band(rows: usize, cols: usize, value: f64) -> Raster<f64> {
        Raster::filled(rows, cols, value)
    }

    fn make_composite(red: f64, green: f64, blue: f64, nir: f64, swir1: f64) -> MultiBandRaster {
        MultiBandRaster::from_bands([
            (Band::Red, make_band(4, 4, red)),
            (Band::Green, make_band(4, 4, green)),
            (Band::Blue, make_band(4, 4, blue)),
            (Band::Nir, make_band(4, 4, nir)),
            (Band::Swir1, make_band(4, 4, swir1)),
            (Band::Swir2, make_band(4, 4, swir1 * 0.8)),
        ])
        .unwrap()
    }

    #[test]
    fn test_normalized_difference_basic() {
        let a = make_band(5, 5, 0.8);
        let b = make_band(5, 5, 0.2);

        let result = normalized_difference(&a, &b).unwrap();
        let val = result.get(2, 2).unwrap();

        // (0.8 - 0.2) / (0.8 + 0.2) = 0.6
        assert!((val - 0.6).abs() < 1e-10, "Expected 0.6, got {}", val);
    }

    #[test]
    fn test_normalized_difference_zero_sum() {
        let a = make_band(3, 3, 0.0);
        let b = make_band(3, 3, 0.0);

        let result = normalized_difference(&a, &b).unwrap();
        assert!(result.get(1, 1).unwrap().is_nan());
    }

    #[test]
    fn test_normalized_difference_nodata() {
        let mut a = make_band(3, 3, 0.5);
        a.set_nodata(Some(-9999.0));
        a.set(0, 0, -9999.0).unwrap();
        let b = make_band(3, 3, 0.1);

        let result = normalized_difference(&a, &b).unwrap();
        assert!(result.get(0, 0).unwrap().is_nan());
        assert!(result.get(1, 1).unwrap().is_finite());
    }

    #[test]
    fn test_normalized_difference_shape_mismatch() {
        let a = make_band(3, 3, 0.5);
        let b = make_band(4, 3, 0.5);
        assert!(matches!(
            normalized_difference(&a, &b),
            Err(Error::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_evi_matches_formula() {
        let nir = make_band(5, 5, 0.5);
        let red = make_band(5, 5, 0.1);
        let blue = make_band(5, 5, 0.05);

        let result = evi(&nir, &red, &blue, EviParams::default()).unwrap();
        let val = result.get(2, 2).unwrap();

        let expected = 2.5 * (0.5 - 0.1) / (0.5 + 6.0 * 0.1 - 7.5 * 0.05 + 1.0);
        assert!(
            (val - expected).abs() < 1e-10,
            "Expected {}, got {}",
            expected,
            val
        );
    }

    #[test]
    fn test_index_band_assignment() {
        let composite = make_composite(0.1, 0.2, 0.05, 0.5, 0.3);
        let set = SpectralIndexCalculator::default()
            .indices(&composite)
            .into_value();

        let ndvi = set.require(IndexKind::Ndvi).unwrap().get(0, 0).unwrap();
        let ndbi = set.require(IndexKind::Ndbi).unwrap().get(0, 0).unwrap();
        let mndwi = set.require(IndexKind::Mndwi).unwrap().get(0, 0).unwrap();

        assert_relative_eq!(ndvi, 0.4 / 0.6, epsilon = 1e-10);
        assert_relative_eq!(ndbi, -0.2 / 0.8, epsilon = 1e-10);
        assert_relative_eq!(mndwi, -0.1 / 0.5, epsilon = 1e-10);
    }

    #[test]
    fn test_append_keeps_source_bands() {
        let composite = make_composite(0.1, 0.2, 0.05, 0.5, 0.3);
        let outcome = append_spectral_indices(&composite);
        assert!(!outcome.is_degraded());

        let out = outcome.into_value();
        assert_eq!(out.band_count(), composite.band_count() + 4);
        for band in Band::SPECTRAL {
            assert!(out.contains(band), "lost band {}", band);
        }
        assert!(out.contains(Band::Index(IndexKind::Evi)));
        assert_eq!(out.index_set().unwrap().len(), 4);
    }

    #[test]
    fn test_missing_band_degrades() {
        let partial = MultiBandRaster::from_bands([
            (Band::Red, make_band(2, 2, 0.1)),
            (Band::Nir, make_band(2, 2, 0.4)),
        ])
        .unwrap();

        let outcome = append_spectral_indices(&partial);
        assert!(matches!(outcome.reason(), Some(Error::MissingBand(_))));
        assert_eq!(outcome.value().band_count(), 2);

        let indices = SpectralIndexCalculator::default().indices(&partial);
        assert!(indices.is_degraded());
        assert_eq!(indices.value().shape(), Some((2, 2)));
    }
}
