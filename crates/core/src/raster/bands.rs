//! Named bands and multi-band rasters
//!
//! Past ingestion, bands are addressed by physical meaning (`RED`, `NIR`, ...)
//! rather than position. Derived indices are appended to the same raster
//! under their own names, so source bands stay reachable.

use crate::error::{Error, Result};
use crate::index::{IndexKind, IndexSet};
use crate::raster::{Bounds, Raster};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Physical meaning of a band, or a derived index appended as a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Band {
    Red,
    Green,
    Blue,
    /// Near-infrared
    Nir,
    /// Shortwave infrared, ~1.6 µm
    Swir1,
    /// Shortwave infrared, ~2.2 µm
    Swir2,
    /// A derived index stored alongside the source bands
    Index(IndexKind),
}

impl Band {
    /// The six reflectance bands a spectral composite must expose.
    pub const SPECTRAL: [Band; 6] = [
        Band::Red,
        Band::Green,
        Band::Blue,
        Band::Nir,
        Band::Swir1,
        Band::Swir2,
    ];

    /// Upper-case band name (`"NIR"`, `"SWIR1"`, `"NDVI"`, ...)
    pub fn name(&self) -> &'static str {
        match self {
            Band::Red => "RED",
            Band::Green => "GREEN",
            Band::Blue => "BLUE",
            Band::Nir => "NIR",
            Band::Swir1 => "SWIR1",
            Band::Swir2 => "SWIR2",
            Band::Index(kind) => kind.band_name(),
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Band {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RED" | "R" => Ok(Band::Red),
            "GREEN" | "G" => Ok(Band::Green),
            "BLUE" | "B" => Ok(Band::Blue),
            "NIR" => Ok(Band::Nir),
            "SWIR1" => Ok(Band::Swir1),
            "SWIR2" => Ok(Band::Swir2),
            other => IndexKind::ALL
                .iter()
                .find(|k| k.band_name() == other)
                .map(|k| Band::Index(*k))
                .ok_or_else(|| Error::MissingBand(s.to_string())),
        }
    }
}

/// Satellite sensors whose native band identifiers we know how to map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensor {
    Sentinel2,
    Landsat8,
    Landsat9,
}

impl Sensor {
    /// Native band identifier for a physical band (`None` for index bands).
    pub fn band_id(&self, band: Band) -> Option<&'static str> {
        let id = match (self, band) {
            (Sensor::Sentinel2, Band::Blue) => "B2",
            (Sensor::Sentinel2, Band::Green) => "B3",
            (Sensor::Sentinel2, Band::Red) => "B4",
            (Sensor::Sentinel2, Band::Nir) => "B8",
            (Sensor::Sentinel2, Band::Swir1) => "B11",
            (Sensor::Sentinel2, Band::Swir2) => "B12",
            (Sensor::Landsat8 | Sensor::Landsat9, Band::Blue) => "SR_B2",
            (Sensor::Landsat8 | Sensor::Landsat9, Band::Green) => "SR_B3",
            (Sensor::Landsat8 | Sensor::Landsat9, Band::Red) => "SR_B4",
            (Sensor::Landsat8 | Sensor::Landsat9, Band::Nir) => "SR_B5",
            (Sensor::Landsat8 | Sensor::Landsat9, Band::Swir1) => "SR_B6",
            (Sensor::Landsat8 | Sensor::Landsat9, Band::Swir2) => "SR_B7",
            (_, Band::Index(_)) => return None,
        };
        Some(id)
    }

    /// Physical band for a native identifier, case-insensitive.
    pub fn band_for_id(&self, id: &str) -> Option<Band> {
        Band::SPECTRAL
            .iter()
            .copied()
            .find(|b| self.band_id(*b).map_or(false, |n| n.eq_ignore_ascii_case(id)))
    }
}

/// A stack of same-shaped, named `f64` bands.
///
/// Insertion order is preserved; inserting under an existing name replaces
/// that band only.
#[derive(Debug, Clone, Default)]
pub struct MultiBandRaster {
    bands: Vec<(Band, Raster<f64>)>,
    bounds: Option<Bounds>,
}

impl MultiBandRaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(band, raster)` pairs, enforcing a common shape.
    pub fn from_bands<I>(bands: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Band, Raster<f64>)>,
    {
        let mut out = Self::new();
        for (band, raster) in bands {
            out.insert(band, raster)?;
        }
        Ok(out)
    }

    /// Attach the geographic rectangle this raster covers.
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn bounds(&self) -> Option<&Bounds> {
        self.bounds.as_ref()
    }

    /// Common (rows, cols), or `None` while no band is present.
    pub fn shape(&self) -> Option<(usize, usize)> {
        self.bands.first().map(|(_, r)| r.shape())
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Band names in insertion order
    pub fn names(&self) -> Vec<Band> {
        self.bands.iter().map(|(b, _)| *b).collect()
    }

    pub fn band(&self, band: Band) -> Option<&Raster<f64>> {
        self.bands.iter().find(|(b, _)| *b == band).map(|(_, r)| r)
    }

    /// Like [`band`](Self::band) but a missing band is an error.
    pub fn require(&self, band: Band) -> Result<&Raster<f64>> {
        self.band(band)
            .ok_or_else(|| Error::MissingBand(band.name().to_string()))
    }

    pub fn contains(&self, band: Band) -> bool {
        self.band(band).is_some()
    }

    /// Insert or replace a band. The raster must match the existing shape.
    pub fn insert(&mut self, band: Band, raster: Raster<f64>) -> Result<()> {
        if let Some((rows, cols)) = self.shape() {
            if raster.shape() != (rows, cols) {
                return Err(Error::SizeMismatch {
                    er: rows,
                    ec: cols,
                    ar: raster.rows(),
                    ac: raster.cols(),
                });
            }
        }
        match self.bands.iter_mut().find(|(b, _)| *b == band) {
            Some(slot) => slot.1 = raster,
            None => self.bands.push((band, raster)),
        }
        Ok(())
    }

    /// Append every index of `indices` as an [`Band::Index`] band.
    pub fn append_indices(&mut self, indices: &IndexSet) -> Result<()> {
        for (kind, raster) in indices.iter() {
            self.insert(Band::Index(kind), raster.clone())?;
        }
        Ok(())
    }

    /// The appended index bands, gathered back into an [`IndexSet`] of the
    /// stack's shape.
    pub fn index_set(&self) -> Result<IndexSet> {
        let mut set = match self.shape() {
            Some((rows, cols)) => IndexSet::with_shape(rows, cols),
            None => IndexSet::new(),
        };
        for (band, raster) in &self.bands {
            if let Band::Index(kind) = band {
                set.insert(*kind, raster.clone())?;
            }
        }
        Ok(set)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Band, &Raster<f64>)> {
        self.bands.iter().map(|(b, r)| (*b, r))
    }
}
