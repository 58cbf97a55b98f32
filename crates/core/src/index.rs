//! Derived index rasters
//!
//! An [`IndexSet`] maps each derived index to a raster with the source's
//! shape. Producers build it once; consumers only read it.

use crate::error::{Error, Result};
use crate::raster::Raster;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Every index the engine derives, across both raster kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// Normalized difference vegetation index, (NIR - Red) / (NIR + Red)
    Ndvi,
    /// Normalized difference built-up index, (SWIR1 - NIR) / (SWIR1 + NIR)
    Ndbi,
    /// Modified normalized difference water index, (Green - SWIR1) / (Green + SWIR1)
    Mndwi,
    /// Enhanced vegetation index
    Evi,
    /// Green-red vegetation index, (G - R) / (G + R)
    Grvi,
    /// Visible atmospherically resistant index, (G - R) / (G + R - B)
    Vari,
    /// Excess green, 2G - R - B
    Exg,
    /// Triangular greenness, G - 0.39R - 0.61B
    Tgi,
    /// HSV hue, half-degrees in [0, 180)
    Hue,
    /// HSV saturation in [0, 255]
    Saturation,
    /// HSV value (brightness) in [0, 255]
    Brightness,
}

impl IndexKind {
    pub const ALL: [IndexKind; 11] = [
        IndexKind::Ndvi,
        IndexKind::Ndbi,
        IndexKind::Mndwi,
        IndexKind::Evi,
        IndexKind::Grvi,
        IndexKind::Vari,
        IndexKind::Exg,
        IndexKind::Tgi,
        IndexKind::Hue,
        IndexKind::Saturation,
        IndexKind::Brightness,
    ];

    /// Indices produced from a spectral composite
    pub const SPECTRAL: [IndexKind; 4] = [
        IndexKind::Ndvi,
        IndexKind::Ndbi,
        IndexKind::Mndwi,
        IndexKind::Evi,
    ];

    /// Indices produced from an RGB image, color transform included
    pub const RGB: [IndexKind; 7] = [
        IndexKind::Grvi,
        IndexKind::Vari,
        IndexKind::Exg,
        IndexKind::Tgi,
        IndexKind::Hue,
        IndexKind::Saturation,
        IndexKind::Brightness,
    ];

    /// Name used when the index is appended as a band
    pub fn band_name(&self) -> &'static str {
        match self {
            IndexKind::Ndvi => "NDVI",
            IndexKind::Ndbi => "NDBI",
            IndexKind::Mndwi => "MNDWI",
            IndexKind::Evi => "EVI",
            IndexKind::Grvi => "GRVI",
            IndexKind::Vari => "VARI",
            IndexKind::Exg => "EXG",
            IndexKind::Tgi => "TGI",
            IndexKind::Hue => "HUE",
            IndexKind::Saturation => "SATURATION",
            IndexKind::Brightness => "BRIGHTNESS",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.band_name())
    }
}

/// A read-only collection of same-shaped index rasters.
///
/// A set may declare the shape of the raster it was derived from, so that
/// even an empty set still knows how large its classification must be.
#[derive(Debug, Clone, Default)]
pub struct IndexSet {
    source_shape: Option<(usize, usize)>,
    indices: BTreeMap<IndexKind, Raster<f64>>,
}

impl IndexSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty set derived from a `rows × cols` source
    pub fn with_shape(rows: usize, cols: usize) -> Self {
        Self {
            source_shape: Some((rows, cols)),
            indices: BTreeMap::new(),
        }
    }

    /// Add an index. All members must share one shape.
    pub fn insert(&mut self, kind: IndexKind, raster: Raster<f64>) -> Result<()> {
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
        self.indices.insert(kind, raster);
        Ok(())
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, kind: IndexKind, raster: Raster<f64>) -> Result<Self> {
        self.insert(kind, raster)?;
        Ok(self)
    }

    pub fn get(&self, kind: IndexKind) -> Option<&Raster<f64>> {
        self.indices.get(&kind)
    }

    /// Like [`get`](Self::get) but a missing index is an error.
    pub fn require(&self, kind: IndexKind) -> Result<&Raster<f64>> {
        self.get(kind)
            .ok_or_else(|| Error::MissingIndex(kind.band_name().to_string()))
    }

    pub fn contains(&self, kind: IndexKind) -> bool {
        self.indices.contains_key(&kind)
    }

    /// Shared (rows, cols): the declared source shape, else that of the
    /// first member, else `None`.
    pub fn shape(&self) -> Option<(usize, usize)> {
        self.source_shape
            .or_else(|| self.indices.values().next().map(|r| r.shape()))
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = IndexKind> + '_ {
        self.indices.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IndexKind, &Raster<f64>)> {
        self.indices.iter().map(|(k, r)| (*k, r))
    }
}
