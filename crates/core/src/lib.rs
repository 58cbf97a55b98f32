//! # landclass core
//!
//! Shared types for the land-cover classification engine:
//! - [`Raster`], [`MultiBandRaster`] and [`PixelImage`]: single-band grids,
//!   named band stacks and interleaved 8-bit images
//! - [`IndexSet`]: derived index rasters keyed by [`IndexKind`]
//! - [`LabelRegistry`]: label ids, names and display colors
//! - [`EngineConfig`]: thresholds, ground resolution and registry, passed
//!   explicitly into every component
//! - [`Outcome`]: success-or-degraded results
//! - TIFF, PNG and JPEG I/O for the ingestion boundary

pub mod config;
pub mod error;
pub mod index;
pub mod io;
pub mod labels;
pub mod outcome;
pub mod raster;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use index::{IndexKind, IndexSet};
pub use labels::{ClassLabel, LabelEntry, LabelRegistry};
pub use outcome::Outcome;
pub use raster::{Band, Bounds, MultiBandRaster, PixelImage, Raster, RasterElement, Sensor};

/// Label raster: one registry id per cell
pub type Classification = Raster<u8>;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::error::{Error, Result};
    pub use crate::index::{IndexKind, IndexSet};
    pub use crate::labels::{ClassLabel, LabelRegistry};
    pub use crate::outcome::Outcome;
    pub use crate::raster::{Band, Bounds, MultiBandRaster, PixelImage, Raster};
    pub use crate::Classification;
}
