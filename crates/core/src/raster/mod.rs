//! Raster data structures

mod bands;
mod bounds;
mod element;
mod grid;
mod image;

pub use bands::{Band, MultiBandRaster, Sensor};
pub use bounds::Bounds;
pub use element::RasterElement;
pub use grid::Raster;
pub use image::PixelImage;
