//! Raster and photograph reading and writing
//!
//! The engine itself never touches files; these helpers sit at the
//! ingestion boundary and hand in-memory rasters to it.

mod native;

pub use native::{
    read_band, read_band_from_buffer, read_image, read_image_from_buffer, write_band,
    write_image, write_image_to_buffer, write_labels, write_labels_to_buffer,
};
