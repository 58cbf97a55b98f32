//! Aggregation of label rasters
//!
//! - **class_stats**: per-class pixel counts, percentages and areas
//! - **zonal**: label histograms over a geographic region

mod class_stats;
mod zonal;

pub use class_stats::{class_statistics, stats_from_histogram, ClassStat, ClassStats, Histogram};
pub use zonal::{
    frequency_histogram, histogram_from_keyed, LocalZonalReducer, RegionWindow, ZonalReducer,
};
