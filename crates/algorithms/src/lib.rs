//! # Landclass Algorithms
//!
//! The classification engine: index derivation, rule-based labelling and
//! aggregation.
//!
//! ## Available Algorithm Categories
//!
//! - **imagery**: RGB color indices, HSV, spectral indices, downscaling
//! - **classification**: ordered rule trees, last match wins
//! - **statistics**: class statistics, zonal label histograms
//! - **remote**: catalog and export contracts for the satellite path
//! - **pipeline**: local-photograph and remote-composite pipelines

pub mod classification;
pub mod imagery;
mod maybe_rayon;
pub mod pipeline;
pub mod remote;
pub mod statistics;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classification::{
        classify_rgb_image, classify_spectral, Classifier, Comparison, Rule, RuleSet,
    };
    pub use crate::imagery::{
        append_spectral_indices, downscale_to_fit, IndexProducer, RgbIndexCalculator,
        SpectralIndexCalculator,
    };
    pub use crate::pipeline::{
        classify_local_image, classify_remote_composite, submit_export, LocalReport, RemoteReport,
    };
    pub use crate::remote::{
        CompositeRequest, DateRange, ExportAck, ExportRequest, ExportSink, ImageryCatalog,
    };
    pub use crate::statistics::{class_statistics, ClassStat, ClassStats, ZonalReducer};
    pub use landclass_core::prelude::*;
}
