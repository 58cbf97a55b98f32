//! Rule-based land-cover classification
//!
//! - **rules**: ordered `(conditions, label)` evaluator, last match wins
//! - **presets**: the RGB and spectral rule trees built from thresholds
//! - **classifier**: one `classify(IndexSet)` for both raster kinds

mod classifier;
mod presets;
mod rules;

pub use classifier::{classify_rgb_image, classify_spectral, Classifier};
pub use presets::{rgb_rules, spectral_rules};
pub use rules::{Comparison, Condition, Precision, Rule, RuleSet};
