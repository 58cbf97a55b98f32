//! Per-class pixel counts, shares and area estimates

use super::zonal::frequency_histogram;
use landclass_core::{Classification, Error, LabelRegistry, Outcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label value to pixel count
pub type Histogram = BTreeMap<u8, u64>;

/// Summary of one label value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassStat {
    pub id: u8,
    /// Registry key, `"other"` for unregistered values
    pub key: String,
    /// Display name from the registry
    pub name: String,
    pub pixels: u64,
    /// Share of all counted pixels, rounded to 2 decimals
    pub percentage: f64,
    /// `pixels × pixel area`, rounded to 4 decimals
    pub area_km2: f64,
}

/// Statistics for every label value present, keyed by value.
///
/// Values outside the registry are still counted; they carry the
/// fallback key and name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassStats {
    pub classes: BTreeMap<u8, ClassStat>,
    pub total_pixels: u64,
}

impl ClassStats {
    pub fn get(&self, id: u8) -> Option<&ClassStat> {
        self.classes.get(&id)
    }

    /// First class with the given registry key
    pub fn by_key(&self, key: &str) -> Option<&ClassStat> {
        self.classes.values().find(|c| c.key == key)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Classes in ascending label order
    pub fn iter(&self) -> impl Iterator<Item = &ClassStat> {
        self.classes.values()
    }

    pub fn pixel_sum(&self) -> u64 {
        self.classes.values().map(|c| c.pixels).sum()
    }

    pub fn percentage_sum(&self) -> f64 {
        self.classes.values().map(|c| c.percentage).sum()
    }

    pub fn area_sum(&self) -> f64 {
        self.classes.values().map(|c| c.area_km2).sum()
    }
}

/// Turn a histogram into [`ClassStats`], with `pixel_area_km2` per pixel.
pub fn stats_from_histogram(
    histogram: &Histogram,
    registry: &LabelRegistry,
    pixel_area_km2: f64,
) -> ClassStats {
    let total: u64 = histogram.values().sum();
    let classes = histogram
        .iter()
        .filter(|(_, n)| **n > 0)
        .map(|(&id, &pixels)| {
            let share = 100.0 * pixels as f64 / total as f64;
            let stat = ClassStat {
                id,
                key: registry.key_for(id).to_string(),
                name: registry.name_for(id).to_string(),
                pixels,
                percentage: round_to(share, 2),
                area_km2: round_to(pixels as f64 * pixel_area_km2, 4),
            };
            (id, stat)
        })
        .collect();

    ClassStats {
        classes,
        total_pixels: total,
    }
}

/// Aggregate a label raster into per-class statistics.
///
/// An empty raster or an unusable pixel area degrades to empty stats.
pub fn class_statistics(
    classification: &Classification,
    registry: &LabelRegistry,
    pixel_area_km2: f64,
) -> Outcome<ClassStats> {
    if classification.is_empty() {
        return Outcome::degraded(
            ClassStats::default(),
            Error::EmptyInput("classification has no pixels"),
        );
    }
    if !pixel_area_km2.is_finite() || pixel_area_km2 < 0.0 {
        return Outcome::degraded(
            ClassStats::default(),
            Error::InvalidParameter {
                name: "pixel_area_km2",
                value: pixel_area_km2.to_string(),
                reason: "must be a finite, non-negative area".into(),
            },
        );
    }

    let histogram = frequency_histogram(classification, None);
    Outcome::Complete(stats_from_histogram(&histogram, registry, pixel_area_km2))
}

/// Round to `decimals` places, halves to even.
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
