//! Built-in rule trees
//!
//! Both trees are applied agriculture, urban, forest, water: built-up and
//! water signatures override a merely plausible vegetation reading.

use super::rules::{Comparison, Precision, Rule, RuleSet};
use landclass_core::config::{RgbThresholds, SpectralThresholds};
use landclass_core::{ClassLabel, IndexKind};

/// Rule tree over GRVI, ExG, TGI and HSV for RGB photographs.
///
/// Thresholds are compared at single precision, matching how the RGB
/// indices are computed.
pub fn rgb_rules(t: &RgbThresholds) -> RuleSet {
    let agriculture = Rule::new(ClassLabel::Agricultural.id())
        .when(
            IndexKind::Grvi,
            Comparison::above_up_to(t.agriculture.grvi_min, t.agriculture.grvi_max),
        )
        .when(IndexKind::Exg, Comparison::Gt(t.agriculture.exg_min))
        .when(
            IndexKind::Hue,
            Comparison::inclusive(t.agriculture.hue.min, t.agriculture.hue.max),
        )
        .when(IndexKind::Saturation, Comparison::Gt(t.agriculture.saturation_min))
        .when(IndexKind::Brightness, Comparison::Gt(t.agriculture.brightness_min));

    let urban = Rule::new(ClassLabel::Urban.id())
        .when(IndexKind::Grvi, Comparison::Lt(t.urban.grvi_max))
        .when(IndexKind::Saturation, Comparison::Lt(t.urban.saturation_max))
        .when(IndexKind::Brightness, Comparison::Gt(t.urban.brightness_min));

    let forest = Rule::new(ClassLabel::Forest.id())
        .when(IndexKind::Grvi, Comparison::Gt(t.forest.grvi_min))
        .when(IndexKind::Tgi, Comparison::Gt(t.forest.tgi_min))
        .when(
            IndexKind::Hue,
            Comparison::inclusive(t.forest.hue.min, t.forest.hue.max),
        )
        .when(IndexKind::Saturation, Comparison::Gt(t.forest.saturation_min))
        .when(IndexKind::Brightness, Comparison::Gt(t.forest.brightness_min));

    let water = Rule::new(ClassLabel::Water.id())
        .when(
            IndexKind::Hue,
            Comparison::inclusive(t.water.hue.min, t.water.hue.max),
        )
        .when(IndexKind::Saturation, Comparison::Gt(t.water.saturation_min))
        .when(IndexKind::Brightness, Comparison::Gt(t.water.brightness_min));

    RuleSet::new(vec![agriculture, urban, forest, water]).with_precision(Precision::Single)
}

/// Rule tree over NDVI, NDBI, MNDWI and EVI for spectral composites.
pub fn spectral_rules(t: &SpectralThresholds) -> RuleSet {
    let agriculture = Rule::new(ClassLabel::Agricultural.id())
        .when(
            IndexKind::Ndvi,
            Comparison::exclusive(t.agriculture_ndvi_min, t.agriculture_ndvi_max),
        )
        .when(IndexKind::Evi, Comparison::Gt(t.agriculture_evi_min));

    let urban = Rule::new(ClassLabel::Urban.id())
        .when(IndexKind::Ndbi, Comparison::Gt(t.urban_ndbi_min))
        .when(IndexKind::Ndvi, Comparison::Lt(t.urban_ndvi_max));

    let forest = Rule::new(ClassLabel::Forest.id())
        .when(IndexKind::Ndvi, Comparison::Gt(t.forest_ndvi_min))
        .when(IndexKind::Evi, Comparison::Gt(t.forest_evi_min));

    let water = Rule::new(ClassLabel::Water.id())
        .when(IndexKind::Mndwi, Comparison::Gt(t.water_mndwi_min));

    RuleSet::new(vec![agriculture, urban, forest, water])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(rules: &RuleSet) -> Vec<u8> {
        rules.rules().iter().map(|r| r.label).collect()
    }

    #[test]
    fn application_order() {
        let expected = vec![1, 2, 3, 4];
        assert_eq!(labels(&rgb_rules(&RgbThresholds::default())), expected);
        assert_eq!(labels(&spectral_rules(&SpectralThresholds::default())), expected);
    }

    #[test]
    fn rgb_tree_reads_color_indices_only() {
        let kinds = rgb_rules(&RgbThresholds::default()).required_indices();
        assert_eq!(
            kinds,
            vec![
                IndexKind::Grvi,
                IndexKind::Exg,
                IndexKind::Tgi,
                IndexKind::Hue,
                IndexKind::Saturation,
                IndexKind::Brightness
            ]
        );
    }

    #[test]
    fn spectral_pixels() {
        let rules = spectral_rules(&SpectralThresholds::default());
        let pixel = |ndvi: f64, ndbi: f64, mndwi: f64, evi: f64| {
            rules.label_for(|k| match k {
                IndexKind::Ndvi => ndvi,
                IndexKind::Ndbi => ndbi,
                IndexKind::Mndwi => mndwi,
                IndexKind::Evi => evi,
                _ => f64::NAN,
            })
        };

        assert_eq!(pixel(0.7, -0.2, -0.3, 0.4), 3, "forest");
        assert_eq!(pixel(0.45, -0.1, -0.2, 0.25), 1, "agriculture");
        assert_eq!(pixel(0.1, 0.2, -0.1, 0.05), 2, "urban");
        assert_eq!(pixel(-0.2, -0.3, 0.5, -0.1), 4, "water");
        assert_eq!(pixel(0.2, 0.0, 0.0, 0.1), 0, "background");
        // Exactly 0.6 is neither agriculture (open interval) nor forest.
        assert_eq!(pixel(0.6, 0.0, 0.0, 0.5), 0);
        // Agriculture overridden by water.
        assert_eq!(pixel(0.45, -0.1, 0.4, 0.25), 4);
        // NaN indices (zero-sum bands) match nothing.
        assert_eq!(pixel(f64::NAN, f64::NAN, f64::NAN, f64::NAN), 0);
    }
}
