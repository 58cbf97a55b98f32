//! Engine configuration
//!
//! Built once at startup and passed by reference into every component call.
//! Nothing in the engine reads global state; alternate threshold sets are
//! just alternate `EngineConfig` values.

use crate::error::{Error, Result};
use crate::labels::LabelRegistry;
use crate::raster::Sensor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Inclusive hue interval, half-degrees in [0, 180).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HueBand {
    pub min: f64,
    pub max: f64,
}

impl HueBand {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Dark, strongly green pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RgbForestRule {
    /// GRVI must exceed this
    pub grvi_min: f64,
    /// TGI must exceed this
    pub tgi_min: f64,
    pub hue: HueBand,
    pub saturation_min: f64,
    pub brightness_min: f64,
}

impl Default for RgbForestRule {
    fn default() -> Self {
        Self {
            grvi_min: 0.1,
            tgi_min: 10.0,
            hue: HueBand::new(40.0, 80.0),
            saturation_min: 50.0,
            brightness_min: 30.0,
        }
    }
}

/// Moderately green to yellow-green pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RgbAgricultureRule {
    /// Exclusive lower GRVI bound
    pub grvi_min: f64,
    /// Inclusive upper GRVI bound
    pub grvi_max: f64,
    /// ExG must exceed this
    pub exg_min: f64,
    pub hue: HueBand,
    pub saturation_min: f64,
    pub brightness_min: f64,
}

impl Default for RgbAgricultureRule {
    fn default() -> Self {
        Self {
            grvi_min: 0.05,
            grvi_max: 0.1,
            exg_min: 0.0,
            hue: HueBand::new(30.0, 90.0),
            saturation_min: 30.0,
            brightness_min: 40.0,
        }
    }
}

/// Low-color, bright pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RgbUrbanRule {
    /// GRVI must stay below this
    pub grvi_max: f64,
    /// Saturation must stay below this
    pub saturation_max: f64,
    pub brightness_min: f64,
}

impl Default for RgbUrbanRule {
    fn default() -> Self {
        Self {
            grvi_max: 0.05,
            saturation_max: 50.0,
            brightness_min: 60.0,
        }
    }
}

/// Blue pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RgbWaterRule {
    pub hue: HueBand,
    pub saturation_min: f64,
    pub brightness_min: f64,
}

impl Default for RgbWaterRule {
    fn default() -> Self {
        Self {
            hue: HueBand::new(100.0, 130.0),
            saturation_min: 40.0,
            brightness_min: 30.0,
        }
    }
}

/// Thresholds of the RGB rule tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RgbThresholds {
    pub forest: RgbForestRule,
    pub agriculture: RgbAgricultureRule,
    pub urban: RgbUrbanRule,
    pub water: RgbWaterRule,
}

/// Thresholds of the spectral rule tree. All comparisons are strict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralThresholds {
    pub forest_ndvi_min: f64,
    pub forest_evi_min: f64,
    pub agriculture_ndvi_min: f64,
    pub agriculture_ndvi_max: f64,
    pub agriculture_evi_min: f64,
    pub urban_ndbi_min: f64,
    pub urban_ndvi_max: f64,
    pub water_mndwi_min: f64,
}

impl Default for SpectralThresholds {
    fn default() -> Self {
        Self {
            forest_ndvi_min: 0.6,
            forest_evi_min: 0.3,
            agriculture_ndvi_min: 0.3,
            agriculture_ndvi_max: 0.6,
            agriculture_evi_min: 0.2,
            urban_ndbi_min: 0.1,
            urban_ndvi_max: 0.3,
            water_mndwi_min: 0.3,
        }
    }
}

/// Ground sampling parameters. These depend on the source imagery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundResolution {
    /// Ground area represented by one pixel, km²
    pub pixel_area_km2: f64,
    /// Ground sampling distance, meters per pixel
    pub scale_m: f64,
    /// Largest pixel count a zonal reduction or export may touch
    pub max_pixels: u64,
}

impl Default for GroundResolution {
    fn default() -> Self {
        Self {
            pixel_area_km2: 0.0009,
            scale_m: 30.0,
            max_pixels: 100_000_000,
        }
    }
}

impl GroundResolution {
    /// km² covered by one square pixel of side `scale_m` meters
    pub fn pixel_area_for_scale(scale_m: f64) -> f64 {
        scale_m * scale_m / 1_000_000.0
    }

    /// Resolution whose pixel area follows from `scale_m`
    pub fn from_scale(scale_m: f64) -> Self {
        Self {
            pixel_area_km2: Self::pixel_area_for_scale(scale_m),
            scale_m,
            ..Self::default()
        }
    }
}

/// Local-image handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagingConfig {
    /// Longer image side, in pixels, above which images are downscaled
    pub max_image_size: usize,
    /// Classification weight in the overlay blend, in [0, 1]
    pub overlay_alpha: f64,
    /// Accepted file extensions, lower case
    pub supported_formats: Vec<String>,
}

impl Default for ImagingConfig {
    fn default() -> Self {
        Self {
            max_image_size: 5000,
            overlay_alpha: 0.5,
            supported_formats: ["jpg", "jpeg", "png", "tif", "tiff"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ImagingConfig {
    /// Whether `path` carries one of the accepted extensions
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .map_or(false, |e| self.supported_formats.iter().any(|f| *f == e))
    }
}

/// A satellite collection the imagery catalog can composite from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionEntry {
    /// Catalog identifier
    pub id: String,
    pub sensor: Sensor,
    /// Scene property holding the cloud-cover percentage
    pub cloud_property: String,
}

/// Named collections plus the one used when a name is unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SatelliteCollections {
    pub default: String,
    pub entries: BTreeMap<String, CollectionEntry>,
}

impl Default for SatelliteCollections {
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            "sentinel2".to_string(),
            CollectionEntry {
                id: "COPERNICUS/S2_SR".to_string(),
                sensor: Sensor::Sentinel2,
                cloud_property: "CLOUDY_PIXEL_PERCENTAGE".to_string(),
            },
        );
        entries.insert(
            "landsat8".to_string(),
            CollectionEntry {
                id: "LANDSAT/LC08/C02/T1_L2".to_string(),
                sensor: Sensor::Landsat8,
                cloud_property: "CLOUD_COVER".to_string(),
            },
        );
        entries.insert(
            "landsat9".to_string(),
            CollectionEntry {
                id: "LANDSAT/LC09/C02/T1_L2".to_string(),
                sensor: Sensor::Landsat9,
                cloud_property: "CLOUD_COVER".to_string(),
            },
        );
        Self {
            default: "sentinel2".to_string(),
            entries,
        }
    }
}

impl SatelliteCollections {
    /// Entry for `name`, or the default entry when `name` is unknown.
    pub fn resolve(&self, name: &str) -> Option<&CollectionEntry> {
        self.entries
            .get(name)
            .or_else(|| self.entries.get(&self.default))
    }
}

/// Everything the engine needs besides the raster itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub labels: LabelRegistry,
    pub rgb: RgbThresholds,
    pub spectral: SpectralThresholds,
    pub ground: GroundResolution,
    pub imaging: ImagingConfig,
    pub collections: SatelliteCollections,
}

impl EngineConfig {
    /// Parse and validate a JSON document; absent fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Same configuration with a different per-pixel ground area
    pub fn with_pixel_area(mut self, pixel_area_km2: f64) -> Self {
        self.ground.pixel_area_km2 = pixel_area_km2;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let alpha = self.imaging.overlay_alpha;
        if !(0.0..=1.0).contains(&alpha) {
            return Err(Error::InvalidParameter {
                name: "imaging.overlay_alpha",
                value: alpha.to_string(),
                reason: "must be within [0, 1]".into(),
            });
        }
        if !(self.ground.pixel_area_km2 > 0.0) {
            return Err(Error::InvalidParameter {
                name: "ground.pixel_area_km2",
                value: self.ground.pixel_area_km2.to_string(),
                reason: "must be positive".into(),
            });
        }
        if !(self.ground.scale_m > 0.0) {
            return Err(Error::InvalidParameter {
                name: "ground.scale_m",
                value: self.ground.scale_m.to_string(),
                reason: "must be positive".into(),
            });
        }
        if self.imaging.max_image_size == 0 {
            return Err(Error::InvalidParameter {
                name: "imaging.max_image_size",
                value: "0".into(),
                reason: "must be positive".into(),
            });
        }

        let entries = self.labels.entries();
        if entries.is_empty() {
            return Err(Error::Config("label registry is empty".into()));
        }
        if !entries.iter().any(|e| e.id == 0) {
            return Err(Error::Config("label registry has no background (id 0) entry".into()));
        }
        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|e| e.id == entry.id) {
                return Err(Error::Config(format!("duplicate label id {}", entry.id)));
            }
            if !is_hex_color(&entry.color) {
                return Err(Error::Config(format!(
                    "label '{}' has invalid color '{}'",
                    entry.key, entry.color
                )));
            }
        }

        if self.collections.resolve(&self.collections.default).is_none() {
            return Err(Error::Config(format!(
                "default collection '{}' is not defined",
                self.collections.default
            )));
        }
        Ok(())
    }
}

/// `#RRGGBB`
fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::LabelEntry;

    #[test]
    fn default_config_is_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn pixel_area_matches_scale() {
        let area = GroundResolution::pixel_area_for_scale(30.0);
        assert!((area - 0.0009).abs() < 1e-12);
        let ground = GroundResolution::from_scale(10.0);
        assert!((ground.pixel_area_km2 - 0.0001).abs() < 1e-12);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{ "ground": { "pixel_area_km2": 0.0001 }, "rgb": { "urban": { "saturation_max": 40 } } }"#,
        )
        .unwrap();
        assert!((config.ground.pixel_area_km2 - 0.0001).abs() < 1e-12);
        assert_eq!(config.ground.scale_m, 30.0);
        assert_eq!(config.rgb.urban.saturation_max, 40.0);
        assert_eq!(config.rgb.urban.brightness_min, 60.0);
        assert_eq!(config.rgb.forest, RgbForestRule::default());
        assert_eq!(config.labels, LabelRegistry::default());
    }

    #[test]
    fn json_round_trip() {
        let config = EngineConfig::default();
        let json = config.to_json_pretty().unwrap();
        assert_eq!(EngineConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn rejects_out_of_range_alpha() {
        let mut config = EngineConfig::default();
        config.imaging.overlay_alpha = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_registry_without_background() {
        let mut config = EngineConfig::default();
        config.labels = LabelRegistry::new(vec![LabelEntry::new(1, "a", "A", "#000000")]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_duplicate_ids_and_bad_colors() {
        let mut config = EngineConfig::default();
        config.labels = LabelRegistry::new(vec![
            LabelEntry::new(0, "other", "Other", "#D3D3D3"),
            LabelEntry::new(0, "water", "Water", "#4169E1"),
        ]);
        assert!(config.validate().is_err());

        config.labels = LabelRegistry::new(vec![LabelEntry::new(0, "other", "Other", "gray")]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_collection_resolves_to_default() {
        let collections = SatelliteCollections::default();
        assert_eq!(collections.resolve("landsat8").unwrap().sensor, Sensor::Landsat8);
        assert_eq!(collections.resolve("modis").unwrap().id, "COPERNICUS/S2_SR");
    }

    #[test]
    fn supported_extensions() {
        let imaging = ImagingConfig::default();
        assert!(imaging.is_supported(Path::new("scene.TIF")));
        assert!(!imaging.is_supported(Path::new("scene.bmp")));
        assert!(!imaging.is_supported(Path::new("scene")));
    }
}
