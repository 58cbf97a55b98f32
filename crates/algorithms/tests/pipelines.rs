//! End-to-end runs of the local and remote pipelines with in-memory
//! collaborators.

use landclass_algorithms::pipeline::{
    classify_local_image, classify_remote_composite, submit_export,
};
use landclass_algorithms::remote::{
    CompositeRequest, DateRange, ExportAck, ExportRequest, ExportSink, ImageryCatalog,
};
use landclass_core::{
    Band, Bounds, ClassLabel, EngineConfig, IndexKind, MultiBandRaster, PixelImage, Raster, Result,
};
use std::cell::RefCell;

/// Catalog returning a fixed 8x8 composite: vegetation in the west half,
/// water in the east half.
struct FixedCatalog {
    composite: Option<MultiBandRaster>,
    seen: RefCell<Vec<String>>,
}

impl FixedCatalog {
    fn with_scene() -> Self {
        let split = |west: f64, east: f64| Raster::from_fn(8, 8, |_, c| if c < 4 { west } else { east });
        let composite = MultiBandRaster::from_bands([
            (Band::Red, split(0.05, 0.03)),
            (Band::Green, split(0.08, 0.10)),
            (Band::Blue, split(0.03, 0.08)),
            (Band::Nir, split(0.45, 0.02)),
            (Band::Swir1, split(0.20, 0.01)),
            (Band::Swir2, split(0.10, 0.01)),
        ])
        .unwrap()
        .with_bounds(Bounds::new(34.0, 31.0, 35.0, 32.0).unwrap());
        Self {
            composite: Some(composite),
            seen: RefCell::new(Vec::new()),
        }
    }

    fn empty() -> Self {
        Self {
            composite: None,
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl ImageryCatalog for FixedCatalog {
    fn composite(&self, request: &CompositeRequest) -> Result<Option<MultiBandRaster>> {
        self.seen.borrow_mut().push(request.collection.id.clone());
        Ok(self.composite.clone())
    }
}

#[derive(Default)]
struct RecordingSink {
    submitted: RefCell<Vec<(String, String, usize)>>,
}

impl ExportSink for RecordingSink {
    fn submit(&self, request: &ExportRequest<'_>) -> Result<ExportAck> {
        self.submitted.borrow_mut().push((
            request.folder.clone(),
            request.crs.clone(),
            request.classification.len(),
        ));
        Ok(ExportAck {
            task_id: format!("task-{}", request.description),
            message: format!("Export task started: {}", request.description),
        })
    }
}

fn request(config: &EngineConfig, bounds: Bounds) -> CompositeRequest {
    let dates = DateRange::parse("2024-03-01", "2024-05-31").unwrap();
    CompositeRequest::for_collection(bounds, dates, &config.collections, "sentinel2").unwrap()
}

#[test]
fn remote_composite_whole_extent() {
    let config = EngineConfig::default();
    let catalog = FixedCatalog::with_scene();
    let bounds = Bounds::new(34.0, 31.0, 35.0, 32.0).unwrap();

    let report = classify_remote_composite(&catalog, &request(&config, bounds), &config)
        .unwrap()
        .expect("scene available");

    assert_eq!(catalog.seen.borrow().as_slice(), ["COPERNICUS/S2_SR"]);
    assert!(!report.classification.is_degraded());
    for kind in [IndexKind::Ndvi, IndexKind::Ndbi, IndexKind::Mndwi, IndexKind::Evi] {
        assert!(report.composite.contains(Band::Index(kind)), "missing {}", kind);
    }
    assert!(report.composite.contains(Band::Swir2));

    let labels = report.classification.value();
    assert_eq!(labels.get(0, 0).unwrap(), ClassLabel::Forest.id());
    assert_eq!(labels.get(7, 7).unwrap(), ClassLabel::Water.id());

    assert_eq!(report.stats.total_pixels, 64);
    assert_eq!(report.stats.by_key("forest").unwrap().pixels, 32);
    assert_eq!(report.stats.by_key("water").unwrap().percentage, 50.0);
    assert_eq!(report.histogram.values().sum::<u64>(), 64);
}

#[test]
fn remote_composite_clipped_region() {
    let config = EngineConfig::default();
    let catalog = FixedCatalog::with_scene();
    // Western half of the scene only.
    let bounds = Bounds::new(33.5, 31.0, 34.5, 32.0).unwrap();

    let report = classify_remote_composite(&catalog, &request(&config, bounds), &config)
        .unwrap()
        .unwrap();
    assert_eq!(report.stats.len(), 1);
    assert_eq!(report.stats.get(ClassLabel::Forest.id()).unwrap().pixels, 32);
}

#[test]
fn remote_without_imagery_is_none() {
    let config = EngineConfig::default();
    let bounds = Bounds::new(34.0, 31.0, 35.0, 32.0).unwrap();
    let result = classify_remote_composite(&FixedCatalog::empty(), &request(&config, bounds), &config)
        .unwrap();
    assert!(result.is_none());
}

#[test]
fn export_uses_defaults() {
    let config = EngineConfig::default();
    let sink = RecordingSink::default();
    let labels = Raster::<u8>::filled(5, 5, ClassLabel::Water.id());
    let bounds = Bounds::new(34.0, 31.0, 35.0, 32.0).unwrap();

    let request = ExportRequest::new(&labels, bounds, "landclass_run", &config.ground);
    let ack = submit_export(&sink, &request).unwrap();
    assert_eq!(ack.message, "Export task started: landclass_run");
    assert_eq!(
        sink.submitted.borrow().as_slice(),
        [("earth_engine_exports".to_string(), "EPSG:4326".to_string(), 25)]
    );

    let blank = ExportRequest::new(&labels, bounds, "  ", &config.ground);
    assert!(submit_export(&sink, &blank).is_err());
    let escaping = ExportRequest::new(&labels, bounds, "../landclass_run", &config.ground);
    assert!(submit_export(&sink, &escaping).is_err());
    assert_eq!(sink.submitted.borrow().len(), 1);
}

#[test]
fn export_destination_overrides() {
    let config = EngineConfig::default();
    let sink = RecordingSink::default();
    let labels = Raster::<u8>::filled(2, 3, ClassLabel::Urban.id());
    let bounds = Bounds::new(34.0, 31.0, 35.0, 32.0).unwrap();

    let request = ExportRequest::new(&labels, bounds, "utm_run", &config.ground)
        .with_folder("landclass/2024")
        .with_crs("EPSG:32636");
    submit_export(&sink, &request).unwrap();
    assert_eq!(
        sink.submitted.borrow().as_slice(),
        [("landclass/2024".to_string(), "EPSG:32636".to_string(), 6)]
    );
}

#[test]
fn local_pipeline_downscales_large_images() {
    let mut config = EngineConfig::default();
    config.imaging.max_image_size = 10;
    let image = PixelImage::filled_rgb(40, 20, [34, 139, 34]);

    let report = classify_local_image(&image, &config);
    assert!(!report.is_degraded());
    assert_eq!(report.image.shape(), (10, 5));
    assert_eq!(report.classification.value().shape(), (10, 5));
    assert!(report
        .classification
        .value()
        .iter()
        .all(|v| *v == ClassLabel::Forest.id()));
    assert_eq!(report.stats.value().total_pixels, 50);
}
