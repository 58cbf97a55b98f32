//! End-to-end classification pipelines
//!
//! - **local**: photograph → RGB indices → labels → stats + overlay
//! - **remote**: catalog composite → spectral indices → labels → zonal stats
//!
//! Both run the same [`Classifier`](crate::classification::Classifier); only
//! the index producer and the aggregation differ.

use crate::classification::{classify_rgb_image, classify_spectral};
use crate::imagery::{append_spectral_indices, downscale_to_fit};
use crate::remote::{CompositeRequest, ExportAck, ExportRequest, ExportSink, ImageryCatalog};
use crate::statistics::{
    class_statistics, stats_from_histogram, ClassStats, Histogram, LocalZonalReducer, ZonalReducer,
};
use landclass_colormap::classification_overlay;
use landclass_core::{Classification, EngineConfig, MultiBandRaster, Outcome, PixelImage, Result};
use std::time::Instant;

/// Everything produced for one local photograph.
#[derive(Debug)]
pub struct LocalReport {
    /// The image that was classified, after downscaling
    pub image: PixelImage,
    pub classification: Outcome<Classification>,
    pub stats: Outcome<ClassStats>,
    pub overlay: Outcome<PixelImage>,
}

impl LocalReport {
    /// Whether any stage fell back to its default output
    pub fn is_degraded(&self) -> bool {
        self.classification.is_degraded() || self.stats.is_degraded() || self.overlay.is_degraded()
    }
}

/// Classify a photograph and summarize it.
///
/// Images larger than `config.imaging.max_image_size` are downscaled first.
/// Stages degrade independently; nothing here returns an error.
pub fn classify_local_image(image: &PixelImage, config: &EngineConfig) -> LocalReport {
    let start = Instant::now();

    let image = match downscale_to_fit(image, config.imaging.max_image_size) {
        Ok(resized) => resized,
        Err(e) => {
            tracing::warn!("keeping original size: {}", e);
            image.clone()
        }
    };

    let classification = classify_rgb_image(&image, config);
    tracing::debug!("classified {}x{} in {:.2?}", image.cols(), image.rows(), start.elapsed());

    let stats = class_statistics(
        classification.value(),
        &config.labels,
        config.ground.pixel_area_km2,
    );
    let overlay = classification_overlay(
        &image,
        classification.value(),
        &config.labels,
        config.imaging.overlay_alpha,
    );
    tracing::debug!("local pipeline finished in {:.2?}", start.elapsed());

    LocalReport {
        image,
        classification,
        stats,
        overlay,
    }
}

/// Everything produced for one remote composite.
#[derive(Debug)]
pub struct RemoteReport {
    /// Source bands plus the appended index bands
    pub composite: MultiBandRaster,
    pub classification: Outcome<Classification>,
    /// Label histogram over the request region
    pub histogram: Histogram,
    pub stats: ClassStats,
}

/// Fetch a composite, classify it and reduce it over the request region
/// in memory.
///
/// `Ok(None)` means the catalog found no qualifying imagery.
pub fn classify_remote_composite<C: ImageryCatalog + ?Sized>(
    catalog: &C,
    request: &CompositeRequest,
    config: &EngineConfig,
) -> Result<Option<RemoteReport>> {
    classify_remote_composite_with(catalog, &LocalZonalReducer, request, config)
}

/// [`classify_remote_composite`] with a caller-supplied zonal reducer.
pub fn classify_remote_composite_with<C, Z>(
    catalog: &C,
    reducer: &Z,
    request: &CompositeRequest,
    config: &EngineConfig,
) -> Result<Option<RemoteReport>>
where
    C: ImageryCatalog + ?Sized,
    Z: ZonalReducer + ?Sized,
{
    let start = Instant::now();
    let Some(source) = catalog.composite(request)? else {
        tracing::info!(
            "no {} imagery for {} under {}% cloud",
            request.collection.id,
            request.dates,
            request.max_cloud_cover
        );
        return Ok(None);
    };
    tracing::debug!("composite with {} bands fetched in {:.2?}", source.band_count(), start.elapsed());

    let composite = append_spectral_indices(&source).into_value();
    let classification = classify_spectral(&composite, config);

    let extent = composite.bounds().copied();
    let histogram = reducer.frequency_histogram(
        classification.value(),
        extent.as_ref(),
        &request.bounds,
        &config.ground,
    )?;
    let stats = stats_from_histogram(&histogram, &config.labels, config.ground.pixel_area_km2);
    tracing::debug!("remote pipeline finished in {:.2?}", start.elapsed());

    Ok(Some(RemoteReport {
        composite,
        classification,
        histogram,
        stats,
    }))
}

/// Validate `request` and hand it to an export facility.
pub fn submit_export<S: ExportSink + ?Sized>(
    sink: &S,
    request: &ExportRequest<'_>,
) -> Result<ExportAck> {
    request.validate()?;
    let ack = sink.submit(request)?;
    tracing::info!("export submitted: {}", ack.message);
    Ok(ack)
}
