//! Contracts with the remote imagery service
//!
//! The engine never talks to a network. An [`ImageryCatalog`] supplies
//! composited rasters and an [`ExportSink`] accepts finished label rasters;
//! both are implemented outside this crate.

use landclass_core::config::{CollectionEntry, GroundResolution, SatelliteCollections};
use landclass_core::{Bounds, Classification, Error, MultiBandRaster, Raster, Result, Sensor};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default scene cloud-cover ceiling, percent
pub const DEFAULT_MAX_CLOUD_COVER: f64 = 20.0;
/// Default export destination folder
pub const DEFAULT_EXPORT_FOLDER: &str = "earth_engine_exports";
/// Default export coordinate system
pub const DEFAULT_EXPORT_CRS: &str = "EPSG:4326";

/// Date format accepted by [`DateRange::parse`]
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidParameter {
                name: "dates",
                value: format!("{}..{}", start, end),
                reason: "start is after end".into(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse two `YYYY-MM-DD` dates.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date("start", start)?, parse_date("end", end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

fn parse_date(name: &'static str, date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|e| Error::InvalidParameter {
        name,
        value: date.to_string(),
        reason: format!("expected YYYY-MM-DD ({})", e),
    })
}

/// What to composite: region, dates, cloud ceiling and collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeRequest {
    pub bounds: Bounds,
    pub dates: DateRange,
    /// Scenes above this cloud-cover percentage are skipped
    pub max_cloud_cover: f64,
    pub collection: CollectionEntry,
}

impl CompositeRequest {
    pub fn new(bounds: Bounds, dates: DateRange, collection: CollectionEntry) -> Self {
        Self {
            bounds,
            dates,
            max_cloud_cover: DEFAULT_MAX_CLOUD_COVER,
            collection,
        }
    }

    /// Resolve `name` against `collections`, falling back to the default
    /// collection for unknown names.
    pub fn for_collection(
        bounds: Bounds,
        dates: DateRange,
        collections: &SatelliteCollections,
        name: &str,
    ) -> Result<Self> {
        let entry = collections
            .resolve(name)
            .ok_or_else(|| Error::Config(format!("no collection for {:?} and no default", name)))?;
        Ok(Self::new(bounds, dates, entry.clone()))
    }

    pub fn with_max_cloud_cover(mut self, percent: f64) -> Result<Self> {
        if !(0.0..=100.0).contains(&percent) {
            return Err(Error::InvalidParameter {
                name: "max_cloud_cover",
                value: percent.to_string(),
                reason: "must be within [0, 100]".into(),
            });
        }
        self.max_cloud_cover = percent;
        Ok(self)
    }
}

/// Source of composited multispectral rasters.
pub trait ImageryCatalog {
    /// One composite (e.g. per-pixel median of qualifying scenes) clipped
    /// to the request bounds, or `None` when no scene qualifies.
    fn composite(&self, request: &CompositeRequest) -> Result<Option<MultiBandRaster>>;
}

/// Assemble named bands from a sensor's native band identifiers.
///
/// Identifiers the sensor does not define are skipped.
pub fn bands_from_native<I>(sensor: Sensor, native: I) -> Result<MultiBandRaster>
where
    I: IntoIterator<Item = (String, Raster<f64>)>,
{
    let mut out = MultiBandRaster::new();
    for (id, raster) in native {
        match sensor.band_for_id(&id) {
            Some(band) => out.insert(band, raster)?,
            None => tracing::debug!("ignoring band {} for {:?}", id, sensor),
        }
    }
    Ok(out)
}

/// Output file format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportFormat {
    #[default]
    GeoTiff,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::GeoTiff => f.write_str("GeoTIFF"),
        }
    }
}

/// A finished label raster handed to an export facility.
#[derive(Debug, Clone)]
pub struct ExportRequest<'a> {
    pub classification: &'a Classification,
    pub bounds: Bounds,
    /// Ground sampling distance, meters per pixel
    pub scale_m: f64,
    /// Task name, also the output file stem
    pub description: String,
    pub folder: String,
    pub format: ExportFormat,
    pub crs: String,
    pub max_pixels: u64,
}

impl<'a> ExportRequest<'a> {
    pub fn new(
        classification: &'a Classification,
        bounds: Bounds,
        description: &str,
        ground: &GroundResolution,
    ) -> Self {
        Self {
            classification,
            bounds,
            scale_m: ground.scale_m,
            description: description.to_string(),
            folder: DEFAULT_EXPORT_FOLDER.to_string(),
            format: ExportFormat::default(),
            crs: DEFAULT_EXPORT_CRS.to_string(),
            max_pixels: ground.max_pixels,
        }
    }

    pub fn with_folder(mut self, folder: &str) -> Self {
        self.folder = folder.to_string();
        self
    }

    pub fn with_crs(mut self, crs: &str) -> Self {
        self.crs = crs.to_string();
        self
    }

    /// Reject requests no export facility could accept.
    pub fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(Error::InvalidParameter {
                name: "description",
                value: self.description.clone(),
                reason: "must not be empty".into(),
            });
        }
        if !is_plain_name(&self.description) {
            return Err(Error::InvalidParameter {
                name: "description",
                value: self.description.clone(),
                reason: "must be a plain file name without path separators".into(),
            });
        }
        if !is_relative_folder(&self.folder) {
            return Err(Error::InvalidParameter {
                name: "folder",
                value: self.folder.clone(),
                reason: "must be a relative path without '..'".into(),
            });
        }
        if self.classification.is_empty() {
            return Err(Error::EmptyInput("classification has no pixels"));
        }
        if self.classification.len() as u64 > self.max_pixels {
            return Err(Error::InvalidParameter {
                name: "max_pixels",
                value: self.max_pixels.to_string(),
                reason: format!("classification has {} pixels", self.classification.len()),
            });
        }
        if self.scale_m.is_nan() || self.scale_m <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "scale_m",
                value: self.scale_m.to_string(),
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.contains(['/', '\\']) && name != "." && name != ".."
}

fn is_relative_folder(folder: &str) -> bool {
    !folder.starts_with(['/', '\\'])
        && folder
            .split(['/', '\\'])
            .all(|part| part != ".." && !part.contains(':'))
}

/// Submission receipt. Job completion is not tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportAck {
    pub task_id: String,
    pub message: String,
}

/// Batch export facility.
pub trait ExportSink {
    fn submit(&self, request: &ExportRequest<'_>) -> Result<ExportAck>;
}
