//! Zonal label histograms
//!
//! The remote path delegates region reduction to the imagery service;
//! [`LocalZonalReducer`] does the same reduction over an in-memory label
//! raster so both paths share [`stats_from_histogram`](super::stats_from_histogram).

use super::class_stats::Histogram;
use landclass_core::config::GroundResolution;
use landclass_core::{Bounds, Classification, Error, Result};
use std::collections::BTreeMap;

/// Half-open pixel rectangle `[row_start, row_end) × [col_start, col_end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionWindow {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl RegionWindow {
    /// Window covering a whole `rows × cols` raster
    pub fn full(rows: usize, cols: usize) -> Self {
        Self {
            row_start: 0,
            row_end: rows,
            col_start: 0,
            col_end: cols,
        }
    }

    /// Pixels of a `rows × cols` raster spanning `extent` that intersect
    /// `region`. Row 0 is the northern edge.
    ///
    /// Returns `None` when the region misses the raster entirely.
    pub fn from_bounds(extent: &Bounds, region: &Bounds, rows: usize, cols: usize) -> Option<Self> {
        let overlap = extent.intersection(region)?;

        let col_of = |x: f64| (x - extent.west) / extent.width() * cols as f64;
        let row_of = |y: f64| (extent.north - y) / extent.height() * rows as f64;

        let col_start = (col_of(overlap.west).floor().max(0.0) as usize).min(cols);
        let col_end = (col_of(overlap.east).ceil().max(0.0) as usize).min(cols);
        let row_start = (row_of(overlap.north).floor().max(0.0) as usize).min(rows);
        let row_end = (row_of(overlap.south).ceil().max(0.0) as usize).min(rows);

        let window = Self {
            row_start,
            row_end,
            col_start,
            col_end,
        };
        (window.pixel_count() > 0).then_some(window)
    }

    pub fn rows(&self) -> usize {
        self.row_end.saturating_sub(self.row_start)
    }

    pub fn cols(&self) -> usize {
        self.col_end.saturating_sub(self.col_start)
    }

    pub fn pixel_count(&self) -> usize {
        self.rows() * self.cols()
    }
}

/// Count label values inside `window` (the whole raster when `None`).
pub fn frequency_histogram(classification: &Classification, window: Option<&RegionWindow>) -> Histogram {
    let (rows, cols) = classification.shape();
    let w = window.copied().unwrap_or_else(|| RegionWindow::full(rows, cols));
    let data = classification.data();

    let mut counts = [0u64; 256];
    for row in w.row_start..w.row_end.min(rows) {
        for col in w.col_start..w.col_end.min(cols) {
            counts[data[[row, col]] as usize] += 1;
        }
    }
    counts
        .iter()
        .enumerate()
        .filter(|(_, n)| **n > 0)
        .map(|(id, n)| (id as u8, *n))
        .collect()
}

/// Parse a histogram keyed by label strings, as returned by an imagery
/// service. Counts may be fractional (partial-pixel weights) and are
/// rounded; keys that are not label values are skipped.
pub fn histogram_from_keyed(keyed: &BTreeMap<String, f64>) -> Histogram {
    let mut histogram = Histogram::new();
    for (key, count) in keyed {
        let id = key.parse::<u8>().ok().or_else(|| {
            key.parse::<f64>()
                .ok()
                .filter(|v| v.fract() == 0.0 && (0.0..=255.0).contains(v))
                .map(|v| v as u8)
        });
        match id {
            Some(id) if count.is_finite() && *count > 0.0 => {
                *histogram.entry(id).or_insert(0) += count.round() as u64;
            }
            Some(_) => {}
            None => tracing::warn!("skipping histogram key {:?}", key),
        }
    }
    histogram
}

/// Region reduction to a label histogram.
///
/// `extent` is the geographic rectangle the classification covers; when
/// absent the whole raster is treated as inside the region.
pub trait ZonalReducer {
    fn frequency_histogram(
        &self,
        classification: &Classification,
        extent: Option<&Bounds>,
        region: &Bounds,
        ground: &GroundResolution,
    ) -> Result<Histogram>;
}

/// Reduces in memory at the raster's native resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalZonalReducer;

impl ZonalReducer for LocalZonalReducer {
    fn frequency_histogram(
        &self,
        classification: &Classification,
        extent: Option<&Bounds>,
        region: &Bounds,
        ground: &GroundResolution,
    ) -> Result<Histogram> {
        let (rows, cols) = classification.shape();
        let window = match extent {
            Some(extent) => match RegionWindow::from_bounds(extent, region, rows, cols) {
                Some(w) => w,
                None => {
                    tracing::debug!("region does not intersect the raster extent");
                    return Ok(Histogram::new());
                }
            },
            None => RegionWindow::full(rows, cols),
        };

        if window.pixel_count() as u64 > ground.max_pixels {
            return Err(Error::InvalidParameter {
                name: "max_pixels",
                value: ground.max_pixels.to_string(),
                reason: format!("region covers {} pixels", window.pixel_count()),
            });
        }

        Ok(frequency_histogram(classification, Some(&window)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landclass_core::Raster;

    fn make_quadrants() -> Classification {
        // 4x4: top-left 3, top-right 2, bottom-left 1, bottom-right 4
        Raster::from_fn(4, 4, |r, c| match (r < 2, c < 2) {
            (true, true) => 3,
            (true, false) => 2,
            (false, true) => 1,
            (false, false) => 4,
        })
    }

    fn extent() -> Bounds {
        Bounds::new(0.0, 0.0, 4.0, 4.0).unwrap()
    }

    #[test]
    fn window_from_bounds() {
        let region = Bounds::new(2.0, 2.0, 5.0, 5.0).unwrap();
        let w = RegionWindow::from_bounds(&extent(), &region, 4, 4).unwrap();
        // North-east quadrant: rows 0..2, cols 2..4
        assert_eq!(w, RegionWindow { row_start: 0, row_end: 2, col_start: 2, col_end: 4 });
    }

    #[test]
    fn partial_pixels_are_included() {
        let region = Bounds::new(0.5, 0.5, 1.5, 1.5).unwrap();
        let w = RegionWindow::from_bounds(&extent(), &region, 4, 4).unwrap();
        assert_eq!(w, RegionWindow { row_start: 2, row_end: 4, col_start: 0, col_end: 2 });
    }

    #[test]
    fn disjoint_region_has_no_window() {
        let region = Bounds::new(10.0, 10.0, 11.0, 11.0).unwrap();
        assert!(RegionWindow::from_bounds(&extent(), &region, 4, 4).is_none());
    }

    #[test]
    fn histogram_of_full_raster() {
        let h = frequency_histogram(&make_quadrants(), None);
        assert_eq!(h.len(), 4);
        assert!(h.values().all(|n| *n == 4));
    }

    #[test]
    fn local_reducer_clips_to_region() {
        let region = Bounds::new(0.0, 0.0, 2.0, 2.0).unwrap();
        let h = LocalZonalReducer
            .frequency_histogram(&make_quadrants(), Some(&extent()), &region, &GroundResolution::default())
            .unwrap();
        assert_eq!(h.into_iter().collect::<Vec<_>>(), vec![(1, 4)]);
    }

    #[test]
    fn local_reducer_enforces_pixel_budget() {
        let ground = GroundResolution {
            max_pixels: 10,
            ..GroundResolution::default()
        };
        let result = LocalZonalReducer.frequency_histogram(&make_quadrants(), None, &extent(), &ground);
        assert!(result.is_err());
    }

    #[test]
    fn keyed_histogram_parsing() {
        let mut keyed = BTreeMap::new();
        keyed.insert("0".to_string(), 10.4);
        keyed.insert("4".to_string(), 2.6);
        keyed.insert("3.0".to_string(), 1.0);
        keyed.insert("null".to_string(), 5.0);

        let h = histogram_from_keyed(&keyed);
        assert_eq!(h.get(&0), Some(&10));
        assert_eq!(h.get(&4), Some(&3));
        assert_eq!(h.get(&3), Some(&1));
        assert_eq!(h.len(), 3);
    }
}
