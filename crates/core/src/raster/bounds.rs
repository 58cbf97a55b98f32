//! Geographic bounding rectangles
//!
//! Bounds are opaque `[west, south, east, north]` rectangles in degrees. No
//! projection is applied; region windows are derived by linear interpolation
//! over the raster's own bounds.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Rough length of one degree, km
pub const KM_PER_DEGREE: f64 = 111.0;

/// An axis-aligned rectangle `[west, south, east, north]`.
///
/// Serialized as a four-element array; deserialization runs the same checks
/// as [`Bounds::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct Bounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Bounds {
    /// Validated constructor: edges must be finite with `west < east`, `south < north`.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Result<Self> {
        let all_finite = [west, south, east, north].iter().all(|v| v.is_finite());
        if !all_finite || west >= east || south >= north {
            return Err(Error::InvalidParameter {
                name: "bounds",
                value: format!("[{}, {}, {}, {}]", west, south, east, north),
                reason: "expected finite west < east and south < north".into(),
            });
        }
        Ok(Self {
            west,
            south,
            east,
            north,
        })
    }

    /// Build from a `[west, south, east, north]` array
    pub fn from_array(b: [f64; 4]) -> Result<Self> {
        Self::new(b[0], b[1], b[2], b[3])
    }

    /// Square of half-side `radius_km` around a point, using the flat
    /// approximation of 111 km per degree on both axes.
    pub fn around(lon: f64, lat: f64, radius_km: f64) -> Result<Self> {
        if radius_km.is_nan() || radius_km <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "radius_km",
                value: radius_km.to_string(),
                reason: "must be positive".into(),
            });
        }
        let d = radius_km / KM_PER_DEGREE;
        Self::new(lon - d, lat - d, lon + d, lat + d)
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.west && x <= self.east && y >= self.south && y <= self.north
    }

    /// Overlap of two rectangles, `None` when they are disjoint.
    pub fn intersection(&self, other: &Bounds) -> Option<Bounds> {
        let west = self.west.max(other.west);
        let south = self.south.max(other.south);
        let east = self.east.min(other.east);
        let north = self.north.min(other.north);
        if west < east && south < north {
            Some(Bounds {
                west,
                south,
                east,
                north,
            })
        } else {
            None
        }
    }
}

impl TryFrom<[f64; 4]> for Bounds {
    type Error = Error;

    fn try_from(b: [f64; 4]) -> Result<Self> {
        Self::from_array(b)
    }
}

impl From<Bounds> for [f64; 4] {
    fn from(b: Bounds) -> Self {
        b.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_rectangle() {
        assert!(Bounds::new(35.0, 31.0, 34.0, 32.0).is_err());
        assert!(Bounds::new(34.0, 32.0, 35.0, 31.0).is_err());
        assert!(Bounds::new(f64::NAN, 31.0, 35.0, 32.0).is_err());
    }

    #[test]
    fn deserialization_is_validated() {
        let b: Bounds = serde_json::from_str("[34.7, 31.4, 34.9, 31.6]").unwrap();
        assert_eq!(b.to_array(), [34.7, 31.4, 34.9, 31.6]);
        assert_eq!(serde_json::to_string(&b).unwrap(), "[34.7,31.4,34.9,31.6]");

        assert!(serde_json::from_str::<Bounds>("[35.0, 31.0, 34.0, 32.0]").is_err());
        assert!(serde_json::from_str::<Bounds>("[34.0, 32.0, 35.0, 31.0]").is_err());
        assert!(serde_json::from_str::<Bounds>("[34.0, 31.0, 35.0]").is_err());
    }

    #[test]
    fn around_point() {
        let b = Bounds::around(34.8, 31.5, 11.1).unwrap();
        assert!((b.west - 34.7).abs() < 1e-9, "west {}", b.west);
        assert!((b.north - 31.6).abs() < 1e-9, "north {}", b.north);
        assert!(b.contains(34.8, 31.5));
        assert!(Bounds::around(0.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn intersection_of_overlapping_rectangles() {
        let a = Bounds::new(0.0, 0.0, 2.0, 2.0).unwrap();
        let b = Bounds::new(1.0, 1.0, 3.0, 3.0).unwrap();
        let i = a.intersection(&b).unwrap();
        assert_eq!(i.to_array(), [1.0, 1.0, 2.0, 2.0]);
        let c = Bounds::new(5.0, 5.0, 6.0, 6.0).unwrap();
        assert!(a.intersection(&c).is_none());
    }
}
