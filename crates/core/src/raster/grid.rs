//! Single-band raster grid

use crate::error::{Error, Result};
use crate::raster::RasterElement;
use ndarray::{Array2, ArrayView2, ArrayViewMut2};

/// A single-band 2D grid of samples, stored row-major as `(row, col)`.
///
/// Index rasters are `Raster<f64>`, label rasters are `Raster<u8>`.
///
/// # Example
///
/// ```
/// use landclass_core::Raster;
///
/// let mut band: Raster<f64> = Raster::new(4, 6);
/// band.set(1, 2, 0.25).unwrap();
/// assert_eq!(band.get(1, 2).unwrap(), 0.25);
/// assert_eq!(band.shape(), (4, 6));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T: RasterElement> {
    data: Array2<T>,
    nodata: Option<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Create a new raster filled with zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::from_array(Array2::zeros((rows, cols)))
    }

    /// Create a new raster filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self::from_array(Array2::from_elem((rows, cols), value))
    }

    /// Create a raster from row-major data
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }
        Ok(Self::from_array(Array2::from_shape_vec((rows, cols), data)?))
    }

    /// Create a raster from an ndarray
    pub fn from_array(data: Array2<T>) -> Self {
        Self { data, nodata: None }
    }

    /// Build a raster by evaluating `f(row, col)` for every cell
    pub fn from_fn<F: FnMut(usize, usize) -> T>(rows: usize, cols: usize, mut f: F) -> Self {
        Self::from_array(Array2::from_shape_fn((rows, cols), |(r, c)| f(r, c)))
    }

    /// Zero-filled raster of another element type with this raster's shape
    pub fn zeros_like<U: RasterElement>(&self) -> Raster<U> {
        Raster::new(self.rows(), self.cols())
    }

    // Dimensions

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or_else(|| {
                Error::Other(format!(
                    "cell ({}, {}) outside raster of size ({}, {})",
                    row,
                    col,
                    self.rows(),
                    self.cols()
                ))
            })
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let (rows, cols) = self.shape();
        match self.data.get_mut((row, col)) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(Error::Other(format!(
                "cell ({}, {}) outside raster of size ({}, {})",
                row, col, rows, cols
            ))),
        }
    }

    pub fn view(&self) -> ArrayView2<'_, T> {
        self.data.view()
    }

    pub fn view_mut(&mut self) -> ArrayViewMut2<'_, T> {
        self.data.view_mut()
    }

    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Array2<T> {
        &mut self.data
    }

    pub fn into_array(self) -> Array2<T> {
        self.data
    }

    /// Row-major iterator over all cell values
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    // Metadata

    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    pub fn set_nodata(&mut self, nodata: Option<T>) {
        self.nodata = nodata;
    }

    /// Check if a value is no-data for this raster
    pub fn is_nodata(&self, value: T) -> bool {
        value.is_nodata(self.nodata)
    }

    /// Error unless `other` has exactly this raster's shape
    pub fn check_same_shape<U: RasterElement>(&self, other: &Raster<U>) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::SizeMismatch {
                er: self.rows(),
                ec: self.cols(),
                ar: other.rows(),
                ac: other.cols(),
            });
        }
        Ok(())
    }

    /// Whether any cell holds a value that does not survive `f64` conversion
    /// as a finite number.
    pub fn has_non_finite(&self) -> bool {
        self.data
            .iter()
            .any(|v| v.to_f64().map_or(true, |f| !f.is_finite()))
    }
}
