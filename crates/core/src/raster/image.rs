//! Interleaved 8-bit images
//!
//! Ordinary photographs arrive as `rows × cols × bands` samples. One band is
//! grayscale, three are RGB, four are RGBA (alpha ignored by the engine).

use crate::error::{Error, Result};
use ndarray::Array3;

/// An interleaved 8-bit image with 1, 3 or 4 samples per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelImage {
    data: Array3<u8>,
}

impl PixelImage {
    /// Zero-filled image
    pub fn new(rows: usize, cols: usize, bands: usize) -> Self {
        Self {
            data: Array3::zeros((rows, cols, bands)),
        }
    }

    /// Wrap an existing `(rows, cols, bands)` array.
    ///
    /// Any band count is accepted here; consumers decide what they can read.
    pub fn from_array(data: Array3<u8>) -> Self {
        Self { data }
    }

    /// Build from interleaved row-major samples
    pub fn from_vec(data: Vec<u8>, rows: usize, cols: usize, bands: usize) -> Result<Self> {
        if data.len() != rows * cols * bands {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }
        Ok(Self {
            data: Array3::from_shape_vec((rows, cols, bands), data)?,
        })
    }

    /// Build an RGB image by evaluating `f(row, col)` for every pixel
    pub fn from_rgb_fn<F: FnMut(usize, usize) -> [u8; 3]>(rows: usize, cols: usize, mut f: F) -> Self {
        let mut data = Array3::zeros((rows, cols, 3));
        for row in 0..rows {
            for col in 0..cols {
                let px = f(row, col);
                for (band, value) in px.iter().enumerate() {
                    data[(row, col, band)] = *value;
                }
            }
        }
        Self { data }
    }

    /// Uniform RGB image
    pub fn filled_rgb(rows: usize, cols: usize, rgb: [u8; 3]) -> Self {
        Self::from_rgb_fn(rows, cols, |_, _| rgb)
    }

    pub fn rows(&self) -> usize {
        self.data.dim().0
    }

    pub fn cols(&self) -> usize {
        self.data.dim().1
    }

    pub fn band_count(&self) -> usize {
        self.data.dim().2
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    pub fn pixel_count(&self) -> usize {
        self.rows() * self.cols()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Pixel as RGB; grayscale replicates its single band, RGBA drops alpha.
    ///
    /// `None` for two-band images and positions outside the image.
    pub fn rgb(&self, row: usize, col: usize) -> Option<[u8; 3]> {
        let sample = |band: usize| self.data.get((row, col, band)).copied();
        match self.band_count() {
            1 => sample(0).map(|v| [v; 3]),
            n if n >= 3 => Some([sample(0)?, sample(1)?, sample(2)?]),
            _ => None,
        }
    }

    pub fn data(&self) -> &Array3<u8> {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_checks_length() {
        assert!(PixelImage::from_vec(vec![0; 11], 2, 2, 3).is_err());
        let img = PixelImage::from_vec(vec![0; 12], 2, 2, 3).unwrap();
        assert_eq!(img.shape(), (2, 2));
        assert_eq!(img.band_count(), 3);
    }

    #[test]
    fn grayscale_collapses_to_rgb() {
        let img = PixelImage::from_vec(vec![7, 8, 9, 10], 2, 2, 1).unwrap();
        assert_eq!(img.rgb(1, 0), Some([9, 9, 9]));
    }

    #[test]
    fn rgba_drops_alpha() {
        let img = PixelImage::from_vec(vec![1, 2, 3, 255], 1, 1, 4).unwrap();
        assert_eq!(img.rgb(0, 0), Some([1, 2, 3]));
    }

    #[test]
    fn out_of_range_pixel_is_none() {
        let img = PixelImage::filled_rgb(2, 3, [1, 2, 3]);
        assert_eq!(img.rgb(1, 2), Some([1, 2, 3]));
        assert_eq!(img.rgb(2, 0), None);
        assert_eq!(img.rgb(0, 3), None);
        let gray = PixelImage::new(1, 1, 1);
        assert_eq!(gray.rgb(5, 5), None);
    }

    #[test]
    fn two_band_image_has_no_rgb() {
        let img = PixelImage::new(1, 1, 2);
        assert_eq!(img.rgb(0, 0), None);
    }
}
