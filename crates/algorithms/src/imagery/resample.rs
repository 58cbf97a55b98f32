//! Downscaling of oversized photographs

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma, LumaA, Pixel, Rgb, Rgba};
use landclass_core::{Error, PixelImage, Result};

/// Target (rows, cols) for an image whose longer side must not exceed
/// `max_size`, preserving aspect ratio. Returns `None` when no shrink is
/// needed.
pub fn fit_dimensions(rows: usize, cols: usize, max_size: usize) -> Option<(usize, usize)> {
    if rows.max(cols) <= max_size {
        return None;
    }
    let (new_rows, new_cols) = if rows > cols {
        let scale = max_size as f64 / rows as f64;
        (max_size, (cols as f64 * scale) as usize)
    } else {
        let scale = max_size as f64 / cols as f64;
        ((rows as f64 * scale) as usize, max_size)
    };
    Some((new_rows.max(1), new_cols.max(1)))
}

/// Shrink `image` so its longer side is at most `max_size`.
///
/// Uses a triangle filter whose support widens with the shrink factor, so
/// every output pixel averages the source area it covers. Images already
/// within budget are returned as a copy.
pub fn downscale_to_fit(image: &PixelImage, max_size: usize) -> Result<PixelImage> {
    if max_size == 0 {
        return Err(Error::InvalidParameter {
            name: "max_size",
            value: max_size.to_string(),
            reason: "must be positive".into(),
        });
    }

    let (rows, cols) = image.shape();
    let Some((new_rows, new_cols)) = fit_dimensions(rows, cols, max_size) else {
        return Ok(image.clone());
    };

    let out = match image.band_count() {
        1 => resize_as::<Luma<u8>>(image, new_rows, new_cols)?,
        2 => resize_as::<LumaA<u8>>(image, new_rows, new_cols)?,
        3 => resize_as::<Rgb<u8>>(image, new_rows, new_cols)?,
        4 => resize_as::<Rgba<u8>>(image, new_rows, new_cols)?,
        n => return Err(Error::UnsupportedBandCount(n)),
    };
    tracing::debug!(
        "downscaled {}x{} -> {}x{}",
        cols,
        rows,
        new_cols,
        new_rows
    );
    Ok(out)
}

fn resize_as<P>(image: &PixelImage, new_rows: usize, new_cols: usize) -> Result<PixelImage>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let (rows, cols) = image.shape();
    let samples: Vec<u8> = image.data().iter().copied().collect();
    let buffer = ImageBuffer::<P, Vec<u8>>::from_raw(dim(cols)?, dim(rows)?, samples).ok_or(
        Error::InvalidDimensions {
            width: cols,
            height: rows,
        },
    )?;
    let resized = imageops::resize(&buffer, dim(new_cols)?, dim(new_rows)?, FilterType::Triangle);
    PixelImage::from_vec(resized.into_raw(), new_rows, new_cols, image.band_count())
}

fn dim(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::InvalidParameter {
        name: "dimension",
        value: len.to_string(),
        reason: "exceeds u32".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_budget_is_unchanged() {
        let image = PixelImage::filled_rgb(20, 30, [1, 2, 3]);
        let out = downscale_to_fit(&image, 30).unwrap();
        assert_eq!(out, image);
    }

    #[test]
    fn preserves_aspect_ratio() {
        assert_eq!(fit_dimensions(100, 400, 200), Some((50, 200)));
        assert_eq!(fit_dimensions(400, 100, 200), Some((200, 50)));
        assert_eq!(fit_dimensions(300, 301, 100), Some((99, 100)));
        assert_eq!(fit_dimensions(10, 10, 10), None);
    }

    #[test]
    fn uniform_color_survives() {
        let image = PixelImage::filled_rgb(40, 30, [12, 34, 56]);
        let out = downscale_to_fit(&image, 10).unwrap();
        assert_eq!(out.shape(), (10, 7));
        for row in 0..10 {
            for col in 0..7 {
                assert_eq!(out.rgb(row, col), Some([12, 34, 56]), "pixel ({}, {})", row, col);
            }
        }
    }

    #[test]
    fn halves_stay_apart() {
        // Left half black, right half white, shrunk 2x.
        let image = PixelImage::from_rgb_fn(2, 16, |_, c| if c < 8 { [0; 3] } else { [200; 3] });
        let out = downscale_to_fit(&image, 8).unwrap();
        assert_eq!(out.shape(), (1, 8));
        assert_eq!(out.rgb(0, 0), Some([0, 0, 0]));
        assert_eq!(out.rgb(0, 7), Some([200, 200, 200]));
        let edge = out.rgb(0, 4).unwrap()[0];
        assert!(edge > 0 && edge < 200, "edge {}", edge);
    }

    #[test]
    fn keeps_band_count() {
        for bands in [1, 2, 3, 4] {
            let image = PixelImage::new(10, 10, bands);
            let out = downscale_to_fit(&image, 5).unwrap();
            assert_eq!(out.shape(), (5, 5));
            assert_eq!(out.band_count(), bands);
        }
        let image = PixelImage::new(10, 10, 5);
        assert!(downscale_to_fit(&image, 5).is_err());
    }

    #[test]
    fn zero_budget_is_rejected() {
        let image = PixelImage::new(2, 2, 3);
        assert!(downscale_to_fit(&image, 0).is_err());
    }
}
