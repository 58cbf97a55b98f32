//! Classification rendering and overlay blending.

use crate::palette::LabelPalette;
use landclass_core::{Classification, Error, LabelRegistry, Outcome, PixelImage, Result};
use ndarray::Array3;

/// Map every label to its palette color, producing a 3-band image.
pub fn colorize(classification: &Classification, palette: &LabelPalette) -> PixelImage {
    let (rows, cols) = classification.shape();
    let data = classification.data();
    PixelImage::from_rgb_fn(rows, cols, |r, c| palette.color(data[[r, c]]).to_array())
}

/// Weighted sum `(1 - alpha)·a + alpha·b` of two 8-bit samples.
///
/// Computed in single precision and rounded half to even, then saturated.
pub fn blend(a: u8, b: u8, alpha: f64) -> u8 {
    let wa = (1.0 - alpha) as f32;
    let wb = alpha as f32;
    let v = f32::from(a) * wa + f32::from(b) * wb;
    round_half_even(v).clamp(0.0, 255.0) as u8
}

fn round_half_even(v: f32) -> f32 {
    let r = v.round();
    if (v - v.trunc()).abs() == 0.5 && r % 2.0 != 0.0 {
        r - v.signum()
    } else {
        r
    }
}

fn check_alpha(alpha: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&alpha) {
        return Err(Error::InvalidParameter {
            name: "alpha",
            value: alpha.to_string(),
            reason: "must be within [0, 1]".into(),
        });
    }
    Ok(())
}

fn blend_images(source: &PixelImage, colored: &PixelImage, alpha: f64) -> Result<PixelImage> {
    check_alpha(alpha)?;
    let (rows, cols) = source.shape();
    if colored.shape() != (rows, cols) {
        return Err(Error::SizeMismatch {
            er: rows,
            ec: cols,
            ar: colored.rows(),
            ac: colored.cols(),
        });
    }
    if !matches!(source.band_count(), 1 | 3 | 4) {
        return Err(Error::UnsupportedBandCount(source.band_count()));
    }

    let mut out = Array3::<u8>::zeros((rows, cols, 3));
    for r in 0..rows {
        for c in 0..cols {
            let (Some(src), Some(lbl)) = (source.rgb(r, c), colored.rgb(r, c)) else {
                continue;
            };
            for band in 0..3 {
                out[[r, c, band]] = blend(src[band], lbl[band], alpha);
            }
        }
    }
    Ok(PixelImage::from_array(out))
}

/// Alpha-blend the label colors over the source image.
///
/// `output = (1 - alpha)·source + alpha·colors`. Gray and RGBA sources are
/// blended as RGB; the result is always 3-band. A shape mismatch, an
/// unsupported band count or `alpha` outside [0, 1] degrades to the
/// unmodified source.
pub fn classification_overlay(
    source: &PixelImage,
    classification: &Classification,
    registry: &LabelRegistry,
    alpha: f64,
) -> Outcome<PixelImage> {
    let colored = colorize(classification, &LabelPalette::from_registry(registry));
    match blend_images(source, &colored, alpha) {
        Ok(image) => Outcome::Complete(image),
        Err(e) => Outcome::degraded(source.clone(), e),
    }
}

/// Convert a label raster to an RGBA pixel buffer.
///
/// Returns a `Vec<u8>` of length `rows * cols * 4` in row-major order.
/// Labels in `transparent` are rendered fully transparent; all others
/// get `opacity`.
pub fn classification_to_rgba(
    classification: &Classification,
    palette: &LabelPalette,
    opacity: u8,
    transparent: &[u8],
) -> Vec<u8> {
    let mut rgba = vec![0u8; classification.len() * 4];

    for (i, label) in classification.data().iter().enumerate() {
        let offset = i * 4;
        if transparent.contains(label) {
            continue;
        }
        let color = palette.color(*label);
        rgba[offset] = color.r;
        rgba[offset + 1] = color.g;
        rgba[offset + 2] = color.b;
        rgba[offset + 3] = opacity;
    }

    rgba
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Rgb;
    use landclass_core::Raster;

    fn make_labels() -> Classification {
        Raster::from_vec(vec![0, 1, 3, 4, 2, 9], 2, 3).unwrap()
    }

    #[test]
    fn colorize_uses_registry() {
        let image = colorize(&make_labels(), &LabelPalette::default());
        assert_eq!(image.band_count(), 3);
        assert_eq!(image.rgb(0, 2), Some([34, 139, 34]));
        assert_eq!(image.rgb(1, 2), Some([128, 128, 128]));
    }

    #[test]
    fn blend_rounding() {
        assert_eq!(blend(0, 255, 0.5), 128);
        // 1.5 -> 2, 2.5 -> 2
        assert_eq!(blend(1, 2, 0.5), 2);
        assert_eq!(blend(2, 3, 0.5), 2);
        assert_eq!(blend(200, 10, 0.0), 200);
        assert_eq!(blend(200, 10, 1.0), 10);
    }

    #[test]
    fn alpha_zero_is_source() {
        let source = PixelImage::from_rgb_fn(2, 3, |r, c| [(r * 40) as u8, (c * 70) as u8, 5]);
        let out = classification_overlay(&source, &make_labels(), &LabelRegistry::default(), 0.0);
        assert!(!out.is_degraded());
        assert_eq!(out.value(), &source);
    }

    #[test]
    fn alpha_one_is_label_colors() {
        let source = PixelImage::filled_rgb(2, 3, [7, 7, 7]);
        let labels = make_labels();
        let out = classification_overlay(&source, &labels, &LabelRegistry::default(), 1.0)
            .into_value();
        assert_eq!(out, colorize(&labels, &LabelPalette::default()));
    }

    #[test]
    fn gray_source_becomes_rgb() {
        let source = PixelImage::from_vec(vec![100; 6], 2, 3, 1).unwrap();
        let out = classification_overlay(&source, &make_labels(), &LabelRegistry::default(), 0.0)
            .into_value();
        assert_eq!(out.band_count(), 3);
        assert_eq!(out.rgb(1, 1), Some([100, 100, 100]));
    }

    #[test]
    fn shape_mismatch_returns_source() {
        let source = PixelImage::filled_rgb(4, 4, [1, 2, 3]);
        let out = classification_overlay(&source, &make_labels(), &LabelRegistry::default(), 0.5);
        assert!(matches!(out.reason(), Some(Error::SizeMismatch { .. })));
        assert_eq!(out.value(), &source);
    }

    #[test]
    fn bad_alpha_returns_source() {
        let source = PixelImage::filled_rgb(2, 3, [1, 2, 3]);
        let out = classification_overlay(&source, &make_labels(), &LabelRegistry::default(), 1.5);
        assert!(out.is_degraded());
        assert_eq!(out.value(), &source);
    }

    #[test]
    fn rgba_buffer() {
        let rgba = classification_to_rgba(&make_labels(), &LabelPalette::default(), 200, &[0]);
        assert_eq!(rgba.len(), 24);
        // label 0 transparent
        assert_eq!(&rgba[0..4], &[0, 0, 0, 0]);
        let water = Rgb::from_hex("#4169E1").unwrap();
        assert_eq!(&rgba[12..16], &[water.r, water.g, water.b, 200]);
    }
}
