//! Native raster I/O: TIFF through the `tiff` crate, PNG and JPEG
//! photographs through `image`

use crate::error::{Error, Result};
use crate::raster::{PixelImage, Raster};
use image::{ImageFormat, RgbImage};
use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::{Gray32Float, Gray8, RGB8};
use tiff::encoder::TiffEncoder;
use tiff::ColorType;

/// Read one band of a TIFF as `f64` samples.
///
/// `band` selects a sample within interleaved pixels (default: the first).
pub fn read_band<P: AsRef<Path>>(path: P, band: Option<usize>) -> Result<Raster<f64>> {
    let file = File::open(path.as_ref())?;
    decode_band(file, band)
}

/// [`read_band`] over an in-memory buffer
pub fn read_band_from_buffer(data: &[u8], band: Option<usize>) -> Result<Raster<f64>> {
    decode_band(Cursor::new(data), band)
}

/// Read an 8-bit gray, RGB or RGBA TIFF, or a PNG / JPEG photograph, as a
/// [`PixelImage`]. The format is detected from the file contents.
pub fn read_image<P: AsRef<Path>>(path: P) -> Result<PixelImage> {
    let data = std::fs::read(path.as_ref())?;
    read_image_from_buffer(&data)
}

/// [`read_image`] over an in-memory buffer
pub fn read_image_from_buffer(data: &[u8]) -> Result<PixelImage> {
    match image::guess_format(data) {
        Ok(ImageFormat::Tiff) => decode_image(Cursor::new(data)),
        Ok(_) => decode_photo(data),
        Err(_) => Err(Error::Image("unrecognized image format".into())),
    }
}

/// Write a label raster as 8-bit grayscale.
pub fn write_labels<P: AsRef<Path>>(labels: &Raster<u8>, path: P) -> Result<()> {
    let file = BufWriter::new(File::create(path.as_ref())?);
    encode_labels(labels, file)
}

/// [`write_labels`] into a byte buffer
pub fn write_labels_to_buffer(labels: &Raster<u8>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_labels(labels, Cursor::new(&mut buf))?;
    Ok(buf)
}

/// Write an RGB image (gray images are expanded, alpha is dropped).
///
/// `.png`, `.jpg` and `.jpeg` paths are encoded as such; anything else is
/// written as TIFF.
pub fn write_image<P: AsRef<Path>>(image: &PixelImage, path: P) -> Result<()> {
    let path = path.as_ref();
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageFormat::from_extension);
    match format {
        Some(format @ (ImageFormat::Png | ImageFormat::Jpeg)) => {
            let (rows, cols) = image.shape();
            let buffer = RgbImage::from_raw(cols as u32, rows as u32, rgb_samples(image)?)
                .ok_or(Error::InvalidDimensions {
                    width: cols,
                    height: rows,
                })?;
            buffer.save_with_format(path, format)?;
            Ok(())
        }
        _ => {
            let file = BufWriter::new(File::create(path)?);
            encode_image(image, file)
        }
    }
}

/// [`write_image`] into a byte buffer
pub fn write_image_to_buffer(image: &PixelImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_image(image, Cursor::new(&mut buf))?;
    Ok(buf)
}

/// Write an `f64` raster as 32-bit float grayscale.
pub fn write_band<P: AsRef<Path>>(raster: &Raster<f64>, path: P) -> Result<()> {
    let file = BufWriter::new(File::create(path.as_ref())?);
    let (rows, cols) = raster.shape();
    let data: Vec<f32> = raster.iter().map(|&v| v as f32).collect();
    TiffEncoder::new(file)?.write_image::<Gray32Float>(cols as u32, rows as u32, &data)?;
    Ok(())
}

fn samples_per_pixel(color: ColorType) -> Result<usize> {
    match color {
        ColorType::Gray(_) => Ok(1),
        ColorType::GrayA(_) => Ok(2),
        ColorType::RGB(_) => Ok(3),
        ColorType::RGBA(_) | ColorType::CMYK(_) => Ok(4),
        other => Err(Error::Tiff(format!("unsupported color type {:?}", other))),
    }
}

fn decode_band<R: Read + Seek>(reader: R, band: Option<usize>) -> Result<Raster<f64>> {
    let mut decoder = Decoder::new(reader)?;
    let (width, height) = decoder.dimensions()?;
    let (rows, cols) = (height as usize, width as usize);
    let samples = samples_per_pixel(decoder.colortype()?)?;
    let band = band.unwrap_or(0);
    if band >= samples {
        return Err(Error::InvalidParameter {
            name: "band",
            value: band.to_string(),
            reason: format!("image has {} samples per pixel", samples),
        });
    }

    let values: Vec<f64> = match decoder.read_image()? {
        DecodingResult::U8(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I8(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::F32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::F64(buf) => buf,
        _ => return Err(Error::Tiff("unsupported sample format".into())),
    };

    if values.len() != rows * cols * samples {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let data: Vec<f64> = values.into_iter().skip(band).step_by(samples).collect();
    tracing::debug!("read band {} of {}x{} TIFF", band, cols, rows);
    Raster::from_vec(data, rows, cols)
}

fn decode_image<R: Read + Seek>(reader: R) -> Result<PixelImage> {
    let mut decoder = Decoder::new(reader)?;
    let (width, height) = decoder.dimensions()?;
    let color = decoder.colortype()?;
    let bands = match color {
        ColorType::Gray(8) => 1,
        ColorType::RGB(8) => 3,
        ColorType::RGBA(8) => 4,
        other => {
            return Err(Error::Tiff(format!(
                "expected an 8-bit gray, RGB or RGBA image, found {:?}",
                other
            )))
        }
    };

    match decoder.read_image()? {
        DecodingResult::U8(buf) => {
            PixelImage::from_vec(buf, height as usize, width as usize, bands)
        }
        _ => Err(Error::Tiff("expected 8-bit samples".into())),
    }
}

fn decode_photo(data: &[u8]) -> Result<PixelImage> {
    let photo = image::load_from_memory(data)?;
    let (width, height) = (photo.width() as usize, photo.height() as usize);
    let color = photo.color();
    let (samples, bands) = if color.has_color() {
        if color.has_alpha() {
            (photo.into_rgba8().into_raw(), 4)
        } else {
            (photo.into_rgb8().into_raw(), 3)
        }
    } else if color.has_alpha() {
        // Gray with alpha has no engine layout; keep the color.
        (photo.into_rgba8().into_raw(), 4)
    } else {
        (photo.into_luma8().into_raw(), 1)
    };
    tracing::debug!("decoded {}x{} {:?} photograph", width, height, color);
    PixelImage::from_vec(samples, height, width, bands)
}

fn rgb_samples(image: &PixelImage) -> Result<Vec<u8>> {
    let (rows, cols) = image.shape();
    let mut data = Vec::with_capacity(rows * cols * 3);
    for row in 0..rows {
        for col in 0..cols {
            let rgb = image
                .rgb(row, col)
                .ok_or(Error::UnsupportedBandCount(image.band_count()))?;
            data.extend_from_slice(&rgb);
        }
    }
    Ok(data)
}

fn encode_labels<W: Write + Seek>(labels: &Raster<u8>, writer: W) -> Result<()> {
    let (rows, cols) = labels.shape();
    let data: Vec<u8> = labels.iter().copied().collect();
    TiffEncoder::new(writer)?.write_image::<Gray8>(cols as u32, rows as u32, &data)?;
    Ok(())
}

fn encode_image<W: Write + Seek>(image: &PixelImage, writer: W) -> Result<()> {
    let (rows, cols) = image.shape();
    let data = rgb_samples(image)?;
    TiffEncoder::new(writer)?.write_image::<RGB8>(cols as u32, rows as u32, &data)?;
    Ok(())
}
