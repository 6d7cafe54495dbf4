use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::info;

use crate::spectrum::Spectrum;

/// Decoded image: linear RGB pixels in row-major order, row 0 at the
/// top, plus the alpha channel when the source carries one.
pub struct ImageData {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Spectrum>,
    pub alpha: Option<Vec<f32>>,
}

pub fn read_image(path: &Path) -> Result<ImageData> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    let img = image::open(path)
        .with_context(|| crate::Error::Io(format!("failed to open image {}", path.display())))?;
    let (width, height) = (img.width() as usize, img.height() as usize);

    if extension == "hdr" {
        // Radiance HDR is already linear.
        let rgb = img.to_rgb32f();
        let pixels = rgb
            .pixels()
            .map(|p| Spectrum::rgb(p[0], p[1], p[2]))
            .collect();
        return Ok(ImageData {
            width,
            height,
            pixels,
            alpha: None,
        });
    }

    let has_alpha = img.color().has_alpha();
    let rgba = img.to_rgba8();
    let pixels = rgba
        .pixels()
        .map(|p| Spectrum::from_srgb([p[0], p[1], p[2]]))
        .collect();
    let alpha = if has_alpha {
        Some(rgba.pixels().map(|p| f32::from(p[3]) / 255.0).collect())
    } else {
        None
    };

    Ok(ImageData {
        width,
        height,
        pixels,
        alpha,
    })
}

/// Write a linear RGB image, choosing the encoder from the file
/// extension: `.hdr` stays linear, anything else goes through the sRGB
/// 8-bit path.
pub fn write_image(path: &Path, pixels: &[Spectrum], width: usize, height: usize) -> Result<()> {
    assert_eq!(pixels.len(), width * height);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    info!("Writing image {} ({}x{})", path.display(), width, height);
    if extension == "hdr" {
        write_image_hdr(path, pixels, width, height)
    } else {
        write_image_srgb(path, pixels, width, height)
    }
}

fn write_image_srgb(path: &Path, pixels: &[Spectrum], width: usize, height: usize) -> Result<()> {
    let mut data = Vec::with_capacity(width * height * 3);
    for p in pixels {
        data.extend_from_slice(&p.to_srgb());
    }
    let buf: image::RgbImage = image::ImageBuffer::from_raw(width as u32, height as u32, data)
        .ok_or_else(|| anyhow!("image buffer construction failed"))?;
    buf.save(path)
        .with_context(|| crate::Error::Io(format!("failed to write {}", path.display())))?;

    Ok(())
}

fn write_image_hdr(path: &Path, pixels: &[Spectrum], width: usize, height: usize) -> Result<()> {
    let file = File::create(path)
        .with_context(|| crate::Error::Io(format!("failed to create {}", path.display())))?;
    let data: Vec<image::Rgb<f32>> = pixels.iter().map(|p| image::Rgb([p.r, p.g, p.b])).collect();
    image::codecs::hdr::HdrEncoder::new(BufWriter::new(file))
        .encode(&data[..], width, height)
        .with_context(|| crate::Error::Io(format!("failed to write {}", path.display())))?;

    Ok(())
}
