//! Image import: decoding external bitmaps and sampling them into rasters.
//!
//! Decoding never touches editor state; callers adopt the resulting raster
//! atomically, so a failed or slow decode can never leave a frame half
//! replaced.

use std::fs;
use std::path::Path;

use base64::Engine;
use image::{imageops::FilterType, DynamicImage, RgbaImage};
use log::info;
use thiserror::Error;

use crate::draw;
use crate::model::{CanvasSize, PixelRaster};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read image file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid image data: {0}")]
    Decode(#[from] image::ImageError),
    #[error("malformed data URI")]
    MalformedDataUri,
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

pub fn decode_image_bytes(bytes: &[u8]) -> Result<DynamicImage, ImportError> {
    Ok(image::load_from_memory(bytes)?)
}

pub fn load_image_file(path: &Path) -> Result<DynamicImage, ImportError> {
    let bytes = fs::read(path)?;
    decode_image_bytes(&bytes)
}

/// Decode a `data:<mime>;base64,<payload>` URI, the shape embedded sprite
/// images arrive in.
pub fn decode_data_uri(uri: &str) -> Result<DynamicImage, ImportError> {
    let rest = uri.strip_prefix("data:").ok_or(ImportError::MalformedDataUri)?;
    let (meta, payload) = rest.split_once(',').ok_or(ImportError::MalformedDataUri)?;
    if !meta.ends_with(";base64") {
        return Err(ImportError::MalformedDataUri);
    }
    let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
    decode_image_bytes(&bytes)
}

/// Downscale to fit the canvas, preserving aspect ratio. Nearest-neighbour
/// keeps pixel-art edges crisp; images already within bounds pass through
/// unscaled.
pub fn fit_to_canvas(image: DynamicImage, canvas: CanvasSize) -> RgbaImage {
    let (width, height) = (image.width(), image.height());
    if width > canvas.width || height > canvas.height {
        let scale =
            (canvas.width as f32 / width as f32).min(canvas.height as f32 / height as f32);
        let new_width = ((width as f32 * scale) as u32).max(1);
        let new_height = ((height as f32 * scale) as u32).max(1);
        info!(
            "downscaling {}x{} import to {}x{}",
            width, height, new_width, new_height
        );
        image
            .resize(new_width, new_height, FilterType::Nearest)
            .to_rgba8()
    } else {
        image.to_rgba8()
    }
}

/// Full import pipeline: fit the decoded bitmap to the canvas, then sample
/// it cell by cell, skipping fully transparent pixels.
pub fn rasterize_for_canvas(image: DynamicImage, canvas: CanvasSize) -> PixelRaster {
    let fitted = fit_to_canvas(image, canvas);
    draw::rasterize_image(&fitted, canvas.width, canvas.height)
}
