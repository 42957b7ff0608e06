//! Rasterize frames to RGBA buffers and PNG files.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use log::{info, warn};

use crate::model::{CanvasSize, FrameSet, PixelRaster, FRAME_COUNT};

use super::color::parse_color_token;

/// Render a single frame into a transparent `width x height` buffer, one
/// buffer pixel per raster cell. Cells with an unusable color token or
/// out-of-canvas coordinates (possible in foreign documents) are skipped
/// with a warning rather than failing the whole export.
pub fn render_frame(raster: &PixelRaster, canvas: CanvasSize) -> RgbaImage {
    let mut image = RgbaImage::new(canvas.width, canvas.height);
    for (x, y, color) in raster.iter() {
        if !canvas.contains(x, y) {
            warn!("skipping out-of-canvas cell ({}, {})", x, y);
            continue;
        }
        match parse_color_token(color) {
            Ok(rgba) => image.put_pixel(x, y, rgba),
            Err(err) => warn!("skipping cell ({}, {}): {}", x, y, err),
        }
    }
    image
}

/// Horizontal sprite strip: one column block per frame, in the supplied
/// order, `width * frame_count` wide.
pub fn render_strip(frames: &[&PixelRaster], canvas: CanvasSize) -> RgbaImage {
    let cols = frames.len().max(1) as u32;
    let mut sheet = RgbaImage::new(canvas.width * cols, canvas.height);

    for (i, raster) in frames.iter().enumerate() {
        let offset_x = i as u32 * canvas.width;
        let frame_image = render_frame(raster, canvas);
        for (px, py, pixel) in frame_image.enumerate_pixels() {
            sheet.put_pixel(offset_x + px, py, *pixel);
        }
    }
    sheet
}

/// Resolve which of the requested frame indices to export: frames that
/// actually contain pixels, falling back to every requested frame when
/// none do, so an explicit export request is never silently empty.
pub fn select_frames(frame_set: &FrameSet, requested: &[usize]) -> Vec<usize> {
    let requested: Vec<usize> = requested
        .iter()
        .copied()
        .filter(|&i| i < FRAME_COUNT)
        .collect();
    let with_data: Vec<usize> = requested
        .iter()
        .copied()
        .filter(|&i| !frame_set.frame(i).is_empty())
        .collect();
    if with_data.is_empty() {
        requested
    } else {
        with_data
    }
}

pub fn ensure_png_extension(path: &Path) -> PathBuf {
    if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
    {
        path.to_path_buf()
    } else {
        let mut with_ext = path.as_os_str().to_os_string();
        with_ext.push(".png");
        PathBuf::from(with_ext)
    }
}

/// Export the requested frames of one variant as a horizontal strip PNG.
pub fn export_strip(
    frame_set: &FrameSet,
    requested: &[usize],
    canvas: CanvasSize,
    output: &Path,
) -> Result<PathBuf, String> {
    let frames = select_frames(frame_set, requested);
    if frames.is_empty() {
        return Err("no frames selected for export".to_string());
    }

    let rasters: Vec<&PixelRaster> = frames.iter().map(|&i| frame_set.frame(i)).collect();
    let sheet = render_strip(&rasters, canvas);

    let path = ensure_png_extension(output);
    sheet
        .save(&path)
        .map_err(|e| format!("Failed to save spritesheet: {}", e))?;
    info!("exported {}-frame strip to {}", frames.len(), path.display());
    Ok(path)
}

/// Export each requested frame that has pixel data as its own PNG, named
/// `<base>-frame-<n>.png`.
pub fn export_frames(
    frame_set: &FrameSet,
    requested: &[usize],
    canvas: CanvasSize,
    base: &Path,
) -> Result<Vec<PathBuf>, String> {
    let frames: Vec<usize> = requested
        .iter()
        .copied()
        .filter(|&i| i < FRAME_COUNT && !frame_set.frame(i).is_empty())
        .collect();
    if frames.is_empty() {
        return Err("no frames with pixel data to export".to_string());
    }

    let stem = base.with_extension("");
    let mut written = Vec::new();
    for &index in &frames {
        let image = render_frame(frame_set.frame(index), canvas);
        let path = PathBuf::from(format!("{}-frame-{}.png", stem.display(), index + 1));
        image
            .save(&path)
            .map_err(|e| format!("Failed to save {}: {}", path.display(), e))?;
        written.push(path);
    }
    info!("exported {} individual frames", written.len());
    Ok(written)
}
