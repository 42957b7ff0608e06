//! Stateless drawing algorithms over a [`PixelRaster`].
//!
//! Every operation takes the current raster by reference and returns a new
//! raster; inputs are never mutated, which keeps history snapshotting a
//! plain clone. The primitives are coordinate-agnostic: callers (the
//! viewport boundary) guarantee coordinates are inside the canvas, and the
//! flood operations take the canvas bounds as an explicit parameter because
//! the raster itself carries none.

use std::collections::HashSet;

use image::RgbaImage;

use crate::model::{CanvasSize, PixelRaster};

/// Paint one cell, replacing whatever was there. Painting the same color
/// over itself yields an equal-valued raster.
pub fn paint(raster: &PixelRaster, x: u32, y: u32, color: &str) -> PixelRaster {
    let mut next = raster.clone();
    next.set(x, y, color);
    next
}

/// Erase one cell; a transparent cell is a no-op.
pub fn erase(raster: &PixelRaster, x: u32, y: u32) -> PixelRaster {
    let mut next = raster.clone();
    next.remove(x, y);
    next
}

/// Color at a cell, or `None` for transparent. Side-effect-free.
pub fn pick_color(raster: &PixelRaster, x: u32, y: u32) -> Option<&str> {
    raster.get(x, y)
}

/// 4-connected region of cells matching the color at the start cell
/// (transparent counts as a color). Bounded by `bounds`, each cell visited
/// once.
fn flood_region(
    raster: &PixelRaster,
    x0: u32,
    y0: u32,
    bounds: CanvasSize,
) -> Vec<(u32, u32)> {
    let target = raster.get(x0, y0).map(str::to_owned);

    let mut visited: HashSet<(u32, u32)> = HashSet::new();
    let mut stack = vec![(x0, y0)];
    let mut region = Vec::new();

    while let Some((x, y)) = stack.pop() {
        if !bounds.contains(x, y) || !visited.insert((x, y)) {
            continue;
        }
        if raster.get(x, y) != target.as_deref() {
            continue;
        }
        region.push((x, y));

        stack.push((x + 1, y));
        if x > 0 {
            stack.push((x - 1, y));
        }
        stack.push((x, y + 1));
        if y > 0 {
            stack.push((x, y - 1));
        }
    }

    region
}

/// Flood-fill the 4-connected region around `(x0, y0)` with `new_color`.
///
/// The target color is whatever the start cell holds (or transparent).
/// Filling with the target color itself is a no-op and returns an
/// equal-valued raster, so callers can skip a wasted history commit.
pub fn flood_fill(
    raster: &PixelRaster,
    x0: u32,
    y0: u32,
    new_color: &str,
    bounds: CanvasSize,
) -> PixelRaster {
    if raster.get(x0, y0) == Some(new_color) {
        return raster.clone();
    }

    let mut next = raster.clone();
    for (x, y) in flood_region(raster, x0, y0, bounds) {
        next.set(x, y, new_color);
    }
    next
}

/// Like [`flood_fill`] but removes every occupied cell in the region. A
/// transparent start cell removes nothing.
pub fn flood_erase(raster: &PixelRaster, x0: u32, y0: u32, bounds: CanvasSize) -> PixelRaster {
    if raster.get(x0, y0).is_none() {
        return raster.clone();
    }

    let mut next = raster.clone();
    for (x, y) in flood_region(raster, x0, y0, bounds) {
        next.remove(x, y);
    }
    next
}

/// Clockwise quarter turn: `(x, y)` maps to `(height-1-y, x)`, where
/// `height` is the pre-rotation canvas height. On a non-square canvas the
/// output's effective extent is the transposed canvas; callers are
/// responsible for reconciling bounds (the editor restricts rotation to
/// square canvases).
pub fn rotate90(raster: &PixelRaster, bounds: CanvasSize) -> PixelRaster {
    let mut next = PixelRaster::new();
    for (x, y, color) in raster.iter() {
        next.set(bounds.height - 1 - y, x, color);
    }
    next
}

/// Sample a decoded bitmap into a raster, skipping fully transparent
/// pixels and clipping to `min(image, max)` per axis. Pure function of the
/// image bytes.
pub fn rasterize_image(image: &RgbaImage, max_width: u32, max_height: u32) -> PixelRaster {
    let width = image.width().min(max_width);
    let height = image.height().min(max_height);

    let mut raster = PixelRaster::new();
    for y in 0..height {
        for x in 0..width {
            let pixel = image.get_pixel(x, y);
            if pixel[3] > 0 {
                raster.set(
                    x,
                    y,
                    format!("rgb({}, {}, {})", pixel[0], pixel[1], pixel[2]),
                );
            }
        }
    }
    raster
}
