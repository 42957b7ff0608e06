//! Screen/raster coordinate transform under zoom and pan.
//!
//! Screen coordinates are relative to the viewport's top-left corner. The
//! rendered cell size is `BASE_CELL_SIZE * zoom`; pan is clamped so the
//! content rectangle never scrolls past its rendered extent, and content
//! smaller than the viewport is centered instead (recomputed from the
//! current content size on every query, since zoom changes it).

use crate::model::CanvasSize;

/// Rendered size of one raster cell at zoom 1.0, in screen units.
pub const BASE_CELL_SIZE: f32 = 10.0;

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 3.0;
/// Zoom change per wheel notch / zoom action.
pub const ZOOM_STEP: f32 = 0.1;

/// One-cell pan steps for keyboard navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub zoom: f32,
    /// Scroll offset into the content rectangle, always `>= (0, 0)`.
    pub pan: (f32, f32),
    /// Visible viewport size in screen units.
    pub view_size: (f32, f32),
}

fn round_zoom(zoom: f32) -> f32 {
    (zoom * 100.0).round() / 100.0
}

impl Viewport {
    pub fn new(view_size: (f32, f32)) -> Self {
        Self {
            zoom: 1.0,
            pan: (0.0, 0.0),
            view_size,
        }
    }

    pub fn cell_size(&self) -> f32 {
        BASE_CELL_SIZE * self.zoom
    }

    /// Rendered content extent at the current zoom.
    pub fn content_size(&self, canvas: CanvasSize) -> (f32, f32) {
        (
            canvas.width as f32 * self.cell_size(),
            canvas.height as f32 * self.cell_size(),
        )
    }

    /// Screen position of the content's top-left corner: centered per axis
    /// when the content fits the viewport, otherwise offset by the pan.
    pub fn origin(&self, canvas: CanvasSize) -> (f32, f32) {
        let (content_w, content_h) = self.content_size(canvas);
        let x = if content_w < self.view_size.0 {
            (self.view_size.0 - content_w) / 2.0
        } else {
            -self.pan.0
        };
        let y = if content_h < self.view_size.1 {
            (self.view_size.1 - content_h) / 2.0
        } else {
            -self.pan.1
        };
        (x, y)
    }

    /// Invert the affine transform; `None` when the screen point lies
    /// outside `[0, width) x [0, height)` in raster space.
    pub fn screen_to_raster(
        &self,
        screen_x: f32,
        screen_y: f32,
        canvas: CanvasSize,
    ) -> Option<(u32, u32)> {
        let (origin_x, origin_y) = self.origin(canvas);
        let cell = self.cell_size();
        let x = ((screen_x - origin_x) / cell).floor();
        let y = ((screen_y - origin_y) / cell).floor();

        if x >= 0.0 && x < canvas.width as f32 && y >= 0.0 && y < canvas.height as f32 {
            Some((x as u32, y as u32))
        } else {
            None
        }
    }

    fn max_pan(&self, canvas: CanvasSize) -> (f32, f32) {
        let (content_w, content_h) = self.content_size(canvas);
        (
            (content_w - self.view_size.0).max(0.0),
            (content_h - self.view_size.1).max(0.0),
        )
    }

    fn clamp_pan(&mut self, canvas: CanvasSize) {
        let (max_x, max_y) = self.max_pan(canvas);
        self.pan.0 = self.pan.0.clamp(0.0, max_x);
        self.pan.1 = self.pan.1.clamp(0.0, max_y);
    }

    pub fn set_zoom(&mut self, zoom: f32, canvas: CanvasSize) {
        self.zoom = round_zoom(zoom.clamp(MIN_ZOOM, MAX_ZOOM));
        self.clamp_pan(canvas);
    }

    /// Step the zoom while keeping the raster point under `anchor`
    /// (viewport-relative) visually fixed, then clamp pan to bounds.
    pub fn zoom_at(&mut self, anchor: (f32, f32), steps: i32, canvas: CanvasSize) {
        let new_zoom = round_zoom((self.zoom + steps as f32 * ZOOM_STEP).clamp(MIN_ZOOM, MAX_ZOOM));
        if new_zoom == self.zoom {
            return;
        }

        // Anchor in content coordinates at the old zoom, rescaled so the
        // same raster point stays under the anchor afterwards.
        let content_x = anchor.0 + self.pan.0;
        let content_y = anchor.1 + self.pan.1;
        let scale = new_zoom / self.zoom;

        self.zoom = new_zoom;
        self.pan = (content_x * scale - anchor.0, content_y * scale - anchor.1);
        self.clamp_pan(canvas);
    }

    /// Drag-pan by a screen-space delta, clamped to the content extent.
    pub fn pan_by(&mut self, dx: f32, dy: f32, canvas: CanvasSize) {
        self.pan.0 += dx;
        self.pan.1 += dy;
        self.clamp_pan(canvas);
    }

    /// Keyboard pan: one cell at the current zoom.
    pub fn arrow_pan(&mut self, direction: PanDirection, canvas: CanvasSize) {
        let step = self.cell_size();
        let (dx, dy) = match direction {
            PanDirection::Up => (0.0, -step),
            PanDirection::Down => (0.0, step),
            PanDirection::Left => (-step, 0.0),
            PanDirection::Right => (step, 0.0),
        };
        self.pan_by(dx, dy, canvas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas(width: u32, height: u32) -> CanvasSize {
        CanvasSize { width, height }
    }

    #[test]
    fn screen_to_raster_maps_cells_under_pan() {
        let mut view = Viewport::new((200.0, 200.0));
        view.pan = (100.0, 50.0);
        let canvas = canvas(64, 64); // content 640x640, larger than the view

        // Screen (5, 5) -> content (105, 55) -> cell (10, 5) at 10px cells.
        assert_eq!(view.screen_to_raster(5.0, 5.0, canvas), Some((10, 5)));
    }

    #[test]
    fn screen_to_raster_is_none_outside_the_canvas() {
        let view = Viewport::new((1000.0, 1000.0));
        let canvas = canvas(16, 16); // content 160x160, centered at (420, 420)

        assert_eq!(view.screen_to_raster(0.0, 0.0, canvas), None);
        assert_eq!(view.screen_to_raster(419.0, 500.0, canvas), None);
        assert_eq!(view.screen_to_raster(420.0, 420.0, canvas), Some((0, 0)));
        assert_eq!(view.screen_to_raster(579.0, 579.0, canvas), Some((15, 15)));
        assert_eq!(view.screen_to_raster(580.0, 580.0, canvas), None);
    }

    #[test]
    fn small_content_is_centered() {
        let view = Viewport::new((400.0, 400.0));
        let origin = view.origin(canvas(16, 16)); // content 160x160
        assert_eq!(origin, (120.0, 120.0));
    }

    #[test]
    fn zoom_clamps_and_rounds_to_two_decimals() {
        let mut view = Viewport::new((200.0, 200.0));
        let canvas = canvas(64, 64);

        view.set_zoom(7.0, canvas);
        assert_eq!(view.zoom, MAX_ZOOM);
        view.set_zoom(0.01, canvas);
        assert_eq!(view.zoom, MIN_ZOOM);

        view.set_zoom(1.0, canvas);
        for _ in 0..3 {
            view.zoom_at((0.0, 0.0), 1, canvas);
        }
        assert_eq!(view.zoom, 1.3);
    }

    #[test]
    fn zoom_at_keeps_the_anchored_raster_point_fixed() {
        let mut view = Viewport::new((200.0, 200.0));
        view.pan = (100.0, 100.0);
        let canvas = canvas(64, 64);
        // Mid-cell anchor; a boundary-exact anchor would be at the mercy of
        // float rounding in the floor.
        let anchor = (55.0, 55.0);

        let before = view.screen_to_raster(anchor.0, anchor.1, canvas);
        view.zoom_at(anchor, 1, canvas);
        let after = view.screen_to_raster(anchor.0, anchor.1, canvas);

        assert_eq!(view.zoom, 1.1);
        assert_eq!(before, after);
        assert_eq!(before, Some((15, 15)));
    }

    #[test]
    fn zoom_at_the_limit_leaves_pan_untouched() {
        let mut view = Viewport::new((200.0, 200.0));
        let canvas = canvas(64, 64);
        view.set_zoom(MAX_ZOOM, canvas);
        view.pan = (10.0, 10.0);

        view.zoom_at((0.0, 0.0), 1, canvas);
        assert_eq!(view.zoom, MAX_ZOOM);
        assert_eq!(view.pan, (10.0, 10.0));
    }

    #[test]
    fn pan_clamps_to_content_extent() {
        let mut view = Viewport::new((200.0, 200.0));
        let canvas = canvas(64, 64); // content 640x640 at zoom 1

        view.pan_by(-50.0, -50.0, canvas);
        assert_eq!(view.pan, (0.0, 0.0));

        view.pan_by(10_000.0, 10_000.0, canvas);
        assert_eq!(view.pan, (440.0, 440.0));
    }

    #[test]
    fn pan_is_pinned_when_content_fits_the_view() {
        let mut view = Viewport::new((400.0, 400.0));
        let canvas = canvas(16, 16);
        view.pan_by(30.0, 0.0, canvas);
        assert_eq!(view.pan, (0.0, 0.0));
    }

    #[test]
    fn arrow_pan_steps_one_cell_at_current_zoom() {
        let mut view = Viewport::new((100.0, 100.0));
        let canvas = canvas(64, 64);
        view.set_zoom(2.0, canvas);

        view.arrow_pan(PanDirection::Right, canvas);
        view.arrow_pan(PanDirection::Down, canvas);
        assert_eq!(view.pan, (20.0, 20.0));

        view.arrow_pan(PanDirection::Up, canvas);
        view.arrow_pan(PanDirection::Up, canvas);
        assert_eq!(view.pan, (20.0, 0.0));
    }
}
