//! Coordinate transforms between document, raster, and viewport space.
//!
//! Three spaces are reconciled here:
//!
//! 1. **Document space** — native page units, relative to the page's origin
//!    corner (so x runs over `[0, page width]` and y over `[0, page height]`).
//!    The vertical axis direction depends on the document convention, see
//!    [`YAxis`].
//! 2. **Raster space** — pixel coordinates of a fixed-scale preview image of
//!    the page, top-left origin.
//! 3. **Viewport space** — the visible window into the zoomed/panned raster,
//!    top-left origin, on-screen pixels.
//!
//! Document→Raster is a uniform scale plus (for bottom-left-origin documents)
//! a vertical flip; Raster→Viewport is `v = r * zoom - pan`. The inverse is
//! the exact algebraic inverse, so a rectangle drawn in the viewport
//! round-trips to document units and back to floating-point precision.

use crate::geometry::{PageBBox, Rect};

/// Smallest permitted zoom factor.
pub const ZOOM_MIN: f64 = 0.2;
/// Largest permitted zoom factor.
pub const ZOOM_MAX: f64 = 10.0;

/// Zoom step applied by one wheel notch / zoom action.
pub const ZOOM_STEP: f64 = 1.25;

/// Vertical-axis convention of document space.
///
/// PDF pages are bottom-left origin (y grows upward); raster images are
/// top-left origin (y grows downward). The flip between the two is the single
/// most error-prone step of the chain, so it is isolated in one place
/// ([`ViewTransform::flip_y`]) rather than inlined into each transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YAxis {
    /// y = 0 at the bottom of the page, growing upward (PDF native).
    BottomLeft,
    /// y = 0 at the top of the page, growing downward.
    TopLeft,
}

/// Parameters of the Document → Raster → Viewport transform chain.
///
/// Owns no pixels and performs no rendering; the hosting front end renders
/// the preview image and feeds pointer coordinates through this struct.
#[derive(Debug, Clone)]
pub struct ViewTransform {
    page: PageBBox,
    /// Raster pixels per document unit.
    raster_scale: f64,
    y_axis: YAxis,
    zoom: f64,
    pan_x: f64,
    pan_y: f64,
    view_width: f64,
    view_height: f64,
}

impl ViewTransform {
    /// Create a transform at zoom 1.0 with no pan.
    pub fn new(
        page: PageBBox,
        raster_scale: f64,
        view_width: f64,
        view_height: f64,
        y_axis: YAxis,
    ) -> Self {
        Self {
            page,
            raster_scale,
            y_axis,
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            view_width,
            view_height,
        }
    }

    pub fn page(&self) -> &PageBBox {
        &self.page
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> (f64, f64) {
        (self.pan_x, self.pan_y)
    }

    /// Raster image width in pixels.
    pub fn raster_width(&self) -> f64 {
        self.page.width() * self.raster_scale
    }

    /// Raster image height in pixels.
    pub fn raster_height(&self) -> f64 {
        self.page.height() * self.raster_scale
    }

    /// The vertical flip between document and raster space.
    ///
    /// Involutive: applying it twice returns the input, which is what makes
    /// the forward and inverse rect transforms exact mirrors of each other.
    fn flip_y(&self, raster_y: f64) -> f64 {
        self.raster_height() - raster_y
    }

    fn doc_to_raster(&self, x: f64, y: f64) -> (f64, f64) {
        let rx = x * self.raster_scale;
        let ry = y * self.raster_scale;
        match self.y_axis {
            YAxis::BottomLeft => (rx, self.flip_y(ry)),
            YAxis::TopLeft => (rx, ry),
        }
    }

    fn raster_to_doc(&self, rx: f64, ry: f64) -> (f64, f64) {
        let ry = match self.y_axis {
            YAxis::BottomLeft => self.flip_y(ry),
            YAxis::TopLeft => ry,
        };
        (rx / self.raster_scale, ry / self.raster_scale)
    }

    fn raster_to_viewport(&self, rx: f64, ry: f64) -> (f64, f64) {
        (rx * self.zoom - self.pan_x, ry * self.zoom - self.pan_y)
    }

    fn viewport_to_raster(&self, vx: f64, vy: f64) -> (f64, f64) {
        ((vx + self.pan_x) / self.zoom, (vy + self.pan_y) / self.zoom)
    }

    /// Transform a document-space rectangle into viewport pixels.
    pub fn to_viewport(&self, rect: &Rect) -> Rect {
        let (ax, ay) = self.doc_to_raster(rect.x0, rect.y0);
        let (bx, by) = self.doc_to_raster(rect.x1, rect.y1);
        let (ax, ay) = self.raster_to_viewport(ax, ay);
        let (bx, by) = self.raster_to_viewport(bx, by);
        Rect::normalized(ax, ay, bx, by)
    }

    /// Transform a viewport-space rectangle into document units.
    pub fn to_document(&self, rect: &Rect) -> Rect {
        let (ax, ay) = self.viewport_to_raster(rect.x0, rect.y0);
        let (bx, by) = self.viewport_to_raster(rect.x1, rect.y1);
        let (ax, ay) = self.raster_to_doc(ax, ay);
        let (bx, by) = self.raster_to_doc(bx, by);
        Rect::normalized(ax, ay, bx, by)
    }

    /// Transform a single viewport point into document units.
    pub fn point_to_document(&self, vx: f64, vy: f64) -> (f64, f64) {
        let (rx, ry) = self.viewport_to_raster(vx, vy);
        self.raster_to_doc(rx, ry)
    }

    /// Change the zoom factor, keeping the viewport center anchored.
    ///
    /// The point at the viewport's geometric center is captured as a
    /// normalized raster fraction before the zoom change and re-applied
    /// after, so the view stays anchored instead of jumping. The factor is
    /// clamped to `[ZOOM_MIN, ZOOM_MAX]` and the pan re-clamped afterwards.
    pub fn set_zoom(&mut self, zoom: f64) {
        let zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
        if zoom == self.zoom {
            return;
        }

        let center_x = self.pan_x + self.view_width / 2.0;
        let center_y = self.pan_y + self.view_height / 2.0;
        let rel_cx = center_x / (self.raster_width() * self.zoom);
        let rel_cy = center_y / (self.raster_height() * self.zoom);

        self.zoom = zoom;

        self.pan_x = rel_cx * self.raster_width() * self.zoom - self.view_width / 2.0;
        self.pan_y = rel_cy * self.raster_height() * self.zoom - self.view_height / 2.0;
        self.clamp_pan();
    }

    /// Shift the pan offset by `(dx, dy)` viewport pixels, then clamp.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
        self.clamp_pan();
    }

    /// Resize the visible window (host window resize), re-clamping the pan.
    pub fn set_view_size(&mut self, width: f64, height: f64) {
        self.view_width = width;
        self.view_height = height;
        self.clamp_pan();
    }

    /// Clamp the pan so the visible window never extends outside the zoomed
    /// raster: each axis stays within `[0, zoomed extent - view extent]`
    /// (collapsing to 0 when the raster is smaller than the window).
    fn clamp_pan(&mut self) {
        let max_x = (self.raster_width() * self.zoom - self.view_width).max(0.0);
        let max_y = (self.raster_height() * self.zoom - self.view_height).max(0.0);
        self.pan_x = self.pan_x.clamp(0.0, max_x);
        self.pan_y = self.pan_y.clamp(0.0, max_y);
    }
}
