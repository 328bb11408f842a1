use crate::config::Tunables;
use crate::layout::{Bounds, Point};

/// View onto a scene.
///
/// `view_percent` is the portion of the scene extent visible in the viewport:
/// 1.0 fits the whole scene, larger values zoom out, smaller values zoom in.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    center: Point,
    view_percent: f64,
    viewport_width: f64,
    viewport_height: f64,
    scene_bounds: Bounds,
}

impl Camera {
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            center: Point::ORIGIN,
            view_percent: 1.0,
            viewport_width: viewport_width.max(1.0),
            viewport_height: viewport_height.max(1.0),
            scene_bounds: Bounds::around(Point::ORIGIN, 1.0, 1.0),
        }
    }

    /// Centers on `bounds` and resets the zoom to `view_percent`.
    pub fn fit(&mut self, bounds: Bounds, view_percent: f64) {
        self.scene_bounds = bounds;
        self.center = bounds.center();
        self.view_percent = view_percent;
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn view_percent(&self) -> f64 {
        self.view_percent
    }

    /// Sets the zoom, clamped to the configured bounds.
    pub fn set_view_percent(&mut self, view_percent: f64, tunables: &Tunables) {
        self.view_percent = clamp_view_percent(view_percent, tunables);
    }

    pub fn viewport(&self) -> (f64, f64) {
        (self.viewport_width, self.viewport_height)
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport_width = width.max(1.0);
        self.viewport_height = height.max(1.0);
    }

    /// Device pixels per scene unit at the current zoom.
    pub fn pixels_per_unit(&self) -> f64 {
        let scene_width = self.scene_bounds.width().max(1.0);
        let scene_height = self.scene_bounds.height().max(1.0);
        let fit = (self.viewport_width / scene_width).min(self.viewport_height / scene_height);
        fit / self.view_percent
    }

    pub fn view_to_scene(&self, x: f64, y: f64) -> Point {
        let ppu = self.pixels_per_unit();
        Point::new(
            self.center.x + (x - self.viewport_width / 2.0) / ppu,
            self.center.y + (y - self.viewport_height / 2.0) / ppu,
        )
    }

    pub fn scene_to_view(&self, point: Point) -> (f64, f64) {
        let ppu = self.pixels_per_unit();
        (
            (point.x - self.center.x) * ppu + self.viewport_width / 2.0,
            (point.y - self.center.y) * ppu + self.viewport_height / 2.0,
        )
    }

    /// Moves the view so content follows a pointer moved by `(dx, dy)` pixels.
    pub fn pan_pixels(&mut self, dx: f64, dy: f64) {
        let ppu = self.pixels_per_unit();
        self.center = self.center.offset(-dx / ppu, -dy / ppu);
    }

    /// Visible scene region.
    pub fn visible_bounds(&self) -> Bounds {
        let ppu = self.pixels_per_unit();
        Bounds::around(
            self.center,
            self.viewport_width / ppu,
            self.viewport_height / ppu,
        )
    }
}

pub fn clamp_view_percent(view_percent: f64, tunables: &Tunables) -> f64 {
    let lower = view_percent.max(tunables.min_view_percent);
    match tunables.max_view_percent {
        Some(max) => lower.min(max),
        None => lower,
    }
}
