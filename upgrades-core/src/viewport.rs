//! Zoom and pan over the logical canvas.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::TimelineConfig;

const ZOOM_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// The visible window of the logical canvas, as an SVG `viewBox`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl fmt::Display for ViewBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ViewportState {
    pub zoom: f64,
    pub pan: Point,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Point::default(),
        }
    }
}

/// Zoom/pan state plus the anchor of an in-progress drag.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    state: ViewportState,
    zoom_min: f64,
    zoom_max: f64,
    zoom_step: f64,
    drag_anchor: Option<Point>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(&TimelineConfig::default())
    }
}

impl Viewport {
    pub fn new(config: &TimelineConfig) -> Self {
        Self {
            state: ViewportState::default(),
            zoom_min: config.zoom_min,
            zoom_max: config.zoom_max,
            zoom_step: config.zoom_step,
            drag_anchor: None,
        }
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn zoom(&self) -> f64 {
        self.state.zoom
    }

    pub fn pan(&self) -> Point {
        self.state.pan
    }

    pub fn can_zoom_in(&self) -> bool {
        self.state.zoom < self.zoom_max - ZOOM_EPSILON
    }

    pub fn can_zoom_out(&self) -> bool {
        self.state.zoom > self.zoom_min + ZOOM_EPSILON
    }

    /// Returns whether the zoom changed.
    pub fn zoom_in(&mut self) -> bool {
        if !self.can_zoom_in() {
            return false;
        }
        self.state.zoom = (self.state.zoom * self.zoom_step).min(self.zoom_max);
        true
    }

    /// Returns whether the zoom changed.
    pub fn zoom_out(&mut self) -> bool {
        if !self.can_zoom_out() {
            return false;
        }
        self.state.zoom = (self.state.zoom / self.zoom_step).max(self.zoom_min);
        true
    }

    pub fn reset(&mut self) {
        self.state = ViewportState::default();
        self.drag_anchor = None;
    }

    /// Panning only makes sense once the canvas no longer fits.
    pub fn can_pan(&self) -> bool {
        self.state.zoom > 1.0 + ZOOM_EPSILON
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    /// Starts a drag at `pointer`. Refused unless zoomed in.
    pub fn begin_drag(&mut self, pointer: Point) -> bool {
        if !self.can_pan() {
            return false;
        }
        self.drag_anchor = Some(pointer);
        true
    }

    /// Moves the pan by the pointer delta scaled to content units and
    /// returns that device-space delta. `None` when not dragging.
    pub fn drag_to(&mut self, pointer: Point) -> Option<Point> {
        let last = self.drag_anchor.as_mut()?;
        let delta = pointer - *last;
        *last = pointer;
        self.state.pan.x -= delta.x / self.state.zoom;
        self.state.pan.y -= delta.y / self.state.zoom;
        Some(delta)
    }

    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    /// Visible window for a canvas of `base` logical size.
    pub fn view_box(&self, base: Size) -> ViewBox {
        ViewBox {
            x: self.state.pan.x,
            y: self.state.pan.y,
            width: base.width / self.state.zoom,
            height: base.height / self.state.zoom,
        }
    }

    /// Maps a pointer position inside the rendered element back to canvas
    /// coordinates.
    pub fn to_content(&self, device: Point, element: Size, base: Size) -> Point {
        let view = self.view_box(base);
        let sx = if element.width > 0.0 {
            view.width / element.width
        } else {
            0.0
        };
        let sy = if element.height > 0.0 {
            view.height / element.height
        } else {
            0.0
        };
        Point::new(view.x + device.x * sx, view.y + device.y * sy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_zoom_steps_do_not_clamp() {
        let mut viewport = Viewport::default();
        for _ in 0..3 {
            assert!(viewport.zoom_in());
        }
        assert!((viewport.zoom() - 1.728).abs() < 1e-9);
    }

    #[test]
    fn zoom_stays_within_bounds() {
        let mut viewport = Viewport::default();
        for _ in 0..50 {
            viewport.zoom_in();
            assert!(viewport.zoom() <= 3.0);
        }
        assert_eq!(viewport.zoom(), 3.0);
        assert!(!viewport.can_zoom_in());
        assert!(!viewport.zoom_in());

        for _ in 0..50 {
            viewport.zoom_out();
            assert!(viewport.zoom() >= 0.5);
        }
        assert_eq!(viewport.zoom(), 0.5);
        assert!(!viewport.can_zoom_out());
    }

    #[test]
    fn reset_is_idempotent() {
        let mut viewport = Viewport::default();
        viewport.zoom_in();
        viewport.zoom_in();
        viewport.begin_drag(Point::new(10.0, 10.0));
        viewport.drag_to(Point::new(40.0, 25.0));

        viewport.reset();
        let once = viewport.clone();
        viewport.reset();
        assert_eq!(viewport, once);
        assert_eq!(viewport.state(), ViewportState::default());
    }

    #[test]
    fn drag_requires_zoom_above_one() {
        let mut viewport = Viewport::default();
        assert!(!viewport.begin_drag(Point::new(0.0, 0.0)));
        assert_eq!(viewport.drag_to(Point::new(50.0, 0.0)), None);
        assert_eq!(viewport.pan(), Point::default());
    }

    #[test]
    fn drag_pans_by_delta_over_zoom() {
        let mut viewport = Viewport::default();
        viewport.zoom_in();
        viewport.zoom_in();
        let zoom = viewport.zoom();

        assert!(viewport.begin_drag(Point::new(100.0, 100.0)));
        viewport.drag_to(Point::new(70.0, 130.0));
        viewport.drag_to(Point::new(60.0, 130.0));
        viewport.end_drag();

        let pan = viewport.pan();
        assert!((pan.x - 40.0 / zoom).abs() < 1e-9);
        assert!((pan.y + 30.0 / zoom).abs() < 1e-9);
        assert!(!viewport.is_dragging());
    }

    #[test]
    fn view_box_shrinks_with_zoom_and_maps_back() {
        let mut viewport = Viewport::default();
        let base = Size::new(1200.0, 600.0);
        assert_eq!(viewport.view_box(base).to_string(), "0 0 1200 600");

        viewport.zoom_in();
        viewport.zoom_in();
        viewport.zoom_in();
        viewport.zoom_in();
        let view = viewport.view_box(base);
        assert!((view.width - 1200.0 / viewport.zoom()).abs() < 1e-9);

        let content = viewport.to_content(Point::new(600.0, 300.0), base, base);
        assert!((content.x - view.width / 2.0).abs() < 1e-9);
        assert!((content.y - view.height / 2.0).abs() < 1e-9);
    }
}
