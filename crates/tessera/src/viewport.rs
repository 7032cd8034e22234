//! Zoom and pan state for a diagram canvas.
//!
//! The viewport maps world coordinates (where layouts place nodes) to
//! screen coordinates (canvas pixels):
//!
//! ```text
//! screen = world * zoom + pan
//! world  = (screen - pan) / zoom
//! ```
//!
//! Zoom is always kept inside the configured limits. Zoom gestures keep one
//! screen point fixed, chosen by the [`ZoomAnchor`] policy.

use log::trace;
use serde::Deserialize;

use tessera_core::geometry::{Bounds, Point, Size};

use crate::config::ViewportConfig;

/// Which screen point stays fixed while zooming.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomAnchor {
    /// The center of the canvas.
    #[default]
    Center,
    /// The pointer position, falling back to the canvas center when unknown.
    Cursor,
}

/// Zoom and pan over a canvas of a given size.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    zoom: f32,
    pan: Point,
    canvas: Size,
    min_zoom: f32,
    max_zoom: f32,
    zoom_in_step: f32,
    zoom_out_step: f32,
    anchor: ZoomAnchor,
}

impl Viewport {
    /// Creates an identity viewport for a canvas.
    pub fn new(config: &ViewportConfig, canvas: Size) -> Self {
        let min_zoom = config.min_zoom();
        let max_zoom = config.max_zoom().max(min_zoom);
        Self {
            zoom: 1.0f32.max(min_zoom).min(max_zoom),
            pan: Point::default(),
            canvas,
            min_zoom,
            max_zoom,
            zoom_in_step: config.zoom_in_step(),
            zoom_out_step: config.zoom_out_step(),
            anchor: config.zoom_anchor(),
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn canvas_size(&self) -> Size {
        self.canvas
    }

    pub fn anchor(&self) -> ZoomAnchor {
        self.anchor
    }

    /// Updates the canvas size. Zoom and pan are left untouched.
    pub fn set_canvas_size(&mut self, canvas: Size) {
        self.canvas = canvas;
    }

    /// Zooms in by one step around the policy anchor.
    ///
    /// `cursor` is the pointer position in screen coordinates, if known.
    pub fn zoom_in(&mut self, cursor: Option<Point>) -> bool {
        let anchor = self.anchor_point(cursor);
        self.zoom_by(self.zoom_in_step, anchor)
    }

    /// Zooms out by one step around the policy anchor.
    pub fn zoom_out(&mut self, cursor: Option<Point>) -> bool {
        let anchor = self.anchor_point(cursor);
        self.zoom_by(self.zoom_out_step, anchor)
    }

    /// Multiplies the zoom by `factor`, keeping `anchor` (screen space) fixed.
    ///
    /// Returns `true` when the zoom changed. Non-finite or non-positive
    /// factors are ignored.
    pub fn zoom_by(&mut self, factor: f32, anchor: Point) -> bool {
        if !(factor.is_finite() && factor > 0.0) {
            return false;
        }
        let previous = self.zoom;
        let zoom = self.clamp_zoom(previous * factor);
        if (zoom - previous).abs() <= f32::EPSILON {
            return false;
        }

        let world = self.screen_to_world(anchor);
        self.zoom = zoom;
        self.pan = anchor.sub_point(world.scale(zoom));
        trace!(previous, zoom, anchor:?; "Viewport zoomed");
        true
    }

    /// Moves the content by a screen-space delta.
    pub fn pan_by(&mut self, delta: Point) {
        if delta.x().is_finite() && delta.y().is_finite() {
            self.pan = self.pan.add_point(delta);
        }
    }

    /// Returns to zoom 1 and no pan.
    pub fn reset(&mut self) {
        self.zoom = self.clamp_zoom(1.0);
        self.pan = Point::default();
    }

    /// Zooms and pans so `bounds` fits the canvas with `padding` on each side.
    ///
    /// Returns `false` and leaves the viewport unchanged when `bounds` has no
    /// area.
    pub fn zoom_to_fit(&mut self, bounds: Bounds, padding: f32) -> bool {
        if !(bounds.width() > 0.0 && bounds.height() > 0.0) {
            return false;
        }
        let padding = padding.max(0.0);
        let available_width = (self.canvas.width() - 2.0 * padding).max(1.0);
        let available_height = (self.canvas.height() - 2.0 * padding).max(1.0);

        let zoom = self.clamp_zoom(
            (available_width / bounds.width()).min(available_height / bounds.height()),
        );
        self.zoom = zoom;
        self.pan = self.canvas.center().sub_point(bounds.center().scale(zoom));
        trace!(zoom, pan:? = self.pan; "Viewport fitted to bounds");
        true
    }

    pub fn world_to_screen(&self, point: Point) -> Point {
        point.scale(self.zoom).add_point(self.pan)
    }

    pub fn screen_to_world(&self, point: Point) -> Point {
        point.sub_point(self.pan).scale(1.0 / self.zoom)
    }

    pub fn world_rect_to_screen(&self, rect: Bounds) -> Bounds {
        Bounds::from_corners(
            self.world_to_screen(rect.min_point()),
            self.world_to_screen(rect.max_point()),
        )
    }

    pub fn screen_rect_to_world(&self, rect: Bounds) -> Bounds {
        Bounds::from_corners(
            self.screen_to_world(rect.min_point()),
            self.screen_to_world(rect.max_point()),
        )
    }

    fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.max(self.min_zoom).min(self.max_zoom)
    }

    fn anchor_point(&self, cursor: Option<Point>) -> Point {
        match (self.anchor, cursor) {
            (ZoomAnchor::Cursor, Some(cursor)) => cursor,
            _ => self.canvas.center(),
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(&ViewportConfig::default(), Size::new(800.0, 600.0))
    }

    fn assert_point_eq(a: Point, b: Point) {
        assert!(approx_eq!(f32, a.x(), b.x(), epsilon = 0.001), "{a:?} != {b:?}");
        assert!(approx_eq!(f32, a.y(), b.y(), epsilon = 0.001), "{a:?} != {b:?}");
    }

    #[test]
    fn test_identity_transform() {
        let viewport = viewport();
        let point = Point::new(12.0, 34.0);
        assert_eq!(viewport.world_to_screen(point), point);
        assert_eq!(viewport.screen_to_world(point), point);
    }

    #[test]
    fn test_zoom_in_keeps_center_fixed() {
        let mut viewport = viewport();
        let center = Point::new(400.0, 300.0);
        let before = viewport.screen_to_world(center);

        assert!(viewport.zoom_in(Some(Point::new(10.0, 10.0))));
        assert!(approx_eq!(f32, viewport.zoom(), 1.1));
        assert_point_eq(viewport.world_to_screen(before), center);
    }

    #[test]
    fn test_cursor_anchor_keeps_cursor_fixed() {
        let config: ViewportConfig = serde_json::from_str(r#"{"zoom_anchor": "cursor"}"#).unwrap();
        let mut viewport = Viewport::new(&config, Size::new(800.0, 600.0));
        viewport.pan_by(Point::new(25.0, -40.0));

        let cursor = Point::new(120.0, 80.0);
        let before = viewport.screen_to_world(cursor);
        assert!(viewport.zoom_out(Some(cursor)));
        assert_point_eq(viewport.world_to_screen(before), cursor);
    }

    #[test]
    fn test_cursor_anchor_without_cursor_uses_center() {
        let config: ViewportConfig = serde_json::from_str(r#"{"zoom_anchor": "cursor"}"#).unwrap();
        let mut viewport = Viewport::new(&config, Size::new(800.0, 600.0));
        let center = Point::new(400.0, 300.0);
        let before = viewport.screen_to_world(center);

        viewport.zoom_in(None);
        assert_point_eq(viewport.world_to_screen(before), center);
    }

    #[test]
    fn test_zoom_clamps_at_limits() {
        let mut viewport = viewport();
        for _ in 0..100 {
            viewport.zoom_in(None);
        }
        assert_eq!(viewport.zoom(), 4.0);
        assert!(!viewport.zoom_in(None));

        for _ in 0..200 {
            viewport.zoom_out(None);
        }
        assert_eq!(viewport.zoom(), 0.25);
    }

    #[test]
    fn test_invalid_zoom_factor_ignored() {
        let mut viewport = viewport();
        assert!(!viewport.zoom_by(f32::NAN, Point::default()));
        assert!(!viewport.zoom_by(-2.0, Point::default()));
        assert!(!viewport.zoom_by(0.0, Point::default()));
        assert_eq!(viewport.zoom(), 1.0);
    }

    #[test]
    fn test_pan_accumulates_and_reset() {
        let mut viewport = viewport();
        viewport.pan_by(Point::new(10.0, 5.0));
        viewport.pan_by(Point::new(-3.0, 2.0));
        assert_eq!(viewport.pan(), Point::new(7.0, 7.0));

        viewport.zoom_in(None);
        viewport.reset();
        assert_eq!(viewport.zoom(), 1.0);
        assert_eq!(viewport.pan(), Point::default());
    }

    #[test]
    fn test_zoom_to_fit_centers_content() {
        let mut viewport = viewport();
        let bounds = Bounds::new_from_top_left(Point::new(100.0, 100.0), Size::new(200.0, 100.0));

        assert!(viewport.zoom_to_fit(bounds, 20.0));
        // (800 - 40) / 200 = 3.8, (600 - 40) / 100 = 5.6
        assert!(approx_eq!(f32, viewport.zoom(), 3.8, epsilon = 0.0001));
        assert_point_eq(viewport.world_to_screen(bounds.center()), Point::new(400.0, 300.0));

        let empty = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(0.0, 10.0));
        assert!(!viewport.zoom_to_fit(empty, 0.0));
    }

    #[test]
    fn test_rect_mapping() {
        let mut viewport = viewport();
        viewport.zoom_by(2.0, Point::default());
        viewport.pan_by(Point::new(10.0, 20.0));

        let world = Bounds::new_from_top_left(Point::new(5.0, 5.0), Size::new(10.0, 20.0));
        let screen = viewport.world_rect_to_screen(world);
        assert_eq!(screen.min_point(), Point::new(20.0, 30.0));
        assert_eq!(screen.to_size(), Size::new(20.0, 40.0));
        assert_eq!(viewport.screen_rect_to_world(screen), world);
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    #[derive(Debug, Clone)]
    enum Gesture {
        ZoomIn(Option<(f32, f32)>),
        ZoomOut(Option<(f32, f32)>),
        ZoomBy(f32, (f32, f32)),
        Pan(f32, f32),
        Fit(f32, f32, f32, f32),
        Reset,
    }

    // ==================== Strategies ====================

    fn coordinate() -> impl Strategy<Value = f32> {
        -5000.0f32..5000.0
    }

    fn gesture_strategy() -> impl Strategy<Value = Gesture> {
        prop_oneof![
            proptest::option::of((coordinate(), coordinate())).prop_map(Gesture::ZoomIn),
            proptest::option::of((coordinate(), coordinate())).prop_map(Gesture::ZoomOut),
            (0.001f32..1000.0, (coordinate(), coordinate()))
                .prop_map(|(factor, anchor)| Gesture::ZoomBy(factor, anchor)),
            (coordinate(), coordinate()).prop_map(|(dx, dy)| Gesture::Pan(dx, dy)),
            (coordinate(), coordinate(), 0.0f32..5000.0, 0.0f32..5000.0)
                .prop_map(|(x, y, w, h)| Gesture::Fit(x, y, w, h)),
            Just(Gesture::Reset),
        ]
    }

    // ==================== Property Checks ====================

    fn check_zoom_stays_in_range(gestures: Vec<Gesture>) -> Result<(), TestCaseError> {
        let mut viewport = Viewport::new(&ViewportConfig::default(), Size::new(1024.0, 768.0));

        for gesture in gestures {
            match gesture {
                Gesture::ZoomIn(cursor) => {
                    viewport.zoom_in(cursor.map(|(x, y)| Point::new(x, y)));
                }
                Gesture::ZoomOut(cursor) => {
                    viewport.zoom_out(cursor.map(|(x, y)| Point::new(x, y)));
                }
                Gesture::ZoomBy(factor, (x, y)) => {
                    viewport.zoom_by(factor, Point::new(x, y));
                }
                Gesture::Pan(dx, dy) => viewport.pan_by(Point::new(dx, dy)),
                Gesture::Fit(x, y, w, h) => {
                    let bounds = Bounds::new_from_top_left(Point::new(x, y), Size::new(w, h));
                    viewport.zoom_to_fit(bounds, 16.0);
                }
                Gesture::Reset => viewport.reset(),
            }

            prop_assert!(
                (0.25..=4.0).contains(&viewport.zoom()),
                "zoom {} left range",
                viewport.zoom()
            );
            prop_assert!(viewport.pan().x().is_finite() && viewport.pan().y().is_finite());
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn zoom_stays_in_range(gestures in prop::collection::vec(gesture_strategy(), 0..64)) {
            check_zoom_stays_in_range(gestures)?;
        }
    }
}
