//! Corner resize handles for free-form components.

use crate::freeform::{FreeformRect, MIN_HEIGHT, MIN_WIDTH};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Handle hit tolerance in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 8.0;

/// Which corner a handle sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandleKind {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl HandleKind {
    pub const ALL: [HandleKind; 4] = [
        HandleKind::TopLeft,
        HandleKind::TopRight,
        HandleKind::BottomLeft,
        HandleKind::BottomRight,
    ];

    fn moves_left_edge(self) -> bool {
        matches!(self, HandleKind::TopLeft | HandleKind::BottomLeft)
    }

    fn moves_top_edge(self) -> bool {
        matches!(self, HandleKind::TopLeft | HandleKind::TopRight)
    }

    /// CSS cursor shown over the handle.
    pub fn cursor(self) -> &'static str {
        match self {
            HandleKind::TopLeft | HandleKind::BottomRight => "nwse-resize",
            HandleKind::TopRight | HandleKind::BottomLeft => "nesw-resize",
        }
    }

    /// Handle position on `frame`.
    pub fn position(self, frame: &FreeformRect) -> Point {
        let rect = frame.as_rect();
        match self {
            HandleKind::TopLeft => Point::new(rect.x0, rect.y0),
            HandleKind::TopRight => Point::new(rect.x1, rect.y0),
            HandleKind::BottomLeft => Point::new(rect.x0, rect.y1),
            HandleKind::BottomRight => Point::new(rect.x1, rect.y1),
        }
    }

    /// Apply a logical pointer delta to `frame`.
    ///
    /// The corner opposite the handle stays put. When a minimum clamps the
    /// size, the moving edge stops rather than pushing the fixed edge.
    pub fn apply_resize(self, frame: FreeformRect, delta: Vec2) -> FreeformRect {
        let grow_x = if self.moves_left_edge() { -delta.x } else { delta.x };
        let grow_y = if self.moves_top_edge() { -delta.y } else { delta.y };
        let width = (frame.width + grow_x).max(MIN_WIDTH);
        let height = (frame.height + grow_y).max(MIN_HEIGHT);
        let x = if self.moves_left_edge() {
            frame.x + frame.width - width
        } else {
            frame.x
        };
        let y = if self.moves_top_edge() {
            frame.y + frame.height - height
        } else {
            frame.y
        };
        FreeformRect { x, y, width, height }
    }
}

/// A handle with its position in logical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub kind: HandleKind,
    pub position: Point,
}

impl Handle {
    pub fn new(kind: HandleKind, position: Point) -> Self {
        Self { kind, position }
    }

    /// Check if a logical point hits this handle.
    /// `tolerance` should already be divided by the zoom scale.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx.abs() <= tolerance && dy.abs() <= tolerance
    }
}

/// The four corner handles of a frame.
pub fn handles_for(frame: &FreeformRect) -> [Handle; 4] {
    HandleKind::ALL.map(|kind| Handle::new(kind, kind.position(frame)))
}

/// Find which handle (if any) is hit at the given logical point.
pub fn hit_test_handles(frame: &FreeformRect, point: Point, tolerance: f64) -> Option<HandleKind> {
    handles_for(frame)
        .into_iter()
        .find(|handle| handle.hit_test(point, tolerance))
        .map(|handle| handle.kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> FreeformRect {
        FreeformRect::new(100.0, 100.0, 400.0, 200.0)
    }

    #[test]
    fn test_handle_positions() {
        let handles = handles_for(&frame());
        assert_eq!(handles[0].position, Point::new(100.0, 100.0));
        assert_eq!(handles[3].position, Point::new(500.0, 300.0));
        assert_eq!(handles[3].kind, HandleKind::BottomRight);
    }

    #[test]
    fn test_hit_test_handles() {
        let f = frame();
        assert_eq!(hit_test_handles(&f, Point::new(503.0, 297.0), 8.0), Some(HandleKind::BottomRight));
        assert_eq!(hit_test_handles(&f, Point::new(98.0, 305.0), 8.0), Some(HandleKind::BottomLeft));
        assert_eq!(hit_test_handles(&f, Point::new(300.0, 200.0), 8.0), None);
    }

    #[test]
    fn test_bottom_right_keeps_origin() {
        let resized = HandleKind::BottomRight.apply_resize(frame(), Vec2::new(50.0, -20.0));
        assert_eq!(resized, FreeformRect::new(100.0, 100.0, 450.0, 180.0));
    }

    #[test]
    fn test_top_left_keeps_bottom_right() {
        let resized = HandleKind::TopLeft.apply_resize(frame(), Vec2::new(30.0, 40.0));
        assert_eq!(resized, FreeformRect::new(130.0, 140.0, 370.0, 160.0));
        let corner = HandleKind::BottomRight.position(&resized);
        assert_eq!(corner, Point::new(500.0, 300.0));
    }

    #[test]
    fn test_clamped_top_left_does_not_push_opposite_edge() {
        let resized = HandleKind::TopLeft.apply_resize(frame(), Vec2::new(1000.0, 1000.0));
        assert!((resized.width - MIN_WIDTH).abs() < f64::EPSILON);
        assert!((resized.height - MIN_HEIGHT).abs() < f64::EPSILON);
        assert_eq!(HandleKind::BottomRight.position(&resized), Point::new(500.0, 300.0));
    }

    #[test]
    fn test_top_right_and_bottom_left_anchors() {
        let top_right = HandleKind::TopRight.apply_resize(frame(), Vec2::new(10.0, -10.0));
        assert_eq!(HandleKind::BottomLeft.position(&top_right), Point::new(100.0, 300.0));
        assert!((top_right.width - 410.0).abs() < f64::EPSILON);
        assert!((top_right.height - 210.0).abs() < f64::EPSILON);

        let bottom_left = HandleKind::BottomLeft.apply_resize(frame(), Vec2::new(-10.0, 10.0));
        assert_eq!(HandleKind::TopRight.position(&bottom_left), Point::new(500.0, 100.0));
        assert!((bottom_left.width - 410.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cursor_names() {
        assert_eq!(HandleKind::TopLeft.cursor(), "nwse-resize");
        assert_eq!(HandleKind::BottomLeft.cursor(), "nesw-resize");
    }
}
