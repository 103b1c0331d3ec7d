//! Shared geometry calculations for annotation drawing

use crate::domain::Point;

/// Arrow geometry constants
pub mod arrow {
    use crate::domain::Point;

    /// Distance from the tip back to the base of the head
    pub const TIP_LENGTH: f32 = 15.0;
    /// Width of the head base
    pub const TIP_WIDTH: f32 = 12.0;
    /// Head spread bounds, in degrees off the shaft direction
    pub const MIN_SPREAD: f32 = 150.0;
    pub const MAX_SPREAD: f32 = 175.0;
    /// Minimum arrow length to be drawn
    pub const MIN_LENGTH: f32 = 1.0;

    /// Spread grows slowly with the shaft angle
    pub fn spread_for(angle_deg: f32) -> f32 {
        (165.0 + angle_deg.abs() / 15.0).clamp(MIN_SPREAD, MAX_SPREAD)
    }

    /// The two base corners of the triangular head sitting on `head`
    ///
    /// The shaft runs from `head` to `tail`.
    pub fn head_points(head: Point, tail: Point) -> Option<(Point, Point)> {
        let (dx, dy) = (tail.x - head.x, tail.y - head.y);
        if (dx * dx + dy * dy).sqrt() < MIN_LENGTH {
            return None;
        }

        let angle = dy.atan2(dx).to_degrees();
        let spread = spread_for(angle);
        let half = TIP_WIDTH / 2.0;

        let p1 = rotate(head.offset(-TIP_LENGTH, half), head, angle + spread);
        let p2 = rotate(head.offset(-TIP_LENGTH, -half), head, angle - spread);
        Some((p1, p2))
    }

    fn rotate(p: Point, center: Point, angle_deg: f32) -> Point {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        let (dx, dy) = (p.x - center.x, p.y - center.y);
        Point::new(
            center.x + dx * cos - dy * sin,
            center.y + dx * sin + dy * cos,
        )
    }
}

/// Shape (rectangle/circle) geometry constants
pub mod shape {
    /// Ellipse bezier approximation constant: 4/3 * (sqrt(2) - 1)
    pub const BEZIER_K: f32 = 0.552_284_8;
}

/// Highlight strokes drawn over annotations
pub mod highlight {
    /// White outline around a previewed target
    pub const TARGET_WIDTH: f32 = 2.0;
    /// Dashed green frame around a selected annotation
    pub const SELECTION_WIDTH: f32 = 4.0;
    pub const SELECTION_DASH: [f32; 2] = [4.0, 4.0];
}

/// Calculate ellipse center and radii from bounding box
#[inline]
pub fn ellipse_from_bounds(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> (f32, f32, f32, f32) {
    let cx = (min_x + max_x) * 0.5;
    let cy = (min_y + max_y) * 0.5;
    let rx = ((max_x - min_x) * 0.5).max(1.0);
    let ry = ((max_y - min_y) * 0.5).max(1.0);
    (cx, cy, rx, ry)
}

/// Click cursor outline, in a 20x30 box with the hotspot at the origin
pub fn cursor_polygon(origin: Point) -> [Point; 7] {
    [
        (0.0, 0.0),
        (0.0, 24.0),
        (6.0, 18.0),
        (11.0, 30.0),
        (15.0, 28.0),
        (10.0, 17.0),
        (18.0, 17.0),
    ]
    .map(|(x, y)| origin.offset(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spread_is_clamped() {
        assert_eq!(arrow::spread_for(0.0), 165.0);
        assert_eq!(arrow::spread_for(180.0), 175.0);
        assert_eq!(arrow::spread_for(-90.0), 171.0);
    }

    #[test]
    fn test_head_points_lie_along_the_shaft() {
        let head = Point::new(100.0, 100.0);
        let tail = Point::new(100.0, 20.0);
        let (p1, p2) = arrow::head_points(head, tail).unwrap();
        for p in [p1, p2] {
            // Both base corners sit between head and tail, close to the tip
            assert!(p.y < head.y && p.y > tail.y, "{p:?}");
            let d = head.distance(p);
            assert!((d - 16.155).abs() < 0.01, "{d}");
        }
        // Mirrored around the shaft
        assert!(((p1.x - 100.0) + (p2.x - 100.0)).abs() < 0.01);
        assert!((p1.y - p2.y).abs() < 0.01);
        assert!(p1.x != p2.x);
    }

    #[test]
    fn test_degenerate_arrow_has_no_head() {
        let p = Point::new(5.0, 5.0);
        assert!(arrow::head_points(p, p).is_none());
    }

    #[test]
    fn test_cursor_fits_icon() {
        let points = cursor_polygon(Point::new(50.0, 30.0));
        assert!(points.iter().all(|p| (50.0..=70.0).contains(&p.x) && (30.0..=60.0).contains(&p.y)));
    }
}
