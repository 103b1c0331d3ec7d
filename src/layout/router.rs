//! Arrow auto-routing around a target rectangle
//!
//! The rectangle is cut into thirds along each axis. Six separator lines
//! through opposite third-points split the plane into the eight sectors an
//! arrow can leave from. The sectors follow the rectangle's proportions, so
//! they are not evenly spaced in angle.

use serde::{Deserialize, Serialize};

use crate::domain::{Point, Rect};
use crate::error::GeometryError;

/// Distance between the perimeter anchor and the arrow tail
pub const STAND_OFF: f32 = 80.0;

/// Per-axis stand-off for diagonal sectors, keeps the arrow length constant
pub const DIAGONAL_STAND_OFF: f32 = 56.568_542; // (80^2 / 2).sqrt()

/// Compass region around the target the arrow leaves from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sector {
    TopCenter,
    TopRight,
    RightCenter,
    BottomRight,
    BottomCenter,
    BottomLeft,
    LeftCenter,
    TopLeft,
}

impl Sector {
    pub const ALL: [Sector; 8] = [
        Sector::TopCenter,
        Sector::TopRight,
        Sector::RightCenter,
        Sector::BottomRight,
        Sector::BottomCenter,
        Sector::BottomLeft,
        Sector::LeftCenter,
        Sector::TopLeft,
    ];

    /// Unit direction of the tail relative to the head, one of -1, 0, 1 per axis
    pub fn direction(self) -> (f32, f32) {
        match self {
            Sector::TopCenter => (0.0, -1.0),
            Sector::TopRight => (1.0, -1.0),
            Sector::RightCenter => (1.0, 0.0),
            Sector::BottomRight => (1.0, 1.0),
            Sector::BottomCenter => (0.0, 1.0),
            Sector::BottomLeft => (-1.0, 1.0),
            Sector::LeftCenter => (-1.0, 0.0),
            Sector::TopLeft => (-1.0, -1.0),
        }
    }

    /// Offset from head to tail
    pub fn tail_offset(self) -> Point {
        let (dx, dy) = self.direction();
        let reach = if dx != 0.0 && dy != 0.0 {
            DIAGONAL_STAND_OFF
        } else {
            STAND_OFF
        };
        Point::new(dx * reach, dy * reach)
    }

    pub fn points_left(self) -> bool {
        self.direction().0 < 0.0
    }
}

/// Routed arrow geometry
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Route {
    /// On the target's perimeter
    pub head: Point,
    pub tail: Point,
    pub sector: Sector,
}

/// `y = m·x + b` through two reference points
#[derive(Clone, Copy, Debug)]
struct Separator {
    m: f32,
    b: f32,
}

impl Separator {
    fn through(a: Point, c: Point) -> Self {
        let m = (c.y - a.y) / (c.x - a.x);
        Self { m, b: a.y - m * a.x }
    }

    fn above(&self, p: Point) -> bool {
        p.y > self.m * p.x + self.b
    }

    fn below(&self, p: Point) -> bool {
        p.y < self.m * p.x + self.b
    }
}

/// Perimeter anchors and separators of one target rectangle
#[derive(Clone, Debug)]
pub struct AnchorRouter {
    lines: [Separator; 6],
    anchors: Anchors,
}

#[derive(Clone, Copy, Debug)]
struct Anchors {
    top: [Point; 3],
    right: [Point; 3],
    bottom: [Point; 3],
    left: [Point; 3],
}

impl AnchorRouter {
    /// Prepare routing around `target`
    ///
    /// Thirds are truncated to whole pixels; a side shorter than three pixels
    /// has no usable third and is rejected.
    pub fn new(target: &Rect) -> Result<Self, GeometryError> {
        let Rect {
            x,
            y,
            width: w,
            height: h,
        } = *target;

        let td = (w / 3.0).trunc();
        let bd = (h / 3.0).trunc();
        if td <= 0.0 || bd <= 0.0 {
            return Err(GeometryError::DegenerateRect {
                width: w,
                height: h,
            });
        }
        let td_2 = (td / 2.0).trunc();
        let bd_2 = (bd / 2.0).trunc();

        let p = |px: f32, py: f32| Point::new(px, py);
        let p0 = p(x, y);
        let p1 = p(x + td, y);
        let p2 = p(x + 2.0 * td, y);
        let p3 = p(x + w, y + bd);
        let p4 = p(x + w, y + 2.0 * bd);
        let p5 = p(x + 2.0 * td, y + h);
        let p6 = p(x + td, y + h);
        let p7 = p(x, y + 2.0 * bd);
        let p8 = p(x, y + bd);
        let p9 = p(x + w, y);
        let p10 = p(x + w, y + h);
        let p11 = p(x, y + h);

        let lines = [
            Separator::through(p1, p5),
            Separator::through(p2, p6),
            Separator::through(p7, p3),
            Separator::through(p8, p4),
            Separator::through(p0, p10),
            Separator::through(p9, p11),
        ];

        let along = |k: f32| k * td_2;
        let down = |k: f32| k * bd_2;
        let anchors = Anchors {
            top: [1.0, 3.0, 5.0].map(|k| p(x + along(k), y)),
            right: [1.0, 3.0, 5.0].map(|k| p(x + w, y + down(k))),
            bottom: [1.0, 3.0, 5.0].map(|k| p(x + along(k), y + h)),
            left: [1.0, 3.0, 5.0].map(|k| p(x, y + down(k))),
        };

        Ok(Self { lines, anchors })
    }

    /// Classify `point` and produce the arrow anchors
    ///
    /// Tests run in a fixed order and the first match wins.
    pub fn route(&self, point: Point) -> Route {
        let gt = |i: usize| self.lines[i - 1].above(point);
        let lt = |i: usize| self.lines[i - 1].below(point);
        let a = &self.anchors;

        let (head, sector) = if gt(1) && gt(2) {
            (a.bottom[1], Sector::BottomCenter)
        } else if lt(2) && gt(6) {
            (a.bottom[0], Sector::BottomLeft)
        } else if lt(6) && gt(3) {
            (a.left[2], Sector::BottomLeft)
        } else if gt(4) && lt(3) {
            (a.left[1], Sector::LeftCenter)
        } else if lt(4) && gt(5) {
            (a.left[0], Sector::TopLeft)
        } else if lt(5) && gt(1) {
            (a.top[0], Sector::TopLeft)
        } else if lt(1) && lt(2) {
            (a.top[1], Sector::TopCenter)
        } else if gt(2) && lt(6) {
            (a.top[2], Sector::TopRight)
        } else if gt(6) && lt(3) {
            (a.right[0], Sector::TopRight)
        } else if lt(4) && gt(3) {
            (a.right[1], Sector::RightCenter)
        } else if gt(4) && lt(5) {
            (a.right[2], Sector::BottomRight)
        } else {
            (a.bottom[2], Sector::BottomRight)
        };

        let tail = head + sector.tail_offset();
        log::debug!(
            "Routed ({}, {}) to {:?}: head={:?} tail={:?}",
            point.x,
            point.y,
            sector,
            head,
            tail
        );
        Route { head, tail, sector }
    }
}

/// One-shot routing helper
pub fn route_arrow(target: &Rect, point: Point) -> Result<Route, GeometryError> {
    Ok(AnchorRouter::new(target)?.route(point))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rect() -> Rect {
        Rect::new(0.0, 0.0, 90.0, 60.0)
    }

    #[test]
    fn test_route_above_center() {
        let route = route_arrow(&sample_rect(), Point::new(45.0, -50.0)).unwrap();
        assert_eq!(route.sector, Sector::TopCenter);
        assert_eq!(route.head, Point::new(45.0, 0.0));
        assert_eq!(route.tail, route.head + Point::new(0.0, -80.0));
    }

    #[test]
    fn test_route_below_and_left() {
        let rect = sample_rect();
        let below = route_arrow(&rect, Point::new(45.0, 130.0)).unwrap();
        assert_eq!(below.sector, Sector::BottomCenter);
        assert_eq!(below.head, Point::new(45.0, 60.0));
        assert_eq!(below.tail, Point::new(45.0, 140.0));

        let left = route_arrow(&rect, Point::new(-55.0, 30.0)).unwrap();
        assert_eq!(left.sector, Sector::LeftCenter);
        assert_eq!(left.head, Point::new(0.0, 30.0));
        assert_eq!(left.tail, Point::new(-80.0, 30.0));
    }

    #[test]
    fn test_sweep_covers_all_sectors_contiguously() {
        let rect = sample_rect();
        let router = AnchorRouter::new(&rect).unwrap();
        let center = rect.center();

        let sectors: Vec<Sector> = (0..72)
            .map(|step| {
                let angle = (step as f32 * 5.0).to_radians();
                let p = Point::new(
                    center.x + 100.0 * angle.cos(),
                    center.y + 100.0 * angle.sin(),
                );
                router.route(p).sector
            })
            .collect();

        for sector in Sector::ALL {
            assert!(sectors.contains(&sector), "{sector:?} never chosen");
        }

        // Eight arcs means exactly eight changes walking once around the circle
        let changes = (0..sectors.len())
            .filter(|&i| sectors[i] != sectors[(i + 1) % sectors.len()])
            .count();
        assert_eq!(changes, 8);
    }

    #[test]
    fn test_diagonal_tail_keeps_arrow_length() {
        for sector in Sector::ALL {
            let offset = sector.tail_offset();
            let length = Point::ZERO.distance(offset);
            assert!((length - STAND_OFF).abs() < 0.01, "{sector:?}: {length}");
        }
    }

    #[test]
    fn test_head_lies_on_perimeter() {
        let rect = Rect::new(20.0, 40.0, 120.0, 45.0);
        let router = AnchorRouter::new(&rect).unwrap();
        for step in 0..36 {
            let angle = (step as f32 * 10.0).to_radians();
            let c = rect.center();
            let route = router.route(Point::new(c.x + 300.0 * angle.cos(), c.y + 300.0 * angle.sin()));
            let h = route.head;
            let on_edge = h.x == rect.x || h.x == rect.right() || h.y == rect.y || h.y == rect.bottom();
            assert!(on_edge && rect.contains_point(h), "{h:?}");
        }
    }

    #[test]
    fn test_degenerate_rect_is_rejected() {
        let flat = Rect::new(10.0, 10.0, 40.0, 0.0);
        assert!(matches!(
            AnchorRouter::new(&flat),
            Err(GeometryError::DegenerateRect { .. })
        ));
        let thin = Rect::new(10.0, 10.0, 2.0, 40.0);
        assert!(route_arrow(&thin, Point::ZERO).is_err());
    }
}
