//! Planar geometry primitives over the geo crate.
//!
//! All coordinates are assumed to be in a single projected system with linear
//! units; distances are plain Euclidean.

use geo::{BoundingRect, Coord, Intersects, LineString, Point, Polygon};
use roadrisk_types::bbox::BoundingBox2D;
use std::f64::consts::TAU;

pub use roadrisk_types::feature::polyline_length;

/// Euclidean distance between two points.
pub fn point_distance(a: &Point, b: &Point) -> f64 {
    (a.x() - b.x()).hypot(a.y() - b.y())
}

/// Distance from `p` to the closed segment `a`-`b`.
///
/// The projection of `p` is clamped to the segment; a zero-length segment
/// degrades to point distance.
pub fn segment_distance(p: Coord, a: Coord, b: Coord) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return (p.x - a.x).hypot(p.y - a.y);
    }

    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    (p.x - cx).hypot(p.y - cy)
}

/// Minimum distance from `point` to any segment of `line`.
///
/// A single-vertex line is treated as a point. An empty line is infinitely far.
pub fn point_line_distance(point: &Point, line: &LineString) -> f64 {
    let p = point.0;
    match line.0.as_slice() {
        [] => f64::INFINITY,
        [only] => (p.x - only.x).hypot(p.y - only.y),
        coords => coords
            .windows(2)
            .map(|w| segment_distance(p, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Point at normalized `fraction` of the length along `line`.
///
/// `fraction` is clamped to `[0, 1]`. Returns `None` for an empty line; a
/// zero-length line yields its first vertex.
pub fn interpolate(line: &LineString, fraction: f64) -> Option<Point> {
    let first = *line.0.first()?;
    let total = polyline_length(line);
    if total == 0.0 {
        return Some(Point::from(first));
    }

    let target = fraction.clamp(0.0, 1.0) * total;
    let mut walked = 0.0;
    for segment in line.lines() {
        let seg_len = segment.dx().hypot(segment.dy());
        if walked + seg_len >= target && seg_len > 0.0 {
            let t = (target - walked) / seg_len;
            return Some(Point::new(
                segment.start.x + t * segment.dx(),
                segment.start.y + t * segment.dy(),
            ));
        }
        walked += seg_len;
    }

    line.0.last().map(|c| Point::from(*c))
}

/// Inclusive bounding box of a point.
pub fn point_bbox(point: &Point) -> BoundingBox2D {
    BoundingBox2D::from_rect(point.bounding_rect())
}

/// Inclusive bounding box of a polyline, `None` when it has no vertices.
pub fn line_bbox(line: &LineString) -> Option<BoundingBox2D> {
    line.bounding_rect().map(BoundingBox2D::from_rect)
}

/// Regular polygon approximating the circle of `radius` around `center`.
///
/// Vertices lie on the circle, so the polygon is inscribed: points very close
/// to the circle between two vertices fall outside it.
pub fn circle_polygon(center: &Point, radius: f64, segments: usize) -> Polygon {
    let segments = segments.max(3);
    let ring: Vec<Coord> = (0..segments)
        .map(|i| {
            let angle = TAU * i as f64 / segments as f64;
            Coord {
                x: center.x() + radius * angle.cos(),
                y: center.y() + radius * angle.sin(),
            }
        })
        .collect();

    // Polygon::new closes the ring
    Polygon::new(LineString::from(ring), vec![])
}

/// Boundary-inclusive rectangle test for a point.
pub fn rect_intersects_point(rect: &BoundingBox2D, point: &Point) -> bool {
    point.intersects(&rect.rect)
}

/// Boundary-inclusive rectangle test for a polyline.
pub fn rect_intersects_line(rect: &BoundingBox2D, line: &LineString) -> bool {
    line.intersects(&rect.rect)
}

pub fn polygon_intersects_point(polygon: &Polygon, point: &Point) -> bool {
    point.intersects(polygon)
}

pub fn polygon_intersects_line(polygon: &Polygon, line: &LineString) -> bool {
    line.intersects(polygon)
}
