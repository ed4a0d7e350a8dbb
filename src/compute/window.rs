//! Query shapes for the two-phase windowed query pattern.
//!
//! A shape is first reduced to its bounding box for the index lookup; every
//! candidate is then re-checked against the exact shape. Circles are tested as
//! a regular polygon with a configurable vertex count.

use crate::compute::geometry::{
    circle_polygon, polygon_intersects_line, polygon_intersects_point, rect_intersects_line,
    rect_intersects_point,
};
use crate::config::Config;
use crate::compute::validation::{validate_bbox, validate_point, validate_query_radius, validate_rect_corners};
use crate::error::Result;
use geo::{LineString, Point, Polygon};
use roadrisk_types::bbox::BoundingBox2D;
use serde::{Deserialize, Serialize};

/// Query window: an axis-aligned rectangle or a point with a radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum QueryShape {
    Rect(BoundingBox2D),
    Circle { center: Point, radius: f64 },
}

impl QueryShape {
    /// Rectangle from explicit corners. Inverted or non-finite corners are rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use roadrisk::compute::window::QueryShape;
    ///
    /// assert!(QueryShape::rect(0.0, 0.0, 10.0, 10.0).is_ok());
    /// assert!(QueryShape::rect(10.0, 0.0, 0.0, 10.0).is_err());
    /// ```
    pub fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        validate_rect_corners(min_x, min_y, max_x, max_y)?;
        Ok(Self::Rect(BoundingBox2D::new(min_x, min_y, max_x, max_y)))
    }

    /// Circle around `center`. The radius must be positive and finite.
    pub fn circle(center: Point, radius: f64) -> Result<Self> {
        let shape = Self::Circle { center, radius };
        shape.validate()?;
        Ok(shape)
    }

    /// Circle around `center` with the configured default point radius.
    pub fn point(center: Point, config: &Config) -> Result<Self> {
        Self::circle(center, config.default_point_radius)
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Rect(bbox) => validate_bbox(bbox),
            Self::Circle { center, radius } => {
                validate_point(center)?;
                validate_query_radius(*radius)
            }
        }
    }

    /// Box passed to the index in the candidate phase.
    pub fn bbox(&self) -> BoundingBox2D {
        match self {
            Self::Rect(bbox) => *bbox,
            Self::Circle { center, radius } => BoundingBox2D::around(center, *radius),
        }
    }

    /// Prepare the exact test, materializing circles with `segments` vertices.
    pub fn matcher(&self, segments: usize) -> ShapeMatcher {
        match self {
            Self::Rect(bbox) => ShapeMatcher::Rect(*bbox),
            Self::Circle { center, radius } => {
                ShapeMatcher::Polygon(circle_polygon(center, *radius, segments))
            }
        }
    }
}

/// Exact-phase test for one query, built once and applied to every candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeMatcher {
    Rect(BoundingBox2D),
    Polygon(Polygon),
}

impl ShapeMatcher {
    pub fn matches_point(&self, point: &Point) -> bool {
        match self {
            Self::Rect(bbox) => rect_intersects_point(bbox, point),
            Self::Polygon(polygon) => polygon_intersects_point(polygon, point),
        }
    }

    pub fn matches_line(&self, line: &LineString) -> bool {
        match self {
            Self::Rect(bbox) => rect_intersects_line(bbox, line),
            Self::Polygon(polygon) => polygon_intersects_line(polygon, line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::line_string;

    #[test]
    fn test_shape_validation() {
        assert!(QueryShape::rect(0.0, 0.0, 0.0, 0.0).is_ok());
        assert!(QueryShape::rect(0.0, 5.0, 1.0, 4.0).is_err());
        assert!(QueryShape::rect(f64::NEG_INFINITY, 0.0, 1.0, 1.0).is_err());

        assert!(QueryShape::circle(Point::new(0.0, 0.0), 250.0).is_ok());
        assert!(QueryShape::circle(Point::new(0.0, 0.0), 0.0).is_err());
        assert!(QueryShape::circle(Point::new(0.0, 0.0), -1.0).is_err());
        assert!(QueryShape::circle(Point::new(f64::NAN, 0.0), 10.0).is_err());

        let raw = QueryShape::Circle {
            center: Point::new(1.0, 1.0),
            radius: f64::NAN,
        };
        assert!(raw.validate().is_err());
    }

    #[test]
    fn test_circle_bbox() {
        let shape = QueryShape::circle(Point::new(100.0, 200.0), 50.0).unwrap();
        assert_eq!(shape.bbox(), BoundingBox2D::new(50.0, 150.0, 150.0, 250.0));
    }

    #[test]
    fn test_rect_matcher_is_inclusive() {
        let matcher = QueryShape::rect(0.0, 0.0, 10.0, 10.0).unwrap().matcher(64);
        assert!(matcher.matches_point(&Point::new(0.0, 5.0)));
        assert!(matcher.matches_point(&Point::new(10.0, 10.0)));
        assert!(!matcher.matches_point(&Point::new(10.01, 10.0)));
        // crosses the window without a vertex inside
        assert!(matcher.matches_line(&line_string![(x: -5.0, y: -5.0), (x: 15.0, y: 15.0)]));
    }

    #[test]
    fn test_circle_matcher_excludes_bbox_corners() {
        let matcher = QueryShape::circle(Point::new(0.0, 0.0), 100.0).unwrap().matcher(64);
        assert!(matcher.matches_point(&Point::new(60.0, 60.0)));
        assert!(!matcher.matches_point(&Point::new(90.0, 90.0)));
        assert!(!matcher.matches_line(&line_string![(x: 80.0, y: 95.0), (x: 95.0, y: 80.0)]));
        assert!(matcher.matches_line(&line_string![(x: -200.0, y: 0.0), (x: 200.0, y: 0.0)]));
    }
}
