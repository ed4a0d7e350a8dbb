use geo::LineString;
use serde::{Deserialize, Serialize};

/// A line feature (road segment) with a cached planar length.
///
/// Length is computed once at construction from the polyline geometry and is
/// never recomputed; the feature is immutable after construction.
///
/// # Examples
///
/// ```
/// use roadrisk_types::feature::LineFeature;
/// use geo::line_string;
///
/// let road = LineFeature::new(
///     7,
///     "collector",
///     line_string![(x: 0.0, y: 0.0), (x: 300.0, y: 0.0), (x: 300.0, y: 400.0)],
/// );
/// assert_eq!(road.id(), 7);
/// assert_eq!(road.length_m(), 700.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FeatureRecord")]
pub struct LineFeature {
    id: u64,
    class: String,
    geometry: LineString,
    length_m: f64,
}

impl LineFeature {
    /// Create a feature and cache its Euclidean length.
    pub fn new(id: u64, class: impl Into<String>, geometry: LineString) -> Self {
        let length_m = polyline_length(&geometry);
        Self {
            id,
            class: class.into(),
            geometry,
            length_m,
        }
    }

    /// Unique feature identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Classification tag, e.g. `"arterial"`.
    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn geometry(&self) -> &LineString {
        &self.geometry
    }

    /// Sum of segment lengths in projected units.
    pub fn length_m(&self) -> f64 {
        self.length_m
    }

    /// Number of vertices in the polyline.
    pub fn vertex_count(&self) -> usize {
        self.geometry.0.len()
    }
}

/// Wire form of a feature; the length is always recomputed on load.
#[derive(Deserialize)]
struct FeatureRecord {
    id: u64,
    class: String,
    geometry: LineString,
}

impl From<FeatureRecord> for LineFeature {
    fn from(record: FeatureRecord) -> Self {
        Self::new(record.id, record.class, record.geometry)
    }
}

/// Sum of Euclidean segment lengths of a polyline.
///
/// An empty or single-vertex line has length zero.
pub fn polyline_length(line: &LineString) -> f64 {
    line.lines().map(|segment| segment.dx().hypot(segment.dy())).sum()
}
