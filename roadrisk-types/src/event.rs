use chrono::NaiveDate;
use geo::Point;
use serde::{Deserialize, Serialize};

/// Lowest severity an event can carry.
pub const MIN_SEVERITY: u8 = 1;
/// Highest severity an event can carry.
pub const MAX_SEVERITY: u8 = 5;
/// Last valid hour of the day.
pub const MAX_HOUR: u8 = 23;

/// A point event (crash) with severity, time-of-day and optional date.
///
/// Severity is clamped to `1..=5` and hour to `0..=23` on construction.
///
/// # Examples
///
/// ```
/// use roadrisk_types::event::PointEvent;
/// use geo::Point;
///
/// let crash = PointEvent::new(1, 9, 25, None, Point::new(10.0, 20.0));
/// assert_eq!(crash.severity, 5);
/// assert_eq!(crash.hour, 23);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EventRecord")]
pub struct PointEvent {
    /// Unique event identifier
    pub id: u64,
    /// Severity in `1..=5`
    pub severity: u8,
    /// Hour of day in `0..=23`
    pub hour: u8,
    /// Calendar date of occurrence, if known
    pub date: Option<NaiveDate>,
    /// Location in projected coordinates
    pub geometry: Point,
}

impl PointEvent {
    pub fn new(id: u64, severity: u8, hour: u8, date: Option<NaiveDate>, geometry: Point) -> Self {
        Self {
            id,
            severity: severity.clamp(MIN_SEVERITY, MAX_SEVERITY),
            hour: hour.min(MAX_HOUR),
            date,
            geometry,
        }
    }

    /// Convenience constructor for undated events.
    pub fn at(id: u64, severity: u8, x: f64, y: f64) -> Self {
        Self::new(id, severity, 0, None, Point::new(x, y))
    }

    /// Builder-style date setter.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Builder-style hour setter (clamped).
    pub fn with_hour(mut self, hour: u8) -> Self {
        self.hour = hour.min(MAX_HOUR);
        self
    }

    pub fn x(&self) -> f64 {
        self.geometry.x()
    }

    pub fn y(&self) -> f64 {
        self.geometry.y()
    }
}

/// Wire form of [`PointEvent`]; deserialized values pass through the clamp.
#[derive(Deserialize)]
struct EventRecord {
    id: u64,
    severity: u8,
    hour: u8,
    date: Option<NaiveDate>,
    geometry: Point,
}

impl From<EventRecord> for PointEvent {
    fn from(record: EventRecord) -> Self {
        Self::new(
            record.id,
            record.severity,
            record.hour,
            record.date,
            record.geometry,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_clamped() {
        assert_eq!(PointEvent::at(1, 0, 0.0, 0.0).severity, 1);
        assert_eq!(PointEvent::at(2, 3, 0.0, 0.0).severity, 3);
        assert_eq!(PointEvent::at(3, 200, 0.0, 0.0).severity, 5);
    }

    #[test]
    fn test_hour_clamped() {
        let event = PointEvent::at(1, 2, 0.0, 0.0).with_hour(99);
        assert_eq!(event.hour, 23);
        assert_eq!(event.with_hour(7).hour, 7);
    }

    #[test]
    fn test_deserialize_clamps_out_of_range_values() {
        let json = r#"{"id":7,"severity":9,"hour":99,"date":null,"geometry":{"x":1.0,"y":2.0}}"#;
        let event: PointEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.severity, MAX_SEVERITY);
        assert_eq!(event.hour, MAX_HOUR);

        let json = r#"{"id":8,"severity":0,"hour":5,"geometry":{"x":1.0,"y":2.0}}"#;
        let event: PointEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.severity, MIN_SEVERITY);
        assert_eq!(event.hour, 5);
        assert_eq!(event.date, None);
    }

    #[test]
    fn test_date_round_trips_through_json() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let event = PointEvent::at(4, 2, 1.5, -2.5).with_date(date);
        let json = serde_json::to_string(&event).unwrap();
        let back: PointEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.date, Some(date));
    }
}
