//! Shared types for the terrace contour engine.

use serde::{Deserialize, Serialize};

use crate::levels::LevelSpec;

/// Per-axis tolerance within which two endpoints are considered the same
/// point for stitching.
///
/// Crossings on a shared cell edge are interpolated from identical
/// inputs by both adjacent cells, so matching endpoints agree exactly up
/// to rounding; this constant only has to absorb float noise, not
/// geometric slop.
pub const JOIN_TOLERANCE: f64 = 1e-7;

/// A 2D point in cell coordinates.
///
/// `x` counts sample columns, `y` counts sample rows. Scaling into world
/// coordinates is the sink's responsibility (see
/// [`TransformSink`](crate::sink::TransformSink)).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (columns from the left edge).
    pub x: f64,
    /// Vertical position (rows from the top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether this point lies within [`JOIN_TOLERANCE`] of `other` on
    /// both axes.
    #[must_use]
    pub fn coincides(self, other: Self) -> bool {
        (self.x - other.x).abs() < JOIN_TOLERANCE && (self.y - other.y).abs() < JOIN_TOLERANCE
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// A sequence of connected points forming one traced line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the polyline and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }
}

/// One completed contour line at a single level.
///
/// Ownership transfers from the engine to the sink when the fragment is
/// ejected; the engine never revisits an emitted contour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    /// The constant sample value this line traces.
    pub level: f64,
    /// The line geometry, in accumulation order. Winding direction is
    /// not guaranteed.
    pub polyline: Polyline,
}

impl Contour {
    /// Whether this contour is a closed ring.
    ///
    /// Closure is inferred from coincident first and last points rather
    /// than flagged during tracing: a fragment closes whenever an
    /// extension or merge happens to bring its two ends together.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match (self.polyline.first(), self.polyline.last()) {
            (Some(&first), Some(&last)) => self.polyline.len() >= 3 && first.coincides(last),
            _ => false,
        }
    }
}

/// Configuration for a contour engine instance.
///
/// # Invariants
///
/// `levels` must satisfy [`LevelSpec::validate`]; `nodata`, when set,
/// must be finite. Fields are public for construction-literal ergonomics
/// and serde; [`ContourEngine::new`](crate::ContourEngine::new) validates
/// before any row is accepted and returns
/// [`ContourError::InvalidConfig`] on violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourConfig {
    /// Which sample values receive contour lines.
    pub levels: LevelSpec,

    /// Sample value marking holes in the grid. Cells with a nodata
    /// corner produce no segments, so lines terminate at hole borders.
    /// Matched by exact equality; nodata samples are never fudged.
    pub nodata: Option<f64>,
}

impl ContourConfig {
    /// Configuration producing levels at every multiple of `interval`.
    #[must_use]
    pub const fn interval(interval: f64) -> Self {
        Self {
            levels: LevelSpec::Interval {
                interval,
                offset: 0.0,
            },
            nodata: None,
        }
    }

    /// Configuration producing levels at `offset + n * interval`.
    #[must_use]
    pub const fn interval_with_offset(interval: f64, offset: f64) -> Self {
        Self {
            levels: LevelSpec::Interval { interval, offset },
            nodata: None,
        }
    }

    /// Configuration producing exactly the given levels.
    #[must_use]
    pub const fn fixed(levels: Vec<f64>) -> Self {
        Self {
            levels: LevelSpec::Fixed(levels),
            nodata: None,
        }
    }

    /// Same configuration with a nodata marker.
    #[must_use]
    pub const fn with_nodata(mut self, nodata: f64) -> Self {
        self.nodata = Some(nodata);
        self
    }
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self::interval(10.0)
    }
}

/// Errors that can occur while generating contours.
#[derive(Debug, thiserror::Error)]
pub enum ContourError {
    /// Engine configuration is invalid.
    #[error("invalid contour configuration: {0}")]
    InvalidConfig(String),

    /// A fed row did not match the width the engine was built with.
    #[error("row length mismatch: expected {expected} samples, got {actual}")]
    RowLength {
        /// Grid width the engine was constructed with.
        expected: usize,
        /// Length of the offending row.
        actual: usize,
    },

    /// The sink rejected an ejected contour.
    ///
    /// Fatal to the current feed: remaining ejects for the row are
    /// abandoned and the caller must stop feeding further rows.
    #[error("sink rejected contour at level {level}")]
    Sink {
        /// Level of the contour the sink refused.
        level: f64,
        /// The sink's own failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- Point tests ---

    #[test]
    fn point_new() {
        let p = Point::new(3.0, 4.0);
        assert!((p.x - 3.0).abs() < f64::EPSILON);
        assert!((p.y - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_squared(b) - 25.0).abs() < f64::EPSILON);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn point_coincides_within_tolerance() {
        let p = Point::new(1.0, 2.0);
        assert!(p.coincides(Point::new(1.0 + JOIN_TOLERANCE / 2.0, 2.0)));
        assert!(!p.coincides(Point::new(1.0 + JOIN_TOLERANCE * 2.0, 2.0)));
    }

    #[test]
    fn point_coincides_checks_both_axes() {
        let p = Point::new(1.0, 2.0);
        assert!(!p.coincides(Point::new(1.0, 2.0 + JOIN_TOLERANCE * 2.0)));
    }

    // --- Polyline tests ---

    #[test]
    fn polyline_empty() {
        let pl = Polyline::new(vec![]);
        assert!(pl.is_empty());
        assert_eq!(pl.len(), 0);
        assert!(pl.first().is_none());
        assert!(pl.last().is_none());
    }

    #[test]
    fn polyline_first_and_last() {
        let pl = Polyline::new(vec![
            Point::new(1.0, 2.0),
            Point::new(3.0, 4.0),
            Point::new(5.0, 6.0),
        ]);
        assert_eq!(pl.len(), 3);
        assert_eq!(pl.first(), Some(&Point::new(1.0, 2.0)));
        assert_eq!(pl.last(), Some(&Point::new(5.0, 6.0)));
    }

    #[test]
    fn polyline_into_points_returns_owned_vec() {
        let points = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        let pl = Polyline::new(points.clone());
        assert_eq!(pl.into_points(), points);
    }

    // --- Contour tests ---

    #[test]
    fn contour_ring_detection() {
        let ring = Contour {
            level: 5.0,
            polyline: Polyline::new(vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(0.0, 0.0),
            ]),
        };
        assert!(ring.is_closed());

        let open = Contour {
            level: 5.0,
            polyline: Polyline::new(vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
            ]),
        };
        assert!(!open.is_closed());
    }

    #[test]
    fn two_point_backtrack_is_not_a_ring() {
        // First == last with only two points is a degenerate spike,
        // not a ring.
        let c = Contour {
            level: 5.0,
            polyline: Polyline::new(vec![Point::new(0.0, 0.0), Point::new(0.0, 0.0)]),
        };
        assert!(!c.is_closed());
    }

    // --- ContourConfig tests ---

    #[test]
    fn config_default_is_interval_ten() {
        let config = ContourConfig::default();
        assert_eq!(
            config.levels,
            LevelSpec::Interval {
                interval: 10.0,
                offset: 0.0
            }
        );
        assert!(config.nodata.is_none());
    }

    #[test]
    fn config_with_nodata() {
        let config = ContourConfig::interval(5.0).with_nodata(-9999.0);
        assert_eq!(config.nodata, Some(-9999.0));
    }

    // --- ContourError tests ---

    #[test]
    fn error_row_length_display() {
        let err = ContourError::RowLength {
            expected: 10,
            actual: 7,
        };
        assert_eq!(
            err.to_string(),
            "row length mismatch: expected 10 samples, got 7"
        );
    }

    #[test]
    fn error_invalid_config_display() {
        let err = ContourError::InvalidConfig("interval must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "invalid contour configuration: interval must be positive"
        );
    }

    // --- Serde round-trip tests ---

    #[test]
    fn contour_serde_round_trip() {
        let c = Contour {
            level: 7.5,
            polyline: Polyline::new(vec![Point::new(0.5, 1.0), Point::new(1.5, 2.0)]),
        };
        let json = serde_json::to_string(&c).unwrap();
        let deserialized: Contour = serde_json::from_str(&json).unwrap();
        assert_eq!(c, deserialized);
    }

    #[test]
    fn config_serde_round_trip() {
        let config = ContourConfig::interval(2.5).with_nodata(-1.0);
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: ContourConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
