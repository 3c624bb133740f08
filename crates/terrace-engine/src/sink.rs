//! Sinks: where completed contours go.
//!
//! The engine calls [`ContourSink::write`] exactly once per completed
//! contour, transferring ownership. A sink failure is fatal to the
//! current feed and propagates as [`ContourError::Sink`]; the engine
//! never retries.
//!
//! Contours arrive in cell coordinates (column, row). Real deployments
//! want world coordinates, which is deliberately a sink concern:
//! [`TransformSink`] wraps any other sink with an affine cell-to-world
//! mapping.

use serde::{Deserialize, Serialize};

use crate::types::{Contour, Point, Polyline};

/// Error type sinks report back to the engine.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Consumer of completed contours.
pub trait ContourSink {
    /// Accept one completed contour.
    ///
    /// # Errors
    ///
    /// Any error aborts the eject in progress and surfaces from the
    /// engine as [`ContourError::Sink`](crate::ContourError::Sink).
    fn write(&mut self, contour: Contour) -> Result<(), SinkError>;
}

/// Closures are sinks, preserving the callback shape of the interface.
impl<F> ContourSink for F
where
    F: FnMut(Contour) -> Result<(), SinkError>,
{
    fn write(&mut self, contour: Contour) -> Result<(), SinkError> {
        self(contour)
    }
}

/// Infallible sink that accumulates contours in memory.
#[derive(Debug, Default)]
pub struct CollectSink {
    contours: Vec<Contour>,
}

impl CollectSink {
    /// Create an empty collector.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            contours: Vec::new(),
        }
    }

    /// Contours collected so far.
    #[must_use]
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// Consume the sink and return the collected contours.
    #[must_use]
    pub fn into_contours(self) -> Vec<Contour> {
        self.contours
    }
}

impl ContourSink for CollectSink {
    fn write(&mut self, contour: Contour) -> Result<(), SinkError> {
        self.contours.push(contour);
        Ok(())
    }
}

/// Affine mapping from cell coordinates to world coordinates.
///
/// `world_x = x_origin + column * x_column + row * x_row`, and likewise
/// for `y`. The shear terms (`x_row`, `y_column`) support rotated
/// grids; axis-aligned grids leave them zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellTransform {
    /// World x of cell (0, 0).
    pub x_origin: f64,
    /// World x advance per column.
    pub x_column: f64,
    /// World x advance per row.
    pub x_row: f64,
    /// World y of cell (0, 0).
    pub y_origin: f64,
    /// World y advance per column.
    pub y_column: f64,
    /// World y advance per row.
    pub y_row: f64,
}

impl CellTransform {
    /// Axis-aligned transform: scale each axis and offset the origin.
    ///
    /// `y_step` is typically negative for north-up grids fed
    /// top-to-bottom.
    #[must_use]
    pub const fn scaled(x_origin: f64, x_step: f64, y_origin: f64, y_step: f64) -> Self {
        Self {
            x_origin,
            x_column: x_step,
            x_row: 0.0,
            y_origin,
            y_column: 0.0,
            y_row: y_step,
        }
    }

    /// Map one cell-space point into world space.
    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            p.y.mul_add(self.x_row, p.x.mul_add(self.x_column, self.x_origin)),
            p.y.mul_add(self.y_row, p.x.mul_add(self.y_column, self.y_origin)),
        )
    }
}

/// Sink adapter applying a [`CellTransform`] before delegating.
#[derive(Debug)]
pub struct TransformSink<S> {
    transform: CellTransform,
    inner: S,
}

impl<S> TransformSink<S> {
    /// Wrap `inner` so every contour is transformed before delivery.
    pub const fn new(transform: CellTransform, inner: S) -> Self {
        Self { transform, inner }
    }

    /// Consume the adapter and return the wrapped sink.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: ContourSink> ContourSink for TransformSink<S> {
    fn write(&mut self, contour: Contour) -> Result<(), SinkError> {
        let points = contour
            .polyline
            .into_points()
            .into_iter()
            .map(|p| self.transform.apply(p))
            .collect();
        self.inner.write(Contour {
            level: contour.level,
            polyline: Polyline::new(points),
        })
    }
}
