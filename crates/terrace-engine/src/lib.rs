//! terrace-engine: streaming contour tracing over gridded samples (sans-IO).
//!
//! Converts a regularly-spaced grid of scalar samples (elevation,
//! temperature, anything) into vector polylines of constant value, one
//! row at a time:
//!
//! row source -> [`ContourEngine::feed`] -> per-cell evaluation ->
//! fragment stitching -> [`ContourSink`].
//!
//! The scan is online and single-pass: only two rows of the raster and
//! the currently-open line fragments are ever resident, so memory is
//! bounded by crossings per scanline rather than raster size. Fragments
//! that no longer touch the scan window are handed to the sink as soon
//! as they complete, including fragments that only close many rows
//! after they open.
//!
//! This crate has **no I/O dependencies** -- raster decoding, output
//! formats, and coordinate systems all live with the caller. The only
//! coordinate facility offered is [`TransformSink`], an affine
//! cell-to-world adapter, because cell-space output is rarely what a
//! consumer wants verbatim.

pub mod diagnostics;
pub mod engine;
pub mod levels;
pub mod sink;
pub mod types;

mod cell;
mod fragment;
mod rows;

pub use diagnostics::EngineDiagnostics;
pub use engine::ContourEngine;
pub use levels::LevelSpec;
pub use sink::{CellTransform, CollectSink, ContourSink, SinkError, TransformSink};
pub use types::{Contour, ContourConfig, ContourError, JOIN_TOLERANCE, Point, Polyline};

/// Trace a whole in-memory grid in one call.
///
/// `samples` is row-major, `width` samples per row, top row first. For
/// streaming input, drive [`ContourEngine`] directly instead.
///
/// # Errors
///
/// Returns [`ContourError::InvalidConfig`] when `width` is zero, the
/// sample count is not a multiple of `width`, or `config` is invalid.
pub fn generate(
    samples: &[f64],
    width: usize,
    config: &ContourConfig,
) -> Result<Vec<Contour>, ContourError> {
    if width == 0 || samples.len() % width != 0 {
        return Err(ContourError::InvalidConfig(format!(
            "sample count {} is not a multiple of width {width}",
            samples.len()
        )));
    }

    let mut engine = ContourEngine::new(width, config.clone(), CollectSink::new())?;
    for row in samples.chunks_exact(width) {
        engine.feed(row)?;
    }
    Ok(engine.finish()?.into_contours())
}
