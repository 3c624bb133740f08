//! The per-row scan orchestrator.
//!
//! One [`ContourEngine`] traces one raster: rows are fed top-to-bottom,
//! each row runs the fixed pipeline (swap buffers, clear touched flags,
//! evaluate every cell, route segments, eject untouched fragments), and
//! [`finish`](ContourEngine::finish) runs a closing pass plus the final
//! flush. Strictly sequential and single-threaded; independent rasters
//! take independent engine instances.

use crate::cell;
use crate::diagnostics::EngineDiagnostics;
use crate::fragment::FragmentStore;
use crate::rows::{CellCorners, RowPair};
use crate::sink::ContourSink;
use crate::types::{Contour, ContourConfig, ContourError};

/// Streaming contour generator over a fixed-width sample grid.
///
/// Memory use is bounded by the open-fragment count, which is
/// proportional to level crossings on the current scanline rather than
/// raster size.
#[derive(Debug)]
pub struct ContourEngine<S> {
    config: ContourConfig,
    rows: RowPair,
    store: FragmentStore,
    sink: S,
    /// Index of the next row to be fed.
    row: usize,
    /// Reusable per-cell segment buffer.
    scratch: Vec<cell::Segment>,
    diagnostics: EngineDiagnostics,
}

impl<S: ContourSink> ContourEngine<S> {
    /// Create an engine for a grid `width` samples wide.
    ///
    /// # Errors
    ///
    /// Returns [`ContourError::InvalidConfig`] when `width` is zero,
    /// the level specification violates its invariants, or `nodata` is
    /// not finite.
    pub fn new(width: usize, config: ContourConfig, sink: S) -> Result<Self, ContourError> {
        if width == 0 {
            return Err(ContourError::InvalidConfig(
                "grid width must be at least 1".to_string(),
            ));
        }
        config.levels.validate()?;
        if let Some(nodata) = config.nodata
            && !nodata.is_finite()
        {
            return Err(ContourError::InvalidConfig(format!(
                "nodata must be finite, got {nodata}"
            )));
        }
        Ok(Self {
            config,
            rows: RowPair::new(width),
            store: FragmentStore::new(),
            sink,
            row: 0,
            scratch: Vec::new(),
            diagnostics: EngineDiagnostics::default(),
        })
    }

    /// Grid width this engine was built for.
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.width()
    }

    /// Counters collected so far.
    #[must_use]
    pub const fn diagnostics(&self) -> EngineDiagnostics {
        self.diagnostics
    }

    /// Feed the next sample row, top-to-bottom.
    ///
    /// Completed fragments are ejected to the sink before this returns.
    ///
    /// # Errors
    ///
    /// [`ContourError::RowLength`] when `row` does not match the grid
    /// width; [`ContourError::Sink`] when the sink rejects a contour,
    /// in which case the caller must stop feeding.
    pub fn feed(&mut self, row: &[f64]) -> Result<(), ContourError> {
        if row.len() != self.width() {
            return Err(ContourError::RowLength {
                expected: self.width(),
                actual: row.len(),
            });
        }
        self.pass(Some(row))
    }

    /// Signal end-of-data: one closing pass, then flush every fragment
    /// still open, including unterminated ones, and return the sink.
    ///
    /// # Errors
    ///
    /// [`ContourError::Sink`] when the sink rejects a contour; fragments
    /// not yet visited are dropped with the engine.
    pub fn finish(mut self) -> Result<S, ContourError> {
        self.pass(None)?;
        self.eject(false)?;
        Ok(self.sink)
    }

    /// Run the full per-row pipeline for one feed.
    fn pass(&mut self, row: Option<&[f64]>) -> Result<(), ContourError> {
        let width = self.width();
        self.rows.feed(row, &self.config.levels, self.config.nodata);

        // Corner y positions. A cell straddles the previous and current
        // rows; the first row and the closing pass degenerate to a flat
        // zero-height cell, mirroring the column clamp at the sides.
        #[allow(clippy::cast_precision_loss)]
        let (y_up, y_lo) = if row.is_some() {
            (self.row.saturating_sub(1) as f64, self.row as f64)
        } else {
            let last = self.row.saturating_sub(1) as f64;
            (last, last)
        };

        self.store.begin_row();
        for cell_index in 0..=width {
            self.diagnostics.cells_evaluated += 1;
            let corners = self.rows.corners(cell_index);
            if cell_has_nodata(&corners, self.config.nodata) {
                continue;
            }

            self.scratch.clear();
            self.diagnostics.odd_crossing_cells +=
                cell::evaluate(&corners, y_up, y_lo, &self.config.levels, &mut self.scratch);

            let scratch = std::mem::take(&mut self.scratch);
            for segment in &scratch {
                // Degenerate border half-cells pair coincident points;
                // there is nothing to stitch.
                if segment.a.coincides(segment.b) {
                    continue;
                }
                self.diagnostics.segments_emitted += 1;
                if !self.store.add_segment(segment.level, segment.a, segment.b) {
                    self.diagnostics.fragments_opened += 1;
                }
            }
            self.scratch = scratch;
        }

        self.diagnostics.observe_open(self.store.open_count());
        self.eject(true)?;

        if row.is_some() {
            self.row += 1;
            self.diagnostics.rows_fed += 1;
        }
        Ok(())
    }

    /// Eject through the sink, translating sink failures.
    #[allow(clippy::cast_possible_truncation)]
    fn eject(&mut self, only_untouched: bool) -> Result<(), ContourError> {
        let sink = &mut self.sink;
        let emitted = &mut self.diagnostics.contours_emitted;
        let merged = self
            .store
            .eject(only_untouched, &mut |contour: Contour| {
                let level = contour.level;
                sink.write(contour)
                    .map_err(|source| ContourError::Sink { level, source })?;
                *emitted += 1;
                Ok(())
            })?;
        self.diagnostics.fragments_merged += merged as u64;
        Ok(())
    }
}

#[allow(clippy::float_cmp)] // nodata is matched by exact equality
fn cell_has_nodata(corners: &CellCorners, nodata: Option<f64>) -> bool {
    nodata.is_some_and(|nd| {
        corners.up_left == nd
            || corners.up_right == nd
            || corners.lo_left == nd
            || corners.lo_right == nd
    })
}
