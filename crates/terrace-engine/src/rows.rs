//! Scan window over the two raster rows a cell can straddle.
//!
//! Only "previous" and "current" are ever resident; the engine feeds one
//! row at a time and the pair swaps buffers instead of reallocating.
//! Incoming samples are fudged off exact levels here (see
//! [`LevelSpec::fudge`]) so every downstream consumer sees the cleaned
//! values.

use crate::levels::LevelSpec;

/// The four samples around one cell, plus the clamped column positions
/// of its left and right corners.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CellCorners {
    /// Previous-row sample at the left column.
    pub up_left: f64,
    /// Previous-row sample at the right column.
    pub up_right: f64,
    /// Current-row sample at the left column.
    pub lo_left: f64,
    /// Current-row sample at the right column.
    pub lo_right: f64,
    /// Clamped left column as an x coordinate.
    pub left_x: f64,
    /// Clamped right column as an x coordinate.
    pub right_x: f64,
}

/// Double buffer holding the previous and current scan rows.
#[derive(Debug)]
pub(crate) struct RowPair {
    previous: Vec<f64>,
    current: Vec<f64>,
    primed: bool,
}

impl RowPair {
    pub(crate) fn new(width: usize) -> Self {
        Self {
            previous: vec![0.0; width],
            current: vec![0.0; width],
            primed: false,
        }
    }

    pub(crate) fn width(&self) -> usize {
        self.current.len()
    }

    /// Advance the window by one row.
    ///
    /// `Some(row)` swaps the buffers and refills "current" with fudged
    /// samples. On the first feed, "previous" is initialized as a copy
    /// of "current": the raster's top edge is a flat extension of row 0
    /// and is never crossed.
    ///
    /// `None` is the closing pass at end-of-data: "current" is re-fed
    /// into "previous" so fragments reaching the final row get one more
    /// chance to stitch before the flush.
    ///
    /// The caller guarantees `row.len() == self.width()`.
    #[allow(clippy::float_cmp)] // nodata is matched by exact equality
    pub(crate) fn feed(&mut self, row: Option<&[f64]>, levels: &LevelSpec, nodata: Option<f64>) {
        let Some(row) = row else {
            self.previous.copy_from_slice(&self.current);
            return;
        };

        std::mem::swap(&mut self.previous, &mut self.current);
        let fudge = levels.fudge();
        for (dst, &sample) in self.current.iter_mut().zip(row) {
            // Nodata must keep comparing equal; never fudge it.
            if nodata == Some(sample) {
                *dst = sample;
            } else if levels.is_level(sample) {
                // Downward, so a peak sitting exactly on a level does
                // not grow a spurious ring at its own level.
                *dst = sample - fudge;
            } else {
                *dst = sample;
            }
        }

        if !self.primed {
            self.previous.copy_from_slice(&self.current);
            self.primed = true;
        }
    }

    /// The four samples around cell `cell`, for `cell` in `0..=width`.
    ///
    /// A cell sits between columns `cell - 1` and `cell`; indices are
    /// clamped to `[0, width - 1]`, so the half-cells at either end
    /// degenerate to zero width at the nearest real column.
    pub(crate) fn corners(&self, cell: usize) -> CellCorners {
        let left = cell.saturating_sub(1).min(self.width() - 1);
        let right = cell.min(self.width() - 1);
        #[allow(clippy::cast_precision_loss)]
        CellCorners {
            up_left: self.previous[left],
            up_right: self.previous[right],
            lo_left: self.current[left],
            lo_right: self.current[right],
            left_x: left as f64,
            right_x: right as f64,
        }
    }
}
