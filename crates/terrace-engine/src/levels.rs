//! Level selection: which sample values receive contour lines.
//!
//! [`LevelSpec`] is the runtime-selectable strategy for mapping a cell's
//! value range onto the discrete set of crossed levels. Two strategies
//! exist: a regular interval/offset ladder and an explicit level list.
//!
//! The spec also owns the *fudge* rule: every incoming sample that sits
//! exactly on a level is perturbed by a small fraction of the level
//! spacing before any cell sees it. This removes the degenerate
//! corner-on-level cell configurations in one place, at negligible
//! accuracy cost, instead of special-casing them throughout the cell
//! evaluator.

use serde::{Deserialize, Serialize};

use crate::types::ContourError;

/// Fraction of the level spacing used to perturb on-level samples.
const FUDGE_FACTOR: f64 = 1e-3;

/// Selects which levels the engine traces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LevelSpec {
    /// Levels at `offset + k * interval` for every integer `k`.
    Interval {
        /// Spacing between consecutive levels. Must be finite and
        /// greater than zero.
        interval: f64,
        /// Base value the ladder is anchored to.
        offset: f64,
    },

    /// Exactly the listed levels, in ascending order.
    ///
    /// Must be non-empty, finite, strictly ascending.
    Fixed(Vec<f64>),
}

impl LevelSpec {
    /// Check the construction invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ContourError::InvalidConfig`] naming the violated
    /// invariant.
    pub fn validate(&self) -> Result<(), ContourError> {
        match self {
            Self::Interval { interval, offset } => {
                if !interval.is_finite() || *interval <= 0.0 {
                    return Err(ContourError::InvalidConfig(format!(
                        "interval must be finite and positive, got {interval}"
                    )));
                }
                if !offset.is_finite() {
                    return Err(ContourError::InvalidConfig(format!(
                        "offset must be finite, got {offset}"
                    )));
                }
                Ok(())
            }
            Self::Fixed(levels) => {
                if levels.is_empty() {
                    return Err(ContourError::InvalidConfig(
                        "fixed level list must not be empty".to_string(),
                    ));
                }
                if let Some(bad) = levels.iter().find(|l| !l.is_finite()) {
                    return Err(ContourError::InvalidConfig(format!(
                        "fixed levels must be finite, got {bad}"
                    )));
                }
                if levels.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(ContourError::InvalidConfig(
                        "fixed levels must be strictly ascending".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Amount by which a sample sitting exactly on a level is moved.
    ///
    /// A fraction of the level spacing; for a fixed list, of the
    /// smallest gap between adjacent levels (or of the level's own
    /// magnitude when the list has a single entry).
    #[must_use]
    pub fn fudge(&self) -> f64 {
        match self {
            Self::Interval { interval, .. } => interval * FUDGE_FACTOR,
            Self::Fixed(levels) => {
                let min_gap = levels
                    .windows(2)
                    .map(|w| w[1] - w[0])
                    .fold(f64::INFINITY, f64::min);
                if min_gap.is_finite() {
                    min_gap * FUDGE_FACTOR
                } else {
                    levels.first().map_or(1.0, |l| l.abs().max(1.0)) * FUDGE_FACTOR
                }
            }
        }
    }

    /// Whether `value` sits exactly on a level.
    #[must_use]
    #[allow(clippy::float_cmp)] // exact membership is the semantic
    pub fn is_level(&self, value: f64) -> bool {
        match self {
            Self::Interval { interval, offset } => {
                let steps = (value - offset) / interval;
                steps == steps.floor()
            }
            Self::Fixed(levels) => levels.binary_search_by(|l| l.total_cmp(&value)).is_ok(),
        }
    }

    /// Iterate the level values crossed by a cell whose corner samples
    /// span `[min, max]`.
    ///
    /// The selection is half-open at the bottom: a level equal to `min`
    /// is excluded, a level equal to `max` included. After fudging no
    /// sample sits exactly on a level, so the boundary choice only
    /// pins tie behavior for direct callers.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn crossed(&self, min: f64, max: f64) -> LevelsCrossed<'_> {
        match self {
            Self::Interval { interval, offset } => {
                let low = ((min - offset) / interval).floor() as i64;
                let high = ((max - offset) / interval).floor() as i64;
                LevelsCrossed::Interval {
                    next: low + 1,
                    last: high,
                    interval: *interval,
                    offset: *offset,
                }
            }
            Self::Fixed(levels) => {
                let start = levels.partition_point(|l| *l <= min);
                let end = levels.partition_point(|l| *l <= max);
                LevelsCrossed::Fixed(levels[start..end].iter())
            }
        }
    }
}

/// Iterator over the level values a cell crosses.
pub(crate) enum LevelsCrossed<'a> {
    Interval {
        next: i64,
        last: i64,
        interval: f64,
        offset: f64,
    },
    Fixed(std::slice::Iter<'a, f64>),
}

impl Iterator for LevelsCrossed<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        match self {
            Self::Interval {
                next,
                last,
                interval,
                offset,
            } => {
                if *next > *last {
                    return None;
                }
                #[allow(clippy::cast_precision_loss)]
                let value = (*next as f64).mul_add(*interval, *offset);
                *next += 1;
                Some(value)
            }
            Self::Fixed(iter) => iter.next().copied(),
        }
    }
}
