//! Engine diagnostics: counts collected while tracing.
//!
//! Permanent instrumentation for tuning and for surfacing numerical
//! edge cases. The engine updates these counters on every feed; callers
//! read them at any point through
//! [`ContourEngine::diagnostics`](crate::ContourEngine::diagnostics).
//!
//! `odd_crossing_cells` deserves attention in production use: a nonzero
//! value means some cell produced 1 or 3 crossings for a level, a
//! numerical edge case the engine degrades through (complete pairs kept,
//! the unpaired point dropped) rather than failing on.

use serde::{Deserialize, Serialize};

/// Counters from a single engine instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineDiagnostics {
    /// Rows accepted via feed, excluding the closing pass.
    pub rows_fed: u64,
    /// Cells evaluated, including the degenerate border half-cells.
    pub cells_evaluated: u64,
    /// Segments routed into the fragment store (zero-length border
    /// stubs are dropped before routing and not counted).
    pub segments_emitted: u64,
    /// Cell/level combinations that produced an odd crossing count.
    pub odd_crossing_cells: u64,
    /// Fragments newly opened because no endpoint matched.
    pub fragments_opened: u64,
    /// Merges of two open fragments during ejects.
    pub fragments_merged: u64,
    /// Completed contours handed to the sink.
    pub contours_emitted: u64,
    /// Most fragments simultaneously open, a proxy for the engine's
    /// working-set size (proportional to crossings per scanline, not to
    /// raster height).
    pub peak_open_fragments: u64,
}

impl EngineDiagnostics {
    /// Record the current open-fragment count, keeping the peak.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn observe_open(&mut self, open: usize) {
        self.peak_open_fragments = self.peak_open_fragments.max(open as u64);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn observe_open_keeps_peak() {
        let mut d = EngineDiagnostics::default();
        d.observe_open(3);
        d.observe_open(7);
        d.observe_open(2);
        assert_eq!(d.peak_open_fragments, 7);
    }

    #[test]
    fn serde_round_trip() {
        let d = EngineDiagnostics {
            rows_fed: 100,
            cells_evaluated: 10_100,
            segments_emitted: 512,
            odd_crossing_cells: 1,
            fragments_opened: 40,
            fragments_merged: 12,
            contours_emitted: 28,
            peak_open_fragments: 9,
        };
        let json = serde_json::to_string(&d).unwrap();
        let deserialized: EngineDiagnostics = serde_json::from_str(&json).unwrap();
        assert_eq!(d, deserialized);
    }
}
