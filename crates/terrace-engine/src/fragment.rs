//! Open fragments and the store that stitches them.
//!
//! A fragment is one in-progress polyline at one level. Only its two
//! ends are valid attachment points; new segments either extend an end,
//! or open a new fragment. A fragment that no row of the current scan
//! touched can never be extended again (all later crossings are at
//! least a full row away), so the store ejects it to the sink.
//!
//! Point storage is a `VecDeque` so head extension is O(1) amortized
//! instead of shifting the whole array on every prepend.

use std::collections::VecDeque;

use crate::types::{Contour, Point, Polyline};

/// Which pair of endpoints coincide between a merge survivor and the
/// fragment it absorbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeEnds {
    /// Survivor tail meets absorbed head: append in order.
    TailHead,
    /// Survivor tail meets absorbed tail: append reversed.
    TailTail,
    /// Survivor head meets absorbed tail: prepend in order.
    HeadTail,
    /// Survivor head meets absorbed head: prepend reversed.
    HeadHead,
}

/// One in-progress polyline at a single level.
#[derive(Debug)]
pub(crate) struct Fragment {
    level: f64,
    points: VecDeque<Point>,
    /// Whether any segment attached during the current row scan.
    touched: bool,
}

impl Fragment {
    fn new(level: f64, a: Point, b: Point) -> Self {
        let mut points = VecDeque::with_capacity(8);
        points.push_back(a);
        points.push_back(b);
        Self {
            level,
            points,
            touched: true,
        }
    }

    /// First point. Fragments always hold at least two points; the NaN
    /// fallback never coincides with anything, so an (impossible) empty
    /// fragment simply never matches.
    fn head(&self) -> Point {
        self.points
            .front()
            .copied()
            .unwrap_or(Point::new(f64::NAN, f64::NAN))
    }

    /// Last point, with the same NaN fallback as [`head`](Self::head).
    fn tail(&self) -> Point {
        self.points
            .back()
            .copied()
            .unwrap_or(Point::new(f64::NAN, f64::NAN))
    }

    /// Splice `other` onto the matching end, dropping the shared
    /// coincident point so no vertex is doubled.
    fn absorb(&mut self, other: Self, ends: MergeEnds) {
        match ends {
            MergeEnds::TailHead => self.points.extend(other.points.into_iter().skip(1)),
            MergeEnds::TailTail => self.points.extend(other.points.into_iter().rev().skip(1)),
            MergeEnds::HeadTail => {
                for p in other.points.into_iter().rev().skip(1) {
                    self.points.push_front(p);
                }
            }
            MergeEnds::HeadHead => {
                for p in other.points.into_iter().skip(1) {
                    self.points.push_front(p);
                }
            }
        }
        self.touched = true;
    }

    fn into_contour(self) -> Contour {
        Contour {
            level: self.level,
            polyline: Polyline::new(self.points.into_iter().collect()),
        }
    }
}

/// The collection of currently-open fragments.
///
/// Unordered apart from insertion order; lookup is a linear scan with
/// an exact level filter first. Open-fragment count is proportional to
/// crossings on the current scanline, not raster size, so the scan stays
/// short in practice.
#[derive(Debug, Default)]
pub(crate) struct FragmentStore {
    fragments: Vec<Fragment>,
}

impl FragmentStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of fragments still open.
    pub(crate) fn open_count(&self) -> usize {
        self.fragments.len()
    }

    /// Reset the per-row touched flags before scanning a new row.
    pub(crate) fn begin_row(&mut self) {
        for fragment in &mut self.fragments {
            fragment.touched = false;
        }
    }

    /// Route one segment into the store.
    ///
    /// The first open fragment at `level` whose free head or tail lies
    /// within the join tolerance of `a` or `b` is extended with the
    /// opposite endpoint. First structural match wins; no distance
    /// minimization. With no match a new two-point fragment opens.
    ///
    /// Returns `true` when an existing fragment was extended.
    #[allow(clippy::float_cmp)] // levels are computed identically everywhere
    pub(crate) fn add_segment(&mut self, level: f64, a: Point, b: Point) -> bool {
        for fragment in &mut self.fragments {
            if fragment.level != level {
                continue;
            }
            let head = fragment.head();
            let tail = fragment.tail();
            if tail.coincides(a) {
                fragment.points.push_back(b);
            } else if tail.coincides(b) {
                fragment.points.push_back(a);
            } else if head.coincides(a) {
                fragment.points.push_front(b);
            } else if head.coincides(b) {
                fragment.points.push_front(a);
            } else {
                continue;
            }
            fragment.touched = true;
            return true;
        }

        self.fragments.push(Fragment::new(level, a, b));
        false
    }

    /// Close out fragments, merging mergeable pairs first.
    ///
    /// With `only_untouched`, fragments extended during the current row
    /// stay open; the rest are final for this scan. Each candidate first
    /// tries to merge into another open fragment sharing a coincident
    /// endpoint (all four end combinations, reversing as needed); the
    /// survivor is marked touched so it is not itself ejected in the
    /// same pass. Candidates that cannot merge go to `emit`.
    ///
    /// An `emit` error aborts the remaining ejects and propagates; the
    /// store is left with whatever fragments were not yet visited.
    pub(crate) fn eject<E>(
        &mut self,
        only_untouched: bool,
        emit: &mut impl FnMut(Contour) -> Result<(), E>,
    ) -> Result<usize, E> {
        let mut merged = 0;
        let mut i = 0;
        while i < self.fragments.len() {
            if only_untouched && self.fragments[i].touched {
                i += 1;
                continue;
            }

            if let Some((target, ends)) = self.merge_target(i) {
                let fragment = self.fragments.remove(i);
                let target = if target > i { target - 1 } else { target };
                self.fragments[target].absorb(fragment, ends);
                merged += 1;
                continue;
            }

            emit(self.fragments.remove(i).into_contour())?;
        }
        Ok(merged)
    }

    /// Find another open fragment `candidate` at index `i` can merge
    /// into, and which ends meet. First match in insertion order wins.
    #[allow(clippy::float_cmp)]
    fn merge_target(&self, i: usize) -> Option<(usize, MergeEnds)> {
        let candidate = &self.fragments[i];
        for (j, other) in self.fragments.iter().enumerate() {
            if j == i || other.level != candidate.level {
                continue;
            }
            let ends = if other.tail().coincides(candidate.head()) {
                MergeEnds::TailHead
            } else if other.tail().coincides(candidate.tail()) {
                MergeEnds::TailTail
            } else if other.head().coincides(candidate.tail()) {
                MergeEnds::HeadTail
            } else if other.head().coincides(candidate.head()) {
                MergeEnds::HeadHead
            } else {
                continue;
            };
            return Some((j, ends));
        }
        None
    }
}
