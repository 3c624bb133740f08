//! Cell evaluation: locate level crossings on one cell's four edges.
//!
//! The edges are tested in a fixed rotational order (up-left to lo-left,
//! lo-left to lo-right, lo-right to up-right, up-right to up-left).
//! Together with the sample fudge applied in [`crate::rows`], this makes
//! adjacent cells emit segments that line up end-to-end with consistent
//! winding, so the fragment store can stitch by endpoint identity with
//! no canonicalization pass.

use crate::levels::LevelSpec;
use crate::rows::CellCorners;
use crate::types::Point;

/// One crossing pair: a piece of a contour line inside a single cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Segment {
    pub level: f64,
    pub a: Point,
    pub b: Point,
}

/// Find every level crossed by `corners` and append the resulting
/// segments to `out`.
///
/// Returns the number of levels that produced an odd crossing count
/// (1 or 3). Odd counts are a numerical edge case, not a failure: the
/// complete pairs are still emitted and the unpaired trailing point is
/// discarded. The caller surfaces the count through engine diagnostics.
#[allow(clippy::float_cmp)] // exact on-level equality is the semantic
pub(crate) fn evaluate(
    corners: &CellCorners,
    y_up: f64,
    y_lo: f64,
    levels: &LevelSpec,
    out: &mut Vec<Segment>,
) -> u64 {
    let values = [
        corners.up_left,
        corners.lo_left,
        corners.lo_right,
        corners.up_right,
    ];
    let positions = [
        Point::new(corners.left_x, y_up),
        Point::new(corners.left_x, y_lo),
        Point::new(corners.right_x, y_lo),
        Point::new(corners.right_x, y_up),
    ];

    let min = values.iter().fold(f64::INFINITY, |m, v| m.min(*v));
    let max = values.iter().fold(f64::NEG_INFINITY, |m, v| m.max(*v));

    let mut odd_levels = 0;
    for level in levels.crossed(min, max) {
        let mut crossings = [Point::new(0.0, 0.0); 4];
        let mut count = 0;

        for i in 0..4 {
            let j = (i + 1) % 4;
            let (v1, v2) = (values[i], values[j]);

            if v1 == level && v2 == level {
                // Flat run along the edge. Contribute the far endpoint
                // only when the run ends there, otherwise every collinear
                // corner would register a spurious crossing.
                if values[(i + 2) % 4] != level {
                    crossings[count] = positions[j];
                    count += 1;
                }
            } else if (v1 < level && v2 >= level) || (v2 < level && v1 >= level) {
                let ratio = (level - v1) / (v2 - v1);
                let (p1, p2) = (positions[i], positions[j]);
                crossings[count] = Point::new(
                    ratio.mul_add(p2.x - p1.x, p1.x),
                    ratio.mul_add(p2.y - p1.y, p1.y),
                );
                count += 1;
            }
        }

        if count % 2 == 1 {
            odd_levels += 1;
            count -= 1;
        }
        for pair in crossings[..count].chunks_exact(2) {
            out.push(Segment {
                level,
                a: pair[0],
                b: pair[1],
            });
        }
    }

    odd_levels
}
