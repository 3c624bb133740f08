//! Integration test: trace a synthetic cone and verify the output
//! geometry against the analytic surface.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use terrace_engine::{Contour, ContourConfig, Point, generate};

const WIDTH: usize = 41;
const HEIGHT: usize = 41;
const CENTER: Point = Point::new(20.0, 20.0);
const PEAK: f64 = 100.0;
const SLOPE: f64 = 4.0;
const INTERVAL: f64 = 10.0;

/// Cone surface value at grid position (x, y).
fn cone(x: f64, y: f64) -> f64 {
    let dx = x - CENTER.x;
    let dy = y - CENTER.y;
    SLOPE.mul_add(-dx.hypot(dy), PEAK)
}

fn cone_grid() -> Vec<f64> {
    let mut samples = Vec::with_capacity(WIDTH * HEIGHT);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            #[allow(clippy::cast_precision_loss)]
            samples.push(cone(x as f64, y as f64));
        }
    }
    samples
}

/// Bilinear interpolation of the original (unfudged) grid at `p`.
fn bilinear(samples: &[f64], p: Point) -> f64 {
    let x0 = (p.x.floor() as usize).min(WIDTH - 2);
    let y0 = (p.y.floor() as usize).min(HEIGHT - 2);
    #[allow(clippy::cast_precision_loss)]
    let (fx, fy) = (p.x - x0 as f64, p.y - y0 as f64);
    let v00 = samples[y0 * WIDTH + x0];
    let v10 = samples[y0 * WIDTH + x0 + 1];
    let v01 = samples[(y0 + 1) * WIDTH + x0];
    let v11 = samples[(y0 + 1) * WIDTH + x0 + 1];
    let top = (v10 - v00).mul_add(fx, v00);
    let bottom = (v11 - v01).mul_add(fx, v01);
    (bottom - top).mul_add(fy, top)
}

fn trace_cone() -> (Vec<f64>, Vec<Contour>) {
    let samples = cone_grid();
    let contours = generate(&samples, WIDTH, &ContourConfig::interval(INTERVAL)).unwrap();
    assert!(!contours.is_empty(), "cone produced no contours");
    (samples, contours)
}

#[test]
fn every_point_re_evaluates_to_its_level() {
    let (samples, contours) = trace_cone();
    for contour in &contours {
        for &p in contour.polyline.points() {
            let v = bilinear(&samples, p);
            assert!(
                (v - contour.level).abs() < 0.05,
                "point ({}, {}) re-evaluates to {v}, expected level {}",
                p.x,
                p.y,
                contour.level,
            );
        }
    }
}

#[test]
fn consecutive_points_stay_within_one_cell_diagonal() {
    let (_, contours) = trace_cone();
    for contour in &contours {
        for w in contour.polyline.points().windows(2) {
            let d = w[0].distance(w[1]);
            assert!(
                d <= std::f64::consts::SQRT_2 + 1e-9,
                "gap of {d} at level {} between ({}, {}) and ({}, {})",
                contour.level,
                w[0].x,
                w[0].y,
                w[1].x,
                w[1].y,
            );
        }
    }
}

#[test]
fn interior_levels_form_nested_rings() {
    let (_, contours) = trace_cone();

    // Levels 30..=90 have analytic radius (PEAK - L) / SLOPE < 20, so
    // their rings lie fully inside the grid and must close. The peak
    // value 100 sits exactly on a level and is fudged below it, so no
    // ring at 100 may appear.
    assert!(contours.iter().all(|c| c.level < PEAK));

    let mut previous_min_radius = f64::INFINITY;
    for step in (3..=9).rev() {
        let level = f64::from(step) * INTERVAL;
        let radius = (PEAK - level) / SLOPE;

        let rings: Vec<&Contour> = contours
            .iter()
            .filter(|c| (c.level - level).abs() < 1e-9)
            .collect();
        assert_eq!(rings.len(), 1, "expected exactly one ring at level {level}");
        let ring = rings[0];
        assert!(ring.is_closed(), "ring at level {level} is not closed");

        // Every vertex sits on the analytic circle, within the linear
        // interpolation error of the cell size.
        let mut max_r: f64 = 0.0;
        let mut min_r = f64::INFINITY;
        for &p in ring.polyline.points() {
            let r = p.distance(CENTER);
            max_r = max_r.max(r);
            min_r = min_r.min(r);
        }
        assert!(
            (max_r - radius).abs() < 0.1 && (min_r - radius).abs() < 0.1,
            "ring at level {level}: radii [{min_r}, {max_r}], expected {radius}",
        );

        // Nested strictly inside the next shallower ring.
        assert!(max_r < previous_min_radius);
        previous_min_radius = min_r;

        // Point count tracks the circumference: the circle crosses
        // roughly 8 * radius grid edges.
        let count = ring.polyline.len();
        #[allow(clippy::cast_precision_loss)]
        let count_f = count as f64;
        assert!(
            count_f > 5.0 * radius && count_f < 11.0 * radius + 10.0,
            "ring at level {level} has {count} points for radius {radius}",
        );
    }
}

#[test]
fn all_levels_are_interval_multiples() {
    let (_, contours) = trace_cone();
    for contour in &contours {
        let steps = contour.level / INTERVAL;
        assert!(
            (steps - steps.round()).abs() < 1e-9,
            "level {} is not a multiple of the interval",
            contour.level,
        );
    }
}
