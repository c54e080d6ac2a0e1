//! Bezier flattening: cubic and quadratic curves to tolerance-bounded polylines.
//!
//! Two strategies are used:
//!
//! - **Adaptive forward differencing** when the control polygon projects
//!   monotonically onto the chord. The walk starts from the power-of-two step
//!   count the second differences call for; the step size is then halved
//!   while a step is not flat enough and doubled back while it is comfortably
//!   flat, and every point is produced by the forward-difference recurrence
//!   (O(1) per point).
//! - **Midpoint subdivision** otherwise. The curve is split at `t = 0.5` to a
//!   depth of `log8(chord / tolerance)`, and every leaf is walked with uniform
//!   forward differencing using a step count derived from its second
//!   differences.
//!
//! In both cases the first control point is emitted exactly (unless skipped)
//! and the last control point is emitted exactly once, bit for bit.

pub mod arc;

use crate::defaults::FLATTENING_TOLERANCE;
use crate::errors::{GeometryError, Result};
use crate::log::{trace, warn};
use crate::math::{
    double_from_mantissa_and_exponent, is_very_small, log4_ceil, log8_ceil, midpoint,
};
use crate::types::{Point, Vector};

/// Upper bound on the adaptive step count, guarding against non-finite input.
const MAX_ADAPTIVE_STEPS: u64 = 1 << 24;
/// Upper bounds on subdivision depth and leaf step exponent, for the same reason.
const MAX_SUBDIVISION_DEPTH: u32 = 10;
const MAX_LEAF_STEP_EXPONENT: u32 = 16;

/// Flatten a cubic Bezier given as exactly four control points.
pub fn flatten_cubic(
    control_points: &[Point],
    tolerance: f64,
    skip_first_point: bool,
) -> Result<Vec<Point>> {
    let points: &[Point; 4] = control_points.try_into().map_err(|_| {
        warn!(found = control_points.len(), "flatten_cubic: wrong control point count");
        GeometryError::ControlPointCount {
            expected: 4,
            found: control_points.len(),
        }
    })?;
    let mut out = Vec::new();
    flatten_cubic_into(points, tolerance, skip_first_point, &mut out, None);
    Ok(out)
}

/// Flatten a quadratic Bezier given as exactly three control points.
pub fn flatten_quadratic(
    control_points: &[Point],
    tolerance: f64,
    skip_first_point: bool,
) -> Result<Vec<Point>> {
    let points: &[Point; 3] = control_points.try_into().map_err(|_| {
        warn!(found = control_points.len(), "flatten_quadratic: wrong control point count");
        GeometryError::ControlPointCount {
            expected: 3,
            found: control_points.len(),
        }
    })?;
    let mut out = Vec::new();
    flatten_quadratic_into(points, tolerance, skip_first_point, &mut out, None);
    Ok(out)
}

/// The cubic with the same shape as a quadratic.
pub fn elevate_quadratic(points: &[Point; 3]) -> [Point; 4] {
    let [p0, p1, p2] = *points;
    [p0, p0.lerp(p1, 2.0 / 3.0), p1.lerp(p2, 1.0 / 3.0), p2]
}

pub fn flatten_quadratic_into(
    points: &[Point; 3],
    tolerance: f64,
    skip_first_point: bool,
    out: &mut Vec<Point>,
    parameters: Option<&mut Vec<f64>>,
) {
    flatten_cubic_into(
        &elevate_quadratic(points),
        tolerance,
        skip_first_point,
        out,
        parameters,
    );
}

/// Append the flattened cubic to `out`.
///
/// When `parameters` is given it receives the curve parameter `t` of every
/// point pushed to `out`, in the same order.
pub fn flatten_cubic_into(
    points: &[Point; 4],
    tolerance: f64,
    skip_first_point: bool,
    out: &mut Vec<Point>,
    parameters: Option<&mut Vec<f64>>,
) {
    let tolerance = effective_tolerance(tolerance);
    let mut sink = Sink { out, parameters };

    if !skip_first_point {
        sink.push(points[0], 0.0);
    }

    if is_monotone(points, tolerance) {
        let mut differencer = AdaptiveForwardDifferencer::new(points, tolerance);
        while let Some((point, t)) = differencer.next_point() {
            sink.push(point, t);
        }
    } else {
        let chord = (points[3] - points[0]).length();
        let mut depth = log8_ceil((chord / tolerance).round() as u64).min(MAX_SUBDIVISION_DEPTH);
        if depth > 0 {
            depth -= 1;
        }
        trace!(depth, chord, "flatten_cubic: midpoint subdivision");
        subdivide(points, depth, 0.0, 1.0, tolerance, &mut sink);
    }

    sink.push(points[3], 1.0);
}

fn effective_tolerance(tolerance: f64) -> f64 {
    if tolerance > 0.0 && tolerance.is_finite() {
        tolerance
    } else {
        FLATTENING_TOLERANCE
    }
}

/// Output points plus their optional parameters.
struct Sink<'a> {
    out: &'a mut Vec<Point>,
    parameters: Option<&'a mut Vec<f64>>,
}

impl Sink<'_> {
    fn push(&mut self, point: Point, t: f64) {
        self.out.push(point);
        if let Some(parameters) = self.parameters.as_mut() {
            parameters.push(t);
        }
    }
}

/// The chord exceeds the tolerance and both inner control points project onto
/// it within `[0, |chord|²]`, in order.
fn is_monotone(points: &[Point; 4], tolerance: f64) -> bool {
    let chord = points[3] - points[0];
    let length_squared = chord.length_squared();
    if length_squared <= tolerance * tolerance {
        return false;
    }
    let d1 = chord.dot(points[1] - points[0]);
    let d2 = chord.dot(points[2] - points[0]);
    let within = |d: f64| (0.0..=length_squared).contains(&d);
    within(d1) && within(d2) && d1 <= d2
}

/// Forward-difference walker over `B(t) = a t³ + b t² + c t + d` whose step
/// size adapts to the local flatness.
///
/// `a`, `b` and `c` are always expressed for the current step size, so that
/// one step of the recurrence advances the parameter by `dparam`.
struct AdaptiveForwardDifferencer {
    a: Vector,
    b: Vector,
    c: Vector,
    d: Point,
    /// Steps left at the current step size
    num_steps: u64,
    param: f64,
    dparam: f64,
    flatness: f64,
}

impl AdaptiveForwardDifferencer {
    fn new(points: &[Point; 4], tolerance: f64) -> Self {
        let [p0, p1, p2, p3] = *points;
        let mut differencer = Self {
            a: -p0 + 3.0 * (p1 - p2) + p3,
            b: 3.0 * (p0 + p2 - 2.0 * p1),
            c: 3.0 * (p1 - p0),
            d: p0,
            num_steps: 1,
            param: 0.0,
            dparam: 1.0,
            flatness: 3.0 * tolerance,
        };
        // Start from the uniform step count the second differences call for.
        for _ in 0..leaf_step_exponent(points, tolerance) {
            differencer.halve_step();
        }
        differencer
    }

    /// Whether an inner control point of the next step lies more than
    /// `flatness / 3` from the step's chord line.
    ///
    /// `c / 3` and `(b + 2c) / 3` are those control points relative to the
    /// step start. The curve stays within three quarters of their largest
    /// distance from the chord line, so flatness `3 * tolerance` keeps every
    /// step within the tolerance. A step whose chord vanishes is measured from
    /// its start point instead.
    fn must_subdivide(&self, flatness: f64) -> bool {
        let (a, b, c) = (self.a, self.b, self.c);
        let inner = b + 2.0 * c;
        let normal = (a + b + c).perp();
        let scale = normal.length();
        if is_very_small(scale) {
            return c.length() > flatness || inner.length() > flatness;
        }
        let limit = scale * flatness;
        c.dot(normal).abs() > limit || inner.dot(normal).abs() > limit
    }

    fn halve_step(&mut self) {
        self.a *= 0.125;
        self.b *= 0.25;
        self.c *= 0.5;
        self.num_steps *= 2;
        self.dparam *= 0.5;
    }

    fn double_step(&mut self) {
        self.a *= 8.0;
        self.b *= 4.0;
        self.c *= 2.0;
        self.num_steps /= 2;
        self.dparam *= 2.0;
    }

    fn increment(&mut self) {
        self.d += self.a + self.b + self.c;
        self.c += 3.0 * self.a + 2.0 * self.b;
        self.b += 3.0 * self.a;
        self.num_steps -= 1;
        self.param += self.dparam;
    }

    /// Next interior point and its parameter; `None` once the end is reached.
    fn next_point(&mut self) -> Option<(Point, f64)> {
        if self.num_steps == 0 {
            return None;
        }
        while self.num_steps < MAX_ADAPTIVE_STEPS && self.must_subdivide(self.flatness) {
            self.halve_step();
        }
        self.increment();
        if self.num_steps == 0 {
            return None;
        }
        while self.num_steps % 2 == 0 && !self.must_subdivide(0.25 * self.flatness) {
            self.double_step();
        }
        Some((self.d, self.param))
    }
}

/// de Casteljau split at `t = 0.5`.
fn split_half(points: &[Point; 4]) -> ([Point; 4], [Point; 4]) {
    let [p0, p1, p2, p3] = *points;
    let p01 = midpoint(p0, p1);
    let p12 = midpoint(p1, p2);
    let p23 = midpoint(p2, p3);
    let p012 = midpoint(p01, p12);
    let p123 = midpoint(p12, p23);
    let mid = midpoint(p012, p123);
    ([p0, p01, p012, mid], [mid, p123, p23, p3])
}

/// Emit the interior points of `points` (parameter range `t0..t1`), splitting
/// `depth` more times before walking the leaves.
fn subdivide(points: &[Point; 4], depth: u32, t0: f64, t1: f64, tolerance: f64, sink: &mut Sink) {
    if depth == 0 {
        flatten_leaf(points, t0, t1, tolerance, sink);
        return;
    }
    let (left, right) = split_half(points);
    let tm = 0.5 * (t0 + t1);
    subdivide(&left, depth - 1, t0, tm, tolerance, sink);
    sink.push(left[3], tm);
    subdivide(&right, depth - 1, tm, t1, tolerance, sink);
}

/// Smallest `n` such that `2^n` uniform steps keep every step within
/// `tolerance` of the curve: a step of `h` strays at most `h² / 8` times the
/// largest second derivative, which is six times the largest second difference.
fn leaf_step_exponent(points: &[Point; 4], tolerance: f64) -> u32 {
    let [p0, p1, p2, p3] = *points;
    let error = (p0 - 2.0 * p1 + p2)
        .length()
        .max((p1 - 2.0 * p2 + p3).length());
    log4_ceil((error * 0.75 / tolerance).ceil() as u64).min(MAX_LEAF_STEP_EXPONENT)
}

/// Uniform forward differencing with `2^n` steps, `n` chosen so that each step
/// stays within `tolerance` of the curve.
fn flatten_leaf(points: &[Point; 4], t0: f64, t1: f64, tolerance: f64, sink: &mut Sink) {
    let [p0, p1, p2, p3] = *points;
    let n = leaf_step_exponent(points, tolerance) as i32;
    let steps = 1u64 << n;
    if steps <= 1 {
        return;
    }

    let a = -p0 + 3.0 * (p1 - p2) + p3;
    let b = 3.0 * (p0 + p2 - 2.0 * p1);
    let c = 3.0 * (p1 - p0);

    // Step h = 2^-n.
    let h = double_from_mantissa_and_exponent(1.0, -n);
    let h2 = double_from_mantissa_and_exponent(1.0, -2 * n);
    let h3 = double_from_mantissa_and_exponent(1.0, -3 * n);

    let mut point = p0;
    let mut d1 = a * h3 + b * h2 + c * h;
    let mut d2 = 6.0 * a * h3 + 2.0 * b * h2;
    let d3 = 6.0 * a * h3;

    let dt = (t1 - t0) * h;
    for i in 1..steps {
        point += d1;
        d1 += d2;
        d2 += d3;
        sink.push(point, t0 + dt * i as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    fn eval_cubic(p: &[Point; 4], t: f64) -> Point {
        let mt = 1.0 - t;
        p[0] * (mt * mt * mt)
            + p[1] * (3.0 * mt * mt * t)
            + p[2] * (3.0 * mt * t * t)
            + p[3] * (t * t * t)
    }

    #[test]
    fn wrong_control_point_counts_fail_fast() {
        let err = flatten_cubic(&[Point::ZERO; 3], 0.25, false).unwrap_err();
        assert_eq!(
            err,
            GeometryError::ControlPointCount {
                expected: 4,
                found: 3
            }
        );
        assert!(flatten_quadratic(&[Point::ZERO; 4], 0.25, false).is_err());
    }

    #[test]
    fn endpoints_are_exact() {
        let p = [
            dvec2(0.3, 0.7),
            dvec2(33.1, 91.7),
            dvec2(70.9, -40.3),
            dvec2(100.1, 10.3),
        ];
        let points = flatten_cubic(&p, 0.1, false).unwrap();
        assert_eq!(points[0], p[0]);
        assert_eq!(*points.last().unwrap(), p[3]);
        assert_eq!(points.iter().filter(|&&q| q == p[3]).count(), 1);

        let skipped = flatten_cubic(&p, 0.1, true).unwrap();
        assert_eq!(skipped.len(), points.len() - 1);
        assert_eq!(skipped[..], points[1..]);
    }

    #[test]
    fn non_positive_tolerance_uses_the_default() {
        let p = [dvec2(0.0, 0.0), dvec2(0.0, 50.0), dvec2(50.0, 50.0), dvec2(50.0, 0.0)];
        let default = flatten_cubic(&p, FLATTENING_TOLERANCE, false).unwrap();
        assert_eq!(flatten_cubic(&p, 0.0, false).unwrap(), default);
        assert_eq!(flatten_cubic(&p, -1.0, false).unwrap(), default);
        assert_eq!(flatten_cubic(&p, f64::NAN, false).unwrap(), default);
    }

    #[test]
    fn straight_cubic_is_a_single_segment() {
        let p = [dvec2(0.0, 0.0), dvec2(10.0, 0.0), dvec2(20.0, 0.0), dvec2(30.0, 0.0)];
        let points = flatten_cubic(&p, 0.25, false).unwrap();
        assert_eq!(points, vec![p[0], p[3]]);
    }

    #[test]
    fn degenerate_cubic_emits_both_ends() {
        let p = [dvec2(5.0, 5.0); 4];
        assert_eq!(flatten_cubic(&p, 0.25, false).unwrap(), vec![p[0], p[3]]);
    }

    #[test]
    fn parameters_track_points_and_increase() {
        for p in [
            // monotone
            [dvec2(0.0, 0.0), dvec2(10.0, 40.0), dvec2(60.0, 40.0), dvec2(70.0, 0.0)],
            // loop, subdivided
            [dvec2(0.0, 0.0), dvec2(100.0, 100.0), dvec2(-50.0, 100.0), dvec2(50.0, 0.0)],
        ] {
            let mut out = Vec::new();
            let mut params = Vec::new();
            flatten_cubic_into(&p, 0.1, false, &mut out, Some(&mut params));
            assert_eq!(out.len(), params.len());
            assert_eq!(params[0], 0.0);
            assert_eq!(*params.last().unwrap(), 1.0);
            assert!(params.windows(2).all(|w| w[0] < w[1]), "params not increasing: {params:?}");
            for (q, &t) in out.iter().zip(&params) {
                let expected = eval_cubic(&p, t);
                assert!(q.distance(expected) < 1e-6, "point {q} is not B({t}) = {expected}");
            }
        }
    }

    #[test]
    fn quadratic_elevation_preserves_the_curve() {
        let q = [dvec2(0.0, 0.0), dvec2(50.0, 100.0), dvec2(100.0, 0.0)];
        let c = elevate_quadratic(&q);
        assert_eq!(c[0], q[0]);
        assert_eq!(c[3], q[2]);
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let mt = 1.0 - t;
            let expected = q[0] * (mt * mt) + q[1] * (2.0 * mt * t) + q[2] * (t * t);
            assert!(eval_cubic(&c, t).distance(expected) < 1e-9);
        }
        let points = flatten_quadratic(&q, 0.25, false).unwrap();
        assert!(points.len() > 4);
        assert_eq!(*points.last().unwrap(), q[2]);
    }

    #[test]
    fn adaptive_walk_starts_from_the_error_estimate() {
        let p = [dvec2(0.0, 0.0), dvec2(30.0, 40.0), dvec2(70.0, 40.0), dvec2(100.0, 0.0)];
        assert!(is_monotone(&p, 0.05));
        // Second difference |(10, -40)|: 0.75 * 41.23 / 0.05 rounds up to 619 <= 4^5.
        assert_eq!(leaf_step_exponent(&p, 0.05), 5);
        let differencer = AdaptiveForwardDifferencer::new(&p, 0.05);
        assert_eq!(differencer.num_steps, 32);
        assert_eq!(differencer.dparam, 1.0 / 32.0);
    }

    #[test]
    fn tighter_tolerance_gives_more_points() {
        let p = [dvec2(0.0, 0.0), dvec2(20.0, 80.0), dvec2(80.0, 80.0), dvec2(100.0, 0.0)];
        let coarse = flatten_cubic(&p, 1.0, false).unwrap();
        let fine = flatten_cubic(&p, 0.01, false).unwrap();
        assert!(fine.len() > coarse.len());
    }
}
