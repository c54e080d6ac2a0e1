//! Inward offset curves of an ellipse.
//!
//! The inner edge of a thick elliptical ring is not an ellipse: it is the
//! outer ellipse offset inward by a constant distance along its normals.
//! Near the ends of the major axis, where curvature is highest, that offset
//! curve folds over itself once the thickness exceeds the local radius of
//! curvature. The functions here find the folded region, skip it, and fit
//! the rest with cubic Beziers.
//!
//! Angles are in degrees, measured clockwise from the top of the ellipse, so
//! a point on the outer ellipse is `center + (rx sin θ, -ry cos θ)`.

use glam::dvec2;

use crate::defaults::INNER_CURVE_STEP_DEGREES;
use crate::log::trace;
use crate::math::{are_close, is_very_small};
use crate::types::{Point, Rect, Vector};

/// Bisection stops once the bracket is narrower than this many degrees.
const BISECTION_PRECISION: f64 = 1e-9;

/// Half-width, in degrees, of the folded region around each end of the
/// major axis for an inward offset of `offset`.
///
/// `rx` and `ry` are the ellipse radii. Returns `0` when the offset curve
/// never folds and `90` when the offset reaches the minor radius, which
/// folds everything.
pub fn inner_curve_self_intersect(rx: f64, ry: f64, offset: f64) -> f64 {
    let (major, minor) = if rx >= ry { (rx, ry) } else { (ry, rx) };

    // Signed distance of the offset point from the major axis, divided by
    // sin(φ), where φ is measured from the end of the major axis. Its root
    // is where the two folded branches cross.
    let crossing = |phi: f64| {
        let (sin, cos) = phi.to_radians().sin_cos();
        let g = (minor * minor * cos * cos + major * major * sin * sin).sqrt();
        offset * major / g - minor
    };

    if !(crossing(0.0) > 0.0) {
        return 0.0;
    }
    if crossing(90.0) >= 0.0 {
        return 90.0;
    }

    let (mut lo, mut hi) = (0.0_f64, 90.0_f64);
    while hi - lo > BISECTION_PRECISION {
        let mid = (lo + hi) / 2.0;
        if crossing(mid) > 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    (lo + hi) / 2.0
}

/// Split `start..end` into the angle ranges that avoid the folded regions.
///
/// Each folded region is the open interval `(c - intersect, c + intersect)`
/// around an end `c` of the major axis: 90° and 270° for a wide ellipse, 0°,
/// 180° and 360° for a tall one. Ranges come back in travel order, so for
/// `start > end` each pair runs backwards. When the whole span lies inside
/// a folded region a single zero-length range at the region's edge is
/// returned.
pub fn compute_angle_ranges(
    rx: f64,
    ry: f64,
    intersect: f64,
    start: f64,
    end: f64,
) -> Vec<(f64, f64)> {
    let lo = start.min(end);
    let hi = start.max(end);

    let mut cuts = Vec::new();
    if intersect > 0.0 && !are_close(rx, ry) {
        let first_center = if rx > ry { 90.0 } else { 0.0 };
        let mut center = first_center + 180.0 * ((lo - intersect - first_center) / 180.0).floor();
        while center - intersect < hi {
            if center + intersect > lo {
                cuts.push((center - intersect, center + intersect));
            }
            center += 180.0;
        }
    }

    let mut ranges = Vec::new();
    let mut cursor = lo;
    for (cut_lo, cut_hi) in cuts {
        if cut_lo > cursor {
            ranges.push((cursor, cut_lo.min(hi)));
        }
        cursor = cursor.max(cut_hi);
    }
    if cursor < hi {
        ranges.push((cursor, hi));
    }
    if ranges.is_empty() {
        ranges.push((cursor, cursor));
    }

    if start > end {
        ranges.reverse();
        for range in &mut ranges {
            *range = (range.1, range.0);
        }
    }

    trace!(start, end, intersect, ranges = ranges.len(), "inner curve ranges");
    ranges
}

/// Cubic Bezier approximation of the inner offset curve from `start` to
/// `end` degrees.
///
/// Returns the first point followed by one control-control-end triplet per
/// piece, with one piece per [`INNER_CURVE_STEP_DEGREES`] of sweep.
pub fn compute_one_inner_curve(start: f64, end: f64, bounds: Rect, offset: f64) -> Vec<Point> {
    let center = bounds.center();
    let rx = bounds.width / 2.0;
    let ry = bounds.height / 2.0;

    let sweep = end - start;
    let pieces = ((sweep.abs() / INNER_CURVE_STEP_DEGREES).ceil() as usize).max(1);
    let step = sweep.to_radians() / pieces as f64;

    let offset_point = |theta: f64| -> (Point, Vector) {
        let (sin, cos) = theta.sin_cos();
        let point = center + dvec2(rx * sin, -ry * cos);
        let d_point = dvec2(rx * cos, ry * sin);

        // Inward normal, unnormalized.
        let normal = dvec2(-ry * sin, rx * cos);
        let g = normal.length();
        if is_very_small(g) {
            return (point, d_point);
        }
        let d_normal = dvec2(-ry * cos, -rx * sin);
        let d_g = (ry * ry - rx * rx) * sin * cos / g;

        let q = point + normal * (offset / g);
        let d_q = d_point + (d_normal / g - normal * (d_g / (g * g))) * offset;
        (q, d_q)
    };

    let mut theta = start.to_radians();
    let (mut q, mut d_q) = offset_point(theta);
    let mut points = Vec::with_capacity(1 + 3 * pieces);
    points.push(q);
    for _ in 0..pieces {
        let next_theta = theta + step;
        let (next_q, next_d_q) = offset_point(next_theta);
        points.push(q + d_q * (step / 3.0));
        points.push(next_q - next_d_q * (step / 3.0));
        points.push(next_q);
        theta = next_theta;
        q = next_q;
        d_q = next_d_q;
    }
    points
}

/// Concatenated inner curves for every range, as a start point followed by
/// Bezier triplets.
pub fn compute_inner_curves(ranges: &[(f64, f64)], bounds: Rect, offset: f64) -> Vec<Point> {
    let mut points = Vec::new();
    for &(start, end) in ranges {
        let curve = compute_one_inner_curve(start, end, bounds, offset);
        let skip = usize::from(!points.is_empty());
        points.extend(curve.into_iter().skip(skip));
    }
    points
}
