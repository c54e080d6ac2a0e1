//! Elliptical arc to cubic Bezier conversion.
//!
//! The arc is taken the SVG way: start point, radii, x-axis rotation, large-arc
//! flag, sweep direction and end point. The problem is moved into the
//! ellipse's own frame and scaled to a unit circle, where the centre is solved
//! and the swept angle is cut into at most four equal pieces of no more than
//! 90° each. Every piece becomes one cubic whose control points sit at the
//! classic `4/3 tan(θ/4)` distance along the tangents.

use glam::{DAffine2, DMat2, dvec2};

use crate::defaults::ARC_EPSILON;
use crate::log::debug;
use crate::path::{ArcSegment, SweepDirection};
use crate::types::{Point, Size};

use super::flatten_cubic_into;

/// Result of converting one arc.
#[derive(Clone, Debug, PartialEq)]
pub enum BezierArc {
    /// Start and end coincide; the arc draws nothing.
    Omit,
    /// A radius is too small for the chord; draw a straight line instead.
    Line,
    /// Between one and four cubics as `[control1, control2, end]` triplets.
    /// The last end point is exactly the arc's end point.
    Curves(Vec<[Point; 3]>),
}

impl BezierArc {
    /// Piece count: `-1` for [`BezierArc::Omit`], `0` for [`BezierArc::Line`].
    pub fn pieces(&self) -> i32 {
        match self {
            BezierArc::Omit => -1,
            BezierArc::Line => 0,
            BezierArc::Curves(curves) => curves.len() as i32,
        }
    }
}

pub fn arc_segment_to_bezier(start: Point, arc: &ArcSegment) -> BezierArc {
    arc_to_bezier(
        start,
        arc.size,
        arc.rotation_angle,
        arc.is_large_arc,
        arc.sweep,
        arc.point,
    )
}

/// Convert an elliptical arc from `start` to `end` into cubic Beziers.
pub fn arc_to_bezier(
    start: Point,
    radius: Size,
    rotation_degrees: f64,
    is_large_arc: bool,
    sweep: SweepDirection,
    end: Point,
) -> BezierArc {
    let clockwise = sweep == SweepDirection::Clockwise;

    // Origin at the chord midpoint; the start is at -half, the end at +half.
    let half = 0.5 * (end - start);
    let half_chord_squared = half.length_squared();
    if half_chord_squared < ARC_EPSILON * ARC_EPSILON {
        debug!(?start, ?end, "arc_to_bezier: chord degenerates to a point, omitted");
        return BezierArc::Omit;
    }

    let fuzz_squared = ARC_EPSILON * ARC_EPSILON;
    let (Some(mut rx), Some(mut ry)) = (
        accept_radius(half_chord_squared, fuzz_squared, radius.width),
        accept_radius(half_chord_squared, fuzz_squared, radius.height),
    ) else {
        debug!(?radius, "arc_to_bezier: radius too small, drawing a line");
        return BezierArc::Line;
    };

    // Rotate into the ellipse frame, then scale the ellipse to a unit circle.
    let (sin, cos) = (-rotation_degrees.to_radians()).sin_cos();
    let mut x = (half.x * cos - half.y * sin) / rx;
    let mut y = (half.x * sin + half.y * cos) / ry;

    let half_chord_squared = x * x + y * y;
    let center = if half_chord_squared > 1.0 {
        // The chord is longer than the diameter: grow the radii uniformly so the
        // chord becomes a diameter centred on the chord midpoint.
        let r = half_chord_squared.sqrt();
        rx *= r;
        ry *= r;
        x /= r;
        y /= r;
        Point::ZERO
    } else {
        // Walk from the chord midpoint to the centre, perpendicular to the chord.
        let r = ((1.0 - half_chord_squared) / half_chord_squared).sqrt();
        if is_large_arc != clockwise {
            dvec2(-r * y, r * x)
        } else {
            dvec2(r * y, -r * x)
        }
    };

    // Start and end on the unit circle around the centre.
    let mut piece_start = dvec2(-x, -y) - center;
    let piece_end = dvec2(x, y) - center;

    // Back from unit-circle coordinates to the caller's.
    let linear = DMat2::from_cols(dvec2(cos * rx, -sin * rx), dvec2(sin * ry, cos * ry));
    let translation = 0.5 * (start + end) + linear * center;
    let to_ellipse = DAffine2::from_mat2_translation(linear, translation);

    let (cos_piece, sin_piece, pieces) =
        piece_angle(piece_start, piece_end, is_large_arc, clockwise);

    let mut distance = bezier_distance(cos_piece, 1.0);
    if !clockwise {
        distance = -distance;
    }

    let mut curves = Vec::with_capacity(pieces);
    let mut to_control1 = dvec2(-distance * piece_start.y, distance * piece_start.x);
    for _ in 1..pieces {
        let next = dvec2(
            piece_start.x * cos_piece - piece_start.y * sin_piece,
            piece_start.x * sin_piece + piece_start.y * cos_piece,
        );
        let to_control2 = dvec2(-distance * next.y, distance * next.x);
        curves.push([
            to_ellipse.transform_point2(piece_start + to_control1),
            to_ellipse.transform_point2(next - to_control2),
            to_ellipse.transform_point2(next),
        ]);
        piece_start = next;
        to_control1 = to_control2;
    }

    let to_control2 = dvec2(-distance * piece_end.y, distance * piece_end.x);
    curves.push([
        to_ellipse.transform_point2(piece_start + to_control1),
        to_ellipse.transform_point2(piece_end - to_control2),
        end,
    ]);

    BezierArc::Curves(curves)
}

/// Flatten an arc segment starting at `start`, without the start point.
///
/// Degenerate arcs produce a single line to the end point, or nothing.
pub fn flatten_arc_into(start: Point, arc: &ArcSegment, tolerance: f64, out: &mut Vec<Point>) {
    match arc_segment_to_bezier(start, arc) {
        BezierArc::Omit => {}
        BezierArc::Line => out.push(arc.point),
        BezierArc::Curves(curves) => {
            let mut from = start;
            for [p1, p2, p3] in curves {
                flatten_cubic_into(&[from, p1, p2, p3], tolerance, true, out, None);
                from = p3;
            }
        }
    }
}

/// A radius is usable when its square exceeds the half chord squared times the
/// fuzz. Accepted radii are made non-negative.
fn accept_radius(half_chord_squared: f64, fuzz_squared: f64, radius: f64) -> Option<f64> {
    (radius * radius > half_chord_squared * fuzz_squared).then_some(radius.abs())
}

/// Cosine, sine and piece count for cutting the arc between two unit vectors.
///
/// The piece count follows from the quadrant of the total sweep: 1 below 90°,
/// 2 up to 180°, 3 up to 270° and 4 beyond.
fn piece_angle(start: Point, end: Point, is_large_arc: bool, clockwise: bool) -> (f64, f64, usize) {
    let cos = start.dot(end);
    let sin = start.x * end.y - start.y * end.x;

    let pieces = match (cos >= 0.0, is_large_arc) {
        (true, false) => return (cos, sin, 1),
        (true, true) => 4,
        (false, true) => 3,
        (false, false) => 2,
    };

    let mut angle = sin.atan2(cos);
    if clockwise {
        if angle < 0.0 {
            angle += std::f64::consts::TAU;
        }
    } else if angle > 0.0 {
        angle -= std::f64::consts::TAU;
    }
    angle /= pieces as f64;
    (angle.cos(), angle.sin(), pieces)
}

/// Control point distance, relative to `radius`, for a circular arc whose end
/// radii have dot product `dot` (that is `radius² cos θ`).
///
/// This is `4/3 tan(θ/4)` written with half-angle identities.
pub fn bezier_distance(dot: f64, radius: f64) -> f64 {
    let radius_squared = radius * radius;
    let half_cos_squared = 0.5 * (radius_squared + dot);
    if half_cos_squared < 0.0 {
        return 0.0;
    }
    let half_sin_squared = radius_squared - half_cos_squared;
    if half_sin_squared <= 0.0 {
        return 0.0;
    }
    let half_sin = half_sin_squared.sqrt();
    if half_sin < ARC_EPSILON * radius {
        return 0.0;
    }
    4.0 * (radius - half_cos_squared.sqrt()) / (3.0 * half_sin)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(p0: Point, [p1, p2, p3]: [Point; 3], t: f64) -> Point {
        let mt = 1.0 - t;
        p0 * (mt * mt * mt) + p1 * (3.0 * mt * mt * t) + p2 * (3.0 * mt * t * t) + p3 * (t * t * t)
    }

    fn curves(arc: BezierArc) -> Vec<[Point; 3]> {
        match arc {
            BezierArc::Curves(curves) => curves,
            other => panic!("expected curves, got {other:?}"),
        }
    }

    #[test]
    fn quarter_circle_is_one_piece_on_the_circle() {
        let start = dvec2(50.0, 0.0);
        let end = dvec2(100.0, 50.0);
        let r = Size::new(50.0, 50.0);
        let arc = arc_to_bezier(start, r, 0.0, false, SweepDirection::Clockwise, end);
        assert_eq!(arc.pieces(), 1);
        let pieces = curves(arc);
        assert_eq!(pieces[0][2], end);

        let center = dvec2(50.0, 50.0);
        for i in 0..=8 {
            let p = eval(start, pieces[0], i as f64 / 8.0);
            assert!((p.distance(center) - 50.0).abs() < 0.02, "{p} is off the circle");
        }
        // Bulges away from the centre, towards the top right.
        let mid = eval(start, pieces[0], 0.5);
        assert!(mid.x > 75.0 && mid.y < 25.0, "mid {mid}");
    }

    #[test]
    fn counterclockwise_takes_the_other_side() {
        let start = dvec2(50.0, 0.0);
        let end = dvec2(100.0, 50.0);
        let pieces = curves(arc_to_bezier(
            start,
            Size::new(50.0, 50.0),
            0.0,
            false,
            SweepDirection::Counterclockwise,
            end,
        ));
        let mid = eval(start, pieces[0], 0.5);
        // Centre is now (100, 0); the arc dips towards the bottom left.
        assert!((mid.distance(dvec2(100.0, 0.0)) - 50.0).abs() < 0.02);
        assert!(mid.x < 75.0 && mid.y > 25.0, "mid {mid}");
    }

    #[test]
    fn piece_counts_follow_the_sweep() {
        let r = Size::new(10.0, 10.0);
        let cw = SweepDirection::Clockwise;
        // Half circle: cos = -1, small arc
        let half = arc_to_bezier(dvec2(0.0, 0.0), r, 0.0, false, cw, dvec2(20.0, 0.0));
        assert_eq!(half.pieces(), 2);
        // 270°: large arc with cos = 0
        let large = arc_to_bezier(dvec2(10.0, 0.0), r, 0.0, true, cw, dvec2(20.0, 10.0));
        assert_eq!(large.pieces(), 4);
        // Large arc beyond 180° but with a negative cosine
        let s = dvec2(10.0 + 10.0 * (0.1f64).cos(), 10.0 + 10.0 * (0.1f64).sin());
        let e = dvec2(10.0 + 10.0 * (2.5f64).cos(), 10.0 + 10.0 * (2.5f64).sin());
        let three = arc_to_bezier(s, r, 0.0, true, cw, e);
        assert_eq!(three.pieces(), 3);
    }

    #[test]
    fn radii_are_scaled_up_to_fit_the_chord() {
        let start = dvec2(0.0, 0.0);
        let end = dvec2(100.0, 0.0);
        let r = Size::new(10.0, 10.0);
        let pieces = curves(arc_to_bezier(start, r, 0.0, false, SweepDirection::Clockwise, end));
        assert_eq!(pieces.len(), 2);
        // The chord became a diameter: the middle point is 50 away from (50, 0).
        let mid = pieces[0][2];
        assert!((mid.distance(dvec2(50.0, 0.0)) - 50.0).abs() < 1e-9, "mid {mid}");
        assert_eq!(pieces[1][2], end);
    }

    #[test]
    fn degenerate_arcs() {
        let p = dvec2(3.0, 4.0);
        let cw = SweepDirection::Clockwise;
        assert_eq!(arc_to_bezier(p, Size::new(5.0, 5.0), 0.0, true, cw, p), BezierArc::Omit);
        assert_eq!(BezierArc::Omit.pieces(), -1);

        let line = arc_to_bezier(p, Size::new(0.0, 5.0), 0.0, false, cw, dvec2(10.0, 4.0));
        assert_eq!(line, BezierArc::Line);
        assert_eq!(line.pieces(), 0);

        let nan = arc_to_bezier(p, Size::new(f64::NAN, 5.0), 0.0, false, cw, dvec2(10.0, 4.0));
        assert_eq!(nan, BezierArc::Line);
    }

    #[test]
    fn rotated_ellipse_ends_exactly() {
        let start = dvec2(10.0, 20.0);
        let end = dvec2(70.0, 45.0);
        for sweep in [SweepDirection::Clockwise, SweepDirection::Counterclockwise] {
            for large in [false, true] {
                let arc = arc_to_bezier(start, Size::new(40.0, 25.0), 30.0, large, sweep, end);
                let pieces = curves(arc);
                assert_eq!(pieces.last().unwrap()[2], end);
            }
        }
    }

    #[test]
    fn bezier_distance_matches_tangent_formula() {
        for degrees in [10.0f64, 45.0, 90.0] {
            let theta = degrees.to_radians();
            let expected = 4.0 / 3.0 * (theta / 4.0).tan();
            assert!((bezier_distance(theta.cos(), 1.0) - expected).abs() < 1e-12);
        }
        assert_eq!(bezier_distance(1.0, 1.0), 0.0);
    }

    #[test]
    fn flattened_arc_skips_the_start() {
        let arc = ArcSegment {
            point: dvec2(100.0, 50.0),
            size: Size::new(50.0, 50.0),
            rotation_angle: 0.0,
            is_large_arc: false,
            sweep: SweepDirection::Clockwise,
        };
        let mut out = Vec::new();
        flatten_arc_into(dvec2(50.0, 0.0), &arc, 0.1, &mut out);
        assert!(out.len() > 3);
        assert_ne!(out[0], dvec2(50.0, 0.0));
        assert_eq!(*out.last().unwrap(), arc.point);
    }
}
