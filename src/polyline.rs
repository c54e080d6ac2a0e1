//! Polyline analysis and arc-length marching.
//!
//! [`PolylineData`] derives per-edge lengths and normals, per-vertex turn
//! angles and accumulated arc length from a point sequence, computing them
//! once on first use. [`path_march`] walks a polyline by signed distances
//! supplied one at a time by a callback.

use std::cell::OnceCell;

use crate::errors::{GeometryError, Result};
use crate::log::trace;
use crate::math::{
    are_close, ensure_range, greater_than, greater_than_or_close, is_very_small,
    less_than_or_close, normal, normalized, safe_divide,
};
use crate::types::{Point, Vector};

/// Derived, immutable view over a point sequence of at least two points.
///
/// Edge `i` runs from point `i` to point `i + 1`. The polyline is closed when
/// its first and last points are equal.
#[derive(Clone, Debug)]
pub struct PolylineData {
    points: Vec<Point>,
    derived: OnceCell<Derived>,
}

#[derive(Clone, Debug)]
struct Derived {
    lengths: Vec<f64>,
    normals: Vec<Vector>,
    angles: Vec<f64>,
    accumulated: Vec<f64>,
}

impl PolylineData {
    pub fn new(points: Vec<Point>) -> Result<Self> {
        if points.len() < 2 {
            crate::log::warn!(found = points.len(), "polyline: too few points");
            return Err(GeometryError::PolylineTooShort {
                found: points.len(),
            });
        }
        Ok(Self {
            points,
            derived: OnceCell::new(),
        })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn count(&self) -> usize {
        self.points.len()
    }

    pub fn is_closed(&self) -> bool {
        self.points[0] == self.points[self.points.len() - 1]
    }

    /// Vector from point `index` to the next point, wrapping at the end.
    pub fn difference(&self, index: usize) -> Vector {
        let next = (index + 1) % self.points.len();
        self.points[next] - self.points[index]
    }

    /// Length of edge `index`. The entry for the last point measures the
    /// wrap-around edge back to the first point.
    pub fn lengths(&self) -> &[f64] {
        &self.derived().lengths
    }

    /// Unit left normal of each edge; the last entry repeats the one before it.
    pub fn normals(&self) -> &[Vector] {
        &self.derived().normals
    }

    /// Turn at each vertex as `-cos` of the angle between the adjacent edge
    /// normals: `-1` for a straight continuation, `1` for a full reversal.
    ///
    /// The end vertices are `1` on an open polyline and share the wrap-around
    /// turn on a closed one.
    pub fn angles(&self) -> &[f64] {
        &self.derived().angles
    }

    /// Arc length from the first point to each point.
    pub fn accumulated_lengths(&self) -> &[f64] {
        &self.derived().accumulated
    }

    pub fn total_length(&self) -> f64 {
        let accumulated = self.accumulated_lengths();
        accumulated[accumulated.len() - 1]
    }

    /// Normal at `fraction` along edge `index`, blended with the neighbouring
    /// edge's normal within `corner_radius` of either vertex.
    ///
    /// Exactly at a vertex the result is the average of both edge normals, so
    /// the normal is continuous across corners. A zero-length edge takes the
    /// average of its neighbours.
    pub fn smooth_normal(&self, index: usize, fraction: f64, corner_radius: f64) -> Vector {
        let normals = self.normals();
        let count = self.count();
        if corner_radius <= 0.0 {
            return normals[index];
        }

        let length = self.lengths()[index];
        if is_very_small(length) {
            let prev = match index.checked_sub(1) {
                Some(prev) => Some(prev),
                None if self.is_closed() => Some(count - 2),
                None => None,
            };
            let next = if self.is_closed() && index + 1 >= count - 1 {
                Some(0)
            } else {
                Some(index + 1).filter(|&next| next < count - 1)
            };
            return match (prev, next) {
                (Some(prev), Some(next)) => normalized(normals[prev].lerp(normals[next], 0.5)),
                _ => normals[index],
            };
        }

        let amount = (corner_radius / length).min(0.5);
        if fraction <= amount {
            let prev = match index.checked_sub(1) {
                Some(prev) => Some(prev),
                None if self.is_closed() => Some(count - 2),
                None => None,
            };
            if let Some(prev) = prev {
                let alpha = (amount - fraction) / (2.0 * amount);
                return normalized(normals[index].lerp(normals[prev], alpha));
            }
        } else if fraction >= 1.0 - amount {
            let next = if self.is_closed() && index + 1 >= count - 1 {
                Some(0)
            } else {
                Some(index + 1).filter(|&next| next < count - 1)
            };
            if let Some(next) = next {
                let alpha = (fraction + amount - 1.0) / (2.0 * amount);
                return normalized(normals[index].lerp(normals[next], alpha));
            }
        }
        normals[index]
    }

    /// Point at `distance` along the polyline, clamped to its ends.
    pub fn point_at_arc_length(&self, distance: f64) -> Point {
        let accumulated = self.accumulated_lengths();
        let last_edge = self.count() - 2;
        if distance.is_nan() || distance <= 0.0 {
            return self.points[0];
        }
        if distance >= self.total_length() {
            return self.points[self.count() - 1];
        }
        // First vertex strictly beyond `distance`, minus one, is the edge.
        let index = accumulated
            .partition_point(|&a| a <= distance)
            .saturating_sub(1)
            .min(last_edge);
        let ratio = safe_divide(distance - accumulated[index], self.lengths()[index], 0.0);
        self.points[index].lerp(self.points[index + 1], ensure_range(ratio, 0.0, 1.0))
    }

    fn derived(&self) -> &Derived {
        self.derived.get_or_init(|| Derived::compute(&self.points))
    }
}

impl Derived {
    fn compute(points: &[Point]) -> Self {
        let count = points.len();
        let closed = points[0] == points[count - 1];

        let lengths: Vec<f64> = (0..count)
            .map(|i| (points[(i + 1) % count] - points[i]).length())
            .collect();

        let mut normals: Vec<Vector> = points.windows(2).map(|w| normal(w[0], w[1])).collect();
        normals.push(normals[count - 2]);

        let mut angles = vec![1.0; count];
        for i in 1..count - 1 {
            angles[i] = -normals[i - 1].dot(normals[i]);
        }
        if closed {
            let wrap = -normals[0].dot(normals[count - 2]);
            angles[0] = wrap;
            angles[count - 1] = wrap;
        }

        let mut accumulated = Vec::with_capacity(count);
        let mut total = 0.0;
        accumulated.push(total);
        for length in &lengths[..count - 1] {
            total += length;
            accumulated.push(total);
        }

        Self {
            lengths,
            normals,
            angles,
            accumulated,
        }
    }
}

/// Why [`path_march`] reported a location.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarchStopReason {
    /// The requested distance was consumed inside an edge.
    CompleteStep,
    /// A step crossed a vertex whose turn exceeds the corner threshold.
    CornerPoint,
    /// The march ran off either end of the polyline.
    CompletePolyline,
}

/// One location reported by [`path_march`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarchLocation {
    pub reason: MarchStopReason,
    /// Edge the location lies on.
    pub index: usize,
    /// Distance from the start of the edge.
    pub before: f64,
    /// Distance to the end of the edge.
    pub after: f64,
    /// Requested distance not consumed yet; negative when marching backwards.
    pub remain: f64,
    /// `before / (before + after)`, clamped to `[0, 1]`.
    pub ratio: f64,
}

impl MarchLocation {
    pub fn new(
        reason: MarchStopReason,
        index: usize,
        before: f64,
        after: f64,
        remain: f64,
    ) -> Self {
        let ratio = ensure_range(safe_divide(before, before + after, 0.0), 0.0, 1.0);
        Self {
            reason,
            index,
            before,
            after,
            remain,
            ratio,
        }
    }

    pub fn point(&self, polyline: &PolylineData) -> Point {
        let points = polyline.points();
        points[self.index].lerp(points[self.index + 1], self.ratio)
    }

    pub fn normal(&self, polyline: &PolylineData, corner_radius: f64) -> Vector {
        polyline.smooth_normal(self.index, self.ratio, corner_radius)
    }

    /// Distance from the start of the polyline.
    pub fn arc_length(&self, polyline: &PolylineData) -> f64 {
        polyline.accumulated_lengths()[self.index] + self.before
    }
}

/// Walk `polyline` starting `start_distance` along it.
///
/// The callback is first invoked at the start location and returns the signed
/// distance to move next; it is invoked again wherever that move stops:
///
/// - [`MarchStopReason::CompleteStep`] when the distance is consumed within
///   an edge
/// - [`MarchStopReason::CornerPoint`] at a vertex turning by more than
///   `corner_threshold_degrees`, reported only for a move that began at a
///   completed step; `remain` holds the unconsumed distance
/// - [`MarchStopReason::CompletePolyline`] when the move runs off an end;
///   `remain` holds the overshoot
///
/// After `CompletePolyline` a closed polyline wraps around to the opposite end
/// and carries the overshoot with it, so arc length runs on around the loop;
/// the returned value only decides whether to go on. An open polyline stays
/// pinned at the end it ran off and moves by the returned value from there.
/// On a closed polyline the seam is reported as the start of edge 0, never as
/// the end of the last edge. Returning a non-finite value (typically
/// `f64::NAN`) from the callback ends the march.
pub fn path_march<F>(
    polyline: &PolylineData,
    start_distance: f64,
    corner_threshold_degrees: f64,
    mut callback: F,
) where
    F: FnMut(&MarchLocation) -> f64,
{
    let lengths = polyline.lengths();
    let angles = polyline.angles();
    let last_edge = polyline.count() - 2;
    let closed = polyline.is_closed();
    let corner_limit = -corner_threshold_degrees.to_radians().cos();
    let is_corner = |vertex: usize| greater_than(angles[vertex], corner_limit);

    let (mut index, mut before) = start_position(polyline, start_distance);
    let mut armed = false;

    trace!(start_distance, index, before, "path_march: start");

    loop {
        if !before.is_finite() {
            return;
        }
        let length = lengths[index];
        // On a closed polyline the far end is the start; it is reported once, as 0.
        let at_seam = closed
            && index == last_edge
            && !is_very_small(before)
            && greater_than_or_close(before, length);

        if !at_seam
            && (is_very_small(before) || (before > 0.0 && less_than_or_close(before, length)))
        {
            let location = MarchLocation::new(
                MarchStopReason::CompleteStep,
                index,
                before,
                length - before,
                0.0,
            );
            before += callback(&location);
            armed = true;
        } else if before > 0.0 {
            // Past the end of this edge.
            if index < last_edge {
                before -= length;
                index += 1;
                if armed && is_corner(index) {
                    let location = MarchLocation::new(
                        MarchStopReason::CornerPoint,
                        index,
                        0.0,
                        lengths[index],
                        before,
                    );
                    before = callback(&location);
                    armed = false;
                }
            } else {
                let location = MarchLocation::new(
                    MarchStopReason::CompletePolyline,
                    index,
                    length,
                    0.0,
                    before - length,
                );
                let step = callback(&location);
                if closed {
                    // Carry the overshoot across the seam.
                    if !step.is_finite() {
                        return;
                    }
                    index = 0;
                    before = location.remain.max(0.0);
                } else {
                    before = length + step;
                }
            }
        } else {
            // Before the start of this edge.
            if index > 0 {
                if armed && is_corner(index) {
                    let location = MarchLocation::new(
                        MarchStopReason::CornerPoint,
                        index,
                        0.0,
                        length,
                        before,
                    );
                    before = callback(&location);
                    armed = false;
                    if before < 0.0 && !is_very_small(before) {
                        index -= 1;
                        before += lengths[index];
                    }
                } else {
                    index -= 1;
                    before += lengths[index];
                }
            } else {
                let location =
                    MarchLocation::new(MarchStopReason::CompletePolyline, 0, 0.0, length, before);
                let step = callback(&location);
                if closed {
                    if !step.is_finite() {
                        return;
                    }
                    index = last_edge;
                    before += lengths[last_edge];
                } else {
                    before = step;
                }
            }
        }
    }
}

/// Edge and offset for a distance from the start. Distances outside the
/// polyline land before edge 0 or past the last edge.
fn start_position(polyline: &PolylineData, distance: f64) -> (usize, f64) {
    let accumulated = polyline.accumulated_lengths();
    let last_edge = polyline.count() - 2;
    if !(distance > 0.0) {
        return (0, distance);
    }
    let mut index = accumulated
        .partition_point(|&a| a <= distance)
        .saturating_sub(1)
        .min(last_edge);
    // A distance exactly on a vertex stays at the end of the previous edge.
    if index > 0 && are_close(distance, accumulated[index]) {
        index -= 1;
    }
    (index, distance - accumulated[index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    fn square(side: f64) -> PolylineData {
        PolylineData::new(vec![
            dvec2(0.0, 0.0),
            dvec2(side, 0.0),
            dvec2(side, side),
            dvec2(0.0, side),
            dvec2(0.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn needs_two_points() {
        assert_eq!(
            PolylineData::new(vec![Point::ZERO]).unwrap_err(),
            GeometryError::PolylineTooShort { found: 1 }
        );
        assert!(PolylineData::new(vec![Point::ZERO, Point::X]).is_ok());
    }

    #[test]
    fn derived_quantities_of_a_square() {
        let square = square(10.0);
        assert!(square.is_closed());
        assert_eq!(square.lengths(), &[10.0, 10.0, 10.0, 10.0, 0.0]);
        assert_eq!(square.accumulated_lengths(), &[0.0, 10.0, 20.0, 30.0, 40.0]);
        assert_eq!(square.total_length(), 40.0);
        assert_eq!(square.normals()[0], dvec2(0.0, 1.0));
        assert_eq!(square.normals()[4], square.normals()[3]);
        // Right-angle turns everywhere, including the wrap-around vertex.
        for angle in square.angles() {
            assert!(angle.abs() < 1e-12, "angle {angle}");
        }
    }

    #[test]
    fn open_polyline_ends_have_unit_angles() {
        let line =
            PolylineData::new(vec![dvec2(0.0, 0.0), dvec2(5.0, 0.0), dvec2(10.0, 0.0)]).unwrap();
        assert!(!line.is_closed());
        assert_eq!(line.angles(), &[1.0, -1.0, 1.0]);
        assert_eq!(line.difference(2), dvec2(-10.0, 0.0));
    }

    #[test]
    fn smooth_normal_blends_near_vertices() {
        let square = square(10.0);
        let n0 = square.normals()[0];
        let n1 = square.normals()[1];
        // Middle of an edge: raw normal.
        assert_eq!(square.smooth_normal(1, 0.5, 2.0), n1);
        // At the vertex: the average of both edges.
        let at_vertex = square.smooth_normal(1, 0.0, 2.0);
        assert!(at_vertex.abs_diff_eq(normalized(n0 + n1), 1e-12));
        let end_of_previous = square.smooth_normal(0, 1.0, 2.0);
        assert!(end_of_previous.abs_diff_eq(at_vertex, 1e-12));
        // No corner radius: raw normal.
        assert_eq!(square.smooth_normal(1, 0.0, 0.0), n1);
    }

    #[test]
    fn point_at_arc_length_interpolates_and_clamps() {
        let square = square(10.0);
        assert_eq!(square.point_at_arc_length(-5.0), dvec2(0.0, 0.0));
        assert_eq!(square.point_at_arc_length(15.0), dvec2(10.0, 5.0));
        assert_eq!(square.point_at_arc_length(20.0), dvec2(10.0, 10.0));
        assert_eq!(square.point_at_arc_length(100.0), dvec2(0.0, 0.0));
    }

    #[test]
    fn march_reports_complete_steps_along_an_open_line() {
        let line = PolylineData::new(vec![dvec2(0.0, 0.0), dvec2(25.0, 0.0)]).unwrap();
        let mut stops = Vec::new();
        path_march(&line, 0.0, 90.0, |location| {
            stops.push((location.reason, location.point(&line)));
            match location.reason {
                MarchStopReason::CompletePolyline => f64::NAN,
                _ => 10.0,
            }
        });
        assert_eq!(
            stops,
            vec![
                (MarchStopReason::CompleteStep, dvec2(0.0, 0.0)),
                (MarchStopReason::CompleteStep, dvec2(10.0, 0.0)),
                (MarchStopReason::CompleteStep, dvec2(20.0, 0.0)),
                (MarchStopReason::CompletePolyline, dvec2(25.0, 0.0)),
            ]
        );
    }

    #[test]
    fn march_stops_at_sharp_corners_only_after_a_step() {
        let square = square(10.0);
        let mut reasons = Vec::new();
        path_march(&square, 0.0, 45.0, |location| {
            reasons.push((location.reason, location.index));
            match location.reason {
                MarchStopReason::CompleteStep => 15.0,
                MarchStopReason::CornerPoint => location.remain,
                MarchStopReason::CompletePolyline => f64::NAN,
            }
        });
        use MarchStopReason::*;
        assert_eq!(
            reasons,
            vec![
                (CompleteStep, 0),
                (CornerPoint, 1),
                (CompleteStep, 1),
                (CornerPoint, 2),
                (CompleteStep, 2),
                (CornerPoint, 3),
                (CompletePolyline, 3),
            ]
        );
    }

    #[test]
    fn corner_remain_carries_the_rest_of_the_step() {
        let square = square(10.0);
        let mut arc_lengths = Vec::new();
        path_march(&square, 0.0, 45.0, |location| {
            if location.reason == MarchStopReason::CornerPoint {
                assert!((location.remain - 5.0).abs() < 1e-12);
                return location.remain;
            }
            arc_lengths.push(location.arc_length(&square));
            if arc_lengths.len() == 2 { f64::NAN } else { 15.0 }
        });
        assert_eq!(arc_lengths, vec![0.0, 15.0]);
    }

    #[test]
    fn open_polyline_stays_pinned_after_completion() {
        let line = PolylineData::new(vec![dvec2(0.0, 0.0), dvec2(10.0, 0.0)]).unwrap();
        let mut stops = Vec::new();
        let mut calls = 0;
        path_march(&line, 8.0, 90.0, |location| {
            calls += 1;
            stops.push((location.reason, location.arc_length(&line)));
            match calls {
                1 => 5.0,
                2 => -4.0,
                _ => f64::NAN,
            }
        });
        assert_eq!(stops[0], (MarchStopReason::CompleteStep, 8.0));
        assert_eq!(stops[1].0, MarchStopReason::CompletePolyline);
        assert_eq!(stops[1].1, 10.0);
        assert_eq!(stops[2].0, MarchStopReason::CompleteStep);
        assert!((stops[2].1 - 6.0).abs() < 1e-12);
    }

    #[test]
    fn marching_backwards_wraps_on_closed_polylines() {
        let square = square(10.0);
        let mut stops = Vec::new();
        path_march(&square, 5.0, 180.0, |location| {
            stops.push((location.reason, location.index, location.before));
            if stops.len() >= 3 { f64::NAN } else { -10.0 }
        });
        assert_eq!(stops[0], (MarchStopReason::CompleteStep, 0, 5.0));
        assert_eq!(stops[1].0, MarchStopReason::CompletePolyline);
        assert_eq!(stops[1].1, 0);
        assert!((stops[1].2 - 0.0).abs() < 1e-12);
        // The 5 left over at the start carries on from the far end: 35 along.
        assert_eq!(stops[2].0, MarchStopReason::CompleteStep);
        assert_eq!(stops[2].1, 3);
        assert!((stops[2].2 - 5.0).abs() < 1e-12);
        assert!((square.accumulated_lengths()[3] + stops[2].2 - 35.0).abs() < 1e-12);
    }

    #[test]
    fn seam_is_reported_once_as_the_start() {
        let square = square(10.0);
        let mut stops = Vec::new();
        path_march(&square, 0.0, 180.0, |location| {
            stops.push((location.reason, location.index, location.before));
            if stops.len() >= 6 { f64::NAN } else { 10.0 }
        });
        use MarchStopReason::*;
        // Arriving exactly at the far end wraps instead of stepping there.
        assert_eq!(stops[4], (CompletePolyline, 3, 10.0));
        assert_eq!(stops[5], (CompleteStep, 0, 0.0));
        let steps = stops.iter().filter(|s| s.0 == CompleteStep).count();
        assert_eq!(steps, 5);
    }

    #[test]
    fn ratio_is_clamped() {
        let location = MarchLocation::new(MarchStopReason::CompleteStep, 0, 12.0, -2.0, 0.0);
        assert_eq!(location.ratio, 1.0);
        let location = MarchLocation::new(MarchStopReason::CompleteStep, 0, 0.0, 0.0, 0.0);
        assert_eq!(location.ratio, 0.0);
    }
}
