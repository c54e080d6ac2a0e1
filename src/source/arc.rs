//! Arc, pie, ring and ellipse geometry from angle and thickness parameters.
//!
//! An arc shape is described by a start and end angle (degrees, clockwise
//! from twelve o'clock) and a thickness. Depending on those the source
//! produces one of:
//!
//! - a line, when the sweep is zero
//! - a full ellipse or an even-odd ring, when the sweep is a full turn
//! - a pie slice, when the thickness reaches the centre
//! - an open arc, when the thickness is zero
//! - a ring arc otherwise

use crate::log::debug;
use crate::math::{
    are_close, arc_point_in, ensure_range, is_very_small, normalized, safe_divide, stretch_bounds,
};
use crate::path::{FillRule, PathModel, Segment, SweepDirection, Subpath};
use crate::source::inner_curve::{
    compute_angle_ranges, compute_inner_curves, inner_curve_self_intersect,
};
use crate::source::{GeometrySourceState, ShapeGeometrySource, ShapeParameters, Stretch};
use crate::types::{Point, Rect, Size};
use glam::dvec2;

/// How [`ArcParameters::thickness`] is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum UnitType {
    /// Absolute distance in the same units as the bounds.
    #[default]
    Pixel,
    /// Fraction of the smaller radius, `0..=1`.
    Percent,
}

/// Inputs of an [`ArcGeometrySource`].
#[derive(Clone, Debug, PartialEq)]
pub struct ArcParameters {
    pub start_angle: f64,
    pub end_angle: f64,
    pub thickness: f64,
    pub thickness_unit: UnitType,
    pub stroke: bool,
    pub stroke_thickness: f64,
    pub stretch: Stretch,
}

impl Default for ArcParameters {
    fn default() -> Self {
        Self {
            start_angle: 0.0,
            end_angle: 360.0,
            thickness: 0.0,
            thickness_unit: UnitType::Pixel,
            stroke: false,
            stroke_thickness: 0.0,
            stretch: Stretch::Fill,
        }
    }
}

impl ArcParameters {
    pub fn new(start_angle: f64, end_angle: f64) -> Self {
        Self {
            start_angle,
            end_angle,
            ..Self::default()
        }
    }

    pub fn with_thickness(mut self, thickness: f64, unit: UnitType) -> Self {
        self.thickness = thickness;
        self.thickness_unit = unit;
        self
    }

    /// Paint a stroke of the given thickness.
    pub fn with_stroke(mut self, thickness: f64) -> Self {
        self.stroke = true;
        self.stroke_thickness = thickness;
        self
    }

    pub fn with_stretch(mut self, stretch: Stretch) -> Self {
        self.stretch = stretch;
        self
    }
}

impl ShapeParameters for ArcParameters {
    fn stroke_thickness(&self) -> f64 {
        self.stroke_thickness
    }

    fn has_stroke(&self) -> bool {
        self.stroke
    }

    fn stretch(&self) -> Stretch {
        self.stretch
    }
}

/// Geometry source for arc shapes.
#[derive(Clone, Debug, Default)]
pub struct ArcGeometrySource {
    state: GeometrySourceState,
    relative_thickness: f64,
    absolute_thickness: f64,
}

impl ArcGeometrySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Thickness as a fraction of the smaller radius, as of the last update.
    pub fn relative_thickness(&self) -> f64 {
        self.relative_thickness
    }

    /// Thickness in bounds units, as of the last update.
    pub fn absolute_thickness(&self) -> f64 {
        self.absolute_thickness
    }

    fn normalize_thickness(&mut self, params: &ArcParameters) {
        let bounds = self.state.logical_bounds();
        let min_radius = (bounds.width / 2.0).min(bounds.height / 2.0);
        let relative = match params.thickness_unit {
            UnitType::Pixel => safe_divide(params.thickness, min_radius, 0.0),
            UnitType::Percent => params.thickness,
        };
        self.relative_thickness = ensure_range(relative, 0.0, 1.0);
        self.absolute_thickness = min_radius * self.relative_thickness;
    }

    fn build(&self, params: &ArcParameters) -> PathModel {
        let bounds = self.state.logical_bounds();
        let relative_mode = params.thickness_unit == UnitType::Percent;
        let filled = self.relative_thickness == 1.0;
        let stroked = self.relative_thickness == 0.0;

        if are_close(params.start_angle, params.end_angle) {
            let angle = normalize_angle(params.start_angle);
            debug!(angle, "arc: zero sweep");
            return self.zero_angle_geometry(bounds, relative_mode, angle);
        }

        let start = normalize_angle(params.start_angle);
        let mut end = normalize_angle(params.end_angle);
        if end < start {
            end += 360.0;
        }

        if is_very_small((end - start) % 360.0) {
            if filled || stroked {
                debug!(filled, "arc: full ellipse");
                return PathModel::from_subpaths(vec![Subpath::ellipse(
                    bounds,
                    SweepDirection::Clockwise,
                    filled,
                )]);
            }
            debug!(relative = self.relative_thickness, "arc: full ring");
            return self.full_ring_geometry(bounds, relative_mode);
        }

        if filled {
            debug!(start, end, "arc: pie");
            return pie_geometry(bounds, start, end);
        }
        if stroked {
            debug!(start, end, "arc: open");
            return open_arc_geometry(bounds, start, end);
        }
        debug!(start, end, relative = self.relative_thickness, "arc: ring");
        self.ring_arc_geometry(bounds, relative_mode, start, end)
    }

    fn uses_scaled_inner_ellipse(&self, bounds: Rect, relative_mode: bool) -> bool {
        relative_mode || are_close(bounds.width, bounds.height)
    }

    fn zero_angle_geometry(&self, bounds: Rect, relative_mode: bool, angle: f64) -> PathModel {
        let outer = arc_point_in(angle, bounds);
        let inner = if self.uses_scaled_inner_ellipse(bounds, relative_mode) {
            arc_point_in(angle, bounds.resize(1.0 - self.relative_thickness))
        } else {
            let (rx, ry) = (bounds.width / 2.0, bounds.height / 2.0);
            let intersect = inner_curve_self_intersect(rx, ry, self.absolute_thickness);
            let ranges = compute_angle_ranges(rx, ry, intersect, angle, angle);
            let at = ranges.first().map_or(angle, |range| range.0);
            let (sin, cos) = at.to_radians().sin_cos();
            let outward = normalized(dvec2(ry * sin, -rx * cos));
            arc_point_in(at, bounds) - outward * self.absolute_thickness
        };
        let line = Subpath::new(outer)
            .with_segment(Segment::line(inner))
            .closed(false)
            .filled(false);
        PathModel::from_subpaths(vec![line])
    }

    fn full_ring_geometry(&self, bounds: Rect, relative_mode: bool) -> PathModel {
        let outer = Subpath::ellipse(bounds, SweepDirection::Clockwise, true);
        let inner = if self.uses_scaled_inner_ellipse(bounds, relative_mode) {
            Subpath::ellipse(
                bounds.resize(1.0 - self.relative_thickness),
                SweepDirection::Clockwise,
                true,
            )
        } else {
            let (rx, ry) = (bounds.width / 2.0, bounds.height / 2.0);
            let intersect = inner_curve_self_intersect(rx, ry, self.absolute_thickness);
            let ranges = compute_angle_ranges(rx, ry, intersect, 360.0, 0.0);
            poly_cubic_subpath(compute_inner_curves(&ranges, bounds, self.absolute_thickness))
        };
        PathModel::from_subpaths(vec![outer, inner]).with_fill_rule(FillRule::EvenOdd)
    }

    fn ring_arc_geometry(
        &self,
        bounds: Rect,
        relative_mode: bool,
        start: f64,
        end: f64,
    ) -> PathModel {
        let is_large_arc = end - start > 180.0;
        let mut ring = Subpath::new(arc_point_in(start, bounds)).with_segment(Segment::arc(
            arc_point_in(end, bounds),
            radius_of(bounds),
            0.0,
            is_large_arc,
            SweepDirection::Clockwise,
        ));

        if self.uses_scaled_inner_ellipse(bounds, relative_mode) {
            let inner = bounds.resize(1.0 - self.relative_thickness);
            ring = ring
                .with_segment(Segment::line(arc_point_in(end, inner)))
                .with_segment(Segment::arc(
                    arc_point_in(start, inner),
                    radius_of(inner),
                    0.0,
                    is_large_arc,
                    SweepDirection::Counterclockwise,
                ));
        } else {
            let (rx, ry) = (bounds.width / 2.0, bounds.height / 2.0);
            let intersect = inner_curve_self_intersect(rx, ry, self.absolute_thickness);
            let ranges = compute_angle_ranges(rx, ry, intersect, end, start);
            let mut points = compute_inner_curves(&ranges, bounds, self.absolute_thickness);
            if !points.is_empty() {
                let rest = points.split_off(1);
                ring = ring.with_segment(Segment::line(points[0]));
                if let Ok(curves) = Segment::poly_cubic(rest) {
                    ring = ring.with_segment(curves);
                }
            }
        }

        PathModel::from_subpaths(vec![ring.closed(true).filled(true)])
    }
}

impl ShapeGeometrySource for ArcGeometrySource {
    type Params = ArcParameters;

    fn state(&self) -> &GeometrySourceState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut GeometrySourceState {
        &mut self.state
    }

    /// Stroke-deflated layout bounds, stretched to a square aspect unless the
    /// stretch mode fills the layout.
    fn compute_logical_bounds(&self, layout_bounds: Rect, params: &ArcParameters) -> Rect {
        let half = params.half_stroke_thickness();
        stretch_bounds(
            layout_bounds.inflate(-half, -half),
            params.stretch,
            dvec2(1.0, 1.0),
        )
    }

    fn update_cached_geometry(&mut self, params: &ArcParameters) -> bool {
        self.normalize_thickness(params);
        let geometry = self.build(params);
        self.state.set_cached_geometry(geometry)
    }
}

/// Map an angle into `[0, 360]`; values already in range are kept, so a
/// full turn stays `360`.
fn normalize_angle(degrees: f64) -> f64 {
    if (0.0..=360.0).contains(&degrees) {
        return degrees;
    }
    let wrapped = degrees % 360.0;
    if wrapped < 0.0 { wrapped + 360.0 } else { wrapped }
}

fn radius_of(bounds: Rect) -> Size {
    Size::new(bounds.width / 2.0, bounds.height / 2.0)
}

fn pie_geometry(bounds: Rect, start: f64, end: f64) -> PathModel {
    let pie = Subpath::new(arc_point_in(start, bounds))
        .with_segment(Segment::arc(
            arc_point_in(end, bounds),
            radius_of(bounds),
            0.0,
            end - start > 180.0,
            SweepDirection::Clockwise,
        ))
        .with_segment(Segment::line(bounds.center()))
        .closed(true)
        .filled(true);
    PathModel::from_subpaths(vec![pie])
}

fn open_arc_geometry(bounds: Rect, start: f64, end: f64) -> PathModel {
    let arc = Subpath::new(arc_point_in(start, bounds))
        .with_segment(Segment::arc(
            arc_point_in(end, bounds),
            radius_of(bounds),
            0.0,
            end - start > 180.0,
            SweepDirection::Clockwise,
        ))
        .closed(false)
        .filled(false);
    PathModel::from_subpaths(vec![arc])
}

/// A closed, filled subpath from a start point followed by Bezier triplets.
fn poly_cubic_subpath(mut points: Vec<Point>) -> Subpath {
    if points.is_empty() {
        return Subpath::new(Point::ZERO).closed(true);
    }
    let rest = points.split_off(1);
    let mut subpath = Subpath::new(points[0]);
    if let Ok(curves) = Segment::poly_cubic(rest) {
        subpath = subpath.with_segment(curves);
    }
    subpath.closed(true).filled(true)
}
