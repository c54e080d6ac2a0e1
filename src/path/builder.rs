//! Fluent construction of [`PathModel`]s.
//!
//! The builder is a small state machine over the subpath under construction:
//!
//! - `move_to` finishes the current subpath and opens a new one
//! - drawing commands append to the open subpath, opening one at the current
//!   point if there is none
//! - `close` marks the open subpath closed and finishes it; the current point
//!   returns to its start, as in SVG path data

use crate::types::{Point, Size};

use super::{FillRule, PathModel, Segment, SegmentKind, Subpath, SweepDirection};

/// Builder for [`PathModel`].
///
/// ```
/// use glam::dvec2;
/// use vecpath::path::PathBuilder;
///
/// let path = PathBuilder::new()
///     .move_to(dvec2(0.0, 0.0))
///     .line_to(dvec2(10.0, 0.0))
///     .quad_to(dvec2(15.0, 5.0), dvec2(10.0, 10.0))
///     .close()
///     .build();
/// assert_eq!(path.subpaths.len(), 1);
/// assert!(path.subpaths[0].is_closed);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    fill_rule: FillRule,
    finished: Vec<Subpath>,
    /// Subpath under construction
    open: Option<Subpath>,
    /// Where the next drawing command starts
    current: Point,
    /// Stroke flag applied to subsequently added segments
    stroked: bool,
    /// Fill flag applied to subsequently opened subpaths
    filled: bool,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self {
            fill_rule: FillRule::default(),
            finished: Vec::new(),
            open: None,
            current: Point::ZERO,
            stroked: true,
            filled: true,
        }
    }

    pub fn fill_rule(mut self, fill_rule: FillRule) -> Self {
        self.fill_rule = fill_rule;
        self
    }

    /// Whether segments added from now on are stroked.
    pub fn stroked(mut self, stroked: bool) -> Self {
        self.stroked = stroked;
        self
    }

    /// Whether subpaths opened from now on are filled. Also applies to the
    /// open subpath, if any.
    pub fn filled(mut self, filled: bool) -> Self {
        self.filled = filled;
        if let Some(open) = self.open.as_mut() {
            open.is_filled = filled;
        }
        self
    }

    pub fn move_to(mut self, point: Point) -> Self {
        self.finish();
        self.open = Some(Subpath::new(point).filled(self.filled));
        self.current = point;
        self
    }

    pub fn line_to(self, point: Point) -> Self {
        self.push(SegmentKind::Line { point })
    }

    pub fn quad_to(self, p1: Point, p2: Point) -> Self {
        self.push(SegmentKind::QuadraticBezier { p1, p2 })
    }

    pub fn cubic_to(self, p1: Point, p2: Point, p3: Point) -> Self {
        self.push(SegmentKind::CubicBezier { p1, p2, p3 })
    }

    pub fn arc_to(
        self,
        radius: Size,
        rotation_angle: f64,
        is_large_arc: bool,
        sweep: SweepDirection,
        point: Point,
    ) -> Self {
        self.push(
            Segment::arc(point, radius, rotation_angle, is_large_arc, sweep).kind,
        )
    }

    /// Append a poly-line. An empty slice is ignored.
    pub fn poly_line_to(self, points: &[Point]) -> Self {
        if points.is_empty() {
            return self;
        }
        self.push(SegmentKind::PolyLine {
            points: points.to_vec(),
        })
    }

    pub fn close(mut self) -> Self {
        if let Some(mut open) = self.open.take() {
            open.is_closed = true;
            self.current = open.start_point;
            self.finished.push(open);
        }
        self
    }

    /// The point the next drawing command starts from.
    pub fn current_point(&self) -> Point {
        self.current
    }

    pub fn build(mut self) -> PathModel {
        self.finish();
        PathModel {
            fill_rule: self.fill_rule,
            subpaths: self.finished,
        }
    }

    fn push(mut self, kind: SegmentKind) -> Self {
        let segment = Segment::new(kind).with_stroke(self.stroked);
        if let Some(end) = segment.last_point() {
            self.current = end;
        }
        let start = self.current_start();
        self.open
            .get_or_insert_with(|| Subpath::new(start).filled(self.filled))
            .segments
            .push(segment);
        self
    }

    /// Start point for an implicitly opened subpath.
    fn current_start(&self) -> Point {
        match (&self.open, self.finished.last()) {
            (Some(open), _) => open.start_point,
            (None, Some(last)) if last.is_closed => last.start_point,
            (None, Some(last)) => last.end_point(),
            (None, None) => Point::ZERO,
        }
    }

    /// Move the open subpath, if any, to the finished list.
    fn finish(&mut self) {
        if let Some(open) = self.open.take() {
            self.finished.push(open);
        }
    }
}
