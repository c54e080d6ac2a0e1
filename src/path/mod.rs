//! The path data model.
//!
//! A [`PathModel`] is a fill rule plus an ordered list of [`Subpath`]s. Each
//! subpath starts at an explicit point and chains typed [`Segment`]s, every
//! segment implicitly starting where the previous one ended.

mod builder;
mod simple;

pub use builder::PathBuilder;
pub use simple::SimpleSegment;

use crate::errors::{GeometryError, Result};
use crate::flatten::arc::{BezierArc, arc_segment_to_bezier};
use crate::flatten::elevate_quadratic;
use crate::types::{Point, Rect, Size};

/// How overlapping subpaths decide what is inside.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FillRule {
    EvenOdd,
    #[default]
    NonZero,
}

/// Direction an elliptical arc is drawn in, on a y-down surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SweepDirection {
    #[default]
    Clockwise,
    Counterclockwise,
}

/// SVG-style elliptical arc to `point`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcSegment {
    pub point: Point,
    /// Radii along the ellipse's own x and y axes.
    pub size: Size,
    /// Rotation of the ellipse's x axis, in degrees.
    pub rotation_angle: f64,
    pub is_large_arc: bool,
    pub sweep: SweepDirection,
}

/// The drawing primitive of a segment.
#[derive(Clone, Debug, PartialEq)]
pub enum SegmentKind {
    Line { point: Point },
    QuadraticBezier { p1: Point, p2: Point },
    CubicBezier { p1: Point, p2: Point, p3: Point },
    Arc(ArcSegment),
    PolyLine { points: Vec<Point> },
    /// Control point triplets; the count must be a multiple of 3.
    PolyCubicBezier { points: Vec<Point> },
    /// Control point pairs; the count must be a multiple of 2.
    PolyQuadraticBezier { points: Vec<Point> },
}

impl SegmentKind {
    pub fn name(&self) -> &'static str {
        match self {
            SegmentKind::Line { .. } => "line",
            SegmentKind::QuadraticBezier { .. } => "quadratic",
            SegmentKind::CubicBezier { .. } => "cubic",
            SegmentKind::Arc(_) => "arc",
            SegmentKind::PolyLine { .. } => "poly-line",
            SegmentKind::PolyCubicBezier { .. } => "poly-cubic",
            SegmentKind::PolyQuadraticBezier { .. } => "poly-quadratic",
        }
    }
}

/// One segment of a subpath.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Whether the segment contributes to the stroke.
    pub is_stroked: bool,
}

impl Segment {
    pub fn new(kind: SegmentKind) -> Self {
        Segment {
            kind,
            is_stroked: true,
        }
    }

    pub fn line(point: Point) -> Self {
        Segment::new(SegmentKind::Line { point })
    }

    pub fn quadratic(p1: Point, p2: Point) -> Self {
        Segment::new(SegmentKind::QuadraticBezier { p1, p2 })
    }

    pub fn cubic(p1: Point, p2: Point, p3: Point) -> Self {
        Segment::new(SegmentKind::CubicBezier { p1, p2, p3 })
    }

    pub fn arc(
        point: Point,
        size: Size,
        rotation_angle: f64,
        is_large_arc: bool,
        sweep: SweepDirection,
    ) -> Self {
        Segment::new(SegmentKind::Arc(ArcSegment {
            point,
            size,
            rotation_angle,
            is_large_arc,
            sweep,
        }))
    }

    pub fn poly_line(points: Vec<Point>) -> Self {
        Segment::new(SegmentKind::PolyLine { points })
    }

    pub fn poly_cubic(points: Vec<Point>) -> Result<Self> {
        let segment = Segment::new(SegmentKind::PolyCubicBezier { points });
        segment.validate()?;
        Ok(segment)
    }

    pub fn poly_quadratic(points: Vec<Point>) -> Result<Self> {
        let segment = Segment::new(SegmentKind::PolyQuadraticBezier { points });
        segment.validate()?;
        Ok(segment)
    }

    pub fn with_stroke(mut self, is_stroked: bool) -> Self {
        self.is_stroked = is_stroked;
        self
    }

    /// The segment's own end point; `None` for an empty poly segment.
    pub fn last_point(&self) -> Option<Point> {
        match &self.kind {
            SegmentKind::Line { point } => Some(*point),
            SegmentKind::QuadraticBezier { p2, .. } => Some(*p2),
            SegmentKind::CubicBezier { p3, .. } => Some(*p3),
            SegmentKind::Arc(arc) => Some(arc.point),
            SegmentKind::PolyLine { points }
            | SegmentKind::PolyCubicBezier { points }
            | SegmentKind::PolyQuadraticBezier { points } => points.last().copied(),
        }
    }

    /// Number of points stored in the segment.
    pub fn point_count(&self) -> usize {
        match &self.kind {
            SegmentKind::Line { .. } | SegmentKind::Arc(_) => 1,
            SegmentKind::QuadraticBezier { .. } => 2,
            SegmentKind::CubicBezier { .. } => 3,
            SegmentKind::PolyLine { points }
            | SegmentKind::PolyCubicBezier { points }
            | SegmentKind::PolyQuadraticBezier { points } => points.len(),
        }
    }

    /// Poly-Bezier segments must hold whole control point groups.
    pub fn validate(&self) -> Result<()> {
        let (points, multiple) = match &self.kind {
            SegmentKind::PolyCubicBezier { points } => (points, 3),
            SegmentKind::PolyQuadraticBezier { points } => (points, 2),
            _ => return Ok(()),
        };
        if points.len() % multiple != 0 {
            return Err(GeometryError::PolyPointCount {
                kind: self.kind.name(),
                count: points.len(),
                multiple,
            });
        }
        Ok(())
    }

    /// Decompose into lines and cubics, starting from `start`.
    ///
    /// Quadratics are degree-elevated and arcs converted to cubics. A
    /// degenerate arc becomes a line, or nothing when its end equals `start`.
    /// A trailing partial control point group in a poly-Bezier is ignored;
    /// [`Segment::validate`] reports it.
    pub fn simple_segments(&self, start: Point) -> Vec<SimpleSegment> {
        let mut out = Vec::new();
        self.push_simple_segments(start, &mut out);
        out
    }

    pub(crate) fn push_simple_segments(&self, start: Point, out: &mut Vec<SimpleSegment>) {
        match &self.kind {
            SegmentKind::Line { point } => out.push(SimpleSegment::line(start, *point)),
            SegmentKind::QuadraticBezier { p1, p2 } => {
                out.push(SimpleSegment::cubic(elevate_quadratic(&[start, *p1, *p2])));
            }
            SegmentKind::CubicBezier { p1, p2, p3 } => {
                out.push(SimpleSegment::cubic([start, *p1, *p2, *p3]));
            }
            SegmentKind::Arc(arc) => match arc_segment_to_bezier(start, arc) {
                BezierArc::Omit => {}
                BezierArc::Line => out.push(SimpleSegment::line(start, arc.point)),
                BezierArc::Curves(curves) => {
                    let mut from = start;
                    for [p1, p2, p3] in curves {
                        out.push(SimpleSegment::cubic([from, p1, p2, p3]));
                        from = p3;
                    }
                }
            },
            SegmentKind::PolyLine { points } => {
                let mut from = start;
                for &p in points {
                    out.push(SimpleSegment::line(from, p));
                    from = p;
                }
            }
            SegmentKind::PolyCubicBezier { points } => {
                let mut from = start;
                for chunk in points.chunks_exact(3) {
                    out.push(SimpleSegment::cubic([from, chunk[0], chunk[1], chunk[2]]));
                    from = chunk[2];
                }
            }
            SegmentKind::PolyQuadraticBezier { points } => {
                let mut from = start;
                for chunk in points.chunks_exact(2) {
                    out.push(SimpleSegment::cubic(elevate_quadratic(&[
                        from, chunk[0], chunk[1],
                    ])));
                    from = chunk[1];
                }
            }
        }
    }
}

/// One contour of a path (a "figure").
#[derive(Clone, Debug, PartialEq)]
pub struct Subpath {
    pub start_point: Point,
    pub segments: Vec<Segment>,
    pub is_closed: bool,
    pub is_filled: bool,
}

impl Subpath {
    pub fn new(start_point: Point) -> Self {
        Subpath {
            start_point,
            segments: Vec::new(),
            is_closed: false,
            is_filled: true,
        }
    }

    /// A single poly-line subpath through `points`.
    ///
    /// The first point becomes the start point. An empty slice yields an empty
    /// subpath at the origin.
    pub fn polyline(points: &[Point], is_closed: bool, is_filled: bool) -> Self {
        let (start_point, segments) = match points.split_first() {
            Some((first, [])) => (*first, Vec::new()),
            Some((first, rest)) => (*first, vec![Segment::poly_line(rest.to_vec())]),
            None => (Point::ZERO, Vec::new()),
        };
        Subpath {
            start_point,
            segments,
            is_closed,
            is_filled,
        }
    }

    /// A closed ellipse inscribed in `bounds`, as two half arcs starting at the
    /// left centre.
    pub fn ellipse(bounds: Rect, sweep: SweepDirection, is_filled: bool) -> Self {
        let center = bounds.center();
        let left = Point::new(bounds.left(), center.y);
        let right = Point::new(bounds.right(), center.y);
        let radius = Size::new(bounds.width / 2.0, bounds.height / 2.0);
        Subpath {
            start_point: left,
            segments: vec![
                Segment::arc(right, radius, 0.0, false, sweep),
                Segment::arc(left, radius, 0.0, false, sweep),
            ],
            is_closed: true,
            is_filled,
        }
    }

    pub fn with_segment(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn closed(mut self, is_closed: bool) -> Self {
        self.is_closed = is_closed;
        self
    }

    pub fn filled(mut self, is_filled: bool) -> Self {
        self.is_filled = is_filled;
        self
    }

    /// Where the last segment ends (the start point if there are none).
    pub fn end_point(&self) -> Point {
        self.segments
            .iter()
            .fold(self.start_point, |current, s| s.last_point().unwrap_or(current))
    }

    pub fn validate(&self) -> Result<()> {
        self.segments.iter().try_for_each(Segment::validate)
    }

    /// The chain as lines and cubics, including the implicit closing line of a
    /// closed subpath whose end differs from its start.
    pub fn simple_segments(&self) -> Vec<SimpleSegment> {
        let mut out = Vec::new();
        let mut current = self.start_point;
        for segment in &self.segments {
            segment.push_simple_segments(current, &mut out);
            current = segment.last_point().unwrap_or(current);
        }
        if self.is_closed && current != self.start_point {
            out.push(SimpleSegment::line(current, self.start_point));
        }
        out
    }

    /// Flatten into one polyline starting at the start point.
    pub fn flatten(&self, tolerance: f64) -> Vec<Point> {
        let mut points = vec![self.start_point];
        for segment in self.simple_segments() {
            segment.flatten_into(tolerance, &mut points);
        }
        points
    }

    fn check_topology(&self, other: &Subpath, index: usize) -> Result<()> {
        if self.segments.len() != other.segments.len() {
            return Err(GeometryError::topology(format!(
                "subpath {index} has {} segments vs {}",
                self.segments.len(),
                other.segments.len()
            )));
        }
        for (i, (a, b)) in self.segments.iter().zip(&other.segments).enumerate() {
            if std::mem::discriminant(&a.kind) != std::mem::discriminant(&b.kind) {
                return Err(GeometryError::topology(format!(
                    "subpath {index} segment {i} is {} vs {}",
                    a.kind.name(),
                    b.kind.name()
                )));
            }
            if a.point_count() != b.point_count() {
                return Err(GeometryError::topology(format!(
                    "subpath {index} segment {i} has {} points vs {}",
                    a.point_count(),
                    b.point_count()
                )));
            }
        }
        Ok(())
    }
}

/// A complete path: fill rule plus subpaths.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct PathModel {
    pub fill_rule: FillRule,
    pub subpaths: Vec<Subpath>,
}

impl PathModel {
    pub fn new() -> Self {
        PathModel::default()
    }

    pub fn from_subpaths(subpaths: Vec<Subpath>) -> Self {
        PathModel {
            fill_rule: FillRule::default(),
            subpaths,
        }
    }

    pub fn with_fill_rule(mut self, fill_rule: FillRule) -> Self {
        self.fill_rule = fill_rule;
        self
    }

    pub fn push(&mut self, subpath: Subpath) {
        self.subpaths.push(subpath);
    }

    pub fn is_empty(&self) -> bool {
        self.subpaths.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        self.subpaths.iter().try_for_each(Subpath::validate)
    }

    /// One polyline per subpath.
    pub fn flatten(&self, tolerance: f64) -> Vec<Vec<Point>> {
        self.subpaths.iter().map(|s| s.flatten(tolerance)).collect()
    }

    /// Bounds of the flattened path, or `None` for an empty path.
    pub fn bounds(&self, tolerance: f64) -> Option<Rect> {
        Rect::from_points(self.flatten(tolerance).into_iter().flatten())
    }

    /// Check that `other` can be combined with `self` point by point: same
    /// subpath count, and per subpath the same segment kinds and point counts.
    pub fn same_topology(&self, other: &PathModel) -> Result<()> {
        if self.subpaths.len() != other.subpaths.len() {
            return Err(GeometryError::topology(format!(
                "{} subpaths vs {}",
                self.subpaths.len(),
                other.subpaths.len()
            )));
        }
        self.subpaths
            .iter()
            .zip(&other.subpaths)
            .enumerate()
            .try_for_each(|(i, (a, b))| a.check_topology(b, i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    #[test]
    fn end_point_follows_the_chain() {
        let subpath = Subpath::new(dvec2(0.0, 0.0))
            .with_segment(Segment::line(dvec2(10.0, 0.0)))
            .with_segment(Segment::poly_line(vec![dvec2(10.0, 5.0), dvec2(0.0, 5.0)]))
            .with_segment(Segment::poly_line(Vec::new()));
        assert_eq!(subpath.end_point(), dvec2(0.0, 5.0));
        assert_eq!(Subpath::new(dvec2(3.0, 4.0)).end_point(), dvec2(3.0, 4.0));
    }

    #[test]
    fn closed_subpaths_get_an_implicit_closing_line() {
        let open = Subpath::new(dvec2(0.0, 0.0))
            .with_segment(Segment::line(dvec2(10.0, 0.0)))
            .with_segment(Segment::line(dvec2(10.0, 10.0)));
        assert_eq!(open.simple_segments().len(), 2);

        let closed = open.clone().closed(true);
        let segments = closed.simple_segments();
        assert_eq!(segments.len(), 3);
        assert_eq!(
            segments[2],
            SimpleSegment::line(dvec2(10.0, 10.0), dvec2(0.0, 0.0))
        );

        let already_home = closed.with_segment(Segment::line(dvec2(0.0, 0.0)));
        assert_eq!(already_home.simple_segments().len(), 3);
    }

    #[test]
    fn poly_segments_decompose_per_group() {
        let start = dvec2(0.0, 0.0);
        let cubic = Segment::poly_cubic(vec![
            dvec2(1.0, 1.0),
            dvec2(2.0, 1.0),
            dvec2(3.0, 0.0),
            dvec2(4.0, -1.0),
            dvec2(5.0, -1.0),
            dvec2(6.0, 0.0),
        ])
        .unwrap();
        let simple = cubic.simple_segments(start);
        assert_eq!(simple.len(), 2);
        assert_eq!(simple[1].first_point(), dvec2(3.0, 0.0));
        assert_eq!(simple[1].last_point(), dvec2(6.0, 0.0));

        let quad = Segment::poly_quadratic(vec![dvec2(1.0, 1.0), dvec2(2.0, 0.0)]).unwrap();
        match quad.simple_segments(start).as_slice() {
            [SimpleSegment::CubicBezier { points }] => {
                assert_eq!(points[0], start);
                assert_eq!(points[3], dvec2(2.0, 0.0));
            }
            other => panic!("expected one cubic, got {other:?}"),
        }
    }

    #[test]
    fn poly_point_counts_are_validated() {
        let err = Segment::poly_cubic(vec![dvec2(1.0, 1.0); 4]).unwrap_err();
        assert_eq!(
            err,
            GeometryError::PolyPointCount {
                kind: "poly-cubic",
                count: 4,
                multiple: 3
            }
        );
        assert!(Segment::poly_quadratic(vec![dvec2(1.0, 1.0); 3]).is_err());

        let path = PathModel::from_subpaths(vec![Subpath::new(Point::ZERO).with_segment(
            Segment::new(SegmentKind::PolyQuadraticBezier {
                points: vec![Point::ZERO],
            }),
        )]);
        assert!(path.validate().is_err());
    }

    #[test]
    fn degenerate_arcs_decompose_to_a_line_or_nothing() {
        let start = dvec2(0.0, 0.0);
        let cw = SweepDirection::Clockwise;
        let zero_radius = Segment::arc(dvec2(10.0, 0.0), Size::ZERO, 0.0, false, cw);
        assert_eq!(
            zero_radius.simple_segments(start),
            vec![SimpleSegment::line(start, dvec2(10.0, 0.0))]
        );

        let back_home = Segment::arc(start, Size::new(5.0, 5.0), 0.0, true, cw);
        assert!(back_home.simple_segments(start).is_empty());
    }

    #[test]
    fn ellipse_bounds_match_the_rect() {
        let rect = Rect::new(0.0, 0.0, 100.0, 60.0);
        let path =
            PathModel::from_subpaths(vec![Subpath::ellipse(rect, SweepDirection::Clockwise, true)]);
        let bounds = path.bounds(0.01).unwrap();
        assert!((bounds.left() - 0.0).abs() < 1e-9);
        assert!((bounds.right() - 100.0).abs() < 1e-9);
        assert!((bounds.top() - 0.0).abs() < 0.05);
        assert!((bounds.bottom() - 60.0).abs() < 0.05);
        assert_eq!(path.subpaths[0].end_point(), dvec2(0.0, 30.0));
    }

    #[test]
    fn polyline_subpath_constructor() {
        let pts = [dvec2(0.0, 0.0), dvec2(1.0, 0.0), dvec2(1.0, 1.0)];
        let s = Subpath::polyline(&pts, true, false);
        assert_eq!(s.start_point, pts[0]);
        assert_eq!(s.segments, vec![Segment::poly_line(pts[1..].to_vec())]);
        assert!(s.is_closed && !s.is_filled);

        let single = Subpath::polyline(&pts[..1], false, false);
        assert!(single.segments.is_empty());
        assert!(Subpath::polyline(&[], false, false).segments.is_empty());
    }

    #[test]
    fn topology_mismatches_are_described() {
        let a = PathModel::from_subpaths(vec![
            Subpath::new(Point::ZERO).with_segment(Segment::line(dvec2(1.0, 0.0))),
        ]);
        let mut b = a.clone();
        assert!(a.same_topology(&b).is_ok());

        b.subpaths[0].segments[0] = Segment::quadratic(dvec2(1.0, 1.0), dvec2(2.0, 0.0));
        let err = a.same_topology(&b).unwrap_err();
        assert_eq!(
            err.to_string(),
            "paths do not share the same topology: subpath 0 segment 0 is line vs quadratic"
        );

        let empty = PathModel::new();
        assert!(matches!(
            a.same_topology(&empty),
            Err(GeometryError::TopologyMismatch { .. })
        ));

        let c = PathModel::from_subpaths(vec![Subpath::polyline(
            &[Point::ZERO, Point::X],
            false,
            true,
        )]);
        let d = PathModel::from_subpaths(vec![Subpath::polyline(
            &[Point::ZERO, Point::X, Point::Y],
            false,
            true,
        )]);
        assert!(c.same_topology(&d).is_err());
    }
}
