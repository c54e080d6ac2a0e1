//! Lines and cubics: the two cases every segment kind decomposes into.

use crate::flatten::flatten_cubic_into;
use crate::types::Point;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimpleSegment {
    Line { p0: Point, p1: Point },
    CubicBezier { points: [Point; 4] },
}

impl SimpleSegment {
    pub fn line(p0: Point, p1: Point) -> Self {
        SimpleSegment::Line { p0, p1 }
    }

    pub fn cubic(points: [Point; 4]) -> Self {
        SimpleSegment::CubicBezier { points }
    }

    pub fn first_point(&self) -> Point {
        match self {
            SimpleSegment::Line { p0, .. } => *p0,
            SimpleSegment::CubicBezier { points } => points[0],
        }
    }

    pub fn last_point(&self) -> Point {
        match self {
            SimpleSegment::Line { p1, .. } => *p1,
            SimpleSegment::CubicBezier { points } => points[3],
        }
    }

    /// Append the flattened segment to `out`, without its first point.
    pub fn flatten_into(&self, tolerance: f64, out: &mut Vec<Point>) {
        match self {
            SimpleSegment::Line { p1, .. } => out.push(*p1),
            SimpleSegment::CubicBezier { points } => {
                flatten_cubic_into(points, tolerance, true, out, None);
            }
        }
    }

    /// The flattened segment including its first point.
    pub fn flatten(&self, tolerance: f64) -> Vec<Point> {
        let mut out = vec![self.first_point()];
        self.flatten_into(tolerance, &mut out);
        out
    }
}
