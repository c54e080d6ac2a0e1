//! Animation arithmetic over scalars, points, sizes, colors and paths.
//!
//! Every animatable value kind implements [`Animatable`]. Paths are the
//! interesting case: two paths can only be combined point by point when they
//! share the same topology, and combining paths that do not is an error.
//! Discrete path data (fill rule, closed/filled/stroked flags, large-arc and
//! sweep flags) is not interpolated; it is taken from the source value, or
//! from the target once progress reaches 1.

use crate::errors::Result;
use crate::log::warn;
use crate::math::lerp;
use crate::path::{ArcSegment, PathModel, Segment, SegmentKind, Subpath};
use crate::types::{Color, Point, Size};

pub trait Animatable: Sized {
    fn add(&self, other: &Self) -> Result<Self>;

    fn subtract(&self, other: &Self) -> Result<Self>;

    fn scale(&self, factor: f64) -> Self;

    /// Value at `progress` between `self` (0) and `to` (1). Progress outside
    /// `[0, 1]` extrapolates.
    fn interpolate(&self, to: &Self, progress: f64) -> Result<Self>;

    /// `false` when any component is NaN or infinite; an animation layer
    /// should hold or skip such a value.
    fn is_valid_animation_value(&self) -> bool;
}

/// `from.interpolate(to, progress)`
pub fn interpolate<T: Animatable>(from: &T, to: &T, progress: f64) -> Result<T> {
    from.interpolate(to, progress)
}

impl Animatable for f64 {
    fn add(&self, other: &Self) -> Result<Self> {
        Ok(self + other)
    }

    fn subtract(&self, other: &Self) -> Result<Self> {
        Ok(self - other)
    }

    fn scale(&self, factor: f64) -> Self {
        self * factor
    }

    fn interpolate(&self, to: &Self, progress: f64) -> Result<Self> {
        Ok(lerp(*self, *to, progress))
    }

    fn is_valid_animation_value(&self) -> bool {
        self.is_finite()
    }
}

impl Animatable for Point {
    fn add(&self, other: &Self) -> Result<Self> {
        Ok(*self + *other)
    }

    fn subtract(&self, other: &Self) -> Result<Self> {
        Ok(*self - *other)
    }

    fn scale(&self, factor: f64) -> Self {
        *self * factor
    }

    fn interpolate(&self, to: &Self, progress: f64) -> Result<Self> {
        Ok(self.lerp(*to, progress))
    }

    fn is_valid_animation_value(&self) -> bool {
        self.is_finite()
    }
}

impl Animatable for Size {
    fn add(&self, other: &Self) -> Result<Self> {
        Ok(*self + *other)
    }

    fn subtract(&self, other: &Self) -> Result<Self> {
        Ok(*self - *other)
    }

    fn scale(&self, factor: f64) -> Self {
        *self * factor
    }

    fn interpolate(&self, to: &Self, progress: f64) -> Result<Self> {
        Ok(Size::new(
            lerp(self.width, to.width, progress),
            lerp(self.height, to.height, progress),
        ))
    }

    fn is_valid_animation_value(&self) -> bool {
        self.is_finite()
    }
}

impl Animatable for Color {
    fn add(&self, other: &Self) -> Result<Self> {
        Ok(zip_channels(*self, *other, |a, b| a + b))
    }

    fn subtract(&self, other: &Self) -> Result<Self> {
        Ok(zip_channels(*self, *other, |a, b| a - b))
    }

    fn scale(&self, factor: f64) -> Self {
        let factor = factor as f32;
        zip_channels(*self, *self, |a, _| a * factor)
    }

    fn interpolate(&self, to: &Self, progress: f64) -> Result<Self> {
        let t = progress as f32;
        Ok(zip_channels(*self, *to, |a, b| a + (b - a) * t))
    }

    fn is_valid_animation_value(&self) -> bool {
        self.is_finite()
    }
}

fn zip_channels(a: Color, b: Color, f: impl Fn(f32, f32) -> f32) -> Color {
    let (a, b) = (a.channels(), b.channels());
    Color::from_channels(std::array::from_fn(|i| f(a[i], b[i])))
}

impl Animatable for PathModel {
    fn add(&self, other: &Self) -> Result<Self> {
        checked_topology(self, other, "add")?;
        Ok(combine(self, other, false, |a, b| a + b))
    }

    fn subtract(&self, other: &Self) -> Result<Self> {
        checked_topology(self, other, "subtract")?;
        Ok(combine(self, other, false, |a, b| a - b))
    }

    fn scale(&self, factor: f64) -> Self {
        combine(self, self, false, |a, _| a * factor)
    }

    fn interpolate(&self, to: &Self, progress: f64) -> Result<Self> {
        checked_topology(self, to, "interpolate")?;
        Ok(combine(self, to, progress >= 1.0, |a, b| lerp(a, b, progress)))
    }

    fn is_valid_animation_value(&self) -> bool {
        let finite = |p: &Point| p.is_finite();
        self.subpaths.iter().all(|subpath| {
            finite(&subpath.start_point)
                && subpath.segments.iter().all(|segment| match &segment.kind {
                    SegmentKind::Line { point } => finite(point),
                    SegmentKind::QuadraticBezier { p1, p2 } => finite(p1) && finite(p2),
                    SegmentKind::CubicBezier { p1, p2, p3 } => {
                        finite(p1) && finite(p2) && finite(p3)
                    }
                    SegmentKind::Arc(arc) => {
                        finite(&arc.point) && arc.size.is_finite() && arc.rotation_angle.is_finite()
                    }
                    SegmentKind::PolyLine { points }
                    | SegmentKind::PolyCubicBezier { points }
                    | SegmentKind::PolyQuadraticBezier { points } => points.iter().all(finite),
                })
        })
    }
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn checked_topology(a: &PathModel, b: &PathModel, operation: &str) -> Result<()> {
    a.same_topology(b).inspect_err(|err| {
        warn!(operation, %err, "path animation: topology mismatch");
    })
}

/// Combine two paths of identical topology number by number. Discrete data
/// comes from `a`, or from `b` when `take_b` is set.
fn combine(
    a: &PathModel,
    b: &PathModel,
    take_b: bool,
    f: impl Fn(f64, f64) -> f64 + Copy,
) -> PathModel {
    let point = |p: Point, q: Point| Point::new(f(p.x, q.x), f(p.y, q.y));
    let flags = if take_b { b } else { a };
    PathModel {
        fill_rule: flags.fill_rule,
        subpaths: a
            .subpaths
            .iter()
            .zip(&b.subpaths)
            .zip(&flags.subpaths)
            .map(|((sa, sb), sf)| Subpath {
                start_point: point(sa.start_point, sb.start_point),
                segments: sa
                    .segments
                    .iter()
                    .zip(&sb.segments)
                    .zip(&sf.segments)
                    .map(|((ga, gb), gf)| Segment {
                        kind: combine_kind(&ga.kind, &gb.kind, &gf.kind, f),
                        is_stroked: gf.is_stroked,
                    })
                    .collect(),
                is_closed: sf.is_closed,
                is_filled: sf.is_filled,
            })
            .collect(),
    }
}

fn combine_kind(
    a: &SegmentKind,
    b: &SegmentKind,
    flags: &SegmentKind,
    f: impl Fn(f64, f64) -> f64 + Copy,
) -> SegmentKind {
    let point = |p: &Point, q: &Point| Point::new(f(p.x, q.x), f(p.y, q.y));
    let points = |ps: &[Point], qs: &[Point]| -> Vec<Point> {
        ps.iter().zip(qs).map(|(p, q)| point(p, q)).collect()
    };
    match (a, b) {
        (SegmentKind::Line { point: p }, SegmentKind::Line { point: q }) => {
            SegmentKind::Line { point: point(p, q) }
        }
        (
            SegmentKind::QuadraticBezier { p1, p2 },
            SegmentKind::QuadraticBezier { p1: q1, p2: q2 },
        ) => SegmentKind::QuadraticBezier {
            p1: point(p1, q1),
            p2: point(p2, q2),
        },
        (
            SegmentKind::CubicBezier { p1, p2, p3 },
            SegmentKind::CubicBezier {
                p1: q1,
                p2: q2,
                p3: q3,
            },
        ) => SegmentKind::CubicBezier {
            p1: point(p1, q1),
            p2: point(p2, q2),
            p3: point(p3, q3),
        },
        (SegmentKind::Arc(x), SegmentKind::Arc(y)) => {
            let discrete = match flags {
                SegmentKind::Arc(arc) => arc,
                _ => x,
            };
            SegmentKind::Arc(ArcSegment {
                point: point(&x.point, &y.point),
                size: Size::new(f(x.size.width, y.size.width), f(x.size.height, y.size.height)),
                rotation_angle: f(x.rotation_angle, y.rotation_angle),
                is_large_arc: discrete.is_large_arc,
                sweep: discrete.sweep,
            })
        }
        (SegmentKind::PolyLine { points: ps }, SegmentKind::PolyLine { points: qs }) => {
            SegmentKind::PolyLine {
                points: points(ps, qs),
            }
        }
        (
            SegmentKind::PolyCubicBezier { points: ps },
            SegmentKind::PolyCubicBezier { points: qs },
        ) => SegmentKind::PolyCubicBezier {
            points: points(ps, qs),
        },
        (
            SegmentKind::PolyQuadraticBezier { points: ps },
            SegmentKind::PolyQuadraticBezier { points: qs },
        ) => SegmentKind::PolyQuadraticBezier {
            points: points(ps, qs),
        },
        // Unreachable after a topology check; keep the source segment.
        _ => a.clone(),
    }
}
