//! Scalar and vector helpers shared by every geometry module.
//!
//! Comparisons are tolerance aware: two values are "close" when they differ by
//! less than [`VERY_SMALL`] in absolute terms, or relative to their magnitude
//! for large values.

use glam::{DVec2, dvec2};

use crate::defaults;
use crate::types::{Point, Rect, Stretch, Vector};

pub const VERY_SMALL: f64 = defaults::VERY_SMALL;

#[inline]
pub fn is_very_small(value: f64) -> bool {
    value.abs() < VERY_SMALL
}

pub fn are_close(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    let scale = (a.abs() + b.abs() + 10.0) * VERY_SMALL;
    let delta = a - b;
    -scale < delta && scale > delta
}

#[inline]
pub fn less_than_or_close(a: f64, b: f64) -> bool {
    a <= b || are_close(a, b)
}

#[inline]
pub fn greater_than_or_close(a: f64, b: f64) -> bool {
    a >= b || are_close(a, b)
}

/// Strictly greater and not within tolerance.
#[inline]
pub fn greater_than(a: f64, b: f64) -> bool {
    a > b && !are_close(a, b)
}

#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// `numerator / denominator`, or `fallback` when the denominator is too small.
pub fn safe_divide(numerator: f64, denominator: f64, fallback: f64) -> f64 {
    if is_very_small(denominator) {
        fallback
    } else {
        numerator / denominator
    }
}

/// Clamp into `[min, max]`, mapping NaN to `min`.
pub fn ensure_range(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() || value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// `mantissa * 2^exponent`
#[inline]
pub fn double_from_mantissa_and_exponent(mantissa: f64, exponent: i32) -> f64 {
    mantissa * 2f64.powi(exponent)
}

/// Smallest `n` with `4^n >= value`.
pub fn log4_ceil(value: u64) -> u32 {
    let mut n = 0;
    let mut power: u64 = 1;
    while power < value && n < 31 {
        power <<= 2;
        n += 1;
    }
    n
}

/// Smallest `n` with `8^n >= value`.
pub fn log8_ceil(value: u64) -> u32 {
    let mut n = 0;
    let mut power: u64 = 1;
    while power < value && n < 21 {
        power <<= 3;
        n += 1;
    }
    n
}

/// Unit vector in the direction of `v`; very short vectors are returned unchanged.
pub fn normalized(v: Vector) -> Vector {
    let length = v.length();
    if is_very_small(length) { v } else { v / length }
}

/// Unit left normal of the edge `p0 -> p1`.
pub fn normal(p0: Point, p1: Point) -> Vector {
    normalized(dvec2(p0.y - p1.y, p1.x - p0.x))
}

#[inline]
pub fn midpoint(a: Point, b: Point) -> Point {
    (a + b) * 0.5
}

/// Point on the unit-box ellipse for an angle in degrees.
///
/// 0° is the top centre and angles grow clockwise on a y-down surface, so 90°
/// is the right centre.
pub fn arc_point(degrees: f64) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    dvec2(0.5 + 0.5 * sin, 0.5 - 0.5 * cos)
}

/// [`arc_point`] mapped into `bounds`.
pub fn arc_point_in(degrees: f64, bounds: Rect) -> Point {
    bounds.relative_to_absolute(arc_point(degrees))
}

/// Fit a box of the given aspect ratio into `bounds` according to `stretch`.
///
/// `None` and `Fill` leave the bounds untouched. `Uniform` returns the largest
/// centred box with the aspect ratio inside `bounds`, `UniformToFill` the
/// smallest centred one covering it.
pub fn stretch_bounds(bounds: Rect, stretch: Stretch, aspect: DVec2) -> Rect {
    if bounds.is_empty() || is_very_small(aspect.x) || is_very_small(aspect.y) {
        return bounds;
    }
    let center = bounds.center();
    let scale_x = bounds.width / aspect.x;
    let scale_y = bounds.height / aspect.y;
    let scale = match stretch {
        Stretch::None | Stretch::Fill => return bounds,
        Stretch::Uniform => scale_x.min(scale_y),
        Stretch::UniformToFill => scale_x.max(scale_y),
    };
    let size = aspect * scale;
    Rect::new(
        center.x - size.x / 2.0,
        center.y - size.y / 2.0,
        size.x,
        size.y,
    )
}
