//! Plain 2D value types: points, sizes, rectangles and colors.
//!
//! Points and vectors are `glam::DVec2`. Everything here is `Copy` and compares
//! by value.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use glam::{DVec2, dvec2};

/// An absolute position.
pub type Point = DVec2;

/// A displacement; `Point + Vector = Point`.
pub type Vector = DVec2;

/// 2D size
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }

    pub fn scale(self, factor: f64) -> Size {
        Size::new(self.width * factor, self.height * factor)
    }

    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn is_finite(self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }

    pub fn to_vec(self) -> DVec2 {
        dvec2(self.width, self.height)
    }
}

impl Add for Size {
    type Output = Size;
    fn add(self, rhs: Size) -> Size { Size::new(self.width + rhs.width, self.height + rhs.height) }
}
impl Sub for Size {
    type Output = Size;
    fn sub(self, rhs: Size) -> Size { Size::new(self.width - rhs.width, self.height - rhs.height) }
}
impl Mul<f64> for Size {
    type Output = Size;
    fn mul(self, rhs: f64) -> Size { self.scale(rhs) }
}
impl Neg for Size {
    type Output = Size;
    fn neg(self) -> Size { Size::new(-self.width, -self.height) }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Axis-aligned rectangle in a y-down coordinate system.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Rect::new(origin.x, origin.y, size.width, size.height)
    }

    /// Smallest rectangle containing every point, or `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Rect::new(min.x, min.y, max.x - min.x, max.y - min.y))
    }

    pub fn left(&self) -> f64 { self.x }
    pub fn top(&self) -> f64 { self.y }
    pub fn right(&self) -> f64 { self.x + self.width }
    pub fn bottom(&self) -> f64 { self.y + self.height }

    pub fn top_left(&self) -> Point {
        dvec2(self.left(), self.top())
    }

    pub fn center(&self) -> Point {
        dvec2(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Zero width or height (or negative).
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Grow by `dx` on the left and right and `dy` on top and bottom.
    ///
    /// Negative amounts shrink the rectangle about its centre; a side never
    /// drops below zero length.
    pub fn inflate(&self, dx: f64, dy: f64) -> Rect {
        let center = self.center();
        let width = (self.width + 2.0 * dx).max(0.0);
        let height = (self.height + 2.0 * dy).max(0.0);
        Rect::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    /// Scale width and height by `ratio` about the centre.
    pub fn resize(&self, ratio: f64) -> Rect {
        let center = self.center();
        let width = self.width * ratio;
        let height = self.height * ratio;
        Rect::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    /// Map a point in unit-box coordinates (0..1 on both axes) into this rectangle.
    pub fn relative_to_absolute(&self, relative: Point) -> Point {
        dvec2(
            self.x + relative.x * self.width,
            self.y + relative.y * self.height,
        )
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x, self.y, self.width, self.height)
    }
}

/// Linear-light color with `f32` channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Color {
    pub a: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::from_argb(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::from_argb(1.0, 0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::from_argb(1.0, 1.0, 1.0, 1.0);

    pub const fn from_argb(a: f32, r: f32, g: f32, b: f32) -> Self {
        Color { a, r, g, b }
    }

    /// 8-bit channels, mapped linearly into `[0, 1]`.
    pub fn from_argb8(a: u8, r: u8, g: u8, b: u8) -> Self {
        let unit = |c: u8| f32::from(c) / 255.0;
        Color::from_argb(unit(a), unit(r), unit(g), unit(b))
    }

    pub(crate) fn channels(self) -> [f32; 4] {
        [self.a, self.r, self.g, self.b]
    }

    pub(crate) fn from_channels([a, r, g, b]: [f32; 4]) -> Self {
        Color::from_argb(a, r, g, b)
    }

    pub fn is_finite(self) -> bool {
        self.channels().iter().all(|c| c.is_finite())
    }
}

/// How a shape's logical bounds are fitted into its layout bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Stretch {
    None,
    #[default]
    Fill,
    Uniform,
    UniformToFill,
}
