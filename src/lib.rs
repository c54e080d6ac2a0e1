//! Procedural 2D vector paths.
//!
//! `vecpath` builds, flattens, measures and perturbs vector geometry:
//!
//! - [`path`] holds the path model (subpaths of lines, Beziers, arcs and
//!   poly-segments) and a fluent [`PathBuilder`].
//! - [`flatten`] turns Beziers and arcs into polylines within a distance
//!   tolerance.
//! - [`polyline`] measures polylines and walks them by arc length with
//!   [`polyline::path_march`].
//! - [`source`] produces cached shape geometry from parameters and layout
//!   bounds, with [`source::arc::ArcGeometrySource`] for arcs, pies and
//!   rings.
//! - [`effect`] post-processes shape geometry through a chain of effects such
//!   as [`effect::SketchEffect`].
//! - [`animation`] interpolates numbers, points, colours and whole paths.
//!
//! ```
//! use glam::dvec2;
//! use vecpath::PathBuilder;
//!
//! let path = PathBuilder::new()
//!     .move_to(dvec2(0.0, 0.0))
//!     .cubic_to(dvec2(0.0, 50.0), dvec2(100.0, 50.0), dvec2(100.0, 0.0))
//!     .build();
//! let polylines = path.flatten(0.25);
//! assert_eq!(polylines[0].first(), Some(&dvec2(0.0, 0.0)));
//! assert_eq!(polylines[0].last(), Some(&dvec2(100.0, 0.0)));
//! ```

pub mod log;

pub mod animation;
pub mod defaults;
pub mod effect;
pub mod errors;
pub mod flatten;
pub mod math;
pub mod path;
pub mod polyline;
pub mod source;
pub mod types;

pub use animation::{Animatable, interpolate};
pub use effect::{Effect, EffectChain, GeometryEffect, SketchEffect};
pub use errors::{GeometryError, Result};
pub use path::{PathBuilder, PathModel, Segment, SegmentKind, Subpath};
pub use polyline::{MarchLocation, MarchStopReason, PolylineData, path_march};
pub use source::{InvalidateReason, ShapeGeometrySource};
pub use types::{Color, Point, Rect, Size, Stretch, Vector};
