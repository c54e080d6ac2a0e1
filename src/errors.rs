//! Error types for precondition violations.
//!
//! Degenerate geometry (zero-length chords, zero radii, zero sweeps) is not an
//! error anywhere in this crate; it is handled by the algorithms themselves.
//! What ends up here are inputs that break a structural contract: the wrong
//! number of control points, a polyline too short to analyse, a poly-segment
//! whose point count does not divide evenly, or two paths that cannot be
//! combined because their topology differs.

use miette::Diagnostic;
use thiserror::Error;

/// Invalid-argument errors raised by the geometry engine.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("expected {expected} control points, found {found}")]
    #[diagnostic(code(vecpath::invalid_argument::control_points))]
    ControlPointCount { expected: usize, found: usize },

    #[error("a polyline needs at least two points, found {found}")]
    #[diagnostic(code(vecpath::invalid_argument::polyline_too_short))]
    PolylineTooShort { found: usize },

    #[error("{kind} segment holds {count} points, which is not a multiple of {multiple}")]
    #[diagnostic(code(vecpath::invalid_argument::poly_point_count))]
    PolyPointCount {
        kind: &'static str,
        count: usize,
        multiple: usize,
    },

    #[error("paths do not share the same topology: {detail}")]
    #[diagnostic(
        code(vecpath::invalid_argument::topology_mismatch),
        help("paths can only be combined when subpath count, segment count and segment kinds match")
    )]
    TopologyMismatch { detail: String },
}

impl GeometryError {
    /// Every variant is a caller-side precondition violation.
    pub fn is_invalid_argument(&self) -> bool {
        match self {
            GeometryError::ControlPointCount { .. }
            | GeometryError::PolylineTooShort { .. }
            | GeometryError::PolyPointCount { .. }
            | GeometryError::TopologyMismatch { .. } => true,
        }
    }

    pub(crate) fn topology(detail: impl Into<String>) -> Self {
        GeometryError::TopologyMismatch {
            detail: detail.into(),
        }
    }
}

pub type Result<T, E = GeometryError> = std::result::Result<T, E>;
