//! Default tolerances and tuning constants

/// Flattening tolerance used whenever a caller passes a non-positive one.
pub const FLATTENING_TOLERANCE: f64 = 0.25;

/// Relative fuzz used by arc-to-bezier to detect degenerate chords and radii.
pub const ARC_EPSILON: f64 = 1e-6;

/// Closeness epsilon for tolerance-aware comparisons.
pub const VERY_SMALL: f64 = 1e-10;

/// Angular span covered by one cubic piece of an inner offset curve.
pub const INNER_CURVE_STEP_DEGREES: f64 = 10.0;

/// Target spacing between resampled sketch points.
pub const SKETCH_SAMPLE_INTERVAL: f64 = 8.0;

/// Flattened segments shorter than this are passed through unperturbed.
pub const SKETCH_MIN_LENGTH: f64 = 4.0;

/// Standard deviation of the normal offset, as a fraction of the sample interval.
pub const SKETCH_NORMAL_DEVIATION: f64 = 1.0 / 8.0;

/// Half-width of the uniform tangential jitter, as a fraction of the sample interval.
pub const SKETCH_TANGENT_JITTER: f64 = 0.5;
