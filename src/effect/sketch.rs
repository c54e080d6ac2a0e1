//! Hand-drawn look: resample every segment and jitter the samples.
//!
//! Each simple segment (line or cubic) is flattened and, if long enough,
//! resampled at roughly even spacing with [`path_march`]. Every sample except
//! the segment's first point is then pushed along its normal by a Gaussian
//! amount and along its tangent by a uniform amount, both scaled by the
//! sample spacing. Segment joints stay put, so corners remain where they
//! were.
//!
//! The random source is reseeded from the effect's seed on every
//! recomputation, so the same input always sketches the same way.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal, Uniform};

use crate::defaults::{
    FLATTENING_TOLERANCE, SKETCH_MIN_LENGTH, SKETCH_NORMAL_DEVIATION, SKETCH_SAMPLE_INTERVAL,
    SKETCH_TANGENT_JITTER,
};
use crate::effect::{EffectState, GeometryEffect};
use crate::log::{debug, trace, warn};
use crate::path::{PathModel, Subpath};
use crate::polyline::{MarchStopReason, PolylineData, path_march};
use crate::source::InvalidateReason;
use crate::types::{Point, Vector};

/// Vertices turning by more than this are reported as corners while
/// resampling.
const CORNER_THRESHOLD_DEGREES: f64 = 90.0;

/// Tuning knobs for [`SketchEffect`].
#[derive(Clone, Debug, PartialEq)]
pub struct SketchOptions {
    /// Target distance between resampled points.
    pub sample_interval: f64,
    /// Segments whose flattened length is at most this are left alone.
    pub min_length: f64,
    /// Standard deviation of the normal offset, in sample intervals.
    pub normal_deviation: f64,
    /// Half-width of the tangential jitter, in sample intervals.
    pub tangent_jitter: f64,
    /// Flattening tolerance for curved segments.
    pub tolerance: f64,
}

impl Default for SketchOptions {
    fn default() -> Self {
        Self {
            sample_interval: SKETCH_SAMPLE_INTERVAL,
            min_length: SKETCH_MIN_LENGTH,
            normal_deviation: SKETCH_NORMAL_DEVIATION,
            tangent_jitter: SKETCH_TANGENT_JITTER,
            tolerance: FLATTENING_TOLERANCE,
        }
    }
}

impl SketchOptions {
    pub fn with_sample_interval(mut self, sample_interval: f64) -> Self {
        self.sample_interval = sample_interval;
        self
    }

    pub fn with_min_length(mut self, min_length: f64) -> Self {
        self.min_length = min_length;
        self
    }

    pub fn with_normal_deviation(mut self, normal_deviation: f64) -> Self {
        self.normal_deviation = normal_deviation;
        self
    }

    pub fn with_tangent_jitter(mut self, tangent_jitter: f64) -> Self {
        self.tangent_jitter = tangent_jitter;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Randomly perturbs geometry so it looks drawn by hand.
#[derive(Clone, Debug)]
pub struct SketchEffect {
    state: EffectState,
    seed: u64,
    options: SketchOptions,
}

impl Default for SketchEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl SketchEffect {
    /// A sketch effect with a random seed.
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: EffectState::default(),
            seed,
            options: SketchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SketchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn set_seed(&mut self, seed: u64) {
        if self.seed != seed {
            self.seed = seed;
            self.invalidate_geometry(InvalidateReason::PropertyChanged);
        }
    }

    pub fn options(&self) -> &SketchOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: SketchOptions) {
        if self.options != options {
            self.options = options;
            self.invalidate_geometry(InvalidateReason::PropertyChanged);
        }
    }

    /// Sketch `input` with this effect's seed and options, without touching
    /// the cache.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn sketch(&self, input: &PathModel) -> PathModel {
        if let Err(err) = input.validate() {
            warn!(%err, "sketch: malformed input, passing it through");
            return input.clone();
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        let subpaths = input
            .subpaths
            .iter()
            .map(|subpath| sketch_subpath(subpath, &self.options, &mut rng))
            .collect();
        PathModel {
            fill_rule: input.fill_rule,
            subpaths,
        }
    }
}

impl GeometryEffect for SketchEffect {
    fn effect_state(&self) -> &EffectState {
        &self.state
    }

    fn effect_state_mut(&mut self) -> &mut EffectState {
        &mut self.state
    }

    fn update_cached_geometry(&mut self, input: &PathModel) -> bool {
        let output = self.sketch(input);
        debug!(seed = self.seed, subpaths = output.subpaths.len(), "sketch recomputed");
        self.state.set_cached(output)
    }
}

/// Random offsets for one resampled segment.
struct Jitter {
    normal: Option<Normal<f64>>,
    tangent: Option<Uniform<f64>>,
}

impl Jitter {
    fn new(options: &SketchOptions, interval: f64) -> Self {
        let deviation = options.normal_deviation * interval;
        let half_width = (options.tangent_jitter * interval).abs();
        Jitter {
            normal: Normal::new(0.0, deviation).ok(),
            tangent: half_width
                .is_finite()
                .then(|| Uniform::new_inclusive(-half_width, half_width)),
        }
    }

    fn displace(&self, point: Point, normal: Vector, rng: &mut StdRng) -> Point {
        let g = self.normal.as_ref().map_or(0.0, |d| d.sample(rng));
        let j = self.tangent.as_ref().map_or(0.0, |d| d.sample(rng));
        Point::new(
            point.x + normal.x * g - normal.y * j,
            point.y + normal.y * g + normal.x * j,
        )
    }
}

fn sketch_subpath(subpath: &Subpath, options: &SketchOptions, rng: &mut StdRng) -> Subpath {
    let segments = subpath.simple_segments();
    let mut points = Vec::new();

    for segment in &segments {
        let flattened = segment.flatten(options.tolerance);
        let polyline = match PolylineData::new(flattened.clone()) {
            Ok(polyline)
                if polyline.total_length().is_finite()
                    && polyline.total_length() > options.min_length =>
            {
                polyline
            }
            _ => {
                points.extend_from_slice(&flattened[..flattened.len().saturating_sub(1)]);
                continue;
            }
        };

        let length = polyline.total_length();
        let sample_interval = if options.sample_interval > 0.0 {
            options.sample_interval
        } else {
            SKETCH_SAMPLE_INTERVAL
        };
        let count = ((length / sample_interval).ceil() as usize).max(2);
        let interval = length / count as f64;
        trace!(length, count, "sketch: resampling segment");
        let samples = resample(&polyline, interval, count);

        let jitter = Jitter::new(options, interval);
        for (i, (point, normal)) in samples.into_iter().enumerate() {
            if i == 0 {
                points.push(point);
            } else {
                points.push(jitter.displace(point, normal, rng));
            }
        }
    }

    if !subpath.is_closed {
        let end = segments
            .last()
            .map_or(subpath.start_point, |segment| segment.last_point());
        points.push(end);
    }

    Subpath::polyline(&points, subpath.is_closed, subpath.is_filled)
}

/// `count` points spaced `interval` apart from the start of `polyline`, each
/// with its edge normal.
fn resample(polyline: &PolylineData, interval: f64, count: usize) -> Vec<(Point, Vector)> {
    let mut samples = Vec::with_capacity(count);
    path_march(polyline, 0.0, CORNER_THRESHOLD_DEGREES, |location| {
        match location.reason {
            MarchStopReason::CompleteStep => {
                samples.push((location.point(polyline), location.normal(polyline, 0.0)));
                if samples.len() >= count { f64::NAN } else { interval }
            }
            MarchStopReason::CornerPoint => location.remain,
            MarchStopReason::CompletePolyline => f64::NAN,
        }
    });
    samples
}
