//! Cached, invalidation-driven shape geometry.
//!
//! A shape geometry source turns a parameter set plus layout bounds into a
//! [`PathModel`]. Two caches are kept: the shape's own geometry, rebuilt only
//! when the source was invalidated or its bounds moved, and the published
//! geometry, which is the output of the attached effect chain (or the shape
//! geometry when there is no effect). Every update reports whether the
//! published geometry changed.

pub mod arc;
pub mod inner_curve;

pub use crate::types::Stretch;

use crate::effect::{Effect, EffectChain};
use crate::log::debug;
use crate::path::PathModel;
use crate::types::Rect;

/// Why a geometry was invalidated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidateReason {
    PropertyChanged,
    Animated,
    ChildInvalidated,
    ParentInvalidated,
    TemplateChanged,
}

/// Stroke and stretch data every shape exposes to the geometry machinery.
pub trait ShapeParameters {
    fn stroke_thickness(&self) -> f64;

    /// Whether a stroke is painted at all.
    fn has_stroke(&self) -> bool;

    fn stretch(&self) -> Stretch;

    /// Half the effective stroke thickness; zero without a stroke.
    fn half_stroke_thickness(&self) -> f64 {
        let thickness = self.stroke_thickness();
        if self.has_stroke() && thickness.is_finite() && thickness > 0.0 {
            thickness / 2.0
        } else {
            0.0
        }
    }
}

/// Per-instance state behind a [`ShapeGeometrySource`].
#[derive(Clone, Debug)]
pub struct GeometrySourceState {
    /// Shape geometry before effects.
    pub cached_geometry: PathModel,
    geometry: PathModel,
    invalidated: bool,
    logical_bounds: Rect,
    layout_bounds: Rect,
    effects: EffectChain,
}

impl Default for GeometrySourceState {
    fn default() -> Self {
        Self {
            cached_geometry: PathModel::default(),
            geometry: PathModel::default(),
            invalidated: true,
            logical_bounds: Rect::default(),
            layout_bounds: Rect::default(),
            effects: EffectChain::default(),
        }
    }
}

impl GeometrySourceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    pub fn logical_bounds(&self) -> Rect {
        self.logical_bounds
    }

    pub fn layout_bounds(&self) -> Rect {
        self.layout_bounds
    }

    /// Replace the cached shape geometry, returning whether it differs.
    pub fn set_cached_geometry(&mut self, geometry: PathModel) -> bool {
        if self.cached_geometry == geometry {
            return false;
        }
        self.cached_geometry = geometry;
        true
    }
}

/// A producer of shape geometry.
///
/// Implementors own a [`GeometrySourceState`] and rebuild
/// `cached_geometry` in [`ShapeGeometrySource::update_cached_geometry`];
/// everything else is provided.
pub trait ShapeGeometrySource {
    type Params: ShapeParameters;

    fn state(&self) -> &GeometrySourceState;

    fn state_mut(&mut self) -> &mut GeometrySourceState;

    /// Rebuild the shape geometry for the current logical bounds. Returns
    /// whether it changed.
    fn update_cached_geometry(&mut self, params: &Self::Params) -> bool;

    /// Logical bounds for the given layout bounds: the layout bounds deflated
    /// by half the stroke thickness, so the stroke stays inside the layout.
    fn compute_logical_bounds(&self, layout_bounds: Rect, params: &Self::Params) -> Rect {
        let half = params.half_stroke_thickness();
        layout_bounds.inflate(-half, -half)
    }

    /// Mark the shape geometry stale without recomputing it. Returns `false`
    /// if it already was.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn invalidate_geometry(&mut self, reason: InvalidateReason) -> bool {
        let state = self.state_mut();
        if state.invalidated {
            return false;
        }
        debug!(?reason, "geometry source invalidated");
        state.invalidated = true;
        true
    }

    /// Bring the published geometry up to date for a layout pass.
    ///
    /// The shape geometry is rebuilt only when the source was invalidated or
    /// the bounds changed; the effect chain reprocesses when the shape
    /// geometry changed or one of its own stages was invalidated. Returns
    /// whether the published geometry changed.
    fn update_geometry(&mut self, params: &Self::Params, layout_bounds: Rect) -> bool {
        let logical_bounds = self.compute_logical_bounds(layout_bounds, params);

        let state = self.state_mut();
        let mut changed =
            state.layout_bounds != layout_bounds || state.logical_bounds != logical_bounds;

        if state.invalidated || changed {
            state.layout_bounds = layout_bounds;
            state.logical_bounds = logical_bounds;
            changed |= self.update_cached_geometry(params);
        }

        let state = self.state_mut();
        if changed {
            state.effects.invalidate_all(InvalidateReason::ParentInvalidated);
        }
        if state.effects.is_invalidated() {
            debug!(effects = state.effects.len(), "reprocessing effect chain");
            state.effects.process(&state.cached_geometry);
        }

        let output = state.effects.output().unwrap_or(&state.cached_geometry);
        if state.geometry != *output {
            state.geometry = output.clone();
            changed = true;
        }

        state.invalidated = false;
        changed
    }

    /// The published geometry.
    fn geometry(&self) -> &PathModel {
        &self.state().geometry
    }

    fn logical_bounds(&self) -> Rect {
        self.state().logical_bounds
    }

    fn layout_bounds(&self) -> Rect {
        self.state().layout_bounds
    }

    fn effects(&self) -> &EffectChain {
        &self.state().effects
    }

    /// Mutable access to the effect chain; edits take effect on the next
    /// [`ShapeGeometrySource::update_geometry`].
    fn effects_mut(&mut self) -> &mut EffectChain {
        &mut self.state_mut().effects
    }

    /// Append an effect to the end of the chain.
    fn attach_effect(&mut self, effect: impl Into<Effect>) {
        self.state_mut().effects.attach(effect);
    }

    /// Remove the effect at `index`. The published geometry is refreshed on
    /// the next update.
    fn detach_effect(&mut self, index: usize) -> Option<Effect> {
        self.state_mut().effects.detach(index)
    }
}
