//! Geometry effects: post-processing stages applied to a shape's geometry.
//!
//! Effects form an ordered chain. Each stage caches its output and only
//! recomputes when invalidated; invalidating a stage invalidates every stage
//! after it, since their input is about to change.

pub mod sketch;

pub use sketch::{SketchEffect, SketchOptions};

use enum_dispatch::enum_dispatch;

use crate::log::{debug, trace};
use crate::path::PathModel;
use crate::source::InvalidateReason;

/// Cache and invalidation flag shared by every effect.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectState {
    pub cached: Option<PathModel>,
    pub invalidated: bool,
}

impl Default for EffectState {
    fn default() -> Self {
        Self {
            cached: None,
            invalidated: true,
        }
    }
}

impl EffectState {
    /// Store a freshly computed output, returning whether it differs from the
    /// previous one.
    pub fn set_cached(&mut self, geometry: PathModel) -> bool {
        if self.cached.as_ref() == Some(&geometry) {
            return false;
        }
        self.cached = Some(geometry);
        true
    }
}

/// A transformation from input geometry to output geometry.
#[enum_dispatch]
pub trait GeometryEffect {
    fn effect_state(&self) -> &EffectState;

    fn effect_state_mut(&mut self) -> &mut EffectState;

    /// Recompute the cached output from `input`. Returns whether it changed.
    fn update_cached_geometry(&mut self, input: &PathModel) -> bool;

    /// Returns `false` if the effect was already invalidated.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn invalidate_geometry(&mut self, reason: InvalidateReason) -> bool {
        let state = self.effect_state_mut();
        if state.invalidated {
            return false;
        }
        trace!(?reason, "effect invalidated");
        state.invalidated = true;
        true
    }

    /// Recompute if invalidated. Returns whether the output changed.
    fn process_geometry(&mut self, input: &PathModel) -> bool {
        if !self.effect_state().invalidated {
            return false;
        }
        let changed = self.update_cached_geometry(input);
        self.effect_state_mut().invalidated = false;
        changed
    }

    fn output_geometry(&self) -> Option<&PathModel> {
        self.effect_state().cached.as_ref()
    }

    fn is_invalidated(&self) -> bool {
        self.effect_state().invalidated
    }

    /// Called when the effect joins a chain.
    fn attach(&mut self) {
        self.effect_state_mut().invalidated = true;
    }

    /// Called when the effect leaves a chain; drops the cached output.
    fn detach(&mut self) {
        let state = self.effect_state_mut();
        state.cached = None;
        state.invalidated = true;
    }
}

/// Every effect kind a chain can hold.
#[enum_dispatch(GeometryEffect)]
#[derive(Clone, Debug)]
pub enum Effect {
    Identity(IdentityEffect),
    Sketch(SketchEffect),
}

/// Passes its input through unchanged.
#[derive(Clone, Debug, Default)]
pub struct IdentityEffect {
    state: EffectState,
}

impl GeometryEffect for IdentityEffect {
    fn effect_state(&self) -> &EffectState {
        &self.state
    }

    fn effect_state_mut(&mut self) -> &mut EffectState {
        &mut self.state
    }

    fn update_cached_geometry(&mut self, input: &PathModel) -> bool {
        self.state.set_cached(input.clone())
    }
}

/// An ordered list of effects, each consuming the previous one's output.
#[derive(Clone, Debug, Default)]
pub struct EffectChain {
    effects: Vec<Effect>,
}

impl EffectChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Effect> {
        self.effects.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    /// Append an effect. It starts invalidated and is computed on the next
    /// [`EffectChain::process`].
    pub fn attach(&mut self, effect: impl Into<Effect>) {
        let mut effect = effect.into();
        effect.attach();
        debug!(position = self.effects.len(), "effect attached");
        self.effects.push(effect);
    }

    /// Remove the effect at `index`; the effects after it are invalidated.
    pub fn detach(&mut self, index: usize) -> Option<Effect> {
        if index >= self.effects.len() {
            return None;
        }
        let mut effect = self.effects.remove(index);
        effect.detach();
        debug!(index, "effect detached");
        self.invalidate_from(index, InvalidateReason::ParentInvalidated);
        Some(effect)
    }

    /// Invalidate the effect at `index` and everything downstream of it.
    /// Returns whether any effect changed state.
    pub fn invalidate(&mut self, index: usize, reason: InvalidateReason) -> bool {
        let Some(effect) = self.effects.get_mut(index) else {
            return false;
        };
        let changed = effect.invalidate_geometry(reason);
        self.invalidate_from(index + 1, InvalidateReason::ParentInvalidated) || changed
    }

    pub fn invalidate_all(&mut self, reason: InvalidateReason) -> bool {
        self.invalidate_from(0, reason)
    }

    fn invalidate_from(&mut self, index: usize, reason: InvalidateReason) -> bool {
        let mut changed = false;
        for effect in self.effects.iter_mut().skip(index) {
            changed |= effect.invalidate_geometry(reason);
        }
        changed
    }

    /// Whether any stage needs processing.
    pub fn is_invalidated(&self) -> bool {
        self.effects.iter().any(GeometryEffect::is_invalidated)
    }

    /// Mutate the effect at `index` and invalidate it, so the change is
    /// picked up on the next [`EffectChain::process`].
    pub fn update<F>(&mut self, index: usize, f: F) -> bool
    where
        F: FnOnce(&mut Effect),
    {
        let Some(effect) = self.effects.get_mut(index) else {
            return false;
        };
        f(effect);
        self.invalidate(index, InvalidateReason::PropertyChanged);
        true
    }

    /// Run every invalidated stage, feeding `input` to the first one. Returns
    /// whether the final output changed.
    pub fn process(&mut self, input: &PathModel) -> bool {
        let mut changed = false;
        for index in 0..self.effects.len() {
            let (upstream, rest) = self.effects.split_at_mut(index);
            let stage_input = upstream
                .last()
                .and_then(GeometryEffect::output_geometry)
                .unwrap_or(input);
            let Some((effect, downstream)) = rest.split_first_mut() else {
                break;
            };
            changed = effect.process_geometry(stage_input);
            if changed {
                for next in downstream {
                    next.invalidate_geometry(InvalidateReason::ParentInvalidated);
                }
            }
        }
        changed
    }

    /// Output of the last stage, if the chain is non-empty and processed.
    pub fn output(&self) -> Option<&PathModel> {
        self.effects.last()?.output_geometry()
    }
}
