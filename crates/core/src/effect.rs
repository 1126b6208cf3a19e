//! The `Effect` trait: a pure per-pixel colour function plus its parameters.
//!
//! The trait is object-safe so rasterizers and tools can hold a
//! `&dyn Effect` without knowing the concrete effect.

use crate::frame::FrameInputs;
use glam::{Vec2, Vec3};
use serde_json::Value;

/// A stateless procedural image: colour as a function of fragment position
/// and frame inputs.
///
/// Implementations must be pure. Evaluating the same fragment with the same
/// inputs any number of times, in any order, yields the same colour; this is
/// what lets callers evaluate pixels independently (on a GPU or in a loop).
pub trait Effect {
    /// Colour of the fragment at `frag_coord` (pixel units, origin bottom-left,
    /// pixel centres at `n + 0.5`).
    fn shade(&self, frag_coord: Vec2, inputs: &FrameInputs) -> Vec3;

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all parameters, their types, ranges, and defaults.
    fn param_schema(&self) -> Value;
}
