#![deny(unsafe_code)]
//! CPU rasterizer for the heartworks field function.
//!
//! The field function is pure, so a plain row-major loop over pixel centres
//! is an exact evaluation of the effect: the same colours the fragment
//! shader computes, one pixel at a time. The CLI uses this crate for stills
//! and frame sequences; tests use it to check whole-frame properties.

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use glam::Vec2;
use heartworks_core::error::FireworksError;
use heartworks_core::frame::FrameInputs;
use heartworks_core::scene::Scene;
use heartworks_core::{Effect, HeartFireworks};

use crate::pixel::color_to_rgba8;

/// Shades every pixel of the surface described by `inputs`.
///
/// The buffer is row-major from the top row down, as image files expect.
/// Fragment coordinates follow GL conventions: origin bottom-left, pixel
/// centres at `n + 0.5`, so buffer row `r` is fragment row `height - 1 - r`.
///
/// # Errors
///
/// Returns `FireworksError::InvalidDimensions` if the resolution is empty or
/// the buffer size would overflow `usize`.
pub fn render_rgba(effect: &dyn Effect, inputs: &FrameInputs) -> Result<Vec<u8>, FireworksError> {
    let (width, height) = dimensions(inputs)?;
    let len = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(4))
        .ok_or(FireworksError::InvalidDimensions)?;

    let mut rgba = Vec::with_capacity(len);
    for row in 0..height {
        let y = (height - 1 - row) as f32 + 0.5;
        for col in 0..width {
            let frag = Vec2::new(col as f32 + 0.5, y);
            rgba.extend_from_slice(&color_to_rgba8(effect.shade(frag, inputs)));
        }
    }
    Ok(rgba)
}

/// Validates `scene`, builds the effect from its params and renders it.
///
/// # Errors
///
/// Propagates scene and parameter validation failures.
pub fn render_scene(scene: &Scene) -> Result<Vec<u8>, FireworksError> {
    scene.validate()?;
    let effect = HeartFireworks::new(scene.firework_params())?;
    log::debug!(
        "rendering {}x{} at t={} ({} rockets)",
        scene.width,
        scene.height,
        scene.time,
        effect.firework_params().rocket_count
    );
    render_rgba(&effect, &scene.frame_inputs())
}

/// `frames` evenly spaced times covering one cycle of `cycle_length`,
/// starting at 0 and stopping short of the period (frame `frames` would
/// repeat frame 0).
pub fn cycle_times(frames: usize, cycle_length: f32) -> Vec<f32> {
    (0..frames)
        .map(|i| cycle_length * i as f32 / frames as f32)
        .collect()
}

fn dimensions(inputs: &FrameInputs) -> Result<(usize, usize), FireworksError> {
    let w = inputs.resolution.x;
    let h = inputs.resolution.y;
    if !(w >= 1.0 && h >= 1.0) || w.fract() != 0.0 || h.fract() != 0.0 {
        return Err(FireworksError::InvalidDimensions);
    }
    Ok((w as usize, h as usize))
}
