//! Reproducible description of a still frame.
//!
//! A [`Scene`] captures everything needed to re-render one frame of the
//! effect: surface dimensions, the (pre-scaled) time, and parameter overrides.

use crate::error::FireworksError;
use crate::fireworks::FireworkParams;
use crate::frame::FrameInputs;
use serde::{Deserialize, Serialize};

/// One frame of the effect, serializable as a JSON sidecar.
///
/// Two identical `Scene` values rendered by the same binary produce
/// bit-identical pixels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub time: f32,
    #[serde(default = "empty_params")]
    pub params: serde_json::Value,
}

fn empty_params() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Scene {
    /// Creates a scene with default params (`{}`).
    pub fn new(width: u32, height: u32, time: f32) -> Self {
        Self {
            width,
            height,
            time,
            params: empty_params(),
        }
    }

    /// Validates that the scene has non-zero dimensions whose pixel count
    /// fits in `usize`, and a finite time.
    ///
    /// # Errors
    ///
    /// `FireworksError::InvalidDimensions` for bad dimensions,
    /// `FireworksError::InvalidParam` for a NaN or infinite time.
    pub fn validate(&self) -> Result<(), FireworksError> {
        if self.width == 0 || self.height == 0 {
            return Err(FireworksError::InvalidDimensions);
        }
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or(FireworksError::InvalidDimensions)?;
        if !self.time.is_finite() {
            return Err(FireworksError::InvalidParam {
                name: "time".to_string(),
                reason: format!("must be finite, got {}", self.time),
            });
        }
        Ok(())
    }

    /// Parameters of this scene, with defaults for anything not overridden.
    pub fn firework_params(&self) -> FireworkParams {
        FireworkParams::from_json(&self.params)
    }

    /// Per-frame inputs for this scene, with the pointer at rest.
    pub fn frame_inputs(&self) -> FrameInputs {
        FrameInputs::new(self.width, self.height, self.time)
    }
}
