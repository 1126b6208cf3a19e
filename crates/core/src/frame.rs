//! Per-frame inputs pushed into the field function.
//!
//! These mirror the three uniforms of the fragment shader: `iResolution`,
//! `iTime` and `iMouse`. Nothing here survives from one frame to the next
//! except what the driver chooses to store.

use glam::{Vec2, Vec3, Vec4};

/// Pointer position in surface pixels (origin bottom-left) and pressed state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
    pub pressed: bool,
}

impl PointerState {
    /// Packs the pointer into the `iMouse` layout: `(x, y, pressed, 0)`.
    pub fn to_vec4(self) -> Vec4 {
        Vec4::new(self.x, self.y, if self.pressed { 1.0 } else { 0.0 }, 0.0)
    }
}

/// Everything the field function may read for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInputs {
    /// `(width, height, 1.0)`.
    pub resolution: Vec3,
    /// Elapsed time in effect units (already scaled).
    pub time: f32,
    /// `(x, y, pressed, 0)`. Read but not used by the current effect.
    pub pointer: Vec4,
}

impl FrameInputs {
    /// Inputs for a surface of `width` x `height` pixels at `time`, pointer at rest.
    pub fn new(width: u32, height: u32, time: f32) -> Self {
        Self {
            resolution: Vec3::new(width as f32, height as f32, 1.0),
            time,
            pointer: Vec4::ZERO,
        }
    }

    /// Replaces the pointer slot.
    pub fn with_pointer(mut self, pointer: PointerState) -> Self {
        self.pointer = pointer.to_vec4();
        self
    }

    /// Normalized coordinates of a fragment: origin at the centre, vertical
    /// extent `[-1, 1]`, horizontal extent scaled by the aspect ratio.
    pub fn uv(&self, frag_coord: Vec2) -> Vec2 {
        let res = self.resolution.truncate();
        (2.0 * frag_coord - res) / res.y
    }
}
