#![deny(unsafe_code)]
//! Core of the heartworks effect: heart-shaped firework bursts drawn by a
//! pure per-pixel field function.
//!
//! Provides the field function itself ([`HeartFireworks`], [`FireworkParams`]),
//! the [`Effect`] trait, per-frame inputs, the generated GLSL, the
//! host-agnostic [`SurfaceDriver`], reproducible [`Scene`]s, and parameter
//! helpers. The glow backend lives in [`render`] behind the `render` feature.

pub mod driver;
pub mod effect;
pub mod error;
pub mod fireworks;
pub mod frame;
pub mod glsl;
pub mod hash;
pub mod params;
pub mod scene;

#[cfg(feature = "render")]
pub mod render;

pub use driver::{DriverState, FieldDevice, FrameRequest, SurfaceDriver, SurfaceHost};
pub use effect::Effect;
pub use error::{DriverError, FireworksError, ShaderError};
pub use fireworks::{FireworkParams, HeartFireworks, Rocket};
pub use frame::{FrameInputs, PointerState};
pub use scene::Scene;
