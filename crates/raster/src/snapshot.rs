//! PNG stills with JSON scene sidecars.
//!
//! Feature-gated behind `png` (default on) so consumers that only need the
//! in-memory buffer do not pull in the `image` crate. Every PNG written by
//! [`write_scene_png`] gets a `.json` sidecar holding the [`Scene`] that
//! produced it, so the frame can be reproduced later.

use heartworks_core::error::FireworksError;
use heartworks_core::scene::Scene;
use std::path::{Path, PathBuf};

use crate::render_scene;

/// Writes an RGBA8 buffer as a PNG image.
///
/// Returns `FireworksError::Io` if the buffer does not match `width * height`
/// or the write fails.
pub fn write_png(rgba: Vec<u8>, width: u32, height: u32, path: &Path) -> Result<(), FireworksError> {
    let img = image::RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| FireworksError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| FireworksError::Io(e.to_string()))
}

/// Path of the sidecar for `png_path`: same stem, `.json` extension.
pub fn sidecar_path(png_path: &Path) -> PathBuf {
    png_path.with_extension("json")
}

/// Writes `scene` as pretty JSON next to `png_path` and returns the sidecar path.
pub fn write_scene_sidecar(scene: &Scene, png_path: &Path) -> Result<PathBuf, FireworksError> {
    let path = sidecar_path(png_path);
    let json = serde_json::to_string_pretty(scene).map_err(|e| FireworksError::Io(e.to_string()))?;
    std::fs::write(&path, json).map_err(|e| FireworksError::Io(e.to_string()))?;
    Ok(path)
}

/// Reads a scene previously written by [`write_scene_sidecar`] (or by hand).
pub fn read_scene(path: &Path) -> Result<Scene, FireworksError> {
    let text = std::fs::read_to_string(path).map_err(|e| FireworksError::Io(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| FireworksError::Io(format!("{}: {e}", path.display())))
}

/// Renders `scene` to `png_path` and writes its sidecar. Returns the sidecar path.
pub fn write_scene_png(scene: &Scene, png_path: &Path) -> Result<PathBuf, FireworksError> {
    let rgba = render_scene(scene)?;
    write_png(rgba, scene.width, scene.height, png_path)?;
    let sidecar = write_scene_sidecar(scene, png_path)?;
    log::info!("wrote {} ({}x{}, t={})", png_path.display(), scene.width, scene.height, scene.time);
    Ok(sidecar)
}
