//! Conversion from shaded colours to RGBA8 bytes.
//!
//! Always available (no feature gate) so the PNG path and any in-memory
//! consumer share the same quantization.

use glam::Vec3;

/// Quantizes a linear `[0, 1]` colour the way a unorm8 framebuffer does:
/// clamp, scale, round. Alpha is always opaque. NaN channels become 0.
pub fn color_to_rgba8(color: Vec3) -> [u8; 4] {
    let q = |c: f32| {
        if c.is_nan() {
            0
        } else {
            (c.clamp(0.0, 1.0) * 255.0).round() as u8
        }
    };
    [q(color.x), q(color.y), q(color.z), 255]
}

/// Packs colours into a contiguous RGBA8 buffer, four bytes per colour.
pub fn colors_to_rgba(colors: impl IntoIterator<Item = Vec3>) -> Vec<u8> {
    colors.into_iter().flat_map(color_to_rgba8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_and_white_map_to_byte_extremes() {
        assert_eq!(color_to_rgba8(Vec3::ZERO), [0, 0, 0, 255]);
        assert_eq!(color_to_rgba8(Vec3::ONE), [255, 255, 255, 255]);
    }

    #[test]
    fn overbright_and_negative_channels_are_clamped() {
        assert_eq!(color_to_rgba8(Vec3::new(7.5, -0.2, 0.5)), [255, 0, 128, 255]);
    }

    #[test]
    fn nan_channel_becomes_zero() {
        assert_eq!(color_to_rgba8(Vec3::new(f32::NAN, 1.0, 0.0)), [0, 255, 0, 255]);
    }

    #[test]
    fn colors_to_rgba_has_four_bytes_per_colour() {
        let buf = colors_to_rgba(vec![Vec3::splat(0.5); 6]);
        assert_eq!(buf.len(), 24);
        assert!(buf.chunks_exact(4).all(|px| px[3] == 255));
    }
}
