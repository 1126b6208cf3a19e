//! Stateless hash functions driving all per-rocket and per-spark jitter.
//!
//! Every "random" quantity in the effect is a pure function of an index or a
//! coordinate, so a frame can be recomputed from scratch at any time and the
//! cycle repeats exactly. The constants match the GLSL in [`crate::glsl`],
//! which keeps the CPU and GPU evaluations visually interchangeable.

use glam::{Vec2, Vec3};

/// GLSL-style `fract`: `x - floor(x)`.
#[inline]
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

#[inline]
fn fract3(v: Vec3) -> Vec3 {
    v - v.floor()
}

#[inline]
fn fract2(v: Vec2) -> Vec2 {
    v - v.floor()
}

/// Two well-distributed values in `[0, 1)` derived from a 2D point.
pub fn hash22(p: Vec2) -> Vec2 {
    let mut a = fract3(Vec3::new(p.x, p.y, p.x) * Vec3::new(123.34, 234.34, 345.65));
    a += a.dot(a + 34.45);
    fract2(Vec2::new(a.x * a.y, a.y * a.z))
}

/// Hash of a loop index, evaluated at `(index, index)`.
#[inline]
pub fn index_hash(index: usize) -> Vec2 {
    let i = index as f32;
    hash22(Vec2::splat(i))
}

/// Scalar hash of a screen coordinate used for the starfield.
pub fn star_hash(uv: Vec2) -> f32 {
    fract(uv.dot(Vec2::new(154.45, 64.548)).sin() * 124.54)
}
