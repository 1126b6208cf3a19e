//! Heart-burst fireworks: the per-pixel procedural field function.
//!
//! Nothing is simulated. Every rocket and spark position is evaluated in
//! closed form from the cycle time, so a pixel's colour is a pure function of
//! `(pixel, resolution, time)`:
//!
//! 1. `t = time mod cycle_length`.
//! 2. Each of `rocket_count` rockets launches `i / 5` time-units after the
//!    previous one and follows a projectile arc. While it rises it is drawn
//!    as a bright core with a short trail; once it is falling faster than
//!    `0.5` units/s the core and trail vanish.
//! 3. From the apex on, `spark_count` sparks fly out along a heart outline,
//!    shrinking linearly until their radius reaches zero.
//! 4. Particles are composited additively over a gradient night sky with a
//!    sparse starfield.

use crate::effect::Effect;
use crate::error::FireworksError;
use crate::frame::FrameInputs;
use crate::hash::{index_hash, star_hash};
use crate::params::{param_bool, param_f32, param_usize};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Default number of rockets per cycle.
pub const DEFAULT_ROCKET_COUNT: usize = 35;
/// Default number of sparks per heart burst.
pub const DEFAULT_SPARK_COUNT: usize = 28;
/// Default cycle period in time-units.
pub const DEFAULT_CYCLE_LENGTH: f32 = 10.0;
/// Default launch angle in degrees.
pub const DEFAULT_LAUNCH_ANGLE: f32 = 75.0;
/// Largest accepted `rocket_count`; every rocket is a loop iteration per pixel.
pub const MAX_ROCKET_COUNT: usize = 200;
/// Largest accepted `spark_count`.
pub const MAX_SPARK_COUNT: usize = 128;
/// Default magnitude of the downward acceleration.
pub const DEFAULT_GRAVITY: f32 = 9.8;
/// Default global gain applied to every falloff lobe.
pub const DEFAULT_INTENSITY: f32 = 0.4;

/// Rockets launched per time-unit (rocket `i` launches at `i / LAUNCH_RATE`).
pub const LAUNCH_RATE: f32 = 5.0;
/// Radius of a rising rocket's core.
pub const ROCKET_RADIUS: f32 = 0.04;
/// Vertical velocity below which a rocket's core and trail are hidden.
pub const DESCENT_CUTOFF: f32 = -0.5;
/// Number of trail samples behind each rocket.
pub const TRAIL_SAMPLES: usize = 4;
/// Time offset between consecutive trail samples.
pub const TRAIL_SPACING: f32 = 0.02;
/// Radius lost per trail sample.
pub const TRAIL_TAPER: f32 = 0.006;
/// Radius of a spark at the moment of the burst.
pub const SPARK_RADIUS: f32 = 0.035;
/// Radius lost per time-unit after the burst.
pub const SPARK_SHRINK: f32 = 0.04;
/// Fraction of gravity acting on sparks.
pub const SPARK_GRAVITY_SCALE: f32 = 0.03;

const HEART_SPREAD: f32 = 0.4;
const FALLOFF_GAIN: f32 = 0.6;
const HEART_WARP: f32 = 0.1;
// Keeps a lobe centred exactly on a pixel finite.
const MIN_DIST_SQ: f32 = 1e-8;
const STAR_EXPONENT: f32 = 200.0;
const STAR_GAIN: f32 = 0.5;
const NIGHT_SKY: Vec3 = Vec3::new(0.06, 0.02, 0.18);

/// Tunable parameters of the effect.
///
/// [`Default`] reproduces the classic look: 35 rockets, 28-spark hearts,
/// a 10-unit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireworkParams {
    /// Rockets per cycle.
    pub rocket_count: usize,
    /// Sparks per burst.
    pub spark_count: usize,
    /// Period after which the whole animation repeats.
    pub cycle_length: f32,
    /// Launch angle in degrees.
    pub launch_angle: f32,
    /// Magnitude of the downward acceleration.
    pub gravity: f32,
    /// Global falloff gain.
    pub intensity: f32,
    /// Draw the fading trail behind rising rockets.
    pub trail: bool,
    /// Draw the heart burst after the apex.
    pub spawn: bool,
    /// Bend every falloff lobe into a small heart.
    pub heart_warp: bool,
}

impl Default for FireworkParams {
    fn default() -> Self {
        Self {
            rocket_count: DEFAULT_ROCKET_COUNT,
            spark_count: DEFAULT_SPARK_COUNT,
            cycle_length: DEFAULT_CYCLE_LENGTH,
            launch_angle: DEFAULT_LAUNCH_ANGLE,
            gravity: DEFAULT_GRAVITY,
            intensity: DEFAULT_INTENSITY,
            trail: true,
            spawn: true,
            heart_warp: false,
        }
    }
}

impl FireworkParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Self {
        let d = Self::default();
        Self {
            rocket_count: param_usize(params, "rocket_count", d.rocket_count),
            spark_count: param_usize(params, "spark_count", d.spark_count),
            cycle_length: param_f32(params, "cycle_length", d.cycle_length),
            launch_angle: param_f32(params, "launch_angle", d.launch_angle),
            gravity: param_f32(params, "gravity", d.gravity),
            intensity: param_f32(params, "intensity", d.intensity),
            trail: param_bool(params, "trail", d.trail),
            spawn: param_bool(params, "spawn", d.spawn),
            heart_warp: param_bool(params, "heart_warp", d.heart_warp),
        }
    }

    /// Checks the values the field function divides by.
    pub fn validate(&self) -> Result<(), FireworksError> {
        if self.rocket_count > MAX_ROCKET_COUNT {
            return Err(invalid(
                "rocket_count",
                &format!("must be at most {MAX_ROCKET_COUNT}"),
            ));
        }
        if !(1..=MAX_SPARK_COUNT).contains(&self.spark_count) {
            return Err(invalid(
                "spark_count",
                &format!("must be between 1 and {MAX_SPARK_COUNT}"),
            ));
        }
        if !(self.cycle_length.is_finite() && self.cycle_length > 0.0) {
            return Err(invalid("cycle_length", "must be a positive number"));
        }
        if !(self.gravity.is_finite() && self.gravity > 0.0) {
            return Err(invalid("gravity", "must be a positive number"));
        }
        // A burst needs a positive apex time, i.e. an upward launch.
        if !(self.launch_angle > 0.0 && self.launch_angle <= 90.0) {
            return Err(invalid("launch_angle", "must be in (0, 90] degrees"));
        }
        if !self.intensity.is_finite() {
            return Err(invalid("intensity", "must be finite"));
        }
        Ok(())
    }

    /// Current values as a JSON object.
    pub fn to_json(&self) -> Value {
        json!({
            "rocket_count": self.rocket_count,
            "spark_count": self.spark_count,
            "cycle_length": self.cycle_length,
            "launch_angle": self.launch_angle,
            "gravity": self.gravity,
            "intensity": self.intensity,
            "trail": self.trail,
            "spawn": self.spawn,
            "heart_warp": self.heart_warp,
        })
    }

    /// Acceleration vector `(0, -gravity)`.
    pub fn acceleration(&self) -> Vec2 {
        Vec2::new(0.0, -self.gravity)
    }

    /// Wraps `time` into `[0, cycle_length)` the way GLSL `mod` does, so the
    /// CPU and shader agree on where a cycle starts.
    pub fn cycle_time(&self, time: f32) -> f32 {
        time - self.cycle_length * (time / self.cycle_length).floor()
    }
}

fn invalid(name: &str, reason: &str) -> FireworksError {
    FireworksError::InvalidParam {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Schema describing every parameter of [`FireworkParams`].
pub fn param_schema() -> Value {
    json!({
        "rocket_count": {
            "type": "integer",
            "min": 0,
            "max": MAX_ROCKET_COUNT,
            "default": DEFAULT_ROCKET_COUNT,
            "description": "Rockets launched per cycle, 0.2 time-units apart"
        },
        "spark_count": {
            "type": "integer",
            "min": 1,
            "max": MAX_SPARK_COUNT,
            "default": DEFAULT_SPARK_COUNT,
            "description": "Sparks per heart burst"
        },
        "cycle_length": {
            "type": "number",
            "min": 0.1,
            "max": 100.0,
            "default": DEFAULT_CYCLE_LENGTH,
            "description": "Period after which the animation repeats"
        },
        "launch_angle": {
            "type": "number",
            "min": 0.0,
            "max": 90.0,
            "exclusive_min": true,
            "default": DEFAULT_LAUNCH_ANGLE,
            "description": "Launch angle in degrees, above the horizon"
        },
        "gravity": {
            "type": "number",
            "min": 0.1,
            "max": 50.0,
            "default": DEFAULT_GRAVITY,
            "description": "Downward acceleration"
        },
        "intensity": {
            "type": "number",
            "min": 0.0,
            "max": 2.0,
            "default": DEFAULT_INTENSITY,
            "description": "Global brightness of every particle"
        },
        "trail": {
            "type": "boolean",
            "default": true,
            "description": "Draw a fading trail behind rising rockets"
        },
        "spawn": {
            "type": "boolean",
            "default": true,
            "description": "Draw the heart burst after each apex"
        },
        "heart_warp": {
            "type": "boolean",
            "default": false,
            "description": "Bend each particle lobe into a small heart"
        }
    })
}

/// Closed-form projectile position: `p0 + (u.x cos θ, u.y sin θ) t + ½ a t²`.
pub fn projectile_position(p0: Vec2, u: Vec2, a: Vec2, t: f32, angle: f32) -> Vec2 {
    p0 + launch_velocity(u, angle) * t + 0.5 * a * t * t
}

/// Closed-form projectile velocity: `(u.x cos θ, u.y sin θ) + a t`.
pub fn projectile_velocity(u: Vec2, a: Vec2, t: f32, angle: f32) -> Vec2 {
    launch_velocity(u, angle) + a * t
}

#[inline]
fn launch_velocity(u: Vec2, angle: f32) -> Vec2 {
    Vec2::new(u.x * angle.cos(), u.y * angle.sin())
}

/// Inverse-square glow of a particle of `radius` centred at `center`.
///
/// Returns exactly zero for a non-positive radius or a non-finite offset.
pub fn falloff(uv: Vec2, center: Vec2, radius: f32, color: Vec3, params: &FireworkParams) -> Vec3 {
    if radius <= 0.0 {
        return Vec3::ZERO;
    }
    let mut st = uv - center;
    if params.heart_warp {
        st.y -= st.x.abs().sqrt() * HEART_WARP;
    }
    // `max` would otherwise turn a NaN distance into the floor.
    if !st.is_finite() {
        return Vec3::ZERO;
    }
    let gain = FALLOFF_GAIN * radius * radius;
    gain / st.length_squared().max(MIN_DIST_SQ) * color * params.intensity
}

/// The gradient sky with a sparse starfield, brighter towards the top.
pub fn night_sky(uv: Vec2) -> Vec3 {
    let stars = star_hash(uv).powf(STAR_EXPONENT) * STAR_GAIN;
    let fade = uv.y * 0.5 + 0.5;
    NIGHT_SKY * fade + Vec3::splat(stars) * fade
}

/// Puts the particle glow over the background: bright particles hide the sky.
pub fn composite(particles: Vec3, background: Vec3) -> Vec3 {
    particles + background * (Vec3::ONE - particles)
}

/// One rocket of the cycle. All fields derive from its index and the params.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rocket {
    index: usize,
    launch: Vec2,
    speed: Vec2,
    acceleration: Vec2,
    angle: f32,
    color: Vec3,
}

impl Rocket {
    /// Derives rocket `index` from its hash.
    pub fn new(index: usize, params: &FireworkParams) -> Self {
        let rand = index_hash(index);
        Self {
            index,
            launch: Vec2::new((15.0 * rand.x).sin(), -1.0 + ROCKET_RADIUS),
            speed: Vec2::new((5.0 * rand.x).sin(), 5.0 + (4.0 * rand.y).sin()),
            acceleration: params.acceleration(),
            angle: params.launch_angle.to_radians(),
            color: Vec3::new(0.8, 0.35 + rand.x * 0.25, 0.6 + rand.y * 0.15),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Launch point.
    pub fn launch(&self) -> Vec2 {
        self.launch
    }

    /// Initial speed before the launch angle is applied.
    pub fn speed(&self) -> Vec2 {
        self.speed
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    /// Time since this rocket's launch for cycle time `t` (negative before launch).
    pub fn local_time(&self, t: f32) -> f32 {
        t - self.index as f32 / LAUNCH_RATE
    }

    pub fn position(&self, t1: f32) -> Vec2 {
        projectile_position(self.launch, self.speed, self.acceleration, t1, self.angle)
    }

    pub fn velocity(&self, t1: f32) -> Vec2 {
        projectile_velocity(self.speed, self.acceleration, t1, self.angle)
    }

    /// Time to come back to launch height: `2 u.y sin θ / |a.y|`.
    pub fn flight_time(&self) -> f32 {
        2.0 * self.speed.y * self.angle.sin() / self.acceleration.y.abs()
    }

    /// Local time of the apex, where the burst spawns.
    pub fn apex_time(&self) -> f32 {
        self.flight_time() / 2.0
    }

    pub fn apex(&self) -> Vec2 {
        self.position(self.apex_time())
    }

    /// Whether the rocket is falling fast enough to be hidden.
    pub fn is_descending(&self, t1: f32) -> bool {
        self.velocity(t1).y < DESCENT_CUTOFF
    }

    /// Core radius at `t1`; zero once descending.
    pub fn body_radius(&self, t1: f32) -> f32 {
        if self.is_descending(t1) {
            0.0
        } else {
            ROCKET_RADIUS
        }
    }

    /// Radius of trail sample `k` (1-based, `k * TRAIL_SPACING` behind); zero
    /// once descending.
    pub fn trail_radius(&self, t1: f32, k: usize) -> f32 {
        if self.is_descending(t1) {
            0.0
        } else {
            (ROCKET_RADIUS - k as f32 * TRAIL_TAPER).max(0.0)
        }
    }

    /// Whether the heart burst is visible at `t1`.
    pub fn has_burst(&self, t1: f32) -> bool {
        self.velocity(t1).y <= 0.0 && t1 >= self.apex_time()
    }

    /// Spark radius at `t1`, shrinking from the apex on and floored at zero.
    pub fn spark_radius(&self, t1: f32) -> f32 {
        (SPARK_RADIUS - (t1 - self.apex_time()) * SPARK_SHRINK).max(0.0)
    }

    /// Position of spark `j` of `spark_count` at `t1`. Only meaningful after the apex.
    pub fn spark_position(&self, j: usize, spark_count: usize, t1: f32) -> Vec2 {
        let angle = (j as f32 * (360.0 / spark_count as f32)).to_radians();
        let x = angle.cos();
        let y = angle.sin() + x.abs() * ((8.0 - x.abs()) / 50.0).sqrt();
        let heart = Vec2::splat(x * x + y * y) * (HEART_SPREAD / (t1 * t1.sqrt()));
        projectile_position(
            self.apex(),
            heart,
            self.acceleration * SPARK_GRAVITY_SCALE,
            t1 - self.apex_time(),
            angle,
        )
    }

    /// Core plus trail contribution at `uv`.
    pub fn body_glow(&self, uv: Vec2, t1: f32, params: &FireworkParams) -> Vec3 {
        let mut glow = falloff(uv, self.position(t1), self.body_radius(t1), self.color, params);
        if params.trail {
            for k in (1..=TRAIL_SAMPLES).rev() {
                let sample = self.position(t1 - k as f32 * TRAIL_SPACING);
                glow += falloff(uv, sample, self.trail_radius(t1, k), self.color, params);
            }
        }
        glow
    }

    /// Heart burst contribution at `uv`; zero before the apex.
    pub fn burst_glow(&self, uv: Vec2, t1: f32, params: &FireworkParams) -> Vec3 {
        if !params.spawn || !self.has_burst(t1) {
            return Vec3::ZERO;
        }
        let radius = self.spark_radius(t1);
        if radius <= 0.0 {
            return Vec3::ZERO;
        }
        (0..params.spark_count)
            .map(|j| {
                let rand = index_hash(j);
                let color = Vec3::new(0.8, 0.4 + rand.x * 0.15, 0.65 + rand.y * 0.1);
                let pos = self.spark_position(j, params.spark_count, t1);
                falloff(uv, pos, radius, color, params)
            })
            .sum()
    }

    /// Everything this rocket adds to the pixel at `uv` for cycle time `t`.
    pub fn glow(&self, uv: Vec2, t: f32, params: &FireworkParams) -> Vec3 {
        let t1 = self.local_time(t);
        self.body_glow(uv, t1, params) + self.burst_glow(uv, t1, params)
    }
}

/// The heart-burst fireworks effect.
///
/// Holds only immutable data derived from its params; [`HeartFireworks::color`]
/// never mutates anything.
#[derive(Debug, Clone)]
pub struct HeartFireworks {
    params: FireworkParams,
    rockets: Vec<Rocket>,
}

impl Default for HeartFireworks {
    fn default() -> Self {
        Self::build(FireworkParams::default())
    }
}

impl HeartFireworks {
    /// Creates the effect after validating `params`.
    pub fn new(params: FireworkParams) -> Result<Self, FireworksError> {
        params.validate()?;
        Ok(Self::build(params))
    }

    /// Creates the effect from a JSON params object, falling back to defaults
    /// for missing keys.
    pub fn from_json(params: &Value) -> Result<Self, FireworksError> {
        Self::new(FireworkParams::from_json(params))
    }

    fn build(params: FireworkParams) -> Self {
        let rockets = (0..params.rocket_count)
            .map(|i| Rocket::new(i, &params))
            .collect();
        Self { params, rockets }
    }

    pub fn firework_params(&self) -> &FireworkParams {
        &self.params
    }

    pub fn rockets(&self) -> &[Rocket] {
        &self.rockets
    }

    /// Summed particle glow at `uv` for an unwrapped `time`.
    pub fn particles(&self, uv: Vec2, time: f32) -> Vec3 {
        let t = self.params.cycle_time(time);
        self.rockets
            .iter()
            .map(|rocket| rocket.glow(uv, t, &self.params))
            .sum()
    }

    /// Colour of `pixel` on a surface of `resolution` at `time`.
    pub fn color(&self, pixel: Vec2, resolution: Vec2, time: f32) -> Vec3 {
        let uv = (2.0 * pixel - resolution) / resolution.y;
        composite(self.particles(uv, time), night_sky(uv))
    }
}

impl Effect for HeartFireworks {
    fn shade(&self, frag_coord: Vec2, inputs: &FrameInputs) -> Vec3 {
        self.color(frag_coord, inputs.resolution.truncate(), inputs.time)
    }

    fn params(&self) -> Value {
        self.params.to_json()
    }

    fn param_schema(&self) -> Value {
        param_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RES: Vec2 = Vec2::new(800.0, 600.0);

    fn defaults() -> FireworkParams {
        FireworkParams::default()
    }

    fn max_component(v: Vec3) -> f32 {
        v.max_element()
    }

    #[test]
    fn default_params_match_constants() {
        let p = defaults();
        assert_eq!(p.rocket_count, 35);
        assert_eq!(p.spark_count, 28);
        assert_eq!(p.cycle_length, 10.0);
        assert_eq!(p.launch_angle, 75.0);
        assert_eq!(p.gravity, 9.8);
        assert_eq!(p.intensity, 0.4);
        assert!(p.trail && p.spawn && !p.heart_warp);
    }

    #[test]
    fn from_json_uses_defaults_for_empty_json() {
        assert_eq!(FireworkParams::from_json(&json!({})), defaults());
    }

    #[test]
    fn from_json_extracts_custom_values() {
        let p = FireworkParams::from_json(&json!({
            "rocket_count": 10,
            "spark_count": 12,
            "cycle_length": 6.0,
            "trail": false,
            "heart_warp": true
        }));
        assert_eq!(p.rocket_count, 10);
        assert_eq!(p.spark_count, 12);
        assert_eq!(p.cycle_length, 6.0);
        assert!(!p.trail);
        assert!(p.heart_warp);
        assert_eq!(p.gravity, DEFAULT_GRAVITY);
    }

    #[test]
    fn to_json_reflects_values() {
        let v = defaults().to_json();
        assert_eq!(v["rocket_count"], 35);
        assert_eq!(v["spawn"], true);
    }

    #[test]
    fn serde_fills_missing_fields_from_default() {
        let p: FireworkParams = serde_json::from_str(r#"{"spark_count": 7}"#).unwrap();
        assert_eq!(p.spark_count, 7);
        assert_eq!(p.rocket_count, DEFAULT_ROCKET_COUNT);
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(defaults().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_sparks() {
        let p = FireworkParams {
            spark_count: 0,
            ..defaults()
        };
        assert!(matches!(
            p.validate(),
            Err(FireworksError::InvalidParam { ref name, .. }) if name == "spark_count"
        ));
    }

    #[test]
    fn validate_rejects_non_positive_cycle_and_gravity() {
        let p = FireworkParams {
            cycle_length: 0.0,
            ..defaults()
        };
        assert!(p.validate().is_err());
        let p = FireworkParams {
            gravity: -9.8,
            ..defaults()
        };
        assert!(p.validate().is_err());
        let p = FireworkParams {
            cycle_length: f32::NAN,
            ..defaults()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn validate_rejects_counts_above_schema_max() {
        let p = FireworkParams {
            rocket_count: usize::MAX,
            ..defaults()
        };
        assert!(matches!(
            p.validate(),
            Err(FireworksError::InvalidParam { ref name, .. }) if name == "rocket_count"
        ));
        assert!(HeartFireworks::new(p).is_err());

        let p = FireworkParams {
            spark_count: MAX_SPARK_COUNT + 1,
            ..defaults()
        };
        assert!(matches!(
            p.validate(),
            Err(FireworksError::InvalidParam { ref name, .. }) if name == "spark_count"
        ));
    }

    #[test]
    fn validate_accepts_counts_at_schema_max() {
        let p = FireworkParams {
            rocket_count: MAX_ROCKET_COUNT,
            spark_count: MAX_SPARK_COUNT,
            ..defaults()
        };
        assert!(p.validate().is_ok());
        let schema = param_schema();
        assert_eq!(schema["rocket_count"]["max"], json!(MAX_ROCKET_COUNT));
        assert_eq!(schema["spark_count"]["max"], json!(MAX_SPARK_COUNT));
    }

    #[test]
    fn from_json_huge_rocket_count_is_rejected_not_allocated() {
        let result = HeartFireworks::from_json(&json!({ "rocket_count": u64::MAX }));
        assert!(matches!(result, Err(FireworksError::InvalidParam { .. })));
    }

    #[test]
    fn validate_rejects_launch_angle_outside_upward_range() {
        for angle in [-10.0, 0.0, 90.5, f32::NAN] {
            let p = FireworkParams {
                launch_angle: angle,
                ..defaults()
            };
            assert!(
                matches!(
                    p.validate(),
                    Err(FireworksError::InvalidParam { ref name, .. }) if name == "launch_angle"
                ),
                "angle {angle} accepted"
            );
        }
        let p = FireworkParams {
            launch_angle: 90.0,
            ..defaults()
        };
        assert!(p.validate().is_ok());
    }

    #[test]
    fn new_rejects_invalid_params() {
        let p = FireworkParams {
            spark_count: 0,
            ..defaults()
        };
        assert!(HeartFireworks::new(p).is_err());
    }

    #[test]
    fn schema_lists_every_param() {
        let schema = param_schema();
        for name in defaults().to_json().as_object().unwrap().keys() {
            assert!(schema.get(name).is_some(), "schema missing {name}");
        }
    }

    #[test]
    fn cycle_time_wraps_negative_time() {
        let p = defaults();
        assert_eq!(p.cycle_time(12.5), 2.5);
        assert_eq!(p.cycle_time(-2.5), 7.5);
    }

    #[test]
    fn rockets_launch_staggered() {
        let fx = HeartFireworks::default();
        let rockets = fx.rockets();
        assert_eq!(rockets.len(), 35);
        assert_eq!(rockets[0].local_time(1.0), 1.0);
        assert!((rockets[5].local_time(1.0)).abs() < 1e-6);
        assert!(rockets[10].local_time(1.0) < 0.0);
    }

    #[test]
    fn launch_and_speed_ranges() {
        for rocket in HeartFireworks::default().rockets() {
            assert!((-1.0..=1.0).contains(&rocket.launch().x));
            assert!((rocket.launch().y + 0.96).abs() < 1e-6);
            assert!((4.0..=6.0).contains(&rocket.speed().y));
        }
    }

    #[test]
    fn apex_is_where_vertical_velocity_vanishes() {
        for rocket in HeartFireworks::default().rockets() {
            let vy = rocket.velocity(rocket.apex_time()).y;
            assert!(vy.abs() < 1e-4, "rocket {} vy at apex {vy}", rocket.index());
        }
    }

    #[test]
    fn apex_is_highest_point() {
        for rocket in HeartFireworks::default().rockets() {
            let apex = rocket.apex().y;
            let tf = rocket.apex_time();
            assert!(rocket.position(tf - 0.1).y <= apex);
            assert!(rocket.position(tf + 0.1).y <= apex);
        }
    }

    #[test]
    fn falloff_is_zero_for_non_positive_radius() {
        let p = defaults();
        assert_eq!(falloff(Vec2::ZERO, Vec2::ZERO, 0.0, Vec3::ONE, &p), Vec3::ZERO);
        assert_eq!(falloff(Vec2::ZERO, Vec2::X, -0.02, Vec3::ONE, &p), Vec3::ZERO);
    }

    #[test]
    fn falloff_is_zero_for_non_finite_centre() {
        let p = defaults();
        let nan = Vec2::splat(f32::NAN);
        assert_eq!(falloff(Vec2::ZERO, nan, 0.04, Vec3::ONE, &p), Vec3::ZERO);
        let inf = Vec2::new(f32::INFINITY, 0.0);
        assert_eq!(falloff(Vec2::ZERO, inf, 0.04, Vec3::ONE, &p), Vec3::ZERO);
    }

    #[test]
    fn shallow_launch_has_positive_apex_and_finite_frame() {
        let effect = HeartFireworks::new(FireworkParams {
            launch_angle: 10.0,
            ..defaults()
        })
        .unwrap();
        let res = Vec2::new(80.0, 60.0);
        for y in 0..60 {
            for x in 0..80 {
                let c = effect.color(Vec2::new(x as f32 + 0.5, y as f32 + 0.5), res, 0.01);
                assert!(c.is_finite());
            }
        }
        assert!(effect.rockets().iter().all(|r| r.apex_time() > 0.0));
    }

    #[test]
    fn falloff_stays_finite_at_centre() {
        let glow = falloff(Vec2::ZERO, Vec2::ZERO, 0.04, Vec3::ONE, &defaults());
        assert!(glow.is_finite());
        assert!(glow.x > 1.0);
    }

    #[test]
    fn falloff_decreases_with_distance() {
        let p = defaults();
        let near = falloff(Vec2::new(0.1, 0.0), Vec2::ZERO, 0.04, Vec3::ONE, &p);
        let far = falloff(Vec2::new(0.2, 0.0), Vec2::ZERO, 0.04, Vec3::ONE, &p);
        assert!(near.x > far.x);
        assert!((near.x / far.x - 4.0).abs() < 1e-3, "expected inverse-square");
    }

    #[test]
    fn heart_warp_changes_falloff_off_axis() {
        let warped = FireworkParams {
            heart_warp: true,
            ..defaults()
        };
        let uv = Vec2::new(0.1, 0.1);
        let plain = falloff(uv, Vec2::ZERO, 0.04, Vec3::ONE, &defaults());
        let bent = falloff(uv, Vec2::ZERO, 0.04, Vec3::ONE, &warped);
        assert_ne!(plain, bent);
    }

    #[test]
    fn body_vanishes_once_descending() {
        let p = defaults();
        let fx = HeartFireworks::default();
        for rocket in fx.rockets() {
            let start = rocket.apex_time();
            for step in 0..100 {
                let t1 = start + step as f32 * 0.05;
                if rocket.is_descending(t1) {
                    let uv = rocket.position(t1);
                    assert_eq!(rocket.body_radius(t1), 0.0);
                    assert_eq!(rocket.body_glow(uv, t1, &p), Vec3::ZERO);
                    assert_eq!(rocket.body_glow(Vec2::ZERO, t1, &p), Vec3::ZERO);
                }
            }
        }
    }

    #[test]
    fn body_visible_while_rising() {
        let p = defaults();
        let rocket = Rocket::new(3, &p);
        let t1 = rocket.apex_time() * 0.5;
        let glow = rocket.body_glow(rocket.position(t1), t1, &p);
        assert!(max_component(glow) > 1.0);
    }

    #[test]
    fn trail_radii_taper_and_stay_non_negative() {
        let rocket = Rocket::new(0, &defaults());
        let radii: Vec<f32> = (1..=TRAIL_SAMPLES).map(|k| rocket.trail_radius(0.1, k)).collect();
        assert!(radii.windows(2).all(|w| w[0] > w[1]));
        assert!(radii.iter().all(|&r| r >= 0.0));
    }

    #[test]
    fn disabling_trail_removes_trail_glow() {
        let with_trail = defaults();
        let without = FireworkParams {
            trail: false,
            ..defaults()
        };
        let rocket = Rocket::new(2, &with_trail);
        let t1 = 0.2;
        let behind = rocket.position(t1 - 3.0 * TRAIL_SPACING);
        assert!(rocket.body_glow(behind, t1, &with_trail).x > rocket.body_glow(behind, t1, &without).x);
    }

    #[test]
    fn no_burst_before_apex() {
        let p = defaults();
        for rocket in HeartFireworks::default().rockets() {
            let apex = rocket.apex_time();
            for step in 0..50 {
                let t1 = -1.0 + (apex + 1.0) * step as f32 / 50.0;
                assert!(t1 < apex);
                assert!(!rocket.has_burst(t1));
                assert_eq!(rocket.burst_glow(rocket.apex(), t1, &p), Vec3::ZERO);
            }
        }
    }

    #[test]
    fn burst_visible_just_after_apex() {
        let p = defaults();
        let rocket = Rocket::new(7, &p);
        let t1 = rocket.apex_time() + 0.1;
        assert!(rocket.has_burst(t1));
        let spark = rocket.spark_position(0, p.spark_count, t1);
        assert!(max_component(rocket.burst_glow(spark, t1, &p)) > 1.0);
    }

    #[test]
    fn spawn_toggle_disables_burst() {
        let p = FireworkParams {
            spawn: false,
            ..defaults()
        };
        let rocket = Rocket::new(7, &p);
        let t1 = rocket.apex_time() + 0.1;
        let spark = rocket.spark_position(0, p.spark_count, t1);
        assert_eq!(rocket.burst_glow(spark, t1, &p), Vec3::ZERO);
    }

    #[test]
    fn spark_radius_reaches_zero() {
        let rocket = Rocket::new(0, &defaults());
        let late = rocket.apex_time() + SPARK_RADIUS / SPARK_SHRINK + 1.0;
        assert_eq!(rocket.spark_radius(late), 0.0);
        assert_eq!(rocket.spark_radius(rocket.apex_time()), SPARK_RADIUS);
    }

    #[test]
    fn sparks_surround_the_apex() {
        let p = defaults();
        let rocket = Rocket::new(4, &p);
        let t1 = rocket.apex_time() + 0.3;
        let apex = rocket.apex();
        let centroid: Vec2 = (0..p.spark_count)
            .map(|j| rocket.spark_position(j, p.spark_count, t1))
            .sum::<Vec2>()
            / p.spark_count as f32;
        assert!(centroid.distance(apex) < 0.2, "centroid {centroid} apex {apex}");
        for j in 0..p.spark_count {
            let pos = rocket.spark_position(j, p.spark_count, t1);
            assert!(pos.distance(apex) > 0.0);
        }
    }

    #[test]
    fn centre_at_time_zero_is_background() {
        let fx = HeartFireworks::default();
        let got = fx.color(Vec2::new(400.0, 300.0), RES, 0.0);
        let sky = night_sky(Vec2::ZERO);
        assert!((sky - Vec3::new(0.03, 0.01, 0.09)).abs().max_element() < 1e-6);
        assert!(
            (got - sky).abs().max_element() < 0.01,
            "centre colour {got} vs sky {sky}"
        );
    }

    #[test]
    fn night_sky_brighter_at_top() {
        let top = night_sky(Vec2::new(0.3, 1.0));
        let bottom = night_sky(Vec2::new(0.3, -1.0));
        assert!(top.z > bottom.z);
        assert!(bottom.max_element() < 1e-6);
    }

    #[test]
    fn composite_hides_background_under_bright_particles() {
        let sky = Vec3::new(0.1, 0.1, 0.3);
        assert_eq!(composite(Vec3::ZERO, sky), sky);
        assert_eq!(composite(Vec3::ONE, sky), Vec3::ONE);
    }

    #[test]
    fn effect_shade_matches_color() {
        let fx = HeartFireworks::default();
        let inputs = FrameInputs::new(800, 600, 3.25);
        let pixel = Vec2::new(120.5, 455.5);
        assert_eq!(fx.shade(pixel, &inputs), fx.color(pixel, RES, 3.25));
    }

    #[test]
    fn pointer_does_not_affect_colour() {
        let fx = HeartFireworks::default();
        let pixel = Vec2::new(321.5, 200.5);
        let still = FrameInputs::new(800, 600, 4.0);
        let moved = still.with_pointer(crate::frame::PointerState {
            x: 321.0,
            y: 200.0,
            pressed: true,
        });
        assert_eq!(fx.shade(pixel, &still), fx.shade(pixel, &moved));
    }

    #[test]
    fn burst_lights_up_its_sparks_mid_cycle() {
        let fx = HeartFireworks::default();
        let rocket = fx.rockets()[10];
        let t = rocket.index() as f32 / LAUNCH_RATE + rocket.apex_time() + 0.2;
        let t1 = rocket.local_time(t);
        assert!(rocket.has_burst(t1));
        let spot = rocket.spark_position(0, fx.firework_params().spark_count, t1);
        let pixel = (spot * RES.y + RES) / 2.0;
        let lit = fx.color(pixel, RES, t);
        assert!(lit.max_element() > 0.2, "expected a lit pixel, got {lit}");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn pixel() -> impl Strategy<Value = Vec2> {
            (0u32..64, 0u32..48).prop_map(|(x, y)| Vec2::new(x as f32 + 0.5, y as f32 + 0.5))
        }

        // Quarter steps are exact in f32, so shifting by whole cycles is exact too.
        fn quarter_time() -> impl Strategy<Value = f32> {
            (0u32..40).prop_map(|q| q as f32 * 0.25)
        }

        const SMALL: Vec2 = Vec2::new(64.0, 48.0);

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn deterministic(px in pixel(), t in 0.0_f32..30.0) {
                let fx = HeartFireworks::default();
                let a = fx.color(px, SMALL, t);
                let b = fx.color(px, SMALL, t);
                prop_assert_eq!(a.to_array().map(f32::to_bits), b.to_array().map(f32::to_bits));
            }

            #[test]
            fn periodic_over_cycle(px in pixel(), t in quarter_time(), cycles in 1u32..3) {
                let fx = HeartFireworks::default();
                let base = fx.color(px, SMALL, t);
                let later = fx.color(px, SMALL, t + 10.0 * cycles as f32);
                let earlier = fx.color(px, SMALL, t - 10.0);
                prop_assert_eq!(base.to_array().map(f32::to_bits), later.to_array().map(f32::to_bits));
                prop_assert_eq!(base.to_array().map(f32::to_bits), earlier.to_array().map(f32::to_bits));
            }

            #[test]
            fn spark_radius_never_negative(i in 0usize..35, t1 in -5.0_f32..50.0) {
                let rocket = Rocket::new(i, &FireworkParams::default());
                prop_assert!(rocket.spark_radius(t1) >= 0.0);
                for k in 1..=TRAIL_SAMPLES {
                    prop_assert!(rocket.trail_radius(t1, k) >= 0.0);
                }
            }

            #[test]
            fn descent_is_permanent(i in 0usize..35, dt in 0.0_f32..5.0, x in -1.5_f32..1.5, y in -1.0_f32..1.0) {
                let p = FireworkParams::default();
                let rocket = Rocket::new(i, &p);
                // First local time at which the rocket counts as descending.
                let onset = rocket.apex_time() + (-DESCENT_CUTOFF) / p.gravity + 1e-3;
                prop_assert!(rocket.is_descending(onset));
                prop_assert!(rocket.is_descending(onset + dt));
                prop_assert_eq!(rocket.body_glow(Vec2::new(x, y), onset + dt, &p), Vec3::ZERO);
            }

            #[test]
            fn no_burst_glow_before_apex(i in 0usize..35, frac in 0.0_f32..1.0, x in -1.5_f32..1.5, y in -1.0_f32..1.0) {
                let p = FireworkParams::default();
                let rocket = Rocket::new(i, &p);
                let t1 = rocket.apex_time() * frac - 1e-3;
                prop_assert_eq!(rocket.burst_glow(Vec2::new(x, y), t1, &p), Vec3::ZERO);
            }

            #[test]
            fn colour_is_finite(px in pixel(), t in -20.0_f32..20.0) {
                let fx = HeartFireworks::default();
                prop_assert!(fx.color(px, SMALL, t).is_finite());
            }
        }
    }
}
