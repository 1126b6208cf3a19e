//! GLSL ES 3.00 sources for drawing the effect on a GPU.
//!
//! The fragment shader is generated from [`FireworkParams`] so the GPU path
//! honours exactly the same configuration as the CPU field function in
//! [`crate::fireworks`]. It reads three uniforms: `iResolution` (vec3),
//! `iTime` (float) and `iMouse` (vec4, declared but unused by the effect).

use crate::fireworks::FireworkParams;

/// Name of the resolution uniform.
pub const RESOLUTION_UNIFORM: &str = "iResolution";
/// Name of the time uniform.
pub const TIME_UNIFORM: &str = "iTime";
/// Name of the pointer uniform.
pub const POINTER_UNIFORM: &str = "iMouse";

/// GLSL ES 3.0 vertex shader that covers the viewport with one triangle.
///
/// Generates clip-space positions from `gl_VertexID` alone; no vertex
/// buffer is needed. Draw with `draw_arrays(TRIANGLES, 0, 3)` and an empty
/// VAO bound. The triangle is twice the size of the screen and the GPU clips
/// it, giving the same coverage as a two-triangle quad without the diagonal
/// seam.
pub const FULLSCREEN_VERTEX_SHADER: &str = r#"#version 300 es
void main() {
    vec2 corner = vec2((gl_VertexID << 1) & 2, gl_VertexID & 2);
    gl_Position = vec4(corner * 2.0 - 1.0, 0.0, 1.0);
}
"#;

const FRAGMENT_HEADER: &str = r#"#version 300 es
precision highp float;
uniform vec3  iResolution;
uniform float iTime;
uniform vec4  iMouse;
out vec4 fragColor;
"#;

const FRAGMENT_BODY: &str = r#"
vec2 hash22(vec2 p) {
    vec3 a = fract(p.xyx * vec3(123.34, 234.34, 345.65));
    a += dot(a, a + 34.45);
    return fract(vec2(a.x * a.y, a.y * a.z));
}

float star_hash(vec2 uv) {
    return fract(sin(dot(uv, vec2(154.45, 64.548))) * 124.54);
}

vec3 falloff(vec2 uv, vec2 p, float r, vec3 col) {
    if (r <= 0.0) return vec3(0.0);
    vec2 st = uv - p;
#if HEART_WARP == 1
    st.y -= sqrt(abs(st.x)) * 0.1;
#endif
    if (any(isnan(st)) || any(isinf(st))) return vec3(0.0);
    float gain = 0.6 * r * r;
    return gain / max(dot(st, st), 1e-8) * col * INTENSITY;
}

vec2 projectile(vec2 p0, vec2 u, vec2 a, float t, float ang) {
    return p0 + vec2(u.x * cos(ang), u.y * sin(ang)) * t + 0.5 * a * t * t;
}

vec2 projectile_velocity(vec2 u, vec2 a, float t, float ang) {
    return vec2(u.x * cos(ang), u.y * sin(ang)) + a * t;
}

void main() {
    vec2 uv = (2.0 * gl_FragCoord.xy - iResolution.xy) / iResolution.y;
    float t = mod(iTime, CYCLE_LENGTH);
    vec2 a = vec2(0.0, -GRAVITY);
    float ang = radians(LAUNCH_ANGLE);
    vec3 glow = vec3(0.0);

    for (float i = 0.0; i < ROCKET_COUNT; i++) {
        vec2 rand = hash22(vec2(i));
        vec2 ip = vec2(sin(15.0 * rand.x), -1.0 + 0.04);
        vec2 u = vec2(sin(5.0 * rand.x), 5.0 + sin(4.0 * rand.y));
        float t1 = t - i / 5.0;
        vec2 v = projectile_velocity(u, a, t1, ang);
        float tf = 2.0 * u.y * sin(ang) / abs(a.y);
        float apex = tf / 2.0;
        vec2 h = projectile(ip, u, a, apex, ang);
        vec3 col = vec3(0.8, 0.35 + rand.x * 0.25, 0.6 + rand.y * 0.15);
        bool falling = v.y < -0.5;

        glow += falloff(uv, projectile(ip, u, a, t1, ang), falling ? 0.0 : 0.04, col);
#if TRAIL == 1
        for (float k = 4.0; k > 0.0; k--) {
            vec2 p = projectile(ip, u, a, t1 - k * 0.02, ang);
            glow += falloff(uv, p, falling ? 0.0 : max(0.0, 0.04 - k * 0.006), col);
        }
#endif
#if SPAWN == 1
        if (v.y <= 0.0 && t1 >= apex) {
            float r = max(0.0, 0.035 - (t1 - apex) * 0.04);
            for (float j = 0.0; j < SPARK_COUNT; j++) {
                vec2 rand2 = hash22(vec2(j));
                float ang2 = radians(j * (360.0 / SPARK_COUNT));
                float x = cos(ang2);
                float y = sin(ang2) + abs(x) * sqrt((8.0 - abs(x)) / 50.0);
                vec2 heart = vec2(x * x + y * y) * (0.4 / (t1 * sqrt(t1)));
                vec2 s = projectile(h, heart, a * 0.03, t1 - apex, ang2);
                vec3 scol = vec3(0.8, 0.4 + rand2.x * 0.15, 0.65 + rand2.y * 0.1);
                glow += falloff(uv, s, r, scol);
            }
        }
#endif
    }

    float stars = pow(star_hash(uv), 200.0) * 0.5;
    float fade = uv.y * 0.5 + 0.5;
    vec3 night = vec3(0.06, 0.02, 0.18) * fade + vec3(stars) * fade;
    fragColor = vec4(glow + night * (1.0 - glow), 1.0);
}
"#;

/// Formats `v` as a GLSL float literal (always with a fraction or exponent).
fn float_literal(v: f32) -> String {
    let s = format!("{v:?}");
    if s.contains(['.', 'e', 'E']) {
        s
    } else {
        format!("{s}.0")
    }
}

fn flag(on: bool) -> u8 {
    u8::from(on)
}

/// Builds the fragment shader for `params`.
///
/// Callers should validate `params` first; the source itself does not guard
/// against a zero spark count or a non-positive cycle.
pub fn fragment_shader(params: &FireworkParams) -> String {
    let defines = format!(
        "#define ROCKET_COUNT {rockets}\n\
         #define SPARK_COUNT {sparks}\n\
         #define CYCLE_LENGTH {cycle}\n\
         #define LAUNCH_ANGLE {angle}\n\
         #define GRAVITY {gravity}\n\
         #define INTENSITY {intensity}\n\
         #define TRAIL {trail}\n\
         #define SPAWN {spawn}\n\
         #define HEART_WARP {heart}\n",
        rockets = float_literal(params.rocket_count as f32),
        sparks = float_literal(params.spark_count as f32),
        cycle = float_literal(params.cycle_length),
        angle = float_literal(params.launch_angle),
        gravity = float_literal(params.gravity),
        intensity = float_literal(params.intensity),
        trail = flag(params.trail),
        spawn = flag(params.spawn),
        heart = flag(params.heart_warp),
    );
    format!("{FRAGMENT_HEADER}{defines}{FRAGMENT_BODY}")
}
