//! Glyph Rain - a scroll-driven "digital rain" reveal
//!
//! Core modules:
//! - `sim`: Deterministic animation state (scroll mapping, motion curve, particle field, reveal FSM)
//! - `renderer`: WebGPU instanced glyph rendering pipeline
//! - `settings`: Tunable animation constants and user preferences

pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::{RainConfig, Settings};

/// Animation configuration constants
pub mod consts {
    /// Maximum delta-time per tick (seconds). Caps the jump after tab
    /// backgrounding or long GC pauses.
    pub const MAX_DT: f32 = 0.033;

    /// World-space speed multiplier applied to every stream
    pub const WORLD_SPEED: f32 = 16.0;

    /// Spawn bounds (world units, camera at z=32 looking at origin)
    pub const BOUNDS_X: f32 = 34.0;
    pub const BOUNDS_Z: f32 = 34.0;
    pub const Y_TOP: f32 = 38.0;
    pub const Y_BOTTOM: f32 = -38.0;

    /// Vertical margin outside which segments are culled from the draw set
    pub const CULL_MARGIN: f32 = 6.0;
    /// Maximum random jitter added when a recycled stream re-enters
    pub const RECYCLE_JITTER: f32 = 10.0;

    /// Per-stream speed multiplier spawn range
    pub const SPEED_MULT_MIN: f32 = 0.7;
    pub const SPEED_MULT_MAX: f32 = 1.8;
    /// Ceiling on the |speed| any phase may command; `wipe_speed` and the
    /// curve extremes must stay below it or the overflow margin is wrong
    pub const MAX_ABS_SPEED: f32 = 3.0;

    /// Head segment brightness (tails fall off from 1.0 toward the floor)
    pub const HEAD_BRIGHTNESS: f32 = 1.6;
    /// Tail brightness floor
    pub const TAIL_FLOOR: f32 = 0.05;

    /// Camera placement (matches the page layout the rain was tuned against)
    pub const CAMERA_POS: [f32; 3] = [0.0, 6.0, 32.0];
    pub const CAMERA_FOV_DEG: f32 = 45.0;
    pub const CAMERA_NEAR: f32 = 0.1;
    pub const CAMERA_FAR: f32 = 260.0;

    /// Fog range (linear, world units from camera)
    pub const FOG_NEAR: f32 = 25.0;
    pub const FOG_FAR: f32 = 120.0;

    /// Background color (slightly off-black so the glow reads)
    pub const BACKGROUND: [f64; 3] = [0.02, 0.024, 0.02];
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Inverse lerp, clamped to [0, 1]. Tolerates a degenerate (a == b) range.
#[inline]
pub fn inv_lerp(a: f32, b: f32, v: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        return 0.0;
    }
    ((v - a) / (b - a)).clamp(0.0, 1.0)
}

/// Hermite smoothstep between edges `a` and `b` (3t² - 2t³)
#[inline]
pub fn smoothstep(a: f32, b: f32, v: f32) -> f32 {
    let t = inv_lerp(a, b, v);
    t * t * (3.0 - 2.0 * t)
}
