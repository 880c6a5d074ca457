//! Deterministic animation module
//!
//! Everything that decides what the rain looks like lives here. This module
//! must be pure and deterministic:
//! - Delta-time passed in explicitly (no wall-clock reads)
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod curve;
pub mod field;
pub mod scroll;
pub mod state;
pub mod tick;

pub use curve::{BloomParams, MotionParams, bloom_from_progress, speed_from_progress};
pub use field::{GlyphInstance, ParticleField};
pub use scroll::ScrollSignal;
pub use state::{OverlayState, Phase, RainState};
pub use tick::{TickInput, tick};
