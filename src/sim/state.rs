//! Animation state and the reveal phase machine
//!
//! The phase machine is the one genuinely stateful piece of the system: a
//! scroll-triggered, wall-clock-timed wipe that ends in the overlay reveal.

use serde::{Deserialize, Serialize};

use crate::settings::RainConfig;

use super::curve::MotionParams;
use super::field::{GlyphInstance, ParticleField};
use super::scroll::ScrollSignal;

/// Current animation phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Phase {
    /// Normal rain, speed driven by the scroll curve
    Falling,
    /// Timed full-screen upward rush preceding the reveal. Runs on wall
    /// clock, not scroll; `elapsed` is advanced by tick dt.
    StreamWipe { elapsed: f32 },
    /// Rain cleared, name/company overlay visible
    Revealed,
}

/// Overlay element visibility computed each tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayState {
    pub reveal: bool,
    pub hint: bool,
    pub actions: bool,
}

/// Complete animation state, advanced once per frame by [`super::tick`]
#[derive(Debug, Clone)]
pub struct RainState {
    pub config: RainConfig,
    pub scroll: ScrollSignal,
    pub phase: Phase,
    pub field: ParticleField,
    /// Motion parameters from the last tick, phase overrides applied
    pub params: MotionParams,
    pub overlay: OverlayState,
    /// Total animation time in seconds
    pub time: f32,
    /// OS-level preference: stay revealed, never animate
    pub reduced_motion: bool,
    /// Visible instance set, rebuilt each tick (fixed capacity)
    pub instances: Vec<GlyphInstance>,
}

impl RainState {
    pub fn new(config: RainConfig, seed: u64, reduced_motion: bool) -> Self {
        let field = ParticleField::new(&config, seed);
        let capacity = config.instance_capacity();
        let params = MotionParams::from_progress(&config, 0.0);
        let phase = if reduced_motion {
            Phase::Revealed
        } else {
            Phase::Falling
        };

        let mut state = Self {
            scroll: ScrollSignal::new(config.gamma),
            config,
            phase,
            field,
            params,
            overlay: OverlayState::default(),
            time: 0.0,
            reduced_motion,
            instances: Vec::with_capacity(capacity),
        };
        if reduced_motion {
            state.overlay = OverlayState {
                reveal: true,
                hint: false,
                actions: true,
            };
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_starts_falling() {
        let state = RainState::new(RainConfig::default(), 1, false);
        assert_eq!(state.phase, Phase::Falling);
        assert!(!state.overlay.reveal);
        assert_eq!(state.instances.capacity(), state.config.instance_capacity());
    }

    #[test]
    fn test_reduced_motion_starts_revealed() {
        let state = RainState::new(RainConfig::default(), 1, true);
        assert_eq!(state.phase, Phase::Revealed);
        assert!(state.overlay.reveal);
        assert!(!state.overlay.hint);
    }
}
