//! Per-frame advance
//!
//! One tick fully completes before the next is scheduled: sample cached
//! scroll, evaluate the curves, step the phase machine, advance the field,
//! rebuild the visible instance set.

use crate::consts::MAX_DT;

use super::curve::{BloomParams, MotionParams};
use super::state::{OverlayState, Phase, RainState};

/// Cached inputs for one tick. Event handlers write these scalars; the tick
/// picks up the latest values with at-most-one-frame latency.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Vertical scroll offset in pixels
    pub scroll_px: f32,
    /// Scrollable height in pixels (document height minus viewport)
    pub max_scroll_px: f32,
}

/// Advance the animation by one frame
pub fn tick(state: &mut RainState, input: &TickInput, dt: f32) {
    // Large gaps (backgrounded tab, GC pause) are capped, not integrated
    let dt = dt.clamp(0.0, MAX_DT);
    state.time += dt;

    state.scroll.set_metrics(input.scroll_px, input.max_scroll_px);
    let t = state.scroll.progress();
    let mut params = MotionParams::from_progress(&state.config, t);

    // Reduced motion pins the final state; no transitions either direction
    if state.reduced_motion {
        state.phase = Phase::Revealed;
        params.speed = 0.0;
        params.bloom = BloomParams::OFF;
        state.params = params;
        state.overlay = OverlayState {
            reveal: true,
            hint: false,
            actions: true,
        };
        state.instances.clear();
        return;
    }

    // Phase transitions
    match state.phase {
        Phase::Falling => {
            // Failsafe: a fling straight to the bottom must still reveal,
            // even if tuning ever moves the trigger past it
            if t > state.config.wipe_trigger || t >= state.config.failsafe_point {
                state.phase = Phase::StreamWipe { elapsed: 0.0 };
                log::info!("wipe triggered at progress {t:.3}");
            }
        }
        Phase::StreamWipe { elapsed } => {
            if t < state.config.reset_point {
                // Immediate cancel: scrolling back up abandons the wipe
                state.phase = Phase::Falling;
                state.field.scatter();
                log::info!("wipe cancelled, back to falling");
            } else {
                let elapsed = elapsed + dt;
                if elapsed >= state.config.wipe_duration {
                    state.phase = Phase::Revealed;
                    log::info!("revealed");
                } else {
                    state.phase = Phase::StreamWipe { elapsed };
                }
            }
        }
        Phase::Revealed => {
            if t < state.config.reset_point {
                state.phase = Phase::Falling;
                state.field.scatter();
                log::info!("reveal dismissed, back to falling");
            }
        }
    }

    // Phase overrides on the scroll-derived parameters
    let flicker_rate = match state.phase {
        Phase::Falling => state.config.flicker_rate,
        Phase::StreamWipe { .. } => {
            params.speed = state.config.wipe_speed;
            params.bloom = BloomParams::WIPE;
            state.config.wipe_flicker_rate
        }
        Phase::Revealed => {
            params.speed = 0.0;
            params.bloom = BloomParams::OFF;
            0.0
        }
    };
    state.params = params;

    // Overlay visibility: the phase machine has the final say on the reveal
    state.overlay = OverlayState {
        reveal: state.phase == Phase::Revealed,
        hint: params.hint_visible && state.phase == Phase::Falling,
        actions: params.actions_visible && state.phase == Phase::Revealed,
    };

    // Advance and rebuild the draw set
    if state.phase == Phase::Revealed {
        state.instances.clear();
    } else {
        state.field.advance(dt, params.speed, flicker_rate);
        let mut instances = std::mem::take(&mut state.instances);
        state.field.emit(&mut instances);
        state.instances = instances;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{Y_BOTTOM, Y_TOP};
    use crate::settings::RainConfig;

    fn input_at(t: f32) -> TickInput {
        TickInput {
            scroll_px: t * 1000.0,
            max_scroll_px: 1000.0,
        }
    }

    fn test_state() -> RainState {
        RainState::new(RainConfig::default(), 12345, false)
    }

    #[test]
    fn test_falling_to_wipe_on_trigger() {
        let mut state = test_state();
        tick(&mut state, &input_at(0.3), MAX_DT);
        assert_eq!(state.phase, Phase::Falling);

        let trigger = state.config.wipe_trigger;
        tick(&mut state, &input_at(trigger + 0.05), MAX_DT);
        assert!(matches!(state.phase, Phase::StreamWipe { .. }));
        // Wipe forces the upward rush and max glow
        assert!(state.params.speed < 0.0);
        assert!(state.params.bloom.strength >= BloomParams::LOOSE.strength);
    }

    #[test]
    fn test_wipe_to_revealed_after_duration() {
        let mut state = test_state();
        tick(&mut state, &input_at(0.9), MAX_DT);
        assert!(matches!(state.phase, Phase::StreamWipe { .. }));

        // Simulated clock: fixed dt steps until just past the wipe duration
        let steps = (state.config.wipe_duration / MAX_DT).ceil() as usize + 2;
        for _ in 0..steps {
            tick(&mut state, &input_at(0.9), MAX_DT);
        }
        assert_eq!(state.phase, Phase::Revealed);
        assert!(state.overlay.reveal);
        assert!(state.instances.is_empty());
        assert_eq!(state.params.bloom, BloomParams::OFF);
    }

    #[test]
    fn test_fling_to_bottom_still_reveals() {
        let mut state = test_state();
        tick(&mut state, &input_at(0.0), MAX_DT);
        assert_eq!(state.phase, Phase::Falling);

        // Single update jumping 0 -> 1 must not get stuck in Falling
        tick(&mut state, &input_at(1.0), MAX_DT);
        assert!(matches!(state.phase, Phase::StreamWipe { .. }));
    }

    #[test]
    fn test_scroll_back_cancels_wipe_immediately() {
        let mut state = test_state();
        tick(&mut state, &input_at(0.9), MAX_DT);
        assert!(matches!(state.phase, Phase::StreamWipe { .. }));

        tick(&mut state, &input_at(0.1), MAX_DT);
        assert_eq!(state.phase, Phase::Falling);
        assert!(!state.overlay.reveal);
    }

    #[test]
    fn test_reset_from_revealed_rescatters() {
        let mut state = test_state();
        tick(&mut state, &input_at(0.9), MAX_DT);
        let steps = (state.config.wipe_duration / MAX_DT).ceil() as usize + 2;
        for _ in 0..steps {
            tick(&mut state, &input_at(0.9), MAX_DT);
        }
        assert_eq!(state.phase, Phase::Revealed);

        tick(&mut state, &input_at(0.05), MAX_DT);
        assert_eq!(state.phase, Phase::Falling);
        // Scatter placed heads in-bounds; this tick then moved them at most
        // one step
        for stream in state.field.streams() {
            assert!(stream.head_y >= Y_BOTTOM - 1.0 && stream.head_y <= Y_TOP + 1.0);
        }
        assert!(!state.instances.is_empty());
    }

    #[test]
    fn test_hint_fades_with_scroll() {
        let mut state = test_state();
        tick(&mut state, &input_at(0.0), MAX_DT);
        assert!(state.overlay.hint);

        tick(&mut state, &input_at(0.2), MAX_DT);
        assert!(!state.overlay.hint);
    }

    #[test]
    fn test_reduced_motion_is_pinned() {
        let mut state = RainState::new(RainConfig::default(), 5, true);
        for t in [0.0, 0.5, 1.0, 0.0] {
            tick(&mut state, &input_at(t), MAX_DT);
            assert_eq!(state.phase, Phase::Revealed);
            assert!(state.overlay.reveal);
            assert!(state.instances.is_empty());
        }
    }

    #[test]
    fn test_dt_clamped() {
        let mut state = test_state();
        let before = state.time;
        // A 2 second frame gap integrates as at most MAX_DT
        tick(&mut state, &input_at(0.0), 2.0);
        assert!((state.time - before - MAX_DT).abs() < 1e-6);
    }

    #[test]
    fn test_determinism() {
        let mut a = RainState::new(RainConfig::default(), 777, false);
        let mut b = RainState::new(RainConfig::default(), 777, false);
        for i in 0..300 {
            let t = (i as f32 / 300.0).min(1.0);
            tick(&mut a, &input_at(t), MAX_DT);
            tick(&mut b, &input_at(t), MAX_DT);
        }
        assert_eq!(a.phase, b.phase);
        assert_eq!(a.instances.len(), b.instances.len());
    }
}
