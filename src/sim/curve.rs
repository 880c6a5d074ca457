//! Scroll progress to motion and glow parameters
//!
//! Two independent envelopes, deliberately not conflated: the speed curve
//! oscillates direction (fall, stall, reverse) while the glow envelope
//! tightens monotonically as the page scrolls.

use crate::settings::RainConfig;
use crate::{lerp, smoothstep};

/// Bloom tuning triple, lerped between two regimes by scroll progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomParams {
    pub strength: f32,
    pub radius: f32,
    pub threshold: f32,
}

impl BloomParams {
    /// Loose, bright regime at the top of the page
    pub const LOOSE: BloomParams = BloomParams {
        strength: 1.6,
        radius: 0.6,
        threshold: 0.1,
    };

    /// Tight, subtle regime near the bottom
    pub const TIGHT: BloomParams = BloomParams {
        strength: 0.55,
        radius: 0.25,
        threshold: 0.4,
    };

    /// Everything off (Revealed phase, reduced motion)
    pub const OFF: BloomParams = BloomParams {
        strength: 0.0,
        radius: 0.0,
        threshold: 1.0,
    };

    /// Maximum intensity during the stream wipe
    pub const WIPE: BloomParams = BloomParams {
        strength: 2.0,
        radius: 0.7,
        threshold: 0.0,
    };

    fn mix(a: BloomParams, b: BloomParams, t: f32) -> BloomParams {
        BloomParams {
            strength: lerp(a.strength, b.strength, t),
            radius: lerp(a.radius, b.radius, t),
            threshold: lerp(a.threshold, b.threshold, t),
        }
    }
}

/// Per-frame derived motion parameters
#[derive(Debug, Clone, Copy)]
pub struct MotionParams {
    /// Signed fall speed scalar (positive = down)
    pub speed: f32,
    pub bloom: BloomParams,
    /// Simple-variant reveal predicate (the phase FSM has the final say)
    pub reveal_active: bool,
    pub hint_visible: bool,
    pub actions_visible: bool,
}

impl MotionParams {
    /// Evaluate every envelope at remapped progress `t`
    pub fn from_progress(config: &RainConfig, t: f32) -> Self {
        Self {
            speed: speed_from_progress(config, t),
            bloom: bloom_from_progress(config, t),
            reveal_active: t > config.reveal_threshold,
            hint_visible: t <= config.hint_fade_point,
            actions_visible: t > config.actions_threshold,
        }
    }
}

/// Piecewise smoothstep-eased speed curve.
///
/// Zones: full fall, decelerate to a crawl, ease to a dead stop, then ease
/// into reverse. Continuous at every boundary; crosses zero exactly once, at
/// `flip_point`.
pub fn speed_from_progress(config: &RainConfig, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);

    if t < config.slow_start {
        return 1.0;
    }
    if t < config.stop_point {
        return lerp(
            1.0,
            config.crawl_speed,
            smoothstep(config.slow_start, config.stop_point, t),
        );
    }
    if t < config.flip_point {
        return lerp(
            config.crawl_speed,
            0.0,
            smoothstep(config.stop_point, config.flip_point, t),
        );
    }
    lerp(
        0.0,
        config.reverse_speed,
        smoothstep(config.flip_point, 1.0, t),
    )
}

/// Glow envelope: loose and bright at the top, tight and subtle at the bottom
pub fn bloom_from_progress(config: &RainConfig, t: f32) -> BloomParams {
    let tighten = smoothstep(config.glow_tighten_start, config.glow_tighten_end, t);
    BloomParams::mix(BloomParams::LOOSE, BloomParams::TIGHT, tighten)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_config() -> RainConfig {
        RainConfig {
            slow_start: 0.2,
            stop_point: 0.5,
            flip_point: 0.7,
            ..Default::default()
        }
    }

    #[test]
    fn test_continuity_at_zone_boundaries() {
        let config = scenario_config();
        let eps = 1e-4;
        for boundary in [config.slow_start, config.stop_point, config.flip_point] {
            let before = speed_from_progress(&config, boundary - eps);
            let after = speed_from_progress(&config, boundary + eps);
            assert!(
                (before - after).abs() < 1e-2,
                "jump at boundary {boundary}: {before} vs {after}"
            );
        }
    }

    #[test]
    fn test_single_sign_change_in_flip_zone() {
        let config = scenario_config();
        let mut sign_changes = 0;
        let mut prev = speed_from_progress(&config, 0.0);
        for i in 1..=1000 {
            let t = i as f32 / 1000.0;
            let s = speed_from_progress(&config, t);
            if prev > 0.0 && s < 0.0 {
                sign_changes += 1;
                assert!(t >= config.flip_point, "sign change before flip zone at t={t}");
            }
            assert!(s >= 0.0 || t >= config.flip_point);
            if s != 0.0 {
                prev = s;
            }
        }
        assert_eq!(sign_changes, 1);
    }

    #[test]
    fn test_scenario_speeds() {
        let config = scenario_config();
        assert!((speed_from_progress(&config, 0.1) - 1.0).abs() < 1e-6);
        assert!(speed_from_progress(&config, 0.5).abs() < 0.1);
        assert!(speed_from_progress(&config, 0.85) < 0.0);
        assert!((speed_from_progress(&config, 1.0) - config.reverse_speed).abs() < 1e-4);
    }

    #[test]
    fn test_reveal_and_hint_thresholds() {
        let config = scenario_config();
        let p = MotionParams::from_progress(&config, 1.0);
        assert!(p.reveal_active);
        assert!(!p.hint_visible);
        assert!(p.actions_visible);

        let p = MotionParams::from_progress(&config, 0.05);
        assert!(!p.reveal_active);
        assert!(p.hint_visible);
        assert!(!p.actions_visible);

        // Actions gate opens strictly after the reveal gate
        assert!(config.actions_threshold > config.reveal_threshold);
    }

    #[test]
    fn test_glow_tightens_monotonically() {
        let config = RainConfig::default();
        let mut prev = bloom_from_progress(&config, 0.0);
        assert_eq!(prev, BloomParams::LOOSE);
        for i in 1..=100 {
            let b = bloom_from_progress(&config, i as f32 / 100.0);
            assert!(b.strength <= prev.strength);
            assert!(b.radius <= prev.radius);
            assert!(b.threshold >= prev.threshold);
            prev = b;
        }
        assert_eq!(prev, BloomParams::TIGHT);
    }
}
