//! Animation tuning and user preferences
//!
//! `RainConfig` holds the named numeric constants that shape the animation;
//! `Settings` holds user-facing preferences, persisted separately in
//! LocalStorage.

use serde::{Deserialize, Serialize};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Stream (column) count for this preset
    pub fn stream_count(&self) -> usize {
        match self {
            QualityPreset::Low => 64,
            QualityPreset::Medium => 160,
            QualityPreset::High => 280,
        }
    }

    /// Glyph segments per stream (tail length)
    pub fn stream_segments(&self) -> usize {
        match self {
            QualityPreset::Low => 12,
            QualityPreset::Medium => 22,
            QualityPreset::High => 28,
        }
    }
}

/// Named animation constants: scroll-zone boundaries, speeds, pool sizes.
///
/// All progress values are in [0, 1] after the scroll remap. The zone
/// ordering `slow_start <= stop_point <= flip_point` is assumed throughout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RainConfig {
    // === Scroll mapping ===
    /// Exponent for the progress remap (t^gamma). 1.0 = identity; > 1 makes
    /// the page feel longer near the top.
    pub gamma: f32,

    // === Speed curve zones ===
    /// End of the full-speed zone
    pub slow_start: f32,
    /// Progress at which the rain has decelerated to a crawl
    pub stop_point: f32,
    /// Progress at which the fall direction flips to upward
    pub flip_point: f32,
    /// Forward speed in the crawl zone
    pub crawl_speed: f32,
    /// Reverse speed reached at full scroll
    pub reverse_speed: f32,

    // === Overlay thresholds ===
    /// Progress past which the name/company overlay shows (simple variant)
    pub reveal_threshold: f32,
    /// Progress past which the scroll hint fades out
    pub hint_fade_point: f32,
    /// Progress past which the action buttons show (strictly after reveal)
    pub actions_threshold: f32,

    // === Glow envelope ===
    /// Progress where the bloom starts tightening
    pub glow_tighten_start: f32,
    /// Progress where the bloom is fully tightened
    pub glow_tighten_end: f32,

    // === Wipe state machine ===
    /// Progress that triggers the stream wipe
    pub wipe_trigger: f32,
    /// Near-bottom failsafe: guarantees the wipe even on a fast fling
    pub failsafe_point: f32,
    /// Scrolling back below this cancels the wipe/reveal
    pub reset_point: f32,
    /// Wipe length in wall-clock seconds (not scroll-linked)
    pub wipe_duration: f32,
    /// Speed override during the wipe (negative = upward rush)
    pub wipe_speed: f32,
    /// Glyph flicker probability per segment per frame during the wipe
    pub wipe_flicker_rate: f32,

    // === Particle field ===
    /// Number of streams (columns)
    pub stream_count: usize,
    /// Glyphs per stream (tail length, head included)
    pub stream_segments: usize,
    /// Vertical spacing between segments in a stream
    pub spacing: f32,
    /// Glyph flicker probability per segment per frame
    pub flicker_rate: f32,
    /// Overall world speed multiplier
    pub world_speed: f32,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            gamma: 1.0,

            slow_start: 0.12,
            stop_point: 0.35,
            flip_point: 0.55,
            crawl_speed: 0.08,
            reverse_speed: -1.3,

            reveal_threshold: 0.62,
            hint_fade_point: 0.12,
            actions_threshold: 0.8,

            glow_tighten_start: 0.25,
            glow_tighten_end: 0.75,

            wipe_trigger: 0.62,
            failsafe_point: 0.97,
            reset_point: 0.5,
            wipe_duration: 2.0,
            wipe_speed: -2.4,
            wipe_flicker_rate: 0.2,

            stream_count: 160,
            stream_segments: 22,
            spacing: 1.15,
            flicker_rate: 0.03,
            world_speed: crate::consts::WORLD_SPEED,
        }
    }
}

impl RainConfig {
    /// Total glyph instances the field can emit in one frame
    pub fn instance_capacity(&self) -> usize {
        self.stream_count * self.stream_segments
    }

    /// Apply a quality preset's pool sizes
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.stream_count = preset.stream_count();
        self.stream_segments = preset.stream_segments();
    }
}

/// User preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Additive glow rendering
    pub glow: bool,
    /// Reduced motion (skip the animation, jump to the reveal)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            glow: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective glow (respects reduced_motion)
    pub fn effective_glow(&self) -> bool {
        self.glow && !self.reduced_motion
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "glyph_rain_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
