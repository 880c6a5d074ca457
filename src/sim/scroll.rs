//! Scroll position to normalized progress
//!
//! Event handlers only cache raw pixel metrics here; the per-frame tick reads
//! the derived progress. Progress is clamped to [0, 1] regardless of rubber-
//! band overshoot, and a single-screen page (no scrollable height) reads as 0.

use serde::{Deserialize, Serialize};

/// Cached scroll metrics plus the configured progress remap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollSignal {
    scroll_px: f32,
    max_scroll_px: f32,
    /// Remap exponent: progress = raw^gamma. Clamped to >= 1 so the remap
    /// stays monotonic with f(0)=0, f(1)=1.
    gamma: f32,
}

impl ScrollSignal {
    pub fn new(gamma: f32) -> Self {
        Self {
            scroll_px: 0.0,
            max_scroll_px: 0.0,
            gamma: gamma.max(1.0),
        }
    }

    /// Cache the latest scroll metrics (called from the scroll handler and
    /// once per resize; plain scalar writes, no derived computation).
    pub fn set_metrics(&mut self, scroll_px: f32, max_scroll_px: f32) {
        self.scroll_px = scroll_px;
        self.max_scroll_px = max_scroll_px;
    }

    /// Normalized scroll position in [0, 1] before the remap
    pub fn raw_progress(&self) -> f32 {
        if self.max_scroll_px <= 0.0 {
            return 0.0;
        }
        (self.scroll_px / self.max_scroll_px.max(1.0)).clamp(0.0, 1.0)
    }

    /// Remapped progress in [0, 1] driving the animation
    pub fn progress(&self) -> f32 {
        self.raw_progress().powf(self.gamma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_clamped() {
        let mut s = ScrollSignal::new(1.0);
        s.set_metrics(500.0, 1000.0);
        assert!((s.progress() - 0.5).abs() < 1e-6);

        // Overshoot (rubber-banding) clamps
        s.set_metrics(1500.0, 1000.0);
        assert_eq!(s.progress(), 1.0);
        s.set_metrics(-50.0, 1000.0);
        assert_eq!(s.progress(), 0.0);
    }

    #[test]
    fn test_degenerate_page_reads_zero() {
        let mut s = ScrollSignal::new(1.0);
        s.set_metrics(120.0, 0.0);
        assert_eq!(s.progress(), 0.0);
        s.set_metrics(120.0, -30.0);
        assert_eq!(s.progress(), 0.0);
    }

    #[test]
    fn test_remap_endpoints_and_monotonic() {
        let mut s = ScrollSignal::new(2.2);
        s.set_metrics(0.0, 1000.0);
        assert_eq!(s.progress(), 0.0);
        s.set_metrics(1000.0, 1000.0);
        assert!((s.progress() - 1.0).abs() < 1e-6);

        let mut prev = 0.0;
        for i in 1..=100 {
            s.set_metrics(i as f32 * 10.0, 1000.0);
            let p = s.progress();
            assert!(p > prev, "remap must be strictly increasing");
            prev = p;
        }
    }

    #[test]
    fn test_gamma_below_one_clamped() {
        // gamma < 1 would invert the "page feels longer" effect; constructor
        // clamps it to identity.
        let mut s = ScrollSignal::new(0.5);
        s.set_metrics(250.0, 1000.0);
        assert!((s.progress() - 0.25).abs() < 1e-6);
    }
}
