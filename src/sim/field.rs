//! Fixed-pool glyph stream field
//!
//! A stream is one falling column: a head position plus a trail of glyph
//! segments at fixed spacing behind it. Streams are allocated once and
//! recycled across the vertical bounds, never destroyed. All randomness comes
//! from a seeded PCG so a given seed replays identically.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::lerp;
use crate::settings::RainConfig;

/// One glyph column
#[derive(Debug, Clone)]
pub struct Stream {
    pub x: f32,
    pub z: f32,
    pub head_y: f32,
    /// Per-stream speed multiplier
    pub speed_mult: f32,
    pub scale: f32,
    /// Slight Y rotation so columns don't read as a flat wall
    pub rot_y: f32,
}

/// One renderable glyph quad, ready for the instance buffer
#[derive(Debug, Clone, Copy)]
pub struct GlyphInstance {
    pub position: Vec3,
    pub scale: f32,
    pub rot_y: f32,
    /// Linear RGB, brightness premultiplied
    pub color: [f32; 3],
    /// Index into the glyph atlas
    pub glyph: u32,
}

/// Fixed-size pool of streams plus per-segment glyph bits
#[derive(Debug, Clone)]
pub struct ParticleField {
    streams: Vec<Stream>,
    /// Current glyph bit per segment, row-major [stream][segment]
    bits: Vec<u8>,
    segments: usize,
    spacing: f32,
    world_speed: f32,
    rng: Pcg32,
}

impl ParticleField {
    pub fn new(config: &RainConfig, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);

        let streams = (0..config.stream_count)
            .map(|_| Stream {
                x: rng.random_range(-BOUNDS_X..BOUNDS_X),
                z: rng.random_range(-BOUNDS_Z..BOUNDS_Z),
                head_y: rng.random_range(Y_BOTTOM..Y_TOP),
                speed_mult: rng.random_range(SPEED_MULT_MIN..SPEED_MULT_MAX),
                scale: rng.random_range(0.38..0.85),
                rot_y: rng.random_range(-0.15..0.15),
            })
            .collect();

        let bits = (0..config.stream_count * config.stream_segments)
            .map(|_| if rng.random::<f32>() < 0.5 { 0 } else { 1 })
            .collect();

        Self {
            streams,
            bits,
            segments: config.stream_segments,
            spacing: config.spacing,
            world_speed: config.world_speed,
            rng,
        }
    }

    /// Number of streams (constant for the lifetime of the field)
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    /// Vertical extent of one full trail
    pub fn tail_span(&self) -> f32 {
        self.segments as f32 * self.spacing
    }

    /// Heads always stay within the spawn bounds plus this margin
    pub fn overflow_margin(&self) -> f32 {
        // tail span (recycle waits for the whole trail to exit) + re-entry
        // jitter + the largest single-tick step at MAX_DT
        self.tail_span() + RECYCLE_JITTER + MAX_DT * self.world_speed * SPEED_MULT_MAX * MAX_ABS_SPEED
    }

    /// Advance all stream heads by one tick.
    ///
    /// A head that exits the trailing bound is recycled to the opposite bound
    /// with random jitter. At exactly zero speed nothing moves and nothing
    /// recycles; the stall is the intended visual.
    pub fn advance(&mut self, dt: f32, speed: f32, flicker_rate: f32) {
        // Glyphs keep flickering even while stalled
        self.flicker(flicker_rate);

        if speed == 0.0 {
            return;
        }

        let tail = self.tail_span();
        for stream in &mut self.streams {
            stream.head_y -= dt * self.world_speed * stream.speed_mult * speed;

            if speed >= 0.0 {
                // Falling: recycle below the bottom once the whole trail is out
                if stream.head_y < Y_BOTTOM - tail {
                    stream.head_y = Y_TOP + self.rng.random_range(0.0..RECYCLE_JITTER);
                }
            } else {
                // Rising: recycle above the top
                if stream.head_y > Y_TOP + tail {
                    stream.head_y = Y_BOTTOM - self.rng.random_range(0.0..RECYCLE_JITTER);
                }
            }
        }
    }

    /// Flip each segment's glyph with independent per-frame probability
    fn flicker(&mut self, rate: f32) {
        if rate <= 0.0 {
            return;
        }
        for bit in &mut self.bits {
            if self.rng.random::<f32>() < rate {
                *bit ^= 1;
            }
        }
    }

    /// Re-randomize all stream positions within the spawn bounds (reset
    /// transition back to free fall).
    pub fn scatter(&mut self) {
        for stream in &mut self.streams {
            stream.x = self.rng.random_range(-BOUNDS_X..BOUNDS_X);
            stream.z = self.rng.random_range(-BOUNDS_Z..BOUNDS_Z);
            stream.head_y = self.rng.random_range(Y_BOTTOM..Y_TOP);
        }
    }

    /// Rebuild the visible instance set for this frame.
    ///
    /// Segments outside the vertical cull margin are skipped. `out` is a
    /// fixed-capacity buffer; once full, further segments are silently
    /// dropped for the frame (explicit overflow policy).
    pub fn emit(&self, out: &mut Vec<GlyphInstance>) {
        out.clear();
        let cap = out.capacity();
        let tail_denom = (self.segments.saturating_sub(1)).max(1) as f32;

        for (s, stream) in self.streams.iter().enumerate() {
            for seg in 0..self.segments {
                let y = stream.head_y - seg as f32 * self.spacing;
                if !(Y_BOTTOM - CULL_MARGIN..=Y_TOP + CULL_MARGIN).contains(&y) {
                    continue;
                }
                if out.len() >= cap {
                    return;
                }

                let (brightness, tint) = if seg == 0 {
                    // Head: extra bright, near-neutral so it reads white-hot
                    (HEAD_BRIGHTNESS, [0.82, 1.0, 0.88])
                } else {
                    // Tail: fast fade then a long dim green run
                    let t = seg as f32 / tail_denom;
                    (lerp(1.0, TAIL_FLOOR, t * t), [0.25, 1.0, 0.45])
                };

                out.push(GlyphInstance {
                    position: Vec3::new(stream.x, y, stream.z),
                    scale: stream.scale,
                    rot_y: stream.rot_y,
                    color: [
                        tint[0] * brightness,
                        tint[1] * brightness,
                        tint[2] * brightness,
                    ],
                    glyph: u32::from(self.bits[s * self.segments + seg]),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> RainConfig {
        RainConfig {
            stream_count: 50,
            stream_segments: 8,
            ..Default::default()
        }
    }

    #[test]
    fn test_pool_size_invariant() {
        let config = small_config();
        let mut field = ParticleField::new(&config, 7);
        assert_eq!(field.len(), 50);
        for _ in 0..500 {
            field.advance(MAX_DT, 1.0, 0.05);
        }
        for _ in 0..500 {
            field.advance(MAX_DT, -1.3, 0.05);
        }
        assert_eq!(field.len(), 50);
    }

    #[test]
    fn test_heads_stay_within_margin() {
        let config = small_config();
        let mut field = ParticleField::new(&config, 99);
        let margin = field.overflow_margin();

        let speeds = [1.0, 0.08, 0.0, -0.5, -1.3, 1.0, -2.4];
        for (i, speed) in speeds.iter().cycle().take(2000).enumerate() {
            let dt = if i % 3 == 0 { 0.008 } else { MAX_DT };
            field.advance(dt, *speed, 0.0);
            for stream in field.streams() {
                assert!(
                    stream.head_y >= Y_BOTTOM - margin && stream.head_y <= Y_TOP + margin,
                    "head {} escaped margin at step {i}",
                    stream.head_y
                );
            }
        }
    }

    #[test]
    fn test_zero_speed_holds_positions() {
        let config = small_config();
        let mut field = ParticleField::new(&config, 3);
        let before: Vec<f32> = field.streams().iter().map(|s| s.head_y).collect();
        for _ in 0..100 {
            field.advance(MAX_DT, 0.0, 0.5);
        }
        let after: Vec<f32> = field.streams().iter().map(|s| s.head_y).collect();
        assert_eq!(before, after, "stall must not move or recycle streams");
    }

    #[test]
    fn test_seeded_determinism() {
        let config = small_config();
        let mut a = ParticleField::new(&config, 42);
        let mut b = ParticleField::new(&config, 42);
        for _ in 0..200 {
            a.advance(MAX_DT, 0.7, 0.1);
            b.advance(MAX_DT, 0.7, 0.1);
        }
        let ya: Vec<f32> = a.streams().iter().map(|s| s.head_y).collect();
        let yb: Vec<f32> = b.streams().iter().map(|s| s.head_y).collect();
        assert_eq!(ya, yb);

        let mut ia = Vec::with_capacity(config.instance_capacity());
        let mut ib = Vec::with_capacity(config.instance_capacity());
        a.emit(&mut ia);
        b.emit(&mut ib);
        assert_eq!(ia.len(), ib.len());
    }

    #[test]
    fn test_emit_respects_capacity() {
        let config = small_config();
        let field = ParticleField::new(&config, 11);

        let mut tiny = Vec::with_capacity(10);
        field.emit(&mut tiny);
        assert!(tiny.len() <= 10, "overflow must be dropped, not grown");

        let mut full = Vec::with_capacity(config.instance_capacity());
        field.emit(&mut full);
        assert!(full.len() <= config.instance_capacity());
        assert!(!full.is_empty());
    }

    #[test]
    fn test_emit_culls_out_of_bounds_segments() {
        let config = small_config();
        let field = ParticleField::new(&config, 5);
        let mut out = Vec::with_capacity(config.instance_capacity());
        field.emit(&mut out);
        for inst in &out {
            assert!(inst.position.y >= Y_BOTTOM - CULL_MARGIN);
            assert!(inst.position.y <= Y_TOP + CULL_MARGIN);
        }
    }

    #[test]
    fn test_head_brighter_than_tail() {
        let config = small_config();
        let field = ParticleField::new(&config, 5);
        let mut out = Vec::with_capacity(config.instance_capacity());
        field.emit(&mut out);

        // Find a head and its first tail segment from the same stream
        let head = out
            .iter()
            .find(|i| i.color[1] > 1.0)
            .expect("some head should be visible");
        let tail_max = out
            .iter()
            .filter(|i| i.color[1] <= 1.0)
            .map(|i| i.color[1])
            .fold(0.0_f32, f32::max);
        assert!(head.color[1] > tail_max);
    }

    #[test]
    fn test_speed_budget_covers_spawn_and_tuning() {
        let config = small_config();
        let field = ParticleField::new(&config, 21);
        for stream in field.streams() {
            assert!(stream.speed_mult >= SPEED_MULT_MIN);
            assert!(stream.speed_mult < SPEED_MULT_MAX);
        }
        // The overflow margin assumes no phase ever commands more than
        // MAX_ABS_SPEED; wipe_speed is the fastest override
        assert!(config.wipe_speed.abs() <= MAX_ABS_SPEED);
        assert!(config.reverse_speed.abs() <= MAX_ABS_SPEED);
    }

    #[test]
    fn test_scatter_stays_in_bounds() {
        let config = small_config();
        let mut field = ParticleField::new(&config, 8);
        for _ in 0..300 {
            field.advance(MAX_DT, -1.3, 0.0);
        }
        field.scatter();
        for stream in field.streams() {
            assert!(stream.head_y >= Y_BOTTOM && stream.head_y <= Y_TOP);
            assert!(stream.x >= -BOUNDS_X && stream.x <= BOUNDS_X);
            assert!(stream.z >= -BOUNDS_Z && stream.z <= BOUNDS_Z);
        }
    }
}
