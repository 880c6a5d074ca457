//! Pre-rasterized glyph atlas
//!
//! The rain only ever shows the digits 0 and 1. Both are rasterized once at
//! startup from a small embedded bitmap font into a two-tile atlas with a
//! soft halo baked in (the additive blend turns the halo into glow). The
//! atlas is immutable after upload; instances pick a tile by index.

/// Pixel size of one glyph tile
pub const GLYPH_PX: u32 = 64;
/// Number of glyph tiles in the atlas
pub const GLYPH_COUNT: u32 = 2;

/// 5x7 bitmap rows, 5 least-significant bits used, MSB-left
const FONT_W: usize = 5;
const FONT_H: usize = 7;
const DIGITS: [[u8; FONT_H]; GLYPH_COUNT as usize] = [
    // '0'
    [
        0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110,
    ],
    // '1'
    [
        0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110,
    ],
];

/// CPU-side atlas image, RGBA8, tiles laid out horizontally
pub struct GlyphAtlas {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl GlyphAtlas {
    /// Rasterize all tiles. Intensity is stored in every channel so the
    /// shader can tint per instance.
    pub fn generate() -> Self {
        let width = GLYPH_PX * GLYPH_COUNT;
        let height = GLYPH_PX;
        let mut pixels = vec![0u8; (width * height * 4) as usize];

        for (tile, rows) in DIGITS.iter().enumerate() {
            let x0 = tile as u32 * GLYPH_PX;
            for py in 0..GLYPH_PX {
                for px in 0..GLYPH_PX {
                    let v = sample_glyph(rows, px, py);
                    let idx = (((py * width) + x0 + px) * 4) as usize;
                    let byte = (v.clamp(0.0, 1.0) * 255.0) as u8;
                    pixels[idx] = byte;
                    pixels[idx + 1] = byte;
                    pixels[idx + 2] = byte;
                    pixels[idx + 3] = byte;
                }
            }
        }

        Self {
            pixels,
            width,
            height,
        }
    }
}

/// Intensity at one tile pixel: full inside a font cell, exponential halo
/// falloff outside (distance measured in font-cell units)
fn sample_glyph(rows: &[u8; FONT_H], px: u32, py: u32) -> f32 {
    // Map the tile pixel into font-cell space with a margin so the halo has
    // room to fade out
    let margin = 0.18;
    let fx = (px as f32 / GLYPH_PX as f32 - margin) / (1.0 - 2.0 * margin) * FONT_W as f32;
    let fy = (py as f32 / GLYPH_PX as f32 - margin) / (1.0 - 2.0 * margin) * FONT_H as f32;

    let mut min_d2 = f32::MAX;
    for (cy, row) in rows.iter().enumerate() {
        for cx in 0..FONT_W {
            if (row >> (FONT_W - 1 - cx)) & 1 == 0 {
                continue;
            }
            let dx = fx - (cx as f32 + 0.5);
            let dy = fy - (cy as f32 + 0.5);
            min_d2 = min_d2.min(dx * dx + dy * dy);
        }
    }

    let d = min_d2.sqrt();
    if d < 0.55 {
        1.0
    } else {
        // Halo: bright core ring fading over roughly two cells
        (0.5 * (-(d - 0.55) * 1.9).exp()).max(0.0)
    }
}
