//! WebGPU rendering module
//!
//! One instanced quad pipeline draws every visible glyph segment in a single
//! batch; the glyph identity is a per-instance atlas index, so per-glyph
//! sub-pools (and their skew overflow) never exist.

pub mod atlas;
pub mod glyph_pipeline;

pub use atlas::GlyphAtlas;
pub use glyph_pipeline::GlyphRenderState;
