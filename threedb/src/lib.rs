//! threedb: decoder for the legacy 3DB keyframed model format
//!
//! A 3DB file stores a model as a list of keyframes. Each keyframe links every
//! mesh slot to entries in four shared data pools (triangles, texture
//! coordinates, vertices, brightness). Pools are stored once and referenced
//! by index, so several keyframes can reuse the same vertex set.
//!
//! # File Layout
//!
//! ```text
//! string   db version
//! string   model name
//! u16      material count     { string name, string texture path, u32 tag }
//! u32      keyframe count     { u16 link count, 6×u16 per link,
//!                               2×vec3, 0x80 + 2 + 0x30 + 2 bytes padding }
//! u16      object count       { string name, u16 count, u32 animation indices }
//! u16      animation count    { string name, u16 count, u32 keyframe indices,
//!                               u16, f32, string, 2×vec3 (unused) }
//! u16      shadow count       { 32×32 bytes }
//! u16      cubemap count      { u16 w, u16 h, 2×u16, w×h bytes }
//! 4×u16    pool sizes (triangles, texcoords, vertices, brightness)
//! u32      unknown record count
//! 4 tables of u16 per-record element counts
//! unknown records (20 bytes each)
//! pools: u16 indices | (f32, f32) | 3×u16 fixed point | u8
//! ```
//!
//! Strings are a `u32` length followed by that many raw bytes. Everything is
//! little-endian.
//!
//! # Usage
//!
//! ```ignore
//! let data = std::fs::read("ringe.3db")?;
//! let model = threedb::decode(&data)?;
//! for object in &model.objects {
//!     println!("{}: {} animations", object.name, object.animations.len());
//! }
//! ```

mod cursor;
mod decoder;
mod error;
mod model;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixture;

pub use cursor::ByteCursor;
pub use decoder::{decode, decode_file};
pub use error::DecodeError;
pub use model::{
    Animation, Keyframe, KeyframeMesh, Material, Model, ModelObject, ModelSummary,
};

pub use glam::{Vec2, Vec3};

// =============================================================================
// Constants
// =============================================================================

/// Divisor that maps a fixed-point vertex component onto `[0, 1]`
pub const VERTEX_FIXED_POINT_MAX: f32 = 0xFFFF as f32;

/// Size of one shadow block (32×32 bytes)
pub const SHADOW_BLOCK_SIZE: usize = 32 * 32;

/// Size of one unknown record in the pool header
pub const UNKNOWN_RECORD_SIZE: usize = 20;

/// Padding windows trailing every keyframe, skipped in this order
///
/// The two 2-byte windows are separate regions and are skipped separately.
pub const KEYFRAME_PADDING: [usize; 4] = [0x80, 2, 0x30, 2];
