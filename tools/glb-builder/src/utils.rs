//! Utility functions for glTF/GLB construction

use anyhow::{Context, Result};
use gltf_json as json;

/// GLB chunk type for the JSON chunk ("JSON")
const CHUNK_JSON: u32 = 0x4E4F534A;
/// GLB chunk type for the binary chunk ("BIN\0")
const CHUNK_BIN: u32 = 0x004E4942;

/// Compute per-axis bounds for positions
pub fn compute_bounds(positions: &[[f32; 3]]) -> (Vec<f32>, Vec<f32>) {
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];

    for pos in positions {
        for i in 0..3 {
            min[i] = min[i].min(pos[i]);
            max[i] = max[i].max(pos[i]);
        }
    }

    (min.to_vec(), max.to_vec())
}

/// Compute bounds for a scalar stream
pub fn compute_scalar_bounds(scalars: &[f32]) -> (f32, f32) {
    let min = scalars.iter().copied().fold(f32::INFINITY, f32::min);
    let max = scalars.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    (min, max)
}

/// Align buffer to 4-byte boundary
pub fn align_buffer(buffer: &mut Vec<u8>) {
    while buffer.len() % 4 != 0 {
        buffer.push(0);
    }
}

/// Convert bounds into the JSON array form accessors store
pub fn bounds_value(values: &[f32]) -> json::Value {
    json::Value::Array(values.iter().map(|&v| json::Value::from(v as f64)).collect())
}

/// Assemble a GLB container
///
/// `bin` becomes the binary chunk. Pass `None` when every buffer is stored
/// externally and referenced by URI; only the JSON chunk is written then.
pub fn assemble_glb(root: &json::Root, bin: Option<&[u8]>) -> Result<Vec<u8>> {
    let json_string =
        json::serialize::to_string(root).context("Failed to serialize glTF JSON")?;
    let json_bytes = json_string.as_bytes();

    // Pad JSON to 4-byte alignment
    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let json_chunk_length = json_bytes.len() + json_padding;

    let buffer_padding = bin.map_or(0, |b| (4 - (b.len() % 4)) % 4);
    let buffer_chunk_length = bin.map_or(0, |b| b.len() + buffer_padding);
    let bin_chunk_total = if bin.is_some() { 8 + buffer_chunk_length } else { 0 };

    let total_length = 12 + 8 + json_chunk_length + bin_chunk_total;

    let mut glb = Vec::with_capacity(total_length);

    // GLB header
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes()); // version
    glb.extend_from_slice(&(total_length as u32).to_le_bytes());

    // JSON chunk
    glb.extend_from_slice(&(json_chunk_length as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    glb.extend_from_slice(json_bytes);
    glb.extend(std::iter::repeat_n(0x20, json_padding)); // Space for JSON padding

    if let Some(data) = bin {
        glb.extend_from_slice(&(buffer_chunk_length as u32).to_le_bytes());
        glb.extend_from_slice(&CHUNK_BIN.to_le_bytes());
        glb.extend_from_slice(data);
        glb.extend(std::iter::repeat_n(0, buffer_padding));
    }

    Ok(glb)
}
