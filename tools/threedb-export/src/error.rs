//! Error types for each export stage

use std::path::PathBuf;

use thiserror::Error;
use threedb::DecodeError;

/// Inconsistent model data found while building the scene
#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("keyframe {keyframe} has no mesh slot {slot} (base keyframe has {expected})")]
    MissingMeshSlot {
        keyframe: u32,
        slot: usize,
        expected: usize,
    },

    #[error(
        "mesh slot {slot} of keyframe {keyframe} has {actual} vertices, base geometry has {expected}"
    )]
    VertexCountMismatch {
        keyframe: u32,
        slot: usize,
        expected: usize,
        actual: usize,
    },

    #[error(
        "mesh slot {slot} has {positions} positions but {texture_coordinates} texture coordinates"
    )]
    AttributeCountMismatch {
        slot: usize,
        positions: usize,
        texture_coordinates: usize,
    },

    #[error("triangle index {index} in mesh slot {slot} exceeds vertex count {vertex_count}")]
    TriangleIndexOutOfRange {
        slot: usize,
        index: u16,
        vertex_count: usize,
    },

    #[error("invalid frame rate {rate} (must be finite and at least {min})")]
    InvalidFrameRate { rate: f32, min: f32 },

    #[error(transparent)]
    Pool(#[from] DecodeError),
}

/// Failure converting a source texture
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("failed to read texture {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to encode texture {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write texture {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure writing the document or its companion files
#[derive(Error, Debug)]
pub enum EmitError {
    #[error("failed to write {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize glTF document")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to assemble GLB container: {0:#}")]
    Glb(anyhow::Error),

    #[error(transparent)]
    Texture(#[from] TextureError),
}

/// Failure converting one model
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to decode {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    #[error("failed to assemble scene for {path}")]
    Assemble {
        path: PathBuf,
        #[source]
        source: AssembleError,
    },

    #[error("failed to emit output for {path}")]
    Emit {
        path: PathBuf,
        #[source]
        source: EmitError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_error_display() {
        let err = AssembleError::VertexCountMismatch {
            keyframe: 3,
            slot: 1,
            expected: 8,
            actual: 6,
        };
        assert_eq!(
            err.to_string(),
            "mesh slot 1 of keyframe 3 has 6 vertices, base geometry has 8"
        );
    }

    #[test]
    fn test_pool_error_is_transparent() {
        let err: AssembleError = DecodeError::IndexOutOfRange {
            field: "vertices",
            index: 4,
            len: 1,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "vertices index 4 is out of range (table has 1 entries)"
        );
    }
}
