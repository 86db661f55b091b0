//! threedb-export library
//!
//! Converts decoded 3DB models into glTF 2.0 scenes whose keyframes become
//! morph targets driven by weight animations.

pub mod assemble;
pub mod convert;
pub mod emit;
pub mod error;
pub mod manifest;
pub mod texture;
pub mod transform;
pub mod weights;

pub use assemble::{assemble, AssembleOptions, AssembledScene, SceneStats, GENERATOR};
pub use convert::{convert_file, model_name, ConversionReport, ExportOptions};
pub use emit::{emit, OutputFormat, TextureCopy};
pub use error::{AssembleError, EmitError, ExportError, TextureError};
pub use texture::{convert_texture, resolve_texture, resolve_texture_on_disk};
pub use transform::{to_gltf_space, MODEL_SCALE};
