//! glTF/GLB document construction
//!
//! Builder-pattern APIs for assembling glTF 2.0 documents whose binary data
//! lives in one or more external `.bin` files:
//! - BufferBuilder: Pack binary data into named buffers with automatic alignment
//! - MeshBuilder: High-level mesh construction
//! - WeightAnimationBuilder: Morph target weight tracks
//! - GltfBuilder: Top-level GLTF document construction
//!
//! # Example
//!
//! ```no_run
//! use glb_builder::*;
//!
//! let mut buffer = BufferBuilder::new();
//! let b = buffer.add_buffer("triangle.bin", None, None);
//! let buffers = MeshBuffers { positions: b, uvs: b, indices: b };
//! let mesh = MeshBuilder::new()
//!     .positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]])
//!     .indices(&[0, 1, 2])
//!     .build(&mut buffer, &buffers);
//!
//! let mut gltf = GltfBuilder::new();
//! let mesh_idx = gltf.add_mesh("Triangle", &mesh, None);
//! let node = gltf.add_node("Triangle", Some(mesh_idx));
//! gltf.add_scene("Scene", &[node]);
//!
//! // Build final document; blobs are written next to it by the caller
//! let packed = buffer.finish();
//! let root = gltf.build(&packed, "glb-builder");
//! let glb_bytes = assemble_glb(&root, None).unwrap();
//! ```

pub mod animation;
pub mod buffer;
pub mod document;
pub mod mesh;
pub mod utils;

pub use animation::{WeightAccessors, WeightAnimationBuilder};
pub use buffer::{AccessorIndex, BufferBlob, BufferBuilder, BufferIndex, PackedBuffers};
pub use document::GltfBuilder;
pub use mesh::{MeshAccessors, MeshBuffers, MeshBuilder};
pub use utils::{align_buffer, assemble_glb, compute_bounds};

// Re-export commonly used gltf-json types
pub use gltf_json as json;
pub use gltf_json::validation::Checked::Valid;
