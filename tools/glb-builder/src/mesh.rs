//! High-level mesh construction

use crate::buffer::{AccessorIndex, BufferBuilder, BufferIndex};

/// Accessor indices for a mesh
#[derive(Debug, Clone)]
pub struct MeshAccessors {
    pub positions: AccessorIndex,
    pub uvs: Option<AccessorIndex>,
    pub indices: Option<AccessorIndex>,
}

/// Buffers each mesh attribute is packed into
#[derive(Debug, Clone, Copy)]
pub struct MeshBuffers {
    pub positions: BufferIndex,
    pub uvs: BufferIndex,
    pub indices: BufferIndex,
}

/// Builder for mesh data
pub struct MeshBuilder {
    positions: Vec<[f32; 3]>,
    uvs: Option<Vec<[f32; 2]>>,
    indices: Option<Vec<u32>>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            uvs: None,
            indices: None,
        }
    }

    /// Set positions (required)
    pub fn positions(mut self, positions: &[[f32; 3]]) -> Self {
        self.positions = positions.to_vec();
        self
    }

    /// Set UVs (optional)
    pub fn uvs(mut self, uvs: &[[f32; 2]]) -> Self {
        self.uvs = Some(uvs.to_vec());
        self
    }

    /// Set indices (optional)
    pub fn indices(mut self, indices: &[u32]) -> Self {
        self.indices = Some(indices.to_vec());
        self
    }

    /// Build mesh and pack into buffers
    pub fn build(self, buffer: &mut BufferBuilder, buffers: &MeshBuffers) -> MeshAccessors {
        let positions = buffer.pack_positions(buffers.positions, &self.positions);
        let uvs = self.uvs.as_ref().map(|u| buffer.pack_vec2(buffers.uvs, u));
        let indices = self
            .indices
            .as_ref()
            .map(|i| buffer.pack_indices_u32(buffers.indices, i));

        MeshAccessors {
            positions,
            uvs,
            indices,
        }
    }
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_builder_packs_into_separate_buffers() {
        let mut buffer = BufferBuilder::new();
        let buffers = MeshBuffers {
            positions: buffer.add_buffer("v.bin", Some(12), None),
            uvs: buffer.add_buffer("uv.bin", Some(8), None),
            indices: buffer.add_buffer("i.bin", None, None),
        };

        let mesh = MeshBuilder::new()
            .positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]])
            .uvs(&[[0.0, 0.0], [1.0, 0.0], [0.5, 1.0]])
            .indices(&[0, 1, 2]);
        let accessors = mesh.build(&mut buffer, &buffers);

        assert_eq!(accessors.positions, AccessorIndex(0));
        assert_eq!(accessors.uvs, Some(AccessorIndex(1)));
        assert_eq!(accessors.indices, Some(AccessorIndex(2)));
        assert_eq!(buffer.data(buffers.positions).len(), 36);
        assert_eq!(buffer.data(buffers.uvs).len(), 24);
        assert_eq!(buffer.data(buffers.indices).len(), 12);
    }

    #[test]
    fn test_mesh_builder_positions_only() {
        let mut buffer = BufferBuilder::new();
        let b = buffer.add_buffer("all.bin", None, None);
        let buffers = MeshBuffers {
            positions: b,
            uvs: b,
            indices: b,
        };

        let accessors = MeshBuilder::new()
            .positions(&[[0.0; 3]])
            .build(&mut buffer, &buffers);
        assert!(accessors.uvs.is_none());
        assert!(accessors.indices.is_none());
    }
}
