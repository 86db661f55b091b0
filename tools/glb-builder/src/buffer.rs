//! Binary buffer packing with accessor creation
//!
//! A [`BufferBuilder`] owns several named buffers that grow by appending.
//! Accessors record the byte offset into their buffer; buffer views are only
//! created by [`BufferBuilder::finish`], once every length is final.

use crate::utils::{align_buffer, bounds_value, compute_bounds, compute_scalar_bounds};
use gltf_json as json;
use gltf_json::validation::Checked::Valid;

/// Accessor index returned by buffer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessorIndex(pub u32);

impl AccessorIndex {
    pub fn as_json_index(&self) -> json::Index<json::Accessor> {
        json::Index::new(self.0)
    }
}

/// Handle to one of the builder's buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferIndex(pub u32);

struct BinaryBuffer {
    uri: String,
    data: Vec<u8>,
    byte_stride: Option<usize>,
    target: Option<json::buffer::Target>,
}

struct PendingAccessor {
    buffer: BufferIndex,
    byte_offset: usize,
    count: usize,
    component_type: json::accessor::ComponentType,
    type_: json::accessor::Type,
    min: Option<json::Value>,
    max: Option<json::Value>,
}

/// A finished buffer and the URI it is written to
#[derive(Debug, Clone, PartialEq)]
pub struct BufferBlob {
    pub uri: String,
    pub data: Vec<u8>,
}

/// Output of [`BufferBuilder::finish`]
pub struct PackedBuffers {
    pub buffers: Vec<json::Buffer>,
    pub views: Vec<json::buffer::View>,
    pub accessors: Vec<json::Accessor>,
    /// Every buffer's bytes, empty ones included
    pub blobs: Vec<BufferBlob>,
}

/// Builder for a set of growing binary buffers
pub struct BufferBuilder {
    buffers: Vec<BinaryBuffer>,
    accessors: Vec<PendingAccessor>,
}

impl BufferBuilder {
    /// Create a builder with no buffers
    pub fn new() -> Self {
        Self {
            buffers: Vec::new(),
            accessors: Vec::new(),
        }
    }

    /// Register a buffer written to `uri`
    ///
    /// `byte_stride` and `target` are copied onto the buffer view.
    pub fn add_buffer(
        &mut self,
        uri: impl Into<String>,
        byte_stride: Option<usize>,
        target: Option<json::buffer::Target>,
    ) -> BufferIndex {
        self.buffers.push(BinaryBuffer {
            uri: uri.into(),
            data: Vec::new(),
            byte_stride,
            target,
        });
        BufferIndex(self.buffers.len() as u32 - 1)
    }

    /// Get the current accessor count
    pub fn accessor_count(&self) -> u32 {
        self.accessors.len() as u32
    }

    /// Get next accessor index (without creating it)
    pub fn next_accessor_index(&self) -> AccessorIndex {
        AccessorIndex(self.accessor_count())
    }

    /// Bytes written to a buffer so far
    pub fn data(&self, buffer: BufferIndex) -> &[u8] {
        &self.buffers[buffer.0 as usize].data
    }

    /// Byte offset and count recorded for an accessor
    #[cfg(test)]
    pub(crate) fn accessor_range(&self, accessor: AccessorIndex) -> (usize, usize) {
        let a = &self.accessors[accessor.0 as usize];
        (a.byte_offset, a.count)
    }

    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        buffer: BufferIndex,
        bytes: &[u8],
        count: usize,
        component_type: json::accessor::ComponentType,
        type_: json::accessor::Type,
        min: Option<json::Value>,
        max: Option<json::Value>,
    ) -> AccessorIndex {
        let data = &mut self.buffers[buffer.0 as usize].data;
        align_buffer(data);
        let byte_offset = data.len();
        data.extend_from_slice(bytes);

        let accessor_idx = self.next_accessor_index();
        self.accessors.push(PendingAccessor {
            buffer,
            byte_offset,
            count,
            component_type,
            type_,
            min,
            max,
        });
        accessor_idx
    }

    /// Pack Vec3 positions with bounds calculation
    pub fn pack_positions(&mut self, buffer: BufferIndex, positions: &[[f32; 3]]) -> AccessorIndex {
        let (min, max) = compute_bounds(positions);
        self.push(
            buffer,
            bytemuck::cast_slice(positions),
            positions.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec3,
            Some(bounds_value(&min)),
            Some(bounds_value(&max)),
        )
    }

    /// Pack Vec2 data (UVs, etc.)
    pub fn pack_vec2(&mut self, buffer: BufferIndex, data: &[[f32; 2]]) -> AccessorIndex {
        self.push(
            buffer,
            bytemuck::cast_slice(data),
            data.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec2,
            None,
            None,
        )
    }

    /// Pack u32 indices
    pub fn pack_indices_u32(&mut self, buffer: BufferIndex, indices: &[u32]) -> AccessorIndex {
        let bytes: Vec<u8> = indices.iter().flat_map(|i| i.to_le_bytes()).collect();
        self.push(
            buffer,
            &bytes,
            indices.len(),
            json::accessor::ComponentType::U32,
            json::accessor::Type::Scalar,
            None,
            None,
        )
    }

    /// Pack scalar f32 data with min/max (animation times, etc.)
    pub fn pack_scalars_with_bounds(&mut self, buffer: BufferIndex, scalars: &[f32]) -> AccessorIndex {
        let (min, max) = compute_scalar_bounds(scalars);
        self.push(
            buffer,
            bytemuck::cast_slice(scalars),
            scalars.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Scalar,
            Some(bounds_value(&[min])),
            Some(bounds_value(&[max])),
        )
    }

    /// Pack scalar f32 data (morph target weights, etc.)
    pub fn pack_scalars(&mut self, buffer: BufferIndex, scalars: &[f32]) -> AccessorIndex {
        self.push(
            buffer,
            bytemuck::cast_slice(scalars),
            scalars.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Scalar,
            None,
            None,
        )
    }

    /// Freeze every buffer and produce buffers, views and accessors
    ///
    /// Each non-empty buffer gets exactly one view covering all of it. Empty
    /// buffers are left out of the document (glTF requires a non-zero
    /// `byteLength`) but still appear in `blobs`.
    pub fn finish(self) -> PackedBuffers {
        let mut buffers = Vec::new();
        let mut views = Vec::new();
        let mut view_of_buffer = Vec::with_capacity(self.buffers.len());

        for b in &self.buffers {
            if b.data.is_empty() {
                view_of_buffer.push(None);
                continue;
            }

            let buffer_idx = buffers.len() as u32;
            buffers.push(json::Buffer {
                byte_length: b.data.len().into(),
                extensions: Default::default(),
                extras: Default::default(),
                name: None,
                uri: Some(b.uri.clone()),
            });

            view_of_buffer.push(Some(views.len() as u32));
            views.push(json::buffer::View {
                buffer: json::Index::new(buffer_idx),
                byte_length: b.data.len().into(),
                byte_offset: Some(0u64.into()),
                byte_stride: b.byte_stride.map(json::buffer::Stride),
                extensions: Default::default(),
                extras: Default::default(),
                name: None,
                target: b.target.map(Valid),
            });
        }

        let accessors = self
            .accessors
            .into_iter()
            .map(|a| json::Accessor {
                buffer_view: view_of_buffer[a.buffer.0 as usize].map(json::Index::new),
                byte_offset: Some((a.byte_offset as u64).into()),
                count: a.count.into(),
                component_type: Valid(json::accessor::GenericComponentType(a.component_type)),
                extensions: Default::default(),
                extras: Default::default(),
                type_: Valid(a.type_),
                min: a.min,
                max: a.max,
                name: None,
                normalized: false,
                sparse: None,
            })
            .collect();

        let blobs = self
            .buffers
            .into_iter()
            .map(|b| BufferBlob {
                uri: b.uri,
                data: b.data,
            })
            .collect();

        PackedBuffers {
            buffers,
            views,
            accessors,
            blobs,
        }
    }
}

impl Default for BufferBuilder {
    fn default() -> Self {
        Self::new()
    }
}
