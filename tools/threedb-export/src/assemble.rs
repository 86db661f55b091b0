//! Scene assembly: 3DB keyframes to glTF nodes, morph targets and weight animations
//!
//! Every object becomes a root node. The non-empty mesh slots of the object's
//! base keyframe become child nodes with one mesh each, and every keyframe of every
//! animation the object plays is appended to those meshes as a position-delta
//! morph target. Each animation then drives its own targets to full weight one
//! keyframe at a time.

use std::collections::HashMap;

use glam::Vec3;
use glb_builder::json;
use glb_builder::{
    AccessorIndex, BufferBlob, BufferBuilder, BufferIndex, GltfBuilder, MeshBuffers, MeshBuilder,
    WeightAnimationBuilder,
};
use threedb::{Model, ModelObject};

use crate::error::AssembleError;
use crate::transform::{to_gltf_space, MODEL_SCALE};
use crate::weights::{
    is_valid_frame_rate, keyframe_times, one_hot_weights, DEFAULT_FRAME_RATE, MIN_FRAME_RATE,
};

/// Value written to `asset.generator`
pub const GENERATOR: &str = concat!("threedb-export ", env!("CARGO_PKG_VERSION"));

/// Assembly settings
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Prefix of the companion buffer files (`<name>_vertices.bin`, ...)
    pub name: String,
    /// Keyframes per second
    pub frame_rate: f32,
    pub scale: f32,
}

impl AssembleOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frame_rate: DEFAULT_FRAME_RATE,
            scale: MODEL_SCALE,
        }
    }
}

/// Counts describing an assembled scene
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub nodes: usize,
    pub meshes: usize,
    pub morph_targets: usize,
    pub animations: usize,
}

/// A finished document and the companion buffers it references
pub struct AssembledScene {
    pub root: json::Root,
    /// Vertices, UVs, indices, animation input and animation output, in that order
    pub blobs: Vec<BufferBlob>,
    pub stats: SceneStats,
}

/// The five companion buffers of a model
#[derive(Debug, Clone, Copy)]
struct ModelBuffers {
    vertices: BufferIndex,
    uvs: BufferIndex,
    indices: BufferIndex,
    animation_input: BufferIndex,
    animation_output: BufferIndex,
}

impl ModelBuffers {
    fn new(buffer: &mut BufferBuilder, name: &str) -> Self {
        use json::buffer::Target;

        Self {
            vertices: buffer.add_buffer(
                format!("{name}_vertices.bin"),
                Some(12),
                Some(Target::ArrayBuffer),
            ),
            uvs: buffer.add_buffer(format!("{name}_uvs.bin"), Some(8), Some(Target::ArrayBuffer)),
            indices: buffer.add_buffer(
                format!("{name}_indices.bin"),
                None,
                Some(Target::ElementArrayBuffer),
            ),
            animation_input: buffer.add_buffer(format!("{name}_ain.bin"), None, None),
            animation_output: buffer.add_buffer(format!("{name}_aout.bin"), None, None),
        }
    }

    fn mesh(&self) -> MeshBuffers {
        MeshBuffers {
            positions: self.vertices,
            uvs: self.uvs,
            indices: self.indices,
        }
    }
}

/// Base geometry of one mesh slot
struct SlotMesh {
    /// Position of the slot in every keyframe's mesh list
    slot: usize,
    node: u32,
    mesh: json::Index<json::Mesh>,
    /// Base positions, already in glTF space
    base: Vec<Vec3>,
    /// Delta accessors already packed, by vertex pool index
    targets: HashMap<u16, AccessorIndex>,
}

/// One animation's share of an object's morph targets
struct WeightTrack {
    name: String,
    keyframe_count: usize,
    offset: usize,
}

/// Build the glTF document for a decoded model
///
/// `material_images[i]` is the image URI for 3DB material `i`, or `None`
/// when no texture was found; primitives using such a material get no
/// material at all.
pub fn assemble(
    model: &Model,
    options: &AssembleOptions,
    material_images: &[Option<String>],
) -> Result<AssembledScene, AssembleError> {
    if !is_valid_frame_rate(options.frame_rate) {
        return Err(AssembleError::InvalidFrameRate {
            rate: options.frame_rate,
            min: MIN_FRAME_RATE,
        });
    }

    let mut buffer = BufferBuilder::new();
    let buffers = ModelBuffers::new(&mut buffer, &options.name);
    let mut gltf = GltfBuilder::new();
    let mut stats = SceneStats::default();

    let materials: Vec<Option<json::Index<json::Material>>> = model
        .materials
        .iter()
        .enumerate()
        .map(|(i, material)| {
            material_images
                .get(i)
                .and_then(Option::as_deref)
                .map(|uri| gltf.add_textured_material(&material.name, uri))
        })
        .collect();

    let mut roots = Vec::with_capacity(model.objects.len());
    for object in &model.objects {
        let root = gltf.add_node(&object.name, None);
        roots.push(root);

        if model.keyframes.is_empty() {
            continue;
        }

        let mut slots = build_base_meshes(
            model,
            object,
            options,
            &materials,
            &buffers,
            &mut buffer,
            &mut gltf,
        )?;
        for slot in &slots {
            gltf.add_child(root, slot.node);
        }
        stats.meshes += slots.len();

        let tracks = build_morph_targets(
            model,
            object,
            options,
            &buffers,
            &mut slots,
            &mut buffer,
            &mut gltf,
        )?;
        let total_targets = tracks.iter().map(|t| t.keyframe_count).sum::<usize>();
        stats.morph_targets += slots
            .iter()
            .map(|s| gltf.morph_target_count(s.mesh))
            .sum::<usize>();

        if slots.is_empty() {
            if !tracks.is_empty() {
                tracing::debug!("Object '{}' has no meshes, skipping its animations", object.name);
            }
            continue;
        }

        let nodes: Vec<u32> = slots.iter().map(|s| s.node).collect();
        for track in &tracks {
            let accessors = WeightAnimationBuilder::new(total_targets)
                .times(&keyframe_times(track.keyframe_count, options.frame_rate))
                .weights(&one_hot_weights(track.keyframe_count, track.offset, total_targets))
                .build(&mut buffer, buffers.animation_input, buffers.animation_output);
            gltf.add_weight_animation(&track.name, &nodes, &accessors);
        }
    }

    gltf.add_scene(&model.name, &roots);
    stats.nodes = gltf.node_count() as usize;
    stats.animations = gltf.animation_count();

    let packed = buffer.finish();
    let root = gltf.build(&packed, GENERATOR);

    Ok(AssembledScene {
        root,
        blobs: packed.blobs,
        stats,
    })
}

/// Keyframe providing an object's base geometry
///
/// The first keyframe of the object's first animation, or keyframe 0 when
/// that animation has none.
fn base_keyframe(model: &Model, object: &ModelObject) -> Result<u32, AssembleError> {
    let Some(&first) = object.animations.first() else {
        return Ok(0);
    };
    Ok(model.animation(first)?.keyframes.first().copied().unwrap_or(0))
}

/// One mesh node per slot of the base keyframe
///
/// Slots linking an empty vertex or triangle entry have nothing to draw and
/// are left out; later keyframes are matched by slot position, not by order.
#[allow(clippy::too_many_arguments)]
fn build_base_meshes(
    model: &Model,
    object: &ModelObject,
    options: &AssembleOptions,
    materials: &[Option<json::Index<json::Material>>],
    buffers: &ModelBuffers,
    buffer: &mut BufferBuilder,
    gltf: &mut GltfBuilder,
) -> Result<Vec<SlotMesh>, AssembleError> {
    let keyframe = model.keyframe(base_keyframe(model, object)?)?;
    let mut slots = Vec::with_capacity(keyframe.meshes.len());

    for (slot, link) in keyframe.meshes.iter().enumerate() {
        let vertices = model.vertices(link.vertices)?;
        let triangles = model.triangles(link.triangles)?;
        if vertices.is_empty() || triangles.is_empty() {
            tracing::debug!(
                "Mesh slot {} of object '{}' has {} vertices and {} indices, skipping",
                slot,
                object.name,
                vertices.len(),
                triangles.len()
            );
            continue;
        }

        let base: Vec<Vec3> = vertices
            .iter()
            .map(|&p| to_gltf_space(p, options.scale))
            .collect();
        let uvs = model.texture_coordinates(link.texture_coordinates)?;

        if uvs.len() != base.len() {
            return Err(AssembleError::AttributeCountMismatch {
                slot,
                positions: base.len(),
                texture_coordinates: uvs.len(),
            });
        }

        let mut indices = Vec::with_capacity(triangles.len());
        for &index in triangles {
            if index as usize >= base.len() {
                return Err(AssembleError::TriangleIndexOutOfRange {
                    slot,
                    index,
                    vertex_count: base.len(),
                });
            }
            indices.push(u32::from(index));
        }

        let accessors = MeshBuilder::new()
            .positions(bytemuck::cast_slice(&base))
            .uvs(bytemuck::cast_slice(uvs))
            .indices(&indices)
            .build(buffer, &buffers.mesh());

        let name = format!("{}_{}", object.name, slot);
        let material = materials.get(link.material as usize).copied().flatten();
        let mesh = gltf.add_mesh(&name, &accessors, material);
        let node = gltf.add_node(&name, Some(mesh));

        slots.push(SlotMesh {
            slot,
            node,
            mesh,
            base,
            targets: HashMap::new(),
        });
    }

    Ok(slots)
}

/// Append one morph target per keyframe per slot for every animation of `object`
///
/// Keyframes sharing a vertex pool entry reuse the same delta accessor.
#[allow(clippy::too_many_arguments)]
fn build_morph_targets(
    model: &Model,
    object: &ModelObject,
    options: &AssembleOptions,
    buffers: &ModelBuffers,
    slots: &mut [SlotMesh],
    buffer: &mut BufferBuilder,
    gltf: &mut GltfBuilder,
) -> Result<Vec<WeightTrack>, AssembleError> {
    let mut tracks = Vec::with_capacity(object.animations.len());
    let mut offset = 0;
    let base_slots = model.keyframe(base_keyframe(model, object)?)?.meshes.len();

    for &animation_index in &object.animations {
        let animation = model.animation(animation_index)?;
        if animation.keyframes.is_empty() {
            tracing::info!(
                "Animation '{}' of object '{}' has no keyframes, skipping",
                animation.name,
                object.name
            );
            continue;
        }

        for &keyframe_index in &animation.keyframes {
            let keyframe = model.keyframe(keyframe_index)?;

            for mesh in slots.iter_mut() {
                let slot = mesh.slot;
                let link = keyframe.meshes.get(slot).ok_or(AssembleError::MissingMeshSlot {
                    keyframe: keyframe_index,
                    slot,
                    expected: base_slots,
                })?;

                let accessor = match mesh.targets.get(&link.vertices) {
                    Some(&accessor) => accessor,
                    None => {
                        let vertices = model.vertices(link.vertices)?;
                        if vertices.len() != mesh.base.len() {
                            return Err(AssembleError::VertexCountMismatch {
                                keyframe: keyframe_index,
                                slot,
                                expected: mesh.base.len(),
                                actual: vertices.len(),
                            });
                        }

                        let deltas: Vec<Vec3> = vertices
                            .iter()
                            .zip(&mesh.base)
                            .map(|(&p, &b)| to_gltf_space(p, options.scale) - b)
                            .collect();
                        let accessor =
                            buffer.pack_positions(buffers.vertices, bytemuck::cast_slice(&deltas));
                        mesh.targets.insert(link.vertices, accessor);
                        accessor
                    }
                };

                gltf.add_morph_target(mesh.mesh, accessor);
            }
        }

        tracks.push(WeightTrack {
            name: animation.name.clone(),
            keyframe_count: animation.keyframes.len(),
            offset,
        });
        offset += animation.keyframes.len();
    }

    Ok(tracks)
}
