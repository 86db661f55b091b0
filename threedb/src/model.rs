//! Decoded 3DB model data structures

use glam::{Vec2, Vec3};

use crate::error::DecodeError;

/// A material entry
///
/// Materials are identified by their position in [`Model::materials`].
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    /// Usually redundant with `name`
    pub texture_path: String,
    /// Unknown 32-bit tag, possibly a material type
    pub tag: u32,
}

/// One mesh slot of a keyframe, expressed as indices into the model pools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyframeMesh {
    pub material: u16,
    /// Unknown link, likely per-keyframe normals
    pub unknown: u16,
    pub triangles: u16,
    pub texture_coordinates: u16,
    pub vertices: u16,
    pub brightness: u16,
}

/// A full snapshot of every mesh slot
///
/// All keyframes of a model carry the same number of meshes; mesh `i` of one
/// keyframe and mesh `i` of another are the same logical mesh over time.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    pub meshes: Vec<KeyframeMesh>,
}

/// A named object and the animations it plays
#[derive(Debug, Clone, PartialEq)]
pub struct ModelObject {
    pub name: String,
    /// Indices into [`Model::animations`]
    pub animations: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub name: String,
    /// Indices into [`Model::keyframes`], in playback order (may be empty)
    pub keyframes: Vec<u32>,
}

/// A decoded 3DB model
///
/// Produced once by [`decode`](crate::decode) and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub db_version: String,
    pub name: String,
    pub materials: Vec<Material>,
    pub keyframes: Vec<Keyframe>,
    /// Objects in the order they appear in the file
    pub objects: Vec<ModelObject>,
    pub animations: Vec<Animation>,
    pub triangle_data: Vec<Vec<u16>>,
    pub texture_coordinates_data: Vec<Vec<Vec2>>,
    /// Vertex positions normalized to `[0, 1]` per axis
    pub vertices_data: Vec<Vec<Vec3>>,
    pub brightness_data: Vec<Vec<u8>>,
}

/// Section counts of a model, for logs and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModelSummary {
    pub materials: usize,
    pub keyframes: usize,
    pub meshes_per_keyframe: usize,
    pub objects: usize,
    pub animations: usize,
    pub triangle_pool: usize,
    pub texture_coordinate_pool: usize,
    pub vertex_pool: usize,
    pub brightness_pool: usize,
}

fn lookup<'a, T>(pool: &'a [Vec<T>], index: u16, field: &'static str) -> Result<&'a [T], DecodeError> {
    pool.get(index as usize)
        .map(Vec::as_slice)
        .ok_or_else(|| DecodeError::index_out_of_range(field, index as usize, pool.len()))
}

impl Model {
    /// Vertex pool entry
    pub fn vertices(&self, index: u16) -> Result<&[Vec3], DecodeError> {
        lookup(&self.vertices_data, index, "vertices")
    }

    /// Texture coordinate pool entry
    pub fn texture_coordinates(&self, index: u16) -> Result<&[Vec2], DecodeError> {
        lookup(&self.texture_coordinates_data, index, "texture_coordinates")
    }

    /// Triangle index pool entry
    pub fn triangles(&self, index: u16) -> Result<&[u16], DecodeError> {
        lookup(&self.triangle_data, index, "triangles")
    }

    /// Brightness pool entry
    pub fn brightness(&self, index: u16) -> Result<&[u8], DecodeError> {
        lookup(&self.brightness_data, index, "brightness")
    }

    pub fn keyframe(&self, index: u32) -> Result<&Keyframe, DecodeError> {
        self.keyframes.get(index as usize).ok_or_else(|| {
            DecodeError::index_out_of_range("keyframe", index as usize, self.keyframes.len())
        })
    }

    pub fn animation(&self, index: u32) -> Result<&Animation, DecodeError> {
        self.animations.get(index as usize).ok_or_else(|| {
            DecodeError::index_out_of_range("animation", index as usize, self.animations.len())
        })
    }

    pub fn material(&self, index: u16) -> Option<&Material> {
        self.materials.get(index as usize)
    }

    /// Check that every stored index points inside the table it addresses
    pub fn validate(&self) -> Result<(), DecodeError> {
        for keyframe in &self.keyframes {
            for mesh in &keyframe.meshes {
                self.triangles(mesh.triangles)?;
                self.texture_coordinates(mesh.texture_coordinates)?;
                self.vertices(mesh.vertices)?;
                self.brightness(mesh.brightness)?;
            }
        }

        for animation in &self.animations {
            for &keyframe in &animation.keyframes {
                self.keyframe(keyframe)?;
            }
        }

        for object in &self.objects {
            for &animation in &object.animations {
                self.animation(animation)?;
            }
        }

        Ok(())
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            materials: self.materials.len(),
            keyframes: self.keyframes.len(),
            meshes_per_keyframe: self.keyframes.first().map_or(0, |k| k.meshes.len()),
            objects: self.objects.len(),
            animations: self.animations.len(),
            triangle_pool: self.triangle_data.len(),
            texture_coordinate_pool: self.texture_coordinates_data.len(),
            vertex_pool: self.vertices_data.len(),
            brightness_pool: self.brightness_data.len(),
        }
    }
}
