//! Programmatic 3DB construction for tests
//!
//! Writes the byte layout the decoder expects. Unknown regions are filled with
//! recognizable junk so misaligned reads show up as garbage rather than zeros.

use crate::model::KeyframeMesh;
use crate::{KEYFRAME_PADDING, SHADOW_BLOCK_SIZE, UNKNOWN_RECORD_SIZE};

/// Builder for 3DB file bytes
#[derive(Debug, Clone, Default)]
pub struct ModelWriter {
    db_version: String,
    name: String,
    materials: Vec<(String, String, u32)>,
    keyframes: Vec<Vec<KeyframeMesh>>,
    objects: Vec<(String, Vec<u32>)>,
    animations: Vec<(String, Vec<u32>)>,
    shadows: u16,
    cube_maps: Vec<(u16, u16)>,
    unknown_records: u32,
    triangles: Vec<Vec<u16>>,
    texture_coordinates: Vec<Vec<[f32; 2]>>,
    vertices: Vec<Vec<[u16; 3]>>,
    brightness: Vec<Vec<u8>>,
}

/// Mesh link with the unknown field left at zero
pub fn mesh_link(
    material: u16,
    triangles: u16,
    texture_coordinates: u16,
    vertices: u16,
    brightness: u16,
) -> KeyframeMesh {
    KeyframeMesh {
        material,
        unknown: 0,
        triangles,
        texture_coordinates,
        vertices,
        brightness,
    }
}

impl ModelWriter {
    pub fn new(name: &str) -> Self {
        Self {
            db_version: "3DB 1.0".to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn material(mut self, name: &str, texture_path: &str) -> Self {
        self.materials
            .push((name.to_string(), texture_path.to_string(), 0x0102_0304));
        self
    }

    pub fn keyframe(mut self, meshes: &[KeyframeMesh]) -> Self {
        self.keyframes.push(meshes.to_vec());
        self
    }

    pub fn object(mut self, name: &str, animations: &[u32]) -> Self {
        self.objects.push((name.to_string(), animations.to_vec()));
        self
    }

    pub fn animation(mut self, name: &str, keyframes: &[u32]) -> Self {
        self.animations.push((name.to_string(), keyframes.to_vec()));
        self
    }

    pub fn shadows(mut self, count: u16) -> Self {
        self.shadows = count;
        self
    }

    pub fn cube_map(mut self, width: u16, height: u16) -> Self {
        self.cube_maps.push((width, height));
        self
    }

    pub fn unknown_records(mut self, count: u32) -> Self {
        self.unknown_records = count;
        self
    }

    pub fn triangles(mut self, indices: &[u16]) -> Self {
        self.triangles.push(indices.to_vec());
        self
    }

    pub fn texture_coordinates(mut self, uvs: &[[f32; 2]]) -> Self {
        self.texture_coordinates.push(uvs.to_vec());
        self
    }

    /// Fixed-point vertices (`0xFFFF` maps to 1.0)
    pub fn vertices(mut self, vertices: &[[u16; 3]]) -> Self {
        self.vertices.push(vertices.to_vec());
        self
    }

    pub fn brightness(mut self, values: &[u8]) -> Self {
        self.brightness.push(values.to_vec());
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();

        write_string(&mut out, &self.db_version);
        write_string(&mut out, &self.name);

        out.extend_from_slice(&(self.materials.len() as u16).to_le_bytes());
        for (name, texture_path, tag) in &self.materials {
            write_string(&mut out, name);
            write_string(&mut out, texture_path);
            out.extend_from_slice(&tag.to_le_bytes());
        }

        out.extend_from_slice(&(self.keyframes.len() as u32).to_le_bytes());
        for meshes in &self.keyframes {
            out.extend_from_slice(&(meshes.len() as u16).to_le_bytes());
            for m in meshes {
                for value in [
                    m.material,
                    m.unknown,
                    m.triangles,
                    m.texture_coordinates,
                    m.vertices,
                    m.brightness,
                ] {
                    out.extend_from_slice(&value.to_le_bytes());
                }
            }
            for v in [1.0f32, 2.0, 3.0, -1.0, -2.0, -3.0] {
                out.extend_from_slice(&v.to_le_bytes());
            }
            for size in KEYFRAME_PADDING {
                out.extend(std::iter::repeat_n(0xCC, size));
            }
        }

        out.extend_from_slice(&(self.objects.len() as u16).to_le_bytes());
        for (name, animations) in &self.objects {
            write_string(&mut out, name);
            out.extend_from_slice(&(animations.len() as u16).to_le_bytes());
            for a in animations {
                out.extend_from_slice(&a.to_le_bytes());
            }
        }

        out.extend_from_slice(&(self.animations.len() as u16).to_le_bytes());
        for (name, keyframes) in &self.animations {
            write_string(&mut out, name);
            out.extend_from_slice(&(keyframes.len() as u16).to_le_bytes());
            for k in keyframes {
                out.extend_from_slice(&k.to_le_bytes());
            }
            out.extend_from_slice(&0xBEEFu16.to_le_bytes());
            out.extend_from_slice(&0.5f32.to_le_bytes());
            write_string(&mut out, "unused");
            for v in [0.0f32; 6] {
                out.extend_from_slice(&v.to_le_bytes());
            }
        }

        out.extend_from_slice(&self.shadows.to_le_bytes());
        for _ in 0..self.shadows {
            out.extend(std::iter::repeat_n(0x5A, SHADOW_BLOCK_SIZE));
        }

        out.extend_from_slice(&(self.cube_maps.len() as u16).to_le_bytes());
        for &(width, height) in &self.cube_maps {
            out.extend_from_slice(&width.to_le_bytes());
            out.extend_from_slice(&height.to_le_bytes());
            out.extend_from_slice(&7u16.to_le_bytes());
            out.extend_from_slice(&9u16.to_le_bytes());
            out.extend(std::iter::repeat_n(0xA5, width as usize * height as usize));
        }

        out.extend_from_slice(&(self.triangles.len() as u16).to_le_bytes());
        out.extend_from_slice(&(self.texture_coordinates.len() as u16).to_le_bytes());
        out.extend_from_slice(&(self.vertices.len() as u16).to_le_bytes());
        out.extend_from_slice(&(self.brightness.len() as u16).to_le_bytes());
        out.extend_from_slice(&self.unknown_records.to_le_bytes());

        for len in self.triangles.iter().map(Vec::len) {
            out.extend_from_slice(&(len as u16).to_le_bytes());
        }
        for len in self.texture_coordinates.iter().map(Vec::len) {
            out.extend_from_slice(&(len as u16).to_le_bytes());
        }
        for len in self.vertices.iter().map(Vec::len) {
            out.extend_from_slice(&(len as u16).to_le_bytes());
        }
        for len in self.brightness.iter().map(Vec::len) {
            out.extend_from_slice(&(len as u16).to_le_bytes());
        }

        for _ in 0..self.unknown_records {
            out.extend(std::iter::repeat_n(0x33, UNKNOWN_RECORD_SIZE));
        }

        for entry in &self.triangles {
            for i in entry {
                out.extend_from_slice(&i.to_le_bytes());
            }
        }
        for entry in &self.texture_coordinates {
            for c in entry.iter().flatten() {
                out.extend_from_slice(&c.to_le_bytes());
            }
        }
        for entry in &self.vertices {
            for v in entry {
                for c in v {
                    out.extend_from_slice(&c.to_le_bytes());
                }
            }
        }
        for entry in &self.brightness {
            out.extend_from_slice(entry);
        }

        out
    }
}

fn write_string(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u32).to_le_bytes());
    out.extend_from_slice(s.as_bytes());
}

/// Two-keyframe model: one material, one object playing one animation over
/// both keyframes, one mesh per keyframe with 3 vertices, 3 UVs, 1 triangle
///
/// Keyframe 0 uses vertex pool entry 0, keyframe 1 uses entry 1 (the first
/// vertex moves along +X). Everything else is shared.
pub fn two_keyframe_triangle() -> ModelWriter {
    ModelWriter::new("ringe")
        .material("ringe_tex", "textures\\ringe_tex.tga")
        .keyframe(&[mesh_link(0, 0, 0, 0, 0)])
        .keyframe(&[mesh_link(0, 0, 0, 1, 0)])
        .object("ringe", &[0])
        .animation("spin", &[0, 1])
        .triangles(&[0, 1, 2])
        .texture_coordinates(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]])
        .vertices(&[[0x8000, 0x8000, 0x8000], [0xFFFF, 0x8000, 0x8000], [0x8000, 0xFFFF, 0x0000]])
        .vertices(&[[0xC000, 0x8000, 0x8000], [0xFFFF, 0x8000, 0x8000], [0x8000, 0xFFFF, 0x0000]])
        .brightness(&[10, 20, 30])
}
