//! GLTF document construction

use crate::{MeshAccessors, PackedBuffers, WeightAccessors};
use gltf_json as json;
use gltf_json::validation::Checked::Valid;
use std::collections::BTreeMap;

/// Builder for complete GLTF documents
pub struct GltfBuilder {
    nodes: Vec<json::Node>,
    meshes: Vec<json::Mesh>,
    animations: Vec<json::Animation>,
    images: Vec<json::Image>,
    samplers: Vec<json::texture::Sampler>,
    textures: Vec<json::Texture>,
    materials: Vec<json::Material>,
    scenes: Vec<json::Scene>,
}

impl GltfBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            meshes: Vec::new(),
            animations: Vec::new(),
            images: Vec::new(),
            samplers: Vec::new(),
            textures: Vec::new(),
            materials: Vec::new(),
            scenes: Vec::new(),
        }
    }

    /// Add a node, optionally instancing a mesh, and return its index
    pub fn add_node(&mut self, name: &str, mesh: Option<json::Index<json::Mesh>>) -> u32 {
        self.nodes.push(json::Node {
            camera: None,
            children: None,
            extensions: Default::default(),
            extras: Default::default(),
            matrix: None,
            mesh,
            name: Some(name.to_string()),
            rotation: None,
            scale: None,
            skin: None,
            translation: None,
            weights: None,
        });
        self.nodes.len() as u32 - 1
    }

    /// Attach `child` under `parent`
    pub fn add_child(&mut self, parent: u32, child: u32) {
        self.nodes[parent as usize]
            .children
            .get_or_insert_with(Vec::new)
            .push(json::Index::new(child));
    }

    /// Get the current node count
    pub fn node_count(&self) -> u32 {
        self.nodes.len() as u32
    }

    /// Add a mesh with a single triangle primitive
    pub fn add_mesh(
        &mut self,
        name: &str,
        accessors: &MeshAccessors,
        material: Option<json::Index<json::Material>>,
    ) -> json::Index<json::Mesh> {
        let mut attributes = BTreeMap::new();
        attributes.insert(
            Valid(json::mesh::Semantic::Positions),
            accessors.positions.as_json_index(),
        );

        if let Some(uvs) = accessors.uvs {
            attributes.insert(
                Valid(json::mesh::Semantic::TexCoords(0)),
                uvs.as_json_index(),
            );
        }

        let primitive = json::mesh::Primitive {
            attributes,
            extensions: Default::default(),
            extras: Default::default(),
            indices: accessors.indices.map(|i| i.as_json_index()),
            material,
            mode: Valid(json::mesh::Mode::Triangles),
            targets: None,
        };

        self.meshes.push(json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
            primitives: vec![primitive],
            weights: None,
        });

        json::Index::new(self.meshes.len() as u32 - 1)
    }

    /// Append a position-delta morph target to every primitive of a mesh
    ///
    /// The mesh's default weight for the new target is zero.
    pub fn add_morph_target(
        &mut self,
        mesh: json::Index<json::Mesh>,
        positions: crate::AccessorIndex,
    ) {
        let mesh = &mut self.meshes[mesh.value()];
        for primitive in &mut mesh.primitives {
            primitive
                .targets
                .get_or_insert_with(Vec::new)
                .push(json::mesh::MorphTarget {
                    positions: Some(positions.as_json_index()),
                    normals: None,
                    tangents: None,
                });
        }
        mesh.weights.get_or_insert_with(Vec::new).push(0.0);
    }

    /// Number of morph targets on a mesh
    pub fn morph_target_count(&self, mesh: json::Index<json::Mesh>) -> usize {
        self.meshes[mesh.value()]
            .weights
            .as_ref()
            .map_or(0, Vec::len)
    }

    /// Add an animation driving the morph target weights of `nodes`
    ///
    /// Every node gets its own LINEAR sampler over the same accessors.
    pub fn add_weight_animation(
        &mut self,
        name: &str,
        nodes: &[u32],
        accessors: &WeightAccessors,
    ) {
        let mut samplers = Vec::new();
        let mut channels = Vec::new();

        for node_idx in nodes {
            samplers.push(json::animation::Sampler {
                input: accessors.times.as_json_index(),
                interpolation: Valid(json::animation::Interpolation::Linear),
                output: accessors.weights.as_json_index(),
                extensions: Default::default(),
                extras: Default::default(),
            });
            channels.push(json::animation::Channel {
                sampler: json::Index::new(samplers.len() as u32 - 1),
                target: json::animation::Target {
                    node: json::Index::new(*node_idx),
                    path: Valid(json::animation::Property::MorphTargetWeights),
                    extensions: Default::default(),
                    extras: Default::default(),
                },
                extensions: Default::default(),
                extras: Default::default(),
            });
        }

        self.animations.push(json::Animation {
            channels,
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
            samplers,
        });
    }

    /// Get the current animation count
    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    /// Add a material whose base color comes from an external image
    pub fn add_textured_material(
        &mut self,
        name: &str,
        image_uri: &str,
    ) -> json::Index<json::Material> {
        let image_index = self.images.len() as u32;
        self.images.push(json::Image {
            buffer_view: None,
            mime_type: None,
            name: Some(name.to_string()),
            uri: Some(image_uri.to_string()),
            extensions: Default::default(),
            extras: Default::default(),
        });

        let sampler_index = self.samplers.len() as u32;
        self.samplers.push(json::texture::Sampler::default());

        let texture_index = self.textures.len() as u32;
        self.textures.push(json::Texture {
            name: Some(name.to_string()),
            sampler: Some(json::Index::new(sampler_index)),
            source: json::Index::new(image_index),
            extensions: Default::default(),
            extras: Default::default(),
        });

        self.materials.push(json::Material {
            name: Some(name.to_string()),
            pbr_metallic_roughness: json::material::PbrMetallicRoughness {
                base_color_factor: json::material::PbrBaseColorFactor([1.0, 1.0, 1.0, 1.0]),
                base_color_texture: Some(json::texture::Info {
                    index: json::Index::new(texture_index),
                    tex_coord: 0,
                    extensions: Default::default(),
                    extras: Default::default(),
                }),
                metallic_factor: json::material::StrengthFactor(0.0),
                roughness_factor: json::material::StrengthFactor(1.0),
                metallic_roughness_texture: None,
                extensions: Default::default(),
                extras: Default::default(),
            },
            ..Default::default()
        });

        json::Index::new(self.materials.len() as u32 - 1)
    }

    /// Add a scene
    pub fn add_scene(&mut self, name: &str, root_nodes: &[u32]) {
        self.scenes.push(json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
            nodes: root_nodes.iter().map(|n| json::Index::new(*n)).collect(),
        });
    }

    /// Build final GLTF Root from the packed buffers
    pub fn build(self, packed: &PackedBuffers, generator: &str) -> json::Root {
        json::Root {
            accessors: packed.accessors.clone(),
            animations: self.animations,
            asset: json::Asset {
                copyright: None,
                extensions: Default::default(),
                extras: Default::default(),
                generator: Some(generator.to_string()),
                min_version: None,
                version: "2.0".to_string(),
            },
            buffers: packed.buffers.clone(),
            buffer_views: packed.views.clone(),
            cameras: Vec::new(),
            extensions: Default::default(),
            extensions_required: Vec::new(),
            extensions_used: Vec::new(),
            extras: Default::default(),
            images: self.images,
            materials: self.materials,
            meshes: self.meshes,
            nodes: self.nodes,
            samplers: self.samplers,
            scene: if self.scenes.is_empty() {
                None
            } else {
                Some(json::Index::new(0))
            },
            scenes: self.scenes,
            skins: Vec::new(),
            textures: self.textures,
        }
    }
}

impl Default for GltfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BufferBuilder, MeshBuffers, MeshBuilder, WeightAnimationBuilder};

    fn single_buffer(buffer: &mut BufferBuilder) -> MeshBuffers {
        let b = buffer.add_buffer("model.bin", None, None);
        MeshBuffers {
            positions: b,
            uvs: b,
            indices: b,
        }
    }

    #[test]
    fn test_gltf_builder_basic() {
        let mut buffer = BufferBuilder::new();
        let buffers = single_buffer(&mut buffer);
        let mesh = MeshBuilder::new()
            .positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]])
            .indices(&[0, 1, 2])
            .build(&mut buffer, &buffers);

        let mut gltf = GltfBuilder::new();
        let mesh_idx = gltf.add_mesh("Triangle", &mesh, None);
        let root_node = gltf.add_node("Root", None);
        let mesh_node = gltf.add_node("Triangle", Some(mesh_idx));
        gltf.add_child(root_node, mesh_node);
        gltf.add_scene("Scene", &[root_node]);
        assert_eq!(gltf.node_count(), 2);

        let root = gltf.build(&buffer.finish(), "test");

        assert_eq!(root.meshes.len(), 1);
        assert_eq!(root.scenes.len(), 1);
        assert_eq!(root.scene, Some(json::Index::new(0)));
        assert_eq!(root.asset.version, "2.0");
        assert_eq!(root.nodes[0].children, Some(vec![json::Index::new(1)]));
        assert_eq!(root.buffers.len(), 1);
    }

    #[test]
    fn test_morph_targets_and_weight_animation() {
        let mut buffer = BufferBuilder::new();
        let buffers = single_buffer(&mut buffer);
        let base = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let mesh = MeshBuilder::new()
            .positions(&base)
            .build(&mut buffer, &buffers);

        let mut gltf = GltfBuilder::new();
        let mesh_idx = gltf.add_mesh("Morph", &mesh, None);
        for delta in [[0.0; 3], [0.5, 0.0, 0.0]] {
            let target = buffer.pack_positions(buffers.positions, &[delta, [0.0; 3], [0.0; 3]]);
            gltf.add_morph_target(mesh_idx, target);
        }
        assert_eq!(gltf.morph_target_count(mesh_idx), 2);

        let node = gltf.add_node("Morph", Some(mesh_idx));
        let weights = WeightAnimationBuilder::new(2)
            .times(&[0.0, 0.1])
            .weights(&[1.0, 0.0, 0.0, 1.0])
            .build(&mut buffer, buffers.positions, buffers.positions);
        gltf.add_weight_animation("wave", &[node], &weights);
        assert_eq!(gltf.animation_count(), 1);

        let root = gltf.build(&buffer.finish(), "test");
        let primitive = &root.meshes[0].primitives[0];
        assert_eq!(primitive.targets.as_ref().map(Vec::len), Some(2));
        assert_eq!(root.meshes[0].weights, Some(vec![0.0, 0.0]));

        let animation = &root.animations[0];
        assert_eq!(animation.channels.len(), 1);
        assert_eq!(animation.samplers.len(), 1);
        assert_eq!(
            animation.channels[0].target.path,
            Valid(json::animation::Property::MorphTargetWeights)
        );
    }

    #[test]
    fn test_textured_material() {
        let mut gltf = GltfBuilder::new();
        let material = gltf.add_textured_material("ringe_tex", "ringe_tex.png");
        assert_eq!(material, json::Index::new(0));

        let root = gltf.build(&BufferBuilder::new().finish(), "test");
        assert_eq!(root.images[0].uri.as_deref(), Some("ringe_tex.png"));
        assert_eq!(root.textures[0].source, json::Index::new(0));
        assert!(root.materials[0]
            .pbr_metallic_roughness
            .base_color_texture
            .is_some());
        assert!(root.scene.is_none());
    }
}
