//! Integration tests for threedb-export
//!
//! Tests the full pipeline: build 3DB bytes -> convert -> load the result with
//! the gltf importer

use std::path::{Path, PathBuf};

use gltf::animation::util::ReadOutputs;
use image::{ImageBuffer, Rgba};
use tempfile::tempdir;
use threedb::fixture::two_keyframe_triangle;
use threedb_export::{convert_file, ExportOptions, OutputFormat};

fn write_model(dir: &Path) -> PathBuf {
    let path = dir.join("ringe.3db");
    std::fs::write(&path, two_keyframe_triangle().build()).expect("Failed to write model");
    path
}

fn write_tga(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    ImageBuffer::from_pixel(4, 4, Rgba([10u8, 20, 30, 255]))
        .save_with_format(path, image::ImageFormat::Tga)
        .expect("Failed to write TGA");
}

fn options(output_dir: &Path, format: OutputFormat) -> ExportOptions {
    ExportOptions {
        output_dir: output_dir.to_path_buf(),
        format,
        ..Default::default()
    }
}

/// Test .3db -> .gltf conversion loads with morph targets and weights intact
#[test]
fn test_gltf_output_loads() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = write_model(dir.path());
    let out = dir.path().join("out");

    let report = convert_file(&input, &options(&out, OutputFormat::Gltf)).unwrap();
    assert_eq!(report.document, out.join("ringe_out.gltf"));

    let (document, buffers, _images) =
        gltf::import(&report.document).expect("Failed to load exported glTF");

    let scene = document.default_scene().expect("No default scene");
    let roots: Vec<_> = scene.nodes().collect();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].name(), Some("ringe"));

    let children: Vec<_> = roots[0].children().collect();
    assert_eq!(children.len(), 1);
    let mesh = children[0].mesh().expect("Child has no mesh");
    assert_eq!(mesh.weights(), Some(&[0.0, 0.0][..]));

    let primitive = mesh.primitives().next().unwrap();
    assert_eq!(primitive.morph_targets().count(), 2);

    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
    let positions: Vec<[f32; 3]> = reader.read_positions().unwrap().collect();
    assert_eq!(positions.len(), 3);
    let indices: Vec<u32> = reader.read_indices().unwrap().into_u32().collect();
    assert_eq!(indices, vec![0, 1, 2]);

    let animation = document.animations().next().expect("No animation");
    assert_eq!(animation.name(), Some("spin"));
    let channel = animation.channels().next().unwrap();
    assert_eq!(
        channel.target().property(),
        gltf::animation::Property::MorphTargetWeights
    );
    assert_eq!(channel.target().node().index(), children[0].index());

    let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));
    let times: Vec<f32> = reader.read_inputs().unwrap().collect();
    assert_eq!(times, vec![0.0, 0.1]);
    let weights: Vec<f32> = match reader.read_outputs().unwrap() {
        ReadOutputs::MorphTargetWeights(weights) => weights.into_f32().collect(),
        _ => panic!("Expected morph target weights"),
    };
    assert_eq!(weights, vec![1.0, 0.0, 0.0, 1.0]);
}

/// Test .3db -> .glb conversion with external buffers
#[test]
fn test_glb_output_loads() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = write_model(dir.path());

    let report = convert_file(&input, &options(dir.path(), OutputFormat::Glb)).unwrap();
    assert_eq!(report.document, dir.path().join("ringe_out.glb"));

    for suffix in ["vertices", "uvs", "indices", "ain", "aout"] {
        assert!(
            dir.path().join(format!("ringe_{suffix}.bin")).is_file(),
            "missing {suffix} buffer"
        );
    }

    let (document, buffers, _images) =
        gltf::import(&report.document).expect("Failed to load exported GLB");
    assert_eq!(document.buffers().count(), 5);
    for (buffer, data) in document.buffers().zip(&buffers) {
        assert_eq!(buffer.length(), data.len());
    }
}

/// Test the highest-resolution texture is converted and referenced
#[test]
fn test_texture_is_converted() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = write_model(dir.path());
    write_tga(&dir.path().join("m128/ringe_tex.tga"));
    write_tga(&dir.path().join("m256/ringe_tex.tga"));
    let out = dir.path().join("out");

    let report = convert_file(&input, &options(&out, OutputFormat::Gltf)).unwrap();
    assert_eq!(report.textures_found, 1);
    assert_eq!(report.textures_missing, 0);
    assert!(out.join("ringe_tex.png").is_file());

    let (document, _buffers, images) =
        gltf::import(&report.document).expect("Failed to load exported glTF");
    assert_eq!(images.len(), 1);
    assert_eq!((images[0].width, images[0].height), (4, 4));

    let material = document.materials().next().expect("No material");
    assert_eq!(material.name(), Some("ringe_tex"));
    assert!(material.pbr_metallic_roughness().base_color_texture().is_some());

    let mesh = document.meshes().next().unwrap();
    let primitive = mesh.primitives().next().unwrap();
    assert_eq!(primitive.material().index(), Some(0));
}

/// Test a missing texture does not fail the conversion
#[test]
fn test_missing_texture_is_not_fatal() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = write_model(dir.path());

    let report = convert_file(&input, &options(dir.path(), OutputFormat::Gltf)).unwrap();
    assert_eq!(report.textures_found, 0);
    assert_eq!(report.textures_missing, 1);

    let (document, _buffers, _images) = gltf::import(&report.document).unwrap();
    assert_eq!(document.materials().count(), 0);
    assert_eq!(document.images().count(), 0);
}
