//! Single-model conversion: decode, resolve textures, assemble, emit

use std::path::{Path, PathBuf};

use crate::assemble::{assemble, AssembleOptions, SceneStats};
use crate::emit::{emit, OutputFormat, TextureCopy};
use crate::error::ExportError;
use crate::texture::{
    converted_name, resolve_materials, DEFAULT_TEXTURE_DIRS, DEFAULT_TEXTURE_EXTENSION,
};
use crate::transform::MODEL_SCALE;
use crate::weights::DEFAULT_FRAME_RATE;

/// Settings for converting one model
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    /// Texture directories, highest priority first. Relative entries are
    /// resolved against the input file's directory.
    pub texture_dirs: Vec<PathBuf>,
    pub texture_extension: String,
    pub frame_rate: f32,
    pub scale: f32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            format: OutputFormat::default(),
            texture_dirs: DEFAULT_TEXTURE_DIRS.iter().map(PathBuf::from).collect(),
            texture_extension: DEFAULT_TEXTURE_EXTENSION.to_string(),
            frame_rate: DEFAULT_FRAME_RATE,
            scale: MODEL_SCALE,
        }
    }
}

/// Outcome of a successful conversion
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub document: PathBuf,
    pub stats: SceneStats,
    pub textures_found: usize,
    pub textures_missing: usize,
}

/// Output name for an input file: its stem, without `.3db`
pub fn model_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string())
}

fn texture_dirs(input: &Path, dirs: &[PathBuf]) -> Vec<PathBuf> {
    let base = input.parent().unwrap_or_else(|| Path::new(""));
    dirs.iter().map(|dir| base.join(dir)).collect()
}

/// Convert one `.3db` file
pub fn convert_file(input: &Path, options: &ExportOptions) -> Result<ConversionReport, ExportError> {
    let model = threedb::decode_file(input).map_err(|source| ExportError::Decode {
        path: input.to_path_buf(),
        source,
    })?;

    let name = model_name(input);
    let dirs = texture_dirs(input, &options.texture_dirs);
    let found = resolve_materials(&model.materials, &dirs, &options.texture_extension);

    let mut textures = Vec::new();
    let material_images: Vec<Option<String>> = model
        .materials
        .iter()
        .zip(&found)
        .map(|(material, source)| {
            let source = source.as_ref()?;
            let file_name = converted_name(&material.name)?;
            textures.push(TextureCopy {
                source: source.clone(),
                file_name: file_name.clone(),
            });
            Some(file_name)
        })
        .collect();

    let assemble_options = AssembleOptions {
        name: name.clone(),
        frame_rate: options.frame_rate,
        scale: options.scale,
    };
    let scene =
        assemble(&model, &assemble_options, &material_images).map_err(|source| {
            ExportError::Assemble {
                path: input.to_path_buf(),
                source,
            }
        })?;

    let files = emit(&scene, &options.output_dir, &name, options.format, &textures).map_err(
        |source| ExportError::Emit {
            path: input.to_path_buf(),
            source,
        },
    )?;

    tracing::info!("Converted: {} -> {}", input.display(), files.document.display());

    Ok(ConversionReport {
        input: input.to_path_buf(),
        document: files.document,
        stats: scene.stats,
        textures_found: textures.len(),
        textures_missing: found.iter().filter(|f| f.is_none()).count(),
    })
}
