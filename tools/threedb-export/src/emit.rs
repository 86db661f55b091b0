//! Writing documents, companion buffers and textures to disk

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::assemble::AssembledScene;
use crate::error::EmitError;
use crate::texture::convert_texture;

/// Document container format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON `.gltf` document
    Gltf,
    /// Binary `.glb` container holding the JSON chunk only
    #[default]
    Glb,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Gltf => "gltf",
            OutputFormat::Glb => "glb",
        }
    }
}

/// A source texture and the file name it is converted to
#[derive(Debug, Clone, PartialEq)]
pub struct TextureCopy {
    pub source: PathBuf,
    pub file_name: String,
}

/// Everything written for one model
#[derive(Debug, Clone, Default)]
pub struct EmittedFiles {
    pub document: PathBuf,
    pub buffers: Vec<PathBuf>,
    pub textures: Vec<PathBuf>,
}

fn write_file(path: &Path, data: &[u8]) -> Result<(), EmitError> {
    std::fs::write(path, data).map_err(|source| EmitError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Output document path for a model
pub fn document_path(output_dir: &Path, name: &str, format: OutputFormat) -> PathBuf {
    output_dir.join(format!("{}_out.{}", name, format.extension()))
}

/// Write a scene into `output_dir`
///
/// Every companion buffer is written, even empty ones, so the set of files
/// per model is fixed. Textures are converted before the document is written.
pub fn emit(
    scene: &AssembledScene,
    output_dir: &Path,
    name: &str,
    format: OutputFormat,
    textures: &[TextureCopy],
) -> Result<EmittedFiles, EmitError> {
    std::fs::create_dir_all(output_dir).map_err(|source| EmitError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut files = EmittedFiles::default();

    for blob in &scene.blobs {
        let path = output_dir.join(&blob.uri);
        write_file(&path, &blob.data)?;
        files.buffers.push(path);
    }

    for texture in textures {
        let path = output_dir.join(&texture.file_name);
        convert_texture(&texture.source, &path)?;
        files.textures.push(path);
    }

    let document = document_path(output_dir, name, format);
    let bytes = match format {
        OutputFormat::Gltf => serde_json::to_vec_pretty(&scene.root)?,
        OutputFormat::Glb => glb_builder::assemble_glb(&scene.root, None).map_err(EmitError::Glb)?,
    };
    write_file(&document, &bytes)?;

    tracing::debug!(
        "Wrote {} ({} buffers, {} textures)",
        document.display(),
        files.buffers.len(),
        files.textures.len()
    );
    files.document = document;
    Ok(files)
}
