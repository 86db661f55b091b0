//! threedb.toml batch manifest
//!
//! Selects models from an input directory and converts them in parallel.
//! Relative paths in the manifest resolve against the manifest's directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Deserialize;
use walkdir::WalkDir;

use crate::convert::{convert_file, ConversionReport, ExportOptions};
use crate::emit::OutputFormat;
use crate::texture::{DEFAULT_TEXTURE_DIRS, DEFAULT_TEXTURE_EXTENSION};
use crate::transform::MODEL_SCALE;
use crate::weights::{is_valid_frame_rate, DEFAULT_FRAME_RATE, MIN_FRAME_RATE};

/// Model file extension picked up from the input directory
pub const MODEL_EXTENSION: &str = "3db";

/// threedb.toml manifest structure
#[derive(Debug, Default, Deserialize)]
pub struct ThreedbManifest {
    #[serde(default)]
    pub input: InputSection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub textures: TexturesSection,
    #[serde(default)]
    pub animation: AnimationSection,

    /// Directory relative paths resolve against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Which models to convert
#[derive(Debug, Deserialize)]
pub struct InputSection {
    #[serde(default = "default_input_dir")]
    pub dir: PathBuf,
    /// Convert every model in `dir`, ignoring `models`
    #[serde(default)]
    pub all: bool,
    /// File names of the models to convert
    #[serde(default)]
    pub models: Vec<String>,
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("assets/in")
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            dir: default_input_dir(),
            all: false,
            models: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("assets/out")
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            format: OutputFormat::default(),
        }
    }
}

/// Texture lookup settings
#[derive(Debug, Deserialize)]
pub struct TexturesSection {
    /// Candidate directories, highest resolution first, relative to the input directory
    #[serde(default = "default_texture_dirs")]
    pub dirs: Vec<PathBuf>,
    #[serde(default = "default_texture_extension")]
    pub extension: String,
}

fn default_texture_dirs() -> Vec<PathBuf> {
    DEFAULT_TEXTURE_DIRS.iter().map(PathBuf::from).collect()
}

fn default_texture_extension() -> String {
    DEFAULT_TEXTURE_EXTENSION.to_string()
}

impl Default for TexturesSection {
    fn default() -> Self {
        Self {
            dirs: default_texture_dirs(),
            extension: default_texture_extension(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnimationSection {
    /// Keyframes per second
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,
    #[serde(default = "default_scale")]
    pub scale: f32,
}

fn default_frame_rate() -> f32 {
    DEFAULT_FRAME_RATE
}

fn default_scale() -> f32 {
    MODEL_SCALE
}

impl Default for AnimationSection {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            scale: default_scale(),
        }
    }
}

impl ThreedbManifest {
    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse threedb.toml")
    }

    pub fn input_dir(&self) -> PathBuf {
        self.base_dir.join(&self.input.dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.base_dir.join(&self.output.dir)
    }

    /// Conversion options, with an optional output directory override
    pub fn export_options(&self, output_override: Option<&Path>) -> ExportOptions {
        ExportOptions {
            output_dir: output_override
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.output_dir()),
            format: self.output.format,
            texture_dirs: self.textures.dirs.clone(),
            texture_extension: self.textures.extension.clone(),
            frame_rate: self.animation.frame_rate,
            scale: self.animation.scale,
        }
    }
}

/// Load manifest from file
pub fn load_manifest(path: &Path) -> Result<ThreedbManifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
    let mut manifest = ThreedbManifest::parse(&content)
        .with_context(|| format!("Invalid manifest: {}", path.display()))?;
    manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(manifest)
}

/// Validate manifest without converting anything
pub fn validate(manifest: &ThreedbManifest) -> Result<()> {
    let input_dir = manifest.input_dir();
    if !input_dir.is_dir() {
        anyhow::bail!("Input directory not found: {}", input_dir.display());
    }

    if !manifest.input.all && manifest.input.models.is_empty() {
        anyhow::bail!("No models selected: set input.all = true or list input.models");
    }

    if !is_valid_frame_rate(manifest.animation.frame_rate) {
        anyhow::bail!(
            "Invalid animation.frame_rate {} (must be finite and at least {})",
            manifest.animation.frame_rate,
            MIN_FRAME_RATE
        );
    }

    if !manifest.animation.scale.is_finite() || manifest.animation.scale <= 0.0 {
        anyhow::bail!(
            "Invalid animation.scale {} (must be finite and positive)",
            manifest.animation.scale
        );
    }

    if manifest.textures.extension.is_empty() {
        anyhow::bail!("textures.extension must not be empty");
    }

    Ok(())
}

fn is_model_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(MODEL_EXTENSION))
        .unwrap_or(false)
}

/// Models selected by the manifest, sorted by path
///
/// Only files directly inside the input directory are considered.
pub fn select_inputs(manifest: &ThreedbManifest) -> Result<Vec<PathBuf>> {
    let input_dir = manifest.input_dir();
    let mut inputs = Vec::new();

    for entry in WalkDir::new(&input_dir).min_depth(1).max_depth(1) {
        let entry = entry
            .with_context(|| format!("Failed to read input directory: {}", input_dir.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_model_file(path) {
            continue;
        }

        let selected = manifest.input.all
            || manifest
                .input
                .models
                .iter()
                .any(|m| entry.file_name().to_str() == Some(m.as_str()));
        if selected {
            inputs.push(path.to_path_buf());
        }
    }

    if !manifest.input.all {
        for model in &manifest.input.models {
            if !inputs.iter().any(|p| p.file_name().and_then(|n| n.to_str()) == Some(model.as_str())) {
                tracing::warn!("Selected model '{}' not found in {}", model, input_dir.display());
            }
        }
    }

    inputs.sort();
    Ok(inputs)
}

/// Convert every selected model in parallel
///
/// A failing model does not stop the others; the batch fails afterwards if
/// any model failed.
pub fn build_all(
    manifest: &ThreedbManifest,
    output_override: Option<&Path>,
) -> Result<Vec<ConversionReport>> {
    let inputs = select_inputs(manifest)?;
    let options = manifest.export_options(output_override);

    tracing::info!(
        "Converting {} model(s) into {}",
        inputs.len(),
        options.output_dir.display()
    );

    let results: Vec<_> = inputs
        .par_iter()
        .map(|input| convert_file(input, &options))
        .collect();

    let mut reports = Vec::with_capacity(results.len());
    let mut failed = 0;
    for result in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                failed += 1;
                tracing::error!("{:#}", anyhow::Error::new(e));
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} models failed to convert", failed, inputs.len());
    }

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use threedb::fixture::two_keyframe_triangle;

    #[test]
    fn test_parse_full_manifest() {
        let manifest = ThreedbManifest::parse(
            r#"
            [input]
            dir = "models"
            all = false
            models = ["ringe.3db"]

            [output]
            dir = "out"
            format = "gltf"

            [textures]
            dirs = ["hi", "lo"]
            extension = "bmp"

            [animation]
            frame_rate = 24.0
            scale = 10.0
            "#,
        )
        .unwrap();

        assert_eq!(manifest.input.dir, PathBuf::from("models"));
        assert_eq!(manifest.input.models, vec!["ringe.3db"]);
        assert_eq!(manifest.output.format, OutputFormat::Gltf);
        assert_eq!(manifest.textures.dirs, vec![PathBuf::from("hi"), PathBuf::from("lo")]);
        assert_eq!(manifest.textures.extension, "bmp");
        assert_eq!(manifest.animation.frame_rate, 24.0);
        assert_eq!(manifest.animation.scale, 10.0);
    }

    #[test]
    fn test_defaults() {
        let manifest = ThreedbManifest::parse("").unwrap();
        assert_eq!(manifest.input.dir, PathBuf::from("assets/in"));
        assert_eq!(manifest.output.dir, PathBuf::from("assets/out"));
        assert_eq!(manifest.output.format, OutputFormat::Glb);
        assert_eq!(
            manifest.textures.dirs,
            vec![PathBuf::from("m256"), PathBuf::from("m128")]
        );
        assert_eq!(manifest.textures.extension, "tga");
        assert_eq!(manifest.animation.frame_rate, 10.0);
        assert_eq!(manifest.animation.scale, 100.0);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(ThreedbManifest::parse("[output]\nformat = \"fbx\"").is_err());
    }

    #[test]
    fn test_validate() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("in")).unwrap();

        let mut manifest = ThreedbManifest::parse("[input]\ndir = \"in\"\nall = true").unwrap();
        manifest.base_dir = dir.path().to_path_buf();
        assert!(validate(&manifest).is_ok());

        for rate in [0.0, f32::INFINITY, f32::NAN, 1.0e-40] {
            manifest.animation.frame_rate = rate;
            assert!(validate(&manifest).is_err(), "frame rate {rate} accepted");
        }
        manifest.animation.frame_rate = 10.0;

        manifest.animation.scale = f32::INFINITY;
        assert!(validate(&manifest).is_err());
        manifest.animation.scale = 100.0;

        manifest.input.all = false;
        assert!(validate(&manifest).is_err());

        manifest.input.models = vec!["ringe.3db".to_string()];
        assert!(validate(&manifest).is_ok());

        manifest.input.dir = PathBuf::from("missing");
        assert!(validate(&manifest).is_err());
    }

    #[test]
    fn test_infinite_frame_rate_from_toml_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("in")).unwrap();

        let mut manifest = ThreedbManifest::parse(
            "[input]\ndir = \"in\"\nall = true\n[animation]\nframe_rate = inf",
        )
        .unwrap();
        manifest.base_dir = dir.path().to_path_buf();

        assert_eq!(manifest.animation.frame_rate, f32::INFINITY);
        assert!(validate(&manifest).is_err());
    }

    #[test]
    fn test_select_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        std::fs::create_dir_all(input.join("nested")).unwrap();
        for name in ["b.3db", "a.3db", "notes.txt", "nested/c.3db"] {
            std::fs::write(input.join(name), b"").unwrap();
        }

        let mut manifest = ThreedbManifest::parse("[input]\ndir = \"in\"\nall = true").unwrap();
        manifest.base_dir = dir.path().to_path_buf();
        assert_eq!(
            select_inputs(&manifest).unwrap(),
            vec![input.join("a.3db"), input.join("b.3db")]
        );

        manifest.input.all = false;
        manifest.input.models = vec!["b.3db".to_string(), "zzz.3db".to_string()];
        assert_eq!(select_inputs(&manifest).unwrap(), vec![input.join("b.3db")]);
    }

    #[test]
    fn test_load_manifest_resolves_relative_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("threedb.toml");
        std::fs::write(&path, "[input]\ndir = \"in\"\n[output]\ndir = \"out\"").unwrap();

        let manifest = load_manifest(&path).unwrap();
        assert_eq!(manifest.input_dir(), dir.path().join("in"));
        assert_eq!(manifest.output_dir(), dir.path().join("out"));
        assert_eq!(
            manifest.export_options(Some(Path::new("elsewhere"))).output_dir,
            PathBuf::from("elsewhere")
        );
    }

    #[test]
    fn test_build_all_continues_past_failures() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        std::fs::create_dir(&input).unwrap();
        std::fs::write(input.join("good.3db"), two_keyframe_triangle().build()).unwrap();
        std::fs::write(input.join("bad.3db"), b"\x01\x00").unwrap();

        let mut manifest = ThreedbManifest::parse("[input]\ndir = \"in\"\nall = true").unwrap();
        manifest.base_dir = dir.path().to_path_buf();

        assert!(build_all(&manifest, None).is_err());
        assert!(dir.path().join("assets/out/good_out.glb").is_file());

        std::fs::remove_file(input.join("bad.3db")).unwrap();
        let reports = build_all(&manifest, None).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].stats.meshes, 1);
    }
}
