//! Texture lookup and conversion
//!
//! Material textures are found by probing candidate directories in priority
//! order for `<material-name>.<ext>`. Found images are re-encoded as PNG next
//! to the exported document.

use std::ffi::OsStr;
use std::io::{Cursor, Write};
use std::path::{Component, Path, PathBuf};

use threedb::Material;

use crate::error::TextureError;

/// Default candidate directories, highest resolution first
pub const DEFAULT_TEXTURE_DIRS: [&str; 2] = ["m256", "m128"];

/// Default source texture extension
pub const DEFAULT_TEXTURE_EXTENSION: &str = "tga";

/// Whether `name` is exactly one normal path component
///
/// Material names come from the model file. Anything else (absolute paths,
/// separators, `.` or `..`) could point a lookup or a write outside its
/// directory.
pub fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(c)), None) => c == OsStr::new(name),
        _ => false,
    }
}

/// Find `<name>.<extension>` in the first directory where `exists` holds
///
/// Names that are not a plain file name never resolve.
pub fn resolve_texture(
    name: &str,
    dirs: &[PathBuf],
    extension: &str,
    exists: impl Fn(&Path) -> bool,
) -> Option<PathBuf> {
    if !is_plain_file_name(name) {
        return None;
    }
    let file_name = format!("{name}.{extension}");
    dirs.iter()
        .map(|dir| dir.join(&file_name))
        .find(|candidate| exists(candidate))
}

/// [`resolve_texture`] against the file system
pub fn resolve_texture_on_disk(name: &str, dirs: &[PathBuf], extension: &str) -> Option<PathBuf> {
    resolve_texture(name, dirs, extension, Path::is_file)
}

/// Resolve the texture of every material, in material order
///
/// A missing texture is not an error: the material is exported untextured.
pub fn resolve_materials(
    materials: &[Material],
    dirs: &[PathBuf],
    extension: &str,
) -> Vec<Option<PathBuf>> {
    materials
        .iter()
        .map(|material| {
            if !is_plain_file_name(&material.name) {
                tracing::warn!(
                    "Material name '{}' is not a plain file name, exporting it untextured",
                    material.name
                );
                return None;
            }
            let found = resolve_texture_on_disk(&material.name, dirs, extension);
            if found.is_none() {
                tracing::warn!(
                    "Texture not found for material '{}' ({}.{} in {} directories)",
                    material.name,
                    material.name,
                    extension,
                    dirs.len()
                );
            }
            found
        })
        .collect()
}

/// File name a converted texture is written under, if the material name is
/// usable as one
pub fn converted_name(material_name: &str) -> Option<String> {
    is_plain_file_name(material_name).then(|| format!("{material_name}.png"))
}

/// Decode `src` and write it to `dst` as PNG
///
/// The PNG goes to a temporary file next to `dst` that is then renamed over
/// it, so concurrent conversions to the same `dst` never interleave. The
/// result keeps the permissions of `src`.
pub fn convert_texture(src: &Path, dst: &Path) -> Result<(), TextureError> {
    let img = image::open(src).map_err(|source| TextureError::Read {
        path: src.to_path_buf(),
        source,
    })?;

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|source| TextureError::Write {
            path: dst.to_path_buf(),
            source,
        })?;

    let io_error = |source| TextureError::Io {
        path: dst.to_path_buf(),
        source,
    };
    let permissions = std::fs::metadata(src).map_err(io_error)?.permissions();
    let dir = dst
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut file = tempfile::Builder::new()
        .prefix(".texture")
        .suffix(".tmp")
        .permissions(permissions)
        .tempfile_in(dir)
        .map_err(io_error)?;
    file.write_all(&png).map_err(io_error)?;
    file.persist(dst).map_err(|e| io_error(e.error))?;

    tracing::debug!("Converted texture {} -> {}", src.display(), dst.display());
    Ok(())
}
