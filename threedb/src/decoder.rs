//! 3DB grammar decoder
//!
//! The layout is a fixed grammar read in one forward pass. Sections whose
//! meaning is unknown are still consumed so the cursor stays aligned.

use std::path::Path;

use glam::{Vec2, Vec3};

use crate::cursor::ByteCursor;
use crate::error::DecodeError;
use crate::model::{Animation, Keyframe, KeyframeMesh, Material, Model, ModelObject};
use crate::{KEYFRAME_PADDING, SHADOW_BLOCK_SIZE, UNKNOWN_RECORD_SIZE, VERTEX_FIXED_POINT_MAX};

/// Decode a complete 3DB file
///
/// # Arguments
/// * `data` - Raw 3DB file bytes
///
/// # Returns
/// * `Ok(Model)` - Decoded model with every index checked against its table
/// * `Err(DecodeError)` - Truncated, foreign or inconsistent data
pub fn decode(data: &[u8]) -> Result<Model, DecodeError> {
    let mut cursor = ByteCursor::new(data);

    let db_version = cursor.read_string("db version")?;
    let name = cursor.read_string("model name")?;

    let materials = read_materials(&mut cursor)?;
    let keyframes = read_keyframes(&mut cursor)?;
    let objects = read_objects(&mut cursor)?;
    let animations = read_animations(&mut cursor)?;

    skip_shadows(&mut cursor)?;
    skip_cube_maps(&mut cursor)?;

    let pools = read_pools(&mut cursor)?;

    if !cursor.is_at_end() {
        tracing::debug!(
            "{} trailing bytes after brightness pool at offset 0x{:X}",
            cursor.remaining(),
            cursor.offset()
        );
    }

    let model = Model {
        db_version,
        name,
        materials,
        keyframes,
        objects,
        animations,
        triangle_data: pools.triangles,
        texture_coordinates_data: pools.texture_coordinates,
        vertices_data: pools.vertices,
        brightness_data: pools.brightness,
    };
    model.validate()?;

    let summary = model.summary();
    tracing::debug!(
        "Decoded '{}': {} materials, {} keyframes x {} meshes, {} objects, {} animations",
        model.name,
        summary.materials,
        summary.keyframes,
        summary.meshes_per_keyframe,
        summary.objects,
        summary.animations
    );

    Ok(model)
}

/// Read and decode a 3DB file from disk
pub fn decode_file(path: &Path) -> Result<Model, DecodeError> {
    let data = std::fs::read(path).map_err(|source| DecodeError::Io {
        path: path.display().to_string(),
        source,
    })?;
    decode(&data)
}

/// Capacity for `count` records of at least `record_size` bytes
///
/// Keeps a corrupt count from allocating more than the buffer could hold.
fn capacity(cursor: &ByteCursor<'_>, count: usize, record_size: usize) -> usize {
    count.min(cursor.remaining() / record_size.max(1))
}

pub(crate) fn read_materials(cursor: &mut ByteCursor<'_>) -> Result<Vec<Material>, DecodeError> {
    let count = cursor.read_u16("material count")? as usize;
    let mut materials = Vec::with_capacity(capacity(cursor, count, 12));

    for _ in 0..count {
        let name = cursor.read_string("material name")?;
        let texture_path = cursor.read_string("material texture path")?;
        let tag = cursor.read_u32("material tag")?;
        materials.push(Material {
            name,
            texture_path,
            tag,
        });
    }

    Ok(materials)
}

pub(crate) fn read_keyframes(cursor: &mut ByteCursor<'_>) -> Result<Vec<Keyframe>, DecodeError> {
    let count = cursor.read_u32("keyframe count")? as usize;
    let mut keyframes = Vec::with_capacity(capacity(cursor, count, 2));

    for _ in 0..count {
        let link_count = cursor.read_u16("mesh link count")? as usize;
        let mut meshes = Vec::with_capacity(capacity(cursor, link_count, 12));

        for _ in 0..link_count {
            meshes.push(KeyframeMesh {
                material: cursor.read_u16("mesh link material")?,
                unknown: cursor.read_u16("mesh link unknown")?,
                triangles: cursor.read_u16("mesh link triangles")?,
                texture_coordinates: cursor.read_u16("mesh link texture coordinates")?,
                vertices: cursor.read_u16("mesh link vertices")?,
                brightness: cursor.read_u16("mesh link brightness")?,
            });
        }

        // Two vectors of unknown meaning
        cursor.read_vec3("keyframe vector")?;
        cursor.read_vec3("keyframe vector")?;

        for size in KEYFRAME_PADDING {
            cursor.advance(size, "keyframe padding")?;
        }

        keyframes.push(Keyframe { meshes });
    }

    Ok(keyframes)
}

pub(crate) fn read_objects(cursor: &mut ByteCursor<'_>) -> Result<Vec<ModelObject>, DecodeError> {
    let count = cursor.read_u16("object count")? as usize;
    let mut objects: Vec<ModelObject> = Vec::with_capacity(capacity(cursor, count, 6));

    for _ in 0..count {
        let name = cursor.read_string("object name")?;
        let value_count = cursor.read_u16("object animation count")? as usize;
        let mut animations = Vec::with_capacity(capacity(cursor, value_count, 4));
        for _ in 0..value_count {
            animations.push(cursor.read_u32("object animation index")?);
        }

        // A repeated name replaces the earlier entry but keeps its position
        match objects.iter_mut().find(|o| o.name == name) {
            Some(existing) => {
                tracing::debug!("Object '{}' defined twice, keeping the later entry", name);
                existing.animations = animations;
            }
            None => objects.push(ModelObject { name, animations }),
        }
    }

    Ok(objects)
}

pub(crate) fn read_animations(cursor: &mut ByteCursor<'_>) -> Result<Vec<Animation>, DecodeError> {
    let count = cursor.read_u16("animation count")? as usize;
    let mut animations = Vec::with_capacity(capacity(cursor, count, 6));

    for _ in 0..count {
        let name = cursor.read_string("animation name")?;
        let keyframe_count = cursor.read_u16("animation keyframe count")? as usize;
        let mut keyframes = Vec::with_capacity(capacity(cursor, keyframe_count, 4));
        for _ in 0..keyframe_count {
            keyframes.push(cursor.read_u32("animation keyframe index")?);
        }

        // Unmodeled fields, consumed to stay aligned
        cursor.read_u16("animation unknown u16")?;
        cursor.read_f32("animation unknown f32")?;
        cursor.read_prefixed_bytes("animation unknown string")?;
        cursor.read_vec3("animation unknown vector")?;
        cursor.read_vec3("animation unknown vector")?;

        animations.push(Animation { name, keyframes });
    }

    Ok(animations)
}

fn skip_shadows(cursor: &mut ByteCursor<'_>) -> Result<(), DecodeError> {
    let count = cursor.read_u16("shadow count")?;
    for _ in 0..count {
        cursor.advance(SHADOW_BLOCK_SIZE, "shadow block")?;
    }
    Ok(())
}

fn skip_cube_maps(cursor: &mut ByteCursor<'_>) -> Result<(), DecodeError> {
    let count = cursor.read_u16("cube map count")?;
    for _ in 0..count {
        let width = cursor.read_u16("cube map width")? as usize;
        let height = cursor.read_u16("cube map height")? as usize;
        cursor.read_u16("cube map unknown")?;
        cursor.read_u16("cube map unknown")?;
        cursor.advance(width * height, "cube map pixels")?;
    }
    Ok(())
}

/// The four shared data pools
pub(crate) struct Pools {
    pub triangles: Vec<Vec<u16>>,
    pub texture_coordinates: Vec<Vec<Vec2>>,
    pub vertices: Vec<Vec<Vec3>>,
    pub brightness: Vec<Vec<u8>>,
}

fn read_counts(
    cursor: &mut ByteCursor<'_>,
    count: usize,
    field: &'static str,
) -> Result<Vec<usize>, DecodeError> {
    let mut counts = Vec::with_capacity(capacity(cursor, count, 2));
    for _ in 0..count {
        counts.push(cursor.read_u16(field)? as usize);
    }
    Ok(counts)
}

fn read_pool<T>(
    cursor: &mut ByteCursor<'_>,
    counts: &[usize],
    element_size: usize,
    mut read: impl FnMut(&mut ByteCursor<'_>) -> Result<T, DecodeError>,
) -> Result<Vec<Vec<T>>, DecodeError> {
    let mut pool = Vec::with_capacity(counts.len());
    for &count in counts {
        let mut entry = Vec::with_capacity(capacity(cursor, count, element_size));
        for _ in 0..count {
            entry.push(read(cursor)?);
        }
        pool.push(entry);
    }
    Ok(pool)
}

fn read_fixed_point(cursor: &mut ByteCursor<'_>) -> Result<f32, DecodeError> {
    Ok(cursor.read_u16("vertex pool")? as f32 / VERTEX_FIXED_POINT_MAX)
}

pub(crate) fn read_pools(cursor: &mut ByteCursor<'_>) -> Result<Pools, DecodeError> {
    let triangle_count = cursor.read_u16("triangle pool size")? as usize;
    let texture_coordinate_count = cursor.read_u16("texture coordinate pool size")? as usize;
    let vertex_count = cursor.read_u16("vertex pool size")? as usize;
    let brightness_count = cursor.read_u16("brightness pool size")? as usize;
    let unknown_count = cursor.read_u32("unknown record count")? as usize;

    let triangle_counts = read_counts(cursor, triangle_count, "triangle element count")?;
    let texture_coordinate_counts = read_counts(
        cursor,
        texture_coordinate_count,
        "texture coordinate element count",
    )?;
    let vertex_counts = read_counts(cursor, vertex_count, "vertex element count")?;
    let brightness_counts = read_counts(cursor, brightness_count, "brightness element count")?;

    for _ in 0..unknown_count {
        cursor.advance(UNKNOWN_RECORD_SIZE, "unknown record")?;
    }

    let triangles = read_pool(cursor, &triangle_counts, 2, |c| c.read_u16("triangle pool"))?;

    let texture_coordinates = read_pool(cursor, &texture_coordinate_counts, 8, |c| {
        let u = c.read_f32("texture coordinate pool")?;
        let v = c.read_f32("texture coordinate pool")?;
        Ok(Vec2::new(u, v))
    })?;

    let vertices = read_pool(cursor, &vertex_counts, 6, |c| {
        let x = read_fixed_point(c)?;
        let y = read_fixed_point(c)?;
        let z = read_fixed_point(c)?;
        Ok(Vec3::new(x, y, z))
    })?;

    let brightness = read_pool(cursor, &brightness_counts, 1, |c| c.read_u8("brightness pool"))?;

    Ok(Pools {
        triangles,
        texture_coordinates,
        vertices,
        brightness,
    })
}
