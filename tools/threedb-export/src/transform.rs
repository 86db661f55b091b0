//! Coordinate conversion from normalized 3DB space to glTF space

use glam::Vec3;

/// Default scale applied to normalized 3DB coordinates
pub const MODEL_SCALE: f32 = 100.0;

/// Map a normalized `[0, 1]` position into glTF space
///
/// The model is centered on the origin, scaled by `scale`, and Y and Z are
/// flipped to match glTF's +Y up, +Z forward convention.
pub fn to_gltf_space(p: Vec3, scale: f32) -> Vec3 {
    (p - Vec3::splat(0.5)) * Vec3::new(scale, -scale, -scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_maps_to_origin() {
        for scale in [1.0, MODEL_SCALE, 0.25, 1234.5] {
            assert_eq!(to_gltf_space(Vec3::splat(0.5), scale), Vec3::ZERO);
        }
    }

    #[test]
    fn test_axes_are_flipped() {
        let p = to_gltf_space(Vec3::new(1.0, 1.0, 1.0), MODEL_SCALE);
        assert_eq!(p, Vec3::new(50.0, -50.0, -50.0));

        let p = to_gltf_space(Vec3::ZERO, 2.0);
        assert_eq!(p, Vec3::new(-1.0, 1.0, 1.0));
    }

    #[test]
    fn test_deltas_survive_transform() {
        // Differences scale linearly, so a zero delta stays zero
        let a = Vec3::new(0.25, 0.5, 0.75);
        let b = Vec3::new(0.5, 0.5, 0.75);
        let delta = to_gltf_space(b, MODEL_SCALE) - to_gltf_space(a, MODEL_SCALE);
        assert_eq!(delta, Vec3::new(25.0, 0.0, 0.0));
        assert_eq!(
            to_gltf_space(a, MODEL_SCALE) - to_gltf_space(a, MODEL_SCALE),
            Vec3::ZERO
        );
    }
}
