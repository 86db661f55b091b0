//! Keyframe timing and one-hot morph target weights

/// Default playback rate in keyframes per second
pub const DEFAULT_FRAME_RATE: f32 = 10.0;

/// Slowest accepted playback rate
///
/// Keeps `k / frame_rate` finite for every keyframe index a 3DB animation can
/// hold (`u16` count).
pub const MIN_FRAME_RATE: f32 = 1.0e-3;

/// Whether `frame_rate` yields finite, strictly increasing keyframe times
pub fn is_valid_frame_rate(frame_rate: f32) -> bool {
    frame_rate.is_finite() && frame_rate >= MIN_FRAME_RATE
}

/// Sampler input times for `keyframe_count` keyframes: `k / frame_rate`
pub fn keyframe_times(keyframe_count: usize, frame_rate: f32) -> Vec<f32> {
    (0..keyframe_count).map(|k| k as f32 / frame_rate).collect()
}

/// Row-major weight matrix for one animation
///
/// The animation owns targets `offset..offset + keyframe_count` out of
/// `total_targets`. Row `k` sets its own `k`-th target to 1.0, every other
/// target (including those of other animations) stays at 0.0.
pub fn one_hot_weights(keyframe_count: usize, offset: usize, total_targets: usize) -> Vec<f32> {
    let mut weights = vec![0.0; keyframe_count * total_targets];
    for k in 0..keyframe_count {
        let column = offset + k;
        if column < total_targets {
            weights[k * total_targets + column] = 1.0;
        }
    }
    weights
}
