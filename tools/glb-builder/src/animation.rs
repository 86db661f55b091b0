//! Morph target weight animation tracks

use crate::buffer::{AccessorIndex, BufferBuilder, BufferIndex};

/// Accessor indices for a weight animation
#[derive(Debug, Clone, Copy)]
pub struct WeightAccessors {
    pub times: AccessorIndex,
    pub weights: AccessorIndex,
}

/// Builder for a morph target weight track
///
/// glTF stores weight outputs flattened: one row of `target_count` weights
/// per keyframe time.
pub struct WeightAnimationBuilder {
    target_count: usize,
    times: Vec<f32>,
    weights: Vec<f32>,
}

impl WeightAnimationBuilder {
    /// Create new builder for a mesh with `target_count` morph targets
    pub fn new(target_count: usize) -> Self {
        Self {
            target_count,
            times: Vec::new(),
            weights: Vec::new(),
        }
    }

    /// Set animation times (keyframes)
    pub fn times(mut self, times: &[f32]) -> Self {
        self.times = times.to_vec();
        self
    }

    /// Set the flattened weight matrix (`times.len() * target_count` values)
    pub fn weights(mut self, weights: &[f32]) -> Self {
        self.weights = weights.to_vec();
        self
    }

    /// Build animation and pack into buffers
    ///
    /// Times get min/max bounds as glTF requires for sampler inputs.
    /// Weights must hold exactly `target_count` values per time.
    pub fn build(
        self,
        buffer: &mut BufferBuilder,
        times_buffer: BufferIndex,
        weights_buffer: BufferIndex,
    ) -> WeightAccessors {
        debug_assert_eq!(
            self.weights.len(),
            self.times.len() * self.target_count,
            "weight matrix does not match times x targets"
        );
        let times = buffer.pack_scalars_with_bounds(times_buffer, &self.times);
        let weights = buffer.pack_scalars(weights_buffer, &self.weights);
        WeightAccessors { times, weights }
    }
}
