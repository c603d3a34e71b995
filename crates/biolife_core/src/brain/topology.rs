use super::*;
use rand::Rng;

/// Input layer, the given hidden widths, output layer.
#[must_use]
pub fn layer_sizes_with_hidden(hidden: &[usize]) -> Vec<usize> {
    let mut sizes = Vec::with_capacity(hidden.len() + 2);
    sizes.push(BRAIN_INPUTS);
    sizes.extend_from_slice(hidden);
    sizes.push(BRAIN_OUTPUTS);
    sizes
}

/// Fully connected network with weights drawn from `U(-1, 1)`.
pub fn create_perceptron_random_with_rng<R: Rng>(
    layer_sizes: &[usize],
    mutation_rate: f32,
    mutation_range: f32,
    rng: &mut R,
) -> Perceptron {
    let count: usize = layer_sizes.windows(2).map(|w| w[0] * w[1]).sum();
    let weights = (0..count).map(|_| rng.gen_range(-1.0..1.0)).collect();
    Perceptron {
        layer_sizes: layer_sizes.to_vec(),
        weights,
        mutation_rate,
        mutation_range,
        outputs: Vec::new(),
        scratch: Vec::new(),
    }
}

pub fn validate(p: &Perceptron) -> Result<(), BrainError> {
    if p.layer_sizes.len() < 2 || p.layer_sizes.contains(&0) {
        return Err(BrainError::InvalidTopology(p.layer_sizes.clone()));
    }
    let expected = p.expected_weight_count();
    if p.weights.len() != expected {
        return Err(BrainError::WeightCountMismatch {
            expected,
            actual: p.weights.len(),
        });
    }
    Ok(())
}
