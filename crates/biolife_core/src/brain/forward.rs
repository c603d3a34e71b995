use super::*;

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

pub(crate) fn check_inputs(p: &Perceptron, inputs: &[f32]) -> Result<(), BrainError> {
    if inputs.len() != p.num_inputs() {
        return Err(BrainError::InputSizeMismatch {
            expected: p.num_inputs(),
            actual: inputs.len(),
        });
    }
    Ok(())
}

/// Layer-by-layer pass over a validated layout; the result ends up in `front`.
///
/// Hidden layers emit the plain sigmoid, the output layer maps it to
/// `[-1, 1]` with `2y - 1`.
pub fn propagate(
    layer_sizes: &[usize],
    weights: &[f32],
    inputs: &[f32],
    front: &mut Vec<f32>,
    back: &mut Vec<f32>,
) {
    front.clear();
    front.extend_from_slice(inputs);
    let last_layer = layer_sizes.len().saturating_sub(2);
    let mut offset = 0;
    for (layer, pair) in layer_sizes.windows(2).enumerate() {
        let (n_in, n_out) = (pair[0], pair[1]);
        back.clear();
        for o in 0..n_out {
            let row = &weights[offset + o * n_in..offset + (o + 1) * n_in];
            let sum: f32 = row.iter().zip(front.iter()).map(|(w, x)| w * x).sum();
            let y = sigmoid(sum);
            back.push(if layer == last_layer { 2.0 * y - 1.0 } else { y });
        }
        offset += n_in * n_out;
        std::mem::swap(front, back);
    }
}
