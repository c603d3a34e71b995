use super::*;
use rand::Rng;

pub fn mutate_into<R: Rng>(parent: &Perceptron, child: &mut Perceptron, rng: &mut R) -> usize {
    child.layer_sizes.clone_from(&parent.layer_sizes);
    child.weights.clone_from(&parent.weights);
    child.mutation_rate = parent.mutation_rate;
    child.mutation_range = parent.mutation_range;
    child.outputs.clear();

    let rate = parent.mutation_rate;
    let range = parent.mutation_range;
    let mut redrawn = 0;
    for (dst, &src) in child.weights.iter_mut().zip(parent.weights.iter()) {
        if rng.gen::<f32>() < rate {
            *dst = src + rng.gen_range(-1.0..1.0) * range;
            redrawn += 1;
        }
    }
    redrawn
}
