pub mod forward;
pub mod mutation;
pub mod topology;

pub use biolife_data::Perceptron;
use rand::Rng;
use thiserror::Error;

pub use topology::{create_perceptron_random_with_rng, layer_sizes_with_hidden};

pub const INPUT_LABELS: [&str; 10] = [
    "CellDX",
    "CellDY",
    "CellVX",
    "CellVY",
    "PlantDX",
    "PlantDY",
    "Energy",
    "NearbyCells",
    "NearbyPlants",
    "Bias",
];

pub const OUTPUT_LABELS: [&str; 5] = ["SteerCell", "SteerPlant", "MoveX", "MoveY", "Friction"];

pub const BRAIN_INPUTS: usize = INPUT_LABELS.len();
pub const BRAIN_OUTPUTS: usize = OUTPUT_LABELS.len();

pub const OUT_STEER_CELL: usize = 0;
pub const OUT_STEER_PLANT: usize = 1;
pub const OUT_MOVE_X: usize = 2;
pub const OUT_MOVE_Y: usize = 3;
pub const OUT_FRICTION: usize = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrainError {
    #[error("expected {expected} inputs, got {actual}")]
    InputSizeMismatch { expected: usize, actual: usize },

    #[error("layout needs {expected} weights, found {actual}")]
    WeightCountMismatch { expected: usize, actual: usize },

    #[error("invalid layer layout {0:?}")]
    InvalidTopology(Vec<usize>),
}

/// Behaviour of the feed-forward perceptron stored in [`Perceptron`].
pub trait PerceptronLogic {
    fn new_random_with_rng<R: Rng>(
        layer_sizes: &[usize],
        mutation_rate: f32,
        mutation_range: f32,
        rng: &mut R,
    ) -> Self;

    /// Runs the network and keeps the decision vector in `outputs`.
    fn compute_output(&mut self, inputs: &[f32]) -> Result<&[f32], BrainError>;

    /// Allocating forward pass that leaves `self` untouched.
    fn forward(&self, inputs: &[f32]) -> Result<Vec<f32>, BrainError>;

    /// Copies `self` into `target` and redraws single weights with
    /// probability `mutation_rate`. Returns how many weights were redrawn.
    fn mutate_into<R: Rng>(&self, target: &mut Perceptron, rng: &mut R) -> usize;

    fn validate(&self) -> Result<(), BrainError>;
}

impl PerceptronLogic for Perceptron {
    fn new_random_with_rng<R: Rng>(
        layer_sizes: &[usize],
        mutation_rate: f32,
        mutation_range: f32,
        rng: &mut R,
    ) -> Self {
        create_perceptron_random_with_rng(layer_sizes, mutation_rate, mutation_range, rng)
    }

    fn compute_output(&mut self, inputs: &[f32]) -> Result<&[f32], BrainError> {
        self.validate()?;
        forward::check_inputs(self, inputs)?;
        let mut front = std::mem::take(&mut self.outputs);
        let mut back = std::mem::take(&mut self.scratch);
        forward::propagate(&self.layer_sizes, &self.weights, inputs, &mut front, &mut back);
        self.outputs = front;
        self.scratch = back;
        Ok(&self.outputs)
    }

    fn forward(&self, inputs: &[f32]) -> Result<Vec<f32>, BrainError> {
        self.validate()?;
        forward::check_inputs(self, inputs)?;
        let mut front = Vec::with_capacity(inputs.len());
        let mut back = Vec::new();
        forward::propagate(&self.layer_sizes, &self.weights, inputs, &mut front, &mut back);
        Ok(front)
    }

    fn mutate_into<R: Rng>(&self, target: &mut Perceptron, rng: &mut R) -> usize {
        mutation::mutate_into(self, target, rng)
    }

    fn validate(&self) -> Result<(), BrainError> {
        topology::validate(self)
    }
}
