use super::geometry::Color;
use serde::{Deserialize, Serialize};

/// Heritable, non-neural traits of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Genome {
    /// Body radius in world units.
    pub radius: f32,
    /// Upper bound on the cell's speed per tick.
    pub max_speed: f32,
    /// Own mutation rate, used as the amplitude of the max-speed drift.
    pub mutation_rate: f32,
    pub color: Color,
}

/// Fully connected feed-forward network.
///
/// `layer_sizes` lists the node count of every layer from input to output.
/// Weights are stored layer after layer; inside a layer they are grouped by
/// destination node, so the weight from input `i` to output `o` of layer `l`
/// sits at `offset(l) + o * layer_sizes[l] + i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Perceptron {
    pub layer_sizes: Vec<usize>,
    pub weights: Vec<f32>,
    /// Per-weight probability of being redrawn when the network is inherited.
    pub mutation_rate: f32,
    /// Amplitude of a redrawn weight's offset from its parent value.
    pub mutation_range: f32,
    /// Decision vector of the last forward pass.
    #[serde(skip, default)]
    pub outputs: Vec<f32>,
    /// Ping-pong activation buffers (not serialized).
    #[serde(skip, default)]
    pub scratch: Vec<f32>,
}

impl Perceptron {
    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.layer_sizes.first().copied().unwrap_or(0)
    }

    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.layer_sizes.last().copied().unwrap_or(0)
    }

    /// Number of weights the layer layout requires.
    #[must_use]
    pub fn expected_weight_count(&self) -> usize {
        self.layer_sizes.windows(2).map(|w| w[0] * w[1]).sum()
    }
}
