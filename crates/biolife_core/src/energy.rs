//! Energy bookkeeping: metabolic decay, cell-to-cell diffusion and feeding.

use crate::config::EnergyConfig;
use biolife_data::Cell;

/// Metabolic cost of one tick: grows with body size, speed and age.
#[must_use]
pub fn decay_cost(cell: &Cell, config: &EnergyConfig) -> f32 {
    let v = cell.kinematics.velocity;
    let mass = cell.genome.radius;
    (mass + v.x.abs() + v.y.abs() + cell.life.age as f32 * config.age_factor)
        * config.decay_constant
}

/// Applies the metabolic cost and reports whether the cell starved.
pub fn apply_decay(cell: &mut Cell, config: &EnergyConfig) -> bool {
    cell.energy -= decay_cost(cell, config);
    cell.energy <= 0.0
}

/// Moves a `rate` fraction of the difference from the richer side to the poorer.
pub fn diffuse(a: &mut f32, b: &mut f32, rate: f32) {
    let flow = (*a - *b) * rate;
    *a -= flow;
    *b += flow;
}

/// Feeds up to `amount` from `source` to `sink`; returns what moved.
pub fn transfer(source: &mut f32, sink: &mut f32, amount: f32) -> f32 {
    let moved = amount.min(source.max(0.0));
    *source -= moved;
    *sink += moved;
    moved
}
