use super::genotype::{Genome, Perceptron};
use super::geometry::Color;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Which pool an entity lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Cell,
    Plant,
}

/// Motion state shared by every entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Kinematics {
    pub position: Vec2,
    pub position_previous: Vec2,
    pub velocity: Vec2,
    /// Collision and border corrections gathered during the tick.
    pub pending_displacement: Vec2,
    /// Position the renderer last saw.
    pub published: Vec2,
    /// Net movement reported to the renderer on the last publish.
    pub last_delta: Vec2,
    pub radius: f32,
}

/// Age and lifecycle flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LifeState {
    pub age: u32,
    pub alive: bool,
    pub wants_reproduce: bool,
}

/// Same-tick reference to another entity, resolved through its pool on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NeighborRef {
    pub slot: usize,
    pub species: Species,
}

/// What a cell perceived during the sense pass of the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Senses {
    pub closest_cell: Option<NeighborRef>,
    pub closest_plant: Option<NeighborRef>,
    pub nearby_cells: u32,
    pub nearby_plants: u32,
}

/// Mobile organism driven by its perceptron.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub slot: usize,
    pub kinematics: Kinematics,
    pub life: LifeState,
    pub genome: Genome,
    pub perceptron: Perceptron,
    pub energy: f32,
    pub time_alone: u32,
    pub reproduce_counter: u32,
    pub offspring: u32,
    pub generation: u32,
    pub senses: Senses,
}

/// Slow-drifting food source.
#[derive(Debug, Clone, Default)]
pub struct Plant {
    pub slot: usize,
    pub kinematics: Kinematics,
    pub life: LifeState,
    pub energy: f32,
    /// Continuous trait; similar markers attract, distant ones repel.
    pub species_marker: f32,
    pub color: Color,
    /// In-range plant neighbours counted on the last update.
    pub neighbors: u32,
}
