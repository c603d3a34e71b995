//! Plain data types shared by the biolife crates.
//!
//! Nothing in here knows how to move, think or reproduce; the behaviour lives
//! in `biolife_core` as logic traits implemented over these structs.

pub mod data;

pub use data::entity::{Cell, Kinematics, LifeState, NeighborRef, Plant, Senses, Species};
pub use data::genotype::{Genome, Perceptron};
pub use data::geometry::{Bounds, Color};
pub use data::record::{
    CellRecord, KinematicsRecord, PlantRecord, SimulationRecord, SNAPSHOT_FORMAT_VERSION,
};
pub use data::stats::{PopulationSample, PopulationStats};
pub use glam::Vec2;
