//! Flat records used to persist and restore live entities.
//!
//! Every field is required on load: a missing field is a deserialization
//! error, never a silently defaulted value.

use super::genotype::{Genome, Perceptron};
use super::geometry::Color;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicsRecord {
    pub position: Vec2,
    pub position_previous: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub kinematics: KinematicsRecord,
    pub genome: Genome,
    pub perceptron: Perceptron,
    pub energy: f32,
    pub age: u32,
    pub time_alone: u32,
    pub reproduce_counter: u32,
    pub offspring: u32,
    pub generation: u32,
    pub wants_reproduce: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantRecord {
    pub kinematics: KinematicsRecord,
    pub energy: f32,
    pub species_marker: f32,
    pub color: Color,
    pub age: u32,
    pub wants_reproduce: bool,
}

/// Whole-simulation snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    pub format_version: u32,
    pub run_id: Uuid,
    /// RFC 3339 timestamp of the save.
    pub saved_at: String,
    pub config_fingerprint: String,
    pub total_ticks: u64,
    pub relative_ticks: u64,
    pub total_extinctions: u32,
    pub cells: Vec<CellRecord>,
    pub plants: Vec<PlantRecord>,
}
