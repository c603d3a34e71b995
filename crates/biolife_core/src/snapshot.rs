//! Conversion between live entities and their persisted records.
//!
//! Records are validated before any entity is touched, so a load either
//! hydrates everything or nothing.

use crate::brain::{BrainError, PerceptronLogic};
use biolife_data::{
    Bounds, Cell, CellRecord, Kinematics, KinematicsRecord, LifeState, Plant, PlantRecord,
    Senses, SimulationRecord, Vec2, SNAPSHOT_FORMAT_VERSION,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("{kind} record {index}: {reason}")]
    InvalidRecord {
        kind: &'static str,
        index: usize,
        reason: String,
    },

    #[error("{kind} record {index}: {source}")]
    Brain {
        kind: &'static str,
        index: usize,
        #[source]
        source: BrainError,
    },

    #[error("{count} {kind} records exceed capacity {capacity}")]
    TooManyEntities {
        kind: &'static str,
        count: usize,
        capacity: usize,
    },
}

fn kinematics_record(k: &Kinematics) -> KinematicsRecord {
    KinematicsRecord {
        position: k.position,
        position_previous: k.position_previous,
        velocity: k.velocity,
        radius: k.radius,
    }
}

fn hydrate_kinematics(k: &mut Kinematics, r: &KinematicsRecord) {
    *k = Kinematics {
        position: r.position,
        position_previous: r.position_previous,
        velocity: r.velocity,
        published: k.published,
        radius: r.radius,
        ..Kinematics::default()
    };
}

#[must_use]
pub fn cell_to_record(cell: &Cell) -> CellRecord {
    let mut perceptron = cell.perceptron.clone();
    perceptron.outputs.clear();
    perceptron.scratch.clear();
    CellRecord {
        kinematics: kinematics_record(&cell.kinematics),
        genome: cell.genome,
        perceptron,
        energy: cell.energy,
        age: cell.life.age,
        time_alone: cell.time_alone,
        reproduce_counter: cell.reproduce_counter,
        offspring: cell.offspring,
        generation: cell.generation,
        wants_reproduce: cell.life.wants_reproduce,
    }
}

#[must_use]
pub fn plant_to_record(plant: &Plant) -> PlantRecord {
    PlantRecord {
        kinematics: kinematics_record(&plant.kinematics),
        energy: plant.energy,
        species_marker: plant.species_marker,
        color: plant.color,
        age: plant.life.age,
        wants_reproduce: plant.life.wants_reproduce,
    }
}

fn finite(v: Vec2) -> bool {
    v.is_finite()
}

fn check_kinematics(r: &KinematicsRecord, border: &Bounds) -> Result<(), String> {
    if !(r.radius > 0.0 && r.radius.is_finite()) {
        return Err(format!("radius {} must be positive", r.radius));
    }
    if !finite(r.position) || !finite(r.position_previous) || !finite(r.velocity) {
        return Err("non-finite position or velocity".to_string());
    }
    // Anything outside the border would fail the next grid rebuild.
    if !border.contains(r.position) {
        return Err(format!(
            "position {} lies outside the border {:?}",
            r.position, border
        ));
    }
    Ok(())
}

pub fn validate_cell_record(
    index: usize,
    r: &CellRecord,
    border: &Bounds,
) -> Result<(), SnapshotError> {
    let invalid = |reason: String| SnapshotError::InvalidRecord {
        kind: "cell",
        index,
        reason,
    };
    check_kinematics(&r.kinematics, border).map_err(invalid)?;
    if !r.energy.is_finite() {
        return Err(invalid("non-finite energy".to_string()));
    }
    if (r.genome.radius - r.kinematics.radius).abs() > f32::EPSILON {
        return Err(invalid(format!(
            "genome radius {} disagrees with body radius {}",
            r.genome.radius, r.kinematics.radius
        )));
    }
    if !(r.genome.max_speed >= 0.0 && r.genome.max_speed.is_finite()) {
        return Err(invalid(format!("max speed {}", r.genome.max_speed)));
    }
    r.perceptron.validate().map_err(|source| SnapshotError::Brain {
        kind: "cell",
        index,
        source,
    })?;
    let inputs = r.perceptron.num_inputs();
    let outputs = r.perceptron.num_outputs();
    if inputs != crate::brain::BRAIN_INPUTS || outputs != crate::brain::BRAIN_OUTPUTS {
        return Err(invalid(format!(
            "perceptron maps {inputs} -> {outputs}, expected {} -> {}",
            crate::brain::BRAIN_INPUTS,
            crate::brain::BRAIN_OUTPUTS
        )));
    }
    Ok(())
}

pub fn validate_plant_record(
    index: usize,
    r: &PlantRecord,
    border: &Bounds,
) -> Result<(), SnapshotError> {
    let invalid = |reason: String| SnapshotError::InvalidRecord {
        kind: "plant",
        index,
        reason,
    };
    check_kinematics(&r.kinematics, border).map_err(invalid)?;
    if !r.energy.is_finite() || !r.species_marker.is_finite() {
        return Err(invalid("non-finite energy or marker".to_string()));
    }
    Ok(())
}

/// Checks the header and every record against the pool capacities and the
/// border every live entity must sit inside.
pub fn validate_record(
    record: &SimulationRecord,
    cell_capacity: usize,
    plant_capacity: usize,
    border: &Bounds,
) -> Result<(), SnapshotError> {
    if record.format_version != SNAPSHOT_FORMAT_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            found: record.format_version,
            expected: SNAPSHOT_FORMAT_VERSION,
        });
    }
    if record.cells.len() > cell_capacity {
        return Err(SnapshotError::TooManyEntities {
            kind: "cell",
            count: record.cells.len(),
            capacity: cell_capacity,
        });
    }
    if record.plants.len() > plant_capacity {
        return Err(SnapshotError::TooManyEntities {
            kind: "plant",
            count: record.plants.len(),
            capacity: plant_capacity,
        });
    }
    for (i, r) in record.cells.iter().enumerate() {
        validate_cell_record(i, r, border)?;
    }
    for (i, r) in record.plants.iter().enumerate() {
        validate_plant_record(i, r, border)?;
    }
    Ok(())
}

/// Overwrites every persisted field of `cell`; transient state is cleared.
pub fn hydrate_cell(cell: &mut Cell, r: &CellRecord) {
    hydrate_kinematics(&mut cell.kinematics, &r.kinematics);
    cell.genome = r.genome;
    cell.perceptron = r.perceptron.clone();
    cell.energy = r.energy;
    cell.life = LifeState {
        age: r.age,
        alive: true,
        wants_reproduce: r.wants_reproduce,
    };
    cell.time_alone = r.time_alone;
    cell.reproduce_counter = r.reproduce_counter;
    cell.offspring = r.offspring;
    cell.generation = r.generation;
    cell.senses = Senses::default();
}

pub fn hydrate_plant(plant: &mut Plant, r: &PlantRecord) {
    hydrate_kinematics(&mut plant.kinematics, &r.kinematics);
    plant.energy = r.energy;
    plant.species_marker = r.species_marker;
    plant.color = r.color;
    plant.life = LifeState {
        age: r.age,
        alive: true,
        wants_reproduce: r.wants_reproduce,
    };
    plant.neighbors = 0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::lifecycle::reset_cell_random;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const BORDER: Bounds = Bounds::new(0.0, 0.0, 500.0, 500.0);

    fn live_cell() -> Cell {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut cell = Cell::default();
        reset_cell_random(
            &mut cell,
            &AppConfig::default(),
            &BORDER,
            &mut rng,
        );
        cell.kinematics.velocity = Vec2::new(0.25, -0.5);
        cell.life.age = 321;
        cell.offspring = 2;
        cell.generation = 5;
        cell
    }

    #[test]
    fn test_cell_round_trip_into_stale_slot() {
        let original = live_cell();
        let record = cell_to_record(&original);

        let mut target = Cell {
            slot: 17,
            time_alone: 99,
            energy: -5.0,
            ..Default::default()
        };
        hydrate_cell(&mut target, &record);

        assert_eq!(target.slot, 17);
        assert_eq!(target.kinematics.position, original.kinematics.position);
        assert_eq!(target.kinematics.velocity, original.kinematics.velocity);
        assert_eq!(target.genome, original.genome);
        assert_eq!(target.perceptron.weights, original.perceptron.weights);
        assert_eq!(target.life, original.life);
        assert_eq!(target.time_alone, original.time_alone);
        assert_eq!(target.energy, original.energy);
        assert_eq!(cell_to_record(&target), record);
    }

    #[test]
    fn test_truncated_weights_rejected() {
        let mut record = cell_to_record(&live_cell());
        record.perceptron.weights.pop();
        assert!(matches!(
            validate_cell_record(3, &record, &BORDER),
            Err(SnapshotError::Brain { index: 3, .. })
        ));
    }

    #[test]
    fn test_non_positive_radius_rejected() {
        let mut record = cell_to_record(&live_cell());
        record.kinematics.radius = 0.0;
        assert!(matches!(
            validate_cell_record(0, &record, &BORDER),
            Err(SnapshotError::InvalidRecord { kind: "cell", .. })
        ));
    }

    #[test]
    fn test_position_outside_border_rejected() {
        let mut record = cell_to_record(&live_cell());
        record.kinematics.position = Vec2::new(50_000.0, 50_000.0);
        assert!(matches!(
            validate_cell_record(0, &record, &BORDER),
            Err(SnapshotError::InvalidRecord { kind: "cell", index: 0, .. })
        ));

        let mut plant = plant_to_record(&Plant::default());
        plant.kinematics.radius = 8.0;
        plant.kinematics.position = Vec2::new(-1.0, 10.0);
        assert!(validate_plant_record(2, &plant, &BORDER).is_err());
        plant.kinematics.position = Vec2::new(10.0, 10.0);
        assert!(validate_plant_record(2, &plant, &BORDER).is_ok());
    }
}
