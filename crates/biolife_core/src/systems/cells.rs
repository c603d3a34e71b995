//! Cell sensing, decision and action.
//!
//! Sensing only reads shared state and may run in parallel; acting mutates
//! both pools and runs in slot order.

use super::TickContext;
use crate::brain::{
    PerceptronLogic, BRAIN_INPUTS, BRAIN_OUTPUTS, OUT_FRICTION, OUT_MOVE_X, OUT_MOVE_Y,
    OUT_STEER_CELL, OUT_STEER_PLANT,
};
use crate::config::AppConfig;
use crate::energy;
use crate::physics::{drag_resistance, KinematicsLogic};
use crate::pool::EntityPool;
use crate::spatial_hash::{EntityId, GridError, NeighborBuffer, SpatialHashGrid, NEIGHBOR_CAPACITY};
use biolife_data::{Cell, NeighborRef, Plant, Senses, Species, Vec2};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub type SensoryInput = [f32; BRAIN_INPUTS];

/// Neighbourhood count at which a cell dies of crowding.
pub const CROWDING_LIMIT: u32 = (NEIGHBOR_CAPACITY / 4) as u32;

/// Counters from one act pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CellTally {
    pub contacts: usize,
    pub feedings: usize,
    pub starved: usize,
    pub isolated: usize,
    pub crowded: usize,
    pub want_divide: usize,
}

/// Scans the 3x3 neighbourhood of `slot` for the closest live cell and plant
/// within the cell's visual range.
///
/// Candidates are ranked by squared distance minus the candidate's squared
/// radius, so a large body just out of reach can win over a small one.
pub fn sense_cell(
    slot: usize,
    cells: &EntityPool<Cell>,
    plants: &EntityPool<Plant>,
    grid: &SpatialHashGrid,
    config: &AppConfig,
    buffer: &mut NeighborBuffer,
) -> Result<Senses, GridError> {
    let me = cells.at(slot);
    let position = me.kinematics.position;
    let range_sq = config.cell.visual_range * config.cell.visual_range;
    grid.query(position, buffer)?;

    let mut senses = Senses::default();
    let mut best_cell = f32::INFINITY;
    let mut best_plant = f32::INFINITY;
    for id in buffer.iter() {
        let (kinematics, species) = match id {
            EntityId::Cell(j) if j != slot => match cells.get(j) {
                Some(c) if c.life.alive => (&c.kinematics, Species::Cell),
                _ => continue,
            },
            EntityId::Plant(j) => match plants.get(j) {
                Some(p) if p.life.alive => (&p.kinematics, Species::Plant),
                _ => continue,
            },
            EntityId::Cell(_) => continue,
        };
        let dist_sq = kinematics.position.distance_squared(position);
        if dist_sq > range_sq {
            continue;
        }
        let adjusted = dist_sq - kinematics.radius * kinematics.radius;
        let neighbor = NeighborRef {
            slot: id.slot(),
            species,
        };
        match species {
            Species::Cell => {
                senses.nearby_cells += 1;
                if adjusted < best_cell {
                    best_cell = adjusted;
                    senses.closest_cell = Some(neighbor);
                }
            }
            Species::Plant => {
                senses.nearby_plants += 1;
                if adjusted < best_plant {
                    best_plant = adjusted;
                    senses.closest_plant = Some(neighbor);
                }
            }
        }
    }
    Ok(senses)
}

/// Sensory vector for the perceptron. Missing neighbours read as zeros.
#[must_use]
pub fn build_inputs(
    cell: &Cell,
    senses: &Senses,
    cells: &EntityPool<Cell>,
    plants: &EntityPool<Plant>,
    config: &AppConfig,
) -> SensoryInput {
    let mut inputs = [0.0; BRAIN_INPUTS];
    let range = config.cell.visual_range;
    let me = &cell.kinematics;
    if let Some(other) = senses.closest_cell.and_then(|r| cells.get(r.slot)) {
        let d = (other.kinematics.position - me.position) / range;
        let v = other.kinematics.velocity - me.velocity;
        inputs[0] = d.x;
        inputs[1] = d.y;
        inputs[2] = v.x;
        inputs[3] = v.y;
    }
    if let Some(plant) = senses.closest_plant.and_then(|r| plants.get(r.slot)) {
        let d = (plant.kinematics.position - me.position) / range;
        inputs[4] = d.x;
        inputs[5] = d.y;
    }
    inputs[6] = cell.energy / config.energy.reproduction_threshold;
    inputs[7] = senses.nearby_cells as f32 / NEIGHBOR_CAPACITY as f32;
    inputs[8] = senses.nearby_plants as f32 / NEIGHBOR_CAPACITY as f32;
    inputs[9] = 1.0;
    inputs
}

fn sense_one(
    slot: usize,
    cells: &EntityPool<Cell>,
    plants: &EntityPool<Plant>,
    grid: &SpatialHashGrid,
    config: &AppConfig,
    buffer: &mut NeighborBuffer,
) -> Result<(Senses, SensoryInput), GridError> {
    let senses = sense_cell(slot, cells, plants, grid, config, buffer)?;
    let inputs = build_inputs(cells.at(slot), &senses, cells, plants, config);
    Ok((senses, inputs))
}

#[cfg(feature = "parallel")]
fn sense_all(
    cells: &EntityPool<Cell>,
    plants: &EntityPool<Plant>,
    grid: &SpatialHashGrid,
    config: &AppConfig,
    order: &[usize],
) -> Result<Vec<(Senses, SensoryInput)>, GridError> {
    order
        .par_iter()
        .map_init(NeighborBuffer::new, |buffer, &slot| {
            sense_one(slot, cells, plants, grid, config, buffer)
        })
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn sense_all(
    cells: &EntityPool<Cell>,
    plants: &EntityPool<Plant>,
    grid: &SpatialHashGrid,
    config: &AppConfig,
    order: &[usize],
) -> Result<Vec<(Senses, SensoryInput)>, GridError> {
    let mut buffer = NeighborBuffer::new();
    order
        .iter()
        .map(|&slot| sense_one(slot, cells, plants, grid, config, &mut buffer))
        .collect()
}

/// Sense pass followed by the decision pass for every cell in `order`.
pub fn sense_and_decide(
    cells: &mut EntityPool<Cell>,
    plants: &EntityPool<Plant>,
    grid: &SpatialHashGrid,
    config: &AppConfig,
    order: &[usize],
) -> anyhow::Result<()> {
    let readings = sense_all(cells, plants, grid, config, order)?;

    for (&slot, (senses, inputs)) in order.iter().zip(readings) {
        let cell = cells.at_mut(slot);
        cell.senses = senses;
        cell.perceptron.compute_output(&inputs).map_err(|e| {
            anyhow::anyhow!("cell {slot}: perceptron rejected sensory input: {e}")
        })?;
    }
    Ok(())
}

fn decision(cell: &Cell) -> [f32; BRAIN_OUTPUTS] {
    let mut out = [0.0; BRAIN_OUTPUTS];
    if cell.perceptron.outputs.len() == BRAIN_OUTPUTS {
        out.copy_from_slice(&cell.perceptron.outputs);
    }
    out
}

/// Applies every cell's decision, resolves contacts and settles its fate.
///
/// Closest-neighbour references are re-checked before use: a neighbour that
/// died earlier in this pass counts as absent.
pub fn act(
    cells: &mut EntityPool<Cell>,
    plants: &mut EntityPool<Plant>,
    ctx: &TickContext<'_>,
    order: &[usize],
) -> CellTally {
    let config = ctx.config;
    let cfg = &config.cell;
    let company_sq = (cfg.visual_range - cfg.contact_slack).powi(2);
    let mut tally = CellTally::default();

    for &i in order {
        let (senses, out) = {
            let c = cells.at(i);
            if !c.life.alive {
                continue;
            }
            (c.senses, decision(c))
        };

        let closest_cell = senses
            .closest_cell
            .filter(|r| cells.get(r.slot).is_some_and(|c| c.life.alive));
        let closest_plant = senses
            .closest_plant
            .filter(|r| plants.get(r.slot).is_some_and(|p| p.life.alive));
        let cell_target = closest_cell.map(|r| cells.at(r.slot).kinematics.position);
        let plant_target = closest_plant.map(|r| plants.at(r.slot).kinematics.position);

        {
            let c = cells.at_mut(i);
            let k = &mut c.kinematics;
            if let Some(target) = cell_target {
                k.velocity += (target - k.position).normalize_or_zero()
                    * out[OUT_STEER_CELL]
                    * cfg.interaction_strength;
            }
            if let Some(target) = plant_target {
                k.velocity += (target - k.position).normalize_or_zero()
                    * out[OUT_STEER_PLANT]
                    * cfg.plant_attraction;
            }
            k.velocity += Vec2::new(out[OUT_MOVE_X], out[OUT_MOVE_Y]) * cfg.move_gain;
            let resistance = drag_resistance(cfg.friction_coefficient, k.velocity, k.radius);
            k.apply_friction(1.0 + resistance * (1.0 + out[OUT_FRICTION]));
            k.speed_limit(c.genome.max_speed);
            k.integrate();
        }

        let mut has_company = false;
        if let Some(r) = closest_cell {
            let j = r.slot;
            let mutual = cells
                .at(j)
                .senses
                .closest_cell
                .is_some_and(|back| back.slot == i);
            if let Some((a, b)) = cells.get_pair_mut(i, j) {
                has_company =
                    a.kinematics.position.distance_squared(b.kinematics.position) <= company_sq;
                // The lower slot of a mutual pair already handled it.
                if !(mutual && j < i) && a.kinematics.collide(&mut b.kinematics) {
                    energy::diffuse(&mut a.energy, &mut b.energy, config.energy.diffusion);
                    tally.contacts += 1;
                }
            }
        }

        if let Some(r) = closest_plant {
            let plant = plants.at_mut(r.slot);
            let c = cells.at_mut(i);
            if c.kinematics.collide(&mut plant.kinematics) {
                energy::transfer(&mut plant.energy, &mut c.energy, cfg.nutrient_rate);
                tally.feedings += 1;
                if plant.energy <= 0.0 {
                    plant.life.alive = false;
                    plant.life.wants_reproduce = false;
                }
            }
        }

        let c = cells.at_mut(i);
        c.time_alone = if has_company { 0 } else { c.time_alone + 1 };

        let starved = energy::apply_decay(c, &config.energy);
        let isolated = c.time_alone > cfg.max_time_alone;
        let crowded = config.population.crowding_death && senses.nearby_cells >= CROWDING_LIMIT;

        if c.energy > config.energy.reproduction_threshold {
            c.reproduce_counter += 1;
            if c.reproduce_counter >= cfg.reproduction_delay && !c.life.wants_reproduce {
                c.life.wants_reproduce = true;
                tally.want_divide += 1;
            }
        } else {
            c.reproduce_counter = 0;
        }

        if starved || isolated || crowded {
            c.life.alive = false;
            c.life.wants_reproduce = false;
            tally.starved += usize::from(starved);
            tally.isolated += usize::from(isolated && !starved);
            tally.crowded += usize::from(crowded && !starved && !isolated);
        }

        c.life.age = c.life.age.saturating_add(1);
        c.kinematics.contain_to_border(ctx.border);
    }
    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::reset_cell_random;
    use crate::physics::at_rest;
    use biolife_data::Bounds;
    use glam::UVec2;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const BOUNDS: Bounds = Bounds::new(0.0, 0.0, 700.0, 700.0);

    fn cell_at(position: Vec2, config: &AppConfig, rng: &mut ChaCha8Rng) -> Cell {
        let mut c = Cell::default();
        reset_cell_random(&mut c, config, &BOUNDS, rng);
        c.kinematics = at_rest(position, c.genome.radius);
        c
    }

    fn plant_at(position: Vec2, energy: f32) -> Plant {
        let mut p = Plant {
            kinematics: at_rest(position, 8.0),
            energy,
            ..Default::default()
        };
        p.life.alive = true;
        p
    }

    fn grid_for(cells: &EntityPool<Cell>, plants: &EntityPool<Plant>) -> SpatialHashGrid {
        let mut grid = SpatialHashGrid::new(BOUNDS, UVec2::new(10, 10)).unwrap();
        for c in cells.iter() {
            grid.insert(c.kinematics.position, EntityId::Cell(c.slot)).unwrap();
        }
        for p in plants.iter() {
            grid.insert(p.kinematics.position, EntityId::Plant(p.slot)).unwrap();
        }
        grid
    }

    #[test]
    fn test_sense_picks_closest_and_counts() {
        let config = AppConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut cells = EntityPool::with_capacity(4);
        cells.emplace(cell_at(Vec2::new(300.0, 300.0), &config, &mut rng)).unwrap();
        cells.emplace(cell_at(Vec2::new(340.0, 300.0), &config, &mut rng)).unwrap();
        cells.emplace(cell_at(Vec2::new(320.0, 300.0), &config, &mut rng)).unwrap();
        cells.emplace(cell_at(Vec2::new(390.0, 300.0), &config, &mut rng)).unwrap();
        let mut plants = EntityPool::with_capacity(2);
        plants.emplace(plant_at(Vec2::new(300.0, 350.0), 50.0)).unwrap();
        let mut dead = plant_at(Vec2::new(300.0, 310.0), 50.0);
        dead.life.alive = false;
        plants.emplace(dead).unwrap();

        let grid = grid_for(&cells, &plants);
        let senses =
            sense_cell(0, &cells, &plants, &grid, &config, &mut NeighborBuffer::new()).unwrap();
        assert_eq!(senses.nearby_cells, 2);
        assert_eq!(senses.nearby_plants, 1);
        assert_eq!(senses.closest_cell.map(|r| r.slot), Some(2));
        assert_eq!(senses.closest_plant.map(|r| r.slot), Some(0));
    }

    #[test]
    fn test_dead_closest_neighbour_is_ignored() {
        let config = AppConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut cells = EntityPool::with_capacity(2);
        cells.emplace(cell_at(Vec2::new(300.0, 300.0), &config, &mut rng)).unwrap();
        cells.emplace(cell_at(Vec2::new(305.0, 300.0), &config, &mut rng)).unwrap();
        let mut plants = EntityPool::with_capacity(1);
        plants.emplace(plant_at(Vec2::new(100.0, 100.0), 50.0)).unwrap();
        let grid = grid_for(&cells, &plants);
        sense_and_decide(&mut cells, &plants, &grid, &config, &[0, 1]).unwrap();
        assert_eq!(cells.at(0).senses.closest_cell.map(|r| r.slot), Some(1));

        // Cell 1 dies after sensing but before cell 0 acts on it.
        cells.at_mut(1).life.alive = false;
        let before = cells.at(1).kinematics.pending_displacement;
        let ctx = TickContext {
            config: &config,
            border: &BOUNDS,
            dead_zone: Vec2::splat(-100.0),
        };
        let tally = act(&mut cells, &mut plants, &ctx, &[0]);
        assert_eq!(tally.contacts, 0);
        assert_eq!(cells.at(1).kinematics.pending_displacement, before);
        assert_eq!(cells.at(0).time_alone, 1);
    }

    fn still_cell_at(position: Vec2, config: &AppConfig, rng: &mut ChaCha8Rng) -> Cell {
        let mut c = cell_at(position, config, rng);
        c.genome.radius = 10.0;
        c.genome.max_speed = 0.0;
        c.kinematics = at_rest(position, 10.0);
        c
    }

    #[test]
    fn test_overlapping_trio_resolves_one_contact_per_cell() {
        let mut config = AppConfig::default();
        config.cell.max_time_alone = 1000;
        let ctx = TickContext {
            config: &config,
            border: &BOUNDS,
            dead_zone: Vec2::splat(-100.0),
        };
        // 0 and 1 pick each other; 2 picks 0, which does not pick it back.
        let positions = [
            Vec2::new(300.0, 300.0),
            Vec2::new(312.0, 300.0),
            Vec2::new(300.0, 315.0),
        ];
        for order in [[0, 1, 2], [2, 1, 0]] {
            let mut rng = ChaCha8Rng::seed_from_u64(6);
            let mut cells = EntityPool::with_capacity(3);
            for p in positions {
                cells.emplace(still_cell_at(p, &config, &mut rng)).unwrap();
            }
            let mut plants: EntityPool<Plant> = EntityPool::with_capacity(1);
            let grid = grid_for(&cells, &plants);
            sense_and_decide(&mut cells, &plants, &grid, &config, &order).unwrap();
            let closest: Vec<_> = (0..3)
                .map(|i| cells.at(i).senses.closest_cell.map(|r| r.slot))
                .collect();
            assert_eq!(closest, vec![Some(1), Some(0), Some(0)]);

            let tally = act(&mut cells, &mut plants, &ctx, &order);
            assert_eq!(tally.contacts, 2, "order {order:?}");
            for i in 0..3 {
                assert_eq!(cells.at(i).kinematics.position, positions[i]);
                assert_ne!(cells.at(i).kinematics.pending_displacement, Vec2::ZERO);
            }
        }
    }

    #[test]
    fn test_feeding_drains_plant() {
        let config = AppConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut cells = EntityPool::with_capacity(1);
        let mut c = cell_at(Vec2::new(300.0, 300.0), &config, &mut rng);
        c.genome.max_speed = 0.0;
        c.energy = 10.0;
        cells.emplace(c).unwrap();
        let mut plants = EntityPool::with_capacity(1);
        plants.emplace(plant_at(Vec2::new(310.0, 300.0), 1.0)).unwrap();
        let grid = grid_for(&cells, &plants);
        sense_and_decide(&mut cells, &plants, &grid, &config, &[0]).unwrap();
        let ctx = TickContext {
            config: &config,
            border: &BOUNDS,
            dead_zone: Vec2::splat(-100.0),
        };
        let tally = act(&mut cells, &mut plants, &ctx, &[0]);
        assert_eq!(tally.feedings, 1);
        assert!(!plants.at(0).life.alive);
        assert!(cells.at(0).energy > 10.9);
    }

    #[test]
    fn test_starving_cell_dies() {
        let config = AppConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut cells = EntityPool::with_capacity(1);
        let mut c = cell_at(Vec2::new(300.0, 300.0), &config, &mut rng);
        c.energy = 1e-6;
        cells.emplace(c).unwrap();
        let mut plants: EntityPool<Plant> = EntityPool::with_capacity(1);
        let grid = grid_for(&cells, &plants);
        sense_and_decide(&mut cells, &plants, &grid, &config, &[0]).unwrap();
        let ctx = TickContext {
            config: &config,
            border: &BOUNDS,
            dead_zone: Vec2::splat(-100.0),
        };
        let tally = act(&mut cells, &mut plants, &ctx, &[0]);
        assert_eq!(tally.starved, 1);
        assert!(!cells.at(0).life.alive);
        assert_eq!(cells.at(0).life.age, 1);
    }

    #[test]
    fn test_reproduction_waits_for_delay() {
        let mut config = AppConfig::default();
        config.cell.reproduction_delay = 3;
        config.cell.max_time_alone = 1000;
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut cells = EntityPool::with_capacity(1);
        let mut c = cell_at(Vec2::new(300.0, 300.0), &config, &mut rng);
        c.energy = 500.0;
        cells.emplace(c).unwrap();
        let mut plants: EntityPool<Plant> = EntityPool::with_capacity(1);
        let ctx = TickContext {
            config: &config,
            border: &BOUNDS,
            dead_zone: Vec2::splat(-100.0),
        };
        for tick in 1..=3 {
            let grid = grid_for(&cells, &plants);
            sense_and_decide(&mut cells, &plants, &grid, &config, &[0]).unwrap();
            act(&mut cells, &mut plants, &ctx, &[0]);
            assert_eq!(cells.at(0).life.wants_reproduce, tick == 3);
        }
    }
}
