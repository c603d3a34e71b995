//! Birth, reset and retirement of pooled entities.
//!
//! A slot handed out by [`EntityPool::add`] may still hold a dead entity's
//! data, so every spawn path here rewrites all state except the renderer's
//! last published position.

use crate::brain::{layer_sizes_with_hidden, PerceptronLogic};
use crate::config::AppConfig;
use crate::genome::{sample_range, GenomeLogic};
use crate::physics::KinematicsLogic;
use crate::pool::{EntityPool, PoolItem};
use crate::spatial_hash::EntityId;
use biolife_data::{
    Bounds, Cell, Color, Genome, Kinematics, LifeState, Perceptron, Plant, Senses, Vec2,
};
use rand::Rng;

/// Largest per-axis offset of a newborn cell from its parent.
pub const CELL_SPAWN_OFFSET: f32 = 3.0;

/// Shared view over cells and plants.
pub trait Organism: PoolItem {
    fn kinematics(&self) -> &Kinematics;
    fn kinematics_mut(&mut self) -> &mut Kinematics;
    fn life(&self) -> &LifeState;
    fn life_mut(&mut self) -> &mut LifeState;
    fn entity_id(&self) -> EntityId;
    fn color(&self) -> Color;
}

impl Organism for Cell {
    fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }
    fn kinematics_mut(&mut self) -> &mut Kinematics {
        &mut self.kinematics
    }
    fn life(&self) -> &LifeState {
        &self.life
    }
    fn life_mut(&mut self) -> &mut LifeState {
        &mut self.life
    }
    fn entity_id(&self) -> EntityId {
        EntityId::Cell(self.slot)
    }
    fn color(&self) -> Color {
        self.genome.color
    }
}

impl Organism for Plant {
    fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }
    fn kinematics_mut(&mut self) -> &mut Kinematics {
        &mut self.kinematics
    }
    fn life(&self) -> &LifeState {
        &self.life
    }
    fn life_mut(&mut self) -> &mut LifeState {
        &mut self.life
    }
    fn entity_id(&self) -> EntityId {
        EntityId::Plant(self.slot)
    }
    fn color(&self) -> Color {
        self.color
    }
}

const NEWBORN: LifeState = LifeState {
    age: 0,
    alive: true,
    wants_reproduce: false,
};

/// Uniform point at which a circle of `radius` fits inside `border`.
pub fn random_position<R: Rng>(border: &Bounds, radius: f32, rng: &mut R) -> Vec2 {
    let inner = border.inset(Vec2::splat(radius));
    let axis = |lo: f32, extent: f32, rng: &mut R| {
        if extent > 0.0 {
            rng.gen_range(lo..lo + extent)
        } else {
            lo + extent * 0.5
        }
    };
    let x = axis(inner.left, inner.width, rng);
    let y = axis(inner.top, inner.height, rng);
    Vec2::new(x, y)
}

/// Places kinematics at rest at `position`, keeping the published position.
fn place(kinematics: &mut Kinematics, position: Vec2, radius: f32) {
    *kinematics = Kinematics {
        position,
        position_previous: position,
        published: kinematics.published,
        radius,
        ..Kinematics::default()
    };
}

/// Colour a plant shows for its species marker.
#[must_use]
pub fn plant_color(marker: f32, marker_range: [f32; 2]) -> Color {
    let span = marker_range[1] - marker_range[0];
    let t = if span > 0.0 {
        ((marker - marker_range[0]) / span).clamp(0.0, 1.0)
    } else {
        0.5
    };
    Color::rgba((40.0 + t * 150.0) as u8, 200, (190.0 - t * 150.0) as u8, 255)
}

/// Rewrites `cell` as a first-generation cell with random traits.
pub fn reset_cell_random<R: Rng>(cell: &mut Cell, config: &AppConfig, border: &Bounds, rng: &mut R) {
    let genome = Genome::create_random(&config.genome, rng);
    let layers = layer_sizes_with_hidden(&config.brain.hidden_layers);
    cell.perceptron = Perceptron::new_random_with_rng(
        &layers,
        config.brain.mutation_rate,
        config.brain.mutation_range,
        rng,
    );
    let position = random_position(border, genome.radius, rng);
    place(&mut cell.kinematics, position, genome.radius);
    cell.genome = genome;
    cell.life = NEWBORN;
    cell.energy = config.energy.initial;
    cell.time_alone = 0;
    cell.reproduce_counter = 0;
    cell.offspring = 0;
    cell.generation = 0;
    cell.senses = Senses::default();
}

/// Claims a slot and fills it with a random cell.
pub fn spawn_random_cell<R: Rng>(
    pool: &mut EntityPool<Cell>,
    config: &AppConfig,
    border: &Bounds,
    rng: &mut R,
) -> Option<usize> {
    let slot = pool.add()?;
    reset_cell_random(pool.at_mut(slot), config, border, rng);
    Some(slot)
}

/// Splits `parent_slot` into itself and a mutated child.
///
/// The parent gives up half its energy to the child, which appears next to
/// it moving the opposite way. Returns `None` when the pool is full.
pub fn reproduce_cell<R: Rng>(
    pool: &mut EntityPool<Cell>,
    parent_slot: usize,
    config: &AppConfig,
    border: &Bounds,
    rng: &mut R,
) -> Option<usize> {
    if !pool.is_active(parent_slot) {
        return None;
    }
    let child_slot = pool.add()?;
    let Some((parent, child)) = pool.get_pair_mut(parent_slot, child_slot) else {
        pool.remove(child_slot);
        return None;
    };

    parent.genome.mutate_into(&mut child.genome, &config.genome, rng);
    parent.perceptron.mutate_into(&mut child.perceptron, rng);

    parent.energy *= 0.5;
    child.energy = parent.energy;

    let offset = Vec2::new(
        rng.gen_range(-CELL_SPAWN_OFFSET..=CELL_SPAWN_OFFSET),
        rng.gen_range(-CELL_SPAWN_OFFSET..=CELL_SPAWN_OFFSET),
    );
    let position = border.clamp_circle(parent.kinematics.position + offset, child.genome.radius);
    place(&mut child.kinematics, position, child.genome.radius);
    child.kinematics.velocity = -parent.kinematics.velocity;

    child.life = NEWBORN;
    child.time_alone = 0;
    child.reproduce_counter = 0;
    child.offspring = 0;
    child.generation = parent.generation + 1;
    child.senses = Senses::default();

    parent.offspring += 1;
    parent.reproduce_counter = 0;
    parent.life.wants_reproduce = false;
    Some(child_slot)
}

/// Rewrites `plant` with a random marker at a random position.
pub fn reset_plant_random<R: Rng>(
    plant: &mut Plant,
    config: &AppConfig,
    border: &Bounds,
    rng: &mut R,
) {
    let cfg = &config.plant;
    let position = random_position(border, cfg.radius, rng);
    place(&mut plant.kinematics, position, cfg.radius);
    plant.species_marker = sample_range(cfg.marker_range, rng);
    plant.color = plant_color(plant.species_marker, cfg.marker_range);
    plant.energy = cfg.initial_energy;
    plant.life = NEWBORN;
    plant.neighbors = 0;
}

pub fn spawn_random_plant<R: Rng>(
    pool: &mut EntityPool<Plant>,
    config: &AppConfig,
    border: &Bounds,
    rng: &mut R,
) -> Option<usize> {
    let slot = pool.add()?;
    reset_plant_random(pool.at_mut(slot), config, border, rng);
    Some(slot)
}

/// Seeds a plant near `parent_slot` with a drifted species marker.
///
/// The parent's age restarts so an old plant seeds once, not every tick.
pub fn reproduce_plant<R: Rng>(
    pool: &mut EntityPool<Plant>,
    parent_slot: usize,
    config: &AppConfig,
    border: &Bounds,
    rng: &mut R,
) -> Option<usize> {
    if !pool.is_active(parent_slot) {
        return None;
    }
    let child_slot = pool.add()?;
    let Some((parent, child)) = pool.get_pair_mut(parent_slot, child_slot) else {
        pool.remove(child_slot);
        return None;
    };
    let cfg = &config.plant;
    let spread = cfg.spawn_spread;
    let offset = Vec2::new(
        rng.gen_range(-spread..=spread),
        rng.gen_range(-spread..=spread),
    );
    let position = border.clamp_circle(parent.kinematics.position + offset, cfg.radius);
    place(&mut child.kinematics, position, cfg.radius);

    let drift = cfg.marker_drift;
    let marker = if drift > 0.0 {
        parent.species_marker + rng.gen_range(-drift..=drift)
    } else {
        parent.species_marker
    };
    child.species_marker = marker.clamp(cfg.marker_range[0], cfg.marker_range[1]);
    child.color = plant_color(child.species_marker, cfg.marker_range);
    child.energy = cfg.initial_energy;
    child.life = NEWBORN;
    child.neighbors = 0;

    parent.life.wants_reproduce = false;
    if parent.life.age > cfg.max_age {
        parent.life.age = 0;
    }
    Some(child_slot)
}

/// Frees `slot` and parks its entity in the dead zone.
///
/// Returns `false` if the slot was not active.
pub fn retire<T: Organism>(pool: &mut EntityPool<T>, slot: usize, dead_zone: Vec2) -> bool {
    if !pool.remove(slot) {
        return false;
    }
    let item = pool.at_mut(slot);
    let life = item.life_mut();
    life.alive = false;
    life.wants_reproduce = false;
    item.kinematics_mut().teleport(dead_zone);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn border() -> Bounds {
        Bounds::new(50.0, 50.0, 400.0, 300.0)
    }

    #[test]
    fn test_random_cell_inside_border() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let config = AppConfig::default();
        let mut pool = EntityPool::with_capacity(50);
        for _ in 0..50 {
            let slot = spawn_random_cell(&mut pool, &config, &border(), &mut rng).unwrap();
            let c = pool.at(slot);
            let r = c.genome.radius;
            assert!(border().inset(Vec2::splat(r)).contains(c.kinematics.position));
            assert!(c.life.alive);
            assert_eq!(c.energy, config.energy.initial);
            assert_eq!(c.slot, slot);
        }
        assert!(spawn_random_cell(&mut pool, &config, &border(), &mut rng).is_none());
    }

    #[test]
    fn test_reproduce_cell_splits_energy_and_flips_velocity() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let config = AppConfig::default();
        let mut pool = EntityPool::with_capacity(4);
        let parent = spawn_random_cell(&mut pool, &config, &border(), &mut rng).unwrap();
        {
            let p = pool.at_mut(parent);
            p.energy = 120.0;
            p.generation = 3;
            p.kinematics.velocity = Vec2::new(0.4, -0.2);
            p.life.wants_reproduce = true;
        }
        let child = reproduce_cell(&mut pool, parent, &config, &border(), &mut rng).unwrap();
        let (p, c) = (pool.at(parent), pool.at(child));
        assert_eq!(p.energy, 60.0);
        assert_eq!(c.energy, 60.0);
        assert_eq!(c.kinematics.velocity, Vec2::new(-0.4, 0.2));
        assert_eq!(c.generation, 4);
        assert_eq!(p.offspring, 1);
        assert!(!p.life.wants_reproduce);
        let d = c.kinematics.position - p.kinematics.position;
        assert!(d.x.abs() <= CELL_SPAWN_OFFSET && d.y.abs() <= CELL_SPAWN_OFFSET);
        assert_eq!(c.perceptron.weights.len(), p.perceptron.weights.len());
    }

    #[test]
    fn test_reused_slot_is_fully_reset() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let config = AppConfig::default();
        let mut pool = EntityPool::with_capacity(2);
        let parent = spawn_random_cell(&mut pool, &config, &border(), &mut rng).unwrap();
        let stale = spawn_random_cell(&mut pool, &config, &border(), &mut rng).unwrap();
        {
            let s = pool.at_mut(stale);
            s.offspring = 9;
            s.time_alone = 25;
            s.life.age = 5000;
            s.reproduce_counter = 30;
        }
        assert!(retire(&mut pool, stale, Vec2::new(-100.0, -100.0)));
        assert_eq!(pool.at(stale).kinematics.position, Vec2::new(-100.0, -100.0));

        let child = reproduce_cell(&mut pool, parent, &config, &border(), &mut rng).unwrap();
        assert_eq!(child, stale);
        let c = pool.at(child);
        assert_eq!(c.offspring, 0);
        assert_eq!(c.time_alone, 0);
        assert_eq!(c.life.age, 0);
        assert_eq!(c.reproduce_counter, 0);
        assert!(c.life.alive);
        assert!(border().contains(c.kinematics.position));
    }

    #[test]
    fn test_reproduce_fails_when_full() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let config = AppConfig::default();
        let mut pool = EntityPool::with_capacity(1);
        let parent = spawn_random_cell(&mut pool, &config, &border(), &mut rng).unwrap();
        pool.at_mut(parent).energy = 200.0;
        assert!(reproduce_cell(&mut pool, parent, &config, &border(), &mut rng).is_none());
        assert_eq!(pool.at(parent).energy, 200.0);
        assert_eq!(pool.failed_adds(), 1);
    }

    #[test]
    fn test_plant_child_marker_drifts_within_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let config = AppConfig::default();
        let mut pool = EntityPool::with_capacity(64);
        let parent = spawn_random_plant(&mut pool, &config, &border(), &mut rng).unwrap();
        for _ in 0..60 {
            let Some(child) = reproduce_plant(&mut pool, parent, &config, &border(), &mut rng)
            else {
                break;
            };
            let (p, c) = (pool.at(parent), pool.at(child));
            assert!((c.species_marker - p.species_marker).abs() <= config.plant.marker_drift);
            assert!(c.species_marker >= config.plant.marker_range[0]);
            assert!(c.species_marker <= config.plant.marker_range[1]);
            assert_eq!(c.energy, config.plant.initial_energy);
        }
    }

    #[test]
    fn test_retire_parks_entity_in_dead_zone() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let config = AppConfig::default();
        let mut pool = EntityPool::with_capacity(2);
        let slot = spawn_random_plant(&mut pool, &config, &border(), &mut rng).unwrap();
        {
            let p = pool.at_mut(slot);
            p.kinematics.velocity = Vec2::new(1.5, -0.5);
            p.kinematics.pending_displacement = Vec2::new(3.0, 3.0);
            p.life.wants_reproduce = true;
        }
        let dead_zone = Vec2::new(-100.0, -100.0);

        assert!(retire(&mut pool, slot, dead_zone));

        let p = pool.at(slot);
        assert!(!pool.is_active(slot));
        assert!(!p.life.alive);
        assert!(!p.life.wants_reproduce);
        assert_eq!(p.kinematics.position, dead_zone);
        assert_eq!(p.kinematics.position_previous, dead_zone);
        assert_eq!(p.kinematics.velocity, Vec2::ZERO);
        assert_eq!(p.kinematics.pending_displacement, Vec2::ZERO);
        assert!(!retire(&mut pool, slot, dead_zone));
    }

    #[test]
    fn test_retire_inactive_slot_is_noop() {
        let mut pool: EntityPool<Plant> = EntityPool::with_capacity(2);
        assert!(!retire(&mut pool, 0, Vec2::ZERO));
    }
}
