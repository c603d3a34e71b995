pub mod macros;

use biolife_core::lifecycle::{spawn_random_cell, spawn_random_plant};
use biolife_core::physics::at_rest;
use biolife_data::Vec2;
use biolife_lib::model::config::AppConfig;
use biolife_lib::model::world::World;

type WorldMod = Box<dyn FnOnce(&mut World)>;

#[allow(dead_code)]
pub struct WorldBuilder {
    config: AppConfig,
    mods: Vec<WorldMod>,
}

#[allow(dead_code)]
impl WorldBuilder {
    /// Small empty arena with a fixed seed and no stochastic plant death.
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.world.width = 800.0;
        config.world.height = 600.0;
        config.world.seed = Some(42);
        config.population.max_cells = 200;
        config.population.max_plants = 400;
        config.population.initial_cells = 0;
        config.population.initial_plants = 0;
        config.population.min_plants = 0;
        config.population.auto_extinction_reset = false;
        config.plant.random_death_odds = u32::MAX;
        config.stats.print_interval = 0;
        config.stats.autosave_interval = 0;
        Self {
            config,
            mods: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_population(mut self, cells: usize, plants: usize) -> Self {
        self.config.population.initial_cells = cells;
        self.config.population.initial_plants = plants;
        self
    }

    /// Adds a random cell and moves it to `position` at rest.
    pub fn with_cell_at(mut self, position: Vec2) -> Self {
        self.mods.push(Box::new(move |world| {
            place_cell(world, position);
        }));
        self
    }

    pub fn with_plant_at(mut self, position: Vec2) -> Self {
        self.mods.push(Box::new(move |world| {
            place_plant(world, position);
        }));
        self
    }

    pub fn build(self) -> World {
        let mut world = World::new(self.config).expect("Failed to create world in test builder");
        for m in self.mods {
            m(&mut world);
        }
        world
    }
}

#[allow(dead_code)]
pub fn place_cell(world: &mut World, position: Vec2) -> usize {
    let slot = spawn_random_cell(&mut world.cells, &world.config, &world.border, &mut world.rng)
        .expect("cell pool full");
    let cell = world.cells.at_mut(slot);
    let published = cell.kinematics.published;
    cell.kinematics = at_rest(position, cell.genome.radius);
    cell.kinematics.published = published;
    slot
}

#[allow(dead_code)]
pub fn place_plant(world: &mut World, position: Vec2) -> usize {
    let slot = spawn_random_plant(&mut world.plants, &world.config, &world.border, &mut world.rng)
        .expect("plant pool full");
    let plant = world.plants.at_mut(slot);
    let published = plant.kinematics.published;
    plant.kinematics = at_rest(position, plant.kinematics.radius);
    plant.kinematics.published = published;
    slot
}

/// Positions and energies of every live entity, in slot order.
#[allow(dead_code)]
pub fn fingerprint(world: &World) -> Vec<(usize, Vec2, f32)> {
    world
        .cells
        .iter()
        .map(|c| (c.slot, c.kinematics.position, c.energy))
        .chain(
            world
                .plants
                .iter()
                .map(|p| (p.slot + 1_000_000, p.kinematics.position, p.energy)),
        )
        .collect()
}
