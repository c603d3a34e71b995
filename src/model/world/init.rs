use crate::model::config::AppConfig;
use crate::model::world::World;
use anyhow::Context;
use biolife_core::lifecycle::{reset_cell_random, reset_plant_random, Organism};
use biolife_core::metrics::Metrics;
use biolife_core::pool::EntityPool;
use biolife_core::spatial_hash::{NeighborBuffer, SpatialHashGrid};
use biolife_data::{Cell, Plant, PopulationStats};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

impl World {
    /// Builds the arena and its initial population.
    ///
    /// Pool capacities are fixed here for the lifetime of the world. The
    /// generator is seeded from `world.seed` when present.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        config.validate().context("invalid configuration")?;

        let rng = match config.world.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let world_bounds = config.world.bounds();
        let grid = SpatialHashGrid::new(world_bounds, config.grid_cell_count())
            .context("building spatial grid")?;
        let border = world_bounds.inset(grid.cell_dimensions());

        let max_cells = config.population.max_cells;
        let max_plants = config.population.max_plants;
        let mut world = Self {
            cells: EntityPool::with_capacity(max_cells),
            plants: EntityPool::with_capacity(max_plants),
            grid,
            world_bounds,
            border,
            dead_zone: config.world.dead_zone(),
            rng,
            stats: PopulationStats::default(),
            metrics: Metrics::new(),
            total_ticks: 0,
            relative_ticks: 0,
            total_extinctions: 0,
            run_id: uuid::Uuid::new_v4(),
            cell_limit: max_cells,
            plant_limit: max_plants,
            buffer: NeighborBuffer::new(),
            cell_order: Vec::with_capacity(max_cells),
            plant_order: Vec::with_capacity(max_plants),
            touched: Vec::new(),
            config,
        };
        world.populate()?;

        tracing::info!(
            run_id = %world.run_id,
            cells = world.cells.len(),
            plants = world.plants.len(),
            grid_cols = world.grid.cols(),
            grid_rows = world.grid.rows(),
            seed = ?world.config.world.seed,
            "World created"
        );
        Ok(world)
    }

    /// Fills the empty pools with the configured initial counts.
    fn populate(&mut self) -> anyhow::Result<()> {
        for _ in 0..self.config.population.initial_plants {
            let mut plant = Plant::default();
            reset_plant_random(&mut plant, &self.config, &self.border, &mut self.rng);
            let slot = self.plants.emplace(plant).context("seeding plants")?;
            self.touched.push(self.plants.at(slot).entity_id());
        }
        for _ in 0..self.config.population.initial_cells {
            let mut cell = Cell::default();
            reset_cell_random(&mut cell, &self.config, &self.border, &mut self.rng);
            let slot = self.cells.emplace(cell).context("seeding cells")?;
            self.touched.push(self.cells.at(slot).entity_id());
        }
        Ok(())
    }
}
