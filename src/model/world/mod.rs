use crate::model::config::AppConfig;
use biolife_core::metrics::Metrics;
use biolife_core::pool::EntityPool;
use biolife_core::spatial_hash::{EntityId, NeighborBuffer, SpatialHashGrid};
use biolife_data::{Bounds, Cell, Color, Plant, PopulationStats, Vec2};
use rand_chacha::ChaCha8Rng;

pub mod finalize;
pub mod init;
pub mod persistence;
pub mod update;

/// Colour published for retired entities.
pub const HIDDEN: Color = Color::rgba(0, 0, 0, 0);

/// What one call to [`World::update`] changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub births: usize,
    pub deaths: usize,
    /// Reproduction requests refused because the pool was full.
    pub suppressed_births: usize,
    pub culled: usize,
    pub plants_spawned: usize,
    pub extinction: bool,
}

/// Owns both pools, the grid and the generator, and runs the tick pipeline.
pub struct World {
    pub config: AppConfig,
    pub cells: EntityPool<Cell>,
    pub plants: EntityPool<Plant>,
    pub grid: SpatialHashGrid,
    /// Full arena covered by the grid.
    pub world_bounds: Bounds,
    /// Arena inset by one grid cell; every live entity stays inside it.
    pub border: Bounds,
    pub dead_zone: Vec2,
    pub rng: ChaCha8Rng,
    pub stats: PopulationStats,
    pub metrics: Metrics,
    pub total_ticks: u64,
    /// Ticks since the last extinction reset.
    pub relative_ticks: u64,
    pub total_extinctions: u32,
    pub run_id: uuid::Uuid,
    cell_limit: usize,
    plant_limit: usize,
    buffer: NeighborBuffer,
    cell_order: Vec<usize>,
    plant_order: Vec<usize>,
    /// Entities spawned or retired outside the commit pass, awaiting publish.
    touched: Vec<EntityId>,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("cells", &self.cells.len())
            .field("plants", &self.plants.len())
            .field("total_ticks", &self.total_ticks)
            .field("total_extinctions", &self.total_extinctions)
            .finish_non_exhaustive()
    }
}

impl World {
    /// Regulation targets, at most the pool capacities.
    #[must_use]
    pub fn population_limits(&self) -> (usize, usize) {
        (self.cell_limit, self.plant_limit)
    }

    /// Lowers or raises the culling targets. Capacities never change, so the
    /// limits are clamped to them.
    pub fn set_population_limits(&mut self, cells: usize, plants: usize) {
        self.cell_limit = cells.min(self.cells.capacity());
        self.plant_limit = plants.min(self.plants.capacity());
        tracing::debug!(
            cells = self.cell_limit,
            plants = self.plant_limit,
            "Population limits changed"
        );
    }

    #[must_use]
    pub fn live_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.life.alive).count()
    }

    #[must_use]
    pub fn live_plants(&self) -> usize {
        self.plants.iter().filter(|p| p.life.alive).count()
    }
}
