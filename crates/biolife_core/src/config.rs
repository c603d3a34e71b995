//! Configuration management for simulation parameters.
//!
//! Every tunable lives in [`AppConfig`], which maps one-to-one onto a
//! `config.toml` file. Missing sections fall back to their defaults.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [world]
//! width = 1600.0
//! height = 900.0
//! seed = 42
//!
//! [population]
//! max_cells = 2000
//! initial_cells = 400
//!
//! [brain]
//! hidden_layers = [8]
//! ```

use biolife_data::{Bounds, Vec2};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    pub seed: Option<u64>,
    /// Grid cell count per axis; derived from the largest visual range when absent.
    pub grid_cells: Option<[u32; 2]>,
    /// Where retired entities are parked.
    pub dead_zone: [f32; 2],
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 900.0,
            seed: None,
            grid_cells: None,
            dead_zone: [-100.0, -100.0],
        }
    }
}

impl WorldConfig {
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::new(0.0, 0.0, self.width, self.height)
    }

    #[must_use]
    pub fn dead_zone(&self) -> Vec2 {
        Vec2::from(self.dead_zone)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PopulationConfig {
    pub max_cells: usize,
    pub max_plants: usize,
    pub initial_cells: usize,
    pub initial_plants: usize,
    pub min_plants: usize,
    pub auto_extinction_reset: bool,
    pub crowding_death: bool,
    /// Each over-limit entity is culled with odds `1 / cull_odds` per pass.
    pub cull_odds: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            max_cells: 2000,
            max_plants: 3000,
            initial_cells: 500,
            initial_plants: 1500,
            min_plants: 300,
            auto_extinction_reset: true,
            crowding_death: true,
            cull_odds: 10,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CellConfig {
    pub visual_range: f32,
    pub friction_coefficient: f32,
    /// Energy drained from a plant per contact tick.
    pub nutrient_rate: f32,
    pub max_time_alone: u32,
    pub reproduction_delay: u32,
    pub interaction_strength: f32,
    pub plant_attraction: f32,
    pub move_gain: f32,
    /// A neighbour only counts as company within `visual_range - contact_slack`.
    pub contact_slack: f32,
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            visual_range: 68.0,
            friction_coefficient: 1.4,
            nutrient_rate: 2.0,
            max_time_alone: 30,
            reproduction_delay: 40,
            interaction_strength: 0.08,
            plant_attraction: 0.1,
            move_gain: 0.1,
            contact_slack: 7.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PlantConfig {
    pub radius: f32,
    pub visual_range: f32,
    pub max_speed: f32,
    pub friction: f32,
    pub attract_strength: f32,
    pub repel_strength: f32,
    /// Marker distance above which two plants repel.
    pub species_threshold: f32,
    /// Plants with fewer in-range neighbours than this spread.
    pub crowd_threshold: u32,
    pub max_age: u32,
    pub initial_energy: f32,
    pub spawn_spread: f32,
    pub marker_range: [f32; 2],
    pub marker_drift: f32,
    pub random_death_odds: u32,
    pub max_age_step: u32,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            radius: 8.0,
            visual_range: 52.0,
            max_speed: 0.2,
            friction: 1.0,
            attract_strength: 0.0002,
            repel_strength: 0.01,
            species_threshold: 2.0,
            crowd_threshold: 15,
            max_age: 10_000,
            initial_energy: 50.0,
            spawn_spread: 10.0,
            marker_range: [0.0, 10.0],
            marker_drift: 2.0,
            random_death_odds: 1000,
            max_age_step: 100,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EnergyConfig {
    pub initial: f32,
    pub decay_constant: f32,
    pub age_factor: f32,
    pub reproduction_threshold: f32,
    pub diffusion: f32,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            initial: 50.0,
            decay_constant: 0.00067,
            age_factor: 0.02,
            reproduction_threshold: 100.0,
            diffusion: 0.01,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GenomeConfig {
    pub radius_range: [f32; 2],
    pub speed_range: [f32; 2],
    pub mutation_rate_range: [f32; 2],
    pub color_mutation: u8,
    pub color_alpha: u8,
}

impl Default for GenomeConfig {
    fn default() -> Self {
        Self {
            radius_range: [10.0, 10.0],
            speed_range: [0.0, 1.0],
            mutation_rate_range: [0.0005, 0.004],
            color_mutation: 4,
            color_alpha: 85,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BrainConfig {
    pub hidden_layers: Vec<usize>,
    pub mutation_rate: f32,
    pub mutation_range: f32,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![8],
            mutation_rate: 0.35,
            mutation_range: 0.5,
        }
    }
}

/// Reporting cadence in ticks. Zero turns the corresponding action off.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StatsConfig {
    pub print_interval: u64,
    pub history_interval: u64,
    pub autosave_interval: u64,
    pub autosave_path: Option<String>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            print_interval: 1000,
            history_interval: 100,
            autosave_interval: 2000,
            autosave_path: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub population: PopulationConfig,
    pub cell: CellConfig,
    pub plant: PlantConfig,
    pub energy: EnergyConfig,
    pub genome: GenomeConfig,
    pub brain: BrainConfig,
    pub stats: StatsConfig,
}

fn ordered(range: [f32; 2]) -> bool {
    range[0].is_finite() && range[1].is_finite() && range[0] <= range[1]
}

impl AppConfig {
    /// Largest interaction range of any species; bounds the grid cell size.
    #[must_use]
    pub fn max_interaction_range(&self) -> f32 {
        self.cell.visual_range.max(self.plant.visual_range)
    }

    /// Grid cell count, explicit or derived from the interaction range.
    #[must_use]
    pub fn grid_cell_count(&self) -> glam::UVec2 {
        match self.world.grid_cells {
            Some([x, y]) => glam::UVec2::new(x, y),
            None => crate::spatial_hash::SpatialHashGrid::cell_count_for_range(
                &self.world.bounds(),
                self.max_interaction_range(),
            ),
        }
    }

    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` describing the
    /// first failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        // World
        anyhow::ensure!(
            self.world.width > 0.0 && self.world.height > 0.0,
            "World size must be positive"
        );
        let cells = self.grid_cell_count();
        anyhow::ensure!(
            cells.x >= 1 && cells.y >= 1,
            "Grid needs at least one cell per axis"
        );
        let cell_w = self.world.width / cells.x as f32;
        let cell_h = self.world.height / cells.y as f32;
        anyhow::ensure!(
            self.max_interaction_range() <= cell_w.min(cell_h),
            "Visual range {} exceeds grid cell size {}x{}",
            self.max_interaction_range(),
            cell_w,
            cell_h
        );
        anyhow::ensure!(
            cells.x >= 3 && cells.y >= 3,
            "World must span at least 3x3 grid cells, got {}x{}",
            cells.x,
            cells.y
        );

        // Population
        let p = &self.population;
        anyhow::ensure!(
            p.min_plants <= p.max_plants,
            "min_plants must not exceed max_plants"
        );
        anyhow::ensure!(
            p.initial_cells <= p.max_cells,
            "initial_cells must not exceed max_cells"
        );
        anyhow::ensure!(
            p.initial_plants <= p.max_plants,
            "initial_plants must not exceed max_plants"
        );
        anyhow::ensure!(p.cull_odds >= 1, "cull_odds must be at least 1");

        // Cell
        anyhow::ensure!(
            self.cell.visual_range > 0.0,
            "Cell visual range must be positive"
        );
        anyhow::ensure!(
            self.cell.contact_slack >= 0.0 && self.cell.contact_slack < self.cell.visual_range,
            "contact_slack must lie in [0, visual_range)"
        );
        anyhow::ensure!(
            self.cell.friction_coefficient >= 0.0,
            "Friction coefficient must be non-negative"
        );
        anyhow::ensure!(
            self.cell.nutrient_rate >= 0.0,
            "Nutrient rate must be non-negative"
        );

        // Plant
        anyhow::ensure!(self.plant.radius > 0.0, "Plant radius must be positive");
        anyhow::ensure!(
            self.plant.visual_range > 0.0,
            "Plant visual range must be positive"
        );
        anyhow::ensure!(
            self.plant.friction >= 1.0,
            "Plant friction must be at least 1"
        );
        anyhow::ensure!(self.plant.max_speed >= 0.0, "Plant max speed must be non-negative");
        anyhow::ensure!(ordered(self.plant.marker_range), "Invalid plant marker range");
        anyhow::ensure!(
            self.plant.spawn_spread.is_finite() && self.plant.spawn_spread >= 0.0,
            "Plant spawn spread must be finite and non-negative"
        );
        anyhow::ensure!(
            self.plant.marker_drift.is_finite() && self.plant.marker_drift >= 0.0,
            "Plant marker drift must be finite and non-negative"
        );
        anyhow::ensure!(
            self.plant.random_death_odds >= 1,
            "random_death_odds must be at least 1"
        );

        // Energy
        anyhow::ensure!(self.energy.initial > 0.0, "Initial energy must be positive");
        anyhow::ensure!(
            self.energy.decay_constant >= 0.0,
            "Decay constant must be non-negative"
        );
        anyhow::ensure!(
            (0.0..=0.5).contains(&self.energy.diffusion),
            "Diffusion must be in [0, 0.5]"
        );
        anyhow::ensure!(
            self.energy.reproduction_threshold > 0.0,
            "Reproduction threshold must be positive"
        );

        // Genome
        anyhow::ensure!(ordered(self.genome.radius_range), "Invalid radius range");
        anyhow::ensure!(
            self.genome.radius_range[0] > 0.0,
            "Cell radius must be positive"
        );
        anyhow::ensure!(ordered(self.genome.speed_range), "Invalid speed range");
        anyhow::ensure!(
            self.genome.speed_range[0] >= 0.0,
            "Speed range must be non-negative"
        );
        anyhow::ensure!(
            ordered(self.genome.mutation_rate_range),
            "Invalid mutation rate range"
        );
        anyhow::ensure!(
            self.genome.mutation_rate_range[0] >= 0.0 && self.genome.mutation_rate_range[1] <= 1.0,
            "Genome mutation rate must be in [0, 1]"
        );

        // Brain
        anyhow::ensure!(
            !self.brain.hidden_layers.contains(&0),
            "Hidden layers must not be empty"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.brain.mutation_rate),
            "Brain mutation rate must be in [0, 1]"
        );
        anyhow::ensure!(
            self.brain.mutation_range >= 0.0,
            "Brain mutation range must be non-negative"
        );

        // Stats
        if let Some(path) = &self.stats.autosave_path {
            anyhow::ensure!(!path.trim().is_empty(), "autosave_path must not be blank");
        }

        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
        Self::from_toml(&content)
    }

    /// Digest of the behavioural sections, stored in snapshots to flag drift.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.cell).as_bytes());
        hasher.update(format!("{:?}", self.plant).as_bytes());
        hasher.update(format!("{:?}", self.energy).as_bytes());
        hasher.update(format!("{:?}", self.genome).as_bytes());
        hasher.update(format!("{:?}", self.brain).as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_world_width() {
        let config = AppConfig {
            world: WorldConfig {
                width: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_grid_too_fine_for_visual_range() {
        let config = AppConfig {
            world: WorldConfig {
                grid_cells: Some([100, 100]),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds grid cell size"));
    }

    #[test]
    fn test_derived_grid_respects_range() {
        let config = AppConfig::default();
        let cells = config.grid_cell_count();
        assert!(config.world.width / cells.x as f32 >= config.cell.visual_range);
        assert!(config.world.height / cells.y as f32 >= config.cell.visual_range);
    }

    #[test]
    fn test_initial_above_capacity() {
        let config = AppConfig {
            population: PopulationConfig {
                initial_cells: 10,
                max_cells: 5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_brain_mutation_rate() {
        let config = AppConfig {
            brain: BrainConfig {
                mutation_rate: 1.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_spawn_spread_rejected() {
        for spread in [-1.0, f32::NAN, f32::INFINITY] {
            let config = AppConfig {
                plant: PlantConfig {
                    spawn_spread: spread,
                    ..Default::default()
                },
                ..Default::default()
            };
            assert!(config.validate().is_err(), "spread {spread} accepted");
        }
        let still = AppConfig {
            plant: PlantConfig {
                spawn_spread: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(still.validate().is_ok());
    }

    #[test]
    fn test_negative_marker_drift_rejected() {
        let config = AppConfig {
            plant: PlantConfig {
                marker_drift: -0.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_partial_sections() {
        let config = AppConfig::from_toml(
            r#"
            [world]
            width = 800.0
            height = 600.0
            seed = 7

            [brain]
            hidden_layers = [4, 4]
            "#,
        )
        .unwrap();
        assert_eq!(config.world.seed, Some(7));
        assert_eq!(config.brain.hidden_layers, vec![4, 4]);
        assert_eq!(config.energy, EnergyConfig::default());
    }

    #[test]
    fn test_fingerprint_consistency() {
        let config1 = AppConfig::default();
        let mut config2 = AppConfig::default();
        assert_eq!(config1.fingerprint(), config2.fingerprint());
        config2.world.seed = Some(1);
        assert_eq!(config1.fingerprint(), config2.fingerprint());
        config2.energy.diffusion = 0.02;
        assert_ne!(config1.fingerprint(), config2.fingerprint());
    }
}
