use serde::{Deserialize, Serialize};

/// One population reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct PopulationSample {
    pub tick: u64,
    pub cells: usize,
    pub plants: usize,
    pub mean_cell_age: f32,
    pub mean_offspring: f32,
    pub mean_energy: f32,
}

/// Population history plus the counters the runner reports.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PopulationStats {
    pub samples: Vec<PopulationSample>,
    pub total_births: u64,
    pub total_deaths: u64,
    pub suppressed_births: u64,
    pub culled: u64,
}

impl PopulationStats {
    #[must_use]
    pub fn latest(&self) -> Option<&PopulationSample> {
        self.samples.last()
    }
}
