//! Performance metrics collection for the simulation.
//!
//! Provides structured logging and counters for monitoring simulation
//! throughput and population health.

use biolife_data::PopulationSample;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Metrics collector owned by the world.
pub struct Metrics {
    tick_count: AtomicU64,
    cell_count: AtomicU64,
    plant_count: AtomicU64,
    busy_nanos: AtomicU64,
    pub counters: Mutex<HashMap<String, AtomicU64>>,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("tick_count", &self.tick_count())
            .field("cell_count", &self.cell_count())
            .field("plant_count", &self.plant_count())
            .finish_non_exhaustive()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            cell_count: AtomicU64::new(0),
            plant_count: AtomicU64::new(0),
            busy_nanos: AtomicU64::new(0),
            counters: Mutex::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick with its duration.
    pub fn record_tick(&self, duration: Duration, cells: usize, plants: usize) {
        self.tick_count.fetch_add(1, Ordering::Relaxed);
        self.cell_count.store(cells as u64, Ordering::Relaxed);
        self.plant_count.store(plants as u64, Ordering::Relaxed);
        self.busy_nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Logs a population sample together with the tick rate so far.
    pub fn log_sample(&self, sample: &PopulationSample, extinctions: u32) {
        let ticks = self.tick_count().max(1);
        let mean_tick_us = self.busy_nanos.load(Ordering::Relaxed) / ticks / 1000;
        tracing::info!(
            tick = sample.tick,
            cells = sample.cells,
            plants = sample.plants,
            mean_age = sample.mean_cell_age,
            mean_offspring = sample.mean_offspring,
            mean_energy = sample.mean_energy,
            extinctions,
            mean_tick_us,
            "Population"
        );
    }

    /// Adds `by` to a named counter.
    pub fn add_to_counter(&self, name: &str, by: u64) {
        if by == 0 {
            return;
        }
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(by, Ordering::Relaxed);
    }

    pub fn increment_counter(&self, name: &str) {
        self.add_to_counter(name, 1);
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .get(name)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn cell_count(&self) -> u64 {
        self.cell_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn plant_count(&self) -> u64 {
        self.plant_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Logs a simulation event.
    pub fn log_event(&self, event_type: &str, details: &str) {
        tracing::info!(
            event_type = event_type,
            details = details,
            "Simulation event"
        );
    }
}

/// Installs the global tracing subscriber. `RUST_LOG` overrides the default
/// `info` level.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .ok();
}
