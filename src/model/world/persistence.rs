use crate::model::world::World;
use anyhow::Context;
use biolife_core::lifecycle::{retire, Organism};
use biolife_core::snapshot::{
    cell_to_record, hydrate_cell, hydrate_plant, plant_to_record, validate_record,
};
use biolife_data::{SimulationRecord, SNAPSHOT_FORMAT_VERSION};
use chrono::Utc;
use std::path::Path;

impl World {
    /// Captures every live entity and the tick counters.
    #[must_use]
    pub fn snapshot(&self) -> SimulationRecord {
        SimulationRecord {
            format_version: SNAPSHOT_FORMAT_VERSION,
            run_id: self.run_id,
            saved_at: Utc::now().to_rfc3339(),
            config_fingerprint: self.config.fingerprint(),
            total_ticks: self.total_ticks,
            relative_ticks: self.relative_ticks,
            total_extinctions: self.total_extinctions,
            cells: self
                .cells
                .iter()
                .filter(|c| c.life.alive)
                .map(cell_to_record)
                .collect(),
            plants: self
                .plants
                .iter()
                .filter(|p| p.life.alive)
                .map(plant_to_record)
                .collect(),
        }
    }

    /// Replaces the population with `record`.
    ///
    /// The whole record is validated before anything changes, so a rejected
    /// record leaves the world exactly as it was.
    pub fn restore(&mut self, record: &SimulationRecord) -> anyhow::Result<()> {
        validate_record(
            record,
            self.cells.capacity(),
            self.plants.capacity(),
            &self.border,
        )
        .context("rejecting snapshot")?;

        if record.config_fingerprint != self.config.fingerprint() {
            tracing::warn!(
                saved = %record.config_fingerprint,
                "Snapshot was taken under a different configuration"
            );
        }

        self.cells.collect_indices(&mut self.cell_order);
        for &slot in &self.cell_order {
            let id = self.cells.at(slot).entity_id();
            if retire(&mut self.cells, slot, self.dead_zone) {
                self.touched.push(id);
            }
        }
        self.plants.collect_indices(&mut self.plant_order);
        for &slot in &self.plant_order {
            let id = self.plants.at(slot).entity_id();
            if retire(&mut self.plants, slot, self.dead_zone) {
                self.touched.push(id);
            }
        }

        for r in &record.plants {
            let slot = self
                .plants
                .add()
                .context("plant pool exhausted during restore")?;
            hydrate_plant(self.plants.at_mut(slot), r);
            self.touched.push(self.plants.at(slot).entity_id());
        }
        for r in &record.cells {
            let slot = self
                .cells
                .add()
                .context("cell pool exhausted during restore")?;
            hydrate_cell(self.cells.at_mut(slot), r);
            self.touched.push(self.cells.at(slot).entity_id());
        }

        self.run_id = record.run_id;
        self.total_ticks = record.total_ticks;
        self.relative_ticks = record.relative_ticks;
        self.total_extinctions = record.total_extinctions;
        self.grid.clear();

        tracing::info!(
            run_id = %self.run_id,
            tick = self.total_ticks,
            cells = self.cells.len(),
            plants = self.plants.len(),
            "Snapshot restored"
        );
        Ok(())
    }

    /// Writes a snapshot file, gzip-compressed when `compress` is set.
    pub fn save(&self, path: impl AsRef<Path>, compress: bool) -> anyhow::Result<()> {
        let path = path.as_ref();
        biolife_io::save_snapshot(path, &self.snapshot(), compress)
            .with_context(|| format!("saving snapshot to {}", path.display()))
    }

    /// Reads a snapshot file and restores it.
    pub fn load(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let record = biolife_io::load_snapshot(path)
            .with_context(|| format!("loading snapshot from {}", path.display()))?;
        self.restore(&record)
    }
}
