use crate::model::world::{TickReport, World};
use anyhow::Context;
use biolife_core::lifecycle::{reproduce_cell, reproduce_plant, retire, Organism};
use biolife_core::pool::EntityPool;
use biolife_core::render::RenderSink;
use biolife_core::spatial_hash::EntityId;
use biolife_core::systems::{cells, plants, TickContext};
use std::time::Instant;

impl World {
    /// Advances the simulation by one tick.
    ///
    /// Stages run in a fixed order:
    /// 1. grid rebuild from this tick's positions
    /// 2. lifecycle sweep (retire the dead, spawn requested children)
    /// 3. plant drift and collisions
    /// 4. cell sensing and perceptron decisions
    /// 5. cell actions, contacts, metabolism
    /// 6. position commit, published to `sink`
    /// 7. population regulation
    ///
    /// A grid query outside the arena aborts the tick with an error; that
    /// only happens when the border and grid sizing disagree.
    pub fn update(&mut self, sink: &mut dyn RenderSink) -> anyhow::Result<TickReport> {
        let started = Instant::now();
        let mut report = TickReport::default();

        self.rebuild_grid()?;
        self.lifecycle_sweep(&mut report);

        let ctx = TickContext {
            config: &self.config,
            border: &self.border,
            dead_zone: self.dead_zone,
        };

        let plant_tally = plants::update_plants(
            &mut self.plants,
            &self.grid,
            &ctx,
            &mut self.plant_order,
            &mut self.buffer,
            &mut self.rng,
        )
        .context("plant update")?;

        self.cells.collect_indices(&mut self.cell_order);
        cells::sense_and_decide(
            &mut self.cells,
            &self.plants,
            &self.grid,
            &self.config,
            &self.cell_order,
        )
        .context("cell sensing")?;
        let cell_tally = cells::act(&mut self.cells, &mut self.plants, &ctx, &self.cell_order);

        self.metrics
            .add_to_counter("plant_collisions", plant_tally.collisions as u64);
        self.metrics
            .add_to_counter("cell_contacts", cell_tally.contacts as u64);
        self.metrics
            .add_to_counter("feedings", cell_tally.feedings as u64);
        self.metrics
            .add_to_counter("deaths_starved", cell_tally.starved as u64);
        self.metrics
            .add_to_counter("deaths_isolated", cell_tally.isolated as u64);
        self.metrics
            .add_to_counter("deaths_crowded", cell_tally.crowded as u64);

        self.commit_positions(sink);
        self.regulate(&mut report);
        self.flush_touched(sink);
        self.finish_tick(&report, started.elapsed());

        Ok(report)
    }

    fn rebuild_grid(&mut self) -> anyhow::Result<()> {
        self.grid.clear();
        for p in self.plants.iter().filter(|p| p.life.alive) {
            self.grid
                .insert(p.kinematics.position, EntityId::Plant(p.slot))
                .with_context(|| format!("inserting plant {}", p.slot))?;
        }
        for c in self.cells.iter().filter(|c| c.life.alive) {
            self.grid
                .insert(c.kinematics.position, EntityId::Cell(c.slot))
                .with_context(|| format!("inserting cell {}", c.slot))?;
        }
        let dropped = self.grid.dropped_since_clear();
        if dropped > 0 {
            tracing::trace!(dropped, "Grid cells full, insertions dropped");
            self.metrics.add_to_counter("grid_drops", dropped as u64);
        }
        Ok(())
    }

    /// Retires dead entities first so their slots can take this tick's
    /// children.
    fn lifecycle_sweep(&mut self, report: &mut TickReport) {
        report.deaths += sweep_dead(
            &mut self.plants,
            &mut self.plant_order,
            self.dead_zone,
            &mut self.touched,
        );
        report.deaths += sweep_dead(
            &mut self.cells,
            &mut self.cell_order,
            self.dead_zone,
            &mut self.touched,
        );

        self.plants.collect_indices(&mut self.plant_order);
        for &slot in &self.plant_order {
            if !self.plants.at(slot).life.wants_reproduce {
                continue;
            }
            match reproduce_plant(
                &mut self.plants,
                slot,
                &self.config,
                &self.border,
                &mut self.rng,
            ) {
                Some(child) => {
                    self.touched.push(EntityId::Plant(child));
                    report.births += 1;
                }
                None => {
                    self.plants.at_mut(slot).life.wants_reproduce = false;
                    report.suppressed_births += 1;
                }
            }
        }

        self.cells.collect_indices(&mut self.cell_order);
        for &slot in &self.cell_order {
            if !self.cells.at(slot).life.wants_reproduce {
                continue;
            }
            match reproduce_cell(
                &mut self.cells,
                slot,
                &self.config,
                &self.border,
                &mut self.rng,
            ) {
                Some(child) => {
                    self.touched.push(EntityId::Cell(child));
                    report.births += 1;
                }
                None => {
                    // Keeps the request so the cell tries again next tick.
                    report.suppressed_births += 1;
                }
            }
        }

        if report.suppressed_births > 0 {
            tracing::debug!(
                suppressed = report.suppressed_births,
                cells = self.cells.len(),
                plants = self.plants.len(),
                "Reproduction suppressed, pool full"
            );
        }
    }
}

/// Retires every active entity that died during the previous tick.
fn sweep_dead<T: Organism>(
    pool: &mut EntityPool<T>,
    order: &mut Vec<usize>,
    dead_zone: biolife_data::Vec2,
    touched: &mut Vec<EntityId>,
) -> usize {
    pool.collect_indices(order);
    let mut retired = 0;
    for &slot in order.iter() {
        if pool.at(slot).life().alive {
            continue;
        }
        let id = pool.at(slot).entity_id();
        if retire(pool, slot, dead_zone) {
            touched.push(id);
            retired += 1;
        }
    }
    retired
}
