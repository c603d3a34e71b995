use crate::model::world::{TickReport, World, HIDDEN};
use biolife_core::lifecycle::Organism;
use biolife_core::physics::KinematicsLogic;
use biolife_core::pool::EntityPool;
use biolife_core::render::RenderSink;
use biolife_core::spatial_hash::EntityId;
use biolife_core::systems::{regulation, stats, TickContext};
use biolife_data::{Bounds, Vec2};
use std::time::Duration;

impl World {
    /// Folds every live entity's pending displacement into its position and
    /// reports the movement.
    pub(super) fn commit_positions(&mut self, sink: &mut dyn RenderSink) {
        commit_pool(&mut self.plants, &self.border, sink);
        commit_pool(&mut self.cells, &self.border, sink);
    }

    /// Culls over-limit pools, tops plants up and recovers from extinction.
    pub(super) fn regulate(&mut self, report: &mut TickReport) {
        let odds = self.config.population.cull_odds;
        report.culled += regulation::cull_to_limit(
            &mut self.cells,
            self.cell_limit,
            odds,
            self.dead_zone,
            &mut self.rng,
            &mut self.touched,
        );
        report.culled += regulation::cull_to_limit(
            &mut self.plants,
            self.plant_limit,
            odds,
            self.dead_zone,
            &mut self.rng,
            &mut self.touched,
        );

        let ctx = TickContext {
            config: &self.config,
            border: &self.border,
            dead_zone: self.dead_zone,
        };
        let min_plants = self.config.population.min_plants.min(self.plant_limit);
        report.plants_spawned += regulation::top_up_plants(
            &mut self.plants,
            min_plants,
            &ctx,
            &mut self.rng,
            &mut self.touched,
        );

        let extinct = !self.cells.iter().any(|c| c.life.alive);
        if extinct && self.config.population.auto_extinction_reset {
            // Leftover corpses would hold slots the new cohort needs.
            self.cells.collect_indices(&mut self.cell_order);
            for &slot in &self.cell_order {
                if biolife_core::lifecycle::retire(&mut self.cells, slot, self.dead_zone) {
                    self.touched.push(EntityId::Cell(slot));
                    report.deaths += 1;
                }
            }

            let initial_plants = self.config.population.initial_plants.min(self.plant_limit);
            let initial_cells = self.config.population.initial_cells.min(self.cell_limit);
            report.deaths += regulation::restore_plants(
                &mut self.plants,
                initial_plants,
                &ctx,
                &mut self.rng,
                &mut self.touched,
            );
            let seeded = regulation::reseed_cells(
                &mut self.cells,
                initial_cells,
                &ctx,
                &mut self.rng,
                &mut self.touched,
            );

            self.total_extinctions += 1;
            report.extinction = true;
            tracing::info!(
                tick = self.total_ticks,
                lasted = self.relative_ticks,
                extinctions = self.total_extinctions,
                seeded,
                "Extinction, population reset"
            );
            self.relative_ticks = 0;
        }
    }

    /// Publishes position and colour for everything spawned or retired
    /// outside the commit pass.
    pub(super) fn flush_touched(&mut self, sink: &mut dyn RenderSink) {
        if self.touched.is_empty() {
            return;
        }
        self.touched.sort_unstable();
        self.touched.dedup();
        for &id in &self.touched {
            match id {
                EntityId::Cell(slot) => publish_one(&mut self.cells, slot, id, sink),
                EntityId::Plant(slot) => publish_one(&mut self.plants, slot, id, sink),
            }
        }
        self.touched.clear();
    }

    /// Counters, history, periodic logging and autosave.
    pub(super) fn finish_tick(&mut self, report: &TickReport, elapsed: Duration) {
        self.total_ticks += 1;
        self.relative_ticks += 1;

        self.stats.total_births += report.births as u64;
        self.stats.total_deaths += report.deaths as u64;
        self.stats.suppressed_births += report.suppressed_births as u64;
        self.stats.culled += report.culled as u64;
        self.metrics.add_to_counter("births", report.births as u64);
        self.metrics.add_to_counter("deaths", report.deaths as u64);
        self.metrics
            .add_to_counter("suppressed_births", report.suppressed_births as u64);
        self.metrics.add_to_counter("culled", report.culled as u64);
        self.metrics
            .record_tick(elapsed, self.cells.len(), self.plants.len());

        let cfg = &self.config.stats;
        let history_due = cfg.history_interval > 0 && self.total_ticks % cfg.history_interval == 0;
        let print_due = cfg.print_interval > 0 && self.total_ticks % cfg.print_interval == 0;
        if history_due || print_due {
            let sample = stats::sample_population(self.total_ticks, &self.cells, &self.plants);
            if history_due {
                stats::record_sample(&mut self.stats, sample);
            }
            if print_due {
                self.metrics.log_sample(&sample, self.total_extinctions);
            }
        }

        let autosave_due =
            cfg.autosave_interval > 0 && self.total_ticks % cfg.autosave_interval == 0;
        if let (true, Some(path)) = (autosave_due, cfg.autosave_path.clone()) {
            let compress = path.ends_with(".gz");
            match self.save(&path, compress) {
                Ok(()) => tracing::info!(tick = self.total_ticks, path = %path, "Autosaved"),
                Err(e) => tracing::warn!(path = %path, "Autosave failed: {e:#}"),
            }
        }
    }
}

fn commit_pool<T: Organism>(pool: &mut EntityPool<T>, border: &Bounds, sink: &mut dyn RenderSink) {
    for item in pool.iter_mut() {
        if !item.life().alive {
            continue;
        }
        let delta = item.kinematics_mut().commit_displacement(border);
        if delta != Vec2::ZERO {
            sink.set_positions(&[item.entity_id()], delta);
        }
    }
}

fn publish_one<T: Organism>(
    pool: &mut EntityPool<T>,
    slot: usize,
    id: EntityId,
    sink: &mut dyn RenderSink,
) {
    if slot >= pool.backing_len() {
        return;
    }
    let visible = pool.is_active(slot) && pool.at(slot).life().alive;
    let item = pool.at_mut(slot);
    let delta = item.kinematics_mut().publish();
    if delta != Vec2::ZERO {
        sink.set_positions(&[id], delta);
    }
    let color = if visible { item.color() } else { HIDDEN };
    sink.set_color(&[id], color);
}
