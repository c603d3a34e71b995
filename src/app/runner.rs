//! Headless tick loop.

use crate::app::shutdown::ShutdownManager;
use crate::model::world::World;
use anyhow::Result;
use biolife_core::render::RenderSink;

/// Totals over one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub births: u64,
    pub deaths: u64,
    pub extinctions: u32,
    pub interrupted: bool,
}

pub struct Runner {
    pub world: World,
    pub shutdown: ShutdownManager,
}

impl Runner {
    pub fn new(world: World, shutdown: ShutdownManager) -> Self {
        Self { world, shutdown }
    }

    /// Runs `max_ticks` ticks, or until shutdown is requested when it is 0.
    ///
    /// The close flag is checked between ticks only.
    pub async fn run(&mut self, max_ticks: u64, sink: &mut dyn RenderSink) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        loop {
            if self.shutdown.is_shutdown_requested() {
                summary.interrupted = true;
                break;
            }
            if max_ticks > 0 && summary.ticks >= max_ticks {
                break;
            }

            let report = self.world.update(sink)?;
            summary.ticks += 1;
            summary.births += report.births as u64;
            summary.deaths += report.deaths as u64;
            summary.extinctions += u32::from(report.extinction);

            // Let the signal task run on single-threaded runtimes.
            if summary.ticks % 64 == 0 {
                tokio::task::yield_now().await;
            }
        }

        tracing::info!(
            ticks = summary.ticks,
            births = summary.births,
            deaths = summary.deaths,
            extinctions = summary.extinctions,
            interrupted = summary.interrupted,
            elapsed_ms = self.world.metrics.elapsed().as_millis() as u64,
            "Run finished"
        );
        Ok(summary)
    }
}
