//! Per-tick systems run by the world in a fixed order.

pub mod cells;
pub mod plants;
pub mod regulation;
pub mod stats;

use crate::config::AppConfig;
use biolife_data::{Bounds, Vec2};

/// Read-only state every system needs.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    pub config: &'a AppConfig,
    /// Region entities are kept inside, one grid cell in from the world edge.
    pub border: &'a Bounds,
    pub dead_zone: Vec2,
}
