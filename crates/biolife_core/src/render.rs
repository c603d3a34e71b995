//! Renderer consumer interface.
//!
//! The core reports per-entity position deltas and colours after each
//! commit; how they are drawn is up to the sink.

use crate::spatial_hash::EntityId;
use biolife_data::{Color, Vec2};

pub trait RenderSink {
    /// Moves every vertex belonging to `ids` by `delta`.
    fn set_positions(&mut self, ids: &[EntityId], delta: Vec2);
    fn set_color(&mut self, ids: &[EntityId], color: Color);
}

/// Discards everything; used by the headless runner.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn set_positions(&mut self, _ids: &[EntityId], _delta: Vec2) {}
    fn set_color(&mut self, _ids: &[EntityId], _color: Color) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    Move(EntityId, Vec2),
    Recolor(EntityId, Color),
}

/// Keeps every event in order. Handy for tests and replays.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub events: Vec<RenderEvent>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Sum of all deltas reported for `id`.
    #[must_use]
    pub fn net_movement(&self, id: EntityId) -> Vec2 {
        self.events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::Move(who, d) if *who == id => Some(*d),
                _ => None,
            })
            .sum()
    }

    #[must_use]
    pub fn last_color(&self, id: EntityId) -> Option<Color> {
        self.events.iter().rev().find_map(|e| match e {
            RenderEvent::Recolor(who, c) if *who == id => Some(*c),
            _ => None,
        })
    }
}

impl RenderSink for RecordingSink {
    fn set_positions(&mut self, ids: &[EntityId], delta: Vec2) {
        self.events
            .extend(ids.iter().map(|&id| RenderEvent::Move(id, delta)));
    }

    fn set_color(&mut self, ids: &[EntityId], color: Color) {
        self.events
            .extend(ids.iter().map(|&id| RenderEvent::Recolor(id, color)));
    }
}
