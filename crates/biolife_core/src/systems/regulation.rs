//! Population bounds: culling, plant top-up and extinction recovery.
//!
//! Every function appends the ids it spawned or retired to `touched` so the
//! caller can publish their new positions and colours.

use super::TickContext;
use crate::lifecycle::{retire, spawn_random_cell, spawn_random_plant, Organism};
use crate::pool::EntityPool;
use crate::spatial_hash::EntityId;
use biolife_data::{Cell, Plant, Vec2};
use rand::Rng;

/// Active entities that are still alive.
///
/// Entities that died this tick keep their slot until the next sweep and
/// never count towards a population target.
#[must_use]
pub fn live_count<T: Organism>(pool: &EntityPool<T>) -> usize {
    pool.iter().filter(|e| e.life().alive).count()
}

/// Randomly retires live entities until at most `limit` remain.
///
/// Each pass visits the live slots in order and retires each with odds
/// `1 / odds`, so survivors are spread over the whole pool.
pub fn cull_to_limit<T: Organism, R: Rng>(
    pool: &mut EntityPool<T>,
    limit: usize,
    odds: u32,
    dead_zone: Vec2,
    rng: &mut R,
    touched: &mut Vec<EntityId>,
) -> usize {
    let mut live = live_count(pool);
    let mut culled = 0;
    let mut slots = Vec::new();
    let odds = odds.max(1);
    while live > limit {
        pool.collect_indices(&mut slots);
        for &slot in &slots {
            if live <= limit {
                break;
            }
            if !pool.at(slot).life().alive {
                continue;
            }
            if rng.gen_range(0..odds) == 0 {
                let id = pool.at(slot).entity_id();
                if retire(pool, slot, dead_zone) {
                    touched.push(id);
                    culled += 1;
                    live -= 1;
                }
            }
        }
    }
    culled
}

/// Spawns random plants until at least `min` are alive or the pool is full.
pub fn top_up_plants<R: Rng>(
    plants: &mut EntityPool<Plant>,
    min: usize,
    ctx: &TickContext<'_>,
    rng: &mut R,
    touched: &mut Vec<EntityId>,
) -> usize {
    let mut live = live_count(plants);
    let mut spawned = 0;
    while live < min {
        let Some(slot) = spawn_random_plant(plants, ctx.config, ctx.border, rng) else {
            break;
        };
        touched.push(EntityId::Plant(slot));
        live += 1;
        spawned += 1;
    }
    spawned
}

/// Brings the plant population to exactly `target` live plants.
///
/// Plants that died this tick are retired first, then the highest live
/// slots. Returns how many dead plants were cleared.
pub fn restore_plants<R: Rng>(
    plants: &mut EntityPool<Plant>,
    target: usize,
    ctx: &TickContext<'_>,
    rng: &mut R,
    touched: &mut Vec<EntityId>,
) -> usize {
    let dead: Vec<usize> = plants
        .iter()
        .filter(|p| !p.life.alive)
        .map(|p| p.slot)
        .collect();
    let mut cleared = 0;
    for slot in dead {
        if retire(plants, slot, ctx.dead_zone) {
            touched.push(EntityId::Plant(slot));
            cleared += 1;
        }
    }

    if plants.len() > target {
        let surplus = plants.len() - target;
        let doomed: Vec<usize> = {
            let mut slots: Vec<usize> = plants.active_indices().collect();
            slots.reverse();
            slots.truncate(surplus);
            slots
        };
        for slot in doomed {
            if retire(plants, slot, ctx.dead_zone) {
                touched.push(EntityId::Plant(slot));
            }
        }
    }
    top_up_plants(plants, target, ctx, rng, touched);
    cleared
}

/// Seeds `count` random first-generation cells.
pub fn reseed_cells<R: Rng>(
    cells: &mut EntityPool<Cell>,
    count: usize,
    ctx: &TickContext<'_>,
    rng: &mut R,
    touched: &mut Vec<EntityId>,
) -> usize {
    let mut spawned = 0;
    for _ in 0..count {
        let Some(slot) = spawn_random_cell(cells, ctx.config, ctx.border, rng) else {
            break;
        };
        touched.push(EntityId::Cell(slot));
        spawned += 1;
    }
    spawned
}
