use super::TickContext;
use crate::physics::KinematicsLogic;
use crate::pool::EntityPool;
use crate::spatial_hash::{EntityId, GridError, NeighborBuffer, SpatialHashGrid};
use biolife_data::{Plant, Vec2};
use rand::Rng;

/// What happened to the plant population during one update.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlantTally {
    pub collisions: usize,
    pub died: usize,
    pub want_seed: usize,
}

/// Drifts, collides and ages every live plant.
///
/// Plants within `visual_range` with a similar species marker pull each
/// other in; dissimilar ones push apart. Each overlapping pair is resolved
/// once, by the lower slot.
pub fn update_plants<R: Rng>(
    plants: &mut EntityPool<Plant>,
    grid: &SpatialHashGrid,
    ctx: &TickContext<'_>,
    order: &mut Vec<usize>,
    buffer: &mut NeighborBuffer,
    rng: &mut R,
) -> Result<PlantTally, GridError> {
    let cfg = &ctx.config.plant;
    let range_sq = cfg.visual_range * cfg.visual_range;
    let mut tally = PlantTally::default();
    let mut partners: Vec<usize> = Vec::new();

    plants.collect_indices(order);
    for &i in order.iter() {
        let (position, marker) = {
            let p = plants.at(i);
            if !p.life.alive {
                continue;
            }
            (p.kinematics.position, p.species_marker)
        };

        grid.query(position, buffer)?;
        let mut force = Vec2::ZERO;
        let mut neighbors = 0u32;
        partners.clear();
        for id in buffer.iter() {
            let EntityId::Plant(j) = id else { continue };
            if j == i {
                continue;
            }
            let Some(other) = plants.get(j).filter(|o| o.life.alive) else {
                continue;
            };
            let offset = other.kinematics.position - position;
            let dist_sq = offset.length_squared();
            if dist_sq > range_sq {
                continue;
            }
            neighbors += 1;
            if dist_sq > 0.0 {
                if (other.species_marker - marker).abs() > cfg.species_threshold {
                    force -= offset / dist_sq.sqrt() * cfg.repel_strength;
                } else {
                    force += offset * cfg.attract_strength;
                }
            }
            if j > i {
                partners.push(j);
            }
        }

        {
            let p = plants.at_mut(i);
            p.neighbors = neighbors;
            let k = &mut p.kinematics;
            k.velocity += force;
            k.apply_friction(cfg.friction);
            k.speed_limit(cfg.max_speed);
            k.integrate();
        }

        for &j in &partners {
            if let Some((a, b)) = plants.get_pair_mut(i, j) {
                if a.kinematics.collide(&mut b.kinematics) {
                    tally.collisions += 1;
                }
            }
        }

        let p = plants.at_mut(i);
        p.life.age = p
            .life
            .age
            .saturating_add(rng.gen_range(0..=cfg.max_age_step));
        if p.life.age > cfg.max_age || neighbors < cfg.crowd_threshold {
            p.life.wants_reproduce = true;
            tally.want_seed += 1;
        }
        if p.energy <= 0.0 || rng.gen_range(0..cfg.random_death_odds) == 0 {
            p.life.alive = false;
            p.life.wants_reproduce = false;
            tally.died += 1;
        }
        p.kinematics.contain_to_border(ctx.border);
    }
    Ok(tally)
}
