use crate::pool::EntityPool;
use biolife_data::{Cell, Plant, PopulationSample, PopulationStats};

/// Reads the current population into a sample.
#[must_use]
pub fn sample_population(
    tick: u64,
    cells: &EntityPool<Cell>,
    plants: &EntityPool<Plant>,
) -> PopulationSample {
    let n = cells.len();
    let (age, offspring, energy) = cells.iter().fold((0.0, 0.0, 0.0), |acc, c| {
        (
            acc.0 + c.life.age as f64,
            acc.1 + f64::from(c.offspring),
            acc.2 + f64::from(c.energy),
        )
    });
    let mean = |total: f64| if n == 0 { 0.0 } else { (total / n as f64) as f32 };
    PopulationSample {
        tick,
        cells: n,
        plants: plants.len(),
        mean_cell_age: mean(age),
        mean_offspring: mean(offspring),
        mean_energy: mean(energy),
    }
}

/// Appends `sample` to the history.
pub fn record_sample(stats: &mut PopulationStats, sample: PopulationSample) {
    stats.samples.push(sample);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolItem;

    #[test]
    fn test_sample_means() {
        let mut cells = EntityPool::with_capacity(3);
        for (age, offspring, energy) in [(10, 1, 20.0), (30, 3, 40.0)] {
            let mut c = Cell::default();
            c.life.age = age;
            c.offspring = offspring;
            c.energy = energy;
            cells.emplace(c).unwrap();
        }
        let plants: EntityPool<Plant> = EntityPool::with_capacity(1);
        let s = sample_population(7, &cells, &plants);
        assert_eq!(s.tick, 7);
        assert_eq!(s.cells, 2);
        assert_eq!(s.plants, 0);
        assert_eq!(s.mean_cell_age, 20.0);
        assert_eq!(s.mean_offspring, 2.0);
        assert_eq!(s.mean_energy, 30.0);
        assert_eq!(cells.at(1).slot_index(), 1);
    }

    #[test]
    fn test_empty_population_samples_zero() {
        let cells: EntityPool<Cell> = EntityPool::with_capacity(1);
        let plants: EntityPool<Plant> = EntityPool::with_capacity(1);
        let s = sample_population(0, &cells, &plants);
        assert_eq!(s.mean_energy, 0.0);

        let mut stats = PopulationStats::default();
        record_sample(&mut stats, s);
        assert_eq!(stats.latest(), Some(&s));
    }
}
