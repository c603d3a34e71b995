use crate::config::GenomeConfig;
use biolife_data::{Color, Genome};
use rand::Rng;

/// Uniform draw from a closed range; a degenerate range yields its lower end.
pub(crate) fn sample_range<R: Rng>(range: [f32; 2], rng: &mut R) -> f32 {
    if range[1] <= range[0] {
        range[0]
    } else {
        rng.gen_range(range[0]..=range[1])
    }
}

fn drift_channel<R: Rng>(channel: u8, amount: u8, rng: &mut R) -> u8 {
    if amount == 0 {
        return channel;
    }
    let a = i16::from(amount);
    (i16::from(channel) + rng.gen_range(-a..=a)).clamp(0, 255) as u8
}

pub trait GenomeLogic {
    /// Fresh genome with every trait drawn from its configured range.
    fn create_random<R: Rng>(config: &GenomeConfig, rng: &mut R) -> Self;

    /// Writes a mutated copy of `self` into `target`.
    ///
    /// Radius is inherited as is. Max speed drifts by up to the parent's own
    /// mutation rate, colour channels drift by `color_mutation`, and the
    /// mutation rate itself is redrawn from its range.
    fn mutate_into<R: Rng>(&self, target: &mut Genome, config: &GenomeConfig, rng: &mut R);
}

impl GenomeLogic for Genome {
    fn create_random<R: Rng>(config: &GenomeConfig, rng: &mut R) -> Self {
        Genome {
            radius: sample_range(config.radius_range, rng),
            max_speed: sample_range(config.speed_range, rng),
            mutation_rate: sample_range(config.mutation_rate_range, rng),
            color: Color::rgba(rng.gen(), rng.gen(), rng.gen(), config.color_alpha),
        }
    }

    fn mutate_into<R: Rng>(&self, target: &mut Genome, config: &GenomeConfig, rng: &mut R) {
        let m = self.mutation_rate;
        let drift = if m > 0.0 { rng.gen_range(-m..=m) } else { 0.0 };
        target.radius = self.radius;
        target.max_speed = (self.max_speed + drift).max(0.0);
        target.color = Color::rgba(
            drift_channel(self.color.r, config.color_mutation, rng),
            drift_channel(self.color.g, config.color_mutation, rng),
            drift_channel(self.color.b, config.color_mutation, rng),
            config.color_alpha,
        );
        target.mutation_rate = sample_range(config.mutation_rate_range, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_random_genome_within_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let config = GenomeConfig::default();
        for _ in 0..200 {
            let g = Genome::create_random(&config, &mut rng);
            assert_eq!(g.radius, 10.0);
            assert!((0.0..=1.0).contains(&g.max_speed));
            assert!((0.0005..=0.004).contains(&g.mutation_rate));
            assert_eq!(g.color.a, 85);
        }
    }

    #[test]
    fn test_clone_mutation_is_trait_specific() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let config = GenomeConfig {
            radius_range: [4.0, 12.0],
            ..Default::default()
        };
        let parent = Genome {
            radius: 7.5,
            max_speed: 0.5,
            mutation_rate: 0.002,
            color: Color::rgba(0, 128, 255, 85),
        };
        let mut child = Genome::default();
        for _ in 0..200 {
            parent.mutate_into(&mut child, &config, &mut rng);
            assert_eq!(child.radius, parent.radius);
            assert!((child.max_speed - parent.max_speed).abs() <= parent.mutation_rate);
            assert!(child.color.r <= 4);
            assert!((124..=132).contains(&child.color.g));
            assert!(child.color.b >= 251);
            assert!((0.0005..=0.004).contains(&child.mutation_rate));
        }
    }

    #[test]
    fn test_speed_never_negative() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let parent = Genome {
            radius: 10.0,
            max_speed: 0.0,
            mutation_rate: 0.5,
            color: Color::default(),
        };
        let mut child = Genome::default();
        for _ in 0..100 {
            parent.mutate_into(&mut child, &GenomeConfig::default(), &mut rng);
            assert!(child.max_speed >= 0.0);
        }
    }
}
