//! # Biolife Core
//!
//! The population simulation engine behind Biolife: plants and cells moving,
//! colliding, feeding and reproducing inside a bounded 2D arena.
//!
//! This crate contains the deterministic simulation logic:
//! - Uniform-grid broad phase with fixed-capacity cells
//! - Fixed-capacity entity pools with stable slot identity
//! - Circle collision resolved through a per-tick displacement accumulator
//! - Feed-forward perceptron brains with per-weight Bernoulli mutation
//! - Per-tick systems for plants, cells and population regulation
//!
//! ## Example
//!
//! ```
//! use biolife_core::brain::{layer_sizes_with_hidden, PerceptronLogic, BRAIN_INPUTS};
//! use biolife_data::Perceptron;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let mut brain = Perceptron::new_random_with_rng(&layer_sizes_with_hidden(&[8]), 0.35, 0.5, &mut rng);
//!
//! let inputs = [0.5; BRAIN_INPUTS];
//! let outputs = brain.compute_output(&inputs).unwrap();
//! assert!(outputs.iter().all(|o| (-1.0..=1.0).contains(o)));
//! ```

/// Perceptron forward pass, topology and mutation
pub mod brain;
/// Configuration management for simulation parameters
pub mod config;
/// Metabolism, diffusion and feeding
pub mod energy;
/// Heritable non-neural traits
pub mod genome;
/// Entity birth, reset and retirement
pub mod lifecycle;
/// Performance metrics collection and structured logging
pub mod metrics;
/// Integration, collision and border containment
pub mod physics;
/// Fixed-capacity slot allocator
pub mod pool;
/// Renderer consumer interface
pub mod render;
/// Persistence record conversion and validation
pub mod snapshot;
/// Uniform grid broad phase
pub mod spatial_hash;
/// Per-tick simulation systems
pub mod systems;

pub use brain::{BrainError, PerceptronLogic};
pub use genome::GenomeLogic;
pub use lifecycle::Organism;
pub use metrics::{init_logging, Metrics};
pub use physics::KinematicsLogic;
pub use pool::{EntityPool, PoolError, PoolItem};
pub use render::{NullSink, RecordingSink, RenderSink};
pub use snapshot::SnapshotError;
pub use spatial_hash::{EntityId, GridError, SpatialHashGrid};
