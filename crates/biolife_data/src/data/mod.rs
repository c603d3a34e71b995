pub mod entity;
pub mod genotype;
pub mod geometry;
pub mod record;
pub mod stats;
