pub mod runner;
pub mod shutdown;

pub use runner::{RunSummary, Runner};
pub use shutdown::ShutdownManager;
