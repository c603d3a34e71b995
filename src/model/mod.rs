pub use biolife_core::{GenomeLogic, KinematicsLogic, PerceptronLogic};
pub mod brain {
    pub use biolife_core::brain::*;
}
pub mod config {
    pub use biolife_core::config::*;
}
pub mod spatial_hash {
    pub use biolife_core::spatial_hash::*;
}
pub mod pool {
    pub use biolife_core::pool::*;
}
pub mod physics {
    pub use biolife_core::physics::*;
}
pub mod lifecycle {
    pub use biolife_core::lifecycle::*;
}
pub mod render {
    pub use biolife_core::render::*;
}
pub mod snapshot {
    pub use biolife_core::snapshot::*;
}

pub mod state {
    pub use biolife_data::*;
}
pub mod world;
