pub mod mechanics;
pub mod simulator;
pub mod state;
pub mod stats;
