pub mod data;
pub mod frontier;
pub mod setup;
pub mod simulate;
pub mod ui;

pub use frontier::FrontierOptions;
pub use simulate::SimulateOptions;
