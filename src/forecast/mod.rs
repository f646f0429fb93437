pub mod engine;
pub mod production;

pub use engine::*;
pub use production::*;
