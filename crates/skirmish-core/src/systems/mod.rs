//! Systems - logic that operates on components

mod combat;
mod movement;

pub use combat::*;
pub use movement::*;
