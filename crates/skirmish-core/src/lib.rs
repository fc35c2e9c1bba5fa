//! Skirmish Core - Deterministic Team Battle Simulation Engine
//!
//! Units from two or more teams close on the world origin and shoot the
//! nearest enemy until at most one team is left standing.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Units, one per deployment in the scenario
//! - **Components**: Pure data attached to entities (Kind, Team, Position, Health, AttackClock)
//! - **Systems**: Logic that queries and updates components (combat, movement)
//!
//! The engine steps at a fixed `dt`, so a run is bit-for-bit reproducible
//! however fast or slow the host drives it.
//!
//! # Example
//!
//! ```rust,no_run
//! use skirmish_core::prelude::*;
//!
//! let scenario = Scenario::from_path("data/scenarios/skirmish.json").unwrap();
//! let mut engine = SimulationEngine::new(&scenario);
//!
//! // Run headless until one team remains
//! let report = engine.run();
//! println!("{}", report);
//! ```

pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod report;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::{Deployment, Scenario, UnitTypeRegistry};
    pub use crate::engine::{EngineConfig, SimState, SimulationEngine, Termination, Tick, UnitView, FIXED_DT};
    pub use crate::error::{ConfigError, ConfigResult};
    pub use crate::report::BattleReport;
    pub use crate::systems::{CombatStats, DamageLedger};
}
