//! Simulation engine - main entry point for running a battle

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::components::*;
use crate::config::{Deployment, Scenario, UnitTypeRegistry};
use crate::report::{summarize, BattleReport};
use crate::systems::*;

/// Canonical simulation step: 60 ticks per simulated second
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Engine tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Simulated seconds per tick
    pub dt: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { dt: FIXED_DT }
    }
}

/// Emitted once, on the tick that finds at most one team standing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Termination {
    pub winner: Option<Team>,
}

/// Clock state. `Terminated` is absorbing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimState {
    Running,
    Terminated(Termination),
}

/// Result of one call to [`SimulationEngine::tick`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// Combat ran for this tick
    Resolved(CombatStats),
    /// No combat ran; the battle is over
    Terminated(Termination),
}

/// Read-only view of one unit, for renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitView {
    pub entity_index: usize,
    pub position: Position,
    /// Health over max health, clamped to [0, 1]
    pub health_ratio: f64,
    pub team: Team,
    pub unit_type: String,
    pub glyph: char,
    pub alive: bool,
}

/// Main simulation engine
pub struct SimulationEngine {
    /// ECS world containing all units, dead or alive
    pub world: World,
    /// Units in configuration order; the targeting tie-break order
    roster: Vec<Entity>,
    registry: UnitTypeRegistry,
    teams: Vec<Team>,
    ledger: DamageLedger,
    config: EngineConfig,
    ticks: u64,
    state: SimState,
}

impl SimulationEngine {
    /// Build a battle from a validated scenario with the default 1/60 step
    pub fn new(scenario: &Scenario) -> Self {
        Self::with_config(scenario, EngineConfig::default())
    }

    pub fn with_config(scenario: &Scenario, config: EngineConfig) -> Self {
        let mut world = World::new();
        let roster = scenario
            .deployments
            .iter()
            .map(|d| spawn_unit(&mut world, d))
            .collect();

        Self {
            world,
            roster,
            registry: scenario.registry.clone(),
            teams: scenario.teams.clone(),
            ledger: DamageLedger::new(&scenario.registry),
            config,
            ticks: 0,
            state: SimState::Running,
        }
    }

    /// Advance the battle by one fixed step.
    ///
    /// Checks for team elimination first; combat only runs while at least
    /// two teams have living units.
    pub fn tick(&mut self) -> Tick {
        let snapshot = self.alive_snapshot();
        if let Some(termination) = self.check_termination(&snapshot) {
            return Tick::Terminated(termination);
        }

        let now = self.sim_time();
        let stats = combat_system(
            &mut self.world,
            &snapshot,
            self.config.dt,
            now,
            &mut self.ledger,
        );
        self.ticks += 1;
        Tick::Resolved(stats)
    }

    /// Transition to `Terminated` if at most one team has living units
    fn check_termination(&mut self, snapshot: &[Combatant]) -> Option<Termination> {
        if let SimState::Terminated(termination) = &self.state {
            return Some(termination.clone());
        }

        let teams: BTreeSet<&Team> = snapshot.iter().map(|c| &c.team).collect();
        if teams.len() > 1 {
            return None;
        }

        let termination = Termination {
            winner: teams.into_iter().next().cloned(),
        };
        let now = self.sim_time();
        match &termination.winner {
            Some(team) => log::info!("Team {} wins after {} ticks ({:.2}s)", team, self.ticks, now),
            None => log::info!("No units remain after {} ticks ({:.2}s)", self.ticks, now),
        }
        self.state = SimState::Terminated(termination.clone());
        Some(termination)
    }

    /// Tick until a team is eliminated and return the report.
    ///
    /// Does not return if no team can ever be eliminated, for example when
    /// every remaining unit is stationary and out of range of every enemy.
    /// Use [`Self::run_for`] with a cap in that case.
    pub fn run(&mut self) -> BattleReport {
        loop {
            if let Tick::Terminated(termination) = self.tick() {
                return self.build_report(&termination);
            }
        }
    }

    /// Resolve at most `max_ticks` combat ticks. `None` if no team has
    /// been eliminated by then.
    pub fn run_for(&mut self, max_ticks: u64) -> Option<BattleReport> {
        for _ in 0..max_ticks {
            if let Tick::Terminated(termination) = self.tick() {
                return Some(self.build_report(&termination));
            }
        }
        let snapshot = self.alive_snapshot();
        self.check_termination(&snapshot)
            .map(|termination| self.build_report(&termination))
    }

    /// Final report, once the battle is over
    pub fn report(&self) -> Option<BattleReport> {
        match &self.state {
            SimState::Terminated(termination) => Some(self.build_report(termination)),
            SimState::Running => None,
        }
    }

    fn build_report(&self, termination: &Termination) -> BattleReport {
        summarize(
            termination.winner.as_ref(),
            &self.ledger,
            &self.registry,
            self.ticks,
            self.sim_time(),
        )
    }

    /// Units alive right now, in roster order
    pub fn alive_snapshot(&self) -> Vec<Combatant> {
        self.roster
            .iter()
            .filter_map(|&entity| {
                let health = self.world.get::<&Health>(entity).ok()?;
                if !health.is_alive() {
                    return None;
                }
                let team = self.world.get::<&Team>(entity).ok()?;
                Some(Combatant {
                    entity,
                    team: (*team).clone(),
                })
            })
            .collect()
    }

    /// Per-unit render state for the whole roster, dead units included
    pub fn snapshot(&self) -> Vec<UnitView> {
        self.roster
            .iter()
            .enumerate()
            .filter_map(|(index, &entity)| {
                let mut query = self
                    .world
                    .query_one::<(&Kind, &Team, &Position, &Health)>(entity)
                    .ok()?;
                let (kind, team, pos, health) = query.get()?;
                Some(UnitView {
                    entity_index: index,
                    position: *pos,
                    health_ratio: health.ratio(kind.max_health),
                    team: team.clone(),
                    unit_type: kind.name().to_string(),
                    glyph: kind.glyph(),
                    alive: health.is_alive(),
                })
            })
            .collect()
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.state, SimState::Terminated(_))
    }

    /// Simulated seconds elapsed. Derived from the tick count, never accumulated.
    pub fn sim_time(&self) -> f64 {
        self.ticks as f64 * self.config.dt
    }

    /// Combat ticks resolved so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn dt(&self) -> f64 {
        self.config.dt
    }

    pub fn ledger(&self) -> &DamageLedger {
        &self.ledger
    }

    pub fn registry(&self) -> &UnitTypeRegistry {
        &self.registry
    }

    /// Every team in the scenario, in document order
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn unit_count(&self) -> usize {
        self.roster.len()
    }

    pub fn alive_count(&self) -> usize {
        self.alive_snapshot().len()
    }

    /// Roster entity at `index` (configuration order)
    pub fn unit(&self, index: usize) -> Option<Entity> {
        self.roster.get(index).copied()
    }
}

/// Spawn one unit at full health, never having attacked
pub fn spawn_unit(world: &mut World, deployment: &Deployment) -> Entity {
    world.spawn((
        Kind(deployment.unit_type.clone()),
        deployment.team.clone(),
        deployment.position,
        Health(deployment.unit_type.max_health),
        AttackClock::new(),
    ))
}
