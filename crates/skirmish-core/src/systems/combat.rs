//! Combat system - targeting, attack timing and the damage ledger.
//!
//! Every unit in the tick's alive snapshot either attacks its nearest enemy
//! (if in weapon range and off cooldown), waits (in range, cooling down), or
//! walks toward the origin (nothing in range). Units are processed in roster
//! order and each one sees the effects of those processed before it: a unit
//! killed earlier in the tick loses its turn, but stays targetable.

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::components::{AttackClock, Health, Kind, Position, Team};
use crate::config::UnitTypeRegistry;
use super::movement::move_toward_origin;

/// Cumulative damage dealt, per unit type name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageLedger {
    totals: BTreeMap<String, f64>,
}

impl DamageLedger {
    /// A ledger with a zero entry for every registered type
    pub fn new(registry: &UnitTypeRegistry) -> Self {
        Self {
            totals: registry.names().map(|n| (n.to_string(), 0.0)).collect(),
        }
    }

    pub fn record(&mut self, unit_type: &str, amount: f64) {
        *self.totals.entry(unit_type.to_string()).or_insert(0.0) += amount;
    }

    pub fn total(&self, unit_type: &str) -> f64 {
        self.totals.get(unit_type).copied().unwrap_or(0.0)
    }

    /// Totals in lexicographic type order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.totals.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn totals(&self) -> &BTreeMap<String, f64> {
        &self.totals
    }
}

/// A unit that was alive when the tick started
#[derive(Debug, Clone)]
pub struct Combatant {
    pub entity: Entity,
    pub team: Team,
}

/// What happened during one combat pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombatStats {
    pub attacks: u32,
    pub moves: u32,
    pub idle: u32,
    pub kills: u32,
}

/// Nearest unit of another team in the snapshot, with its distance.
///
/// Distances use current positions. Ties go to the first enemy in snapshot
/// order. Enemies killed earlier in the tick are still candidates.
pub fn nearest_enemy(
    world: &World,
    snapshot: &[Combatant],
    team: &Team,
    from: Position,
) -> Option<(Entity, f64)> {
    let mut nearest = None;
    let mut nearest_distance = f64::INFINITY;

    for other in snapshot {
        if &other.team == team {
            continue;
        }
        let Ok(pos) = world.get::<&Position>(other.entity) else {
            continue;
        };
        let distance = from.distance(&pos);
        if distance < nearest_distance {
            nearest_distance = distance;
            nearest = Some(other.entity);
        }
    }

    nearest.map(|entity| (entity, nearest_distance))
}

/// Resolve one tick of combat for every unit in `snapshot`.
///
/// `now` is the simulated time at the start of the tick.
pub fn combat_system(
    world: &mut World,
    snapshot: &[Combatant],
    delta_seconds: f64,
    now: f64,
    ledger: &mut DamageLedger,
) -> CombatStats {
    let mut stats = CombatStats::default();

    for actor in snapshot {
        let alive = world
            .get::<&Health>(actor.entity)
            .map(|health| health.is_alive())
            .unwrap_or(false);
        if !alive {
            continue;
        }

        let (kind, pos) = match (
            world.get::<&Kind>(actor.entity),
            world.get::<&Position>(actor.entity),
        ) {
            (Ok(kind), Ok(pos)) => ((*kind).clone(), *pos),
            _ => continue,
        };

        match nearest_enemy(world, snapshot, &actor.team, pos) {
            Some((target, distance)) if distance <= kind.weapon_range => {
                let ready = world
                    .get::<&AttackClock>(actor.entity)
                    .map(|clock| clock.is_ready(now, kind.weapon_cooldown))
                    .unwrap_or(false);
                if !ready {
                    stats.idle += 1;
                    continue;
                }

                if apply_damage(world, target, kind.weapon_damage) {
                    stats.kills += 1;
                    log::debug!(
                        "t={:.3} {} ({}) killed a unit at distance {:.2}",
                        now,
                        kind.name(),
                        actor.team,
                        distance
                    );
                }
                ledger.record(kind.name(), kind.weapon_damage);
                if let Ok(mut clock) = world.get::<&mut AttackClock>(actor.entity) {
                    clock.last_attack_time = now;
                }
                stats.attacks += 1;
                log::trace!(
                    "t={:.3} {} ({}) hit for {}",
                    now,
                    kind.name(),
                    actor.team,
                    kind.weapon_damage
                );
            }
            _ => {
                if move_toward_origin(world, actor.entity, kind.move_speed, delta_seconds) {
                    stats.moves += 1;
                } else {
                    stats.idle += 1;
                }
            }
        }
    }

    stats
}

/// Subtract `amount` from the target's health. Returns true if this blow
/// took it from alive to dead. Health is allowed to go negative.
fn apply_damage(world: &mut World, target: Entity, amount: f64) -> bool {
    let Ok(mut health) = world.get::<&mut Health>(target) else {
        return false;
    };
    let was_alive = health.is_alive();
    health.0 -= amount;
    was_alive && !health.is_alive()
}
