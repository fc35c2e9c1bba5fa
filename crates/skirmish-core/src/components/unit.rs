//! Unit components - archetype stats and per-unit combat state.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// `lastAttackTime` for a unit that has never attacked. Far enough in the
/// past that the opening attack is never blocked by cooldown.
pub const NEVER_ATTACKED: f64 = -1e9;

/// Immutable archetype shared by every unit of the same type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitType {
    pub name: String,
    pub max_health: f64,
    pub move_speed: f64,
    pub weapon_range: f64,
    pub weapon_damage: f64,
    pub weapon_cooldown: f64,
}

impl UnitType {
    /// Capital first letter of the type name, used as the on-screen glyph
    pub fn glyph(&self) -> char {
        self.name
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?')
    }
}

/// Reference from a unit to its archetype. Static stats are read through it.
#[derive(Debug, Clone)]
pub struct Kind(pub Arc<UnitType>);

impl Kind {
    pub fn name(&self) -> &str {
        &self.0.name
    }
}

impl std::ops::Deref for Kind {
    type Target = UnitType;
    fn deref(&self) -> &UnitType {
        &self.0
    }
}

/// Current hit points. May go negative; anything at or below zero is dead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health(pub f64);

impl Health {
    pub fn is_alive(&self) -> bool {
        self.0 > 0.0
    }

    /// Health as a fraction of `max`, clamped to [0, 1] for display
    pub fn ratio(&self, max: f64) -> f64 {
        if max <= 0.0 {
            return 0.0;
        }
        (self.0 / max).clamp(0.0, 1.0)
    }
}

/// Simulated time of the unit's last attack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackClock {
    pub last_attack_time: f64,
}

impl AttackClock {
    pub fn new() -> Self {
        Self {
            last_attack_time: NEVER_ATTACKED,
        }
    }

    /// Whether `cooldown` has elapsed since the last attack at time `now`
    pub fn is_ready(&self, now: f64, cooldown: f64) -> bool {
        now - self.last_attack_time >= cooldown
    }
}

impl Default for AttackClock {
    fn default() -> Self {
        Self::new()
    }
}
