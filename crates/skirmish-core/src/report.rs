//! Outcome reporting - winner and per-type damage summary

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::components::Team;
use crate::config::UnitTypeRegistry;
use crate::systems::DamageLedger;

/// Final result of a battle, for programmatic consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleReport {
    /// Sole surviving team, or `None` when everyone died on the same tick
    pub winner_team: Option<String>,
    /// Damage dealt by every registered unit type, sorted by name
    pub damage_by_type: BTreeMap<String, f64>,
    /// Ticks simulated before termination was detected
    pub ticks: u64,
    /// Simulated seconds at termination
    pub sim_time: f64,
}

/// Build the report from final state. Every registered type appears, even
/// those that never landed a hit.
pub fn summarize(
    winner: Option<&Team>,
    ledger: &DamageLedger,
    registry: &UnitTypeRegistry,
    ticks: u64,
    sim_time: f64,
) -> BattleReport {
    BattleReport {
        winner_team: winner.map(|t| t.0.clone()),
        damage_by_type: registry
            .names()
            .map(|name| (name.to_string(), ledger.total(name)))
            .collect(),
        ticks,
        sim_time,
    }
}

impl fmt::Display for BattleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "===== Simulation Complete =====")?;
        match &self.winner_team {
            Some(team) => writeln!(f, "Winning team: {}", team)?,
            None => writeln!(f, "No units remain (tie).")?,
        }
        writeln!(f)?;
        writeln!(f, "Damage dealt per unit type:")?;
        for (name, damage) in &self.damage_by_type {
            writeln!(f, "- {}: {:.2} total damage", name, damage)?;
        }
        write!(f, "===============================")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::UnitType;

    fn registry(names: &[&str]) -> UnitTypeRegistry {
        let mut registry = UnitTypeRegistry::new();
        for name in names {
            registry.insert(UnitType {
                name: name.to_string(),
                max_health: 10.0,
                move_speed: 1.0,
                weapon_range: 1.0,
                weapon_damage: 1.0,
                weapon_cooldown: 1.0,
            });
        }
        registry
    }

    #[test]
    fn test_summary_text() {
        let registry = registry(&["tank", "archer"]);
        let mut ledger = DamageLedger::new(&registry);
        ledger.record("tank", 12.5);
        ledger.record("tank", 0.13);

        let report = summarize(Some(&Team::new("red")), &ledger, &registry, 42, 0.7);

        let expected = "\
===== Simulation Complete =====
Winning team: red

Damage dealt per unit type:
- archer: 0.00 total damage
- tank: 12.63 total damage
===============================";
        assert_eq!(report.to_string(), expected);
    }

    #[test]
    fn test_tie() {
        let registry = registry(&["s"]);
        let ledger = DamageLedger::new(&registry);
        let report = summarize(None, &ledger, &registry, 0, 0.0);
        assert!(report.to_string().contains("No units remain (tie)."));
        assert_eq!(report.winner_team, None);
    }

    #[test]
    fn test_json_shape() {
        let registry = registry(&["s"]);
        let mut ledger = DamageLedger::new(&registry);
        ledger.record("s", 30.0);
        let report = summarize(Some(&Team::new("blue")), &ledger, &registry, 61, 1.0);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["winnerTeam"], "blue");
        assert_eq!(value["damageByType"]["s"], 30.0);
        assert_eq!(value["ticks"], 61);
    }
}
