//! Scenario loading - unit type registry and team deployments.
//!
//! A scenario document is JSON with two required, non-empty maps:
//!
//! ```json
//! {
//!   "units": { "knight": { "health": 100, "moveSpeed": 1.5, "weaponRange": 1,
//!                          "weaponDamage": 12, "weaponCooldown": 1.2 } },
//!   "teams": { "red":  [ { "name": "knight", "x": -10, "y": 0 } ],
//!              "blue": [ { "name": "knight", "x":  10, "y": 0 } ] }
//! }
//! ```
//!
//! Teams and members keep document order; that order is the unit roster
//! order and therefore the tie-break order for targeting.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::components::{Position, Team, UnitType};
use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    units: Option<Map<String, Value>>,
    #[serde(default)]
    teams: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUnitType {
    health: Option<f64>,
    move_speed: Option<f64>,
    weapon_range: Option<f64>,
    weapon_damage: Option<f64>,
    weapon_cooldown: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawMember {
    name: Option<String>,
    x: Option<f64>,
    y: Option<f64>,
}

fn required(value: Option<f64>, unit_type: &str, field: &'static str) -> ConfigResult<f64> {
    value.ok_or_else(|| ConfigError::MissingUnitField {
        unit_type: unit_type.to_string(),
        field,
    })
}

fn check_stat(value: f64, unit_type: &str, field: &'static str, positive: bool) -> ConfigResult<f64> {
    let valid = value.is_finite() && if positive { value > 0.0 } else { value >= 0.0 };
    if valid {
        Ok(value)
    } else {
        Err(ConfigError::InvalidStat {
            unit_type: unit_type.to_string(),
            field,
            value,
        })
    }
}

impl RawUnitType {
    fn into_unit_type(self, name: &str) -> ConfigResult<UnitType> {
        // Checked in document field order so the first missing field is reported
        let health = required(self.health, name, "health")?;
        let move_speed = required(self.move_speed, name, "moveSpeed")?;
        let weapon_range = required(self.weapon_range, name, "weaponRange")?;
        let weapon_damage = required(self.weapon_damage, name, "weaponDamage")?;
        let weapon_cooldown = required(self.weapon_cooldown, name, "weaponCooldown")?;

        Ok(UnitType {
            name: name.to_string(),
            max_health: check_stat(health, name, "health", true)?,
            move_speed: check_stat(move_speed, name, "moveSpeed", false)?,
            weapon_range: check_stat(weapon_range, name, "weaponRange", false)?,
            weapon_damage: check_stat(weapon_damage, name, "weaponDamage", true)?,
            weapon_cooldown: check_stat(weapon_cooldown, name, "weaponCooldown", false)?,
        })
    }
}

/// Immutable catalog of unit archetypes, keyed (and iterated) by name
#[derive(Debug, Clone, Default)]
pub struct UnitTypeRegistry {
    types: BTreeMap<String, Arc<UnitType>>,
}

impl UnitTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one [`UnitType`] per entry of a raw `units` map
    pub fn from_raw(units: &Map<String, Value>) -> ConfigResult<Self> {
        let mut registry = Self::new();
        for (name, stats) in units {
            let raw: RawUnitType = serde_json::from_value(stats.clone())
                .map_err(|e| ConfigError::malformed(format!("unit type '{}'", name), e))?;
            registry.insert(raw.into_unit_type(name)?);
        }
        Ok(registry)
    }

    pub fn insert(&mut self, unit_type: UnitType) {
        self.types
            .insert(unit_type.name.clone(), Arc::new(unit_type));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<UnitType>> {
        self.types.get(name)
    }

    /// Type names in lexicographic order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<UnitType>> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// One unit to place on the field at simulation start
#[derive(Debug, Clone)]
pub struct Deployment {
    pub unit_type: Arc<UnitType>,
    pub team: Team,
    pub position: Position,
}

/// A validated scenario: registry plus ordered deployments
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    pub registry: UnitTypeRegistry,
    /// Every team named in the document, in document order (even empty ones)
    pub teams: Vec<Team>,
    /// Units in roster order
    pub deployments: Vec<Deployment>,
}

impl Scenario {
    pub fn new(registry: UnitTypeRegistry) -> Self {
        Self {
            registry,
            teams: Vec::new(),
            deployments: Vec::new(),
        }
    }

    /// Read and validate a scenario file
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ConfigError::malformed("invalid JSON", e))?;
        Self::from_value(value)
    }

    /// Validate a parsed document. Nothing is built unless every check passes.
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        let doc: RawDocument = serde_json::from_value(value)
            .map_err(|e| ConfigError::malformed("top-level document", e))?;

        let units = doc
            .units
            .filter(|m| !m.is_empty())
            .ok_or(ConfigError::MissingSection("units"))?;
        let registry = UnitTypeRegistry::from_raw(&units)?;

        let teams = doc
            .teams
            .filter(|m| !m.is_empty())
            .ok_or(ConfigError::MissingSection("teams"))?;

        let mut scenario = Scenario::new(registry);
        for (team_name, members) in teams {
            let members: Vec<RawMember> = serde_json::from_value(members)
                .map_err(|e| ConfigError::malformed(format!("team '{}'", team_name), e))?;

            let team = Team::new(team_name);
            scenario.add_team(team.clone());
            for member in members {
                let missing = |field| ConfigError::MissingMemberField {
                    team: team.0.clone(),
                    field,
                };
                let name = member.name.ok_or_else(|| missing("name"))?;
                let x = member.x.ok_or_else(|| missing("x"))?;
                let y = member.y.ok_or_else(|| missing("y"))?;
                scenario.deploy(team.clone(), &name, Position::new(x, y))?;
            }
        }

        log::info!(
            "Loaded scenario: {} unit types, {} teams, {} units",
            scenario.registry.len(),
            scenario.teams.len(),
            scenario.deployments.len()
        );
        Ok(scenario)
    }

    /// Register a team without placing any units
    pub fn add_team(&mut self, team: Team) {
        if !self.teams.contains(&team) {
            self.teams.push(team);
        }
    }

    /// Place a unit of a registered type. Fails if the type is unknown.
    pub fn deploy(&mut self, team: Team, unit_type: &str, position: Position) -> ConfigResult<()> {
        let unit_type = self
            .registry
            .get(unit_type)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownUnitType {
                team: team.0.clone(),
                unit_type: unit_type.to_string(),
            })?;
        self.add_team(team.clone());
        self.deployments.push(Deployment {
            unit_type,
            team,
            position,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stats() -> Value {
        json!({
            "health": 100, "moveSpeed": 1, "weaponRange": 5,
            "weaponDamage": 10, "weaponCooldown": 1.0
        })
    }

    #[test]
    fn test_loads_in_document_order() {
        let doc = json!({
            "units": { "soldier": stats() },
            "teams": {
                "zulu": [ { "name": "soldier", "x": 1, "y": 2 } ],
                "alpha": [
                    { "name": "soldier", "x": -1, "y": 0 },
                    { "name": "soldier", "x": -2, "y": 0.5 }
                ]
            }
        });
        let scenario = Scenario::from_value(doc).unwrap();

        let teams: Vec<_> = scenario.teams.iter().map(Team::as_str).collect();
        assert_eq!(teams, vec!["zulu", "alpha"]);
        assert_eq!(scenario.deployments.len(), 3);
        assert_eq!(scenario.deployments[0].team.as_str(), "zulu");
        assert_eq!(scenario.deployments[2].position, Position::new(-2.0, 0.5));
        assert_eq!(scenario.deployments[1].unit_type.max_health, 100.0);
    }

    #[test]
    fn test_missing_sections() {
        let err = Scenario::from_value(json!({ "teams": { "a": [] } })).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection("units")));

        let err = Scenario::from_value(json!({ "units": {}, "teams": { "a": [] } })).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection("units")));

        let err = Scenario::from_value(json!({ "units": { "s": stats() } })).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection("teams")));

        let err =
            Scenario::from_value(json!({ "units": { "s": stats() }, "teams": {} })).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection("teams")));
    }

    #[test]
    fn test_missing_unit_field_names_type_and_field() {
        let doc = json!({
            "units": { "tank": { "health": 10, "moveSpeed": 1, "weaponDamage": 1, "weaponCooldown": 1 } },
            "teams": { "a": [] }
        });
        match Scenario::from_value(doc).unwrap_err() {
            ConfigError::MissingUnitField { unit_type, field } => {
                assert_eq!(unit_type, "tank");
                assert_eq!(field, "weaponRange");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_member_field() {
        let doc = json!({
            "units": { "s": stats() },
            "teams": { "red": [ { "name": "s", "x": 0 } ] }
        });
        match Scenario::from_value(doc).unwrap_err() {
            ConfigError::MissingMemberField { team, field } => {
                assert_eq!(team, "red");
                assert_eq!(field, "y");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_unit_type() {
        let doc = json!({
            "units": { "s": stats() },
            "teams": { "blue": [ { "name": "dragon", "x": 0, "y": 0 } ] }
        });
        match Scenario::from_value(doc).unwrap_err() {
            ConfigError::UnknownUnitType { team, unit_type } => {
                assert_eq!(team, "blue");
                assert_eq!(unit_type, "dragon");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_invalid_stats() {
        let doc = json!({
            "units": { "ghost": {
                "health": 0, "moveSpeed": 1, "weaponRange": 1,
                "weaponDamage": 1, "weaponCooldown": 1
            } },
            "teams": { "a": [] }
        });
        assert!(matches!(
            Scenario::from_value(doc).unwrap_err(),
            ConfigError::InvalidStat { field: "health", .. }
        ));

        let doc = json!({
            "units": { "ghost": {
                "health": 5, "moveSpeed": -1, "weaponRange": 1,
                "weaponDamage": 1, "weaponCooldown": 1
            } },
            "teams": { "a": [] }
        });
        assert!(matches!(
            Scenario::from_value(doc).unwrap_err(),
            ConfigError::InvalidStat { field: "moveSpeed", .. }
        ));

        // Damage must be positive
        let doc = json!({
            "units": { "pacifist": {
                "health": 5, "moveSpeed": 1, "weaponRange": 1,
                "weaponDamage": 0, "weaponCooldown": 1
            } },
            "teams": { "a": [] }
        });
        let err = Scenario::from_value(doc).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidStat { field: "weaponDamage", .. }));
        assert_eq!(err.to_string(), "invalid weaponDamage 0 for unit type 'pacifist'");

        // Zero range, speed and cooldown are all meaningful
        let doc = json!({
            "units": { "turret": {
                "health": 5, "moveSpeed": 0, "weaponRange": 0,
                "weaponDamage": 1, "weaponCooldown": 0
            } },
            "teams": { "a": [] }
        });
        assert!(Scenario::from_value(doc).is_ok());
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(
            Scenario::from_json_str("{ not json").unwrap_err(),
            ConfigError::Malformed { .. }
        ));

        let doc = json!({
            "units": { "s": { "health": "lots", "moveSpeed": 1, "weaponRange": 1,
                              "weaponDamage": 1, "weaponCooldown": 1 } },
            "teams": { "a": [] }
        });
        assert!(matches!(
            Scenario::from_value(doc).unwrap_err(),
            ConfigError::Malformed { .. }
        ));
    }

    #[test]
    fn test_registry_is_sorted() {
        let doc = json!({
            "units": { "zealot": stats(), "archer": stats(), "mage": stats() },
            "teams": { "a": [] }
        });
        let scenario = Scenario::from_value(doc).unwrap();
        let names: Vec<_> = scenario.registry.names().collect();
        assert_eq!(names, vec!["archer", "mage", "zealot"]);
    }
}
