//! Post-battle invariant checks for `--validate`.

use skirmish_core::prelude::*;

// ── Test harness ────────────────────────────────────────────────────────

pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

/// Print results and return the number of failures
pub fn print_results(results: &[TestResult], verbose: bool) -> usize {
    println!("--- Battle Validation ---");
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed,
        results.len(),
        failed
    );
    failed
}

/// Check a finished battle against the engine's invariants
pub fn validate_battle(
    scenario: &Scenario,
    engine: &SimulationEngine,
    report: &BattleReport,
    max_ticks: u64,
) -> Vec<TestResult> {
    let mut results = Vec::new();

    // Same scenario, fresh engine: identical outcome
    let rerun = SimulationEngine::new(scenario).run_for(max_ticks);
    results.push(TestResult {
        name: "deterministic_rerun".into(),
        passed: rerun.as_ref() == Some(report),
        detail: match &rerun {
            Some(r) => format!("rerun winner={:?} ticks={}", r.winner_team, r.ticks),
            None => "rerun did not finish".into(),
        },
    });

    // Every registered type is reported, zero or not
    let missing: Vec<_> = scenario
        .registry
        .names()
        .filter(|name| !report.damage_by_type.contains_key(*name))
        .collect();
    results.push(TestResult {
        name: "report_lists_every_type".into(),
        passed: missing.is_empty(),
        detail: if missing.is_empty() {
            format!("{} unit types reported", report.damage_by_type.len())
        } else {
            format!("missing: {}", missing.join(", "))
        },
    });

    // Damage dealt equals health lost (overkill included)
    let dealt: f64 = report.damage_by_type.values().sum();
    let lost: f64 = engine
        .world
        .query::<(&Kind, &Health)>()
        .iter()
        .map(|(_, (kind, health))| kind.max_health - health.0)
        .sum();
    let tolerance = 1e-9 * dealt.abs().max(1.0);
    results.push(TestResult {
        name: "damage_accounting".into(),
        passed: (dealt - lost).abs() <= tolerance,
        detail: format!("dealt={:.2} lost={:.2}", dealt, lost),
    });

    // Survivors all belong to the winner
    let survivors: Vec<UnitView> = engine.snapshot().into_iter().filter(|u| u.alive).collect();
    let consistent = match &report.winner_team {
        Some(winner) => !survivors.is_empty() && survivors.iter().all(|u| u.team.as_str() == winner),
        None => survivors.is_empty(),
    };
    results.push(TestResult {
        name: "winner_matches_survivors".into(),
        passed: consistent,
        detail: format!("{} survivors, winner={:?}", survivors.len(), report.winner_team),
    });

    // Reported time agrees with the fixed step
    let expected_time = report.ticks as f64 * engine.dt();
    results.push(TestResult {
        name: "fixed_step_time".into(),
        passed: (report.sim_time - expected_time).abs() < 1e-9,
        detail: format!("{} ticks = {:.3}s", report.ticks, report.sim_time),
    });

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"{
        "units": {
            "archer": { "health": 40, "moveSpeed": 1, "weaponRange": 6,
                        "weaponDamage": 7, "weaponCooldown": 0.9 },
            "knight": { "health": 90, "moveSpeed": 2, "weaponRange": 1,
                        "weaponDamage": 15, "weaponCooldown": 1.1 },
            "reserve": { "health": 10, "moveSpeed": 1, "weaponRange": 1,
                         "weaponDamage": 1, "weaponCooldown": 1 }
        },
        "teams": {
            "west": [ { "name": "archer", "x": -12, "y": 3 },
                      { "name": "archer", "x": -12, "y": -3 } ],
            "east": [ { "name": "knight", "x": 10, "y": 0 } ]
        }
    }"#;

    #[test]
    fn test_finished_battle_passes_all_checks() {
        let scenario = Scenario::from_json_str(SCENARIO).unwrap();
        let mut engine = SimulationEngine::new(&scenario);
        let report = engine.run_for(100_000).unwrap();

        let results = validate_battle(&scenario, &engine, &report, 100_000);
        for r in &results {
            assert!(r.passed, "{}: {}", r.name, r.detail);
        }
        assert_eq!(results.len(), 5);
    }

    #[test]
    fn test_tampered_report_is_caught() {
        let scenario = Scenario::from_json_str(SCENARIO).unwrap();
        let mut engine = SimulationEngine::new(&scenario);
        let mut report = engine.run_for(100_000).unwrap();
        report.damage_by_type.remove("reserve");

        let results = validate_battle(&scenario, &engine, &report, 100_000);
        let failed: Vec<_> = results.iter().filter(|r| !r.passed).map(|r| r.name.as_str()).collect();
        assert!(failed.contains(&"report_lists_every_type"));
        assert!(failed.contains(&"deterministic_rerun"));
    }
}
