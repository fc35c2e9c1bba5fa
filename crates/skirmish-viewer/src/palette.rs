//! Team colours

use std::collections::HashMap;

use bevy::prelude::*;
use skirmish_core::prelude::Team;

/// Evenly spaced hues, one per team, assigned in name order so the same
/// scenario always paints the same way.
pub fn team_colors(teams: &[Team]) -> HashMap<Team, Color> {
    let mut sorted: Vec<&Team> = teams.iter().collect();
    sorted.sort();
    sorted.dedup();

    let count = sorted.len().max(1) as f32;
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, team)| (team.clone(), Color::hsv(i as f32 / count * 360.0, 1.0, 0.5)))
        .collect()
}
