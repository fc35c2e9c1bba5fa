//! Skirmish Viewer - Bevy-based visualization for a battle
//!
//! The engine is stepped from `FixedUpdate` at 60 Hz; rendering only reads
//! the latest snapshot, so the outcome matches a headless run.
//!
//! Usage:
//!   cargo run -p skirmish-viewer -- data/scenarios/skirmish.json

mod palette;
mod view;

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use bevy::prelude::*;
use bevy::sprite::Anchor;
use clap::Parser;
use skirmish_core::prelude::*;

use palette::team_colors;
use view::{health_fill_size, ViewScale, HEALTH_BAR_SIZE};

const WINDOW_SIZE: f32 = 800.0;
const HALF_WINDOW: f32 = WINDOW_SIZE / 2.0;
const SIM_HZ: f64 = 60.0;

const UNIT_RADIUS: f32 = 10.0;
const HEALTH_BAR_OFFSET: f32 = 14.0;
const LABEL_FONT_SIZE: f32 = 16.0;

#[derive(Parser, Debug)]
#[command(name = "skirmish-viewer")]
#[command(about = "Watch a Skirmish battle play out")]
struct Cli {
    /// Path to the scenario JSON document
    scenario: PathBuf,
}

fn main() -> AppExit {
    let cli = Cli::parse();

    let scenario = match Scenario::from_path(&cli.scenario)
        .with_context(|| format!("loading {}", cli.scenario.display()))
    {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            return AppExit::error();
        }
    };

    let scale = ViewScale::fit(scenario.deployments.iter().map(|d| &d.position), HALF_WINDOW);
    let colors = team_colors(&scenario.teams);
    let engine = SimulationEngine::new(&scenario);
    let frame = LatestFrame(engine.snapshot());

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Skirmish".to_string(),
                resolution: (WINDOW_SIZE, WINDOW_SIZE).into(),
                present_mode: bevy::window::PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::srgb_u8(40, 40, 40)))
        .insert_resource(Time::<Fixed>::from_hz(SIM_HZ))
        .insert_resource(SimWrapper(engine))
        .insert_resource(frame)
        .insert_resource(scale)
        .insert_resource(TeamColors(colors))
        .insert_resource(ReportPrinted(false))
        .add_systems(Startup, setup)
        .add_systems(FixedUpdate, step_simulation)
        .add_systems(
            Update,
            (render_axes, render_units, update_labels, update_health_bars),
        )
        .run()
}

#[derive(Resource)]
struct SimWrapper(SimulationEngine);

/// Unit views as of the last resolved tick
#[derive(Resource)]
struct LatestFrame(Vec<UnitView>);

#[derive(Resource)]
struct TeamColors(HashMap<Team, Color>);

#[derive(Resource)]
struct ReportPrinted(bool);

/// Glyph label for the unit at this roster index. Carries the health bar
/// as children, so both hide together when the unit dies.
#[derive(Component)]
struct UnitLabel(usize);

/// Green part of the health bar for the unit at this roster index
#[derive(Component)]
struct HealthFill(usize);

fn setup(mut commands: Commands, frame: Res<LatestFrame>, scale: Res<ViewScale>) {
    commands.spawn(Camera2d);

    for unit in &frame.0 {
        let at = scale.to_screen(unit.position);
        commands
            .spawn((
                Text2d::new(unit.glyph.to_string()),
                TextFont {
                    font_size: LABEL_FONT_SIZE,
                    ..default()
                },
                TextColor(Color::WHITE),
                Transform::from_xyz(at.x, at.y, 1.0),
                UnitLabel(unit.entity_index),
            ))
            .with_children(|parent| {
                parent.spawn((
                    Sprite {
                        color: Color::srgb_u8(100, 100, 100),
                        custom_size: Some(HEALTH_BAR_SIZE),
                        ..default()
                    },
                    Transform::from_xyz(0.0, HEALTH_BAR_OFFSET, -0.2),
                ));
                parent.spawn((
                    Sprite {
                        color: Color::srgb_u8(0, 200, 0),
                        custom_size: Some(health_fill_size(unit.health_ratio)),
                        anchor: Anchor::CenterLeft,
                        ..default()
                    },
                    Transform::from_xyz(-HEALTH_BAR_SIZE.x / 2.0, HEALTH_BAR_OFFSET, -0.1),
                    HealthFill(unit.entity_index),
                ));
            });
    }

    info!(
        "Viewing {} units on {} teams ({:.2} px per world unit)",
        frame.0.len(),
        team_count(&frame.0),
        scale.pixels_per_unit
    );
}

fn team_count(units: &[UnitView]) -> usize {
    let mut teams: Vec<&Team> = units.iter().map(|u| &u.team).collect();
    teams.sort();
    teams.dedup();
    teams.len()
}

/// One engine tick per fixed step. The report is printed the first time
/// the engine reports termination; later ticks are no-ops.
fn step_simulation(
    mut sim: ResMut<SimWrapper>,
    mut frame: ResMut<LatestFrame>,
    mut printed: ResMut<ReportPrinted>,
) {
    match sim.0.tick() {
        Tick::Resolved(_) => frame.0 = sim.0.snapshot(),
        Tick::Terminated(_) if !printed.0 => {
            frame.0 = sim.0.snapshot();
            if let Some(report) = sim.0.report() {
                println!("\n\n{}\n\n", report);
            }
            printed.0 = true;
        }
        Tick::Terminated(_) => {}
    }
}

fn render_axes(mut gizmos: Gizmos) {
    let color = Color::srgb_u8(80, 80, 80);
    gizmos.line_2d(Vec2::new(-HALF_WINDOW, 0.0), Vec2::new(HALF_WINDOW, 0.0), color);
    gizmos.line_2d(Vec2::new(0.0, -HALF_WINDOW), Vec2::new(0.0, HALF_WINDOW), color);
}

fn render_units(
    mut gizmos: Gizmos,
    frame: Res<LatestFrame>,
    scale: Res<ViewScale>,
    colors: Res<TeamColors>,
) {
    for unit in frame.0.iter().filter(|u| u.alive) {
        let at = scale.to_screen(unit.position);
        let color = colors.0.get(&unit.team).copied().unwrap_or(Color::WHITE);
        gizmos.circle_2d(Isometry2d::from_translation(at), UNIT_RADIUS, color);
    }
}

fn update_labels(
    frame: Res<LatestFrame>,
    scale: Res<ViewScale>,
    mut labels: Query<(&UnitLabel, &mut Transform, &mut Visibility)>,
) {
    if !frame.is_changed() {
        return;
    }
    for (label, mut transform, mut visibility) in labels.iter_mut() {
        let Some(unit) = frame.0.get(label.0) else {
            continue;
        };
        let at = scale.to_screen(unit.position);
        transform.translation = at.extend(1.0);
        *visibility = if unit.alive {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}

fn update_health_bars(frame: Res<LatestFrame>, mut fills: Query<(&HealthFill, &mut Sprite)>) {
    if !frame.is_changed() {
        return;
    }
    for (fill, mut sprite) in fills.iter_mut() {
        if let Some(unit) = frame.0.get(fill.0) {
            sprite.custom_size = Some(health_fill_size(unit.health_ratio));
        }
    }
}
