#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives deterministic Cube Serpent sessions.
//!
//! The binary runs the fixed-interval logic loop headlessly: key script
//! tokens are latched one tick window at a time (last press wins), the
//! steering system translates them into commands, the world steps, and the
//! resulting event transcript goes to stdout. Sessions are reproducible
//! from their seed and script, and can be shared as one-line scenario
//! codes.

mod scenario;

use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cube_serpent_core::{
    Command, ControlMode, Event, GameState, GridPos, KeyInput, LateralInput, WorldSize,
};
use cube_serpent_rendering::{
    resolve_segments, CameraRig, PresentationBackend, Scene, SegmentPiece,
};
use cube_serpent_system_steering::{KeyLatch, Steering};
use cube_serpent_world::{self as world, query, World};
use glam::IVec3;

use crate::scenario::Scenario;

/// Command-line options for a Cube Serpent session.
#[derive(Debug, Parser)]
#[command(name = "cube-serpent", about = "Deterministic 3D snake sessions")]
struct Args {
    /// World width in cells.
    #[arg(long, default_value_t = 13)]
    width: u32,
    /// World height in cells.
    #[arg(long, default_value_t = 13)]
    height: u32,
    /// World depth in cells.
    #[arg(long, default_value_t = 13)]
    depth: u32,
    /// Logic tick interval in milliseconds.
    #[arg(long, default_value_t = 250)]
    tick_ms: u64,
    /// Start in the free-look control scheme instead of flat.
    #[arg(long)]
    free_look: bool,
    /// Disable toroidal wrap-around.
    #[arg(long)]
    no_wrap: bool,
    /// Seed for the score-point placement stream.
    #[arg(long, default_value_t = 0x00c0_ffee)]
    seed: u64,
    /// Comma-separated key script, one token per tick.
    ///
    /// Tokens: w/a/s/d or up/left/down/right, q/e for depth, r to toggle
    /// the scheme, '.' for an idle tick. '+' joins presses landing in the
    /// same tick window, of which only the last one counts.
    #[arg(long)]
    script: Option<String>,
    /// Maximum number of logic ticks to run.
    #[arg(long, default_value_t = 32)]
    ticks: u32,
    /// Pace ticks on the wall clock, honoring camera swing delays.
    #[arg(long)]
    realtime: bool,
    /// Replay a shared scenario code instead of the individual flags.
    #[arg(long)]
    scenario: Option<String>,
    /// Print the scenario code for this configuration and exit.
    #[arg(long)]
    emit_scenario: bool,
}

/// Entry point for the Cube Serpent command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();

    let scenario = match &args.scenario {
        Some(code) => Scenario::decode(code).context("failed to decode scenario code")?,
        None => Scenario {
            size: WorldSize::new(args.width, args.height, args.depth),
            seed: args.seed,
            free_look: args.free_look,
            wrap: !args.no_wrap,
            tick_ms: args.tick_ms,
            script: args
                .script
                .as_deref()
                .map(|script| script.split(',').map(str::to_owned).collect())
                .unwrap_or_default(),
        },
    };

    if scenario.size.cell_count() == 0 {
        bail!("world dimensions must all be positive");
    }

    if args.emit_scenario {
        println!("{}", scenario.encode());
        return Ok(());
    }

    run_session(&scenario, args.ticks, args.realtime)
}

fn run_session(scenario: &Scenario, ticks: u32, realtime: bool) -> Result<()> {
    let mode = if scenario.free_look {
        ControlMode::FreeLook
    } else {
        ControlMode::Flat
    };

    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureWorld {
            size: scenario.size,
            wrap: scenario.wrap,
            mode,
            seed: scenario.seed,
        },
        &mut events,
    );

    println!("{}", query::welcome_banner(&world));

    let steering = Steering;
    let mut latch = KeyLatch::default();
    let mut rig = camera_for(&world);
    let mut presenter = TranscriptPresenter::default();
    let mut script = scenario.script.iter();
    let tick_interval = Duration::from_millis(scenario.tick_ms);
    let dt = scenario.tick_ms as f32 / 1000.0;

    for _ in 0..ticks {
        if let Some(token) = script.next() {
            for key in parse_token(token).with_context(|| format!("bad script token '{token}'"))? {
                latch.press(key);
            }
        }

        let mut commands = Vec::new();
        let mut rebuild = false;
        if let Some(key) = latch.take() {
            rebuild = steering.handle(
                key,
                query::game_state(&world),
                query::control_mode(&world),
                &mut commands,
            );
        }
        commands.push(Command::Step);

        events.clear();
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }

        if rebuild {
            rig = camera_for(&world);
        }
        let delay = rig.sync(
            query::snake_orientation(&world),
            query::view_orientation(&world),
            head_of(&world),
        );

        let scene = Scene {
            segments: resolve_segments(&query::snake_view(&world)),
            score_point: query::score_point(&world),
            camera: rig.advance(dt),
            state: query::game_state(&world),
            score: query::score(&world),
        };
        presenter.frame(&scene)?;
        for event in &events {
            println!("  {}", describe_event(event));
        }

        if !query::game_state(&world).is_playing() {
            break;
        }

        if realtime {
            thread::sleep(tick_interval + delay);
        }
    }

    let state = match query::game_state(&world) {
        GameState::Playing => "still playing",
        GameState::Won => "won",
        GameState::Lost => "lost",
    };
    println!("session over: {state}, score {}", query::score(&world));
    Ok(())
}

fn camera_for(world: &World) -> CameraRig {
    CameraRig::for_mode(
        query::control_mode(world),
        query::world_size(world),
        query::snake_orientation(world),
        query::view_orientation(world),
        head_of(world),
    )
}

fn head_of(world: &World) -> GridPos {
    query::snake_view(world)
        .head()
        .map(|segment| segment.position)
        .unwrap_or(GridPos::new(0, 0, 0))
}

/// Parses one script token into the key presses of a tick window.
fn parse_token(token: &str) -> Result<Vec<KeyInput>> {
    let mut keys = Vec::new();
    for name in token.split('+') {
        match name.trim().to_ascii_lowercase().as_str() {
            "." | "" => {}
            "w" | "up" => keys.push(KeyInput::Lateral(LateralInput::Up)),
            "d" | "right" => keys.push(KeyInput::Lateral(LateralInput::Right)),
            "s" | "down" => keys.push(KeyInput::Lateral(LateralInput::Down)),
            "a" | "left" => keys.push(KeyInput::Lateral(LateralInput::Left)),
            "e" => keys.push(KeyInput::DepthAway),
            "q" => keys.push(KeyInput::DepthToward),
            "r" => keys.push(KeyInput::ToggleMode),
            other => bail!("unknown key '{other}'"),
        }
    }
    Ok(keys)
}

fn describe_event(event: &Event) -> String {
    match event {
        Event::SnakeAdvanced { head, moved_tail } => {
            let tail = if *moved_tail { "tail moved" } else { "growing" };
            format!("head -> {}, {tail}", cell(*head))
        }
        Event::ScorePointPlaced { cell: at } => format!("score point at {}", cell(*at)),
        Event::PointScored { score } => format!("scored! total {score}"),
        Event::GameStateChanged { state } => format!("game state: {state:?}"),
        Event::ControlModeChanged { mode } => format!("control mode: {mode:?}"),
        Event::HeadingRejected { current, proposed } => format!(
            "heading {} refused while travelling {}",
            axis_label(*proposed),
            axis_label(*current)
        ),
    }
}

fn cell(position: GridPos) -> String {
    format!("({}, {}, {})", position.x(), position.y(), position.z())
}

/// Human label for a signed unit axis heading.
fn axis_label(axis: IVec3) -> &'static str {
    match (axis.x, axis.y, axis.z) {
        (1, 0, 0) => "+x",
        (-1, 0, 0) => "-x",
        (0, 1, 0) => "+y",
        (0, -1, 0) => "-y",
        (0, 0, 1) => "+z",
        (0, 0, -1) => "-z",
        _ => "off-axis",
    }
}

/// Text backend that prints one transcript line per frame.
#[derive(Debug, Default)]
struct TranscriptPresenter {
    tick: u32,
}

impl PresentationBackend for TranscriptPresenter {
    fn frame(&mut self, scene: &Scene) -> Result<()> {
        self.tick += 1;
        let head = scene
            .segments
            .iter()
            .find(|segment| segment.piece == SegmentPiece::Head)
            .map(|segment| cell(segment.position))
            .unwrap_or_else(|| "(gone)".to_owned());
        let marker = if scene.state.is_playing() {
            ""
        } else {
            " -- game over"
        };
        println!(
            "tick {:>3}: head {head}, {} segments, score {}, camera at ({:.1}, {:.1}, {:.1}){marker}",
            self.tick,
            scene.segments.len(),
            scene.score,
            scene.camera.position.x,
            scene.camera.position.y,
            scene.camera.position.z,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{axis_label, parse_token};
    use cube_serpent_core::{KeyInput, LateralInput};
    use glam::IVec3;

    #[test]
    fn tokens_map_to_identified_keys() {
        assert_eq!(
            parse_token("w").expect("parses"),
            vec![KeyInput::Lateral(LateralInput::Up)]
        );
        assert_eq!(
            parse_token("LEFT").expect("parses"),
            vec![KeyInput::Lateral(LateralInput::Left)]
        );
        assert_eq!(parse_token("e").expect("parses"), vec![KeyInput::DepthAway]);
        assert_eq!(parse_token(".").expect("parses"), Vec::new());
    }

    #[test]
    fn joined_tokens_press_in_order() {
        assert_eq!(
            parse_token("d+e").expect("parses"),
            vec![
                KeyInput::Lateral(LateralInput::Right),
                KeyInput::DepthAway
            ]
        );
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        assert!(parse_token("x").is_err());
    }

    #[test]
    fn axis_labels_cover_all_six_directions() {
        assert_eq!(axis_label(IVec3::new(0, 0, -1)), "-z");
        assert_eq!(axis_label(IVec3::new(0, -1, 0)), "-y");
        assert_eq!(axis_label(IVec3::new(1, 0, 0)), "+x");
    }
}
