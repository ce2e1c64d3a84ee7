use cube_serpent_core::{
    rotation::heading_cell, Command, ControlMode, Event, GameState, GridPos, KeyInput,
    LateralInput, WorldSize,
};
use cube_serpent_system_steering::{KeyLatch, Steering};
use cube_serpent_world::{self as world, query, World};
use glam::IVec3;

fn configure(target: &mut World, size: WorldSize, mode: ControlMode, seed: u64) {
    let mut events = Vec::new();
    world::apply(
        target,
        Command::ConfigureWorld {
            size,
            wrap: true,
            mode,
            seed,
        },
        &mut events,
    );
}

/// One logic tick: drain the latch, translate, apply, then step.
fn tick(target: &mut World, steering: &Steering, latch: &mut KeyLatch) -> (Vec<Event>, bool) {
    let mut commands = Vec::new();
    let mut rebuild = false;
    if let Some(key) = latch.take() {
        rebuild = steering.handle(
            key,
            query::game_state(target),
            query::control_mode(target),
            &mut commands,
        );
    }
    commands.push(Command::Step);

    let mut events = Vec::new();
    for command in commands {
        world::apply(target, command, &mut events);
    }
    (events, rebuild)
}

#[test]
fn key_driven_flat_and_depth_turns_follow_the_view_plane() {
    let mut target = World::new();
    let steering = Steering;
    let mut latch = KeyLatch::default();
    configure(&mut target, WorldSize::new(5, 5, 5), ControlMode::Flat, 21);

    latch.press(KeyInput::Lateral(LateralInput::Right));
    let (_, rebuild) = tick(&mut target, &steering, &mut latch);
    assert!(!rebuild);
    assert_eq!(
        query::snake_view(&target).head().map(|s| s.position),
        Some(GridPos::new(3, 2, 2))
    );

    latch.press(KeyInput::DepthAway);
    let _ = tick(&mut target, &steering, &mut latch);
    let head = query::snake_view(&target)
        .head()
        .map(|s| s.position)
        .expect("snake has a head");
    // The depth key sends the run along the z axis.
    assert_eq!(head.x(), 3);
    assert_eq!(head.y(), 2);
    assert_ne!(head.z(), 2);
    assert_eq!(
        heading_cell(query::snake_orientation(&target)),
        IVec3::new(0, 0, -1)
    );
}

#[test]
fn mode_toggle_rebuilds_camera_and_keeps_the_snake() {
    let mut target = World::new();
    let steering = Steering;
    let mut latch = KeyLatch::default();
    configure(&mut target, WorldSize::new(7, 7, 7), ControlMode::Flat, 21);

    let (_, rebuild) = tick(&mut target, &steering, &mut latch);
    let head_before = query::snake_view(&target).head().map(|s| s.position);
    assert!(!rebuild);

    latch.press(KeyInput::ToggleMode);
    let (events, rebuild) = tick(&mut target, &steering, &mut latch);

    assert!(rebuild);
    assert_eq!(query::control_mode(&target), ControlMode::FreeLook);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::ControlModeChanged {
            mode: ControlMode::FreeLook
        }
    )));
    // The toggle itself does not teleport the snake; only the step moves it.
    let head_after = query::snake_view(&target).head().map(|s| s.position);
    assert_ne!(head_before, head_after);
    assert_eq!(query::snake_view(&target).len(), 2);
}

#[test]
fn latched_input_collapses_to_the_last_key_within_a_tick() {
    let mut target = World::new();
    let steering = Steering;
    let mut latch = KeyLatch::default();
    configure(&mut target, WorldSize::new(7, 7, 7), ControlMode::Flat, 21);

    // Both a lateral pick and a depth shift arrive before the tick fires;
    // only the depth shift may reach the world.
    latch.press(KeyInput::Lateral(LateralInput::Right));
    latch.press(KeyInput::DepthAway);
    let _ = tick(&mut target, &steering, &mut latch);

    assert_eq!(
        heading_cell(query::snake_orientation(&target)),
        IVec3::new(0, 0, -1)
    );
}

#[test]
fn replaying_a_script_reproduces_the_event_transcript() {
    let script = [
        Some(KeyInput::Lateral(LateralInput::Right)),
        None,
        Some(KeyInput::DepthAway),
        None,
        Some(KeyInput::ToggleMode),
        Some(KeyInput::Lateral(LateralInput::Up)),
        None,
    ];

    let run = |seed: u64| -> Vec<Vec<Event>> {
        let mut target = World::new();
        let steering = Steering;
        let mut latch = KeyLatch::default();
        configure(&mut target, WorldSize::new(9, 9, 9), ControlMode::Flat, seed);

        script
            .iter()
            .map(|entry| {
                if let Some(key) = entry {
                    latch.press(*key);
                }
                tick(&mut target, &steering, &mut latch).0
            })
            .collect()
    };

    assert_eq!(run(77), run(77));
    // A different placement stream still yields a transcript, just not an
    // identical one; the snake path itself is input-driven.
    let other = run(78);
    assert_eq!(other.len(), script.len());
}

#[test]
fn input_stops_mattering_once_the_game_is_over() {
    let mut target = World::new();
    let steering = Steering;
    let mut latch = KeyLatch::default();
    // A single-cell box is immediately won: there is nowhere to score.
    configure(&mut target, WorldSize::new(1, 1, 1), ControlMode::Flat, 21);

    let (events, _) = tick(&mut target, &steering, &mut latch);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::GameStateChanged {
            state: GameState::Won
        }
    )));

    latch.press(KeyInput::Lateral(LateralInput::Left));
    let (events, rebuild) = tick(&mut target, &steering, &mut latch);
    assert!(events.is_empty());
    assert!(!rebuild);
}
