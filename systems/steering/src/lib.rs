#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure steering system that turns identified key presses into commands.
//!
//! The system owns no world state. Adapters feed it the latest latched key
//! together with the game state and control mode read from the world, and it
//! responds with a command batch plus a flag telling the driver whether the
//! camera rig must be rebuilt (the mode toggle is the only input with that
//! side effect).

use cube_serpent_core::{Command, ControlMode, GameState, KeyInput};

/// Single-slot buffer collapsing rapid input to the latest key press.
///
/// Key events arrive asynchronously between logic ticks; only the most
/// recent one is kept, so multiple presses within one tick window resolve to
/// the last key by design.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyLatch {
    pressed: Option<KeyInput>,
}

impl KeyLatch {
    /// Records a key press, replacing any earlier press this tick window.
    pub fn press(&mut self, key: KeyInput) {
        self.pressed = Some(key);
    }

    /// Takes the latched key, leaving the latch empty for the next window.
    pub fn take(&mut self) -> Option<KeyInput> {
        self.pressed.take()
    }
}

/// Pure system translating key identity into heading commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct Steering;

impl Steering {
    /// Emits the commands a key press implies under the given control mode.
    ///
    /// Returns `true` when the driver must rebuild its camera rig. Input
    /// after the game has ended is ignored entirely.
    pub fn handle(
        &self,
        key: KeyInput,
        game_state: GameState,
        control_mode: ControlMode,
        out: &mut Vec<Command>,
    ) -> bool {
        if !game_state.is_playing() {
            return false;
        }

        match key {
            KeyInput::ToggleMode => {
                out.push(Command::ToggleControlMode);
                true
            }
            KeyInput::Lateral(lateral) => {
                out.push(match control_mode {
                    ControlMode::Flat => Command::SetFlatHeading { lateral },
                    ControlMode::FreeLook => Command::TurnFreeLook { lateral },
                });
                false
            }
            KeyInput::DepthAway => {
                if control_mode == ControlMode::Flat {
                    out.push(Command::ShiftDepthHeading { deeper: true });
                }
                false
            }
            KeyInput::DepthToward => {
                if control_mode == ControlMode::Flat {
                    out.push(Command::ShiftDepthHeading { deeper: false });
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyLatch, Steering};
    use cube_serpent_core::{Command, ControlMode, GameState, KeyInput, LateralInput};

    #[test]
    fn latch_keeps_only_the_latest_press() {
        let mut latch = KeyLatch::default();
        latch.press(KeyInput::Lateral(LateralInput::Up));
        latch.press(KeyInput::DepthAway);

        assert_eq!(latch.take(), Some(KeyInput::DepthAway));
        assert_eq!(latch.take(), None);
    }

    #[test]
    fn lateral_keys_route_to_the_active_scheme() {
        let steering = Steering;
        let key = KeyInput::Lateral(LateralInput::Right);

        let mut commands = Vec::new();
        let rebuild = steering.handle(key, GameState::Playing, ControlMode::Flat, &mut commands);
        assert!(!rebuild);
        assert_eq!(
            commands,
            vec![Command::SetFlatHeading {
                lateral: LateralInput::Right
            }]
        );

        let mut commands = Vec::new();
        let rebuild =
            steering.handle(key, GameState::Playing, ControlMode::FreeLook, &mut commands);
        assert!(!rebuild);
        assert_eq!(
            commands,
            vec![Command::TurnFreeLook {
                lateral: LateralInput::Right
            }]
        );
    }

    #[test]
    fn depth_keys_only_apply_in_flat_mode() {
        let steering = Steering;

        let mut commands = Vec::new();
        let _ = steering.handle(
            KeyInput::DepthAway,
            GameState::Playing,
            ControlMode::Flat,
            &mut commands,
        );
        assert_eq!(commands, vec![Command::ShiftDepthHeading { deeper: true }]);

        let mut commands = Vec::new();
        let _ = steering.handle(
            KeyInput::DepthToward,
            GameState::Playing,
            ControlMode::FreeLook,
            &mut commands,
        );
        assert!(commands.is_empty());
    }

    #[test]
    fn toggle_requests_a_camera_rebuild() {
        let steering = Steering;
        let mut commands = Vec::new();
        let rebuild = steering.handle(
            KeyInput::ToggleMode,
            GameState::Playing,
            ControlMode::Flat,
            &mut commands,
        );

        assert!(rebuild);
        assert_eq!(commands, vec![Command::ToggleControlMode]);
    }

    #[test]
    fn input_after_game_over_is_ignored() {
        let steering = Steering;
        for state in [GameState::Lost, GameState::Won] {
            let mut commands = Vec::new();
            let rebuild = steering.handle(
                KeyInput::Lateral(LateralInput::Left),
                state,
                ControlMode::Flat,
                &mut commands,
            );
            assert!(!rebuild);
            assert!(commands.is_empty());
        }
    }
}
