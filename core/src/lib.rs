#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Cube Serpent engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! presentation layers to react to deterministically. The [`rotation`] module
//! carries the quaternion arithmetic that encodes the snake's heading as a
//! full 3D frame rather than a bare direction vector.

pub mod rotation;

use glam::{IVec3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Cube Serpent.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Rebuilds the world with the provided configuration, resetting play.
    ConfigureWorld {
        /// Dimensions of the playable box measured in whole cells.
        size: WorldSize,
        /// Whether the box wraps around toroidally on every axis.
        wrap: bool,
        /// Control scheme active when play begins.
        mode: ControlMode,
        /// Seed for the deterministic score-point placement stream.
        seed: u64,
    },
    /// Advances the simulation by exactly one logic step.
    Step,
    /// Picks an absolute heading within the current view plane (flat mode).
    SetFlatHeading {
        /// Screen-relative direction chosen by the player.
        lateral: LateralInput,
    },
    /// Pitches the heading into or out of the view plane (flat mode).
    ShiftDepthHeading {
        /// `true` steers away from the viewer, `false` back toward them.
        deeper: bool,
    },
    /// Applies a relative quarter turn in the snake's own frame (free-look).
    TurnFreeLook {
        /// Turn direction relative to the snake's current frame.
        lateral: LateralInput,
    },
    /// Switches between the flat and free-look control schemes.
    ToggleControlMode,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the snake completed a step.
    SnakeAdvanced {
        /// Cell occupied by the new head.
        head: GridPos,
        /// Whether the tail vacated its cell this step.
        moved_tail: bool,
    },
    /// Announces a freshly placed score point.
    ScorePointPlaced {
        /// Cell the score point now occupies.
        cell: GridPos,
    },
    /// Confirms that the snake consumed the score point.
    PointScored {
        /// Total score after the consumption.
        score: u32,
    },
    /// Announces a terminal (or initial) game-state transition.
    GameStateChanged {
        /// State the game entered.
        state: GameState,
    },
    /// Announces that the active control scheme flipped.
    ControlModeChanged {
        /// Scheme that became active.
        mode: ControlMode,
    },
    /// Reports that a proposed heading was refused by the snake.
    ///
    /// Refusal is not an error: reversals and parallel re-picks are simply
    /// ignored so the snake can never fold back through itself on a turn.
    HeadingRejected {
        /// Rounded heading the snake kept.
        current: IVec3,
        /// Rounded heading that was refused.
        proposed: IVec3,
    },
}

/// Describes which phase of play the game occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// The snake is alive and stepping.
    Playing,
    /// Every cell is occupied; there is no room left to score.
    Won,
    /// The snake collided with itself.
    Lost,
}

impl GameState {
    /// Reports whether the state permits further simulation steps.
    #[must_use]
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }
}

/// Control scheme translating player input into headings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlMode {
    /// Orthographic scheme: lateral keys pick absolute view-plane headings.
    Flat,
    /// First-person scheme: lateral keys turn relative to the snake's frame.
    FreeLook,
}

impl ControlMode {
    /// Returns the opposite control scheme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Flat => Self::FreeLook,
            Self::FreeLook => Self::Flat,
        }
    }
}

/// Screen-relative directions selectable with the four lateral keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LateralInput {
    /// Toward the top of the view plane.
    Up,
    /// Toward the right edge of the view plane.
    Right,
    /// Toward the bottom of the view plane.
    Down,
    /// Toward the left edge of the view plane.
    Left,
}

impl LateralInput {
    /// Number of quarter turns separating the direction from [`Self::Up`].
    #[must_use]
    pub const fn quarter_turns(self) -> u32 {
        match self {
            Self::Up => 0,
            Self::Right => 1,
            Self::Down => 2,
            Self::Left => 3,
        }
    }
}

/// Identified key presses the steering system understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyInput {
    /// One of the four lateral direction keys.
    Lateral(LateralInput),
    /// The depth key steering away from the viewer (flat mode only).
    DepthAway,
    /// The depth key steering back toward the viewer (flat mode only).
    DepthToward,
    /// The control-scheme toggle key.
    ToggleMode,
}

/// Location of a single grid cell within the world box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    x: i32,
    y: i32,
    z: i32,
}

impl GridPos {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Cell index along the x axis.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Cell index along the y axis.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Cell index along the z axis.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Returns the cell displaced by the provided integer offset.
    #[must_use]
    pub const fn offset(self, delta: IVec3) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
            z: self.z + delta.z,
        }
    }

    /// Folds the cell back into the box using Euclidean modulo per axis.
    #[must_use]
    pub fn wrapped(self, size: WorldSize) -> Self {
        Self {
            x: self.x.rem_euclid(size.width() as i32),
            y: self.y.rem_euclid(size.height() as i32),
            z: self.z.rem_euclid(size.depth() as i32),
        }
    }

    /// Converts the cell into a floating-point vector for rotation math.
    #[must_use]
    pub fn as_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

/// Dimensions of the playable box measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldSize {
    width: u32,
    height: u32,
    depth: u32,
}

impl WorldSize {
    /// Creates a new box description.
    #[must_use]
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Extent along the x axis.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Extent along the y axis.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Extent along the z axis.
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Total number of cells contained in the box.
    #[must_use]
    pub const fn cell_count(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.depth as u64
    }

    /// Cell at the integer center of the box, where the snake spawns.
    #[must_use]
    pub const fn center(&self) -> GridPos {
        GridPos::new(
            (self.width / 2) as i32,
            (self.height / 2) as i32,
            (self.depth / 2) as i32,
        )
    }

    /// Reports whether the cell lies inside the box bounds.
    #[must_use]
    pub const fn contains(&self, cell: GridPos) -> bool {
        cell.x() >= 0
            && cell.y() >= 0
            && cell.z() >= 0
            && (cell.x() as u32) < self.width
            && (cell.y() as u32) < self.height
            && (cell.z() as u32) < self.depth
    }
}

/// Immutable representation of a single snake segment used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentSnapshot {
    /// Cell occupied by the segment.
    pub position: GridPos,
    /// Snake orientation at the moment the segment was laid down.
    pub orientation: Quat,
}

/// Read-only snapshot of the whole segment chain, ordered tail first.
#[derive(Clone, Debug, Default)]
pub struct SnakeView {
    segments: Vec<SegmentSnapshot>,
}

impl SnakeView {
    /// Creates a view from tail-to-head ordered snapshots.
    #[must_use]
    pub fn from_snapshots(segments: Vec<SegmentSnapshot>) -> Self {
        Self { segments }
    }

    /// Iterator over the segments from tail to head.
    pub fn iter(&self) -> impl Iterator<Item = &SegmentSnapshot> {
        self.segments.iter()
    }

    /// Number of segments composing the snake.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Reports whether the view holds no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment currently acting as the head, if any.
    #[must_use]
    pub fn head(&self) -> Option<&SegmentSnapshot> {
        self.segments.last()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<SegmentSnapshot> {
        self.segments
    }
}

#[cfg(test)]
mod tests {
    use super::{ControlMode, GameState, GridPos, KeyInput, LateralInput, WorldSize};
    use glam::IVec3;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn grid_pos_round_trips_through_bincode() {
        assert_round_trip(&GridPos::new(3, -1, 12));
    }

    #[test]
    fn world_size_round_trips_through_bincode() {
        assert_round_trip(&WorldSize::new(13, 13, 13));
    }

    #[test]
    fn control_mode_round_trips_through_bincode() {
        assert_round_trip(&ControlMode::Flat);
        assert_round_trip(&ControlMode::FreeLook);
    }

    #[test]
    fn key_input_round_trips_through_bincode() {
        assert_round_trip(&KeyInput::Lateral(LateralInput::Left));
        assert_round_trip(&KeyInput::DepthAway);
        assert_round_trip(&KeyInput::ToggleMode);
    }

    #[test]
    fn wrapping_folds_every_axis_into_the_box() {
        let size = WorldSize::new(5, 5, 5);
        assert_eq!(
            GridPos::new(5, -1, 4).wrapped(size),
            GridPos::new(0, 4, 4)
        );
        assert_eq!(GridPos::new(2, 2, 2).wrapped(size), GridPos::new(2, 2, 2));
    }

    #[test]
    fn offset_applies_componentwise() {
        let moved = GridPos::new(1, 2, 3).offset(IVec3::new(0, 1, -1));
        assert_eq!(moved, GridPos::new(1, 3, 2));
    }

    #[test]
    fn center_matches_integer_halving() {
        assert_eq!(WorldSize::new(13, 13, 13).center(), GridPos::new(6, 6, 6));
        assert_eq!(WorldSize::new(4, 6, 8).center(), GridPos::new(2, 3, 4));
    }

    #[test]
    fn contains_rejects_cells_outside_the_box() {
        let size = WorldSize::new(3, 3, 3);
        assert!(size.contains(GridPos::new(0, 0, 0)));
        assert!(size.contains(GridPos::new(2, 2, 2)));
        assert!(!size.contains(GridPos::new(3, 0, 0)));
        assert!(!size.contains(GridPos::new(0, -1, 0)));
    }

    #[test]
    fn toggled_flips_between_schemes() {
        assert_eq!(ControlMode::Flat.toggled(), ControlMode::FreeLook);
        assert_eq!(ControlMode::FreeLook.toggled(), ControlMode::Flat);
    }

    #[test]
    fn quarter_turns_follow_clockwise_key_order() {
        assert_eq!(LateralInput::Up.quarter_turns(), 0);
        assert_eq!(LateralInput::Right.quarter_turns(), 1);
        assert_eq!(LateralInput::Down.quarter_turns(), 2);
        assert_eq!(LateralInput::Left.quarter_turns(), 3);
    }

    #[test]
    fn terminal_states_halt_play() {
        assert!(GameState::Playing.is_playing());
        assert!(!GameState::Won.is_playing());
        assert!(!GameState::Lost.is_playing());
    }
}
