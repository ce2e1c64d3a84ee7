#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared presentation contracts for Cube Serpent adapters.
//!
//! Backends receive declarative [`Scene`] values: every snake segment is
//! already resolved to the model piece it should show, the camera pose is
//! tweened, and the score point carries its bobbing offset. Nothing in this
//! crate talks to a window system; concrete backends implement
//! [`PresentationBackend`] on top of whatever renderer they use.

use anyhow::Result as AnyResult;
use cube_serpent_core::{
    rotation::{normalize_signed_zero, rotate_basis, round_vec3, FORWARD},
    ControlMode, GameState, GridPos, SnakeView, WorldSize,
};
use glam::{Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, PI};
use std::time::Duration;

/// Seconds a camera rotation tween takes to settle.
const TWEEN_SECONDS: f32 = 0.5;
/// Suggested logic-tick delay while the orbiting flat camera swings.
const FLAT_SWING_DELAY: Duration = Duration::from_millis(400);
/// Suggested logic-tick delay while the free-look camera re-aims.
const FREE_LOOK_SWING_DELAY: Duration = Duration::from_millis(200);
/// Margin multiplier on the flat camera's orbit distance.
const ORBIT_MARGIN: f32 = 1.1;
/// Offset from the head cell to the free-look eye point, along camera z.
const EYE_SETBACK: f32 = -0.42;
/// Full cycles per second of the score-point bobbing motion.
const BOB_SPEED: f32 = 0.5;
/// Peak displacement of the score-point bobbing motion, in cells.
const BOB_AMPLITUDE: f32 = 10.0 / 240.0;

/// Sink that concrete rendering backends implement.
pub trait PresentationBackend {
    /// Presents one frame built from the provided scene.
    fn frame(&mut self, scene: &Scene) -> AnyResult<()>;
}

/// Declarative description of everything a backend needs to draw.
#[derive(Clone, Debug)]
pub struct Scene {
    /// Snake segments with resolved model pieces, ordered tail first.
    pub segments: Vec<SceneSegment>,
    /// Cell holding the score point, when one is placed.
    pub score_point: Option<GridPos>,
    /// Camera pose for this frame.
    pub camera: CameraPose,
    /// Phase of play, for game-over tinting.
    pub state: GameState,
    /// Score to present.
    pub score: u32,
}

/// A single snake segment resolved for drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneSegment {
    /// Cell the segment occupies.
    pub position: GridPos,
    /// Orientation applied to the segment's model.
    pub orientation: Quat,
    /// Model piece selected for the segment.
    pub piece: SegmentPiece,
}

/// Model pieces a segment can resolve to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentPiece {
    /// Leading segment.
    Head,
    /// Trailing segment.
    Tail,
    /// Straight run between two segments with the same travel axis.
    Body,
    /// Bend that climbs out of the segment's travel plane.
    BendUp,
    /// Bend that dives below the segment's travel plane.
    BendDown,
    /// Bend within the travel plane.
    BendFlat {
        /// Whether the piece is mirrored across its local x axis.
        mirrored: bool,
    },
}

/// Selects the piece for a segment from its own orientation and the
/// orientation of the segment laid down after it.
///
/// The turn between the two orientations is re-based into the older
/// segment's own frame; the rounded image of the forward vector then tells
/// the bend apart: still forward means no bend, a z component means the
/// turn left the travel plane, anything else is an in-plane bend whose x
/// sign picks the mirrored variant. Both inputs are scrubbed of negative
/// zeros first so component comparisons cannot be defeated by sign bits.
#[must_use]
pub fn classify_bend(newer: Quat, older: Quat) -> SegmentPiece {
    let newer = normalize_signed_zero(newer);
    let older = normalize_signed_zero(older);

    let turn = newer * older.inverse();
    let local = rotate_basis(newer.inverse(), turn);
    let dir = round_vec3(local * FORWARD);

    if dir.y != 0 {
        SegmentPiece::Body
    } else if dir.z > 0 {
        SegmentPiece::BendUp
    } else if dir.z < 0 {
        SegmentPiece::BendDown
    } else {
        SegmentPiece::BendFlat {
            mirrored: dir.x < 0,
        }
    }
}

/// Resolves the whole segment chain into drawable pieces, tail first.
///
/// The tail borrows the orientation of the segment above it so its model
/// points along the chain; every interior segment is classified against its
/// newer neighbour; the head keeps its own orientation.
#[must_use]
pub fn resolve_segments(view: &SnakeView) -> Vec<SceneSegment> {
    let snapshots = view.iter().copied().collect::<Vec<_>>();
    let count = snapshots.len();

    snapshots
        .iter()
        .enumerate()
        .map(|(index, snapshot)| {
            if index + 1 == count {
                SceneSegment {
                    position: snapshot.position,
                    orientation: snapshot.orientation,
                    piece: SegmentPiece::Head,
                }
            } else if index == 0 {
                SceneSegment {
                    position: snapshot.position,
                    orientation: snapshots[1].orientation,
                    piece: SegmentPiece::Tail,
                }
            } else {
                SceneSegment {
                    position: snapshot.position,
                    orientation: snapshot.orientation,
                    piece: classify_bend(snapshots[index + 1].orientation, snapshot.orientation),
                }
            }
        })
        .collect()
}

/// Camera placement handed to backends each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    /// Eye position in world units.
    pub position: Vec3,
    /// Camera orientation.
    pub orientation: Quat,
}

/// Camera rig matching the active control scheme.
#[derive(Clone, Debug)]
pub enum CameraRig {
    /// Orbiting orthographic rig used by the flat scheme.
    Flat(FlatCamera),
    /// Head-mounted rig used by the free-look scheme.
    FreeLook(FreeLookCamera),
}

impl CameraRig {
    /// Builds the rig matching the control mode from current game state.
    #[must_use]
    pub fn for_mode(
        mode: ControlMode,
        size: WorldSize,
        snake_orientation: Quat,
        view_orientation: Quat,
        head: GridPos,
    ) -> Self {
        match mode {
            ControlMode::Flat => Self::Flat(FlatCamera::new(size, view_orientation)),
            ControlMode::FreeLook => Self::FreeLook(FreeLookCamera::new(snake_orientation, head)),
        }
    }

    /// Reconciles the rig with fresh game state after a logic tick.
    ///
    /// Returns the delay the driver should leave before the next logic tick
    /// so an orientation swing can play out; zero when nothing changed. The
    /// core never reads the wall clock; honoring the delay is entirely the
    /// driver's business.
    pub fn sync(&mut self, snake_orientation: Quat, view_orientation: Quat, head: GridPos) -> Duration {
        match self {
            Self::Flat(camera) => camera.sync(view_orientation),
            Self::FreeLook(camera) => camera.sync(snake_orientation, head),
        }
    }

    /// Advances the tween and produces the pose for the next frame.
    pub fn advance(&mut self, dt: f32) -> CameraPose {
        match self {
            Self::Flat(camera) => camera.advance(dt),
            Self::FreeLook(camera) => camera.advance(dt),
        }
    }
}

/// Orthographic rig orbiting the world center.
#[derive(Clone, Debug)]
pub struct FlatCamera {
    center: Vec3,
    distance: f32,
    tween: RotationTween,
}

impl FlatCamera {
    fn new(size: WorldSize, view_orientation: Quat) -> Self {
        let extent = Vec3::new(
            size.width() as f32,
            size.height() as f32,
            size.depth() as f32,
        );
        Self {
            center: extent / 2.0,
            distance: extent.length() * ORBIT_MARGIN,
            tween: RotationTween::settled(view_orientation),
        }
    }

    fn sync(&mut self, view_orientation: Quat) -> Duration {
        if quats_differ(self.tween.target, view_orientation) {
            self.tween.retarget(view_orientation);
            FLAT_SWING_DELAY
        } else {
            Duration::ZERO
        }
    }

    fn advance(&mut self, dt: f32) -> CameraPose {
        let orientation = self.tween.advance(dt);
        CameraPose {
            position: self.center + orientation * Vec3::new(0.0, 0.0, self.distance),
            orientation,
        }
    }
}

/// First-person rig hanging just behind the snake's head.
#[derive(Clone, Debug)]
pub struct FreeLookCamera {
    head: GridPos,
    last_orientation: Quat,
    tween: RotationTween,
}

impl FreeLookCamera {
    fn new(snake_orientation: Quat, head: GridPos) -> Self {
        Self {
            head,
            last_orientation: snake_orientation,
            tween: RotationTween::settled(eye_rotation(snake_orientation)),
        }
    }

    fn sync(&mut self, snake_orientation: Quat, head: GridPos) -> Duration {
        self.head = head;
        if quats_differ(self.last_orientation, snake_orientation) {
            self.last_orientation = snake_orientation;
            self.tween.retarget(eye_rotation(snake_orientation));
            FREE_LOOK_SWING_DELAY
        } else {
            Duration::ZERO
        }
    }

    fn advance(&mut self, dt: f32) -> CameraPose {
        let orientation = self.tween.advance(dt);
        let position = self.head.as_vec3()
            + Vec3::splat(0.5)
            + orientation * Vec3::new(0.0, 0.0, EYE_SETBACK);
        CameraPose {
            position,
            orientation,
        }
    }
}

/// Rotation carrying the snake orientation onto the eye direction.
fn eye_rotation(snake_orientation: Quat) -> Quat {
    snake_orientation * Quat::from_rotation_x(FRAC_PI_2)
}

/// Compares two orientations component-wise after scrubbing signed zeros.
fn quats_differ(a: Quat, b: Quat) -> bool {
    normalize_signed_zero(a) != normalize_signed_zero(b)
}

/// Slerp tween between two camera orientations.
#[derive(Clone, Copy, Debug)]
struct RotationTween {
    origin: Quat,
    target: Quat,
    progress: f32,
}

impl RotationTween {
    fn settled(target: Quat) -> Self {
        Self {
            origin: target,
            target,
            progress: 1.0,
        }
    }

    fn retarget(&mut self, target: Quat) {
        self.origin = self.current();
        self.target = target;
        self.progress = 0.0;
    }

    fn advance(&mut self, dt: f32) -> Quat {
        self.progress = (self.progress + dt / TWEEN_SECONDS).min(1.0);
        self.current()
    }

    fn current(&self) -> Quat {
        let eased = self.progress * self.progress * (3.0 - 2.0 * self.progress);
        self.origin.slerp(self.target, eased)
    }
}

/// Bobbing animation state for the score point.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScorePointMotion {
    timer: f32,
}

impl ScorePointMotion {
    /// Advances the bobbing clock by the frame delta.
    pub fn advance(&mut self, dt: f32) {
        self.timer += dt;
    }

    /// Current displacement of the score point from its cell center.
    ///
    /// The point bobs along the view's up axis in flat mode and along the
    /// snake's look axis in free-look mode.
    #[must_use]
    pub fn offset(
        &self,
        mode: ControlMode,
        snake_orientation: Quat,
        view_orientation: Quat,
    ) -> Vec3 {
        let swing = BOB_AMPLITUDE * (self.timer * BOB_SPEED * PI).sin();
        let basis = match mode {
            ControlMode::Flat => view_orientation,
            ControlMode::FreeLook => eye_rotation(snake_orientation),
        };
        basis * Vec3::new(0.0, swing, 0.0)
    }
}
