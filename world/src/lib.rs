#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Cube Serpent.
//!
//! The world owns the snake, the score point, the view orientation, and the
//! control mode. Adapters mutate it exclusively through [`apply`] and observe
//! it through the [`query`] module plus the events pushed into the caller's
//! buffer. All mutation is run-to-completion and deterministic for a given
//! seed and command sequence.

use std::collections::VecDeque;
use std::f32::consts::FRAC_PI_2;

use cube_serpent_core::{
    rotation::{heading_cell, rotate_basis, round_vec3, FORWARD},
    Command, ControlMode, Event, GameState, GridPos, LateralInput, WorldSize, WELCOME_BANNER,
};
use glam::{IVec2, IVec3, Quat};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const DEFAULT_WORLD_SIZE: WorldSize = WorldSize::new(13, 13, 13);
const DEFAULT_SEED: u64 = 0x5e4b_3a2c_9d17_f08e;

/// Represents the authoritative Cube Serpent world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    size: WorldSize,
    wrap: bool,
    control_mode: ControlMode,
    game_state: GameState,
    score: u32,
    view_orientation: Quat,
    score_point: Option<GridPos>,
    snake: Snake,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a world with the default 13x13x13 wrapped box in flat mode.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            size: DEFAULT_WORLD_SIZE,
            wrap: true,
            control_mode: ControlMode::Flat,
            game_state: GameState::Playing,
            score: 0,
            view_orientation: Quat::IDENTITY,
            score_point: None,
            snake: Snake::spawn_at(DEFAULT_WORLD_SIZE.center()),
            rng: ChaCha8Rng::seed_from_u64(DEFAULT_SEED),
        }
    }

    fn configure(&mut self, size: WorldSize, wrap: bool, mode: ControlMode, seed: u64) {
        self.size = size;
        self.wrap = wrap;
        self.control_mode = mode;
        self.game_state = GameState::Playing;
        self.score = 0;
        self.view_orientation = Quat::IDENTITY;
        self.score_point = None;
        self.snake = Snake::spawn_at(size.center());
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    fn step(&mut self, out_events: &mut Vec<Event>) {
        if !self.game_state.is_playing() {
            return;
        }

        if self.score_point.is_none() {
            self.place_score_point(out_events);
            if !self.game_state.is_playing() {
                return;
            }
        }

        let old_head = self.snake.head().position;
        let direction = heading_cell(self.snake.orientation);
        let mut new_head = old_head.offset(direction);
        if self.wrap {
            new_head = new_head.wrapped(self.size);
        }

        for countdown in self.snake.grow_queue.iter_mut() {
            *countdown -= 1;
        }
        let moved_tail = if self.snake.grow_queue.front() == Some(&0) {
            let _ = self.snake.grow_queue.pop_front();
            false
        } else {
            let _ = self.snake.segments.pop_front();
            true
        };

        if self.collides(old_head, new_head) {
            self.game_state = GameState::Lost;
            out_events.push(Event::GameStateChanged {
                state: GameState::Lost,
            });
            return;
        }

        self.snake.segments.push_back(Segment {
            position: new_head,
            orientation: self.snake.orientation,
        });

        if self.scored(new_head) {
            self.snake
                .grow_queue
                .push_back(self.snake.segments.len() as i32);
            self.score += 1;
            out_events.push(Event::PointScored { score: self.score });
            self.place_score_point(out_events);
        }

        out_events.push(Event::SnakeAdvanced {
            head: new_head,
            moved_tail,
        });
    }

    /// Two-phase self-collision check.
    ///
    /// Occupying an existing cell in 3D is always fatal. Flat mode adds the
    /// projected-plane check, except when the old head already overlaps
    /// another segment on screen: the snake is mid-way through a corner turn
    /// that merely looks like a crossing, and the projected check must stand
    /// down for one step.
    fn collides(&self, old_head: GridPos, new_head: GridPos) -> bool {
        if self.snake.occupies(new_head) {
            return true;
        }

        match self.control_mode {
            ControlMode::FreeLook => false,
            ControlMode::Flat => {
                let old_flat = self.project_to_view(old_head).truncate();
                let below_head = self.snake.segments.len().saturating_sub(1);
                if self
                    .snake
                    .segments
                    .iter()
                    .take(below_head)
                    .any(|segment| self.project_to_view(segment.position).truncate() == old_flat)
                {
                    return false;
                }

                let new_flat = self.project_to_view(new_head).truncate();
                self.snake
                    .segments
                    .iter()
                    .any(|segment| self.project_to_view(segment.position).truncate() == new_flat)
            }
        }
    }

    fn scored(&self, new_head: GridPos) -> bool {
        let Some(point) = self.score_point else {
            return false;
        };

        match self.control_mode {
            ControlMode::FreeLook => point == new_head,
            ControlMode::Flat => {
                self.project_to_view(point).truncate()
                    == self.project_to_view(new_head).truncate()
            }
        }
    }

    fn place_score_point(&mut self, out_events: &mut Vec<Event>) {
        let mut free: Vec<GridPos> = Vec::with_capacity(self.size.cell_count() as usize);
        for x in 0..self.size.width() as i32 {
            for y in 0..self.size.height() as i32 {
                for z in 0..self.size.depth() as i32 {
                    let cell = GridPos::new(x, y, z);
                    if !self.snake.occupies(cell) {
                        free.push(cell);
                    }
                }
            }
        }

        if free.is_empty() {
            self.score_point = None;
            self.game_state = GameState::Won;
            out_events.push(Event::GameStateChanged {
                state: GameState::Won,
            });
            return;
        }

        let cell = free[self.rng.gen_range(0..free.len())];
        self.score_point = Some(cell);
        out_events.push(Event::ScorePointPlaced { cell });
    }

    fn set_flat_heading(&mut self, lateral: LateralInput, out_events: &mut Vec<Event>) {
        let spin = Quat::from_rotation_z(-FRAC_PI_2 * lateral.quarter_turns() as f32);
        let _ = self.commit_heading(self.view_orientation * spin, out_events);
    }

    /// Pitches the heading out of the view plane and swings the view along.
    ///
    /// The pitch is expressed in the frame carrying the snake's heading onto
    /// the screen, with the quaternion's x/z components negated: the fixed
    /// convention that keeps "forward" stable under re-basing. The view
    /// receives the re-based pitch in the same operation, so the on-screen
    /// travel direction is unchanged by a depth turn.
    fn shift_depth_heading(&mut self, deeper: bool, out_events: &mut Vec<Event>) {
        let orientation = self.snake.orientation;
        let snake_to_view = orientation * self.view_orientation.inverse();
        let snake_to_screen = rotate_basis(orientation.inverse(), snake_to_view);

        let pitch = Quat::from_rotation_x(if deeper { FRAC_PI_2 } else { -FRAC_PI_2 });
        let pitch = Quat::from_xyzw(-pitch.x, pitch.y, -pitch.z, pitch.w);

        let view_spin = rotate_basis(snake_to_screen, pitch);
        if self.commit_heading(orientation * pitch, out_events) {
            self.view_orientation *= view_spin;
        }
    }

    fn turn_free_look(&mut self, lateral: LateralInput, out_events: &mut Vec<Event>) {
        let pitch = Quat::from_rotation_x(FRAC_PI_2);
        let roll = Quat::from_rotation_y(FRAC_PI_2 * lateral.quarter_turns() as f32);
        let turn = rotate_basis(roll, pitch);

        if self.commit_heading(self.snake.orientation * turn, out_events) {
            self.view_orientation = self.snake.orientation;
        }
    }

    fn commit_heading(&mut self, proposed: Quat, out_events: &mut Vec<Event>) -> bool {
        let current = heading_cell(self.snake.orientation);
        if self.snake.try_rotate(proposed) {
            true
        } else {
            out_events.push(Event::HeadingRejected {
                current,
                proposed: heading_cell(proposed),
            });
            false
        }
    }

    fn project_to_view(&self, cell: GridPos) -> IVec3 {
        round_vec3(self.view_orientation.inverse() * cell.as_vec3())
    }

    fn flat_heading_on_screen(&self) -> IVec2 {
        round_vec3(self.view_orientation.inverse() * (self.snake.orientation * FORWARD)).truncate()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureWorld {
            size,
            wrap,
            mode,
            seed,
        } => {
            world.configure(size, wrap, mode, seed);
        }
        Command::Step => world.step(out_events),
        Command::SetFlatHeading { lateral } => {
            if world.game_state.is_playing() && world.control_mode == ControlMode::Flat {
                world.set_flat_heading(lateral, out_events);
            }
        }
        Command::ShiftDepthHeading { deeper } => {
            if world.game_state.is_playing() && world.control_mode == ControlMode::Flat {
                world.shift_depth_heading(deeper, out_events);
            }
        }
        Command::TurnFreeLook { lateral } => {
            if world.game_state.is_playing() && world.control_mode == ControlMode::FreeLook {
                world.turn_free_look(lateral, out_events);
            }
        }
        Command::ToggleControlMode => {
            if world.game_state.is_playing() {
                world.control_mode = world.control_mode.toggled();
                out_events.push(Event::ControlModeChanged {
                    mode: world.control_mode,
                });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use cube_serpent_core::{
        ControlMode, GameState, GridPos, SegmentSnapshot, SnakeView, WorldSize,
    };
    use glam::{IVec2, IVec3, Quat};

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Dimensions of the playable box.
    #[must_use]
    pub fn world_size(world: &World) -> WorldSize {
        world.size
    }

    /// Current phase of play.
    #[must_use]
    pub fn game_state(world: &World) -> GameState {
        world.game_state
    }

    /// Active control scheme.
    #[must_use]
    pub fn control_mode(world: &World) -> ControlMode {
        world.control_mode
    }

    /// Number of score points consumed so far.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Cell occupied by the score point, if one is placed.
    #[must_use]
    pub fn score_point(world: &World) -> Option<GridPos> {
        world.score_point
    }

    /// Orientation encoding the snake's direction of travel.
    #[must_use]
    pub fn snake_orientation(world: &World) -> Quat {
        world.snake.orientation
    }

    /// Orientation defining the orthographic viewing basis.
    #[must_use]
    pub fn view_orientation(world: &World) -> Quat {
        world.view_orientation
    }

    /// Captures a read-only view of the segment chain, tail first.
    #[must_use]
    pub fn snake_view(world: &World) -> SnakeView {
        SnakeView::from_snapshots(
            world
                .snake
                .segments
                .iter()
                .map(|segment| SegmentSnapshot {
                    position: segment.position,
                    orientation: segment.orientation,
                })
                .collect(),
        )
    }

    /// Rotates a cell into the view frame and rounds it onto the lattice.
    ///
    /// Dropping the z component of the result yields the view-plane
    /// coordinates used by flat-mode collision and scoring.
    #[must_use]
    pub fn project_to_view(world: &World, cell: GridPos) -> IVec3 {
        world.project_to_view(cell)
    }

    /// The snake's direction of travel expressed on the view plane.
    #[must_use]
    pub fn heading_on_screen(world: &World) -> IVec2 {
        world.flat_heading_on_screen()
    }
}

#[derive(Clone, Copy, Debug)]
struct Segment {
    position: GridPos,
    orientation: Quat,
}

/// The segment chain together with its orientation and pending growth.
#[derive(Clone, Debug)]
struct Snake {
    segments: VecDeque<Segment>,
    grow_queue: VecDeque<i32>,
    orientation: Quat,
}

impl Snake {
    /// A fresh snake: one segment and a single-step growth pulse, so the
    /// first step extends the body instead of dragging the tail.
    fn spawn_at(start: GridPos) -> Self {
        let mut segments = VecDeque::new();
        segments.push_back(Segment {
            position: start,
            orientation: Quat::IDENTITY,
        });

        let mut grow_queue = VecDeque::new();
        grow_queue.push_back(1);

        Self {
            segments,
            grow_queue,
            orientation: Quat::IDENTITY,
        }
    }

    fn head(&self) -> &Segment {
        self.segments
            .back()
            .expect("snake always keeps at least one segment")
    }

    fn occupies(&self, cell: GridPos) -> bool {
        self.segments.iter().any(|segment| segment.position == cell)
    }

    /// Accepts the proposed orientation only when its heading is strictly
    /// orthogonal to the current one. Parallel and anti-parallel proposals
    /// leave the snake untouched, which is what makes 180-degree reversals
    /// impossible.
    fn try_rotate(&mut self, proposed: Quat) -> bool {
        let current = heading_cell(self.orientation);
        let next = heading_cell(proposed);
        if current.dot(next) == 0 {
            self.orientation = proposed;
            true
        } else {
            false
        }
    }
}
