//! Quaternion helpers for the axis-aligned heading model.
//!
//! Every heading in the game is a unit quaternion that carries the canonical
//! forward vector onto one of the six signed axis directions. Rotating an
//! exact axis vector through a chain of 90-degree turns accumulates tiny
//! floating-point error, so results are always rounded back onto the integer
//! lattice before they are compared or used to pick the next cell.

use glam::{IVec3, Quat, Vec3};

/// Canonical forward vector every orientation is measured against.
pub const FORWARD: Vec3 = Vec3::Y;

/// Expresses rotation `b` in the frame of rotation `a`.
///
/// The conjugation `a * b * a⁻¹` re-bases a turn so that "pitch up" or
/// "turn right" means the same thing regardless of which way the subject is
/// currently facing.
#[must_use]
pub fn rotate_basis(a: Quat, b: Quat) -> Quat {
    a * b * a.conjugate()
}

/// Rounds each component of the vector to the nearest integer cell offset.
#[must_use]
pub fn round_vec3(v: Vec3) -> IVec3 {
    IVec3::new(
        v.x.round() as i32,
        v.y.round() as i32,
        v.z.round() as i32,
    )
}

/// Rounded direction of travel encoded by the orientation.
///
/// For every orientation the game accepts, the result is one of the six
/// signed unit axis vectors.
#[must_use]
pub fn heading_cell(orientation: Quat) -> IVec3 {
    round_vec3(orientation * FORWARD)
}

/// Collapses negative-zero components to positive zero.
///
/// Quarter-turn products routinely leave `-0.0` in quaternion components.
/// Apply this at every component-wise comparison boundary; bit-level
/// equality on raw components would otherwise spuriously fail.
#[must_use]
pub fn normalize_signed_zero(q: Quat) -> Quat {
    Quat::from_xyzw(
        scrub_zero(q.x),
        scrub_zero(q.y),
        scrub_zero(q.z),
        scrub_zero(q.w),
    )
}

fn scrub_zero(component: f32) -> f32 {
    if component == 0.0 {
        0.0
    } else {
        component
    }
}
