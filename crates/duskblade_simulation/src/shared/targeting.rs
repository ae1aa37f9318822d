//! Targeting & range oracle.
//!
//! Pure helpers used by every AI decision. Absent targets are never an error:
//! they are simply out of range.

use bevy::prelude::*;

/// `true` iff `target` exists and lies within `radius` of `origin` (3D distance).
pub fn in_target_range(origin: Vec3, target: Option<Vec3>, radius: f32) -> bool {
    distance_to(origin, target).is_some_and(|distance| distance <= radius)
}

/// Distance to an optional target (`None` when absent).
pub fn distance_to(origin: Vec3, target: Option<Vec3>) -> Option<f32> {
    target.map(|target| origin.distance(target))
}

/// Point the attacker should warp to: `warp_distance` in front of the target,
/// on the attacker's side.
pub fn translation_warp_target(
    origin: Vec3,
    target: Option<Vec3>,
    warp_distance: f32,
) -> Option<Vec3> {
    let target = target?;
    let target_to_attacker = (origin - target).normalize_or_zero();
    Some(target + target_to_attacker * warp_distance)
}

/// Point the attacker should rotate towards.
pub fn rotation_warp_target(target: Option<Vec3>) -> Option<Vec3> {
    target
}
