//! World frame conventions.
//!
//! Контент авторится в Z-up мире: ось Z смотрит вверх, актор "смотрит" вдоль
//! своей локальной +X, локальная +Y — его правая сторона. Bevy `Transform`
//! хранит позицию/поворот как обычно, но `Transform::forward()` (−Z) здесь
//! не используется — только `facing()`.

use bevy::prelude::*;

/// Вертикальная ось мира
pub const UP: Vec3 = Vec3::Z;

/// Локальное направление взгляда актора
pub const FORWARD: Vec3 = Vec3::X;

/// World-space facing vector (unit length).
pub fn facing(transform: &Transform) -> Vec3 {
    (transform.rotation * FORWARD).normalize_or(FORWARD)
}

/// Drops the vertical component.
pub fn planar(vector: Vec3) -> Vec3 {
    Vec3::new(vector.x, vector.y, 0.0)
}

/// Horizontal speed magnitude (vertical velocity ignored).
pub fn planar_speed(velocity: Vec3) -> f32 {
    planar(velocity).length()
}

/// Rotation that makes an actor face `direction` (yaw only).
pub fn yaw_towards(direction: Vec3) -> Quat {
    let flat = planar(direction);
    if flat.length_squared() <= f32::EPSILON {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_z(flat.y.atan2(flat.x))
}
