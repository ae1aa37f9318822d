//! Swept-sphere trace клинка против hurtbox сфер
//!
//! Аналитика вместо physics backend: сфера радиуса `blade_radius` едет от
//! start к end, столкновение со сферой hurtbox = пересечение луча со сферой
//! суммарного радиуса. Побеждает ближайшее к start попадание.

use bevy::prelude::*;

use crate::shared::UP;

/// Кандидат для trace (hurtbox в мировых координатах)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HurtSphere {
    pub entity: Entity,
    pub center: Vec3,
    pub radius: f32,
}

/// Результат trace
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceHit {
    pub entity: Entity,
    /// Доля пути клинка 0.0..=1.0 до контакта
    pub fraction: f32,
    /// Ближайшая к клинку точка поверхности hurtbox
    pub impact_point: Vec3,
}

/// Параметр входа сферы в сферу вдоль отрезка (None — промах)
fn entry_fraction(start: Vec3, end: Vec3, blade_radius: f32, sphere: &HurtSphere) -> Option<f32> {
    let reach = blade_radius.max(0.0) + sphere.radius.max(0.0);
    let from_center = start - sphere.center;

    // Клинок стартует уже внутри
    if from_center.length_squared() <= reach * reach {
        return Some(0.0);
    }

    let direction = end - start;
    let a = direction.length_squared();
    if a <= f32::EPSILON {
        return None;
    }

    let b = 2.0 * from_center.dot(direction);
    let c = from_center.length_squared() - reach * reach;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let t = (-b - discriminant.sqrt()) / (2.0 * a);
    (0.0..=1.0).contains(&t).then_some(t)
}

/// Ближайшая к точке `point` точка отрезка
pub fn closest_point_on_segment(start: Vec3, end: Vec3, point: Vec3) -> Vec3 {
    let segment = end - start;
    let length_squared = segment.length_squared();
    if length_squared <= f32::EPSILON {
        return start;
    }

    let t = ((point - start).dot(segment) / length_squared).clamp(0.0, 1.0);
    start + segment * t
}

fn impact_point(start: Vec3, end: Vec3, sphere: &HurtSphere) -> Vec3 {
    let closest = closest_point_on_segment(start, end, sphere.center);
    let direction = (closest - sphere.center)
        .try_normalize()
        .or_else(|| (start - sphere.center).try_normalize())
        .unwrap_or(UP);

    sphere.center + direction * sphere.radius
}

/// Sweep клинка. `excluded` отсекает оружие, владельца и ignore set.
///
/// Равные доли пути разрешаются по Entity, чтобы результат не зависел от
/// порядка кандидатов.
pub fn sweep_blade<F>(
    start: Vec3,
    end: Vec3,
    blade_radius: f32,
    candidates: &[HurtSphere],
    excluded: F,
) -> Option<TraceHit>
where
    F: Fn(Entity) -> bool,
{
    candidates
        .iter()
        .filter(|sphere| !excluded(sphere.entity))
        .filter_map(|sphere| {
            entry_fraction(start, end, blade_radius, sphere).map(|fraction| TraceHit {
                entity: sphere.entity,
                fraction,
                impact_point: impact_point(start, end, sphere),
            })
        })
        .min_by(|a, b| {
            a.fraction
                .total_cmp(&b.fraction)
                .then(a.entity.cmp(&b.entity))
        })
}
