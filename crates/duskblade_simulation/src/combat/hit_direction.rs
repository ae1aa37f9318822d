//! Directional hit-reaction resolver
//!
//! Угол между facing жертвы и направлением на точку удара (в горизонтальной
//! плоскости жертвы), со знаком по up-компоненте cross(forward, toHit):
//!
//! | theta          | bucket |
//! |----------------|--------|
//! | [-45, 45)      | Front  |
//! | [45, 135)      | Right  |
//! | [-135, -45)    | Left   |
//! | остальное      | Back   |

use bevy::prelude::*;

use crate::shared::{facing, planar, FORWARD, UP};

/// С какой стороны пришёл удар
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum HitDirection {
    Front,
    Right,
    Left,
    Back,
}

impl HitDirection {
    /// Bucket по углу в градусах
    pub fn from_angle(theta: f32) -> Self {
        if (-45.0..45.0).contains(&theta) {
            HitDirection::Front
        } else if (45.0..135.0).contains(&theta) {
            HitDirection::Right
        } else if (-135.0..-45.0).contains(&theta) {
            HitDirection::Left
        } else {
            HitDirection::Back
        }
    }

    /// Имя секции hit-react анимации
    pub fn section_name(&self) -> &'static str {
        match self {
            HitDirection::Front => "FromFront",
            HitDirection::Right => "FromRight",
            HitDirection::Left => "FromLeft",
            HitDirection::Back => "FromBack",
        }
    }
}

/// Знаковый угол (градусы) от facing жертвы до точки удара.
///
/// Точка прямо над/под жертвой даёт 0 (Front).
pub fn hit_angle(victim: &Transform, impact_point: Vec3) -> f32 {
    let forward = planar(facing(victim)).normalize_or(FORWARD);
    let lowered = Vec3::new(impact_point.x, impact_point.y, victim.translation.z);

    let Some(to_hit) = (lowered - victim.translation).try_normalize() else {
        return 0.0;
    };

    let theta = forward.dot(to_hit).clamp(-1.0, 1.0).acos().to_degrees();

    if forward.cross(to_hit).dot(UP) < 0.0 {
        -theta
    } else {
        theta
    }
}

/// Bucket для удара в `impact_point` по жертве с `victim` transform
pub fn resolve_hit_direction(victim: &Transform, impact_point: Vec3) -> HitDirection {
    HitDirection::from_angle(hit_angle(victim, impact_point))
}
