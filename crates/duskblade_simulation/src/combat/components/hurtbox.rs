//! Hit receivers: hurtbox volume и вид получателя удара.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Сфера, по которой попадает swept trace клинка
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct Hurtbox {
    pub radius: f32,
    /// Смещение центра от translation (мировые оси, без поворота)
    pub center_offset: Vec3,
    pub enabled: bool,
}

impl Default for Hurtbox {
    fn default() -> Self {
        Self {
            radius: 40.0,
            center_offset: Vec3::ZERO,
            enabled: true,
        }
    }
}

impl Hurtbox {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            ..Default::default()
        }
    }

    pub fn center(&self, transform: &Transform) -> Vec3 {
        transform.translation + self.center_offset
    }
}

/// Кто реагирует на удар (реализации `ReceiveHit`)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
#[reflect(Component)]
pub enum HitReceiver {
    Enemy,
    Player,
    Breakable,
}

/// Разрушаемый объект (ваза, бочка). Ломается с первого удара.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub struct Breakable {
    pub broken: bool,
}
