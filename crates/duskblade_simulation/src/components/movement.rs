//! Movement компоненты: команды навигации, скорость, velocity
//!
//! Симуляция только ВЫДАЁТ намерение движения. Pathfinding и физику выполняет
//! хост (navmesh агент), он же пишет обратно `Velocity`.

use bevy::prelude::*;

/// Команда движения для комбатанта (выполняется навигационным агентом хоста)
#[derive(Component, Debug, Clone, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub enum MovementCommand {
    /// Стоять на месте
    #[default]
    Idle,
    /// Следовать за entity, пока не окажемся ближе acceptance_radius
    FollowEntity {
        target: Entity,
        acceptance_radius: f32,
    },
    /// Остановиться немедленно (сбросить velocity)
    Stop,
}

/// Желаемая скорость движения (units/sec), выставляется AI по состоянию
#[derive(Component, Clone, Copy, Debug, PartialEq, Reflect)]
#[reflect(Component)]
pub struct MovementSpeed {
    pub speed: f32,
}

impl Default for MovementSpeed {
    fn default() -> Self {
        Self { speed: 125.0 }
    }
}

/// Фактическая скорость, которую сообщает хост после шага физики
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Velocity(pub Vec3);

/// Marker: у entity есть навигационный агент.
///
/// Без него move-команды не выдаются (тихий no-op).
#[derive(Component, Clone, Copy, Debug, Default, Reflect)]
#[reflect(Component)]
pub struct NavigationAgent;
