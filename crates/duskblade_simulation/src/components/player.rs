//! Player-side компоненты

use bevy::prelude::*;

/// Marker: entity управляется игроком (input живёт у хоста)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Player;

/// Что сейчас делает игрок
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub enum ActionState {
    #[default]
    Unoccupied,
    HitReaction,
    Attacking,
    Dead,
}
