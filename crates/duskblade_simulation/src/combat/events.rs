//! Combat events (swing window, overlaps, damage, deaths).

use bevy::prelude::*;

use crate::ai::DeathPose;

/// Inbound: анимация открыла/закрыла swing window оружия владельца
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct SwingWindow {
    pub owner: Entity,
    pub open: bool,
}

/// Inbound: надеть оружие на комбатанта (с передачей владения)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct EquipWeapon {
    pub owner: Entity,
    pub weapon: Entity,
}

/// Оружие коснулось чужого объёма (broad-phase; хост может писать сам)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct WeaponOverlap {
    pub weapon: Entity,
    pub other: Entity,
}

/// Outbound: урон применён к Health
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageTaken {
    pub victim: Entity,
    pub source: Entity,
    pub amount: u32,
}

/// Удар прошёл через pipeline — жертва должна отреагировать
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HitLanded {
    pub victim: Entity,
    pub attacker: Entity,
    pub impact_point: Vec3,
}

/// Outbound: комбатант умер
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct CombatantDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
    pub pose: DeathPose,
}

/// Outbound: разрушаемый объект сломан
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct BreakableBroken {
    pub entity: Entity,
    pub impact_point: Vec3,
}
