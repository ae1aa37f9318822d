//! Weapon components (blade geometry, swing window, per-swing ignore set).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Геометрия клинка в локальных координатах оружия
///
/// Swept trace идёт сферой радиуса `radius` от `start` к `end`.
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct BladeGeometry {
    pub start: Vec3,
    pub end: Vec3,
    pub radius: f32,
}

impl Default for BladeGeometry {
    fn default() -> Self {
        Self {
            start: Vec3::new(10.0, 0.0, 0.0),
            end: Vec3::new(90.0, 0.0, 0.0),
            radius: 5.0,
        }
    }
}

impl BladeGeometry {
    /// Клинок в мировых координатах (следует за transform оружия)
    pub fn world_segment(&self, weapon_transform: &Transform) -> (Vec3, Vec3) {
        (
            weapon_transform.transform_point(self.start),
            weapon_transform.transform_point(self.end),
        )
    }
}

/// Melee оружие
///
/// Инварианты:
/// - в пределах одного окна (collision_enabled) жертва попадает в `ignore` максимум один раз
/// - `ignore` очищается при открытии И при закрытии окна
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Weapon {
    /// Владелец (None — оружие лежит на земле)
    pub owner: Option<Entity>,
    pub damage: u32,
    pub blade: BladeGeometry,
    /// Где оружие висит относительно владельца
    pub mount: Transform,
    /// Swing window открыт
    pub collision_enabled: bool,
    /// Жертвы, уже получившие удар в этом окне
    pub ignore: Vec<Entity>,
    /// Встроенный broad-phase генерирует WeaponOverlap сам
    pub auto_overlap: bool,
}

impl Default for Weapon {
    fn default() -> Self {
        Self {
            owner: None,
            damage: 20,
            blade: BladeGeometry::default(),
            mount: Transform::IDENTITY,
            collision_enabled: false,
            ignore: Vec::new(),
            auto_overlap: true,
        }
    }
}

impl Weapon {
    pub fn new(damage: u32, blade: BladeGeometry) -> Self {
        Self {
            damage,
            blade,
            ..Default::default()
        }
    }

    pub fn open_window(&mut self) {
        self.ignore.clear();
        self.collision_enabled = true;
    }

    pub fn close_window(&mut self) {
        self.ignore.clear();
        self.collision_enabled = false;
    }

    pub fn has_struck(&self, victim: Entity) -> bool {
        self.ignore.contains(&victim)
    }

    /// Запоминает жертву. `false` если она уже получила удар в этом окне.
    pub fn mark_struck(&mut self, victim: Entity) -> bool {
        if self.has_struck(victim) {
            return false;
        }
        self.ignore.push(victim);
        true
    }

    /// Исключения для trace: само оружие, владелец, ignore set
    pub fn is_excluded(&self, weapon_entity: Entity, candidate: Entity) -> bool {
        candidate == weapon_entity || Some(candidate) == self.owner || self.has_struck(candidate)
    }
}

/// Component на владельце: какое оружие в руках
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct EquippedWeapon(pub Entity);
