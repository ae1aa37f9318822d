//! Combat module: weapon swing hit pipeline
//!
//! ECS ответственность:
//! - swing window и per-swing ignore set оружия
//! - overlap → swept trace → dedupe → урон → receive-hit
//! - направление удара для hit-reaction
//!
//! Хост (движок) ответственность:
//! - анимации: открывает/закрывает окно через SwingWindow
//! - опционально свой broad-phase через WeaponOverlap

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod hit_direction;
pub mod systems;
pub mod trace;

// Re-export основных типов
pub use components::*;
pub use events::*;
pub use hit_direction::{hit_angle, resolve_hit_direction, HitDirection};
pub use systems::ReceiveHit;

use crate::components::{ActionState, Allegiance, EngageableTarget, Health, Player, Stamina};
use crate::schedules::{CombatEventsExt, CombatSet, CombatTick};

/// Combat Plugin
///
/// Порядок выполнения в CombatTick:
/// 1. Timers: regenerate_stamina
/// 2. Signals: equip_weapons → handle_swing_window → handle_hit_reaction_ended
/// 3. Strike: sync_weapon_mounts → detect_weapon_overlaps → resolve_weapon_overlaps
/// 4. React: dispatch_hits (после react_to_damage)
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Weapon>()
            .register_type::<EquippedWeapon>()
            .register_type::<Hurtbox>()
            .register_type::<HitReceiver>()
            .register_type::<Breakable>()
            .add_combat_event::<SwingWindow>()
            .add_combat_event::<EquipWeapon>()
            .add_combat_event::<WeaponOverlap>()
            .add_combat_event::<DamageTaken>()
            .add_combat_event::<HitLanded>()
            .add_combat_event::<CombatantDied>()
            .add_combat_event::<BreakableBroken>();

        app.add_systems(
            CombatTick,
            (
                systems::regenerate_stamina.in_set(CombatSet::Timers),
                (
                    systems::equip_weapons,
                    systems::handle_swing_window,
                    systems::handle_hit_reaction_ended,
                )
                    .chain()
                    .in_set(CombatSet::Signals),
                (
                    systems::sync_weapon_mounts,
                    systems::detect_weapon_overlaps,
                    systems::resolve_weapon_overlaps,
                )
                    .chain()
                    .in_set(CombatSet::Strike),
                systems::dispatch_hits
                    .in_set(CombatSet::React)
                    .after(crate::ai::systems::react_to_damage),
            ),
        );
    }
}

/// Оружие (без владельца — надевается через EquipWeapon)
pub fn weapon_bundle(weapon: Weapon) -> impl Bundle {
    (weapon, Transform::default())
}

/// Игрок: цель для врагов, получает удары как Player
pub fn player_bundle(transform: Transform, allegiance: Allegiance) -> impl Bundle {
    (
        Player,
        EngageableTarget,
        ActionState::default(),
        transform,
        allegiance,
        Health::new(100),
        Stamina::default(),
        Hurtbox::default(),
        HitReceiver::Player,
    )
}

/// Разрушаемый объект
pub fn breakable_bundle(transform: Transform, radius: f32) -> impl Bundle {
    (
        Breakable::default(),
        transform,
        Hurtbox::new(radius),
        HitReceiver::Breakable,
    )
}
