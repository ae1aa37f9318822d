//! Weapon systems: equip, mount sync, swing window, overlap → sweep → damage.

use bevy::prelude::*;

use crate::combat::trace::{sweep_blade, HurtSphere};
use crate::combat::{
    DamageTaken, EquipWeapon, EquippedWeapon, HitLanded, Hurtbox, SwingWindow, Weapon,
    WeaponOverlap,
};
use crate::components::{Allegiance, Dead, Health};

/// Оба entity имеют Allegiance и она совпадает
fn shares_allegiance(a: Entity, b: Entity, allegiances: &Query<&Allegiance>) -> bool {
    match (allegiances.get(a), allegiances.get(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// System: EquipWeapon → передача владения
///
/// Старое оружие нового владельца выпадает (owner = None), предыдущий
/// владелец оружия теряет EquippedWeapon. Окно закрыто, ignore set пуст.
pub fn equip_weapons(
    mut equip_events: EventReader<EquipWeapon>,
    mut weapons: Query<&mut Weapon>,
    equipped: Query<&EquippedWeapon>,
    living: Query<(), Without<Dead>>,
    mut commands: Commands,
) {
    for event in equip_events.read() {
        if !living.contains(event.owner) {
            crate::log_warning(&format!(
                "⚠️ EquipWeapon: owner {:?} missing or dead",
                event.owner
            ));
            continue;
        }
        if !weapons.contains(event.weapon) {
            crate::log_warning(&format!(
                "⚠️ EquipWeapon: {:?} is not a weapon",
                event.weapon
            ));
            continue;
        }

        // Старое оружие нового владельца выпадает
        if let Ok(current) = equipped.get(event.owner) {
            if current.0 != event.weapon {
                if let Ok(mut dropped) = weapons.get_mut(current.0) {
                    dropped.owner = None;
                    dropped.close_window();
                }
            }
        }

        let Ok(mut weapon) = weapons.get_mut(event.weapon) else {
            continue;
        };

        if let Some(previous) = weapon.owner.filter(|previous| *previous != event.owner) {
            let holds_this_weapon = equipped
                .get(previous)
                .is_ok_and(|held| held.0 == event.weapon);
            if holds_this_weapon {
                if let Ok(mut entity) = commands.get_entity(previous) {
                    entity.remove::<EquippedWeapon>();
                }
            }
        }

        weapon.owner = Some(event.owner);
        weapon.close_window();
        commands.entity(event.owner).insert(EquippedWeapon(event.weapon));

        crate::log(&format!(
            "🗡️ {:?} equipped weapon {:?}",
            event.owner, event.weapon
        ));
    }
}

/// System: transform оружия = transform владельца × mount
pub fn sync_weapon_mounts(
    mut weapons: Query<(&Weapon, &mut Transform)>,
    owners: Query<&Transform, Without<Weapon>>,
) {
    for (weapon, mut transform) in weapons.iter_mut() {
        let Some(owner) = weapon.owner else {
            continue;
        };
        let Ok(owner_transform) = owners.get(owner) else {
            continue;
        };

        *transform = owner_transform.mul_transform(weapon.mount);
    }
}

/// System: SwingWindow → открыть/закрыть окно оружия владельца
pub fn handle_swing_window(
    mut window_events: EventReader<SwingWindow>,
    equipped: Query<&EquippedWeapon, Without<Dead>>,
    mut weapons: Query<&mut Weapon>,
) {
    for event in window_events.read() {
        let Ok(held) = equipped.get(event.owner) else {
            continue;
        };
        let Ok(mut weapon) = weapons.get_mut(held.0) else {
            continue;
        };
        if weapon.owner != Some(event.owner) {
            continue;
        }

        if event.open {
            weapon.open_window();
        } else {
            weapon.close_window();
        }
    }
}

/// System: встроенный broad-phase для оружия с `auto_overlap`
///
/// Сфера вокруг клинка против hurtbox сфер. Точное попадание решает sweep.
pub fn detect_weapon_overlaps(
    weapons: Query<(Entity, &Weapon, &Transform)>,
    hurtboxes: Query<(Entity, &Transform, &Hurtbox)>,
    mut overlap_events: EventWriter<WeaponOverlap>,
) {
    for (weapon_entity, weapon, weapon_transform) in weapons.iter() {
        if !weapon.collision_enabled || !weapon.auto_overlap {
            continue;
        }

        let (start, end) = weapon.blade.world_segment(weapon_transform);
        let center = (start + end) * 0.5;
        let reach = start.distance(end) * 0.5 + weapon.blade.radius;

        for (other, transform, hurtbox) in hurtboxes.iter() {
            if !hurtbox.enabled || weapon.is_excluded(weapon_entity, other) {
                continue;
            }

            if center.distance(hurtbox.center(transform)) <= reach + hurtbox.radius {
                overlap_events.write(WeaponOverlap {
                    weapon: weapon_entity,
                    other,
                });
            }
        }
    }
}

/// System: pipeline удара (атомарно на каждый overlap)
///
/// 1. Overlap с союзником → игнор
/// 2. Sweep от start к end клинка, без оружия, владельца и ignore set
/// 3. Промах → ничего
/// 4. Попали в союзника → игнор
/// 5. ignore set += жертва, урон (source = владелец), затем HitLanded
pub fn resolve_weapon_overlaps(
    mut overlap_events: EventReader<WeaponOverlap>,
    mut weapons: Query<(&mut Weapon, &Transform)>,
    hurtboxes: Query<(Entity, &Transform, &Hurtbox)>,
    allegiances: Query<&Allegiance>,
    mut healths: Query<&mut Health>,
    mut damage_events: EventWriter<DamageTaken>,
    mut hit_events: EventWriter<HitLanded>,
) {
    let candidates: Vec<HurtSphere> = hurtboxes
        .iter()
        .filter(|(_, _, hurtbox)| hurtbox.enabled)
        .map(|(entity, transform, hurtbox)| HurtSphere {
            entity,
            center: hurtbox.center(transform),
            radius: hurtbox.radius,
        })
        .collect();

    for overlap in overlap_events.read() {
        let Ok((mut weapon, weapon_transform)) = weapons.get_mut(overlap.weapon) else {
            continue;
        };
        if !weapon.collision_enabled {
            continue;
        }
        let Some(owner) = weapon.owner else {
            continue;
        };

        if shares_allegiance(owner, overlap.other, &allegiances) {
            continue;
        }

        let (start, end) = weapon.blade.world_segment(weapon_transform);
        let Some(hit) = sweep_blade(start, end, weapon.blade.radius, &candidates, |candidate| {
            weapon.is_excluded(overlap.weapon, candidate)
        }) else {
            continue;
        };

        if shares_allegiance(owner, hit.entity, &allegiances) {
            continue;
        }

        if !weapon.mark_struck(hit.entity) {
            continue;
        }

        if let Ok(mut health) = healths.get_mut(hit.entity) {
            health.take_damage(weapon.damage);
            damage_events.write(DamageTaken {
                victim: hit.entity,
                source: owner,
                amount: weapon.damage,
            });
            crate::log(&format!(
                "⚔️ {:?} hit {:?} for {} (HP {}/{})",
                owner, hit.entity, weapon.damage, health.current, health.max
            ));
        }

        hit_events.write(HitLanded {
            victim: hit.entity,
            attacker: owner,
            impact_point: hit.impact_point,
        });
    }
}
