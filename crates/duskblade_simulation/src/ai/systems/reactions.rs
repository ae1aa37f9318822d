//! AI reaction systems (damage intake, corpse cleanup).

use bevy::prelude::*;

use super::agent::{entity_position, EnemyAgent, EnemyAgentData};
use crate::ai::components::EnemyState;
use crate::ai::decision::{damage_response, DamageResponse};
use crate::ai::events::AnimationRequest;
use crate::combat::{DamageTaken, EquippedWeapon, Weapon};
use crate::components::Health;
use crate::schedules::{TimerAction, TimerFired, TimerService};
use crate::DeterministicRng;

/// System: враг получил урон → цель = атакующий, атака или погоня
///
/// Урон прерывает текущий удар (Engaged): окно оружия закрывается,
/// анимации атаки отправляется StopAttack. Смертельный урон здесь
/// не обрабатывается — смерть случается в receive-hit.
pub fn react_to_damage(
    mut damage_events: EventReader<DamageTaken>,
    mut agents: Query<EnemyAgentData>,
    vitals: Query<(&Health, Option<&EquippedWeapon>)>,
    mut weapons: Query<&mut Weapon>,
    transforms: Query<&Transform>,
    mut timers: ResMut<TimerService>,
    mut rng: ResMut<DeterministicRng>,
    mut animations: EventWriter<AnimationRequest>,
) {
    for damage in damage_events.read() {
        let Ok((health, equipped)) = vitals.get(damage.victim) else {
            continue;
        };
        if !health.is_alive() {
            continue;
        }

        let Ok(item) = agents.get_mut(damage.victim) else {
            continue;
        };
        let mut agent = EnemyAgent::new(item);

        let attacker_position = entity_position(Some(damage.source), &transforms);
        let response = damage_response(agent.state(), agent.position(), attacker_position, agent.config);
        if response == DamageResponse::Ignore {
            continue;
        }

        if agent.state() == EnemyState::Engaged {
            if let Some(mut weapon) = equipped.and_then(|equipped| weapons.get_mut(equipped.0).ok()) {
                weapon.close_window();
            }
            animations.write(AnimationRequest::StopAttack {
                entity: agent.entity,
            });
            crate::log(&format!("💥 AI: {:?} attack interrupted", agent.entity));
        }

        agent.cancel_patrol_wait(&mut timers);
        agent.target.0 = Some(damage.source);

        match response {
            DamageResponse::Attack => {
                // Уже ждём удар — не сбрасываем задержку на каждое попадание
                let pending = agent
                    .timers
                    .attack_delay
                    .is_some_and(|handle| timers.is_active(handle));
                if agent.state() != EnemyState::Attacking || !pending {
                    agent.start_attack_timer(&mut timers, &mut rng.rng);
                }
            }
            DamageResponse::Chase => {
                agent.cancel_attack_delay(&mut timers);
                agent.chase();
            }
            DamageResponse::Ignore => {}
        }

        crate::log(&format!(
            "🔥 AI: {:?} hit by {:?} for {} → {:?}",
            agent.entity,
            damage.source,
            damage.amount,
            agent.state()
        ));
    }
}

/// System: death linger истёк → despawn
pub fn despawn_after_linger(mut fired_events: EventReader<TimerFired>, mut commands: Commands) {
    for fired in fired_events.read() {
        if fired.action != TimerAction::Despawn {
            continue;
        }

        if let Ok(mut entity) = commands.get_entity(fired.owner) {
            entity.despawn();
            crate::log(&format!("🪦 {:?} despawned after death linger", fired.owner));
        }
    }
}
