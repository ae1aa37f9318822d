//! Receive-hit capability
//!
//! `HitReceiver` на жертве выбирает реализацию `ReceiveHit`:
//! - Enemy: alert + hit reaction, либо смерть (FSM → Dead, despawn через linger)
//! - Player: ActionState::HitReaction, либо смерть
//! - Breakable: ломается с первого удара
//!
//! Урон к этому моменту уже применён (Strike идёт раньше React).

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::ai::systems::{EnemyAgent, EnemyAgentData};
use crate::ai::{AnimationRequest, DeathPose, Enemy, HitReactionEnded};
use crate::combat::hit_direction::resolve_hit_direction;
use crate::combat::{
    BreakableBroken, Breakable, CombatantDied, EquippedWeapon, HitLanded, HitReceiver, Hurtbox,
};
use crate::components::{ActionState, Dead, Health, Player};
use crate::schedules::{TimerAction, TimerService};
use crate::DeterministicRng;

/// Общие ресурсы всех получателей удара
#[derive(SystemParam)]
pub struct HitServices<'w, 's> {
    pub commands: Commands<'w, 's>,
    pub timers: ResMut<'w, TimerService>,
    pub rng: ResMut<'w, DeterministicRng>,
    pub animations: EventWriter<'w, AnimationRequest>,
    pub deaths: EventWriter<'w, CombatantDied>,
    pub broken: EventWriter<'w, BreakableBroken>,
}

/// Реакция entity на удар оружием
pub trait ReceiveHit {
    fn receive_hit(&mut self, hit: &HitLanded, services: &mut HitServices<'_, '_>);
}

/// Враги: реакция по направлению точки удара или смерть
#[derive(SystemParam)]
pub struct EnemyHitResponse<'w, 's> {
    agents: Query<'w, 's, EnemyAgentData, With<Enemy>>,
    vitals: Query<'w, 's, (&'static Health, Option<&'static EquippedWeapon>), With<Enemy>>,
    hurtboxes: Query<'w, 's, &'static mut Hurtbox, With<Enemy>>,
}

impl ReceiveHit for EnemyHitResponse<'_, '_> {
    fn receive_hit(&mut self, hit: &HitLanded, services: &mut HitServices<'_, '_>) {
        let Ok((health, equipped)) = self.vitals.get(hit.victim) else {
            return;
        };
        let alive = health.is_alive();
        let weapon = equipped.map(|equipped| equipped.0);

        let Ok(item) = self.agents.get_mut(hit.victim) else {
            return;
        };
        let mut agent = EnemyAgent::new(item);
        if agent.is_dead() {
            return;
        }

        if alive {
            agent.alert.visible = true;
            agent.cancel_patrol_wait(&mut services.timers);

            let direction = resolve_hit_direction(agent.transform, hit.impact_point);
            crate::log(&format!(
                "🩸 {:?} hit from {:?} ({})",
                agent.entity,
                direction,
                direction.section_name()
            ));
            services.animations.write(AnimationRequest::PlayHitReaction {
                entity: agent.entity,
                direction,
            });
            return;
        }

        let pose = agent.die(&mut services.timers, &mut services.rng.rng);
        let linger = agent.config.death_linger;
        let entity = agent.entity;

        if let Ok(mut hurtbox) = self.hurtboxes.get_mut(entity) {
            hurtbox.enabled = false;
        }

        if let Some(weapon) = weapon {
            if let Ok(mut weapon_entity) = services.commands.get_entity(weapon) {
                weapon_entity.despawn();
            }
        }

        services.commands.entity(entity).remove::<EquippedWeapon>().insert((Dead, pose));
        services.timers.schedule(entity, linger, TimerAction::Despawn);

        services.animations.write(AnimationRequest::PlayDeath { entity, pose });
        services.deaths.write(CombatantDied {
            entity,
            killer: Some(hit.attacker),
            pose,
        });
    }
}

/// Игрок: реакция по позиции атакующего или смерть
#[derive(SystemParam)]
pub struct PlayerHitResponse<'w, 's> {
    players: Query<
        'w,
        's,
        (&'static Transform, &'static Health, &'static mut ActionState, &'static mut Hurtbox),
        (With<Player>, Without<Enemy>),
    >,
    positions: Query<'w, 's, &'static Transform>,
}

impl ReceiveHit for PlayerHitResponse<'_, '_> {
    fn receive_hit(&mut self, hit: &HitLanded, services: &mut HitServices<'_, '_>) {
        let attacker_position = self
            .positions
            .get(hit.attacker)
            .map(|transform| transform.translation)
            .ok();

        let Ok((transform, health, mut action, mut hurtbox)) = self.players.get_mut(hit.victim) else {
            return;
        };
        if *action == ActionState::Dead {
            return;
        }

        if health.is_alive() {
            let Some(attacker_position) = attacker_position else {
                return;
            };
            let direction = resolve_hit_direction(transform, attacker_position);
            *action = ActionState::HitReaction;
            services.animations.write(AnimationRequest::PlayHitReaction {
                entity: hit.victim,
                direction,
            });
            crate::log(&format!("🩸 Player {:?} hit from {:?}", hit.victim, direction));
            return;
        }

        *action = ActionState::Dead;
        hurtbox.enabled = false;

        let pose = DeathPose::random(&mut services.rng.rng);
        services.commands.entity(hit.victim).insert((Dead, pose));
        services.animations.write(AnimationRequest::PlayDeath {
            entity: hit.victim,
            pose,
        });
        services.deaths.write(CombatantDied {
            entity: hit.victim,
            killer: Some(hit.attacker),
            pose,
        });
        crate::log_info(&format!("💀 Player {:?} died", hit.victim));
    }
}

/// Разрушаемые объекты
#[derive(SystemParam)]
pub struct BreakableHitResponse<'w, 's> {
    breakables: Query<
        'w,
        's,
        (&'static mut Breakable, Option<&'static mut Hurtbox>),
        (Without<Enemy>, Without<Player>),
    >,
}

impl ReceiveHit for BreakableHitResponse<'_, '_> {
    fn receive_hit(&mut self, hit: &HitLanded, services: &mut HitServices<'_, '_>) {
        let Ok((mut breakable, hurtbox)) = self.breakables.get_mut(hit.victim) else {
            return;
        };
        if breakable.broken {
            return;
        }

        breakable.broken = true;
        if let Some(mut hurtbox) = hurtbox {
            hurtbox.enabled = false;
        }

        services.broken.write(BreakableBroken {
            entity: hit.victim,
            impact_point: hit.impact_point,
        });
        crate::log(&format!("🏺 {:?} broken", hit.victim));
    }
}

/// System: HitLanded → ReceiveHit по виду получателя
pub fn dispatch_hits(
    mut hit_events: EventReader<HitLanded>,
    receivers: Query<&HitReceiver>,
    mut enemies: EnemyHitResponse,
    mut players: PlayerHitResponse,
    mut breakables: BreakableHitResponse,
    mut services: HitServices,
) {
    for hit in hit_events.read() {
        let Ok(receiver) = receivers.get(hit.victim) else {
            continue;
        };

        let response: &mut dyn ReceiveHit = match receiver {
            HitReceiver::Enemy => &mut enemies,
            HitReceiver::Player => &mut players,
            HitReceiver::Breakable => &mut breakables,
        };
        response.receive_hit(hit, &mut services);
    }
}

/// System: hit-reaction закончилась → игрок снова свободен
pub fn handle_hit_reaction_ended(
    mut ended_events: EventReader<HitReactionEnded>,
    mut players: Query<&mut ActionState, With<Player>>,
) {
    for event in ended_events.read() {
        let Ok(mut action) = players.get_mut(event.entity) else {
            continue;
        };
        if *action == ActionState::HitReaction {
            *action = ActionState::Unoccupied;
        }
    }
}
