//! Enemy FSM systems (spawn, per-tick evaluation, timer callbacks, animation signals).

use bevy::prelude::*;

use super::agent::{entity_position, EnemyAgent, EnemyAgentData};
use crate::ai::components::{Enemy, EnemyState};
use crate::ai::decision::{choose_patrol_point, random_section};
use crate::ai::events::{AnimationRequest, AttackEnded, IdlePatrolFinished};
use crate::components::{Dead, Health};
use crate::schedules::{TimerAction, TimerFired, TimerService};
use crate::shared::{in_target_range, planar_speed};
use crate::DeterministicRng;

/// System: новый враг выбирает patrol point (если не задан) и идёт к нему
pub fn start_patrol_on_spawn(
    mut agents: Query<EnemyAgentData, Added<Enemy>>,
    mut rng: ResMut<DeterministicRng>,
) {
    for item in agents.iter_mut() {
        let mut agent = EnemyAgent::new(item);

        if agent.route.current.is_none() {
            let points = agent.route.points.clone();
            agent.route.current = choose_patrol_point(&points, None, &mut rng.rng);
        }

        if agent.state() == EnemyState::Patrolling {
            let goal = agent.route.current;
            let speed = agent.config.patrolling_speed;
            agent.move_to(goal, speed);
        }

        crate::log(&format!(
            "🗡️ AI: {:?} spawned ({:?}, patrol point {:?})",
            agent.entity,
            agent.state(),
            agent.route.current
        ));
    }
}

/// System: основной тик FSM
///
/// - Chasing/Attacking/Engaged/NoState → combat-target правила
/// - Patrolling → проверка достижения patrol point
/// - IdlePatrol → idle анимация, когда враг остановился
pub fn evaluate_enemies(
    mut agents: Query<EnemyAgentData>,
    transforms: Query<&Transform>,
    mut timers: ResMut<TimerService>,
    mut rng: ResMut<DeterministicRng>,
    mut animations: EventWriter<AnimationRequest>,
) {
    for item in agents.iter_mut() {
        let mut agent = EnemyAgent::new(item);

        match agent.state() {
            EnemyState::Dead => continue,

            EnemyState::NoState
            | EnemyState::Chasing
            | EnemyState::Attacking
            | EnemyState::Engaged => {
                let target_position = entity_position(agent.target.0, &transforms);
                agent.run_combat_rules(target_position, &mut timers, &mut rng.rng);
            }

            EnemyState::Patrolling => {
                let point_position = entity_position(agent.route.current, &transforms);
                if !in_target_range(agent.position(), point_position, agent.config.patrol_radius) {
                    continue;
                }

                let points = agent.route.points.clone();
                let current = agent.route.current;
                agent.route.current = choose_patrol_point(&points, current, &mut rng.rng);
                agent.route.idle_animation_requested = false;
                agent.set_state(EnemyState::IdlePatrol);

                let wait = agent.start_patrol_wait(&mut timers, &mut rng.rng);
                crate::log(&format!(
                    "🚩 AI: {:?} reached patrol point {:?}, next {:?} in {:.2}s",
                    agent.entity, current, agent.route.current, wait
                ));
            }

            // Planar speed нужен только стоящему на точке врагу: в Patrolling
            // решает дистанция до patrol point
            EnemyState::IdlePatrol => {
                if agent.route.idle_animation_requested
                    || planar_speed(agent.velocity.0) > f32::EPSILON
                {
                    continue;
                }

                agent.route.idle_animation_requested = true;
                let section = random_section(&agent.config.idle_patrol_sections, &mut rng.rng);
                animations.write(AnimationRequest::PlayIdlePatrol {
                    entity: agent.entity,
                    section,
                });
            }
        }
    }
}

/// System: patrol wait истёк → Patrolling, идём к (новому) patrol point
pub fn on_patrol_wait_finished(
    mut fired_events: EventReader<TimerFired>,
    mut agents: Query<EnemyAgentData>,
) {
    for fired in fired_events.read() {
        if fired.action != TimerAction::PatrolWait {
            continue;
        }

        let Ok(item) = agents.get_mut(fired.owner) else {
            continue;
        };
        let mut agent = EnemyAgent::new(item);

        // Устаревший handle (заменён/отменён) — игнорируем
        if agent.timers.patrol_wait != Some(fired.handle) {
            continue;
        }
        agent.timers.patrol_wait = None;

        if matches!(agent.state(), EnemyState::IdlePatrol | EnemyState::Patrolling) {
            agent.route.idle_animation_requested = false;
            agent.start_patrolling();
        }
    }
}

/// System: attack delay истёк → атака (или сброс мёртвой/пропавшей цели)
pub fn on_attack_delay_finished(
    mut fired_events: EventReader<TimerFired>,
    mut agents: Query<EnemyAgentData>,
    transforms: Query<&Transform>,
    vitals: Query<(&Health, Has<Dead>)>,
    mut timers: ResMut<TimerService>,
    mut rng: ResMut<DeterministicRng>,
    mut animations: EventWriter<AnimationRequest>,
) {
    for fired in fired_events.read() {
        if fired.action != TimerAction::AttackDelay {
            continue;
        }

        let Ok(item) = agents.get_mut(fired.owner) else {
            continue;
        };
        let mut agent = EnemyAgent::new(item);

        if agent.timers.attack_delay != Some(fired.handle) {
            continue;
        }
        agent.timers.attack_delay = None;

        if agent.state() != EnemyState::Attacking {
            continue;
        }

        let target_alive = agent.target.0.is_some_and(|target| {
            transforms.contains(target)
                && vitals
                    .get(target)
                    .map(|(health, dead)| health.is_alive() && !dead)
                    .unwrap_or(true)
        });

        if !target_alive {
            crate::log(&format!(
                "AI: {:?} attack target {:?} gone, re-evaluating",
                agent.entity, agent.target.0
            ));
            agent.target.0 = None;
            agent.alert.visible = false;
            agent.set_state(EnemyState::NoState);
            agent.run_combat_rules(None, &mut timers, &mut rng.rng);
            continue;
        }

        agent.set_state(EnemyState::Engaged);
        let section = random_section(&agent.config.attack_sections, &mut rng.rng);
        crate::log(&format!(
            "⚔️ AI: {:?} attacks {:?} ({:?})",
            agent.entity, agent.target.0, section
        ));
        animations.write(AnimationRequest::PlayAttack {
            entity: agent.entity,
            section,
        });
    }
}

/// System: атакующая анимация закончилась → NoState → сразу combat-правила
pub fn handle_attack_ended(
    mut ended_events: EventReader<AttackEnded>,
    mut agents: Query<EnemyAgentData>,
    transforms: Query<&Transform>,
    mut timers: ResMut<TimerService>,
    mut rng: ResMut<DeterministicRng>,
) {
    for event in ended_events.read() {
        let Ok(item) = agents.get_mut(event.entity) else {
            continue;
        };
        let mut agent = EnemyAgent::new(item);

        if agent.is_dead() {
            continue;
        }

        agent.set_state(EnemyState::NoState);
        let target_position = entity_position(agent.target.0, &transforms);
        agent.run_combat_rules(target_position, &mut timers, &mut rng.rng);
    }
}

/// System: idle-patrol анимация закончилась → Patrolling раньше таймера
///
/// Wait больше не нужен: отменяем его и сразу идём к новой patrol point.
pub fn handle_idle_patrol_finished(
    mut finished_events: EventReader<IdlePatrolFinished>,
    mut agents: Query<EnemyAgentData>,
    mut timers: ResMut<TimerService>,
) {
    for event in finished_events.read() {
        let Ok(item) = agents.get_mut(event.entity) else {
            continue;
        };
        let mut agent = EnemyAgent::new(item);

        if agent.state() == EnemyState::IdlePatrol {
            agent.cancel_patrol_wait(&mut timers);
            agent.route.idle_animation_requested = false;
            agent.start_patrolling();
        }
    }
}
