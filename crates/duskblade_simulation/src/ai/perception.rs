//! Perception: pawn sensing (зрение врага) и реакция на PawnSeen
//!
//! `sense_pawns` — встроенный источник: раз в `sensing_interval` проверяет
//! дистанцию и угол обзора до всех `EngageableTarget`. Хост со своим
//! зрением (raycast, vision cone) может писать `PawnSeen` напрямую.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::decision::accepts_sighting;
use super::events::AnimationRequest;
use super::systems::agent::{EnemyAgent, EnemyAgentData};
use crate::components::{Dead, EngageableTarget, Health};
use crate::schedules::{SimClock, TimerService};
use crate::shared::{facing, planar};

/// Event: наблюдатель увидел entity (обрабатывается в том же тике)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PawnSeen {
    pub observer: Entity,
    pub seen: Entity,
}

/// Зрение врага
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct PawnSensing {
    pub sight_radius: f32,
    /// Половина угла обзора (градусы)
    pub peripheral_vision_angle: f32,
    /// Как часто проверять (секунды)
    pub sensing_interval: f32,
    #[serde(skip)]
    pub since_last_sense: f32,
}

impl Default for PawnSensing {
    fn default() -> Self {
        Self {
            sight_radius: 4000.0,
            peripheral_vision_angle: 45.0,
            sensing_interval: 0.5,
            since_last_sense: 0.0,
        }
    }
}

impl PawnSensing {
    /// Видит ли наблюдатель точку `target` (дистанция + угол в горизонтальной плоскости)
    pub fn can_see(&self, observer: &Transform, target: Vec3) -> bool {
        let offset = target - observer.translation;
        if offset.length() > self.sight_radius {
            return false;
        }

        let flat = planar(offset);
        if flat.length_squared() <= f32::EPSILON {
            // Прямо над/под наблюдателем
            return true;
        }

        let forward = planar(facing(observer)).normalize_or_zero();
        let cos_angle = forward.dot(flat.normalize()).clamp(-1.0, 1.0);
        cos_angle.acos().to_degrees() <= self.peripheral_vision_angle
    }
}

/// System: встроенный pawn sensing → PawnSeen
pub fn sense_pawns(
    clock: Res<SimClock>,
    mut observers: Query<(Entity, &Transform, &mut PawnSensing), Without<Dead>>,
    targets: Query<(Entity, &Transform, Option<&Health>), (With<EngageableTarget>, Without<Dead>)>,
    mut seen_events: EventWriter<PawnSeen>,
) {
    for (observer, transform, mut sensing) in observers.iter_mut() {
        sensing.since_last_sense += clock.delta;
        if sensing.since_last_sense < sensing.sensing_interval {
            continue;
        }
        sensing.since_last_sense = 0.0;

        for (seen, target_transform, health) in targets.iter() {
            if seen == observer || health.is_some_and(|health| !health.is_alive()) {
                continue;
            }

            if sensing.can_see(transform, target_transform.translation) {
                seen_events.write(PawnSeen { observer, seen });
            }
        }
    }
}

/// System: PawnSeen → погоня
///
/// Враг реагирует только на живой EngageableTarget и только из спокойного
/// состояния (не Dead, не Chasing, не Attacking/Engaged).
pub fn handle_pawn_seen(
    mut seen_events: EventReader<PawnSeen>,
    mut agents: Query<EnemyAgentData>,
    targets: Query<(Option<&Health>, Has<Dead>), With<EngageableTarget>>,
    mut timers: ResMut<TimerService>,
    mut animations: EventWriter<AnimationRequest>,
) {
    for event in seen_events.read() {
        let Ok((health, dead)) = targets.get(event.seen) else {
            continue;
        };
        if dead || health.is_some_and(|health| !health.is_alive()) {
            continue;
        }

        let Ok(item) = agents.get_mut(event.observer) else {
            continue;
        };
        let mut agent = EnemyAgent::new(item);

        if !accepts_sighting(agent.state()) {
            continue;
        }

        agent.cancel_patrol_wait(&mut timers);
        agent.target.0 = Some(event.seen);
        agent.route.idle_animation_requested = false;
        agent.chase();

        crate::log(&format!(
            "👁️ AI: {:?} spotted {:?} → chasing",
            agent.entity, event.seen
        ));

        animations.write(AnimationRequest::StopIdlePatrol {
            entity: agent.entity,
        });
    }
}
