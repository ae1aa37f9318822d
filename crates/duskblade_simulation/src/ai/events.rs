//! AI Events — сигналы анимационного коллаборатора и запросы к нему
//!
//! Хост проигрывает анимации. Симуляция шлёт ему `AnimationRequest`,
//! а он возвращает сигналы о ключевых моментах (`AttackEnded` и т.д.).

use bevy::prelude::*;

use super::components::DeathPose;
use crate::combat::HitDirection;

/// Inbound: атакующая анимация доиграла
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct AttackEnded {
    pub entity: Entity,
}

/// Inbound: idle-patrol анимация доиграла (враг может идти дальше раньше таймера)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct IdlePatrolFinished {
    pub entity: Entity,
}

/// Inbound: hit-reaction анимация доиграла
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HitReactionEnded {
    pub entity: Entity,
}

/// Outbound: что проиграть (секции — имена в анимационном ассете хоста)
#[derive(Event, Debug, Clone, PartialEq)]
pub enum AnimationRequest {
    PlayAttack {
        entity: Entity,
        section: Option<String>,
    },
    StopAttack {
        entity: Entity,
    },
    PlayHitReaction {
        entity: Entity,
        direction: HitDirection,
    },
    PlayDeath {
        entity: Entity,
        pose: DeathPose,
    },
    PlayIdlePatrol {
        entity: Entity,
        section: Option<String>,
    },
    StopIdlePatrol {
        entity: Entity,
    },
}

impl AnimationRequest {
    pub fn entity(&self) -> Entity {
        match self {
            AnimationRequest::PlayAttack { entity, .. }
            | AnimationRequest::StopAttack { entity }
            | AnimationRequest::PlayHitReaction { entity, .. }
            | AnimationRequest::PlayDeath { entity, .. }
            | AnimationRequest::PlayIdlePatrol { entity, .. }
            | AnimationRequest::StopIdlePatrol { entity } => *entity,
        }
    }
}
