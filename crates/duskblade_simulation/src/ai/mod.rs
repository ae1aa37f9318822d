//! Enemy combat AI
//!
//! Event-driven FSM: Patrolling ⇄ IdlePatrol → Chasing → Attacking → Engaged,
//! любое состояние → Dead. Решения — чистые функции в `decision`,
//! переходы — методы `EnemyAgent`, системы только связывают их с ECS.

use bevy::prelude::*;

pub mod components;
pub mod decision;
pub mod events;
pub mod perception;
pub mod systems;

// Re-export основных типов
pub use components::*;
pub use decision::{CombatDecision, DamageResponse};
pub use events::*;
pub use perception::{PawnSeen, PawnSensing};

use crate::combat::{HitReceiver, Hurtbox};
use crate::components::{Allegiance, Health, NavigationAgent};
use crate::schedules::{CombatEventsExt, CombatSet, CombatTick};

/// AI Plugin
///
/// Регистрирует AI системы в CombatTick:
/// 1. Timers: patrol wait / attack delay колбэки
/// 2. Perception: sense_pawns → handle_pawn_seen
/// 3. Signals: AttackEnded, IdlePatrolFinished
/// 4. Decide: start_patrol_on_spawn → evaluate_enemies
/// 5. React: react_to_damage (до receive-hit)
/// 6. Cleanup: despawn после death linger
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<EnemyState>()
            .register_type::<EnemyConfig>()
            .register_type::<CombatTarget>()
            .register_type::<PatrolRoute>()
            .register_type::<CombatTimers>()
            .register_type::<AlertIndicator>()
            .register_type::<PawnSensing>()
            .add_combat_event::<PawnSeen>()
            .add_combat_event::<AttackEnded>()
            .add_combat_event::<IdlePatrolFinished>()
            .add_combat_event::<HitReactionEnded>()
            .add_combat_event::<AnimationRequest>();

        app.add_systems(
            CombatTick,
            (
                (
                    systems::on_patrol_wait_finished,
                    systems::on_attack_delay_finished,
                )
                    .chain()
                    .in_set(CombatSet::Timers)
                    .after(crate::schedules::tick_timers),
                (perception::sense_pawns, perception::handle_pawn_seen)
                    .chain()
                    .in_set(CombatSet::Perception),
                (
                    systems::handle_attack_ended,
                    systems::handle_idle_patrol_finished,
                )
                    .chain()
                    .in_set(CombatSet::Signals),
                (systems::start_patrol_on_spawn, systems::evaluate_enemies)
                    .chain()
                    .in_set(CombatSet::Decide),
                systems::react_to_damage.in_set(CombatSet::React),
                systems::despawn_after_linger.in_set(CombatSet::Cleanup),
            ),
        );
    }
}

/// Всё, что нужно врагу при спавне (конфиг проходит `sanitized()`)
pub fn enemy_bundle(
    transform: Transform,
    config: EnemyConfig,
    patrol_points: Vec<Entity>,
    allegiance: Allegiance,
) -> impl Bundle {
    (
        Enemy,
        transform,
        config.sanitized(),
        PatrolRoute::new(patrol_points),
        allegiance,
        Health::new(100),
        Hurtbox::default(),
        HitReceiver::Enemy,
        NavigationAgent,
        PawnSensing::default(),
    )
}
