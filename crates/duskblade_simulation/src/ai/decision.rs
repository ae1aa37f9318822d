//! Чистые решения enemy FSM (без ECS доступа)
//!
//! Системы собирают позиции/состояние, зовут эти функции и применяют результат.
//! Так все правила приоритета тестируются без App.

use bevy::prelude::*;
use rand::Rng;

use super::components::{EnemyConfig, EnemyState};
use crate::shared::in_target_range;

/// Итог combat-target проверки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatDecision {
    /// Цель вне combat radius или отсутствует
    LoseInterest,
    /// Цель вне attack radius, враг ещё не преследует
    Chase,
    /// Цель в attack radius, можно запускать attack delay
    StartAttack,
    /// Ничего не менять
    Hold,
}

/// Combat-target правила в порядке приоритета
pub fn decide_combat(
    state: EnemyState,
    origin: Vec3,
    target: Option<Vec3>,
    config: &EnemyConfig,
) -> CombatDecision {
    if !in_target_range(origin, target, config.combat_radius) {
        return CombatDecision::LoseInterest;
    }

    let in_attack_range = in_target_range(origin, target, config.attack_radius);

    if !in_attack_range && state != EnemyState::Chasing {
        return CombatDecision::Chase;
    }

    if in_attack_range && can_start_attack(state) {
        return CombatDecision::StartAttack;
    }

    CombatDecision::Hold
}

/// Можно ли запускать attack delay из этого состояния
pub fn can_start_attack(state: EnemyState) -> bool {
    !matches!(
        state,
        EnemyState::Attacking | EnemyState::Engaged | EnemyState::Dead
    )
}

/// Принимает ли враг PawnSeen (начинает погоню)
pub fn accepts_sighting(state: EnemyState) -> bool {
    !(state == EnemyState::Dead || state == EnemyState::Chasing || state >= EnemyState::Attacking)
}

/// Реакция на полученный урон
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageResponse {
    /// Атакующий в attack radius → Attacking
    Attack,
    /// Иначе → Chasing
    Chase,
    /// Мёртвым всё равно
    Ignore,
}

pub fn damage_response(
    state: EnemyState,
    origin: Vec3,
    attacker: Option<Vec3>,
    config: &EnemyConfig,
) -> DamageResponse {
    if state.is_dead() {
        return DamageResponse::Ignore;
    }

    if in_target_range(origin, attacker, config.attack_radius) {
        DamageResponse::Attack
    } else {
        DamageResponse::Chase
    }
}

/// Выбирает следующий patrol point: равномерно среди всех, КРОМЕ текущего.
///
/// Один-единственный point остаётся текущим, пустой набор → `None`.
pub fn choose_patrol_point<R: Rng + ?Sized>(
    points: &[Entity],
    current: Option<Entity>,
    rng: &mut R,
) -> Option<Entity> {
    let candidates: Vec<Entity> = points
        .iter()
        .copied()
        .filter(|point| Some(*point) != current)
        .collect();

    if candidates.is_empty() {
        return current.filter(|point| points.contains(point));
    }

    Some(candidates[rng.gen_range(0..candidates.len())])
}

/// Случайная анимационная секция (None для пустого списка)
pub fn random_section<R: Rng + ?Sized>(sections: &[String], rng: &mut R) -> Option<String> {
    if sections.is_empty() {
        return None;
    }
    Some(sections[rng.gen_range(0..sections.len())].clone())
}
