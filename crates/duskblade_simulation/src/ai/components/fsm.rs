//! Enemy FSM components (state, config, target, patrol route, timers).

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::{Health, MovementCommand, MovementSpeed, Stamina, Velocity};
use crate::schedules::TimerHandle;

/// Marker: враг под управлением combat AI
///
/// Автоматически добавляет state/config/target/timers через Required Components.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(
    EnemyState,
    EnemyConfig,
    CombatTarget,
    CombatTimers,
    AlertIndicator,
    PatrolRoute,
    Health,
    Stamina,
    MovementCommand,
    MovementSpeed,
    Velocity
)]
pub struct Enemy;

/// Поведенческое состояние врага
///
/// Порядок объявления = порядок "тяжести" (derive Ord), проверки вида
/// `state >= Attacking` на нём и держатся.
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Reflect,
)]
#[reflect(Component)]
pub enum EnemyState {
    /// Транзитное: атака закончилась, правила ещё не переоценены
    NoState,
    /// Поглощающее состояние
    Dead,
    /// Стоит на patrol point, ждёт таймер
    IdlePatrol,
    #[default]
    Patrolling,
    Chasing,
    Attacking,
    Engaged,
}

impl EnemyState {
    pub fn is_dead(&self) -> bool {
        matches!(self, EnemyState::Dead)
    }

    /// Состояния, в которых у врага может быть combat target
    pub fn is_engaging(&self) -> bool {
        *self > EnemyState::Patrolling
    }
}

/// Равномерный диапазон задержки (секунды)
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct DelayRange {
    pub min: f32,
    pub max: f32,
}

impl DelayRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Uniform sample in `[min, max]`
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Параметры врага (радиусы, задержки, скорости, анимационные секции)
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct EnemyConfig {
    /// Дальше этого радиуса враг теряет интерес к цели
    pub combat_radius: f32,
    /// Внутри этого радиуса враг атакует
    pub attack_radius: f32,
    /// Patrol point считается достигнутым внутри этого радиуса
    pub patrol_radius: f32,
    pub patrol_wait: DelayRange,
    pub attack_delay: DelayRange,
    pub patrolling_speed: f32,
    pub chasing_speed: f32,
    /// Acceptance radius навигационного запроса
    pub acceptance_radius: f32,
    /// Сколько секунд труп лежит до despawn
    pub death_linger: f32,
    /// Дистанция до цели для translation motion-warp
    pub warp_target_distance: f32,
    pub attack_sections: Vec<String>,
    pub idle_patrol_sections: Vec<String>,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            combat_radius: 500.0,
            attack_radius: 150.0,
            patrol_radius: 200.0,
            patrol_wait: DelayRange::new(9.5, 10.5),
            attack_delay: DelayRange::new(0.5, 1.0),
            patrolling_speed: 125.0,
            chasing_speed: 300.0,
            acceptance_radius: 15.0,
            death_linger: 3.0,
            warp_target_distance: 75.0,
            attack_sections: vec!["Attack1".into(), "Attack2".into()],
            idle_patrol_sections: vec!["Patrol1".into(), "Patrol2".into(), "Patrol3".into()],
        }
    }
}

impl EnemyConfig {
    /// Чинит невалидный конфиг: min > max меняются местами, отрицательные
    /// радиусы/длительности/скорости обнуляются. Каждая починка логируется.
    pub fn sanitized(mut self) -> Self {
        fn clamp_non_negative(name: &str, value: &mut f32) {
            if !value.is_finite() || *value < 0.0 {
                crate::log_warning(&format!(
                    "⚠️ EnemyConfig: {} = {} → 0.0",
                    name, value
                ));
                *value = 0.0;
            }
        }

        fn fix_range(name: &str, range: &mut DelayRange) {
            clamp_non_negative(&format!("{}.min", name), &mut range.min);
            clamp_non_negative(&format!("{}.max", name), &mut range.max);
            if range.min > range.max {
                crate::log_warning(&format!(
                    "⚠️ EnemyConfig: {} inverted [{}, {}] → swapped",
                    name, range.min, range.max
                ));
                std::mem::swap(&mut range.min, &mut range.max);
            }
        }

        clamp_non_negative("combat_radius", &mut self.combat_radius);
        clamp_non_negative("attack_radius", &mut self.attack_radius);
        clamp_non_negative("patrol_radius", &mut self.patrol_radius);
        clamp_non_negative("patrolling_speed", &mut self.patrolling_speed);
        clamp_non_negative("chasing_speed", &mut self.chasing_speed);
        clamp_non_negative("acceptance_radius", &mut self.acceptance_radius);
        clamp_non_negative("death_linger", &mut self.death_linger);
        clamp_non_negative("warp_target_distance", &mut self.warp_target_distance);
        fix_range("patrol_wait", &mut self.patrol_wait);
        fix_range("attack_delay", &mut self.attack_delay);

        self
    }
}

/// Слабая ссылка на текущую цель (entity может быть уже despawned)
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub struct CombatTarget(pub Option<Entity>);

/// Упорядоченный набор patrol points + текущий
#[derive(Component, Debug, Clone, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub struct PatrolRoute {
    pub points: Vec<Entity>,
    pub current: Option<Entity>,
    /// Idle-patrol анимация уже запрошена в этом периоде ожидания
    pub idle_animation_requested: bool,
}

impl PatrolRoute {
    pub fn new(points: Vec<Entity>) -> Self {
        let current = points.first().copied();
        Self {
            points,
            current,
            idle_animation_requested: false,
        }
    }
}

/// Активные handles таймеров врага (максимум по одному каждого вида)
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub struct CombatTimers {
    pub patrol_wait: Option<TimerHandle>,
    pub attack_delay: Option<TimerHandle>,
}

/// Индикатор тревоги над головой (HUD хоста читает `visible`)
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub struct AlertIndicator {
    pub visible: bool,
}

/// Поза смерти (секция death-анимации)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
#[reflect(Component)]
pub enum DeathPose {
    Death1,
    Death2,
    Death3,
    Death4,
    Death5,
    Death6,
}

impl DeathPose {
    pub const ALL: [DeathPose; 6] = [
        DeathPose::Death1,
        DeathPose::Death2,
        DeathPose::Death3,
        DeathPose::Death4,
        DeathPose::Death5,
        DeathPose::Death6,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn section_name(&self) -> &'static str {
        match self {
            DeathPose::Death1 => "Death1",
            DeathPose::Death2 => "Death2",
            DeathPose::Death3 => "Death3",
            DeathPose::Death4 => "Death4",
            DeathPose::Death5 => "Death5",
            DeathPose::Death6 => "Death6",
        }
    }
}
