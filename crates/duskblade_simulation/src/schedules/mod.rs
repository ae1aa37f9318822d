//! Combat tick schedule, clock и tick counter
//!
//! # Архитектура
//!
//! **FixedUpdate (60 Hz)** → increment_tick_counter → run_combat_tick
//!   └─ advance(world, delta) → CombatTick
//!        Timers → Perception → Signals → Decide → Strike → React → Cleanup → Flush
//!
//! Тесты и хосты без FixedUpdate зовут `advance` напрямую с любым delta.

use bevy::ecs::schedule::ScheduleLabel;
use bevy::prelude::*;

pub mod timer_systems;
pub mod timers;

pub use timer_systems::*;
pub use timers::*;

/// Глобальный tick counter (детерминистичный, wraparound safe)
///
/// Инкрементируется в каждый FixedUpdate tick (60 Hz).
#[derive(Resource, Default, Debug)]
pub struct FixedTickCounter {
    pub tick: u64,
}

/// Симуляционные часы одного combat шага
///
/// Обновляются только в `advance`, системы внутри CombatTick читают их
/// вместо `Time` (шаг может идти и без FixedUpdate).
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct SimClock {
    pub tick: u64,
    pub delta: f32,
    pub elapsed: f64,
}

/// Custom schedule: один шаг боевой симуляции
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CombatTick;

/// Порядок систем внутри CombatTick (chained)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombatSet {
    /// Часы, таймеры, регенерация стамины
    Timers,
    /// Pawn sensing → PawnSeen
    Perception,
    /// Сигналы анимационного коллаборатора, equip
    Signals,
    /// Combat-target / patrol check для каждого врага
    Decide,
    /// Overlap → sweep → dedupe → damage
    Strike,
    /// Реакция на урон, receive-hit dispatch
    React,
    /// Удаление трупов после death linger
    Cleanup,
    /// Сдвиг double buffer событий (последним, после всех читателей)
    Flush,
}

/// System: один шаг жизни буфера событий
///
/// Событие живёт до конца следующего шага: читатели внутри CombatTick
/// видят его в том же шаге, хост успевает забрать между `advance`.
pub fn rotate_events<E: Event>(mut events: ResMut<Events<E>>) {
    events.update();
}

/// Регистрация событий боевой симуляции
///
/// `add_event` + ротация буфера в [`CombatSet::Flush`]. Без этого при
/// шагах через `advance` (без `App::update`) буферы растут бесконечно.
pub trait CombatEventsExt {
    fn add_combat_event<E: Event>(&mut self) -> &mut Self;
}

impl CombatEventsExt for App {
    fn add_combat_event<E: Event>(&mut self) -> &mut Self {
        self.add_event::<E>()
            .add_systems(CombatTick, rotate_events::<E>.in_set(CombatSet::Flush))
    }
}

/// Explicit simulation step.
///
/// Updates [`SimClock`] and runs [`CombatTick`] once. Negative or non-finite
/// deltas are treated as zero. Events written during the step stay readable
/// until the end of the next one.
pub fn advance(world: &mut World, delta: f32) {
    let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };

    {
        let mut clock = world.get_resource_or_insert_with(SimClock::default);
        clock.tick = clock.tick.wrapping_add(1);
        clock.delta = delta;
        clock.elapsed += delta as f64;
    }

    if let Err(error) = world.try_run_schedule(CombatTick) {
        crate::log_error(&format!("❌ CombatTick не запущен: {}", error));
    }
}
