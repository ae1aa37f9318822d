//! Duskblade Simulation Core
//!
//! Headless ECS-симуляция ближнего боя на Bevy 0.16:
//! - enemy combat AI (патруль, погоня, атака, реакция на урон, смерть)
//! - weapon swing hit pipeline (swept trace, per-swing dedupe, урон)
//! - directional hit-reaction resolver
//!
//! Рендер, анимации, навигация и ввод живут у хоста. Симуляция общается с
//! ним через компоненты (`MovementCommand`, `Velocity`) и события
//! (`AnimationRequest`, `SwingWindow`, `AttackEnded`, ...).

use bevy::ecs::schedule::ExecutorKind;
use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod logger;
pub mod schedules;
pub mod shared;

// Re-export базовых компонентов для удобства
pub use ai::{
    enemy_bundle, AIPlugin, AnimationRequest, AttackEnded, CombatTarget, EnemyConfig, EnemyState,
    HitReactionEnded, IdlePatrolFinished, PawnSeen, PawnSensing,
};
pub use combat::{
    breakable_bundle, player_bundle, weapon_bundle, CombatPlugin, CombatantDied, DamageTaken,
    EquipWeapon, HitDirection, SwingWindow, Weapon,
};
pub use components::*;
pub use logger::*;
pub use schedules::{
    advance, CombatEventsExt, CombatSet, CombatTick, SimClock, TimerHandle, TimerService,
};

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Seed мог поставить create_headless_app — не перетираем
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .init_resource::<schedules::FixedTickCounter>()
            .init_resource::<SimClock>()
            .init_resource::<TimerService>()
            .add_combat_event::<schedules::TimerFired>()
            // Один поток: порядок систем внутри шага не зависит от планировщика
            .edit_schedule(CombatTick, |schedule| {
                schedule.set_executor_kind(ExecutorKind::SingleThreaded);
            })
            .register_type::<Allegiance>()
            .register_type::<Health>()
            .register_type::<Stamina>()
            .register_type::<MovementCommand>()
            .register_type::<ActionState>()
            .configure_sets(
                CombatTick,
                (
                    CombatSet::Timers,
                    CombatSet::Perception,
                    CombatSet::Signals,
                    CombatSet::Decide,
                    CombatSet::Strike,
                    CombatSet::React,
                    CombatSet::Cleanup,
                    CombatSet::Flush,
                )
                    .chain(),
            )
            .add_systems(
                CombatTick,
                schedules::tick_timers.in_set(CombatSet::Timers),
            )
            .add_systems(
                FixedUpdate,
                (schedules::increment_tick_counter, schedules::run_combat_tick).chain(),
            )
            // Подсистемы
            .add_plugins((CombatPlugin, AIPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Шаги делаются через `advance(app.world_mut(), delta)`; `app.update()`
/// тоже работает (FixedUpdate → CombatTick), но зависит от реального времени.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .add_plugins(SimulationPlugin);

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
