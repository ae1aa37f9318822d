//! Combat integration tests
//!
//! Headless App + `advance`: враг патрулирует, замечает игрока, атакует,
//! получает удары и умирает. Проверяем:
//! - combat-target правила (выход из combat radius, погоня, атака)
//! - patrol point выбор и wait таймер
//! - максимум один удар на жертву за swing window
//! - отсутствие friendly fire
//! - Dead поглощающее, таймеры отменены, despawn после linger

use bevy::prelude::*;
use duskblade_simulation::ai::{AlertIndicator, CombatTimers, PatrolRoute};
use duskblade_simulation::combat::{
    BreakableBroken, EquippedWeapon, HitLanded, Hurtbox, WeaponOverlap,
};
use duskblade_simulation::schedules::{TimerAction, TimerFired};
use duskblade_simulation::*;

const STEP: f32 = 1.0 / 60.0;

fn step(app: &mut App, ticks: u32) {
    for _ in 0..ticks {
        advance(app.world_mut(), STEP);
    }
}

fn drain<E: Event>(app: &mut App) -> Vec<E> {
    app.world_mut().resource_mut::<Events<E>>().drain().collect()
}

/// Шаги с забором событий после каждого (буфер живёт только один шаг)
fn step_collecting<E: Event>(app: &mut App, ticks: u32) -> Vec<E> {
    let mut collected = Vec::new();
    for _ in 0..ticks {
        advance(app.world_mut(), STEP);
        collected.extend(drain::<E>(app));
    }
    collected
}

fn send<E: Event>(app: &mut App, event: E) {
    app.world_mut().resource_mut::<Events<E>>().send(event);
}

fn spawn_point(app: &mut App, position: Vec3) -> Entity {
    app.world_mut().spawn(Transform::from_translation(position)).id()
}

/// Враг без встроенного зрения (тест сам решает, кого он видит)
fn spawn_blind_enemy(app: &mut App, position: Vec3, points: Vec<Entity>) -> Entity {
    let enemy = app
        .world_mut()
        .spawn(enemy_bundle(
            Transform::from_translation(position),
            EnemyConfig::default(),
            points,
            Allegiance(1),
        ))
        .id();
    app.world_mut().entity_mut(enemy).remove::<PawnSensing>();
    enemy
}

fn spawn_player(app: &mut App, position: Vec3) -> Entity {
    app.world_mut()
        .spawn(player_bundle(Transform::from_translation(position), Allegiance(2)))
        .id()
}

/// Оружие сразу в руках (клинок вдоль +X от владельца, 10..90)
fn arm(app: &mut App, owner: Entity, damage: u32, auto_overlap: bool) -> Entity {
    let weapon = app
        .world_mut()
        .spawn(weapon_bundle(Weapon {
            owner: Some(owner),
            damage,
            auto_overlap,
            ..Default::default()
        }))
        .id();
    app.world_mut().entity_mut(owner).insert(EquippedWeapon(weapon));
    weapon
}

fn state(app: &App, enemy: Entity) -> EnemyState {
    *app.world().get::<EnemyState>(enemy).unwrap()
}

fn health(app: &App, entity: Entity) -> u32 {
    app.world().get::<Health>(entity).unwrap().current
}

/// Test: цель на 600 при combat radius 500 → Patrolling, цель сброшена, таймер атаки отменён
#[test]
fn test_target_outside_combat_radius_returns_to_patrol() {
    let mut app = create_headless_app(42);
    let point = spawn_point(&mut app, Vec3::new(-300.0, 0.0, 0.0));
    let enemy = spawn_blind_enemy(&mut app, Vec3::ZERO, vec![point]);
    let player = spawn_player(&mut app, Vec3::new(600.0, 0.0, 0.0));

    let handle = app
        .world_mut()
        .resource_mut::<TimerService>()
        .schedule(enemy, 5.0, TimerAction::AttackDelay);
    app.world_mut().entity_mut(enemy).insert((
        EnemyState::Attacking,
        CombatTarget(Some(player)),
        CombatTimers {
            patrol_wait: None,
            attack_delay: Some(handle),
        },
        AlertIndicator { visible: true },
    ));

    step(&mut app, 1);

    assert_eq!(state(&app, enemy), EnemyState::Patrolling);
    assert_eq!(app.world().get::<CombatTarget>(enemy).unwrap().0, None);
    assert!(!app.world().get::<AlertIndicator>(enemy).unwrap().visible);
    assert!(!app.world().resource::<TimerService>().is_active(handle));
    assert_eq!(app.world().get::<CombatTimers>(enemy).unwrap().attack_delay, None);

    assert_eq!(
        *app.world().get::<MovementCommand>(enemy).unwrap(),
        MovementCommand::FollowEntity {
            target: point,
            acceptance_radius: 15.0,
        }
    );
    assert_eq!(app.world().get::<MovementSpeed>(enemy).unwrap().speed, 125.0);
}

/// Test: patrol point достигнут (3 точки) → новая точка из двух других, wait в [9.5, 10.5]
#[test]
fn test_patrol_point_reached_picks_other_point_and_waits() {
    for seed in 0..20 {
        let mut app = create_headless_app(seed);
        let a = spawn_point(&mut app, Vec3::ZERO);
        let b = spawn_point(&mut app, Vec3::new(1000.0, 0.0, 0.0));
        let c = spawn_point(&mut app, Vec3::new(0.0, 1000.0, 0.0));
        let enemy = spawn_blind_enemy(&mut app, Vec3::new(50.0, 0.0, 0.0), vec![a, b, c]);

        step(&mut app, 1);

        assert_eq!(state(&app, enemy), EnemyState::IdlePatrol);

        let route = app.world().get::<PatrolRoute>(enemy).unwrap();
        assert!(route.current == Some(b) || route.current == Some(c), "seed {}", seed);

        let handle = app
            .world()
            .get::<CombatTimers>(enemy)
            .unwrap()
            .patrol_wait
            .expect("patrol wait scheduled");
        let remaining = app.world().resource::<TimerService>().remaining(handle).unwrap();
        assert!((9.5..=10.5).contains(&remaining), "wait = {}", remaining);
    }
}

/// Test: wait истёк → Patrolling и движение к новой точке
#[test]
fn test_patrol_wait_finishes_and_moves_on() {
    let mut app = create_headless_app(42);
    let a = spawn_point(&mut app, Vec3::ZERO);
    let b = spawn_point(&mut app, Vec3::new(1000.0, 0.0, 0.0));
    let enemy = spawn_blind_enemy(&mut app, Vec3::ZERO, vec![a, b]);

    step(&mut app, 1);
    assert_eq!(state(&app, enemy), EnemyState::IdlePatrol);

    // Стоим на месте → одна idle-patrol анимация
    let idle_requests = step_collecting::<AnimationRequest>(&mut app, 5)
        .into_iter()
        .filter(|request| matches!(request, AnimationRequest::PlayIdlePatrol { .. }))
        .count();
    assert_eq!(idle_requests, 1);

    step(&mut app, 11 * 60);

    assert_eq!(state(&app, enemy), EnemyState::Patrolling);
    assert_eq!(
        *app.world().get::<MovementCommand>(enemy).unwrap(),
        MovementCommand::FollowEntity {
            target: b,
            acceptance_radius: 15.0,
        }
    );
}

/// Test: IdlePatrolFinished возвращает в Patrolling раньше таймера
#[test]
fn test_idle_patrol_finished_signal() {
    let mut app = create_headless_app(42);
    let a = spawn_point(&mut app, Vec3::ZERO);
    let b = spawn_point(&mut app, Vec3::new(1000.0, 0.0, 0.0));
    let enemy = spawn_blind_enemy(&mut app, Vec3::ZERO, vec![a, b]);

    step(&mut app, 1);
    assert_eq!(state(&app, enemy), EnemyState::IdlePatrol);

    let wait = app
        .world()
        .get::<CombatTimers>(enemy)
        .unwrap()
        .patrol_wait
        .expect("patrol wait scheduled");

    send(&mut app, IdlePatrolFinished { entity: enemy });
    step(&mut app, 1);

    assert_eq!(state(&app, enemy), EnemyState::Patrolling);
    assert_eq!(app.world().get::<PatrolRoute>(enemy).unwrap().current, Some(b));

    // Wait отменён, враг уже идёт к новой точке
    assert!(!app.world().resource::<TimerService>().is_active(wait));
    assert_eq!(app.world().get::<CombatTimers>(enemy).unwrap().patrol_wait, None);
    assert_eq!(
        *app.world().get::<MovementCommand>(enemy).unwrap(),
        MovementCommand::FollowEntity {
            target: b,
            acceptance_radius: 15.0,
        }
    );
    assert_eq!(app.world().get::<MovementSpeed>(enemy).unwrap().speed, 125.0);

    // Никакого повторного перехода, когда истёк бы старый wait
    step(&mut app, 11 * 60);
    assert_eq!(state(&app, enemy), EnemyState::Patrolling);
    assert_eq!(app.world().resource::<TimerService>().pending_count(), 0);
}

/// Test: зрение → погоня → атака → AttackEnded → снова атака
#[test]
fn test_spot_chase_attack_cycle() {
    let mut app = create_headless_app(42);
    let enemy = app
        .world_mut()
        .spawn(enemy_bundle(
            Transform::default(),
            EnemyConfig::default(),
            Vec::new(),
            Allegiance(1),
        ))
        .id();
    let player = spawn_player(&mut app, Vec3::new(300.0, 0.0, 0.0));

    // Sensing раз в 0.5s
    let requests = step_collecting::<AnimationRequest>(&mut app, 35);

    assert_eq!(state(&app, enemy), EnemyState::Chasing);
    assert_eq!(app.world().get::<CombatTarget>(enemy).unwrap().0, Some(player));
    assert_eq!(
        *app.world().get::<MovementCommand>(enemy).unwrap(),
        MovementCommand::FollowEntity {
            target: player,
            acceptance_radius: 15.0,
        }
    );
    assert_eq!(app.world().get::<MovementSpeed>(enemy).unwrap().speed, 300.0);
    assert!(requests.contains(&AnimationRequest::StopIdlePatrol { entity: enemy }));

    // Хост "довёл" врага до игрока
    app.world_mut().get_mut::<Transform>(enemy).unwrap().translation = Vec3::new(200.0, 0.0, 0.0);
    step(&mut app, 1);
    assert_eq!(state(&app, enemy), EnemyState::Attacking);

    // Attack delay ≤ 1.0s
    let requests = step_collecting::<AnimationRequest>(&mut app, 61);
    assert_eq!(state(&app, enemy), EnemyState::Engaged);

    let attacks: Vec<_> = requests
        .into_iter()
        .filter_map(|request| match request {
            AnimationRequest::PlayAttack { entity, section } => Some((entity, section)),
            _ => None,
        })
        .collect();
    assert_eq!(attacks.len(), 1);
    assert_eq!(attacks[0].0, enemy);
    let section = attacks[0].1.clone().expect("attack section");
    assert!(EnemyConfig::default().attack_sections.contains(&section));

    send(&mut app, AttackEnded { entity: enemy });
    step(&mut app, 1);
    assert_eq!(state(&app, enemy), EnemyState::Attacking);
}

/// Test: вне combat radius враг, увидев цель, всё равно отпускает её на следующем тике
#[test]
fn test_sighting_outside_combat_radius_is_dropped() {
    let mut app = create_headless_app(42);
    let enemy = app
        .world_mut()
        .spawn(enemy_bundle(
            Transform::default(),
            EnemyConfig::default(),
            Vec::new(),
            Allegiance(1),
        ))
        .id();
    spawn_player(&mut app, Vec3::new(1500.0, 0.0, 0.0));

    step(&mut app, 40);

    assert_eq!(state(&app, enemy), EnemyState::Patrolling);
    assert_eq!(app.world().get::<CombatTarget>(enemy).unwrap().0, None);
}

/// Test: цель умерла во время attack delay → цель сброшена, Patrolling
#[test]
fn test_attack_delay_drops_dead_target() {
    let mut app = create_headless_app(42);
    let enemy = spawn_blind_enemy(&mut app, Vec3::ZERO, Vec::new());
    let player = spawn_player(&mut app, Vec3::new(100.0, 0.0, 0.0));

    app.world_mut()
        .entity_mut(enemy)
        .insert((EnemyState::Chasing, CombatTarget(Some(player))));
    step(&mut app, 1);
    assert_eq!(state(&app, enemy), EnemyState::Attacking);

    app.world_mut().get_mut::<Health>(player).unwrap().current = 0;
    let requests = step_collecting::<AnimationRequest>(&mut app, 61);

    assert_eq!(state(&app, enemy), EnemyState::Patrolling);
    assert_eq!(app.world().get::<CombatTarget>(enemy).unwrap().0, None);
    assert!(!requests
        .iter()
        .any(|request| matches!(request, AnimationRequest::PlayAttack { .. })));
}

/// Test: цель ушла за attack radius во время attack delay → погоня, таймер отменён
#[test]
fn test_target_leaving_attack_radius_cancels_attack_delay() {
    let mut app = create_headless_app(42);
    let enemy = spawn_blind_enemy(&mut app, Vec3::ZERO, Vec::new());
    let player = spawn_player(&mut app, Vec3::new(100.0, 0.0, 0.0));

    app.world_mut()
        .entity_mut(enemy)
        .insert((EnemyState::Chasing, CombatTarget(Some(player))));
    step(&mut app, 1);
    assert_eq!(state(&app, enemy), EnemyState::Attacking);
    let delay = app
        .world()
        .get::<CombatTimers>(enemy)
        .unwrap()
        .attack_delay
        .expect("attack delay scheduled");

    // 300 > attack radius 150, но внутри combat radius 500
    app.world_mut().get_mut::<Transform>(player).unwrap().translation = Vec3::new(300.0, 0.0, 0.0);
    step(&mut app, 1);

    assert_eq!(state(&app, enemy), EnemyState::Chasing);
    assert!(!app.world().resource::<TimerService>().is_active(delay));
    assert_eq!(app.world().get::<CombatTimers>(enemy).unwrap().attack_delay, None);
    assert_eq!(app.world().get::<MovementSpeed>(enemy).unwrap().speed, 300.0);
    assert_eq!(
        *app.world().get::<MovementCommand>(enemy).unwrap(),
        MovementCommand::FollowEntity {
            target: player,
            acceptance_radius: 15.0,
        }
    );
}

/// Test: занятый атакой враг не переключается на новую замеченную цель
#[test]
fn test_sighting_ignored_while_attacking_or_engaged() {
    for busy in [EnemyState::Attacking, EnemyState::Engaged] {
        let mut app = create_headless_app(42);
        let enemy = spawn_blind_enemy(&mut app, Vec3::ZERO, Vec::new());
        let player = spawn_player(&mut app, Vec3::new(100.0, 0.0, 0.0));
        let newcomer = spawn_player(&mut app, Vec3::new(0.0, 80.0, 0.0));

        app.world_mut()
            .entity_mut(enemy)
            .insert((EnemyState::Chasing, CombatTarget(Some(player))));
        step(&mut app, 1);
        assert_eq!(state(&app, enemy), EnemyState::Attacking);
        app.world_mut().entity_mut(enemy).insert(busy);

        send(&mut app, PawnSeen { observer: enemy, seen: newcomer });
        step(&mut app, 1);

        assert_eq!(state(&app, enemy), busy, "{:?}", busy);
        assert_eq!(
            app.world().get::<CombatTarget>(enemy).unwrap().0,
            Some(player),
            "{:?}",
            busy
        );
    }
}

/// Test: за долгую симуляцию буферы событий не растут
#[test]
fn test_event_buffers_stay_bounded() {
    let mut app = create_headless_app(42);
    let a = spawn_point(&mut app, Vec3::ZERO);
    let b = spawn_point(&mut app, Vec3::new(40.0, 0.0, 0.0));
    app.world_mut().spawn(enemy_bundle(
        Transform::default(),
        EnemyConfig::default(),
        vec![a, b],
        Allegiance(1),
    ));
    // Виден, но вне combat radius: PawnSeen каждые 0.5s, цель сразу сбрасывается
    spawn_player(&mut app, Vec3::new(1500.0, 0.0, 0.0));

    step(&mut app, 6000);

    let world = app.world();
    // Без ротации здесь были бы сотни PawnSeen
    assert!(world.resource::<Events<PawnSeen>>().len() <= 1);
    assert!(world.resource::<Events<AnimationRequest>>().len() <= 4);
    assert!(world.resource::<Events<TimerFired>>().len() <= 2);
    assert!(world.resource::<Events<DamageTaken>>().is_empty());
}

/// Test: три overlap подряд в одном окне → ровно один урон, жертва в ignore set;
/// после закрытия/открытия окна — снова урон
#[test]
fn test_one_hit_per_victim_per_swing() {
    let mut app = create_headless_app(42);
    let attacker = spawn_player(&mut app, Vec3::ZERO);
    let weapon = arm(&mut app, attacker, 20, false);
    let victim = spawn_blind_enemy(&mut app, Vec3::new(60.0, 0.0, 0.0), Vec::new());

    send(&mut app, SwingWindow { owner: attacker, open: true });
    step(&mut app, 1);
    drain::<DamageTaken>(&mut app);

    for _ in 0..3 {
        send(&mut app, WeaponOverlap { weapon, other: victim });
    }
    step(&mut app, 1);

    let damage = drain::<DamageTaken>(&mut app);
    assert_eq!(damage.len(), 1);
    assert_eq!(damage[0].victim, victim);
    assert_eq!(damage[0].source, attacker);
    assert_eq!(health(&app, victim), 80);
    assert!(app.world().get::<Weapon>(weapon).unwrap().has_struck(victim));

    // Ещё overlap в том же окне — ничего
    send(&mut app, WeaponOverlap { weapon, other: victim });
    step(&mut app, 1);
    assert_eq!(health(&app, victim), 80);

    // Окно закрылось — ignore set пуст
    send(&mut app, SwingWindow { owner: attacker, open: false });
    step(&mut app, 1);
    assert!(app.world().get::<Weapon>(weapon).unwrap().ignore.is_empty());

    // Overlap при закрытом окне игнорируется
    send(&mut app, WeaponOverlap { weapon, other: victim });
    step(&mut app, 1);
    assert_eq!(health(&app, victim), 80);

    send(&mut app, SwingWindow { owner: attacker, open: true });
    send(&mut app, WeaponOverlap { weapon, other: victim });
    step(&mut app, 1);
    assert_eq!(health(&app, victim), 60);
}

/// Test: встроенный broad-phase — окно открыто много тиков, урон один
#[test]
fn test_auto_overlap_hits_once_per_window() {
    let mut app = create_headless_app(42);
    let attacker = spawn_player(&mut app, Vec3::ZERO);
    arm(&mut app, attacker, 15, true);
    let victim = spawn_blind_enemy(&mut app, Vec3::new(60.0, 0.0, 0.0), Vec::new());

    send(&mut app, SwingWindow { owner: attacker, open: true });
    let hits = step_collecting::<HitLanded>(&mut app, 20);

    assert_eq!(health(&app, victim), 85);
    assert_eq!(hits.len(), 1);
}

/// Test: союзники не ранят друг друга ни напрямую, ни через trace
#[test]
fn test_no_friendly_fire() {
    let mut app = create_headless_app(42);
    let attacker = spawn_blind_enemy(&mut app, Vec3::ZERO, Vec::new());
    let weapon = arm(&mut app, attacker, 20, false);

    // Союзник стоит на клинке ближе, чужой — дальше
    let ally = spawn_blind_enemy(&mut app, Vec3::new(30.0, 0.0, 0.0), Vec::new());
    let foe = spawn_player(&mut app, Vec3::new(90.0, 0.0, 0.0));

    app.world_mut().get_mut::<Weapon>(weapon).unwrap().open_window();

    // Overlap с союзником → игнор на шаге 1
    send(&mut app, WeaponOverlap { weapon, other: ally });
    let mut damage = step_collecting::<DamageTaken>(&mut app, 1);
    assert_eq!(health(&app, ally), 100);

    // Overlap с чужим, но trace первым находит союзника → игнор на шаге 4
    send(&mut app, WeaponOverlap { weapon, other: foe });
    damage.extend(step_collecting::<DamageTaken>(&mut app, 1));
    assert_eq!(health(&app, ally), 100);
    assert_eq!(health(&app, foe), 100);
    assert!(damage.is_empty());
}

/// Test: урон → цель = атакующий, Attacking; alert показан, hit reaction по направлению
#[test]
fn test_damage_makes_enemy_retaliate() {
    let mut app = create_headless_app(42);
    let point = spawn_point(&mut app, Vec3::new(0.0, 2000.0, 0.0));
    let attacker = spawn_player(&mut app, Vec3::ZERO);
    let weapon = arm(&mut app, attacker, 10, false);
    let enemy = spawn_blind_enemy(&mut app, Vec3::new(60.0, 0.0, 0.0), vec![point]);

    step(&mut app, 1);
    drain::<AnimationRequest>(&mut app);

    send(&mut app, SwingWindow { owner: attacker, open: true });
    send(&mut app, WeaponOverlap { weapon, other: enemy });
    step(&mut app, 1);

    assert_eq!(health(&app, enemy), 90);
    assert_eq!(state(&app, enemy), EnemyState::Attacking);
    assert_eq!(app.world().get::<CombatTarget>(enemy).unwrap().0, Some(attacker));
    assert!(app.world().get::<AlertIndicator>(enemy).unwrap().visible);
    assert!(app.world().get::<CombatTimers>(enemy).unwrap().attack_delay.is_some());

    // Враг смотрит в +X, удар пришёл с -X стороны → Back
    let reactions: Vec<_> = drain::<AnimationRequest>(&mut app)
        .into_iter()
        .filter_map(|request| match request {
            AnimationRequest::PlayHitReaction { entity, direction } => Some((entity, direction)),
            _ => None,
        })
        .collect();
    assert_eq!(reactions, vec![(enemy, HitDirection::Back)]);
}

/// Test: удар по Engaged врагу прерывает его атаку
#[test]
fn test_damage_interrupts_engaged_attack() {
    let mut app = create_headless_app(42);
    let attacker = spawn_player(&mut app, Vec3::ZERO);
    let weapon = arm(&mut app, attacker, 10, false);
    let enemy = spawn_blind_enemy(&mut app, Vec3::new(60.0, 0.0, 0.0), Vec::new());
    let enemy_weapon = arm(&mut app, enemy, 10, false);

    app.world_mut()
        .entity_mut(enemy)
        .insert((EnemyState::Engaged, CombatTarget(Some(attacker))));
    app.world_mut().get_mut::<Weapon>(enemy_weapon).unwrap().open_window();
    app.world_mut().get_mut::<Weapon>(weapon).unwrap().open_window();

    send(&mut app, WeaponOverlap { weapon, other: enemy });
    step(&mut app, 1);

    assert_eq!(state(&app, enemy), EnemyState::Attacking);
    assert!(!app.world().get::<Weapon>(enemy_weapon).unwrap().collision_enabled);
    assert!(drain::<AnimationRequest>(&mut app)
        .contains(&AnimationRequest::StopAttack { entity: enemy }));
}

/// Test: смерть поглощающая, таймеры отменены, despawn после linger
#[test]
fn test_dead_is_terminal() {
    let mut app = create_headless_app(42);
    let a = spawn_point(&mut app, Vec3::new(0.0, 2000.0, 0.0));
    let attacker = spawn_player(&mut app, Vec3::ZERO);
    let weapon = arm(&mut app, attacker, 20, false);
    let enemy = spawn_blind_enemy(&mut app, Vec3::new(60.0, 0.0, 0.0), vec![a]);
    let enemy_weapon = arm(&mut app, enemy, 10, false);

    // Враг ждёт удар с таймером
    app.world_mut()
        .entity_mut(enemy)
        .insert((EnemyState::Chasing, CombatTarget(Some(attacker))));
    step(&mut app, 1);
    assert_eq!(state(&app, enemy), EnemyState::Attacking);
    let pending = app.world().get::<CombatTimers>(enemy).unwrap().attack_delay.unwrap();

    app.world_mut().get_mut::<Health>(enemy).unwrap().current = 15;
    app.world_mut().get_mut::<Weapon>(weapon).unwrap().open_window();
    send(&mut app, WeaponOverlap { weapon, other: enemy });
    step(&mut app, 1);

    assert_eq!(health(&app, enemy), 0);
    assert_eq!(state(&app, enemy), EnemyState::Dead);
    assert!(app.world().get::<Dead>(enemy).is_some());
    assert!(!app.world().get::<Hurtbox>(enemy).unwrap().enabled);
    assert_eq!(app.world().get::<CombatTarget>(enemy).unwrap().0, None);
    assert_eq!(*app.world().get::<MovementCommand>(enemy).unwrap(), MovementCommand::Stop);
    assert!(app.world().get::<EquippedWeapon>(enemy).is_none());
    assert!(app.world().get_entity(enemy_weapon).is_err());

    let timers = app.world().resource::<TimerService>();
    assert!(!timers.is_active(pending));
    assert_eq!(app.world().get::<CombatTimers>(enemy).unwrap(), &CombatTimers::default());

    let deaths = drain::<CombatantDied>(&mut app);
    assert_eq!(deaths.len(), 1);
    assert_eq!(deaths[0].entity, enemy);
    assert_eq!(deaths[0].killer, Some(attacker));

    // Никакие сигналы не выводят из Dead
    send(&mut app, AttackEnded { entity: enemy });
    send(&mut app, IdlePatrolFinished { entity: enemy });
    send(&mut app, PawnSeen { observer: enemy, seen: attacker });
    step(&mut app, 1);
    assert_eq!(state(&app, enemy), EnemyState::Dead);

    // Death linger 3s
    step(&mut app, 3 * 60 + 2);
    assert!(app.world().get_entity(enemy).is_err());
}

/// Test: игрок реагирует по позиции атакующего и освобождается по HitReactionEnded
#[test]
fn test_player_hit_reaction_and_death() {
    let mut app = create_headless_app(42);
    let player = spawn_player(&mut app, Vec3::ZERO);
    let enemy = spawn_blind_enemy(&mut app, Vec3::new(0.0, 60.0, 0.0), Vec::new());
    let weapon = arm(&mut app, enemy, 60, false);

    // Клинок врага вдоль -Y, прямо через игрока
    app.world_mut().get_mut::<Transform>(enemy).unwrap().rotation =
        Quat::from_rotation_z(-std::f32::consts::FRAC_PI_2);

    send(&mut app, SwingWindow { owner: enemy, open: true });
    send(&mut app, WeaponOverlap { weapon, other: player });
    step(&mut app, 1);

    assert_eq!(health(&app, player), 40);
    assert_eq!(*app.world().get::<ActionState>(player).unwrap(), ActionState::HitReaction);
    assert!(drain::<AnimationRequest>(&mut app).contains(&AnimationRequest::PlayHitReaction {
        entity: player,
        direction: HitDirection::Right,
    }));

    send(&mut app, HitReactionEnded { entity: player });
    step(&mut app, 1);
    assert_eq!(*app.world().get::<ActionState>(player).unwrap(), ActionState::Unoccupied);

    // Второе окно — смертельный удар
    send(&mut app, SwingWindow { owner: enemy, open: false });
    step(&mut app, 1);
    send(&mut app, SwingWindow { owner: enemy, open: true });
    send(&mut app, WeaponOverlap { weapon, other: player });
    step(&mut app, 1);

    assert_eq!(health(&app, player), 0);
    assert_eq!(*app.world().get::<ActionState>(player).unwrap(), ActionState::Dead);
    assert!(app.world().get::<Dead>(player).is_some());
    assert_eq!(drain::<CombatantDied>(&mut app).len(), 1);
}

/// Test: разрушаемый объект ломается один раз
#[test]
fn test_breakable_breaks_once() {
    let mut app = create_headless_app(42);
    let attacker = spawn_player(&mut app, Vec3::ZERO);
    let weapon = arm(&mut app, attacker, 20, false);
    let vase = app
        .world_mut()
        .spawn(breakable_bundle(Transform::from_xyz(50.0, 0.0, 0.0), 20.0))
        .id();

    send(&mut app, SwingWindow { owner: attacker, open: true });
    send(&mut app, WeaponOverlap { weapon, other: vase });
    step(&mut app, 1);

    let broken = drain::<BreakableBroken>(&mut app);
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].entity, vase);
    assert!(app.world().get::<duskblade_simulation::combat::Breakable>(vase).unwrap().broken);
    assert!(!app.world().get::<Hurtbox>(vase).unwrap().enabled);

    // Hurtbox выключен — второй удар не находит цель
    send(&mut app, SwingWindow { owner: attacker, open: false });
    send(&mut app, SwingWindow { owner: attacker, open: true });
    send(&mut app, WeaponOverlap { weapon, other: vase });
    step(&mut app, 1);
    assert!(drain::<BreakableBroken>(&mut app).is_empty());
}

/// Test: EquipWeapon передаёт владение
#[test]
fn test_equip_transfers_ownership() {
    let mut app = create_headless_app(42);
    let first = spawn_player(&mut app, Vec3::ZERO);
    let second = spawn_blind_enemy(&mut app, Vec3::new(500.0, 0.0, 0.0), Vec::new());
    let sword = app.world_mut().spawn(weapon_bundle(Weapon::default())).id();

    send(&mut app, EquipWeapon { owner: first, weapon: sword });
    step(&mut app, 1);
    assert_eq!(app.world().get::<EquippedWeapon>(first), Some(&EquippedWeapon(sword)));

    app.world_mut().get_mut::<Weapon>(sword).unwrap().open_window();
    send(&mut app, EquipWeapon { owner: second, weapon: sword });
    step(&mut app, 1);

    let weapon = app.world().get::<Weapon>(sword).unwrap();
    assert_eq!(weapon.owner, Some(second));
    assert!(!weapon.collision_enabled);
    assert!(app.world().get::<EquippedWeapon>(first).is_none());
    assert_eq!(app.world().get::<EquippedWeapon>(second), Some(&EquippedWeapon(sword)));

    // Оружие следует за новым владельцем
    let transform = app.world().get::<Transform>(sword).unwrap();
    assert_eq!(transform.translation, Vec3::new(500.0, 0.0, 0.0));
}
