//! Headless симуляция Duskblade
//!
//! Небольшая сцена: два патрулирующих врага с мечами, игрок-манекен и ваза.
//! Вместо движка работает примитивный хост: двигает агентов по
//! `MovementCommand` и "проигрывает" атаки (окно удара + AttackEnded).

use bevy::prelude::*;
use duskblade_simulation::combat::Hurtbox;
use duskblade_simulation::shared::yaw_towards;
use duskblade_simulation::*;

const STEP: f32 = 1.0 / 60.0;

/// Сигнал, который хост отправит позже
enum HostSignal {
    Window { owner: Entity, open: bool },
    AttackEnded(Entity),
    HitReactionEnded(Entity),
}

#[derive(Default)]
struct AnimationHost {
    pending: Vec<(f64, HostSignal)>,
}

impl AnimationHost {
    fn consume_requests(&mut self, world: &mut World, now: f64) {
        let requests: Vec<AnimationRequest> =
            world.resource_mut::<Events<AnimationRequest>>().drain().collect();

        for request in requests {
            match request {
                AnimationRequest::PlayAttack { entity, section } => {
                    log_info(&format!("🎬 {:?} plays {:?}", entity, section));
                    self.pending.push((now + 0.3, HostSignal::Window { owner: entity, open: true }));
                    self.pending.push((now + 0.5, HostSignal::Window { owner: entity, open: false }));
                    self.pending.push((now + 0.8, HostSignal::AttackEnded(entity)));
                }
                AnimationRequest::PlayHitReaction { entity, direction } => {
                    log_info(&format!("🎬 {:?} reacts {:?}", entity, direction));
                    self.pending.push((now + 0.4, HostSignal::HitReactionEnded(entity)));
                }
                other => log(&format!("🎬 {:?}", other)),
            }
        }
    }

    fn flush_due(&mut self, world: &mut World, now: f64) {
        let (due, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|(at, _)| *at <= now);
        self.pending = pending;

        for (_, signal) in due {
            match signal {
                HostSignal::Window { owner, open } => {
                    world.send_event(SwingWindow { owner, open });
                }
                HostSignal::AttackEnded(entity) => {
                    world.send_event(AttackEnded { entity });
                }
                HostSignal::HitReactionEnded(entity) => {
                    world.send_event(HitReactionEnded { entity });
                }
            }
        }
    }
}

/// Примитивная навигация: прямо к цели с заданной скоростью
fn drive_navigation(world: &mut World, delta: f32) {
    let mut movers = world.query_filtered::<
        (Entity, &MovementCommand, &MovementSpeed),
        With<NavigationAgent>,
    >();
    let orders: Vec<(Entity, MovementCommand, f32)> = movers
        .iter(world)
        .map(|(entity, command, speed)| (entity, command.clone(), speed.speed))
        .collect();

    for (entity, command, speed) in orders {
        let goal = match command {
            MovementCommand::FollowEntity { target, acceptance_radius } => world
                .get::<Transform>(target)
                .map(|transform| (transform.translation, acceptance_radius)),
            MovementCommand::Idle | MovementCommand::Stop => None,
        };

        let mut velocity = Vec3::ZERO;
        if let (Some((goal, acceptance)), Some(mut transform)) =
            (goal, world.get_mut::<Transform>(entity))
        {
            let offset = shared::planar(goal - transform.translation);
            let distance = offset.length();
            if distance > acceptance {
                let step = (speed * delta).min(distance - acceptance);
                let direction = offset / distance;
                transform.translation += direction * step;
                transform.rotation = yaw_towards(direction);
                velocity = direction * speed;
            }
        }

        if let Some(mut reported) = world.get_mut::<Velocity>(entity) {
            reported.0 = velocity;
        }
    }
}

fn spawn_scene(world: &mut World) {
    let points: Vec<Entity> = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1200.0, 0.0, 0.0),
        Vec3::new(1200.0, 1200.0, 0.0),
    ]
    .into_iter()
    .map(|position| world.spawn(Transform::from_translation(position)).id())
    .collect();

    for (index, start) in [Vec3::new(100.0, 0.0, 0.0), Vec3::new(1100.0, 1100.0, 0.0)]
        .into_iter()
        .enumerate()
    {
        let enemy = world
            .spawn(enemy_bundle(
                Transform::from_translation(start),
                EnemyConfig::default(),
                points.clone(),
                Allegiance(1),
            ))
            .id();

        let sword = world
            .spawn(weapon_bundle(Weapon {
                mount: Transform::from_xyz(0.0, 20.0, 0.0),
                ..Default::default()
            }))
            .id();
        world.send_event(EquipWeapon { owner: enemy, weapon: sword });

        log_info(&format!("🧟 enemy #{} = {:?}, sword {:?}", index, enemy, sword));
    }

    let player = world
        .spawn(player_bundle(
            Transform::from_xyz(900.0, 300.0, 0.0),
            Allegiance(2),
        ))
        .id();
    world.spawn(breakable_bundle(Transform::from_xyz(600.0, 50.0, 0.0), 25.0));

    log_info(&format!("🧍 player dummy = {:?}", player));
}

fn main() {
    let seed = 42;
    println!("Starting Duskblade headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    set_log_level(LogLevel::Info);
    spawn_scene(app.world_mut());

    let mut host = AnimationHost::default();

    // 60 секунд симуляции
    for tick in 0..3600u32 {
        let world = app.world_mut();
        let now = tick as f64 * STEP as f64;

        host.flush_due(world, now);
        advance(world, STEP);
        host.consume_requests(world, now);
        drive_navigation(world, STEP);

        if tick % 600 == 0 {
            let mut enemies = world.query::<(Entity, &EnemyState, &Health)>();
            for (entity, state, health) in enemies.iter(world) {
                println!(
                    "Tick {}: {:?} {:?} HP {}/{}",
                    tick, entity, state, health.current, health.max
                );
            }
            let mut hurtboxes = world.query::<&Hurtbox>();
            let active = hurtboxes.iter(world).filter(|hurtbox| hurtbox.enabled).count();
            println!("Tick {}: {} active hurtboxes", tick, active);
        }
    }

    println!("Simulation complete!");
}
