//! Timer systems: FixedUpdate драйвер CombatTick и продвижение TimerService

use bevy::prelude::*;

use super::{advance, FixedTickCounter, SimClock, TimerFired, TimerService};

/// System: Increment tick counter (FixedUpdate, запускается ПЕРВЫМ)
pub fn increment_tick_counter(mut counter: ResMut<FixedTickCounter>) {
    counter.tick = counter.tick.wrapping_add(1); // Wraparound safe
}

/// System: Run CombatTick каждый FixedUpdate tick
///
/// Exclusive system (требует &mut World для run_schedule).
pub fn run_combat_tick(world: &mut World) {
    let delta = world.resource::<Time<Fixed>>().delta_secs();
    advance(world, delta);
}

/// System: продвигает TimerService на delta шага и публикует сработавшие таймеры
///
/// Порядок событий: (due time, handle id).
pub fn tick_timers(
    clock: Res<SimClock>,
    mut timers: ResMut<TimerService>,
    mut fired_events: EventWriter<TimerFired>,
) {
    for fired in timers.advance(clock.delta) {
        fired_events.write(fired);
    }
}
