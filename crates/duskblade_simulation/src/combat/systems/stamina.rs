//! Stamina management systems.

use bevy::prelude::*;

use crate::components::{Dead, Stamina};
use crate::schedules::SimClock;

/// Система: regenerate stamina живым комбатантам
///
/// Delta берётся из SimClock (шаг `advance`), а не из Time.
pub fn regenerate_stamina(mut query: Query<&mut Stamina, Without<Dead>>, clock: Res<SimClock>) {
    let delta = clock.delta;
    if delta <= 0.0 {
        return;
    }

    for mut stamina in query.iter_mut() {
        if stamina.current < stamina.max {
            stamina.regenerate(delta);
        }
    }
}
