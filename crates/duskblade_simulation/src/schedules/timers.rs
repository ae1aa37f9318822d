//! Scheduled callback service
//!
//! Fire-once, cancellable таймеры. Колбэк — не замыкание, а `TimerAction`:
//! сработавший таймер превращается в `TimerFired` event, который обрабатывают
//! системы AI. Так сервис остаётся обычным ресурсом (детерминизм, snapshot).

use bevy::prelude::*;

/// Opaque id запланированного колбэка.
///
/// Id монотонно растут и никогда не переиспользуются, поэтому handle
/// отменённого/сработавшего таймера навсегда остаётся неактивным.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Что делать, когда таймер сработал
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum TimerAction {
    /// Конец ожидания на patrol point
    PatrolWait,
    /// Конец задержки перед атакой
    AttackDelay,
    /// Death linger истёк, entity удаляется
    Despawn,
}

/// Event: таймер сработал
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct TimerFired {
    pub handle: TimerHandle,
    pub owner: Entity,
    pub action: TimerAction,
}

#[derive(Debug, Clone, Copy)]
struct ScheduledTimer {
    handle: TimerHandle,
    owner: Entity,
    action: TimerAction,
    due: f64,
}

/// Resource: сервис отложенных колбэков
#[derive(Resource, Debug, Default)]
pub struct TimerService {
    now: f64,
    next_id: u64,
    pending: Vec<ScheduledTimer>,
}

impl TimerService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Текущее время сервиса (сумма всех advance)
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Планирует `action` для `owner` через `delay` секунд.
    ///
    /// Отрицательный или non-finite delay → срабатывает на ближайшем advance.
    pub fn schedule(&mut self, owner: Entity, delay: f32, action: TimerAction) -> TimerHandle {
        let delay = if delay.is_finite() { delay.max(0.0) } else { 0.0 };

        self.next_id += 1;
        let handle = TimerHandle(self.next_id);

        self.pending.push(ScheduledTimer {
            handle,
            owner,
            action,
            due: self.now + delay as f64,
        });

        handle
    }

    /// Отменяет таймер. `false` если он уже сработал/отменён (no-op).
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.handle != handle);
        self.pending.len() != before
    }

    /// Отменяет все таймеры entity, возвращает сколько было отменено
    pub fn cancel_all_for(&mut self, owner: Entity) -> usize {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.owner != owner);
        before - self.pending.len()
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|timer| timer.handle == handle)
    }

    /// Сколько секунд осталось до срабатывания (None для неактивного handle)
    pub fn remaining(&self, handle: TimerHandle) -> Option<f32> {
        self.pending
            .iter()
            .find(|timer| timer.handle == handle)
            .map(|timer| (timer.due - self.now).max(0.0) as f32)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Продвигает время и забирает все наступившие таймеры в порядке (due, id)
    pub fn advance(&mut self, delta: f32) -> Vec<TimerFired> {
        if delta.is_finite() && delta > 0.0 {
            self.now += delta as f64;
        }

        let now = self.now;
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|timer| timer.due <= now);
        self.pending = pending;

        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.handle.cmp(&b.handle)));

        due.into_iter()
            .map(|timer| TimerFired {
                handle: timer.handle,
                owner: timer.owner,
                action: timer.action,
            })
            .collect()
    }
}
