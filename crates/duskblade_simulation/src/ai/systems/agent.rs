//! EnemyAgent — изменяемый вид на одного врага внутри системы
//!
//! Собирает компоненты FSM в одну структуру, чтобы переходы
//! (погоня, атака, патруль, смерть) писались один раз и переиспользовались
//! всеми системами, которые их запускают.

use bevy::ecs::query::QueryItem;
use bevy::prelude::*;
use rand::Rng;

use crate::ai::components::{
    AlertIndicator, CombatTarget, CombatTimers, DeathPose, EnemyConfig, EnemyState, PatrolRoute,
};
use crate::ai::decision::{decide_combat, CombatDecision};
use crate::components::{MovementCommand, MovementSpeed, NavigationAgent, Velocity};
use crate::schedules::{TimerAction, TimerService};

/// Query data одного врага (используется как `Query<EnemyAgentData>`)
pub type EnemyAgentData = (
    Entity,
    &'static mut EnemyState,
    &'static mut CombatTarget,
    &'static mut CombatTimers,
    &'static mut AlertIndicator,
    &'static mut PatrolRoute,
    &'static mut MovementCommand,
    &'static mut MovementSpeed,
    &'static EnemyConfig,
    &'static Transform,
    &'static Velocity,
    Has<NavigationAgent>,
);

pub struct EnemyAgent<'w> {
    pub entity: Entity,
    pub state: Mut<'w, EnemyState>,
    pub target: Mut<'w, CombatTarget>,
    pub timers: Mut<'w, CombatTimers>,
    pub alert: Mut<'w, AlertIndicator>,
    pub route: Mut<'w, PatrolRoute>,
    pub command: Mut<'w, MovementCommand>,
    pub speed: Mut<'w, MovementSpeed>,
    pub config: &'w EnemyConfig,
    pub transform: &'w Transform,
    pub velocity: &'w Velocity,
    pub has_navigation: bool,
}

impl<'w> EnemyAgent<'w> {
    pub fn new(item: QueryItem<'w, EnemyAgentData>) -> Self {
        let (
            entity,
            state,
            target,
            timers,
            alert,
            route,
            command,
            speed,
            config,
            transform,
            velocity,
            has_navigation,
        ) = item;

        Self {
            entity,
            state,
            target,
            timers,
            alert,
            route,
            command,
            speed,
            config,
            transform,
            velocity,
            has_navigation,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.transform.translation
    }

    pub fn state(&self) -> EnemyState {
        *self.state
    }

    pub fn is_dead(&self) -> bool {
        self.state.is_dead()
    }

    pub fn set_state(&mut self, next: EnemyState) {
        let previous = *self.state;
        if previous == next {
            return;
        }
        // Dead — поглощающее состояние
        if previous.is_dead() {
            crate::log_warning(&format!(
                "⚠️ AI: {:?} Dead → {:?} rejected",
                self.entity, next
            ));
            return;
        }

        *self.state = next;
        crate::log(&format!("AI: {:?} {:?} → {:?}", self.entity, previous, next));
    }

    /// Навигационный запрос. Без NavigationAgent или без цели — тихий no-op.
    pub fn move_to(&mut self, goal: Option<Entity>, speed: f32) {
        let Some(goal) = goal else {
            return;
        };
        if !self.has_navigation {
            return;
        }

        self.speed.speed = speed;
        *self.command = MovementCommand::FollowEntity {
            target: goal,
            acceptance_radius: self.config.acceptance_radius,
        };
    }

    pub fn stop(&mut self) {
        *self.command = MovementCommand::Stop;
    }

    pub fn cancel_attack_delay(&mut self, timers: &mut TimerService) {
        if let Some(handle) = self.timers.attack_delay.take() {
            timers.cancel(handle);
        }
    }

    pub fn cancel_patrol_wait(&mut self, timers: &mut TimerService) {
        if let Some(handle) = self.timers.patrol_wait.take() {
            timers.cancel(handle);
        }
    }

    /// Сбросить цель: отмена атаки, скрыть alert
    pub fn lose_interest(&mut self, timers: &mut TimerService) {
        self.cancel_attack_delay(timers);
        if let Some(target) = self.target.0.take() {
            crate::log(&format!("🤷 AI: {:?} lost interest in {:?}", self.entity, target));
        }
        self.alert.visible = false;
    }

    pub fn start_patrolling(&mut self) {
        self.set_state(EnemyState::Patrolling);
        let goal = self.route.current;
        let speed = self.config.patrolling_speed;
        self.move_to(goal, speed);
    }

    pub fn chase(&mut self) {
        self.set_state(EnemyState::Chasing);
        let goal = self.target.0;
        let speed = self.config.chasing_speed;
        self.move_to(goal, speed);
    }

    /// Attacking + новый attack-delay таймер (старый отменяется)
    pub fn start_attack_timer<R: Rng + ?Sized>(&mut self, timers: &mut TimerService, rng: &mut R) {
        self.cancel_attack_delay(timers);
        self.set_state(EnemyState::Attacking);

        let delay = self.config.attack_delay.sample(rng);
        self.timers.attack_delay = Some(timers.schedule(self.entity, delay, TimerAction::AttackDelay));

        crate::log(&format!("⏳ AI: {:?} attack in {:.2}s", self.entity, delay));
    }

    /// Wait на patrol point (старый wait отменяется)
    pub fn start_patrol_wait<R: Rng + ?Sized>(&mut self, timers: &mut TimerService, rng: &mut R) -> f32 {
        self.cancel_patrol_wait(timers);

        let wait = self.config.patrol_wait.sample(rng);
        self.timers.patrol_wait = Some(timers.schedule(self.entity, wait, TimerAction::PatrolWait));
        wait
    }

    /// Применяет решение combat-target проверки
    pub fn apply_combat_decision<R: Rng + ?Sized>(
        &mut self,
        decision: CombatDecision,
        timers: &mut TimerService,
        rng: &mut R,
    ) {
        let engaged = *self.state == EnemyState::Engaged;

        match decision {
            CombatDecision::LoseInterest => {
                self.lose_interest(timers);
                if !engaged {
                    self.start_patrolling();
                }
            }
            CombatDecision::Chase => {
                self.cancel_attack_delay(timers);
                if !engaged {
                    self.chase();
                }
            }
            CombatDecision::StartAttack => {
                self.start_attack_timer(timers, rng);
            }
            CombatDecision::Hold => {}
        }
    }

    /// Правила 1–3 для текущей позиции цели
    pub fn run_combat_rules<R: Rng + ?Sized>(
        &mut self,
        target_position: Option<Vec3>,
        timers: &mut TimerService,
        rng: &mut R,
    ) -> CombatDecision {
        let decision = decide_combat(*self.state, self.position(), target_position, self.config);
        self.apply_combat_decision(decision, timers, rng);
        decision
    }

    /// Необратимая смерть: все таймеры, движение, цель. Возвращает позу.
    ///
    /// Hurtbox, оружие и despawn делает вызывающий (у него есть commands).
    pub fn die<R: Rng + ?Sized>(&mut self, timers: &mut TimerService, rng: &mut R) -> DeathPose {
        let cancelled = timers.cancel_all_for(self.entity);
        self.timers.patrol_wait = None;
        self.timers.attack_delay = None;

        self.target.0 = None;
        self.alert.visible = false;
        self.route.idle_animation_requested = false;
        self.stop();

        self.set_state(EnemyState::Dead);

        let pose = DeathPose::random(rng);
        crate::log_info(&format!(
            "💀 AI: {:?} died ({:?}, {} timers cancelled)",
            self.entity, pose, cancelled
        ));
        pose
    }
}

/// Позиция entity по слабой ссылке (None если entity уже нет)
pub fn entity_position(entity: Option<Entity>, transforms: &Query<&Transform>) -> Option<Vec3> {
    let entity = entity?;
    transforms.get(entity).ok().map(|transform| transform.translation)
}
