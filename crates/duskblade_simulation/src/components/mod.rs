//! ECS Components для комбатантов
//!
//! Организация по доменам:
//! - actor: allegiance, health, stamina, Dead marker
//! - movement: навигационные команды и скорость (MovementCommand, Velocity)
//! - player: player marker и ActionState

pub mod actor;
pub mod movement;
pub mod player;

// Re-exports для удобного импорта
pub use actor::*;
pub use movement::*;
pub use player::*;
