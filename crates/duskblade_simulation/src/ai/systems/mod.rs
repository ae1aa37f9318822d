//! AI systems (enemy FSM logic)

pub mod agent;
pub mod fsm;
pub mod reactions;

// Re-export all systems
pub use agent::*;
pub use fsm::*;
pub use reactions::*;
