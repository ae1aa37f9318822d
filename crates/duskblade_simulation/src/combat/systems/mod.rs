//! Combat systems (weapon pipeline, hit dispatch, stamina)

pub mod hit;
pub mod stamina;
pub mod weapon;


// Re-export all systems
pub use hit::*;
pub use stamina::*;
pub use weapon::*;
