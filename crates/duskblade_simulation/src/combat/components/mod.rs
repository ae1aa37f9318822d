//! Combat components

pub mod hurtbox;
pub mod weapon;


// Re-export all components
pub use hurtbox::*;
pub use weapon::*;
