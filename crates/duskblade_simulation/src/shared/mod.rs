//! Shared domain — cross-cutting helpers
//!
//! - frame: соглашение об осях мира (Z-up, facing = local +X)
//! - targeting: range oracle (чистые distance/radius проверки)

pub mod frame;
pub mod targeting;

pub use frame::*;
pub use targeting::*;
