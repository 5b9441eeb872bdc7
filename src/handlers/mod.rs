// handlers/mod.rs - Two handler tiers
//
// Public (no auth) → Protected (bearer token with required scope)
pub mod protected;
pub mod public;

pub use protected::*;
pub use public::*;
