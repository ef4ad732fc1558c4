//! Value Objects
//!
//! Immutable objects defined by their attributes rather than identity.

mod level_rewards;
mod presence;

pub use level_rewards::*;
pub use presence::*;
