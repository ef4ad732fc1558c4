//! Domain Entities
//!
//! - ProgressRecord: level and experience of a tracked member

mod progress;

pub use progress::*;
