//! Service Ports
//!
//! Abstract interfaces for external services.

mod level_up_sink;

pub use level_up_sink::*;
