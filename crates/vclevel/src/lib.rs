//! VC Level Domain Library
//!
//! Core domain types, ports and services for voice-session progression.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Progress records and the level threshold curve
//!   - `value_objects/`: Level rewards, voice presence classification
//!   - `errors/`: Store, sink and domain error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `repositories/`: Durable and fast store interfaces
//!   - `services/`: Level-up notification/privilege sink
//!
//! - **Services** (`services/`): Cache-aside repository, membership
//!   tracker and the progression engine
//!
//! # Usage
//!
//! ```rust,ignore
//! use vclevel::{MembershipTracker, ProgressionEngine, ProgressionRepository};
//!
//! let repository = Arc::new(ProgressionRepository::new(durable, fast, None));
//! let engine = ProgressionEngine::new(repository, membership, sink, None);
//! engine.start();
//! ```

pub mod domain;
pub mod ports;
pub mod services;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export commonly used types
pub use domain::{
    level_threshold, DomainError, LevelDelta, LevelRewards, PresenceChange, PrivilegeRef,
    ProgressRecord, SinkError, StoreError, VoiceFlags, VoiceSnapshot,
};
pub use ports::{DurableStore, FastStore, LevelUpSink};
pub use services::{
    level_up_message, EngineConfig, Lookup, MemberOutcome, MembershipTracker, ProgressionEngine,
    ProgressionRepository, RecordSource, RepositoryConfig, TickReport,
};
