//! Progress Record - level and experience of one tracked member
//!
//! Pure domain entity without infrastructure dependencies.

use serde::{Deserialize, Serialize};

/// Experience needed to leave `level`.
///
/// `5 * level^2 + 50 * level + 100`
pub fn level_threshold(level: u64) -> u64 {
    level
        .saturating_mul(level)
        .saturating_mul(5)
        .saturating_add(level.saturating_mul(50))
        .saturating_add(100)
}

/// Progress Record - one per tracked member
///
/// Serialized as `{id, level, exp}`, which is also the fast store value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub id: String,
    pub level: u64,
    pub exp: u64,
}

impl ProgressRecord {
    /// Default record for a member seen for the first time
    pub fn new_default(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            level: 0,
            exp: 0,
        }
    }

    /// Experience needed to leave the current level
    pub fn threshold(&self) -> u64 {
        level_threshold(self.level)
    }

    /// Whether gaining `delta` experience crosses the current threshold
    pub fn would_level_up(&self, delta: u64) -> bool {
        self.exp.saturating_add(delta) >= self.threshold()
    }

    /// Copy of this record carrying `exp` instead of the current value
    pub fn with_exp(&self, exp: u64) -> Self {
        Self {
            id: self.id.clone(),
            level: self.level,
            exp,
        }
    }
}

/// Increment applied atomically by the durable store on a level-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelDelta {
    pub level: u64,
}

impl LevelDelta {
    pub const ONE: Self = Self { level: 1 };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_curve() {
        assert_eq!(level_threshold(0), 100);
        assert_eq!(level_threshold(1), 155);
        assert_eq!(level_threshold(2), 220);
        assert_eq!(level_threshold(10), 1100);
    }

    #[test]
    fn test_threshold_saturates() {
        assert_eq!(level_threshold(u64::MAX), u64::MAX);
    }

    #[test]
    fn test_would_level_up_at_exact_threshold() {
        let record = ProgressRecord {
            id: "u1".into(),
            level: 0,
            exp: 90,
        };
        assert!(record.would_level_up(10));
        assert!(!record.would_level_up(9));
    }

    #[test]
    fn test_cache_value_layout() {
        let record = ProgressRecord {
            id: "42".into(),
            level: 3,
            exp: 17,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"id": "42", "level": 3, "exp": 17}));
    }
}
