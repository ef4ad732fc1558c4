//! LevelRewards - privileges granted when a level is reached

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Opaque reference to a privilege on the platform (a role id on Discord)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrivilegeRef(pub u64);

impl std::fmt::Display for PrivilegeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Static mapping `level -> privilege`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRewards(BTreeMap<u64, PrivilegeRef>);

impl LevelRewards {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reward(mut self, level: u64, privilege: PrivilegeRef) -> Self {
        self.0.insert(level, privilege);
        self
    }

    /// Privilege granted on reaching `level`, if any
    pub fn for_level(&self, level: u64) -> Option<PrivilegeRef> {
        self.0.get(&level).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for LevelRewards {
    type Err = DomainError;

    /// Parse `level:privilege` pairs separated by commas, e.g. `1:111,5:555`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rewards = Self::new();

        for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (level, privilege) = pair.split_once(':').ok_or_else(|| {
                DomainError::Validation(format!("Expected level:role, got '{}'", pair))
            })?;

            let level = level.trim().parse::<u64>().map_err(|e| {
                DomainError::Validation(format!("Invalid level '{}': {}", level.trim(), e))
            })?;
            let privilege = privilege.trim().parse::<u64>().map_err(|e| {
                DomainError::Validation(format!("Invalid role id '{}': {}", privilege.trim(), e))
            })?;

            rewards.0.insert(level, PrivilegeRef(privilege));
        }

        Ok(rewards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs() {
        let rewards: LevelRewards = "1:111, 5:555,".parse().unwrap();
        assert_eq!(rewards.len(), 2);
        assert_eq!(rewards.for_level(1), Some(PrivilegeRef(111)));
        assert_eq!(rewards.for_level(5), Some(PrivilegeRef(555)));
        assert_eq!(rewards.for_level(2), None);
    }

    #[test]
    fn test_parse_empty() {
        let rewards: LevelRewards = "".parse().unwrap();
        assert!(rewards.is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("1=111".parse::<LevelRewards>().is_err());
        assert!("one:111".parse::<LevelRewards>().is_err());
        assert!("1:role".parse::<LevelRewards>().is_err());
    }
}
