//! Membership Tracker - members currently eligible for progression
//!
//! Mutated by presence events, read by the engine through point-in-time
//! snapshots. Lives in memory only and is rebuilt from live voice events
//! after a restart.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::domain::PresenceChange;

/// Shared handle to the live membership set
#[derive(Debug, Clone, Default)]
pub struct MembershipTracker {
    members: Arc<RwLock<HashSet<String>>>,
}

impl MembershipTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_present(&self, id: &str) {
        let inserted = self
            .members
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string());
        if inserted {
            debug!(user_id = %id, "Member present");
        }
    }

    pub fn mark_absent(&self, id: &str) {
        let removed = self
            .members
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        if removed {
            debug!(user_id = %id, "Member absent");
        }
    }

    /// Apply a classified voice-state change
    pub fn apply(&self, id: &str, change: PresenceChange) {
        match change {
            PresenceChange::Present => self.mark_present(id),
            PresenceChange::Absent => self.mark_absent(id),
            PresenceChange::Unchanged => {}
        }
    }

    /// Point-in-time copy of the set
    pub fn snapshot(&self) -> HashSet<String> {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    pub fn len(&self) -> usize {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_then_absent_leaves_member_out() {
        let tracker = MembershipTracker::new();
        tracker.mark_present("u1");
        tracker.mark_absent("u1");
        assert!(!tracker.snapshot().contains("u1"));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let tracker = MembershipTracker::new();
        tracker.mark_present("u1");
        let snapshot = tracker.snapshot();

        tracker.mark_absent("u1");
        tracker.mark_present("u2");

        assert!(snapshot.contains("u1"));
        assert!(!snapshot.contains("u2"));
    }

    #[test]
    fn test_clones_share_the_set() {
        let tracker = MembershipTracker::new();
        let handle = tracker.clone();
        handle.mark_present("u1");
        assert!(tracker.contains("u1"));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_apply_presence_changes() {
        let tracker = MembershipTracker::new();
        tracker.apply("u1", PresenceChange::Present);
        tracker.apply("u1", PresenceChange::Unchanged);
        assert!(tracker.contains("u1"));
        tracker.apply("u1", PresenceChange::Absent);
        assert!(!tracker.contains("u1"));
    }

    #[test]
    fn test_concurrent_mutation() {
        let tracker = MembershipTracker::new();
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let tracker = tracker.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let id = format!("{}-{}", n, i);
                        tracker.mark_present(&id);
                        let _ = tracker.snapshot();
                        if i % 2 == 0 {
                            tracker.mark_absent(&id);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(tracker.len(), 8 * 50);
    }
}
