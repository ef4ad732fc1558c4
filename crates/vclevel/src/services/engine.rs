//! Progression Engine - periodic experience scheduler
//!
//! Every interval, takes a snapshot of the membership set and runs one
//! independent pipeline per member: read the record, roll an experience
//! delta, then either commit a level-up (followed by the notification and
//! privilege hook) or store the gain in the cache tier.

use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use rand::Rng;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::domain::{DomainError, LevelRewards, ProgressRecord};
use crate::ports::{DurableStore, FastStore, LevelUpSink};
use crate::services::membership::MembershipTracker;
use crate::services::repository::{ProgressionRepository, RecordSource};

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Interval between ticks
    pub interval: Duration,
    /// Experience granted per tick, drawn uniformly (end exclusive)
    pub exp_range: Range<u64>,
    /// Privileges granted on reaching a level
    pub rewards: LevelRewards,
    /// Upper bound for a single sink call
    pub sink_timeout: Duration,
    /// Enable/disable the scheduler loop
    pub enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            exp_range: 10..26,
            rewards: LevelRewards::default(),
            sink_timeout: Duration::from_secs(10),
            enabled: true,
        }
    }
}

/// What one member's pipeline did during a tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberOutcome {
    LeveledUp(ProgressRecord),
    Gained(ProgressRecord),
    /// The record could not be read; nothing was written this tick
    Skipped,
}

/// Summary of one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub processed: usize,
    pub level_ups: usize,
    pub exp_gains: usize,
    pub skipped: usize,
    pub failures: usize,
}

/// Congratulation sent to a member reaching `level`
pub fn level_up_message(level: u64) -> String {
    format!("Congrats, you have reached **VC Level {}!**", level)
}

/// Progression scheduler
pub struct ProgressionEngine<D: DurableStore, F: FastStore, S: LevelUpSink> {
    repository: Arc<ProgressionRepository<D, F>>,
    membership: MembershipTracker,
    sink: Arc<S>,
    config: EngineConfig,
}

impl<D, F, S> ProgressionEngine<D, F, S>
where
    D: DurableStore + 'static,
    F: FastStore + 'static,
    S: LevelUpSink + 'static,
{
    pub fn new(
        repository: Arc<ProgressionRepository<D, F>>,
        membership: MembershipTracker,
        sink: Arc<S>,
        config: Option<EngineConfig>,
    ) -> Self {
        Self {
            repository,
            membership,
            sink,
            config: config.unwrap_or_default(),
        }
    }

    /// Start the scheduler (runs in background)
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Run the scheduler loop
    async fn run(self) {
        if !self.config.enabled {
            tracing::info!("📅 Progression engine disabled");
            return;
        }

        tracing::info!(
            "📅 Progression engine started (interval: {:?}, sink: {})",
            self.config.interval,
            self.sink.name()
        );

        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Skip the first immediate tick
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let report = self.tick().await;

            if report.processed == 0 {
                debug!("Tick: no members in voice");
                continue;
            }

            tracing::info!(
                processed = report.processed,
                level_ups = report.level_ups,
                exp_gains = report.exp_gains,
                skipped = report.skipped,
                failures = report.failures,
                "🔄 Tick completed"
            );
        }
    }

    /// Run one cycle over a snapshot of the membership set.
    ///
    /// Members are processed concurrently; one member's failure never
    /// affects another's pipeline.
    pub async fn tick(&self) -> TickReport {
        let members = self.membership.snapshot();

        let outcomes = join_all(members.iter().map(|id| {
            let delta = self.roll();
            self.process_member(id, delta)
        }))
        .await;

        let mut report = TickReport {
            processed: outcomes.len(),
            ..Default::default()
        };

        for outcome in outcomes {
            match outcome {
                Ok(MemberOutcome::LeveledUp(_)) => report.level_ups += 1,
                Ok(MemberOutcome::Gained(_)) => report.exp_gains += 1,
                Ok(MemberOutcome::Skipped) => report.skipped += 1,
                Err(_) => report.failures += 1,
            }
        }

        report
    }

    /// Run one member's pipeline with a given experience delta.
    pub async fn process_member(&self, id: &str, delta: u64) -> Result<MemberOutcome, DomainError> {
        let lookup = self.repository.lookup(id).await;
        if lookup.source == RecordSource::Fallback {
            debug!(user_id = %id, "Skipping member, record unavailable");
            return Ok(MemberOutcome::Skipped);
        }

        let record = lookup.record;

        if record.would_level_up(delta) {
            let updated = self
                .repository
                .record_level_up(id)
                .await
                .inspect_err(|e| warn!(user_id = %id, error = %e, "Level-up lost"))?;

            tracing::info!(user_id = %id, level = updated.level, "⬆️ Level up");
            self.announce(&updated).await;

            Ok(MemberOutcome::LeveledUp(updated))
        } else {
            let new_exp = record.exp + delta;
            let updated = self
                .repository
                .record_exp_gain(&record, new_exp)
                .await
                .inspect_err(|e| debug!(user_id = %id, error = %e, "Experience gain lost"))?;

            Ok(MemberOutcome::Gained(updated))
        }
    }

    /// Post-commit hook for a level-up: congratulate, then grant the
    /// privilege mapped to the new level. Best-effort, never retried.
    async fn announce(&self, record: &ProgressRecord) {
        let timeout = self.config.sink_timeout;
        let message = level_up_message(record.level);

        match tokio::time::timeout(timeout, self.sink.notify(&record.id, &message)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(user_id = %record.id, error = %e, "Level-up notification failed"),
            Err(_) => warn!(user_id = %record.id, "Level-up notification timed out"),
        }

        let Some(privilege) = self.config.rewards.for_level(record.level) else {
            return;
        };

        match tokio::time::timeout(timeout, self.sink.grant_privilege(&record.id, privilege)).await
        {
            Ok(Ok(())) => {
                tracing::info!(user_id = %record.id, privilege = %privilege, "🎖️ Privilege granted")
            }
            Ok(Err(e)) => warn!(user_id = %record.id, error = %e, "Privilege grant failed"),
            Err(_) => warn!(user_id = %record.id, "Privilege grant timed out"),
        }
    }

    fn roll(&self) -> u64 {
        let range = self.config.exp_range.clone();
        if range.is_empty() {
            return range.start;
        }
        rand::thread_rng().gen_range(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{level_threshold, PrivilegeRef};
    use crate::testing::{InMemoryDurableStore, InMemoryFastStore, RecordingSink, SinkCall};

    type TestEngine = ProgressionEngine<InMemoryDurableStore, InMemoryFastStore, RecordingSink>;

    struct Harness {
        durable: Arc<InMemoryDurableStore>,
        fast: Arc<InMemoryFastStore>,
        sink: Arc<RecordingSink>,
        membership: MembershipTracker,
        engine: TestEngine,
    }

    fn harness(rewards: LevelRewards) -> Harness {
        let durable = Arc::new(InMemoryDurableStore::new());
        let fast = Arc::new(InMemoryFastStore::new());
        let sink = Arc::new(RecordingSink::new());
        let membership = MembershipTracker::new();
        let repository = Arc::new(ProgressionRepository::new(
            durable.clone(),
            fast.clone(),
            None,
        ));
        let engine = ProgressionEngine::new(
            repository,
            membership.clone(),
            sink.clone(),
            Some(EngineConfig {
                rewards,
                ..Default::default()
            }),
        );

        Harness {
            durable,
            fast,
            sink,
            membership,
            engine,
        }
    }

    fn seed(h: &Harness, id: &str, level: u64, exp: u64) {
        h.durable.seed(ProgressRecord {
            id: id.into(),
            level,
            exp: 0,
        });
        h.fast.seed(ProgressRecord {
            id: id.into(),
            level,
            exp,
        });
    }

    #[tokio::test]
    async fn test_crossing_threshold_levels_up_and_rewards() {
        let h = harness(LevelRewards::new().with_reward(1, PrivilegeRef(111)));
        seed(&h, "u1", 0, 95);

        let outcome = h.engine.process_member("u1", 10).await.unwrap();

        let expected = ProgressRecord {
            id: "u1".into(),
            level: 1,
            exp: 0,
        };
        assert_eq!(outcome, MemberOutcome::LeveledUp(expected.clone()));
        assert_eq!(h.durable.record("u1"), Some(expected.clone()));
        assert_eq!(h.fast.entry("u1"), Some(expected));
        assert_eq!(
            h.sink.calls(),
            vec![
                SinkCall::Notify {
                    user_id: "u1".into(),
                    message: level_up_message(1),
                },
                SinkCall::Grant {
                    user_id: "u1".into(),
                    privilege: PrivilegeRef(111),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_level_up_without_reward_only_notifies() {
        let h = harness(LevelRewards::new());
        seed(&h, "u1", 0, 95);

        h.engine.process_member("u1", 10).await.unwrap();

        assert_eq!(
            h.sink.calls(),
            vec![SinkCall::Notify {
                user_id: "u1".into(),
                message: "Congrats, you have reached **VC Level 1!**".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_sub_threshold_gain_stays_in_cache() {
        let h = harness(LevelRewards::new().with_reward(1, PrivilegeRef(111)));
        seed(&h, "u2", 0, 50);

        let outcome = h.engine.process_member("u2", 15).await.unwrap();

        let expected = ProgressRecord {
            id: "u2".into(),
            level: 0,
            exp: 65,
        };
        assert_eq!(outcome, MemberOutcome::Gained(expected.clone()));
        assert_eq!(h.fast.entry("u2"), Some(expected));
        assert_eq!(h.durable.record("u2").map(|r| r.exp), Some(0));
        assert!(h.sink.calls().is_empty());
    }

    #[tokio::test]
    async fn test_sink_failure_does_not_undo_level_up() {
        let h = harness(LevelRewards::new().with_reward(1, PrivilegeRef(111)));
        h.sink.set_failing(true);
        seed(&h, "u1", 0, 99);

        let outcome = h.engine.process_member("u1", 10).await.unwrap();

        assert!(matches!(outcome, MemberOutcome::LeveledUp(_)));
        assert_eq!(h.durable.record("u1").map(|r| r.level), Some(1));
        assert_eq!(h.sink.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_durable_failure_loses_level_up_silently() {
        let h = harness(LevelRewards::new());
        seed(&h, "u1", 0, 99);
        h.durable.set_failing(true);

        let result = h.engine.process_member("u1", 10).await;

        assert!(result.is_err());
        assert!(h.sink.calls().is_empty());
        assert_eq!(h.fast.entry("u1").map(|r| r.exp), Some(99));
    }

    #[tokio::test]
    async fn test_unreadable_record_is_skipped() {
        let h = harness(LevelRewards::new());
        h.durable.set_failing(true);

        let outcome = h.engine.process_member("u1", 10).await.unwrap();

        assert_eq!(outcome, MemberOutcome::Skipped);
        assert_eq!(h.fast.entry("u1"), None);
    }

    #[tokio::test]
    async fn test_tick_processes_snapshot_members() {
        let h = harness(LevelRewards::new());
        seed(&h, "ready", 0, 99);
        seed(&h, "fresh", 0, 0);
        h.membership.mark_present("ready");
        h.membership.mark_present("fresh");
        h.membership.mark_present("new");

        let report = h.engine.tick().await;

        assert_eq!(report.processed, 3);
        assert_eq!(report.level_ups, 1);
        assert_eq!(report.exp_gains, 2);
        assert_eq!(report.failures, 0);
        assert_eq!(h.durable.record("ready").map(|r| r.level), Some(1));

        let fresh = h.fast.entry("fresh").unwrap();
        assert!((10..26).contains(&fresh.exp));
        assert!(h.durable.record("new").is_some());
    }

    #[tokio::test]
    async fn test_tick_isolates_member_failures() {
        let h = harness(LevelRewards::new());
        seed(&h, "u1", 0, 0);
        h.membership.mark_present("u1");
        h.membership.mark_present("u2");
        h.fast.set_failing(true);

        let report = h.engine.tick().await;

        assert_eq!(report.processed, 2);
        assert_eq!(report.failures, 2);
    }

    #[tokio::test]
    async fn test_absent_members_are_not_ticked() {
        let h = harness(LevelRewards::new());
        h.membership.mark_present("u1");
        h.membership.mark_absent("u1");

        let report = h.engine.tick().await;

        assert_eq!(report, TickReport::default());
        assert_eq!(h.durable.len(), 0);
    }

    #[tokio::test]
    async fn test_threshold_invariant_holds_over_many_ticks() {
        let h = harness(LevelRewards::new());
        for n in 0..5 {
            h.membership.mark_present(&format!("u{}", n));
        }

        for _ in 0..200 {
            h.engine.tick().await;
        }

        for n in 0..5 {
            let record = h.fast.entry(&format!("u{}", n)).unwrap();
            assert!(record.exp < level_threshold(record.level));
            assert!(record.level > 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_started_engine_ticks_on_interval() {
        let durable = Arc::new(InMemoryDurableStore::new());
        let fast = Arc::new(InMemoryFastStore::new());
        let membership = MembershipTracker::new();
        membership.mark_present("u1");
        let repository = Arc::new(ProgressionRepository::new(durable, fast.clone(), None));
        let engine = ProgressionEngine::new(
            repository,
            membership,
            Arc::new(RecordingSink::new()),
            None,
        );

        let handle = engine.start();
        tokio::time::sleep(Duration::from_secs(61)).await;

        let record = fast.entry("u1").unwrap();
        assert!(record.exp >= 10);
        handle.abort();
    }
}
