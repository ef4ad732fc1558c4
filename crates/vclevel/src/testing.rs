//! In-memory port implementations with failure injection, for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{LevelDelta, PrivilegeRef, ProgressRecord, SinkError, StoreError};
use crate::ports::{DurableStore, FastStore, LevelUpSink};

fn unavailable() -> StoreError {
    StoreError::Unavailable("injected failure".into())
}

#[derive(Default)]
pub struct InMemoryDurableStore {
    records: Mutex<HashMap<String, ProgressRecord>>,
    failing: AtomicBool,
    find_calls: AtomicUsize,
    insert_calls: AtomicUsize,
}

impl InMemoryDurableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, record: ProgressRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.id.clone(), record);
    }

    pub fn record(&self, id: &str) -> Option<ProgressRecord> {
        self.records.lock().unwrap().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DurableStore for InMemoryDurableStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<ProgressRecord>, StoreError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.record(id))
    }

    async fn upsert_increment(
        &self,
        id: &str,
        delta: LevelDelta,
    ) -> Result<ProgressRecord, StoreError> {
        self.check()?;
        let mut records = self.records.lock().unwrap();
        let record = records
            .entry(id.to_string())
            .or_insert_with(|| ProgressRecord::new_default(id));
        record.level += delta.level;
        record.exp = 0;
        Ok(record.clone())
    }

    async fn insert_default(&self, id: &str) -> Result<ProgressRecord, StoreError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.check()?;
        let mut records = self.records.lock().unwrap();
        if records.contains_key(id) {
            return Err(StoreError::DuplicateKey(id.to_string()));
        }
        let record = ProgressRecord::new_default(id);
        records.insert(id.to_string(), record.clone());
        Ok(record)
    }
}

#[derive(Default)]
pub struct InMemoryFastStore {
    entries: Mutex<HashMap<String, ProgressRecord>>,
    failing: AtomicBool,
}

impl InMemoryFastStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, record: ProgressRecord) {
        self.entries
            .lock()
            .unwrap()
            .insert(record.id.clone(), record);
    }

    pub fn entry(&self, id: &str) -> Option<ProgressRecord> {
        self.entries.lock().unwrap().get(id).cloned()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl FastStore for InMemoryFastStore {
    async fn get(&self, id: &str) -> Result<Option<ProgressRecord>, StoreError> {
        self.check()?;
        Ok(self.entry(id))
    }

    async fn set(&self, record: &ProgressRecord) -> Result<(), StoreError> {
        self.check()?;
        self.seed(record.clone());
        Ok(())
    }

    async fn flush(&self) -> Result<(), StoreError> {
        self.check()?;
        self.entries.lock().unwrap().clear();
        Ok(())
    }
}

/// Fast store whose calls never complete
pub struct HangingFastStore;

#[async_trait]
impl FastStore for HangingFastStore {
    async fn get(&self, _id: &str) -> Result<Option<ProgressRecord>, StoreError> {
        std::future::pending().await
    }

    async fn set(&self, _record: &ProgressRecord) -> Result<(), StoreError> {
        std::future::pending().await
    }

    async fn flush(&self) -> Result<(), StoreError> {
        std::future::pending().await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    Notify { user_id: String, message: String },
    Grant { user_id: String, privilege: PrivilegeRef },
}

#[derive(Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
    failing: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl LevelUpSink for RecordingSink {
    async fn notify(&self, user_id: &str, message: &str) -> Result<(), SinkError> {
        self.calls.lock().unwrap().push(SinkCall::Notify {
            user_id: user_id.to_string(),
            message: message.to_string(),
        });
        if self.failing.load(Ordering::SeqCst) {
            return Err(SinkError::Notify {
                user_id: user_id.to_string(),
                reason: "injected failure".into(),
            });
        }
        Ok(())
    }

    async fn grant_privilege(
        &self,
        user_id: &str,
        privilege: PrivilegeRef,
    ) -> Result<(), SinkError> {
        self.calls.lock().unwrap().push(SinkCall::Grant {
            user_id: user_id.to_string(),
            privilege,
        });
        if self.failing.load(Ordering::SeqCst) {
            return Err(SinkError::Grant {
                user_id: user_id.to_string(),
                reason: "injected failure".into(),
            });
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
