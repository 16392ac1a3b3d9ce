//! Test Helper Utilities
//!
//! Shared fakes and fixtures for idcanon integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use idcanon::identity::{Category, NamesByCategory};
use idcanon::resolver::{ExternalIdentityRecord, ExternalResolver};
use idcanon_common::{Error, KeyValueCache, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory resolver keyed by lowercased name
#[derive(Default)]
pub struct FakeResolver {
    records: HashMap<String, ExternalIdentityRecord>,
    pub calls: AtomicUsize,
    pub queried: Mutex<Vec<String>>,
    pub unavailable: bool,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, record: ExternalIdentityRecord) -> Self {
        self.records.insert(name.to_lowercase(), record);
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExternalResolver for FakeResolver {
    async fn lookup(&self, name: &str, strict: bool) -> Option<ExternalIdentityRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queried.lock().unwrap().push(name.to_string());
        let record = self.records.get(&name.trim().to_lowercase())?;
        if strict && record.confidence < 0.9 {
            return None;
        }
        Some(record.clone())
    }

    fn is_available(&self) -> bool {
        !self.unavailable
    }
}

pub fn record(id: &str, name: &str, aliases: &[&str], confidence: f64) -> ExternalIdentityRecord {
    ExternalIdentityRecord {
        external_id: id.to_string(),
        canonical_name: name.to_string(),
        aliases: std::iter::once(name)
            .chain(aliases.iter().copied())
            .map(str::to_string)
            .collect(),
        confidence,
        artist_type: Some("Person".to_string()),
        sort_name: None,
        disambiguation: None,
    }
}

/// Cache whose every operation fails
pub struct FailingCache;

#[async_trait]
impl KeyValueCache for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(Error::Cache("read refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> Result<()> {
        Err(Error::Cache("write refused".to_string()))
    }
}

/// Names for one category, in order
pub fn names(category: Category, raws: &[&str]) -> NamesByCategory {
    let mut names = NamesByCategory::new();
    names.extend(category, raws.iter().copied());
    names
}
