//! In-memory job store.
//!
//! Keyed by (query, target label). All access goes through one `RwLock`
//! over the map, and `update_reference` checks the record's generation id,
//! so a write from a superseded background task cannot touch a newer
//! record. Records are evicted once they outlive the configured TTL.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{JobKey, JobRecord};

#[derive(Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<JobKey, JobRecord>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for `key`. A replacement takes over the
    /// key with a fresh generation id; stale background writers lose.
    pub async fn put(&self, key: JobKey, record: JobRecord) {
        self.jobs.write().await.insert(key, record);
    }

    pub async fn get(&self, key: &JobKey) -> Option<JobRecord> {
        self.jobs.read().await.get(key).cloned()
    }

    /// Set one reference's excerpt. Returns whether the write applied.
    ///
    /// The write is discarded when the record is gone, when `job_id` is
    /// stale, or when the excerpt is already set (excerpts are write-once).
    pub async fn update_reference(
        &self,
        key: &JobKey,
        job_id: Uuid,
        index: usize,
        excerpt: String,
    ) -> bool {
        let mut jobs = self.jobs.write().await;
        let Some(record) = jobs.get_mut(key) else {
            debug!(%key, "update for evicted job discarded");
            return false;
        };
        if record.job_id != job_id {
            debug!(%key, "update from superseded job discarded");
            return false;
        }
        match record.result.references.get_mut(index) {
            Some(reference) if reference.excerpt.is_none() => {
                reference.excerpt = Some(excerpt);
                true
            }
            Some(_) => {
                debug!(%key, index, "excerpt already set, keeping first write");
                false
            }
            None => {
                debug!(%key, index, "reference index out of range");
                false
            }
        }
    }

    /// Drop records older than `ttl`. Returns how many were evicted.
    pub async fn evict_expired(&self, ttl: Duration) -> usize {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, record| record.created_at.elapsed() <= ttl);
        before - jobs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentReference, MatchResult};
    use url::Url;

    fn record(n_refs: usize) -> JobRecord {
        let references = (0..n_refs)
            .map(|i| DocumentReference {
                label: format!("doc-{i}"),
                url: Url::parse(&format!("https://example.org/doc-{i}.pdf")).unwrap(),
                excerpt: None,
            })
            .collect();
        JobRecord::new(MatchResult {
            title: "row".to_string(),
            references,
        })
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = JobStore::new();
        let key = JobKey::new("q", "label");
        let rec = record(2);
        let job_id = rec.job_id;

        store.put(key.clone(), rec).await;
        let stored = store.get(&key).await.unwrap();
        assert_eq!(stored.job_id, job_id);
        assert!(!stored.is_complete());
    }

    #[tokio::test]
    async fn completion_is_derived_from_excerpts() {
        let store = JobStore::new();
        let key = JobKey::new("q", "label");
        let rec = record(2);
        let job_id = rec.job_id;
        store.put(key.clone(), rec).await;

        assert!(store.update_reference(&key, job_id, 0, "one".into()).await);
        assert!(!store.get(&key).await.unwrap().is_complete());

        assert!(store.update_reference(&key, job_id, 1, "two".into()).await);
        assert!(store.get(&key).await.unwrap().is_complete());
    }

    #[tokio::test]
    async fn excerpts_are_write_once() {
        let store = JobStore::new();
        let key = JobKey::new("q", "label");
        let rec = record(1);
        let job_id = rec.job_id;
        store.put(key.clone(), rec).await;

        assert!(store.update_reference(&key, job_id, 0, "first".into()).await);
        assert!(!store.update_reference(&key, job_id, 0, "second".into()).await);
        let stored = store.get(&key).await.unwrap();
        assert_eq!(stored.result.references[0].excerpt.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn stale_generation_updates_are_discarded() {
        let store = JobStore::new();
        let key = JobKey::new("q", "label");

        let old = record(1);
        let old_id = old.job_id;
        store.put(key.clone(), old).await;

        // A newer initiate for the same key supersedes the record.
        let new = record(1);
        let new_id = new.job_id;
        store.put(key.clone(), new).await;

        assert!(!store.update_reference(&key, old_id, 0, "stale".into()).await);
        assert!(store.get(&key).await.unwrap().result.references[0].excerpt.is_none());

        assert!(store.update_reference(&key, new_id, 0, "fresh".into()).await);
        assert_eq!(
            store.get(&key).await.unwrap().result.references[0].excerpt.as_deref(),
            Some("fresh")
        );
    }

    #[tokio::test]
    async fn ttl_eviction_drops_old_records() {
        let store = JobStore::new();
        let key = JobKey::new("q", "label");
        store.put(key.clone(), record(1)).await;

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(store.evict_expired(Duration::ZERO).await, 1);
        assert!(store.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn fresh_records_survive_eviction() {
        let store = JobStore::new();
        let key = JobKey::new("q", "label");
        store.put(key.clone(), record(1)).await;

        assert_eq!(store.evict_expired(Duration::from_secs(3600)).await, 0);
        assert!(store.get(&key).await.is_some());
    }
}
