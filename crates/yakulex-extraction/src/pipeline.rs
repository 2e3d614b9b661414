//! Two-phase extraction pipeline.
//!
//! Orchestrates the full flow for one lookup:
//!   1. Fetch the listing page (query forwarded as the `q` parameter)
//!   2. Structural match: first row containing the label, its table, links
//!   3. Store the provisional record and answer immediately
//!   4. In the background, fetch and decode each document concurrently and
//!      mine the keyword-bounded excerpt
//!   5. Write each excerpt back, real or sentinel; one document failing
//!      never fails its siblings or the job
//!
//! Callers observe the second phase through `poll`, or live through the
//! broadcast event stream.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use url::Url;
use uuid::Uuid;

use yakulex_common::error::YakulexError;
use yakulex_common::http::RetryingClient;

use crate::config::PipelineConfig;
use crate::excerpt::{self, NOT_FOUND_SENTINEL};
use crate::listing;
use crate::models::{DocumentReference, JobKey, JobRecord, MatchResult, PollOutcome};
use crate::pdf_text::DocumentDecoder;
use crate::store::JobStore;

/// Progress events observable while a job runs (cloneable for broadcast).
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    JobStarted {
        key: String,
        references: usize,
    },
    ReferenceExtracted {
        key: String,
        index: usize,
        found: bool,
    },
    JobCompleted {
        key: String,
        extracted: usize,
        sentinels: usize,
    },
}

#[derive(Clone)]
pub struct ExtractionPipeline {
    transport: RetryingClient,
    decoder: Arc<dyn DocumentDecoder>,
    store: Arc<JobStore>,
    config: Arc<PipelineConfig>,
    event_tx: broadcast::Sender<PipelineEvent>,
    /// Handle of the newest extraction task per key. A superseded task keeps
    /// running detached; the store's generation guard discards its writes.
    tasks: Arc<Mutex<HashMap<JobKey, (Uuid, JoinHandle<()>)>>>,
}

impl ExtractionPipeline {
    pub fn new(
        transport: RetryingClient,
        decoder: Arc<dyn DocumentDecoder>,
        config: PipelineConfig,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            transport,
            decoder,
            store: Arc::new(JobStore::new()),
            config: Arc::new(config),
            event_tx,
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.event_tx.subscribe()
    }

    /// Fast phase: match the listing row and return the references with
    /// excerpts unset. Extraction continues in the background.
    #[instrument(skip(self))]
    pub async fn initiate(
        &self,
        query: &str,
        target_label: &str,
    ) -> Result<MatchResult, YakulexError> {
        let key = JobKey::new(query, target_label);

        let listing_url = self.listing_url(query);
        let bytes = self.transport.fetch(listing_url.as_str()).await?;
        let html = String::from_utf8_lossy(&bytes);

        let matched = listing::locate(&html, target_label, &self.config.base_url)?;
        if matched.references.is_empty() {
            return Err(YakulexError::NotFound(format!(
                "row matching {target_label:?} carries no document links"
            )));
        }

        let record = JobRecord::new(matched.clone());
        let job_id = record.job_id;
        info!(
            %key,
            %job_id,
            references = matched.references.len(),
            "listing row matched, scheduling extraction"
        );

        self.store.evict_expired(self.config.job_ttl).await;
        self.store.put(key.clone(), record).await;

        let _ = self.event_tx.send(PipelineEvent::JobStarted {
            key: key.to_string(),
            references: matched.references.len(),
        });

        let pipeline = self.clone();
        let task_key = key.clone();
        let references = matched.references.clone();
        let handle = tokio::spawn(async move {
            pipeline.run_extraction(task_key, job_id, references).await;
        });
        self.tasks.lock().await.insert(key, (job_id, handle));

        Ok(matched)
    }

    /// Poll phase: report the stored job. Unknown keys are not found;
    /// incomplete jobs past the extraction deadline are expired rather than
    /// forever "in progress".
    #[instrument(skip(self))]
    pub async fn poll(&self, query: &str, target_label: &str) -> Result<PollOutcome, YakulexError> {
        let key = JobKey::new(query, target_label);

        let Some(record) = self.store.get(&key).await else {
            return Err(YakulexError::NotFound(format!("no job stored for {key}")));
        };

        if record.is_complete() {
            return Ok(PollOutcome::Completed(record.result));
        }
        if record.created_at.elapsed() > self.config.extraction_deadline {
            warn!(%key, "incomplete job past extraction deadline");
            return Err(YakulexError::Expired(key.to_string()));
        }
        Ok(PollOutcome::InProgress)
    }

    /// Background phase: mine every reference concurrently and write the
    /// results back. Failures degrade to the sentinel per reference.
    async fn run_extraction(
        self,
        key: JobKey,
        job_id: Uuid,
        references: Vec<DocumentReference>,
    ) {
        let total = references.len();

        let outcomes =
            futures_util::future::join_all(references.into_iter().enumerate().map(
                |(index, reference)| {
                    let pipeline = self.clone();
                    let key = key.clone();
                    async move {
                        let (excerpt, found) = match pipeline.mine_reference(&reference).await {
                            Ok(Some(text)) => (text, true),
                            Ok(None) => {
                                debug!(
                                    %key,
                                    index,
                                    url = %reference.url,
                                    "anchor keyword absent, storing sentinel"
                                );
                                (NOT_FOUND_SENTINEL.to_string(), false)
                            }
                            Err(e) => {
                                warn!(
                                    %key,
                                    index,
                                    url = %reference.url,
                                    error = %e,
                                    "reference extraction failed, storing sentinel"
                                );
                                (NOT_FOUND_SENTINEL.to_string(), false)
                            }
                        };

                        let applied = pipeline
                            .store
                            .update_reference(&key, job_id, index, excerpt)
                            .await;
                        if applied {
                            let _ = pipeline.event_tx.send(PipelineEvent::ReferenceExtracted {
                                key: key.to_string(),
                                index,
                                found,
                            });
                        }
                        found
                    }
                },
            ))
            .await;

        let extracted = outcomes.iter().filter(|found| **found).count();
        let sentinels = total - extracted;
        info!(%key, %job_id, total, extracted, sentinels, "extraction job finished");

        let _ = self.event_tx.send(PipelineEvent::JobCompleted {
            key: key.to_string(),
            extracted,
            sentinels,
        });

        // Drop our own handle unless a newer generation already replaced it.
        let mut tasks = self.tasks.lock().await;
        if tasks.get(&key).is_some_and(|(id, _)| *id == job_id) {
            tasks.remove(&key);
        }
    }

    /// Fetch one referenced document and mine its excerpt. `Ok(None)` means
    /// the document decoded but the anchor keyword is absent.
    async fn mine_reference(
        &self,
        reference: &DocumentReference,
    ) -> Result<Option<String>, YakulexError> {
        let bytes = self.transport.fetch(reference.url.as_str()).await?;
        let text = self
            .decoder
            .decode(bytes)
            .await
            .map_err(|e| YakulexError::Extraction(e.to_string()))?;

        Ok(excerpt::extract(
            &text,
            &self.config.start_keyword,
            &self.config.end_keyword,
            self.config.fallback_window,
        ))
    }

    fn listing_url(&self, query: &str) -> Url {
        let mut url = self.config.listing_url.clone();
        url.query_pairs_mut().append_pair("q", query);
        url
    }
}
