//! Core data model for the extraction pipeline.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// One hyperlink collected from the matched tabular block.
///
/// `excerpt` starts unset and is written exactly once by the background
/// extraction step — either mined text or the not-found sentinel. It is
/// never cleared afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentReference {
    pub label: String,
    pub url: Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

/// The matched listing row plus the references found in its enclosing table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub title: String,
    pub references: Vec<DocumentReference>,
}

/// Composite key addressing one job. Identical (query, label) inputs always
/// address the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobKey {
    pub query: String,
    pub target_label: String,
}

impl JobKey {
    pub fn new(query: &str, target_label: &str) -> Self {
        Self {
            query: query.to_string(),
            target_label: target_label.to_string(),
        }
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.query, self.target_label)
    }
}

/// Stored job state.
///
/// `job_id` identifies the generation: a superseding `put` for the same key
/// carries a fresh id, and updates arriving with a stale id are discarded.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub job_id: Uuid,
    pub result: MatchResult,
    pub created_at: Instant,
}

impl JobRecord {
    pub fn new(result: MatchResult) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            result,
            created_at: Instant::now(),
        }
    }

    /// A job is complete once every reference's excerpt is set.
    pub fn is_complete(&self) -> bool {
        self.result.references.iter().all(|r| r.excerpt.is_some())
    }
}

/// Outcome of a status poll for a stored job.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    InProgress,
    Completed(MatchResult),
}
