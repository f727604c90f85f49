//! Concurrent repository jobs.
//!
//! Queue-and-notify layer over the extraction pipeline: one worker task
//! per repository, deduplicated by the derived locator key, with status
//! transitions broadcast to any number of observers. Jobs run to
//! completion or failure; there is no cancellation.

use crate::error::HistreeError;
use crate::history::{self, LogFormat};
use crate::repo::{locator, RepoCache};
use crate::report;
use crate::types::RepoData;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{error, info};

/// Lifecycle states of a repository job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Cloning,
    Processing,
    Complete,
    Error,
}

/// Status message pushed to observers on every transition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: JobState,
    pub elapsed_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Arc<RepoData>>,
}

struct JobInner {
    status: JobState,
    error: Option<String>,
    result: Option<Arc<RepoData>>,
    observers: Vec<UnboundedSender<StatusUpdate>>,
}

/// A single repository job, shared between its worker and observers.
///
/// The mutable status and observer list sit behind one lock; broadcasts
/// happen after that lock is released, serialized by a dedicated broadcast
/// lock so observers see transitions in order.
pub struct Job {
    key: String,
    url: String,
    started: Instant,
    inner: Mutex<JobInner>,
    broadcast: Mutex<()>,
}

impl Job {
    fn new(url: &str) -> Self {
        Self {
            key: locator::repo_key(url),
            url: url.to_string(),
            started: Instant::now(),
            inner: Mutex::new(JobInner {
                status: JobState::Queued,
                error: None,
                result: None,
                observers: Vec::new(),
            }),
            broadcast: Mutex::new(()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Current status snapshot.
    pub fn status(&self) -> StatusUpdate {
        let inner = self.inner.lock();
        self.update_from(&inner)
    }

    fn update_from(&self, inner: &JobInner) -> StatusUpdate {
        StatusUpdate {
            status: inner.status,
            elapsed_seconds: self.started.elapsed().as_secs(),
            error: inner.error.clone(),
            data: inner.result.clone(),
        }
    }

    /// Attach an observer. The current status is delivered immediately, so
    /// late subscribers still see the terminal state.
    pub fn subscribe(&self) -> UnboundedReceiver<StatusUpdate> {
        let (tx, rx) = mpsc::unbounded_channel();
        let update = {
            let mut inner = self.inner.lock();
            inner.observers.push(tx.clone());
            self.update_from(&inner)
        };
        let _serialize = self.broadcast.lock();
        let _ = tx.send(update);
        rx
    }

    fn transition(
        &self,
        status: JobState,
        error: Option<String>,
        result: Option<Arc<RepoData>>,
    ) {
        let (update, observers) = {
            let mut inner = self.inner.lock();
            inner.status = status;
            inner.error = error;
            if result.is_some() {
                inner.result = result;
            }
            (self.update_from(&inner), inner.observers.clone())
        };

        // State lock released; the broadcast itself stays serialized.
        let _serialize = self.broadcast.lock();
        for observer in &observers {
            // A departed observer is a recoverable send error.
            let _ = observer.send(update.clone());
        }
        drop(_serialize);

        self.inner.lock().observers.retain(|tx| !tx.is_closed());
    }
}

/// Job table: deduplicates in-flight work per repository key and owns the
/// shared clone cache. Create one at process start; there are no implicit
/// singletons.
pub struct JobManager {
    cache: Arc<RepoCache>,
    format: LogFormat,
    jobs: Mutex<HashMap<String, Arc<Job>>>,
}

impl JobManager {
    pub fn new(cache: RepoCache, format: LogFormat) -> Self {
        Self {
            cache: Arc::new(cache),
            format,
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Submit a repository for processing. Concurrent submissions of the
    /// same repository join the existing job; a finished job is returned
    /// as-is, its terminal status visible to new subscribers.
    pub fn submit(&self, url: &str) -> Arc<Job> {
        let key = locator::repo_key(url);
        let mut jobs = self.jobs.lock();
        if let Some(job) = jobs.get(&key) {
            return Arc::clone(job);
        }

        let job = Arc::new(Job::new(url));
        jobs.insert(key, Arc::clone(&job));
        drop(jobs);

        let cache = Arc::clone(&self.cache);
        let format = self.format;
        let worker = Arc::clone(&job);
        tokio::spawn(async move {
            run_job(cache, format, worker).await;
        });
        job
    }

    /// Look up an existing job by repository key.
    pub fn get(&self, key: &str) -> Option<Arc<Job>> {
        self.jobs.lock().get(key).cloned()
    }
}

async fn run_job(cache: Arc<RepoCache>, format: LogFormat, job: Arc<Job>) {
    info!(key = job.key(), "job started");
    match execute(cache, format, &job).await {
        Ok(data) => {
            info!(key = job.key(), "job complete");
            job.transition(JobState::Complete, None, Some(Arc::new(data)));
        }
        Err(e) => {
            error!(key = job.key(), error = %e, "job failed");
            job.transition(JobState::Error, Some(e.to_string()), None);
        }
    }
}

async fn execute(
    cache: Arc<RepoCache>,
    format: LogFormat,
    job: &Arc<Job>,
) -> Result<RepoData, HistreeError> {
    job.transition(JobState::Cloning, None, None);
    let url = job.url().to_string();
    let clone_dir = tokio::task::spawn_blocking(move || cache.open_or_update(&url))
        .await
        .map_err(|e| HistreeError::Worker(e.to_string()))??;

    job.transition(JobState::Processing, None, None);
    let url = job.url().to_string();
    let data = tokio::task::spawn_blocking(move || -> Result<RepoData, HistreeError> {
        let raw = history::read_log(&clone_dir, format)?;
        let parsed = history::parse_log(&raw);
        Ok(report::build(&parsed, &url))
    })
    .await
    .map_err(|e| HistreeError::Worker(e.to_string()))??;

    Ok(data)
}
