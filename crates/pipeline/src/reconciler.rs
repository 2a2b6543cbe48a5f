//! Background registry write-back.
//!
//! Generated profiles are handed to a bounded queue after the response has
//! been assembled. A single worker drains the queue into
//! [`CharacterRegistry::submit`]. Enqueueing never waits: a full queue drops
//! the job with a warning. On cancellation the worker stops accepting jobs,
//! finishes what is already queued, then exits.

use std::sync::Arc;
use std::time::Duration;

use cast_core::character::CharacterProfile;
use cast_core::types::Timestamp;
use cast_registry::CharacterRegistry;
use chrono::Utc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

/// Profiles from one request, waiting to be written.
#[derive(Debug, Clone)]
pub struct ReconcileJob {
    pub project_id: String,
    pub profiles: Vec<CharacterProfile>,
    pub enqueued_at: Timestamp,
}

impl ReconcileJob {
    pub fn new(project_id: impl Into<String>, profiles: Vec<CharacterProfile>) -> Self {
        Self {
            project_id: project_id.into(),
            profiles,
            enqueued_at: Utc::now(),
        }
    }
}

/// Cloneable sender side of the reconciler queue.
#[derive(Debug, Clone)]
pub struct ReconcilerHandle {
    tx: mpsc::Sender<ReconcileJob>,
}

impl ReconcilerHandle {
    /// Queue a job without waiting. Returns `false` if it was dropped.
    pub fn enqueue(&self, job: ReconcileJob) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(TrySendError::Full(job)) => {
                tracing::warn!(
                    project_id = %job.project_id,
                    profiles = job.profiles.len(),
                    "Reconciler queue full, dropping registry write",
                );
                false
            }
            Err(TrySendError::Closed(job)) => {
                tracing::warn!(
                    project_id = %job.project_id,
                    profiles = job.profiles.len(),
                    "Reconciler stopped, dropping registry write",
                );
                false
            }
        }
    }
}

/// Worker that owns the receiving side of the queue.
pub struct Reconciler {
    registry: Arc<dyn CharacterRegistry>,
    rx: mpsc::Receiver<ReconcileJob>,
    submit_timeout: Duration,
}

impl Reconciler {
    /// Create the worker and its handle. `capacity` is clamped to at least 1.
    pub fn new(
        registry: Arc<dyn CharacterRegistry>,
        capacity: usize,
        submit_timeout: Duration,
    ) -> (Self, ReconcilerHandle) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let reconciler = Self {
            registry,
            rx,
            submit_timeout,
        };
        (reconciler, ReconcilerHandle { tx })
    }

    /// Process jobs until `cancel` fires, then drain the queue and return.
    ///
    /// Also returns once every handle has been dropped and the queue is
    /// empty.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!("Reconciler started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                job = self.rx.recv() => match job {
                    Some(job) => self.process(job).await,
                    None => {
                        tracing::info!("Reconciler queue closed");
                        return;
                    }
                },
            }
        }

        self.rx.close();
        let mut drained = 0usize;
        while let Some(job) = self.rx.recv().await {
            self.process(job).await;
            drained += 1;
        }
        tracing::info!(drained, "Reconciler stopped");
    }

    async fn process(&self, job: ReconcileJob) {
        let queued_ms = (Utc::now() - job.enqueued_at).num_milliseconds();

        match tokio::time::timeout(
            self.submit_timeout,
            self.registry.submit(&job.project_id, &job.profiles),
        )
        .await
        {
            Ok(Ok(ack)) => {
                tracing::info!(
                    project_id = %job.project_id,
                    created = ack.created,
                    updated = ack.updated,
                    failed = ack.failed,
                    queued_ms,
                    "Registry write-back complete",
                );
            }
            Ok(Err(e)) => {
                tracing::error!(
                    project_id = %job.project_id,
                    profiles = job.profiles.len(),
                    error = %e,
                    "Registry write-back failed",
                );
            }
            Err(_) => {
                tracing::error!(
                    project_id = %job.project_id,
                    profiles = job.profiles.len(),
                    timeout_secs = self.submit_timeout.as_secs(),
                    "Registry write-back timed out",
                );
            }
        }
    }
}
