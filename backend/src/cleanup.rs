//! Background cleanup of uploaded files
//!
//! Request handlers hand a [`DeletionJob`] to the [`CleanupQueue`] after the
//! owning database row is gone. A single [`CleanupWorker`] task consumes the
//! jobs and removes the directories. The handoff never blocks the handler,
//! and nothing is persisted: jobs still queued when the process dies are lost.
//!
//! Failures are logged and dropped. A job runs at most once.

use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A directory to remove once its database record has been deleted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionJob {
    pub target_path: PathBuf,
}

impl DeletionJob {
    pub fn new(target_path: impl Into<PathBuf>) -> Self {
        Self {
            target_path: target_path.into(),
        }
    }
}

/// Filesystem cleanup failure
///
/// Never leaves the worker; it only ends up in the log.
#[derive(Error, Debug)]
pub enum CleanupError {
    #[error("failed to remove {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Producer side of the cleanup channel
#[derive(Clone, Debug)]
pub struct CleanupQueue {
    tx: mpsc::UnboundedSender<DeletionJob>,
}

impl CleanupQueue {
    /// Create a queue and the receiver its worker will consume
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DeletionJob>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Create a queue together with a running worker
    pub fn start() -> (Self, JoinHandle<()>) {
        let (queue, rx) = Self::new();
        let handle = CleanupWorker::new(rx).spawn();
        (queue, handle)
    }

    /// Hand a job to the worker without waiting for it
    pub fn enqueue(&self, job: DeletionJob) {
        debug!(path = %job.target_path.display(), "Queueing cleanup job");
        if let Err(mpsc::error::SendError(job)) = self.tx.send(job) {
            warn!(
                path = %job.target_path.display(),
                "Cleanup worker is not running; leaving files in place"
            );
        }
    }
}

/// Consumer side of the cleanup channel
pub struct CleanupWorker {
    rx: mpsc::UnboundedReceiver<DeletionJob>,
}

impl CleanupWorker {
    pub fn new(rx: mpsc::UnboundedReceiver<DeletionJob>) -> Self {
        Self { rx }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Process jobs until every queue handle has been dropped
    pub async fn run(mut self) {
        while let Some(job) = self.rx.recv().await {
            match Self::process(&job).await {
                Ok(()) => info!(path = %job.target_path.display(), "Removed item files"),
                Err(e) => warn!(error = %e, "Cleanup failed; not retrying"),
            }
        }
        debug!("Cleanup queue closed, worker exiting");
    }

    /// Remove the job's directory tree
    pub async fn process(job: &DeletionJob) -> Result<(), CleanupError> {
        tokio::fs::remove_dir_all(&job.target_path)
            .await
            .map_err(|source| CleanupError::Filesystem {
                path: job.target_path.clone(),
                source,
            })
    }
}
