//! Persist queue: a supervisor task that writes uploads to storage after the
//! response has been sent.
//!
//! Shutdown: [`PersistQueue::shutdown`] stops accepting work, finishes every job
//! already submitted, and only then returns.

use bytes::Bytes;
use quillpost_storage::ImageStorage;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinSet};

/// A single object to write.
#[derive(Debug, Clone)]
pub struct PersistJob {
    pub file_name: String,
    pub data: Bytes,
}

#[derive(Debug, Clone)]
pub struct PersistQueueConfig {
    /// Upper bound on concurrent storage writes.
    pub max_concurrency: usize,
    /// Jobs waiting for a write slot; submissions beyond this are dropped.
    pub capacity: usize,
}

impl Default for PersistQueueConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            capacity: 256,
        }
    }
}

enum Message {
    Persist(PersistJob),
    Shutdown(oneshot::Sender<()>),
}

pub struct PersistQueue {
    tx: mpsc::Sender<Message>,
}

impl PersistQueue {
    /// Start the supervisor on the current runtime.
    pub fn spawn(storage: Arc<dyn ImageStorage>, config: PersistQueueConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.capacity.max(1));
        let max_concurrency = config.max_concurrency.max(1);

        tokio::spawn(async move {
            Self::supervise(storage, max_concurrency, rx).await;
        });

        Self { tx }
    }

    /// Queue a job without waiting for it.
    ///
    /// Returns `false` when the queue is full or the supervisor is no longer
    /// running; the job is dropped and the loss is logged.
    pub fn submit(&self, job: PersistJob) -> bool {
        let file_name = job.file_name.clone();
        let size = job.data.len();

        match self.tx.try_send(Message::Persist(job)) {
            Ok(()) => {
                tracing::debug!(file_name = %file_name, size_bytes = size, "Persist job queued");
                true
            }
            Err(TrySendError::Full(_)) => {
                tracing::error!(
                    file_name = %file_name,
                    size_bytes = size,
                    "Persist queue is full, job dropped"
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::error!(
                    file_name = %file_name,
                    size_bytes = size,
                    "Persist queue is not running, job dropped"
                );
                false
            }
        }
    }

    /// Stop accepting jobs and wait until queued and in-flight jobs finish.
    pub async fn shutdown(&self) {
        tracing::info!("Initiating persist queue shutdown");

        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Message::Shutdown(ack_tx)).await.is_err() {
            return;
        }
        let _ = ack_rx.await;
    }

    async fn supervise(
        storage: Arc<dyn ImageStorage>,
        max_concurrency: usize,
        mut rx: mpsc::Receiver<Message>,
    ) {
        tracing::info!(
            max_concurrency = max_concurrency,
            backend = %storage.backend_type(),
            "Persist queue started"
        );

        let mut in_flight = JoinSet::new();
        let mut acks = Vec::new();

        while let Some(message) = rx.recv().await {
            match message {
                Message::Persist(job) => {
                    Self::dispatch(&storage, &mut in_flight, max_concurrency, job).await;
                }
                Message::Shutdown(ack_tx) => {
                    acks.push(ack_tx);
                    break;
                }
            }
        }

        // Anything sent before the channel closed is still owed a write.
        rx.close();
        while let Some(message) = rx.recv().await {
            match message {
                Message::Persist(job) => {
                    Self::dispatch(&storage, &mut in_flight, max_concurrency, job).await;
                }
                Message::Shutdown(ack_tx) => acks.push(ack_tx),
            }
        }

        while let Some(result) = in_flight.join_next().await {
            Self::reap(result);
        }

        tracing::info!("Persist queue stopped");

        for ack_tx in acks {
            let _ = ack_tx.send(());
        }
    }

    async fn dispatch(
        storage: &Arc<dyn ImageStorage>,
        in_flight: &mut JoinSet<()>,
        max_concurrency: usize,
        job: PersistJob,
    ) {
        while let Some(result) = in_flight.try_join_next() {
            Self::reap(result);
        }
        while in_flight.len() >= max_concurrency {
            if let Some(result) = in_flight.join_next().await {
                Self::reap(result);
            }
        }

        let storage = storage.clone();
        in_flight.spawn(async move {
            Self::run(storage, job).await;
        });
    }

    #[tracing::instrument(skip(storage, job), fields(file_name = %job.file_name))]
    async fn run(storage: Arc<dyn ImageStorage>, job: PersistJob) {
        let start = std::time::Instant::now();
        let size = job.data.len();

        match storage.insert(&job.file_name, job.data).await {
            Ok(location) => {
                tracing::info!(
                    location = %location,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Background persist completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Background persist failed"
                );
            }
        }
    }

    fn reap(result: Result<(), JoinError>) {
        if let Err(e) = result {
            tracing::error!(error = %e, "Persist job panicked or was cancelled");
        }
    }
}
