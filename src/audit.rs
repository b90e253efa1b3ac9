use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

use crate::auth::repo::HistoryRepo;
use crate::auth::repo_types::NewHistoryEvent;

/// Handle for enqueuing account history events.
///
/// Events are written by a fixed pool of workers sharing one bounded channel.
/// Enqueueing never waits: when the queue is full or the workers are gone the
/// event is dropped with a warning.
#[derive(Clone)]
pub struct AuditQueue {
    tx: mpsc::Sender<NewHistoryEvent>,
}

impl AuditQueue {
    /// Spawns `workers` tasks draining a queue of `capacity` events into `repo`.
    pub fn spawn(repo: Arc<dyn HistoryRepo>, workers: usize, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel::<NewHistoryEvent>(capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));

        for worker in 0..workers.max(1) {
            tokio::spawn(worker_loop(worker, repo.clone(), rx.clone()));
        }

        Self { tx }
    }

    pub fn record(&self, event: NewHistoryEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(ev)) => {
                warn!(user_id = ev.user_id, event = ev.event.as_str(), "audit queue full; event dropped");
            }
            Err(mpsc::error::TrySendError::Closed(ev)) => {
                warn!(user_id = ev.user_id, event = ev.event.as_str(), "audit queue closed; event dropped");
            }
        }
    }
}

async fn worker_loop(
    worker: usize,
    repo: Arc<dyn HistoryRepo>,
    rx: Arc<Mutex<mpsc::Receiver<NewHistoryEvent>>>,
) {
    loop {
        // lock is held only while waiting for the next event
        let next = rx.lock().await.recv().await;
        let Some(event) = next else {
            debug!(worker, "audit worker stopping");
            break;
        };
        if let Err(e) = repo.record(event).await {
            warn!(worker, error = %e, user_id = event.user_id, "failed to write account history");
        }
    }
}
