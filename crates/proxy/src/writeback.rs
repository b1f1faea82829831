//! Detached cache writes, decoupled from the response path.
//!
//! Strategy executors must never block a response on persisting it. Writes
//! go onto an unbounded queue drained by one background worker; failures are
//! logged and dropped, and the `flush` barrier lets shutdown and tests wait
//! for quiescence.

use overcast_core::{CachedResponse, Generation};
use tokio::sync::{mpsc, oneshot};

enum Job {
    Write { generation: Generation, entry: CachedResponse },
    Flush(oneshot::Sender<()>),
}

/// Handle to the write-behind worker.
#[derive(Clone)]
pub struct WriteQueue {
    tx: mpsc::UnboundedSender<Job>,
}

impl WriteQueue {
    /// Start the worker task and return a handle to it.
    pub fn spawn() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                match job {
                    Job::Write { generation, entry } => {
                        if let Err(e) = generation.put(&entry).await {
                            tracing::warn!("cache write for {} failed: {}", entry.url, e);
                        }
                    }
                    Job::Flush(ack) => {
                        let _ = ack.send(());
                    }
                }
            }
        });

        Self { tx }
    }

    /// Queue a write. Never blocks and never fails the caller.
    pub fn enqueue(&self, generation: Generation, entry: CachedResponse) {
        if self.tx.send(Job::Write { generation, entry }).is_err() {
            tracing::warn!("write queue worker gone; dropping cache write");
        }
    }

    /// Wait until every write queued before this call has been applied.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Job::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }
}
