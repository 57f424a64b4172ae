//! Bounded background work queue.
//!
//! The client-poll entry point acknowledges its caller immediately and defers the actual verification to this queue.
//! There is no return channel to the submitter: completion is observable only through the reconciliation ledger.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::sync::mpsc;

use crate::db_types::TxReference;

pub type JobHandler<J> = Arc<dyn Fn(J) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// A request to verify and reconcile a transaction out-of-band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyJob {
    pub reference: TxReference,
    /// Name of the gateway-settings document to resolve credentials from.
    pub gateway: String,
}

/// Owns the receiving half of the queue and the handler that processes jobs. Each job runs in its own task, so a
/// slow provider call does not hold up the queue.
pub struct JobQueue<J: Send + 'static> {
    receiver: mpsc::Receiver<J>,
    sender: mpsc::Sender<J>,
    handler: JobHandler<J>,
}

impl<J: Send + 'static> JobQueue<J> {
    pub fn new(buffer_size: usize, handler: JobHandler<J>) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size);
        Self { receiver, sender, handler }
    }

    pub fn sink(&self) -> JobSink<J> {
        JobSink { sender: self.sender.clone() }
    }

    /// Runs until every [`JobSink`] has been dropped and the queue has drained.
    pub async fn run(mut self) {
        debug!("📬️ Job queue started");
        // Drop the internal sender so the queue shuts down once the last external sink is gone.
        drop(self.sender);
        while let Some(job) = self.receiver.recv().await {
            trace!("📬️ Picking up background job");
            let handler = Arc::clone(&self.handler);
            tokio::spawn(async move {
                (handler)(job).await;
                trace!("📬️ Background job finished");
            });
        }
        debug!("📬️ Job queue has shut down");
    }
}

/// Cloneable producer handle for submitting jobs.
#[derive(Clone)]
pub struct JobSink<J: Send> {
    sender: mpsc::Sender<J>,
}

impl<J: Send> JobSink<J> {
    /// Fire-and-forget submission. A full or closed queue is logged, not surfaced: the submitter has already been
    /// acknowledged and has no way to act on the failure.
    pub async fn submit(&self, job: J) {
        if let Err(e) = self.sender.send(job).await {
            error!("📬️ Could not submit background job: {e}");
        }
    }
}
