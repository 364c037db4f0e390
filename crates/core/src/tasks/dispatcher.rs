//! Dispatching commands off the primary thread
//!
//! [`AsyncDispatcher`] owns a worker thread that runs command lines against a
//! shared [`CommandManager`]. Invocations created there report
//! `is_async() == true`. Replies can be routed back to the primary thread by
//! wrapping the issuer in a [`QueuedIssuer`].

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use super::queue::{QueueError, TaskQueue};
use crate::commands::CommandManager;
use crate::error::CommandError;
use crate::issuer::{CommandIssuer, IssuerRef};

/// Issuer whose replies are queued onto a [`TaskQueue`] instead of being
/// delivered from the calling thread
pub struct QueuedIssuer {
    inner: IssuerRef,
    queue: TaskQueue,
}

impl QueuedIssuer {
    pub fn new(inner: IssuerRef, queue: TaskQueue) -> Arc<Self> {
        Arc::new(Self { inner, queue })
    }

    pub fn inner(&self) -> &IssuerRef {
        &self.inner
    }

    fn deliver(&self, message: &str, send: fn(&dyn CommandIssuer, &str)) {
        let inner = Arc::clone(&self.inner);
        let message = message.to_string();
        if self
            .queue
            .queue_task(move || send(inner.as_ref(), &message))
            .is_err()
        {
            warn!("Dropped reply to {}", self.inner.unique_id());
        }
    }
}

impl CommandIssuer for QueuedIssuer {
    fn is_player(&self) -> bool {
        self.inner.is_player()
    }

    fn unique_id(&self) -> Uuid {
        self.inner.unique_id()
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.inner.has_permission(permission)
    }

    fn send_message(&self, message: &str) {
        self.deliver(message, |issuer, m| issuer.send_message(m));
    }

    fn send_error(&self, message: &str) {
        self.deliver(message, |issuer, m| issuer.send_error(m));
    }

    fn send_info(&self, message: &str) {
        self.deliver(message, |issuer, m| issuer.send_info(m));
    }
}

/// Outcome of one queued dispatch
pub type DispatchResult = Result<(), CommandError>;

struct Job {
    issuer: IssuerRef,
    line: String,
    reply: Sender<DispatchResult>,
}

/// Handle to the dispatch worker thread
pub struct AsyncDispatcher {
    tx: Mutex<Option<Sender<Job>>>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl AsyncDispatcher {
    /// Spawn the worker thread
    pub fn spawn(manager: Arc<CommandManager>) -> std::io::Result<Self> {
        let (tx, rx) = unbounded::<Job>();
        let handle = thread::Builder::new()
            .name("acf-dispatch".into())
            .spawn(move || Self::worker_loop(manager, rx))?;
        Ok(Self {
            tx: Mutex::new(Some(tx)),
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Run until every sender is gone
    fn worker_loop(manager: Arc<CommandManager>, rx: Receiver<Job>) {
        for job in rx {
            let result = manager.dispatch_line(&job.issuer, &job.line, true);
            // The submitter may not care about the outcome
            let _ = job.reply.send(result);
        }
        debug!("Dispatch worker stopped");
    }

    /// Queue `line` for dispatch as `issuer`.
    ///
    /// The returned channel yields the dispatch result once it has run.
    pub fn submit(
        &self,
        issuer: IssuerRef,
        line: &str,
    ) -> Result<Receiver<DispatchResult>, QueueError> {
        let (reply, result) = crossbeam_channel::bounded(1);
        let tx = self.tx.lock();
        let tx = tx.as_ref().ok_or(QueueError::Disconnected)?;
        tx.send(Job {
            issuer,
            line: line.to_string(),
            reply,
        })
        .map_err(|_| QueueError::Disconnected)?;
        Ok(result)
    }

    /// Stop accepting work, finish what is queued and join the worker
    pub fn shutdown(&self) {
        self.tx.lock().take();
        if let Some(handle) = self.handle.lock().take() {
            if handle.join().is_err() {
                warn!("Dispatch worker panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.tx.lock().is_some()
    }
}

impl Drop for AsyncDispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
