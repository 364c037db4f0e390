//! Primary thread task queue
//!
//! Background threads queue work here; the thread that owns the issuers
//! drains it with [`TaskQueue::process_queued_tasks`], typically once per
//! tick of its main loop.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// A task to execute on the primary thread
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Default queue capacity
pub const QUEUE_CAPACITY: usize = 1024;

/// Why a task could not be queued
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("task queue is full")]
    Full,

    #[error("task queue is disconnected")]
    Disconnected,
}

/// Bounded multi-producer task queue. Clones share the same channel.
#[derive(Clone)]
pub struct TaskQueue {
    sender: Sender<Task>,
    receiver: Receiver<Task>,
    capacity: usize,
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new(QUEUE_CAPACITY)
    }
}

impl TaskQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Queue a task without blocking. A full queue drops the task.
    #[tracing::instrument(skip(self, task))]
    pub fn queue_task<F>(&self, task: F) -> Result<(), QueueError>
    where
        F: FnOnce() + Send + 'static,
    {
        match self.sender.try_send(Box::new(task)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                tracing::warn!("Task queue full, dropping task");
                Err(QueueError::Full)
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::error!("Task queue disconnected");
                Err(QueueError::Disconnected)
            }
        }
    }

    /// Queue a task, blocking while the queue is full
    ///
    /// # Warning
    /// Never call from the thread that processes the queue; it would wait on
    /// itself once the queue fills up.
    #[tracing::instrument(skip(self, task))]
    pub fn queue_task_blocking<F>(&self, task: F) -> Result<(), QueueError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.sender.send(Box::new(task)).map_err(|e| {
            tracing::error!("Failed to queue task (blocking): {}", e);
            QueueError::Disconnected
        })
    }

    /// Run queued tasks, at most one queue's worth per call.
    ///
    /// Returns the number of tasks run.
    #[tracing::instrument(skip(self))]
    pub fn process_queued_tasks(&self) -> usize {
        let mut count = 0;

        while let Ok(task) = self.receiver.try_recv() {
            task();
            count += 1;

            if count >= self.capacity {
                break;
            }
        }

        count
    }

    pub fn queued_task_count(&self) -> usize {
        self.receiver.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_queue_and_process() {
        let queue = TaskQueue::new(8);
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let hits = Arc::clone(&hits);
            queue
                .queue_task(move || {
                    hits.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
        }
        assert_eq!(queue.queued_task_count(), 3);
        assert_eq!(queue.process_queued_tasks(), 3);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(queue.queued_task_count(), 0);
    }

    #[test]
    fn test_full_queue_drops() {
        let queue = TaskQueue::new(1);
        queue.queue_task(|| {}).unwrap();
        assert_eq!(queue.queue_task(|| {}), Err(QueueError::Full));
    }

    #[test]
    fn test_blocking_from_other_thread() {
        let queue = TaskQueue::new(2);
        let producer = queue.clone();
        let handle = std::thread::spawn(move || {
            for _ in 0..4 {
                producer.queue_task_blocking(|| {}).unwrap();
            }
        });

        let mut processed = 0;
        while processed < 4 {
            processed += queue.process_queued_tasks();
            std::thread::yield_now();
        }
        handle.join().unwrap();
        assert_eq!(processed, 4);
    }
}
