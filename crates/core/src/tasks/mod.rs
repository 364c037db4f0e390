//! Work that crosses threads
//!
//! - [`TaskQueue`] carries closures to the primary thread.
//! - [`AsyncDispatcher`] runs command lines on a worker thread.

mod dispatcher;
mod queue;

pub use dispatcher::{AsyncDispatcher, DispatchResult, QueuedIssuer};
pub use queue::{QueueError, Task, TaskQueue, QUEUE_CAPACITY};
