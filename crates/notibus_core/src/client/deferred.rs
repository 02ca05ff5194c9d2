//! FIFO of callbacks held until the remote service is ready.
//!
//! # Invariants
//! - `flush` detaches the whole queue before running anything, so a flushed
//!   task never runs twice.
//! - Tasks run in insertion order and have no error channel.

use std::collections::VecDeque;
use std::fmt;
use uuid::Uuid;

/// Opaque handle returned by [`DeferredTaskQueue::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskToken(Uuid);

impl TaskToken {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

pub type DeferredTask = Box<dyn FnOnce()>;

#[derive(Default)]
pub struct DeferredTaskQueue {
    tasks: VecDeque<(TaskToken, DeferredTask)>,
}

impl fmt::Debug for DeferredTaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredTaskQueue")
            .field("len", &self.tasks.len())
            .finish()
    }
}

impl DeferredTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, task: impl FnOnce() + 'static) -> TaskToken {
        let token = TaskToken::new();
        self.tasks.push_back((token, Box::new(task)));
        token
    }

    /// Removes the task registered under `token`; false if already gone.
    pub fn del(&mut self, token: TaskToken) -> bool {
        match self.tasks.iter().position(|(queued, _)| *queued == token) {
            Some(index) => self.tasks.remove(index).is_some(),
            None => false,
        }
    }

    /// Runs every queued task once and empties the queue.
    ///
    /// Returns the number of tasks run.
    pub fn flush(&mut self) -> usize {
        let tasks = std::mem::take(&mut self.tasks);
        let ran = tasks.len();
        for (_, task) in tasks {
            task();
        }
        ran
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
