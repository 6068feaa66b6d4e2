use std::future::Future;

use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;

/// Continuations spawned by one form.
#[derive(Debug, Clone)]
pub(crate) struct TaskSet {
    tracker: TaskTracker,
    handle: Handle,
}

impl TaskSet {
    pub(crate) fn new(handle: Handle) -> Self {
        Self {
            tracker: TaskTracker::new(),
            handle,
        }
    }

    pub(crate) fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(self.tracker.track_future(future));
    }

    /// Wait for every tracked task, including tasks spawned while waiting.
    pub(crate) async fn settle(&self) {
        loop {
            self.tracker.close();
            self.tracker.wait().await;
            self.tracker.reopen();
            if self.tracker.is_empty() {
                break;
            }
        }
    }
}
