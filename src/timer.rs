use std::time::Duration;

/// Identifies one scheduled delay. Ids are never reused by a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub(crate) u64);

/// Host-side timer facility used by the playback controller.
///
/// When a scheduled timer elapses the host calls
/// [`PlaybackInteractionController::timer_fired`](crate::PlaybackInteractionController::timer_fired).
pub trait TimerScheduler {
    fn schedule(&mut self, id: TimerId, delay: Duration);

    fn cancel(&mut self, id: TimerId);
}

/// A timer request recorded by [`QueuedScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerRequest {
    Schedule(TimerId, Duration),
    Cancel(TimerId),
}

/// Records timer requests so a host can apply them after the controller call
/// that produced them returns.
#[derive(Debug, Default)]
pub struct QueuedScheduler {
    requests: Vec<TimerRequest>,
}

impl QueuedScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the pending requests, in issue order.
    pub fn drain(&mut self) -> Vec<TimerRequest> {
        std::mem::take(&mut self.requests)
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

impl TimerScheduler for QueuedScheduler {
    fn schedule(&mut self, id: TimerId, delay: Duration) {
        self.requests.push(TimerRequest::Schedule(id, delay));
    }

    fn cancel(&mut self, id: TimerId) {
        // Nothing to tell the host if the timer never left the queue.
        let before = self.requests.len();
        self.requests
            .retain(|request| !matches!(request, TimerRequest::Schedule(queued, _) if *queued == id));
        if self.requests.len() == before {
            self.requests.push(TimerRequest::Cancel(id));
        }
    }
}
