//! Cross-thread update notifications
//!
//! Producers on any thread post typed update events into a shared queue;
//! the rendering thread drains it once per frame and hands each event to
//! the registered listener before drawing. The queue never blocks a
//! consumer: draining an empty queue is a cheap no-op, and there is no
//! wait-for-event primitive.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// What changed, one variant per update kind
#[derive(Debug, Clone, PartialEq)]
pub enum UpdatePayload {
    /// Structure or geometry of a named model changed
    ModelChanged {
        /// Name of the model that changed
        model: String,
    },
    /// A named numeric parameter took a new value
    ParameterChanged {
        /// Parameter identifier
        parameter: String,
        /// New value
        value: f32,
    },
    /// Part of the scene was shown or hidden
    VisibilityChanged {
        /// Identifier of the affected node or group
        target: String,
        /// New visibility
        visible: bool,
    },
    /// The shared view manipulators moved
    ViewChanged,
}

/// One queued notification: who raised it and what changed
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateEvent {
    /// Identifier of the producer that posted the event
    pub source: String,
    /// What changed
    pub payload: UpdatePayload,
}

/// Errors a listener can raise while handling an update
#[derive(Debug)]
pub enum UpdateError {
    /// The listener has no route for events from this source
    UnknownSource(String),
    /// The payload kind is not meaningful for its target
    UnexpectedPayload {
        /// Source of the offending event
        source: String,
        /// Why the payload was rejected
        reason: String,
    },
}

// Hand-written because `source` here names the event producer, not an
// underlying error; derive(thiserror::Error) would force the field to
// implement std::error::Error.
impl std::fmt::Display for UpdateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownSource(source) => {
                write!(f, "no handler for update source '{source}'")
            }
            Self::UnexpectedPayload { source, reason } => {
                write!(f, "unexpected payload from '{source}': {reason}")
            }
        }
    }
}

impl std::error::Error for UpdateError {}

/// Receiver for drained update events
pub trait UpdateListener {
    /// Handle one update event
    ///
    /// Errors are logged by the drain and do not stop delivery of the
    /// remaining events.
    fn on_update(&mut self, event: &UpdateEvent) -> Result<(), UpdateError>;
}

/// Mutex-guarded FIFO queue of update events
///
/// Cloning produces another handle to the same queue, which is how
/// producer threads get their sender. Posting appends; draining happens
/// only through [`handle_events`](Self::handle_events) on the rendering
/// thread.
#[derive(Clone, Default)]
pub struct UpdateQueue {
    inner: Arc<Mutex<VecDeque<UpdateEvent>>>,
}

impl UpdateQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event to the back of the queue
    pub fn post(&self, source: impl Into<String>, payload: UpdatePayload) {
        let event = UpdateEvent {
            source: source.into(),
            payload,
        };
        log::trace!("Update queued from '{}': {:?}", event.source, event.payload);
        self.lock().push_back(event);
    }

    /// Whether the queue currently holds no events
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of events currently queued
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Drain every queued event into the listener, in posting order
    ///
    /// Events the listener posts while handling are left for the next
    /// drain. A listener error is logged and skipped so one bad event
    /// cannot starve the ones behind it. Returns the number of events
    /// delivered.
    pub fn handle_events(&self, listener: &mut dyn UpdateListener) -> usize {
        // Take the backlog in one swap so the lock is not held across
        // listener calls; a listener may post without deadlocking.
        let drained = std::mem::take(&mut *self.lock());
        let count = drained.len();

        for event in drained {
            if let Err(error) = listener.on_update(&event) {
                log::error!(
                    "Update listener failed on event from '{}': {}",
                    event.source,
                    error
                );
            }
        }
        count
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<UpdateEvent>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            // A poisoned lock means a producer panicked mid-post; the
            // queue itself is still structurally sound.
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    struct CollectingListener {
        seen: Vec<UpdateEvent>,
        fail_on: Option<usize>,
    }

    impl CollectingListener {
        fn new() -> Self {
            Self {
                seen: Vec::new(),
                fail_on: None,
            }
        }

        fn failing_on(index: usize) -> Self {
            Self {
                seen: Vec::new(),
                fail_on: Some(index),
            }
        }
    }

    impl UpdateListener for CollectingListener {
        fn on_update(&mut self, event: &UpdateEvent) -> Result<(), UpdateError> {
            self.seen.push(event.clone());
            if self.fail_on == Some(self.seen.len() - 1) {
                Err(UpdateError::UnknownSource(event.source.clone()))
            } else {
                Ok(())
            }
        }
    }

    struct RepostingListener {
        queue: UpdateQueue,
        handled: usize,
    }

    impl UpdateListener for RepostingListener {
        fn on_update(&mut self, _event: &UpdateEvent) -> Result<(), UpdateError> {
            self.handled += 1;
            if self.handled == 1 {
                self.queue.post("listener", UpdatePayload::ViewChanged);
            }
            Ok(())
        }
    }

    fn parameter(name: &str, value: f32) -> UpdatePayload {
        UpdatePayload::ParameterChanged {
            parameter: name.to_string(),
            value,
        }
    }

    #[test]
    fn test_events_drain_in_posting_order() {
        let queue = UpdateQueue::new();
        queue.post("a", parameter("first", 1.0));
        queue.post("b", parameter("second", 2.0));
        queue.post("c", parameter("third", 3.0));

        let mut listener = CollectingListener::new();
        let delivered = queue.handle_events(&mut listener);

        assert_eq!(delivered, 3);
        let sources: Vec<&str> = listener.seen.iter().map(|e| e.source.as_str()).collect();
        assert_eq!(sources, vec!["a", "b", "c"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_posts_from_another_thread_arrive_in_order() {
        let queue = UpdateQueue::new();
        let producer = queue.clone();

        let handle = thread::spawn(move || {
            for i in 0..8 {
                producer.post("worker", parameter("step", i as f32));
            }
        });
        handle.join().unwrap();

        let mut listener = CollectingListener::new();
        queue.handle_events(&mut listener);

        let values: Vec<f32> = listener
            .seen
            .iter()
            .map(|e| match &e.payload {
                UpdatePayload::ParameterChanged { value, .. } => *value,
                other => panic!("unexpected payload {:?}", other),
            })
            .collect();
        assert_eq!(values, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_listener_error_does_not_stop_the_drain() {
        let queue = UpdateQueue::new();
        queue.post("a", UpdatePayload::ViewChanged);
        queue.post("b", UpdatePayload::ViewChanged);
        queue.post("c", UpdatePayload::ViewChanged);

        let mut listener = CollectingListener::failing_on(1);
        let delivered = queue.handle_events(&mut listener);

        assert_eq!(delivered, 3);
        assert_eq!(listener.seen.len(), 3);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_events_posted_during_drain_wait_for_the_next_one() {
        let queue = UpdateQueue::new();
        queue.post("main", UpdatePayload::ViewChanged);

        let mut listener = RepostingListener {
            queue: queue.clone(),
            handled: 0,
        };
        let first = queue.handle_events(&mut listener);
        assert_eq!(first, 1);
        assert_eq!(queue.len(), 1);

        let second = queue.handle_events(&mut listener);
        assert_eq!(second, 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_empty_drain_is_a_no_op() {
        let queue = UpdateQueue::new();
        let mut listener = CollectingListener::new();

        assert_eq!(queue.handle_events(&mut listener), 0);
        assert!(listener.seen.is_empty());
    }

    #[test]
    fn test_queue_survives_a_poisoned_lock() {
        let queue = UpdateQueue::new();
        queue.post("before", UpdatePayload::ViewChanged);

        // Panic while holding the guard so the mutex gets poisoned.
        let holder = queue.clone();
        let crashed = thread::spawn(move || {
            let _guard = holder.inner.lock().unwrap();
            panic!("producer died mid-post");
        })
        .join();
        assert!(crashed.is_err());

        queue.post("after", UpdatePayload::ViewChanged);
        let mut listener = CollectingListener::new();
        assert_eq!(queue.handle_events(&mut listener), 2);

        let sources: Vec<&str> = listener.seen.iter().map(|e| e.source.as_str()).collect();
        assert_eq!(sources, vec!["before", "after"]);
        assert!(queue.is_empty());
    }
}
