//! Event Queue - The single FIFO between producer threads and the dispatch
//! thread.
//!
//! Any thread may post; only the dispatch thread drains. The queue is a
//! mutex-protected `VecDeque` plus a condvar for blocking reads.
//!
//! Two cross-thread primitives sit on top:
//!
//! - [`EventQueue::invoke_later`] - fire-and-forget; the task runs on the
//!   dispatch thread with `&mut Toolkit`
//! - [`EventQueue::invoke_and_wait`] - blocks the caller until the task has
//!   run and hands back its value (or the panic it raised)
//!
//! # Deadlock
//!
//! `invoke_and_wait` must never be called from the dispatch thread: the
//! task could only run once the caller returns. The queue knows which thread
//! dispatches and reports the misuse as
//! [`ToolkitError::WaitOnDispatchThread`] instead of hanging.

use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use tracing::trace;

use super::Event;
use crate::error::{panic_message, Result, ToolkitError};
use crate::toolkit::Toolkit;

// =============================================================================
// OBSERVERS
// =============================================================================

/// Notified (on the posting thread) after every `post_event`.
pub trait QueueObserver: Send + Sync {
    fn event_posted(&self, kind: &'static str);
}

impl<F> QueueObserver for F
where
    F: Fn(&'static str) + Send + Sync,
{
    fn event_posted(&self, kind: &'static str) {
        self(kind)
    }
}

// =============================================================================
// INVOCATION
// =============================================================================

type Task = Box<dyn FnOnce(&mut Toolkit) + Send>;

/// A unit of work to run on the dispatch thread.
pub struct InvocationEvent {
    task: Task,
}

impl InvocationEvent {
    pub fn new(task: impl FnOnce(&mut Toolkit) + Send + 'static) -> Self {
        Self {
            task: Box::new(task),
        }
    }

    pub(crate) fn run(self, toolkit: &mut Toolkit) {
        (self.task)(toolkit)
    }
}

impl fmt::Debug for InvocationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationEvent").finish_non_exhaustive()
    }
}

enum Outcome<R> {
    Pending,
    Done(R),
    Panicked(String),
    Discarded,
}

/// Private per-call signal for `invoke_and_wait`.
struct Handoff<R> {
    state: Mutex<Outcome<R>>,
    ready: Condvar,
}

impl<R> Handoff<R> {
    fn new() -> Self {
        Self {
            state: Mutex::new(Outcome::Pending),
            ready: Condvar::new(),
        }
    }

    fn set(&self, outcome: Outcome<R>) {
        *lock(&self.state) = outcome;
        self.ready.notify_all();
    }

    fn wait(&self) -> Result<R> {
        let mut state = lock(&self.state);
        while matches!(*state, Outcome::Pending) {
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        match std::mem::replace(&mut *state, Outcome::Discarded) {
            Outcome::Done(value) => Ok(value),
            Outcome::Panicked(message) => Err(ToolkitError::InvocationFailed(message)),
            Outcome::Pending | Outcome::Discarded => Err(ToolkitError::InvocationDiscarded),
        }
    }
}

/// Travels inside the task. Dropping it unanswered (the event was
/// discarded) wakes the waiter with an error.
struct Responder<R> {
    handoff: Arc<Handoff<R>>,
    answered: bool,
}

impl<R> Responder<R> {
    fn answer(mut self, outcome: Outcome<R>) {
        self.answered = true;
        self.handoff.set(outcome);
    }
}

impl<R> Drop for Responder<R> {
    fn drop(&mut self) {
        if !self.answered {
            self.handoff.set(Outcome::Discarded);
        }
    }
}

// =============================================================================
// QUEUE
// =============================================================================

struct Shared {
    events: Mutex<VecDeque<Event>>,
    available: Condvar,
    observers: Mutex<Vec<Arc<dyn QueueObserver>>>,
    dispatch_thread: Mutex<Option<ThreadId>>,
}

/// Thread-safe FIFO of events. Cloning yields another handle to the same
/// queue.
#[derive(Clone)]
pub struct EventQueue {
    shared: Arc<Shared>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                events: Mutex::new(VecDeque::new()),
                available: Condvar::new(),
                observers: Mutex::new(Vec::new()),
                dispatch_thread: Mutex::new(None),
            }),
        }
    }

    /// Append an event. Callable from any thread.
    pub fn post_event(&self, event: Event) {
        let kind = event.kind_name();
        trace!(event = kind, source = ?event.source(), "post");

        lock(&self.shared.events).push_back(event);
        self.shared.available.notify_one();

        let observers = lock(&self.shared.observers).clone();
        for observer in &observers {
            observer.event_posted(kind);
        }
    }

    /// Take the next event, blocking until one is available.
    pub fn next_event(&self) -> Event {
        let mut events = lock(&self.shared.events);
        loop {
            if let Some(event) = events.pop_front() {
                return event;
            }
            events = self
                .shared
                .available
                .wait(events)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Take the next event, waiting at most `timeout`.
    pub fn next_event_timeout(&self, timeout: Duration) -> Option<Event> {
        let deadline = Instant::now() + timeout;
        let mut events = lock(&self.shared.events);
        loop {
            if let Some(event) = events.pop_front() {
                return Some(event);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let (guard, _) = self
                .shared
                .available
                .wait_timeout(events, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            events = guard;
        }
    }

    /// Take the next event if one is queued.
    pub fn try_next_event(&self) -> Option<Event> {
        lock(&self.shared.events).pop_front()
    }

    pub fn len(&self) -> usize {
        lock(&self.shared.events).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.shared.events).is_empty()
    }

    /// Discard every queued event. Pending `invoke_and_wait` callers are
    /// woken with [`ToolkitError::InvocationDiscarded`].
    pub fn drain(&self) -> usize {
        let drained = std::mem::take(&mut *lock(&self.shared.events));
        let count = drained.len();
        // Dropped outside the lock: discarded invocations signal their waiters.
        drop(drained);
        count
    }

    /// Run `task` on the dispatch thread at some later point.
    pub fn invoke_later(&self, task: impl FnOnce(&mut Toolkit) + Send + 'static) {
        self.post_event(Event::Invocation(InvocationEvent::new(task)));
    }

    /// Run `task` on the dispatch thread and wait for its result.
    ///
    /// A panic inside the task is caught on the dispatch thread and returned
    /// here as [`ToolkitError::InvocationFailed`]. There is no timeout.
    ///
    /// Calling this from the dispatch thread would deadlock and returns
    /// [`ToolkitError::WaitOnDispatchThread`] instead.
    pub fn invoke_and_wait<R, F>(&self, task: F) -> Result<R>
    where
        F: FnOnce(&mut Toolkit) -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.is_dispatch_thread() {
            return Err(ToolkitError::WaitOnDispatchThread);
        }

        let handoff = Arc::new(Handoff::new());
        let responder = Responder {
            handoff: Arc::clone(&handoff),
            answered: false,
        };

        self.invoke_later(move |toolkit| {
            let outcome = match panic::catch_unwind(AssertUnwindSafe(|| task(toolkit))) {
                Ok(value) => Outcome::Done(value),
                Err(payload) => Outcome::Panicked(panic_message(payload.as_ref())),
            };
            responder.answer(outcome);
        });

        handoff.wait()
    }

    pub fn add_observer(&self, observer: Arc<dyn QueueObserver>) {
        lock(&self.shared.observers).push(observer);
    }

    /// True when called on the thread that drains this queue.
    pub fn is_dispatch_thread(&self) -> bool {
        *lock(&self.shared.dispatch_thread) == Some(thread::current().id())
    }

    pub(crate) fn bind_dispatch_thread(&self) {
        *lock(&self.shared.dispatch_thread) = Some(thread::current().id());
    }

    pub(crate) fn unbind_dispatch_thread(&self) {
        *lock(&self.shared.dispatch_thread) = None;
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQueue")
            .field("len", &self.len())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// TESTS
// =============================================================================
