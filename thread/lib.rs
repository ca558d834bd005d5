// Copyright 2026 The Tickwork Authors.
//
// Use of this source code is governed by a BSD 3-clause
// license that can be found in the LICENSE file.

//! Implements the thread collaborator for cooperative synchronisation.
//!
//! This crate gives each OS thread a [`ThreadId`] and the ability to suspend
//! itself until another thread marks it ready again. It stands in for a
//! kernel's thread table and scheduler: marking a thread ready does not run
//! it, it only releases it back to the underlying scheduler.
//!
//! ## Suspending and resuming
//!
//! A thread suspends itself with [`suspend`], and is released by some other
//! thread calling [`resume`] with its id. A primitive that must publish a
//! wait record before suspending splits the two halves apart: it calls
//! [`prepare_sleep`], publishes the record, then calls [`sleep`]. A wake that
//! arrives anywhere between `prepare_sleep` and `sleep` is retained, so the
//! publish-then-suspend sequence can never lose a wakeup.
//!
//! [`resume`] is idempotent: resuming a thread that is already runnable is a
//! no-op, and resuming one several times wakes it once.

#![deny(clippy::missing_panics_doc)]
#![deny(clippy::return_self_not_must_use)]
#![deny(clippy::single_char_lifetime_names)]
#![deny(clippy::wildcard_imports)]
#![deny(unused_crate_dependencies)]
#![forbid(unsafe_code)]

mod waiter;

use crate::waiter::Waiter;
use crossbeam::atomic::AtomicCell;
use lazy_static::lazy_static;
use log::trace;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type ThreadTable = BTreeMap<ThreadId, Arc<Thread>>;

lazy_static! {
    /// THREADS stores all living threads, referencing them by
    /// their thread id.
    ///
    static ref THREADS: spin::Mutex<ThreadTable> = spin::Mutex::new(BTreeMap::new());
}

thread_local! {
    /// The calling OS thread's identity and thread record,
    /// registered in THREADS on first use and deregistered
    /// when the thread exits.
    ///
    static CURRENT: CurrentThread = CurrentThread::register();
}

/// Uniquely identifies a thread.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ThreadId(u64);

impl ThreadId {
    /// Allocates and returns the next available ThreadId.
    ///
    fn new() -> Self {
        static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);
        ThreadId(NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns a numerical representation for the thread
    /// ID.
    ///
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Marks the referenced thread ready, using [`resume`].
    ///
    pub fn resume(&self) -> bool {
        resume(*self)
    }
}

/// Describes the scheduling state of a thread.
///
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ThreadState {
    /// The thread is runnable.
    Runnable,

    /// The thread is sleeping, or committed
    /// to sleep.
    Sleeping,

    /// The thread is in the process of
    /// exiting.
    Exiting,
}

/// Contains the shared record for a thread of execution.
///
struct Thread {
    // The thread's current state.
    state: AtomicCell<ThreadState>,

    // The one-shot waiter for the thread's current sleep,
    // installed by prepare_sleep and removed once the sleep
    // is over. While this is present, completing the waiter
    // releases the thread.
    waiting: spin::Mutex<Option<Arc<Waiter>>>,
}

/// Holds the calling thread's identity for the duration of
/// the thread, deregistering it again on exit.
///
struct CurrentThread {
    id: ThreadId,
    thread: Arc<Thread>,
}

impl CurrentThread {
    fn register() -> Self {
        let id = ThreadId::new();
        let thread = Arc::new(Thread {
            state: AtomicCell::new(ThreadState::Runnable),
            waiting: spin::Mutex::new(None),
        });

        THREADS.lock().insert(id, thread.clone());
        trace!("registered thread {}", id.as_u64());

        CurrentThread { id, thread }
    }
}

impl Drop for CurrentThread {
    fn drop(&mut self) {
        // Flip the state before removing the entry, so a
        // racing resume that still holds the Arc sees the
        // thread as exiting.
        self.thread.state.store(ThreadState::Exiting);
        THREADS.lock().remove(&self.id);
        trace!("deregistered thread {}", self.id.as_u64());
    }
}

/// Returns the calling thread's id, registering the thread
/// if this is its first use.
///
pub fn current() -> ThreadId {
    CURRENT.with(|current| current.id)
}

/// Returns the given thread's scheduling state, or `None`
/// if no thread with that id is alive.
///
pub fn state(thread_id: ThreadId) -> Option<ThreadState> {
    THREADS
        .lock()
        .get(&thread_id)
        .map(|thread| thread.state.load())
}

/// Commits the calling thread to its next [`sleep`].
///
/// From this point until the thread calls `sleep`, any
/// [`resume`] for it is retained and will make that `sleep`
/// return immediately. This lets a caller publish a wait
/// record between the two halves without a wake slipping
/// through the gap.
///
pub fn prepare_sleep() {
    CURRENT.with(|current| {
        let mut waiting = current.thread.waiting.lock();
        debug_assert!(waiting.is_none(), "thread committed to sleep twice");
        *waiting = Some(Arc::new(Waiter::new()));
        current.thread.state.store(ThreadState::Sleeping);
    });
}

/// Blocks the calling thread until it is marked ready.
///
/// Must be paired with an earlier [`prepare_sleep`]; if the
/// thread was resumed in between, `sleep` returns without
/// blocking. A bare `sleep` with no pending commitment
/// returns immediately.
///
#[allow(clippy::missing_panics_doc)] // Will only panic if a resuming thread panicked mid-wake.
pub fn sleep() {
    CURRENT.with(|current| {
        // Leave the waiter installed while we block so a
        // racing resume can still find and complete it.
        let waiter = current.thread.waiting.lock().clone();
        if let Some(waiter) = waiter {
            waiter.wait();
        }

        // Retire the waiter and the state together, under
        // the slot lock, so a resume never sees one without
        // the other.
        let mut waiting = current.thread.waiting.lock();
        *waiting = None;
        current.thread.state.store(ThreadState::Runnable);
    });
}

/// Puts the calling thread to sleep until another thread
/// [`resume`]s it.
///
pub fn suspend() {
    prepare_sleep();
    sleep();
}

/// Marks the given thread ready, releasing it if it is
/// suspended (or committed to suspend).
///
/// `resume` returns whether the thread still exists and is
/// now runnable. Resuming an already-runnable thread is a
/// no-op that returns `true`.
///
pub fn resume(thread_id: ThreadId) -> bool {
    let thread = match THREADS.lock().get(&thread_id) {
        None => return false,
        Some(thread) => thread.clone(),
    };

    if thread.state.load() == ThreadState::Exiting {
        return false;
    }

    // Hold the slot lock across the wake, so this call
    // acts atomically on whichever sleep (if any) is
    // current when it runs.
    let waiting = thread.waiting.lock();
    match &*waiting {
        Some(waiter) => {
            trace!("resuming thread {}", thread_id.as_u64());
            thread.state.store(ThreadState::Runnable);
            waiter.wake();
            true
        }
        None => true,
    }
}
