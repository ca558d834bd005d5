// Copyright 2026 The Tickwork Authors.
//
// Use of this source code is governed by a BSD 3-clause
// license that can be found in the LICENSE file.

//! Implements the timed sleep service over the priority queue of wake requests.
//!
//! An [`Alarm`] lets a thread suspend itself for at least a requested number
//! of ticks with [`Alarm::wait_until`]. Each pending sleep is a wake request
//! in a min-heap ordered by wake-up instant. Once per tick the clock driver
//! delivers a timer interrupt, and the alarm releases every thread whose
//! wake-up instant has arrived. A pending sleep can also be ended early by
//! another thread with [`Alarm::cancel`].
//!
//! Requests with the same wake-up instant are released in no particular
//! order; the only guarantees are that no thread is released before its
//! wake-up instant, and that every thread is released on the first tick at
//! or after it.

#![deny(clippy::missing_panics_doc)]
#![deny(clippy::return_self_not_must_use)]
#![deny(clippy::single_char_lifetime_names)]
#![deny(clippy::wildcard_imports)]
#![deny(unused_crate_dependencies)]
#![forbid(unsafe_code)]

use log::trace;
use spin::Mutex;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use thread::ThreadId;
use time::{Instant, Ticker};

/// Alarm suspends threads until a chosen tick arrives.
///
/// The alarm owns the priority queue of pending wake requests. Constructing
/// an alarm with [`Alarm::new`] registers it as the ticker's timer interrupt
/// handler, so the queue is processed once per tick.
///
pub struct Alarm {
    ticker: Arc<Ticker>,
    timers: Mutex<BinaryHeap<Timer>>,
}

impl Alarm {
    /// Allocates a new alarm driven by the given ticker.
    ///
    /// The alarm registers itself as the ticker's timer interrupt handler.
    /// A ticker drives at most one alarm; registering another replaces the
    /// first.
    ///
    pub fn new(ticker: Arc<Ticker>) -> Arc<Alarm> {
        let alarm = Arc::new(Alarm {
            ticker: ticker.clone(),
            timers: Mutex::new(BinaryHeap::new()),
        });

        // Register via a weak handle so the clock driver
        // does not keep a dropped alarm alive.
        let handler = Arc::downgrade(&alarm);
        ticker.set_interrupt_handler(move || {
            if let Some(alarm) = handler.upgrade() {
                alarm.on_tick();
            }
        });

        alarm
    }

    /// Puts the current thread to sleep for at least `ticks` ticks, waking
    /// it in the timer interrupt handler.
    ///
    /// The thread is marked ready during the first timer interrupt where
    /// the current time has reached the time of the call plus `ticks`.
    /// Asking to wait for zero ticks returns immediately.
    ///
    pub fn wait_until(&self, ticks: u64) {
        if ticks == 0 {
            return;
        }

        let thread_id = thread::current();
        let wakeup = self.ticker.now().plus_ticks(ticks);

        // Commit to the sleep before publishing the wake
        // request, so the request cannot fire against a
        // thread that has not reached its sleep yet.
        thread::prepare_sleep();
        self.timers.lock().push(Timer::new(thread_id, wakeup));
        trace!(
            "thread {} sleeping until tick {}",
            thread_id.as_u64(),
            wakeup.ticks()
        );
        thread::sleep();
    }

    /// The timer interrupt handler, invoked by the ticker once per tick.
    ///
    /// `on_tick` removes every wake request whose instant has arrived,
    /// marking the corresponding threads as runnable. It drains all due
    /// requests, not just the earliest, since many sleepers can share a
    /// tick.
    ///
    #[allow(clippy::missing_panics_doc)] // Will only panic if the timer state is inconsistent.
    pub fn on_tick(&self) {
        let now = self.ticker.now();
        let mut timers = self.timers.lock();
        loop {
            if let Some(next) = timers.peek() {
                if next.wakeup.after(now) {
                    // Nothing more ready.
                    return;
                }

                let next = timers.pop().unwrap();
                trace!("waking thread {} at tick {}", next.thread_id.as_u64(), now.ticks());
                next.thread_id.resume();
            } else {
                // Nothing left to do.
                return;
            }
        }
    }

    /// Cancels any pending wake request set by `thread_id`, waking the
    /// thread immediately and returning `true`. If the thread has no
    /// pending request, returns `false` and has no effect.
    ///
    pub fn cancel(&self, thread_id: ThreadId) -> bool {
        let mut timers = self.timers.lock();
        let before = timers.len();
        timers.retain(|timer| timer.thread_id != thread_id);
        let cancelled = timers.len() != before;
        drop(timers);

        if cancelled {
            trace!("cancelled wake request for thread {}", thread_id.as_u64());
            thread_id.resume();
        }

        cancelled
    }

    /// Returns the number of pending wake requests.
    ///
    pub fn pending(&self) -> usize {
        self.timers.lock().len()
    }
}

/// Represents a tick at which a thread should be woken.
///
#[derive(Clone, Copy, Eq)]
struct Timer {
    wakeup: Instant,
    thread_id: ThreadId,
}

impl Timer {
    /// new creates a timer that will wake the given thread
    /// at or after the given instant.
    ///
    fn new(thread_id: ThreadId, wakeup: Instant) -> Self {
        Timer { wakeup, thread_id }
    }
}

impl PartialEq for Timer {
    fn eq(&self, other: &Timer) -> bool {
        self.wakeup == other.wakeup
    }
}

// Describe how timers are ordered, which is the reverse of
// what you'd expect. That is, a timer with a smaller wakeup
// has a higher priority and therefore compares as 'larger'.
//
impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.wakeup.cmp(&other.wakeup) {
            Ordering::Equal => Ordering::Equal,
            Ordering::Less => Ordering::Greater,
            _ => Ordering::Less,
        }
    }
}
