// Copyright 2026 The Tickwork Authors.
//
// Use of this source code is governed by a BSD 3-clause
// license that can be found in the LICENSE file.

//! ticker implements the simulated clock's monotonic ticker.

// The ticker plays the role the programmable interval timer
// plays on real hardware: it counts ticks and delivers one
// timer interrupt per tick to the registered handler. The
// counter is an atomic so reading the time never contends
// with the tick path.

use crate::Instant;
use core::sync::atomic::{AtomicU64, Ordering};
use spin::Mutex;

type TickHandler = Box<dyn Fn() + Send + Sync>;

/// Ticker drives the simulated clock, tracking the passage
/// of time by a regular sequence of ticks.
///
/// At most one timer interrupt handler can be registered at
/// a time; registering a new handler replaces the old one.
///
pub struct Ticker {
    counter: AtomicU64,
    handler: Mutex<Option<TickHandler>>,
}

impl Ticker {
    /// Creates a new ticker, with a zero counter and no
    /// timer interrupt handler.
    ///
    pub fn new() -> Self {
        Ticker {
            counter: AtomicU64::new(0),
            handler: Mutex::new(None),
        }
    }

    /// Returns the number of ticks of the internal
    /// chronometer.
    ///
    pub fn ticks(&self) -> u64 {
        self.counter.load(Ordering::Acquire)
    }

    /// Returns an `Instant` representing the current time.
    ///
    pub fn now(&self) -> Instant {
        Instant::new(self.ticks())
    }

    /// Registers `handler` to be called once per tick, after
    /// the counter has advanced.
    ///
    pub fn set_interrupt_handler(&self, handler: impl Fn() + Send + Sync + 'static) {
        *self.handler.lock() = Some(Box::new(handler));
    }

    /// Advances the clock by a single tick, then delivers a
    /// timer interrupt to the registered handler.
    ///
    /// The handler is invoked with the handler slot held, so
    /// it must not call [`set_interrupt_handler`](Ticker::set_interrupt_handler).
    ///
    pub fn tick(&self) {
        self.counter.fetch_add(1, Ordering::Release);
        if let Some(handler) = &*self.handler.lock() {
            handler();
        }
    }

    /// Advances the clock by `ticks` single ticks, delivering
    /// a timer interrupt for each one.
    ///
    pub fn advance(&self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Ticker::new()
    }
}
