// Copyright 2026 The Tickwork Authors.
//
// Use of this source code is governed by a BSD 3-clause
// license that can be found in the LICENSE file.

//! waiter implements the one-shot wake channel behind a sleep.

// Each sleep gets a fresh waiter, so a wake can only ever
// complete the sleep it was aimed at. The woken flag is
// sticky: waking before the sleeper blocks simply makes the
// wait return immediately, and waking twice is a no-op.

use std::sync::{Condvar, Mutex};

/// A one-shot wake-up channel for a single sleeping thread.
///
pub(crate) struct Waiter {
    woken: Mutex<bool>,
    cond: Condvar,
}

impl Waiter {
    pub(crate) fn new() -> Self {
        Waiter {
            woken: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    /// Blocks until the waiter is woken. Returns immediately
    /// if it already has been.
    ///
    pub(crate) fn wait(&self) {
        let mut woken = self.woken.lock().expect("waiter lock poisoned");
        while !*woken {
            woken = self.cond.wait(woken).expect("waiter lock poisoned");
        }
    }

    /// Wakes the waiter. Waking an already-woken waiter has
    /// no further effect.
    ///
    pub(crate) fn wake(&self) {
        let mut woken = self.woken.lock().expect("waiter lock poisoned");
        *woken = true;
        self.cond.notify_all();
    }
}
