// Copyright 2026 The Tickwork Authors.
//
// Use of this source code is governed by a BSD 3-clause
// license that can be found in the LICENSE file.

//! Implements named synchronous value exchange between pairs of threads.
//!
//! A [`Rendezvous`] lets two threads meet at an integer tag and swap values:
//! the first thread to call [`exchange`](Rendezvous::exchange) for a tag
//! blocks until a second thread arrives with the same tag, at which point
//! each call returns the other thread's value. Distinct tags are fully
//! independent synchronisation points, and the same tag can be reused for
//! any number of exchanges.
//!
//! ## Rounds
//!
//! One complete first-party/second-party swap on a tag is a round. Rounds on
//! one tag are strictly sequential: a thread arriving while a round is still
//! being finalised waits for the next round rather than joining or
//! disturbing the current one. The second party of a round never blocks.
//!
//! There is no timeout: a thread that exchanges on a tag with no eventual
//! partner blocks forever. That liveness risk rests with the caller.

#![deny(clippy::missing_panics_doc)]
#![deny(clippy::return_self_not_must_use)]
#![deny(clippy::single_char_lifetime_names)]
#![deny(clippy::wildcard_imports)]
#![deny(unused_crate_dependencies)]
#![forbid(unsafe_code)]

use log::trace;
use std::collections::BTreeMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

/// Rendezvous allows threads to synchronously exchange values.
///
/// Each tag names an independent exchange point, created lazily on first
/// use and owned by the `Rendezvous` for its whole lifetime.
///
pub struct Rendezvous<T> {
    points: spin::Mutex<BTreeMap<u64, Arc<Point<T>>>>,
}

impl<T> Rendezvous<T> {
    /// Allocates a new rendezvous with no exchange points.
    ///
    pub fn new() -> Self {
        Rendezvous {
            points: spin::Mutex::new(BTreeMap::new()),
        }
    }

    /// Synchronously exchanges a value with another thread.
    ///
    /// The first thread to arrive at `tag` blocks, holding its value. When
    /// a second thread arrives at the same tag, the first thread's call
    /// returns the second thread's value and vice versa; the second thread
    /// does not block. Calls using different tags never interact.
    ///
    /// # Panics
    ///
    /// Panics if a previous party panicked while updating this tag's
    /// exchange point.
    ///
    pub fn exchange(&self, tag: u64, value: T) -> T {
        self.point(tag).exchange(tag, value)
    }

    /// Returns the exchange point for `tag`, creating it if
    /// this is the tag's first use.
    ///
    fn point(&self, tag: u64) -> Arc<Point<T>> {
        self.points
            .lock()
            .entry(tag)
            .or_insert_with(|| Arc::new(Point::new()))
            .clone()
    }
}

impl<T> Default for Rendezvous<T> {
    fn default() -> Self {
        Rendezvous::new()
    }
}

/// Describes how far the current round at one exchange
/// point has progressed.
///
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Phase {
    /// No value has been offered; the next arrival opens
    /// a round.
    Empty,

    /// A first party has offered a value and is waiting
    /// for a partner.
    Offered,

    /// A second party has arrived and the round is being
    /// finalised; the first party has yet to take its value.
    Exchanging,
}

/// The state of one round at one exchange point.
///
struct Round<T> {
    phase: Phase,
    slot: Option<T>,
}

/// A single exchange point, a monitor over its round state.
///
/// The invariant that makes rounds safe to replay: `slot` is only written
/// by the party that moves `phase` forward, and only the first party of the
/// round moves `phase` back to `Empty`, after it has emptied the slot.
///
struct Point<T> {
    round: Mutex<Round<T>>,

    // Signalled when a second party completes the round,
    // releasing the round's first party.
    partner_arrived: Condvar,

    // Signalled when a finished round returns the point to
    // Empty, admitting waiting threads to the next round.
    round_open: Condvar,
}

impl<T> Point<T> {
    fn new() -> Self {
        Point {
            round: Mutex::new(Round {
                phase: Phase::Empty,
                slot: None,
            }),
            partner_arrived: Condvar::new(),
            round_open: Condvar::new(),
        }
    }

    fn exchange(&self, tag: u64, value: T) -> T {
        let mut round = self.lock_round();

        // Queue behind a round that is still being finalised.
        // A new round only opens once the previous round's
        // first party has taken its value.
        while round.phase == Phase::Exchanging {
            round = self
                .round_open
                .wait(round)
                .expect("rendezvous point poisoned");
        }

        match round.phase {
            Phase::Empty => {
                // First party: offer our value and wait for
                // a partner to complete the round.
                round.phase = Phase::Offered;
                round.slot = Some(value);
                trace!("tag {}: first party waiting", tag);

                while round.phase != Phase::Exchanging {
                    round = self
                        .partner_arrived
                        .wait(round)
                        .expect("rendezvous point poisoned");
                }

                // Our partner left its value in the slot.
                // Taking it closes the round and opens the
                // point for the next one.
                let received = round.slot.take().expect("exchanging round has no value");
                round.phase = Phase::Empty;
                self.round_open.notify_all();
                trace!("tag {}: round complete", tag);

                received
            }
            Phase::Offered => {
                // Second party: swap our value for the one
                // on offer and release the first party. We
                // return without blocking.
                let received = round.slot.replace(value).expect("offered round has no value");
                round.phase = Phase::Exchanging;
                self.partner_arrived.notify_all();
                trace!("tag {}: second party arrived", tag);

                received
            }
            // The queueing loop above holds the lock until
            // the phase is Empty or Offered.
            Phase::Exchanging => unreachable!("exchange admitted during a closing round"),
        }
    }

    fn lock_round(&self) -> MutexGuard<'_, Round<T>> {
        self.round.lock().expect("rendezvous point poisoned")
    }
}
