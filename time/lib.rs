// Copyright 2026 The Tickwork Authors.
//
// Use of this source code is governed by a BSD 3-clause
// license that can be found in the LICENSE file.

//! Handles the simulated hardware clock for regular ticks.
//!
//! This crate focuses on time-related functionality. Time only advances in
//! whole ticks, driven by whoever owns the [`Ticker`]: each call to
//! [`Ticker::tick`] advances the clock by one tick and delivers one timer
//! interrupt to the registered handler.
//!
//! The [`Instant`] type can be used to measure and compare points in tick
//! time.

#![deny(clippy::missing_panics_doc)]
#![deny(clippy::return_self_not_must_use)]
#![deny(clippy::single_char_lifetime_names)]
#![deny(clippy::wildcard_imports)]
#![deny(unused_crate_dependencies)]
#![forbid(unsafe_code)]

mod ticker;

pub use crate::ticker::Ticker;

/// Represents a single point on a monotonically non-decreasing
/// tick clock.
///
/// An `Instant` is made useful by comparing it with another
/// `Instant`, or by asking a [`Ticker`] whether it has been
/// reached yet.
///
#[derive(Copy, Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Instant(u64);

impl Instant {
    /// Returns an `Instant` representing the given number
    /// of ticks.
    ///
    pub const fn new(ticks: u64) -> Self {
        Instant(ticks)
    }

    /// Returns the number of ticks this instant represents.
    ///
    pub const fn ticks(&self) -> u64 {
        self.0
    }

    /// Returns whether this instant occurs after the other.
    ///
    pub fn after(self, other: Self) -> bool {
        self.0 > other.0
    }

    /// Returns whether this instant occurs before the other.
    ///
    pub fn before(self, other: Self) -> bool {
        self.0 < other.0
    }

    /// Returns the `Instant` that occurs `ticks` ticks after
    /// this one.
    ///
    /// # Panics
    ///
    /// This function will panic if the resulting instant would
    /// overflow the tick counter.
    ///
    #[must_use]
    pub fn plus_ticks(self, ticks: u64) -> Self {
        match self.0.checked_add(ticks) {
            Some(sum) => Instant(sum),
            None => panic!("instant overflowed the tick counter"),
        }
    }

    /// Returns the number of ticks that passed between the
    /// two `Instant`s.
    ///
    /// # Panics
    ///
    /// This function will panic if `earlier` is later than `self`.
    ///
    pub fn ticks_since(&self, earlier: Instant) -> u64 {
        if self.0 < earlier.0 {
            panic!("ticks_since called with later instant");
        }

        self.0 - earlier.0
    }
}
