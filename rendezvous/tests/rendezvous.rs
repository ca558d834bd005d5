// Copyright 2026 The Tickwork Authors.
//
// Use of this source code is governed by a BSD 3-clause
// license that can be found in the LICENSE file.

//! Multi-thread scenarios for the rendezvous.

use rendezvous::Rendezvous;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn exchange_pairs_two_threads() {
    let rendezvous = Arc::new(Rendezvous::new());

    let first = {
        let rendezvous = rendezvous.clone();
        thread::spawn(move || rendezvous.exchange(0, -1i64))
    };
    let second = {
        let rendezvous = rendezvous.clone();
        thread::spawn(move || rendezvous.exchange(0, 1i64))
    };

    // Whichever thread arrived first, each must receive
    // the other's value.
    assert_eq!(first.join().unwrap(), 1);
    assert_eq!(second.join().unwrap(), -1);
}

#[test]
fn rounds_are_reusable() {
    let rendezvous = Arc::new(Rendezvous::new());

    // First round on tag 0.
    let a = {
        let rendezvous = rendezvous.clone();
        thread::spawn(move || rendezvous.exchange(0, -1i64))
    };
    let b = {
        let rendezvous = rendezvous.clone();
        thread::spawn(move || rendezvous.exchange(0, 1i64))
    };
    assert_eq!(a.join().unwrap(), 1);
    assert_eq!(b.join().unwrap(), -1);

    // A fresh pair on the same tag behaves identically,
    // with nothing left over from the first round.
    let c = {
        let rendezvous = rendezvous.clone();
        thread::spawn(move || rendezvous.exchange(0, -2i64))
    };
    let d = {
        let rendezvous = rendezvous.clone();
        thread::spawn(move || rendezvous.exchange(0, 2i64))
    };
    assert_eq!(c.join().unwrap(), 2);
    assert_eq!(d.join().unwrap(), -2);
}

#[test]
fn tags_are_independent() {
    let rendezvous = Arc::new(Rendezvous::new());

    let a_done = Arc::new(AtomicBool::new(false));
    let b_done = Arc::new(AtomicBool::new(false));

    let a = {
        let rendezvous = rendezvous.clone();
        let a_done = a_done.clone();
        thread::spawn(move || {
            let received = rendezvous.exchange(0, 10i64);
            a_done.store(true, Ordering::SeqCst);
            received
        })
    };
    let b = {
        let rendezvous = rendezvous.clone();
        let b_done = b_done.clone();
        thread::spawn(move || {
            let received = rendezvous.exchange(1, 20i64);
            b_done.store(true, Ordering::SeqCst);
            received
        })
    };

    // Neither can be released by the other: they wait on
    // different tags.
    thread::sleep(Duration::from_millis(50));
    assert_eq!(a_done.load(Ordering::SeqCst), false);
    assert_eq!(b_done.load(Ordering::SeqCst), false);

    // A partner on tag 0 releases only the tag 0 waiter.
    let c = {
        let rendezvous = rendezvous.clone();
        thread::spawn(move || rendezvous.exchange(0, 11i64))
    };
    assert_eq!(a.join().unwrap(), 11);
    assert_eq!(c.join().unwrap(), 10);

    thread::sleep(Duration::from_millis(50));
    assert_eq!(b_done.load(Ordering::SeqCst), false);

    let d = {
        let rendezvous = rendezvous.clone();
        thread::spawn(move || rendezvous.exchange(1, 21i64))
    };
    assert_eq!(b.join().unwrap(), 21);
    assert_eq!(d.join().unwrap(), 20);
}

#[test]
fn many_parties_pair_cleanly_on_one_tag() {
    let rendezvous = Arc::new(Rendezvous::new());

    // Eight threads exchange unique values on one tag. The
    // returned values must form a perfect pairing: every
    // value delivered exactly once, nobody paired with
    // themselves, and pairing is mutual.
    let workers: Vec<_> = (0..8i64)
        .map(|sent| {
            let rendezvous = rendezvous.clone();
            thread::spawn(move || (sent, rendezvous.exchange(0, sent)))
        })
        .collect();

    let mut pairing = BTreeMap::new();
    for worker in workers {
        let (sent, received) = worker.join().unwrap();
        pairing.insert(sent, received);
    }

    assert_eq!(pairing.len(), 8);
    for (sent, received) in &pairing {
        assert_ne!(sent, received);
        assert_eq!(pairing[received], *sent);
    }
}

#[test]
fn concurrent_rounds_on_distinct_tags() {
    let rendezvous = Arc::new(Rendezvous::new());

    let workers: Vec<_> = (0..4u64)
        .flat_map(|tag| {
            let senders = vec![(tag, 100 + tag as i64), (tag, 200 + tag as i64)];
            senders.into_iter().map(|(tag, value)| {
                let rendezvous = rendezvous.clone();
                thread::spawn(move || (tag, value, rendezvous.exchange(tag, value)))
            })
        })
        .collect();

    for worker in workers {
        let (tag, sent, received) = worker.join().unwrap();
        // Each value stayed within its own tag, paired with
        // that tag's other party.
        if sent == 100 + tag as i64 {
            assert_eq!(received, 200 + tag as i64);
        } else {
            assert_eq!(received, 100 + tag as i64);
        }
    }
}

#[test]
fn payloads_need_not_be_integers() {
    let rendezvous = Arc::new(Rendezvous::new());

    let ping = {
        let rendezvous = rendezvous.clone();
        thread::spawn(move || rendezvous.exchange(0, String::from("ping")))
    };
    let pong = {
        let rendezvous = rendezvous.clone();
        thread::spawn(move || rendezvous.exchange(0, String::from("pong")))
    };

    assert_eq!(ping.join().unwrap(), "pong");
    assert_eq!(pong.join().unwrap(), "ping");
}
