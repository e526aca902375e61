//! Property-based invariant tests for assignment dispatch.
//!
//! 1. No callbacks: `set(v)` stores `v` and nothing runs.
//! 2. Validators fold FIFO; clearing them restores identity.
//! 3. Observers run once each, in registration order, after the store.
//! 4. Clearing one offset leaves the other untouched.
//! 5. One-way links track the source through any assignment sequence.
//! 6. Two-way links converge on the last assigned value.
//! 7. A clamping validator bounds the stored and observed value.
//! 8. Links stay in sync when a target observer writes back to the source.

use std::cell::RefCell;
use std::rc::Rc;

use propwatch::{LinkMode, Observed, link, link_bidirectional, link_bidirectional_with, observed};
use proptest::prelude::*;

observed! {
    #[derive(Debug)]
    pub struct Point {
        pub x: i64,
        pub y: i64,
    }
}

// ── Strategies ────────────────────────────────────────────────────────────

fn values(max_len: usize) -> impl Strategy<Value = Vec<i64>> {
    proptest::collection::vec(-1_000_000i64..=1_000_000, 1..=max_len)
}

/// Affine step `v * mul + add`, wrapping.
fn steps(max_len: usize) -> impl Strategy<Value = Vec<(i64, i64)>> {
    proptest::collection::vec((-5i64..=5, -100i64..=100), 0..=max_len)
}

fn apply(steps: &[(i64, i64)], v: i64) -> i64 {
    steps
        .iter()
        .fold(v, |acc, &(mul, add)| acc.wrapping_mul(mul).wrapping_add(add))
}

proptest! {
    #[test]
    fn identity_without_callbacks(vs in values(32)) {
        let owner = Point::default();
        for v in vs {
            owner.set(Point::x, v);
            prop_assert_eq!(owner.x.get(), v);
        }
        prop_assert!(owner.registry().is_empty());
    }

    #[test]
    fn validators_fold_in_registration_order(chain in steps(6), v in -10_000i64..=10_000) {
        let owner = Point::default();
        for &(mul, add) in &chain {
            owner.validate(Point::x, move |_, acc: i64| acc.wrapping_mul(mul).wrapping_add(add));
        }
        owner.set(Point::x, v);
        prop_assert_eq!(owner.x.get(), apply(&chain, v));

        owner.unvalidate(Point::x);
        owner.set(Point::x, v);
        prop_assert_eq!(owner.x.get(), v);
    }

    #[test]
    fn observers_run_once_in_order(n in 0usize..10, v in any::<i64>()) {
        let owner = Point::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        for i in 0..n {
            let log = Rc::clone(&log);
            owner.observe(Point::x, move |o| log.borrow_mut().push((i, o.x.get())));
        }
        owner.set(Point::x, v);
        let expected: Vec<(usize, i64)> = (0..n).map(|i| (i, v)).collect();
        prop_assert_eq!(&*log.borrow(), &expected);
    }

    #[test]
    fn clearing_one_offset_isolated(vx in any::<i64>(), vy in any::<i64>()) {
        let owner = Point::default();
        let hits = Rc::new(RefCell::new(Vec::new()));
        let h = Rc::clone(&hits);
        owner.observe(Point::x, move |_| h.borrow_mut().push('x'));
        let h = Rc::clone(&hits);
        owner.observe(Point::y, move |_| h.borrow_mut().push('y'));
        owner.validate(Point::y, |_, v: i64| v / 2);

        owner.unobserve(Point::x);
        owner.set(Point::x, vx);
        owner.set(Point::y, vy);

        prop_assert_eq!(&*hits.borrow(), &vec!['y']);
        prop_assert_eq!(owner.y.get(), vy / 2);
    }

    #[test]
    fn one_way_link_tracks_source(initial in any::<i64>(), vs in values(16)) {
        let source = Point::default();
        source.x.replace_silent(initial);
        let target = Rc::new(Point::default());
        link(&source, Point::x, &target, Point::y);
        prop_assert_eq!(target.y.get(), initial);
        for v in vs {
            source.set(Point::x, v);
            prop_assert_eq!(target.y.get(), v);
        }
    }

    #[test]
    fn two_way_link_converges(ops in proptest::collection::vec((any::<bool>(), any::<i64>()), 1..20)) {
        let a = Rc::new(Point::default());
        let b = Rc::new(Point::default());
        link_bidirectional(&a, Point::x, &b, Point::y);
        for (on_a, v) in ops {
            if on_a {
                a.set(Point::x, v);
            } else {
                b.set(Point::y, v);
            }
            prop_assert_eq!(a.x.get(), v);
            prop_assert_eq!(b.y.get(), v);
        }
    }

    #[test]
    fn skip_unchanged_link_converges(ops in proptest::collection::vec((any::<bool>(), -3i64..=3), 1..20)) {
        let a = Rc::new(Point::default());
        let b = Rc::new(Point::default());
        link_bidirectional_with(&a, Point::x, &b, Point::y, LinkMode::SkipUnchanged);
        for (on_a, v) in ops {
            if on_a {
                a.set_if_changed(Point::x, v);
            } else {
                b.set_if_changed(Point::y, v);
            }
            prop_assert_eq!(a.x.get(), b.y.get());
        }
    }

    #[test]
    fn link_survives_target_writing_back(
        bound in 0i64..=1_000,
        two_way in any::<bool>(),
        vs in values(16),
    ) {
        let source = Rc::new(Point::default());
        let target = Rc::new(Point::default());
        if two_way {
            link_bidirectional(&source, Point::x, &target, Point::y);
        } else {
            link(&*source, Point::x, &target, Point::y);
        }
        let back = Rc::downgrade(&source);
        target.observe(Point::y, move |t| {
            let v = t.y.get();
            let clamped = v.clamp(-bound, bound);
            if clamped != v {
                if let Some(s) = back.upgrade() {
                    s.set(Point::x, clamped);
                }
            }
        });
        for v in vs {
            source.set(Point::x, v);
            let expected = v.clamp(-bound, bound);
            prop_assert_eq!(source.x.get(), expected);
            prop_assert_eq!(target.y.get(), expected);
        }
    }

    #[test]
    fn clamp_bounds_stored_and_observed(v in any::<i64>()) {
        let owner = Point::default();
        owner.validate(Point::x, |_, v: i64| v.clamp(0, 100));
        let seen = Rc::new(RefCell::new(None));
        let s = Rc::clone(&seen);
        owner.observe(Point::x, move |o| *s.borrow_mut() = Some(o.x.get()));

        owner.set(Point::x, v);
        let expected = v.clamp(0, 100);
        prop_assert_eq!(owner.x.get(), expected);
        prop_assert_eq!(*seen.borrow(), Some(expected));
    }
}
