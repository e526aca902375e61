#![forbid(unsafe_code)]

//! Value synchronization between properties, built from observers.
//!
//! - [`link`]: one-way. The target takes the source's value now and after
//!   every source assignment.
//! - [`link_bidirectional`]: a one-way link each way.
//!
//! # Echo
//!
//! With [`LinkMode::Always`], assigning `A` in a two-way link runs
//! `A → B`, whose assignment of `B` runs `B → A`, which re-assigns `A` with
//! the value it already holds. That echo goes through `A`'s validators and
//! observers once more. Each link direction does not re-enter itself, so
//! the chain stops there instead of recursing.
//!
//! # Re-entry
//!
//! A callback reached from a link's propagation may assign the link's
//! source again (a target observer correcting the source, or the echo
//! above). That nested change is recorded instead of recursing. Once the
//! running copy returns, the link copies again if the source now holds a
//! value it has not sent and the target does not already hold it. The
//! target therefore ends equal to the source's latest value, and a plain
//! echo costs nothing extra.
//!
//! [`LinkMode::SkipUnchanged`] drops assignments that would not change the
//! target, so no echo happens.
//!
//! Targets are held weakly. A link whose target has been dropped logs a
//! warning on the next source change and does nothing.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::config::LinkMode;
use crate::observed::Observed;
use crate::property::FieldKey;

type Assign<T, V> = fn(&T, FieldKey<T, V>, V);

/// One-way link with [`LinkMode::Always`].
pub fn link<S, T, V>(
    source: &S,
    source_key: FieldKey<S, V>,
    target: &Rc<T>,
    target_key: FieldKey<T, V>,
) where
    S: Observed,
    T: Observed,
    V: Clone + PartialEq + 'static,
{
    install(source, source_key, target, target_key, |target, key, value| {
        target.set(key, value);
    });
}

/// One-way link with an explicit [`LinkMode`].
pub fn link_with<S, T, V>(
    source: &S,
    source_key: FieldKey<S, V>,
    target: &Rc<T>,
    target_key: FieldKey<T, V>,
    mode: LinkMode,
) where
    S: Observed,
    T: Observed,
    V: Clone + PartialEq + 'static,
{
    match mode {
        LinkMode::Always => link(source, source_key, target, target_key),
        LinkMode::SkipUnchanged => {
            install(source, source_key, target, target_key, |target, key, value| {
                target.set_if_changed(key, value);
            });
        }
    }
}

/// Two-way link with [`LinkMode::Always`]: `a → b`, then `b → a`.
pub fn link_bidirectional<A, B, V>(
    a: &Rc<A>,
    a_key: FieldKey<A, V>,
    b: &Rc<B>,
    b_key: FieldKey<B, V>,
) where
    A: Observed,
    B: Observed,
    V: Clone + PartialEq + 'static,
{
    link(&**a, a_key, b, b_key);
    link(&**b, b_key, a, a_key);
}

/// Two-way link with an explicit [`LinkMode`].
pub fn link_bidirectional_with<A, B, V>(
    a: &Rc<A>,
    a_key: FieldKey<A, V>,
    b: &Rc<B>,
    b_key: FieldKey<B, V>,
    mode: LinkMode,
) where
    A: Observed,
    B: Observed,
    V: Clone + PartialEq + 'static,
{
    link_with(&**a, a_key, b, b_key, mode);
    link_with(&**b, b_key, a, a_key, mode);
}

fn install<S, T, V>(
    source: &S,
    source_key: FieldKey<S, V>,
    target: &Rc<T>,
    target_key: FieldKey<T, V>,
    assign: Assign<T, V>,
) where
    S: Observed,
    T: Observed,
    V: Clone + PartialEq + 'static,
{
    debug!(
        source = source_key.name(),
        target = target_key.name(),
        "linking properties"
    );
    assign(target, target_key, source_key.property(source).get());

    let weak = Rc::downgrade(target);
    let state = Rc::new(LinkState::default());
    source.observe(source_key, move |source: &S| {
        let Some(_running) = ReentryGuard::enter(&state) else {
            return;
        };
        let Some(target) = weak.upgrade() else {
            warn!(
                source = source_key.name(),
                target = target_key.name(),
                "link target dropped"
            );
            return;
        };
        let mut sent = source_key.property(source).get();
        loop {
            assign(&target, target_key, sent.clone());
            if !state.pending.replace(false) {
                break;
            }
            let current = source_key.property(source).get();
            let stale = current != sent && target_key.property(&target).with(|v| *v != current);
            if !stale {
                break;
            }
            trace!(
                source = source_key.name(),
                target = target_key.name(),
                "source reassigned during propagation, copying again"
            );
            sent = current;
        }
    });
}

/// Per-direction propagation state.
#[derive(Default)]
struct LinkState {
    running: Cell<bool>,
    /// Source was assigned again while `running`.
    pending: Cell<bool>,
}

/// Marks a link direction as running; cleared on drop, including unwinds.
struct ReentryGuard<'a> {
    state: &'a LinkState,
}

impl<'a> ReentryGuard<'a> {
    /// `None` when the direction is already running; the re-entry is then
    /// recorded as pending.
    fn enter(state: &'a LinkState) -> Option<Self> {
        if state.running.replace(true) {
            state.pending.set(true);
            return None;
        }
        state.pending.set(false);
        Some(Self { state })
    }
}

impl Drop for ReentryGuard<'_> {
    fn drop(&mut self) {
        self.state.running.set(false);
        self.state.pending.set(false);
    }
}
