//! Lock and Observe wrappers.
//!
//! Both wrappers report raw events to their owning session. A lock swallows
//! the event, an observer passes it on. Wrappers always nest as
//! `Observe(Lock(original))`: locking descends through observers, observing
//! wraps the outermost node.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::action::{Action, ActionRef, Context};
use crate::session::{SessionHandle, SessionId};
use crate::types::Source;

/// Positional reports are sent once either coordinate moved further than this.
pub const MIN_DIFFERENCE: i32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptKind {
    Lock,
    Observe,
}

#[derive(Debug)]
pub struct Interceptor {
    kind: InterceptKind,
    source: Source,
    session: SessionHandle,
    child: ActionRef,
    last: Mutex<(i32, i32)>,
}

impl Interceptor {
    fn new(kind: InterceptKind, source: Source, session: SessionHandle, child: ActionRef) -> Self {
        Self {
            kind,
            source,
            session,
            child,
            last: Mutex::new((0, 0)),
        }
    }

    /// Same wrapper around a different child.
    fn with_child(&self, child: ActionRef) -> Self {
        Self {
            kind: self.kind,
            source: self.source,
            session: self.session.clone(),
            child,
            last: Mutex::new(*self.last.lock()),
        }
    }

    pub fn kind(&self) -> InterceptKind {
        self.kind
    }

    pub fn session_id(&self) -> SessionId {
        self.session.id()
    }

    pub fn child(&self) -> &ActionRef {
        &self.child
    }

    fn forwards(&self) -> bool {
        self.kind == InterceptKind::Observe
    }
}

impl Action for Interceptor {
    fn trigger(&self, ctx: &mut Context<'_>, position: u8, old_position: u8) {
        self.session
            .send(format!("Event: {} {position} {old_position}", self.source));
        if self.forwards() {
            self.child.trigger(ctx, position, old_position);
        }
    }

    fn button_press(&self, ctx: &mut Context<'_>) {
        self.session.send(format!("Event: {} 1", self.source));
        if self.forwards() {
            self.child.button_press(ctx);
        }
    }

    fn button_release(&self, ctx: &mut Context<'_>) {
        self.session.send(format!("Event: {} 0", self.source));
        if self.forwards() {
            self.child.button_release(ctx);
        }
    }

    fn whole(&self, ctx: &mut Context<'_>, x: i32, y: i32, source: Source) {
        {
            let mut last = self.last.lock();
            if (x - last.0).abs() > MIN_DIFFERENCE || (y - last.1).abs() > MIN_DIFFERENCE {
                *last = (x, y);
                self.session.send(format!("Event: {} {x} {y}", self.source));
            }
        }
        if self.forwards() {
            self.child.whole(ctx, x, y, source);
        }
    }

    fn gyro(&self, ctx: &mut Context<'_>, pitch: f64, yaw: f64, roll: f64) {
        if self.forwards() {
            self.child.gyro(ctx, pitch, yaw, roll);
        }
    }

    fn tick(&self, ctx: &mut Context<'_>) {
        if self.forwards() {
            self.child.tick(ctx);
        }
    }

    fn as_interceptor(&self) -> Option<&Interceptor> {
        Some(self)
    }
}

fn wrapper(node: &ActionRef, kind: InterceptKind) -> Option<&Interceptor> {
    node.as_interceptor().filter(|wrapper| wrapper.kind == kind)
}

/// Whether any session locks `node`.
pub fn is_locked(node: &ActionRef) -> bool {
    match node.as_interceptor() {
        Some(wrapper) if wrapper.kind == InterceptKind::Lock => true,
        Some(wrapper) => is_locked(&wrapper.child),
        None => false,
    }
}

/// Whether `session` already observes `node`.
pub fn is_observed_by(node: &ActionRef, session: SessionId) -> bool {
    match wrapper(node, InterceptKind::Observe) {
        Some(observer) if observer.session_id() == session => true,
        Some(observer) => is_observed_by(&observer.child, session),
        None => false,
    }
}

/// Insert a lock for `session` beneath every enclosing observer.
pub fn lock_node(node: &ActionRef, source: Source, session: &SessionHandle) -> ActionRef {
    match wrapper(node, InterceptKind::Observe) {
        Some(observer) => Arc::new(observer.with_child(lock_node(&observer.child, source, session))),
        None => Arc::new(Interceptor::new(
            InterceptKind::Lock,
            source,
            session.clone(),
            Arc::clone(node),
        )),
    }
}

/// Wrap `node` in an observer for `session`.
pub fn observe_node(node: &ActionRef, source: Source, session: &SessionHandle) -> ActionRef {
    if is_observed_by(node, session.id()) {
        return Arc::clone(node);
    }
    Arc::new(Interceptor::new(
        InterceptKind::Observe,
        source,
        session.clone(),
        Arc::clone(node),
    ))
}

/// Remove the lock held by `session`, keeping enclosing observers. `None` when
/// the session holds no lock here.
pub fn unlock_node(node: &ActionRef, session: SessionId) -> Option<ActionRef> {
    let wrapper = node.as_interceptor()?;
    match wrapper.kind {
        InterceptKind::Observe => {
            let inner = unlock_node(&wrapper.child, session)?;
            Some(Arc::new(wrapper.with_child(inner)))
        }
        InterceptKind::Lock if wrapper.session_id() == session => Some(Arc::clone(&wrapper.child)),
        InterceptKind::Lock => None,
    }
}

/// Remove the observer of `session`, keeping everything it wraps.
pub fn unobserve_node(node: &ActionRef, session: SessionId) -> Option<ActionRef> {
    let observer = wrapper(node, InterceptKind::Observe)?;
    if observer.session_id() == session {
        return Some(Arc::clone(&observer.child));
    }
    let inner = unobserve_node(&observer.child, session)?;
    Some(Arc::new(observer.with_child(inner)))
}

#[cfg(test)]
mod tests {
    use crossbeam_channel::{unbounded, Receiver};

    use super::*;
    use crate::testing::{Call, Harness, Probe};

    fn session(id: SessionId) -> (SessionHandle, Receiver<String>) {
        let (tx, rx) = unbounded();
        (SessionHandle::new(id, tx), rx)
    }

    fn shape(node: &ActionRef) -> Vec<(InterceptKind, SessionId)> {
        let mut layers = Vec::new();
        let mut current = Arc::clone(node);
        while let Some(wrapper) = current.as_interceptor() {
            layers.push((wrapper.kind(), wrapper.session_id()));
            let next = Arc::clone(wrapper.child());
            current = next;
        }
        layers
    }

    #[test]
    fn lock_swallows_and_reports() {
        let mut h = Harness::new();
        let probe = Probe::new();
        let (handle, rx) = session(1);
        let locked = lock_node(&(probe.clone() as ActionRef), Source::A, &handle);

        h.with(|ctx| {
            locked.button_press(ctx);
            locked.button_release(ctx);
            locked.tick(ctx);
        });

        assert!(probe.calls().is_empty());
        assert_eq!(probe.ticks(), 0);
        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            vec!["Event: A 1", "Event: A 0"]
        );
    }

    #[test]
    fn observe_reports_and_forwards() {
        let mut h = Harness::new();
        let probe = Probe::new();
        let (handle, rx) = session(1);
        let observed = observe_node(&(probe.clone() as ActionRef), Source::LeftTrigger, &handle);

        h.with(|ctx| {
            observed.trigger(ctx, 40, 0);
            observed.tick(ctx);
        });

        assert_eq!(probe.calls(), vec![Call::Trigger(40, 0)]);
        assert_eq!(probe.ticks(), 1);
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec!["Event: LT 40 0"]);
    }

    #[test]
    fn wrappers_converge_to_observe_around_lock() {
        let original: ActionRef = Probe::new();
        let (first, _rx1) = session(1);
        let (second, _rx2) = session(2);

        let observe_then_lock = lock_node(&observe_node(&original, Source::B, &first), Source::B, &second);
        let lock_then_observe = observe_node(&lock_node(&original, Source::B, &second), Source::B, &first);

        let expected = vec![(InterceptKind::Observe, 1), (InterceptKind::Lock, 2)];
        assert_eq!(shape(&observe_then_lock), expected);
        assert_eq!(shape(&lock_then_observe), expected);
    }

    #[test]
    fn unlock_restores_original_under_observer() {
        let original: ActionRef = Probe::new();
        let (watcher, _rx1) = session(1);
        let (owner, _rx2) = session(2);

        let observed = observe_node(&original, Source::X, &watcher);
        let locked = lock_node(&observed, Source::X, &owner);
        assert!(is_locked(&locked));
        assert!(unlock_node(&locked, 1).is_none());

        let unlocked = unlock_node(&locked, 2).unwrap();
        assert_eq!(shape(&unlocked), vec![(InterceptKind::Observe, 1)]);
        let inner = unlocked.as_interceptor().unwrap().child();
        assert!(Arc::ptr_eq(inner, &original));

        let bare = unobserve_node(&unlocked, 1).unwrap();
        assert!(Arc::ptr_eq(&bare, &original));
        assert!(unobserve_node(&bare, 1).is_none());
    }

    #[test]
    fn unobserve_keeps_enclosed_lock() {
        let original: ActionRef = Probe::new();
        let (watcher, _rx1) = session(1);
        let (owner, _rx2) = session(2);

        let both = observe_node(&lock_node(&original, Source::Y, &owner), Source::Y, &watcher);
        let only_lock = unobserve_node(&both, 1).unwrap();

        assert_eq!(shape(&only_lock), vec![(InterceptKind::Lock, 2)]);
        assert!(unobserve_node(&only_lock, 2).is_none());
    }

    #[test]
    fn observing_twice_is_idempotent() {
        let original: ActionRef = Probe::new();
        let (watcher, _rx) = session(7);

        let once = observe_node(&original, Source::Start, &watcher);
        let twice = observe_node(&once, Source::Start, &watcher);

        assert!(Arc::ptr_eq(&once, &twice));
    }

    #[test]
    fn positions_are_coalesced() {
        let mut h = Harness::new();
        let probe = Probe::new();
        let (handle, rx) = session(3);
        let locked = lock_node(&(probe.clone() as ActionRef), Source::Stick, &handle);

        h.with(|ctx| {
            locked.whole(ctx, 100, 100, Source::Stick);
            locked.whole(ctx, 301, 0, Source::Stick);
            locked.whole(ctx, 500, 0, Source::Stick);
            locked.whole(ctx, 602, 0, Source::Stick);
            locked.whole(ctx, 602, -299, Source::Stick);
        });

        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            vec!["Event: STICK 301 0", "Event: STICK 602 0"]
        );
        assert!(probe.calls().is_empty());
    }
}
