use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionChange<S> {
    pub seq: u64,
    pub kind: ChangeKind,
    pub session: Option<S>,
}

/// Which change, if any, leads from `previous` to `current`. Sessions of different users count
/// as a new sign in; any other difference is a token refresh.
pub fn detect_change<S: PartialEq>(
    previous: Option<&S>,
    current: Option<&S>,
    same_user: impl Fn(&S, &S) -> bool,
) -> Option<ChangeKind> {
    match (previous, current) {
        (None, None) => None,
        (None, Some(_)) => Some(ChangeKind::SignedIn),
        (Some(_), None) => Some(ChangeKind::SignedOut),
        (Some(previous), Some(current)) if !same_user(previous, current) => {
            Some(ChangeKind::SignedIn)
        }
        (Some(previous), Some(current)) if previous != current => {
            Some(ChangeKind::TokenRefreshed)
        }
        _ => None,
    }
}

type Listener<S> = Rc<dyn Fn(&SessionChange<S>)>;

struct HubInner<S> {
    next_seq: u64,
    next_id: u64,
    listeners: Vec<(u64, Listener<S>)>,
}

/// Broadcasts session changes to subscribers, stamping each one with a monotonic sequence
/// number shared with [`SessionHub::ticket`].
pub struct SessionHub<S> {
    inner: Rc<RefCell<HubInner<S>>>,
}

impl<S> Clone for SessionHub<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: 'static> Default for SessionHub<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: 'static> SessionHub<S> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(HubInner {
                next_seq: 0,
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Reserves a sequence number for an update produced outside the hub, such as the
    /// initial session fetch.
    pub fn ticket(&self) -> u64 {
        let mut inner = self.inner.borrow_mut();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        seq
    }

    pub fn subscribe(&self, listener: impl Fn(&SessionChange<S>) + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, Rc::new(listener)));

        let weak: Weak<RefCell<HubInner<S>>> = Rc::downgrade(&self.inner);
        Subscription {
            release: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().listeners.retain(|(i, _)| *i != id);
                }
            })),
        }
    }

    pub fn emit(&self, kind: ChangeKind, session: Option<S>) {
        let seq = self.ticket();
        let change = SessionChange { seq, kind, session };

        // listeners may subscribe or unsubscribe while being notified
        let listeners = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(id, listener)| (*id, listener.clone()))
            .collect::<Vec<_>>();

        for (id, listener) in listeners {
            let still_subscribed = self
                .inner
                .borrow()
                .listeners
                .iter()
                .any(|(i, _)| *i == id);
            if still_subscribed {
                listener(&change);
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

/// Handle to a registered listener. Dropping it unsubscribes.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn detects_kind_of_change() {
        // (user id, expiry)
        let same = |a: &(u32, i64), b: &(u32, i64)| a.0 == b.0;
        let alice = (1, 10);
        let alice_later = (1, 20);
        let bob = (2, 10);

        assert_eq!(detect_change::<(u32, i64)>(None, None, same), None);
        assert_eq!(detect_change(None, Some(&alice), same), Some(ChangeKind::SignedIn));
        assert_eq!(detect_change(Some(&alice), None, same), Some(ChangeKind::SignedOut));
        assert_eq!(detect_change(Some(&alice), Some(&alice), same), None);
        assert_eq!(
            detect_change(Some(&alice), Some(&alice_later), same),
            Some(ChangeKind::TokenRefreshed)
        );
        assert_eq!(
            detect_change(Some(&alice), Some(&bob), same),
            Some(ChangeKind::SignedIn)
        );
    }

    #[test]
    fn delivers_changes_in_sequence() {
        let hub = SessionHub::<&'static str>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _sub = hub.subscribe({
            let seen = seen.clone();
            move |change| seen.borrow_mut().push((change.seq, change.kind, change.session))
        });

        let ticket = hub.ticket();
        hub.emit(ChangeKind::SignedIn, Some("alice"));
        hub.emit(ChangeKind::SignedOut, None);

        assert_eq!(ticket, 0);
        assert_eq!(
            *seen.borrow(),
            vec![
                (1, ChangeKind::SignedIn, Some("alice")),
                (2, ChangeKind::SignedOut, None),
            ]
        );
    }

    #[test]
    fn released_subscription_receives_nothing() {
        let hub = SessionHub::<u32>::new();
        let calls = Rc::new(Cell::new(0));
        let sub = hub.subscribe({
            let calls = calls.clone();
            move |_| calls.set(calls.get() + 1)
        });

        hub.emit(ChangeKind::TokenRefreshed, Some(1));
        assert_eq!(hub.subscriber_count(), 1);

        sub.unsubscribe();
        hub.emit(ChangeKind::TokenRefreshed, Some(2));

        assert_eq!(calls.get(), 1);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn drop_releases_subscription() {
        let hub = SessionHub::<u32>::new();
        {
            let _sub = hub.subscribe(|_| {});
            assert_eq!(hub.subscriber_count(), 1);
        }
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn subscription_outliving_hub_does_not_panic() {
        let hub = SessionHub::<u32>::new();
        let sub = hub.subscribe(|_| {});
        drop(hub);
        drop(sub);
    }

    #[test]
    fn listener_may_unsubscribe_another_during_emit() {
        let hub = SessionHub::<u32>::new();
        let victim_calls = Rc::new(Cell::new(0));
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let _killer = hub.subscribe({
            let victim = victim.clone();
            move |_| {
                victim.borrow_mut().take();
            }
        });
        *victim.borrow_mut() = Some(hub.subscribe({
            let victim_calls = victim_calls.clone();
            move |_| victim_calls.set(victim_calls.get() + 1)
        }));

        hub.emit(ChangeKind::SignedOut, None);

        assert_eq!(victim_calls.get(), 0);
        assert_eq!(hub.subscriber_count(), 1);
    }
}
