use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::events::{SessionChange, SessionHub, Subscription};

pub const AUTH_ROUTE: &str = "/auth";

/// One observation of the current session, either the initial fetch or a change event.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionUpdate<S> {
    pub seq: u64,
    pub session: Option<S>,
}

impl<S> From<SessionChange<S>> for SessionUpdate<S> {
    fn from(change: SessionChange<S>) -> Self {
        Self {
            seq: change.seq,
            session: change.session,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAction {
    /// A session is present; protected content may be shown.
    Render,
    /// No session; navigate to [`AUTH_ROUTE`].
    Redirect,
    /// The update is older than one already applied and was dropped.
    Stale,
}

/// Tracks whether protected content may be shown.
///
/// Updates from the initial fetch and from the change stream are merged by sequence number,
/// so a slow initial fetch can never overwrite a newer change event.
#[derive(Debug, Clone)]
pub struct SessionGate<S> {
    session: Option<S>,
    last_seq: Option<u64>,
}

impl<S> Default for SessionGate<S> {
    fn default() -> Self {
        Self {
            session: None,
            last_seq: None,
        }
    }
}

impl<S> SessionGate<S> {
    pub fn observe(&mut self, update: SessionUpdate<S>) -> GateAction {
        if matches!(self.last_seq, Some(last) if update.seq <= last) {
            return GateAction::Stale;
        }

        self.last_seq = Some(update.seq);
        self.session = update.session;

        if self.session.is_some() {
            GateAction::Render
        } else {
            GateAction::Redirect
        }
    }

    pub fn session(&self) -> Option<&S> {
        self.session.as_ref()
    }

    pub fn should_render(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_resolved(&self) -> bool {
        self.last_seq.is_some()
    }
}

struct Mounted<S> {
    gate: RefCell<SessionGate<S>>,
    alive: Cell<bool>,
    on_action: Box<dyn Fn(GateAction)>,
}

impl<S> Mounted<S> {
    fn apply(&self, update: SessionUpdate<S>) -> Option<GateAction> {
        if !self.alive.get() {
            return None;
        }
        let action = self.gate.borrow_mut().observe(update);
        if action != GateAction::Stale {
            (self.on_action)(action);
        }
        Some(action)
    }
}

/// Drives a [`SessionGate`] for one mounted view.
///
/// Mounting takes the fetch ticket and then subscribes, so the initial fetch passed to
/// [`GateController::on_fetch`] is ordered before every change event. `on_action` runs for
/// each `Render` or `Redirect`. Nothing is applied after [`GateController::teardown`].
pub struct GateController<S> {
    mounted: Rc<Mounted<S>>,
    fetch_seq: u64,
    subscription: RefCell<Option<Subscription>>,
}

impl<S: Clone + 'static> GateController<S> {
    pub fn mount(hub: &SessionHub<S>, on_action: impl Fn(GateAction) + 'static) -> Self {
        let mounted = Rc::new(Mounted {
            gate: RefCell::new(SessionGate::default()),
            alive: Cell::new(true),
            on_action: Box::new(on_action),
        });
        let fetch_seq = hub.ticket();
        let subscription = hub.subscribe({
            let mounted = Rc::downgrade(&mounted);
            move |change| {
                if let Some(mounted) = mounted.upgrade() {
                    mounted.apply(change.clone().into());
                }
            }
        });
        Self {
            mounted,
            fetch_seq,
            subscription: RefCell::new(Some(subscription)),
        }
    }

    /// Applies the result of the initial session fetch. `None` once torn down.
    pub fn on_fetch(&self, session: Option<S>) -> Option<GateAction> {
        self.mounted.apply(SessionUpdate {
            seq: self.fetch_seq,
            session,
        })
    }

    pub fn teardown(&self) {
        self.mounted.alive.set(false);
        self.subscription.borrow_mut().take();
    }

    pub fn session(&self) -> Option<S> {
        self.mounted.gate.borrow().session().cloned()
    }

    pub fn should_render(&self) -> bool {
        self.mounted.gate.borrow().should_render()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::events::ChangeKind;

    fn recorded() -> (Rc<RefCell<Vec<GateAction>>>, impl Fn(GateAction) + 'static) {
        let actions = Rc::new(RefCell::new(Vec::new()));
        let record = {
            let actions = actions.clone();
            move |action: GateAction| actions.borrow_mut().push(action)
        };
        (actions, record)
    }

    fn update(seq: u64, session: Option<&'static str>) -> SessionUpdate<&'static str> {
        SessionUpdate { seq, session }
    }

    #[test]
    fn renders_nothing_until_resolved() {
        let gate = SessionGate::<&str>::default();
        assert!(!gate.should_render());
        assert!(!gate.is_resolved());
    }

    #[test]
    fn null_session_redirects_and_hides_children() {
        let mut gate = SessionGate::default();
        assert_eq!(gate.observe(update(0, None)), GateAction::Redirect);
        assert!(!gate.should_render());
        assert!(gate.is_resolved());
    }

    #[test]
    fn present_session_renders_without_redirect() {
        let mut gate = SessionGate::default();
        assert_eq!(gate.observe(update(0, Some("alice"))), GateAction::Render);
        assert!(gate.should_render());
        assert_eq!(gate.session(), Some(&"alice"));
    }

    #[test]
    fn redirects_once_per_null_observation() {
        let mut gate = SessionGate::default();
        let actions = vec![
            gate.observe(update(0, Some("alice"))),
            gate.observe(update(1, None)),
            gate.observe(update(2, Some("alice"))),
            gate.observe(update(3, None)),
        ];
        assert_eq!(
            actions,
            vec![
                GateAction::Render,
                GateAction::Redirect,
                GateAction::Render,
                GateAction::Redirect,
            ]
        );
    }

    #[test]
    fn late_initial_fetch_does_not_override_newer_event() {
        let hub = SessionHub::<&'static str>::new();
        let mut gate = SessionGate::default();

        // the fetch is ticketed before subscribing, then an event lands before it resolves
        let fetch_seq = hub.ticket();
        let events = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let _sub = hub.subscribe({
            let events = events.clone();
            move |change| events.borrow_mut().push(change.clone())
        });
        hub.emit(ChangeKind::SignedOut, None);

        for change in events.borrow_mut().drain(..) {
            assert_eq!(gate.observe(change.into()), GateAction::Redirect);
        }
        assert_eq!(
            gate.observe(update(fetch_seq, Some("alice"))),
            GateAction::Stale
        );
        assert!(!gate.should_render());
    }

    #[test]
    fn duplicate_sequence_is_stale() {
        let mut gate = SessionGate::default();
        gate.observe(update(4, Some("alice")));
        assert_eq!(gate.observe(update(4, None)), GateAction::Stale);
        assert!(gate.should_render());
    }

    #[test]
    fn controller_applies_initial_fetch() {
        let hub = SessionHub::<&'static str>::new();
        let (actions, record) = recorded();
        let controller = GateController::mount(&hub, record);
        assert_eq!(hub.subscriber_count(), 1);
        assert!(!controller.should_render());

        assert_eq!(controller.on_fetch(Some("alice")), Some(GateAction::Render));
        assert_eq!(controller.session(), Some("alice"));
        assert_eq!(*actions.borrow(), vec![GateAction::Render]);

        hub.emit(ChangeKind::SignedOut, None);
        assert_eq!(
            *actions.borrow(),
            vec![GateAction::Render, GateAction::Redirect]
        );
        assert!(!controller.should_render());
    }

    #[test]
    fn controller_drops_fetch_older_than_event() {
        let hub = SessionHub::<&'static str>::new();
        let (actions, record) = recorded();
        let controller = GateController::mount(&hub, record);

        hub.emit(ChangeKind::SignedOut, None);
        assert_eq!(controller.on_fetch(Some("alice")), Some(GateAction::Stale));
        assert_eq!(*actions.borrow(), vec![GateAction::Redirect]);
        assert_eq!(controller.session(), None);
    }

    #[test]
    fn fetch_resolving_after_teardown_is_ignored() {
        let hub = SessionHub::<&'static str>::new();
        let (actions, record) = recorded();
        let controller = GateController::mount(&hub, record);

        controller.teardown();
        assert_eq!(hub.subscriber_count(), 0);

        assert_eq!(controller.on_fetch(None), None);
        hub.emit(ChangeKind::SignedIn, Some("alice"));
        assert!(actions.borrow().is_empty());
        assert!(!controller.should_render());
    }

    #[test]
    fn dropping_controller_releases_subscription() {
        let hub = SessionHub::<&'static str>::new();
        let (_actions, record) = recorded();
        drop(GateController::mount(&hub, record));
        assert_eq!(hub.subscriber_count(), 0);
    }
}
