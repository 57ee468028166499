use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    time::Duration,
};

use gloo_net::http::Request;
use gloo_timers::future::sleep;
use landcover_core::{
    events::{detect_change, ChangeKind, SessionHub, Subscription},
    types::Session,
};
use wasm_bindgen_futures::spawn_local;

thread_local! {
    static HUB: SessionHub<Session> = SessionHub::new();
}

/// Session change notifications shared by the whole app.
pub fn hub() -> SessionHub<Session> {
    HUB.with(Clone::clone)
}

pub async fn fetch_session() -> Result<Option<Session>, gloo_net::Error> {
    let resp = Request::get("/api/session").send().await?;
    if !resp.ok() {
        return Err(gloo_net::Error::GlooError(format!(
            "failed to fetch session. status code: {}",
            resp.status()
        )));
    }
    resp.json().await
}

pub async fn sign_out() {
    match Request::post("/oauth/logout").send().await {
        Ok(resp) if resp.ok() => hub().emit(ChangeKind::SignedOut, None),
        Ok(resp) => log::error!("failed to sign out. status code: {}", resp.status()),
        Err(error) => log::error!("failed to sign out: {:?}", error),
    }
}

fn same_user(a: &Session, b: &Session) -> bool {
    a.primary_email == b.primary_email
}

/// Keeps polling alive while held.
pub struct SessionWatch {
    alive: Rc<Cell<bool>>,
    _subscription: Subscription,
}

impl Drop for SessionWatch {
    fn drop(&mut self) {
        self.alive.set(false);
    }
}

/// Polls the session endpoint and emits a change whenever the server side session differs from
/// the last one seen, which also covers expiry and sign in from another tab.
pub fn watch_session(interval: Duration) -> SessionWatch {
    let alive = Rc::new(Cell::new(true));
    // `None` until the first successful poll
    let last_seen: Rc<RefCell<Option<Option<Session>>>> = Rc::new(RefCell::new(None));

    let subscription = hub().subscribe({
        let last_seen = last_seen.clone();
        move |change| {
            *last_seen.borrow_mut() = Some(change.session.clone());
        }
    });

    spawn_local({
        let alive = alive.clone();
        async move {
            while alive.get() {
                match fetch_session().await {
                    Ok(_) if !alive.get() => break,
                    Ok(current) => {
                        let previous = last_seen.borrow_mut().replace(current.clone());
                        if let Some(previous) = previous {
                            if let Some(kind) =
                                detect_change(previous.as_ref(), current.as_ref(), same_user)
                            {
                                log::info!("session changed: {:?}", kind);
                                hub().emit(kind, current);
                            }
                        }
                    }
                    Err(error) => log::warn!("failed to poll session: {:?}", error),
                }
                sleep(interval).await;
            }
        }
    });

    SessionWatch {
        alive,
        _subscription: subscription,
    }
}
