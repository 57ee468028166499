use std::time::Duration;

use yew::{function_component, html, use_effect_with_deps, Html};
use yew_router::{BrowserRouter, Switch};

use crate::{
    route::{switch, Route},
    session,
    toast::ToastProvider,
};

const SESSION_POLL_INTERVAL: Duration = Duration::from_secs(60);

#[function_component(App)]
pub fn app() -> Html {
    use_effect_with_deps(
        |_| {
            let watch = session::watch_session(SESSION_POLL_INTERVAL);
            move || drop(watch)
        },
        (),
    );

    html! {
        <BrowserRouter>
            <ToastProvider>
                <Switch<Route> render={switch} />
            </ToastProvider>
        </BrowserRouter>
    }
}
