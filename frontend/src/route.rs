use yew::{html, Html};
use yew_router::Routable;

use crate::{auth::AuthPage, auth_gate::AuthGate, classify::Classify, navbar::NavBar};

#[derive(Routable, Clone, PartialEq)]
pub enum Route {
    #[at("/")]
    Classify,
    #[at("/auth")]
    Auth,
    #[not_found]
    #[at("/404")]
    NotFound,
}

pub fn switch(route: Route) -> Html {
    match route {
        Route::Classify => html! { <AuthGate><Classify /></AuthGate> },
        Route::Auth => html! { <AuthPage /> },
        Route::NotFound => html! {
            <NavBar>
                <h2 class="text-xl">{ "Page not found" }</h2>
            </NavBar>
        },
    }
}
