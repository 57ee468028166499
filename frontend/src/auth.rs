use landcover_core::events::ChangeKind;
use yew::{function_component, html, use_effect_with_deps, Html};
use yew_router::prelude::use_navigator;

use crate::{navbar::NavBar, route::Route, session};

#[function_component(AuthPage)]
pub fn auth_page() -> Html {
    let navigator = use_navigator();

    // a sign in observed elsewhere (another tab, a fresh cookie) leads back to the app
    use_effect_with_deps(
        move |_| {
            let subscription = session::hub().subscribe(move |change| {
                if change.kind == ChangeKind::SignedIn {
                    if let Some(navigator) = &navigator {
                        navigator.push(&Route::Classify);
                    }
                }
            });
            move || drop(subscription)
        },
        (),
    );

    html! {
        <NavBar>
            <div class="card w-full max-w-sm bg-base-100 shadow-xl">
                <div class="card-body items-center gap-4">
                    <h2 class="card-title">{ "Sign in" }</h2>
                    <p class="text-center text-gray-500">
                        { "Sign in to classify landcover images." }
                    </p>
                    <a class="btn w-full" href="/oauth/github?redirect=/">{ "Sign in with GitHub" }</a>
                </div>
            </div>
        </NavBar>
    }
}
