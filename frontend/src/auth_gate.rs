use std::rc::Rc;

use landcover_core::{
    gate::{GateAction, GateController},
    types::Session,
};
use wasm_bindgen_futures::spawn_local;
use yew::{
    function_component, html, use_effect_with_deps, use_force_update, use_mut_ref, Children,
    ContextProvider, Html, Properties,
};
use yew_router::prelude::use_navigator;

use crate::{route::Route, session};

#[derive(Properties, PartialEq)]
pub struct AuthGateProps {
    pub children: Children,
}

/// Shows its children only to signed in users and sends everyone else to [`Route::Auth`].
///
/// The current session is provided to the children as a `Session` context.
#[function_component(AuthGate)]
pub fn auth_gate(props: &AuthGateProps) -> Html {
    let controller = use_mut_ref(|| None::<Rc<GateController<Session>>>);
    let trigger = use_force_update();
    let navigator = use_navigator();

    use_effect_with_deps(
        {
            let controller = controller.clone();
            move |_| {
                let mounted = Rc::new(GateController::mount(&session::hub(), move |action| {
                    if action == GateAction::Redirect {
                        match &navigator {
                            Some(navigator) => navigator.push(&Route::Auth),
                            None => log::error!("no router to redirect to sign in"),
                        }
                    }
                    trigger.force_update();
                }));
                *controller.borrow_mut() = Some(mounted.clone());

                spawn_local({
                    let mounted = mounted.clone();
                    async move {
                        let session = match session::fetch_session().await {
                            Ok(session) => session,
                            Err(error) => {
                                log::error!("failed to fetch session: {:?}", error);
                                None
                            }
                        };
                        mounted.on_fetch(session);
                    }
                });

                move || mounted.teardown()
            }
        },
        (),
    );

    let session = controller
        .borrow()
        .as_ref()
        .and_then(|controller| controller.session());
    match session {
        Some(session) => html! {
            <ContextProvider<Session> context={session}>
                { for props.children.iter() }
            </ContextProvider<Session>>
        },
        None => html! {},
    }
}
