use wasm_bindgen_futures::spawn_local;
use web_sys::MouseEvent;
use yew::{function_component, html, Children, Html, Properties};

use crate::session;

#[derive(Properties, PartialEq)]
pub struct NavBarProps {
    #[prop_or_default]
    pub user: Option<String>,
    pub children: Children,
}

#[function_component(NavBar)]
pub fn navbar(props: &NavBarProps) -> Html {
    let on_sign_out = |_: MouseEvent| spawn_local(session::sign_out());

    html! {
        <>
            <div class="bg-gray-100">
                <div class="container mx-auto navbar">
                    <div class="flex-1">
                        <h1 class="font-bold normal-case text-xl">{ "landcover" }</h1>
                    </div>
                    if let Some(user) = &props.user {
                        <div class="flex-none gap-2">
                            <span>{ user }</span>
                            <button class="btn btn-ghost btn-sm" onclick={on_sign_out}>
                                { "Sign out" }
                            </button>
                        </div>
                    }
                </div>
            </div>
            <div class="min-h-[calc(100vh-4rem)] w-full bg-gray-200 flex items-center justify-center p-4">
                { for props.children.iter() }
            </div>
        </>
    }
}
