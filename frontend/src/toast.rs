use std::{rc::Rc, time::Duration};

use gloo_timers::future::sleep;
use landcover_core::form::{Level, Notification};
use wasm_bindgen_futures::spawn_local;
use web_sys::MouseEvent;
use yew::{
    function_component, hook, html, use_callback, use_context, use_mut_ref, use_reducer,
    Callback, Children, ContextProvider, Html, Properties, Reducible,
};

const DISMISS_AFTER: Duration = Duration::from_secs(5);

/// Shows transient notifications. Provided by [`ToastProvider`].
#[derive(Clone, PartialEq)]
pub struct Toaster(Callback<Notification>);

impl Toaster {
    pub fn show(&self, notification: Notification) {
        self.0.emit(notification);
    }
}

#[hook]
pub fn use_toaster() -> Toaster {
    use_context::<Toaster>().unwrap_or_else(|| {
        Toaster(Callback::from(|notification: Notification| {
            log::warn!(
                "no toast provider for notification: {}",
                notification.description
            );
        }))
    })
}

enum ToastAction {
    Show(u64, Notification),
    Dismiss(u64),
}

#[derive(Default)]
struct Toasts {
    items: Vec<(u64, Notification)>,
}

impl Reducible for Toasts {
    type Action = ToastAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut items = self.items.clone();
        match action {
            ToastAction::Show(id, notification) => items.push((id, notification)),
            ToastAction::Dismiss(id) => items.retain(|(i, _)| *i != id),
        }
        Rc::new(Self { items })
    }
}

#[derive(Properties, PartialEq)]
pub struct ToastProviderProps {
    pub children: Children,
}

#[function_component(ToastProvider)]
pub fn toast_provider(props: &ToastProviderProps) -> Html {
    let toasts = use_reducer(Toasts::default);
    let next_id = use_mut_ref(|| 0u64);

    let show = use_callback(
        {
            let dispatcher = toasts.dispatcher();
            move |notification: Notification, _| {
                let id = {
                    let mut next_id = next_id.borrow_mut();
                    *next_id += 1;
                    *next_id
                };
                dispatcher.dispatch(ToastAction::Show(id, notification));

                let dispatcher = dispatcher.clone();
                spawn_local(async move {
                    sleep(DISMISS_AFTER).await;
                    dispatcher.dispatch(ToastAction::Dismiss(id));
                });
            }
        },
        (),
    );

    let toast_list = toasts
        .items
        .iter()
        .map(|(id, notification)| {
            let alert_class = match notification.level {
                Level::Success => "alert alert-success",
                Level::Error => "alert alert-error",
            };
            let onclick = {
                let dispatcher = toasts.dispatcher();
                let id = *id;
                move |_: MouseEvent| dispatcher.dispatch(ToastAction::Dismiss(id))
            };
            html! {
                <div key={*id} class={alert_class}>
                    <div>
                        <h3 class="font-bold">{ &notification.title }</h3>
                        <div class="text-sm">{ &notification.description }</div>
                    </div>
                    <button class="btn btn-sm btn-circle btn-ghost" {onclick}>{ "✕" }</button>
                </div>
            }
        })
        .collect::<Html>();

    html! {
        <ContextProvider<Toaster> context={Toaster(show)}>
            { for props.children.iter() }
            <div class="toast toast-end">
                { toast_list }
            </div>
        </ContextProvider<Toaster>>
    }
}
