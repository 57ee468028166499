use gloo_net::http::Request;
use landcover_core::{
    form::UploadForm,
    prediction::{interpret, GENERIC_ERROR_MESSAGE},
    types::{ClientConfig, Session, PREDICT_FILE_FIELD},
};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Event, File, FormData, HtmlInputElement, MouseEvent, Url};
use yew::{
    function_component, html, use_context, use_effect_with_deps, use_force_update, use_mut_ref,
    use_state, Html, TargetCast,
};

use crate::{navbar::NavBar, toast::use_toaster};

async fn fetch_config() -> Result<ClientConfig, gloo_net::Error> {
    Request::get("/api/config").send().await?.json().await
}

/// Posts the image as `multipart/form-data` and interprets whatever comes back.
async fn request_prediction(predict_url: &str, file: &File) -> Result<String, String> {
    let body = match FormData::new() {
        Ok(body) => body,
        Err(error) => {
            log::error!("failed to create form data: {:?}", error);
            return Err(GENERIC_ERROR_MESSAGE.to_string());
        }
    };
    if let Err(error) = body.append_with_blob(PREDICT_FILE_FIELD, file) {
        log::error!("failed to append file to form data: {:?}", error);
        return Err(GENERIC_ERROR_MESSAGE.to_string());
    }

    // the browser fills in the multipart boundary, so no Content-Type is set here
    let resp = match Request::post(predict_url).body(body).send().await {
        Ok(resp) => resp,
        Err(error) => {
            log::error!("failed to request prediction: {:?}", error);
            return Err(GENERIC_ERROR_MESSAGE.to_string());
        }
    };
    if !resp.ok() {
        log::error!("prediction failed. status code: {}", resp.status());
    }
    let text = resp.text().await.unwrap_or_default();
    interpret(resp.ok(), &text)
}

fn revoke_preview(preview_url: &str) {
    if preview_url.is_empty() {
        return;
    }
    if let Err(error) = Url::revoke_object_url(preview_url) {
        log::error!("failed to revoke object url: {:?}", error);
    }
}

#[function_component(Classify)]
pub fn classify() -> Html {
    let session = use_context::<Session>();
    let toaster = use_toaster();
    let form = use_mut_ref(UploadForm::<File>::default);
    let trigger = use_force_update();
    let config = use_state(ClientConfig::default);

    use_effect_with_deps(
        {
            let config = config.clone();
            move |_| {
                spawn_local(async move {
                    match fetch_config().await {
                        Ok(fetched_config) => config.set(fetched_config),
                        Err(error) => {
                            log::error!("failed to fetch client config: {:?}", error);
                        }
                    }
                });
                || ()
            }
        },
        (),
    );

    use_effect_with_deps(
        {
            let form = form.clone();
            move |_| {
                move || {
                    if let Some(upload) = form.borrow_mut().teardown() {
                        revoke_preview(&upload.preview_url);
                    }
                }
            }
        },
        (),
    );

    let on_file_change = {
        let form = form.clone();
        let trigger = trigger.clone();
        move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let Some(file) = input.files().and_then(|files| files.get(0)) else {
                return;
            };
            let preview_url = Url::create_object_url_with_blob(&file).unwrap_or_else(|error| {
                log::error!("failed to make file into object url: {:?}", error);
                String::new()
            });
            let replaced = form.borrow_mut().select_file(file, preview_url);
            if let Some(replaced) = replaced {
                revoke_preview(&replaced.preview_url);
            }
            trigger.force_update();
        }
    };

    let onclick = {
        let form = form.clone();
        let trigger = trigger.clone();
        let predict_url = config.predict_url.clone();
        move |_: MouseEvent| {
            let submitted = form.borrow_mut().submit();
            let ticket = match submitted {
                Ok(ticket) => ticket,
                Err(notification) => {
                    toaster.show(notification);
                    return;
                }
            };
            let Some(file) = form.borrow().file().cloned() else {
                return;
            };
            trigger.force_update();

            let form = form.clone();
            let trigger = trigger.clone();
            let toaster = toaster.clone();
            let predict_url = predict_url.clone();
            spawn_local(async move {
                let outcome = request_prediction(&predict_url, &file).await;
                let notification = form.borrow_mut().complete(ticket, outcome);
                if let Some(notification) = notification {
                    toaster.show(notification);
                    trigger.force_update();
                }
            });
        }
    };

    let (preview_url, result, loading) = {
        let form = form.borrow();
        (
            form.preview_url()
                .filter(|url| !url.is_empty())
                .map(str::to_string),
            form.result().map(str::to_string),
            form.is_loading(),
        )
    };

    html! {
        <NavBar user={session.map(|session| session.primary_email)}>
            <div class="card w-full max-w-xl bg-base-100 shadow-xl">
                <div class="card-body items-center gap-6">
                    <h2 class="card-title text-3xl font-bold">{ "Landcover Classification" }</h2>
                    <p class="text-center text-gray-500">
                        { "Upload an image to classify its landcover type" }
                    </p>
                    <label
                        for="image-upload"
                        class="flex flex-col items-center justify-center w-full max-w-md h-32 border-2 border-dashed border-gray-300 rounded-lg cursor-pointer bg-gray-50 hover:bg-gray-100"
                    >
                        <svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="currentColor" class="w-8 h-8 text-gray-500 mb-2">
                          <path fill-rule="evenodd" d="M10.5 3.75a6 6 0 00-5.98 6.496A5.25 5.25 0 006.75 20.25H18a4.5 4.5 0 002.206-8.423 3.75 3.75 0 00-4.133-4.303A6.001 6.001 0 0010.5 3.75zm2.03 5.47a.75.75 0 00-1.06 0l-3 3a.75.75 0 101.06 1.06l1.72-1.72v4.94a.75.75 0 001.5 0v-4.94l1.72 1.72a.75.75 0 101.06-1.06l-3-3z" clip-rule="evenodd" />
                        </svg>
                        <p class="text-sm text-gray-500">{ "Click to upload or drag and drop" }</p>
                        <input
                            id="image-upload"
                            type="file"
                            accept="image/*"
                            class="hidden"
                            onchange={on_file_change}
                        />
                    </label>
                    if let Some(preview_url) = preview_url {
                        <div class="rounded-lg overflow-hidden shadow-lg">
                            <img src={preview_url} alt="Preview" class="max-w-md h-auto object-cover" />
                        </div>
                    }
                    <button class="btn w-full max-w-md" {onclick} disabled={loading}>
                        if loading {
                            <>
                                <span class="loading loading-spinner mr-2"></span>
                                { "Processing..." }
                            </>
                        } else {
                            <>{ "Analyze Image" }</>
                        }
                    </button>
                    if let Some(result) = result {
                        <div class="card w-full max-w-md bg-primary/5">
                            <div class="card-body">
                                <h3 class="card-title text-xl">{ "Prediction Result" }</h3>
                                <p class="text-lg font-medium text-center">{ result }</p>
                            </div>
                        </div>
                    }
                </div>
            </div>
        </NavBar>
    }
}
