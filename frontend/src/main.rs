mod app;
mod auth;
mod auth_gate;
mod classify;
mod navbar;
mod route;
mod session;
mod toast;

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<app::App>::new().render();
}
