mod api;
mod auth;
mod statics;

use axum::{
    http::{header, Request},
    middleware::Next,
    response::Response,
    routing, Router,
};

#[derive(Clone)]
pub struct AppState {
    http_client: reqwest::Client,
    oauth_client: oauth2::basic::BasicClient,
}

pub fn create_router(http_client: reqwest::Client) -> Router {
    let oauth_client = auth::create_oauth_client();

    let state = AppState {
        http_client,
        oauth_client,
    };

    let api = api::create_router();
    let oauth = auth::create_router();
    let statics = statics::create_router();

    Router::new()
        .nest("/api", api)
        .nest("/oauth", oauth)
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .route("/", routing::get(statics::get_index))
        .route("/auth", routing::get(statics::get_index))
        .nest("/static", statics)
        .fallback(statics::get_index)
        .layer(axum::middleware::from_fn(server_header_middleware))
}

async fn server_header_middleware<B>(req: Request<B>, next: Next<B>) -> Response {
    let mut resp = next.run(req).await;
    if let Ok(value) = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")).parse()
    {
        resp.headers_mut().insert(header::SERVER, value);
    }
    resp
}
