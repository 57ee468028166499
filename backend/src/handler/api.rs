use axum::{http::StatusCode, routing, Json, Router};
use headers::HeaderMap;
use landcover_core::types::{ClientConfig, Session};
use time::OffsetDateTime;

use crate::{config::CONFIG, session};

use super::{
    auth::{session_cookie_headers, CurrentSession},
    AppState,
};

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", routing::get(get_health))
        .route("/session", routing::get(get_session))
        .route("/config", routing::get(get_config))
}

async fn get_health() -> &'static str {
    "OK"
}

/// Current session or `null`. Sessions past half of their lifetime come back with a renewed
/// cookie and expiry.
async fn get_session(
    current: Option<CurrentSession>,
) -> Result<(HeaderMap, Json<Option<Session>>), (StatusCode, &'static str)> {
    let Some(CurrentSession(current)) = current else {
        return Ok((HeaderMap::new(), Json(None)));
    };

    let now = OffsetDateTime::now_utc();
    if !session::needs_refresh(&current, now, CONFIG.session_lifetime_secs) {
        return Ok((HeaderMap::new(), Json(Some(current))));
    }

    let renewed = session::refreshed(&current, now, CONFIG.session_lifetime_secs);
    let headers = session_cookie_headers(&renewed)?;
    tracing::debug!(email = %renewed.primary_email, "session token refreshed");
    Ok((headers, Json(Some(renewed))))
}

async fn get_config() -> Json<ClientConfig> {
    Json(ClientConfig {
        predict_url: CONFIG.predict_url.to_string(),
    })
}
