use anyhow::Result;
use axum::{
    async_trait,
    extract::{FromRequestParts, Query, State},
    headers,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing, RequestPartsExt, Router, TypedHeader,
};
use headers::HeaderMap;
use landcover_core::types::Session;
use oauth2::{
    basic::BasicClient, reqwest::async_http_client, AuthUrl, AuthorizationCode, ClientId,
    ClientSecret, CsrfToken, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{config::CONFIG, session};

use super::AppState;

pub fn create_oauth_client() -> BasicClient {
    BasicClient::new(
        ClientId::new(CONFIG.github_client_id.clone()),
        Some(ClientSecret::new(CONFIG.github_client_secret.clone())),
        AuthUrl::new("https://github.com/login/oauth/authorize".to_string()).unwrap(),
        Some(TokenUrl::new("https://github.com/login/oauth/access_token".to_string()).unwrap()),
    )
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/github", routing::get(handle_get_github))
        .route("/authorized", routing::get(handle_get_authorized))
        .route("/logout", routing::post(handle_post_logout))
}

/// A valid session of an allowed user, read from the session cookie.
pub struct CurrentSession(pub Session);

pub enum SessionRejection {
    NotAuthorized,
    Error(&'static str),
    Forbidden,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        match self {
            Self::NotAuthorized => (StatusCode::UNAUTHORIZED, "not signed in").into_response(),
            Self::Error(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response(),
            Self::Forbidden => (StatusCode::FORBIDDEN, "user not allowed").into_response(),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        let cookies: Option<TypedHeader<headers::Cookie>> =
            parts.extract().await.map_err(|error| {
                tracing::error!(%error, "failed to extract Cookie header");
                SessionRejection::Error("failed to extract Cookie header")
            })?;
        let session_cookie = cookies
            .as_ref()
            .and_then(|cookies| cookies.get(session::SESSION_COOKIE_NAME))
            .ok_or(SessionRejection::NotAuthorized)?;

        let current = session::decode_token(session_cookie, &CONFIG.jwt_secret.1).map_err(
            |error| {
                tracing::debug!(%error, "rejected session token");
                SessionRejection::NotAuthorized
            },
        )?;

        if session::is_allowed(&current, &CONFIG.allowed_emails) {
            Ok(Self(current))
        } else {
            Err(SessionRejection::Forbidden)
        }
    }
}

/// Builds the `Set-Cookie` headers carrying a freshly signed token for `current`.
pub fn session_cookie_headers(current: &Session) -> Result<HeaderMap, (StatusCode, &'static str)> {
    let token = session::issue_token(current, &CONFIG.jwt_secret.0).map_err(|error| {
        tracing::error!(%error, "failed to encode JWT session token");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to encode JWT session token",
        )
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        session::session_cookie(&token).parse().map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to build session cookie",
            )
        })?,
    );
    Ok(headers)
}

#[derive(Deserialize)]
struct GetGitHubReq {
    #[serde(default)]
    redirect: Option<String>,
}

async fn handle_get_github(
    State(state): State<AppState>,
    Query(req): Query<GetGitHubReq>,
) -> Result<(HeaderMap, Redirect), (StatusCode, &'static str)> {
    let mut redirect_url = CONFIG.public_url.join("./oauth/authorized").map_err(|error| {
        tracing::error!(%error, "failed to build OAuth redirect URL");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to build OAuth redirect URL",
        )
    })?;
    if let Some(redirect) = req.redirect {
        redirect_url
            .query_pairs_mut()
            .append_pair("redirect", &redirect);
    }
    let (auth_url, csrf_token) = state
        .oauth_client
        .authorize_url(CsrfToken::new_random)
        .add_scope(Scope::new("user:email".to_string()))
        .set_redirect_uri(std::borrow::Cow::Owned(RedirectUrl::from_url(redirect_url)))
        .url();

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        session::oauth_state_cookie(csrf_token.secret())
            .parse()
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to build OAuth state cookie",
                )
            })?,
    );
    Ok((headers, Redirect::to(auth_url.as_ref())))
}

#[derive(Deserialize)]
struct AuthRequest {
    code: String,
    state: String,
    #[serde(default)]
    redirect: Option<String>,
}

#[derive(Deserialize, Debug)]
struct GitHubEmailsResp {
    email: String,
    verified: bool,
    primary: bool,
}

/// Only same-site absolute paths are followed after sign in.
///
/// Browsers read `\` as `/` and drop tabs and newlines, so `/\host` or a path with an
/// embedded tab would leave the site just like `//host`.
fn local_redirect(redirect: Option<&str>) -> &str {
    match redirect {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => "/",
    }
}

async fn handle_get_authorized(
    Query(req): Query<AuthRequest>,
    State(state): State<AppState>,
    cookies: Option<TypedHeader<headers::Cookie>>,
) -> Result<(HeaderMap, Redirect), (StatusCode, &'static str)> {
    let expected_state = cookies
        .as_ref()
        .and_then(|cookies| cookies.get(session::OAUTH_STATE_COOKIE_NAME));
    if !session::state_matches(expected_state, &req.state) {
        tracing::warn!("OAuth callback with mismatching state");
        return Err((StatusCode::FORBIDDEN, "OAuth state mismatch"));
    }

    let token = state
        .oauth_client
        .exchange_code(AuthorizationCode::new(req.code))
        .request_async(async_http_client)
        .await
        .map_err(|error| {
            tracing::error!(%error, "failed to request OAuth");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to request OAuth")
        })?;

    let resp: Vec<GitHubEmailsResp> = state
        .http_client
        .get("https://api.github.com/user/emails")
        .bearer_auth(token.access_token().secret())
        .header(header::ACCEPT, "application/vnd.github+json")
        .header("X-GitHub-Api-Version", "2022-11-28")
        .send()
        .await
        .map_err(|error| {
            tracing::error!(%error, "failed to request GitHub");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to request GitHub",
            )
        })?
        .json()
        .await
        .map_err(|error| {
            tracing::error!(%error, "failed to decode GitHub response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to decode GitHub response",
            )
        })?;

    let mut primary_email = None;
    let mut emails = Vec::with_capacity(resp.len());
    for email in resp {
        if email.primary && primary_email.is_none() {
            primary_email = Some(email.email.clone());
        }
        if email.verified {
            emails.push(email.email);
        }
    }
    if emails.is_empty() {
        return Err((StatusCode::FORBIDDEN, "no verified email"));
    }
    let primary_email = primary_email.unwrap_or_else(|| emails[0].clone());

    let current = session::new_session(
        primary_email,
        emails,
        OffsetDateTime::now_utc(),
        CONFIG.session_lifetime_secs,
    );
    if !session::is_allowed(&current, &CONFIG.allowed_emails) {
        tracing::warn!(email = %current.primary_email, "sign in from user not allowed");
        return Err((StatusCode::FORBIDDEN, "user not allowed"));
    }

    tracing::info!(email = %current.primary_email, "user signed in");

    let mut headers = session_cookie_headers(&current)?;
    if let Ok(cookie) = session::expired_oauth_state_cookie().parse() {
        headers.append(header::SET_COOKIE, cookie);
    }
    Ok((
        headers,
        Redirect::to(local_redirect(req.redirect.as_deref())),
    ))
}

async fn handle_post_logout() -> (HeaderMap, StatusCode) {
    let mut headers = HeaderMap::new();
    if let Ok(cookie) = session::expired_cookie().parse() {
        headers.insert(header::SET_COOKIE, cookie);
    }
    (headers, StatusCode::NO_CONTENT)
}
