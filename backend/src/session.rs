use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Validation};
use landcover_core::types::Session;
use time::{Duration, OffsetDateTime};

pub static SESSION_COOKIE_NAME: &str = "session";
pub static OAUTH_STATE_COOKIE_NAME: &str = "oauth_state";

/// How long a started sign in may take before the state cookie lapses.
const OAUTH_STATE_MAX_AGE_SECS: u32 = 10 * 60;

pub fn new_session(
    primary_email: String,
    emails: Vec<String>,
    now: OffsetDateTime,
    lifetime_secs: i64,
) -> Session {
    Session {
        primary_email,
        emails,
        exp: (now + Duration::seconds(lifetime_secs)).unix_timestamp(),
    }
}

pub fn issue_token(session: &Session, key: &EncodingKey) -> Result<String> {
    Ok(encode(&Default::default(), session, key)?)
}

/// Decodes a session token, rejecting bad signatures and expired tokens.
pub fn decode_token(token: &str, key: &DecodingKey) -> Result<Session> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    Ok(decode::<Session>(token, key, &validation)?.claims)
}

pub fn is_allowed(session: &Session, allowed_emails: &[String]) -> bool {
    allowed_emails
        .iter()
        .any(|allowed| session.emails.contains(allowed))
}

/// Whether less than half of the session lifetime remains.
pub fn needs_refresh(session: &Session, now: OffsetDateTime, lifetime_secs: i64) -> bool {
    session.exp - now.unix_timestamp() < lifetime_secs / 2
}

pub fn refreshed(session: &Session, now: OffsetDateTime, lifetime_secs: i64) -> Session {
    new_session(
        session.primary_email.clone(),
        session.emails.clone(),
        now,
        lifetime_secs,
    )
}

pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE_NAME}={token}; SameSite=Lax; Path=/; HttpOnly")
}

pub fn expired_cookie() -> String {
    format!("{SESSION_COOKIE_NAME}=; SameSite=Lax; Path=/; HttpOnly; Max-Age=0")
}

/// Holds the OAuth `state` between `/oauth/github` and the callback.
pub fn oauth_state_cookie(state: &str) -> String {
    format!(
        "{OAUTH_STATE_COOKIE_NAME}={state}; SameSite=Lax; Path=/oauth; HttpOnly; Max-Age={OAUTH_STATE_MAX_AGE_SECS}"
    )
}

pub fn expired_oauth_state_cookie() -> String {
    format!("{OAUTH_STATE_COOKIE_NAME}=; SameSite=Lax; Path=/oauth; HttpOnly; Max-Age=0")
}

/// Compares the `state` returned by the provider against the one stored at sign in start.
///
/// A missing or empty stored value never matches.
pub fn state_matches(expected: Option<&str>, received: &str) -> bool {
    let Some(expected) = expected.filter(|expected| !expected.is_empty()) else {
        return false;
    };
    let (expected, received) = (expected.as_bytes(), received.as_bytes());
    expected.len() == received.len()
        && expected
            .iter()
            .zip(received)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
