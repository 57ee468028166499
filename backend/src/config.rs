use std::path::PathBuf;

use anyhow::{Context, Result};
use jsonwebtoken::{DecodingKey, EncodingKey};
use landcover_core::types::DEFAULT_PREDICT_URL;
use once_cell::sync::Lazy;
use serde::Deserialize;
use url::Url;

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn deserialize_allowed_emails<'de, D>(d: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(d)?;
    Ok(s.split(',')
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(str::to_string)
        .collect())
}

fn default_public_url() -> Url {
    "http://localhost:3000/".parse().unwrap()
}

fn deserialize_jwt_secret<'de, D>(d: D) -> Result<(EncodingKey, DecodingKey), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(d)?;
    Ok((
        EncodingKey::from_secret(s.as_bytes()),
        DecodingKey::from_secret(s.as_bytes()),
    ))
}

fn default_predict_url() -> Url {
    DEFAULT_PREDICT_URL.parse().unwrap()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("frontend/dist")
}

fn default_session_lifetime_secs() -> i64 {
    60 * 60 * 24
}

#[derive(Deserialize)]
pub struct Config {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(deserialize_with = "deserialize_allowed_emails")]
    pub allowed_emails: Vec<String>,

    pub github_client_id: String,
    pub github_client_secret: String,

    #[serde(default = "default_public_url")]
    pub public_url: Url,

    #[serde(deserialize_with = "deserialize_jwt_secret")]
    pub jwt_secret: (EncodingKey, DecodingKey),

    /// Prediction endpoint handed to the frontend through `/api/config`.
    #[serde(default = "default_predict_url")]
    pub predict_url: Url,

    /// Directory holding the built frontend (`index.html` and its assets).
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    #[serde(default = "default_session_lifetime_secs")]
    pub session_lifetime_secs: i64,
}

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    envy::from_env()
        .context("failed to parse config from environment variables")
        .unwrap()
});
