use std::str::FromStr;

use axum::{extract::Path, http::StatusCode, response::Html, routing, Router, TypedHeader};
use headers::ContentType;

use crate::config::CONFIG;

pub fn create_router() -> Router {
    Router::new().route("/:filename", routing::get(get_static_file))
}

fn content_type_of(filename: &str) -> Option<ContentType> {
    // If no extension, not found.
    let (_, ext) = filename.rsplit_once('.')?;

    let content_type = match ext {
        "js" => ContentType::from(mime::APPLICATION_JAVASCRIPT_UTF_8),
        "css" => ContentType::from(mime::TEXT_CSS_UTF_8),
        "png" => ContentType::png(),
        "svg" => ContentType::from(mime::IMAGE_SVG),
        "json" => ContentType::json(),
        "ico" => ContentType::from(mime::Mime::from_str("image/x-icon").ok()?),
        "wasm" => ContentType::from(mime::Mime::from_str("application/wasm").ok()?),
        _ => return None,
    };
    Some(content_type)
}

fn is_plain_filename(filename: &str) -> bool {
    !filename.is_empty()
        && filename.len() <= 1000
        && !filename.contains(['/', '\\'])
        && !filename.starts_with('.')
}

async fn get_static_file(
    Path(filename): Path<String>,
) -> Result<(TypedHeader<ContentType>, Vec<u8>), StatusCode> {
    if !is_plain_filename(&filename) {
        return Err(StatusCode::NOT_FOUND);
    }

    let content_type = content_type_of(&filename).ok_or(StatusCode::NOT_FOUND)?;

    let contents = tokio::fs::read(CONFIG.static_dir.join(&filename))
        .await
        .map_err(|error| {
            tracing::debug!(%error, %filename, "static file not readable");
            StatusCode::NOT_FOUND
        })?;

    Ok((TypedHeader(content_type), contents))
}

/// The single page app entry point, served for every client side route.
pub async fn get_index() -> Result<Html<String>, (StatusCode, &'static str)> {
    tokio::fs::read_to_string(CONFIG.static_dir.join("index.html"))
        .await
        .map(Html)
        .map_err(|error| {
            tracing::error!(%error, "failed to read frontend index.html");
            (StatusCode::NOT_FOUND, "frontend is not built")
        })
}
