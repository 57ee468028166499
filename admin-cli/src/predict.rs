use std::path::{Path, PathBuf};

use landcover_core::{
    prediction::{interpret, GENERIC_ERROR_MESSAGE},
    types::PREDICT_FILE_FIELD,
};
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use url::Url;

pub struct Outcome {
    pub path: PathBuf,
    pub size: u64,
    pub result: Result<String, String>,
}

/// Uploads one image to the prediction endpoint.
///
/// Every failure ends up in [`Outcome::result`], so one bad file never hides the others.
pub async fn predict(client: &Client, endpoint: &Url, path: &Path) -> Outcome {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(error) => {
            return Outcome {
                path: path.to_path_buf(),
                size: 0,
                result: Err(format!("failed to read {}: {error}", path.display())),
            }
        }
    };
    let size = bytes.len() as u64;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let form = Form::new().part(PREDICT_FILE_FIELD, Part::bytes(bytes).file_name(file_name));

    let result = match client.post(endpoint.clone()).multipart(form).send().await {
        Ok(resp) => {
            let success = resp.status().is_success();
            let body = resp.text().await.unwrap_or_default();
            interpret(success, &body)
        }
        Err(_) => Err(GENERIC_ERROR_MESSAGE.to_string()),
    };

    Outcome {
        path: path.to_path_buf(),
        size,
        result,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use wiremock::{
        matchers::{body_string_contains, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    fn image() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"fake png bytes").unwrap();
        file
    }

    async fn endpoint(server: &MockServer) -> Url {
        format!("{}/predict", server.uri()).parse().unwrap()
    }

    #[tokio::test]
    async fn returns_prediction_label() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .and(body_string_contains("name=\"file\""))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"prediction":"Forest"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let file = image();
        let outcome = predict(&Client::new(), &endpoint(&server).await, file.path()).await;

        assert_eq!(outcome.result, Ok("Forest".to_string()));
        assert_eq!(outcome.size, 14);
    }

    #[tokio::test]
    async fn surfaces_error_message_from_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"error":"Invalid image"}"#),
            )
            .mount(&server)
            .await;

        let file = image();
        let outcome = predict(&Client::new(), &endpoint(&server).await, file.path()).await;

        assert_eq!(outcome.result, Err("Invalid image".to_string()));
    }

    #[tokio::test]
    async fn falls_back_to_generic_message_without_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let file = image();
        let outcome = predict(&Client::new(), &endpoint(&server).await, file.path()).await;

        assert_eq!(outcome.result, Err(GENERIC_ERROR_MESSAGE.to_string()));
    }

    #[tokio::test]
    async fn unreadable_file_is_reported_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let outcome = predict(
            &Client::new(),
            &endpoint(&server).await,
            Path::new("/nonexistent/field.png"),
        )
        .await;

        assert_eq!(outcome.size, 0);
        let message = outcome.result.unwrap_err();
        assert!(message.starts_with("failed to read /nonexistent/field.png: "));
    }
}
