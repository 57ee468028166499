use crate::types::{PredictionErrorResp, PredictionResp};

pub const GENERIC_ERROR_MESSAGE: &str = "Error during prediction. Please try again.";

/// Turns a response of the prediction endpoint into either the predicted label or a message
/// fit for showing to the user.
///
/// `success` is whether the status code was 2xx. Failure bodies are searched for an `error`
/// string; anything else falls back to [`GENERIC_ERROR_MESSAGE`].
pub fn interpret(success: bool, body: &str) -> Result<String, String> {
    if success {
        return serde_json::from_str::<PredictionResp>(body)
            .map(|resp| resp.prediction)
            .map_err(|_| GENERIC_ERROR_MESSAGE.to_string());
    }

    match serde_json::from_str::<PredictionErrorResp>(body) {
        Ok(PredictionErrorResp { error: Some(error) }) if !error.is_empty() => Err(error),
        _ => Err(GENERIC_ERROR_MESSAGE.to_string()),
    }
}
