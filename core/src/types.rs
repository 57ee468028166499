use serde::{Deserialize, Serialize};

pub const DEFAULT_PREDICT_URL: &str = "http://localhost:5001/predict";

/// Multipart field the prediction endpoint reads the image from.
pub const PREDICT_FILE_FIELD: &str = "file";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub primary_email: String,
    pub emails: Vec<String>,
    pub exp: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PredictionResp {
    pub prediction: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PredictionErrorResp {
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub predict_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            predict_url: DEFAULT_PREDICT_URL.to_string(),
        }
    }
}
