use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("API request failed with status {0}")]
    Status(u16),
    #[error("No response from model")]
    MissingResponse,
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

#[derive(Deserialize)]
struct OllamaModelsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, max_tokens: u32) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            max_tokens,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Single non-streaming generate call. Only a 200 counts as success.
    pub async fn generate(&self, prompt: &str) -> Result<String, InferenceError> {
        let url = format!("{}/api/generate", self.base_url);

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            max_tokens: self.max_tokens,
        };

        tracing::debug!(%url, model = %self.model, "sending generate request");

        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(InferenceError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let parsed: GenerateResponse = serde_json::from_slice(&body)?;
        parsed.response.ok_or(InferenceError::MissingResponse)
    }

    pub async fn list_models(&self) -> Result<Vec<String>, InferenceError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(InferenceError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let models_response: OllamaModelsResponse = serde_json::from_slice(&body)?;
        let model_names: Vec<String> = models_response
            .models
            .into_iter()
            .map(|model| model.name)
            .collect();

        Ok(model_names)
    }
}
