use async_trait::async_trait;
use dotenv::dotenv;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::env;
use thiserror::Error;
use tracing::{debug, error, info};

use super::endpoints::{
    GenerateContentRequest, GenerateContentResponse, GeminiAvailableModel, ImagePredictRequest,
    ImagePredictResponse, GEMINI_BASE_URL, GEMINI_MODELS,
};

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("API key not found in environment: {0}")]
    MissingApiKey(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("API error {status}: {error_body}")]
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
    #[error("Empty response: {0}")]
    EmptyResponse(String),
}

/// The generative service boundary. Every AI call in the crate goes through
/// one of these two methods, one request per call.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ApiConnectionError>;

    async fn generate_images(
        &self,
        model: &str,
        request: &ImagePredictRequest,
    ) -> Result<ImagePredictResponse, ApiConnectionError>;
}

#[derive(Clone, Debug)]
pub enum Provider {
    Gemini {
        /// Name of the environment variable holding the key, read per call.
        api_key: String,
        base_url: String,
        available_models: Vec<GeminiAvailableModel>,
        client: Client,
    },
}

impl Provider {
    pub fn gemini(api_key_env_var_name: &str) -> Self {
        Self::gemini_with_base_url(api_key_env_var_name, GEMINI_BASE_URL)
    }

    pub fn gemini_with_base_url(api_key_env_var_name: &str, base_url: &str) -> Self {
        dotenv().ok();
        Self::Gemini {
            api_key: api_key_env_var_name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            available_models: GEMINI_MODELS.to_vec(),
            client: Client::new(),
        }
    }

    pub fn get_available_models(&self) -> Vec<GeminiAvailableModel> {
        match self {
            Provider::Gemini {
                available_models, ..
            } => available_models.clone(),
        }
    }

    async fn post_json<B, R>(&self, model: &str, method: &str, body: &B) -> Result<R, ApiConnectionError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        match self {
            Provider::Gemini {
                api_key: api_key_env_var_name,
                base_url,
                client,
                ..
            } => {
                let actual_api_key = env::var(api_key_env_var_name)
                    .map_err(|_| ApiConnectionError::MissingApiKey(api_key_env_var_name.clone()))?;

                let url = format!("{}/{}:{}", base_url, model, method);
                debug!(%url, "post_json: sending request");

                let response = client
                    .post(&url)
                    .header("x-goog-api-key", actual_api_key)
                    .json(body)
                    .send()
                    .await?;

                let status = response.status();
                debug!(%status, model, method, "post_json: response received");

                if status.is_success() {
                    let text = response.text().await?;
                    Ok(serde_json::from_str::<R>(&text)?)
                } else {
                    let error_body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to read error body".to_string());
                    error!(%status, model, "Gemini API error: {}", error_body);
                    Err(ApiConnectionError::ApiError { status, error_body })
                }
            }
        }
    }
}

/// A blocked or filtered prompt comes back as a 200 with no candidates.
fn require_candidates(response: GenerateContentResponse) -> Result<GenerateContentResponse, ApiConnectionError> {
    if response.candidates.is_empty() {
        return Err(ApiConnectionError::EmptyResponse(
            "generateContent returned no candidates".to_string(),
        ));
    }
    Ok(response)
}

#[async_trait]
impl GenerationService for Provider {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ApiConnectionError> {
        let response = require_candidates(self.post_json(model, "generateContent", request).await?)?;
        if let Some(usage) = &response.usage_metadata {
            info!(
                model,
                prompt_tokens = ?usage.prompt_token_count,
                response_tokens = ?usage.candidates_token_count,
                total_tokens = ?usage.total_token_count,
                "generateContent usage"
            );
        }
        Ok(response)
    }

    async fn generate_images(
        &self,
        model: &str,
        request: &ImagePredictRequest,
    ) -> Result<ImagePredictResponse, ApiConnectionError> {
        self.post_json(model, "predict", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let provider = Provider::gemini_with_base_url("SOME_KEY", "http://localhost:9999/models/");
        let Provider::Gemini { base_url, .. } = provider;
        assert_eq!(base_url, "http://localhost:9999/models");
    }

    #[test]
    fn test_reply_without_candidates_is_empty_response() {
        let empty: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        let err = require_candidates(empty).unwrap_err();
        assert!(matches!(err, ApiConnectionError::EmptyResponse(_)));
        assert_eq!(err.to_string(), "Empty response: generateContent returned no candidates");

        let answered: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"content": {"parts": [{"text": "ok"}]}}]}"#).unwrap();
        assert_eq!(require_candidates(answered).unwrap().text(), "ok");
    }

    #[test]
    fn test_error_messages() {
        let err = ApiConnectionError::MissingApiKey("GEMINI_API_KEY".to_string());
        assert_eq!(err.to_string(), "API key not found in environment: GEMINI_API_KEY");

        let err = ApiConnectionError::ApiError {
            status: reqwest::StatusCode::UNAUTHORIZED,
            error_body: "bad key".to_string(),
        };
        assert_eq!(err.to_string(), "API error 401 Unauthorized: bad key");
    }
}
