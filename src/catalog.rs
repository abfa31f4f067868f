//! # Catalog Client Module
//!
//! Thin async wrapper around the OpenRouter model catalog API
//!
//! ## Key Components
//! - [`ModelDescriptor`] - One catalog entry with per-token pricing
//! - [`CatalogClient`] - Fetches and searches the remote model list
//! - [`CatalogError`] - Transport and response failures

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog service returned status {status}")]
    Status { status: u16 },
}

/// Per-token price fields as numeric strings, exactly as the API ships them.
/// Parsing happens once in the pricing engine, not here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelPricing {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub completion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_cache_reads: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_cache_writes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelArchitecture {
    #[serde(default)]
    pub input_modalities: Vec<String>,
    #[serde(default)]
    pub output_modalities: Vec<String>,
    #[serde(default)]
    pub tokenizer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruct_type: Option<String>,
}

/// One LLM offering from the catalog. Only `id`, `name` and `pricing` feed
/// the pricing engine; the rest is display-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub context_length: u64,
    #[serde(default)]
    pub architecture: ModelArchitecture,
    #[serde(default)]
    pub pricing: ModelPricing,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_parameters: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Vec<ModelDescriptor>,
}

/// Case-insensitive substring match against name, id and description.
pub fn filter_models(models: Vec<ModelDescriptor>, query: &str) -> Vec<ModelDescriptor> {
    let needle = query.to_lowercase();
    models
        .into_iter()
        .filter(|model| {
            model.name.to_lowercase().contains(&needle)
                || model.id.to_lowercase().contains(&needle)
                || model
                    .description
                    .as_ref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .collect()
}

pub struct CatalogClient {
    base_url: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl CatalogClient {
    /// API key is optional for the model list endpoint.
    pub fn new() -> Self {
        Self {
            base_url: OPENROUTER_API_BASE.to_string(),
            api_key: std::env::var("OPENROUTER_API_KEY").ok(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            http: reqwest::Client::new(),
        }
    }

    /// Fetch the complete model list. The endpoint is unpaginated and returns
    /// everything in one response.
    pub async fn list_models(&self) -> Result<Vec<ModelDescriptor>, CatalogError> {
        let url = format!("{}/models", self.base_url);
        debug!("Fetching model catalog from {}", url);

        let mut request = self.http.get(&url);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
            });
        }

        let body: ModelsResponse = response.json().await?;
        debug!("Catalog returned {} models", body.data.len());
        Ok(body.data)
    }

    /// Look up a single model by exact id.
    pub async fn find_model(&self, model_id: &str) -> Result<Option<ModelDescriptor>, CatalogError> {
        let models = self.list_models().await?;
        Ok(models.into_iter().find(|m| m.id == model_id))
    }

    /// Search is implemented client-side as a filter over the full list.
    pub async fn search_models(&self, query: &str) -> Result<Vec<ModelDescriptor>, CatalogError> {
        let models = self.list_models().await?;
        Ok(filter_models(models, query))
    }
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn catalog_body() -> serde_json::Value {
        serde_json::json!({
            "data": [
                {
                    "id": "anthropic/claude-3.5-sonnet",
                    "name": "Anthropic: Claude 3.5 Sonnet",
                    "description": "Strong general-purpose model",
                    "context_length": 200000,
                    "architecture": {
                        "input_modalities": ["text", "image"],
                        "output_modalities": ["text"],
                        "tokenizer": "Claude"
                    },
                    "pricing": { "prompt": "0.000003", "completion": "0.000015" }
                },
                {
                    "id": "meta-llama/llama-3.1-8b-instruct",
                    "name": "Meta: Llama 3.1 8B Instruct",
                    "context_length": 131072,
                    "pricing": { "prompt": "0.00000002", "completion": "0.00000003" }
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_list_models_parses_catalog() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/models");
            then.status(200).json_body(catalog_body());
        });

        let client = CatalogClient::with_base_url(&server.base_url());
        let models = client.list_models().await.unwrap();

        mock.assert();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].id, "anthropic/claude-3.5-sonnet");
        assert_eq!(models[0].pricing.prompt, "0.000003");
        assert_eq!(models[1].context_length, 131072);
    }

    #[tokio::test]
    async fn test_list_models_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/models");
            then.status(503);
        });

        let client = CatalogClient::with_base_url(&server.base_url());
        let err = client.list_models().await.unwrap_err();
        match err {
            CatalogError::Status { status } => assert_eq!(status, 503),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_find_model_by_id() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/models");
            then.status(200).json_body(catalog_body());
        });

        let client = CatalogClient::with_base_url(&server.base_url());
        let found = client
            .find_model("meta-llama/llama-3.1-8b-instruct")
            .await
            .unwrap();
        assert_eq!(found.unwrap().name, "Meta: Llama 3.1 8B Instruct");

        let missing = client.find_model("no/such-model").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_search_models_matches_name_id_and_description() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/models");
            then.status(200).json_body(catalog_body());
        });

        let client = CatalogClient::with_base_url(&server.base_url());

        // Matches on name, case-insensitive
        let by_name = client.search_models("LLAMA").await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, "meta-llama/llama-3.1-8b-instruct");

        // Matches on description
        let by_description = client.search_models("general-purpose").await.unwrap();
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].id, "anthropic/claude-3.5-sonnet");

        let nothing = client.search_models("gibberish-zzz").await.unwrap();
        assert!(nothing.is_empty());
    }
}
