use std::sync::Arc;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::providers::{ProviderId, ProviderRegistry};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    /// Only Aylien uses an application id.
    pub api_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeRequest {
    pub provider: ProviderId,
    pub url: String,
    pub prompt: String,
    pub schema: Option<Vec<String>>,
    pub credentials: Credentials,
}

/// Outcome of one dispatch. Provider and transport problems are values here,
/// never errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ScrapeResult {
    Success {
        /// Whole response body: JSON when it parses, the text otherwise.
        raw: Value,
        /// The vendor's named field, or its placeholder.
        result: Value,
    },
    Failure {
        message: String,
    },
}

impl ScrapeResult {
    pub fn failure(message: impl Into<String>) -> Self {
        ScrapeResult::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ScrapeResult::Success { .. })
    }
}

/// Sends exactly one request per [`ScrapeRequest`] to the chosen provider.
#[derive(Clone)]
pub struct Dispatcher {
    client: Client,
    registry: Arc<ProviderRegistry>,
}

impl Dispatcher {
    pub fn new(client: Client, registry: Arc<ProviderRegistry>) -> Self {
        Self { client, registry }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub async fn dispatch(&self, request: &ScrapeRequest) -> ScrapeResult {
        let Some(entry) = self.registry.get(request.provider) else {
            return ScrapeResult::failure(format!("Unknown provider: {}", request.provider));
        };

        info!(
            provider = %request.provider,
            endpoint = %entry.descriptor.endpoint,
            url = %request.url,
            "Dispatching provider request"
        );

        let builder = (entry.strategy.build_request)(&self.client, &entry.descriptor, request);
        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(provider = %request.provider, "Provider request failed: {}", err);
                return ScrapeResult::failure(format!("Request failed: {}", err));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                warn!(provider = %request.provider, "Reading provider response failed: {}", err);
                return ScrapeResult::failure(format!("Request failed: {}", err));
            }
        };

        if !status.is_success() {
            warn!(provider = %request.provider, status = status.as_u16(), "Provider returned an error status");
            return ScrapeResult::failure(format!(
                "HTTP error occurred: {} - {}",
                status.as_u16(),
                body
            ));
        }

        let raw = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));
        let result = match (entry.strategy.extract_result)(&raw) {
            Some(result) => result,
            None => {
                debug!(provider = %request.provider, "Result field missing, using placeholder");
                Value::String(entry.strategy.placeholder.to_string())
            }
        };

        ScrapeResult::Success { raw, result }
    }
}
