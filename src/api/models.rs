use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::dispatch::{Credentials, ScrapeRequest, ScrapeResult};
use crate::providers::{ProviderDescriptor, ProviderId};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}

/// Schema tags, given either as a list or as `"div,h1,img"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaInput {
    Tags(Vec<String>),
    Text(String),
}

impl SchemaInput {
    /// Trimmed, non-empty tags; `None` when nothing is left.
    pub fn into_tags(self) -> Option<Vec<String>> {
        let tags: Vec<String> = match self {
            SchemaInput::Tags(tags) => tags,
            SchemaInput::Text(text) => text.split(',').map(str::to_string).collect(),
        }
        .into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();

        if tags.is_empty() { None } else { Some(tags) }
    }
}

#[derive(Deserialize)]
pub struct ScrapeRequestBody {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub schema: Option<SchemaInput>,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_id: Option<String>,
}

impl ScrapeRequestBody {
    pub fn into_scrape_request(self, provider: ProviderId) -> ScrapeRequest {
        ScrapeRequest {
            provider,
            url: self.url.trim().to_string(),
            prompt: self.prompt,
            schema: self.schema.and_then(SchemaInput::into_tags),
            credentials: Credentials {
                api_key: self.api_key,
                api_id: self.api_id,
            },
        }
    }
}

#[derive(Serialize)]
pub struct ScrapeResponse {
    pub provider: ProviderId,
    pub url: String,
    pub prompt: String,
    pub result: ScrapeResult,
    pub duration_seconds: f64,
    pub scraped_at: DateTime<Utc>,
    /// Set when the request log could not be written; the result still stands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_error: Option<String>,
}

#[derive(Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub schema: Option<SchemaInput>,
}

#[derive(Serialize)]
pub struct ProviderInfo {
    pub id: ProviderId,
    pub endpoint: String,
    pub requires_application_id: bool,
}

impl From<&ProviderDescriptor> for ProviderInfo {
    fn from(descriptor: &ProviderDescriptor) -> Self {
        Self {
            id: descriptor.id,
            endpoint: descriptor.endpoint.to_string(),
            requires_application_id: descriptor.requires_application_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_accepts_comma_text_and_lists() {
        let text: SchemaInput = serde_json::from_str(r#""div, h1,,img ""#).unwrap();
        assert_eq!(
            text.into_tags(),
            Some(vec!["div".to_string(), "h1".to_string(), "img".to_string()])
        );

        let list: SchemaInput = serde_json::from_str(r#"["p", " "]"#).unwrap();
        assert_eq!(list.into_tags(), Some(vec!["p".to_string()]));

        let blank: SchemaInput = serde_json::from_str(r#""  ""#).unwrap();
        assert_eq!(blank.into_tags(), None);
    }

    #[test]
    fn body_maps_to_scrape_request() {
        let body: ScrapeRequestBody = serde_json::from_str(
            r#"{"provider": "Aylien", "url": " https://example.com ", "prompt": "p",
                "schema": "h1", "api_key": "k", "api_id": "app"}"#,
        )
        .unwrap();

        let request = body.into_scrape_request(ProviderId::Aylien);
        assert_eq!(request.url, "https://example.com");
        assert_eq!(request.schema, Some(vec!["h1".to_string()]));
        assert_eq!(request.credentials.api_id.as_deref(), Some("app"));
    }
}
