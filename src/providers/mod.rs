//! Provider registry.
//!
//! Each supported vendor is a [`ProviderEntry`]: an immutable descriptor plus a
//! [`ProviderStrategy`] holding the two vendor-specific functions, one that
//! shapes the outbound request and one that pulls the named result field out of
//! the response body.

pub mod aylien;
pub mod deepai;
pub mod diffbot;
pub mod meaningcloud;
pub mod textrazor;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::dispatch::ScrapeRequest;
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderId {
    #[serde(rename = "DeepAI")]
    DeepAi,
    MeaningCloud,
    Diffbot,
    TextRazor,
    Aylien,
}

impl ProviderId {
    pub const ALL: [ProviderId; 5] = [
        ProviderId::DeepAi,
        ProviderId::MeaningCloud,
        ProviderId::Diffbot,
        ProviderId::TextRazor,
        ProviderId::Aylien,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProviderId::DeepAi => "DeepAI",
            ProviderId::MeaningCloud => "MeaningCloud",
            ProviderId::Diffbot => "Diffbot",
            ProviderId::TextRazor => "TextRazor",
            ProviderId::Aylien => "Aylien",
        }
    }

    fn default_endpoint(&self) -> &'static str {
        match self {
            ProviderId::DeepAi => "https://api.deepai.org/api/summarization",
            ProviderId::MeaningCloud => "https://api.meaningcloud.com/summarization-1.0",
            ProviderId::Diffbot => "https://api.diffbot.com/v3/article",
            ProviderId::TextRazor => "https://api.textrazor.com",
            ProviderId::Aylien => "https://api.aylien.com/api/v1/summarize",
        }
    }

    fn strategy(&self) -> ProviderStrategy {
        match self {
            ProviderId::DeepAi => deepai::STRATEGY,
            ProviderId::MeaningCloud => meaningcloud::STRATEGY,
            ProviderId::Diffbot => diffbot::STRATEGY,
            ProviderId::TextRazor => textrazor::STRATEGY,
            ProviderId::Aylien => aylien::STRATEGY,
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        ProviderId::ALL
            .into_iter()
            .find(|id| id.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AppError::UnknownProvider(wanted.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderDescriptor {
    pub id: ProviderId,
    pub endpoint: Url,
    pub requires_application_id: bool,
}

/// Shapes the single outbound request for a vendor.
pub type BuildRequest = fn(&Client, &ProviderDescriptor, &ScrapeRequest) -> RequestBuilder;

/// Returns the vendor's named result field, or `None` when it is absent.
pub type ExtractResult = fn(&Value) -> Option<Value>;

#[derive(Clone, Copy)]
pub struct ProviderStrategy {
    pub build_request: BuildRequest,
    pub extract_result: ExtractResult,
    /// Substituted for the result when the named field is missing.
    pub placeholder: &'static str,
}

#[derive(Clone)]
pub struct ProviderEntry {
    pub descriptor: ProviderDescriptor,
    pub strategy: ProviderStrategy,
}

#[derive(Clone)]
pub struct ProviderRegistry {
    entries: HashMap<ProviderId, ProviderEntry>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        let entries = ProviderId::ALL
            .into_iter()
            .filter_map(|id| {
                // The built-in endpoints are constants and always parse.
                let endpoint = Url::parse(id.default_endpoint()).ok()?;
                Some((id, ProviderEntry {
                    descriptor: ProviderDescriptor {
                        id,
                        endpoint,
                        requires_application_id: id == ProviderId::Aylien,
                    },
                    strategy: id.strategy(),
                }))
            })
            .collect();

        Self { entries }
    }
}

impl ProviderRegistry {
    /// Replaces the endpoint of one provider, keeping its strategy.
    pub fn with_endpoint(mut self, id: ProviderId, endpoint: Url) -> Self {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.descriptor.endpoint = endpoint;
        }
        self
    }

    pub fn get(&self, id: ProviderId) -> Option<&ProviderEntry> {
        self.entries.get(&id)
    }

    pub fn descriptor(&self, id: ProviderId) -> Result<&ProviderDescriptor> {
        self.get(id)
            .map(|entry| &entry.descriptor)
            .ok_or_else(|| AppError::UnknownProvider(id.to_string()))
    }

    pub fn descriptors(&self) -> Vec<&ProviderDescriptor> {
        ProviderId::ALL
            .iter()
            .filter_map(|id| self.entries.get(id).map(|entry| &entry.descriptor))
            .collect()
    }
}

/// Joins schema tags the way they are echoed into vendor payloads.
pub(crate) fn schema_text(request: &ScrapeRequest) -> String {
    request
        .schema
        .as_deref()
        .map(|tags| tags.join(","))
        .unwrap_or_default()
}

/// Free-text payload for vendors that only accept a single text field.
pub(crate) fn combined_text(request: &ScrapeRequest) -> String {
    format!(
        "URL: {}, Prompt: {}, Schema: {}",
        request.url,
        request.prompt,
        schema_text(request)
    )
}

/// Treats JSON `null` the same as a missing field.
pub(crate) fn present(value: Option<&Value>) -> Option<Value> {
    value.filter(|v| !v.is_null()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_names_case_insensitively() {
        assert_eq!("DeepAI".parse::<ProviderId>().unwrap(), ProviderId::DeepAi);
        assert_eq!("deepai".parse::<ProviderId>().unwrap(), ProviderId::DeepAi);
        assert_eq!(" textrazor ".parse::<ProviderId>().unwrap(), ProviderId::TextRazor);
        assert!(matches!(
            "OpenAI".parse::<ProviderId>(),
            Err(AppError::UnknownProvider(name)) if name == "OpenAI"
        ));
    }

    #[test]
    fn serializes_display_names() {
        let json = serde_json::to_string(&ProviderId::DeepAi).unwrap();
        assert_eq!(json, "\"DeepAI\"");
        let id: ProviderId = serde_json::from_str("\"MeaningCloud\"").unwrap();
        assert_eq!(id, ProviderId::MeaningCloud);
    }

    #[test]
    fn default_registry_has_every_provider() {
        let registry = ProviderRegistry::default();
        let ids: Vec<ProviderId> = registry.descriptors().iter().map(|d| d.id).collect();
        assert_eq!(ids, ProviderId::ALL.to_vec());

        let diffbot = registry.descriptor(ProviderId::Diffbot).unwrap();
        assert_eq!(diffbot.endpoint.as_str(), "https://api.diffbot.com/v3/article");
    }

    #[test]
    fn only_aylien_requires_application_id() {
        let registry = ProviderRegistry::default();
        for descriptor in registry.descriptors() {
            assert_eq!(
                descriptor.requires_application_id,
                descriptor.id == ProviderId::Aylien,
                "unexpected flag for {}",
                descriptor.id
            );
        }
    }

    #[test]
    fn endpoint_override_touches_one_provider() {
        let mock = Url::parse("http://127.0.0.1:9999/summarize").unwrap();
        let registry = ProviderRegistry::default().with_endpoint(ProviderId::DeepAi, mock.clone());

        assert_eq!(registry.descriptor(ProviderId::DeepAi).unwrap().endpoint, mock);
        assert_eq!(
            registry.descriptor(ProviderId::Aylien).unwrap().endpoint.as_str(),
            "https://api.aylien.com/api/v1/summarize"
        );
    }
}
