use crate::providers::{ProviderDescriptor, ProviderId};

/// A required field was missing. The `Display` text is the message shown to
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Error: URL is required.")]
    MissingUrl,

    #[error("Error: Prompt is required.")]
    MissingPrompt,

    #[error("Error: For {0}, both the Application ID and the API key are required.")]
    MissingApplicationCredentials(ProviderId),

    #[error("Error: For {0}, the API key is required.")]
    MissingApiKey(ProviderId),
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Checks the fields a provider needs before any network call is made.
pub fn validate(
    provider: &ProviderDescriptor,
    url: &str,
    prompt: &str,
    api_key: &str,
    api_id: Option<&str>,
) -> Result<(), ValidationError> {
    if is_blank(url) {
        return Err(ValidationError::MissingUrl);
    }
    if is_blank(prompt) {
        return Err(ValidationError::MissingPrompt);
    }

    if provider.requires_application_id {
        if api_id.is_none_or(is_blank) || is_blank(api_key) {
            return Err(ValidationError::MissingApplicationCredentials(provider.id));
        }
    } else if is_blank(api_key) {
        return Err(ValidationError::MissingApiKey(provider.id));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderRegistry;

    fn descriptor(id: ProviderId) -> ProviderDescriptor {
        ProviderRegistry::default().descriptor(id).unwrap().clone()
    }

    #[test]
    fn key_only_providers_fail_iff_a_field_is_empty() {
        for id in ProviderId::ALL.into_iter().filter(|id| *id != ProviderId::Aylien) {
            let provider = descriptor(id);
            for url in ["", "https://example.com"] {
                for prompt in ["", "summarize"] {
                    for key in ["", "k1"] {
                        let result = validate(&provider, url, prompt, key, None);
                        let should_fail = url.is_empty() || prompt.is_empty() || key.is_empty();
                        assert_eq!(
                            result.is_err(),
                            should_fail,
                            "{id}: url={url:?} prompt={prompt:?} key={key:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn url_is_checked_before_prompt() {
        let provider = descriptor(ProviderId::DeepAi);
        assert_eq!(validate(&provider, "", "", "k1", None), Err(ValidationError::MissingUrl));
        assert_eq!(
            validate(&provider, "https://example.com", "  ", "k1", None),
            Err(ValidationError::MissingPrompt)
        );
    }

    #[test]
    fn missing_key_names_the_provider() {
        let provider = descriptor(ProviderId::TextRazor);
        let err = validate(&provider, "https://example.com", "summarize", "", None).unwrap_err();
        assert_eq!(err.to_string(), "Error: For TextRazor, the API key is required.");
    }

    #[test]
    fn aylien_needs_id_and_key() {
        let provider = descriptor(ProviderId::Aylien);
        let url = "https://example.com";

        let err = validate(&provider, url, "summarize", "k2", Some("")).unwrap_err();
        assert!(err.to_string().contains("Application ID"));

        assert!(validate(&provider, url, "summarize", "k2", None).is_err());
        assert!(validate(&provider, url, "summarize", "", Some("app")).is_err());
        assert!(validate(&provider, url, "summarize", "k2", Some("app")).is_ok());
    }

    #[test]
    fn aylien_fails_without_credentials_whatever_the_url() {
        let provider = descriptor(ProviderId::Aylien);
        for (url, prompt) in [("", ""), ("https://example.com", ""), ("https://example.com", "p")] {
            assert!(validate(&provider, url, prompt, "", Some("")).is_err());
        }
    }
}
