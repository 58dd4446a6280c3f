use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;

use super::{combined_text, present, ProviderDescriptor, ProviderStrategy};
use crate::dispatch::ScrapeRequest;

pub const STRATEGY: ProviderStrategy = ProviderStrategy {
    build_request,
    extract_result,
    placeholder: "No output received.",
};

#[derive(Serialize)]
struct SummarizationRequest {
    text: String,
}

fn build_request(client: &Client, descriptor: &ProviderDescriptor, request: &ScrapeRequest) -> RequestBuilder {
    client
        .post(descriptor.endpoint.clone())
        .header("api-key", request.credentials.api_key.as_str())
        .json(&SummarizationRequest {
            text: combined_text(request),
        })
}

fn extract_result(body: &Value) -> Option<Value> {
    present(body.get("output"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_output_field() {
        assert_eq!(extract_result(&json!({"output": "hello"})), Some(json!("hello")));
        assert_eq!(extract_result(&json!({"id": "abc"})), None);
        assert_eq!(extract_result(&json!({"output": null})), None);
    }
}
