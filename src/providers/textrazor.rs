use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;

use super::{combined_text, present, ProviderDescriptor, ProviderStrategy};
use crate::dispatch::ScrapeRequest;

pub const STRATEGY: ProviderStrategy = ProviderStrategy {
    build_request,
    extract_result,
    placeholder: "No entities received.",
};

#[derive(Serialize)]
struct AnalyzeRequest {
    extractors: [&'static str; 2],
    text: String,
}

fn build_request(client: &Client, descriptor: &ProviderDescriptor, request: &ScrapeRequest) -> RequestBuilder {
    client
        .post(descriptor.endpoint.clone())
        .header("x-textrazor-key", request.credentials.api_key.as_str())
        .json(&AnalyzeRequest {
            extractors: ["entities", "topics"],
            text: combined_text(request),
        })
}

/// `response.entities`
fn extract_result(body: &Value) -> Option<Value> {
    present(body.get("response")?.get("entities"))
}
