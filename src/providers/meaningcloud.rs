use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;

use super::{present, ProviderDescriptor, ProviderStrategy};
use crate::dispatch::ScrapeRequest;

pub const STRATEGY: ProviderStrategy = ProviderStrategy {
    build_request,
    extract_result,
    placeholder: "No summary received.",
};

#[derive(Serialize)]
struct SummarizationRequest<'a> {
    key: &'a str,
    url: &'a str,
    txt: &'a str,
    lang: &'static str,
}

// MeaningCloud authenticates through the `key` body field, not a header.
fn build_request(client: &Client, descriptor: &ProviderDescriptor, request: &ScrapeRequest) -> RequestBuilder {
    client
        .post(descriptor.endpoint.clone())
        .json(&SummarizationRequest {
            key: &request.credentials.api_key,
            url: &request.url,
            txt: &request.prompt,
            lang: "en",
        })
}

fn extract_result(body: &Value) -> Option<Value> {
    present(body.get("summary"))
}
