use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use super::{present, ProviderDescriptor, ProviderStrategy};
use crate::dispatch::ScrapeRequest;

pub const STRATEGY: ProviderStrategy = ProviderStrategy {
    build_request,
    extract_result,
    placeholder: "No text received.",
};

fn build_request(client: &Client, descriptor: &ProviderDescriptor, request: &ScrapeRequest) -> RequestBuilder {
    client.get(descriptor.endpoint.clone()).query(&[
        ("token", request.credentials.api_key.as_str()),
        ("url", request.url.as_str()),
        ("mode", "product"),
    ])
}

/// `objects[0].text`
fn extract_result(body: &Value) -> Option<Value> {
    present(body.get("objects")?.get(0)?.get("text"))
}
