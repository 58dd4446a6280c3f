use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use super::{present, schema_text, ProviderDescriptor, ProviderStrategy};
use crate::dispatch::ScrapeRequest;

pub const STRATEGY: ProviderStrategy = ProviderStrategy {
    build_request,
    extract_result,
    placeholder: "No summary received.",
};

const APPLICATION_ID_HEADER: &str = "X-AYLIEN-TextAPI-Application-ID";
const APPLICATION_KEY_HEADER: &str = "X-AYLIEN-TextAPI-Application-Key";

fn build_request(client: &Client, descriptor: &ProviderDescriptor, request: &ScrapeRequest) -> RequestBuilder {
    let schema = schema_text(request);
    client
        .get(descriptor.endpoint.clone())
        .header(APPLICATION_ID_HEADER, request.credentials.api_id.as_deref().unwrap_or_default())
        .header(APPLICATION_KEY_HEADER, request.credentials.api_key.as_str())
        .query(&[
            ("url", request.url.as_str()),
            ("title", request.prompt.as_str()),
            ("schema", schema.as_str()),
        ])
}

fn extract_result(body: &Value) -> Option<Value> {
    present(body.get("summary"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_summary_field() {
        let body = json!({"text": "full", "summary": ["one", "two"]});
        assert_eq!(extract_result(&body), Some(json!(["one", "two"])));
        assert_eq!(extract_result(&json!({"text": "full"})), None);
    }
}
