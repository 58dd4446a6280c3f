use serde::Serialize;
use axum::Json;
use axum::http::StatusCode;
use chrono::Utc;

/// Envelope returned by every JSON route.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub meta: ResponseMeta,
}

#[derive(Serialize)]
pub struct ResponseMeta {
    pub status: &'static str,
    pub status_code: u16,
    pub timestamp: String,
    pub message: Option<String>,
}

pub type Envelope<T> = (StatusCode, Json<ApiResponse<T>>);

fn envelope<T>(status: StatusCode, data: Option<T>, message: Option<String>) -> Envelope<T> {
    let meta = ResponseMeta {
        status: if status.is_success() { "success" } else { "error" },
        status_code: status.as_u16(),
        timestamp: Utc::now().to_rfc3339(),
        message,
    };

    (status, Json(ApiResponse { data, meta }))
}

pub fn success<T: Serialize>(data: T) -> Envelope<T> {
    envelope(StatusCode::OK, Some(data), None)
}

pub fn success_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Envelope<T> {
    envelope(StatusCode::OK, Some(data), Some(message.into()))
}

pub fn error<T>(status: StatusCode, message: String) -> Envelope<T> {
    envelope(status, None, Some(message))
}
