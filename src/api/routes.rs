use axum::{
    routing::{get, post},
    Router,
    extract::State,
    http::header,
    response::IntoResponse,
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use chrono::Utc;
use std::time::Instant;
use tracing::{info, warn};

use crate::error::{Result, AppError};
use crate::api::extractors::{ApiJson, AuthSession};
use crate::api::models::{
    LoginRequest, LoginResponse, PageRequest, ProviderInfo, ScrapeRequestBody, ScrapeResponse,
};
use crate::api::response::{self, Envelope};
use crate::logstore::LogEntry;
use crate::page::{fetch_page, inspect_html, PageSummary};
use crate::providers::ProviderId;
use crate::validate::{validate, ValidationError};
use crate::AppState;

pub const DOWNLOAD_FILE_NAME: &str = "scrape_result.json";

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/login", post(login_handler))
        .route("/api/logout", post(logout_handler))
        .route("/api/providers", get(providers_handler))
        .route("/api/scrape", post(scrape_handler))
        .route("/api/scrape/last", get(download_handler))
        .route("/api/page", post(page_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn login_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Envelope<LoginResponse>> {
    let token = state.sessions.login(&req.username, &req.password)?;
    Ok(response::success_with_message(
        LoginResponse {
            token,
            username: req.username,
        },
        "Logged in successfully!",
    ))
}

async fn logout_handler(State(state): State<AppState>, auth: AuthSession) -> Envelope<bool> {
    response::success(state.sessions.logout(&auth.token))
}

async fn providers_handler(State(state): State<AppState>) -> Envelope<Vec<ProviderInfo>> {
    let providers = state
        .dispatcher
        .registry()
        .descriptors()
        .into_iter()
        .map(ProviderInfo::from)
        .collect();
    response::success(providers)
}

async fn scrape_handler(
    State(state): State<AppState>,
    auth: AuthSession,
    ApiJson(body): ApiJson<ScrapeRequestBody>,
) -> Result<Envelope<ScrapeResponse>> {
    let provider: ProviderId = body.provider.parse()?;
    let descriptor = state.dispatcher.registry().descriptor(provider)?;
    validate(
        descriptor,
        &body.url,
        &body.prompt,
        &body.api_key,
        body.api_id.as_deref(),
    )?;

    let request = body.into_scrape_request(provider);
    info!(user = %auth.session.username, %provider, url = %request.url, "Processing scrape request");

    let start_time = Instant::now();
    let result = state.dispatcher.dispatch(&request).await;
    let elapsed = start_time.elapsed();
    info!(%provider, success = result.is_success(), "Scrape request took {:?}", elapsed);

    let entry = LogEntry::new(&auth.session.username, provider, &request.url, &request.prompt, elapsed);
    let log_error = match append_log(&state, entry).await {
        Ok(_) => None,
        Err(err) => {
            warn!("Error inserting log: {}", err);
            Some(format!("Error inserting log: {}", err))
        }
    };

    let response_data = ScrapeResponse {
        provider,
        url: request.url,
        prompt: request.prompt,
        duration_seconds: (elapsed.as_secs_f64() * 100.0).round() / 100.0,
        result,
        scraped_at: Utc::now(),
        log_error,
    };

    let remembered = serde_json::to_value(&response_data)
        .map_err(|e| AppError::StorageError(format!("cannot keep result: {}", e)))
        .and_then(|value| state.sessions.remember_result(&auth.token, value));
    if let Err(err) = remembered {
        warn!("Last result not kept for download: {}", err);
    }

    let message = format!("Done in {:.2} seconds", response_data.duration_seconds);
    Ok(response::success_with_message(response_data, message))
}

async fn append_log(state: &AppState, entry: LogEntry) -> Result<i64> {
    let store = state.log_store.clone();
    tokio::task::spawn_blocking(move || store.append(&entry))
        .await
        .map_err(|e| AppError::StorageError(e.to_string()))?
}

async fn download_handler(auth: AuthSession) -> Result<impl IntoResponse> {
    let last = auth
        .session
        .last_result
        .ok_or_else(|| AppError::NotFound("No scrape result to download yet".to_string()))?;
    let body = serde_json::to_string_pretty(&last)
        .map_err(|e| AppError::StorageError(format!("cannot encode result: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", DOWNLOAD_FILE_NAME),
            ),
        ],
        body,
    ))
}

async fn page_handler(
    State(state): State<AppState>,
    auth: AuthSession,
    ApiJson(req): ApiJson<PageRequest>,
) -> Result<Envelope<PageSummary>> {
    let url = req.url.trim();
    if url.is_empty() {
        return Err(ValidationError::MissingUrl.into());
    }
    info!(user = %auth.session.username, url, "Inspecting page");

    let html = fetch_page(&state.client, url).await?;
    let schema = req.schema.and_then(|schema| schema.into_tags());
    Ok(response::success(inspect_html(&html, schema.as_deref())))
}
