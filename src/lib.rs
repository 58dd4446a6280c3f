pub mod api;
pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logstore;
pub mod page;
pub mod providers;
pub mod telemetry;
pub mod validate;

use std::sync::Arc;

use reqwest::{Client, ClientBuilder};

use auth::{SessionStore, StaticCredentials};
use config::Config;
use dispatch::Dispatcher;
use error::{AppError, Result};
use logstore::LogStore;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: Client,
    pub dispatcher: Dispatcher,
    pub log_store: Arc<LogStore>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        // One pooled client shared by provider calls and page fetches
        let client = ClientBuilder::new()
            .timeout(config.http_timeout)
            .connect_timeout(config.http_timeout / 2)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        let dispatcher = Dispatcher::new(client.clone(), Arc::new(config.registry()));
        let log_store = LogStore::open(&config.log_db_path)?;
        let verifier = StaticCredentials::new(config.auth_username.clone(), config.auth_password.clone());

        Ok(AppState {
            config: Arc::new(config),
            client,
            dispatcher,
            log_store: Arc::new(log_store),
            sessions: Arc::new(SessionStore::new(Arc::new(verifier))),
        })
    }
}
