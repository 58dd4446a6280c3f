//! Login and per-client sessions.
//!
//! Credential checks go through a [`CredentialVerifier`] so the source of truth
//! is injected by the caller. Sessions live in memory only and are addressed
//! by an opaque bearer token.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, Result};

pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// A single username/password pair taken from configuration.
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        !self.username.is_empty() && username == self.username && password == self.password
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    /// Last scrape response, kept for download.
    pub last_result: Option<Value>,
}

pub struct SessionStore {
    verifier: Arc<dyn CredentialVerifier>,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            verifier,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Verifies the credentials and returns a fresh session token.
    pub fn login(&self, username: &str, password: &str) -> Result<String> {
        if !self.verifier.verify(username, password) {
            warn!(username, "Rejected login");
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let token = Uuid::new_v4().to_string();
        self.sessions().insert(
            token.clone(),
            Session {
                username: username.to_string(),
                last_result: None,
            },
        );
        info!(username, "Logged in successfully");
        Ok(token)
    }

    pub fn resolve(&self, token: &str) -> Result<Session> {
        self.sessions()
            .get(token)
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Unknown session".to_string()))
    }

    pub fn remember_result(&self, token: &str, result: Value) -> Result<()> {
        let mut sessions = self.sessions();
        let session = sessions
            .get_mut(token)
            .ok_or_else(|| AppError::Unauthorized("Unknown session".to_string()))?;
        session.last_result = Some(result);
        Ok(())
    }

    /// Returns whether a session was dropped.
    pub fn logout(&self, token: &str) -> bool {
        self.sessions().remove(token).is_some()
    }
}
