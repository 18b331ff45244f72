//! Session collaborator: who is signed in and their bearer token

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use crate::error::{ConsoleError, Result};

/// Source of the current bearer token.
///
/// Acquisition may suspend (a provider can refresh on demand) and must be
/// safe to call from several operations at once.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    fn is_authenticated(&self) -> bool;

    async fn access_token(&self) -> Result<String>;
}

/// Token fixed at construction (config file or environment)
pub struct StaticSession {
    token: Option<String>,
}

impl StaticSession {
    pub fn new(token: Option<String>) -> Self {
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Self { token }
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    async fn access_token(&self) -> Result<String> {
        self.token.clone().ok_or(ConsoleError::Auth)
    }
}

/// Token kept in a file that an external sign-in flow rewrites.
/// Read on every acquisition so refreshed tokens are picked up.
pub struct TokenFileSession {
    path: PathBuf,
}

impl TokenFileSession {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl SessionProvider for TokenFileSession {
    fn is_authenticated(&self) -> bool {
        std::fs::metadata(&self.path)
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false)
    }

    async fn access_token(&self) -> Result<String> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            debug!(path = %self.path.display(), error = %e, "token file unreadable");
            ConsoleError::Auth
        })?;

        let token = content.trim();
        if token.is_empty() {
            return Err(ConsoleError::Auth);
        }
        Ok(token.to_string())
    }
}
