//! Command-line view layer
//!
//! Each command builds the controller it needs, drives it (through the
//! form machine for create/edit), and renders the resulting state.

pub mod item;
pub mod project;

use anyhow::{anyhow, Result};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::{ApiClient, ReqwestTransport};
use crate::config::{Config, ENV_TOKEN};
use crate::error::{ConsoleError, Surface};
use crate::session::{SessionProvider, StaticSession, TokenFileSession};

/// Build the API client described by the configuration
pub fn connect(config: &Config) -> Result<ApiClient> {
    let transport = ReqwestTransport::new(config.timeout())
        .map_err(|e| anyhow!("failed to build HTTP client: {}", e.0))?;

    let session: Arc<dyn SessionProvider> = match config.token_file() {
        Some(path) => Arc::new(TokenFileSession::new(path)),
        None => Arc::new(StaticSession::new(config.auth.token.clone())),
    };

    Ok(ApiClient::new(config.base_url(), Arc::new(transport), session)
        .with_dev_identity(config.api.dev_identity.clone()))
}

/// Turn a console error into the message shown for its surface
pub fn fail(err: ConsoleError) -> anyhow::Error {
    let message = match err.surface() {
        Surface::SignIn => format!(
            "Please sign in: set {} or configure auth.token / auth.token_file",
            ENV_TOKEN
        ),
        Surface::Retry => format!("{} (the API may be unreachable; retry the command)", err),
        Surface::Inline | Surface::Form => err.to_string(),
        Surface::Page => format!("Error: {}", err),
    };
    anyhow!(message)
}

/// Ask before a destructive action; `assume_yes` skips the prompt
pub async fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }

    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Shorten to `max` characters on one line
fn truncate(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() > max {
        let kept: String = line.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        line.to_string()
    }
}
