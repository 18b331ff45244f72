//! Authenticated REST client
//!
//! One attempt per call, no retry and no caching. Failures are classified
//! into the [`ConsoleError`] taxonomy:
//! - no session -> `Auth`, before anything is sent
//! - transport failure -> `Network`
//! - non-2xx -> `Http` with the server's `detail`
//! - undecodable 2xx body -> `Decode`

mod transport;

pub use reqwest::Method;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::error::{ConsoleError, Result};
use crate::session::SessionProvider;

/// Transitional identity header, sent next to the bearer token when configured
pub const DEV_IDENTITY_HEADER: &str = "X-Logto-User";

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionProvider>,
    dev_identity: Option<String>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            session,
            dev_identity: None,
        }
    }

    pub fn with_dev_identity(mut self, identity: Option<String>) -> Self {
        self.dev_identity = identity;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Send one request; `Ok(None)` for a 2xx with an empty body.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Option<Value>> {
        if !self.session.is_authenticated() {
            return Err(ConsoleError::Auth);
        }
        let token = self.session.access_token().await?;

        let mut headers = vec![("Authorization".to_string(), format!("Bearer {}", token))];
        if let Some(identity) = &self.dev_identity {
            headers.push((DEV_IDENTITY_HEADER.to_string(), identity.clone()));
        }

        let body = match body {
            Some(value) => {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                Some(
                    serde_json::to_vec(value)
                        .map_err(|e| ConsoleError::Validation(e.to_string()))?,
                )
            }
            None => None,
        };

        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "sending request");

        let response = self
            .transport
            .send(HttpRequest {
                method: method.clone(),
                url,
                headers,
                body,
            })
            .await
            .map_err(|e| ConsoleError::Network(e.0))?;

        if !response.is_success() {
            debug!(%method, path, status = response.status, "request rejected");
            return Err(ConsoleError::Http {
                status: response.status,
                detail: extract_detail(&response.body),
            });
        }

        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        serde_json::from_slice(&response.body)
            .map(Some)
            .map_err(|e| ConsoleError::Decode(e.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.request(Method::GET, path, None).await?;
        decode(value)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let body = to_value(body)?;
        let value = self.request(Method::POST, path, Some(&body)).await?;
        decode(value)
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = to_value(body)?;
        let value = self.request(Method::PATCH, path, Some(&body)).await?;
        decode(value)
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.request(Method::DELETE, path, None).await?;
        Ok(())
    }
}

fn to_value<B: Serialize>(body: &B) -> Result<Value> {
    serde_json::to_value(body).map_err(|e| ConsoleError::Validation(e.to_string()))
}

fn decode<T: DeserializeOwned>(value: Option<Value>) -> Result<T> {
    let value = value.ok_or_else(|| ConsoleError::Decode("empty response body".to_string()))?;
    serde_json::from_value(value).map_err(|e| ConsoleError::Decode(e.to_string()))
}

/// Pull a human-readable message out of an error body.
///
/// The server sends `{"detail": "..."}` or, for schema rejections,
/// `{"detail": [{"msg": "..."}, ...]}`; the first message wins.
pub fn extract_detail(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        Value::String(detail) => Some(detail.clone()),
        Value::Array(entries) => entries
            .first()
            .and_then(|entry| entry.get("msg"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// Percent-encode an id for use as one path segment
pub fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}
