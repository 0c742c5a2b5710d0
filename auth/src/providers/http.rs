//! HTTP verification backend.
//!
//! Talks to an application server exposing two endpoints:
//!
//! - `POST {verify_path}`: form-encoded `assertion` and `audience`, answered
//!   with `{"status": "okay", "email": ..., "audience": ...}` or
//!   `{"status": "failure", "reason": ...}`
//! - `POST {logout_path}`: empty body, `200` on success

use crate::config::HttpBackendConfig;
use crate::error::{BackendError, Result};
use crate::providers::Backend;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Verification request body.
#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    assertion: &'a str,
    audience: &'a str,
}

/// Verification response body.
#[derive(Debug, Deserialize)]
struct VerifyResponse {
    status: String,
    email: Option<String>,
    reason: Option<String>,
    audience: Option<String>,
}

/// [`Backend`] over HTTP.
///
/// # Example
///
/// ```no_run
/// use persona_auth::config::HttpBackendConfig;
/// use persona_auth::providers::HttpBackend;
/// use std::time::Duration;
///
/// # fn example() -> persona_auth::Result<()> {
/// let backend = HttpBackend::new(
///     HttpBackendConfig::new("https://app.example.com")
///         .with_request_timeout(Duration::from_secs(10)),
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpBackend {
    config: HttpBackendConfig,
    http_client: Client,
}

impl HttpBackend {
    /// Create a backend with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: HttpBackendConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| BackendError::transport(e.to_string()))?;
        Ok(Self::with_client(config, http_client))
    }

    /// Create a backend sharing an existing HTTP client.
    ///
    /// The configured request timeout is still applied per request.
    #[must_use]
    pub const fn with_client(config: HttpBackendConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// The backend configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpBackendConfig {
        &self.config
    }

    fn post(&self, url: String) -> reqwest::RequestBuilder {
        let request = self.http_client.post(url);
        match self.config.request_timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }
}

impl Backend for HttpBackend {
    fn verify(
        &self,
        assertion: &str,
        audience: &str,
    ) -> impl Future<Output = std::result::Result<String, BackendError>> + Send {
        let request = self.post(self.config.verify_url()).form(&VerifyRequest {
            assertion,
            audience,
        });
        let audience = audience.to_string();

        async move {
            tracing::debug!(audience = %audience, "Sending assertion for verification");

            let response = request.send().await.map_err(transport_error)?;
            let status = response.status().as_u16();
            let text = response.text().await.map_err(transport_error)?;

            decode_verify_response(status, &text, &audience)
        }
    }

    fn logout(&self) -> impl Future<Output = std::result::Result<(), BackendError>> + Send {
        let request = self.post(self.config.logout_url());

        async move {
            tracing::debug!("Sending logout request");
            let response = request.send().await.map_err(transport_error)?;
            check_http_status(response.status().as_u16())
        }
    }
}

fn transport_error(error: reqwest::Error) -> BackendError {
    if error.is_timeout() {
        BackendError::transport("Request timed out")
    } else {
        BackendError::transport(error.to_string())
    }
}

fn check_http_status(status: u16) -> std::result::Result<(), BackendError> {
    if status == 200 {
        Ok(())
    } else {
        tracing::warn!(status, "Backend answered with unexpected HTTP status");
        Err(BackendError::rejected(format!("HTTP code {status}")))
    }
}

fn parse_error(detail: impl std::fmt::Display) -> BackendError {
    BackendError::transport(format!("Error parsing JSON: {detail}"))
}

/// Turn a verification response into the verified user identifier.
fn decode_verify_response(
    status: u16,
    body: &str,
    audience: &str,
) -> std::result::Result<String, BackendError> {
    check_http_status(status)?;

    let response: VerifyResponse = serde_json::from_str(body).map_err(parse_error)?;

    match response.status.as_str() {
        "okay" => {
            let email = response
                .email
                .ok_or_else(|| parse_error("missing field `email`"))?;
            match response.audience {
                Some(verified) if verified != audience => {
                    tracing::warn!(expected = %audience, got = %verified, "Audience mismatch");
                    Err(BackendError::rejected("Audiences differ"))
                },
                _ => Ok(email),
            }
        },
        "failure" => {
            let reason = response
                .reason
                .ok_or_else(|| parse_error("missing field `reason`"))?;
            Err(BackendError::rejected(reason))
        },
        other => {
            tracing::warn!(status = other, "Backend answered with unknown verification status");
            Err(BackendError::rejected("Invalid status"))
        },
    }
}
