//! Persona configuration.
//!
//! Configuration values are provided by the application; nothing here is
//! interpreted by the state machine except the audience.

use crate::error::{PersonaError, Result};
use reqwest::Url;
use std::time::Duration;

/// Options shown by the identity provider's login dialog.
///
/// All fields are optional and forwarded as-is. Privacy policy and terms of
/// service are expected together; see [`DisplayOptions::policy_pair_warning`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Plain-text site name.
    pub site_name: Option<String>,

    /// Absolute URL of the site logo, served over TLS.
    pub site_logo: Option<String>,

    /// Absolute URL of the privacy policy.
    pub privacy_policy: Option<String>,

    /// Absolute URL of the terms of service.
    pub terms_of_service: Option<String>,

    /// Where the provider should send the user after the dialog.
    pub return_to: Option<String>,
}

impl DisplayOptions {
    /// Set the site name.
    #[must_use]
    pub fn with_site_name(mut self, site_name: impl Into<String>) -> Self {
        self.site_name = Some(site_name.into());
        self
    }

    /// Set the site logo URL.
    #[must_use]
    pub fn with_site_logo(mut self, site_logo: impl Into<String>) -> Self {
        self.site_logo = Some(site_logo.into());
        self
    }

    /// Set the privacy policy URL.
    #[must_use]
    pub fn with_privacy_policy(mut self, privacy_policy: impl Into<String>) -> Self {
        self.privacy_policy = Some(privacy_policy.into());
        self
    }

    /// Set the terms of service URL.
    #[must_use]
    pub fn with_terms_of_service(mut self, terms_of_service: impl Into<String>) -> Self {
        self.terms_of_service = Some(terms_of_service.into());
        self
    }

    /// Set the post-dialog return URL.
    #[must_use]
    pub fn with_return_to(mut self, return_to: impl Into<String>) -> Self {
        self.return_to = Some(return_to.into());
        self
    }

    /// Advisory check: a privacy policy without terms of service (or the
    /// reverse) is accepted but providers may ignore both.
    #[must_use]
    pub const fn policy_pair_warning(&self) -> Option<&'static str> {
        match (&self.privacy_policy, &self.terms_of_service) {
            (Some(_), None) => Some("privacy policy is set without terms of service"),
            (None, Some(_)) => Some("terms of service are set without a privacy policy"),
            _ => None,
        }
    }
}

/// Persona configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonaConfig {
    /// Origin assertions are scoped to (`scheme://host[:port]`).
    ///
    /// Unset or empty: the identity provider's default audience is used.
    pub audience: Option<String>,

    /// Options forwarded to the login dialog.
    pub display: DisplayOptions,
}

impl PersonaConfig {
    /// Create a configuration with no audience and no display options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the audience.
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Set the display options.
    #[must_use]
    pub fn with_display(mut self, display: DisplayOptions) -> Self {
        self.display = display;
        self
    }

    /// The configured audience, or `fallback()` when unset or empty.
    pub fn audience_or_else<F>(&self, fallback: F) -> String
    where
        F: FnOnce() -> String,
    {
        match self.audience.as_deref() {
            Some(audience) if !audience.is_empty() => audience.to_string(),
            _ => fallback(),
        }
    }
}

/// Derive the origin (`scheme://host[:port]`) of a page location.
///
/// Default ports are omitted, as browsers do.
///
/// # Examples
///
/// ```
/// # use persona_auth::config::origin_from_location;
/// assert_eq!(
///     origin_from_location("https://example.com/app/login?next=1").unwrap(),
///     "https://example.com"
/// );
/// assert_eq!(
///     origin_from_location("http://localhost:8080/").unwrap(),
///     "http://localhost:8080"
/// );
/// ```
///
/// # Errors
///
/// Returns [`PersonaError::InvalidOrigin`] if `location` is not an absolute
/// URL with a host.
pub fn origin_from_location(location: &str) -> Result<String> {
    let url = Url::parse(location)
        .map_err(|e| PersonaError::InvalidOrigin(format!("{location}: {e}")))?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(PersonaError::InvalidOrigin(format!(
            "{location}: no host"
        )));
    }
    Ok(origin.ascii_serialization())
}

/// HTTP verification backend configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpBackendConfig {
    /// Base URL of the application server (e.g., "https://app.example.com").
    pub base_url: String,

    /// Path assertions are POSTed to.
    ///
    /// Default: `/auth/verify`
    pub verify_path: String,

    /// Path the logout request is POSTed to.
    ///
    /// Default: `/auth/logout`
    pub logout_path: String,

    /// Per-request timeout. `None` waits as long as the transport does.
    pub request_timeout: Option<Duration>,
}

impl HttpBackendConfig {
    /// Create a configuration with the default paths and no timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            verify_path: "/auth/verify".to_string(),
            logout_path: "/auth/logout".to_string(),
            request_timeout: None,
        }
    }

    /// Set the verification path.
    #[must_use]
    pub fn with_verify_path(mut self, path: impl Into<String>) -> Self {
        self.verify_path = path.into();
        self
    }

    /// Set the logout path.
    #[must_use]
    pub fn with_logout_path(mut self, path: impl Into<String>) -> Self {
        self.logout_path = path.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Full verification URL.
    #[must_use]
    pub fn verify_url(&self) -> String {
        join(&self.base_url, &self.verify_path)
    }

    /// Full logout URL.
    #[must_use]
    pub fn logout_url(&self) -> String {
        join(&self.base_url, &self.logout_path)
    }
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}

fn join(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
