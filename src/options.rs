//! Per-request options: credentials, endpoint selection and timeouts.
//!
//! A [`Client`](crate::Client) carries a baseline `RequestOptions` assembled
//! by its builder; every call may layer overrides on top via [`merge`](RequestOptions::merge). The merged result is validated before any request goes out;
//! incomplete credentials surface as [`Error::InvalidRequestOptions`] with
//! the same per-field message structure the server uses for its own
//! validation errors.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::model::ValidationErrors;

/// Production endpoint used when no `api_base` is configured.
pub const DEFAULT_API_BASE: &str = "https://api.denpo.jp/api";

/// API version pinned by this release of the SDK.
pub const DEFAULT_API_VERSION: &str = "2024-03-01";

/// Timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Options governing a single request.
///
/// All fields are optional; whether the merged result is complete enough to
/// send is decided by [`validate`](Self::validate) at request time.
///
/// # Examples
///
/// ```
/// use denpo::RequestOptions;
///
/// let options = RequestOptions::builder()
///     .api_key("key_live_1")
///     .tenant_id("tn_1")
///     .build();
///
/// // Per-call overrides layer over client defaults:
/// let override_key = RequestOptions::builder().api_key("key_live_2").build();
/// let merged = options.merge(Some(&override_key));
/// assert_eq!(merged.api_key.as_deref(), Some("key_live_2"));
/// assert_eq!(merged.tenant_id.as_deref(), Some("tn_1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Value for the `Denpo-Version` header.
    pub api_version: Option<String>,
    /// Bearer token.
    pub api_key: Option<String>,
    /// Tenant discriminator, appended to the API base.
    pub tenant_id: Option<String>,
    /// Overrides the default `User-Agent`.
    pub user_agent: Option<String>,
    /// API origin, without the tenant segment.
    pub api_base: Option<String>,
    /// TCP connect timeout.
    pub connection_timeout: Option<Duration>,
    /// Whole-request timeout once connected.
    pub read_timeout: Option<Duration>,
}

impl RequestOptions {
    /// Creates a builder with no fields set.
    pub fn builder() -> RequestOptionsBuilder {
        RequestOptionsBuilder::default()
    }

    /// Layers `overrides` on top of `self`, field by field.
    ///
    /// Fields the override leaves unset keep their current value.
    pub fn merge(&self, overrides: Option<&RequestOptions>) -> RequestOptions {
        let mut merged = self.clone();
        let Some(overrides) = overrides else {
            return merged;
        };

        if overrides.api_version.is_some() {
            merged.api_version = overrides.api_version.clone();
        }
        if overrides.api_key.is_some() {
            merged.api_key = overrides.api_key.clone();
        }
        if overrides.tenant_id.is_some() {
            merged.tenant_id = overrides.tenant_id.clone();
        }
        if overrides.user_agent.is_some() {
            merged.user_agent = overrides.user_agent.clone();
        }
        if overrides.api_base.is_some() {
            merged.api_base = overrides.api_base.clone();
        }
        if overrides.connection_timeout.is_some() {
            merged.connection_timeout = overrides.connection_timeout;
        }
        if overrides.read_timeout.is_some() {
            merged.read_timeout = overrides.read_timeout;
        }

        merged
    }

    /// The tenant-scoped base URI requests are resolved against.
    ///
    /// Only meaningful after [`validate`](Self::validate) has passed.
    pub fn base_uri(&self) -> String {
        format!(
            "{}/{}",
            self.api_base.as_deref().unwrap_or_default(),
            self.tenant_id.as_deref().unwrap_or_default()
        )
    }

    /// Checks that every field a request needs is present.
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();

        if self.api_version.as_deref().map_or(true, str::is_empty) {
            errors.push("apiVersion", &["apiVersion is required."]);
        }
        if self.api_key.as_deref().map_or(true, str::is_empty) {
            errors.push("apiKey", &["apiKey is required."]);
        }
        if self.tenant_id.as_deref().map_or(true, str::is_empty) {
            errors.push("tenantId", &["tenantId is required."]);
        }
        if self.api_base.as_deref().map_or(true, str::is_empty) {
            errors.push("apiBase", &["apiBase is required."]);
        }

        match errors.into_detail() {
            None => Ok(()),
            Some(error) => Err(Error::InvalidRequestOptions { error }),
        }
    }

    /// The timeout to apply to a request under these options.
    pub fn timeout(&self) -> Duration {
        self.read_timeout.unwrap_or(DEFAULT_TIMEOUT)
    }
}

/// Builder for [`RequestOptions`].
#[derive(Debug, Default)]
pub struct RequestOptionsBuilder {
    options: RequestOptions,
}

impl RequestOptionsBuilder {
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.options.api_version = Some(api_version.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.options.api_key = Some(api_key.into());
        self
    }

    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.options.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.options.user_agent = Some(user_agent.into());
        self
    }

    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.options.api_base = Some(api_base.into());
        self
    }

    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.options.connection_timeout = Some(timeout);
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.options.read_timeout = Some(timeout);
        self
    }

    /// Builds the configured `RequestOptions`.
    pub fn build(self) -> RequestOptions {
        self.options
    }
}
